use rusqlite::Connection;

pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS departments (
    id          INTEGER PRIMARY KEY,
    code        TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    is_active   INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY,
    name            TEXT NOT NULL,
    email           TEXT NOT NULL UNIQUE,
    department_id   INTEGER NOT NULL REFERENCES departments(id),
    role            TEXT NOT NULL,
    is_active       INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS sequences (
    scope       TEXT NOT NULL,
    period      TEXT NOT NULL,
    last_value  INTEGER NOT NULL,
    PRIMARY KEY (scope, period)
);

CREATE TABLE IF NOT EXISTS document_cases (
    id          INTEGER PRIMARY KEY,
    case_number TEXT NOT NULL UNIQUE,
    title       TEXT NOT NULL,
    description TEXT,
    status      TEXT NOT NULL,
    created_by  INTEGER NOT NULL REFERENCES users(id),
    created_at  TEXT NOT NULL,
    closed_at   TEXT
);

CREATE TABLE IF NOT EXISTS documents (
    id                      INTEGER PRIMARY KEY,
    tracking_number         TEXT NOT NULL UNIQUE,
    title                   TEXT NOT NULL,
    description             TEXT,
    document_type           TEXT NOT NULL,
    status                  TEXT NOT NULL,
    origin_department_id    INTEGER NOT NULL REFERENCES departments(id),
    current_department_id   INTEGER NOT NULL REFERENCES departments(id),
    current_user_id         INTEGER REFERENCES users(id),
    created_by              INTEGER NOT NULL REFERENCES users(id),
    case_id                 INTEGER REFERENCES document_cases(id),
    parent_id               INTEGER REFERENCES documents(id),
    split_suffix            TEXT,
    metadata                TEXT NOT NULL DEFAULT '{}',
    created_at              TEXT NOT NULL,
    updated_at              TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(status);
CREATE INDEX IF NOT EXISTS idx_documents_department ON documents(current_department_id);
CREATE INDEX IF NOT EXISTS idx_documents_parent ON documents(parent_id);
CREATE INDEX IF NOT EXISTS idx_documents_case ON documents(case_id);

CREATE TABLE IF NOT EXISTS document_transfers (
    id                  INTEGER PRIMARY KEY,
    document_id         INTEGER NOT NULL REFERENCES documents(id),
    from_department_id  INTEGER NOT NULL REFERENCES departments(id),
    from_user_id        INTEGER NOT NULL REFERENCES users(id),
    to_department_id    INTEGER NOT NULL REFERENCES departments(id),
    to_user_id          INTEGER REFERENCES users(id),
    version_type        TEXT NOT NULL,
    status              TEXT NOT NULL,
    remarks             TEXT,
    forwarded_at        TEXT NOT NULL,
    resolved_at         TEXT,
    resolved_by         INTEGER REFERENCES users(id)
);
CREATE INDEX IF NOT EXISTS idx_transfers_document ON document_transfers(document_id);
CREATE INDEX IF NOT EXISTS idx_transfers_pending ON document_transfers(to_department_id, status);

CREATE TABLE IF NOT EXISTS document_copies (
    id              INTEGER PRIMARY KEY,
    document_id     INTEGER NOT NULL REFERENCES documents(id),
    copy_number     INTEGER NOT NULL,
    department_id   INTEGER NOT NULL REFERENCES departments(id),
    issued_by       INTEGER NOT NULL REFERENCES users(id),
    purpose         TEXT,
    status          TEXT NOT NULL,
    issued_at       TEXT NOT NULL,
    returned_at     TEXT,
    UNIQUE (document_id, copy_number)
);

CREATE TABLE IF NOT EXISTS document_custodies (
    id              INTEGER PRIMARY KEY,
    document_id     INTEGER NOT NULL REFERENCES documents(id),
    version_type    TEXT NOT NULL,
    department_id   INTEGER NOT NULL REFERENCES departments(id),
    user_id         INTEGER REFERENCES users(id),
    copy_id         INTEGER REFERENCES document_copies(id),
    is_current      INTEGER NOT NULL,
    received_at     TEXT NOT NULL,
    released_at     TEXT,
    notes           TEXT
);
CREATE INDEX IF NOT EXISTS idx_custodies_document ON document_custodies(document_id, version_type, is_current);

CREATE TABLE IF NOT EXISTS document_relationships (
    id                  INTEGER PRIMARY KEY,
    from_document_id    INTEGER NOT NULL REFERENCES documents(id),
    to_document_id      INTEGER NOT NULL REFERENCES documents(id),
    relation            TEXT NOT NULL,
    created_by          INTEGER NOT NULL REFERENCES users(id),
    created_at          TEXT NOT NULL,
    UNIQUE (from_document_id, to_document_id, relation)
);

CREATE TABLE IF NOT EXISTS document_events (
    id              INTEGER PRIMARY KEY,
    document_id     INTEGER NOT NULL REFERENCES documents(id),
    event_type      TEXT NOT NULL,
    actor_id        INTEGER REFERENCES users(id),
    department_id   INTEGER REFERENCES departments(id),
    details         TEXT NOT NULL DEFAULT '{}',
    created_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_document ON document_events(document_id);

CREATE TABLE IF NOT EXISTS document_remarks (
    id          INTEGER PRIMARY KEY,
    document_id INTEGER NOT NULL REFERENCES documents(id),
    parent_id   INTEGER REFERENCES document_remarks(id),
    author_id   INTEGER NOT NULL REFERENCES users(id),
    body        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_remarks_document ON document_remarks(document_id);
"#;

/// 安裝或確認資料表結構
pub fn install_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_V1)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}
