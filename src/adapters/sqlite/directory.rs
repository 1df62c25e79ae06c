use super::rows::{self, DEPARTMENT_COLUMNS, USER_COLUMNS};
use crate::domain::model::{Department, User, UserRole};
use rusqlite::{params, Connection, OptionalExtension};

pub fn insert_department(conn: &Connection, code: &str, name: &str) -> rusqlite::Result<Department> {
    conn.execute(
        "INSERT INTO departments(code, name, is_active) VALUES (?1, ?2, 1)",
        params![code, name],
    )?;
    Ok(Department {
        id: conn.last_insert_rowid(),
        code: code.to_string(),
        name: name.to_string(),
        is_active: true,
    })
}

pub fn set_department_active(conn: &Connection, id: i64, active: bool) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE departments SET is_active=?2 WHERE id=?1",
        params![id, active],
    )
}

pub fn find_department(conn: &Connection, id: i64) -> rusqlite::Result<Option<Department>> {
    conn.query_row(
        &format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id=?1"),
        params![id],
        rows::department,
    )
    .optional()
}

pub fn find_department_by_code(conn: &Connection, code: &str) -> rusqlite::Result<Option<Department>> {
    conn.query_row(
        &format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE code=?1"),
        params![code],
        rows::department,
    )
    .optional()
}

pub fn list_departments(conn: &Connection) -> rusqlite::Result<Vec<Department>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY code ASC"
    ))?;
    let rows = stmt.query_map([], rows::department)?;
    rows.collect()
}

pub fn insert_user(
    conn: &Connection,
    name: &str,
    email: &str,
    department_id: i64,
    role: UserRole,
) -> rusqlite::Result<User> {
    conn.execute(
        "INSERT INTO users(name, email, department_id, role, is_active) VALUES (?1, ?2, ?3, ?4, 1)",
        params![name, email, department_id, role.as_str()],
    )?;
    Ok(User {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        email: email.to_string(),
        department_id,
        role,
        is_active: true,
    })
}

pub fn find_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id=?1"),
        params![id],
        rows::user,
    )
    .optional()
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE email=?1"),
        params![email],
        rows::user,
    )
    .optional()
}

pub fn list_users(conn: &Connection, department_id: Option<i64>) -> rusqlite::Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users \
         WHERE (?1 IS NULL OR department_id=?1) \
         ORDER BY name ASC, id ASC"
    ))?;
    let rows = stmt.query_map(params![department_id], rows::user)?;
    rows.collect()
}
