use crate::adapters::sqlite::directory as db;
use crate::config::toml_config::{DepartmentSeed, UserSeed};
use crate::core::requests::{CreateDepartmentRequest, CreateUserRequest};
use crate::domain::model::{Department, User};
use crate::utils::error::{DocTrackError, Result};
use rusqlite::Connection;

/// 解析請求中的操作者；未知或停用的使用者視為未登入
pub fn load_actor(conn: &Connection, user_id: i64) -> Result<User> {
    match db::find_user(conn, user_id)? {
        Some(user) if user.is_active => Ok(user),
        Some(_) => Err(DocTrackError::Unauthenticated {
            message: format!("user {} is deactivated", user_id),
        }),
        None => Err(DocTrackError::Unauthenticated {
            message: format!("unknown user {}", user_id),
        }),
    }
}

pub fn require_admin(actor: &User, action: &str) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DocTrackError::unauthorized(action, "administrator role required"))
    }
}

pub fn require_department(conn: &Connection, id: i64) -> Result<Department> {
    db::find_department(conn, id)?.ok_or_else(|| DocTrackError::not_found("department", id))
}

pub fn require_active_department(conn: &Connection, id: i64) -> Result<Department> {
    let department = require_department(conn, id)?;
    if !department.is_active {
        return Err(DocTrackError::validation(
            "department_id",
            format!("Department {} is inactive", department.code),
        ));
    }
    Ok(department)
}

pub fn require_user(conn: &Connection, id: i64) -> Result<User> {
    db::find_user(conn, id)?.ok_or_else(|| DocTrackError::not_found("user", id))
}

pub fn list_departments(conn: &Connection) -> Result<Vec<Department>> {
    Ok(db::list_departments(conn)?)
}

pub fn list_users(conn: &Connection, department_id: Option<i64>) -> Result<Vec<User>> {
    Ok(db::list_users(conn, department_id)?)
}

pub fn create_department(
    conn: &Connection,
    actor: &User,
    request: &CreateDepartmentRequest,
) -> Result<Department> {
    require_admin(actor, "create departments")?;
    let code = request.code.trim();
    if db::find_department_by_code(conn, code)?.is_some() {
        return Err(DocTrackError::conflict(format!(
            "department code '{}' already exists",
            code
        )));
    }
    Ok(db::insert_department(conn, code, request.name.trim())?)
}

pub fn create_user(conn: &Connection, actor: &User, request: &CreateUserRequest) -> Result<User> {
    require_admin(actor, "create users")?;
    require_active_department(conn, request.department_id)?;
    let email = request.email.trim().to_lowercase();
    if db::find_user_by_email(conn, &email)?.is_some() {
        return Err(DocTrackError::conflict(format!(
            "user '{}' already exists",
            email
        )));
    }
    Ok(db::insert_user(
        conn,
        request.name.trim(),
        &email,
        request.department_id,
        request.role,
    )?)
}

/// 依設定檔建立部門與使用者；已存在者略過
pub fn seed(conn: &Connection, departments: &[DepartmentSeed], users: &[UserSeed]) -> Result<usize> {
    let mut created = 0;

    for seed in departments {
        if db::find_department_by_code(conn, &seed.code)?.is_none() {
            db::insert_department(conn, &seed.code, &seed.name)?;
            tracing::info!("🏢 Seeded department {}", seed.code);
            created += 1;
        }
    }

    for seed in users {
        let email = seed.email.trim().to_lowercase();
        if db::find_user_by_email(conn, &email)?.is_some() {
            continue;
        }
        let department = db::find_department_by_code(conn, &seed.department)?.ok_or_else(|| {
            DocTrackError::ConfigError {
                message: format!(
                    "user '{}' references unknown department '{}'",
                    email, seed.department
                ),
            }
        })?;
        db::insert_user(conn, &seed.name, &email, department.id, seed.role)?;
        tracing::info!("👤 Seeded user {}", email);
        created += 1;
    }

    Ok(created)
}
