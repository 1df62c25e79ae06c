use crate::domain::model::UserRole;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DocTrackError, Result};
use crate::utils::validation::{
    validate_email, validate_path, validate_range, validate_socket_addr, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_DATABASE_PATH: &str = "./data/doc-tracker.db";
pub const DEFAULT_OVERDUE_AFTER_HOURS: i64 = 48;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;
pub const MAX_SUGGESTION_LIMIT: usize = 50;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub departments: Vec<DepartmentSeed>,
    #[serde(default)]
    pub users: Vec<UserSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// 對外網址，用來組公開查詢連結
    pub public_base_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// 追蹤號日期使用的時區偏移（分鐘）
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_overdue_after_hours")]
    pub overdue_after_hours: i64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            overdue_after_hours: DEFAULT_OVERDUE_AFTER_HOURS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    #[serde(default)]
    pub json: bool,
}

/// 啟動時建立的部門
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentSeed {
    pub code: String,
    pub name: String,
}

/// 啟動時建立的使用者，部門以代碼指定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSeed {
    pub name: String,
    pub email: String,
    pub department: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_database_path() -> String {
    DEFAULT_DATABASE_PATH.to_string()
}

fn default_overdue_after_hours() -> i64 {
    DEFAULT_OVERDUE_AFTER_HOURS
}

fn default_suggestion_limit() -> usize {
    DEFAULT_SUGGESTION_LIMIT
}

fn default_role() -> UserRole {
    UserRole::Staff
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${DOC_TRACKER_DB})，找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| DocTrackError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_socket_addr("server.bind", &self.server.bind)?;
        if let Some(base) = &self.server.public_base_url {
            validate_url("server.public_base_url", base)?;
        }
        validate_path("database.path", &self.database.path)?;

        // 時區偏移限制在 ±14 小時
        validate_range(
            "workflow.utc_offset_minutes",
            self.workflow.utc_offset_minutes,
            -14 * 60,
            14 * 60,
        )?;
        validate_range(
            "workflow.overdue_after_hours",
            self.workflow.overdue_after_hours,
            1,
            24 * 365,
        )?;
        validate_range(
            "search.suggestion_limit",
            self.search.suggestion_limit,
            1,
            MAX_SUGGESTION_LIMIT,
        )?;

        if let Some(level) = &self.logging.level {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level.to_lowercase().as_str()) {
                return Err(DocTrackError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        for user in &self.users {
            validate_email("users.email", &user.email)?;
            if !self.departments.iter().any(|d| d.code == user.department) {
                return Err(DocTrackError::InvalidConfigValueError {
                    field: "users.department".to_string(),
                    value: user.department.clone(),
                    reason: "Department code is not declared in [[departments]]".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn database_path(&self) -> &str {
        &self.database.path
    }

    fn bind_address(&self) -> &str {
        &self.server.bind
    }

    fn public_base_url(&self) -> Option<&str> {
        self.server.public_base_url.as_deref()
    }

    fn utc_offset_minutes(&self) -> i32 {
        self.workflow.utc_offset_minutes
    }

    fn overdue_after_hours(&self) -> i64 {
        self.workflow.overdue_after_hours
    }

    fn suggestion_limit(&self) -> usize {
        self.search.suggestion_limit
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
