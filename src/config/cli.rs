use super::AppConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "doc-tracker")]
#[command(about = "Document routing, custody and records tracking service")]
pub struct CliConfig {
    #[arg(long, short = 'c', help = "Path to the TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Override server.bind (e.g. 0.0.0.0:8080)")]
    pub bind: Option<String>,

    #[arg(long, help = "Override database.path")]
    pub database: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 讀取設定檔（未指定時使用預設值），再套用命令列覆寫並驗證
    pub fn load(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(database) = &self.database {
            config.database.path = database.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ConfigProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_overrides_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nbind = \"127.0.0.1:7000\"\n\n[database]\npath = \"./a.db\"\n")
            .unwrap();

        let cli = CliConfig::parse_from([
            "doc-tracker",
            "--config",
            temp_file.path().to_str().unwrap(),
            "--database",
            "./b.db",
        ]);
        let config = cli.load().unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:7000");
        assert_eq!(config.database_path(), "./b.db");
    }

    #[test]
    fn test_cli_without_file_uses_defaults() {
        let cli = CliConfig::parse_from(["doc-tracker", "--bind", "0.0.0.0:9999", "--verbose"]);
        let config = cli.load().unwrap();
        assert!(cli.verbose);
        assert_eq!(config.bind_address(), "0.0.0.0:9999");
    }

    #[test]
    fn test_cli_rejects_invalid_override() {
        let cli = CliConfig::parse_from(["doc-tracker", "--bind", "nowhere"]);
        assert!(cli.load().is_err());
    }
}
