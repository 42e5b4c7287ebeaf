use crate::cli::GlobalArgs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Level;

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_path: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    /// Load the config named by `global`, applying `--database`.
    ///
    /// When no `--config` was given and `jobly.toml` does not exist, defaults
    /// are used with `database.url = "${DATABASE_URL}"`.
    pub fn resolve(global: &GlobalArgs) -> anyhow::Result<Self> {
        let config_path = global.config_path();
        let raw = if global.config.is_none() && !config_path.exists() {
            None
        } else {
            Some(read(&config_path)?)
        };
        let file = ConfigFile::from_toml(raw.as_deref(), global.database.as_deref())
            .map_err(|e| anyhow::anyhow!("{}: {e:#}", config_path.display()))?;

        Ok(Self { config_path, file })
    }
}

fn read(config_path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(config_path).map_err(|e| {
        anyhow::anyhow!(
            "failed to read config file {}: {e}",
            config_path.display()
        )
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub version: String,

    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_max_connections() -> usize {
    jobly::pool::DEFAULT_MAX_SIZE
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Level SQL statements are logged at (target `jobly.sql`)
    #[serde(default = "default_sql_level")]
    pub sql_level: String,
    /// SQL longer than this many bytes is truncated in log events
    #[serde(default = "default_max_sql_length")]
    pub max_sql_length: usize,
}

fn default_sql_level() -> String {
    "debug".to_string()
}

fn default_max_sql_length() -> usize {
    200
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            sql_level: default_sql_level(),
            max_sql_length: default_max_sql_length(),
        }
    }
}

impl LoggingConfig {
    pub fn level(&self) -> anyhow::Result<Level> {
        Level::from_str(self.sql_level.trim())
            .map_err(|_| anyhow::anyhow!("invalid logging.sql_level: {}", self.sql_level))
    }
}

impl ConfigFile {
    /// Parse `raw` (or the defaults when `None`), apply the URL override,
    /// expand `${VAR}` references and validate.
    pub fn from_toml(raw: Option<&str>, database_override: Option<&str>) -> anyhow::Result<Self> {
        let mut file = match raw {
            Some(raw) => toml::from_str(raw)
                .map_err(|e| anyhow::anyhow!("failed to parse config file: {e}"))?,
            None => Self::default_env(),
        };

        if let Some(url) = database_override {
            file.database.url = url.to_string();
        }
        file.expand_env()?;
        file.validate()?;
        Ok(file)
    }

    fn default_env() -> Self {
        Self {
            version: "1".to_string(),
            database: DatabaseConfig {
                url: "${DATABASE_URL}".to_string(),
                max_connections: default_max_connections(),
            },
            logging: LoggingConfig::default(),
        }
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        self.database.url = expand_env_vars(&self.database.url)?;
        self.logging.sql_level = expand_env_vars(&self.logging.sql_level)?;
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }
        if self.database.url.trim().is_empty() {
            anyhow::bail!("database.url must not be empty");
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be at least 1");
        }
        self.logging.level()?;
        Ok(())
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            anyhow::bail!("unterminated env var reference: ${{{after}");
        };
        let key = &after[..end];
        if key.is_empty() {
            anyhow::bail!("invalid env var reference: ${{}}");
        }

        let v = std::env::var(key)
            .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
        out.push_str(&v);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
version = "1"

[database]
url = "postgres://localhost/jobly"
max_connections = 4

[logging]
sql_level = "info"
max_sql_length = 80
"#;

    #[test]
    fn parses_full_file() {
        let file = ConfigFile::from_toml(Some(FULL), None).unwrap();

        assert_eq!(file.database.url, "postgres://localhost/jobly");
        assert_eq!(file.database.max_connections, 4);
        assert_eq!(file.logging.level().unwrap(), Level::INFO);
        assert_eq!(file.logging.max_sql_length, 80);
    }

    #[test]
    fn optional_sections_default() {
        let raw = "version = \"1\"\n[database]\nurl = \"postgres://localhost/jobly\"\n";
        let file = ConfigFile::from_toml(Some(raw), None).unwrap();

        assert_eq!(file.database.max_connections, 16);
        assert_eq!(file.logging.level().unwrap(), Level::DEBUG);
        assert_eq!(file.logging.max_sql_length, 200);
    }

    #[test]
    fn override_replaces_url_before_expansion() {
        let raw = "version = \"1\"\n[database]\nurl = \"${JOBLY_TEST_SURELY_UNSET}\"\n";
        assert!(ConfigFile::from_toml(Some(raw), None).is_err());

        let file = ConfigFile::from_toml(Some(raw), Some("postgres://other/db")).unwrap();
        assert_eq!(file.database.url, "postgres://other/db");
    }

    #[test]
    fn validation_errors() {
        let bad_version = "version = \"2\"\n[database]\nurl = \"postgres://x\"\n";
        let err = ConfigFile::from_toml(Some(bad_version), None).unwrap_err();
        assert!(err.to_string().contains("unsupported config version"));

        let empty_url = "version = \"1\"\n[database]\nurl = \" \"\n";
        assert!(ConfigFile::from_toml(Some(empty_url), None).is_err());

        let zero_pool = "version = \"1\"\n[database]\nurl = \"postgres://x\"\nmax_connections = 0\n";
        assert!(ConfigFile::from_toml(Some(zero_pool), None).is_err());

        let bad_level = "version = \"1\"\n[database]\nurl = \"postgres://x\"\n[logging]\nsql_level = \"loud\"\n";
        assert!(ConfigFile::from_toml(Some(bad_level), None).is_err());

        let unknown_key = "version = \"1\"\n[database]\nurl = \"postgres://x\"\nschemas = []\n";
        assert!(ConfigFile::from_toml(Some(unknown_key), None).is_err());
    }

    #[test]
    fn defaults_take_url_from_override() {
        let file = ConfigFile::from_toml(None, Some("postgres://localhost/jobly")).unwrap();
        assert_eq!(file.version, "1");
        assert_eq!(file.database.url, "postgres://localhost/jobly");
    }

    #[test]
    fn expands_env_references() {
        // SAFETY: this variable is only read by this test.
        unsafe { std::env::set_var("JOBLY_TEST_DB_HOST", "db.internal") };

        assert_eq!(
            expand_env_vars("postgres://${JOBLY_TEST_DB_HOST}:5432/jobly").unwrap(),
            "postgres://db.internal:5432/jobly"
        );
        assert_eq!(expand_env_vars("no refs $HOME").unwrap(), "no refs $HOME");
        assert!(expand_env_vars("${JOBLY_TEST_DB_HOST").is_err());
        assert!(expand_env_vars("${}").is_err());
        assert!(expand_env_vars("${JOBLY_TEST_SURELY_UNSET}").is_err());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let global = GlobalArgs {
            config: Some(PathBuf::from("/nonexistent/jobly.toml")),
            database: Some("postgres://x".to_string()),
        };
        let err = ProjectConfig::resolve(&global).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
