//! Settings file

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::{Aliases, ConnectionSettings, Executor, Target, TdsConnector};

/// Everything read from `config.toml`.
///
/// ```toml
/// [defaults]
/// server = "DC1Q2PSQLFE1V"
/// database = "QuantDB"
///
/// [connection]
/// port = 1433
/// auth = { method = "sql_server", user = "reporting", password = "..." }
///
/// [aliases.servers]
/// dr = "DC2Q2PSQLFE1V"
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub defaults: Target,
    pub dictionary: Target,
    pub connection: ConnectionSettings,
    pub aliases: Aliases,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            defaults: Target::default_environment(),
            dictionary: Target::dictionary(),
            connection: ConnectionSettings::default(),
            aliases: Aliases::builtin(),
        }
    }
}

impl Settings {
    /// Default settings file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sqlshort").join("config.toml"))
    }

    /// Load from `path`, or from the default location if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid settings in {}", path.display()))
    }

    /// Parse settings; configured aliases extend the built-in ones
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut settings: Settings = toml::from_str(content)?;

        let mut aliases = Aliases::builtin();
        aliases.extend(settings.aliases);
        settings.aliases = aliases;

        Ok(settings)
    }

    /// Executor over real SQL Server connections
    pub fn executor(&self) -> Executor<TdsConnector> {
        Executor::new(TdsConnector::new(self.connection.clone()))
            .with_aliases(self.aliases.clone())
            .with_defaults(self.defaults.clone())
            .with_dictionary(self.dictionary.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Auth;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn test_parse_full() {
        let settings = Settings::from_toml(
            r#"
            [defaults]
            server = "sand"
            database = "loan"

            [connection]
            port = 1450
            auth = { method = "sql_server", user = "reporting", password = "pw" }

            [aliases.servers]
            dr = "DC2Q2PSQLFE1V"

            [aliases.databases]
            loan = "RDM_loan_v2"
            "#,
        )
        .unwrap();

        assert_eq!(settings.defaults, Target::new("sand", "loan"));
        assert_eq!(settings.dictionary, Target::dictionary());
        assert_eq!(settings.connection.port, 1450);
        assert!(settings.connection.trust_cert);
        assert_eq!(
            settings.connection.auth,
            Auth::SqlServer {
                user: "reporting".into(),
                password: "pw".into()
            }
        );
        assert_eq!(settings.aliases.server("dr"), "DC2Q2PSQLFE1V");
        assert_eq!(settings.aliases.server("quant"), "DC1Q2PSQLFE1V");
        assert_eq!(settings.aliases.database("loan"), "RDM_loan_v2");

        // defaults are stored as written and resolved per call
        let executor = settings.executor();
        assert_eq!(
            executor.target(None, None),
            Target::new("vdbedcisandbox", "RDM_loan_v2")
        );
    }

    #[test]
    fn test_integrated_auth_tag() {
        let settings = Settings::from_toml("[connection]\nauth = { method = \"integrated\" }").unwrap();
        assert_eq!(settings.connection.auth, Auth::Integrated);
    }

    #[test]
    fn test_rejects_partial_target() {
        assert!(Settings::from_toml("[defaults]\nserver = \"sand\"").is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Settings::load(Some(Path::new("/nonexistent/sqlshort.toml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read settings"));
    }
}
