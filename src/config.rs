//! Runtime configuration loaded from `MONTESUIVI_*` environment variables.

use std::path::PathBuf;

/// Default API base URL used by the CLI client.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1";

/// Application configuration.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    /// Path prefix the whole router is mounted under (from MONTESUIVI_BASENAME).
    /// Empty means the root.
    pub basename: String,
    /// Allowed CORS origins (from MONTESUIVI_CORS_ORIGINS, comma-separated).
    /// `None` means permissive CORS.
    pub cors_origins: Option<Vec<String>>,
    /// SQLite file (from MONTESUIVI_DATABASE). Falls back to the platform data dir.
    pub database_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let basename = std::env::var("MONTESUIVI_BASENAME")
            .map(|s| normalize_basename(&s))
            .unwrap_or_default();

        let cors_origins = std::env::var("MONTESUIVI_CORS_ORIGINS")
            .ok()
            .and_then(|s| parse_origins(&s));

        let database_path = std::env::var("MONTESUIVI_DATABASE").ok().map(PathBuf::from);

        Self {
            basename,
            cors_origins,
            database_path,
        }
    }

    /// Mount the router under `basename` instead of the root.
    pub fn with_basename(mut self, basename: &str) -> Self {
        self.basename = normalize_basename(basename);
        self
    }

    /// Restrict CORS to the given origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }
}

/// Base URL of a running server, for the CLI client (from MONTESUIVI_URL).
pub fn api_url_from_env() -> String {
    std::env::var("MONTESUIVI_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Turn `"app/"`, `"/app"` or `"/app/"` into `"/app"`, and `"/"` into `""`.
fn normalize_basename(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

fn parse_origins(raw: &str) -> Option<Vec<String>> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if origins.is_empty() {
        None
    } else {
        Some(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_is_normalized() {
        assert_eq!(normalize_basename(""), "");
        assert_eq!(normalize_basename("/"), "");
        assert_eq!(normalize_basename("suivi"), "/suivi");
        assert_eq!(normalize_basename("/suivi/"), "/suivi");
        assert_eq!(normalize_basename(" /a/b/ "), "/a/b");
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test ,"),
            Some(vec!["http://a.test".to_string(), "http://b.test".to_string()])
        );
        assert_eq!(parse_origins(" , "), None);
    }

    #[test]
    fn default_config_is_root_and_permissive() {
        let config = AppConfig::default();
        assert!(config.basename.is_empty());
        assert!(config.cors_origins.is_none());
        assert!(config.database_path.is_none());
    }

    #[test]
    fn builders_override_fields() {
        let config = AppConfig::default()
            .with_basename("montesuivi/")
            .with_cors_origins(vec!["http://localhost:5173".to_string()])
            .with_database_path("/tmp/montesuivi.db");
        assert_eq!(config.basename, "/montesuivi");
        assert_eq!(config.cors_origins.unwrap().len(), 1);
        assert_eq!(
            config.database_path,
            Some(PathBuf::from("/tmp/montesuivi.db"))
        );
    }
}
