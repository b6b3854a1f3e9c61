use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides, e.g. `RAZED__PERSISTENCE__MAX_ATTEMPTS`.
pub const ENV_PREFIX: &str = "RAZED";
/// Base name looked up when no explicit path is given (`razed.toml`, `razed.json`, ...).
pub const DEFAULT_CONFIG: &str = "razed";

#[razed_derive::razed_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Layered configuration loader: a base file overlaid with environment variables.
///
/// 1. **Base file**: `path` when given (must exist), otherwise the optional `razed` file in the
///    working directory. The format follows the file extension.
/// 2. **Environment**: variables prefixed with `RAZED__`; nested keys use double underscores
///    (`RAZED__CATALOG__STRICT=true` maps to `catalog.strict`).
///
/// # Errors
/// * An explicit `path` that does not exist.
/// * Content or overrides that do not match the structure of `T`.
///
/// # Example
/// ```rust
/// use razed_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct Settings {
///     strict: bool,
/// }
///
/// let cfg: Settings = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let required = path.is_some();
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG), |p| p.as_ref().to_path_buf());

    info!(path = %effective_path.display(), required, "Loading config");
    layered(&effective_path, required, env_overrides())
}

fn env_overrides() -> Environment {
    Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__").try_parsing(true)
}

fn layered<T>(path: &Path, required: bool, env: Environment) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let builder = Config::builder().add_source(File::from(path).required(required)).add_source(env);

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use razed_domain::config::AppConfig;
    use std::io::Write;

    #[test]
    fn file_values_are_loaded() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[catalog]\npath = \"tomes.json\"\nstrict = true").unwrap();

        let cfg: AppConfig = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.catalog.path, PathBuf::from("tomes.json"));
        assert!(cfg.catalog.strict);
        assert_eq!(cfg.persistence.max_attempts, 5);
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[persistence]\nmax_attempts = 3\ninitial_backoff_ms = 20").unwrap();

        let vars = config::Map::from([
            ("RAZED__PERSISTENCE__MAX_ATTEMPTS".to_owned(), "9".to_owned()),
            ("OTHER__PERSISTENCE__MAX_BACKOFF_MS".to_owned(), "1".to_owned()),
        ]);
        let cfg: AppConfig =
            layered(file.path(), true, env_overrides().source(Some(vars))).unwrap();

        assert_eq!(cfg.persistence.max_attempts, 9);
        assert_eq!(cfg.persistence.initial_backoff_ms, 20);
        assert_eq!(cfg.persistence.max_backoff_ms, 5_000);
    }

    #[test]
    fn default_file_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let cfg: AppConfig = layered(&dir.path().join("razed"), false, env_overrides()).unwrap();
        assert_eq!(cfg.characters.default_starting_credits, 100);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        let err = load_config::<AppConfig>(Some(&missing)).unwrap_err();
        assert!(err.to_string().starts_with("Config error (Failed to build config)"));
    }
}
