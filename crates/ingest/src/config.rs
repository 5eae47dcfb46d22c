use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use ingest_store::{ExtractOptions, StoreOptions};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "ingest.toml";
pub const ENV_PREFIX: &str = "INGEST_";
pub const DEFAULT_LOG_FILTER: &str =
    "ingest=info,ingest_store=info,ingest_archive=info,tower_http=info";

/// Service configuration.
///
/// Layered as defaults, then the TOML file, then `INGEST_*` variables.
/// Nested keys use a double underscore: `INGEST_LIMITS__MAX_ENTRIES=1000`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage_root: PathBuf,
    pub staging_dir: Option<PathBuf>,
    pub bind: String,
    pub log_filter: String,
    /// Request body limit for uploads; unbounded when unset.
    pub max_upload_bytes: Option<usize>,
    pub limits: ExtractOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("projects"),
            staging_dir: None,
            bind: "0.0.0.0:8000".to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            max_upload_bytes: None,
            limits: ExtractOptions::default(),
        }
    }
}

impl Config {
    pub fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load from `file` and the environment. A missing file is skipped; a
    /// relative one is also looked up in parent directories.
    pub fn load(file: &Path) -> Result<Self, figment::Error> {
        Self::figment(file).extract()
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            staging_dir: self.staging_dir.clone(),
            extract: self.limits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_file_or_env() {
        Jail::expect_with(|_jail| {
            let config = Config::load(Path::new(DEFAULT_CONFIG_FILE))?;
            assert_eq!(config, Config::default());
            assert_eq!(config.storage_root, Path::new("projects"));
            assert_eq!(config.bind, "0.0.0.0:8000");
            Ok(())
        });
    }

    #[test]
    fn file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                storage_root = "/srv/projects"
                bind = "127.0.0.1:9000"
                max_upload_bytes = 1048576

                [limits]
                max_entries = 500
                "#,
            )?;
            jail.set_env("INGEST_BIND", "127.0.0.1:9100");
            jail.set_env("INGEST_LIMITS__MAX_TOTAL_BYTES", "4096");

            let config = Config::load(Path::new(DEFAULT_CONFIG_FILE))?;

            assert_eq!(config.storage_root, Path::new("/srv/projects"));
            assert_eq!(config.bind, "127.0.0.1:9100");
            assert_eq!(config.max_upload_bytes, Some(1_048_576));
            assert_eq!(config.limits.max_entries, Some(500));
            assert_eq!(config.limits.max_total_bytes, Some(4096));
            assert_eq!(config.limits.max_archives, None);
            Ok(())
        });
    }

    #[test]
    fn bad_value_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "max_upload_bytes = \"lots\"")?;
            assert!(Config::load(Path::new(DEFAULT_CONFIG_FILE)).is_err());
            Ok(())
        });
    }

    #[test]
    fn store_options_carry_limits() {
        let config = Config {
            staging_dir: Some(PathBuf::from("/tmp/staging")),
            limits: ExtractOptions::default().max_archives(3),
            ..Config::default()
        };
        let options = config.store_options();
        assert_eq!(options.staging_dir.as_deref(), Some(Path::new("/tmp/staging")));
        assert_eq!(options.extract.max_archives, Some(3));
    }
}
