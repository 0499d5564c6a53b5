//! Layered application configuration.
//!
//! Precedence, lowest to highest: built-in defaults, the YAML file, then
//! `PETCARE__`-prefixed environment variables (`PETCARE__SERVER__PORT=9;`
//! the `__` separator maps onto section nesting). Global sections are
//! strongly typed; everything under `modules:` stays an opaque value bag
//! until a module asks for its slice via [`AppConfig::module_config`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::paths::resolve_home_dir;

/// Subdirectory used when `server.home_dir` is left empty: `~/.petcare`
/// on Unix, `%APPDATA%\.petcare` on Windows.
const HOME_SUBDIR: &str = ".petcare";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Absent means the binary decides whether it can run without one.
    pub database: Option<DatabaseConfig>,
    /// Absent falls back to [`default_logging_config`].
    pub logging: Option<LoggingConfig>,
    /// Directory of standalone per-module YAML files; each file lands in
    /// `modules` under its stem.
    #[serde(default)]
    pub modules_dir: Option<String>,
    /// Raw per-module settings, keyed by module name.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Working directory for logs and the SQLite file. Loading resolves
    /// it to an absolute path and creates it.
    pub home_dir: String,
    pub host: String,
    pub port: u16,
    /// Request timeout in seconds; 0 lets the server pick its default.
    #[serde(default)]
    pub timeout_sec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            timeout_sec: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `sqlite://...` or `postgres://...`.
    pub url: String,
    pub max_conns: Option<u32>,
    /// SQLite only; ignored by other engines.
    pub busy_timeout_ms: Option<u32>,
}

/// Per-target logging sections; the `default` key catches everything a
/// named section does not claim.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    /// `trace`/`debug`/`info`/`warn`/`error`/`off`.
    pub console_level: String,
    /// Log file path, relative paths land under `home_dir`.
    pub file: String,
    /// Empty reuses `console_level` for the file sink.
    #[serde(default)]
    pub file_level: String,
    pub max_age_days: Option<u32>,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

pub fn default_logging_config() -> LoggingConfig {
    HashMap::from([(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/petcare.log".to_string(),
            file_level: "debug".to_string(),
            max_age_days: Some(7),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    )])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: Some(DatabaseConfig {
                url: "sqlite://database/petcare.db".to_string(),
                max_conns: Some(10),
                busy_timeout_ms: Some(5000),
            }),
            logging: Some(default_logging_config()),
            modules_dir: None,
            modules: HashMap::new(),
        }
    }
}

/// Flags the binary forwards into the config layer.
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
}

impl AppConfig {
    /// The layering base: required sections at their defaults, optional
    /// sections empty so only the file or the environment can fill them.
    fn empty() -> Self {
        Self {
            server: ServerConfig::default(),
            database: None,
            logging: None,
            modules_dir: None,
            modules: HashMap::new(),
        }
    }

    /// Load and merge defaults, the given YAML file and the environment,
    /// then resolve `home_dir` and pull in `modules_dir` files.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let mut config: AppConfig = Figment::new()
            .merge(Serialized::defaults(Self::empty()))
            .merge(Yaml::file(config_path.as_ref()))
            .merge(Env::prefixed("PETCARE__").split("__"))
            .extract()
            .context("failed to assemble configuration")?;

        config.settle_home_dir()?;
        if let Some(dir) = config.modules_dir.clone() {
            read_module_dir(&mut config.modules, Path::new(&dir))
                .with_context(|| format!("failed to read modules_dir '{dir}'"))?;
        }
        Ok(config)
    }

    /// No file given: plain defaults, still with a resolved `home_dir`.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut config = Self::default();
                config.settle_home_dir()?;
                Ok(config)
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to render configuration as YAML")
    }

    /// Typed view of one `modules` entry; a missing entry is the module's
    /// `Default`, a present-but-wrong one is an error.
    pub fn module_config<T>(&self, name: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        match self.modules.get(name) {
            Some(value) => serde_json::from_value(value.clone())
                .with_context(|| format!("invalid configuration for module '{name}'")),
            None => Ok(T::default()),
        }
    }

    /// `--port` wins over the file; `-v`/`-vv` raise the default console
    /// section to debug/trace without touching named sections.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if args.verbose > 0 {
            let level = if args.verbose == 1 { "debug" } else { "trace" };
            self.logging
                .get_or_insert_with(default_logging_config)
                .entry("default".to_string())
                .and_modify(|s| s.console_level = level.to_string());
        }
    }

    fn settle_home_dir(&mut self) -> Result<()> {
        let configured = match self.server.home_dir.trim() {
            "" => None,
            dir => Some(dir.to_string()),
        };
        let resolved = resolve_home_dir(configured, HOME_SUBDIR, true)
            .context("failed to resolve server.home_dir")?;
        self.server.home_dir = resolved.to_string_lossy().to_string();
        Ok(())
    }
}

/// Read every `*.yml`/`*.yaml` in `dir` into the bag under its file stem.
/// Entries already present (from the main file) are overwritten.
fn read_module_dir(bag: &mut HashMap<String, serde_json::Value>, dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_yaml = path.is_file()
            && matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yml") | Some("yaml")
            );
        if !is_yaml {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let parsed: serde_yaml::Value = serde_yaml::from_str(&std::fs::read_to_string(&path)?)
            .with_context(|| format!("invalid YAML in {}", path.display()))?;
        bag.insert(name.to_string(), serde_json::to_value(parsed)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::{env, fs};
    use tempfile::tempdir;

    // PETCARE__ variables are process-global; the tests that set one and
    // the tests whose assertions it would disturb share this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn write_yaml(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_carry_a_database_and_logging() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.home_dir, "");
        assert_eq!(
            config.database.as_ref().map(|d| d.url.as_str()),
            Some("sqlite://database/petcare.db")
        );
        assert_eq!(config.logging.as_ref().unwrap()["default"].console_level, "info");
        assert!(config.modules.is_empty());
    }

    #[test]
    fn file_values_land_and_home_dir_resolves() {
        let _env = ENV_LOCK.lock().unwrap();
        let tmp = tempdir().unwrap();
        let path = write_yaml(
            tmp.path(),
            "cfg.yaml",
            r#"
server:
  home_dir: "~/.petcare-cfg-test"
  host: "0.0.0.0"
  port: 9090
  timeout_sec: 45
database:
  url: "postgres://petcare:secret@db/petcare"
  max_conns: 20
logging:
  default:
    console_level: warn
    file: "logs/server.log"
"#,
        );

        let config = AppConfig::load_layered(&path).unwrap();
        let home = PathBuf::from(&config.server.home_dir);
        assert!(home.is_absolute());
        assert!(config.server.home_dir.ends_with(".petcare-cfg-test"));
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.timeout_sec, 45);

        let db = config.database.as_ref().unwrap();
        assert_eq!(db.url, "postgres://petcare:secret@db/petcare");
        assert_eq!(db.max_conns, Some(20));
        assert_eq!(db.busy_timeout_ms, None);
        assert_eq!(config.logging.as_ref().unwrap()["default"].console_level, "warn");
    }

    #[test]
    fn sections_missing_from_the_file_stay_empty() {
        let tmp = tempdir().unwrap();
        let path = write_yaml(
            tmp.path(),
            "cfg.yaml",
            r#"
server:
  home_dir: "~/.petcare-minimal-test"
  host: "localhost"
  port: 8081
"#,
        );

        let config = AppConfig::load_layered(&path).unwrap();
        assert!(config.database.is_none());
        assert!(config.logging.is_none());
        assert!(config.modules.is_empty());
        assert_eq!(config.server.timeout_sec, 0);
    }

    #[test]
    fn environment_beats_the_file() {
        let _env = ENV_LOCK.lock().unwrap();
        let tmp = tempdir().unwrap();
        let path = write_yaml(
            tmp.path(),
            "cfg.yaml",
            r#"
server:
  home_dir: "~/.petcare-env-test"
  host: "127.0.0.1"
  port: 8080
"#,
        );

        env::set_var("PETCARE__SERVER__PORT", "19099");
        let config = AppConfig::load_layered(&path);
        env::remove_var("PETCARE__SERVER__PORT");

        assert_eq!(config.unwrap().server.port, 19099);
    }

    #[test]
    fn load_without_a_file_resolves_the_platform_home() {
        let tmp = tempdir().unwrap();
        #[cfg(target_os = "windows")]
        env::set_var("APPDATA", tmp.path());
        #[cfg(not(target_os = "windows"))]
        env::set_var("HOME", tmp.path());

        let config = AppConfig::load_or_default(None::<&str>).unwrap();
        assert!(PathBuf::from(&config.server.home_dir).is_absolute());
        assert!(config.server.home_dir.ends_with(HOME_SUBDIR));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn port_and_verbosity_overrides_apply() {
        let mut config = AppConfig::default();
        config.apply_cli_overrides(&CliArgs {
            config: None,
            port: Some(3000),
            print_config: false,
            verbose: 0,
        });
        assert_eq!(config.server.port, 3000);
        // verbose 0 leaves the configured level alone
        assert_eq!(config.logging.as_ref().unwrap()["default"].console_level, "info");

        for (verbose, level) in [(1, "debug"), (2, "trace"), (5, "trace")] {
            let mut config = AppConfig::default();
            config.apply_cli_overrides(&CliArgs {
                config: None,
                port: None,
                print_config: false,
                verbose,
            });
            assert_eq!(
                config.logging.as_ref().unwrap()["default"].console_level,
                level,
                "verbose={verbose}"
            );
        }
    }

    #[test]
    fn module_dir_files_join_the_bag() {
        let tmp = tempdir().unwrap();
        let modules_dir = tmp.path().join("conf.d");
        fs::create_dir_all(&modules_dir).unwrap();
        write_yaml(&modules_dir, "payments.yaml", "paypal:\n  client_id: abc\n");
        write_yaml(&modules_dir, "notes.txt", "not yaml, skipped");

        let yaml = format!(
            r#"
server:
  home_dir: "~/.petcare-moddir-test"
  host: "127.0.0.1"
  port: 8080
modules_dir: "{}"
modules:
  auth:
    max_failed_logins: 3
"#,
            modules_dir.to_string_lossy().replace('\\', "/")
        );
        let path = write_yaml(tmp.path(), "cfg.yaml", &yaml);

        let config = AppConfig::load_layered(&path).unwrap();
        assert_eq!(config.modules["auth"]["max_failed_logins"], 3);
        assert_eq!(config.modules["payments"]["paypal"]["client_id"], "abc");
        assert!(!config.modules.contains_key("notes"));
    }

    #[test]
    fn module_config_extracts_typed_or_defaults() {
        #[derive(Debug, Default, Deserialize, PartialEq)]
        #[serde(default)]
        struct Slice {
            enabled: bool,
            limit: u32,
        }

        let mut config = AppConfig::default();
        config.modules.insert(
            "demo".to_string(),
            serde_json::json!({ "enabled": true, "limit": 7 }),
        );

        let present: Slice = config.module_config("demo").unwrap();
        assert_eq!(
            present,
            Slice {
                enabled: true,
                limit: 7
            }
        );
        let absent: Slice = config.module_config("nope").unwrap();
        assert_eq!(absent, Slice::default());
    }

    #[test]
    fn yaml_rendering_round_trips() {
        let config = AppConfig::default();
        let yaml = config.to_yaml().unwrap();
        let back: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.server.port, config.server.port);
        assert_eq!(
            back.database.map(|d| d.url),
            config.database.map(|d| d.url)
        );
    }

    #[test]
    fn unknown_and_missing_fields_are_rejected() {
        // deny_unknown_fields
        assert!(serde_yaml::from_str::<AppConfig>(
            "server:\n  home_dir: \"\"\n  host: x\n  port: 1\n  surprise: true\n"
        )
        .is_err());
        // host is required
        assert!(
            serde_yaml::from_str::<AppConfig>("server:\n  home_dir: \"\"\n  port: 1\n").is_err()
        );
    }
}
