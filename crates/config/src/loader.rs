use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    Error, Result,
    env_subst::substitute_env,
    schema::NurphConfig,
    validate::validate,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["nurph.toml", "nurph.yaml", "nurph.yml", "nurph.json"];

/// Load, env-substitute and validate the config at `path`.
pub fn load_config(path: &Path) -> Result<NurphConfig> {
    let config = read_config(path)?;

    let result = validate(&config);
    for diagnostic in &result.diagnostics {
        warn!(path = %path.display(), "{diagnostic}");
    }
    if result.has_errors() {
        return Err(Error::Invalid {
            summary: result.summary(),
        });
    }
    Ok(config)
}

/// Read and env-substitute the config at `path` without validating it.
pub fn read_config(path: &Path) -> Result<NurphConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&substitute_env(&raw), path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./nurph.{toml,yaml,yml,json}` (project-local)
/// 2. `<user config dir>/nurph/nurph.{toml,yaml,yml,json}`
///
/// Returns `NurphConfig::default()` if no file is found or it fails to load.
pub fn discover_and_load() -> NurphConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    NurphConfig::default()
}

/// The first config file in the standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    find_config_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_config_in(&dir)))
}

fn find_config_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "nurph")
}

/// User-global config directory (`~/.config/nurph/` on Linux).
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// User data directory (`~/.local/share/nurph/` on Linux).
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.data_dir().to_path_buf())
}

/// SQLite URL used when `brain.database_url` is not set.
pub fn default_database_url() -> String {
    let dir = data_dir().unwrap_or_else(|| PathBuf::from("."));
    format!("sqlite://{}", dir.join("nurph.db").display())
}

pub(crate) fn parse_config(raw: &str, path: &Path) -> Result<NurphConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "yaml" | "yml" => {
            // An empty YAML document is `null`, not an empty map.
            if raw.trim().is_empty() {
                return Ok(NurphConfig::default());
            }
            serde_yaml::from_str(raw).map_err(|e| Error::parse(path, e))
        },
        "json" => serde_json::from_str(raw).map_err(|e| Error::parse(path, e)),
        _ => Err(Error::UnsupportedFormat {
            ext: ext.to_string(),
        }),
    }
}
