//! Configuration loading, env substitution and validation.
//!
//! Config files: `nurph.toml`, `nurph.yaml`, `nurph.yml` or `nurph.json`,
//! searched in `./` then the user config dir (`~/.config/nurph/` on Linux).
//!
//! `${ENV_VAR}` and `${ENV_VAR:-default}` are substituted before parsing, so
//! credentials can stay in the environment (or `./envfile`).

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{
        config_dir, data_dir, default_database_url, discover_and_load, find_config_file,
        load_config, read_config,
    },
    schema::{
        AdaptersConfig, BotConfig, BrainBackend, BrainConfig, NurphConfig, ServerConfig,
        WritePolicyKind,
    },
    validate::{Diagnostic, Severity, ValidationResult},
};
