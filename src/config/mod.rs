//! Configuration: types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{
    default_config_path, default_db_path, default_log_path, path_has_symlink_ancestor,
};
pub use types::{LogLevel, Settings};
pub use xml::{create_template_config, load_or_init, load_settings_from_path, LoadOutcome};

/// Defaults shared across submodules.
pub const LIBRARY_ROOT_DEFAULT: &str = "/srv/media/library";
/// The stock template: `2023/2023-02-23/IMG_0042.jpg`-shaped paths.
pub const DEFAULT_TEMPLATE: &str = "{{y}}/{{y}}-{{MM}}-{{dd}}/{{filename}}";
/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SHUTTER_MOVE_CONFIG";
