pub mod resolve;
pub mod types;

pub use resolve::{
    config_search_paths, load_config_file, resolve_config, resolve_config_from, ConfigSource,
    CONFIG_ENV,
};
pub use types::{ModelParameters, PromptLabConfig};
