pub mod defaults;
pub mod loader;
pub mod schema;
pub mod types;

pub use loader::load_config;
pub use types::{GlobalMap, GlobalValue, LoadConfigOptions, NewConfig, TemplatePointer};
