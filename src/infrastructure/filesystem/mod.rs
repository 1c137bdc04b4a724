pub mod config_store;
pub mod discovery;
pub mod discovery_cache;

pub use config_store::{CacheConfig, ConfigStore, ToolConfig};
pub use discovery::discover_child_paths;
pub use discovery_cache::DiscoveryCache;
