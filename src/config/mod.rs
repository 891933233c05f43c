mod config;

pub use self::config::{ChainSettings, RefreshSettings, Settings, StoreBackend, StoreSettings};
