pub mod config;
pub mod garage;
pub mod loader;

pub use config::{Config, ConfigError, CryptoConfig, StoreConfig};
pub use garage::Garage;
pub use loader::{LoadError, VehicleSource};
