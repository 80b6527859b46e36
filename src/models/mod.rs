pub mod accelerator;
pub mod config;

pub use accelerator::Device;
pub use config::{AppConfig, DType, DevicePreference, GenerationConfig, DEFAULT_SIZE};
