pub mod storage_config;

pub use storage_config::StorageConfig;
