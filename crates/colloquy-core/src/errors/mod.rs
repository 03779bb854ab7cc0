mod colloquy_error;
mod config_error;
mod delegation_error;
mod import_error;
mod storage_error;

pub use colloquy_error::{ColloquyError, ColloquyResult};
pub use config_error::ConfigError;
pub use delegation_error::DelegationError;
pub use import_error::ProfileImportError;
pub use storage_error::StorageError;
