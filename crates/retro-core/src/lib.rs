pub mod config;
pub mod error;
pub mod result;

pub use config::{AppConfig, ReconcilePolicy};
pub use error::RetroError;
pub use result::RetroResult;
