pub mod allocation;
pub mod error;
pub mod scenarios;
pub mod types;

pub use error::WaterfallError;
pub use types::*;

/// Standard result type for all waterfall operations
pub type WaterfallResult<T> = Result<T, WaterfallError>;
