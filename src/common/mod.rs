pub mod error;
pub mod result;

pub use error::GctlError;
pub use result::{GctlResult, OptionExt};
