pub mod kind;
pub mod queries;
pub mod types;

pub use kind::*;
pub use queries::*;
pub use types::*;
