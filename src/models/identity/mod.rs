pub mod queries;
pub mod sync;
pub mod types;

pub use queries::*;
pub use types::*;
