pub mod dates;
pub mod merge;
pub mod queries;
pub mod types;

pub use queries::*;
pub use types::*;
