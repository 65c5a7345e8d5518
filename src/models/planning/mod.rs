pub mod queries;
pub mod status;
pub mod types;

pub use queries::*;
pub use status::*;
pub use types::*;
