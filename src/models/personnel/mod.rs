pub mod queries;
pub mod rules;
pub mod types;

pub use queries::*;
pub use rules::*;
pub use types::*;
