pub mod context;
pub mod token;
pub mod validate;
