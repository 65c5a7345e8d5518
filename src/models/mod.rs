pub mod identity;
pub mod personnel;
pub mod planning;
pub mod requirement;
pub mod shortlist;
pub mod survey;
pub mod vendor;
