pub use entity::{call_insights, calls, Id};

pub mod call;
pub mod call_insight;
pub mod error;
