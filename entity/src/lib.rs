pub mod call_insights;
pub mod calls;

/// A type alias that represents a call's identifier. Calls are keyed by the
/// identifier of the agent message that anchors their thread, which arrives as
/// text from the source dataset.
pub type Id = String;
