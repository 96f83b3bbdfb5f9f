//! Data types exchanged with ML providers.

pub mod sentiment;
