pub mod candidate;
pub mod stats;
