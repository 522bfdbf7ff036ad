//! Pipeline composition: the end-to-end extraction run.

pub mod orchestrator;

pub use orchestrator::run;
