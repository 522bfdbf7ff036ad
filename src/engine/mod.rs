//! Engine module: discovery, filtering, dispatch, and the CLI surface.

pub mod arg_parser;
pub mod cli;
pub mod discover;
pub mod executor;
pub mod filter;
pub mod pool;
pub mod progress;
pub mod tools;

// Re-export commonly used items
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use discover::{compile_pattern, discover};
pub use executor::{CommandExecutor, JobExecutor};
pub use filter::{artifact_path_for, plan_jobs};
pub use pool::{DispatchParams, dispatch_jobs};
pub use progress::ProgressTracker;
pub use tools::{ensure_dir, path_relative_to, tmp_sibling};
