pub mod cli;
pub mod engine;
pub mod errors;
pub mod ops;
pub mod types;

// Re-export main types
pub use engine::{run, run_with_fallback, Interrupt, Proxies};
pub use errors::{OpError, RunError};
pub use ops::{op, OpSpec, Recovery, TrackedOp};
pub use types::{OpId, OpRecord, Status};
