//! Task runner implementations

mod local;

pub use local::{LocalTaskRunner, TaskRunnerConfig};
