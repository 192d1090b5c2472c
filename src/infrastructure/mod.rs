//! Infrastructure layer - External service implementations

pub mod agents;
pub mod chain;
pub mod document;
pub mod logging;
pub mod seed;
pub mod services;
pub mod task_runner;
pub mod tenant;
