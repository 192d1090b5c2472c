//! Chain infrastructure implementations

mod in_memory_repository;
mod runner_impl;

pub use in_memory_repository::InMemoryChainRepository;
pub use runner_impl::ChainRunnerImpl;
