//! Tenant domain module
//!
//! Tenants own chains and hold one configuration per agent kind.

mod config;
mod entity;
mod repository;

pub use config::{DocSumConfig, EmailAgentConfig, SfdcConfig};
pub use entity::{Tenant, TenantId};
pub use repository::TenantConfigRepository;
