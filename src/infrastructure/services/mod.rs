//! Infrastructure services

mod chain_service;
mod document_service;
mod tenant_service;

pub use chain_service::{ChainService, CreateChainRequest};
pub use document_service::DocumentService;
pub use tenant_service::{SetupTenantRequest, TenantService};
