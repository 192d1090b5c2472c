//! Application state for shared services

use std::sync::Arc;

use crate::domain::AgentInvoker;
use crate::infrastructure::services::{ChainService, DocumentService, TenantService};

/// Handles shared by every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub chain_service: Arc<ChainService>,
    pub tenant_service: Arc<TenantService>,
    pub document_service: Arc<DocumentService>,
    pub invoker: AgentInvoker,
}

impl AppState {
    pub fn new(
        chain_service: Arc<ChainService>,
        tenant_service: Arc<TenantService>,
        document_service: Arc<DocumentService>,
        invoker: AgentInvoker,
    ) -> Self {
        Self {
            chain_service,
            tenant_service,
            document_service,
            invoker,
        }
    }
}
