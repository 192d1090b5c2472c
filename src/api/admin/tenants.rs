//! Tenant setup admin endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{AgentKind, DocSumConfig, EmailAgentConfig, SfdcConfig, Tenant};
use crate::infrastructure::services::SetupTenantRequest;

/// Request to set up a tenant
#[derive(Debug, Clone, Deserialize)]
pub struct SetupTenantApiRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<EmailAgentConfig>,
    #[serde(default)]
    pub sfdc: Option<SfdcConfig>,
    #[serde(default)]
    pub doc_sum: Option<DocSumConfig>,
}

impl SetupTenantApiRequest {
    fn configured_agents(&self) -> Vec<AgentKind> {
        let mut agents = Vec::new();
        if self.doc_sum.is_some() {
            agents.push(AgentKind::DocSum);
        }
        if self.sfdc.is_some() {
            agents.push(AgentKind::Sfdc);
        }
        if self.email.is_some() {
            agents.push(AgentKind::Email);
        }
        agents
    }
}

impl From<SetupTenantApiRequest> for SetupTenantRequest {
    fn from(request: SetupTenantApiRequest) -> Self {
        Self {
            id: request.id,
            name: request.name,
            email: request.email,
            sfdc: request.sfdc,
            doc_sum: request.doc_sum,
        }
    }
}

/// Tenant response; agent credentials are never echoed back
#[derive(Debug, Clone, Serialize)]
pub struct TenantResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub configured_agents: Vec<AgentKind>,
    pub created_at: String,
}

impl From<&Tenant> for TenantResponse {
    fn from(tenant: &Tenant) -> Self {
        Self {
            id: tenant.id().as_str().to_string(),
            name: tenant.name().to_string(),
            configured_agents: Vec::new(),
            created_at: tenant.created_at().to_rfc3339(),
        }
    }
}

/// POST /api/v1/admin/tenants
pub async fn setup_tenant(
    State(state): State<AppState>,
    Json(request): Json<SetupTenantApiRequest>,
) -> Result<(StatusCode, Json<TenantResponse>), ApiError> {
    debug!(tenant_id = %request.id, "Admin setting up tenant");

    let configured_agents = request.configured_agents();
    let tenant = state
        .tenant_service
        .setup_tenant(request.into())
        .await
        .map_err(ApiError::from)?;

    let mut response = TenantResponse::from(&tenant);
    response.configured_agents = configured_agents;

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/admin/tenants/{tenant_id}
pub async fn get_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<TenantResponse>, ApiError> {
    let tenant = state
        .tenant_service
        .get(&tenant_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Tenant '{}' not found", tenant_id)))?;

    Ok(Json(TenantResponse::from(&tenant)))
}
