//! Chain authoring and execution endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{ChainDefinition, ChainId, ChainRunResult, StepDefinition, TenantId};
use crate::infrastructure::services::CreateChainRequest;

/// Request to create a chain
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChainApiRequest {
    pub tenant_id: String,
    #[serde(default)]
    pub chain_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

/// Chain response with steps in execution order
#[derive(Debug, Clone, Serialize)]
pub struct ChainResponse {
    pub tenant_id: String,
    pub chain_id: String,
    pub name: String,
    pub steps: Vec<StepDefinition>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&ChainDefinition> for ChainResponse {
    fn from(chain: &ChainDefinition) -> Self {
        Self {
            tenant_id: chain.tenant_id().to_string(),
            chain_id: chain.id().to_string(),
            name: chain.name().to_string(),
            steps: chain.ordered_steps().into_iter().cloned().collect(),
            created_at: chain.created_at().to_rfc3339(),
            updated_at: chain.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListChainsResponse {
    pub chains: Vec<ChainResponse>,
    pub total: usize,
}

/// Request to run a stored chain
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteChainRequest {
    pub tenant_id: String,
    pub chain_id: String,
    /// Initial execution context; must be a JSON object when present
    #[serde(default)]
    pub input: Value,
}

/// POST /api/v1/chains
pub async fn create_chain(
    State(state): State<AppState>,
    Json(request): Json<CreateChainApiRequest>,
) -> Result<(StatusCode, Json<ChainResponse>), ApiError> {
    debug!(tenant_id = %request.tenant_id, name = %request.name, "Creating chain");

    let create_request = CreateChainRequest {
        tenant_id: request.tenant_id,
        chain_id: request.chain_id,
        name: request.name,
        steps: request.steps,
    };

    let chain = state
        .chain_service
        .create(create_request)
        .await
        .map_err(ApiError::from)?;

    info!(
        tenant_id = %chain.tenant_id(),
        chain_id = %chain.id(),
        steps = chain.steps().len(),
        "Chain created"
    );

    Ok((StatusCode::CREATED, Json(ChainResponse::from(&chain))))
}

/// GET /api/v1/chains/{tenant_id}
pub async fn list_chains(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<ListChainsResponse>, ApiError> {
    let chains = state
        .chain_service
        .list(&tenant_id)
        .await
        .map_err(ApiError::from)?;

    let chains: Vec<ChainResponse> = chains.iter().map(ChainResponse::from).collect();
    let total = chains.len();

    Ok(Json(ListChainsResponse { chains, total }))
}

/// GET /api/v1/chains/{tenant_id}/{chain_id}
pub async fn get_chain(
    State(state): State<AppState>,
    Path((tenant_id, chain_id)): Path<(String, String)>,
) -> Result<Json<ChainResponse>, ApiError> {
    let chain = state
        .chain_service
        .get(&tenant_id, &chain_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| not_found(&tenant_id, &chain_id))?;

    Ok(Json(ChainResponse::from(&chain)))
}

/// DELETE /api/v1/chains/{tenant_id}/{chain_id}
pub async fn delete_chain(
    State(state): State<AppState>,
    Path((tenant_id, chain_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .chain_service
        .delete(&tenant_id, &chain_id)
        .await
        .map_err(ApiError::from)?;

    if deleted {
        info!(tenant_id = %tenant_id, chain_id = %chain_id, "Chain deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&tenant_id, &chain_id))
    }
}

/// POST /api/v1/chains/execute
pub async fn execute_chain(
    State(state): State<AppState>,
    Json(request): Json<ExecuteChainRequest>,
) -> Result<Json<ChainRunResult>, ApiError> {
    let tenant_id = TenantId::new(request.tenant_id).map_err(ApiError::from)?;
    let chain_id = ChainId::new(request.chain_id).map_err(ApiError::from)?;
    let input = input_object(request.input)?;

    debug!(
        tenant_id = %tenant_id,
        chain_id = %chain_id,
        input_keys = input.len(),
        "Executing chain"
    );

    let result = state
        .chain_service
        .execute(&tenant_id, &chain_id, input)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(result))
}

fn input_object(input: Value) -> Result<Map<String, Value>, ApiError> {
    match input {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::bad_request("Chain input must be a JSON object")
            .with_code("validation_error")
            .with_param("input")),
    }
}

fn not_found(tenant_id: &str, chain_id: &str) -> ApiError {
    ApiError::not_found(format!(
        "Chain '{}' not found for tenant '{}'",
        chain_id, tenant_id
    ))
    .with_code("chain_not_found")
}
