//! Direct one-shot agent dispatch
//!
//! Each endpoint validates the payload, submits it to the task runner and
//! returns at once with the task id. Progress is read from `/tasks/{task_id}`.

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{AgentKind, AgentPayload, EmailParams, TenantId};

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeDocumentRequest {
    pub tenant_id: String,
    pub document_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLeadRequest {
    pub tenant_id: String,
    pub lead_data: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailRequest {
    pub tenant_id: String,
    #[serde(flatten)]
    pub params: EmailParams,
}

/// 202 body for a dispatched task
#[derive(Debug, Clone, Serialize)]
pub struct TaskAccepted {
    pub task_id: Uuid,
    pub agent: AgentKind,
    pub status: &'static str,
}

/// POST /api/v1/agents/summarize_document
pub async fn summarize_document(
    State(state): State<AppState>,
    Json(request): Json<SummarizeDocumentRequest>,
) -> Result<(StatusCode, Json<TaskAccepted>), ApiError> {
    let payload = AgentPayload::DocSum {
        document_text: request.document_text,
    };
    dispatch(&state, &request.tenant_id, payload).await
}

/// POST /api/v1/agents/create_lead
pub async fn create_lead(
    State(state): State<AppState>,
    Json(request): Json<CreateLeadRequest>,
) -> Result<(StatusCode, Json<TaskAccepted>), ApiError> {
    let payload = AgentPayload::Sfdc {
        lead_data: request.lead_data,
    };
    dispatch(&state, &request.tenant_id, payload).await
}

/// POST /api/v1/agents/send_email
pub async fn send_email(
    State(state): State<AppState>,
    Json(request): Json<SendEmailRequest>,
) -> Result<(StatusCode, Json<TaskAccepted>), ApiError> {
    dispatch(&state, &request.tenant_id, AgentPayload::Email(request.params)).await
}

async fn dispatch(
    state: &AppState,
    tenant_id: &str,
    payload: AgentPayload,
) -> Result<(StatusCode, Json<TaskAccepted>), ApiError> {
    let tenant = state
        .tenant_service
        .get(tenant_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Tenant '{}' not found", tenant_id)))?;
    let tenant_id: &TenantId = tenant.id();

    let agent = payload.kind();
    let task_id = state
        .invoker
        .dispatch(tenant_id, payload)
        .await
        .map_err(ApiError::from)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(TaskAccepted {
            task_id,
            agent,
            status: "pending",
        }),
    ))
}

#[cfg(test)]
mod tests {
    use crate::api::create_router;
    use crate::api::state::test_support::{body_json, json_request, state_with};
    use crate::domain::agent::mock::ScriptedTaskRunner;
    use crate::domain::{AgentKind, AgentPayload};
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_summarize_document_is_accepted() {
        let runner = Arc::new(ScriptedTaskRunner::new());
        let app = create_router(state_with(runner.clone()).await);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/agents/summarize_document",
                json!({"tenant_id": "acme", "document_text": "Quarterly report"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = body_json(response).await;
        assert_eq!(body["agent"], "doc_sum");
        assert_eq!(body["status"], "pending");
        assert!(body["task_id"].is_string());
        assert_eq!(runner.submitted_kinds(), vec![AgentKind::DocSum]);
    }

    #[tokio::test]
    async fn test_send_email_flattens_params() {
        let runner = Arc::new(ScriptedTaskRunner::new());
        let app = create_router(state_with(runner.clone()).await);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/agents/send_email",
                json!({
                    "tenant_id": "acme",
                    "recipient": "ops@acme.com",
                    "subject": "Hello",
                    "body": "World"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let submitted = runner.submitted();
        match submitted[0].payload() {
            AgentPayload::Email(params) => assert_eq!(params.recipient, "ops@acme.com"),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_lead_rejects_empty_lead_data() {
        let runner = Arc::new(ScriptedTaskRunner::new());
        let app = create_router(state_with(runner.clone()).await);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/agents/create_lead",
                json!({"tenant_id": "acme", "lead_data": {}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["param"], "lead_data");
        assert!(runner.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_for_unknown_tenant_is_404() {
        let runner = Arc::new(ScriptedTaskRunner::new());
        let app = create_router(state_with(runner.clone()).await);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/agents/summarize_document",
                json!({"tenant_id": "initech", "document_text": "text"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(runner.submitted().is_empty());
    }
}
