//! CRM lead creation agent

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::http_client::HttpClientTrait;
use crate::domain::{
    Agent, AgentError, AgentKind, AgentPayload, TaskOutcome, TenantConfigRepository, TenantId,
};

/// `sfdc` agent; creates a Lead record through the tenant's CRM REST API
#[derive(Debug)]
pub struct SfdcLeadAgent<C: HttpClientTrait> {
    client: C,
    tenants: Arc<dyn TenantConfigRepository>,
}

impl<C: HttpClientTrait> SfdcLeadAgent<C> {
    pub fn new(client: C, tenants: Arc<dyn TenantConfigRepository>) -> Self {
        Self { client, tenants }
    }

    async fn create_lead(&self, tenant_id: &TenantId, lead_data: &Map<String, Value>) -> TaskOutcome {
        let config = self
            .tenants
            .sfdc_config(tenant_id)
            .await
            .map_err(|e| AgentError::failure(e.to_string()))?
            .ok_or_else(|| AgentError::not_configured(AgentKind::Sfdc, tenant_id.as_str()))?;

        let url = config.lead_endpoint();
        let auth_header = format!("Bearer {}", config.access_token);

        debug!(tenant_id = %tenant_id, url = %url, "Creating lead");

        let response = self
            .client
            .post_json(
                &url,
                vec![
                    ("Authorization", auth_header.as_str()),
                    ("Content-Type", "application/json"),
                ],
                &Value::Object(lead_data.clone()),
            )
            .await
            .map_err(|e| AgentError::failure(format!("Failed to create lead: {}", e)))?;

        let lead_id = response.get("id").cloned().unwrap_or(Value::Null);
        info!(tenant_id = %tenant_id, lead_id = %lead_id, "Lead created");

        Ok(json!({
            "message": "Lead created successfully",
            "lead_id": lead_id,
        }))
    }
}

#[async_trait]
impl<C: HttpClientTrait> Agent for SfdcLeadAgent<C> {
    fn kind(&self) -> AgentKind {
        AgentKind::Sfdc
    }

    async fn run(&self, tenant_id: &TenantId, payload: &AgentPayload) -> TaskOutcome {
        match payload {
            AgentPayload::Sfdc { lead_data } => self.create_lead(tenant_id, lead_data).await,
            other => Err(AgentError::failure(format!(
                "sfdc cannot handle a {} payload",
                other.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SfdcConfig, Tenant};
    use crate::infrastructure::agents::HttpClient;
    use crate::infrastructure::tenant::InMemoryTenantConfigRepository;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tenant_id() -> TenantId {
        TenantId::new("acme").unwrap()
    }

    async fn tenants(instance_url: Option<String>) -> Arc<InMemoryTenantConfigRepository> {
        let repo = Arc::new(InMemoryTenantConfigRepository::new());
        repo.create_tenant(Tenant::new(tenant_id(), "Acme"))
            .await
            .unwrap();
        if let Some(url) = instance_url {
            repo.put_sfdc_config(&tenant_id(), SfdcConfig::new(url, "00D-token"))
                .await
                .unwrap();
        }
        repo
    }

    fn lead() -> AgentPayload {
        let mut lead_data = Map::new();
        lead_data.insert("LastName".to_string(), json!("Doe"));
        lead_data.insert("Company".to_string(), json!("Acme"));
        lead_data.insert("Description".to_string(), json!("Needs 40 seats"));
        AgentPayload::Sfdc { lead_data }
    }

    #[tokio::test]
    async fn test_create_lead() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/data/v59.0/sobjects/Lead/"))
            .and(header("Authorization", "Bearer 00D-token"))
            .and(body_json(json!({
                "LastName": "Doe",
                "Company": "Acme",
                "Description": "Needs 40 seats"
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"id": "00Q5e000001", "success": true, "errors": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let agent = SfdcLeadAgent::new(HttpClient::new(), tenants(Some(server.uri())).await);
        let output = agent.run(&tenant_id(), &lead()).await.unwrap();

        assert_eq!(output["lead_id"], json!("00Q5e000001"));
        assert_eq!(output["message"], json!("Lead created successfully"));
    }

    #[tokio::test]
    async fn test_not_configured() {
        let agent = SfdcLeadAgent::new(HttpClient::new(), tenants(None).await);
        let err = agent.run(&tenant_id(), &lead()).await.unwrap_err();

        assert_eq!(err, AgentError::not_configured(AgentKind::Sfdc, "acme"));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_rejected_lead_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"[{"errorCode":"REQUIRED_FIELD_MISSING"}]"#),
            )
            .mount(&server)
            .await;

        let agent = SfdcLeadAgent::new(HttpClient::new(), tenants(Some(server.uri())).await);
        let err = agent.run(&tenant_id(), &lead()).await.unwrap_err();

        assert!(err.to_string().starts_with("Failed to create lead"));
        assert!(err.to_string().contains("REQUIRED_FIELD_MISSING"));
    }
}
