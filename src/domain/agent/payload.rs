//! Agent input payloads

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::AgentError;
use super::kind::AgentKind;

/// `addr@domain` or `Display Name <addr@domain>`
static MAILBOX_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[^<>@]*<[^\s<>@]+@[^\s<>@]+>|[^\s<>@]+@[^\s<>@]+)$")
        .expect("mailbox pattern is a valid regex")
});

/// Parameters for the email agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailParams {
    pub recipient: String,

    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub body: String,
}

impl EmailParams {
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Whether `recipient` is shaped like a single mailbox
    pub fn has_valid_recipient(&self) -> bool {
        MAILBOX_PATTERN.is_match(self.recipient.trim())
    }
}

/// The work handed to the task runner for one agent invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "agent", rename_all = "snake_case")]
pub enum AgentPayload {
    DocSum { document_text: String },
    Sfdc { lead_data: Map<String, Value> },
    Email(EmailParams),
}

impl AgentPayload {
    pub fn kind(&self) -> AgentKind {
        match self {
            Self::DocSum { .. } => AgentKind::DocSum,
            Self::Sfdc { .. } => AgentKind::Sfdc,
            Self::Email(_) => AgentKind::Email,
        }
    }

    /// Reject payloads that an agent is known to fail on
    pub fn validate(&self) -> Result<(), AgentError> {
        match self {
            Self::DocSum { document_text } if document_text.trim().is_empty() => {
                Err(AgentError::invalid_input("document_text"))
            }
            Self::Sfdc { lead_data } if lead_data.is_empty() => {
                Err(AgentError::invalid_input("lead_data"))
            }
            Self::Email(params) if !params.has_valid_recipient() => {
                Err(AgentError::invalid_input("email_params.recipient"))
            }
            _ => Ok(()),
        }
    }
}
