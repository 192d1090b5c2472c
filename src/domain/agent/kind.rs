//! The closed set of agents a chain step can name

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Agent kinds a step can dispatch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Document summarization
    DocSum,

    /// CRM lead creation
    Sfdc,

    /// Email dispatch
    Email,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [AgentKind::DocSum, AgentKind::Sfdc, AgentKind::Email];

    /// Name used in chain definitions and result maps
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocSum => "doc_sum",
            Self::Sfdc => "sfdc",
            Self::Email => "email",
        }
    }

    /// Context keys that must be present before the agent is dispatched
    pub fn required_inputs(&self) -> &'static [&'static str] {
        match self {
            Self::DocSum => &["document_text"],
            Self::Sfdc => &["lead_data"],
            Self::Email => &["email_params"],
        }
    }

    /// Context key the agent's output is written to, if later steps consume it
    pub fn output_key(&self) -> Option<&'static str> {
        match self {
            Self::DocSum => Some("summary"),
            Self::Sfdc | Self::Email => None,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a name is not one of the known agent kinds
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown agent '{0}' (expected one of: doc_sum, sfdc, email)")]
pub struct UnknownAgentName(pub String);

impl FromStr for AgentKind {
    type Err = UnknownAgentName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownAgentName(s.to_string()))
    }
}
