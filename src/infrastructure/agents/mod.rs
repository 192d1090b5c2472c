//! Concrete agents executed by the task runner

mod email;
mod http_client;
mod sfdc;
mod summarizer;

pub use email::{EmailAgent, MailSender, SmtpMailSender};
pub use http_client::{HttpClient, HttpClientTrait};
pub use sfdc::SfdcLeadAgent;
pub use summarizer::{SummarizerAgent, SummarizerSettings};
