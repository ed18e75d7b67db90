//! Advisory text for a finished ranking.
//!
//! The pipeline only sees the [`Advisor`] trait; the chat-completion client
//! lives in `chat` and tests use [`StaticAdvisor`].

pub mod chat;

pub use chat::*;

use crate::error::AppError;

/// Turns a summary into free-form advice.
pub trait Advisor {
    fn advise(&self, summary: &str) -> Result<String, AppError>;
}

/// Always answers with the same text.
#[derive(Debug, Clone)]
pub struct StaticAdvisor {
    reply: String,
}

impl StaticAdvisor {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

impl Advisor for StaticAdvisor {
    fn advise(&self, _summary: &str) -> Result<String, AppError> {
        Ok(self.reply.clone())
    }
}

/// Ask `advisor`, turning a failure into displayable text.
pub fn advisory_text(advisor: &dyn Advisor, summary: &str) -> String {
    match advisor.advise(summary) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(%err, "advisory request failed");
            format!("Advisory request failed: {err}")
        }
    }
}
