//! Feedback intake.

use crate::error::{Result, ServerError};
use crate::session::{AuthenticatedUser, UserId};
use async_trait::async_trait;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of `POST /api/feedback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    /// Free-form feedback text.
    pub content: String,
}

/// Reply sent once feedback has been accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackReply {
    /// Confirmation message.
    pub message: String,
}

/// Accepted feedback, attributed to its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// Who sent it.
    pub user: UserId,
    /// Trimmed feedback text.
    pub content: String,
    /// When it was received.
    pub received_at: DateTime<Utc>,
}

/// Destination for accepted feedback.
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    /// Hand `feedback` to its destination.
    async fn deliver(&self, feedback: Feedback) -> Result<()>;
}

/// Sink that records feedback in the log.
#[derive(Debug, Clone, Default)]
pub struct LogFeedbackSink {
    recipient: Option<String>,
}

impl LogFeedbackSink {
    /// Create a sink addressed to `recipient`.
    pub fn new(recipient: Option<String>) -> Self {
        Self { recipient }
    }
}

#[async_trait]
impl FeedbackSink for LogFeedbackSink {
    async fn deliver(&self, feedback: Feedback) -> Result<()> {
        tracing::info!(
            user = %feedback.user,
            recipient = self.recipient.as_deref().unwrap_or("<unset>"),
            received_at = %feedback.received_at,
            chars = feedback.content.chars().count(),
            "feedback received"
        );
        tracing::debug!(content = %feedback.content, "feedback content");
        Ok(())
    }
}

/// Validate a feedback body and attribute it to `user`.
///
/// # Errors
///
/// Returns [`ServerError::BadRequest`] if the content is blank.
pub fn accept(user: UserId, request: FeedbackRequest) -> Result<Feedback> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(ServerError::BadRequest("content must not be empty".into()));
    }
    Ok(Feedback {
        user,
        content: content.to_owned(),
        received_at: Utc::now(),
    })
}

/// `POST /api/feedback`.
pub async fn handle_feedback(
    AuthenticatedUser(user): AuthenticatedUser,
    State(sink): State<Arc<dyn FeedbackSink>>,
    body: std::result::Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<FeedbackReply>> {
    let Json(request) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let feedback = accept(user, request)?;
    sink.deliver(feedback).await?;
    Ok(Json(FeedbackReply {
        message: "feedback received".to_owned(),
    }))
}
