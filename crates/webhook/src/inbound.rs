use std::sync::Arc;

use {
    axum::{
        Json, Router,
        extract::{State, rejection::JsonRejection},
        http::{StatusCode, header},
        response::IntoResponse,
        routing::post,
    },
    nurph_channels::CanonicalEvent,
    nurph_common::User,
    serde::{Deserialize, Serialize},
    tracing::warn,
};

use crate::WebhookAdapter;

/// Body of an inbound webhook post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Caller's message id; redeliveries with the same id dispatch once.
    pub id: Option<String>,
    pub user: Option<String>,
    pub user_name: Option<String>,
    pub room: Option<String>,
    pub text: Option<String>,
}

impl InboundMessage {
    /// The canonical event, or `None` when `user` or `text` is missing.
    pub fn into_event(self, adapter: &WebhookAdapter) -> Option<CanonicalEvent> {
        let raw = serde_json::to_value(&self).unwrap_or_default();
        let (Some(user_id), Some(text)) = (self.user, self.text) else {
            return None;
        };
        let user = match self.user_name {
            Some(name) => User::new(user_id, name),
            None => User::from_address(user_id),
        };
        let mut builder = CanonicalEvent::builder(adapter.config().name.as_str(), user, text)
            .addressing(adapter.config().addressing)
            .raw_payload(raw);
        if let Some(id) = self.id {
            builder = builder.id(id);
        }
        if let Some(room) = self.room {
            builder = builder.room(room);
        }
        Some(builder.build())
    }
}

pub fn router(adapter: Arc<WebhookAdapter>) -> Router {
    let path = adapter.config().path.clone();
    Router::new()
        .route(&path, post(inbound_handler))
        .with_state(adapter)
}

async fn inbound_handler(
    State(adapter): State<Arc<WebhookAdapter>>,
    body: Result<Json<InboundMessage>, JsonRejection>,
) -> impl IntoResponse {
    match body {
        Ok(Json(message)) => {
            tokio::spawn(async move {
                if let Err(e) = adapter.ingest(message).await {
                    warn!(adapter = %adapter.config().name, error = %e, "failed to ingest webhook message");
                }
            });
        },
        Err(rejection) => {
            warn!(adapter = %adapter.config().name, error = %rejection, "unreadable webhook body");
        },
    }
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], "")
}
