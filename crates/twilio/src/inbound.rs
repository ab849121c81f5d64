use std::{collections::BTreeMap, sync::Arc};

use {
    axum::{
        Router,
        extract::{Form, State, rejection::FormRejection},
        http::{StatusCode, header},
        response::IntoResponse,
        routing::post,
    },
    nurph_channels::{Addressing, CanonicalEvent},
    nurph_common::User,
    serde::{Deserialize, Serialize},
    tracing::{debug, warn},
};

use crate::{ADAPTER_NAME, TwilioAdapter};

/// The fields of Twilio's inbound SMS webhook that matter here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SmsPayload {
    pub body: Option<String>,
    pub from: Option<String>,
    pub message_sid: Option<String>,
    /// Everything else Twilio sent, kept for the raw payload.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl SmsPayload {
    /// Build the canonical event, or `None` unless both `Body` and `From`
    /// are present.
    pub fn into_event(self) -> Option<CanonicalEvent> {
        let raw = serde_json::to_value(&self).unwrap_or_default();
        let (Some(body), Some(from)) = (self.body, self.from) else {
            return None;
        };
        let mut builder = CanonicalEvent::builder(ADAPTER_NAME, User::from_address(&from), body)
            .room(format!("{from}-sms"))
            .addressing(Addressing::Implicit)
            .raw_payload(raw);
        if let Some(sid) = self.message_sid.filter(|s| !s.is_empty()) {
            builder = builder.id(sid);
        }
        Some(builder.build())
    }
}

/// Routes for the inbound webhook.
pub fn router(adapter: Arc<TwilioAdapter>) -> Router {
    let path = adapter.config().webhook_path.clone();
    Router::new()
        .route(&path, post(sms_reply_handler))
        .with_state(adapter)
}

/// Acknowledge every post with `200 text/plain`; processing happens after.
async fn sms_reply_handler(
    State(adapter): State<Arc<TwilioAdapter>>,
    form: Result<Form<SmsPayload>, FormRejection>,
) -> impl IntoResponse {
    match form {
        Ok(Form(payload)) => {
            debug!(
                from = payload.from.as_deref().unwrap_or_default(),
                sid = payload.message_sid.as_deref().unwrap_or_default(),
                "twilio sms webhook"
            );
            tokio::spawn(async move {
                if let Err(e) = adapter.ingest(payload).await {
                    warn!(error = %e, "failed to ingest twilio sms");
                }
            });
        },
        Err(rejection) => {
            warn!(error = %rejection, "unreadable twilio sms webhook");
        },
    }
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], "")
}
