use {
    nurph_channels::Delivery,
    reqwest::StatusCode,
    secrecy::ExposeSecret,
    serde::Deserialize,
    tracing::debug,
};

use crate::TwilioConfig;

/// Error body returned by the Twilio REST API.
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Post one SMS through the Messages API.
///
/// Only `201 Created` counts as delivered. Any other status is a failure
/// carrying Twilio's error `message`, or the raw body when it is not JSON.
pub async fn send_sms(http: &reqwest::Client, config: &TwilioConfig, to: &str, body: &str) -> Delivery {
    let form = [
        ("From", config.from_number.as_str()),
        ("To", to),
        ("Body", body),
    ];
    let response = match http
        .post(config.messages_url())
        .basic_auth(&config.account_sid, Some(config.auth_token.expose_secret()))
        .form(&form)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return Delivery::failure(format!("twilio request failed: {e}")),
    };

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    debug!(%status, to, "twilio messages api response");
    if status == StatusCode::CREATED {
        return Delivery::success(Some(text));
    }
    let reason = serde_json::from_str::<ApiError>(&text)
        .map(|e| e.message)
        .unwrap_or(text);
    Delivery::failure(format!("twilio send failed ({status}): {reason}"))
}
