use log::{info, warn};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::config::Config;

const SMS_BASE: &str = "https://control.msg91.com/api/v5/flow/";
const SEND_TIMEOUT: Duration = Duration::from_secs(15);

/// Delivery id reported when the gateway is unconfigured or unreachable.
const DEMO_DELIVERY_ID: &str = "demo-sms";

pub struct SmsService;

impl SmsService {
    /// Deliver `message` to `mobile` and return the gateway delivery id.
    /// Delivery problems never block the wizard: the message is logged and
    /// the demo id returned instead.
    pub async fn send(mobile: &str, message: &str) -> String {
        if !Config::is_sms_enabled() {
            info!("SMS to {}: {}", mobile, message);
            return DEMO_DELIVERY_ID.to_string();
        }

        match Self::dispatch(mobile, message).await {
            Ok(delivery_id) => delivery_id,
            Err(e) => {
                warn!("SMS dispatch to {} failed: {}", mobile, e);
                info!("SMS to {}: {}", mobile, message);
                DEMO_DELIVERY_ID.to_string()
            }
        }
    }

    async fn dispatch(mobile: &str, message: &str) -> Result<String, String> {
        let auth_key = Config::sms_auth_key().ok_or("SMS auth key not configured")?;
        let template_id = Config::sms_template_id().ok_or("SMS template id not configured")?;

        let body = json!({
            "template_id": template_id,
            "sender": Config::sms_sender_id(),
            "recipients": [{
                "mobiles": format!("91{}", mobile),
                "message": message,
            }],
        });

        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| format!("HTTP client init failed: {}", e))?;

        let res = client
            .post(SMS_BASE)
            .header("authkey", auth_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("SMS request failed: {}", e))?;

        if !res.status().is_success() {
            return Err(res
                .text()
                .await
                .unwrap_or_else(|_| "SMS gateway error".to_string()));
        }

        let payload: serde_json::Value = res.json().await.unwrap_or_default();
        Ok(payload
            .get("request_id")
            .and_then(|v| v.as_str())
            .unwrap_or("sent")
            .to_string())
    }
}
