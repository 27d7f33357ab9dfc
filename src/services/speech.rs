use data_encoding::BASE64;
use log::warn;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::config::Config;

const SPEECH_ENDPOINT: &str = "https://speech.googleapis.com/v1/speech:recognize";
const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Shown in the input field when transcription is unavailable; the user can
/// still type the value by hand.
const FALLBACK_TRANSCRIPT: &str = "Could not transcribe audio. Please try again.";

pub struct SpeechService;

impl SpeechService {
    /// Transcribe a base64 audio payload (optionally a `data:` URL). Never
    /// fails: unusable audio or an unreachable backend yields the fallback
    /// transcript.
    pub async fn transcribe(audio_data: &str) -> String {
        let encoded = audio_data.rsplit(',').next().unwrap_or(audio_data).trim();

        // Reject payloads that are not valid base64 before calling out.
        if encoded.is_empty() || BASE64.decode(encoded.as_bytes()).is_err() {
            return FALLBACK_TRANSCRIPT.to_string();
        }

        if !Config::is_speech_enabled() {
            return FALLBACK_TRANSCRIPT.to_string();
        }

        match Self::recognize(encoded).await {
            Ok(text) => text,
            Err(e) => {
                warn!("speech transcription failed: {}", e);
                FALLBACK_TRANSCRIPT.to_string()
            }
        }
    }

    async fn recognize(encoded: &str) -> Result<String, String> {
        let api_key = Config::speech_api_key().ok_or("speech API key not configured")?;
        let url = format!("{}?key={}", SPEECH_ENDPOINT, api_key);

        let body = json!({
            "config": {
                "languageCode": "en-IN",
                "enableAutomaticPunctuation": true,
            },
            "audio": { "content": encoded },
        });

        let client = Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()
            .map_err(|e| format!("HTTP client init failed: {}", e))?;

        let res = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("speech request failed: {}", e))?;

        if !res.status().is_success() {
            return Err(format!("speech backend returned status {}", res.status()));
        }

        let payload: serde_json::Value = res
            .json()
            .await
            .map_err(|e| format!("speech response parse failed: {}", e))?;

        payload
            .pointer("/results/0/alternatives/0/transcript")
            .and_then(|v| v.as_str())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| "speech backend returned no transcript".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rocket::async_test]
    async fn invalid_base64_yields_the_fallback_transcript() {
        let text = SpeechService::transcribe("not base64 at all!!!").await;
        assert_eq!(text, FALLBACK_TRANSCRIPT);
    }

    #[rocket::async_test]
    async fn empty_payload_yields_the_fallback_transcript() {
        assert_eq!(SpeechService::transcribe("").await, FALLBACK_TRANSCRIPT);
        assert_eq!(
            SpeechService::transcribe("data:audio/webm;base64,").await,
            FALLBACK_TRANSCRIPT
        );
    }
}
