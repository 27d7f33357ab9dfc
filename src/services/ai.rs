use log::warn;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::Config;
use crate::models::ResumeSnapshot;

/// Single entry point for Gemini calls. Every caller has a deterministic
/// fallback; a missing key or failed request degrades the feature, never the
/// wizard step.
pub struct GeminiService;

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-2.5-flash";
const CALL_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiService {
    pub(crate) async fn generate(prompt: &str) -> Result<String, String> {
        let api_key = Config::gemini_api_key().ok_or("Gemini API key not configured")?;

        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE, GEMINI_MODEL, api_key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
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
            .map_err(|e| format!("Gemini request failed: {}", e))?;

        if !res.status().is_success() {
            return Err(format!("Gemini returned status {}", res.status()));
        }

        let payload: GenerateResponse = res
            .json()
            .await
            .map_err(|e| format!("Gemini response parse failed: {}", e))?;

        payload
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| if p.is_empty() { None } else { p.remove(0).text })
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| "Gemini returned empty content".to_string())
    }

    /// Rewrite a field value for professionalism. The raw text is returned
    /// unchanged whenever the collaborator is unavailable.
    pub async fn enhance_text(text: &str, field_name: &str, profession: &str) -> String {
        if text.trim().is_empty() || !Config::is_gemini_enabled() {
            return text.to_string();
        }

        let prompt = format!(
            "Enhance the following text for a {}'s resume. Make it more professional, \
             clear, and impactful for employers.\n\n\
             Field: {}\n\
             Original text: \"{}\"\n\n\
             Requirements:\n\
             - Keep it concise and professional\n\
             - Use industry-appropriate terminology\n\
             - Keep the meaning unchanged\n\
             - Return only the enhanced text, no explanations",
            profession, field_name, text
        );

        match Self::generate(&prompt).await {
            Ok(enhanced) => Self::strip_quotes(&enhanced),
            Err(e) => {
                warn!("text enhancement failed: {}", e);
                text.to_string()
            }
        }
    }

    /// AI-written professional summary for the résumé. `None` means the
    /// builder should use its deterministic templated sentence.
    pub async fn professional_summary(snapshot: &ResumeSnapshot) -> Option<String> {
        if !Config::is_gemini_enabled() {
            return None;
        }

        let data = &snapshot.verification_data;
        let prompt = format!(
            "Create a professional summary for a {} with the following details:\n\
             - Experience: {} years\n\
             - Specialization: {}\n\
             - Skills: {}\n\n\
             Requirements:\n\
             - Keep it 2-3 sentences\n\
             - Professional and confident tone\n\
             - Suitable for a resume\n\
             - Return only the summary text",
            snapshot.profession,
            data.get("experience_years").map(String::as_str).unwrap_or("0"),
            data.get("specialization").map(String::as_str).unwrap_or("general"),
            data.get("skills")
                .or_else(|| data.get("tools"))
                .map(String::as_str)
                .unwrap_or("various"),
        );

        match Self::generate(&prompt).await {
            Ok(summary) => Some(Self::strip_quotes(&summary)),
            Err(e) => {
                warn!("summary generation failed: {}", e);
                None
            }
        }
    }

    /// Translate UI or user text; identity fallback keeps every page usable
    /// without the collaborator.
    pub async fn translate(text: &str, target_lang: &str) -> String {
        if text.trim().is_empty() || target_lang == "en" || !Config::is_gemini_enabled() {
            return text.to_string();
        }

        let prompt = format!(
            "Translate the following text from English to {}.\n\n\
             CONTEXT: This is for a blue-collar resume building application in India. \
             Use common, easily understandable terms that workers in skilled trades \
             would recognize.\n\n\
             IMPORTANT: Return ONLY the translated text without any additional text, \
             explanations, or notes.\n\n\
             Text to translate: \"{}\"",
            Self::language_name(target_lang),
            text
        );

        match Self::generate(&prompt).await {
            Ok(translated) => Self::strip_quotes(&translated),
            Err(e) => {
                warn!("translation to {} failed: {}", target_lang, e);
                text.to_string()
            }
        }
    }

    /// Assistant reply for the chat endpoint. Collaborator failures surface
    /// as errors here; the route maps them to a 500.
    pub async fn chat_reply(message: &str, lang: &str) -> Result<String, String> {
        let prompt = format!(
            "You are a polite, helpful AI assistant for blue-collar workers. \
             Give short, clear, friendly answers about skills, jobs, and guidance.\n\
             User: {}",
            message
        );

        let reply = Self::generate(&prompt).await?;
        if lang != "en" {
            return Ok(Self::translate(&reply, lang).await);
        }
        Ok(reply)
    }

    pub fn language_name(code: &str) -> &'static str {
        match code {
            "en" => "English",
            "hi" => "Hindi",
            "ta" => "Tamil",
            "te" => "Telugu",
            "bn" => "Bengali",
            "mr" => "Marathi",
            "gu" => "Gujarati",
            "kn" => "Kannada",
            "ml" => "Malayalam",
            "pa" => "Punjabi",
            "ur" => "Urdu",
            "or" | "od" => "Odia",
            "as" => "Assamese",
            _ => "English",
        }
    }

    /// Models often wrap single-line answers in quotes; strip one layer.
    fn strip_quotes(text: &str) -> String {
        let trimmed = text.trim();
        let unquoted = trimmed
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .or_else(|| {
                trimmed
                    .strip_prefix('\'')
                    .and_then(|t| t.strip_suffix('\''))
            })
            .unwrap_or(trimmed);
        unquoted.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_quotes_removes_one_matching_layer() {
        assert_eq!(GeminiService::strip_quotes("\"hello\""), "hello");
        assert_eq!(GeminiService::strip_quotes("'hello'"), "hello");
        assert_eq!(GeminiService::strip_quotes("plain"), "plain");
        assert_eq!(GeminiService::strip_quotes("\"unbalanced"), "\"unbalanced");
        assert_eq!(GeminiService::strip_quotes("  padded  "), "padded");
    }

    #[test]
    fn language_names_cover_the_wizard_languages() {
        for code in ["en", "hi", "od", "ta", "te", "bn"] {
            assert_ne!(GeminiService::language_name(code), "");
        }
        assert_eq!(GeminiService::language_name("od"), "Odia");
        assert_eq!(GeminiService::language_name("zz"), "English");
    }
}
