use log::error;
use mongodb::bson::DateTime;
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::okapi::schemars;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::Deserialize;

use crate::db::DbConn;
use crate::guards::AuthGuard;
use crate::models::{JobTracking, TrackJobDto};
use crate::services::uploads;
use crate::services::{GeminiService, SpeechService};
use crate::utils::{ApiError, ApiResponse};

fn default_lang() -> String {
    "en".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VoiceInputDto {
    pub field_name: String,
    pub text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SpeechToTextDto {
    pub audio_data: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TranslateDto {
    pub text: String,
    #[serde(default = "default_lang")]
    pub target_lang: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ChatDto {
    pub message: String,
    #[serde(default = "default_lang")]
    pub lang: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct Base64UploadDto {
    pub filename: String,
    pub mime_type: String,
    pub data: String,
}

/// Polish a dictated or typed field value. The raw text comes back unchanged
/// when the enhancement collaborator is unavailable.
#[openapi(tag = "Assist")]
#[post("/voice-input", data = "<dto>")]
pub async fn voice_input(
    auth: AuthGuard,
    dto: Json<VoiceInputDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let profession = auth.session.profession.clone().unwrap_or_default();
    let enhanced = GeminiService::enhance_text(&dto.text, &dto.field_name, &profession).await;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "enhanced_text": enhanced,
        "original_text": dto.text,
    }))))
}

#[openapi(tag = "Assist")]
#[post("/speech-to-text", data = "<dto>")]
pub async fn speech_to_text(
    _auth: AuthGuard,
    dto: Json<SpeechToTextDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if dto.audio_data.trim().is_empty() {
        return Err(ApiError::bad_request("No audio data"));
    }

    let text = SpeechService::transcribe(&dto.audio_data).await;
    Ok(Json(ApiResponse::success(serde_json::json!({
        "text": text,
    }))))
}

#[openapi(tag = "Assist")]
#[post("/translate", data = "<dto>")]
pub async fn translate(
    _auth: AuthGuard,
    dto: Json<TranslateDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let translated = GeminiService::translate(&dto.text, &dto.target_lang).await;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "translated_text": translated,
        "original_text": dto.text,
    }))))
}

/// Audit trail of job-card interactions.
#[openapi(tag = "Jobs")]
#[post("/track-job", data = "<dto>")]
pub async fn track_job(
    db: &State<DbConn>,
    auth: AuthGuard,
    dto: Json<TrackJobDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let mobile = auth
        .session
        .mobile
        .clone()
        .ok_or_else(|| ApiError::unauthorized("No mobile on session"))?;

    let row = JobTracking {
        user_mobile: mobile,
        job_id: dto.job_id.clone(),
        action: dto.action.clone(),
        created_at: DateTime::now(),
    };

    db.collection::<JobTracking>("job_tracking")
        .insert_one(&row, None)
        .await
        .map_err(|e| {
            error!("job tracking insert failed: {}", e);
            ApiError::internal_error("Failed to record job action")
        })?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "recorded": true,
    }))))
}

/// Assistant Q&A for blue-collar guidance. Unlike the other endpoints this
/// one surfaces collaborator failures as a 500; there is no useful canned
/// answer.
#[openapi(tag = "Assist")]
#[post("/chat", data = "<dto>")]
pub async fn chat(
    _auth: AuthGuard,
    dto: Json<ChatDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if dto.message.trim().is_empty() {
        return Err(ApiError::bad_request("No message provided"));
    }

    let reply = GeminiService::chat_reply(&dto.message, &dto.lang)
        .await
        .map_err(|e| {
            error!("assistant reply failed: {}", e);
            ApiError::internal_error("Assistant is unavailable right now")
        })?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "reply": reply,
    }))))
}

/// Base64 ID-document upload for clients that cannot post multipart forms.
#[openapi(tag = "Uploads")]
#[post("/upload/document-base64", data = "<dto>")]
pub async fn upload_document_base64(
    auth: AuthGuard,
    dto: Json<Base64UploadDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let mobile = auth
        .session
        .mobile
        .clone()
        .ok_or_else(|| ApiError::unauthorized("No mobile on session"))?;

    let stored = uploads::save_base64_document(&dto.filename, &dto.mime_type, &dto.data, &mobile)
        .await
        .map_err(ApiError::bad_request)?;

    Ok(Json(ApiResponse::success_with_message(
        "Document uploaded successfully".to_string(),
        serde_json::json!({ "filename": stored }),
    )))
}
