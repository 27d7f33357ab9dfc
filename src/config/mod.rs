use rocket::Config as RocketConfig;
use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use std::env;

pub struct Config;

impl Config {
    fn figment() -> Figment {
        let profile = env::var("ROCKET_PROFILE").unwrap_or_else(|_| "development".to_string());

        Figment::from(RocketConfig::default())
            .merge(Toml::file("Rocket.toml").nested())
            .select(&profile)
            .merge(Env::prefixed("ROCKET_").split("_"))
    }

    pub fn mongodb_uri() -> String {
        Self::figment()
            .extract_inner("mongodb_uri")
            .unwrap_or_else(|_| "mongodb://localhost:27017/bluecollar".to_string())
    }

    pub fn upload_dir() -> String {
        Self::figment()
            .extract_inner("upload_dir")
            .unwrap_or_else(|_| "uploads".to_string())
    }

    /// Minutes an issued OTP stays valid.
    pub fn otp_ttl_minutes() -> i64 {
        Self::figment().extract_inner("otp_ttl_minutes").unwrap_or(10)
    }

    /// Sliding expiry for wizard sessions, in days.
    pub fn session_ttl_days() -> i64 {
        Self::figment().extract_inner("session_ttl_days").unwrap_or(7)
    }

    pub fn is_development() -> bool {
        let profile = env::var("ROCKET_PROFILE").unwrap_or_else(|_| "development".to_string());
        profile == "development"
    }

    pub fn gemini_api_key() -> Option<String> {
        Self::figment().extract_inner("gemini_api_key").ok()
    }

    pub fn is_gemini_enabled() -> bool {
        Self::gemini_api_key().is_some()
    }

    pub fn speech_api_key() -> Option<String> {
        Self::figment().extract_inner("speech_api_key").ok()
    }

    pub fn is_speech_enabled() -> bool {
        Self::speech_api_key().is_some()
    }

    pub fn sms_auth_key() -> Option<String> {
        Self::figment().extract_inner("sms_auth_key").ok()
    }

    pub fn sms_sender_id() -> Option<String> {
        Self::figment().extract_inner("sms_sender_id").ok()
    }

    pub fn sms_template_id() -> Option<String> {
        Self::figment().extract_inner("sms_template_id").ok()
    }

    pub fn is_sms_enabled() -> bool {
        Self::sms_auth_key().is_some() && Self::sms_template_id().is_some()
    }
}
