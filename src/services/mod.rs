pub mod ai;
pub mod jobs;
pub mod resume;
pub mod session_store;
pub mod sms;
pub mod speech;
pub mod uploads;
pub mod verification;

pub use ai::GeminiService;
pub use jobs::JobRecommender;
pub use resume::ResumeBuilder;
pub use session_store::SessionStore;
pub use sms::SmsService;
pub use speech::SpeechService;
