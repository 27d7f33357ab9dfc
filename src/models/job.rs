use mongodb::bson::DateTime;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::session::WizardSession;

/// One recommended opening, ranked by `match_score` (0-100).
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub salary_range: String,
    pub experience: String,
    pub skills: Vec<String>,
    pub match_score: u8,
    pub source: String,
    pub apply_url: String,
}

/// Profile summary handed to the recommender.
#[derive(Debug, Clone)]
pub struct MatchProfile {
    pub profession: String,
    pub experience_years: i64,
    pub skills: String,
    pub location: String,
}

impl MatchProfile {
    pub fn from_session(session: &WizardSession) -> Self {
        let experience_years = session
            .verification_data
            .get("experience_years")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0);

        let skills = session
            .verification_data
            .get("skills")
            .or_else(|| session.verification_data.get("tools"))
            .cloned()
            .unwrap_or_default();

        MatchProfile {
            profession: session
                .profession
                .clone()
                .unwrap_or_else(|| "Worker".to_string()),
            experience_years,
            skills,
            location: session.address.clone().unwrap_or_default(),
        }
    }
}

/// Audit trail of job-card interactions (viewed, saved, applied).
#[derive(Debug, Serialize, Deserialize)]
pub struct JobTracking {
    pub user_mobile: String,
    pub job_id: String,
    pub action: String,
    pub created_at: DateTime,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TrackJobDto {
    pub job_id: String,
    pub action: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_profile_reads_experience_and_skills_from_draft() {
        let mut sess = WizardSession::new(
            "s".to_string(),
            DateTime::from_millis(0),
            7,
        );
        sess.profession = Some("Electrician".to_string());
        sess.address = Some("Pune, Maharashtra".to_string());
        sess.verification_data
            .insert("experience_years".to_string(), "5".to_string());
        sess.verification_data
            .insert("tools".to_string(), "Multimeter, Wire Stripper".to_string());

        let profile = MatchProfile::from_session(&sess);
        assert_eq!(profile.profession, "Electrician");
        assert_eq!(profile.experience_years, 5);
        assert_eq!(profile.skills, "Multimeter, Wire Stripper");
        assert_eq!(profile.location, "Pune, Maharashtra");
    }

    #[test]
    fn match_profile_defaults_when_draft_is_sparse() {
        let sess = WizardSession::new("s".to_string(), DateTime::from_millis(0), 7);
        let profile = MatchProfile::from_session(&sess);
        assert_eq!(profile.profession, "Worker");
        assert_eq!(profile.experience_years, 0);
        assert!(profile.skills.is_empty());
    }

    #[test]
    fn unparsable_experience_defaults_to_zero() {
        let mut sess = WizardSession::new("s".to_string(), DateTime::from_millis(0), 7);
        sess.verification_data
            .insert("experience_years".to_string(), "five".to_string());
        assert_eq!(MatchProfile::from_session(&sess).experience_years, 0);
    }
}
