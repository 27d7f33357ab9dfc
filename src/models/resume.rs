use indexmap::IndexMap;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::models::session::WizardSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeTemplate {
    Modern,
    Classic,
    Compact,
    Executive,
}

impl ResumeTemplate {
    pub const ALL: [ResumeTemplate; 4] = [
        ResumeTemplate::Modern,
        ResumeTemplate::Classic,
        ResumeTemplate::Compact,
        ResumeTemplate::Executive,
    ];

    /// Unknown identifiers fall back to the default template rather than
    /// failing the step.
    pub fn parse(id: &str) -> Self {
        match id {
            "classic" => ResumeTemplate::Classic,
            "compact" => ResumeTemplate::Compact,
            "executive" => ResumeTemplate::Executive,
            _ => ResumeTemplate::Modern,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ResumeTemplate::Modern => "modern",
            ResumeTemplate::Classic => "classic",
            ResumeTemplate::Compact => "compact",
            ResumeTemplate::Executive => "executive",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ResumeTemplate::Modern => "Modern Professional",
            ResumeTemplate::Classic => "Classic Traditional",
            ResumeTemplate::Compact => "Compact One-Page",
            ResumeTemplate::Executive => "Executive Style",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ResumeTemplate::Modern => "Clean and contemporary design",
            ResumeTemplate::Classic => "Traditional formal layout",
            ResumeTemplate::Compact => "Single page optimized resume",
            ResumeTemplate::Executive => "Professional executive format",
        }
    }
}

/// Immutable input to the document builder, captured from the session at
/// generation time.
#[derive(Debug, Clone)]
pub struct ResumeSnapshot {
    pub full_name: String,
    pub mobile: String,
    pub email: String,
    pub address: String,
    pub profession: String,
    pub verification_data: IndexMap<String, String>,
    pub id_verified: bool,
}

impl ResumeSnapshot {
    pub fn from_session(session: &WizardSession) -> Self {
        ResumeSnapshot {
            full_name: session.full_name.clone().unwrap_or_default(),
            mobile: session.mobile.clone().unwrap_or_default(),
            email: session.email.clone().unwrap_or_default(),
            address: session.address.clone().unwrap_or_default(),
            profession: session.profession.clone().unwrap_or_default(),
            verification_data: session.verification_data.clone(),
            id_verified: session.id_verified,
        }
    }
}

/// One row per generated document.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResumeAudit {
    pub user_mobile: String,
    pub template: String,
    pub path: String,
    pub created_at: DateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_template_id_defaults_to_modern() {
        assert_eq!(ResumeTemplate::parse("modern"), ResumeTemplate::Modern);
        assert_eq!(ResumeTemplate::parse("executive"), ResumeTemplate::Executive);
        assert_eq!(ResumeTemplate::parse("fancy"), ResumeTemplate::Modern);
        assert_eq!(ResumeTemplate::parse(""), ResumeTemplate::Modern);
    }

    #[test]
    fn snapshot_carries_verification_data_in_order() {
        let mut sess = WizardSession::new("s".to_string(), DateTime::from_millis(0), 7);
        sess.mobile = Some("9876543210".to_string());
        sess.verification_data
            .insert("license_number".to_string(), "EL123".to_string());
        sess.verification_data
            .insert("experience_years".to_string(), "5".to_string());

        let snapshot = ResumeSnapshot::from_session(&sess);
        let keys: Vec<&str> = snapshot
            .verification_data
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["license_number", "experience_years"]);
        assert_eq!(snapshot.mobile, "9876543210");
    }
}
