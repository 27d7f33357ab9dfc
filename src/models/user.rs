use indexmap::IndexMap;
use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::models::session::{IdDocument, WizardSession};

/// Durable worker record, upserted by mobile number. The mobile is the
/// identity anchor: repeated logins update this record, never duplicate it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub mobile: String,
    pub full_name: String,
    pub email: String,
    pub gender: String,
    pub address: String,
    pub profession: String,
    pub verification_data: IndexMap<String, String>,
    pub language: String,
    pub id_verified: bool,
    pub id_document: Option<IdDocument>,
    pub has_passkey: bool,
    pub passkey_secret_hash: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub last_login_at: DateTime,
}

impl User {
    /// Minimal record created the first time a mobile number passes OTP
    /// verification. The rest of the profile fills in as the wizard advances.
    pub fn new(mobile: String, now: DateTime) -> Self {
        User {
            id: None,
            mobile,
            full_name: String::new(),
            email: String::new(),
            gender: String::new(),
            address: String::new(),
            profession: String::new(),
            verification_data: IndexMap::new(),
            language: "en".to_string(),
            id_verified: false,
            id_document: None,
            has_passkey: false,
            passkey_secret_hash: None,
            created_at: now,
            updated_at: now,
            last_login_at: now,
        }
    }

    /// Merge the session draft into this record. Called at each step
    /// boundary once the user is authenticated; the same draft merged twice
    /// produces the same record, so resubmission is idempotent.
    pub fn apply_draft(&mut self, draft: &WizardSession, now: DateTime) {
        if let Some(language) = &draft.language {
            self.language = language.clone();
        }
        if let Some(full_name) = &draft.full_name {
            self.full_name = full_name.clone();
        }
        if let Some(email) = &draft.email {
            self.email = email.clone();
        }
        if let Some(gender) = &draft.gender {
            self.gender = gender.clone();
        }
        if let Some(address) = &draft.address {
            self.address = address.clone();
        }
        if let Some(profession) = &draft.profession {
            self.profession = profession.clone();
        }
        if draft.verification_complete {
            self.verification_data = draft.verification_data.clone();
        }
        if draft.id_verified {
            self.id_verified = true;
            self.id_document = draft.id_document.clone();
        }
        self.updated_at = now;
    }
}
