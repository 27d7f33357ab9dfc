use indexmap::IndexMap;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::User;

/// The wizard's linear steps, in completion order. Each step's page is gated
/// on every earlier step being complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Language,
    Login,
    VerifyOtp,
    Profession,
    Verification,
    Profile,
    IdVerification,
    StaySignedIn,
    Resume,
    Jobs,
}

impl WizardStep {
    pub const ALL: [WizardStep; 10] = [
        WizardStep::Language,
        WizardStep::Login,
        WizardStep::VerifyOtp,
        WizardStep::Profession,
        WizardStep::Verification,
        WizardStep::Profile,
        WizardStep::IdVerification,
        WizardStep::StaySignedIn,
        WizardStep::Resume,
        WizardStep::Jobs,
    ];

    pub fn entry_uri(self) -> &'static str {
        match self {
            WizardStep::Language => "/language",
            WizardStep::Login => "/login",
            WizardStep::VerifyOtp => "/verify-otp",
            WizardStep::Profession => "/profession",
            WizardStep::Verification => "/verification",
            WizardStep::Profile => "/profile",
            WizardStep::IdVerification => "/id-verification",
            WizardStep::StaySignedIn => "/stay-signed-in",
            WizardStep::Resume => "/resume",
            WizardStep::Jobs => "/jobs",
        }
    }
}

/// Authentication failures surfaced to the wizard as same-step retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    OtpMissing,
    OtpExpired,
    OtpMismatch,
    PasskeyMismatch,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::OtpMissing => write!(f, "No OTP has been requested. Please log in again."),
            AuthError::OtpExpired => write!(f, "OTP has expired. Please request a new one."),
            AuthError::OtpMismatch => write!(f, "Invalid OTP. Please try again."),
            AuthError::PasskeyMismatch => write!(f, "Invalid passkey. Please try again."),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRecord {
    pub code: String,
    pub issued_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdDocument {
    pub doc_type: String,
    pub number: String,
    pub file: String,
}

/// Server-side wizard session: the draft profile a user accumulates step by
/// step, persisted at every step boundary so partial progress survives a
/// restart. Keyed by a UUID held in a private cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardSession {
    #[serde(rename = "_id")]
    pub id: String,
    pub language: Option<String>,
    pub mobile: Option<String>,
    pub otp: Option<OtpRecord>,
    pub authenticated: bool,
    /// Login routed to the passkey challenge rather than OTP.
    pub passkey_login: bool,
    pub profession: Option<String>,
    pub verification_data: IndexMap<String, String>,
    pub verification_complete: bool,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub profile_complete: bool,
    pub id_verified: bool,
    pub id_document: Option<IdDocument>,
    pub stay_decided: Option<bool>,
    pub remember_device: bool,
    pub resume_path: Option<String>,
    pub created_at: DateTime,
    pub expires_at: DateTime,
}

impl WizardSession {
    pub fn new(id: String, now: DateTime, ttl_days: i64) -> Self {
        WizardSession {
            id,
            language: None,
            mobile: None,
            otp: None,
            authenticated: false,
            passkey_login: false,
            profession: None,
            verification_data: IndexMap::new(),
            verification_complete: false,
            full_name: None,
            email: None,
            gender: None,
            address: None,
            profile_complete: false,
            id_verified: false,
            id_document: None,
            stay_decided: None,
            remember_device: false,
            resume_path: None,
            created_at: now,
            expires_at: DateTime::from_millis(now.timestamp_millis() + ttl_days * 86_400_000),
        }
    }

    pub fn is_expired(&self, now: DateTime) -> bool {
        self.expires_at < now
    }

    /// Sliding expiry: every save pushes the window forward.
    pub fn touch(&mut self, now: DateTime, ttl_days: i64) {
        self.expires_at = DateTime::from_millis(now.timestamp_millis() + ttl_days * 86_400_000);
    }

    pub fn completed(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::Language => self.language.is_some(),
            WizardStep::Login => self.mobile.is_some(),
            WizardStep::VerifyOtp => self.authenticated,
            WizardStep::Profession => self.profession.is_some(),
            WizardStep::Verification => self.verification_complete,
            WizardStep::Profile => self.profile_complete,
            WizardStep::IdVerification => self.id_verified,
            WizardStep::StaySignedIn => self.stay_decided.is_some(),
            WizardStep::Resume => self.resume_path.is_some(),
            // Terminal; viewing jobs leaves no completion mark.
            WizardStep::Jobs => true,
        }
    }

    /// Gate for entering `step`: `Err(s)` names the earliest prior step whose
    /// completion is still outstanding. Callers redirect to `s`'s entry route.
    pub fn gate(&self, step: WizardStep) -> Result<(), WizardStep> {
        match WizardStep::ALL
            .iter()
            .copied()
            .take_while(|s| *s < step)
            .find(|s| !self.completed(*s))
        {
            None => Ok(()),
            Some(unsatisfied) => Err(unsatisfied),
        }
    }

    /// Entry route for a step, accounting for the passkey branch of the
    /// authentication step.
    pub fn entry_uri_for(&self, step: WizardStep) -> &'static str {
        if step == WizardStep::VerifyOtp && self.passkey_login {
            "/passkey-login"
        } else {
            step.entry_uri()
        }
    }

    /// Next page after a completed submission: the earliest outstanding step,
    /// or the jobs page once everything is done.
    pub fn next_uri(&self) -> &'static str {
        match self.gate(WizardStep::Jobs) {
            Ok(()) => WizardStep::Jobs.entry_uri(),
            Err(step) => self.entry_uri_for(step),
        }
    }

    /// Store a freshly generated OTP. Re-issuing overwrites the previous
    /// record, so only the most recent code verifies (last write wins).
    pub fn issue_otp(&mut self, code: String, now: DateTime) {
        self.otp = Some(OtpRecord {
            code,
            issued_at: now,
        });
    }

    /// Check an entered code against the stored OTP. Expired codes are
    /// cleared so the user must request a fresh one; mismatched codes are
    /// retained and may be retried until expiry.
    pub fn verify_otp(
        &mut self,
        entered: &str,
        now: DateTime,
        ttl_minutes: i64,
    ) -> Result<(), AuthError> {
        let (code, issued_at) = match &self.otp {
            Some(record) => (record.code.clone(), record.issued_at),
            None => return Err(AuthError::OtpMissing),
        };

        let elapsed_ms = now.timestamp_millis() - issued_at.timestamp_millis();
        if elapsed_ms > ttl_minutes * 60_000 {
            self.otp = None;
            return Err(AuthError::OtpExpired);
        }

        if entered != code {
            return Err(AuthError::OtpMismatch);
        }

        self.otp = None;
        self.authenticated = true;
        Ok(())
    }

    /// Load a returning user's stored record into the draft so completed
    /// wizard states stay satisfied. The résumé is not carried over; it must
    /// be regenerated before the jobs page becomes reachable.
    pub fn hydrate_from(&mut self, user: &User) {
        if self.language.is_none() {
            self.language = Some(user.language.clone());
        }
        if !user.full_name.is_empty() {
            self.full_name = Some(user.full_name.clone());
            self.profile_complete = true;
        }
        if !user.email.is_empty() {
            self.email = Some(user.email.clone());
        }
        if !user.gender.is_empty() {
            self.gender = Some(user.gender.clone());
        }
        if !user.address.is_empty() {
            self.address = Some(user.address.clone());
        }
        if !user.profession.is_empty() {
            self.profession = Some(user.profession.clone());
        }
        if !user.verification_data.is_empty() {
            self.verification_data = user.verification_data.clone();
            self.verification_complete = true;
        }
        self.id_verified = user.id_verified;
        self.id_document = user.id_document.clone();
        if user.has_passkey {
            self.stay_decided = Some(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::DateTime;

    fn at(minutes: i64, seconds: i64) -> DateTime {
        DateTime::from_millis((minutes * 60 + seconds) * 1000)
    }

    fn session() -> WizardSession {
        WizardSession::new("test-session".to_string(), at(0, 0), 7)
    }

    fn authenticated_session() -> WizardSession {
        let mut sess = session();
        sess.language = Some("en".to_string());
        sess.mobile = Some("9876543210".to_string());
        sess.authenticated = true;
        sess
    }

    #[test]
    fn fresh_session_gates_everything_to_language() {
        let sess = session();
        assert_eq!(sess.gate(WizardStep::Resume), Err(WizardStep::Language));
        assert_eq!(sess.gate(WizardStep::Jobs), Err(WizardStep::Language));
        assert!(sess.gate(WizardStep::Language).is_ok());
    }

    #[test]
    fn resume_without_authentication_redirects_to_login_entry() {
        let mut sess = session();
        sess.language = Some("en".to_string());

        // Mobile not yet submitted: earliest unsatisfied state is Login.
        let step = sess.gate(WizardStep::Resume).unwrap_err();
        assert_eq!(step, WizardStep::Login);
        assert_eq!(sess.entry_uri_for(step), "/login");

        // Mobile submitted but code not verified: the OTP page is next.
        sess.mobile = Some("9876543210".to_string());
        let step = sess.gate(WizardStep::Resume).unwrap_err();
        assert_eq!(step, WizardStep::VerifyOtp);
        assert_eq!(sess.entry_uri_for(step), "/verify-otp");
    }

    #[test]
    fn passkey_branch_redirects_to_passkey_page() {
        let mut sess = session();
        sess.language = Some("en".to_string());
        sess.mobile = Some("9876543210".to_string());
        sess.passkey_login = true;

        let step = sess.gate(WizardStep::Profession).unwrap_err();
        assert_eq!(sess.entry_uri_for(step), "/passkey-login");
    }

    #[test]
    fn steps_unlock_in_order() {
        let mut sess = authenticated_session();
        assert!(sess.gate(WizardStep::Profession).is_ok());
        assert_eq!(
            sess.gate(WizardStep::Verification),
            Err(WizardStep::Profession)
        );

        sess.profession = Some("Electrician".to_string());
        assert!(sess.gate(WizardStep::Verification).is_ok());
        assert_eq!(sess.gate(WizardStep::Profile), Err(WizardStep::Verification));

        sess.verification_data
            .insert("license_number".to_string(), "EL123".to_string());
        // Partial values alone do not complete the verification step.
        assert_eq!(sess.gate(WizardStep::Profile), Err(WizardStep::Verification));

        sess.verification_complete = true;
        assert!(sess.gate(WizardStep::Profile).is_ok());
    }

    #[test]
    fn terminal_state_allows_back_navigation_to_resume() {
        let mut sess = authenticated_session();
        sess.profession = Some("Electrician".to_string());
        sess.verification_complete = true;
        sess.profile_complete = true;
        sess.id_verified = true;
        sess.stay_decided = Some(false);
        sess.resume_path = Some("uploads/resume.pdf".to_string());

        assert!(sess.gate(WizardStep::Jobs).is_ok());
        assert!(sess.gate(WizardStep::Resume).is_ok());
        assert_eq!(sess.next_uri(), "/jobs");
    }

    #[test]
    fn otp_verifies_within_ten_minutes() {
        let mut sess = session();
        sess.issue_otp("123456".to_string(), at(0, 0));

        // 9:59 elapsed: still valid.
        assert!(sess.verify_otp("123456", at(9, 59), 10).is_ok());
        assert!(sess.authenticated);
        assert!(sess.otp.is_none(), "code is single-use");
    }

    #[test]
    fn otp_expires_after_ten_minutes_and_is_cleared() {
        let mut sess = session();
        sess.issue_otp("123456".to_string(), at(0, 0));

        let err = sess.verify_otp("123456", at(10, 1), 10).unwrap_err();
        assert_eq!(err, AuthError::OtpExpired);
        assert!(!sess.authenticated);
        assert!(sess.otp.is_none(), "expired code forces a fresh request");

        // A further attempt reports the missing code, not a mismatch.
        assert_eq!(
            sess.verify_otp("123456", at(10, 2), 10),
            Err(AuthError::OtpMissing)
        );
    }

    #[test]
    fn reissuing_invalidates_the_previous_code() {
        let mut sess = session();
        sess.issue_otp("111111".to_string(), at(0, 0));
        sess.issue_otp("222222".to_string(), at(1, 0));

        assert_eq!(
            sess.verify_otp("111111", at(2, 0), 10),
            Err(AuthError::OtpMismatch)
        );
        assert!(sess.verify_otp("222222", at(2, 30), 10).is_ok());
    }

    #[test]
    fn mismatches_may_be_retried_until_expiry() {
        let mut sess = session();
        sess.issue_otp("654321".to_string(), at(0, 0));

        for attempt in 1..=3 {
            let when = at(attempt, 0);
            assert_eq!(
                sess.verify_otp("000000", when, 10),
                Err(AuthError::OtpMismatch)
            );
            assert!(sess.otp.is_some(), "failed attempts keep the code");
        }

        // Correct code at nine minutes elapsed still succeeds: no lockout.
        assert!(sess.verify_otp("654321", at(9, 0), 10).is_ok());
    }

    #[test]
    fn touch_slides_the_expiry_window() {
        let mut sess = session();
        let first_expiry = sess.expires_at;
        sess.touch(at(60, 0), 7);
        assert!(sess.expires_at > first_expiry);
        assert!(!sess.is_expired(at(60, 0)));
    }
}
