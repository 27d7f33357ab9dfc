//! Wizard flow scenarios driven through the core components, without the
//! HTTP or persistence layers.

use std::collections::HashMap;

use mongodb::bson::DateTime;

use crate::models::{
    MatchProfile, ProfessionCatalog, ResumeSnapshot, ResumeTemplate, WizardSession, WizardStep,
};
use crate::services::{JobRecommender, ResumeBuilder, verification};
use crate::utils::{generate_otp, validate_mobile};

fn at(minutes: i64, seconds: i64) -> DateTime {
    DateTime::from_millis((minutes * 60 + seconds) * 1000)
}

#[test]
fn full_wizard_pass_produces_a_verified_resume_and_job_list() {
    let catalog = ProfessionCatalog::standard();
    let mut session = WizardSession::new("e2e".to_string(), at(0, 0), 7);

    // Deep links are pushed back to the earliest unsatisfied step.
    assert_eq!(session.gate(WizardStep::Resume), Err(WizardStep::Language));

    session.language = Some("en".to_string());

    assert!(validate_mobile("9876543210"));
    session.mobile = Some("9876543210".to_string());
    let code = generate_otp();
    session.issue_otp(code.clone(), at(0, 0));

    // Correct code entered five minutes after issuance.
    session.verify_otp(&code, at(5, 0), 10).unwrap();
    assert!(session.authenticated);
    assert_eq!(session.gate(WizardStep::Verification), Err(WizardStep::Profession));

    session.profession = Some("Electrician".to_string());

    let fields = catalog.fields_for("Electrician");
    let mut form = HashMap::new();
    form.insert("license_number".to_string(), "EL123".to_string());
    form.insert("specialization".to_string(), "Domestic".to_string());
    form.insert("experience_years".to_string(), "5".to_string());
    session.verification_data = verification::collect(&fields, &form).unwrap();
    session.verification_complete = true;

    session.full_name = Some("Ravi Kumar".to_string());
    session.profile_complete = true;
    session.id_verified = true;
    session.stay_decided = Some(false);

    // The modern template carries the collected fields as labelled rows.
    let snapshot = ResumeSnapshot::from_session(&session);
    let text = ResumeBuilder::build(&snapshot, ResumeTemplate::Modern, None).plain_text();
    assert!(text.contains("License Number: EL123"));
    assert!(text.contains("Experience Years: 5"));

    session.resume_path = Some("uploads/resume_9876543210.pdf".to_string());
    assert!(session.gate(WizardStep::Jobs).is_ok());
    assert_eq!(session.next_uri(), "/jobs");

    let jobs = JobRecommender::fallback_recommendations(&MatchProfile::from_session(&session));
    assert!(!jobs.is_empty());
    assert!(jobs.iter().all(|j| j.match_score <= 98));
}

#[test]
fn repeated_wrong_codes_do_not_lock_out_a_late_correct_entry() {
    let mut session = WizardSession::new("retry".to_string(), at(0, 0), 7);
    session.language = Some("en".to_string());
    session.mobile = Some("9876543210".to_string());
    session.issue_otp("424242".to_string(), at(0, 0));

    // Three wrong attempts spread over the validity window.
    for minute in [2, 4, 6] {
        assert!(session.verify_otp("000000", at(minute, 0), 10).is_err());
        assert!(!session.authenticated);
    }

    // The correct code at nine minutes elapsed still logs in.
    session.verify_otp("424242", at(9, 0), 10).unwrap();
    assert!(session.authenticated);
}
