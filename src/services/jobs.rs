use log::warn;
use serde::Deserialize;

use crate::config::Config;
use crate::models::{JobPosting, MatchProfile};
use crate::services::ai::GeminiService;

pub struct JobRecommender;

/// Lenient shape for model-produced postings; anything missing gets a
/// neutral default rather than failing the whole list.
#[derive(Debug, Deserialize)]
struct RawPosting {
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    description: Option<String>,
    #[serde(alias = "salary")]
    salary_range: Option<String>,
    experience: Option<String>,
    #[serde(default)]
    skills: Vec<String>,
    match_score: Option<i64>,
}

impl RawPosting {
    fn into_posting(self, index: usize) -> JobPosting {
        JobPosting {
            id: format!("job-ai-{}", index + 1),
            title: self.title.unwrap_or_else(|| "Skilled Worker".to_string()),
            company: self.company.unwrap_or_else(|| "Hiring Company".to_string()),
            location: self.location.unwrap_or_else(|| "India".to_string()),
            description: self.description.unwrap_or_default(),
            salary_range: self.salary_range.unwrap_or_else(|| "Negotiable".to_string()),
            experience: self.experience.unwrap_or_default(),
            skills: self.skills,
            match_score: self.match_score.unwrap_or(85).clamp(0, 100) as u8,
            source: "AI Recommended".to_string(),
            apply_url: "#".to_string(),
        }
    }
}

impl JobRecommender {
    /// Ranked recommendations for a profile. The model path is best-effort;
    /// anything short of a well-formed non-empty list falls back to the
    /// deterministic generator.
    pub async fn recommend(profile: &MatchProfile) -> Vec<JobPosting> {
        if Config::is_gemini_enabled() {
            match Self::ai_recommendations(profile).await {
                Some(jobs) if !jobs.is_empty() => return jobs,
                _ => warn!("AI job recommendation unavailable, using fallback list"),
            }
        }
        Self::fallback_recommendations(profile)
    }

    async fn ai_recommendations(profile: &MatchProfile) -> Option<Vec<JobPosting>> {
        let prompt = format!(
            "Generate 5 realistic job recommendations for a {} in India with the \
             following details:\n\
             - Experience: {} years\n\
             - Skills: {}\n\
             - Preferred Location: {}\n\n\
             For each job provide: title, company (realistic Indian company), \
             location (Indian city), description (2-3 lines), salary (realistic \
             Indian market range in INR), experience required, key skills, and a \
             match_score between 85 and 98.\n\n\
             Return only a JSON array without any other text. Format: \
             [{{\"title\": \"\", \"company\": \"\", \"location\": \"\", \
             \"description\": \"\", \"salary\": \"\", \"experience\": \"\", \
             \"skills\": [], \"match_score\": 0}}]",
            profile.profession, profile.experience_years, profile.skills, profile.location
        );

        let text = GeminiService::generate(&prompt).await.ok()?;
        Self::parse_ai_postings(&text)
    }

    /// Parse a model response into postings, tolerating markdown fences.
    pub fn parse_ai_postings(text: &str) -> Option<Vec<JobPosting>> {
        let cleaned = text.replace("```json", "").replace("```", "");
        let raw: Vec<RawPosting> = serde_json::from_str(cleaned.trim()).ok()?;

        let mut jobs: Vec<JobPosting> = raw
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.into_posting(i))
            .collect();
        jobs.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        Some(jobs)
    }

    /// Pure fallback: no network, no randomness. Known trades get a curated
    /// posting plus two generated openings; unknown trades still get the
    /// generated pair, so the list is never empty.
    pub fn fallback_recommendations(profile: &MatchProfile) -> Vec<JobPosting> {
        let experience = profile.experience_years.max(0);
        let mut jobs = Self::curated_postings(profile);

        jobs.push(JobPosting {
            id: "job-fallback-senior".to_string(),
            title: format!("Senior {}", profile.profession),
            company: "Premium Services Ltd.".to_string(),
            location: "Delhi, NCR".to_string(),
            description: format!(
                "Looking for experienced {} with verified credentials.",
                profile.profession.to_lowercase()
            ),
            salary_range: format!(
                "₹{} - ₹{}/month",
                20_000 + experience * 1_000,
                30_000 + experience * 1_000
            ),
            experience: format!("{}+ years", experience.max(2)),
            skills: vec![
                "Professional".to_string(),
                "Verified".to_string(),
                "Reliable".to_string(),
            ],
            match_score: Self::match_score(experience.max(2), &["Professional"], profile),
            source: "BlueCollar Jobs".to_string(),
            apply_url: "#".to_string(),
        });

        jobs.push(JobPosting {
            id: "job-fallback-professional".to_string(),
            title: format!("Professional {}", profile.profession),
            company: "Quality Work Solutions".to_string(),
            location: "Bangalore, Karnataka".to_string(),
            description: format!(
                "Immediate opening for skilled {} with good experience.",
                profile.profession.to_lowercase()
            ),
            salary_range: format!(
                "₹{} - ₹{}/month",
                18_000 + experience * 800,
                28_000 + experience * 800
            ),
            experience: format!("{}+ years", (experience - 1).max(1)),
            skills: vec![
                "Skilled".to_string(),
                "Experienced".to_string(),
                "Professional".to_string(),
            ],
            match_score: Self::match_score((experience - 1).max(1), &["Skilled"], profile),
            source: "Job Portal".to_string(),
            apply_url: "#".to_string(),
        });

        jobs.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        jobs
    }

    fn curated_postings(profile: &MatchProfile) -> Vec<JobPosting> {
        match profile.profession.as_str() {
            "Driver" => vec![JobPosting {
                id: "job-driver-1".to_string(),
                title: "Commercial Driver".to_string(),
                company: "Logistics Solutions Ltd".to_string(),
                location: "Mumbai, Maharashtra".to_string(),
                description:
                    "Required experienced driver for commercial vehicle operations with valid license."
                        .to_string(),
                salary_range: "₹25,000 - ₹35,000/month".to_string(),
                experience: "2+ years".to_string(),
                skills: vec![
                    "Valid Driving License".to_string(),
                    "Route Knowledge".to_string(),
                    "Vehicle Maintenance".to_string(),
                ],
                match_score: Self::match_score(2, &["License", "Route"], profile),
                source: "BlueCollar Jobs".to_string(),
                apply_url: "#".to_string(),
            }],
            "Electrician" => vec![JobPosting {
                id: "job-electrician-1".to_string(),
                title: "Industrial Electrician".to_string(),
                company: "Power Tech Industries".to_string(),
                location: "Pune, Maharashtra".to_string(),
                description:
                    "Need certified electrician for industrial electrical work and maintenance."
                        .to_string(),
                salary_range: "₹22,000 - ₹32,000/month".to_string(),
                experience: "3+ years".to_string(),
                skills: vec![
                    "Electrical Certification".to_string(),
                    "Wiring".to_string(),
                    "Troubleshooting".to_string(),
                ],
                match_score: Self::match_score(3, &["Wiring", "Certification"], profile),
                source: "BlueCollar Jobs".to_string(),
                apply_url: "#".to_string(),
            }],
            _ => Vec::new(),
        }
    }

    /// Score a posting against a profile: base 80, +10 when the user meets
    /// the required experience (+5 when within two years), +5 per matched
    /// skill keyword capped at +10, total capped at 98.
    pub fn match_score(required_years: i64, required_skills: &[&str], profile: &MatchProfile) -> u8 {
        let mut score: i64 = 80;

        if profile.experience_years >= required_years {
            score += 10;
        } else if profile.experience_years >= required_years - 2 {
            score += 5;
        }

        let user_skills = profile.skills.to_lowercase();
        let matched = required_skills
            .iter()
            .filter(|s| user_skills.contains(&s.to_lowercase()))
            .count() as i64;
        if matched > 0 {
            score += (matched * 5).min(10);
        }

        score.min(98) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(profession: &str, experience_years: i64, skills: &str) -> MatchProfile {
        MatchProfile {
            profession: profession.to_string(),
            experience_years,
            skills: skills.to_string(),
            location: "Mumbai".to_string(),
        }
    }

    #[test]
    fn unknown_profession_still_gets_postings_within_score_cap() {
        let jobs = JobRecommender::fallback_recommendations(&profile("Beekeeper", 4, ""));
        assert!(!jobs.is_empty());
        assert!(jobs.iter().all(|j| j.match_score <= 98));
        assert!(jobs.iter().any(|j| j.title == "Senior Beekeeper"));
    }

    #[test]
    fn fallback_is_deterministic() {
        let p = profile("Electrician", 5, "wiring");
        let a = JobRecommender::fallback_recommendations(&p);
        let b = JobRecommender::fallback_recommendations(&p);
        let ids: Vec<_> = a.iter().map(|j| (&j.id, j.match_score)).collect();
        let ids_b: Vec<_> = b.iter().map(|j| (&j.id, j.match_score)).collect();
        assert_eq!(ids, ids_b);
    }

    #[test]
    fn postings_are_ranked_descending() {
        let jobs = JobRecommender::fallback_recommendations(&profile("Driver", 3, "route knowledge"));
        assert!(jobs.windows(2).all(|w| w[0].match_score >= w[1].match_score));
    }

    #[test]
    fn curated_posting_appears_for_known_trades() {
        let jobs = JobRecommender::fallback_recommendations(&profile("Driver", 3, ""));
        assert!(jobs.iter().any(|j| j.title == "Commercial Driver"));
    }

    #[test]
    fn match_score_rewards_experience_and_skills() {
        // Meets required experience: 80 + 10.
        assert_eq!(JobRecommender::match_score(3, &[], &profile("X", 3, "")), 90);
        // Within two years of the requirement: 80 + 5.
        assert_eq!(JobRecommender::match_score(5, &[], &profile("X", 3, "")), 85);
        // More than two years short: base only.
        assert_eq!(JobRecommender::match_score(6, &[], &profile("X", 3, "")), 80);
        // Skill keywords add five each, capped at ten.
        assert_eq!(
            JobRecommender::match_score(3, &["wiring"], &profile("X", 3, "wiring and more")),
            95
        );
        assert_eq!(
            JobRecommender::match_score(
                3,
                &["wiring", "safety", "testing"],
                &profile("X", 3, "wiring safety testing")
            ),
            98,
            "skill bonus caps at ten and total at 98"
        );
    }

    #[test]
    fn salary_scales_with_experience_but_score_stays_capped() {
        let jobs = JobRecommender::fallback_recommendations(&profile("Mason", 30, "everything"));
        assert!(jobs.iter().all(|j| j.match_score <= 98));
        let senior = jobs.iter().find(|j| j.id == "job-fallback-senior").unwrap();
        assert!(senior.salary_range.contains("50000"));
    }

    #[test]
    fn ai_postings_parse_through_markdown_fences() {
        let text = r#"```json
        [{"title": "Site Electrician", "company": "Acme Power", "location": "Nagpur",
          "description": "Maintain site wiring.", "salary": "₹20,000 - ₹28,000/month",
          "experience": "2+ years", "skills": ["Wiring"], "match_score": 91}]
        ```"#;

        let jobs = JobRecommender::parse_ai_postings(text).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Site Electrician");
        assert_eq!(jobs[0].salary_range, "₹20,000 - ₹28,000/month");
        assert_eq!(jobs[0].match_score, 91);
        assert_eq!(jobs[0].source, "AI Recommended");
    }

    #[test]
    fn malformed_ai_payload_is_rejected() {
        assert!(JobRecommender::parse_ai_postings("not json").is_none());
        assert!(JobRecommender::parse_ai_postings("{\"title\": \"one object\"}").is_none());
    }

    #[test]
    fn ai_scores_are_clamped() {
        let text = r#"[{"title": "T", "match_score": 250}]"#;
        let jobs = JobRecommender::parse_ai_postings(text).unwrap();
        assert_eq!(jobs[0].match_score, 100);
    }
}
