use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

use crate::models::VerificationField;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectError {
    MissingRequiredField(String),
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::MissingRequiredField(label) => write!(f, "Please fill in {}", label),
        }
    }
}

/// Resolve one value per schema field from the submitted form. A dictated
/// value posted under `voice_<name>` wins over the typed one; values are
/// trimmed and empties dropped. Unknown form keys are ignored, so the stored
/// map never grows beyond the profession's schema.
pub fn resolve_values(
    fields: &[VerificationField],
    form: &HashMap<String, String>,
) -> IndexMap<String, String> {
    let mut resolved = IndexMap::new();
    for field in fields {
        let voice = form
            .get(&format!("voice_{}", field.name))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty());
        let typed = form
            .get(&field.name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty());

        if let Some(value) = voice.or(typed) {
            resolved.insert(field.name.clone(), value.to_string());
        }
    }
    resolved
}

/// First required field with no resolved value, in schema order.
pub fn validate_required(
    fields: &[VerificationField],
    resolved: &IndexMap<String, String>,
) -> Result<(), CollectError> {
    for field in fields {
        if field.required && !resolved.contains_key(&field.name) {
            return Err(CollectError::MissingRequiredField(field.label.clone()));
        }
    }
    Ok(())
}

/// Full collection pass. On failure the partial map is returned alongside the
/// error so the step can re-render without losing already-entered values.
pub fn collect(
    fields: &[VerificationField],
    form: &HashMap<String, String>,
) -> Result<IndexMap<String, String>, (CollectError, IndexMap<String, String>)> {
    let resolved = resolve_values(fields, form);
    match validate_required(fields, &resolved) {
        Ok(()) => Ok(resolved),
        Err(err) => Err((err, resolved)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfessionCatalog;

    fn form(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_required_field_reports_label_and_preserves_others() {
        let catalog = ProfessionCatalog::standard();
        let fields = catalog.fields_for("Electrician");

        // license_number (required) left empty, everything else filled.
        let submitted = form(&[
            ("license_number", "  "),
            ("specialization", "Domestic"),
            ("experience_years", "5"),
            ("certifications", "ITI Certificate"),
        ]);

        let (err, partial) = collect(&fields, &submitted).unwrap_err();
        assert_eq!(
            err,
            CollectError::MissingRequiredField("Electrician License Number".to_string())
        );
        assert_eq!(partial.get("specialization").unwrap(), "Domestic");
        assert_eq!(partial.get("experience_years").unwrap(), "5");
        assert_eq!(partial.get("certifications").unwrap(), "ITI Certificate");
    }

    #[test]
    fn voice_value_wins_over_typed_value() {
        let catalog = ProfessionCatalog::standard();
        let fields = catalog.fields_for("Electrician");

        let submitted = form(&[
            ("license_number", "EL123"),
            ("voice_license_number", "EL999"),
            ("specialization", "Domestic"),
            ("experience_years", "5"),
        ]);

        let collected = collect(&fields, &submitted).unwrap();
        assert_eq!(collected.get("license_number").unwrap(), "EL999");
    }

    #[test]
    fn empty_voice_value_falls_back_to_typed() {
        let catalog = ProfessionCatalog::standard();
        let fields = catalog.fields_for("Electrician");

        let submitted = form(&[
            ("license_number", "EL123"),
            ("voice_license_number", ""),
            ("specialization", "Domestic"),
            ("experience_years", "5"),
        ]);

        let collected = collect(&fields, &submitted).unwrap();
        assert_eq!(collected.get("license_number").unwrap(), "EL123");
    }

    #[test]
    fn optional_fields_may_stay_empty() {
        let catalog = ProfessionCatalog::standard();
        let fields = catalog.fields_for("Electrician");

        let submitted = form(&[
            ("license_number", "EL123"),
            ("specialization", "Industrial"),
            ("experience_years", "8"),
        ]);

        let collected = collect(&fields, &submitted).unwrap();
        assert_eq!(collected.len(), 3);
        assert!(!collected.contains_key("certifications"));
    }

    #[test]
    fn values_are_trimmed_and_schema_order_kept() {
        let catalog = ProfessionCatalog::standard();
        let fields = catalog.fields_for("Electrician");

        let submitted = form(&[
            ("experience_years", " 5 "),
            ("specialization", "Domestic"),
            ("license_number", "  EL123  "),
            ("stray_key", "ignored"),
        ]);

        let collected = collect(&fields, &submitted).unwrap();
        let keys: Vec<&str> = collected.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["license_number", "specialization", "experience_years"]);
        assert_eq!(collected.get("license_number").unwrap(), "EL123");
        assert!(!collected.contains_key("stray_key"));
    }
}
