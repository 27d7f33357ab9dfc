use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Select,
}

/// One profession-specific form field collected at the verification step.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationField {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub options: Vec<String>,
    pub required: bool,
}

impl VerificationField {
    fn text(name: &str, label: &str, required: bool) -> Self {
        VerificationField {
            name: name.to_string(),
            label: label.to_string(),
            field_type: FieldType::Text,
            options: Vec::new(),
            required,
        }
    }

    fn number(name: &str, label: &str, required: bool) -> Self {
        VerificationField {
            name: name.to_string(),
            label: label.to_string(),
            field_type: FieldType::Number,
            options: Vec::new(),
            required,
        }
    }

    fn select(name: &str, label: &str, options: &[&str], required: bool) -> Self {
        VerificationField {
            name: name.to_string(),
            label: label.to_string(),
            field_type: FieldType::Select,
            options: options.iter().map(|o| o.to_string()).collect(),
            required,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfessionSpec {
    pub icon: String,
    pub fields: Vec<VerificationField>,
}

impl ProfessionSpec {
    fn new(icon: &str, fields: Vec<VerificationField>) -> Self {
        ProfessionSpec {
            icon: icon.to_string(),
            fields,
        }
    }
}

/// Static profession → verification-field schema. Built once at launch and
/// managed as Rocket state; ordering is display order.
#[derive(Debug, Clone)]
pub struct ProfessionCatalog {
    professions: IndexMap<String, ProfessionSpec>,
}

impl ProfessionCatalog {
    pub fn standard() -> Self {
        use VerificationField as F;

        let mut professions = IndexMap::new();

        professions.insert(
            "Driver".to_string(),
            ProfessionSpec::new(
                "fas fa-truck",
                vec![
                    F::text("license_number", "Driving License Number", true),
                    F::select(
                        "vehicle_type",
                        "Vehicle Type",
                        &["Car", "Motorcycle", "Truck", "Bus", "Auto Rickshaw"],
                        true,
                    ),
                    F::number("experience_years", "Years of Experience", true),
                    F::text("areas_covered", "Areas Covered", false),
                    F::select(
                        "license_type",
                        "License Type",
                        &["LMV", "MCWG", "HMV", "Transport"],
                        true,
                    ),
                ],
            ),
        );

        professions.insert(
            "Electrician".to_string(),
            ProfessionSpec::new(
                "fas fa-bolt",
                vec![
                    F::text("license_number", "Electrician License Number", true),
                    F::select(
                        "specialization",
                        "Specialization",
                        &["Domestic", "Industrial", "Commercial", "Automotive"],
                        true,
                    ),
                    F::number("experience_years", "Years of Experience", true),
                    F::text("certifications", "Certifications", false),
                    F::text("wiring_types", "Wiring Types Known", false),
                ],
            ),
        );

        professions.insert(
            "Plumber".to_string(),
            ProfessionSpec::new(
                "fas fa-faucet",
                vec![
                    F::text("license_number", "Plumber License Number", true),
                    F::select(
                        "specialization",
                        "Specialization",
                        &["Residential", "Commercial", "Industrial", "Pipeline"],
                        true,
                    ),
                    F::number("experience_years", "Years of Experience", true),
                    F::text("pipe_materials", "Pipe Materials Worked With", false),
                    F::text("tools", "Tools Available", false),
                ],
            ),
        );

        professions.insert(
            "Carpenter".to_string(),
            ProfessionSpec::new(
                "fas fa-hammer",
                vec![
                    F::number("experience_years", "Years of Experience", true),
                    F::select(
                        "specialization",
                        "Specialization",
                        &["Furniture", "Cabinet", "Construction", "Repair"],
                        true,
                    ),
                    F::text("wood_types", "Wood Types Worked With", false),
                    F::text("tools", "Tools Available", false),
                    F::number("projects_completed", "Projects Completed", false),
                ],
            ),
        );

        professions.insert(
            "Mechanic".to_string(),
            ProfessionSpec::new(
                "fas fa-tools",
                vec![
                    F::select(
                        "specialization",
                        "Specialization",
                        &["Car", "Motorcycle", "Heavy Vehicle", "AC Repair", "General"],
                        true,
                    ),
                    F::number("experience_years", "Years of Experience", true),
                    F::text("certifications", "Certifications", false),
                    F::text("tools", "Tools Available", false),
                    F::text("brands_expertise", "Brands Expertise", false),
                ],
            ),
        );

        professions.insert(
            "Welder".to_string(),
            ProfessionSpec::new(
                "fas fa-fire",
                vec![
                    F::number("experience_years", "Years of Experience", true),
                    F::select(
                        "welding_types",
                        "Welding Types",
                        &["Arc", "MIG", "TIG", "Gas", "Spot"],
                        true,
                    ),
                    F::text("materials", "Materials Worked With", false),
                    F::text("certifications", "Welding Certifications", false),
                    F::select("safety_training", "Safety Training", &["Yes", "No"], true),
                ],
            ),
        );

        professions.insert(
            "Construction Worker".to_string(),
            ProfessionSpec::new(
                "fas fa-hard-hat",
                vec![
                    F::number("experience_years", "Years of Experience", true),
                    F::select(
                        "specialization",
                        "Specialization",
                        &["Masonry", "Painting", "Welding", "Scaffolding", "General Labor"],
                        true,
                    ),
                    F::text("skills", "Specific Skills", false),
                    F::text("tools", "Tools Available", false),
                    F::text("safety_certifications", "Safety Certifications", false),
                ],
            ),
        );

        professions.insert(
            "Painter".to_string(),
            ProfessionSpec::new(
                "fas fa-paint-roller",
                vec![
                    F::number("experience_years", "Years of Experience", true),
                    F::select(
                        "painting_types",
                        "Painting Types",
                        &["Interior", "Exterior", "Commercial", "Residential", "Industrial"],
                        true,
                    ),
                    F::text("surface_types", "Surface Types", false),
                    F::text("tools", "Tools Available", false),
                    F::text("brands_expertise", "Paint Brands Expertise", false),
                ],
            ),
        );

        professions.insert(
            "Mason".to_string(),
            ProfessionSpec::new(
                "fas fa-ruler-combined",
                vec![
                    F::number("experience_years", "Years of Experience", true),
                    F::select(
                        "specialization",
                        "Specialization",
                        &["Brick", "Stone", "Concrete", "Tile", "All Types"],
                        true,
                    ),
                    F::text("materials", "Materials Worked With", false),
                    F::text("tools", "Tools Available", false),
                    F::number("projects_completed", "Projects Completed", false),
                ],
            ),
        );

        professions.insert(
            "Gardener".to_string(),
            ProfessionSpec::new(
                "fas fa-seedling",
                vec![
                    F::number("experience_years", "Years of Experience", true),
                    F::select(
                        "specialization",
                        "Specialization",
                        &[
                            "Landscaping",
                            "Lawn Care",
                            "Tree Surgery",
                            "Nursery",
                            "General Gardening",
                        ],
                        true,
                    ),
                    F::text("plant_types", "Plant Types Expertise", false),
                    F::text("tools", "Gardening Tools", false),
                    F::select("organic_methods", "Organic Methods", &["Yes", "No"], false),
                ],
            ),
        );

        professions.insert(
            "Security Guard".to_string(),
            ProfessionSpec::new(
                "fas fa-shield-alt",
                vec![
                    F::number("experience_years", "Years of Experience", true),
                    F::text("license_number", "Security License Number", true),
                    F::select(
                        "specialization",
                        "Specialization",
                        &["Corporate", "Residential", "Event", "Industrial", "Mall Security"],
                        true,
                    ),
                    F::text("training_certifications", "Training Certifications", false),
                    F::select(
                        "shift_preference",
                        "Shift Preference",
                        &["Day", "Night", "Rotating", "Any"],
                        true,
                    ),
                ],
            ),
        );

        professions.insert(
            "Cleaner".to_string(),
            ProfessionSpec::new(
                "fas fa-broom",
                vec![
                    F::number("experience_years", "Years of Experience", true),
                    F::select(
                        "cleaning_types",
                        "Cleaning Types",
                        &["House", "Office", "Industrial", "Commercial", "Car"],
                        true,
                    ),
                    F::text("equipment", "Cleaning Equipment", false),
                    F::select(
                        "chemicals_knowledge",
                        "Cleaning Chemicals Knowledge",
                        &["Basic", "Intermediate", "Expert"],
                        false,
                    ),
                    F::text("areas_covered", "Areas Covered", false),
                ],
            ),
        );

        ProfessionCatalog { professions }
    }

    pub fn contains(&self, profession: &str) -> bool {
        self.professions.contains_key(profession)
    }

    pub fn get(&self, profession: &str) -> Option<&ProfessionSpec> {
        self.professions.get(profession)
    }

    /// Field schema for a profession. Unknown professions degrade to a
    /// generic schema instead of failing, so a stale session never dead-ends
    /// the wizard.
    pub fn fields_for(&self, profession: &str) -> Vec<VerificationField> {
        match self.professions.get(profession) {
            Some(spec) => spec.fields.clone(),
            None => Self::generic_fields(),
        }
    }

    pub fn generic_fields() -> Vec<VerificationField> {
        vec![
            VerificationField::number("experience_years", "Years of Experience", true),
            VerificationField::text("skills", "Key Skills", false),
            VerificationField::text("tools", "Tools Available", false),
            VerificationField::text("certifications", "Certifications", false),
        ]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ProfessionSpec)> {
        self.professions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_profession_keeps_field_order() {
        let catalog = ProfessionCatalog::standard();
        let fields = catalog.fields_for("Electrician");
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "license_number",
                "specialization",
                "experience_years",
                "certifications",
                "wiring_types"
            ]
        );
    }

    #[test]
    fn unknown_profession_falls_back_to_generic_schema() {
        let catalog = ProfessionCatalog::standard();
        assert!(!catalog.contains("Astronaut"));

        let fields = catalog.fields_for("Astronaut");
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].name, "experience_years");
        assert!(fields[0].required);
        assert!(fields[1..].iter().all(|f| !f.required));
    }

    #[test]
    fn select_fields_carry_ordered_options() {
        let catalog = ProfessionCatalog::standard();
        let fields = catalog.fields_for("Driver");
        let vehicle = fields.iter().find(|f| f.name == "vehicle_type").unwrap();
        assert_eq!(vehicle.field_type, FieldType::Select);
        assert_eq!(vehicle.options.first().map(String::as_str), Some("Car"));
        assert_eq!(vehicle.options.len(), 5);
    }

    #[test]
    fn catalog_covers_all_twelve_trades() {
        let catalog = ProfessionCatalog::standard();
        assert_eq!(catalog.iter().count(), 12);
        for (_, spec) in catalog.iter() {
            assert!(!spec.fields.is_empty());
            assert!(spec.fields.iter().any(|f| f.required));
        }
    }
}
