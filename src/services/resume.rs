use chrono::Utc;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::models::{ResumeSnapshot, ResumeTemplate};
use crate::services::ai::GeminiService;

const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 15.0;
const BOTTOM_MARGIN_MM: f32 = 18.0;
const WRAP_COLUMNS: usize = 95;

/// Layout-independent content blocks. Templates arrange the same data into
/// different block shapes; rendering walks them in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(String),
    KeyValues(Vec<(String, String)>),
    Bullets(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: Option<String>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDocument {
    pub name_line: String,
    pub profession_line: String,
    pub sections: Vec<Section>,
    pub footer: Option<String>,
}

impl ResumeDocument {
    /// Flattened text content, one line per rendered row. Used by tests to
    /// assert on content independent of PDF bytes.
    pub fn plain_text(&self) -> String {
        let mut lines = vec![self.name_line.clone()];
        if !self.profession_line.is_empty() {
            lines.push(self.profession_line.clone());
        }
        for section in &self.sections {
            if let Some(heading) = &section.heading {
                lines.push(heading.clone());
            }
            for block in &section.blocks {
                match block {
                    Block::Paragraph(text) => lines.push(text.clone()),
                    Block::KeyValues(rows) => {
                        lines.extend(rows.iter().map(|(label, value)| format!("{}: {}", label, value)));
                    }
                    Block::Bullets(items) => {
                        lines.extend(items.iter().map(|item| format!("- {}", item)));
                    }
                }
            }
        }
        if let Some(footer) = &self.footer {
            lines.push(footer.clone());
        }
        lines.join("\n")
    }
}

pub struct ResumeBuilder;

impl ResumeBuilder {
    /// Assemble the document model. Pure: identical input (and no AI
    /// summary) always yields an identical document.
    pub fn build(
        snapshot: &ResumeSnapshot,
        template: ResumeTemplate,
        ai_summary: Option<&str>,
    ) -> ResumeDocument {
        let summary = match ai_summary {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => Self::summary(snapshot),
        };

        match template {
            ResumeTemplate::Modern => Self::modern(snapshot, summary),
            ResumeTemplate::Classic => Self::classic(snapshot, summary),
            ResumeTemplate::Compact => Self::compact(snapshot, summary),
            ResumeTemplate::Executive => Self::executive(snapshot, summary),
        }
    }

    /// Deterministic templated summary used whenever the AI collaborator is
    /// absent or fails.
    pub fn summary(snapshot: &ResumeSnapshot) -> String {
        let data = &snapshot.verification_data;
        let profession = Self::profession_or_default(snapshot);

        let mut clauses: Vec<String> = Vec::new();
        if let Some(exp) = data.get("experience_years").filter(|v| !v.is_empty()) {
            clauses.push(format!("with {} years of professional experience", exp));
        }
        if let Some(spec) = data.get("specialization").filter(|v| !v.is_empty()) {
            clauses.push(format!("specializing in {}", spec));
        }
        if let Some(skills) = data
            .get("skills")
            .or_else(|| data.get("tools"))
            .filter(|v| !v.is_empty())
        {
            clauses.push(format!("skilled in {}", skills));
        }

        if clauses.is_empty() {
            return format!(
                "Professional {} with verified credentials and proven track record.",
                profession
            );
        }
        format!("Experienced {} {}.", profession, clauses.join(", "))
    }

    /// `snake_case` field name to a display label: `license_number` becomes
    /// `License Number`.
    pub fn field_label(name: &str) -> String {
        name.split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn profession_or_default(snapshot: &ResumeSnapshot) -> &str {
        if snapshot.profession.is_empty() {
            "Professional"
        } else {
            &snapshot.profession
        }
    }

    fn name_or_default(snapshot: &ResumeSnapshot) -> &str {
        if snapshot.full_name.is_empty() {
            "Professional"
        } else {
            &snapshot.full_name
        }
    }

    fn contact_entries(snapshot: &ResumeSnapshot) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        if !snapshot.mobile.is_empty() {
            entries.push(("Mobile".to_string(), snapshot.mobile.clone()));
        }
        if !snapshot.email.is_empty() {
            entries.push(("Email".to_string(), snapshot.email.clone()));
        }
        if !snapshot.address.is_empty() {
            entries.push(("Address".to_string(), snapshot.address.clone()));
        }
        entries
    }

    fn contact_line(snapshot: &ResumeSnapshot) -> Option<String> {
        let entries = Self::contact_entries(snapshot);
        if entries.is_empty() {
            return None;
        }
        Some(
            entries
                .iter()
                .map(|(label, value)| format!("{}: {}", label, value))
                .collect::<Vec<_>>()
                .join(" | "),
        )
    }

    /// Every non-empty verification field as a `Label: Value` row, in schema
    /// order. All templates render all rows.
    fn detail_rows(snapshot: &ResumeSnapshot) -> Vec<(String, String)> {
        snapshot
            .verification_data
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(name, value)| (Self::field_label(name), value.clone()))
            .collect()
    }

    fn status_rows(snapshot: &ResumeSnapshot) -> Vec<(String, String)> {
        vec![
            (
                "Identity".to_string(),
                if snapshot.id_verified { "Verified" } else { "Pending" }.to_string(),
            ),
            ("Professional Details".to_string(), "Verified".to_string()),
            ("Mobile Number".to_string(), "Verified".to_string()),
        ]
    }

    fn modern(snapshot: &ResumeSnapshot, summary: String) -> ResumeDocument {
        let mut sections = Vec::new();

        if let Some(contact) = Self::contact_line(snapshot) {
            sections.push(Section {
                heading: None,
                blocks: vec![Block::Paragraph(contact)],
            });
        }

        sections.push(Section {
            heading: Some("PROFESSIONAL SUMMARY".to_string()),
            blocks: vec![Block::Paragraph(summary)],
        });

        let details = Self::detail_rows(snapshot);
        if !details.is_empty() {
            sections.push(Section {
                heading: Some("PROFESSIONAL DETAILS".to_string()),
                blocks: vec![Block::KeyValues(details)],
            });
        }

        if let Some(exp) = snapshot.verification_data.get("experience_years") {
            if !exp.trim().is_empty() {
                sections.push(Section {
                    heading: Some("EXPERIENCE SUMMARY".to_string()),
                    blocks: vec![Block::Paragraph(format!(
                        "Total Experience: {} years in the {} field",
                        exp,
                        Self::profession_or_default(snapshot)
                    ))],
                });
            }
        }

        sections.push(Section {
            heading: Some("VERIFICATION STATUS".to_string()),
            blocks: vec![Block::KeyValues(Self::status_rows(snapshot))],
        });

        ResumeDocument {
            name_line: Self::name_or_default(snapshot).to_uppercase(),
            profession_line: Self::profession_or_default(snapshot).to_string(),
            sections,
            footer: Some(
                "This resume was generated using BlueCollarResume - Verified Professional Profile"
                    .to_string(),
            ),
        }
    }

    fn classic(snapshot: &ResumeSnapshot, summary: String) -> ResumeDocument {
        let mut sections = Vec::new();

        let contact = Self::contact_entries(snapshot);
        if !contact.is_empty() {
            sections.push(Section {
                heading: None,
                blocks: vec![Block::KeyValues(contact)],
            });
        }

        sections.push(Section {
            heading: Some("Professional Summary".to_string()),
            blocks: vec![Block::Paragraph(summary)],
        });

        let details = Self::detail_rows(snapshot);
        if !details.is_empty() {
            sections.push(Section {
                heading: Some("Professional Details".to_string()),
                blocks: vec![Block::KeyValues(details)],
            });
        }

        sections.push(Section {
            heading: Some("Verification Status".to_string()),
            blocks: vec![Block::KeyValues(Self::status_rows(snapshot))],
        });

        ResumeDocument {
            name_line: Self::name_or_default(snapshot).to_uppercase(),
            profession_line: Self::profession_or_default(snapshot).to_string(),
            sections,
            footer: None,
        }
    }

    fn compact(snapshot: &ResumeSnapshot, summary: String) -> ResumeDocument {
        let mut sections = Vec::new();

        if let Some(contact) = Self::contact_line(snapshot) {
            sections.push(Section {
                heading: None,
                blocks: vec![Block::Paragraph(contact)],
            });
        }

        sections.push(Section {
            heading: None,
            blocks: vec![Block::Paragraph(summary)],
        });

        let details = Self::detail_rows(snapshot);
        if !details.is_empty() {
            sections.push(Section {
                heading: Some("Key Qualifications".to_string()),
                blocks: vec![Block::Bullets(
                    details
                        .into_iter()
                        .map(|(label, value)| format!("{}: {}", label, value))
                        .collect(),
                )],
            });
        }

        sections.push(Section {
            heading: Some("Verification".to_string()),
            blocks: vec![Block::KeyValues(Self::status_rows(snapshot))],
        });

        ResumeDocument {
            name_line: Self::name_or_default(snapshot).to_string(),
            profession_line: Self::profession_or_default(snapshot).to_string(),
            sections,
            footer: None,
        }
    }

    fn executive(snapshot: &ResumeSnapshot, summary: String) -> ResumeDocument {
        let mut sections = Vec::new();

        if let Some(contact) = Self::contact_line(snapshot) {
            sections.push(Section {
                heading: None,
                blocks: vec![Block::Paragraph(contact)],
            });
        }

        sections.push(Section {
            heading: Some("EXECUTIVE PROFILE".to_string()),
            blocks: vec![Block::Paragraph(summary)],
        });

        let details = Self::detail_rows(snapshot);
        if !details.is_empty() {
            sections.push(Section {
                heading: Some("CORE COMPETENCIES".to_string()),
                blocks: vec![Block::Bullets(
                    details
                        .into_iter()
                        .map(|(label, value)| format!("{}: {}", label, value))
                        .collect(),
                )],
            });
        }

        sections.push(Section {
            heading: Some("PROFESSIONAL VERIFICATION".to_string()),
            blocks: vec![Block::KeyValues(Self::status_rows(snapshot))],
        });

        ResumeDocument {
            name_line: Self::name_or_default(snapshot).to_string(),
            profession_line: Self::profession_or_default(snapshot).to_uppercase(),
            sections,
            footer: None,
        }
    }

    /// Render and write the PDF. Document content drives pagination: a page
    /// break is inserted whenever the cursor reaches the bottom margin.
    pub fn render_pdf(document: &ResumeDocument, path: &Path) -> Result<(), String> {
        let (doc, page, layer) = PdfDocument::new(
            document.name_line.clone(),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| e.to_string())?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| e.to_string())?;

        let mut cursor = PageCursor {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        };

        cursor.write(&document.name_line, 18.0, &bold, 8.0);
        if !document.profession_line.is_empty() {
            cursor.write(&document.profession_line, 12.0, &regular, 7.0);
        }
        cursor.gap(2.0);

        for section in &document.sections {
            if let Some(heading) = &section.heading {
                cursor.gap(2.0);
                cursor.write(heading, 13.0, &bold, 6.5);
            }
            for block in &section.blocks {
                match block {
                    Block::Paragraph(text) => {
                        for line in wrap_text(text, WRAP_COLUMNS) {
                            cursor.write(&line, 10.0, &regular, 5.0);
                        }
                    }
                    Block::KeyValues(rows) => {
                        for (label, value) in rows {
                            cursor.write(&format!("{}: {}", label, value), 10.0, &regular, 5.0);
                        }
                    }
                    Block::Bullets(items) => {
                        for item in items {
                            cursor.write(&format!("- {}", item), 10.0, &regular, 5.0);
                        }
                    }
                }
            }
            cursor.gap(3.0);
        }

        if let Some(footer) = &document.footer {
            cursor.gap(4.0);
            cursor.write(footer, 8.0, &regular, 4.0);
        }

        let file =
            File::create(path).map_err(|e| format!("cannot create {}: {}", path.display(), e))?;
        doc.save(&mut BufWriter::new(file)).map_err(|e| e.to_string())
    }

    /// Build, render and store a résumé; returns the written path. The AI
    /// summary is best-effort and its absence keeps the output deterministic.
    pub async fn generate(
        snapshot: &ResumeSnapshot,
        template: ResumeTemplate,
        out_dir: &str,
    ) -> Result<String, String> {
        let ai_summary = GeminiService::professional_summary(snapshot).await;
        let document = Self::build(snapshot, template, ai_summary.as_deref());

        std::fs::create_dir_all(out_dir)
            .map_err(|e| format!("cannot create {}: {}", out_dir, e))?;
        let filename = format!(
            "resume_{}_{}.pdf",
            snapshot.mobile,
            Utc::now().format("%Y%m%d_%H%M%S")
        );
        let path = Path::new(out_dir).join(filename);
        Self::render_pdf(&document, &path)?;
        Ok(path.to_string_lossy().into_owned())
    }
}

struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PageCursor<'_> {
    fn write(&mut self, text: &str, size: f32, font: &IndirectFontRef, advance: f32) {
        if self.y < BOTTOM_MARGIN_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        self.layer
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.y), font);
        self.y -= advance;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

/// Greedy word wrap by column count; built-in PDF fonts carry no metrics, so
/// a character budget stands in for measured widths.
pub fn wrap_text(text: &str, max_columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_columns {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn electrician_snapshot() -> ResumeSnapshot {
        let mut verification_data = IndexMap::new();
        verification_data.insert("license_number".to_string(), "EL123".to_string());
        verification_data.insert("specialization".to_string(), "Domestic".to_string());
        verification_data.insert("experience_years".to_string(), "5".to_string());

        ResumeSnapshot {
            full_name: "Ravi Kumar".to_string(),
            mobile: "9876543210".to_string(),
            email: "ravi@example.com".to_string(),
            address: "Pune, Maharashtra".to_string(),
            profession: "Electrician".to_string(),
            verification_data,
            id_verified: true,
        }
    }

    #[test]
    fn build_is_deterministic_without_ai_summary() {
        let snapshot = electrician_snapshot();
        for template in ResumeTemplate::ALL {
            let first = ResumeBuilder::build(&snapshot, template, None);
            let second = ResumeBuilder::build(&snapshot, template, None);
            assert_eq!(first, second, "{} template drifted", template.key());
        }
    }

    #[test]
    fn every_template_renders_every_verification_field() {
        let snapshot = electrician_snapshot();
        for template in ResumeTemplate::ALL {
            let text = ResumeBuilder::build(&snapshot, template, None).plain_text();
            assert!(
                text.contains("License Number: EL123"),
                "{} missing license row",
                template.key()
            );
            assert!(
                text.contains("Specialization: Domestic"),
                "{} missing specialization row",
                template.key()
            );
            assert!(
                text.contains("Experience Years: 5"),
                "{} missing experience row",
                template.key()
            );
        }
    }

    #[test]
    fn modern_details_section_holds_labelled_rows() {
        let snapshot = electrician_snapshot();
        let document = ResumeBuilder::build(&snapshot, ResumeTemplate::Modern, None);

        let details = document
            .sections
            .iter()
            .find(|s| s.heading.as_deref() == Some("PROFESSIONAL DETAILS"))
            .expect("modern template has a details section");

        match &details.blocks[0] {
            Block::KeyValues(rows) => {
                assert!(rows.contains(&("License Number".to_string(), "EL123".to_string())));
                assert!(rows.contains(&("Experience Years".to_string(), "5".to_string())));
            }
            other => panic!("expected key/value rows, got {:?}", other),
        }
    }

    #[test]
    fn templates_change_layout_not_data() {
        let snapshot = electrician_snapshot();
        let modern = ResumeBuilder::build(&snapshot, ResumeTemplate::Modern, None);
        let compact = ResumeBuilder::build(&snapshot, ResumeTemplate::Compact, None);

        assert_ne!(modern, compact);
        // The compact layout renders details as bullets instead of a table.
        assert!(compact.plain_text().contains("- License Number: EL123"));
    }

    #[test]
    fn empty_contact_fields_are_omitted() {
        let mut snapshot = electrician_snapshot();
        snapshot.email = String::new();
        snapshot.address = String::new();

        let text = ResumeBuilder::build(&snapshot, ResumeTemplate::Modern, None).plain_text();
        assert!(text.contains("Mobile: 9876543210"));
        assert!(!text.contains("Email:"));
        assert!(!text.contains("Address:"));
    }

    #[test]
    fn summary_synthesizes_from_verification_fields() {
        let snapshot = electrician_snapshot();
        let summary = ResumeBuilder::summary(&snapshot);
        assert!(summary.contains("Experienced Electrician"));
        assert!(summary.contains("5 years"));
        assert!(summary.contains("specializing in Domestic"));
    }

    #[test]
    fn summary_falls_back_to_generic_sentence() {
        let mut snapshot = electrician_snapshot();
        snapshot.verification_data.clear();
        assert_eq!(
            ResumeBuilder::summary(&snapshot),
            "Professional Electrician with verified credentials and proven track record."
        );
    }

    #[test]
    fn ai_summary_overrides_the_templated_sentence() {
        let snapshot = electrician_snapshot();
        let document =
            ResumeBuilder::build(&snapshot, ResumeTemplate::Modern, Some("A custom summary."));
        assert!(document.plain_text().contains("A custom summary."));

        // Whitespace-only AI output is ignored.
        let document = ResumeBuilder::build(&snapshot, ResumeTemplate::Modern, Some("  "));
        assert!(document.plain_text().contains("Experienced Electrician"));
    }

    #[test]
    fn verification_status_follows_id_state() {
        let mut snapshot = electrician_snapshot();
        snapshot.id_verified = false;
        let text = ResumeBuilder::build(&snapshot, ResumeTemplate::Classic, None).plain_text();
        assert!(text.contains("Identity: Pending"));
        assert!(text.contains("Mobile Number: Verified"));
    }

    #[test]
    fn field_labels_title_case_snake_names() {
        assert_eq!(ResumeBuilder::field_label("license_number"), "License Number");
        assert_eq!(ResumeBuilder::field_label("experience_years"), "Experience Years");
        assert_eq!(ResumeBuilder::field_label("tools"), "Tools");
    }

    #[test]
    fn wrap_text_respects_the_column_budget() {
        let text = "one two three four five six seven eight nine ten";
        let lines = wrap_text(text, 18);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= 18));
        assert_eq!(lines.join(" "), text);
        assert!(wrap_text("", 18).is_empty());
    }

    #[test]
    fn rendered_pdf_is_written_to_disk() {
        let snapshot = electrician_snapshot();
        let document = ResumeBuilder::build(&snapshot, ResumeTemplate::Modern, None);

        let path = std::env::temp_dir().join(format!("resume_render_{}.pdf", std::process::id()));
        ResumeBuilder::render_pdf(&document, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn long_documents_paginate_without_error() {
        let mut snapshot = electrician_snapshot();
        for i in 0..80 {
            snapshot
                .verification_data
                .insert(format!("extra_field_{}", i), format!("value {}", i));
        }
        let document = ResumeBuilder::build(&snapshot, ResumeTemplate::Classic, None);

        let path = std::env::temp_dir().join(format!("resume_paged_{}.pdf", std::process::id()));
        ResumeBuilder::render_pdf(&document, &path).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
        std::fs::remove_file(&path).ok();
    }
}
