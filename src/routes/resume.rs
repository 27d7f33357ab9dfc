use log::{error, warn};
use mongodb::bson::DateTime;
use rocket::State;
use rocket::form::Form;
use rocket::http::{ContentType, Header};
use rocket::request::FlashMessage;
use rocket::response::{self, Flash, Redirect, Responder, Response};
use rocket_dyn_templates::{Template, context};
use serde_json::json;
use std::io::Cursor;
use std::path::Path;

use crate::config::Config;
use crate::db::DbConn;
use crate::guards::SessionGuard;
use crate::models::{ResumeAudit, ResumeSnapshot, ResumeTemplate, WizardStep};
use crate::routes::{flash_parts, persist};
use crate::services::ResumeBuilder;

#[derive(FromForm)]
pub struct ResumeForm {
    pub template: String,
}

/// Serves a stored PDF as a download rather than an inline page.
pub struct PdfAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl<'r> Responder<'r, 'static> for PdfAttachment {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> response::Result<'static> {
        Response::build()
            .header(ContentType::PDF)
            .header(Header::new(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            ))
            .sized_body(self.bytes.len(), Cursor::new(self.bytes))
            .ok()
    }
}

#[get("/resume")]
pub async fn resume_page(
    guard: SessionGuard,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    let session = &guard.session;
    if let Err(step) = session.gate(WizardStep::Resume) {
        return Err(Redirect::to(session.entry_uri_for(step)));
    }

    let templates: Vec<_> = ResumeTemplate::ALL
        .iter()
        .map(|t| {
            json!({
                "id": t.key(),
                "name": t.display_name(),
                "description": t.description(),
            })
        })
        .collect();

    let (flash_kind, flash_message) = flash_parts(flash);
    Ok(Template::render(
        "resume",
        context! {
            templates,
            generated: session.resume_path.is_some(),
            flash_kind,
            flash_message,
        },
    ))
}

#[post("/resume", data = "<form>")]
pub async fn resume_submit(
    db: &State<DbConn>,
    mut guard: SessionGuard,
    form: Form<ResumeForm>,
) -> Result<Redirect, Flash<Redirect>> {
    let session = &mut guard.session;
    if let Err(step) = session.gate(WizardStep::Resume) {
        return Ok(Redirect::to(session.entry_uri_for(step)));
    }
    let mobile = match session.mobile.clone() {
        Some(mobile) => mobile,
        None => return Ok(Redirect::to("/login")),
    };

    let template = ResumeTemplate::parse(&form.template);
    let snapshot = ResumeSnapshot::from_session(session);

    let path = ResumeBuilder::generate(&snapshot, template, &Config::upload_dir())
        .await
        .map_err(|e| {
            error!("resume generation failed: {}", e);
            Flash::error(
                Redirect::to("/resume"),
                "Could not generate your resume. Please try again.",
            )
        })?;

    // Best-effort audit row; the document itself is the source of truth.
    let audit = ResumeAudit {
        user_mobile: mobile,
        template: template.key().to_string(),
        path: path.clone(),
        created_at: DateTime::now(),
    };
    if let Err(e) = db
        .collection::<ResumeAudit>("resume_audit")
        .insert_one(&audit, None)
        .await
    {
        warn!("resume audit insert failed: {}", e);
    }

    session.resume_path = Some(path);
    persist(db, session, "/resume").await?;
    Ok(Redirect::to("/jobs"))
}

#[get("/download-resume")]
pub async fn download_resume(guard: SessionGuard) -> Result<PdfAttachment, Flash<Redirect>> {
    let session = &guard.session;

    let path = match &session.resume_path {
        Some(path) if Path::new(path).exists() => path.clone(),
        _ => {
            return Err(Flash::error(
                Redirect::to("/resume"),
                "Resume not found. Please generate your resume first.",
            ));
        }
    };

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        error!("resume read failed: {}", e);
        Flash::error(
            Redirect::to("/resume"),
            "Resume not found. Please generate your resume first.",
        )
    })?;

    let filename = Path::new(&path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "resume.pdf".to_string());

    Ok(PdfAttachment { filename, bytes })
}
