use rocket::request::FlashMessage;
use rocket::response::Redirect;
use rocket_dyn_templates::{Template, context};

use crate::guards::SessionGuard;
use crate::models::{MatchProfile, WizardStep};
use crate::routes::flash_parts;
use crate::services::JobRecommender;

#[get("/jobs")]
pub async fn jobs_page(
    guard: SessionGuard,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    let session = &guard.session;
    if let Err(step) = session.gate(WizardStep::Jobs) {
        return Err(Redirect::to(session.entry_uri_for(step)));
    }

    let profile = MatchProfile::from_session(session);
    let jobs = JobRecommender::recommend(&profile).await;

    let (flash_kind, flash_message) = flash_parts(flash);
    Ok(Template::render(
        "jobs",
        context! {
            jobs,
            profession: profile.profession,
            flash_kind,
            flash_message,
        },
    ))
}
