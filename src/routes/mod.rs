pub mod api;
pub mod auth;
pub mod jobs;
pub mod resume;
pub mod wizard;

use log::error;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};

use crate::db::DbConn;
use crate::models::WizardSession;
use crate::services::SessionStore;

/// Persist the session draft at a step boundary. A failed save keeps the
/// wizard on the current step; nothing already entered is lost because the
/// previous save still holds in the store.
pub(crate) async fn persist(
    db: &DbConn,
    session: &mut WizardSession,
    back: &'static str,
) -> Result<(), Flash<Redirect>> {
    SessionStore::save(db, session).await.map_err(|e| {
        error!("session save failed: {}", e);
        Flash::error(
            Redirect::to(back),
            "Something went wrong saving your progress. Please try again.",
        )
    })
}

/// Flash message split for template contexts.
pub(crate) fn flash_parts(flash: Option<FlashMessage<'_>>) -> (Option<String>, Option<String>) {
    match flash {
        Some(f) => (Some(f.kind().to_string()), Some(f.message().to_string())),
        None => (None, None),
    }
}
