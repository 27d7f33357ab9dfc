use mongodb::bson::{DateTime, doc};
use mongodb::options::ReplaceOptions;
use uuid::Uuid;

use crate::config::Config;
use crate::db::DbConn;
use crate::models::WizardSession;

const COLLECTION: &str = "wizard_sessions";

/// Name of the private cookie holding the session id.
pub const SESSION_COOKIE: &str = "wizard_session";

pub struct SessionStore;

impl SessionStore {
    /// Load a session by id. Expired sessions are dropped and reported as
    /// absent, so a stale cookie simply restarts the wizard.
    pub async fn load(
        db: &DbConn,
        id: &str,
    ) -> Result<Option<WizardSession>, mongodb::error::Error> {
        let found = db
            .collection::<WizardSession>(COLLECTION)
            .find_one(doc! { "_id": id }, None)
            .await?;

        match found {
            Some(session) if session.is_expired(DateTime::now()) => {
                db.collection::<WizardSession>(COLLECTION)
                    .delete_one(doc! { "_id": id }, None)
                    .await
                    .ok();
                Ok(None)
            }
            other => Ok(other),
        }
    }

    pub fn fresh() -> WizardSession {
        WizardSession::new(
            Uuid::new_v4().to_string(),
            DateTime::now(),
            Config::session_ttl_days(),
        )
    }

    /// Persist the draft and slide its expiry window. Called at every step
    /// boundary, so partial progress survives a restart.
    pub async fn save(
        db: &DbConn,
        session: &mut WizardSession,
    ) -> Result<(), mongodb::error::Error> {
        session.touch(DateTime::now(), Config::session_ttl_days());
        let options = ReplaceOptions::builder().upsert(true).build();
        db.collection::<WizardSession>(COLLECTION)
            .replace_one(doc! { "_id": &session.id }, &*session, options)
            .await?;
        Ok(())
    }

    pub async fn destroy(db: &DbConn, id: &str) -> Result<(), mongodb::error::Error> {
        db.collection::<WizardSession>(COLLECTION)
            .delete_one(doc! { "_id": id }, None)
            .await?;
        Ok(())
    }
}
