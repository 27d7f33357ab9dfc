use rocket::State;
use rocket::http::{Cookie, Status};
use rocket::request::{self, FromRequest, Outcome, Request};

// === OpenAPI (compatible with rocket_okapi 0.8.0 / 0.8.1) ===
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};

use crate::db::DbConn;
use crate::models::WizardSession;
use crate::services::session_store::{SESSION_COOKIE, SessionStore};

/// Loads the caller's wizard session from the private cookie, creating a
/// fresh one (and setting the cookie) on first contact. Routes mutate the
/// session and persist it explicitly through `SessionStore::save`.
pub struct SessionGuard {
    pub session: WizardSession,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionGuard {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = match req.guard::<&State<DbConn>>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::ServiceUnavailable, ())),
        };

        let existing = match req.cookies().get_private(SESSION_COOKIE) {
            Some(cookie) => match SessionStore::load(db, cookie.value()).await {
                Ok(found) => found,
                Err(_) => return Outcome::Error((Status::ServiceUnavailable, ())),
            },
            None => None,
        };

        let session = match existing {
            Some(session) => session,
            None => {
                let fresh = SessionStore::fresh();
                req.cookies()
                    .add_private(Cookie::build((SESSION_COOKIE, fresh.id.clone())).path("/"));
                fresh
            }
        };

        Outcome::Success(SessionGuard { session })
    }
}

impl<'a> OpenApiFromRequest<'a> for SessionGuard {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}
