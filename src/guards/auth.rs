use rocket::http::Status;
use rocket::request::{self, FromRequest, Outcome, Request};

use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};

use crate::guards::SessionGuard;
use crate::models::WizardSession;

/// Session guard for the JSON endpoints: the wizard session must have passed
/// authentication, otherwise the request is rejected with 401.
pub struct AuthGuard {
    pub session: WizardSession,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthGuard {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match req.guard::<SessionGuard>().await {
            Outcome::Success(guard) if guard.session.authenticated => {
                Outcome::Success(AuthGuard {
                    session: guard.session,
                })
            }
            Outcome::Success(_) => Outcome::Error((Status::Unauthorized, ())),
            Outcome::Error(e) => Outcome::Error(e),
            Outcome::Forward(f) => Outcome::Forward(f),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for AuthGuard {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}
