use log::error;
use mongodb::bson::{DateTime, doc};
use rocket::State;
use rocket::form::Form;
use rocket::http::{Cookie, CookieJar};
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::{Template, context};

use crate::config::Config;
use crate::db::DbConn;
use crate::guards::SessionGuard;
use crate::models::{AuthError, User, WizardStep};
use crate::routes::{flash_parts, persist};
use crate::services::SessionStore;
use crate::services::session_store::SESSION_COOKIE;
use crate::services::sms::SmsService;
use crate::utils::{generate_otp, hash_secret, validate_mobile};

#[derive(FromForm)]
pub struct LoginForm {
    pub mobile: String,
}

#[derive(FromForm)]
pub struct OtpForm {
    pub otp: String,
}

#[derive(FromForm)]
pub struct PasskeyForm {
    pub passkey: String,
    pub remember_device: Option<String>,
}

#[get("/login")]
pub async fn login_page(
    guard: SessionGuard,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    let session = &guard.session;
    if let Err(step) = session.gate(WizardStep::Login) {
        return Err(Redirect::to(session.entry_uri_for(step)));
    }

    let (flash_kind, flash_message) = flash_parts(flash);
    Ok(Template::render(
        "login",
        context! { flash_kind, flash_message },
    ))
}

#[post("/login", data = "<form>")]
pub async fn login_submit(
    db: &State<DbConn>,
    mut guard: SessionGuard,
    form: Form<LoginForm>,
) -> Result<Redirect, Flash<Redirect>> {
    let session = &mut guard.session;
    if let Err(step) = session.gate(WizardStep::Login) {
        return Ok(Redirect::to(session.entry_uri_for(step)));
    }

    let mobile = form.mobile.trim();
    if !validate_mobile(mobile) {
        return Err(Flash::error(
            Redirect::to("/login"),
            "Please enter a valid 10-digit mobile number",
        ));
    }
    session.mobile = Some(mobile.to_string());

    let existing = db
        .collection::<User>("users")
        .find_one(doc! { "mobile": mobile }, None)
        .await
        .map_err(|e| {
            error!("user lookup failed: {}", e);
            Flash::error(
                Redirect::to("/login"),
                "Something went wrong. Please try again.",
            )
        })?;

    // Returning devices with a passkey skip the OTP round-trip.
    if existing.as_ref().map(|u| u.has_passkey).unwrap_or(false) {
        session.passkey_login = true;
        session.otp = None;
        persist(db, session, "/login").await?;
        return Ok(Redirect::to("/passkey-login"));
    }

    session.passkey_login = false;
    let code = generate_otp();
    session.issue_otp(code.clone(), DateTime::now());
    SmsService::send(mobile, &format!("Your OTP for BlueCollarResume is: {}", code)).await;

    persist(db, session, "/login").await?;
    Ok(Redirect::to("/verify-otp"))
}

#[get("/verify-otp")]
pub async fn verify_otp_page(
    guard: SessionGuard,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    let session = &guard.session;
    if let Err(step) = session.gate(WizardStep::VerifyOtp) {
        return Err(Redirect::to(session.entry_uri_for(step)));
    }
    if session.passkey_login {
        return Err(Redirect::to("/passkey-login"));
    }

    let (flash_kind, flash_message) = flash_parts(flash);
    Ok(Template::render(
        "verify_otp",
        context! {
            mobile: session.mobile.clone().unwrap_or_default(),
            flash_kind,
            flash_message,
        },
    ))
}

#[post("/verify-otp", data = "<form>")]
pub async fn verify_otp_submit(
    db: &State<DbConn>,
    mut guard: SessionGuard,
    form: Form<OtpForm>,
) -> Result<Redirect, Flash<Redirect>> {
    let session = &mut guard.session;
    if let Err(step) = session.gate(WizardStep::VerifyOtp) {
        return Ok(Redirect::to(session.entry_uri_for(step)));
    }
    let mobile = match session.mobile.clone() {
        Some(mobile) => mobile,
        None => return Ok(Redirect::to("/login")),
    };

    match session.verify_otp(form.otp.trim(), DateTime::now(), Config::otp_ttl_minutes()) {
        Ok(()) => {
            let users = db.collection::<User>("users");
            let existing = users
                .find_one(doc! { "mobile": &mobile }, None)
                .await
                .map_err(|e| {
                    error!("user lookup failed: {}", e);
                    Flash::error(
                        Redirect::to("/verify-otp"),
                        "Something went wrong. Please try again.",
                    )
                })?;

            match existing {
                Some(user) => {
                    session.hydrate_from(&user);
                    users
                        .update_one(
                            doc! { "mobile": &mobile },
                            doc! { "$set": { "last_login_at": DateTime::now() } },
                            None,
                        )
                        .await
                        .ok();
                }
                None => {
                    let user = User::new(mobile.clone(), DateTime::now());
                    users.insert_one(&user, None).await.map_err(|e| {
                        error!("user create failed: {}", e);
                        Flash::error(
                            Redirect::to("/verify-otp"),
                            "Something went wrong. Please try again.",
                        )
                    })?;
                }
            }

            persist(db, session, "/verify-otp").await?;
            Ok(Redirect::to(session.next_uri()))
        }
        Err(err @ AuthError::OtpExpired) => {
            // The cleared code must be persisted so a retry cannot reuse it.
            persist(db, session, "/verify-otp").await?;
            Err(Flash::error(Redirect::to("/login"), err.to_string()))
        }
        Err(err) => Err(Flash::error(Redirect::to("/verify-otp"), err.to_string())),
    }
}

#[post("/resend-otp")]
pub async fn resend_otp(
    db: &State<DbConn>,
    mut guard: SessionGuard,
) -> Result<Flash<Redirect>, Redirect> {
    let session = &mut guard.session;
    if let Err(step) = session.gate(WizardStep::VerifyOtp) {
        return Err(Redirect::to(session.entry_uri_for(step)));
    }
    let mobile = match session.mobile.clone() {
        Some(mobile) => mobile,
        None => return Err(Redirect::to("/login")),
    };

    let code = generate_otp();
    session.issue_otp(code.clone(), DateTime::now());
    SmsService::send(&mobile, &format!("Your OTP for BlueCollarResume is: {}", code)).await;

    if SessionStore::save(db, session).await.is_err() {
        return Ok(Flash::error(
            Redirect::to("/verify-otp"),
            "Something went wrong. Please try again.",
        ));
    }
    Ok(Flash::success(
        Redirect::to("/verify-otp"),
        "A new OTP has been sent to your mobile number.",
    ))
}

#[get("/passkey-login")]
pub async fn passkey_login_page(
    guard: SessionGuard,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    let session = &guard.session;
    if let Err(step) = session.gate(WizardStep::VerifyOtp) {
        return Err(Redirect::to(session.entry_uri_for(step)));
    }
    if !session.passkey_login {
        return Err(Redirect::to("/verify-otp"));
    }

    let (flash_kind, flash_message) = flash_parts(flash);
    Ok(Template::render(
        "passkey_login",
        context! {
            mobile: session.mobile.clone().unwrap_or_default(),
            flash_kind,
            flash_message,
        },
    ))
}

#[post("/passkey-login", data = "<form>")]
pub async fn passkey_login_submit(
    db: &State<DbConn>,
    mut guard: SessionGuard,
    form: Form<PasskeyForm>,
) -> Result<Redirect, Flash<Redirect>> {
    let session = &mut guard.session;
    if let Err(step) = session.gate(WizardStep::VerifyOtp) {
        return Ok(Redirect::to(session.entry_uri_for(step)));
    }
    let mobile = match session.mobile.clone() {
        Some(mobile) => mobile,
        None => return Ok(Redirect::to("/login")),
    };

    let users = db.collection::<User>("users");
    let user = users
        .find_one(doc! { "mobile": &mobile }, None)
        .await
        .map_err(|e| {
            error!("user lookup failed: {}", e);
            Flash::error(
                Redirect::to("/passkey-login"),
                "Something went wrong. Please try again.",
            )
        })?;
    let user = match user {
        Some(user) => user,
        None => return Ok(Redirect::to("/login")),
    };

    let entered_hash = hash_secret(form.passkey.trim());
    if user.passkey_secret_hash.as_deref() != Some(entered_hash.as_str()) {
        return Err(Flash::error(
            Redirect::to("/passkey-login"),
            AuthError::PasskeyMismatch.to_string(),
        ));
    }

    session.authenticated = true;
    session.remember_device = form.remember_device.is_some();
    session.hydrate_from(&user);
    users
        .update_one(
            doc! { "mobile": &mobile },
            doc! { "$set": { "last_login_at": DateTime::now() } },
            None,
        )
        .await
        .ok();

    persist(db, session, "/passkey-login").await?;
    Ok(Redirect::to(session.next_uri()))
}

#[get("/logout")]
pub async fn logout(
    db: &State<DbConn>,
    cookies: &CookieJar<'_>,
    guard: SessionGuard,
) -> Flash<Redirect> {
    SessionStore::destroy(db, &guard.session.id).await.ok();
    cookies.remove_private(Cookie::from(SESSION_COOKIE));
    Flash::success(
        Redirect::to("/login"),
        "You have been logged out successfully.",
    )
}
