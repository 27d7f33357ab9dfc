use indexmap::IndexMap;
use log::error;
use mongodb::bson::{DateTime, doc};
use mongodb::options::ReplaceOptions;
use rocket::State;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::{Template, context};
use serde_json::json;
use std::collections::HashMap;

use crate::db::DbConn;
use crate::guards::SessionGuard;
use crate::models::{IdDocument, ProfessionCatalog, User, WizardStep};
use crate::routes::{flash_parts, persist};
use crate::services::uploads;
use crate::services::verification;
use crate::services::GeminiService;
use crate::utils::{generate_passkey, hash_secret, validate_email};

const LANGUAGES: [(&str, &str); 6] = [
    ("en", "English"),
    ("hi", "हिन्दी"),
    ("od", "ଓଡ଼ିଆ"),
    ("ta", "தமிழ்"),
    ("te", "తెలుగు"),
    ("bn", "বাংলা"),
];

#[derive(FromForm)]
pub struct LanguageForm {
    pub language: String,
}

#[derive(FromForm)]
pub struct ProfessionForm {
    pub profession: String,
}

#[derive(FromForm)]
pub struct ProfileForm {
    pub full_name: String,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

#[derive(FromForm)]
pub struct IdVerificationForm<'f> {
    pub id_type: String,
    pub id_number: String,
    pub id_file: TempFile<'f>,
}

#[derive(FromForm)]
pub struct StaySignedInForm {
    pub stay_signed: String,
}

#[get("/")]
pub fn index() -> Redirect {
    Redirect::to("/language")
}

#[get("/language")]
pub async fn language_page(
    guard: SessionGuard,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let languages: Vec<_> = LANGUAGES
        .iter()
        .map(|(code, name)| json!({ "code": code, "name": name }))
        .collect();
    let selected = guard
        .session
        .language
        .clone()
        .unwrap_or_else(|| "en".to_string());

    let (flash_kind, flash_message) = flash_parts(flash);
    Template::render(
        "language",
        context! {
            languages,
            selected_language: selected,
            flash_kind,
            flash_message,
        },
    )
}

#[post("/language", data = "<form>")]
pub async fn language_submit(
    db: &State<DbConn>,
    mut guard: SessionGuard,
    form: Form<LanguageForm>,
) -> Result<Redirect, Flash<Redirect>> {
    let session = &mut guard.session;

    if !LANGUAGES.iter().any(|(code, _)| *code == form.language) {
        return Err(Flash::error(
            Redirect::to("/language"),
            "Please choose one of the listed languages",
        ));
    }

    session.language = Some(form.language.clone());
    persist(db, session, "/language").await?;
    Ok(Redirect::to("/login"))
}

#[get("/profession")]
pub async fn profession_page(
    catalog: &State<ProfessionCatalog>,
    guard: SessionGuard,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    let session = &guard.session;
    if let Err(step) = session.gate(WizardStep::Profession) {
        return Err(Redirect::to(session.entry_uri_for(step)));
    }

    let professions: Vec<_> = catalog
        .iter()
        .map(|(name, spec)| {
            json!({
                "name": name,
                "icon_class": spec.icon,
                "description": format!("Professional {} with verified skills", name.to_lowercase()),
            })
        })
        .collect();

    let (flash_kind, flash_message) = flash_parts(flash);
    Ok(Template::render(
        "profession",
        context! {
            professions,
            selected: session.profession.clone(),
            flash_kind,
            flash_message,
        },
    ))
}

#[post("/profession", data = "<form>")]
pub async fn profession_submit(
    db: &State<DbConn>,
    catalog: &State<ProfessionCatalog>,
    mut guard: SessionGuard,
    form: Form<ProfessionForm>,
) -> Result<Redirect, Flash<Redirect>> {
    let session = &mut guard.session;
    if let Err(step) = session.gate(WizardStep::Profession) {
        return Ok(Redirect::to(session.entry_uri_for(step)));
    }

    if !catalog.contains(&form.profession) {
        return Err(Flash::error(
            Redirect::to("/profession"),
            "Please choose a profession from the list",
        ));
    }

    // Switching trades invalidates previously collected verification data
    // and any résumé built from it.
    if session.profession.as_deref() != Some(form.profession.as_str()) {
        session.verification_data.clear();
        session.verification_complete = false;
        session.resume_path = None;
    }
    session.profession = Some(form.profession.clone());

    persist(db, session, "/profession").await?;
    Ok(Redirect::to("/verification"))
}

#[get("/verification")]
pub async fn verification_page(
    catalog: &State<ProfessionCatalog>,
    guard: SessionGuard,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    let session = &guard.session;
    if let Err(step) = session.gate(WizardStep::Verification) {
        return Err(Redirect::to(session.entry_uri_for(step)));
    }

    let profession = session.profession.clone().unwrap_or_default();
    let fields = catalog.fields_for(&profession);

    // Every field gets an entry so the template can index unconditionally.
    let mut values = serde_json::Map::new();
    for field in &fields {
        let value = session
            .verification_data
            .get(&field.name)
            .cloned()
            .unwrap_or_default();
        values.insert(field.name.clone(), serde_json::Value::String(value));
    }

    let (flash_kind, flash_message) = flash_parts(flash);
    Ok(Template::render(
        "verification",
        context! {
            profession,
            fields,
            values: serde_json::Value::Object(values),
            flash_kind,
            flash_message,
        },
    ))
}

#[post("/verification", data = "<form>")]
pub async fn verification_submit(
    db: &State<DbConn>,
    catalog: &State<ProfessionCatalog>,
    mut guard: SessionGuard,
    form: Form<HashMap<String, String>>,
) -> Result<Redirect, Flash<Redirect>> {
    let session = &mut guard.session;
    if let Err(step) = session.gate(WizardStep::Verification) {
        return Ok(Redirect::to(session.entry_uri_for(step)));
    }

    let profession = session.profession.clone().unwrap_or_default();
    let fields = catalog.fields_for(&profession);
    let submitted = form.into_inner();

    match verification::collect(&fields, &submitted) {
        Err((err, partial)) => {
            // Keep everything the user already typed for the re-render.
            session.verification_data = partial;
            session.verification_complete = false;
            persist(db, session, "/verification").await?;
            Err(Flash::error(Redirect::to("/verification"), err.to_string()))
        }
        Ok(collected) => {
            // Best-effort polish; the raw value stands on any failure.
            let mut polished = IndexMap::new();
            for (name, value) in collected {
                let enhanced = GeminiService::enhance_text(&value, &name, &profession).await;
                polished.insert(name, enhanced);
            }

            session.verification_data = polished;
            session.verification_complete = true;
            persist(db, session, "/verification").await?;
            Ok(Redirect::to("/profile"))
        }
    }
}

#[get("/profile")]
pub async fn profile_page(
    guard: SessionGuard,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    let session = &guard.session;
    if let Err(step) = session.gate(WizardStep::Profile) {
        return Err(Redirect::to(session.entry_uri_for(step)));
    }

    let (flash_kind, flash_message) = flash_parts(flash);
    Ok(Template::render(
        "profile",
        context! {
            full_name: session.full_name.clone().unwrap_or_default(),
            email: session.email.clone().unwrap_or_default(),
            gender: session.gender.clone().unwrap_or_default(),
            address: session.address.clone().unwrap_or_default(),
            flash_kind,
            flash_message,
        },
    ))
}

#[post("/profile", data = "<form>")]
pub async fn profile_submit(
    db: &State<DbConn>,
    mut guard: SessionGuard,
    form: Form<ProfileForm>,
) -> Result<Redirect, Flash<Redirect>> {
    let session = &mut guard.session;
    if let Err(step) = session.gate(WizardStep::Profile) {
        return Ok(Redirect::to(session.entry_uri_for(step)));
    }

    let full_name = form.full_name.trim();
    if full_name.is_empty() {
        return Err(Flash::error(
            Redirect::to("/profile"),
            "Please enter your full name",
        ));
    }
    let email = form.email.as_deref().unwrap_or("").trim();
    if !email.is_empty() && !validate_email(email) {
        return Err(Flash::error(
            Redirect::to("/profile"),
            "Please enter a valid email address",
        ));
    }
    let gender = form.gender.as_deref().unwrap_or("").trim();
    let address = form.address.as_deref().unwrap_or("").trim();

    session.full_name = Some(full_name.to_string());
    session.email = (!email.is_empty()).then(|| email.to_string());
    session.gender = (!gender.is_empty()).then(|| gender.to_string());
    session.address = (!address.is_empty()).then(|| address.to_string());
    session.profile_complete = true;

    persist(db, session, "/profile").await?;
    Ok(Redirect::to("/id-verification"))
}

#[get("/id-verification")]
pub async fn id_verification_page(
    guard: SessionGuard,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    let session = &guard.session;
    if let Err(step) = session.gate(WizardStep::IdVerification) {
        return Err(Redirect::to(session.entry_uri_for(step)));
    }

    let (flash_kind, flash_message) = flash_parts(flash);
    Ok(Template::render(
        "id_verification",
        context! { flash_kind, flash_message },
    ))
}

#[post("/id-verification", data = "<form>")]
pub async fn id_verification_submit(
    db: &State<DbConn>,
    mut guard: SessionGuard,
    mut form: Form<IdVerificationForm<'_>>,
) -> Result<Redirect, Flash<Redirect>> {
    let session = &mut guard.session;
    if let Err(step) = session.gate(WizardStep::IdVerification) {
        return Ok(Redirect::to(session.entry_uri_for(step)));
    }
    let mobile = match session.mobile.clone() {
        Some(mobile) => mobile,
        None => return Ok(Redirect::to("/login")),
    };

    if form.id_type.trim().is_empty() || form.id_number.trim().is_empty() || form.id_file.len() == 0
    {
        return Err(Flash::error(
            Redirect::to("/id-verification"),
            "Please complete all ID verification fields",
        ));
    }

    let id_type = form.id_type.trim().to_string();
    let id_number = form.id_number.trim().to_string();
    let filename = uploads::save_id_document(&mut form.id_file, &mobile)
        .await
        .map_err(|e| Flash::error(Redirect::to("/id-verification"), e))?;

    session.id_verified = true;
    session.id_document = Some(IdDocument {
        doc_type: id_type,
        number: id_number,
        file: filename,
    });

    // Reaching this step commits the draft as the durable user record.
    let users = db.collection::<User>("users");
    let now = DateTime::now();
    let mut user = match users.find_one(doc! { "mobile": &mobile }, None).await {
        Ok(Some(user)) => user,
        Ok(None) => User::new(mobile.clone(), now),
        Err(e) => {
            error!("user lookup failed: {}", e);
            return Err(Flash::error(
                Redirect::to("/id-verification"),
                "Error saving your data. Please try again.",
            ));
        }
    };
    user.apply_draft(session, now);

    let options = ReplaceOptions::builder().upsert(true).build();
    users
        .replace_one(doc! { "mobile": &mobile }, &user, options)
        .await
        .map_err(|e| {
            error!("user upsert failed: {}", e);
            Flash::error(
                Redirect::to("/id-verification"),
                "Error saving your data. Please try again.",
            )
        })?;

    persist(db, session, "/id-verification").await?;
    Ok(Redirect::to("/stay-signed-in"))
}

#[get("/stay-signed-in")]
pub async fn stay_signed_in_page(
    guard: SessionGuard,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    let session = &guard.session;
    if let Err(step) = session.gate(WizardStep::StaySignedIn) {
        return Err(Redirect::to(session.entry_uri_for(step)));
    }

    let (flash_kind, flash_message) = flash_parts(flash);
    Ok(Template::render(
        "stay_signed_in",
        context! { flash_kind, flash_message },
    ))
}

#[post("/stay-signed-in", data = "<form>")]
pub async fn stay_signed_in_submit(
    db: &State<DbConn>,
    mut guard: SessionGuard,
    form: Form<StaySignedInForm>,
) -> Result<Flash<Redirect>, Flash<Redirect>> {
    let session = &mut guard.session;
    if let Err(step) = session.gate(WizardStep::StaySignedIn) {
        return Ok(Flash::success(
            Redirect::to(session.entry_uri_for(step)),
            "Please continue from this step.",
        ));
    }
    let mobile = match session.mobile.clone() {
        Some(mobile) => mobile,
        None => return Ok(Flash::success(Redirect::to("/login"), "Please log in.")),
    };

    if form.stay_signed == "yes" {
        // One passkey per wizard pass; the plaintext secret is shown exactly
        // once and only its hash is stored.
        let secret = generate_passkey();
        db.collection::<User>("users")
            .update_one(
                doc! { "mobile": &mobile },
                doc! { "$set": {
                    "has_passkey": true,
                    "passkey_secret_hash": hash_secret(&secret),
                    "updated_at": DateTime::now(),
                } },
                None,
            )
            .await
            .map_err(|e| {
                error!("passkey setup failed: {}", e);
                Flash::error(
                    Redirect::to("/stay-signed-in"),
                    "Something went wrong. Please try again.",
                )
            })?;

        session.stay_decided = Some(true);
        persist(db, session, "/stay-signed-in").await?;
        Ok(Flash::success(
            Redirect::to("/resume"),
            format!(
                "Passkey setup completed! Your passkey is {}. Keep it safe for future logins.",
                secret
            ),
        ))
    } else {
        session.stay_decided = Some(false);
        persist(db, session, "/stay-signed-in").await?;
        Ok(Flash::success(
            Redirect::to("/resume"),
            "You can set up a passkey on your next visit.",
        ))
    }
}
