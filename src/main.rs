#[macro_use]
extern crate rocket;

mod config;
mod db;
mod guards;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod tests;
mod utils;

use dotenvy::dotenv;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::fs::FileServer;
use rocket::http::Header;
use rocket::{Build, Request, Response, Rocket};
use rocket_dyn_templates::Template;
use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};

use crate::models::ProfessionCatalog;

/* ----------------------------- CORS ----------------------------- */

pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        if let Some(origin) = request.headers().get_one("Origin") {
            response.set_header(Header::new("Access-Control-Allow-Origin", origin));
        }

        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, OPTIONS",
        ));

        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization",
        ));

        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

/* ----------------------------- OPTIONS ----------------------------- */

#[options("/<_..>")]
fn options_handler() {}

/* ----------------------------- ERRORS ----------------------------- */

#[catch(401)]
fn unauthorized() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "message": "Authentication required"
    })
}

#[catch(404)]
fn not_found() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "message": "Resource not found"
    })
}

#[catch(500)]
fn internal_error() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "message": "Internal server error"
    })
}

/* ----------------------------- SWAGGER ----------------------------- */

fn swagger_config() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/api/v1/openapi.json".to_string(),
        ..Default::default()
    }
}

/* ----------------------------- LAUNCH ----------------------------- */

#[launch]
fn rocket() -> Rocket<Build> {
    dotenv().ok();
    env_logger::init();

    let upload_dir = config::Config::upload_dir();
    if let Err(e) = std::fs::create_dir_all(&upload_dir) {
        eprintln!("cannot create upload dir {}: {}", upload_dir, e);
    }

    println!("🛠  BlueCollarResume wizard running");
    println!("📚 Swagger UI → http://localhost:8000/api/docs");

    rocket::build()
        .attach(db::init())
        .attach(Template::fairing())
        .attach(CORS)
        .manage(ProfessionCatalog::standard())
        .mount("/", routes![options_handler])
        .mount(
            "/",
            routes![
                // Wizard pages
                routes::wizard::index,
                routes::wizard::language_page,
                routes::wizard::language_submit,
                routes::wizard::profession_page,
                routes::wizard::profession_submit,
                routes::wizard::verification_page,
                routes::wizard::verification_submit,
                routes::wizard::profile_page,
                routes::wizard::profile_submit,
                routes::wizard::id_verification_page,
                routes::wizard::id_verification_submit,
                routes::wizard::stay_signed_in_page,
                routes::wizard::stay_signed_in_submit,
                // Auth
                routes::auth::login_page,
                routes::auth::login_submit,
                routes::auth::verify_otp_page,
                routes::auth::verify_otp_submit,
                routes::auth::resend_otp,
                routes::auth::passkey_login_page,
                routes::auth::passkey_login_submit,
                routes::auth::logout,
                // Resume
                routes::resume::resume_page,
                routes::resume::resume_submit,
                routes::resume::download_resume,
                // Jobs
                routes::jobs::jobs_page,
            ],
        )
        .mount(
            "/api/v1",
            openapi_get_routes![
                routes::api::voice_input,
                routes::api::speech_to_text,
                routes::api::translate,
                routes::api::track_job,
                routes::api::chat,
                routes::api::upload_document_base64,
            ],
        )
        .mount("/uploads", FileServer::from(upload_dir))
        .mount("/api/docs", make_swagger_ui(&swagger_config()))
        .register("/", catchers![unauthorized, not_found, internal_error])
}
