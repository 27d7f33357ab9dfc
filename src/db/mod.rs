use log::{error, info};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use rocket::fairing::AdHoc;

pub fn init() -> AdHoc {
    AdHoc::on_ignite("MongoDB", |rocket| async {
        match connect().await {
            Ok(database) => {
                info!("✓ MongoDB connected successfully");
                rocket.manage(database)
            }
            Err(e) => {
                error!("✗ Failed to connect to MongoDB: {}", e);
                rocket
            }
        }
    })
}

async fn connect() -> Result<Database, mongodb::error::Error> {
    let uri = crate::config::Config::mongodb_uri();
    let client = Client::with_uri_str(&uri).await?;

    // Test connection
    client
        .database("admin")
        .run_command(mongodb::bson::doc! {"ping": 1}, None)
        .await?;

    let database = client.database("bluecollar");

    // The mobile number is the identity anchor: enforce it at the store
    // level so repeated logins can never duplicate a user.
    let unique_mobile = IndexModel::builder()
        .keys(mongodb::bson::doc! { "mobile": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    database
        .collection::<crate::models::User>("users")
        .create_index(unique_mobile, None)
        .await?;

    Ok(database)
}

pub type DbConn = Database;
