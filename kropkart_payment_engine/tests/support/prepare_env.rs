use kpg_common::Secret;
use kropkart_payment_engine::{helpers::calculate_signature, SqliteDatabase};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub const CLIENT_SECRET: &str = "client-verification-secret";
pub const WEBHOOK_SECRET: &str = "webhook-secret";

pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/kpg_test_{:016x}.db", dir.display(), rand::random::<u64>())
}

pub async fn prepare_test_env() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_path();
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    debug!("🚀️ Test database ready at {url}");
    db
}

pub async fn tear_down(db: SqliteDatabase) {
    db.close().await;
    if let Err(e) = Sqlite::drop_database(db.url()).await {
        warn!("🚀️ Could not drop test database {}: {e}", db.url());
    }
}

pub fn client_secret() -> Secret<String> {
    Secret::new(CLIENT_SECRET.to_string())
}

pub fn webhook_secret() -> Secret<String> {
    Secret::new(WEBHOOK_SECRET.to_string())
}

pub fn sign_client(order_id: &str, payment_id: &str) -> String {
    calculate_signature(CLIENT_SECRET, format!("{order_id}|{payment_id}").as_bytes())
}

pub fn sign_webhook(body: &str) -> String {
    calculate_signature(WEBHOOK_SECRET, body.as_bytes())
}

pub fn captured_webhook(order_id: &str, payment_id: &str, amount: i64) -> String {
    serde_json::json!({
        "entity": "event",
        "event": "payment.captured",
        "payload": {
            "payment": {
                "entity": {
                    "id": payment_id,
                    "order_id": order_id,
                    "amount": amount,
                    "currency": "INR",
                    "status": "captured"
                }
            }
        }
    })
    .to_string()
}
