use std::env;

use log::*;
use sepay_engine::{events::EventProducers, OrderFlowApi, PaymentGatewayDatabase, SqliteDatabase};
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub fn random_db_path() -> String {
    let dir = env::temp_dir();
    format!("sqlite://{}/sepay_test_store_{}.db", dir.display(), rand::random::<u64>())
}

/// Creates a fresh, migrated database at a random location.
pub async fn prepare_test_env() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_path();
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating test database");
    info!("🚀️ Test database created at {url}");
    db
}

pub async fn setup_api(producers: EventProducers) -> OrderFlowApi<SqliteDatabase> {
    let db = prepare_test_env().await;
    OrderFlowApi::new(db, producers)
}

pub async fn tear_down(mut api: OrderFlowApi<SqliteDatabase>) {
    if let Err(e) = api.db_mut().close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    let url = api.db().url().to_string();
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("🚀️ Could not remove test database {url}: {e}");
    }
}
