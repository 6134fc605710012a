use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "celengan={level},telegram_bot={level},ledger={level}",
            level = settings.app.level
        ))
        .init();

    let database = parse_database(&settings.database).await?;
    let ledger = Arc::new(ledger::SqlLedger::new(database));

    let mut builder = telegram_bot::Bot::builder()
        .token(&settings.telegram.token)
        .ledger(ledger);
    if let Some(webhook) = &settings.telegram.webhook {
        builder = builder.webhook(&webhook.url, webhook.bind.parse()?);
    }
    if let Some(minutes) = settings.telegram.session_idle_timeout_minutes {
        builder = builder.session_idle_timeout(std::time::Duration::from_secs(minutes * 60));
    }

    match builder.build() {
        Ok(bot) => bot.run().await,
        Err(err) => tracing::error!("failed to initialize telegram bot: {err}"),
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path.display()),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
