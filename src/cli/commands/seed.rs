use anyhow::{bail, Context};

use crate::auth::hash_password;
use crate::config::AppConfig;
use crate::database::{seeder, DatabaseManager};

pub async fn handle(config: AppConfig, password: &str) -> anyhow::Result<()> {
    if password.trim().is_empty() {
        bail!("--password must not be empty");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;

    let password_hash = hash_password(password)?;
    let report = seeder::seed(&pool, &password_hash).await.context("seeding failed")?;

    println!(
        "Seeded {} permissions, {} roles and {} users",
        report.permissions, report.roles, report.users
    );
    Ok(())
}
