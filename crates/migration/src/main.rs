use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./eventbudget.db?mode=rwc";

const USAGE: &str = "\
Usage: migration [COMMAND]

Commands:
  up      apply every pending migration (default)
  down    roll back the last applied migration
  fresh   drop all tables and re-apply every migration
  status  list applied and pending migrations

The database is read from EVENTBUDGET_DATABASE_URL, then DATABASE_URL,
falling back to ./eventbudget.db.";

/// `EVENTBUDGET_DATABASE_URL` wins over the generic `DATABASE_URL`.
fn database_url() -> String {
    ["EVENTBUDGET_DATABASE_URL", "DATABASE_URL"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cmd = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    if matches!(cmd.as_str(), "-h" | "--help" | "help") {
        println!("{USAGE}");
        return Ok(());
    }

    let db = Database::connect(database_url()).await?;

    match cmd.as_str() {
        "up" => migration::Migrator::up(&db, None).await?,
        "down" => migration::Migrator::down(&db, Some(1)).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => migration::Migrator::status(&db).await?,
        other => {
            eprintln!("unknown command '{other}'\n\n{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}
