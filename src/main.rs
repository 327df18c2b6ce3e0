use anyhow::Result;
use clap::{Parser, Subcommand};
use kitchen::api::ApiServer;
use kitchen::db::{migrate, seed, Db};
use kitchen::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kitchen")]
#[command(version, about = "REST API over a cooking crafting graph")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply migrations and verify the database schema
    Verify,
    /// Load the seed files into the database
    Seed {
        /// Directory holding ingredient.json, utensil.json and step.json
        /// (defaults to database.seed_dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Insert even when the graph already holds data
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.kitchen.log_level.as_str()),
    )
    .init();

    log::info!("=== Kitchen v{} ({}) ===", env!("CARGO_PKG_VERSION"), config.environment());
    log::info!("Database path: {}", config.db_path().display());

    let db = init_db(&config).await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(db, config).await?,
        Command::Verify => run_schema_verification(&db).await?,
        Command::Seed { dir, force } => {
            let seed_dir = dir.unwrap_or_else(|| config.database.seed_dir.clone());
            run_seed(&db, &seed_dir, force).await?;
        }
    }

    Ok(())
}

/// Open the store and apply pending migrations
async fn init_db(config: &Config) -> Result<Db> {
    let db = Db::new(config.db_path());
    let migrations_dir = config.database.migrations_dir.clone();
    db.with_connection(move |conn| migrate::run_migrations(conn, &migrations_dir))
        .await?;
    log::info!("Database initialized successfully");
    Ok(db)
}

async fn run_server(db: Db, config: Config) -> Result<()> {
    if config.database.auto_populate {
        seed::populate_if_empty(&db, &config.database.seed_dir).await?;
    } else {
        log::info!("Auto-population disabled");
    }

    ApiServer::new(db, config).run().await?;
    Ok(())
}

async fn run_schema_verification(db: &Db) -> Result<()> {
    db.with_connection(|conn| {
        let applied = migrate::get_applied_migrations(conn)?;
        log::info!("{} migrations applied: {}", applied.len(), applied.join(", "));
        migrate::verify_schema(conn)
    })
    .await?;
    Ok(())
}

async fn run_seed(db: &Db, seed_dir: &std::path::Path, force: bool) -> Result<()> {
    let report = if force {
        Some(seed::populate(db, seed_dir).await?)
    } else {
        seed::populate_if_empty(db, seed_dir).await?
    };

    match report {
        Some(report) => println!(
            "Seeded {} ingredients, {} utensils, {} steps",
            report.ingredients, report.utensils, report.steps
        ),
        None => println!("Database already holds data; use --force to insert anyway"),
    }
    Ok(())
}
