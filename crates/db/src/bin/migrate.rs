use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scholar_db::migrations;

#[derive(Parser)]
#[command(name = "scholar-migrate")]
#[command(about = "Apply, revert and inspect database schema migrations", long_about = None)]
struct Cli {
    /// Database URL; defaults to `DATABASE_URL`.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Up {
        /// Stop after this migration
        #[arg(long)]
        to: Option<String>,
    },

    /// Revert the most recent migrations
    Down {
        /// Number of migrations to revert
        #[arg(long, default_value_t = 1)]
        steps: usize,
    },

    /// List applied and pending migrations
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scholar_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let pool = scholar_db::create_pool(&cli.database_url).await?;

    match cli.command {
        Commands::Up { to } => {
            let applied = migrations::run_migrations_through(&pool, to.as_deref()).await?;
            println!("Applied {} migration(s)", applied.len());
            for name in applied {
                println!("  {name}");
            }
        }
        Commands::Down { steps } => {
            let reverted = migrations::rollback(&pool, steps).await?;
            println!("Reverted {} migration(s)", reverted.len());
            for name in reverted {
                println!("  {name}");
            }
        }
        Commands::Status => {
            for m in migrations::applied(&pool).await? {
                println!("applied  {}  {}", m.name, m.applied_at.format("%Y-%m-%d %H:%M:%S"));
            }
            for name in migrations::pending(&pool).await? {
                println!("pending  {name}");
            }
        }
    }

    Ok(())
}
