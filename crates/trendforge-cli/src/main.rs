mod doctor;

use clap::{Parser, Subcommand};
use trendforge_core::Platform;

#[derive(Debug, Parser)]
#[command(name = "trendforge-cli")]
#[command(about = "Trend-to-product automation pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the research stage against the configured keyword catalog.
    Research,
    /// Create a product draft for a keyword from the latest run.
    Create { keyword: String },
    /// Publish the latest product to a platform selection.
    Publish {
        /// "etsy", "pinterest", or "both".
        #[arg(long, default_value = "both")]
        platform: String,
    },
    /// Show the latest run's trends.
    Trends,
    /// Show recent activity-ledger entries.
    Activity {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Validate configuration and collaborator reachability.
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = trendforge_core::load_app_config_from_env()?;

    if let Commands::Doctor = cli.command {
        return doctor::run(&config).await;
    }

    let pool = trendforge_db::connect_pool(&config.database_url, trendforge_db::PoolConfig::from_env())
        .await?;
    trendforge_db::run_migrations(&pool).await?;

    let keywords = trendforge_core::load_keywords(&config.keywords_path)?.keywords;
    let orchestrator =
        trendforge_pipeline::Orchestrator::from_config(pool.clone(), &config, keywords);

    match cli.command {
        Commands::Research => {
            let outcome = orchestrator.research().await?;
            println!(
                "run {}: stored {} trends ({} dropped, {} skipped)",
                outcome.run_id, outcome.stored, outcome.dropped, outcome.skipped
            );
            print_trends(&pool).await?;
        }
        Commands::Create { keyword } => {
            let outcome = orchestrator.create(&keyword).await?;
            println!("created '{}' at {}", outcome.name, outcome.link);
        }
        Commands::Publish { platform } => {
            let platforms = Platform::parse_selection(&platform)?;
            let outcome = orchestrator.publish(&platforms).await?;
            println!("'{}' {}", outcome.product_name, outcome.status);
            for result in &outcome.results {
                match (&result.url, &result.error) {
                    (Some(url), _) => println!("  {}: {url}", result.platform),
                    (None, Some(error)) => println!("  {}: {error}", result.platform),
                    (None, None) => println!("  {}: no detail", result.platform),
                }
            }
        }
        Commands::Trends => {
            print_trends(&pool).await?;
        }
        Commands::Activity { limit } => {
            let entries = trendforge_db::list_activity(&pool, limit.clamp(1, 500)).await?;
            if entries.is_empty() {
                println!("no activity recorded yet");
            }
            for entry in entries {
                println!(
                    "{}  [{}] {}: {}",
                    entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.agent,
                    entry.action,
                    entry.result
                );
            }
        }
        Commands::Doctor => unreachable!("handled before pool setup"),
    }

    Ok(())
}

async fn print_trends(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    let trends = trendforge_db::list_latest_run(pool).await?;
    if trends.is_empty() {
        println!("no trends in the latest run");
        return Ok(());
    }

    for trend in trends {
        println!(
            "{:>5.1}  {:<10} {:<8} {:+6.1}%  {}",
            trend.score, trend.category, trend.confidence, trend.velocity, trend.keyword
        );
        println!("       {}", trend.explanation);
    }
    Ok(())
}
