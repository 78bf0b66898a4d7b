//! Configuration and connectivity checks.
//!
//! Verifies the pieces a pipeline run will need before anything mutates
//! state: config parses, the keyword catalog loads, the database answers,
//! and each optional collaborator is either configured or explicitly
//! reported as skipped.

use trendforge_core::AppConfig;

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let mut failures = 0u32;

    println!("== configuration ==");
    println!("ok    environment: {}", config.env);
    println!("ok    bind address: {}", config.bind_addr);

    println!("\n== keyword catalog ==");
    match trendforge_core::load_keywords(&config.keywords_path) {
        Ok(file) => println!(
            "ok    {} keywords loaded from {}",
            file.keywords.len(),
            config.keywords_path.display()
        ),
        Err(e) => {
            println!("FAIL  keyword catalog: {e}");
            failures += 1;
        }
    }

    println!("\n== database ==");
    match trendforge_db::connect_pool(&config.database_url, trendforge_db::PoolConfig::from_env())
        .await
    {
        Ok(pool) => match trendforge_db::ping(&pool).await {
            Ok(()) => println!("ok    database reachable"),
            Err(e) => {
                println!("FAIL  database ping: {e}");
                failures += 1;
            }
        },
        Err(e) => {
            println!("FAIL  database connect: {e}");
            failures += 1;
        }
    }

    println!("\n== signal sources ==");
    println!("ok    simulated_etsy, simulated_pinterest (always available)");
    match &config.search_interest_url {
        Some(url) => println!("ok    search_interest endpoint: {url}"),
        None => println!("skip  search_interest: TF_SEARCH_INTEREST_URL not set"),
    }

    println!("\n== artifact renderer ==");
    match &config.sheets_bridge_url {
        Some(url) => println!("ok    sheets bridge: {url}"),
        None => println!(
            "skip  sheets bridge not set; using local renderer at {}",
            config.artifact_base_url
        ),
    }

    println!("\n== publishers ==");
    let etsy_ready = config.etsy_api_key.is_some()
        && config.etsy_access_token.is_some()
        && config.etsy_shop_id.is_some();
    if etsy_ready {
        println!("ok    etsy credentials configured");
    } else {
        println!("skip  etsy: set TF_ETSY_API_KEY, TF_ETSY_ACCESS_TOKEN, TF_ETSY_SHOP_ID");
    }

    let pinterest_ready =
        config.pinterest_access_token.is_some() && config.pinterest_board_id.is_some();
    if pinterest_ready {
        println!("ok    pinterest credentials configured");
    } else {
        println!("skip  pinterest: set TF_PINTEREST_ACCESS_TOKEN, TF_PINTEREST_BOARD_ID");
    }

    if failures > 0 {
        anyhow::bail!("{failures} required check(s) failed");
    }
    println!("\nall required checks passed");
    Ok(())
}
