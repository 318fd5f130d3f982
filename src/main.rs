use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use replay_search::external::{HttpFetcher, MemoryRouter};
use replay_search::services::search::{ClientConfig, SearchController};
use replay_search::services::SearchService;

/// 用法：replay_search [查询字符串]
///
/// 例如 `replay_search "?user=zarel&page=2"`，省略参数时浏览最近录像。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = match std::env::var("REPLAY_CONFIG") {
        Ok(path) => ClientConfig::load(path).await?,
        Err(_) => ClientConfig::from_env()?,
    };
    tracing::info!("录像服务器: {}", config.server_url);

    let fetcher = HttpFetcher::new(&config.server_url, config.timeout())?;
    let mut controller = SearchController::new(MemoryRouter::new(config.server_url.clone()));
    controller.set_logged_in_user(config.logged_in_user());

    let service = SearchService::new(controller, Arc::new(fetcher));
    let fragment = std::env::args().nth(1).unwrap_or_default();
    service.apply_incoming_url(&fragment).await;

    let controller = service.controller();
    let controller = controller.lock().await;
    let state = controller.state();

    println!("{}", controller.router().current_href());
    if controller.is_actively_searching() {
        println!("Search results");
    } else {
        println!("Recent replays");
    }

    if let Some(link) = controller.sort_link(!state.sort_by_rating) {
        let label = if state.sort_by_rating { "date" } else { "rating" };
        println!("  sort by {}: {}", label, link);
    }
    if let Some(link) = controller.previous_page_link() {
        println!("  page {}: {}", state.page - 1, link);
    }

    if let Some(error) = state.result_error() {
        println!("  error: {}", error);
    } else if state.is_loading() {
        println!("  loading...");
    } else {
        for replay in controller.visible_results() {
            let date = replay
                .upload_date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let lock = if replay.is_private() { " [private]" } else { "" };
            println!(
                "  {} {} [{}]{} {} vs. {}",
                date,
                replay.display_label(),
                replay.format_id(),
                lock,
                replay.player(0),
                replay.player(1)
            );
            println!("    {}", controller.replay_link(replay));
        }
    }

    if let Some(link) = controller.next_page_link() {
        println!("  page {}: {}", state.page + 1, link);
    }

    Ok(())
}
