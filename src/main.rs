use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use newsreel::application::{ImageSlots, LoadOutcome, NewsDetail, PaginationController};
use newsreel::infrastructure::{
    AppConfig, CliArgs, ConfigStore, HttpFeedClient, HttpImageFetcher, ImageFetcherConfig,
    MemoryImageCache,
};
use newsreel::presentation::FeedView;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

/// Waits until no slot is downloading, or until `limit` elapses.
async fn settle(slots: &mut ImageSlots, limit: Duration) {
    let waiting = async {
        while slots.loading_count() > 0 {
            slots.next_completion().await;
        }
    };
    if tokio::time::timeout(limit, waiting).await.is_err() {
        warn!(pending = slots.loading_count(), "Gave up waiting for images");
    }
    slots.drain();
}

/// Loads one page. Returns false once paging should stop.
async fn load_page(controller: &mut PaginationController) -> bool {
    match controller.load_next().await {
        LoadOutcome::Appended { added, has_more } => {
            info!(
                added,
                total = controller.items().len(),
                has_more,
                "Feed page loaded"
            );
            true
        }
        LoadOutcome::Failed(e) => {
            eprintln!("Failed to load feed page: {e}");
            false
        }
        LoadOutcome::Skipped(phase) => {
            debug!(%phase, "No page requested");
            false
        }
        LoadOutcome::Stale => true,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = ConfigStore::new()?.load(&args)?;
    init_logging(&config)?;

    info!(version = newsreel::VERSION, base_url = %config.feed.base_url, "Starting Newsreel");

    let feed = Arc::new(HttpFeedClient::with_base_url(
        config.feed.base_url.clone(),
        config.feed.timeout_secs,
    )?);
    let cache = Arc::new(MemoryImageCache::new());
    let fetcher = Arc::new(HttpImageFetcher::new(ImageFetcherConfig::from(&config.images))?);

    let mut controller = PaginationController::new(feed, config.feed.page_size)
        .with_continuation(config.feed.continuation);
    let mut slots = ImageSlots::new(cache.clone(), fetcher);
    let mut view = FeedView::new(args.slots);
    let image_wait = Duration::from_secs(config.images.timeout_secs);

    let mut pages_loaded = 0;
    if args.pages > 0 && load_page(&mut controller).await {
        pages_loaded += 1;
    }

    while view.first_visible() < controller.items().len() {
        view.bind_visible(controller.items(), &mut slots);
        settle(&mut slots, image_wait).await;

        for line in view.render(controller.items(), &slots) {
            println!("{line}");
        }

        let near_end = view
            .last_visible(controller.items().len())
            .is_some_and(|last| controller.should_load_more(last));
        if near_end && pages_loaded < args.pages {
            if !load_page(&mut controller).await {
                break;
            }
            pages_loaded += 1;
        }

        view.scroll_to(view.first_visible() + view.rows());
    }

    let snapshot = controller.snapshot();
    println!(
        "\n{} items over {} pages, state {}{}",
        snapshot.item_count,
        snapshot.cursor.saturating_sub(1),
        snapshot.phase,
        if snapshot.has_more { ", more available" } else { "" }
    );

    if let Some(first) = controller.items().first() {
        let detail = NewsDetail::new(first.clone(), &*cache);
        println!("\n{}\n{}", detail.title(), detail.published());
        if !detail.description().is_empty() {
            println!("{}", detail.description());
        }
        match detail.image() {
            Some(image) => println!("image: {}x{}", image.width(), image.height()),
            None => println!("image: placeholder"),
        }
    }

    println!("\n{}", cache.stats());

    Ok(())
}
