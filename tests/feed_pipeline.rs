//! End-to-end paging and image binding against a local HTTP server.

use std::io::Cursor;
use std::sync::Arc;

use newsreel::application::{
    Continuation, ImageSlots, LoadOutcome, LoadPhase, NewsDetail, PaginationController,
};
use newsreel::domain::entities::{ImageSource, ImageStatus, SlotId};
use newsreel::infrastructure::{
    HttpFeedClient, HttpImageFetcher, ImageFetcherConfig, MemoryImageCache,
};
use newsreel::presentation::FeedView;
use serde_json::json;
use tokio_test::assert_ok;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode png");
    bytes
}

fn article(server: &MockServer, id: i64, with_image: bool) -> serde_json::Value {
    let image_url = if with_image {
        format!("{}/img/{id}.png", server.uri())
    } else {
        String::new()
    };
    json!({
        "id": id,
        "title": format!("Article {id}"),
        "description": format!("Body of article {id}"),
        "publishedDate": "2025-02-17T00:00:00",
        "url": format!("news/{id}"),
        "fullUrl": format!("https://news.example.com/news/{id}"),
        "titleImageUrl": image_url,
        "categoryType": "Car news"
    })
}

async fn serve_feed(server: &MockServer) {
    let pages: [&[i64]; 3] = [&[1, 2], &[3, 4], &[5]];
    for (index, ids) in pages.iter().enumerate() {
        let news: Vec<_> = ids.iter().map(|&id| article(server, id, id != 2)).collect();
        Mock::given(method("GET"))
            .and(path(format!("/api/news/{}/2", index + 1)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "news": news,
                "totalCount": 5
            })))
            .expect(1)
            .mount(server)
            .await;
    }
}

async fn serve_images(server: &MockServer) {
    for id in [1, 3, 4, 5] {
        Mock::given(method("GET"))
            .and(path(format!("/img/{id}.png")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(png(u32::try_from(id).unwrap_or(1), 2))
                    .insert_header("content-type", "image/png"),
            )
            .expect(1)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_pages_until_exhausted() {
    let server = MockServer::start().await;
    serve_feed(&server).await;

    let feed = Arc::new(assert_ok!(HttpFeedClient::with_base_url(
        format!("{}/api/news", server.uri()),
        5
    )));
    let mut controller =
        PaginationController::new(feed, 2).with_continuation(Continuation::Strict);

    let mut lengths = Vec::new();
    loop {
        match controller.load_next().await {
            LoadOutcome::Appended { .. } => lengths.push(controller.items().len()),
            LoadOutcome::Skipped(phase) => {
                assert_eq!(phase, LoadPhase::Exhausted);
                break;
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(lengths, vec![2, 4, 5]);
    assert!(!controller.has_more());
    assert_eq!(controller.cursor(), 4);
}

#[tokio::test]
async fn test_recycled_rows_resolve_images_through_cache() {
    let server = MockServer::start().await;
    serve_feed(&server).await;
    serve_images(&server).await;

    let feed = Arc::new(assert_ok!(HttpFeedClient::with_base_url(
        format!("{}/api/news", server.uri()),
        5
    )));
    let cache = Arc::new(MemoryImageCache::new());
    let fetcher = Arc::new(assert_ok!(HttpImageFetcher::new(ImageFetcherConfig::default())));

    let mut controller = PaginationController::new(feed, 2);
    let mut slots = ImageSlots::new(cache.clone(), fetcher);
    let mut view = FeedView::new(2);

    let mut rendered = Vec::new();
    assert!(matches!(controller.load_next().await, LoadOutcome::Appended { .. }));

    while view.first_visible() < controller.items().len() {
        view.bind_visible(controller.items(), &mut slots);
        while slots.loading_count() > 0 {
            slots.next_completion().await;
        }
        rendered.extend(view.render(controller.items(), &slots));

        let last = view.last_visible(controller.items().len());
        if last.is_some_and(|index| controller.should_load_more(index)) {
            controller.load_next().await;
        }
        view.scroll_to(view.first_visible() + view.rows());
    }

    assert_eq!(rendered.len(), 5);
    assert!(rendered[0].ends_with("image: 1x2 (network)"));
    assert!(rendered[1].ends_with("image: placeholder"));
    assert!(rendered[4].contains("[5] 17 Feb 2025 | Article 5"));

    // Slot 0 drew items 1, 3 and 5 in turn.
    let slot = slots.get(SlotId(0)).expect("slot 0");
    assert_eq!(slot.status(), &ImageStatus::Ready);
    assert_eq!(slot.source(), Some(ImageSource::Network));
    assert_eq!(slot.image().map(|image| image.width()), Some(5));

    // Every downloaded image stays cached for the detail screen.
    let stats = cache.stats();
    assert_eq!(stats.size, 4);
    let detail = NewsDetail::new(controller.items()[2].clone(), &*cache);
    assert_eq!(detail.image().map(|image| image.width()), Some(3));
    assert_eq!(detail.published(), "17 Feb 2025");
}
