//! Tests for the traversal state machine

use super::*;
use crate::error::ErrorKind;
use crate::pagination::{NextLinkPaginator, PageNumberPaginator};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use test_case::test_case;

// ============================================================================
// Scripted Fetcher
// ============================================================================

enum Reply {
    Page(Value),
    Redirect(&'static str, Value),
    Status(u16),
    Timeout,
    Hang,
}

/// In-memory fetcher answering from a fixed script and recording every call
#[derive(Default)]
struct ScriptedFetcher {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn new() -> Self {
        Self::default()
    }

    fn page(mut self, url: &str, body: Value) -> Self {
        self.replies.insert(url.to_string(), Reply::Page(body));
        self
    }

    fn reply(mut self, url: &str, reply: Reply) -> Self {
        self.replies.insert(url.to_string(), reply);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url, _correlation_id: &CorrelationId) -> Result<FetchedPage> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.replies.get(url.as_str()) {
            Some(Reply::Page(body)) => Ok(FetchedPage::new(url.clone(), body.clone())),
            Some(Reply::Redirect(to, body)) => {
                Ok(FetchedPage::new(Url::parse(to).unwrap(), body.clone()))
            }
            Some(Reply::Status(status)) => Err(Error::http_status(*status, "")),
            Some(Reply::Timeout) => Err(Error::Timeout { timeout_ms: 120_000 }),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(Error::http_status(404, format!("unscripted url {url}"))),
        }
    }
}

const SEED: &str = "https://api.test/feed/page1";

fn seed() -> Url {
    Url::parse(SEED).unwrap()
}

fn layout() -> PageLayout {
    PageLayout::new("items", Some("nextLink".to_string()))
}

fn cid() -> CorrelationId {
    CorrelationId::new("cid-test")
}

async fn walk(fetcher: &ScriptedFetcher) -> std::result::Result<ResultSet, TraversalError> {
    let paginator = NextLinkPaginator::new();
    let layout = layout();
    PaginationTraversal::new(fetcher, &paginator, &layout, cid())
        .run(seed())
        .await
}

// ============================================================================
// Completion Tests
// ============================================================================

#[tokio::test]
async fn test_two_pages_with_relative_link() {
    let fetcher = ScriptedFetcher::new()
        .page(SEED, json!({"items": ["a", "b"], "nextLink": "page2"}))
        .page(
            "https://api.test/feed/page2",
            json!({"items": ["c"], "nextLink": null}),
        );

    let result = walk(&fetcher).await.unwrap();

    assert_eq!(result.items(), &[json!("a"), json!("b"), json!("c")]);
    assert_eq!(result.stats().pages_fetched, 2);
    assert_eq!(
        fetcher.calls(),
        vec![SEED.to_string(), "https://api.test/feed/page2".to_string()]
    );
}

#[tokio::test]
async fn test_empty_seed_page() {
    let fetcher = ScriptedFetcher::new().page(SEED, json!({"items": [], "nextLink": null}));

    let result = walk(&fetcher).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.stats().pages_fetched, 1);
}

#[tokio::test]
async fn test_empty_body_seed_page() {
    let fetcher = ScriptedFetcher::new().page(SEED, Value::Null);

    let result = walk(&fetcher).await.unwrap();
    assert!(result.is_empty());
}

#[test_case(vec![2] ; "single page")]
#[test_case(vec![3, 0, 4] ; "empty page in the middle")]
#[test_case(vec![1; 10] ; "ten pages")]
#[test_case(vec![0, 0, 5] ; "leading empty pages")]
#[tokio::test]
async fn test_total_is_sum_of_page_sizes(sizes: Vec<usize>) {
    let mut fetcher = ScriptedFetcher::new();
    for (page, size) in sizes.iter().enumerate() {
        let url = format!("https://api.test/feed/page{}", page + 1);
        let items: Vec<Value> = (0..*size).map(|i| json!({"page": page, "i": i})).collect();
        let next = if page + 1 < sizes.len() {
            json!(format!("page{}", page + 2))
        } else {
            Value::Null
        };
        fetcher = fetcher.page(&url, json!({"items": items, "nextLink": next}));
    }

    let result = walk(&fetcher).await.unwrap();

    assert_eq!(result.len(), sizes.iter().sum::<usize>());
    assert_eq!(result.stats().pages_fetched, sizes.len());

    // page-then-within-page order
    let order: Vec<(u64, u64)> = result
        .iter()
        .map(|item| (item["page"].as_u64().unwrap(), item["i"].as_u64().unwrap()))
        .collect();
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(order, sorted);
}

#[tokio::test]
async fn test_relative_link_resolves_against_redirect_target() {
    let fetcher = ScriptedFetcher::new()
        .reply(
            SEED,
            Reply::Redirect(
                "https://api.test/v2/feed/page1",
                json!({"items": ["a"], "nextLink": "page2"}),
            ),
        )
        .page("https://api.test/v2/feed/page2", json!({"items": ["b"]}));

    let result = walk(&fetcher).await.unwrap();

    assert_eq!(result.items(), &[json!("a"), json!("b")]);
    assert_eq!(
        fetcher.calls(),
        vec![SEED.to_string(), "https://api.test/v2/feed/page2".to_string()]
    );
}

// ============================================================================
// Cycle Tests
// ============================================================================

#[tokio::test]
async fn test_self_link_is_cycle() {
    let fetcher = ScriptedFetcher::new().page(SEED, json!({"items": ["a"], "nextLink": SEED}));

    let err = walk(&fetcher).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cycle);
    assert_eq!(err.url, SEED);
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test]
async fn test_link_back_to_earlier_page_is_cycle() {
    let fetcher = ScriptedFetcher::new()
        .page(SEED, json!({"items": ["a"], "nextLink": "page2"}))
        .page(
            "https://api.test/feed/page2",
            json!({"items": ["b"], "nextLink": "page1#again"}),
        );

    let err = walk(&fetcher).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cycle);
    assert_eq!(err.pages_fetched, 2);
    assert_eq!(fetcher.calls().len(), 2);
}

#[tokio::test]
async fn test_redirect_onto_visited_page_is_cycle() {
    let fetcher = ScriptedFetcher::new()
        .page(SEED, json!({"items": ["a"], "nextLink": "page2"}))
        .reply(
            "https://api.test/feed/page2",
            Reply::Redirect(SEED, json!({"items": ["a"], "nextLink": "page2"})),
        );

    let err = walk(&fetcher).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cycle);
    assert_eq!(err.url, SEED);
    assert_eq!(err.pages_fetched, 1);
    assert_eq!(fetcher.calls().len(), 2);
}

// ============================================================================
// Failure Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_failure_discards_partial_result() {
    let fetcher = ScriptedFetcher::new()
        .page(SEED, json!({"items": ["a", "b"], "nextLink": "page2"}))
        .reply("https://api.test/feed/page2", Reply::Status(503));

    let err = walk(&fetcher).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Http);
    assert_eq!(err.error().status(), Some(503));
    assert_eq!(err.url, "https://api.test/feed/page2");
    assert_eq!(err.pages_fetched, 1);
    assert_eq!(err.correlation_id, cid());
}

#[tokio::test]
async fn test_timeout_is_network_failure() {
    let fetcher = ScriptedFetcher::new()
        .page(SEED, json!({"items": ["a"], "nextLink": "page2"}))
        .reply("https://api.test/feed/page2", Reply::Timeout);

    let err = walk(&fetcher).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_malformed_next_link_is_parse_error() {
    let fetcher =
        ScriptedFetcher::new().page(SEED, json!({"items": ["a"], "nextLink": "http://[::1"}));

    let err = walk(&fetcher).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test]
async fn test_non_conforming_page_is_parse_error() {
    let fetcher = ScriptedFetcher::new().page(SEED, json!({"data": ["a"]}));

    let err = walk(&fetcher).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.pages_fetched, 0);
}

// ============================================================================
// Limit Tests
// ============================================================================

#[tokio::test]
async fn test_page_limit() {
    let fetcher = ScriptedFetcher::new()
        .page(SEED, json!({"items": [1], "nextLink": "page2"}))
        .page(
            "https://api.test/feed/page2",
            json!({"items": [2], "nextLink": "page3"}),
        )
        .page("https://api.test/feed/page3", json!({"items": [3]}));

    let paginator = NextLinkPaginator::new();
    let layout = layout();
    let err = PaginationTraversal::new(&fetcher, &paginator, &layout, cid())
        .with_limits(TraversalLimits::default().with_max_pages(2))
        .run(seed())
        .await
        .unwrap_err();

    assert!(matches!(err.error(), Error::PageLimitExceeded { max_pages: 2 }));
    assert_eq!(err.kind(), ErrorKind::Limit);
    assert_eq!(fetcher.calls().len(), 2);
}

#[tokio::test]
async fn test_page_limit_not_hit_when_exact() {
    let fetcher = ScriptedFetcher::new()
        .page(SEED, json!({"items": [1], "nextLink": "page2"}))
        .page("https://api.test/feed/page2", json!({"items": [2]}));

    let paginator = NextLinkPaginator::new();
    let layout = layout();
    let result = PaginationTraversal::new(&fetcher, &paginator, &layout, cid())
        .with_limits(TraversalLimits::default().with_max_pages(2))
        .run(seed())
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
}

#[tokio::test]
async fn test_elapsed_budget() {
    let fetcher = ScriptedFetcher::new().reply(SEED, Reply::Hang);

    let paginator = NextLinkPaginator::new();
    let layout = layout();
    let err = PaginationTraversal::new(&fetcher, &paginator, &layout, cid())
        .with_limits(TraversalLimits::default().with_max_elapsed(Duration::from_millis(30)))
        .run(seed())
        .await
        .unwrap_err();

    assert!(matches!(err.error(), Error::DeadlineExceeded { .. }));
    assert_eq!(err.kind(), ErrorKind::Limit);
}

// ============================================================================
// Cancellation Tests
// ============================================================================

#[tokio::test]
async fn test_cancelled_before_start() {
    let fetcher = ScriptedFetcher::new().page(SEED, json!({"items": [1]}));
    let token = CancellationToken::new();
    token.cancel();

    let paginator = NextLinkPaginator::new();
    let layout = layout();
    let err = PaginationTraversal::new(&fetcher, &paginator, &layout, cid())
        .with_cancellation(token)
        .run(seed())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_cancel_aborts_in_flight_fetch() {
    let fetcher = ScriptedFetcher::new()
        .page(SEED, json!({"items": [1], "nextLink": "page2"}))
        .reply("https://api.test/feed/page2", Reply::Hang);
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let paginator = NextLinkPaginator::new();
    let layout = layout();
    let err = PaginationTraversal::new(&fetcher, &paginator, &layout, cid())
        .with_cancellation(token)
        .run(seed())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(err.pages_fetched, 1);
    assert_eq!(err.url, "https://api.test/feed/page2");
}

// ============================================================================
// Page Number Mode Tests
// ============================================================================

#[tokio::test]
async fn test_page_number_mode_stops_on_empty_body() {
    let fetcher = ScriptedFetcher::new()
        .page("https://api.test/posts?page=1", json!({"items": ["a", "b"]}))
        .page("https://api.test/posts?page=2", json!({"items": ["c"]}))
        .page("https://api.test/posts?page=3", Value::Null);

    let paginator = PageNumberPaginator::new("page", 1);
    let layout = PageLayout::new("items", None);
    let result = PaginationTraversal::new(&fetcher, &paginator, &layout, cid())
        .run(Url::parse("https://api.test/posts").unwrap())
        .await
        .unwrap();

    assert_eq!(result.items(), &[json!("a"), json!("b"), json!("c")]);
    assert_eq!(result.stats().pages_fetched, 3);
}

// ============================================================================
// Type Tests
// ============================================================================

#[test]
fn test_state_names() {
    let url = seed();
    assert_eq!(
        TraversalState::Fetching {
            target: url.clone()
        }
        .name(),
        "fetching"
    );
    assert!(!TraversalState::Following {
        url: url.clone(),
        summary: PageSummary::default()
    }
    .is_terminal());
    assert!(TraversalState::Done.is_terminal());
    assert!(TraversalState::Failed {
        url,
        error: Error::Cancelled
    }
    .is_terminal());
}

#[test]
fn test_limits_from_config() {
    let limits = TraversalLimits::from_config(&crate::config::LimitsConfig {
        max_pages: 7,
        max_elapsed_ms: Some(1500),
    });
    assert_eq!(limits.max_pages, 7);
    assert_eq!(limits.max_elapsed, Some(Duration::from_millis(1500)));
}

#[test]
fn test_result_set_serializes_as_array() {
    let set = ResultSet::new(vec![json!({"id": 1}), json!("x")], TraversalStats::default());
    assert_eq!(serde_json::to_value(&set).unwrap(), json!([{"id": 1}, "x"]));

    let collected: Vec<&Value> = (&set).into_iter().collect();
    assert_eq!(collected.len(), 2);
    assert_eq!(set.into_items().len(), 2);
}
