//! Search controller behavior against a scripted catalog
//!
//! These tests drive `SearchController` through its public operations and
//! check the resulting page state, the queries sent and the notices emitted.

mod common;

use std::sync::Arc;
use std::time::Duration;

use bookshelf_client::books::query::browse_queries;
use bookshelf_client::books::{
    AuthorType, FilterValue, Genre, Language, OrderBy, PAGE_SIZE, SearchRequest,
};
use bookshelf_client::notice::{NoticeKind, messages};
use bookshelf_client::{
    ClientConfig, EmptySearchPolicy, LoadMoreOutcome, Phase, SearchController, SearchOutcome,
};
use chrono::{Datelike, Utc};
use common::{FakeVolumeSource, drain, ids, notice_channel, page};
use rstest::rstest;
use tracing_test::traced_test;

const DUNE_CLASSIC: &str = "dune+inauthor:\"classic author\"";

fn controller(
    source: &Arc<FakeVolumeSource>,
    policy: EmptySearchPolicy,
) -> (
    SearchController,
    tokio::sync::mpsc::UnboundedReceiver<bookshelf_client::Notice>,
) {
    let config = ClientConfig::new().with_empty_search_policy(policy);
    let (tx, rx) = notice_channel();
    let controller = SearchController::new(source.clone(), &config).with_notifier(tx);
    (controller, rx)
}

#[tokio::test]
#[traced_test]
async fn test_term_and_author_filter_build_expected_query() {
    let source = Arc::new(FakeVolumeSource::new());
    source.on(DUNE_CLASSIC, 0, page(&["a", "b"], 2));
    let (controller, _rx) = controller(&source, EmptySearchPolicy::Fallback);

    let outcome = controller
        .search(
            SearchRequest::new()
                .term("dune")
                .filter(FilterValue::Author(AuthorType::Classic)),
        )
        .await;

    assert!(matches!(
        outcome,
        SearchOutcome::Loaded {
            count: 2,
            total_items: 2
        }
    ));

    let calls = source.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].q, DUNE_CLASSIC);
    assert_eq!(calls[0].start_index, 0);
    assert_eq!(calls[0].max_results, PAGE_SIZE);

    let state = controller.state();
    assert!(state.search_mode);
    assert!(!state.loading);
    assert!(!state.no_results);
    assert_eq!(ids(&state.items), vec!["a", "b"]);
}

#[tokio::test]
async fn test_toggling_same_filter_clears_slot() {
    let source = Arc::new(FakeVolumeSource::new());
    source.fallback(page(&["x"], 1));
    let (controller, _rx) = controller(&source, EmptySearchPolicy::Fallback);

    let scifi = FilterValue::Genre(Genre::ScienceFiction);
    controller.set_filter(scifi).await;
    assert_eq!(controller.request().filters.genre, Some(Genre::ScienceFiction));
    assert_eq!(source.calls()[0].q, "subject:\"science fiction\"");

    // Second selection of the same value deselects, leaving nothing to search
    controller.set_filter(scifi).await;
    let request = controller.request();
    assert!(request.filters.is_empty());
    assert_eq!(request.filters.genre, None);

    let calls = source.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].order_by, Some(OrderBy::Relevance));
    assert!(!controller.state().search_mode);
}

#[tokio::test]
async fn test_filter_in_other_slot_replaces_only_that_slot() {
    let source = Arc::new(FakeVolumeSource::new());
    let (controller, _rx) = controller(&source, EmptySearchPolicy::Fallback);

    controller.set_filter(FilterValue::Genre(Genre::History)).await;
    controller
        .set_filter(FilterValue::Language(Language::Spanish))
        .await;
    controller.set_filter(FilterValue::Genre(Genre::Poetry)).await;

    let request = controller.request();
    assert_eq!(request.filters.genre, Some(Genre::Poetry));
    assert_eq!(request.filters.language, Some(Language::Spanish));

    let last = source.calls().pop().unwrap();
    assert_eq!(last.q, "subject:\"poetry\"+langrestrict:es");
    assert_eq!(last.lang_restrict, Some("es"));
}

#[tokio::test]
async fn test_load_more_appends_without_duplicates() {
    let source = Arc::new(FakeVolumeSource::new());
    source
        .on("dune", 0, page(&["a", "b", "c"], 8))
        .on("dune", PAGE_SIZE, page(&["c", "d", "a", "e"], 8))
        .on("dune", 2 * PAGE_SIZE, page(&["e", "f"], 8));
    let (controller, _rx) = controller(&source, EmptySearchPolicy::Fallback);

    controller.search(SearchRequest::new().term("dune")).await;

    let outcome = controller.load_more().await;
    assert!(matches!(outcome, LoadMoreOutcome::Appended(2)));
    let outcome = controller.load_more().await;
    assert!(matches!(outcome, LoadMoreOutcome::Appended(1)));

    let state = controller.state();
    assert_eq!(ids(&state.items), vec!["a", "b", "c", "d", "e", "f"]);
    assert_eq!(state.cursor, 2 * PAGE_SIZE);
    assert_eq!(state.phase, Phase::Loaded { empty: false });

    let mut seen = std::collections::HashSet::new();
    assert!(state.items.iter().all(|v| seen.insert(v.id.clone())));

    let starts: Vec<u32> = source.calls().iter().map(|q| q.start_index).collect();
    assert_eq!(starts, vec![0, PAGE_SIZE, 2 * PAGE_SIZE]);
    assert!(source.calls().iter().all(|q| q.q == "dune"));
}

#[tokio::test]
async fn test_load_more_is_noop_when_everything_is_loaded() {
    let source = Arc::new(FakeVolumeSource::new());
    source.on("dune", 0, page(&["a", "b"], 2));
    let (controller, _rx) = controller(&source, EmptySearchPolicy::Fallback);

    controller.search(SearchRequest::new().term("dune")).await;
    let before = controller.state();

    let outcome = controller.load_more().await;
    assert!(matches!(outcome, LoadMoreOutcome::NothingMore));
    assert_eq!(source.calls().len(), 1);
    assert_eq!(controller.state(), before);
}

#[tokio::test]
async fn test_load_more_before_any_results_does_nothing() {
    let source = Arc::new(FakeVolumeSource::new());
    let (controller, _rx) = controller(&source, EmptySearchPolicy::Fallback);

    assert!(matches!(
        controller.load_more().await,
        LoadMoreOutcome::NothingMore
    ));
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_empty_continuation_stops_pagination() {
    let source = Arc::new(FakeVolumeSource::new());
    source
        .on("dune", 0, page(&["a", "b"], 500))
        .on("dune", PAGE_SIZE, page(&[], 500));
    let (controller, _rx) = controller(&source, EmptySearchPolicy::Fallback);

    controller.search(SearchRequest::new().term("dune")).await;
    assert!(matches!(
        controller.load_more().await,
        LoadMoreOutcome::Appended(0)
    ));

    let state = controller.state();
    assert_eq!(state.total_items, 2);
    assert!(!state.has_more());
    assert!(matches!(
        controller.load_more().await,
        LoadMoreOutcome::NothingMore
    ));
}

#[tokio::test]
async fn test_load_more_failure_keeps_results_and_cursor() {
    let source = Arc::new(FakeVolumeSource::new());
    source
        .on("dune", 0, page(&["a", "b"], 30))
        .fail("dune", PAGE_SIZE, 503);
    let (controller, mut rx) = controller(&source, EmptySearchPolicy::Fallback);

    controller.search(SearchRequest::new().term("dune")).await;
    drain(&mut rx);

    let outcome = controller.load_more().await;
    assert!(matches!(outcome, LoadMoreOutcome::Failed(_)));

    let state = controller.state();
    assert_eq!(ids(&state.items), vec!["a", "b"]);
    assert_eq!(state.cursor, 0);
    assert!(!state.loading);
    assert!(state.has_more());

    let notices = drain(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Error);
    assert_eq!(notices[0].message, messages::LOAD_MORE_FAILED);

    // The same page is requested again on retry
    source.on("dune", PAGE_SIZE, page(&["c"], 30));
    assert!(matches!(
        controller.load_more().await,
        LoadMoreOutcome::Appended(1)
    ));
    assert_eq!(controller.state().cursor, PAGE_SIZE);
}

#[tokio::test]
#[traced_test]
async fn test_empty_response_is_loaded_empty_not_error() {
    let source = Arc::new(FakeVolumeSource::new());
    source.on("zzzzqqq", 0, page(&[], 0));
    let (controller, mut rx) = controller(&source, EmptySearchPolicy::Fallback);

    let outcome = controller
        .search(SearchRequest::new().term("zzzzqqq"))
        .await;
    assert!(matches!(outcome, SearchOutcome::Empty));

    let state = controller.state();
    assert_eq!(state.phase, Phase::Loaded { empty: true });
    assert!(state.no_results);
    assert!(!state.loading);
    assert!(state.items.is_empty());

    let notices = drain(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Info);
    assert_eq!(notices[0].message, messages::NO_BOOKS_FOUND);
}

#[tokio::test]
async fn test_load_all_loop_stops_on_persistent_failure() {
    let source = Arc::new(FakeVolumeSource::new());
    source
        .on("dune", 0, page(&["a", "b"], 30))
        .on("dune", PAGE_SIZE, page(&["c", "d"], 30))
        .fail("dune", 2 * PAGE_SIZE, 503);
    let (controller, _rx) = controller(&source, EmptySearchPolicy::Fallback);

    controller.search(SearchRequest::new().term("dune")).await;

    let loaded = tokio::time::timeout(Duration::from_secs(1), async {
        let mut pages = 0;
        while let LoadMoreOutcome::Appended(_) = controller.load_more().await {
            pages += 1;
        }
        pages
    })
    .await
    .expect("loop should end on the failed page");

    assert_eq!(loaded, 1);
    let state = controller.state();
    assert_eq!(ids(&state.items), vec!["a", "b", "c", "d"]);
    assert!(state.has_more());
}

#[tokio::test]
async fn test_search_failure_marks_state_failed() {
    let source = Arc::new(FakeVolumeSource::new());
    source.fail("dune", 0, 500);
    let (controller, mut rx) = controller(&source, EmptySearchPolicy::Fallback);

    let outcome = controller.search(SearchRequest::new().term("dune")).await;
    assert!(matches!(
        outcome,
        SearchOutcome::Failed(bookshelf_client::BookshelfError::ApiError { status: 500, .. })
    ));

    let state = controller.state();
    assert_eq!(state.phase, Phase::Failed);
    assert!(state.no_results);
    assert!(!state.loading);
    assert!(matches!(
        controller.load_more().await,
        LoadMoreOutcome::NothingMore
    ));

    let notices = drain(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, messages::SEARCH_FAILED);
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn test_empty_search_falls_back_to_browse(#[case] term: &str) {
    let source = Arc::new(FakeVolumeSource::new());
    source.fallback(page(&["p1", "p2"], 40));
    let (controller, _rx) = controller(&source, EmptySearchPolicy::Fallback);

    let outcome = controller.search(SearchRequest::new().term(term)).await;
    assert!(matches!(outcome, SearchOutcome::Loaded { count: 2, .. }));

    let calls = source.calls();
    assert_eq!(calls.len(), 1);
    assert!(browse_queries(Utc::now().year()).contains(&calls[0].q));
    assert_eq!(calls[0].order_by, Some(OrderBy::Relevance));

    let state = controller.state();
    assert!(!state.search_mode);
    assert!(state.has_more());
}

#[tokio::test]
async fn test_empty_search_prompts_and_keeps_state() {
    let source = Arc::new(FakeVolumeSource::new());
    source.on("dune", 0, page(&["a"], 1));
    let (controller, mut rx) = controller(&source, EmptySearchPolicy::Prompt);

    controller.search(SearchRequest::new().term("dune")).await;
    let before = controller.state();
    drain(&mut rx);

    let outcome = controller.search(SearchRequest::new().term("  ")).await;
    assert!(matches!(outcome, SearchOutcome::NothingToSearch));
    assert_eq!(controller.state(), before);
    assert_eq!(source.calls().len(), 1);

    let notices = drain(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, messages::ENTER_SEARCH);
}

#[tokio::test]
async fn test_clear_filters_resets_request_and_browses() {
    let source = Arc::new(FakeVolumeSource::new());
    source.fallback(page(&["p1"], 1));
    let (controller, _rx) = controller(&source, EmptySearchPolicy::Prompt);

    controller.set_term("dune");
    controller.set_filter(FilterValue::Genre(Genre::Essay)).await;
    assert_eq!(source.calls()[0].q, "dune+subject:\"essay\"");

    controller.clear_filters().await;
    let request = controller.request();
    assert!(request.term.is_empty());
    assert!(request.filters.is_empty());

    let state = controller.state();
    assert!(!state.search_mode);
    assert_eq!(ids(&state.items), vec!["p1"]);
    assert_eq!(source.calls()[1].order_by, Some(OrderBy::Relevance));
}

#[tokio::test]
async fn test_load_initial_uses_browse_query_and_paginates_it() {
    let source = Arc::new(FakeVolumeSource::new());
    let first: Vec<String> = (0..10).map(|i| format!("v{}", i)).collect();
    let first: Vec<&str> = first.iter().map(String::as_str).collect();
    source.fallback(page(&first, 25));
    let (controller, _rx) = controller(&source, EmptySearchPolicy::Fallback);

    let outcome = controller.load_initial().await;
    assert!(matches!(
        outcome,
        SearchOutcome::Loaded {
            count: 10,
            total_items: 25
        }
    ));
    assert!(!controller.state().search_mode);

    // Same browse query continues at the next offset
    controller.load_more().await;
    let calls = source.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].q, calls[0].q);
    assert_eq!(calls[1].start_index, PAGE_SIZE);
    assert_eq!(calls[1].order_by, Some(OrderBy::Relevance));
}

#[tokio::test]
async fn test_new_search_resets_accumulated_results() {
    let source = Arc::new(FakeVolumeSource::new());
    source
        .on("dune", 0, page(&["a", "b"], 30))
        .on("dune", PAGE_SIZE, page(&["c"], 30))
        .on("emma", 0, page(&["x"], 1));
    let (controller, _rx) = controller(&source, EmptySearchPolicy::Fallback);

    controller.search(SearchRequest::new().term("dune")).await;
    controller.load_more().await;
    assert_eq!(controller.state().items.len(), 3);

    controller.search(SearchRequest::new().term("emma")).await;
    let state = controller.state();
    assert_eq!(ids(&state.items), vec!["x"]);
    assert_eq!(state.cursor, 0);
    assert_eq!(state.total_items, 1);
}

#[tokio::test]
async fn test_overlapping_searches_last_arrival_wins() {
    let source = Arc::new(FakeVolumeSource::new());
    source
        .on_delayed("slow", 0, Duration::from_millis(150), page(&["s1", "s2"], 2))
        .on("fast", 0, page(&["f1"], 1));
    let (controller, _rx) = controller(&source, EmptySearchPolicy::Fallback);

    let (slow, fast) = tokio::join!(
        controller.search(SearchRequest::new().term("slow")),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            controller.search(SearchRequest::new().term("fast")).await
        }
    );

    assert!(matches!(slow, SearchOutcome::Loaded { count: 2, .. }));
    assert!(matches!(fast, SearchOutcome::Loaded { count: 1, .. }));

    // The slow response was issued first but arrived last
    let state = controller.state();
    assert_eq!(ids(&state.items), vec!["s1", "s2"]);
    assert_eq!(state.total_items, 2);
    assert_eq!(controller.request().term, "fast");
}

#[tokio::test]
async fn test_sequential_searches_keep_latest() {
    let source = Arc::new(FakeVolumeSource::new());
    source
        .on_delayed("first", 0, Duration::from_millis(10), page(&["a"], 1))
        .on_delayed("second", 0, Duration::from_millis(100), page(&["b"], 1));
    let (controller, _rx) = controller(&source, EmptySearchPolicy::Fallback);

    tokio::join!(
        controller.search(SearchRequest::new().term("first")),
        async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            controller.search(SearchRequest::new().term("second")).await
        }
    );

    assert_eq!(ids(&controller.state().items), vec!["b"]);
}
