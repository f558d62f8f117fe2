//! Integration tests for the crawler
//!
//! Graph scenarios run the coordinator against an in-memory site with a
//! call-counting analyzer. The end-to-end tests use wiremock to serve a real
//! site and robots.txt to the default HTTP analyzer.

use async_trait::async_trait;
use site_scout::config::RunConfig;
use site_scout::crawler::{
    AnalyzeError, AnalyzedPage, Coordinator, HttpAnalyzer, PageAnalyzer, StopReason,
};
use site_scout::robots::RobotsGate;
use site_scout::url::normalize_url;
use site_scout::{PageError, ScoutError};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AGENT: &str = "TestBot/1.0";
const SITE: &str = "http://example.test";

#[derive(Debug, Clone)]
struct StubPage {
    status: u16,
    links: Vec<String>,
}

impl AnalyzedPage for StubPage {
    fn status_code(&self) -> u16 {
        self.status
    }

    fn outbound_links(&self) -> &[String] {
        &self.links
    }
}

/// In-memory site keyed by normalized URL; unknown pages answer 404
#[derive(Default)]
struct GraphAnalyzer {
    pages: HashMap<String, StubPage>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Duration,
}

impl GraphAnalyzer {
    fn page(mut self, path: &str, status: u16, links: &[&str]) -> Self {
        let links = links.iter().map(|l| format!("{}{}", SITE, l)).collect();
        self.pages
            .insert(normalize_url(&format!("{}{}", SITE, path)), StubPage { status, links });
        self
    }

    fn calls_for(&self, path: &str) -> usize {
        let key = normalize_url(&format!("{}{}", SITE, path));
        self.calls.lock().unwrap().get(&key).copied().unwrap_or(0)
    }
}

#[async_trait]
impl PageAnalyzer for GraphAnalyzer {
    type Report = StubPage;

    async fn analyze(&self, url: &str) -> Result<StubPage, AnalyzeError> {
        let key = normalize_url(url);
        *self.calls.lock().unwrap().entry(key.clone()).or_insert(0) += 1;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(self.pages.get(&key).cloned().unwrap_or(StubPage {
            status: 404,
            links: Vec::new(),
        }))
    }
}

/// Every page links to three deeper pages, forever
struct EndlessAnalyzer {
    delay: Duration,
}

#[async_trait]
impl PageAnalyzer for EndlessAnalyzer {
    type Report = StubPage;

    async fn analyze(&self, url: &str) -> Result<StubPage, AnalyzeError> {
        tokio::time::sleep(self.delay).await;
        let base = url.trim_end_matches('/');
        Ok(StubPage {
            status: 200,
            links: (0..3).map(|i| format!("{}/{}", base, i)).collect(),
        })
    }
}

/// Panics on `/boom`, otherwise serves the wrapped site
struct PanickingAnalyzer {
    site: GraphAnalyzer,
}

#[async_trait]
impl PageAnalyzer for PanickingAnalyzer {
    type Report = StubPage;

    async fn analyze(&self, url: &str) -> Result<StubPage, AnalyzeError> {
        if url.ends_with("/boom") {
            panic!("analyzer bug on {}", url);
        }
        self.site.analyze(url).await
    }
}

/// Fails every request and counts attempts
#[derive(Default)]
struct FailingAnalyzer {
    calls: Mutex<usize>,
}

#[async_trait]
impl PageAnalyzer for FailingAnalyzer {
    type Report = StubPage;

    async fn analyze(&self, url: &str) -> Result<StubPage, AnalyzeError> {
        *self.calls.lock().unwrap() += 1;
        Err(AnalyzeError::Network {
            url: url.to_string(),
            message: "connection refused".to_string(),
        })
    }
}

fn run_config(max_depth: u32, max_pages: usize, concurrency: usize) -> RunConfig {
    RunConfig {
        max_depth,
        max_pages,
        concurrency,
        user_agent: AGENT.to_string(),
        time_budget: Duration::from_secs(10),
        politeness_delay: Duration::ZERO,
        robots_timeout: Duration::from_secs(2),
        queue_capacity: max_pages,
    }
}

/// Robots gate with `robots` pre-installed for the stub site
fn gate(robots: Option<&str>) -> Arc<RobotsGate> {
    let gate = RobotsGate::new(AGENT, Duration::from_secs(2)).unwrap();
    gate.prime(SITE, robots);
    Arc::new(gate)
}

fn coordinator<A>(config: RunConfig, analyzer: &Arc<A>, robots: Option<&str>) -> Coordinator<A>
where
    A: PageAnalyzer + 'static,
    A::Report: Clone,
{
    Coordinator::with_robots_gate(config, Arc::clone(analyzer), gate(robots))
}

fn site_keys(paths: &[&str]) -> BTreeSet<String> {
    paths
        .iter()
        .map(|p| normalize_url(&format!("{}{}", SITE, p)))
        .collect()
}

fn sample_site() -> GraphAnalyzer {
    GraphAnalyzer::default()
        .page("/", 200, &["/b", "/c", "/d"])
        .page("/b", 200, &["/e"])
        .page("/c", 200, &[])
        .page("/d", 200, &[])
        .page("/e", 200, &[])
}

#[tokio::test]
async fn test_depth_and_page_budget() {
    let analyzer = Arc::new(sample_site());
    let report = coordinator(run_config(1, 3, 1), &analyzer, None)
        .run(SITE)
        .await
        .unwrap();

    assert_eq!(report.sub_reports.len(), 3);
    assert_eq!(report.visited_keys(), site_keys(&["/", "/b", "/c"]));
    assert_eq!(analyzer.calls_for("/e"), 0);
    assert_eq!(analyzer.calls_for("/d"), 0);
    assert_eq!(report.stop_reason, StopReason::PageBudget);
    assert_eq!(report.pages_admitted, 3);
    assert!(report.main_report.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_depth_and_page_budget_concurrent() {
    let analyzer = Arc::new(sample_site());
    let report = coordinator(run_config(1, 3, 5), &analyzer, None)
        .run(SITE)
        .await
        .unwrap();

    let keys = report.visited_keys();
    assert_eq!(report.sub_reports.len(), 3);
    assert!(keys.contains(&normalize_url(SITE)));
    assert!(keys.is_subset(&site_keys(&["/", "/b", "/c", "/d"])));
    assert_eq!(analyzer.calls_for("/e"), 0);
}

#[tokio::test]
async fn test_single_page_budget_visits_only_seed() {
    let analyzer = Arc::new(sample_site());
    let report = coordinator(run_config(3, 1, 3), &analyzer, None)
        .run(SITE)
        .await
        .unwrap();

    assert_eq!(report.visited_keys(), site_keys(&["/"]));
    assert_eq!(analyzer.calls_for("/"), 1);
    assert_eq!(analyzer.calls_for("/b"), 0);
}

#[tokio::test]
async fn test_error_page_is_not_expanded() {
    let analyzer = Arc::new(GraphAnalyzer::default().page("/", 404, &["/b", "/c"]));
    let report = coordinator(run_config(2, 10, 2), &analyzer, None)
        .run(SITE)
        .await
        .unwrap();

    assert_eq!(report.sub_reports.len(), 1);
    assert_eq!(report.main_report.as_ref().map(|p| p.status), Some(404));
    assert_eq!(analyzer.calls_for("/b"), 0);
    assert_eq!(report.stop_reason, StopReason::Exhausted);
}

#[tokio::test]
async fn test_robots_denied_page_is_never_analyzed() {
    let analyzer = Arc::new(
        GraphAnalyzer::default()
            .page("/", 200, &["/private/data", "/public"])
            .page("/public", 200, &[]),
    );
    let report = coordinator(
        run_config(1, 10, 2),
        &analyzer,
        Some("User-agent: *\nDisallow: /private"),
    )
    .run(SITE)
    .await
    .unwrap();

    let denied = report
        .result_for(&format!("{}/private/data", SITE))
        .expect("denied page has a result");
    assert!(denied.is_policy_rejection());
    assert!(denied.report.is_none());
    assert_eq!(analyzer.calls_for("/private/data"), 0);

    assert_eq!(report.policy_rejections().count(), 1);
    assert_eq!(report.failures().count(), 0);
    assert_eq!(report.successes().count(), 2);
}

#[tokio::test]
async fn test_denied_seed_falls_back_to_direct_analysis() {
    let analyzer = Arc::new(sample_site());
    let report = coordinator(run_config(2, 10, 2), &analyzer, Some("User-agent: *\nDisallow: /"))
        .run(SITE)
        .await
        .unwrap();

    assert_eq!(report.sub_reports.len(), 1);
    assert!(report.sub_reports[0].is_policy_rejection());
    assert_eq!(report.main_report.as_ref().map(|p| p.status), Some(200));
    assert_eq!(analyzer.calls_for("/"), 1);
    assert_eq!(analyzer.calls_for("/b"), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_run_invariants_on_dense_graph() {
    let mut analyzer = GraphAnalyzer::default();
    for i in 0..40usize {
        let links: Vec<String> = (1..=4).map(|k| format!("/p{}", (i * 3 + k) % 40)).collect();
        let links: Vec<&str> = links.iter().map(String::as_str).collect();
        let path = if i == 0 {
            "/".to_string()
        } else {
            format!("/p{}", i)
        };
        analyzer = analyzer.page(&path, 200, &links);
    }
    let analyzer = Arc::new(analyzer);
    let config = run_config(2, 10, 8);

    let report = coordinator(config.clone(), &analyzer, None)
        .run(SITE)
        .await
        .unwrap();

    assert!(report.sub_reports.len() <= config.max_pages);
    assert!(report.sub_reports.iter().all(|r| r.depth <= config.max_depth));

    let mut keys = HashSet::new();
    for result in &report.sub_reports {
        assert!(keys.insert(normalize_url(&result.url)), "duplicate {}", result.url);
    }

    let calls = analyzer.calls.lock().unwrap();
    assert!(calls.values().all(|&n| n == 1));

    let depths: Vec<u32> = report.sub_reports.iter().map(|r| r.depth).collect();
    let mut sorted = depths.clone();
    sorted.sort();
    assert_eq!(depths, sorted);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_repeated_runs_visit_same_pages() {
    let analyzer = Arc::new(sample_site());
    let coordinator = coordinator(run_config(2, 30, 4), &analyzer, None);

    let first = coordinator.run(SITE).await.unwrap();
    let second = coordinator.run(SITE).await.unwrap();

    assert_eq!(first.visited_keys(), site_keys(&["/", "/b", "/c", "/d", "/e"]));
    assert_eq!(first.visited_keys(), second.visited_keys());
    assert_eq!(first.stop_reason, StopReason::Exhausted);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_time_budget_bounds_run() {
    let analyzer = Arc::new(EndlessAnalyzer {
        delay: Duration::from_millis(100),
    });
    let mut config = run_config(50, 10_000, 3);
    config.time_budget = Duration::from_millis(500);

    let start = Instant::now();
    let report = coordinator(config, &analyzer, None).run(SITE).await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(3));
    assert_eq!(report.stop_reason, StopReason::TimeBudget);
    assert!(!report.sub_reports.is_empty());
    assert!(report.sub_reports.len() < 10_000);
}

#[tokio::test]
async fn test_external_cancellation() {
    let analyzer = Arc::new(EndlessAnalyzer {
        delay: Duration::from_millis(50),
    });
    let coordinator = coordinator(run_config(50, 10_000, 2), &analyzer, None);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let report = coordinator
        .run_with_cancellation(SITE, cancel)
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::Cancelled);
    assert!(report.main_report.is_some());
}

#[tokio::test]
async fn test_full_queue_drops_instead_of_blocking() {
    let analyzer = Arc::new(sample_site());
    let mut config = run_config(1, 10, 1);
    config.queue_capacity = 1;

    let report = tokio::time::timeout(
        Duration::from_secs(5),
        coordinator(config, &analyzer, None).run(SITE),
    )
    .await
    .expect("crawl must not block on a full queue")
    .unwrap();

    assert_eq!(report.visited_keys(), site_keys(&["/", "/b"]));
    assert_eq!(report.stop_reason, StopReason::Exhausted);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_panicking_analysis_is_recorded_as_failure() {
    let analyzer = Arc::new(PanickingAnalyzer {
        site: GraphAnalyzer::default()
            .page("/", 200, &["/boom", "/ok"])
            .page("/ok", 200, &[]),
    });
    let mut config = run_config(1, 10, 2);
    config.time_budget = Duration::from_secs(30);

    let start = Instant::now();
    let report = coordinator(config, &analyzer, None).run(SITE).await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert_eq!(report.pages_admitted, 3);
    assert_eq!(report.sub_reports.len(), report.pages_admitted);
    assert_eq!(report.visited_keys(), site_keys(&["/", "/boom", "/ok"]));

    let boom = report.result_for(&format!("{}/boom", SITE)).unwrap();
    assert!(matches!(boom.error, Some(PageError::FetchFailure { .. })));
    assert_eq!(report.successes().count(), 2);
}

#[tokio::test]
async fn test_failed_seed_is_attempted_once() {
    let analyzer = Arc::new(FailingAnalyzer::default());
    let report = coordinator(run_config(2, 10, 2), &analyzer, None)
        .run(SITE)
        .await
        .unwrap();

    assert_eq!(report.sub_reports.len(), 1);
    assert_eq!(report.failures().count(), 1);
    assert!(report.main_report.is_none());
    assert_eq!(*analyzer.calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_seed_is_rejected() {
    let analyzer = Arc::new(sample_site());
    let coordinator = coordinator(run_config(1, 10, 1), &analyzer, None);

    for seed in ["not a url", "ftp://example.test/", "/relative"] {
        let result = coordinator.run(seed).await;
        assert!(
            matches!(result, Err(ScoutError::InvalidSeed { .. })),
            "seed {:?} should be rejected",
            seed
        );
    }
    assert!(analyzer.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><title>Home</title></head><body>
            <a href="/about">About</a>
            <a href="/admin">Admin</a>
            <a href="https://other.test/page">Elsewhere</a>
            <a href="mailto:team@example.test">Mail</a>
            </body></html>"#,
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><title>About</title></head><body>
            <a href="/">Home</a><a href="/about#team">Team</a>
            </body></html>"#,
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let analyzer = HttpAnalyzer::new(AGENT).unwrap();
    let coordinator = Coordinator::new(run_config(2, 10, 2), analyzer).unwrap();
    let report = coordinator.run(&base_url).await.unwrap();

    assert_eq!(report.sub_reports.len(), 3);
    assert_eq!(report.successes().count(), 2);
    assert_eq!(report.policy_rejections().count(), 1);
    assert!(report.result_for(&format!("{}/admin", base_url)).unwrap().is_policy_rejection());

    let main = report.main_report.as_ref().expect("seed analyzed");
    assert_eq!(main.title.as_deref(), Some("Home"));
    assert_eq!(report.stop_reason, StopReason::Exhausted);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_crawl_with_unreachable_robots() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body><a href="/gone">Gone</a></body></html>"#,
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let analyzer = HttpAnalyzer::new(AGENT).unwrap();
    let coordinator = Coordinator::new(run_config(2, 10, 1), analyzer).unwrap();
    let report = coordinator.run(&base_url).await.unwrap();

    assert_eq!(report.sub_reports.len(), 2);
    let gone = report.result_for(&format!("{}/gone", base_url)).unwrap();
    assert_eq!(gone.report.as_ref().map(|p| p.status_code), Some(404));
    assert_eq!(report.policy_rejections().count(), 0);
}
