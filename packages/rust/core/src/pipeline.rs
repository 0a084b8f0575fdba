//! End-to-end run: index page → discovery → worker pool → corpus artifact.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument, warn};
use url::Url;
use uuid::Uuid;

use wikiharvest_crawler::{Harvester, HttpFetcher, PageFetcher, PoolProgress};
use wikiharvest_discovery::ItemLinks;
use wikiharvest_markup::{HtmlParser, extract_from_html};
use wikiharvest_shared::{HarvestConfig, HarvestError, Record, Result};

use crate::output::write_corpus;
use crate::report::HarvestReport;

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once per settled item, in completion order.
    fn item_finished(&self, location: &str, completed: usize, total: usize, ok: bool);
    /// Called when the run completes.
    fn done(&self, report: &HarvestReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn item_finished(&self, _location: &str, _completed: usize, _total: usize, _ok: bool) {}
    fn done(&self, _report: &HarvestReport) {}
}

/// Run a full harvest.
///
/// 1. Discovery: collect item locations from the index page
/// 2. Fetch and extract every item on the worker pool
/// 3. Write the corpus once all items settle
///
/// Per-item failures end up in the report. Only configuration errors, a
/// failed index fetch, and a failed output write abort the run.
#[instrument(skip_all, fields(index = %config.index_url, concurrency = config.concurrency))]
pub async fn harvest(config: &HarvestConfig, progress: &dyn ProgressReporter) -> Result<HarvestReport> {
    config.validate()?;
    let index_url = config.parsed_index_url()?;

    let start = Instant::now();
    let started_at = Utc::now();
    let run_id = Uuid::now_v7();

    info!(%run_id, "starting harvest");

    progress.phase("Discovering item pages");
    let fetcher = HttpFetcher::from_config(config)?;
    let links = wikiharvest_discovery::discover(fetcher.client(), &index_url).await?;
    let discovered = links.locations.len();
    if discovered == 0 {
        warn!("index page lists no item pages");
    }

    progress.phase(&format!("Harvesting {discovered} item pages"));
    let harvester = Harvester::new(fetcher, index_url, config.concurrency);
    let run = harvester
        .run(links.locations, &PipelinePoolProgress { inner: progress })
        .await;

    progress.phase("Writing corpus");
    write_corpus(&config.output_path, &run.corpus)?;

    let report = HarvestReport {
        run_id,
        index_url: config.index_url.clone(),
        output_path: config.output_path.clone(),
        started_at,
        finished_at: Utc::now(),
        elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        discovered,
        attempted: run.attempted,
        succeeded: run.succeeded,
        duplicates: run.duplicates,
        failures: run.failures,
    };

    progress.done(&report);

    info!(
        %run_id,
        attempted = report.attempted,
        succeeded = report.succeeded,
        failed = report.failed(),
        elapsed_ms = report.elapsed_ms,
        output = %report.output_path.display(),
        "harvest complete"
    );

    Ok(report)
}

/// Adapts a `ProgressReporter` to the pool's `PoolProgress` interface.
struct PipelinePoolProgress<'a> {
    inner: &'a dyn ProgressReporter,
}

impl PoolProgress for PipelinePoolProgress<'_> {
    fn item_finished(&self, location: &str, completed: usize, total: usize, ok: bool) {
        self.inner.item_finished(location, completed, total, ok);
    }
}

/// Fetch the index page and list its item locations without harvesting.
#[instrument(skip_all, fields(index = %config.index_url))]
pub async fn discover_items(config: &HarvestConfig) -> Result<ItemLinks> {
    let index_url = config.parsed_index_url()?;
    let fetcher = HttpFetcher::from_config(config)?;
    wikiharvest_discovery::discover(fetcher.client(), &index_url).await
}

/// Extract the record of a page saved on disk.
pub fn extract_file(path: &Path) -> Result<Record> {
    let raw = std::fs::read_to_string(path).map_err(|e| HarvestError::io(path, e))?;
    extract_from_html(&HtmlParser, &raw)
}

/// Fetch one page and extract its record.
///
/// `target` is either an absolute URL or an item location, which is
/// resolved against the configured index URL.
#[instrument(skip(config))]
pub async fn extract_url(config: &HarvestConfig, target: &str) -> Result<Record> {
    let url = match Url::parse(target) {
        Ok(url) => url,
        Err(_) => config
            .parsed_index_url()?
            .join(target)
            .map_err(|_| HarvestError::invalid_identifier(target))?,
    };

    let fetcher = HttpFetcher::from_config(config)?;
    let body = fetcher.fetch(&url).await?;
    extract_from_html(&HtmlParser, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use wikiharvest_shared::{FailureKind, NormalizedText};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INDEX_PATH: &str = "/wiki/index.php/IMO_Problems_and_Solutions";

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wh-pipeline-test-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn item_page(problem: &str, solution: &str) -> String {
        format!(
            r#"<html><body><div class="mw-parser-output">
<h2><span class="mw-headline">Problem</span></h2><p>{problem}</p>
<h2><span class="mw-headline">Solution</span></h2><p>{solution}</p>
<h2><span class="mw-headline">Video Solution</span></h2><p>youtube</p>
</div></body></html>"#
        )
    }

    fn config_for(server: &MockServer, output_path: PathBuf) -> HarvestConfig {
        HarvestConfig {
            index_url: format!("{}{INDEX_PATH}", server.uri()),
            output_path,
            concurrency: 2,
            ..HarvestConfig::default()
        }
    }

    async fn mount(server: &MockServer, at: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[derive(Default)]
    struct RecordingProgress {
        phases: Mutex<Vec<String>>,
        finished: Mutex<Vec<(String, bool)>>,
        done: Mutex<Option<usize>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.phases.lock().unwrap().push(name.to_string());
        }

        fn item_finished(&self, location: &str, _completed: usize, _total: usize, ok: bool) {
            self.finished.lock().unwrap().push((location.to_string(), ok));
        }

        fn done(&self, report: &HarvestReport) {
            *self.done.lock().unwrap() = Some(report.attempted);
        }
    }

    #[tokio::test]
    async fn test_harvest_end_to_end() {
        let server = MockServer::start().await;
        let index = r#"<ul>
<li><a href="/wiki/index.php/2019_IMO_Problems/Problem_1">1</a></li>
<li><a href="/wiki/index.php/2019_IMO_Problems/Problem_2">2</a></li>
<li><a href="/wiki/index.php/2020_IMO_Problems/Problem_3">3</a></li>
<li><a href="/wiki/index.php/2019_IMO_Problems/Problem_1">1 again</a></li>
</ul>"#;
        mount(&server, INDEX_PATH, ResponseTemplate::new(200).set_body_string(index)).await;
        mount(
            &server,
            "/wiki/index.php/2019_IMO_Problems/Problem_1",
            ResponseTemplate::new(200).set_body_string(item_page("Find x.", "<b>Answer:</b> x=1")),
        )
        .await;
        mount(
            &server,
            "/wiki/index.php/2019_IMO_Problems/Problem_2",
            ResponseTemplate::new(200).set_body_string("<html><body><p>no content</p></body></html>"),
        )
        .await;
        mount(
            &server,
            "/wiki/index.php/2020_IMO_Problems/Problem_3",
            ResponseTemplate::new(200).set_body_string(item_page("Prove ∑.", "Trivial.")),
        )
        .await;

        let dir = temp_dir();
        let out = dir.join("imo_data.json");
        let progress = RecordingProgress::default();
        let report = harvest(&config_for(&server, out.clone()), &progress).await.unwrap();

        assert_eq!(report.discovered, 3);
        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::MalformedPage);
        assert_eq!(report.failures[0].item.as_ref().map(ToString::to_string).as_deref(), Some("2019/2"));

        let finished = progress.finished.lock().unwrap();
        assert_eq!(finished.len(), 3);
        assert_eq!(finished.iter().filter(|(_, ok)| *ok).count(), 2);
        assert_eq!(*progress.done.lock().unwrap(), Some(3));
        assert_eq!(progress.phases.lock().unwrap().len(), 3);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["2019"]["1"]["Problem"]["text"], "Find x.");
        assert_eq!(written["2019"]["1"]["Solutions"][0]["text"], "**Answer:** x=1");
        assert!(written["2019"].get("2").is_none());
        assert_eq!(written["2020"]["3"]["Problem"]["text"], "Prove ∑.");
        assert_eq!(written["2020"]["3"]["Solutions"].as_array().unwrap().len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_harvest_index_failure_is_fatal() {
        let server = MockServer::start().await;
        mount(&server, INDEX_PATH, ResponseTemplate::new(503)).await;

        let dir = temp_dir();
        let out = dir.join("imo_data.json");
        let err = harvest(&config_for(&server, out.clone()), &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, HarvestError::Network(_)));
        assert!(!out.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_harvest_rejects_zero_concurrency() {
        let config = HarvestConfig {
            concurrency: 0,
            ..HarvestConfig::default()
        };
        let err = harvest(&config, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, HarvestError::Config { .. }));
    }

    #[tokio::test]
    async fn test_extract_url_resolves_locations() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/wiki/index.php/2019_IMO_Problems/Problem_1",
            ResponseTemplate::new(200).set_body_string(item_page("Find x.", "x=1")),
        )
        .await;

        let config = config_for(&server, PathBuf::from("unused.json"));
        let record = extract_url(&config, "/wiki/index.php/2019_IMO_Problems/Problem_1")
            .await
            .unwrap();
        assert_eq!(record.problem, Some(NormalizedText::new("Find x.")));
        assert_eq!(record.solutions, vec![NormalizedText::new("x=1")]);
    }

    #[test]
    fn test_extract_file_reads_saved_page() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures/html/imo_problem.html");
        let record = extract_file(&path).unwrap();
        assert!(record.problem.is_some());
        assert_eq!(record.solutions.len(), 2);
    }

    #[test]
    fn test_extract_file_missing_is_io_error() {
        let err = extract_file(Path::new("/nonexistent/page.html")).unwrap_err();
        assert!(matches!(err, HarvestError::Io { .. }));
    }
}
