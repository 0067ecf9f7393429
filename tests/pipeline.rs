//! End-to-end pipeline tests: extract → part list → harvest, driven by a
//! fake browser engine so no Chromium install is needed.

use anyhow::{bail, Result};
use async_trait::async_trait;
use partfetch::harvest::{self, HarvestConfig};
use partfetch::parts;
use partfetch::renderer::{NavigationResult, RenderContext, Renderer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const GOOD_PAGE: &str = r#"
    <html><body>
    <h1>Medium-Strength Steel Nylon-Insert Locknut</h1>
    <table class="ProductDetailTable_product-detail-spec-table__3T6Yi">
      <tr>
        <td class="ProductDetailRow_product-detail-spec-row-label__1zkIK">Thread Size</td>
        <td class="ProductDetailRow_product-detail-spec-row-value__3zb69">1/4"-20</td>
      </tr>
    </table>
    <a href="/cad">Download</a>
    </body></html>"#;

const BARE_PAGE: &str = "<html><body><h1>Hex Nut</h1></body></html>";

/// Canned behavior for one URL.
#[derive(Clone, Default)]
struct FakePage {
    html: String,
    fail_navigation: bool,
}

/// Browser engine backed by a URL → page map.
#[derive(Clone, Default)]
struct FakeRenderer {
    pages: Arc<Mutex<HashMap<String, FakePage>>>,
    download_dirs: Arc<Mutex<Vec<PathBuf>>>,
}

impl FakeRenderer {
    fn with_page(self, url: &str, page: FakePage) -> Self {
        self.pages
            .lock()
            .expect("pages lock")
            .insert(url.to_string(), page);
        self
    }

    fn download_dirs(&self) -> Vec<PathBuf> {
        self.download_dirs.lock().expect("dirs lock").clone()
    }
}

struct FakeContext {
    pages: Arc<Mutex<HashMap<String, FakePage>>>,
    download_dirs: Arc<Mutex<Vec<PathBuf>>>,
    current: Option<FakePage>,
    current_url: String,
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Ok(Box::new(FakeContext {
            pages: Arc::clone(&self.pages),
            download_dirs: Arc::clone(&self.download_dirs),
            current: None,
            current_url: String::new(),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        0
    }
}

#[async_trait]
impl RenderContext for FakeContext {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
        let page = self
            .pages
            .lock()
            .expect("pages lock")
            .get(url)
            .cloned()
            .unwrap_or_default();
        if page.fail_navigation {
            bail!("navigation failed: connection refused");
        }
        self.current = Some(page);
        self.current_url = url.to_string();
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 1,
        })
    }

    async fn set_download_dir(&self, dir: &Path) -> Result<()> {
        self.download_dirs
            .lock()
            .expect("dirs lock")
            .push(dir.to_path_buf());
        Ok(())
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        // The only script the harvest loop injects is the download click.
        if script.contains("querySelectorAll('a, button')") {
            let clicked = self
                .current
                .as_ref()
                .map(|p| p.html.contains(">Download<"))
                .unwrap_or(false);
            return Ok(serde_json::json!({ "success": clicked }));
        }
        bail!("unexpected script: {script}");
    }

    async fn get_html(&self) -> Result<String> {
        match &self.current {
            Some(page) => Ok(page.html.clone()),
            None => bail!("no page loaded"),
        }
    }

    async fn get_url(&self) -> Result<String> {
        Ok(self.current_url.clone())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Harvest config rooted in a temp dir, with delays zeroed for tests.
fn test_config(out_root: &Path) -> HarvestConfig {
    HarvestConfig {
        base_url: "https://catalog.test/".to_string(),
        output_dir: out_root.to_path_buf(),
        page_delay: Duration::from_millis(0),
        download_delay: Duration::from_millis(0),
        ..HarvestConfig::default()
    }
}

#[tokio::test]
async fn test_extract_to_fetch_pipeline() {
    let dir = tempfile::tempdir().expect("tempdir");

    // Stage one: text → part list CSV.
    let input = dir.path().join("NutList.txt");
    std::fs::write(&input, "Order 95462A029 nuts and 91257A113 bolts.").expect("write input");
    let list = dir.path().join("PartNumbers.csv");
    let found = parts::extract_from_file(&input).expect("extract");
    parts::write_part_list(&list, &found).expect("write list");

    let part_numbers = parts::read_part_list(&list).expect("read list");
    assert_eq!(part_numbers, vec!["95462A029", "91257A113"]);

    // Stage two: harvest against the fake engine. The first page is
    // complete, the second has no spec table and no download control.
    let renderer = FakeRenderer::default()
        .with_page(
            "https://catalog.test/95462A029/",
            FakePage {
                html: GOOD_PAGE.to_string(),
                ..FakePage::default()
            },
        )
        .with_page(
            "https://catalog.test/91257A113/",
            FakePage {
                html: BARE_PAGE.to_string(),
                ..FakePage::default()
            },
        );

    let out_root = dir.path().join("part_files");
    let cfg = test_config(&out_root);
    let (summary, reports) = harvest::run(&renderer, &part_numbers, &cfg, None, |_| {})
        .await
        .expect("harvest run");

    assert_eq!(summary.total, 2);
    assert_eq!(summary.pages_loaded, 2);
    assert_eq!(summary.downloads_clicked, 1);
    assert_eq!(summary.load_failures, 0);

    // Exactly one directory and one details file per identifier.
    let first = out_root.join("95462A029/95462A029_details.txt");
    let second = out_root.join("91257A113/91257A113_details.txt");
    let details = std::fs::read_to_string(&first).expect("first details");
    assert!(details.contains("Product Number: 95462A029"));
    assert!(details.contains("Product Name: Medium-Strength Steel Nylon-Insert Locknut"));
    assert!(details.contains("Thread Size: 1/4\"-20"));

    // The missing spec table becomes an explicit error line, and the
    // identifier is still fully processed.
    let details = std::fs::read_to_string(&second).expect("second details");
    assert!(details.contains("Product Name: Hex Nut"));
    assert!(details.contains("Error finding the specifications:"));

    // Each part pointed the download target at its own directory, in order.
    assert_eq!(
        renderer.download_dirs(),
        vec![out_root.join("95462A029"), out_root.join("91257A113")]
    );

    assert_eq!(reports[0].status(), "ok");
    assert_eq!(reports[1].status(), "partial");
}

#[tokio::test]
async fn test_navigation_failure_is_contained_to_one_identifier() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_root = dir.path().join("part_files");
    let cfg = test_config(&out_root);

    let renderer = FakeRenderer::default()
        .with_page(
            "https://catalog.test/95462A029/",
            FakePage {
                fail_navigation: true,
                ..FakePage::default()
            },
        )
        .with_page(
            "https://catalog.test/91257A113/",
            FakePage {
                html: GOOD_PAGE.to_string(),
                ..FakePage::default()
            },
        );

    let part_numbers = vec!["95462A029".to_string(), "91257A113".to_string()];
    let (summary, reports) = harvest::run(&renderer, &part_numbers, &cfg, None, |_| {})
        .await
        .expect("harvest run");

    assert_eq!(summary.total, 2);
    assert_eq!(summary.load_failures, 1);
    assert_eq!(summary.pages_loaded, 1);

    // The failed identifier still has its directory and details file,
    // carrying the error annotation.
    let failed = out_root.join("95462A029/95462A029_details.txt");
    let details = std::fs::read_to_string(&failed).expect("failed details");
    assert!(details.contains("Product Number: 95462A029"));
    assert!(details.contains("Error loading page:"));
    assert!(details.contains("connection refused"));

    // The loop proceeded to the next identifier.
    assert!(out_root.join("91257A113/91257A113_details.txt").exists());
    assert_eq!(reports[0].status(), "load_failed");
    assert_eq!(reports[1].status(), "ok");
}

#[tokio::test]
async fn test_unknown_identifier_gets_error_lines_not_abort() {
    // No page registered: navigation "succeeds" onto an empty document,
    // both lookups fail, the details file carries both error lines.
    let dir = tempfile::tempdir().expect("tempdir");
    let out_root = dir.path().join("part_files");
    let cfg = test_config(&out_root);

    let renderer = FakeRenderer::default();
    let part_numbers = vec!["90128A211".to_string()];
    let (summary, reports) = harvest::run(&renderer, &part_numbers, &cfg, None, |_| {})
        .await
        .expect("harvest run");

    assert_eq!(summary.total, 1);
    assert_eq!(summary.downloads_clicked, 0);

    let details =
        std::fs::read_to_string(out_root.join("90128A211/90128A211_details.txt"))
            .expect("details");
    assert!(details.contains("Error finding the product name:"));
    assert!(details.contains("Error finding the specifications:"));
    assert_eq!(reports[0].status(), "partial");
}

#[tokio::test]
async fn test_harvest_log_records_each_identifier() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_root = dir.path().join("part_files");
    let cfg = test_config(&out_root);

    let renderer = FakeRenderer::default().with_page(
        "https://catalog.test/95462A029/",
        FakePage {
            html: GOOD_PAGE.to_string(),
            ..FakePage::default()
        },
    );

    let log_path = dir.path().join("harvest.jsonl");
    let mut log = partfetch::audit::HarvestLog::open(&log_path).expect("open log");

    let part_numbers = vec!["95462A029".to_string()];
    harvest::run(&renderer, &part_numbers, &cfg, Some(&mut log), |_| {})
        .await
        .expect("harvest run");

    let content = std::fs::read_to_string(&log_path).expect("read log");
    let row: serde_json::Value =
        serde_json::from_str(content.lines().next().expect("one row")).expect("valid json");
    assert_eq!(row["part_number"], "95462A029");
    assert_eq!(row["url"], "https://catalog.test/95462A029/");
    assert_eq!(row["status"], "ok");
}
