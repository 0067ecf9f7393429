//! The per-identifier fetch loop — directory setup, navigation, scrape,
//! download trigger.
//!
//! One shared browser context serves the whole run, identifier by
//! identifier in part-list order. Every step is best-effort: a failure is
//! logged, noted in the report, and the loop moves on. Only opening the
//! context or creating the output root aborts a run.

use crate::audit::HarvestLog;
use crate::details::{self, ProductPage};
use crate::renderer::{RenderContext, Renderer};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Settings for a harvest run. Defaults reproduce the catalog setup:
/// 5 s page settle, 10 s download wait, `Download` control label.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// URL prefix the identifier is appended to.
    pub base_url: String,
    /// Root of the per-identifier output tree.
    pub output_dir: PathBuf,
    /// Fixed wait after navigation, before scraping.
    pub page_delay: Duration,
    /// Fixed wait after a successful download click.
    pub download_delay: Duration,
    /// Visible text of the download control.
    pub download_label: String,
    /// Navigation timeout.
    pub navigation_timeout_ms: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.mcmaster.com/".to_string(),
            output_dir: PathBuf::from("part_files"),
            page_delay: Duration::from_secs(5),
            download_delay: Duration::from_secs(10),
            download_label: "Download".to_string(),
            navigation_timeout_ms: 30_000,
        }
    }
}

impl HarvestConfig {
    /// Product page URL for an identifier.
    pub fn part_url(&self, part_number: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{part_number}/", self.base_url)
        } else {
            format!("{}/{part_number}/", self.base_url)
        }
    }

    /// Per-identifier output directory.
    pub fn part_dir(&self, part_number: &str) -> PathBuf {
        self.output_dir.join(part_number)
    }

    /// Per-identifier details file path.
    pub fn details_path(&self, part_number: &str) -> PathBuf {
        self.part_dir(part_number)
            .join(format!("{part_number}_details.txt"))
    }
}

/// What happened to one identifier.
#[derive(Debug, Clone)]
pub struct PartReport {
    pub part_number: String,
    pub url: String,
    pub details_path: PathBuf,
    pub page_loaded: bool,
    /// Scraped product name, when the heading lookup succeeded.
    pub name: Option<String>,
    pub specs_found: bool,
    pub download_clicked: bool,
    /// First suppressed error, for the log.
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl PartReport {
    fn new(part_number: &str, url: String, details_path: PathBuf) -> Self {
        Self {
            part_number: part_number.to_string(),
            url,
            details_path,
            page_loaded: false,
            name: None,
            specs_found: false,
            download_clicked: false,
            error: None,
            duration_ms: 0,
        }
    }

    /// Status keyword for the harvest log.
    pub fn status(&self) -> &'static str {
        if !self.page_loaded {
            "load_failed"
        } else if self.name.is_some() && self.specs_found && self.download_clicked {
            "ok"
        } else {
            "partial"
        }
    }
}

/// Aggregate counters over a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HarvestSummary {
    pub total: usize,
    pub pages_loaded: usize,
    pub downloads_clicked: usize,
    pub load_failures: usize,
}

impl HarvestSummary {
    /// Fold one report into the counters.
    pub fn absorb(&mut self, report: &PartReport) {
        self.total += 1;
        if report.page_loaded {
            self.pages_loaded += 1;
        } else {
            self.load_failures += 1;
        }
        if report.download_clicked {
            self.downloads_clicked += 1;
        }
    }
}

/// One open browser context working through identifiers.
pub struct Harvester<'a> {
    ctx: Box<dyn RenderContext>,
    cfg: &'a HarvestConfig,
}

impl<'a> Harvester<'a> {
    /// Create the output root and open a browser context.
    pub async fn open(renderer: &dyn Renderer, cfg: &'a HarvestConfig) -> Result<Harvester<'a>> {
        std::fs::create_dir_all(&cfg.output_dir).with_context(|| {
            format!("failed to create output directory: {}", cfg.output_dir.display())
        })?;
        let ctx = renderer.new_context().await?;
        Ok(Self { ctx, cfg })
    }

    /// Process one identifier end to end.
    ///
    /// Never returns an error: every failure is captured in the report and
    /// the details file. The identifier always ends up with its directory
    /// and details file unless the directory itself cannot be created.
    pub async fn fetch_part(&mut self, part_number: &str) -> PartReport {
        let start = Instant::now();
        let url = self.cfg.part_url(part_number);
        let part_dir = self.cfg.part_dir(part_number);
        let details_path = self.cfg.details_path(part_number);
        let mut report = PartReport::new(part_number, url.clone(), details_path.clone());

        if let Err(e) = std::fs::create_dir_all(&part_dir) {
            warn!("failed to create directory for {part_number}: {e}");
            report.error = Some(format!("create directory: {e}"));
            report.duration_ms = start.elapsed().as_millis() as u64;
            return report;
        }

        // Downloads land in the identifier's own directory.
        if let Err(e) = self.ctx.set_download_dir(&part_dir).await {
            warn!("failed to set download directory for {part_number}: {e:#}");
            report.error = Some(format!("set download directory: {e:#}"));
        }

        match self.ctx.navigate(&url, self.cfg.navigation_timeout_ms).await {
            Ok(nav) => {
                debug!(
                    "loaded {} in {}ms (final URL {})",
                    url, nav.load_time_ms, nav.final_url
                );
                report.page_loaded = true;
            }
            Err(e) => {
                warn!("failed to load page for {part_number}: {e:#}");
                let text = details::render_load_failure(part_number, &format!("{e:#}"));
                if let Err(we) = std::fs::write(&details_path, text) {
                    warn!("failed to write details file for {part_number}: {we}");
                }
                report.error = Some(format!("load page: {e:#}"));
                report.duration_ms = start.elapsed().as_millis() as u64;
                return report;
            }
        }

        // The navigation settles before the product table hydrates; give
        // the page a fixed grace period.
        tokio::time::sleep(self.cfg.page_delay).await;

        let page = match self.ctx.get_html().await {
            Ok(html) => details::parse_product_page(&html),
            Err(e) => {
                // Both lookups fail together; the details file carries the
                // error lines for each.
                warn!("failed to read page HTML for {part_number}: {e:#}");
                report.error = Some(format!("read HTML: {e:#}"));
                ProductPage::default()
            }
        };

        if page.name.is_none() {
            warn!("no product name found for {part_number}");
        }
        if page.specs.is_none() {
            warn!("no specification table found for {part_number}");
        }
        report.name = page.name.clone();
        report.specs_found = page.specs.is_some();

        let text = details::render_details(part_number, &page);
        if let Err(e) = std::fs::write(&details_path, text) {
            warn!("failed to write details file for {part_number}: {e}");
            report.error = Some(format!("write details: {e}"));
        }

        let click = build_click_script(&self.cfg.download_label);
        match self.ctx.execute_js(&click).await {
            Ok(v) if v.get("success").and_then(|s| s.as_bool()).unwrap_or(false) => {
                info!("download initiated for {part_number}");
                report.download_clicked = true;
                tokio::time::sleep(self.cfg.download_delay).await;
            }
            Ok(_) => {
                warn!(
                    "no '{}' control found for {part_number}",
                    self.cfg.download_label
                );
            }
            Err(e) => {
                warn!("failed to click download for {part_number}: {e:#}");
                report.error = Some(format!("click download: {e:#}"));
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        report
    }

    /// Close the browser context.
    pub async fn close(self) -> Result<()> {
        self.ctx.close().await
    }
}

/// Run the whole loop over a part list, recording outcomes to the harvest
/// log when one is given. `on_report` fires after each identifier (the CLI
/// hangs its progress bar on it). Returns the summary and per-identifier
/// reports.
pub async fn run(
    renderer: &dyn Renderer,
    parts: &[String],
    cfg: &HarvestConfig,
    mut log: Option<&mut HarvestLog>,
    mut on_report: impl FnMut(&PartReport),
) -> Result<(HarvestSummary, Vec<PartReport>)> {
    let mut harvester = Harvester::open(renderer, cfg).await?;
    let mut summary = HarvestSummary::default();
    let mut reports = Vec::with_capacity(parts.len());

    for part_number in parts {
        let report = harvester.fetch_part(part_number).await;
        summary.absorb(&report);
        if let Some(log) = log.as_deref_mut() {
            if let Err(e) = log.record(
                &report.part_number,
                &report.url,
                report.status(),
                report.duration_ms,
            ) {
                warn!("failed to write harvest log entry: {e:#}");
            }
        }
        on_report(&report);
        reports.push(report);
    }

    harvester.close().await?;
    Ok((summary, reports))
}

/// Build a JS snippet that clicks the first link or button whose visible
/// text equals `label`, reporting `{ success: bool }`.
fn build_click_script(label: &str) -> String {
    format!(
        r#"(() => {{
            const label = '{}';
            const els = [...document.querySelectorAll('a, button')];
            const el = els.find(e => (e.textContent || '').trim() === label);
            if (el) {{ el.click(); return {{ success: true }}; }}
            return {{ success: false }};
        }})()"#,
        sanitize_js_string(label)
    )
}

/// Sanitize a string for safe injection into a JavaScript string literal.
///
/// Escapes all characters that could break out of a JS string context:
/// backslashes, quotes, backticks, control characters, and angle brackets
/// (to prevent `</script>` injection). Null bytes are stripped.
fn sanitize_js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '`' => result.push_str("\\`"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\0' => {}
            '<' => result.push_str("\\x3c"),
            '>' => result.push_str("\\x3e"),
            _ => result.push(ch),
        }
    }
    result
}
