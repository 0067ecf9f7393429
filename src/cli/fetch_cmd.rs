//! `partfetch fetch` — visit each part's product page, scrape details, and
//! trigger CAD downloads.

use crate::audit::HarvestLog;
use crate::cli::output::{self, Styled};
use crate::harvest::{self, HarvestConfig};
use crate::parts;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::Renderer;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::path::Path;
use tracing::warn;

/// Run the fetch command over a part-list CSV.
pub async fn run(list: &Path, cfg: HarvestConfig) -> Result<()> {
    url::Url::parse(&cfg.base_url)
        .with_context(|| format!("invalid base URL: {}", cfg.base_url))?;

    let part_numbers = parts::read_part_list(list)?;
    let s = Styled::new();

    if part_numbers.is_empty() {
        if !output::is_quiet() {
            println!(
                "  {} Part list {} is empty — nothing to fetch.",
                s.warn_sym(),
                list.display()
            );
        }
        return Ok(());
    }

    let mut log = match HarvestLog::default_log() {
        Ok(log) => Some(log),
        Err(e) => {
            warn!("harvest log unavailable: {e:#}");
            None
        }
    };

    let renderer = ChromiumRenderer::new().await?;

    let bar = if output::is_quiet() || output::is_json() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(part_numbers.len() as u64)
    };

    let (summary, _reports) = harvest::run(
        &renderer,
        &part_numbers,
        &cfg,
        log.as_mut(),
        |report| {
            if let Some(name) = &report.name {
                bar.println(format!("Product Name: {name}"));
            }
            bar.inc(1);
        },
    )
    .await?;

    bar.finish_and_clear();
    renderer.shutdown().await?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "parts": summary.total,
            "pages_loaded": summary.pages_loaded,
            "downloads_clicked": summary.downloads_clicked,
            "load_failures": summary.load_failures,
            "output_dir": cfg.output_dir.display().to_string(),
        }));
    } else {
        println!(
            "Product details and CAD files saved in {}",
            cfg.output_dir.display()
        );
        if !output::is_quiet() {
            println!(
                "  {} {} parts: {} pages loaded, {} downloads clicked",
                s.ok_sym(),
                summary.total,
                summary.pages_loaded,
                summary.downloads_clicked,
            );
            if summary.load_failures > 0 {
                println!(
                    "  {} {} pages failed to load — see the details files",
                    s.err_sym(),
                    summary.load_failures
                );
            }
        }
    }

    Ok(())
}
