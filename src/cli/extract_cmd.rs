//! `partfetch extract <input>` — pull part numbers out of a text file.

use crate::cli::output::{self, Styled};
use crate::parts;
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Run the extract command: input text file → part-list CSV.
pub async fn run(input: &Path, output_path: &Path) -> Result<()> {
    let found = parts::extract_from_file(input)?;
    parts::write_part_list(output_path, &found)?;
    info!(
        "extracted {} part numbers from {}",
        found.len(),
        input.display()
    );

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "input": input.display().to_string(),
            "output": output_path.display().to_string(),
            "count": found.len(),
        }));
    } else {
        println!("Total part numbers found: {}", found.len());
        if !output::is_quiet() {
            let s = Styled::new();
            println!(
                "  {} Part list written to {}",
                s.ok_sym(),
                output_path.display()
            );
        }
    }

    Ok(())
}
