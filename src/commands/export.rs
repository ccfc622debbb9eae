use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use stablecal_core::{EventRecord, ExportConfig, export_records, parse_records};
use tracing::debug;

pub fn run(config: ExportConfig, input: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let content = read_input(input)?;
    let records = load_records(&content)?;
    debug!(records = records.len(), "Loaded event records");

    match output.filter(|path| *path != Path::new("-")) {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            export_records(file, config, &records)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            println!(
                "{} Exported {} events to {}",
                "✓".green(),
                records.len(),
                path.display()
            );
        }
        None => {
            export_records(std::io::stdout().lock(), config, &records)
                .context("Failed to write calendar to stdout")?;
        }
    }

    Ok(())
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input.filter(|path| *path != Path::new("-")) {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read records from {}", path.display())),
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read records from stdin")?;
            Ok(content)
        }
    }
}

/// Parse and validate every record before anything is written, so a bad
/// record aborts the export instead of producing a partial calendar.
fn load_records(content: &str) -> Result<Vec<EventRecord>> {
    let raw = parse_records(content).context("Failed to parse event records")?;

    raw.into_iter()
        .enumerate()
        .map(|(index, record)| {
            EventRecord::try_from(record)
                .with_context(|| format!("Event record #{} is invalid", index + 1))
        })
        .collect()
}
