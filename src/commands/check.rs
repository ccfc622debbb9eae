use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use stablecal_core::ics::parse_calendar;

pub fn run(file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let overview = parse_calendar(&content)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let events = overview.events().count();
    let timezones = overview.timezones();

    println!("{}", file.display().bold());
    println!("  {} events", events);
    if !timezones.is_empty() {
        println!("  {} timezones ({})", timezones.len(), timezones.join(", "));
    }

    if !overview.is_canonically_ordered() {
        anyhow::bail!(
            "{} is not in canonical order.\n\
            Re-export it with `stablecal export` to get stable output.",
            file.display()
        );
    }

    println!("  {}", "canonical order".green());

    Ok(())
}
