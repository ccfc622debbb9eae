use anyhow::Result;
use stablecal_core::{ExportConfig, IdentifierDeriver};

pub fn run(config: &ExportConfig, urls: &[String]) -> Result<()> {
    for line in uid_lines(&IdentifierDeriver::new(config.namespace), urls) {
        println!("{line}");
    }

    Ok(())
}

/// One line per url: the UID, two spaces, then the url it was derived from.
fn uid_lines(deriver: &IdentifierDeriver, urls: &[String]) -> Vec<String> {
    urls.iter()
        .map(|url| format!("{}  {}", deriver.uid_for(url), url))
        .collect()
}
