//! Inspect subcommand - run the dispatcher on one local XML file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use pubmetrics_extract::{Extraction, Publisher, dispatch};

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Publisher whose dialect the file is written in
    #[arg(short, long)]
    pub publisher: String,

    /// XML document to parse
    pub file: PathBuf,
}

pub fn run(args: InspectArgs) -> Result<()> {
    let publisher = Publisher::from_name(&args.publisher);
    if !publisher.is_supported() {
        log::warn!("Publisher {:?} is not supported, nothing to extract", args.publisher);
    }

    let document = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let extraction = dispatch(&publisher, &document)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;

    println!("{}", authors_table(&extraction));
    println!("{}", references_table(&extraction));
    for (i, statement) in extraction.datasets.iter().enumerate() {
        println!("\n--- dataset statement {} ---\n{statement}", i + 1);
    }
    println!(
        "\n{} authors ({} with ORCID), {} affiliation references ({} with ROR), {} dataset statements",
        extraction.authors.len(),
        extraction.orcid_count(),
        extraction.affiliations.len(),
        extraction.ror_count(),
        extraction.datasets.len()
    );
    Ok(())
}

fn styled_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

fn authors_table(extraction: &Extraction) -> Table {
    let mut table = styled_table(&["#", "Given name", "Family name", "ORCID", "Affiliations"]);
    for (i, author) in extraction.authors.iter().enumerate() {
        let affiliations = author
            .affiliations
            .iter()
            .map(|a| a.name.as_deref().unwrap_or(&a.id))
            .collect::<Vec<_>>()
            .join("; ");
        table.add_row(vec![
            (i + 1).to_string(),
            author.given_name.clone(),
            author.family_name.clone(),
            author.orcid.clone().unwrap_or_default(),
            affiliations,
        ]);
    }
    table
}

fn references_table(extraction: &Extraction) -> Table {
    let mut table = styled_table(&["#", "Affiliation id", "ROR"]);
    for (i, reference) in extraction.affiliations.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            reference.source_id.clone(),
            reference.ror.clone().unwrap_or_default(),
        ]);
    }
    table
}
