use std::time::Duration;

use crate::prelude::{println, *};
use crate::session::Session;
use catalog_core::pagination::CatalogConfig;
use catalog_core::product::ProductRecord;
use colored::Colorize;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ShowOptions {
    /// Product number, as shown in the `#` column of `catalog list`
    pub sequence_id: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: ShowOptions, global: crate::Global) -> Result<()> {
    let config = global.config()?;

    if global.verbose {
        println!("Looking up product #{}", options.sequence_id);
    }

    let record = show_data(config, global.timeout(), options.sequence_id).await?;

    if options.json {
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| eyre!("JSON serialization failed: {}", e))?;
        println!("{json}");
    } else {
        println!("{}", format_product_text(&record));
    }

    Ok(())
}

/// Load pages in order until the product with `sequence_id` is present
pub async fn show_data(
    config: CatalogConfig,
    timeout: Duration,
    sequence_id: u64,
) -> Result<ProductRecord> {
    let mut session = Session::new(config, timeout);
    session
        .load_until(|manager| manager.record_count() as u64 > sequence_id)
        .await?;

    let manager = session.manager();
    manager
        .records()
        .into_iter()
        .find(|record| record.sequence_id == sequence_id)
        .ok_or_else(|| {
            eyre!(
                "No product #{sequence_id}. The catalog has {} products.",
                manager.total_count().unwrap_or(manager.record_count() as u64)
            )
        })
}

fn format_product_text(record: &ProductRecord) -> String {
    let mut result = String::new();

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{} {}\n",
        format!("[{}]", record.sequence_id).yellow().bold(),
        record.name.white().bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    result.push_str(&format!(
        "\n{}: {}\n",
        "Price".green(),
        record.price_display.bright_yellow()
    ));
    result.push_str(&format!(
        "{}: {} ({} reviews)\n",
        "Rating".green(),
        record.rating_display.bright_white(),
        record.review_count
    ));

    let stock = if record.in_stock {
        record.stock_display.green()
    } else {
        record.stock_display.red()
    };
    result.push_str(&format!("{}: {}\n", "Stock".green(), stock));

    if let Some(id) = &record.external_id {
        result.push_str(&format!("{}: {}\n", "Product ID".green(), id.bright_black()));
    }
    if let Some(url) = &record.image_url {
        result.push_str(&format!(
            "{}: {}\n",
            "Image".green(),
            url.cyan().underline()
        ));
    }

    for (heading, body) in [
        ("Summary", &record.short_description),
        ("Description", &record.long_description),
    ] {
        if !body.trim().is_empty() {
            result.push_str(&format!("\n{}\n{}\n", heading.bright_white().bold(), body.trim()));
        }
    }

    result
}
