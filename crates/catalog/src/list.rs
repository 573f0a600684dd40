use std::time::Duration;

use crate::prelude::{println, *};
use crate::session::Session;
use catalog_core::pagination::CatalogConfig;
use catalog_core::product::ProductRecord;
use catalog_core::sort::SortKey;
use colored::Colorize;
use serde::Serialize;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ListOptions {
    /// Number of pages to load
    #[arg(short, long, default_value = "1")]
    pub pages: usize,

    /// Load every page the catalog reports
    #[arg(long, conflicts_with = "pages")]
    pub all: bool,

    /// Sort order (see `catalog sorts`)
    #[arg(short, long, default_value = "default")]
    pub sort: SortKey,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize, Clone)]
pub struct ListOutput {
    pub sort: SortKey,
    pub total_count: Option<u64>,
    pub has_more: bool,
    pub pages_loaded: usize,
    pub records: Vec<ProductRecord>,
}

pub async fn run(options: ListOptions, global: crate::Global) -> Result<()> {
    let config = global.config()?;

    if global.verbose {
        println!("Catalog API: {}", config.base_url);
        println!("Page size: {}", config.page_size);
        println!();
    }

    let output = list_data(config, global.timeout(), &options).await?;

    if options.json {
        println!("{}", format_list_json(&output)?);
    } else {
        println!("{}", format_list_text(&output));
    }

    Ok(())
}

/// Load the requested pages and return them in the requested order
pub async fn list_data(
    config: CatalogConfig,
    timeout: Duration,
    options: &ListOptions,
) -> Result<ListOutput> {
    let wanted = options.pages.max(1);
    let mut pages_loaded = 0;

    let mut session = Session::new(config, timeout);
    session
        .load_until(|_| {
            pages_loaded += 1;
            !options.all && pages_loaded >= wanted
        })
        .await?;

    let manager = session.manager();
    if options.sort != SortKey::Default {
        manager.apply_sort(options.sort);
    }

    Ok(ListOutput {
        sort: options.sort,
        total_count: manager.total_count(),
        has_more: manager.has_more(),
        pages_loaded,
        records: manager.records(),
    })
}

/// Shorten `text` to at most `max_chars` characters, marking the cut
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept.trim_end())
    }
}

fn format_list_json(output: &ListOutput) -> Result<String> {
    serde_json::to_string_pretty(output).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn format_list_text(output: &ListOutput) -> String {
    let mut result = String::new();

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    let mut title = format!("Top {} Results", output.records.len());
    if let Some(total) = output.total_count {
        title.push_str(&format!(" of {total}"));
    }
    if output.sort != SortKey::Default {
        title.push_str(&format!(" by {}", output.sort.label()));
    }
    result.push_str(&format!("{}\n", title.bright_cyan().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if output.records.is_empty() {
        result.push_str(&format!("\n{}\n", "No products found.".yellow()));
        return result;
    }

    let mut table = new_table();
    table.set_titles(prettytable::row!["#", "Name", "Price", "Rating", "Stock"]);
    for record in &output.records {
        table.add_row(prettytable::row![
            record.sequence_id,
            truncate_text(&record.name, 48),
            record.price_display,
            record.rating_display,
            record.stock_display
        ]);
    }
    result.push_str(&format!("\n{table}"));

    result.push_str(&format!("\n{}:\n", "Next".bright_white().bold()));
    if output.has_more {
        result.push_str(&format!(
            "  {}: {}\n",
            "More products".green(),
            format!("catalog list --pages {}", output.pages_loaded + 1).cyan()
        ));
    }
    result.push_str(&format!(
        "  {}: {}\n",
        "Product details".green(),
        "catalog show <#>".cyan()
    ));
    result.push_str(&format!(
        "  {}: {}\n",
        "JSON output".green(),
        "catalog list --json".cyan()
    ));

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::product::decode_product;
    use serde_json::json;

    fn output(records: Vec<ProductRecord>, has_more: bool) -> ListOutput {
        ListOutput {
            sort: SortKey::Default,
            total_count: Some(100),
            has_more,
            pages_loaded: 1,
            records,
        }
    }

    fn record(sequence_id: u64, name: &str, price: &str) -> ProductRecord {
        decode_product(
            &json!({
                "productName": name,
                "price": price,
                "reviewRating": 4.5,
                "inStock": true
            }),
            sequence_id,
        )
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_text("a long product name", 10), "a long...");
    }

    #[test]
    fn test_truncate_text_multibyte() {
        let name = "Café Crème Édition Spéciale";
        let truncated = truncate_text(name, 8);

        assert!(truncated.ends_with("..."));
        assert!(truncated.chars().count() <= 8);
    }

    #[test]
    fn test_format_list_text_rows() {
        colored::control::set_override(false);
        let text = format_list_text(&output(
            vec![record(0, "Fire TV", "$39.99"), record(1, "Kindle", "$79.99")],
            true,
        ));

        assert!(text.contains("Top 2 Results of 100"));
        assert!(text.contains("Fire TV"));
        assert!(text.contains("$79.99"));
        assert!(text.contains("4.5 of 5.0"));
        assert!(text.contains("In Stock"));
        assert!(text.contains("catalog list --pages 2"));
    }

    #[test]
    fn test_format_list_text_without_more_pages() {
        colored::control::set_override(false);
        let text = format_list_text(&output(vec![record(0, "Fire TV", "$39.99")], false));

        assert!(!text.contains("--pages"));
        assert!(text.contains("catalog show <#>"));
    }

    #[test]
    fn test_format_list_text_sorted_title() {
        colored::control::set_override(false);
        let mut list = output(vec![record(0, "Fire TV", "$39.99")], false);
        list.sort = SortKey::PriceDesc;

        let text = format_list_text(&list);
        assert!(text.contains("by Price (High to Low)"));
    }

    #[test]
    fn test_format_list_text_empty() {
        colored::control::set_override(false);
        let text = format_list_text(&output(vec![], false));

        assert!(text.contains("Top 0 Results"));
        assert!(text.contains("No products found."));
    }

    #[test]
    fn test_format_list_json() {
        let json = format_list_json(&output(vec![record(3, "Fire TV", "$39.99")], true)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["sort"], "default");
        assert_eq!(value["total_count"], 100);
        assert_eq!(value["has_more"], true);
        assert_eq!(value["records"][0]["sequence_id"], 3);
        assert_eq!(value["records"][0]["price_value"], 39.99);
    }
}
