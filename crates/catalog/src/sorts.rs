use crate::prelude::{println, *};
use catalog_core::sort::SortKey;

pub fn run() -> Result<()> {
    println!("{}", format_sorts_text());
    Ok(())
}

fn format_sorts_text() -> String {
    let mut table = new_table();
    table.set_titles(prettytable::row!["KEY", "ORDER"]);

    for key in SortKey::ALL {
        table.add_row(prettytable::row![key.as_str(), key.label()]);
    }

    table.to_string()
}
