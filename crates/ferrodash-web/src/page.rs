use time::Date;

use ferrodash_core::{format_date, Catalog, Symbol};

const INDEX_TEMPLATE: &str = include_str!("../assets/index.html");
pub const STYLE_SHEET: &str = include_str!("../assets/style.css");

/// Render the dashboard shell: ticker list and date pickers bounded by
/// `[history_start, today]`. Charts are filled in by the page script.
pub fn render_index(catalog: &Catalog, fallback: &Symbol, history_start: Date, today: Date) -> String {
    let buttons = catalog
        .entries()
        .iter()
        .map(|entry| {
            let selected = if &entry.symbol == fallback { " selected" } else { "" };
            format!(
                r#"<li><button type="button" class="ticker{selected}" data-symbol="{symbol}">{name}</button></li>"#,
                symbol = escape(entry.symbol.as_str()),
                name = escape(&entry.name),
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ");

    INDEX_TEMPLATE
        .replace("{{TICKERS}}", &buttons)
        .replace("{{HISTORY_START}}", &format_date(history_start))
        .replace("{{TODAY}}", &format_date(today))
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrodash_core::CatalogEntry;
    use time::macros::date;

    #[test]
    fn index_lists_catalog_and_bounds_pickers() {
        let catalog = Catalog::new(vec![
            CatalogEntry::new("Gold", Symbol::parse("GC=F").expect("symbol")),
            CatalogEntry::new("Oil & Gas", Symbol::parse("NG=F").expect("symbol")),
        ])
        .expect("catalog");
        let html = render_index(
            &catalog,
            &Symbol::parse("NG=F").expect("symbol"),
            date!(2022 - 01 - 01),
            date!(2024 - 05 - 31),
        );

        assert!(html.contains(r#"data-symbol="GC=F">Gold</button>"#));
        assert!(html.contains(r#"class="ticker selected" data-symbol="NG=F">Oil &amp; Gas"#));
        assert!(html.contains(r#"min="2022-01-01""#));
        assert!(html.contains(r#"max="2024-05-31""#));
        assert!(!html.contains("{{"));
    }
}
