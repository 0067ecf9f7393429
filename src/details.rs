//! Product-page extraction — heading and specification table to text.
//!
//! Works on raw HTML so it needs no live browser: the harvest loop pulls
//! the rendered document out of the page and hands it here. Lookups are
//! structural, matching on class fragments rather than the full hashed
//! CSS-module class names the catalog ships (`ProductDetailTable_product-
//! detail-spec-table__3T6Yi` and friends survive redeploys only in their
//! stable prefix).

use scraper::{ElementRef, Html, Selector};

/// What could be pulled out of one product page.
///
/// `None` fields mean the lookup failed; the renderer turns those into
/// explicit error lines instead of dropping the identifier.
#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    /// Text of the first `<h1>` on the page.
    pub name: Option<String>,
    /// `(label, value)` rows of the specification table, in table order.
    pub specs: Option<Vec<(String, String)>>,
}

/// Parse a product page: first `<h1>` plus the specification table.
pub fn parse_product_page(html: &str) -> ProductPage {
    let document = Html::parse_document(html);

    let h1 = Selector::parse("h1").expect("h1 selector is valid");
    let name = document
        .select(&h1)
        .next()
        .map(|el| element_text(&el))
        .filter(|t| !t.is_empty());

    ProductPage {
        name,
        specs: extract_spec_rows(&document),
    }
}

/// Find the specification table and collect its label/value rows.
///
/// Returns `None` when no table is found, `Some(rows)` otherwise — rows
/// whose label or value cell is missing are skipped, matching the
/// row-by-row lookup the page structure implies.
fn extract_spec_rows(document: &Html) -> Option<Vec<(String, String)>> {
    let table_sel = Selector::parse(r#"table[class*="product-detail-spec-table"]"#)
        .expect("spec table selector is valid");
    let row_sel = Selector::parse("tr").expect("tr selector is valid");
    let label_sel = Selector::parse(r#"[class*="product-detail-spec-row-label"]"#)
        .expect("spec label selector is valid");
    let value_sel = Selector::parse(r#"[class*="product-detail-spec-row-value"]"#)
        .expect("spec value selector is valid");

    let table = document.select(&table_sel).next()?;

    let mut rows = Vec::new();
    for row in table.select(&row_sel) {
        let label = row.select(&label_sel).next().map(|el| element_text(&el));
        let value = row.select(&value_sel).next().map(|el| element_text(&el));
        if let (Some(label), Some(value)) = (label, value) {
            rows.push((label, value));
        }
    }
    Some(rows)
}

/// Render the details file body for one identifier.
///
/// Always starts with the `Product Number:` line. Failed lookups are
/// written as error lines in place of the missing data, so the file is
/// complete even for a page that yielded nothing.
pub fn render_details(part_number: &str, page: &ProductPage) -> String {
    let mut out = String::new();
    out.push_str(&format!("Product Number: {part_number}\n"));

    match &page.name {
        Some(name) => out.push_str(&format!("Product Name: {name}\n")),
        None => out.push_str("Error finding the product name: no <h1> element on page\n"),
    }

    match &page.specs {
        Some(rows) => {
            for (label, value) in rows {
                out.push_str(&format!("{label}: {value}\n"));
            }
            out.push('\n');
        }
        None => {
            out.push_str("Error finding the specifications: no spec table on page\n\n");
        }
    }

    out
}

/// Render a details file for an identifier whose page never loaded.
pub fn render_load_failure(part_number: &str, error: &str) -> String {
    format!("Product Number: {part_number}\nError loading page: {error}\n")
}

/// Collapse an element's text nodes into one trimmed, space-normalized string.
fn element_text(el: &ElementRef) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}
