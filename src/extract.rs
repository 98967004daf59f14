//! Labeled-field extraction from rendered documents
//!
//! The equity quote page carries no schema; the price is located by exact
//! label text. The strategy lives behind [`FieldExtractor`] so a change in
//! page structure touches one type, not the fetcher's control flow.

use scraper::{ElementRef, Html, Selector};

/// Locates a labeled value inside a document
pub trait FieldExtractor: Send + Sync {
    /// Returns the text value adjacent to `label`, or `None` when the label
    /// is missing or its value is empty
    fn extract(&self, document: &str, label: &str) -> Option<String>;
}

/// Finds the element whose text equals the label exactly and reads the first
/// following sibling element's text
pub struct LabeledValueExtractor {
    candidates: Selector,
}

impl LabeledValueExtractor {
    pub fn new() -> Self {
        Self {
            // Elements a quote page plausibly uses to carry a label
            candidates: Selector::parse("th, td, dt, dd, span, div, label")
                .expect("static selector is valid"),
        }
    }
}

impl Default for LabeledValueExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for LabeledValueExtractor {
    fn extract(&self, document: &str, label: &str) -> Option<String> {
        let document = Html::parse_document(document);

        for element in document.select(&self.candidates) {
            let text: String = element.text().collect();
            if text.trim() != label {
                continue;
            }

            let mut node = element.next_sibling();
            while let Some(sibling) = node {
                if let Some(value_element) = ElementRef::wrap(sibling) {
                    let value = value_element.text().collect::<String>().trim().to_string();
                    // A present label with an empty value is absent, not zero.
                    if value.is_empty() {
                        return None;
                    }
                    return Some(value);
                }
                node = sibling.next_sibling();
            }
            return None;
        }

        None
    }
}

/// Parses a displayed price, stripping thousands separators.
///
/// Returns `None` for empty, malformed, or non-finite input.
pub fn parse_displayed_price(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|price| price.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTE_PAGE: &str = r#"
        <html><body><table>
            <tr><th>Symbol</th><td>AC</td></tr>
            <tr><th>Last Traded Price</th><td>1,234.50</td></tr>
            <tr><th>Open</th><td>1,230.00</td></tr>
        </table></body></html>
    "#;

    #[test]
    fn extracts_value_adjacent_to_label() {
        let extractor = LabeledValueExtractor::new();
        let value = extractor.extract(QUOTE_PAGE, "Last Traded Price");
        assert_eq!(value.as_deref(), Some("1,234.50"));
    }

    #[test]
    fn missing_label_yields_none() {
        let extractor = LabeledValueExtractor::new();
        assert!(extractor.extract(QUOTE_PAGE, "Previous Close").is_none());
    }

    #[test]
    fn label_with_empty_value_yields_none() {
        let page = "<table><tr><th>Last Traded Price</th><td>  </td></tr></table>";
        let extractor = LabeledValueExtractor::new();
        assert!(extractor.extract(page, "Last Traded Price").is_none());
    }

    #[test]
    fn label_match_is_exact() {
        let page = "<table><tr><th>Last Traded Price (PHP)</th><td>5.00</td></tr></table>";
        let extractor = LabeledValueExtractor::new();
        assert!(extractor.extract(page, "Last Traded Price").is_none());
    }

    #[test]
    fn skips_whitespace_between_label_and_value() {
        let page = "<dl><dt>Last Traded Price</dt>\n   <dd>42.10</dd></dl>";
        let extractor = LabeledValueExtractor::new();
        assert_eq!(
            extractor.extract(page, "Last Traded Price").as_deref(),
            Some("42.10")
        );
    }

    #[test]
    fn parses_prices_with_thousands_separators() {
        assert_eq!(parse_displayed_price("1,234.50"), Some(1234.5));
        assert_eq!(parse_displayed_price(" 42.10 "), Some(42.1));
        assert_eq!(parse_displayed_price("980"), Some(980.0));
    }

    #[test]
    fn rejects_unparsable_prices() {
        assert_eq!(parse_displayed_price(""), None);
        assert_eq!(parse_displayed_price("n/a"), None);
        assert_eq!(parse_displayed_price("NaN"), None);
        assert_eq!(parse_displayed_price("inf"), None);
    }
}
