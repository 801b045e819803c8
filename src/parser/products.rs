use std::sync::LazyLock;

use regex::Regex;

use super::attributes::{parse_descriptor, Attributes};
use crate::model::{Product, RecordId, DEFAULT_MIN_QUANTITY, NEW_BATTERY, NEW_BATTERY_NOTE};

static PRICE_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:(\d+)\s*)?x?\s*USD\s*\$?\s*(\d+(?:\.\d+)?)").unwrap()
});
static DETAILS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]+)\)").unwrap());
static NEW_BATTERY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)bater[ií]a\s+nueva").unwrap());

/// Markup dropped before splitting: bold markers and the battery emoji.
const DECORATIONS: &[&str] = &["**", "🔋"];

/// A priced line, split and decoded, still without ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductLine {
    /// Leading "N x" of the price clause. Informational only.
    pub quantity: Option<u32>,
    pub price_usd: String,
    pub attributes: Attributes,
    pub details: Option<String>,
}

impl ProductLine {
    pub fn into_product(self, id: RecordId, supplier_id: RecordId) -> Product {
        Product {
            id,
            model: self.attributes.model,
            storage: self.attributes.storage,
            color: self.attributes.color,
            battery: self.attributes.battery,
            details: self.details,
            supplier_id,
            price_usd: self.price_usd,
            min_quantity: DEFAULT_MIN_QUANTITY,
        }
    }
}

/// `<descriptor> | [<qty> x] USD $<price>` → `ProductLine`.
///
/// Returns `None` when there is no pipe or no price after the `USD` marker;
/// such lines are dropped whole.
pub fn parse_product_line(raw: &str) -> Option<ProductLine> {
    let clean = strip_decorations(raw);
    let (descriptor, price_clause) = clean.split_once('|')?;
    if descriptor.trim().is_empty() {
        return None;
    }
    let caps = PRICE_CLAUSE_RE.captures(price_clause)?;
    let quantity = caps.get(1).and_then(|m| m.as_str().parse().ok());
    let price_usd = caps[2].to_string();

    let mut attributes = parse_descriptor(descriptor.trim());

    // Details and the new-battery phrase are read from the line as written.
    let mut details = DETAILS_RE
        .captures(raw)
        .map(|c| c[1].trim().to_string())
        .filter(|d| !d.is_empty());
    if NEW_BATTERY_RE.is_match(raw) {
        attributes.battery = NEW_BATTERY.to_string();
        details.get_or_insert_with(|| NEW_BATTERY_NOTE.to_string());
    }

    Some(ProductLine {
        quantity,
        price_usd,
        attributes,
        details,
    })
}

fn strip_decorations(line: &str) -> String {
    DECORATIONS
        .iter()
        .fold(line.to_string(), |acc, d| acc.replace(d, ""))
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;
    use proptest::prelude::*;

    #[test]
    fn bold_line_with_quantity() {
        let p = parse_product_line("**12 Pro 128GB graphito 86%** | 1 x USD $650").unwrap();
        assert_eq!(p.quantity, Some(1));
        assert_eq!(p.price_usd, "650");
        assert_eq!(p.attributes.model, "iPhone 12 Pro");
        assert_eq!(p.attributes.color, Color::Graphite);
        assert_eq!(p.details, None);
    }

    #[test]
    fn price_without_quantity_or_dollar_sign() {
        let p = parse_product_line("13 128GB azul 90% | USD 480.50").unwrap();
        assert_eq!(p.quantity, None);
        assert_eq!(p.price_usd, "480.50");
    }

    #[test]
    fn emoji_is_stripped() {
        let p = parse_product_line("🔋 14 Pro 256GB violeta 🔋 89% | 2 x USD $820").unwrap();
        assert_eq!(p.attributes.model, "iPhone 14 Pro");
        assert_eq!(p.attributes.battery, "89%");
        assert_eq!(p.attributes.color, Color::Purple);
        assert_eq!(p.quantity, Some(2));
    }

    #[test]
    fn details_from_parentheses() {
        let p = parse_product_line("**11 64GB negro 84%** (detalle en pantalla) | 1 x USD $300").unwrap();
        assert_eq!(p.details.as_deref(), Some("detalle en pantalla"));
    }

    #[test]
    fn new_battery_phrase_overrides() {
        let p = parse_product_line("**13 Pro 128GB celeste 78%** | 1 x USD $600 Batería nueva").unwrap();
        assert_eq!(p.attributes.battery, NEW_BATTERY);
        assert_eq!(p.details.as_deref(), Some(NEW_BATTERY_NOTE));
    }

    #[test]
    fn new_battery_keeps_existing_details() {
        let p = parse_product_line("13 128GB azul (caja original) bateria nueva | USD $550").unwrap();
        assert_eq!(p.attributes.battery, NEW_BATTERY);
        assert_eq!(p.details.as_deref(), Some("caja original"));
    }

    #[test]
    fn dropped_without_pipe() {
        assert_eq!(parse_product_line("13 128GB azul USD $500"), None);
    }

    #[test]
    fn dropped_without_price() {
        assert_eq!(parse_product_line("13 128GB azul | USD consultar"), None);
        assert_eq!(parse_product_line("13 128GB azul | precio USD"), None);
    }

    #[test]
    fn dropped_without_descriptor() {
        assert_eq!(parse_product_line("** ** | 1 x USD $650"), None);
    }

    #[test]
    fn into_product_links_supplier() {
        let p = parse_product_line("15 256GB blanco | USD $900")
            .unwrap()
            .into_product(7, 3);
        assert_eq!(p.id, 7);
        assert_eq!(p.supplier_id, 3);
        assert_eq!(p.min_quantity, 1);
        assert_eq!(p.storage, "256GB");
    }

    proptest! {
        #[test]
        fn price_is_kept_as_written(qty in 1u32..50, whole in 1u32..5000, cents in proptest::option::of(0u32..100)) {
            let price = match cents {
                Some(c) => format!("{}.{:02}", whole, c),
                None => whole.to_string(),
            };
            let line = format!("**12 Pro 128GB azul 88%** | {} x USD ${}", qty, price);
            let parsed = parse_product_line(&line).unwrap();
            prop_assert_eq!(parsed.price_usd, price);
            prop_assert_eq!(parsed.quantity, Some(qty));
        }
    }
}
