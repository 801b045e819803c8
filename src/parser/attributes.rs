use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::color::normalize_color;
use crate::model::{Color, DEFAULT_BATTERY, DEFAULT_MODEL, DEFAULT_STORAGE};

static MODEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{2})(?:\s*(pro\s*max|pro|plus|mini)\b)?").unwrap());
static STORAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(GB|TB)").unwrap());
static BATTERY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*%").unwrap());

// Leftover tokens removed before the color word is picked, in this order.
static COLOR_NOISE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?i)100%", r"(?i)nueva?", r"\+\d+/100%"]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

const UNIT_SUFFIXES: &[&str] = &["gb", "tb", "%"];

#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    pub model: String,
    pub storage: String,
    pub battery: String,
    pub color: Color,
}

/// Decompose a descriptor ("12 Pro 128GB graphito 86%") into typed fields.
///
/// Rules run in a fixed order and each one removes its match before the next
/// sees the text: model, storage, battery, then color from whatever is left.
/// A two-digit run only counts as a model number when it stands alone: no
/// digit on either side and no `GB`/`TB`/`%` right after it.
pub fn parse_descriptor(descriptor: &str) -> Attributes {
    let mut rest = Remainder::new(descriptor);

    let model = rest
        .take_model()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let storage = rest
        .take(&STORAGE_RE)
        .map(|(digits, unit)| format!("{}{}", digits, unit.to_uppercase()))
        .unwrap_or_else(|| DEFAULT_STORAGE.to_string());

    let battery = match rest.take(&BATTERY_RE) {
        Some((pct, _)) => format!("{}%", pct),
        // no percentage: a "nueva"/"nuevo" keyword and silence both mean full
        None => DEFAULT_BATTERY.to_string(),
    };

    for re in COLOR_NOISE.iter() {
        rest.remove_first(re);
    }
    let color = rest
        .text
        .split_whitespace()
        .next()
        .map(normalize_color)
        .unwrap_or_default();

    Attributes {
        model,
        storage,
        battery,
        color,
    }
}

struct Remainder {
    text: String,
}

impl Remainder {
    fn new(text: &str) -> Self {
        Remainder {
            text: text.to_string(),
        }
    }

    fn cut(&mut self, span: Range<usize>) {
        self.text.replace_range(span, " ");
    }

    fn remove_first(&mut self, re: &Regex) {
        if let Some(m) = re.find(&self.text) {
            self.cut(m.range());
        }
    }

    /// First match of a two-group rule, consumed. Returns (group 1, group 2).
    fn take(&mut self, re: &Regex) -> Option<(String, String)> {
        let caps = re.captures(&self.text)?;
        let whole = caps.get(0)?.range();
        let first = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
        let second = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        self.cut(whole);
        Some((first, second))
    }

    fn take_model(&mut self) -> Option<String> {
        let (span, model) = MODEL_RE.captures_iter(&self.text).find_map(|caps| {
            let number = caps.get(1)?;
            if !stands_alone(&self.text, number.range()) {
                return None;
            }
            let model = match caps.get(2) {
                Some(variant) => format!(
                    "{} {} {}",
                    DEFAULT_MODEL,
                    number.as_str(),
                    canonical_variant(variant.as_str())
                ),
                None => format!("{} {}", DEFAULT_MODEL, number.as_str()),
            };
            Some((caps.get(0)?.range(), model))
        })?;
        self.cut(span);
        Some(model)
    }
}

fn stands_alone(text: &str, number: Range<usize>) -> bool {
    let before = text[..number.start].chars().next_back();
    let after = &text[number.end..];
    if before.is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }
    if after.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }
    let after = after.trim_start().to_lowercase();
    !UNIT_SUFFIXES.iter().any(|u| after.starts_with(u))
}

fn canonical_variant(raw: &str) -> &'static str {
    let lower = raw.to_lowercase();
    if lower.starts_with("pro") && lower.ends_with("max") {
        "Pro Max"
    } else if lower == "pro" {
        "Pro"
    } else if lower == "plus" {
        "Plus"
    } else {
        "Mini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_descriptor() {
        let a = parse_descriptor("12 Pro 128GB graphito 86%");
        assert_eq!(a.model, "iPhone 12 Pro");
        assert_eq!(a.storage, "128GB");
        assert_eq!(a.battery, "86%");
        assert_eq!(a.color, Color::Graphite);
    }

    #[test]
    fn variants() {
        assert_eq!(parse_descriptor("13 Pro Max 256GB azul").model, "iPhone 13 Pro Max");
        assert_eq!(parse_descriptor("14 plus 128GB").model, "iPhone 14 Plus");
        assert_eq!(parse_descriptor("12 MINI 64GB").model, "iPhone 12 Mini");
        assert_eq!(parse_descriptor("13 128GB azul 86%").model, "iPhone 13");
    }

    #[test]
    fn defaults_when_fields_missing() {
        let a = parse_descriptor("");
        assert_eq!(a.model, DEFAULT_MODEL);
        assert_eq!(a.storage, DEFAULT_STORAGE);
        assert_eq!(a.battery, DEFAULT_BATTERY);
        assert_eq!(a.color, Color::Black);
    }

    #[test]
    fn storage_digits_are_not_a_model_number() {
        let a = parse_descriptor("128GB azul 90%");
        assert_eq!(a.model, DEFAULT_MODEL);
        assert_eq!(a.storage, "128GB");
        assert_eq!(a.color, Color::Blue);
    }

    #[test]
    fn battery_digits_are_not_a_model_number() {
        let a = parse_descriptor("256GB verde 88%");
        assert_eq!(a.model, DEFAULT_MODEL);
        assert_eq!(a.battery, "88%");
    }

    #[test]
    fn model_found_after_storage() {
        let a = parse_descriptor("128GB 15 Pro negro");
        assert_eq!(a.model, "iPhone 15 Pro");
        assert_eq!(a.storage, "128GB");
        assert_eq!(a.color, Color::Black);
    }

    #[test]
    fn terabyte_storage() {
        assert_eq!(parse_descriptor("15 Pro Max 1TB blanco").storage, "1TB");
        assert_eq!(parse_descriptor("15 256 gb").storage, "256GB");
    }

    #[test]
    fn new_keyword_is_stripped_before_color() {
        let a = parse_descriptor("14 128GB nueva azul");
        assert_eq!(a.battery, DEFAULT_BATTERY);
        assert_eq!(a.color, Color::Blue);
    }

    #[test]
    fn nuevo_leaves_a_stray_letter() {
        // "nueva?" eats "nuev" and leaves "o", which is not a color
        let a = parse_descriptor("14 128GB nuevo azul");
        assert_eq!(a.color, Color::Black);
    }

    #[test]
    fn unknown_color_is_black() {
        assert_eq!(parse_descriptor("13 128GB turquesa").color, Color::Black);
    }
}
