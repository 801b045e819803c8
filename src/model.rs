use std::fmt;

use serde::{Deserialize, Serialize};

pub type RecordId = i64;

// ── Defaults ──

pub const DEFAULT_SUPPLIER_NAME: &str = "Proveedor";
pub const DEFAULT_MODEL: &str = "iPhone";
pub const DEFAULT_STORAGE: &str = "128GB";
pub const DEFAULT_BATTERY: &str = "100%";
pub const NEW_BATTERY: &str = "Nueva";
pub const NEW_BATTERY_NOTE: &str = "Batería nueva";
pub const DEFAULT_MIN_QUANTITY: u32 = 1;

// ── Catalogs ──

pub const IPHONE_MODELS: &[&str] = &[
    "iPhone 11", "iPhone 11 Pro", "iPhone 11 Pro Max",
    "iPhone 12", "iPhone 12 Mini", "iPhone 12 Pro", "iPhone 12 Pro Max",
    "iPhone 13", "iPhone 13 Mini", "iPhone 13 Pro", "iPhone 13 Pro Max",
    "iPhone 14", "iPhone 14 Plus", "iPhone 14 Pro", "iPhone 14 Pro Max",
    "iPhone 15", "iPhone 15 Plus", "iPhone 15 Pro", "iPhone 15 Pro Max",
    "iPhone 16", "iPhone 16 Plus", "iPhone 16 Pro", "iPhone 16 Pro Max",
];

pub const STORAGE_OPTIONS: &[&str] = &["64GB", "128GB", "256GB", "512GB", "1TB"];

pub const BATTERY_OPTIONS: &[&str] = &["80%", "85%", "90%", "95%", "100%", NEW_BATTERY];

/// Closed device palette. Serialized by display name ("Sierra Blue", not "SierraBlue").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Color {
    #[default]
    Black,
    White,
    Red,
    Blue,
    Green,
    Purple,
    Pink,
    Gold,
    Silver,
    Graphite,
    #[serde(rename = "Sierra Blue")]
    SierraBlue,
    #[serde(rename = "Alpine Green")]
    AlpineGreen,
    Midnight,
    Starlight,
    #[serde(rename = "Deep Purple")]
    DeepPurple,
}

impl Color {
    pub const ALL: [Color; 15] = [
        Color::Black,
        Color::White,
        Color::Red,
        Color::Blue,
        Color::Green,
        Color::Purple,
        Color::Pink,
        Color::Gold,
        Color::Silver,
        Color::Graphite,
        Color::SierraBlue,
        Color::AlpineGreen,
        Color::Midnight,
        Color::Starlight,
        Color::DeepPurple,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "Black",
            Color::White => "White",
            Color::Red => "Red",
            Color::Blue => "Blue",
            Color::Green => "Green",
            Color::Purple => "Purple",
            Color::Pink => "Pink",
            Color::Gold => "Gold",
            Color::Silver => "Silver",
            Color::Graphite => "Graphite",
            Color::SierraBlue => "Sierra Blue",
            Color::AlpineGreen => "Alpine Green",
            Color::Midnight => "Midnight",
            Color::Starlight => "Starlight",
            Color::DeepPurple => "Deep Purple",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Color::Black => "#000000",
            Color::White => "#FFFFFF",
            Color::Red => "#FF0000",
            Color::Blue => "#0000FF",
            Color::Green => "#00FF00",
            Color::Purple => "#800080",
            Color::Pink => "#FFC0CB",
            Color::Gold => "#FFD700",
            Color::Silver => "#C0C0C0",
            Color::Graphite => "#3C3C3C",
            Color::SierraBlue => "#69ABCE",
            Color::AlpineGreen => "#506D5B",
            Color::Midnight => "#191970",
            Color::Starlight => "#FAF0E6",
            Color::DeepPurple => "#6A0DAD",
        }
    }

    /// Exact palette name lookup (case-insensitive). Free text goes through
    /// `parser::color::normalize_color` instead.
    pub fn from_name(name: &str) -> Option<Color> {
        let name = name.trim();
        Color::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

// ── Records ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: RecordId,
    pub name: String,
    pub contact: Option<String>,
    /// Local-currency units per USD, digits only.
    pub dollar_rate: String,
    pub min_purchase: Option<String>,
    pub location: Option<String>,
}

impl Supplier {
    /// The rate as a number, only if it is finite and positive.
    pub fn rate(&self) -> Option<f64> {
        positive_number(&self.dollar_rate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: RecordId,
    pub model: String,
    pub storage: String,
    pub color: Color,
    pub battery: String,
    pub details: Option<String>,
    pub supplier_id: RecordId,
    /// Kept exactly as written in the source text.
    #[serde(rename = "priceUSD")]
    pub price_usd: String,
    pub min_quantity: u32,
}

impl Product {
    pub fn price(&self) -> Option<f64> {
        positive_number(&self.price_usd)
    }
}

/// A product picked for comparison, with the quantity the buyer wants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEntry {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl SelectionEntry {
    pub fn new(product: Product) -> Self {
        SelectionEntry {
            product,
            quantity: 1,
        }
    }
}

/// "1.455" → "1455", "1,455.50" → "145550".
pub fn strip_rate_separators(raw: &str) -> String {
    raw.trim().replace(['.', ','], "")
}

pub(crate) fn positive_number(s: &str) -> Option<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_separators_stripped() {
        assert_eq!(strip_rate_separators("1.455"), "1455");
        assert_eq!(strip_rate_separators(" 1,455.50 "), "145550");
        assert_eq!(strip_rate_separators("1200"), "1200");
    }

    #[test]
    fn color_names_roundtrip_through_from_name() {
        for c in Color::ALL {
            assert_eq!(Color::from_name(c.name()), Some(c));
        }
        assert_eq!(Color::from_name("sierra blue"), Some(Color::SierraBlue));
        assert_eq!(Color::from_name("graphito"), None);
    }

    #[test]
    fn hex_codes_are_distinct_rgb() {
        let mut codes: Vec<&str> = Color::ALL.iter().map(|c| c.hex()).collect();
        assert!(codes.iter().all(|h| h.len() == 7 && h.starts_with('#')));
        assert!(codes.iter().all(|h| h[1..].chars().all(|c| c.is_ascii_hexdigit())));
        assert_eq!(Color::SierraBlue.hex(), "#69ABCE");
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), Color::ALL.len());
    }

    #[test]
    fn color_serializes_by_display_name() {
        let json = serde_json::to_string(&Color::DeepPurple).unwrap();
        assert_eq!(json, "\"Deep Purple\"");
    }

    #[test]
    fn supplier_rate_must_be_positive() {
        let mut s = Supplier {
            id: 1,
            name: "X".into(),
            contact: None,
            dollar_rate: "1455".into(),
            min_purchase: None,
            location: None,
        };
        assert_eq!(s.rate(), Some(1455.0));
        s.dollar_rate = "0".into();
        assert_eq!(s.rate(), None);
        s.dollar_rate = "abc".into();
        assert_eq!(s.rate(), None);
    }

    #[test]
    fn catalogs_contain_defaults() {
        assert!(STORAGE_OPTIONS.contains(&DEFAULT_STORAGE));
        assert!(BATTERY_OPTIONS.contains(&DEFAULT_BATTERY));
        assert!(BATTERY_OPTIONS.contains(&NEW_BATTERY));
        assert!(IPHONE_MODELS.iter().all(|m| m.starts_with(DEFAULT_MODEL)));
    }
}
