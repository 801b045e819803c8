use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::model::{Product, Supplier, DEFAULT_MODEL, NEW_BATTERY, NEW_BATTERY_NOTE};
use crate::parser::color::dialect_token;

static LEADING_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\d+)").unwrap());

/// Write records back as price-list text, one block per supplier in the given
/// order. Products whose supplier is not in `suppliers` are left out.
pub fn render_catalog(suppliers: &[Supplier], products: &[Product]) -> String {
    let mut out = String::new();
    for (i, supplier) in suppliers.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_supplier(&mut out, supplier);
        for product in products.iter().filter(|p| p.supplier_id == supplier.id) {
            out.push_str(&render_product(product));
            out.push('\n');
        }
    }

    let orphans = products
        .iter()
        .filter(|p| !suppliers.iter().any(|s| s.id == p.supplier_id))
        .count();
    if orphans > 0 {
        debug!(orphans, "products without a listed supplier not rendered");
    }
    out
}

fn render_supplier(out: &mut String, s: &Supplier) {
    let contact = s.contact.as_deref().unwrap_or_default();
    let _ = writeln!(out, "DOLAR $ {} | {} {}", s.dollar_rate, contact, s.name);
    if let Some(location) = &s.location {
        let _ = writeln!(out, "{}", location);
    }
    // Only a leading count survives a re-parse.
    if let Some(caps) = s.min_purchase.as_deref().and_then(|m| LEADING_COUNT_RE.captures(m)) {
        let _ = writeln!(out, "{} equipos primera compra", &caps[1]);
    }
}

/// `**<model> <storage> <color> <battery>** | <qty> x USD $<price>` plus the
/// new-battery phrase and `(details)` when present.
pub fn render_product(p: &Product) -> String {
    let model = p
        .model
        .strip_prefix(DEFAULT_MODEL)
        .map(str::trim)
        .unwrap_or(&p.model);
    let new_battery = p.battery == NEW_BATTERY;

    let mut descriptor: Vec<&str> = Vec::with_capacity(4);
    if !model.is_empty() {
        descriptor.push(model);
    }
    descriptor.push(&p.storage);
    descriptor.push(dialect_token(p.color));
    if !new_battery {
        descriptor.push(&p.battery);
    }

    let mut line = format!(
        "**{}** | {} x USD ${}",
        descriptor.join(" "),
        p.min_quantity,
        p.price_usd
    );
    if new_battery {
        line.push_str(" batería nueva");
    }
    match p.details.as_deref() {
        Some(NEW_BATTERY_NOTE) if new_battery => {}
        Some(details) => {
            let _ = write!(line, " ({})", details);
        }
        None => {}
    }
    line
}
