pub mod attributes;
pub mod color;
pub mod lines;
pub mod products;
pub mod suppliers;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Product, RecordId, Supplier};
use lines::Line;
use suppliers::SupplierBlocks;

/// Source of batch-local record ids.
pub trait IdFactory {
    fn next_id(&mut self) -> RecordId;
}

/// Monotonic counter, private to one parse. Saturates at `RecordId::MAX`.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: RecordId,
}

impl Default for IdSequence {
    fn default() -> Self {
        IdSequence::starting_at(1)
    }
}

impl IdSequence {
    /// The first id handed out is `first`.
    pub fn starting_at(first: RecordId) -> Self {
        IdSequence { next: first }
    }
}

impl IdFactory for IdSequence {
    fn next_id(&mut self) -> RecordId {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedCatalog {
    pub suppliers: Vec<Supplier>,
    pub products: Vec<Product>,
}

impl ParsedCatalog {
    pub fn products_of(&self, supplier_id: RecordId) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(move |p| p.supplier_id == supplier_id)
    }
}

/// Price-list text → suppliers and products. Ids start at 1 for every call.
pub fn parse_catalog(text: &str) -> ParsedCatalog {
    parse_catalog_with(text, &mut IdSequence::default())
}

/// Single pass over the lines: headers open supplier blocks, every other line
/// feeds the attribute scans, and `USD` lines inside a block become products.
/// Never fails; anything that does not fit the dialect is skipped.
pub fn parse_catalog_with<F: IdFactory>(text: &str, ids: &mut F) -> ParsedCatalog {
    let mut blocks = SupplierBlocks::default();
    let mut products = Vec::new();

    for (lineno, line) in lines::classify_lines(text).into_iter().enumerate() {
        let line = match line {
            Line::Empty => continue,
            Line::Header(header) => {
                blocks.open(ids.next_id(), header);
                continue;
            }
            other => other,
        };

        let Some(supplier_id) = blocks.current().map(|s| s.id) else {
            if let Line::Product(text) = line {
                debug!(line = lineno + 1, text, "priced line before any supplier header, skipped");
            }
            continue;
        };

        if let Some(text) = line.text() {
            blocks.scan_attributes(text);
        }

        if let Line::Product(text) = line {
            match products::parse_product_line(text) {
                Some(parsed) => products.push(parsed.into_product(ids.next_id(), supplier_id)),
                None => debug!(line = lineno + 1, text, "unpriced product line dropped"),
            }
        }
    }

    let catalog = ParsedCatalog {
        suppliers: blocks.finish(),
        products,
    };
    debug!(
        suppliers = catalog.suppliers.len(),
        products = catalog.products.len(),
        "catalog parsed"
    );
    catalog
}

// ── Tests ──
