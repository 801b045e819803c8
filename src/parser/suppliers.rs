use tracing::debug;

use super::lines::{find_location, find_min_purchase, Header};
use crate::model::{RecordId, Supplier, DEFAULT_SUPPLIER_NAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No header seen yet.
    Seeking,
    /// Index of the open supplier in `SupplierBlocks::suppliers`.
    Active(usize),
}

/// Single-pass builder for supplier blocks. Each header opens a new supplier
/// and closes the previous one; attribute lines fill empty fields of the open
/// supplier and never overwrite them.
#[derive(Debug)]
pub struct SupplierBlocks {
    state: State,
    suppliers: Vec<Supplier>,
}

impl Default for SupplierBlocks {
    fn default() -> Self {
        SupplierBlocks {
            state: State::Seeking,
            suppliers: Vec::new(),
        }
    }
}

impl SupplierBlocks {
    pub fn open(&mut self, id: RecordId, header: Header) {
        let name = if header.name.is_empty() {
            DEFAULT_SUPPLIER_NAME.to_string()
        } else {
            header.name
        };
        let contact = Some(header.contact).filter(|c| !c.is_empty());
        debug!(id, name = %name, rate = %header.rate, "supplier block opened");
        self.suppliers.push(Supplier {
            id,
            name,
            contact,
            dollar_rate: header.rate,
            min_purchase: None,
            location: None,
        });
        self.state = State::Active(self.suppliers.len() - 1);
    }

    pub fn current(&self) -> Option<&Supplier> {
        match self.state {
            State::Seeking => None,
            State::Active(idx) => self.suppliers.get(idx),
        }
    }

    /// Run the location and minimum-purchase scans against the open supplier.
    /// No-op while seeking.
    pub fn scan_attributes(&mut self, line: &str) {
        let State::Active(idx) = self.state else {
            return;
        };
        let Some(supplier) = self.suppliers.get_mut(idx) else {
            return;
        };
        if supplier.location.is_none() {
            supplier.location = find_location(line);
        }
        if supplier.min_purchase.is_none() {
            supplier.min_purchase = find_min_purchase(line);
        }
    }

    pub fn finish(self) -> Vec<Supplier> {
        self.suppliers
    }
}
