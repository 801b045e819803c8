use serde::{Deserialize, Serialize};

use crate::model::{Product, RecordId, SelectionEntry};

/// Products picked for a comparison. Transitions consume the selection and
/// return the next one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    entries: Vec<SelectionEntry>,
}

impl Selection {
    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, product_id: RecordId) -> bool {
        self.entries.iter().any(|e| e.product.id == product_id)
    }

    /// Add with quantity 1, or remove if already selected.
    #[must_use]
    pub fn toggle(mut self, product: &Product) -> Self {
        if self.contains(product.id) {
            self.entries.retain(|e| e.product.id != product.id);
        } else {
            self.entries.push(SelectionEntry::new(product.clone()));
        }
        self
    }

    /// Every product of the supplier selected → deselect them all; otherwise
    /// add the ones still missing.
    #[must_use]
    pub fn toggle_supplier(mut self, products: &[Product], supplier_id: RecordId) -> Self {
        if self.all_selected(products, supplier_id) {
            self.entries.retain(|e| e.product.supplier_id != supplier_id);
            return self;
        }
        let missing: Vec<SelectionEntry> = products
            .iter()
            .filter(|p| p.supplier_id == supplier_id && !self.contains(p.id))
            .cloned()
            .map(SelectionEntry::new)
            .collect();
        self.entries.extend(missing);
        self
    }

    /// False for a supplier without products.
    pub fn all_selected(&self, products: &[Product], supplier_id: RecordId) -> bool {
        let mut of_supplier = products.iter().filter(|p| p.supplier_id == supplier_id).peekable();
        of_supplier.peek().is_some() && of_supplier.all(|p| self.contains(p.id))
    }

    /// Quantities below 1 are raised to 1.
    #[must_use]
    pub fn set_quantity(mut self, product_id: RecordId, quantity: u32) -> Self {
        if let Some(e) = self.entries.iter_mut().find(|e| e.product.id == product_id) {
            e.quantity = quantity.max(1);
        }
        self
    }

    #[must_use]
    pub fn forget_product(mut self, product_id: RecordId) -> Self {
        self.entries.retain(|e| e.product.id != product_id);
        self
    }

    #[must_use]
    pub fn forget_supplier(mut self, supplier_id: RecordId) -> Self {
        self.entries.retain(|e| e.product.supplier_id != supplier_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;

    fn product(id: RecordId, supplier_id: RecordId) -> Product {
        Product {
            id,
            model: "iPhone 12".into(),
            storage: "64GB".into(),
            color: Color::Black,
            battery: "85%".into(),
            details: None,
            supplier_id,
            price_usd: "300".into(),
            min_quantity: 1,
        }
    }

    #[test]
    fn toggle_adds_then_removes() {
        let p = product(1, 1);
        let sel = Selection::default().toggle(&p);
        assert!(sel.contains(1));
        assert_eq!(sel.entries()[0].quantity, 1);
        assert!(sel.toggle(&p).is_empty());
    }

    #[test]
    fn quantity_is_clamped() {
        let sel = Selection::default()
            .toggle(&product(1, 1))
            .set_quantity(1, 0);
        assert_eq!(sel.entries()[0].quantity, 1);
        let sel = sel.set_quantity(1, 4);
        assert_eq!(sel.entries()[0].quantity, 4);
    }

    #[test]
    fn toggle_supplier_fills_then_clears() {
        let products = [product(1, 1), product(2, 1), product(3, 2)];
        let sel = Selection::default().toggle(&products[0]).toggle(&products[2]);
        assert!(!sel.all_selected(&products, 1));

        let sel = sel.toggle_supplier(&products, 1);
        assert!(sel.all_selected(&products, 1));
        assert_eq!(sel.entries().len(), 3);

        let sel = sel.toggle_supplier(&products, 1);
        assert_eq!(sel.entries().len(), 1);
        assert!(sel.contains(3));
    }

    #[test]
    fn supplier_without_products_is_never_all_selected() {
        let products = [product(1, 1)];
        assert!(!Selection::default().all_selected(&products, 9));
    }

    #[test]
    fn forgetting_after_deletes() {
        let products = [product(1, 1), product(2, 2)];
        let sel = Selection::default().toggle(&products[0]).toggle(&products[1]);
        assert_eq!(sel.clone().forget_product(1).entries().len(), 1);
        assert!(sel.forget_supplier(2).contains(1));
    }
}
