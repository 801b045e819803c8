use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{positive_number, RecordId, SelectionEntry, Supplier};

/// Multiplier applied to totals when paying by bank transfer.
pub const TRANSFER_SURCHARGE: f64 = 1.06;

pub fn with_surcharge(amount: f64, transfer: bool) -> f64 {
    if transfer {
        amount * TRANSFER_SURCHARGE
    } else {
        amount
    }
}

fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

pub fn find_supplier(suppliers: &[Supplier], id: RecordId) -> Option<&Supplier> {
    suppliers.iter().find(|s| s.id == id)
}

/// USD price → local currency at the supplier's rate, rounded to cents.
/// A missing supplier or an unusable price/rate gives 0.
pub fn to_local_currency(price_usd: &str, supplier: Option<&Supplier>) -> f64 {
    let Some(rate) = supplier.and_then(Supplier::rate) else {
        return 0.0;
    };
    positive_number(price_usd)
        .map(|usd| round2(usd * rate))
        .unwrap_or(0.0)
}

pub fn line_total(entry: &SelectionEntry, suppliers: &[Supplier]) -> f64 {
    let supplier = find_supplier(suppliers, entry.product.supplier_id);
    to_local_currency(&entry.product.price_usd, supplier) * f64::from(entry.quantity)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonGroup {
    pub supplier_id: RecordId,
    /// `None` when the selection references a supplier the caller does not know.
    pub supplier: Option<Supplier>,
    pub products: Vec<SelectionEntry>,
    pub subtotal: f64,
}

impl ComparisonGroup {
    pub fn total(&self, transfer: bool) -> f64 {
        with_surcharge(self.subtotal, transfer)
    }

    pub fn supplier_name(&self) -> Option<&str> {
        self.supplier.as_ref().map(|s| s.name.as_str())
    }
}

/// Groups keyed by supplier id, in the order each supplier first appears in
/// the selection.
pub fn group_by_supplier(
    selection: &[SelectionEntry],
    suppliers: &[Supplier],
) -> IndexMap<RecordId, ComparisonGroup> {
    let mut groups: IndexMap<RecordId, ComparisonGroup> = IndexMap::new();
    for entry in selection {
        let id = entry.product.supplier_id;
        let group = groups.entry(id).or_insert_with(|| ComparisonGroup {
            supplier_id: id,
            supplier: find_supplier(suppliers, id).cloned(),
            products: Vec::new(),
            subtotal: 0.0,
        });
        group.subtotal += line_total(entry, suppliers);
        group.products.push(entry.clone());
    }
    groups
}

pub fn total(selection: &[SelectionEntry], suppliers: &[Supplier], transfer: bool) -> f64 {
    let subtotal: f64 = group_by_supplier(selection, suppliers)
        .values()
        .map(|g| g.subtotal)
        .sum();
    with_surcharge(subtotal, transfer)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub supplier_id: RecordId,
    pub supplier_name: Option<String>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Savings {
    pub cheapest: GroupTotal,
    pub most_expensive: GroupTotal,
    /// How much less the cheapest supplier costs than the dearest one.
    pub savings: f64,
}

/// Cheapest and most expensive group after surcharge. Ties go to the group
/// that appeared first. `None` for an empty selection.
pub fn cheapest_vs_most_expensive(
    groups: &IndexMap<RecordId, ComparisonGroup>,
    transfer: bool,
) -> Option<Savings> {
    let mut totals = groups.values().map(|g| GroupTotal {
        supplier_id: g.supplier_id,
        supplier_name: g.supplier_name().map(str::to_string),
        total: g.total(transfer),
    });
    let first = totals.next()?;
    let (cheapest, most_expensive) =
        totals.fold((first.clone(), first), |(min, max), t| {
            let min = if t.total < min.total { t.clone() } else { min };
            let max = if t.total > max.total { t } else { max };
            (min, max)
        });
    Some(Savings {
        savings: most_expensive.total - cheapest.total,
        cheapest,
        most_expensive,
    })
}

/// Everything the comparison view shows, computed in one go.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub groups: Vec<ComparisonGroup>,
    pub transfer: bool,
    pub subtotal: f64,
    pub total: f64,
    pub savings: Option<Savings>,
}

pub fn compare(
    selection: &[SelectionEntry],
    suppliers: &[Supplier],
    transfer: bool,
) -> ComparisonReport {
    let groups = group_by_supplier(selection, suppliers);
    let subtotal: f64 = groups.values().map(|g| g.subtotal).sum();
    let savings = if groups.len() > 1 {
        cheapest_vs_most_expensive(&groups, transfer)
    } else {
        None
    };
    ComparisonReport {
        groups: groups.into_values().collect(),
        transfer,
        subtotal,
        total: with_surcharge(subtotal, transfer),
        savings,
    }
}
