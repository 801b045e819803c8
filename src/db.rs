use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::forms::{ProductForm, SupplierForm};
use crate::model::{Color, Product, RecordId, Supplier};
use crate::parser::color::normalize_color;
use crate::parser::ParsedCatalog;

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating database directory {}", dir.display()))?;
    }
    let conn = Connection::open(path).with_context(|| format!("opening {}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn connect_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS suppliers (
            id           INTEGER PRIMARY KEY,
            name         TEXT NOT NULL,
            contact      TEXT,
            dollar_rate  TEXT NOT NULL,
            min_purchase TEXT,
            location     TEXT,
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS products (
            id           INTEGER PRIMARY KEY,
            supplier_id  INTEGER NOT NULL REFERENCES suppliers(id) ON DELETE CASCADE,
            model        TEXT NOT NULL,
            storage      TEXT NOT NULL,
            color        TEXT NOT NULL,
            battery      TEXT NOT NULL,
            details      TEXT,
            price_usd    TEXT NOT NULL,
            min_quantity INTEGER NOT NULL DEFAULT 1 CHECK(min_quantity >= 1),
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_products_supplier ON products(supplier_id);
        ",
    )?;
    Ok(())
}

// ── Suppliers ──

const SUPPLIER_COLUMNS: &str = "id, name, contact, dollar_rate, min_purchase, location";

fn supplier_from_row(row: &Row<'_>) -> rusqlite::Result<Supplier> {
    Ok(Supplier {
        id: row.get(0)?,
        name: row.get(1)?,
        contact: row.get(2)?,
        dollar_rate: row.get(3)?,
        min_purchase: row.get(4)?,
        location: row.get(5)?,
    })
}

pub fn list_suppliers(conn: &Connection) -> Result<Vec<Supplier>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM suppliers ORDER BY id", SUPPLIER_COLUMNS))?;
    let rows = stmt
        .query_map([], supplier_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_supplier(conn: &Connection, id: RecordId) -> Result<Option<Supplier>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM suppliers WHERE id = ?1", SUPPLIER_COLUMNS),
            [id],
            supplier_from_row,
        )
        .optional()?;
    Ok(row)
}

fn insert_supplier(conn: &Connection, s: &Supplier) -> Result<RecordId> {
    conn.execute(
        "INSERT INTO suppliers (name, contact, dollar_rate, min_purchase, location)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![s.name, s.contact, s.dollar_rate, s.min_purchase, s.location],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn create_supplier(conn: &Connection, form: &SupplierForm) -> Result<Supplier> {
    let mut supplier = form.validate()?;
    supplier.id = insert_supplier(conn, &supplier)?;
    info!(id = supplier.id, name = %supplier.name, "supplier created");
    Ok(supplier)
}

pub fn update_supplier(conn: &Connection, id: RecordId, form: &SupplierForm) -> Result<Supplier> {
    let mut supplier = form.validate()?;
    let changed = conn.execute(
        "UPDATE suppliers
         SET name = ?1, contact = ?2, dollar_rate = ?3, min_purchase = ?4, location = ?5
         WHERE id = ?6",
        rusqlite::params![
            supplier.name, supplier.contact, supplier.dollar_rate,
            supplier.min_purchase, supplier.location, id,
        ],
    )?;
    if changed == 0 {
        bail!("supplier {} not found", id);
    }
    supplier.id = id;
    Ok(supplier)
}

/// Deletes the supplier and, through the foreign key, all of its products.
pub fn delete_supplier(conn: &Connection, id: RecordId) -> Result<()> {
    let changed = conn.execute("DELETE FROM suppliers WHERE id = ?1", [id])?;
    if changed == 0 {
        bail!("supplier {} not found", id);
    }
    info!(id, "supplier deleted");
    Ok(())
}

// ── Products ──

const PRODUCT_COLUMNS: &str =
    "id, model, storage, color, battery, details, supplier_id, price_usd, min_quantity";

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    let color: String = row.get(3)?;
    Ok(Product {
        id: row.get(0)?,
        model: row.get(1)?,
        storage: row.get(2)?,
        color: Color::from_name(&color).unwrap_or_else(|| normalize_color(&color)),
        battery: row.get(4)?,
        details: row.get(5)?,
        supplier_id: row.get(6)?,
        price_usd: row.get(7)?,
        min_quantity: row.get(8)?,
    })
}

pub fn list_products(conn: &Connection, supplier: Option<RecordId>) -> Result<Vec<Product>> {
    let rows = match supplier {
        Some(id) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM products WHERE supplier_id = ?1 ORDER BY id",
                PRODUCT_COLUMNS
            ))?;
            let rows = stmt
                .query_map([id], product_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt =
                conn.prepare(&format!("SELECT {} FROM products ORDER BY id", PRODUCT_COLUMNS))?;
            let rows = stmt
                .query_map([], product_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(rows)
}

pub fn get_product(conn: &Connection, id: RecordId) -> Result<Option<Product>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS),
            [id],
            product_from_row,
        )
        .optional()?;
    Ok(row)
}

fn insert_product(conn: &Connection, p: &Product) -> Result<RecordId> {
    conn.execute(
        "INSERT INTO products
         (supplier_id, model, storage, color, battery, details, price_usd, min_quantity)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            p.supplier_id, p.model, p.storage, p.color.name(), p.battery,
            p.details, p.price_usd, p.min_quantity,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn ensure_supplier(conn: &Connection, id: RecordId) -> Result<()> {
    if get_supplier(conn, id)?.is_none() {
        bail!("supplier {} not found", id);
    }
    Ok(())
}

pub fn create_product(conn: &Connection, form: &ProductForm) -> Result<Product> {
    let mut product = form.validate()?;
    ensure_supplier(conn, product.supplier_id)?;
    product.id = insert_product(conn, &product)?;
    info!(id = product.id, model = %product.model, "product created");
    Ok(product)
}

pub fn update_product(conn: &Connection, id: RecordId, form: &ProductForm) -> Result<Product> {
    let mut product = form.validate()?;
    ensure_supplier(conn, product.supplier_id)?;
    let changed = conn.execute(
        "UPDATE products
         SET supplier_id = ?1, model = ?2, storage = ?3, color = ?4, battery = ?5,
             details = ?6, price_usd = ?7, min_quantity = ?8
         WHERE id = ?9",
        rusqlite::params![
            product.supplier_id, product.model, product.storage, product.color.name(),
            product.battery, product.details, product.price_usd, product.min_quantity, id,
        ],
    )?;
    if changed == 0 {
        bail!("product {} not found", id);
    }
    product.id = id;
    Ok(product)
}

pub fn delete_product(conn: &Connection, id: RecordId) -> Result<()> {
    let changed = conn.execute("DELETE FROM products WHERE id = ?1", [id])?;
    if changed == 0 {
        bail!("product {} not found", id);
    }
    info!(id, "product deleted");
    Ok(())
}

// ── Import ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Keep what is stored and add the parsed records.
    Append,
    /// Wipe suppliers and products first.
    Replace,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportCounts {
    pub suppliers: usize,
    pub products: usize,
}

/// Store parsed batches in one transaction. Batch ids are replaced by store
/// ids; each catalog's products are re-pointed at their stored supplier.
pub fn commit_import(
    conn: &Connection,
    catalogs: &[ParsedCatalog],
    mode: ImportMode,
) -> Result<ImportCounts> {
    let tx = conn.unchecked_transaction()?;
    if mode == ImportMode::Replace {
        tx.execute_batch("DELETE FROM products; DELETE FROM suppliers;")?;
        debug!("store cleared before import");
    }

    let mut counts = ImportCounts::default();
    for catalog in catalogs {
        let mut stored_ids: HashMap<RecordId, RecordId> = HashMap::new();
        for s in &catalog.suppliers {
            stored_ids.insert(s.id, insert_supplier(&tx, s)?);
            counts.suppliers += 1;
        }
        for p in &catalog.products {
            let Some(&supplier_id) = stored_ids.get(&p.supplier_id) else {
                bail!("parsed product {} points at unknown supplier {}", p.id, p.supplier_id);
            };
            insert_product(&tx, &Product { supplier_id, ..p.clone() })?;
            counts.products += 1;
        }
    }
    tx.commit()?;
    info!(suppliers = counts.suppliers, products = counts.products, ?mode, "import committed");
    Ok(counts)
}

// ── Stats ──

pub struct Stats {
    pub suppliers: usize,
    pub products: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let suppliers: usize = conn.query_row("SELECT COUNT(*) FROM suppliers", [], |r| r.get(0))?;
    let products: usize = conn.query_row("SELECT COUNT(*) FROM products", [], |r| r.get(0))?;
    Ok(Stats { suppliers, products })
}
