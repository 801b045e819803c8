use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use tracing::{info, warn};

use price_catalog::compare::{self, ComparisonReport};
use price_catalog::db::{self, ImportMode};
use price_catalog::dialect::render_catalog;
use price_catalog::forms::{ProductForm, SupplierForm};
use price_catalog::model::{Color, RecordId, Supplier};
use price_catalog::parser::{parse_catalog, ParsedCatalog};
use price_catalog::selection::Selection;
use price_catalog::settings::Settings;

#[derive(Parser)]
#[command(name = "price_catalog", about = "Import supplier price lists and compare offers")]
struct Cli {
    /// SQLite database path (overrides CATALOG_DB_PATH / catalog.toml)
    #[arg(long, global = true)]
    db: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse price-list files and store the result
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Wipe stored suppliers and products first
        #[arg(long)]
        replace: bool,
        /// Parse and preview only
        #[arg(long)]
        dry_run: bool,
        /// Print the parsed catalogs as JSON
        #[arg(long)]
        json: bool,
    },
    /// List suppliers
    Suppliers,
    /// List products
    Products {
        #[arg(short, long)]
        supplier: Option<RecordId>,
    },
    /// Add a supplier by hand
    AddSupplier(SupplierArgs),
    /// Change stored supplier fields
    EditSupplier {
        id: RecordId,
        #[command(flatten)]
        fields: SupplierArgs,
    },
    /// Delete a supplier and all of its products
    DeleteSupplier { id: RecordId },
    /// Add a product by hand
    AddProduct(ProductArgs),
    /// Change stored product fields
    EditProduct {
        id: RecordId,
        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Delete a product
    DeleteProduct { id: RecordId },
    /// Compare selected products across suppliers
    Compare {
        /// Product ids, optionally with a quantity: 12 or 12:3
        #[arg(required = true, value_parser = parse_pick)]
        picks: Vec<(RecordId, u32)>,
        /// Pay by bank transfer (+6%)
        #[arg(long)]
        transfer: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print stored records back as price-list text
    Export {
        #[arg(short, long)]
        supplier: Option<RecordId>,
    },
    /// Show record counts
    Stats,
}

/// Supplier fields; anything left out keeps its current value on edit.
#[derive(Args)]
struct SupplierArgs {
    #[arg(long)]
    name: Option<String>,
    /// Local currency per USD, e.g. 1.455
    #[arg(long)]
    rate: Option<String>,
    #[arg(long)]
    contact: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    min_purchase: Option<String>,
}

impl SupplierArgs {
    fn apply(self, form: &mut SupplierForm) {
        if let Some(v) = self.name {
            form.name = v;
        }
        if let Some(v) = self.rate {
            form.dollar_rate = v;
        }
        if let Some(v) = self.contact {
            form.contact = v;
        }
        if let Some(v) = self.location {
            form.location = v;
        }
        if let Some(v) = self.min_purchase {
            form.min_purchase = v;
        }
    }
}

#[derive(Args)]
struct ProductArgs {
    #[arg(short, long)]
    supplier: Option<RecordId>,
    /// Price in USD
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    storage: Option<String>,
    #[arg(long, value_parser = parse_color)]
    color: Option<Color>,
    #[arg(long)]
    battery: Option<String>,
    #[arg(long)]
    details: Option<String>,
    #[arg(long)]
    min_quantity: Option<u32>,
}

impl ProductArgs {
    fn apply(self, form: &mut ProductForm) {
        if self.supplier.is_some() {
            form.supplier_id = self.supplier;
        }
        if let Some(v) = self.price {
            form.price_usd = v;
        }
        if let Some(v) = self.model {
            form.model = v;
        }
        if let Some(v) = self.storage {
            form.storage = v;
        }
        if let Some(v) = self.color {
            form.color = v;
        }
        if let Some(v) = self.battery {
            form.battery = v;
        }
        if let Some(v) = self.details {
            form.details = v;
        }
        if let Some(v) = self.min_quantity {
            form.min_quantity = v;
        }
    }
}

fn parse_pick(s: &str) -> Result<(RecordId, u32), String> {
    let (id, qty) = match s.split_once(':') {
        Some((id, qty)) => (id, qty.parse::<u32>().map_err(|e| format!("quantity {:?}: {}", qty, e))?),
        None => (s, 1),
    };
    let id = id.parse::<RecordId>().map_err(|e| format!("product id {:?}: {}", id, e))?;
    Ok((id, qty))
}

fn parse_color(s: &str) -> Result<Color, String> {
    Color::from_name(s).ok_or_else(|| {
        let names: Vec<&str> = Color::ALL.iter().map(|c| c.name()).collect();
        format!("unknown color {:?}, expected one of: {}", s, names.join(", "))
    })
}

fn open_store(path: &str) -> anyhow::Result<Connection> {
    let conn = db::connect(path)?;
    db::init_schema(&conn)?;
    Ok(conn)
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_level.as_str().into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or(settings.db_path);

    let result = match cli.command {
        Commands::Import { files, replace, dry_run, json } => {
            let catalogs = parse_files(&files)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&catalogs)?);
            } else {
                print_preview(&files, &catalogs);
            }
            if dry_run {
                return Ok(());
            }
            let mode = if replace { ImportMode::Replace } else { ImportMode::Append };
            let conn = open_store(&db_path)?;
            let counts = db::commit_import(&conn, &catalogs, mode)?;
            println!(
                "Imported {} suppliers and {} products{}.",
                counts.suppliers,
                counts.products,
                if replace { " (store replaced)" } else { "" }
            );
            Ok(())
        }
        Commands::Suppliers => {
            let conn = open_store(&db_path)?;
            let suppliers = db::list_suppliers(&conn)?;
            if suppliers.is_empty() {
                println!("No suppliers. Run 'import' or 'add-supplier' first.");
                return Ok(());
            }
            let products = db::list_products(&conn, None)?;

            println!(
                "{:>4} | {:<24} | {:>8} | {:<20} | {:<22} | {:<10} | {:>5}",
                "ID", "Supplier", "Rate", "Contact", "Location", "Min", "Items"
            );
            println!("{}", "-".repeat(110));
            for s in &suppliers {
                let items = products.iter().filter(|p| p.supplier_id == s.id).count();
                println!(
                    "{:>4} | {:<24} | {:>8} | {:<20} | {:<22} | {:<10} | {:>5}",
                    s.id,
                    truncate(&s.name, 24),
                    s.dollar_rate,
                    truncate(s.contact.as_deref().unwrap_or("-"), 20),
                    truncate(s.location.as_deref().unwrap_or("-"), 22),
                    s.min_purchase.as_deref().unwrap_or("-"),
                    items
                );
            }
            println!("\n{} suppliers", suppliers.len());
            Ok(())
        }
        Commands::Products { supplier } => {
            let conn = open_store(&db_path)?;
            let products = db::list_products(&conn, supplier)?;
            if products.is_empty() {
                println!("No products found.");
                return Ok(());
            }
            let suppliers = db::list_suppliers(&conn)?;

            println!(
                "{:>4} | {:<18} | {:<18} | {:<6} | {:<12} | {:<7} | {:<7} | {:>8} | {:>14} | {}",
                "ID", "Supplier", "Model", "Storage", "Color", "Hex", "Battery", "USD", "Local", "Details"
            );
            println!("{}", "-".repeat(130));
            for p in &products {
                let owner = compare::find_supplier(&suppliers, p.supplier_id);
                println!(
                    "{:>4} | {:<18} | {:<18} | {:<6} | {:<12} | {:<7} | {:<7} | {:>8} | {:>14.2} | {}",
                    p.id,
                    truncate(owner.map(|s| s.name.as_str()).unwrap_or("?"), 18),
                    p.model,
                    p.storage,
                    p.color,
                    p.color.hex(),
                    p.battery,
                    p.price_usd,
                    compare::to_local_currency(&p.price_usd, owner),
                    p.details.as_deref().unwrap_or("")
                );
            }
            println!("\n{} products", products.len());
            Ok(())
        }
        Commands::AddSupplier(fields) => {
            let conn = open_store(&db_path)?;
            let mut form = SupplierForm::default();
            fields.apply(&mut form);
            let s = db::create_supplier(&conn, &form)?;
            println!("Added supplier {} ({})", s.id, s.name);
            Ok(())
        }
        Commands::EditSupplier { id, fields } => {
            let conn = open_store(&db_path)?;
            let current = db::get_supplier(&conn, id)?
                .with_context(|| format!("supplier {} not found", id))?;
            let mut form = SupplierForm::from(&current);
            fields.apply(&mut form);
            let s = db::update_supplier(&conn, id, &form)?;
            println!("Updated supplier {} ({})", s.id, s.name);
            Ok(())
        }
        Commands::DeleteSupplier { id } => {
            let conn = open_store(&db_path)?;
            let dropped = db::list_products(&conn, Some(id))?.len();
            db::delete_supplier(&conn, id)?;
            println!("Deleted supplier {} and {} products", id, dropped);
            Ok(())
        }
        Commands::AddProduct(fields) => {
            let conn = open_store(&db_path)?;
            let mut form = ProductForm::default();
            fields.apply(&mut form);
            let p = db::create_product(&conn, &form)?;
            println!("Added product {} ({} {})", p.id, p.model, p.storage);
            Ok(())
        }
        Commands::EditProduct { id, fields } => {
            let conn = open_store(&db_path)?;
            let current = db::get_product(&conn, id)?
                .with_context(|| format!("product {} not found", id))?;
            let mut form = ProductForm::from(&current);
            fields.apply(&mut form);
            let p = db::update_product(&conn, id, &form)?;
            println!("Updated product {} ({} {})", p.id, p.model, p.storage);
            Ok(())
        }
        Commands::DeleteProduct { id } => {
            let conn = open_store(&db_path)?;
            db::delete_product(&conn, id)?;
            println!("Deleted product {}", id);
            Ok(())
        }
        Commands::Compare { picks, transfer, json } => {
            let conn = open_store(&db_path)?;
            let products = db::list_products(&conn, None)?;
            let suppliers = db::list_suppliers(&conn)?;

            let mut selection = Selection::default();
            for (id, qty) in picks {
                let Some(product) = products.iter().find(|p| p.id == id) else {
                    bail!("product {} not found", id);
                };
                if !selection.contains(id) {
                    selection = selection.toggle(product);
                }
                selection = selection.set_quantity(id, qty);
            }

            let report = compare::compare(selection.entries(), &suppliers, transfer);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
        Commands::Export { supplier } => {
            let conn = open_store(&db_path)?;
            let mut suppliers = db::list_suppliers(&conn)?;
            if let Some(id) = supplier {
                suppliers.retain(|s| s.id == id);
                if suppliers.is_empty() {
                    bail!("supplier {} not found", id);
                }
            }
            let products = db::list_products(&conn, supplier)?;
            print!("{}", render_catalog(&suppliers, &products));
            Ok(())
        }
        Commands::Stats => {
            let conn = open_store(&db_path)?;
            let s = db::get_stats(&conn)?;
            println!("Database:  {}", db_path);
            println!("Suppliers: {}", s.suppliers);
            println!("Products:  {}", s.products);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Read and parse every file in parallel. One unreadable file fails the batch.
fn parse_files(files: &[PathBuf]) -> anyhow::Result<Vec<ParsedCatalog>> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("#>-"),
    );

    let catalogs = files
        .par_iter()
        .map(|path| -> anyhow::Result<ParsedCatalog> {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let catalog = parse_catalog(&text);
            if catalog.suppliers.is_empty() {
                warn!(file = %path.display(), "no supplier header found");
            }
            pb.inc(1);
            Ok(catalog)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    pb.finish_and_clear();
    info!(files = files.len(), "price lists parsed");
    Ok(catalogs)
}

fn print_preview(files: &[PathBuf], catalogs: &[ParsedCatalog]) {
    for (path, catalog) in files.iter().zip(catalogs) {
        println!("{}", path.display());
        for s in &catalog.suppliers {
            println!(
                "  {:<24} | rate {:>8} | {:<22} | {:>3} products",
                truncate(&s.name, 24),
                s.dollar_rate,
                truncate(s.location.as_deref().unwrap_or("-"), 22),
                catalog.products_of(s.id).count()
            );
        }
    }
}

fn print_report(report: &ComparisonReport) {
    for group in &report.groups {
        let header = match &group.supplier {
            Some(Supplier { name, dollar_rate, .. }) => format!("{} (rate {})", name, dollar_rate),
            None => format!("unknown supplier {}", group.supplier_id),
        };
        println!("{}", header);
        for e in &group.products {
            let unit = compare::to_local_currency(&e.product.price_usd, group.supplier.as_ref());
            println!(
                "  {:>4} | {:<18} | {:<6} | {:<12} | {:<7} | {:>3} x {:>12.2} = {:>14.2}",
                e.product.id,
                e.product.model,
                e.product.storage,
                e.product.color,
                e.product.battery,
                e.quantity,
                unit,
                unit * f64::from(e.quantity)
            );
        }
        println!("  subtotal {:>14.2}", group.subtotal);
        if report.transfer {
            println!("  transfer {:>14.2}", group.total(true));
        }
        println!();
    }

    println!("Subtotal: {:.2}", report.subtotal);
    if report.transfer {
        println!("Total with transfer (+6%): {:.2}", report.total);
    } else {
        println!("Total: {:.2}", report.total);
    }
    if let Some(s) = &report.savings {
        println!(
            "\nCheapest: {} ({:.2}) | most expensive: {} ({:.2}) | savings {:.2}",
            s.cheapest.supplier_name.as_deref().unwrap_or("?"),
            s.cheapest.total,
            s.most_expensive.supplier_name.as_deref().unwrap_or("?"),
            s.most_expensive.total,
            s.savings
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
