//! # Seed Data Generator
//!
//! Populates a document store with demo pharmacy data for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p aushadhi-service --bin seed
//!
//! # Specify database path
//! cargo run -p aushadhi-service --bin seed -- --db ./data/aushadhi.db
//! ```
//!
//! ## What Gets Seeded
//! - One supplier and one purchase invoice covering the whole shelf below
//!   (every product/batch is created through real purchase processing, so
//!   stock levels come out of the same engine the app uses)
//! - A part-payment against that invoice
//! - One sample bill to show the billing flow end to end

use std::env;
use std::error::Error;

use aushadhi_core::purchase::PurchaseDraft;
use aushadhi_core::types::{GstRate, PaymentMode, PurchaseLineItem};
use aushadhi_core::{CartItem, Money};
use aushadhi_service::PharmacyService;
use aushadhi_store::{SqliteStore, StoreConfig};

/// Shelf of demo medicines: name, company, composition, batch, expiry,
/// qty, MRP (paise), purchase price (paise).
const SHELF: &[(&str, &str, &str, &str, &str, i64, i64, i64)] = &[
    ("Dolo 650", "Micro Labs", "Paracetamol 650mg", "DL2701", "2027-01", 120, 3150, 2200),
    ("Crocin Advance", "GSK", "Paracetamol 500mg", "CA4415", "2026-12", 80, 3000, 2100),
    ("Azithral 500", "Alembic", "Azithromycin 500mg", "AZ5512", "2026-10", 40, 11900, 8200),
    ("Augmentin 625 Duo", "GSK", "Amoxicillin + Clavulanate", "AG8820", "2026-09", 30, 20400, 15300),
    ("Pan 40", "Alkem", "Pantoprazole 40mg", "PN1190", "2027-03", 90, 12600, 8800),
    ("Allegra 120", "Sanofi", "Fexofenadine 120mg", "AL3321", "2027-05", 60, 20500, 14900),
    ("Betadine 10% 100ml", "Win-Medicare", "Povidone Iodine", "BD0077", "2028-01", 25, 13200, 9500),
    ("Volini Gel 30g", "Sun Pharma", "Diclofenac", "VG6644", "2027-08", 45, 14500, 10400),
    ("Electral Sachet", "FDC", "ORS", "EL2210", "2026-11", 200, 2200, 1500),
    ("Shelcal 500", "Torrent", "Calcium + D3", "SH9902", "2027-07", 70, 11300, 8100),
];

const SUPPLIER: &str = "Mehta Pharma Agencies";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_path = parse_db_path().unwrap_or_else(|| "./data/aushadhi.db".to_string());
    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    println!("Seeding document store at {db_path}");

    let store = SqliteStore::connect(StoreConfig::new(&db_path)).await?;
    let service = PharmacyService::new(store);

    service
        .add_supplier(SUPPLIER, Some("98200 11223".to_string()), None)
        .await?;

    // Everything arrives on one opening invoice so each product/batch goes
    // through real purchase resolution.
    let items: Vec<PurchaseLineItem> = SHELF
        .iter()
        .map(
            |&(name, company, composition, batch, expiry, qty, mrp, price)| PurchaseLineItem {
                is_new_product: true,
                product_id: None,
                batch_id: None,
                product_name: name.to_string(),
                company: company.to_string(),
                hsn_code: "3004".to_string(),
                gst: GstRate::from_percentage(12.0),
                composition: Some(composition.to_string()),
                batch_number: batch.to_string(),
                expiry_date: expiry.parse().expect("valid expiry in shelf table"),
                quantity: qty,
                mrp: Money::from_paise(mrp),
                purchase_price: Money::from_paise(price),
            },
        )
        .collect();

    let purchase = service
        .add_purchase(PurchaseDraft {
            invoice_number: "OPENING-001".to_string(),
            supplier_name: SUPPLIER.to_string(),
            items,
        })
        .await?;
    println!(
        "Purchased {} products for {} (invoice {})",
        purchase.items.len(),
        purchase.total_amount,
        purchase.invoice_number
    );

    let payment = service
        .record_payment(
            SUPPLIER,
            Money::from_paise(100_000),
            PaymentMode::Upi,
            None,
        )
        .await?;
    println!(
        "Recorded payment {} of {}",
        payment.voucher_number, payment.amount
    );

    let outstanding = service.supplier_outstanding(SUPPLIER).await?;
    println!("Outstanding with {SUPPLIER}: {outstanding}");

    // A sample bill: two strips of Dolo and one Pan 40.
    let products = service.list_products().await?;
    let cart: Vec<CartItem> = products
        .iter()
        .filter(|p| p.name == "Dolo 650" || p.name == "Pan 40")
        .map(|p| {
            let batch = &p.batches[0];
            CartItem {
                product_id: p.id.clone(),
                batch_id: batch.id.clone(),
                product_name: p.name.clone(),
                batch_number: batch.batch_number.clone(),
                quantity: if p.name == "Dolo 650" { 2 } else { 1 },
                mrp: batch.mrp,
                gst: p.gst,
                total: Money::zero(),
            }
        })
        .collect();

    let bill = service.generate_bill(cart, "Walk-in").await?;
    println!(
        "Generated bill {} for {} ({} lines, GST {})",
        bill.bill_number,
        bill.grand_total,
        bill.items.len(),
        bill.total_gst
    );

    println!("Done.");
    Ok(())
}

/// Parses `--db <path>` from the command line.
fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
}
