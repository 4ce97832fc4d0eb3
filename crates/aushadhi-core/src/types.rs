//! # Domain Types
//!
//! Core domain types used throughout Aushadhi POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Documents                                │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Bill       │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name, company  │   │  billNumber     │   │  invoiceNumber  │       │
//! │  │  hsnCode, gst   │   │  items: Cart…   │   │  items: Line…   │       │
//! │  │  batches: [..]  │   │  totals         │   │  totalAmount    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Supplier     │   │    Payment      │   │    Company      │       │
//! │  │  name, contact  │   │  voucherNumber  │   │  name           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every document has:
//! - `id`: UUID v4 - immutable, used for references between documents
//! - Business ID where one exists: (billNumber, invoiceNumber, batchNumber)
//!   - human-readable, not required to be globally unique
//!
//! Batches are the exception: their opaque id is unique only within the
//! owning product, and their `batchNumber` is the human-facing label.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::expiry::ExpiryDate;
use crate::money::Money;

// =============================================================================
// GST Rate
// =============================================================================

/// GST rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000, so 1200 bps = 12% (a common slab for
/// medicines). Storing bps keeps every rate an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GstRate(u32);

impl GstRate {
    /// Creates a GST rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        GstRate(bps)
    }

    /// Creates a GST rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        GstRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero GST rate.
    #[inline]
    pub const fn zero() -> Self {
        GstRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for GstRate {
    fn default() -> Self {
        GstRate::zero()
    }
}

// =============================================================================
// Batch
// =============================================================================

/// A dated, priced lot of stock for one product.
///
/// ## Identity
/// - `id`: synthetic, opaque, unique within the owning product, never reused
/// - `batch_number`: human-assigned label from the strip/carton; unique only
///   as (product, batchNumber), matched case-sensitively
///
/// ## Invariant
/// `stock >= 0` after every committed operation. The transaction engines
/// either reject (bill edit) or clamp (purchase edit/delete) any change that
/// would break this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Batch {
    /// Synthetic identifier, unique within the owning product.
    pub id: String,

    /// Human-assigned batch number printed on the packaging.
    pub batch_number: String,

    /// Year-month expiry as printed on the strip.
    #[ts(as = "String")]
    pub expiry_date: ExpiryDate,

    /// Units on hand. Never negative once committed.
    pub stock: i64,

    /// Unit retail price (GST-inclusive MRP).
    pub mrp: Money,

    /// Unit cost from the supplier.
    pub purchase_price: Money,
}

// =============================================================================
// Product
// =============================================================================

/// A medicine (or other retail item) in the catalogue.
///
/// Created on first sighting: a manual catalogue entry, or the first
/// purchase line referencing a product the catalogue doesn't know yet.
/// Never auto-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in search and on bills.
    pub name: String,

    /// Manufacturer / marketing company.
    pub company: String,

    /// HSN classification code for GST filing.
    pub hsn_code: String,

    /// GST rate applied to this product's sales.
    pub gst: GstRate,

    /// Optional salt composition (e.g., "Paracetamol 650mg").
    pub composition: Option<String>,

    /// Batches currently known for this product.
    /// Order is insignificant; batch ids are unique within the list.
    pub batches: Vec<Batch>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Total units on hand across all batches.
    pub fn total_stock(&self) -> i64 {
        self.batches.iter().map(|b| b.stock).sum()
    }

    /// Looks up a batch by its opaque id.
    pub fn batch(&self, batch_id: &str) -> Option<&Batch> {
        self.batches.iter().find(|b| b.id == batch_id)
    }
}

// =============================================================================
// Bill (sale)
// =============================================================================

/// A line on a sales bill.
///
/// Uses the snapshot pattern: name, batch number, price and rate are frozen
/// at billing time so historical bills render correctly after the catalogue
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    /// Product being sold.
    pub product_id: String,

    /// Batch the units are drawn from.
    pub batch_id: String,

    /// Product name at billing time (frozen).
    pub product_name: String,

    /// Batch number at billing time (frozen).
    pub batch_number: String,

    /// Units sold.
    pub quantity: i64,

    /// Unit retail price at billing time (frozen).
    pub mrp: Money,

    /// GST rate at billing time (frozen).
    pub gst: GstRate,

    /// Line total = mrp × quantity. Recomputed by the engine on save.
    pub total: Money,
}

impl CartItem {
    /// Line total from unit price and quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.mrp.multiply_quantity(self.quantity)
    }

    /// GST-exclusive base value of this line.
    #[inline]
    pub fn base_amount(&self) -> Money {
        self.total.excluding_gst(self.gst)
    }

    /// GST share of this line (exact complement of the base).
    #[inline]
    pub fn gst_amount(&self) -> Money {
        self.total - self.base_amount()
    }
}

/// A sales bill.
///
/// ## Invariant
/// `sub_total + total_gst == grand_total` exactly, where
/// `sub_total = Σ base_amount(item)` and `total_gst = Σ gst_amount(item)`.
///
/// ## Lifecycle
/// Created atomically with the batch-stock decrements it causes; edited by
/// netting old-vs-new quantities per batch; deleted by reverting all of its
/// quantities back onto their batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Bill {
    pub id: String,

    /// Sequential business number, formatted `B0001`, `B0002`, …
    pub bill_number: String,

    pub customer_name: String,

    pub items: Vec<CartItem>,

    /// Σ GST-exclusive line bases.
    pub sub_total: Money,

    /// Σ GST line shares.
    pub total_gst: Money,

    /// Σ line totals. Always equals `sub_total + total_gst`.
    pub grand_total: Money,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Purchase
// =============================================================================

/// A line on a supplier invoice.
///
/// Arrives from the UI either resolved (existing product chosen from
/// search) or flagged `is_new_product` with free-text product details.
/// The purchase engine rewrites each line in place with the resolved
/// product/batch identity before the purchase is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseLineItem {
    /// True while the line describes a product the catalogue doesn't know.
    /// Cleared by resolution.
    pub is_new_product: bool,

    /// Resolved product id. `None` only before resolution of a new product.
    pub product_id: Option<String>,

    /// Resolved batch id. `None` only before resolution.
    pub batch_id: Option<String>,

    pub product_name: String,

    pub company: String,

    pub hsn_code: String,

    pub gst: GstRate,

    pub composition: Option<String>,

    /// Human batch number from the supplier invoice.
    pub batch_number: String,

    #[ts(as = "String")]
    pub expiry_date: ExpiryDate,

    /// Units received.
    pub quantity: i64,

    pub mrp: Money,

    pub purchase_price: Money,
}

impl PurchaseLineItem {
    /// Whether the line carries a resolved (productId, batchId) identity.
    pub fn resolved_ids(&self) -> Option<(&str, &str)> {
        match (self.product_id.as_deref(), self.batch_id.as_deref()) {
            (Some(p), Some(b)) => Some((p, b)),
            _ => None,
        }
    }

    /// Cost of this line = purchasePrice × quantity.
    #[inline]
    pub fn line_cost(&self) -> Money {
        self.purchase_price.multiply_quantity(self.quantity)
    }
}

/// A supplier purchase invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Purchase {
    pub id: String,

    /// User-supplied invoice number; not auto-sequenced.
    pub invoice_number: String,

    pub supplier_name: String,

    pub items: Vec<PurchaseLineItem>,

    /// Σ purchasePrice × quantity across lines. Recomputed on save.
    pub total_amount: Money,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Supplier / Payment / Company
// =============================================================================

/// A supplier the pharmacy buys from.
///
/// Purchases and payments reference suppliers by name (matched
/// case-insensitively), not by id; the record exists for contact details
/// and the outstanding-balance view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// How a supplier payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMode {
    Cash,
    Upi,
    Cheque,
    BankTransfer,
}

/// A payment made to a supplier against outstanding purchases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Payment {
    pub id: String,

    /// Sequential business number, formatted `V0001`, `V0002`, …
    pub voucher_number: String,

    pub supplier_name: String,

    pub amount: Money,

    pub mode: PaymentMode,

    /// Cheque/UTR number when the mode carries one.
    pub reference: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A manufacturer/marketing company, auto-created from purchase entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Company {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gst_rate_from_percentage() {
        let rate = GstRate::from_percentage(12.0);
        assert_eq!(rate.bps(), 1200);
        assert!((rate.percentage() - 12.0).abs() < 0.001);
    }

    #[test]
    fn test_cart_item_amounts_complement() {
        let item = CartItem {
            product_id: "p-1".to_string(),
            batch_id: "b-1".to_string(),
            product_name: "Dolo 650".to_string(),
            batch_number: "DL2701".to_string(),
            quantity: 3,
            mrp: Money::from_paise(3150),
            gst: GstRate::from_percentage(12.0),
            total: Money::from_paise(9450),
        };
        assert_eq!(item.line_total(), item.total);
        assert_eq!(item.base_amount() + item.gst_amount(), item.total);
    }

    #[test]
    fn test_product_total_stock() {
        let product = Product {
            id: "p-1".to_string(),
            name: "Dolo 650".to_string(),
            company: "Micro Labs".to_string(),
            hsn_code: "3004".to_string(),
            gst: GstRate::from_percentage(12.0),
            composition: Some("Paracetamol 650mg".to_string()),
            batches: vec![
                Batch {
                    id: "b-1".to_string(),
                    batch_number: "DL2701".to_string(),
                    expiry_date: "2027-01".parse().unwrap(),
                    stock: 40,
                    mrp: Money::from_paise(3150),
                    purchase_price: Money::from_paise(2200),
                },
                Batch {
                    id: "b-2".to_string(),
                    batch_number: "DL2704".to_string(),
                    expiry_date: "2027-04".parse().unwrap(),
                    stock: 60,
                    mrp: Money::from_paise(3150),
                    purchase_price: Money::from_paise(2250),
                },
            ],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(product.total_stock(), 100);
        assert!(product.batch("b-2").is_some());
        assert!(product.batch("b-9").is_none());
    }

    #[test]
    fn test_purchase_line_resolution_state() {
        let line = PurchaseLineItem {
            is_new_product: true,
            product_id: None,
            batch_id: None,
            product_name: "Azithral 500".to_string(),
            company: "Alembic".to_string(),
            hsn_code: "3004".to_string(),
            gst: GstRate::from_percentage(12.0),
            composition: None,
            batch_number: "AZ551".to_string(),
            expiry_date: "2026-11".parse().unwrap(),
            quantity: 10,
            mrp: Money::from_paise(11900),
            purchase_price: Money::from_paise(8200),
        };
        assert!(line.resolved_ids().is_none());
        assert_eq!(line.line_cost(), Money::from_paise(82000));
    }
}
