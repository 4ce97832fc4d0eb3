//! # aushadhi-service: Transaction Operations for Aushadhi POS
//!
//! The UI boundary over the stock reconciliation engine. Each operation:
//!
//! 1. reads fresh snapshots from the entity store (never a cached list —
//!    bill numbering depends on it),
//! 2. runs the pure engines in `aushadhi-core`,
//! 3. commits the emitted write-set atomically,
//! 4. returns the committed record or a structured [`ServiceError`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       One Operation, One Commit                         │
//! │                                                                         │
//! │  UI ──► generate_bill(cart, customer)                                   │
//! │            │                                                            │
//! │            ├── store.list(Bills), store.list(Products)   (fresh read)   │
//! │            ├── sale::generate_bill(…)                    (pure)         │
//! │            ├── store.commit(write_set)                   (atomic)       │
//! │            └── Bill (committed) or ServiceError                         │
//! │                                                                         │
//! │  Confirmation dialogs and print/export triggers live in the caller,     │
//! │  invoked only after a successful result.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;

pub use error::{ErrorCode, ServiceError, ServiceResult};

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use aushadhi_core::catalog::{self, BatchEntry, CatalogOutcome, ProductEntry};
use aushadhi_core::purchase::{self, PurchaseDraft, PurchaseOutcome};
use aushadhi_core::sale::{self, SaleOutcome};
use aushadhi_core::{
    balances, numbering, Bill, CartItem, Collection, Company, Money, Payment, PaymentMode, Product,
    Purchase, RevertWarning, Supplier, WriteSet,
};
use aushadhi_store::{Document, EntityStore};

/// The pharmacy's document operations, bound to one entity store.
#[derive(Debug, Clone)]
pub struct PharmacyService<S> {
    store: S,
}

impl<S: EntityStore> PharmacyService<S> {
    pub fn new(store: S) -> Self {
        PharmacyService { store }
    }

    /// Snapshot read of one collection, decoded into domain types.
    async fn load<T: DeserializeOwned>(&self, collection: Collection) -> ServiceResult<Vec<T>> {
        let docs = self.store.list(collection).await?;
        let mut out = Vec::with_capacity(docs.len());
        for doc in &docs {
            out.push(doc.decode::<T>()?);
        }
        Ok(out)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        collection: Collection,
        resource: &str,
        id: &str,
    ) -> ServiceResult<T> {
        let doc: Document = self
            .store
            .get(collection, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(resource, id))?;
        Ok(doc.decode::<T>()?)
    }

    fn log_warnings(&self, operation: &str, warnings: &[RevertWarning]) {
        for warning in warnings {
            warn!(%operation, "partial revert: {warning}");
        }
    }

    // =========================================================================
    // Bills
    // =========================================================================

    /// Creates a bill from a cart, decrementing batch stock atomically with
    /// the bill write.
    pub async fn generate_bill(
        &self,
        items: Vec<CartItem>,
        customer_name: &str,
    ) -> ServiceResult<Bill> {
        let products: Vec<Product> = self.load(Collection::Products).await?;
        // Fresh read on purpose: the next bill number derives from the max
        // numeric suffix across bills as stored right now.
        let bills: Vec<Bill> = self.load(Collection::Bills).await?;

        let SaleOutcome {
            bill,
            write_set,
            warnings,
        } = sale::generate_bill(&products, &bills, items, customer_name)?;

        self.log_warnings("generate_bill", &warnings);
        self.store.commit(write_set).await?;

        info!(
            bill_id = %bill.id,
            bill_number = %bill.bill_number,
            grand_total = %bill.grand_total,
            items = bill.items.len(),
            "Bill generated"
        );
        Ok(bill)
    }

    /// Edits a committed bill, reconciling stock by netting old vs new
    /// quantities. Rejected outright if any batch would go negative.
    pub async fn update_bill(&self, updated: Bill) -> ServiceResult<Bill> {
        let original: Bill = self.fetch(Collection::Bills, "Bill", &updated.id).await?;
        let products: Vec<Product> = self.load(Collection::Products).await?;

        let SaleOutcome {
            bill,
            write_set,
            warnings,
        } = sale::edit_bill(&products, &original, &updated)?;

        self.log_warnings("update_bill", &warnings);
        self.store.commit(write_set).await?;

        info!(bill_id = %bill.id, bill_number = %bill.bill_number, "Bill updated");
        Ok(bill)
    }

    /// Deletes a bill, reverting its quantities back onto their batches.
    pub async fn delete_bill(&self, bill_id: &str) -> ServiceResult<()> {
        let bill: Bill = self.fetch(Collection::Bills, "Bill", bill_id).await?;
        let products: Vec<Product> = self.load(Collection::Products).await?;

        let SaleOutcome {
            write_set, warnings, ..
        } = sale::delete_bill(&products, &bill)?;

        self.log_warnings("delete_bill", &warnings);
        self.store.commit(write_set).await?;

        info!(bill_id = %bill_id, "Bill deleted");
        Ok(())
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    /// Saves a supplier invoice, resolving every line against the catalogue
    /// (new product / existing batch / new batch) and incrementing stock.
    pub async fn add_purchase(&self, draft: PurchaseDraft) -> ServiceResult<Purchase> {
        let products: Vec<Product> = self.load(Collection::Products).await?;
        let companies: Vec<Company> = self.load(Collection::Companies).await?;

        let PurchaseOutcome {
            purchase,
            write_set,
            warnings,
        } = purchase::add_purchase(&products, &companies, draft)?;

        self.log_warnings("add_purchase", &warnings);
        self.store.commit(write_set).await?;

        info!(
            purchase_id = %purchase.id,
            invoice_number = %purchase.invoice_number,
            total = %purchase.total_amount,
            "Purchase saved"
        );
        Ok(purchase)
    }

    /// Edits a committed purchase via revert-then-reapply against current
    /// product state.
    pub async fn update_purchase(&self, updated: Purchase) -> ServiceResult<Purchase> {
        let original: Purchase = self
            .fetch(Collection::Purchases, "Purchase", &updated.id)
            .await?;
        let products: Vec<Product> = self.load(Collection::Products).await?;
        let companies: Vec<Company> = self.load(Collection::Companies).await?;

        let draft = PurchaseDraft {
            invoice_number: updated.invoice_number,
            supplier_name: updated.supplier_name,
            items: updated.items,
        };

        let PurchaseOutcome {
            purchase,
            write_set,
            warnings,
        } = purchase::edit_purchase(&products, &companies, &original, draft)?;

        self.log_warnings("update_purchase", &warnings);
        self.store.commit(write_set).await?;

        info!(purchase_id = %purchase.id, "Purchase updated");
        Ok(purchase)
    }

    /// Deletes a purchase, subtracting its quantities (clamped at zero).
    pub async fn delete_purchase(&self, purchase_id: &str) -> ServiceResult<()> {
        let purchase: Purchase = self
            .fetch(Collection::Purchases, "Purchase", purchase_id)
            .await?;
        let products: Vec<Product> = self.load(Collection::Products).await?;

        let PurchaseOutcome {
            write_set, warnings, ..
        } = purchase::delete_purchase(&products, &purchase)?;

        self.log_warnings("delete_purchase", &warnings);
        self.store.commit(write_set).await?;

        info!(purchase_id = %purchase_id, "Purchase deleted");
        Ok(())
    }

    // =========================================================================
    // Catalogue
    // =========================================================================

    /// Creates a product from a manual catalogue entry.
    pub async fn add_product(&self, entry: ProductEntry) -> ServiceResult<Product> {
        let CatalogOutcome { product, write_set } = catalog::add_product(entry)?;
        self.store.commit(write_set).await?;

        info!(product_id = %product.id, name = %product.name, "Product added");
        Ok(product)
    }

    /// Adds a batch to an existing product by hand.
    pub async fn add_batch(&self, product_id: &str, entry: BatchEntry) -> ServiceResult<Product> {
        let product: Product = self
            .fetch(Collection::Products, "Product", product_id)
            .await?;

        let CatalogOutcome { product, write_set } = catalog::add_batch(&product, entry)?;
        self.store.commit(write_set).await?;

        info!(product_id = %product.id, "Batch added");
        Ok(product)
    }

    // =========================================================================
    // Suppliers & Payments
    // =========================================================================

    /// Registers a supplier.
    pub async fn add_supplier(
        &self,
        name: &str,
        phone: Option<String>,
        address: Option<String>,
    ) -> ServiceResult<Supplier> {
        let supplier = Supplier {
            id: numbering::new_document_id(),
            name: name.trim().to_string(),
            phone,
            address,
            created_at: chrono::Utc::now(),
        };

        let mut write_set = WriteSet::new();
        write_set.create(Collection::Suppliers, &supplier.id, &supplier)?;
        self.store.commit(write_set).await?;

        info!(supplier_id = %supplier.id, name = %supplier.name, "Supplier added");
        Ok(supplier)
    }

    /// Records a payment to a supplier, allocating the next voucher number
    /// from a fresh read of the payments collection.
    pub async fn record_payment(
        &self,
        supplier_name: &str,
        amount: Money,
        mode: PaymentMode,
        reference: Option<String>,
    ) -> ServiceResult<Payment> {
        let payments: Vec<Payment> = self.load(Collection::Payments).await?;

        let payment = Payment {
            id: numbering::new_document_id(),
            voucher_number: numbering::next_voucher_number(&payments),
            supplier_name: supplier_name.trim().to_string(),
            amount,
            mode,
            reference,
            created_at: chrono::Utc::now(),
        };

        let mut write_set = WriteSet::new();
        write_set.create(Collection::Payments, &payment.id, &payment)?;
        self.store.commit(write_set).await?;

        info!(
            voucher_number = %payment.voucher_number,
            supplier = %payment.supplier_name,
            amount = %payment.amount,
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Outstanding balance for a supplier: matched purchases minus matched
    /// payments, names compared case-insensitively.
    pub async fn supplier_outstanding(&self, supplier_name: &str) -> ServiceResult<Money> {
        let purchases: Vec<Purchase> = self.load(Collection::Purchases).await?;
        let payments: Vec<Payment> = self.load(Collection::Payments).await?;
        Ok(balances::supplier_outstanding(
            supplier_name,
            &purchases,
            &payments,
        ))
    }

    // =========================================================================
    // Snapshot listers
    // =========================================================================

    pub async fn list_products(&self) -> ServiceResult<Vec<Product>> {
        self.load(Collection::Products).await
    }

    pub async fn list_bills(&self) -> ServiceResult<Vec<Bill>> {
        self.load(Collection::Bills).await
    }

    pub async fn list_purchases(&self) -> ServiceResult<Vec<Purchase>> {
        self.load(Collection::Purchases).await
    }

    pub async fn list_suppliers(&self) -> ServiceResult<Vec<Supplier>> {
        self.load(Collection::Suppliers).await
    }

    pub async fn list_payments(&self) -> ServiceResult<Vec<Payment>> {
        self.load(Collection::Payments).await
    }

    pub async fn list_companies(&self) -> ServiceResult<Vec<Company>> {
        self.load(Collection::Companies).await
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
