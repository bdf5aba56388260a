//! # Catalogue Management
//!
//! Seller-facing catalogue operations: create, read, update and delete
//! products.
//!
//! Role checks (who is a seller at all) belong to the surrounding service;
//! this layer receives the seller id as an opaque value and enforces the
//! one rule it can: a product row is only ever mutated together with a
//! matching `seller_id`, so nobody edits somebody else's slot.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::VendError;
use vendo_core::{validation, Product};
use vendo_db::{Database, ProductRepository};

/// Catalogue management over the SQLite product repository.
#[derive(Debug, Clone)]
pub struct CatalogService {
    products: ProductRepository,
}

impl CatalogService {
    /// Creates a catalogue service over the given database.
    pub fn new(db: &Database) -> Self {
        CatalogService {
            products: db.products(),
        }
    }

    /// Creates a product owned by the given seller.
    ///
    /// ## Validation
    /// - name present and within length limits
    /// - cost positive and a multiple of 5 (otherwise a buyer could be
    ///   owed change the machine cannot pay)
    /// - starting stock not negative
    pub async fn create_product(
        &self,
        seller_id: &str,
        name: &str,
        cost_cents: i64,
        amount_available: i64,
    ) -> Result<Product, VendError> {
        validation::validate_product_name(name)?;
        validation::validate_cost(cost_cents)?;
        validation::validate_stock_amount(amount_available)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            seller_id: seller_id.to_string(),
            name: name.trim().to_string(),
            cost_cents,
            amount_available,
            created_at: now,
            updated_at: now,
        };

        self.products.insert(&product).await?;

        info!(id = %product.id, seller_id = %seller_id, name = %product.name, "product created");

        Ok(product)
    }

    /// Fetches a single product.
    pub async fn get_product(&self, product_id: &str) -> Result<Product, VendError> {
        self.products
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| {
                VendError::NotFound(format!("Cannot find product with id {}", product_id))
            })
    }

    /// Lists the whole catalogue.
    pub async fn list_products(&self) -> Result<Vec<Product>, VendError> {
        Ok(self.products.list_all().await?)
    }

    /// Updates a product on behalf of its owning seller.
    ///
    /// A non-owner gets the same NotFound as a missing product; see
    /// [`ProductRepository::update_owned`].
    pub async fn update_product(
        &self,
        product_id: &str,
        seller_id: &str,
        name: &str,
        cost_cents: i64,
        amount_available: i64,
    ) -> Result<(), VendError> {
        validation::validate_product_name(name)?;
        validation::validate_cost(cost_cents)?;
        validation::validate_stock_amount(amount_available)?;

        self.products
            .update_owned(product_id, seller_id, name.trim(), cost_cents, amount_available)
            .await?;

        info!(id = %product_id, seller_id = %seller_id, "product updated");

        Ok(())
    }

    /// Deletes a product on behalf of its owning seller.
    pub async fn delete_product(&self, product_id: &str, seller_id: &str) -> Result<(), VendError> {
        self.products.delete_owned(product_id, seller_id).await?;

        info!(id = %product_id, seller_id = %seller_id, "product deleted");

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
