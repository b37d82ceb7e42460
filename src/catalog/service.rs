use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::catalog::Product;
use crate::error::{Result, ServerError};
use crate::store::CatalogStore;

/// Product catalog manager.
#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn CatalogStore>,
}

/// Product as written in the seed file.
#[derive(Debug, Deserialize)]
struct SeedProduct {
    name: String,
    /// Minor units (cents).
    price: i64,
    description: Option<String>,
    stock_quantity: i32,
}

impl CatalogService {
    /// Create a new [`CatalogService`].
    pub fn new(products: Arc<dyn CatalogStore>) -> Self {
        Self { products }
    }

    /// All products, insertion order, no pagination.
    pub async fn list(&self) -> Result<Vec<Product>> {
        self.products.list().await
    }

    /// Product by its raw identifier.
    pub async fn get(&self, id: &str) -> Result<Product> {
        let id = Uuid::parse_str(id)
            .map_err(|_| ServerError::InvalidIdentifier(id.to_owned()))?;

        self.products
            .find_by_id(id)
            .await?
            .ok_or(ServerError::ProductNotFound(id))
    }

    /// Load products from a YAML file when the catalog is empty.
    ///
    /// Returns how many products were inserted.
    pub async fn seed(&self, path: &Path) -> Result<usize> {
        if self.products.count().await? > 0 {
            return Ok(0);
        }

        let file = File::open(path).map_err(|err| ServerError::Internal {
            details: format!("cannot open seed file: {err}"),
        })?;
        let seeds: Vec<SeedProduct> = serde_yaml::from_reader(file)
            .map_err(|err| ServerError::Internal {
                details: format!("malformed seed file: {err}"),
            })?;

        for seed in &seeds {
            let now = chrono::Utc::now();
            self.products
                .insert(&Product {
                    id: Uuid::new_v4(),
                    name: seed.name.clone(),
                    price: seed.price,
                    description: seed.description.clone(),
                    stock_quantity: seed.stock_quantity,
                    created_at: now,
                    updated_at: now,
                })
                .await?;
        }

        tracing::info!(count = seeds.len(), "catalog seeded");
        Ok(seeds.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use chrono::Utc;

    fn product(name: &str, price: i64, stock: i32) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            description: None,
            stock_quantity: stock,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_get_rejects_malformed_id() {
        let store = Store::memory();
        let catalog = CatalogService::new(store.products);

        assert!(matches!(
            catalog.get("123").await,
            Err(ServerError::InvalidIdentifier(_))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let store = Store::memory();
        let catalog = CatalogService::new(store.products);

        let id = Uuid::new_v4();
        assert!(matches!(
            catalog.get(&id.to_string()).await,
            Err(ServerError::ProductNotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = Store::memory();
        let catalog = CatalogService::new(store.products.clone());

        for name in ["first", "second", "third"] {
            store.products.insert(&product(name, 100, 5)).await.unwrap();
        }

        let products = catalog.list().await.unwrap();
        let names: Vec<&str> =
            products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let store = Store::memory();
        let catalog = CatalogService::new(store.products.clone());

        store
            .products
            .insert(&product("existing", 100, 5))
            .await
            .unwrap();

        // A populated catalog is left alone, the file is not even read.
        let inserted = catalog.seed(Path::new("does-not-exist.yaml")).await;
        assert_eq!(inserted.unwrap(), 0);
        assert_eq!(store.products.count().await.unwrap(), 1);
    }
}
