use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::cart::{Cart, CartItem};
use crate::error::{Result, ServerError};
use crate::store::{CartStore, CatalogStore};

/// Cart manager.
///
/// Reconciles incoming (product, quantity) requests against the stored cart
/// and the product's available stock. All mutations for one user run behind
/// a per-user lock so the load, reconcile, save span never interleaves.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
    products: Arc<dyn CatalogStore>,
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl CartService {
    /// Create a new [`CartService`].
    pub fn new(
        carts: Arc<dyn CartStore>,
        products: Arc<dyn CatalogStore>,
    ) -> Self {
        Self {
            carts,
            products,
            locks: Arc::new(DashMap::new()),
        }
    }

    async fn lock(&self, user_id: Uuid) -> OwnedMutexGuard<()> {
        // Clone out of the map so its shard guard is released before the
        // await below.
        let lock = self.locks.entry(user_id).or_default().clone();
        lock.lock_owned().await
    }

    /// User's cart, created empty and persisted when none exists.
    pub async fn get(&self, user_id: Uuid) -> Result<Cart> {
        let _guard = self.lock(user_id).await;

        match self.carts.find_by_user(user_id).await? {
            Some(cart) => Ok(cart),
            None => {
                let cart = Cart::new(user_id);
                self.carts.upsert(&cart).await?;
                Ok(cart)
            },
        }
    }

    /// Add `quantity` of a product, merging into an existing line item.
    ///
    /// Stock is checked against the quantity that would result after the
    /// merge, not the delta alone.
    pub async fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart> {
        if quantity < 1 {
            return Err(ServerError::InvalidQuantity(quantity));
        }

        let _guard = self.lock(user_id).await;

        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or(ServerError::ProductNotFound(product_id))?;

        let mut cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .unwrap_or_else(|| Cart::new(user_id));

        let current = cart.item(product_id).map(|item| item.quantity).unwrap_or(0);
        let cumulative = current.saturating_add(quantity);
        if product.stock_quantity < cumulative {
            return Err(ServerError::InsufficientStock {
                available: product.stock_quantity,
                requested: cumulative,
            });
        }

        match cart.item_mut(product_id) {
            Some(item) => {
                item.quantity = cumulative;
                item.unit_price = product.price;
            },
            None => cart.items.push(CartItem {
                product_id,
                quantity,
                unit_price: product.price,
            }),
        }

        cart.refresh();
        self.carts.upsert(&cart).await?;

        Ok(cart)
    }

    /// Set the absolute quantity of an existing line item.
    ///
    /// Zero removes the item.
    pub async fn update_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart> {
        if quantity < 0 {
            return Err(ServerError::InvalidQuantity(quantity));
        }

        let _guard = self.lock(user_id).await;

        let mut cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(ServerError::CartNotFound)?;

        if cart.item(product_id).is_none() {
            return Err(ServerError::ItemNotFound(product_id));
        }

        if quantity == 0 {
            cart.items.retain(|item| item.product_id != product_id);
        } else {
            let product = self
                .products
                .find_by_id(product_id)
                .await?
                .ok_or(ServerError::ProductNotFound(product_id))?;

            if product.stock_quantity < quantity {
                return Err(ServerError::InsufficientStock {
                    available: product.stock_quantity,
                    requested: quantity,
                });
            }

            if let Some(item) = cart.item_mut(product_id) {
                item.quantity = quantity;
                item.unit_price = product.price;
            }
        }

        cart.refresh();
        self.carts.upsert(&cart).await?;

        Ok(cart)
    }

    /// Delete a line item.
    ///
    /// Removing an absent item fails, it never silently succeeds.
    pub async fn remove_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Cart> {
        let _guard = self.lock(user_id).await;

        let mut cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(ServerError::CartNotFound)?;

        if cart.item(product_id).is_none() {
            return Err(ServerError::ItemNotFound(product_id));
        }

        cart.items.retain(|item| item.product_id != product_id);

        cart.refresh();
        self.carts.upsert(&cart).await?;

        Ok(cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::store::Store;
    use chrono::Utc;

    const PRICE: i64 = 99_999;

    async fn fixture(stock: i32) -> (CartService, Store, Uuid) {
        let store = Store::memory();
        let service =
            CartService::new(store.carts.clone(), store.products.clone());

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: "Apple iPhone 15".into(),
            price: PRICE,
            description: None,
            stock_quantity: stock,
            created_at: now,
            updated_at: now,
        };
        store.products.insert(&product).await.unwrap();

        (service, store, product.id)
    }

    #[tokio::test]
    async fn test_get_creates_empty_cart_once() {
        let (service, _, _) = fixture(5).await;
        let user_id = Uuid::new_v4();

        let cart = service.get(user_id).await.unwrap();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total_amount, 0);

        // Repeated calls return the persisted cart, not a fresh one.
        let again = service.get(user_id).await.unwrap();
        assert_eq!(again.id, cart.id);
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_quantity() {
        let (service, _, product_id) = fixture(5).await;
        let user_id = Uuid::new_v4();

        for quantity in [0, -3] {
            assert!(matches!(
                service.add_item(user_id, product_id, quantity).await,
                Err(ServerError::InvalidQuantity(q)) if q == quantity
            ));
        }
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let (service, _, _) = fixture(5).await;

        let missing = Uuid::new_v4();
        assert!(matches!(
            service.add_item(Uuid::new_v4(), missing, 1).await,
            Err(ServerError::ProductNotFound(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn test_add_merges_into_one_line_item() {
        let (service, _, product_id) = fixture(10).await;
        let user_id = Uuid::new_v4();

        service.add_item(user_id, product_id, 2).await.unwrap();
        let cart = service.add_item(user_id, product_id, 3).await.unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.total_amount, 5 * PRICE);
    }

    #[tokio::test]
    async fn test_stock_checked_against_cumulative_quantity() {
        let (service, store, product_id) = fixture(5).await;
        let user_id = Uuid::new_v4();

        service.add_item(user_id, product_id, 3).await.unwrap();

        // 3 already in the cart: 3 more would be 6 of a 5-stock product.
        assert!(matches!(
            service.add_item(user_id, product_id, 3).await,
            Err(ServerError::InsufficientStock {
                available: 5,
                requested: 6,
            })
        ));

        // The stored cart kept its previous state.
        let stored =
            store.carts.find_by_user(user_id).await.unwrap().unwrap();
        assert_eq!(stored.items[0].quantity, 3);
        assert_eq!(stored.total_amount, 3 * PRICE);
    }

    #[tokio::test]
    async fn test_update_sets_absolute_quantity() {
        let (service, _, product_id) = fixture(10).await;
        let user_id = Uuid::new_v4();

        service.add_item(user_id, product_id, 4).await.unwrap();
        let cart = service.add_item(user_id, product_id, 4).await.unwrap();
        assert_eq!(cart.items[0].quantity, 8);

        let cart = service
            .update_item(user_id, product_id, 10)
            .await
            .unwrap();
        assert_eq!(cart.items[0].quantity, 10);

        assert!(matches!(
            service.update_item(user_id, product_id, 11).await,
            Err(ServerError::InsufficientStock {
                available: 10,
                requested: 11,
            })
        ));

        let cart = service.get(user_id).await.unwrap();
        assert_eq!(cart.items[0].quantity, 10);
    }

    #[tokio::test]
    async fn test_update_zero_removes_item() {
        let (service, _, product_id) = fixture(5).await;
        let user_id = Uuid::new_v4();

        service.add_item(user_id, product_id, 2).await.unwrap();
        let cart = service
            .update_item(user_id, product_id, 0)
            .await
            .unwrap();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total_amount, 0);

        // Removing again is an error, not a no-op.
        assert!(matches!(
            service.update_item(user_id, product_id, 0).await,
            Err(ServerError::ItemNotFound(id)) if id == product_id
        ));
    }

    #[tokio::test]
    async fn test_update_negative_quantity() {
        let (service, _, product_id) = fixture(5).await;

        assert!(matches!(
            service.update_item(Uuid::new_v4(), product_id, -1).await,
            Err(ServerError::InvalidQuantity(-1))
        ));
    }

    #[tokio::test]
    async fn test_update_without_cart() {
        let (service, _, product_id) = fixture(5).await;

        assert!(matches!(
            service.update_item(Uuid::new_v4(), product_id, 1).await,
            Err(ServerError::CartNotFound)
        ));
    }

    #[tokio::test]
    async fn test_remove_never_silently_succeeds() {
        let (service, _, product_id) = fixture(5).await;
        let user_id = Uuid::new_v4();

        assert!(matches!(
            service.remove_item(user_id, product_id).await,
            Err(ServerError::CartNotFound)
        ));

        service.add_item(user_id, product_id, 2).await.unwrap();
        let cart = service.remove_item(user_id, product_id).await.unwrap();
        assert!(cart.items.is_empty());

        assert!(matches!(
            service.remove_item(user_id, product_id).await,
            Err(ServerError::ItemNotFound(id)) if id == product_id
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_adds_are_serialized() {
        let (service, _, product_id) = fixture(100).await;
        let user_id = Uuid::new_v4();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..10 {
            let service = service.clone();
            tasks.spawn(async move {
                service.add_item(user_id, product_id, 1).await
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        // No add is lost to a read-modify-write race.
        let cart = service.get(user_id).await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 10);
    }
}
