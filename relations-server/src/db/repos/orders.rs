//! Order repository - many-to-many with products
//!
//! The `products` collection of an order is the set of
//! `order_product_association` rows for it. Appending a product that is
//! already there is a no-op (unique `(order_id, product_id)`).

use std::collections::HashMap;

use chrono::Utc;
use relations_core::{Order, OrderWithProducts, Product, Promocode};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::DbError;

/// Order repository
pub struct OrderRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, promocode: Option<&Promocode>) -> Result<Order, DbError> {
        let order: Order = sqlx::query_as(
            r#"
            INSERT INTO orders (promocode, created_at)
            VALUES (?, ?)
            RETURNING id, promocode, created_at
            "#,
        )
        .bind(promocode.map(Promocode::as_str))
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        tracing::info!(%order, "Created order");
        Ok(order)
    }

    pub async fn get(&self, id: i64) -> Result<Order, DbError> {
        sqlx::query_as("SELECT id, promocode, created_at FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("order", id))
    }

    /// Order with its products select-in loaded, products in id order.
    pub async fn get_with_products(&self, id: i64) -> Result<OrderWithProducts, DbError> {
        let order = self.get(id).await?;
        let mut products = products_by_order(self.pool, &[id]).await?;
        Ok(OrderWithProducts {
            products: products.remove(&id).unwrap_or_default(),
            order,
        })
    }

    /// Append `product_id` to the order's products.
    pub async fn add_product(&self, order_id: i64, product_id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        ensure_exists(&mut tx, Linked::Order, order_id).await?;
        ensure_exists(&mut tx, Linked::Product, product_id).await?;
        link(&mut tx, order_id, product_id).await?;
        tx.commit().await?;

        tracing::debug!(order_id, product_id, "Linked product to order");
        Ok(())
    }

    /// Replace the order's products with `product_ids`, atomically.
    ///
    /// Duplicate ids collapse to one link. Any unknown id leaves the
    /// collection untouched.
    pub async fn set_products(&self, order_id: i64, product_ids: &[i64]) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        ensure_exists(&mut tx, Linked::Order, order_id).await?;

        sqlx::query("DELETE FROM order_product_association WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        for &product_id in product_ids {
            ensure_exists(&mut tx, Linked::Product, product_id).await?;
            link(&mut tx, order_id, product_id).await?;
        }

        tx.commit().await?;
        tracing::debug!(order_id, products = ?product_ids, "Replaced order products");
        Ok(())
    }

    /// Remove `product_id` from the order. Returns whether a link existed.
    pub async fn remove_product(&self, order_id: i64, product_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query(
            "DELETE FROM order_product_association WHERE order_id = ? AND product_id = ?",
        )
        .bind(order_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Rows an association links together
#[derive(Debug, Clone, Copy)]
enum Linked {
    Order,
    Product,
}

impl Linked {
    fn table(self) -> &'static str {
        match self {
            Self::Order => "orders",
            Self::Product => "products",
        }
    }

    fn resource(self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Product => "product",
        }
    }
}

/// `NotFound` unless the `kind` row `id` exists.
async fn ensure_exists(conn: &mut SqliteConnection, kind: Linked, id: i64) -> Result<(), DbError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", kind.table());
    let (exists,): (bool,) = sqlx::query_as(&sql).bind(id).fetch_one(conn).await?;
    if exists {
        Ok(())
    } else {
        Err(DbError::not_found(kind.resource(), id))
    }
}

async fn link(conn: &mut SqliteConnection, order_id: i64, product_id: i64) -> Result<(), DbError> {
    sqlx::query(
        r#"
        INSERT INTO order_product_association (order_id, product_id)
        VALUES (?, ?)
        ON CONFLICT (order_id, product_id) DO NOTHING
        "#,
    )
    .bind(order_id)
    .bind(product_id)
    .execute(conn)
    .await?;
    Ok(())
}

#[derive(FromRow)]
struct LinkedProduct {
    order_id: i64,
    #[sqlx(flatten)]
    product: Product,
}

/// Select-in load through the association table, keyed by order id.
pub(crate) async fn products_by_order(
    pool: &SqlitePool,
    order_ids: &[i64],
) -> Result<HashMap<i64, Vec<Product>>, DbError> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT a.order_id, p.id, p.name, p.description, p.price
        FROM order_product_association a
        JOIN products p ON p.id = a.product_id
        WHERE a.order_id IN ("#,
    );
    let mut ids = query.separated(", ");
    for id in order_ids {
        ids.push_bind(*id);
    }
    ids.push_unseparated(") ORDER BY p.id");

    let rows: Vec<LinkedProduct> = query.build_query_as().fetch_all(pool).await?;

    let mut grouped: HashMap<i64, Vec<Product>> = HashMap::new();
    for row in rows {
        grouped.entry(row.order_id).or_default().push(row.product);
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::db::ProductRepo;
    use relations_core::{Price, ProductName};

    async fn product(pool: &SqlitePool, name: &str, price: i64) -> Product {
        ProductRepo::new(pool)
            .create(
                &ProductName::new(name).unwrap(),
                "",
                Price::new(price).unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_with_and_without_promocode() {
        let pool = test_pool().await;
        let repo = OrderRepo::new(&pool);

        let plain = repo.create(None).await.unwrap();
        let promo = repo
            .create(Some(&Promocode::new("promo").unwrap()))
            .await
            .unwrap();

        assert_eq!(plain.promocode, None);
        assert_eq!(promo.promocode.as_deref(), Some("promo"));
        assert_eq!(repo.get(promo.id).await.unwrap(), promo);
    }

    #[tokio::test]
    async fn append_persists_association() {
        let pool = test_pool().await;
        let repo = OrderRepo::new(&pool);
        let order = repo.create(None).await.unwrap();
        let mouse = product(&pool, "Mouse", 123).await;
        let keyboard = product(&pool, "Keyboard", 149).await;

        repo.add_product(order.id, mouse.id).await.unwrap();
        repo.add_product(order.id, keyboard.id).await.unwrap();
        // appending twice keeps one link
        repo.add_product(order.id, mouse.id).await.unwrap();

        let loaded = repo.get_with_products(order.id).await.unwrap();
        assert_eq!(loaded.product_names(), vec!["Mouse", "Keyboard"]);
        assert_eq!(loaded.total(), 272);
    }

    #[tokio::test]
    async fn replace_collection() {
        let pool = test_pool().await;
        let repo = OrderRepo::new(&pool);
        let order = repo.create(None).await.unwrap();
        let mouse = product(&pool, "Mouse", 123).await;
        let keyboard = product(&pool, "Keyboard", 149).await;
        let display = product(&pool, "Display", 299).await;

        repo.add_product(order.id, mouse.id).await.unwrap();
        repo.set_products(order.id, &[keyboard.id, display.id, keyboard.id])
            .await
            .unwrap();

        let loaded = repo.get_with_products(order.id).await.unwrap();
        assert_eq!(loaded.product_names(), vec!["Keyboard", "Display"]);

        repo.set_products(order.id, &[]).await.unwrap();
        assert!(repo
            .get_with_products(order.id)
            .await
            .unwrap()
            .products
            .is_empty());
    }

    #[tokio::test]
    async fn replace_with_unknown_product_keeps_old_collection() {
        let pool = test_pool().await;
        let repo = OrderRepo::new(&pool);
        let order = repo.create(None).await.unwrap();
        let mouse = product(&pool, "Mouse", 123).await;
        repo.add_product(order.id, mouse.id).await.unwrap();

        let err = repo.set_products(order.id, &[404]).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "product", .. }));

        let loaded = repo.get_with_products(order.id).await.unwrap();
        assert_eq!(loaded.product_names(), vec!["Mouse"]);
    }

    #[tokio::test]
    async fn add_to_missing_order() {
        let pool = test_pool().await;
        let mouse = product(&pool, "Mouse", 123).await;

        let err = OrderRepo::new(&pool)
            .add_product(5, mouse.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "order", .. }));
    }

    #[tokio::test]
    async fn add_missing_product() {
        let pool = test_pool().await;
        let repo = OrderRepo::new(&pool);
        let order = repo.create(None).await.unwrap();

        let err = repo.add_product(order.id, 77).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "product", ref id } if id == "77"));
        assert!(repo
            .get_with_products(order.id)
            .await
            .unwrap()
            .products
            .is_empty());
    }

    #[tokio::test]
    async fn remove_product() {
        let pool = test_pool().await;
        let repo = OrderRepo::new(&pool);
        let order = repo.create(None).await.unwrap();
        let mouse = product(&pool, "Mouse", 123).await;
        repo.add_product(order.id, mouse.id).await.unwrap();

        assert!(repo.remove_product(order.id, mouse.id).await.unwrap());
        assert!(!repo.remove_product(order.id, mouse.id).await.unwrap());
        assert!(repo
            .get_with_products(order.id)
            .await
            .unwrap()
            .products
            .is_empty());
    }

    #[tokio::test]
    async fn missing_order() {
        let pool = test_pool().await;
        let err = OrderRepo::new(&pool).get_with_products(1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "order", .. }));
    }
}
