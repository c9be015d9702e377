//! Product repository

use std::collections::HashMap;

use relations_core::{Order, Price, Product, ProductName, ProductWithOrders};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::DbError;

/// Product repository
pub struct ProductRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &ProductName,
        description: &str,
        price: Price,
    ) -> Result<Product, DbError> {
        let product: Product = sqlx::query_as(
            r#"
            INSERT INTO products (name, description, price)
            VALUES (?, ?, ?)
            RETURNING id, name, description, price
            "#,
        )
        .bind(name.as_str())
        .bind(description)
        .bind(price.get())
        .fetch_one(self.pool)
        .await?;

        tracing::info!(%product, "Created product");
        Ok(product)
    }

    pub async fn get(&self, id: i64) -> Result<Product, DbError> {
        sqlx::query_as("SELECT id, name, description, price FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("product", id))
    }

    pub async fn list(&self) -> Result<Vec<Product>, DbError> {
        let products = sqlx::query_as("SELECT id, name, description, price FROM products ORDER BY id")
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }

    /// Product with every order containing it (the many-to-many back-reference).
    pub async fn with_orders(&self, id: i64) -> Result<ProductWithOrders, DbError> {
        let product = self.get(id).await?;
        let mut orders = orders_by_product(self.pool, &[id]).await?;
        Ok(ProductWithOrders {
            orders: orders.remove(&id).unwrap_or_default(),
            product,
        })
    }
}

#[derive(FromRow)]
struct LinkedOrder {
    product_id: i64,
    #[sqlx(flatten)]
    order: Order,
}

/// Select-in load through the association table, keyed by product id.
pub(crate) async fn orders_by_product(
    pool: &SqlitePool,
    product_ids: &[i64],
) -> Result<HashMap<i64, Vec<Order>>, DbError> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT a.product_id, o.id, o.promocode, o.created_at
        FROM order_product_association a
        JOIN orders o ON o.id = a.order_id
        WHERE a.product_id IN ("#,
    );
    let mut ids = query.separated(", ");
    for id in product_ids {
        ids.push_bind(*id);
    }
    ids.push_unseparated(") ORDER BY o.id");

    let rows: Vec<LinkedOrder> = query.build_query_as().fetch_all(pool).await?;

    let mut grouped: HashMap<i64, Vec<Order>> = HashMap::new();
    for row in rows {
        grouped.entry(row.product_id).or_default().push(row.order);
    }
    Ok(grouped)
}
