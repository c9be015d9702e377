//! Table rows and the composite shapes produced by relationship loading
//!
//! One struct per table. Relationship fields never live on the row structs;
//! loading a relationship yields one of the `*With*` composites instead.
//!
//! - `users` 1 ─ 0..1 `profiles`   (unique `profiles.user_id`)
//! - `users` 1 ─ N `posts`
//! - `orders` N ─ M `products`     (through `order_product_association`)

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Profile {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub promocode: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row of the `order_product_association` link table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderProductAssociation {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User(id={}, username='{}')", self.id, self.username)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Profile(id={}, user_id={})", self.id, self.user_id)
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Post(id={}, title='{}', user_id={})",
            self.id, self.title, self.user_id
        )
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Product(id={}, name='{}', price={})",
            self.id, self.name, self.price
        )
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.promocode {
            Some(code) => write!(f, "Order(id={}, promocode='{}')", self.id, code),
            None => write!(f, "Order(id={}, promocode=None)", self.id),
        }
    }
}

impl Profile {
    /// "First Last", skipping missing parts
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

/// User with the one-to-one profile loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserWithProfile {
    pub user: User,
    pub profile: Option<Profile>,
}

/// User with the one-to-many posts loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserWithPosts {
    pub user: User,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserWithProfileAndPosts {
    pub user: User,
    pub profile: Option<Profile>,
    pub posts: Vec<Post>,
}

/// Post with its many-to-one author loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: User,
}

/// Profile with its user, and that user's posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileWithUserAndPosts {
    pub profile: Profile,
    pub user: User,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderWithProducts {
    pub order: Order,
    pub products: Vec<Product>,
}

impl OrderWithProducts {
    pub fn product_names(&self) -> Vec<&str> {
        self.products.iter().map(|p| p.name.as_str()).collect()
    }

    /// Sum of product prices
    pub fn total(&self) -> i64 {
        self.products.iter().map(|p| p.price).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductWithOrders {
    pub product: Product,
    pub orders: Vec<Order>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, price: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: String::new(),
            price,
        }
    }

    #[test]
    fn display_matches_repr_style() {
        let user = User {
            id: 1,
            username: "john".into(),
        };
        assert_eq!(user.to_string(), "User(id=1, username='john')");

        let post = Post {
            id: 3,
            title: "SQLA".into(),
            body: String::new(),
            user_id: 1,
        };
        assert_eq!(post.to_string(), "Post(id=3, title='SQLA', user_id=1)");

        let order = Order {
            id: 2,
            promocode: None,
            created_at: Utc::now(),
        };
        assert_eq!(order.to_string(), "Order(id=2, promocode=None)");

        let promo = Order {
            id: 3,
            promocode: Some("promo".into()),
            created_at: Utc::now(),
        };
        assert_eq!(promo.to_string(), "Order(id=3, promocode='promo')");
        assert_eq!(
            product(1, "Mouse", 123).to_string(),
            "Product(id=1, name='Mouse', price=123)"
        );
    }

    #[test]
    fn full_name_skips_missing_parts() {
        let mut profile = Profile {
            id: 1,
            first_name: Some("Sam".into()),
            last_name: Some("White".into()),
            bio: None,
            user_id: 3,
        };
        assert_eq!(profile.full_name().as_deref(), Some("Sam White"));

        profile.last_name = None;
        assert_eq!(profile.full_name().as_deref(), Some("Sam"));

        profile.first_name = None;
        assert_eq!(profile.full_name(), None);
    }

    #[test]
    fn order_total() {
        let order = OrderWithProducts {
            order: Order {
                id: 1,
                promocode: Some("promo".into()),
                created_at: Utc::now(),
            },
            products: vec![product(2, "Keyboard", 149), product(3, "Display", 299)],
        };
        assert_eq!(order.total(), 448);
        assert_eq!(order.product_names(), vec!["Keyboard", "Display"]);
    }
}
