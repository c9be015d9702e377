//! Scripted flows that exercise every relationship
//!
//! `main_relations` walks the user/profile/post graph; `demo_m2m` builds two
//! orders and edits their product collections. Each step is logged and the
//! loaded results are returned for the caller to print or inspect.

use relations_core::{
    OrderWithProducts, PersonName, PostTitle, PostWithAuthor, Price, ProductName,
    ProfileWithUserAndPosts, Promocode, User, UserWithPosts, UserWithProfile,
    UserWithProfileAndPosts, Username, ValidationError,
};
use sqlx::SqlitePool;

use crate::db::{DbError, LoadStrategy, OrderRepo, PostRepo, ProductRepo, ProfileRepo, UserRepo};

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("invalid demo input: {0}")]
    Validation(#[from] ValidationError),

    #[error("expected user '{0}' to exist")]
    MissingUser(&'static str),
}

/// Everything `main_relations` loaded, in the order it ran
#[derive(Debug, Clone)]
pub struct RelationsReport {
    pub users: Vec<User>,
    /// Result of looking up a username nobody has
    pub missing_lookup: Option<User>,
    pub users_with_profiles: Vec<UserWithProfile>,
    pub users_with_posts: Vec<UserWithPosts>,
    pub posts_with_authors: Vec<PostWithAuthor>,
    pub users_with_profiles_and_posts: Vec<UserWithProfileAndPosts>,
    pub john_profiles: Vec<ProfileWithUserAndPosts>,
}

/// Result of `demo_m2m`: both orders as first loaded, then reloaded after editing
#[derive(Debug, Clone)]
pub struct M2mReport {
    /// Both orders with their products before any were attached
    pub initial: Vec<OrderWithProducts>,
    pub order_one: OrderWithProducts,
    pub order_promo: OrderWithProducts,
}

/// Users, profiles and posts, then every loading query.
pub async fn main_relations(pool: &SqlitePool) -> Result<RelationsReport, DemoError> {
    let users = UserRepo::new(pool);
    let profiles = ProfileRepo::new(pool);
    let posts = PostRepo::new(pool);

    let mut created = Vec::new();
    for name in ["john", "alice", "sam"] {
        created.push(users.create(&Username::new(name)?).await?);
    }

    let user_sam = users
        .get_by_username("sam")
        .await?
        .ok_or(DemoError::MissingUser("sam"))?;
    let user_john = users
        .get_by_username("john")
        .await?
        .ok_or(DemoError::MissingUser("john"))?;
    let missing_lookup = users.get_by_username("bob").await?;

    profiles
        .create(user_john.id, Some(&PersonName::new("John")?), None)
        .await?;
    profiles
        .create(
            user_sam.id,
            Some(&PersonName::new("Sam")?),
            Some(&PersonName::new("White")?),
        )
        .await?;

    let users_with_profiles = users.list_with_profiles().await?;
    for entry in &users_with_profiles {
        tracing::info!(
            user = %entry.user,
            first_name = entry.profile.as_ref().and_then(|p| p.first_name.as_deref()),
            "User with profile"
        );
    }

    posts
        .create_many(user_john.id, &titles(&["SQLA", "SQLA Joins"])?)
        .await?;
    posts
        .create_many(
            user_sam.id,
            &titles(&["FastAPI Intro", "FastAPI Advanced", "FastAPI more"])?,
        )
        .await?;

    let users_with_posts = users.list_with_posts(LoadStrategy::SelectIn).await?;
    for entry in &users_with_posts {
        tracing::info!(user = %entry.user, posts = entry.posts.len(), "User with posts");
        for post in &entry.posts {
            tracing::info!("- {}", post);
        }
    }

    let posts_with_authors = posts.list_with_authors().await?;
    for entry in &posts_with_authors {
        tracing::info!(post = %entry.post, author = %entry.author, "Post with author");
    }

    let users_with_profiles_and_posts = users.list_with_profiles_and_posts().await?;
    for entry in &users_with_profiles_and_posts {
        tracing::info!(
            user = %entry.user,
            first_name = entry.profile.as_ref().and_then(|p| p.first_name.as_deref()),
            posts = entry.posts.len(),
            "User with profile and posts"
        );
    }

    let john_profiles = profiles.list_with_user_and_posts("john").await?;
    for entry in &john_profiles {
        tracing::info!(
            first_name = entry.profile.first_name.as_deref(),
            user = %entry.user,
            posts = entry.posts.len(),
            "Profile with user and posts"
        );
    }

    Ok(RelationsReport {
        users: created,
        missing_lookup,
        users_with_profiles,
        users_with_posts,
        posts_with_authors,
        users_with_profiles_and_posts,
        john_profiles,
    })
}

/// Two orders, three products, then append and replace collections.
pub async fn demo_m2m(pool: &SqlitePool) -> Result<M2mReport, DemoError> {
    let orders = OrderRepo::new(pool);
    let products = ProductRepo::new(pool);

    let order_one = orders.create(None).await?;
    let order_promo = orders.create(Some(&Promocode::new("promo")?)).await?;

    let mouse = products
        .create(
            &ProductName::new("Mouse")?,
            "Great gaming mouse",
            Price::new(123)?,
        )
        .await?;
    let keyboard = products
        .create(
            &ProductName::new("Keyboard")?,
            "Great gaming keyboard",
            Price::new(149)?,
        )
        .await?;
    let display = products
        .create(
            &ProductName::new("Display")?,
            "Office display",
            Price::new(299)?,
        )
        .await?;

    let initial = vec![
        orders.get_with_products(order_one.id).await?,
        orders.get_with_products(order_promo.id).await?,
    ];
    for entry in &initial {
        tracing::debug!(order = %entry.order, products = entry.products.len(), "Loaded order");
    }

    orders.add_product(order_one.id, mouse.id).await?;
    orders.add_product(order_one.id, keyboard.id).await?;
    orders
        .set_products(order_promo.id, &[keyboard.id, display.id])
        .await?;

    let order_one = orders.get_with_products(order_one.id).await?;
    let order_promo = orders.get_with_products(order_promo.id).await?;
    for entry in [&order_one, &order_promo] {
        tracing::info!(
            order = %entry.order,
            products = ?entry.product_names(),
            total = entry.total(),
            "Order with products"
        );
    }

    Ok(M2mReport {
        initial,
        order_one,
        order_promo,
    })
}

fn titles(raw: &[&str]) -> Result<Vec<PostTitle>, ValidationError> {
    raw.iter().map(|t| PostTitle::new(t)).collect()
}
