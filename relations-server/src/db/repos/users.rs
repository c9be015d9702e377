//! User repository
//!
//! Owns the `users` side of both user relationships:
//! - profile (one-to-one), always joined
//! - posts (one-to-many), joined or select-in

use relations_core::{
    Post, Profile, User, UserWithPosts, UserWithProfile, UserWithProfileAndPosts, Username,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::posts::posts_by_user;
use super::{DbError, LoadStrategy};

/// User repository
pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user. A taken username is a `Conflict`.
    pub async fn create(&self, username: &Username) -> Result<User, DbError> {
        let user: User =
            sqlx::query_as("INSERT INTO users (username) VALUES (?) RETURNING id, username")
                .bind(username.as_str())
                .fetch_one(self.pool)
                .await
                .map_err(|e| {
                    DbError::from(e).unique_as_conflict("user", || {
                        format!("username '{}' already exists", username.as_str())
                    })
                })?;

        tracing::info!(%user, "Created user");
        Ok(user)
    }

    /// Look a user up by username; `None` when absent.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let user: Option<User> =
            sqlx::query_as("SELECT id, username FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(self.pool)
                .await?;

        match &user {
            Some(user) => tracing::debug!(username, %user, "Found user"),
            None => tracing::debug!(username, "User not found"),
        }
        Ok(user)
    }

    pub async fn get(&self, id: i64) -> Result<User, DbError> {
        sqlx::query_as("SELECT id, username FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    pub async fn list(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as("SELECT id, username FROM users ORDER BY id")
            .fetch_all(self.pool)
            .await?;
        Ok(users)
    }

    /// All users with their profile, joined in a single query.
    pub async fn list_with_profiles(&self) -> Result<Vec<UserWithProfile>, DbError> {
        let rows = sqlx::query(USERS_WITH_PROFILES)
            .fetch_all(self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<_, DbError> {
                let user = user_from_row(row)?;
                let profile = profile_from_row(row, user.id)?;
                Ok(UserWithProfile { user, profile })
            })
            .collect()
    }

    /// All users with their posts, using `strategy`.
    ///
    /// Both strategies yield the same users in id order, posts in id order.
    pub async fn list_with_posts(
        &self,
        strategy: LoadStrategy,
    ) -> Result<Vec<UserWithPosts>, DbError> {
        match strategy {
            LoadStrategy::Joined => self.list_with_posts_joined().await,
            LoadStrategy::SelectIn => self.list_with_posts_selectin().await,
        }
    }

    async fn list_with_posts_joined(&self) -> Result<Vec<UserWithPosts>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.username, p.id AS post_id, p.title, p.body
            FROM users u
            LEFT JOIN posts p ON p.user_id = u.id
            ORDER BY u.id, p.id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        // Rows arrive grouped by user; collapse the repeated parent columns.
        let mut users: Vec<UserWithPosts> = Vec::new();
        for row in &rows {
            let user_id: i64 = row.try_get("id")?;
            if users.last().map(|u| u.user.id) != Some(user_id) {
                users.push(UserWithPosts {
                    user: user_from_row(row)?,
                    posts: Vec::new(),
                });
            }

            if let Some(post_id) = row.try_get::<Option<i64>, _>("post_id")? {
                let post = Post {
                    id: post_id,
                    title: row.try_get("title")?,
                    body: row.try_get("body")?,
                    user_id,
                };
                if let Some(current) = users.last_mut() {
                    current.posts.push(post);
                }
            }
        }

        tracing::debug!(users = users.len(), rows = rows.len(), "Joined-loaded posts");
        Ok(users)
    }

    async fn list_with_posts_selectin(&self) -> Result<Vec<UserWithPosts>, DbError> {
        let users = self.list().await?;
        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        let mut posts = posts_by_user(self.pool, &ids).await?;

        tracing::debug!(users = users.len(), "Select-in loaded posts");
        Ok(users
            .into_iter()
            .map(|user| UserWithPosts {
                posts: posts.remove(&user.id).unwrap_or_default(),
                user,
            })
            .collect())
    }

    /// Profile joined, posts select-in.
    pub async fn list_with_profiles_and_posts(
        &self,
    ) -> Result<Vec<UserWithProfileAndPosts>, DbError> {
        let with_profiles = self.list_with_profiles().await?;
        let ids: Vec<i64> = with_profiles.iter().map(|u| u.user.id).collect();
        let mut posts = posts_by_user(self.pool, &ids).await?;

        Ok(with_profiles
            .into_iter()
            .map(|UserWithProfile { user, profile }| UserWithProfileAndPosts {
                posts: posts.remove(&user.id).unwrap_or_default(),
                user,
                profile,
            })
            .collect())
    }
}

const USERS_WITH_PROFILES: &str = r#"
    SELECT u.id, u.username,
           p.id AS profile_id, p.first_name, p.last_name, p.bio
    FROM users u
    LEFT JOIN profiles p ON p.user_id = u.id
    ORDER BY u.id
"#;

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
    })
}

/// Profile columns of a LEFT JOIN row; `None` when the user has no profile.
fn profile_from_row(row: &SqliteRow, user_id: i64) -> Result<Option<Profile>, sqlx::Error> {
    let Some(id) = row.try_get::<Option<i64>, _>("profile_id")? else {
        return Ok(None);
    };
    Ok(Some(Profile {
        id,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        bio: row.try_get("bio")?,
        user_id,
    }))
}
