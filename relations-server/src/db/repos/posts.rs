//! Post repository
//!
//! Posts belong to exactly one user (`posts.user_id NOT NULL`).

use std::collections::HashMap;

use relations_core::{Post, PostTitle, PostWithAuthor, User};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::DbError;

/// Post repository
pub struct PostRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PostRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create one post per title for `user_id`, atomically.
    ///
    /// A missing user is `NotFound` and leaves no posts behind.
    pub async fn create_many(
        &self,
        user_id: i64,
        titles: &[PostTitle],
    ) -> Result<Vec<Post>, DbError> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut posts = Vec::with_capacity(titles.len());

        for title in titles {
            let post: Post = sqlx::query_as(
                r#"
                INSERT INTO posts (title, user_id)
                VALUES (?, ?)
                RETURNING id, title, body, user_id
                "#,
            )
            .bind(title.as_str())
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DbError::from(e).foreign_key_as_not_found("user", user_id))?;
            posts.push(post);
        }

        tx.commit().await?;
        tracing::info!(user_id, count = posts.len(), "Created posts");
        Ok(posts)
    }

    /// All posts with their author, joined, in post id order.
    pub async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.title, p.body, p.user_id, u.username
            FROM posts p
            JOIN users u ON u.id = p.user_id
            ORDER BY p.id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<_, DbError> {
                let post = Post {
                    id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    body: row.try_get("body")?,
                    user_id: row.try_get("user_id")?,
                };
                let author = User {
                    id: post.user_id,
                    username: row.try_get("username")?,
                };
                Ok(PostWithAuthor { post, author })
            })
            .collect()
    }
}

/// Select-in load: posts of every user in `user_ids`, keyed by user id.
///
/// Each user's posts are in id order. Users without posts have no entry.
pub(crate) async fn posts_by_user(
    pool: &SqlitePool,
    user_ids: &[i64],
) -> Result<HashMap<i64, Vec<Post>>, DbError> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query =
        QueryBuilder::<Sqlite>::new("SELECT id, title, body, user_id FROM posts WHERE user_id IN (");
    let mut ids = query.separated(", ");
    for id in user_ids {
        ids.push_bind(*id);
    }
    ids.push_unseparated(") ORDER BY id");

    let posts: Vec<Post> = query.build_query_as().fetch_all(pool).await?;

    let mut grouped: HashMap<i64, Vec<Post>> = HashMap::new();
    for post in posts {
        grouped.entry(post.user_id).or_default().push(post);
    }
    Ok(grouped)
}
