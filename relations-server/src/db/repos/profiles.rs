//! Profile repository
//!
//! A user has at most one profile (`profiles.user_id UNIQUE`).

use relations_core::{PersonName, Profile, ProfileWithUserAndPosts, User};
use sqlx::{Row, SqlitePool};

use super::posts::posts_by_user;
use super::DbError;

/// Profile repository
pub struct ProfileRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProfileRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the profile for `user_id`.
    ///
    /// A second profile for the same user is a `Conflict`; an unknown user is
    /// `NotFound`.
    pub async fn create(
        &self,
        user_id: i64,
        first_name: Option<&PersonName>,
        last_name: Option<&PersonName>,
    ) -> Result<Profile, DbError> {
        let profile: Profile = sqlx::query_as(
            r#"
            INSERT INTO profiles (user_id, first_name, last_name)
            VALUES (?, ?, ?)
            RETURNING id, first_name, last_name, bio, user_id
            "#,
        )
        .bind(user_id)
        .bind(first_name.map(PersonName::as_str))
        .bind(last_name.map(PersonName::as_str))
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            DbError::from(e)
                .unique_as_conflict("profile", || format!("user {user_id} already has a profile"))
                .foreign_key_as_not_found("user", user_id)
        })?;

        tracing::info!(%profile, "Created profile");
        Ok(profile)
    }

    pub async fn get_for_user(&self, user_id: i64) -> Result<Option<Profile>, DbError> {
        let profile = sqlx::query_as(
            "SELECT id, first_name, last_name, bio, user_id FROM profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(profile)
    }

    /// Profiles of users named `username`, user joined, the user's posts
    /// select-in, in profile id order.
    pub async fn list_with_user_and_posts(
        &self,
        username: &str,
    ) -> Result<Vec<ProfileWithUserAndPosts>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT pr.id, pr.first_name, pr.last_name, pr.bio, pr.user_id, u.username
            FROM profiles pr
            JOIN users u ON u.id = pr.user_id
            WHERE u.username = ?
            ORDER BY pr.id
            "#,
        )
        .bind(username)
        .fetch_all(self.pool)
        .await?;

        let mut loaded = Vec::with_capacity(rows.len());
        for row in &rows {
            let profile = Profile {
                id: row.try_get("id")?,
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                bio: row.try_get("bio")?,
                user_id: row.try_get("user_id")?,
            };
            let user = User {
                id: profile.user_id,
                username: row.try_get("username")?,
            };
            loaded.push((profile, user));
        }

        let user_ids: Vec<i64> = loaded.iter().map(|(_, user)| user.id).collect();
        let mut posts = posts_by_user(self.pool, &user_ids).await?;

        Ok(loaded
            .into_iter()
            .map(|(profile, user)| ProfileWithUserAndPosts {
                posts: posts.remove(&user.id).unwrap_or_default(),
                profile,
                user,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::db::{PostRepo, UserRepo};
    use relations_core::{PostTitle, Username};

    fn person(s: &str) -> PersonName {
        PersonName::new(s).unwrap()
    }

    #[tokio::test]
    async fn create_profile() {
        let pool = test_pool().await;
        let sam = UserRepo::new(&pool)
            .create(&Username::new("sam").unwrap())
            .await
            .unwrap();

        let repo = ProfileRepo::new(&pool);
        let profile = repo
            .create(sam.id, Some(&person("Sam")), Some(&person("White")))
            .await
            .unwrap();
        assert_eq!(profile.user_id, sam.id);
        assert_eq!(profile.first_name.as_deref(), Some("Sam"));
        assert_eq!(profile.bio, None);

        assert_eq!(repo.get_for_user(sam.id).await.unwrap(), Some(profile));
    }

    #[tokio::test]
    async fn one_profile_per_user() {
        let pool = test_pool().await;
        let john = UserRepo::new(&pool)
            .create(&Username::new("john").unwrap())
            .await
            .unwrap();

        let repo = ProfileRepo::new(&pool);
        repo.create(john.id, Some(&person("John")), None)
            .await
            .unwrap();
        let err = repo.create(john.id, None, None).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { resource: "profile", .. }));
    }

    #[tokio::test]
    async fn profile_needs_user() {
        let pool = test_pool().await;
        let err = ProfileRepo::new(&pool)
            .create(7, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "user", .. }));
    }

    #[tokio::test]
    async fn profiles_filtered_by_username() {
        let pool = test_pool().await;
        let users = UserRepo::new(&pool);
        let john = users.create(&Username::new("john").unwrap()).await.unwrap();
        let sam = users.create(&Username::new("sam").unwrap()).await.unwrap();

        let profiles = ProfileRepo::new(&pool);
        profiles
            .create(john.id, Some(&person("John")), None)
            .await
            .unwrap();
        profiles
            .create(sam.id, Some(&person("Sam")), None)
            .await
            .unwrap();
        PostRepo::new(&pool)
            .create_many(
                john.id,
                &[PostTitle::new("SQLA").unwrap(), PostTitle::new("SQLA Joins").unwrap()],
            )
            .await
            .unwrap();

        let loaded = profiles.list_with_user_and_posts("john").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].user, john);
        assert_eq!(loaded[0].profile.first_name.as_deref(), Some("John"));
        assert_eq!(loaded[0].posts.len(), 2);

        assert!(profiles
            .list_with_user_and_posts("bob")
            .await
            .unwrap()
            .is_empty());
    }
}
