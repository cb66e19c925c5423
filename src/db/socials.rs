use super::filters::{Filters, Metadata};
use super::list::{Listable, Predicate};
use super::models::{NewSocial, Social};
use super::{DataError, Store};

impl Listable for Social {
    const TABLE: &'static str = "socials";
    const COLUMNS: &'static str = "id, user_id, social_platform, link";
    const ORDER_BY_SAFE_LIST: &'static [&'static str] = &[
        "id",
        "-id",
        "user_id",
        "-user_id",
        "social_platform",
        "-social_platform",
    ];

    fn predicates(filters: &Filters) -> Vec<Predicate> {
        vec![
            Predicate::Exact {
                column: "id",
                value: filters.id,
            },
            Predicate::Exact {
                column: "user_id",
                value: filters.user_id,
            },
            Predicate::Contains {
                column: "social_platform",
                value: filters.social_platform.clone(),
            },
        ]
    }
}

#[derive(Debug, Clone)]
pub struct SocialModel {
    store: Store,
}

impl SocialModel {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: i64) -> Result<Social, DataError> {
        if id < 1 {
            return Err(DataError::NotFound);
        }

        tracing::debug!(parent: self.store.span(), id, "querying social link");
        self.store
            .run(
                sqlx::query_as::<_, Social>(
                    "SELECT id, user_id, social_platform, link FROM socials WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(self.store.pool()),
            )
            .await?
            .ok_or(DataError::NotFound)
    }

    pub async fn list(&self, filters: &Filters) -> Result<(Vec<Social>, Metadata), DataError> {
        self.store.list(filters).await
    }

    /// All links of one user, in insertion order.
    pub async fn by_user(&self, user_id: i64) -> Result<Vec<Social>, DataError> {
        tracing::debug!(parent: self.store.span(), user_id, "querying social links of user");
        self.store
            .run(
                sqlx::query_as::<_, Social>(
                    r#"
                    SELECT id, user_id, social_platform, link
                    FROM socials
                    WHERE user_id = $1
                    ORDER BY id
                    "#,
                )
                .bind(user_id)
                .fetch_all(self.store.pool()),
            )
            .await
    }

    pub async fn insert(&self, social: &NewSocial) -> Result<Social, DataError> {
        let created = self
            .store
            .run(
                sqlx::query_as::<_, Social>(
                    r#"
                    INSERT INTO socials (user_id, social_platform, link)
                    VALUES ($1, $2, $3)
                    RETURNING id, user_id, social_platform, link
                    "#,
                )
                .bind(social.user_id)
                .bind(&social.social_platform)
                .bind(&social.link)
                .fetch_one(self.store.pool()),
            )
            .await?;

        tracing::info!(
            parent: self.store.span(),
            id = created.id,
            platform = %created.social_platform,
            "social link created"
        );
        Ok(created)
    }
}
