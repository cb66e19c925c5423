use super::filters::{Filters, Metadata};
use super::list::{Listable, Predicate};
use super::models::{BlogPost, NewBlogPost, UpdateBlogPost};
use super::{DataError, Store};

const COLUMNS: &str = "id, title, lead, post, created, last_update";

impl Listable for BlogPost {
    const TABLE: &'static str = "posts";
    const COLUMNS: &'static str = COLUMNS;
    const ORDER_BY_SAFE_LIST: &'static [&'static str] = &[
        "id",
        "-id",
        "title",
        "-title",
        "created",
        "-created",
        "last_update",
        "-last_update",
    ];

    fn predicates(filters: &Filters) -> Vec<Predicate> {
        vec![
            Predicate::Exact {
                column: "id",
                value: filters.id,
            },
            Predicate::Contains {
                column: "title",
                value: filters.title.clone(),
            },
            Predicate::Contains {
                column: "lead",
                value: filters.lead.clone(),
            },
            Predicate::Contains {
                column: "post",
                value: filters.post.clone(),
            },
            Predicate::DateRange {
                column: "created",
                from: filters.created_from,
                to: filters.created_to,
            },
            Predicate::DateRange {
                column: "last_update",
                from: filters.last_updated_from,
                to: filters.last_updated_to,
            },
        ]
    }
}

#[derive(Debug, Clone)]
pub struct PostModel {
    store: Store,
}

impl PostModel {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: i64) -> Result<BlogPost, DataError> {
        if id < 1 {
            return Err(DataError::NotFound);
        }

        tracing::debug!(parent: self.store.span(), id, "querying blog post");
        self.store
            .run(
                sqlx::query_as::<_, BlogPost>(&format!("SELECT {COLUMNS} FROM posts WHERE id = $1"))
                    .bind(id)
                    .fetch_optional(self.store.pool()),
            )
            .await?
            .ok_or(DataError::NotFound)
    }

    pub async fn list(&self, filters: &Filters) -> Result<(Vec<BlogPost>, Metadata), DataError> {
        self.store.list(filters).await
    }

    /// The `limit` newest posts, newest first.
    pub async fn latest(&self, limit: i64) -> Result<Vec<BlogPost>, DataError> {
        tracing::debug!(parent: self.store.span(), limit, "querying latest blog posts");
        self.store
            .run(
                sqlx::query_as::<_, BlogPost>(&format!(
                    "SELECT {COLUMNS} FROM posts ORDER BY id DESC LIMIT $1"
                ))
                .bind(limit)
                .fetch_all(self.store.pool()),
            )
            .await
    }

    pub async fn insert(&self, post: &NewBlogPost) -> Result<BlogPost, DataError> {
        let created = self
            .store
            .run(
                sqlx::query_as::<_, BlogPost>(&format!(
                    "INSERT INTO posts (title, lead, post) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
                ))
                .bind(&post.title)
                .bind(&post.lead)
                .bind(&post.post)
                .fetch_one(self.store.pool()),
            )
            .await?;

        tracing::info!(parent: self.store.span(), id = created.id, title = %created.title, "blog post created");
        Ok(created)
    }

    /// Replace the content of post `id`. Returns the number of rows changed.
    pub async fn update(&self, id: i64, post: &UpdateBlogPost) -> Result<u64, DataError> {
        if id < 1 {
            return Err(DataError::NotFound);
        }

        let result = self
            .store
            .run(
                sqlx::query(
                    r#"
                    UPDATE posts
                    SET title = $2, lead = $3, post = $4, last_update = now()
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(&post.title)
                .bind(&post.lead)
                .bind(&post.post)
                .execute(self.store.pool()),
            )
            .await?;

        match result.rows_affected() {
            0 => Err(DataError::NotFound),
            n => {
                tracing::info!(parent: self.store.span(), id, "blog post updated");
                Ok(n)
            }
        }
    }

    pub async fn delete(&self, id: i64) -> Result<u64, DataError> {
        if id < 1 {
            return Err(DataError::NotFound);
        }

        let result = self
            .store
            .run(
                sqlx::query("DELETE FROM posts WHERE id = $1")
                    .bind(id)
                    .execute(self.store.pool()),
            )
            .await?;

        match result.rows_affected() {
            0 => Err(DataError::NotFound),
            n => {
                tracing::info!(parent: self.store.span(), id, "blog post deleted");
                Ok(n)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;
    use chrono::NaiveDate;

    #[test]
    fn test_safe_list_has_both_directions() {
        for token in BlogPost::ORDER_BY_SAFE_LIST {
            let flipped = match token.strip_prefix('-') {
                Some(column) => column.to_string(),
                None => format!("-{token}"),
            };
            assert!(BlogPost::ORDER_BY_SAFE_LIST.contains(&flipped.as_str()));
        }
    }

    #[test]
    fn test_lead_is_not_sortable() {
        let filters = Filters {
            page: 1,
            page_size: 10,
            order_by: vec!["lead".to_string()],
            order_by_safe_list: BlogPost::ORDER_BY_SAFE_LIST,
            ..Filters::default()
        };
        let mut v = Validator::new();
        crate::db::filters::validate_filters(&mut v, &filters);
        assert!(v.errors["order_by"].contains("lead"));
    }

    #[test]
    fn test_predicates_map_filters_to_columns() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1);
        let filters = Filters {
            id: Some(7),
            title: "rust".to_string(),
            created_from: from,
            ..Filters::default()
        };
        let predicates = BlogPost::predicates(&filters);

        assert_eq!(predicates.len(), 6);
        assert_eq!(
            predicates[0],
            Predicate::Exact {
                column: "id",
                value: Some(7)
            }
        );
        assert_eq!(
            predicates[1],
            Predicate::Contains {
                column: "title",
                value: "rust".to_string()
            }
        );
        assert_eq!(
            predicates[4],
            Predicate::DateRange {
                column: "created",
                from,
                to: None
            }
        );
    }
}
