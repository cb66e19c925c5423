use super::filters::{Filters, Metadata};
use super::list::{Listable, Predicate};
use super::models::{UpdateUser, User};
use super::{DataError, Store};

impl Listable for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static str = "id, name, summary, content";
    const ORDER_BY_SAFE_LIST: &'static [&'static str] = &["id", "-id", "name", "-name"];

    fn predicates(filters: &Filters) -> Vec<Predicate> {
        vec![
            Predicate::Exact {
                column: "id",
                value: filters.id,
            },
            Predicate::Contains {
                column: "name",
                value: filters.name.clone(),
            },
        ]
    }
}

#[derive(Debug, Clone)]
pub struct UserModel {
    store: Store,
}

impl UserModel {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: i64) -> Result<User, DataError> {
        if id < 1 {
            return Err(DataError::NotFound);
        }

        tracing::debug!(parent: self.store.span(), id, "querying user");
        self.store
            .run(
                sqlx::query_as::<_, User>(
                    "SELECT id, name, summary, content FROM users WHERE id = $1 LIMIT 1",
                )
                .bind(id)
                .fetch_optional(self.store.pool()),
            )
            .await?
            .ok_or(DataError::NotFound)
    }

    pub async fn list(&self, filters: &Filters) -> Result<(Vec<User>, Metadata), DataError> {
        self.store.list(filters).await
    }

    pub async fn update(&self, id: i64, user: &UpdateUser) -> Result<u64, DataError> {
        if id < 1 {
            return Err(DataError::NotFound);
        }

        let result = self
            .store
            .run(
                sqlx::query("UPDATE users SET name = $2, summary = $3, content = $4 WHERE id = $1")
                    .bind(id)
                    .bind(&user.name)
                    .bind(&user.summary)
                    .bind(&user.content)
                    .execute(self.store.pool()),
            )
            .await?;

        match result.rows_affected() {
            0 => Err(DataError::NotFound),
            n => {
                tracing::info!(parent: self.store.span(), id, "user updated");
                Ok(n)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_filter_is_substring_predicate() {
        let filters = Filters {
            name: "ada".to_string(),
            ..Filters::default()
        };
        assert!(User::predicates(&filters).contains(&Predicate::Contains {
            column: "name",
            value: "ada".to_string(),
        }));
    }
}
