//! Listing filters and pagination metadata.
//!
//! A [`Filters`] value is built fresh for each listing request, validated once
//! with [`validate_filters`] and handed to exactly one list query. The query
//! derives a [`Metadata`] from its own window count.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validator::{permitted_values, Validator};

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: i64 = 50_000;

/// Order used when the caller names none.
pub const DEFAULT_ORDER_BY: &str = "-id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub title: String,
    pub lead: String,
    pub post: String,
    pub name: String,
    pub social_platform: String,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub last_updated_from: Option<NaiveDate>,
    pub last_updated_to: Option<NaiveDate>,
    pub order_by: Vec<String>,
    /// Set by the server from the listed entity, never from the request.
    pub order_by_safe_list: &'static [&'static str],
}

impl Filters {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.page_size)
    }
}

/// Run every listing check against `filters`, recording failures in `v`.
pub fn validate_filters(v: &mut Validator, filters: &Filters) {
    v.check(filters.page > 0, "page", "must be greater than zero");
    v.check(filters.page_size > 0, "page_size", "must be greater than zero");
    v.check(
        filters.page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 50,000",
    );

    if let Err(token) = permitted_values(filters.order_by.as_slice(), filters.order_by_safe_list) {
        v.add_error("order_by", format!("invalid order_by parameter: {token}"));
    }
}

/// Build the `ORDER BY` fragment for already validated sort tokens.
///
/// Tokens are trusted verbatim; they must have passed the safe-list check.
pub fn order_by_clause<S: AsRef<str>>(order_by: &[S]) -> String {
    if order_by.is_empty() {
        return "ORDER BY id".to_string();
    }

    let columns: Vec<String> = order_by
        .iter()
        .map(|token| {
            let token = token.as_ref();
            match token.strip_prefix('-') {
                Some(column) => format!("{column} DESC"),
                None => format!("{token} ASC"),
            }
        })
        .collect();

    format!("ORDER BY {}", columns.join(", "))
}

/// Pagination summary of one list query. All zero when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_records: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub order_by: String,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

impl Metadata {
    pub fn calculate<S: AsRef<str>>(
        total_records: i64,
        page: i64,
        page_size: i64,
        order_by: &[S],
    ) -> Self {
        if total_records == 0 || page_size <= 0 {
            return Self::default();
        }

        let order_by: Vec<&str> = order_by.iter().map(AsRef::as_ref).collect();
        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
            order_by: order_by.join(","),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAFE: &[&str] = &["id", "-id", "title", "-title"];

    fn filters(page: i64, page_size: i64, order_by: &[&str]) -> Filters {
        Filters {
            page,
            page_size,
            order_by: order_by.iter().map(|s| s.to_string()).collect(),
            order_by_safe_list: SAFE,
            ..Filters::default()
        }
    }

    fn errors_for(f: &Filters) -> Validator {
        let mut v = Validator::new();
        validate_filters(&mut v, f);
        v
    }

    #[test]
    fn test_valid_filters_pass() {
        assert!(errors_for(&filters(1, 10, &["-id"])).valid());
        assert!(errors_for(&filters(3, MAX_PAGE_SIZE, &["title", "-id"])).valid());
    }

    #[test]
    fn test_page_must_be_positive() {
        for page in [0, -1, i64::MIN] {
            let v = errors_for(&filters(page, 10, &["id"]));
            assert_eq!(v.errors["page"], "must be greater than zero");
        }
    }

    #[test]
    fn test_page_size_bounds() {
        let v = errors_for(&filters(1, 0, &["id"]));
        assert_eq!(v.errors["page_size"], "must be greater than zero");

        let v = errors_for(&filters(1, MAX_PAGE_SIZE + 1, &["id"]));
        assert_eq!(v.errors["page_size"], "must be a maximum of 50,000");
    }

    #[test]
    fn test_all_failures_are_reported_together() {
        let v = errors_for(&filters(0, 0, &["password"]));
        assert_eq!(v.errors.len(), 3);
        assert!(v.errors.contains_key("page"));
        assert!(v.errors.contains_key("page_size"));
        assert!(v.errors["order_by"].contains("password"));
    }

    #[test]
    fn test_unpermitted_token_is_named() {
        let v = errors_for(&filters(1, 10, &["title", "-created", "bogus"]));
        assert_eq!(v.errors["order_by"], "invalid order_by parameter: -created");
    }

    #[test]
    fn test_empty_safe_list_rejects_any_order() {
        let mut f = filters(1, 10, &["id"]);
        f.order_by_safe_list = &[];
        assert!(!errors_for(&f).valid());
    }

    #[test]
    fn test_limit_and_offset() {
        let f = filters(3, 25, &[]);
        assert_eq!(f.limit(), 25);
        assert_eq!(f.offset(), 50);
        assert_eq!(filters(1, 25, &[]).offset(), 0);
    }

    #[test]
    fn test_order_by_clause_default() {
        assert_eq!(order_by_clause::<&str>(&[]), "ORDER BY id");
    }

    #[test]
    fn test_order_by_clause_directions_and_order() {
        assert_eq!(order_by_clause(&["-id"]), "ORDER BY id DESC");
        assert_eq!(
            order_by_clause(&["title", "-created", "id"]),
            "ORDER BY title ASC, created DESC, id ASC"
        );
    }

    #[test]
    fn test_metadata_zero_when_no_records() {
        let m = Metadata::calculate(0, 3, 10, &["-id"]);
        assert_eq!(m, Metadata::default());
        assert!(m.is_empty());
        assert_eq!(serde_json::to_string(&m).unwrap(), "{}");
    }

    #[test]
    fn test_metadata_last_page_rounds_up() {
        assert_eq!(Metadata::calculate(25, 1, 10, &["id"]).last_page, 3);
        assert_eq!(Metadata::calculate(20, 1, 10, &["id"]).last_page, 2);
        assert_eq!(Metadata::calculate(1, 1, 50_000, &["id"]).last_page, 1);
    }

    #[test]
    fn test_metadata_fields() {
        let m = Metadata::calculate(3, 1, 10, &["-id", "title"]);
        assert_eq!(
            m,
            Metadata {
                current_page: 1,
                page_size: 10,
                first_page: 1,
                last_page: 1,
                total_records: 3,
                order_by: "-id,title".to_string(),
            }
        );
    }
}
