/**
 * Query String Helpers
 * Turn listing query parameters into validated `Filters`
 */
use std::collections::HashMap;

use chrono::NaiveDate;

use crate::db::filters::{validate_filters, Filters, DEFAULT_ORDER_BY, MAX_PAGE_SIZE};
use crate::db::list::Listable;
use crate::error::AppError;
use crate::validator::Validator;

pub type QueryString = HashMap<String, String>;

/// Date format accepted by the `*_from` / `*_to` parameters.
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn read_string(qs: &QueryString, key: &str) -> String {
    qs.get(key).map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Integer parameter; a malformed value records an error and yields `default`.
pub fn read_int(qs: &QueryString, key: &str, default: i64, v: &mut Validator) -> i64 {
    read_optional_int(qs, key, v).unwrap_or(default)
}

pub fn read_optional_int(qs: &QueryString, key: &str, v: &mut Validator) -> Option<i64> {
    let raw = qs.get(key).map(|s| s.trim()).filter(|s| !s.is_empty())?;
    match raw.parse() {
        Ok(i) => Some(i),
        Err(_) => {
            v.add_error(key, "must be an integer value");
            None
        }
    }
}

pub fn read_date(qs: &QueryString, key: &str, v: &mut Validator) -> Option<NaiveDate> {
    let raw = qs.get(key).map(|s| s.trim()).filter(|s| !s.is_empty())?;
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            v.add_error(key, "not a valid date format ('YYYY-MM-DD')");
            None
        }
    }
}

fn has_value(qs: &QueryString, key: &str) -> bool {
    qs.get(key).is_some_and(|s| !s.trim().is_empty())
}

/// Inclusive date range from `{range}_from` / `{range}_to`.
///
/// The older single-date parameter `day` stands for a one day range. It may
/// not be combined with either bound.
pub fn read_date_range(
    qs: &QueryString,
    range: &str,
    day: &str,
    v: &mut Validator,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let from_key = format!("{range}_from");
    let to_key = format!("{range}_to");
    let from = read_date(qs, &from_key, v);
    let to = read_date(qs, &to_key, v);

    if !has_value(qs, day) {
        return (from, to);
    }

    if has_value(qs, &from_key) || has_value(qs, &to_key) {
        v.add_error(day, format!("cannot be combined with {from_key} or {to_key}"));
        return (from, to);
    }

    tracing::debug!(param = day, "single date filter, use {}/{} instead", from_key, to_key);
    let day = read_date(qs, day, v);
    (day, day)
}

/// Comma separated list, trimmed, blanks dropped, and deduplicated by the
/// name without its `-` prefix (first occurrence wins).
pub fn read_comma_separated(qs: &QueryString, key: &str, default: &str) -> Vec<String> {
    let raw = qs.get(key).map(|s| s.trim()).unwrap_or_default();
    if raw.is_empty() {
        return vec![default.to_string()];
    }

    let mut seen: Vec<&str> = Vec::new();
    let mut values = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let name = token.trim_start_matches('-');
        if !seen.contains(&name) {
            seen.push(name);
            values.push(token.to_string());
        }
    }

    values
}

/// Build and validate the listing filters of entity `T` from a query string.
pub fn list_filters<T: Listable>(qs: &QueryString) -> Result<Filters, AppError> {
    let mut v = Validator::new();

    let (created_from, created_to) = read_date_range(qs, "created", "created", &mut v);
    let (last_updated_from, last_updated_to) = read_date_range(qs, "last_updated", "last_update", &mut v);

    let filters = Filters {
        page: read_int(qs, "page", 1, &mut v),
        page_size: read_int(qs, "page_size", MAX_PAGE_SIZE, &mut v),
        id: read_optional_int(qs, "id", &mut v),
        user_id: read_optional_int(qs, "user_id", &mut v),
        title: read_string(qs, "title"),
        lead: read_string(qs, "lead"),
        post: read_string(qs, "post"),
        name: read_string(qs, "name"),
        social_platform: read_string(qs, "social_platform"),
        created_from,
        created_to,
        last_updated_from,
        last_updated_to,
        order_by: read_comma_separated(qs, "order_by", DEFAULT_ORDER_BY),
        order_by_safe_list: T::ORDER_BY_SAFE_LIST,
    };

    validate_filters(&mut v, &filters);
    if !v.valid() {
        tracing::debug!(errors = ?v.errors, "listing filters rejected");
        return Err(AppError::FailedValidation(v.into_errors()));
    }

    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{BlogPost, Social};

    fn qs(pairs: &[(&str, &str)]) -> QueryString {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_comma_separated_dedupes_by_column() {
        let values = read_comma_separated(&qs(&[("order_by", "-id, title,,id,-title")]), "order_by", "-id");
        assert_eq!(values, vec!["-id", "title"]);
    }

    #[test]
    fn test_comma_separated_default() {
        assert_eq!(read_comma_separated(&qs(&[]), "order_by", "-id"), vec!["-id"]);
        assert_eq!(read_comma_separated(&qs(&[("order_by", "  ")]), "order_by", "-id"), vec!["-id"]);
    }

    #[test]
    fn test_defaults() {
        let filters = list_filters::<BlogPost>(&qs(&[])).unwrap();
        assert_eq!(filters.page, 1);
        assert_eq!(filters.page_size, MAX_PAGE_SIZE);
        assert_eq!(filters.order_by, vec!["-id"]);
        assert_eq!(filters.id, None);
        assert_eq!(filters.order_by_safe_list, BlogPost::ORDER_BY_SAFE_LIST);
    }

    #[test]
    fn test_bad_integer_is_a_field_error() {
        let err = list_filters::<BlogPost>(&qs(&[("page", "two")])).unwrap_err();
        match err {
            AppError::FailedValidation(errors) => {
                assert_eq!(errors["page"], "must be an integer value");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_page_and_order_are_reported_together() {
        let err = list_filters::<BlogPost>(&qs(&[("page", "0"), ("order_by", "lead")])).unwrap_err();
        match err {
            AppError::FailedValidation(errors) => {
                assert!(errors.contains_key("page"));
                assert_eq!(errors["order_by"], "invalid order_by parameter: lead");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_safe_list_follows_entity() {
        assert!(list_filters::<Social>(&qs(&[("order_by", "user_id")])).is_ok());
        assert!(list_filters::<BlogPost>(&qs(&[("order_by", "user_id")])).is_err());
    }

    #[test]
    fn test_date_range() {
        let filters = list_filters::<BlogPost>(&qs(&[
            ("created_from", "2024-01-01"),
            ("last_update", "2024-02-03"),
        ]))
        .unwrap();
        assert_eq!(filters.created_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filters.created_to, None);
        assert_eq!(filters.last_updated_from, NaiveDate::from_ymd_opt(2024, 2, 3));
        assert_eq!(filters.last_updated_to, NaiveDate::from_ymd_opt(2024, 2, 3));
    }

    #[test]
    fn test_last_updated_range_pair() {
        let filters = list_filters::<BlogPost>(&qs(&[("last_updated_to", "2024-03-01")])).unwrap();
        assert_eq!(filters.last_updated_from, None);
        assert_eq!(filters.last_updated_to, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_single_date_with_range_bound_is_a_field_error() {
        let err = list_filters::<BlogPost>(&qs(&[
            ("created", "2024-01-05"),
            ("created_from", "2024-01-01"),
        ]))
        .unwrap_err();
        match err {
            AppError::FailedValidation(e) => assert_eq!(
                e["created"],
                "cannot be combined with created_from or created_to"
            ),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = list_filters::<BlogPost>(&qs(&[
            ("last_update", "2024-01-05"),
            ("last_updated_to", "2024-01-09"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::FailedValidation(e) if e.contains_key("last_update")));
    }

    #[test]
    fn test_bad_date_is_a_field_error() {
        let err = list_filters::<BlogPost>(&qs(&[("created_to", "03/02/2024")])).unwrap_err();
        assert!(matches!(err, AppError::FailedValidation(e) if e.contains_key("created_to")));
    }
}
