//! Generic filtered, paginated listing.
//!
//! Every listable entity describes itself through [`Listable`]: its table,
//! the columns it decodes from, the sort tokens it permits and how the
//! shared [`Filters`] map onto predicates over its columns. The SQL for all
//! entities is assembled here, in one place.

use chrono::NaiveDate;
use sqlx::{postgres::PgRow, FromRow, Postgres, QueryBuilder, Row};

use super::filters::{order_by_clause, Filters, Metadata};

/// Name of the window-count column added to every listing query.
const TOTAL_RECORDS: &str = "total_records";

/// A single filter condition over one column.
///
/// Each predicate is NULL tolerant: it evaluates to true when the filter value
/// is unset (`None`, or an empty string for text filters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `column = value`
    Exact {
        column: &'static str,
        value: Option<i64>,
    },
    /// Case-insensitive substring match.
    Contains {
        column: &'static str,
        value: String,
    },
    /// Inclusive date range over a timestamp column.
    DateRange {
        column: &'static str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

pub trait Listable: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static {
    const TABLE: &'static str;
    /// Comma separated column list, decodable by the `FromRow` impl.
    const COLUMNS: &'static str;
    /// Every sort token a caller may request, both directions.
    const ORDER_BY_SAFE_LIST: &'static [&'static str];

    fn predicates(filters: &Filters) -> Vec<Predicate>;
}

/// A decoded row together with the window count read from the same row.
#[derive(Debug)]
pub struct Counted<T> {
    pub total_records: i64,
    pub item: T,
}

impl<'r, T> FromRow<'r, PgRow> for Counted<T>
where
    T: FromRow<'r, PgRow>,
{
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            total_records: row.try_get(TOTAL_RECORDS)?,
            item: T::from_row(row)?,
        })
    }
}

fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: Predicate) {
    match predicate {
        Predicate::Exact { column, value } => {
            qb.push("(");
            qb.push_bind(value);
            qb.push("::BIGINT IS NULL OR ");
            qb.push(column);
            qb.push(" = ");
            qb.push_bind(value);
            qb.push(")");
        }
        Predicate::Contains { column, value } => {
            qb.push("(");
            qb.push_bind(value.clone());
            qb.push(" = '' OR strpos(lower(");
            qb.push(column);
            qb.push("), lower(");
            qb.push_bind(value);
            qb.push(")) > 0)");
        }
        Predicate::DateRange { column, from, to } => {
            qb.push("(");
            qb.push_bind(from);
            qb.push("::DATE IS NULL OR ");
            qb.push(column);
            qb.push("::DATE >= ");
            qb.push_bind(from);
            qb.push(") AND (");
            qb.push_bind(to);
            qb.push("::DATE IS NULL OR ");
            qb.push(column);
            qb.push("::DATE <= ");
            qb.push_bind(to);
            qb.push(")");
        }
    }
}

/// Assemble the single round-trip listing query for `T`.
///
/// `filters` must already have passed validation: its sort tokens are pasted
/// into the statement as they are.
pub fn build_list_query<'args, T: Listable>(filters: &Filters) -> QueryBuilder<'args, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT COUNT(*) OVER() AS {TOTAL_RECORDS}, {} FROM {}",
        T::COLUMNS,
        T::TABLE
    ));

    for (i, predicate) in T::predicates(filters).into_iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        push_predicate(&mut qb, predicate);
    }

    qb.push(" ");
    qb.push(order_by_clause(filters.order_by.as_slice()));
    qb.push(" LIMIT ");
    qb.push_bind(filters.limit());
    qb.push(" OFFSET ");
    qb.push_bind(filters.offset());

    qb
}

/// Split decoded rows into entities and the page metadata.
///
/// Row order is preserved. No rows means a zero metadata value.
pub fn collect_page<T>(rows: Vec<Counted<T>>, filters: &Filters) -> (Vec<T>, Metadata) {
    let total_records = rows.first().map_or(0, |row| row.total_records);
    let items = rows.into_iter().map(|row| row.item).collect();
    let metadata = Metadata::calculate(
        total_records,
        filters.page,
        filters.page_size,
        filters.order_by.as_slice(),
    );
    (items, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, sqlx::FromRow)]
    struct Note {
        id: i64,
    }

    impl Listable for Note {
        const TABLE: &'static str = "notes";
        const COLUMNS: &'static str = "id, body, created";
        const ORDER_BY_SAFE_LIST: &'static [&'static str] = &["id", "-id"];

        fn predicates(filters: &Filters) -> Vec<Predicate> {
            vec![
                Predicate::Exact {
                    column: "id",
                    value: filters.id,
                },
                Predicate::Contains {
                    column: "body",
                    value: filters.post.clone(),
                },
                Predicate::DateRange {
                    column: "created",
                    from: filters.created_from,
                    to: filters.created_to,
                },
            ]
        }
    }

    fn filters(order_by: &[&str]) -> Filters {
        Filters {
            page: 2,
            page_size: 10,
            order_by: order_by.iter().map(|s| s.to_string()).collect(),
            order_by_safe_list: Note::ORDER_BY_SAFE_LIST,
            ..Filters::default()
        }
    }

    #[test]
    fn test_list_query_shape() {
        let qb = build_list_query::<Note>(&filters(&["-id"]));
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) OVER() AS total_records, id, body, created FROM notes \
             WHERE ($1::BIGINT IS NULL OR id = $2) \
             AND ($3 = '' OR strpos(lower(body), lower($4)) > 0) \
             AND ($5::DATE IS NULL OR created::DATE >= $6) AND ($7::DATE IS NULL OR created::DATE <= $8) \
             ORDER BY id DESC LIMIT $9 OFFSET $10"
        );
    }

    #[test]
    fn test_list_query_defaults_to_id_order() {
        let qb = build_list_query::<Note>(&filters(&[]));
        assert!(qb.sql().contains(" ORDER BY id LIMIT "));
    }

    #[test]
    fn test_list_query_keeps_sort_precedence() {
        let qb = build_list_query::<Note>(&filters(&["id", "-id"]));
        assert!(qb.sql().contains("ORDER BY id ASC, id DESC LIMIT"));
    }

    #[test]
    fn test_collect_page_preserves_order_and_counts() {
        let rows = vec![
            Counted { total_records: 3, item: Note { id: 3 } },
            Counted { total_records: 3, item: Note { id: 2 } },
            Counted { total_records: 3, item: Note { id: 1 } },
        ];
        let mut f = filters(&["-id"]);
        f.page = 1;

        let (notes, metadata) = collect_page(rows, &f);
        let ids: Vec<i64> = notes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(
            metadata,
            Metadata {
                current_page: 1,
                page_size: 10,
                first_page: 1,
                last_page: 1,
                total_records: 3,
                order_by: "-id".to_string(),
            }
        );
    }

    #[test]
    fn test_collect_page_empty_is_zero_metadata() {
        let mut f = filters(&["-id"]);
        f.page = 10;
        let (notes, metadata) = collect_page::<Note>(Vec::new(), &f);
        assert!(notes.is_empty());
        assert!(metadata.is_empty());
    }
}
