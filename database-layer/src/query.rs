//! Query builder utilities for filtered listings
//!
//! Consultation and ordonnance listings share the same optional filters
//! (doctor, patient, inclusive date range). This wraps `sqlx::QueryBuilder`
//! so each filter only adds a clause when a value is present.

use crate::models::VisitFilter;
use chrono::NaiveDate;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{Postgres, QueryBuilder};

/// Example usage:
/// ```rust,ignore
/// let mut query = FilteredQuery::new("SELECT * FROM consultations WHERE 1=1");
/// query
///     .filter_eq("doctor_id", Some(3))
///     .filter_from("date", Some(from))
///     .order_by("date ASC, hour ASC");
/// let rows: Vec<Consultation> = query.build_query_as().fetch_all(&pool).await?;
/// ```
pub struct FilteredQuery<'a> {
    query: QueryBuilder<'a, Postgres>,
}

impl<'a> FilteredQuery<'a> {
    /// `base_query` must already contain a WHERE clause; filters are appended with AND.
    pub fn new(base_query: &'static str) -> Self {
        Self {
            query: QueryBuilder::new(base_query),
        }
    }

    /// Add an equality filter (only if value is Some)
    pub fn filter_eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + Sync + 'a,
    {
        if let Some(val) = value {
            self.query.push(format!(" AND {} = ", column));
            self.query.push_bind(val);
        }
        self
    }

    /// Lower date bound, inclusive
    pub fn filter_from(&mut self, column: &str, value: Option<NaiveDate>) -> &mut Self {
        if let Some(val) = value {
            self.query.push(format!(" AND {} >= ", column));
            self.query.push_bind(val);
        }
        self
    }

    /// Upper date bound, inclusive
    pub fn filter_to(&mut self, column: &str, value: Option<NaiveDate>) -> &mut Self {
        if let Some(val) = value {
            self.query.push(format!(" AND {} <= ", column));
            self.query.push_bind(val);
        }
        self
    }

    /// Apply every clause of a [`VisitFilter`] against `prefix`-qualified columns.
    pub fn filter_visits(&mut self, prefix: &str, filter: &VisitFilter) -> &mut Self {
        self.filter_eq(&format!("{prefix}doctor_id"), filter.doctor_id)
            .filter_eq(&format!("{prefix}patient_id"), filter.patient_id)
            .filter_from(&format!("{prefix}date"), filter.from)
            .filter_to(&format!("{prefix}date"), filter.to)
    }

    /// Add ORDER BY clause
    pub fn order_by(&mut self, ordering: &str) -> &mut Self {
        self.query.push(format!(" ORDER BY {}", ordering));
        self
    }

    /// Build the final query as a typed query for fetching specific types
    pub fn build_query_as<T>(&mut self) -> QueryAs<'_, Postgres, T, PgArguments>
    where
        T: for<'r> sqlx::FromRow<'r, PgRow>,
    {
        self.query.build_query_as()
    }

    /// SQL text built so far
    pub fn sql(&self) -> &str {
        self.query.sql()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_adds_no_clause() {
        let mut query = FilteredQuery::new("SELECT * FROM consultations WHERE 1=1");
        query.filter_visits("", &VisitFilter::default());
        assert_eq!(query.sql(), "SELECT * FROM consultations WHERE 1=1");
    }

    #[test]
    fn filters_bind_in_declaration_order() {
        let mut query = FilteredQuery::new("SELECT * FROM ordonnances o WHERE 1=1");
        query
            .filter_visits(
                "o.",
                &VisitFilter {
                    doctor_id: Some(4),
                    patient_id: None,
                    from: NaiveDate::from_ymd_opt(2025, 1, 1),
                    to: NaiveDate::from_ymd_opt(2025, 1, 31),
                },
            )
            .order_by("o.date ASC, o.id ASC");
        assert_eq!(
            query.sql(),
            "SELECT * FROM ordonnances o WHERE 1=1 AND o.doctor_id = $1 AND o.date >= $2 \
             AND o.date <= $3 ORDER BY o.date ASC, o.id ASC"
        );
    }
}
