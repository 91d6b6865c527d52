//! Corpus filters and the parameterized population query

use super::schema::{insert_docs_head_sql, FIELD_DATE, FIELD_TYPE};
use crate::config::{default_from_date, default_to_date};
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use std::str::FromStr;
use std::sync::OnceLock;

/// DSpace item types accepted by the corpus filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    Article,
    Thesis,
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemType::Article => write!(f, "Article"),
            ItemType::Thesis => write!(f, "Thesis"),
        }
    }
}

impl FromStr for ItemType {
    type Err = Error;

    /// Exact, case-sensitive match against the `dc.type` values
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Article" => Ok(ItemType::Article),
            "Thesis" => Ok(ItemType::Thesis),
            _ => Err(Error::InvalidArgument(format!(
                "the type must be \"Article\" or \"Thesis\", got '{}'",
                s
            ))),
        }
    }
}

fn collection_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w\-]+$").unwrap())
}

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}").unwrap())
}

/// Validate a collection identifier (word and hyphen characters only)
pub fn validate_collection(value: &str) -> Result<String> {
    if collection_regex().is_match(value) {
        Ok(value.to_string())
    } else {
        Err(Error::InvalidArgument(format!(
            "the collection uuid must be a uuid, got '{}'",
            value
        )))
    }
}

/// Validate a date bound; it must start with a four-digit year
pub fn validate_year(value: &str) -> Result<String> {
    if year_regex().is_match(value) {
        Ok(value.to_string())
    } else {
        Err(Error::InvalidArgument(format!(
            "dates must be at least a year (YYYY), got '{}'",
            value
        )))
    }
}

/// Half-open range `[from, to)` compared against `dc.date.issued` text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: String,
    pub to: String,
}

impl DateRange {
    pub fn new(from: &str, to: &str) -> Result<Self> {
        Ok(Self {
            from: validate_year(from)?,
            to: validate_year(to)?,
        })
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            from: default_from_date(),
            to: default_to_date(),
        }
    }
}

/// Optional filters applied while populating the corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusFilter {
    /// Owning collection uuid
    pub collection: Option<String>,
    /// Issue date range
    pub dates: DateRange,
    /// Item type
    pub item_type: Option<ItemType>,
}

impl CorpusFilter {
    /// Build the population query with every filter value bound as a parameter
    pub fn insert_query(&self, table: &str) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(insert_docs_head_sql(table));

        if let Some(collection) = &self.collection {
            qb.push(" AND i.owning_collection::text = ")
                .push_bind(collection.clone());
        }

        qb.push(format!(" AND date.metadata_field_id = {FIELD_DATE}"));
        qb.push(" AND date.text_value >= ")
            .push_bind(self.dates.from.clone());
        qb.push(" AND date.text_value < ")
            .push_bind(self.dates.to.clone());

        if let Some(item_type) = self.item_type {
            qb.push(format!(" AND type.metadata_field_id = {FIELD_TYPE}"));
            qb.push(" AND type.text_value = ")
                .push_bind(item_type.to_string());
        }

        qb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_type_parse() {
        assert_eq!("Article".parse::<ItemType>().unwrap(), ItemType::Article);
        assert_eq!("Thesis".parse::<ItemType>().unwrap(), ItemType::Thesis);
        assert!("Report".parse::<ItemType>().is_err());
        assert!("article".parse::<ItemType>().is_err());
    }

    #[test]
    fn test_collection_validation() {
        assert!(validate_collection("1c2d9a4e-08f2-4a55-9d4b-3f1e7f0a0b11").is_ok());
        assert!(validate_collection("abc_123").is_ok());
        assert!(validate_collection("abc' OR '1'='1").is_err());
        assert!(validate_collection("").is_err());
    }

    #[test]
    fn test_year_validation() {
        assert!(validate_year("2015").is_ok());
        assert!(validate_year("2015-06").is_ok());
        assert!(validate_year("15").is_err());
        assert!(validate_year("last year").is_err());
    }

    #[test]
    fn test_date_range_validates_both_bounds() {
        let dates = DateRange::new("2015", "2020").unwrap();
        assert_eq!(dates.from, "2015");
        assert_eq!(dates.to, "2020");

        assert!(matches!(
            DateRange::new("15", "2020"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            DateRange::new("2015", "soon"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_default_filter_sql() {
        let filter = CorpusFilter::default();
        assert_eq!(filter.dates.from, "2012");
        assert_eq!(filter.dates.to, "2022");

        let qb = filter.insert_query("docs");
        let sql = qb.sql();
        assert!(sql.starts_with("INSERT INTO docs(resource_id, title, abstract)"));
        assert!(sql.contains("date.metadata_field_id = 15"));
        assert!(sql.contains("date.text_value >= $1"));
        assert!(sql.contains("date.text_value < $2"));
        assert!(!sql.contains("owning_collection"));
        assert!(!sql.contains("type.metadata_field_id"));
    }

    #[test]
    fn test_all_filters_are_bound() {
        let filter = CorpusFilter {
            collection: Some("abc-123".to_string()),
            dates: DateRange::new("2015", "2020").unwrap(),
            item_type: Some(ItemType::Thesis),
        };

        let qb = filter.insert_query("docs");
        let sql = qb.sql();
        assert!(sql.contains("i.owning_collection::text = $1"));
        assert!(sql.contains("date.text_value >= $2"));
        assert!(sql.contains("date.text_value < $3"));
        assert!(sql.contains("type.metadata_field_id = 66"));
        assert!(sql.contains("type.text_value = $4"));
        assert!(!sql.contains("abc-123"));
        assert!(!sql.contains("Thesis"));
    }
}
