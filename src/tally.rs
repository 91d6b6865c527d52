//! Match tallies
//!
//! Every hit of a canonical query against a document is recorded once via
//! [`Tally::record`], which updates all views at the same time:
//! category -> document, document -> category (with per-query hits),
//! category -> query, and the per-category total. Lookups of keys that were
//! never recorded return zero.

use crate::keywords::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters for one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTally {
    /// Hits per matching document
    pub documents: BTreeMap<String, u64>,
    /// Hits per canonical query
    pub queries: BTreeMap<String, u64>,
    /// All hits in the category
    pub total: u64,
}

/// Counters for one document within one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTally {
    /// Hits of any query of the category
    pub count: u64,
    /// Hits per canonical query
    pub queries: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    categories: BTreeMap<Category, CategoryTally>,
    documents: BTreeMap<String, BTreeMap<Category, DocumentTally>>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `query` of `category` matched `document`
    pub fn record(&mut self, category: Category, document: &str, query: &str) {
        let cat = self.categories.entry(category).or_default();
        *cat.documents.entry(document.to_string()).or_default() += 1;
        *cat.queries.entry(query.to_string()).or_default() += 1;
        cat.total += 1;

        let doc = self
            .documents
            .entry(document.to_string())
            .or_default()
            .entry(category)
            .or_default();
        doc.count += 1;
        *doc.queries.entry(query.to_string()).or_default() += 1;
    }

    /// Categories with at least one hit, ascending
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories.keys().copied()
    }

    pub fn category(&self, category: Category) -> Option<&CategoryTally> {
        self.categories.get(&category)
    }

    /// Distinct documents with at least one hit in the category
    pub fn distinct_documents(&self, category: Category) -> usize {
        self.categories
            .get(&category)
            .map_or(0, |c| c.documents.len())
    }

    /// All hits in the category
    pub fn total_hits(&self, category: Category) -> u64 {
        self.categories.get(&category).map_or(0, |c| c.total)
    }

    /// Hits of one query within the category
    pub fn query_hits(&self, category: Category, query: &str) -> u64 {
        self.categories
            .get(&category)
            .and_then(|c| c.queries.get(query))
            .copied()
            .unwrap_or(0)
    }

    /// Hits of any query of the category against one document
    pub fn document_hits(&self, category: Category, document: &str) -> u64 {
        self.documents
            .get(document)
            .and_then(|cats| cats.get(&category))
            .map_or(0, |d| d.count)
    }

    /// Hits of one query against one document
    pub fn document_query_hits(&self, category: Category, document: &str, query: &str) -> u64 {
        self.documents
            .get(document)
            .and_then(|cats| cats.get(&category))
            .and_then(|d| d.queries.get(query))
            .copied()
            .unwrap_or(0)
    }

    /// Categories a document matched, with their counters
    pub fn document_categories(&self, document: &str) -> Option<&BTreeMap<Category, DocumentTally>> {
        self.documents.get(document)
    }

    /// Distinct documents matched in any category
    pub fn matched_documents(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
