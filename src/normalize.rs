//! Phrase normalization into canonical full-text queries

use crate::error::Result;
use crate::keywords::{Category, KeywordSet};
use crate::store::SearchBackend;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Strip quote characters left in the text rendering of a `tsquery`
///
/// `'climat' <-> 'chang'` becomes `climat <-> chang`, which `to_tsquery`
/// accepts as-is.
pub fn clean_query(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '\'' && *c != '"')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Canonical queries per category, deduplicated
#[derive(Debug, Clone, Default)]
pub struct NormalizedQueries {
    categories: BTreeMap<Category, BTreeSet<String>>,
}

impl NormalizedQueries {
    /// Add a canonical query; returns false if it was already present
    pub fn insert(&mut self, category: Category, query: String) -> bool {
        self.categories.entry(category).or_default().insert(query)
    }

    /// Make sure a category is present even if none of its phrases survive
    pub fn touch(&mut self, category: Category) {
        self.categories.entry(category).or_default();
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories.keys().copied()
    }

    pub fn queries(&self, category: Category) -> impl Iterator<Item = &str> {
        self.categories
            .get(&category)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn query_count(&self, category: Category) -> usize {
        self.categories.get(&category).map_or(0, BTreeSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Normalize every phrase of every category through the backend's parser
///
/// Phrases that normalize to the same query count once. Phrases that parse
/// to an empty query (only stopwords) are dropped.
pub async fn normalize_keywords<B>(backend: &B, keywords: &KeywordSet) -> Result<NormalizedQueries>
where
    B: SearchBackend + ?Sized,
{
    let mut normalized = NormalizedQueries::default();

    for (category, phrases) in keywords.iter() {
        normalized.touch(category);
        for phrase in phrases {
            for raw in backend.parse_query(phrase).await? {
                let query = clean_query(&raw);
                if query.is_empty() {
                    debug!("Phrase '{}' has no searchable terms", phrase);
                    continue;
                }
                if !normalized.insert(category, query.clone()) {
                    debug!("Phrase '{}' duplicates query '{}'", phrase, query);
                }
            }
        }
        debug!(
            "SDG {}: {} phrases -> {} queries",
            category,
            phrases.len(),
            normalized.query_count(category)
        );
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Lowercases words, drops a tiny stopword list, joins with `<->`
    struct PhraseParser;

    #[async_trait]
    impl SearchBackend for PhraseParser {
        async fn parse_query(&self, phrase: &str) -> Result<Vec<String>> {
            let terms: Vec<String> = phrase
                .split_whitespace()
                .map(|w| w.to_lowercase())
                .filter(|w| !["the", "of", "and"].contains(&w.as_str()))
                .map(|w| format!("'{}'", w))
                .collect();
            Ok(vec![terms.join(" <-> ")])
        }

        async fn matching_documents(&self, _query: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn document_count(&self) -> Result<i64> {
            Ok(0)
        }
    }

    #[test]
    fn test_clean_query() {
        assert_eq!(clean_query("'climat' <-> 'chang'"), "climat <-> chang");
        assert_eq!(clean_query("\"'water'\""), "water");
        assert_eq!(clean_query("  "), "");
    }

    #[tokio::test]
    async fn test_equivalent_phrases_collapse() {
        let mut keywords = KeywordSet::new();
        keywords.add_phrases(Category(13), "Climate Change\nclimate change\nthe climate of change\n");

        let normalized = normalize_keywords(&PhraseParser, &keywords).await.unwrap();
        let queries: Vec<_> = normalized.queries(Category(13)).collect();
        assert_eq!(queries, vec!["climate <-> change"]);
    }

    #[tokio::test]
    async fn test_stopword_only_phrases_are_dropped() {
        let mut keywords = KeywordSet::new();
        keywords.add_phrases(Category(2), "the\nof and\n");

        let normalized = normalize_keywords(&PhraseParser, &keywords).await.unwrap();
        assert_eq!(normalized.categories().collect::<Vec<_>>(), vec![Category(2)]);
        assert_eq!(normalized.query_count(Category(2)), 0);
    }

    #[tokio::test]
    async fn test_categories_keep_separate_queries() {
        let mut keywords = KeywordSet::new();
        keywords.add_phrases(Category(6), "water\n");
        keywords.add_phrases(Category(14), "water\nocean\n");

        let normalized = normalize_keywords(&PhraseParser, &keywords).await.unwrap();
        assert_eq!(normalized.query_count(Category(6)), 1);
        assert_eq!(normalized.query_count(Category(14)), 2);
    }
}
