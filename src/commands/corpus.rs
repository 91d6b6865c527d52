//! Corpus rebuild command

use crate::error::Result;
use crate::store::{CorpusFilter, CorpusStats, PgStore};
use tracing::info;

/// Rebuild the corpus table with the given filters
pub async fn cmd_build_corpus(store: &PgStore, filter: &CorpusFilter) -> Result<CorpusStats> {
    info!(
        "Building corpus: collection={}, dates=[{}, {}), type={}",
        filter.collection.as_deref().unwrap_or("any"),
        filter.dates.from,
        filter.dates.to,
        filter
            .item_type
            .map(|t| t.to_string())
            .unwrap_or_else(|| "any".to_string())
    );

    store.rebuild_corpus(filter).await
}
