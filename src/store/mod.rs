//! PostgreSQL storage and full-text search
//!
//! This module handles all database access:
//! - Rebuilding the `docs` corpus table from DSpace metadata
//! - Parsing raw phrases into canonical `tsquery` text
//! - Matching canonical queries against corpus documents

mod corpus;
mod schema;

pub use corpus::*;
pub use schema::*;

use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

/// Full-text search operations the analysis needs from a backend
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Parse a raw phrase into zero or more canonical query strings
    async fn parse_query(&self, phrase: &str) -> Result<Vec<String>>;

    /// Resource ids of documents matching a canonical query
    async fn matching_documents(&self, query: &str) -> Result<Vec<String>>;

    /// Number of documents in the corpus
    async fn document_count(&self) -> Result<i64>;
}

/// Text column of the corpus table that queries are matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocColumn {
    /// `abstract`, written by the corpus builder
    Abstract,
    /// `doc`, used by externally prepared corpora
    Doc,
}

impl DocColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocColumn::Abstract => "abstract",
            DocColumn::Doc => "doc",
        }
    }
}

impl std::fmt::Display for DocColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics from a corpus rebuild
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Rows written by the population query
    pub inserted: u64,
    /// Rows in the corpus table afterwards
    pub document_count: i64,
}

/// PostgreSQL database handle
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    table: String,
    language: String,
    column: DocColumn,
}

/// Build connection options from configuration
pub fn connect_options(config: &Config) -> PgConnectOptions {
    let db = &config.database;
    let mut options = PgConnectOptions::new()
        .host(&db.host)
        .port(db.port)
        .username(&db.username)
        .database(&db.dbname)
        .application_name("sdgcount");
    if let Some(password) = &db.password {
        options = options.password(password);
    }
    options
}

impl PgStore {
    /// Connect to the database
    pub async fn connect(config: &Config, column: DocColumn) -> Result<Self> {
        let db = &config.database;
        debug!(
            "Connecting to PostgreSQL at {}:{}/{} as {}",
            db.host, db.port, db.dbname, db.username
        );

        let pool = PgPoolOptions::new()
            .max_connections(db.max_connections)
            .acquire_timeout(Duration::from_secs(db.acquire_timeout_secs))
            .connect_with(connect_options(config))
            .await?;

        Ok(Self::from_pool(pool, config, column))
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool, config: &Config, column: DocColumn) -> Self {
        Self {
            pool,
            table: config.search.docs_table.clone(),
            language: config.search.language.clone(),
            column,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> DocColumn {
        self.column
    }

    /// Drop, recreate, index and repopulate the corpus table
    ///
    /// Each step commits on its own; a failure leaves the table in whatever
    /// state the last successful step produced.
    pub async fn rebuild_corpus(&self, filter: &CorpusFilter) -> Result<CorpusStats> {
        info!("Rebuilding corpus table '{}'", self.table);

        sqlx::query(&drop_docs_sql(&self.table))
            .execute(&self.pool)
            .await?;
        sqlx::query(&create_docs_sql(&self.table))
            .execute(&self.pool)
            .await?;
        sqlx::query(&create_docs_index_sql(&self.table, &self.language))
            .execute(&self.pool)
            .await?;

        debug!("Populating corpus with filter {:?}", filter);
        let mut insert = filter.insert_query(&self.table);
        let inserted = insert.build().execute(&self.pool).await?.rows_affected();

        let document_count = self.document_count().await?;
        info!(
            "Corpus rebuilt: {} rows inserted, {} documents",
            inserted, document_count
        );

        Ok(CorpusStats {
            inserted,
            document_count,
        })
    }
}

#[async_trait]
impl SearchBackend for PgStore {
    async fn parse_query(&self, phrase: &str) -> Result<Vec<String>> {
        let rows: Vec<Option<String>> = sqlx::query_scalar(&parse_query_sql(&self.language))
            .bind(phrase)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().flatten().collect())
    }

    async fn matching_documents(&self, query: &str) -> Result<Vec<String>> {
        let sql = match_docs_sql(&self.table, self.column.as_str(), &self.language);
        let ids: Vec<Option<String>> = sqlx::query_scalar(&sql)
            .bind(query)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().flatten().collect())
    }

    async fn document_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(&count_docs_sql(&self.table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
