//! Default values for configuration

/// Default PostgreSQL host
pub fn default_db_host() -> String {
    "127.0.0.1".to_string()
}

/// Default PostgreSQL port
pub fn default_db_port() -> u16 {
    5432
}

/// Default database user (DSpace convention)
pub fn default_db_username() -> String {
    "dspace".to_string()
}

/// Default database name (DSpace convention)
pub fn default_db_name() -> String {
    "dspace".to_string()
}

/// Default pool size; the analysis runs on a single session
pub fn default_db_max_connections() -> u32 {
    1
}

/// Default seconds to wait for a connection
pub fn default_db_acquire_timeout() -> u64 {
    30
}

/// Default text search configuration passed to `to_tsvector`/`to_tsquery`
pub fn default_search_language() -> String {
    "english".to_string()
}

/// Default corpus table name
pub fn default_docs_table() -> String {
    "docs".to_string()
}

/// Default inclusive lower bound of the corpus date range
pub fn default_from_date() -> String {
    "2012".to_string()
}

/// Default exclusive upper bound of the corpus date range
pub fn default_to_date() -> String {
    "2022".to_string()
}
