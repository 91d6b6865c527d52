//! SQL for the `docs` corpus table and the DSpace source tables

/// DSpace metadata field id of `dc.description.abstract`
pub const FIELD_ABSTRACT: i32 = 27;

/// DSpace metadata field id of `dc.title`
pub const FIELD_TITLE: i32 = 64;

/// DSpace metadata field id of `dc.date.issued`
pub const FIELD_DATE: i32 = 15;

/// DSpace metadata field id of `dc.type`
pub const FIELD_TYPE: i32 = 66;

/// Drop the corpus table
pub fn drop_docs_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {table}")
}

/// Create the corpus table
pub fn create_docs_sql(table: &str) -> String {
    format!(
        "CREATE TABLE {table} (id SERIAL, resource_id TEXT, title TEXT, abstract TEXT, PRIMARY KEY(id))"
    )
}

/// Create the full-text GIN index over abstracts
///
/// The expression must match the one used by the match query for the
/// planner to pick the index.
pub fn create_docs_index_sql(table: &str, language: &str) -> String {
    format!(
        "CREATE INDEX {table}_abstract_fts ON {table} USING gin(to_tsvector('{language}', abstract))"
    )
}

/// Head of the corpus population query, up to the fixed filters
///
/// Titles that look like bitstream names (`file.pdf`, `name_0001`) or
/// DSpace bundle names are excluded.
pub fn insert_docs_head_sql(table: &str) -> String {
    format!(
        r#"INSERT INTO {table}(resource_id, title, abstract)
SELECT DISTINCT title.dspace_object_id::text, title.text_value AS title, abstract.text_value AS abstract
FROM item i
JOIN metadatavalue abstract ON abstract.dspace_object_id = i.uuid
JOIN metadatavalue date ON date.dspace_object_id = i.uuid
JOIN metadatavalue title ON title.dspace_object_id = i.uuid
JOIN metadatavalue type ON type.dspace_object_id = i.uuid
WHERE abstract.metadata_field_id = {FIELD_ABSTRACT}
AND title.metadata_field_id = {FIELD_TITLE}
AND title.text_value NOT LIKE '%.___'
AND title.text_value NOT LIKE '%\_____'
AND title.text_value NOT IN ('TEXT', 'LICENSE', 'ORIGINAL', 'THUMBNAIL')
AND i.in_archive = 't' AND i.withdrawn = 'f' AND i.discoverable = 't'"#
    )
}

/// Count the rows of the corpus table
pub fn count_docs_sql(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {table}")
}

/// Parse a raw phrase into a `tsquery`, rendered as text
pub fn parse_query_sql(language: &str) -> String {
    format!("SELECT websearch_to_tsquery('{language}', $1)::text")
}

/// Resource ids whose text column matches a canonical `tsquery`
///
/// `resource_id` is cast to text since externally prepared tables may store
/// it as an integer or uuid.
pub fn match_docs_sql(table: &str, column: &str, language: &str) -> String {
    format!(
        "SELECT resource_id::text FROM {table} WHERE to_tsquery('{language}', $1) @@ to_tsvector('{language}', {column})"
    )
}
