//! Keyword analysis: normalize phrases, match them, tally and report

use crate::error::Result;
use crate::keywords::{Category, KeywordSet};
use crate::normalize::normalize_keywords;
use crate::progress::{print_line, query_progress};
use crate::store::SearchBackend;
use crate::tally::Tally;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

/// Analysis options
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Print each canonical query to stdout as it is processed
    pub print_queries: bool,
    /// Show progress bars on stderr
    pub progress: bool,
}

/// Hits of one canonical query
#[derive(Debug, Clone, Serialize)]
pub struct QuerySummary {
    pub query: String,
    pub hits: u64,
}

/// Per-category result line
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    /// Distinct documents with at least one hit
    pub documents: usize,
    /// All hits across the category's queries
    pub hits: u64,
    /// Canonical queries searched for this category
    pub queries_searched: usize,
    /// Queries that matched, most hits first
    pub queries: Vec<QuerySummary>,
}

/// Result of an analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    /// Documents in the corpus table, if known
    pub corpus_size: Option<i64>,
    /// Distinct documents matched in any category
    pub matched_documents: usize,
    /// Categories with at least one hit, ascending
    pub categories: Vec<CategorySummary>,
    #[serde(skip)]
    pub tally: Tally,
}

/// Run the normalization and matching passes over a keyword set
pub async fn cmd_analyze<B>(
    backend: &B,
    keywords: &KeywordSet,
    corpus_size: Option<i64>,
    options: &AnalyzeOptions,
) -> Result<AnalysisReport>
where
    B: SearchBackend + ?Sized,
{
    info!(
        "Normalizing {} phrases in {} categories",
        keywords.phrase_count(),
        keywords.len()
    );
    let normalized = normalize_keywords(backend, keywords).await?;

    let mut tally = Tally::new();
    let mut searched = Vec::new();

    for category in normalized.categories() {
        info!("Processing SDG {} ...", category);
        let total = normalized.query_count(category);
        searched.push((category, total));

        let bar = options
            .progress
            .then(|| query_progress(&format!("SDG {}", category), total as u64));

        for query in normalized.queries(category) {
            if options.print_queries {
                print_line(query);
            }
            if let Some(bar) = &bar {
                bar.set_message(query.to_string());
            }

            let ids = backend.matching_documents(query).await?;
            if !ids.is_empty() {
                debug!("phrase: {}", query);
            }
            for id in &ids {
                debug!("result: {}", id);
                tally.record(category, id, query);
            }

            if let Some(bar) = &bar {
                bar.inc(1);
            }
        }

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        debug!(
            "SDG {}: {} documents, {} hits",
            category,
            tally.distinct_documents(category),
            tally.total_hits(category)
        );
    }

    let categories = searched
        .into_iter()
        .filter_map(|(category, queries_searched)| {
            let cat = tally.category(category)?;
            let mut queries: Vec<QuerySummary> = cat
                .queries
                .iter()
                .map(|(query, hits)| QuerySummary {
                    query: query.clone(),
                    hits: *hits,
                })
                .collect();
            queries.sort_by(|a, b| b.hits.cmp(&a.hits).then_with(|| a.query.cmp(&b.query)));

            Some(CategorySummary {
                category,
                documents: cat.documents.len(),
                hits: cat.total,
                queries_searched,
                queries,
            })
        })
        .collect();

    Ok(AnalysisReport {
        generated_at: Utc::now(),
        corpus_size,
        matched_documents: tally.matched_documents(),
        categories,
        tally,
    })
}

/// Render the report as the lines printed to stdout
pub fn report_lines(report: &AnalysisReport, details: bool) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(size) = report.corpus_size {
        lines.push(format!("number of items in docs: {}", size));
    }

    for summary in &report.categories {
        lines.push(format!("{}: {}", summary.category, summary.documents));
        if details {
            for query in &summary.queries {
                lines.push(format!("    {}: {}", query.query, query.hits));
            }
        }
    }

    lines
}

/// Print the report to the console
pub fn print_report(report: &AnalysisReport, details: bool) {
    for line in report_lines(report, details) {
        println!("{}", line);
    }
}
