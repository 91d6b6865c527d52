//! SDG keyword files
//!
//! A keyword directory holds plain-text files named with an `sdg<N>` suffix
//! (`sdg01`, `keywords_sdg13`, ...). Each line of a file is one search
//! phrase for category `N`.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// An SDG category, identified by the numeric suffix of its keyword file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub u32);

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidArgument(format!(
                "SDG category must be a number, got '{}'",
                s
            )));
        }
        s.parse::<u32>()
            .map(Category)
            .map_err(|_| Error::InvalidArgument(format!("SDG category out of range: {}", s)))
    }
}

fn sdg_file_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"sdg(\d+)$").unwrap())
}

/// Extract the category from a keyword file name, if it has an `sdg<N>` suffix
pub fn category_from_file_name(name: &str) -> Option<Category> {
    sdg_file_regex()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Phrases grouped by category
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    categories: BTreeMap<Category, BTreeSet<String>>,
    sources: BTreeMap<Category, Vec<PathBuf>>,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the lines of a keyword file to a category
    ///
    /// Lines are trimmed; blank lines are skipped and duplicates collapse.
    pub fn add_phrases(&mut self, category: Category, content: &str) -> usize {
        let phrases = self.categories.entry(category).or_default();
        let before = phrases.len();
        for line in content.lines() {
            let phrase = line.trim();
            if !phrase.is_empty() {
                phrases.insert(phrase.to_string());
            }
        }
        phrases.len() - before
    }

    /// Categories in ascending order
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories.keys().copied()
    }

    /// Phrases of a category in sorted order (empty for unknown categories)
    pub fn phrases(&self, category: Category) -> impl Iterator<Item = &str> {
        self.categories
            .get(&category)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Iterate over `(category, phrases)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (Category, &BTreeSet<String>)> {
        self.categories.iter().map(|(c, p)| (*c, p))
    }

    /// Files that contributed to a category
    pub fn sources(&self, category: Category) -> &[PathBuf] {
        self.sources
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of distinct phrases across all categories
    pub fn phrase_count(&self) -> usize {
        self.categories.values().map(BTreeSet::len).sum()
    }
}

/// Load every `sdg<N>` keyword file in a directory
///
/// Only regular files directly inside `dir` are considered. When `only` is
/// set, files for other categories are skipped.
pub fn load_keyword_dir(dir: &Path, only: Option<Category>) -> Result<KeywordSet> {
    if !dir.is_dir() {
        return Err(Error::KeywordDir(dir.display().to_string()));
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.retain(|path| path.is_file());
    entries.sort();

    let mut keywords = KeywordSet::new();
    for path in entries {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let Some(category) = category_from_file_name(&name) else {
            warn!("No SDG category found for file: {}", path.display());
            continue;
        };

        if only.is_some_and(|wanted| wanted != category) {
            debug!("Skipping {} (category {})", path.display(), category);
            continue;
        }

        let content = std::fs::read_to_string(&path)?;
        let added = keywords.add_phrases(category, &content);
        keywords
            .sources
            .entry(category)
            .or_default()
            .push(path.clone());
        debug!(
            "Loaded {} phrases for SDG {} from {}",
            added,
            category,
            path.display()
        );
    }

    info!(
        "Loaded {} phrases in {} categories from {}",
        keywords.phrase_count(),
        keywords.len(),
        dir.display()
    );

    Ok(keywords)
}
