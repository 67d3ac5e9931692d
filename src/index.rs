//! Searchable index over a corpus, and the manager that owns the live one.
//!
//! A [`SearchIndex`] is built once from a corpus and never mutated. The
//! [`IndexManager`] holds at most one installed index; installing a new one
//! replaces it wholesale, and a failed build leaves it untouched.
//!
//! # Ranking
//!
//! 1. Trim the query; blank queries return no results.
//! 2. Score every configured field of every record (see [`crate::fuzzy`]).
//! 3. A record's score is its best field's score.
//! 4. Sort ascending by score; the sort is stable, so ties keep corpus order.
//! 5. Truncate to `limit`.

use std::time::Instant;
use tracing::info;

use crate::config::{IndexConfig, SearchKey};
use crate::error::{IndexBuildError, NotReady};
use crate::fuzzy::{prepare, FuzzyMatcher, Pattern};
use crate::models::{Record, SearchResult};

pub struct SearchIndex {
    records: Vec<Record>,
    /// `fields[i][k]` is record `i`'s text for `keys[k]`, lowercased.
    fields: Vec<Vec<String>>,
    matcher: FuzzyMatcher,
    limit: usize,
}

impl SearchIndex {
    pub fn build(records: Vec<Record>, config: &IndexConfig) -> Result<Self, IndexBuildError> {
        if config.keys.is_empty() {
            return Err(IndexBuildError::InvalidConfig(
                "at least one search key is required".to_string(),
            ));
        }
        if config.limit == 0 {
            return Err(IndexBuildError::InvalidConfig(
                "limit must be >= 1".to_string(),
            ));
        }
        let matcher = FuzzyMatcher::new(config.threshold, config.min_match_chars)?;

        let started = Instant::now();
        let fields = records
            .iter()
            .map(|record| {
                config
                    .keys
                    .iter()
                    .map(|key| prepare(&field_text(record, *key).unwrap_or_default()))
                    .collect()
            })
            .collect();
        info!(
            records = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "index built"
        );

        Ok(Self {
            records,
            fields,
            matcher,
            limit: config.limit,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let pattern = Pattern::new(query);

        let mut hits: Vec<(usize, f64)> = self
            .fields
            .iter()
            .enumerate()
            .filter_map(|(i, fields)| {
                fields
                    .iter()
                    .filter_map(|text| self.matcher.score(&pattern, text))
                    .min_by(f64::total_cmp)
                    .map(|score| (i, score))
            })
            .collect();

        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.truncate(self.limit);

        hits.into_iter()
            .map(|(i, score)| SearchResult {
                record: self.records[i].clone(),
                score,
            })
            .collect()
    }

    /// First record whose id renders as `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| r.id_text().as_deref() == Some(id))
    }
}

fn field_text(record: &Record, key: SearchKey) -> Option<String> {
    match key {
        SearchKey::Name => Some(record.name.clone()),
        SearchKey::Set => record.set.clone(),
        SearchKey::Number => record.number_text(),
        SearchKey::Rarity => record.rarity.clone(),
    }
}

/// Owns the installed index, if any.
pub struct IndexManager {
    config: IndexConfig,
    current: Option<SearchIndex>,
}

impl IndexManager {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.current.is_some()
    }

    /// Build and install in one step. On error the installed index is kept.
    pub fn rebuild(&mut self, corpus: Vec<Record>) -> Result<usize, IndexBuildError> {
        let index = SearchIndex::build(corpus, &self.config)?;
        Ok(self.install(index))
    }

    /// Replace the installed index. Returns the new record count.
    pub fn install(&mut self, index: SearchIndex) -> usize {
        let count = index.len();
        self.current = Some(index);
        count
    }

    pub fn query(&self, text: &str) -> Result<Vec<SearchResult>, NotReady> {
        self.current
            .as_ref()
            .map(|index| index.search(text))
            .ok_or(NotReady)
    }

    pub fn lookup(&self, id: &str) -> Result<Option<&Record>, NotReady> {
        self.current
            .as_ref()
            .map(|index| index.find_by_id(id))
            .ok_or(NotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    fn corpus() -> Vec<Record> {
        [
            json!({"id": "base1-4", "name": "Charizard", "set": "Base", "number": "4", "rarity": "Rare Holo"}),
            json!({"id": "base1-58", "name": "Pikachu", "set": "Base", "number": "58", "rarity": "Common"}),
            json!({"id": "base1-44", "name": "Bulbasaur", "set": "Base", "number": "44", "rarity": "Common"}),
            json!({"id": 7, "name": "Pikachu", "setName": "Jungle", "number": 60}),
        ]
        .iter()
        .map(normalize)
        .collect()
    }

    fn manager() -> IndexManager {
        let mut manager = IndexManager::new(IndexConfig::default());
        manager.rebuild(corpus()).unwrap();
        manager
    }

    fn names(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.record.name.as_str()).collect()
    }

    #[test]
    fn not_ready_before_build() {
        let manager = IndexManager::new(IndexConfig::default());
        assert!(!manager.is_ready());
        assert_eq!(manager.query("pikachu"), Err(NotReady));
        assert!(manager.lookup("base1-4").is_err());
    }

    #[test]
    fn blank_query_is_empty_not_everything() {
        let manager = manager();
        assert!(manager.query("").unwrap().is_empty());
        assert!(manager.query("   \t").unwrap().is_empty());
    }

    #[test]
    fn fuzzy_name_match() {
        let results = manager().query("charzard").unwrap();
        assert_eq!(names(&results), vec!["Charizard"]);
    }

    #[test]
    fn no_plausible_match() {
        let results = manager().query("zzz").unwrap();
        assert!(results.iter().all(|r| r.record.name != "Pikachu"));
        assert!(results.is_empty());
    }

    #[test]
    fn ties_keep_corpus_order() {
        let results = manager().query("pikachu").unwrap();
        let ids: Vec<String> = results.iter().filter_map(|r| r.record.id_text()).collect();
        assert_eq!(ids, vec!["base1-58", "7"]);
        assert!(results.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn matches_set_and_rarity_fields() {
        let jungle = manager().query("jungle").unwrap();
        assert_eq!(jungle.len(), 1);
        assert_eq!(jungle[0].record.id, Some(json!(7)));

        let holo = manager().query("rare holo").unwrap();
        assert_eq!(names(&holo), vec!["Charizard"]);
    }

    #[test]
    fn matches_numeric_number_field() {
        let results = manager().query("60").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.id, Some(json!(7)));
    }

    #[test]
    fn results_sorted_and_capped() {
        let records: Vec<Record> = (0..120)
            .map(|i| normalize(&json!({"id": i, "name": format!("Pikachu V{}", i % 7)})))
            .chain(std::iter::once(normalize(&json!({"name": "Pikachuu"}))))
            .collect();
        let mut manager = IndexManager::new(IndexConfig::default());
        manager.rebuild(records).unwrap();

        let results = manager.query("pikachu v3").unwrap();
        assert_eq!(results.len(), 50);
        assert!(results.windows(2).all(|w| w[0].score <= w[1].score));
    }

    #[test]
    fn failed_rebuild_keeps_previous_index() {
        let mut manager = manager();
        manager.config.threshold = 4.0;
        let err = manager.rebuild(Vec::new()).unwrap_err();
        assert!(matches!(err, IndexBuildError::InvalidConfig(_)));
        assert_eq!(names(&manager.query("bulbasaur").unwrap()), vec!["Bulbasaur"]);
    }

    #[test]
    fn empty_keys_rejected() {
        let config = IndexConfig {
            keys: Vec::new(),
            ..IndexConfig::default()
        };
        assert!(SearchIndex::build(corpus(), &config).is_err());
    }

    #[test]
    fn lookup_by_textual_id() {
        let manager = manager();
        let record = manager.lookup("7").unwrap().unwrap();
        assert_eq!(record.set.as_deref(), Some("Jungle"));
        assert!(manager.lookup("missing").unwrap().is_none());
    }

    #[test]
    fn rebuild_replaces_wholesale() {
        let mut manager = manager();
        let count = manager
            .rebuild(vec![normalize(&json!({"name": "Mewtwo"}))])
            .unwrap();
        assert_eq!(count, 1);
        assert!(manager.query("charizard").unwrap().is_empty());
        assert_eq!(manager.query("mewtwo").unwrap().len(), 1);
    }
}
