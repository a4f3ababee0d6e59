use crate::tokenizer::{tokenize, CounterOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Occurrence counts of every term on one page, labelled with the page URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCounter {
    label: String,
    counts: BTreeMap<String, u64>,
}

impl TermCounter {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), counts: BTreeMap::new() }
    }

    pub fn from_text(label: impl Into<String>, text: &str, options: &CounterOptions) -> Self {
        let mut counter = Self::new(label);
        counter.process_text(text, options);
        counter
    }

    /// Adds the terms of `text` to the running counts.
    pub fn process_text(&mut self, text: &str, options: &CounterOptions) {
        for (term, _pos) in tokenize(text, options) {
            self.increment(term);
        }
    }

    pub fn increment(&mut self, term: impl Into<String>) {
        *self.counts.entry(term.into()).or_insert(0) += 1;
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Count for `term`, zero when the page never mentions it.
    pub fn get(&self, term: &str) -> u64 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.counts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(t, c)| (t.as_str(), *c))
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of term occurrences on the page.
    pub fn size(&self) -> u64 {
        self.counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_repeated_terms() {
        let tc = TermCounter::from_text("B", "the dog the cat", &CounterOptions::default());
        assert_eq!(tc.label(), "B");
        assert_eq!(tc.get("the"), 2);
        assert_eq!(tc.get("dog"), 1);
        assert_eq!(tc.get("bird"), 0);
        assert_eq!(tc.len(), 3);
        assert_eq!(tc.size(), 4);
    }

    #[test]
    fn process_text_accumulates() {
        let opts = CounterOptions::default();
        let mut tc = TermCounter::new("A");
        tc.process_text("Cat", &opts);
        tc.process_text("cat, CAT!", &opts);
        assert_eq!(tc.get("cat"), 3);
        assert_eq!(tc.terms().collect::<Vec<_>>(), vec!["cat"]);
    }

    #[test]
    fn stopword_removal_drops_the() {
        let opts = CounterOptions { remove_stopwords: true, ..CounterOptions::default() };
        let tc = TermCounter::from_text("A", "the cat sat", &opts);
        assert_eq!(tc.get("the"), 0);
        assert_eq!(tc.get("cat"), 1);
    }
}
