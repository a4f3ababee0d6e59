use crate::error::{Error, Result};
use crate::store::{Store, Transaction};
use crate::term_counter::TermCounter;
use crate::tokenizer::CounterOptions;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

pub const URL_SET_PREFIX: &str = "URLSet:";
pub const TERM_COUNTER_PREFIX: &str = "TermCounter:";

/// Store key of the set of URLs containing `term`.
pub fn url_set_key(term: &str) -> String {
    format!("{URL_SET_PREFIX}{term}")
}

/// Store key of the per-page term counts of `url`.
pub fn term_counter_key(url: &str) -> String {
    format!("{TERM_COUNTER_PREFIX}{url}")
}

/// Term extracted from a URLSet key: the second `:`-separated component, or
/// the empty string when there is none. A term that itself contains `:` comes
/// back truncated.
pub fn term_from_url_set_key(key: &str) -> &str {
    key.split(':').nth(1).unwrap_or("")
}

/// Inverted term index kept in a key-value store.
///
/// Two record families are maintained: `URLSet:<term>` holds the URLs that
/// contain a term, and `TermCounter:<url>` holds the count of every term on
/// one page. The index itself keeps no state beyond the store handle.
pub struct Index<S: Store> {
    store: S,
    options: CounterOptions,
}

impl<S: Store> Index<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, CounterOptions::default())
    }

    pub fn with_options(store: S, options: CounterOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &CounterOptions {
        &self.options
    }

    /// Whether a TermCounter record exists for `url`.
    pub fn is_indexed(&self, url: &str) -> Result<bool> {
        self.store.exists(&term_counter_key(url))
    }

    /// Counts the terms of `content` and stores them for `url`, replacing any
    /// earlier counts, then adds `url` to the URLSet of every term it contains.
    ///
    /// URLSets of terms that an earlier revision of the page contained but this
    /// one does not are left as they are.
    pub fn index_page(&self, url: &str, content: &str) -> Result<TermCounter> {
        let counter = TermCounter::from_text(url, content, &self.options);
        self.record_counts(&counter)?;
        for term in counter.terms() {
            self.add_membership(term, url)?;
        }
        tracing::info!(url, terms = counter.len(), occurrences = counter.size(), "indexed page");
        Ok(counter)
    }

    /// Replaces the TermCounter record of `counter.label()` in one atomic
    /// batch and returns the batch replies. URLSets are not touched.
    pub fn record_counts(&self, counter: &TermCounter) -> Result<Vec<u64>> {
        let key = term_counter_key(counter.label());
        let mut tx = Transaction::new();
        tx.del(key.as_str());
        for (term, count) in counter.iter() {
            tx.hset(key.as_str(), term, count);
        }
        let replies = self.store.exec(&tx)?;
        tracing::debug!(url = counter.label(), commands = replies.len(), "recorded term counts");
        Ok(replies)
    }

    /// Adds `url` to the URLSet of `term`. Returns false if it was already there.
    pub fn add_membership(&self, term: &str, url: &str) -> Result<bool> {
        self.store.sadd(&url_set_key(term), url)
    }

    /// URLs known to contain `term`; empty for an unseen term.
    pub fn get_urls(&self, term: &str) -> Result<BTreeSet<String>> {
        self.store.smembers(&url_set_key(term))
    }

    /// Occurrences of `term` on `url`.
    ///
    /// Fails with [`Error::NotIndexed`] if `url` has no TermCounter record and
    /// returns 0 when the page is indexed but never mentions `term`.
    pub fn get_count(&self, url: &str, term: &str) -> Result<u64> {
        let key = term_counter_key(url);
        match self.store.hget(&key, term)? {
            Some(count) => Ok(count),
            None if self.store.exists(&key)? => Ok(0),
            None => Err(Error::NotIndexed { url: url.to_string() }),
        }
    }

    /// Count of `term` on every URL of its URLSet. Costs one store round trip
    /// per URL.
    pub fn get_counts(&self, term: &str) -> Result<BTreeMap<String, u64>> {
        let mut counts = BTreeMap::new();
        for url in self.get_urls(term)? {
            let count = self.get_count(&url, term)?;
            counts.insert(url, count);
        }
        Ok(counts)
    }

    // Maintenance helpers below scan the whole keyspace and are not isolated
    // from concurrent indexing. Development and tests only.

    pub fn term_set(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .url_set_keys()?
            .iter()
            .map(|key| term_from_url_set_key(key).to_string())
            .collect())
    }

    pub fn url_set_keys(&self) -> Result<BTreeSet<String>> {
        self.store.keys(&format!("{URL_SET_PREFIX}*"))
    }

    pub fn term_counter_keys(&self) -> Result<BTreeSet<String>> {
        self.store.keys(&format!("{TERM_COUNTER_PREFIX}*"))
    }

    pub fn delete_url_sets(&self) -> Result<usize> {
        let keys = self.url_set_keys()?;
        self.delete_keys(keys)
    }

    pub fn delete_term_counters(&self) -> Result<usize> {
        let keys = self.term_counter_keys()?;
        self.delete_keys(keys)
    }

    /// Deletes every key in the store, not only the two index families.
    pub fn delete_all_keys(&self) -> Result<usize> {
        let keys = self.store.keys("*")?;
        self.delete_keys(keys)
    }

    fn delete_keys(&self, keys: BTreeSet<String>) -> Result<usize> {
        let mut tx = Transaction::new();
        for key in keys {
            tx.del(key);
        }
        let removed = self.store.exec(&tx)?.iter().filter(|r| **r > 0).count();
        tracing::info!(removed, "deleted keys");
        Ok(removed)
    }

    /// Writes every indexed term followed by an indented `url count` line per
    /// page containing it.
    pub fn print_index<W: Write>(&self, out: &mut W) -> Result<()> {
        for term in self.term_set()? {
            writeln!(out, "{term}")?;
            for (url, count) in self.get_counts(&term)? {
                writeln!(out, "    {url} {count}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn keys_follow_naming_convention() {
        assert_eq!(url_set_key("the"), "URLSet:the");
        assert_eq!(term_counter_key("https://a/b"), "TermCounter:https://a/b");
    }

    #[test]
    fn term_extraction_keeps_split_quirk() {
        assert_eq!(term_from_url_set_key("URLSet:cat"), "cat");
        assert_eq!(term_from_url_set_key("URLSet:"), "");
        assert_eq!(term_from_url_set_key("URLSet"), "");
        assert_eq!(term_from_url_set_key("URLSet:a:b"), "a");
    }

    #[test]
    fn record_counts_replies_per_command() {
        let index = Index::new(MemoryStore::new());
        let tc = TermCounter::from_text("A", "the cat the", index.options());

        // DEL of a missing key, then one new field per term.
        assert_eq!(index.record_counts(&tc).unwrap(), vec![0, 1, 1]);
        // Second time round the DEL removes the old record.
        assert_eq!(index.record_counts(&tc).unwrap(), vec![1, 1, 1]);
        assert!(index.get_urls("cat").unwrap().is_empty());
    }

    #[test]
    fn missing_term_on_indexed_page_is_zero() {
        let index = Index::new(MemoryStore::new());
        index.index_page("A", "the cat sat").unwrap();
        assert_eq!(index.get_count("A", "dog").unwrap(), 0);
        assert!(matches!(
            index.get_count("B", "cat"),
            Err(Error::NotIndexed { ref url }) if url == "B"
        ));
    }

    #[test]
    fn print_index_lists_terms_and_pages() {
        let index = Index::new(MemoryStore::new());
        index.index_page("A", "cat cat").unwrap();
        index.index_page("B", "cat dog").unwrap();
        let mut out = Vec::new();
        index.print_index(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "cat\n    A 2\n    B 1\ndog\n    B 1\n");
    }
}
