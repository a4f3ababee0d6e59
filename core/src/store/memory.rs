use super::pattern::glob_match;
use super::record::{apply, Record};
use super::{Store, Transaction};
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};

/// Process-local store. A batch is staged against a snapshot of the keys it
/// touches and only published once every command has succeeded.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<BTreeMap<String, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }
}

impl Store for MemoryStore {
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.data.lock().contains_key(key))
    }

    fn smembers(&self, key: &str) -> Result<BTreeSet<String>> {
        match self.data.lock().get(key) {
            Some(rec) => rec.clone().members(key),
            None => Ok(BTreeSet::new()),
        }
    }

    fn hget(&self, key: &str, field: &str) -> Result<Option<u64>> {
        match self.data.lock().get(key) {
            Some(rec) => rec.field(key, field),
            None => Ok(None),
        }
    }

    fn keys(&self, pattern: &str) -> Result<BTreeSet<String>> {
        Ok(self
            .data
            .lock()
            .keys()
            .filter(|k| glob_match(pattern, k))
            .cloned()
            .collect())
    }

    fn exec(&self, tx: &Transaction) -> Result<Vec<u64>> {
        let mut data = self.data.lock();
        let mut staged: BTreeMap<&str, Option<Record>> = BTreeMap::new();
        let mut replies = Vec::with_capacity(tx.len());
        for cmd in tx.commands() {
            let key = cmd.key();
            let current = match staged.remove(key) {
                Some(value) => value,
                None => data.get(key).cloned(),
            };
            let (next, reply) = apply(cmd, current)?;
            staged.insert(key, next);
            replies.push(reply);
        }
        for (key, value) in staged {
            match value {
                Some(rec) => { data.insert(key.to_string(), rec); }
                None => { data.remove(key); }
            }
        }
        Ok(replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn failed_batch_leaves_store_untouched() {
        let store = MemoryStore::new();
        store.sadd("URLSet:cat", "a").unwrap();

        let mut tx = Transaction::new();
        tx.hset("TermCounter:a", "cat", 1).hset("URLSet:cat", "oops", 1);
        assert!(matches!(store.exec(&tx), Err(Error::WrongType { .. })));
        assert!(!store.exists("TermCounter:a").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn later_commands_see_earlier_writes() {
        let store = MemoryStore::new();
        let mut tx = Transaction::new();
        tx.hset("h", "x", 1).del("h").hset("h", "y", 2);
        assert_eq!(store.exec(&tx).unwrap(), vec![1, 1, 1]);
        assert_eq!(store.hget("h", "x").unwrap(), None);
        assert_eq!(store.hget("h", "y").unwrap(), Some(2));
    }
}
