//! Key-value store abstraction the index is built on.
//!
//! The command set is the small slice of Redis the index needs: key existence,
//! set add/members, hash get/set, glob key scans and atomic command batches.

pub mod memory;
pub mod pattern;
pub mod record;
#[cfg(feature = "redis")]
pub mod redis;
pub mod sled;

use crate::error::Result;
use std::collections::BTreeSet;

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;
pub use self::sled::SledStore;

/// One write inside a [`Transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Del(String),
    HSet { key: String, field: String, count: u64 },
    SAdd { key: String, member: String },
}

impl Command {
    pub fn key(&self) -> &str {
        match self {
            Command::Del(key) => key,
            Command::HSet { key, .. } | Command::SAdd { key, .. } => key,
        }
    }
}

/// An ordered batch of writes applied as a unit by [`Store::exec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    commands: Vec<Command>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn del(&mut self, key: impl Into<String>) -> &mut Self {
        self.commands.push(Command::Del(key.into()));
        self
    }

    pub fn hset(&mut self, key: impl Into<String>, field: impl Into<String>, count: u64) -> &mut Self {
        self.commands.push(Command::HSet { key: key.into(), field: field.into(), count });
        self
    }

    pub fn sadd(&mut self, key: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.commands.push(Command::SAdd { key: key.into(), member: member.into() });
        self
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// A handle to a key-value store.
///
/// Every method is a single request/response; nothing is cached or retried.
pub trait Store: Send + Sync {
    fn exists(&self, key: &str) -> Result<bool>;

    fn smembers(&self, key: &str) -> Result<BTreeSet<String>>;

    fn hget(&self, key: &str, field: &str) -> Result<Option<u64>>;

    /// Keys matching a Redis-style glob (`*`, `?`).
    fn keys(&self, pattern: &str) -> Result<BTreeSet<String>>;

    /// Applies every command of `tx` atomically and returns one integer reply
    /// per command: keys removed for `Del`, 1 for a newly created field or
    /// member, 0 otherwise.
    fn exec(&self, tx: &Transaction) -> Result<Vec<u64>>;

    /// Returns true when `member` was not in the set before.
    fn sadd(&self, key: &str, member: &str) -> Result<bool> {
        let mut tx = Transaction::new();
        tx.sadd(key, member);
        Ok(self.exec(&tx)?.first().copied() == Some(1))
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }
    fn smembers(&self, key: &str) -> Result<BTreeSet<String>> {
        (**self).smembers(key)
    }
    fn hget(&self, key: &str, field: &str) -> Result<Option<u64>> {
        (**self).hget(key, field)
    }
    fn keys(&self, pattern: &str) -> Result<BTreeSet<String>> {
        (**self).keys(pattern)
    }
    fn exec(&self, tx: &Transaction) -> Result<Vec<u64>> {
        (**self).exec(tx)
    }
    fn sadd(&self, key: &str, member: &str) -> Result<bool> {
        (**self).sadd(key, member)
    }
    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_keeps_command_order() {
        let mut tx = Transaction::new();
        tx.del("TermCounter:a").hset("TermCounter:a", "cat", 2).sadd("URLSet:cat", "a");
        assert_eq!(tx.len(), 3);
        assert_eq!(tx.commands()[0], Command::Del("TermCounter:a".into()));
        assert_eq!(tx.commands()[2].key(), "URLSet:cat");
    }

    #[test]
    fn boxed_store_forwards() {
        let store: Box<dyn Store> = Box::new(MemoryStore::new());
        assert!(store.sadd("URLSet:cat", "a").unwrap());
        assert!(!store.sadd("URLSet:cat", "a").unwrap());
        assert!(store.exists("URLSet:cat").unwrap());
    }
}
