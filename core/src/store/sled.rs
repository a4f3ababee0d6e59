use super::pattern::{glob_match, literal_prefix};
use super::record::{apply, Record};
use super::{Store, Transaction};
use crate::error::{Error, Result};
use ::sled::transaction::{ConflictableTransactionError, ConflictableTransactionResult, TransactionError};
use std::collections::BTreeSet;
use std::path::Path;

/// Embedded persistent store. Each key maps to one bincode-encoded [`Record`];
/// batches run inside a single sled transaction.
pub struct SledStore {
    db: ::sled::Db,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = ::sled::open(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "opened sled store");
        Ok(Self { db })
    }

    /// A store that lives only as long as this handle.
    pub fn temporary() -> Result<Self> {
        let db = ::sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    fn record(&self, key: &str) -> Result<Option<Record>> {
        match self.db.get(key)? {
            Some(bytes) => Ok(Some(Record::decode(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl Store for SledStore {
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.db.contains_key(key)?)
    }

    fn smembers(&self, key: &str) -> Result<BTreeSet<String>> {
        match self.record(key)? {
            Some(rec) => rec.members(key),
            None => Ok(BTreeSet::new()),
        }
    }

    fn hget(&self, key: &str, field: &str) -> Result<Option<u64>> {
        match self.record(key)? {
            Some(rec) => rec.field(key, field),
            None => Ok(None),
        }
    }

    fn keys(&self, pattern: &str) -> Result<BTreeSet<String>> {
        let mut out = BTreeSet::new();
        for item in self.db.scan_prefix(literal_prefix(pattern)) {
            let (key, _) = item?;
            let key = String::from_utf8_lossy(&key).into_owned();
            if glob_match(pattern, &key) {
                out.insert(key);
            }
        }
        Ok(out)
    }

    fn exec(&self, tx: &Transaction) -> Result<Vec<u64>> {
        let result = self.db.transaction(|tree| -> ConflictableTransactionResult<Vec<u64>, Error> {
            let mut replies = Vec::with_capacity(tx.len());
            for cmd in tx.commands() {
                let key = cmd.key();
                let current = match tree.get(key)? {
                    Some(bytes) => Some(Record::decode(&bytes).map_err(ConflictableTransactionError::Abort)?),
                    None => None,
                };
                let (next, reply) = apply(cmd, current).map_err(ConflictableTransactionError::Abort)?;
                match next {
                    Some(rec) => {
                        let bytes = rec.encode().map_err(ConflictableTransactionError::Abort)?;
                        tree.insert(key, bytes)?;
                    }
                    None => {
                        tree.remove(key)?;
                    }
                }
                replies.push(reply);
            }
            Ok(replies)
        });
        match result {
            Ok(replies) => {
                tracing::debug!(commands = tx.len(), "sled transaction committed");
                Ok(replies)
            }
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(e)) => Err(Error::Sled(e)),
        }
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}
