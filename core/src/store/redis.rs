use super::{Command, Store, Transaction};
use crate::error::{Error, Result};
use ::redis::{Commands, RedisError};
use parking_lot::Mutex;
use std::collections::BTreeSet;

/// Store backed by a Redis server. Hash values are kept as base-10 strings so
/// existing deployments can be read and written unchanged.
pub struct RedisStore {
    conn: Mutex<::redis::Connection>,
}

impl RedisStore {
    pub fn open(url: &str) -> Result<Self> {
        let client = ::redis::Client::open(url)?;
        let conn = client.get_connection()?;
        tracing::debug!(url, "connected to redis");
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: ::redis::Connection) -> Self {
        Self { conn: Mutex::new(conn) }
    }
}

pub fn encode_count(count: u64) -> String {
    count.to_string()
}

/// Counts must be plain ASCII digits; no sign, padding or whitespace.
pub fn decode_count(key: &str, field: &str, value: &str) -> Result<u64> {
    let malformed = || Error::MalformedCount {
        key: key.to_string(),
        field: field.to_string(),
        value: value.to_string(),
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    value.parse().map_err(|_| malformed())
}

/// Maps a server `WRONGTYPE` reply onto [`Error::WrongType`] for `key`.
fn classify(e: RedisError, key: &str) -> Error {
    if is_wrong_type(&e) {
        Error::WrongType { key: key.to_string() }
    } else {
        Error::Redis(e)
    }
}

fn is_wrong_type(e: &RedisError) -> bool {
    e.code() == Some("WRONGTYPE")
}

impl Store for RedisStore {
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.conn.lock().exists(key)?)
    }

    fn smembers(&self, key: &str) -> Result<BTreeSet<String>> {
        self.conn.lock().smembers(key).map_err(|e| classify(e, key))
    }

    fn hget(&self, key: &str, field: &str) -> Result<Option<u64>> {
        let raw: Option<String> = self.conn.lock().hget(key, field).map_err(|e| classify(e, key))?;
        raw.map(|v| decode_count(key, field, &v)).transpose()
    }

    fn keys(&self, pattern: &str) -> Result<BTreeSet<String>> {
        let keys: Vec<String> = self.conn.lock().keys(pattern)?;
        Ok(keys.into_iter().collect())
    }

    fn exec(&self, tx: &Transaction) -> Result<Vec<u64>> {
        if tx.is_empty() {
            return Ok(Vec::new());
        }
        let mut pipe = ::redis::pipe();
        pipe.atomic();
        for cmd in tx.commands() {
            match cmd {
                Command::Del(key) => pipe.del(key),
                Command::HSet { key, field, count } => pipe.hset(key, field, encode_count(*count)),
                Command::SAdd { key, member } => pipe.sadd(key, member),
            };
        }
        let mut conn = self.conn.lock();
        let replies: Vec<u64> = match pipe.query(&mut *conn) {
            Ok(replies) => replies,
            // EXEC does not say which command failed; name the keys of the batch.
            Err(e) if is_wrong_type(&e) => {
                let keys: BTreeSet<&str> = tx.commands().iter().map(Command::key).collect();
                let keys: Vec<&str> = keys.into_iter().collect();
                return Err(Error::WrongType { key: keys.join(",") });
            }
            Err(e) => return Err(Error::Redis(e)),
        };
        tracing::debug!(commands = tx.len(), "redis MULTI/EXEC committed");
        Ok(replies)
    }
}
