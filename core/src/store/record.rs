use super::Command;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Value stored under one key by the embedded backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Record {
    Set(BTreeSet<String>),
    Hash(BTreeMap<String, u64>),
}

impl Record {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    pub fn members(self, key: &str) -> Result<BTreeSet<String>> {
        match self {
            Record::Set(set) => Ok(set),
            Record::Hash(_) => Err(Error::WrongType { key: key.to_string() }),
        }
    }

    pub fn field(&self, key: &str, field: &str) -> Result<Option<u64>> {
        match self {
            Record::Hash(hash) => Ok(hash.get(field).copied()),
            Record::Set(_) => Err(Error::WrongType { key: key.to_string() }),
        }
    }
}

/// Applies one command to the current value of its key and returns the new
/// value (`None` deletes the key) together with the command's integer reply.
pub fn apply(command: &Command, current: Option<Record>) -> Result<(Option<Record>, u64)> {
    match command {
        Command::Del(_) => Ok((None, u64::from(current.is_some()))),
        Command::HSet { key, field, count } => {
            let mut hash = match current {
                None => BTreeMap::new(),
                Some(Record::Hash(hash)) => hash,
                Some(Record::Set(_)) => return Err(Error::WrongType { key: key.clone() }),
            };
            let created = hash.insert(field.clone(), *count).is_none();
            Ok((Some(Record::Hash(hash)), u64::from(created)))
        }
        Command::SAdd { key, member } => {
            let mut set = match current {
                None => BTreeSet::new(),
                Some(Record::Set(set)) => set,
                Some(Record::Hash(_)) => return Err(Error::WrongType { key: key.clone() }),
            };
            let added = set.insert(member.clone());
            Ok((Some(Record::Set(set)), u64::from(added)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hset_reports_new_fields_only() {
        let cmd = Command::HSet { key: "TermCounter:a".into(), field: "cat".into(), count: 1 };
        let (value, reply) = apply(&cmd, None).unwrap();
        assert_eq!(reply, 1);
        let cmd = Command::HSet { key: "TermCounter:a".into(), field: "cat".into(), count: 4 };
        let (value, reply) = apply(&cmd, value).unwrap();
        assert_eq!(reply, 0);
        assert_eq!(value.unwrap().field("TermCounter:a", "cat").unwrap(), Some(4));
    }

    #[test]
    fn del_reports_whether_key_existed() {
        let del = Command::Del("k".into());
        assert_eq!(apply(&del, None).unwrap(), (None, 0));
        let set = Record::Set(BTreeSet::from(["a".to_string()]));
        assert_eq!(apply(&del, Some(set)).unwrap(), (None, 1));
    }

    #[test]
    fn mixing_kinds_is_wrong_type() {
        let set = Record::Set(BTreeSet::new());
        let cmd = Command::HSet { key: "URLSet:cat".into(), field: "x".into(), count: 1 };
        assert!(matches!(apply(&cmd, Some(set)), Err(Error::WrongType { .. })));
    }

    #[test]
    fn survives_bincode() {
        let rec = Record::Hash(BTreeMap::from([("the".to_string(), 346)]));
        assert_eq!(Record::decode(&rec.encode().unwrap()).unwrap(), rec);
    }
}
