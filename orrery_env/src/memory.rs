//! In-memory snapshot source.

use crate::error::EnvError;
use crate::source::SnapshotSource;
use crate::types::TimeToken;

use orrery_core::{codec, Snapshot};
use std::collections::BTreeMap;

/// Ordered token → bytes map implementing [`SnapshotSource`].
///
/// Bytes are stored raw, so corrupt or truncated buffers can be injected as
/// easily as valid ones.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    units: BTreeMap<TimeToken, Vec<u8>>,
}

impl MemorySource {
    /// Creates an empty source with a name used in logs.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            units: BTreeMap::new(),
        }
    }

    /// Stores raw bytes under `token`, replacing any previous unit.
    pub fn insert_bytes(&mut self, token: impl Into<TimeToken>, bytes: Vec<u8>) {
        self.units.insert(token.into(), bytes);
    }

    /// Encodes and stores a snapshot under `token`.
    pub fn insert_snapshot(&mut self, token: impl Into<TimeToken>, snapshot: &Snapshot) {
        self.insert_bytes(token, codec::encode(snapshot));
    }

    /// Builder form of [`MemorySource::insert_snapshot`].
    pub fn with_snapshot(mut self, token: impl Into<TimeToken>, snapshot: &Snapshot) -> Self {
        self.insert_snapshot(token, snapshot);
        self
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl SnapshotSource for MemorySource {
    fn tokens(&self) -> Result<Vec<TimeToken>, EnvError> {
        Ok(self.units.keys().cloned().collect())
    }

    fn read(&self, token: &TimeToken) -> Result<Vec<u8>, EnvError> {
        self.units
            .get(token)
            .cloned()
            .ok_or_else(|| EnvError::UnknownToken(token.to_string()))
    }

    fn contains(&self, token: &TimeToken) -> bool {
        self.units.contains_key(token)
    }

    fn describe(&self) -> String {
        format!("memory:{} ({} units)", self.name, self.units.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_sorted() {
        let mut source = MemorySource::new("reference");
        source.insert_snapshot("0.2", &Snapshot::empty());
        source.insert_snapshot("0.0", &Snapshot::empty());
        source.insert_bytes("0.1", vec![1, 2]);

        let tokens = source.tokens().unwrap();
        assert_eq!(
            tokens,
            vec![TimeToken::from("0.0"), TimeToken::from("0.1"), TimeToken::from("0.2")]
        );
        assert_eq!(source.len(), 3);
        assert_eq!(source.read(&TimeToken::from("0.1")).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_unknown_token() {
        let source = MemorySource::new("actual");
        assert!(source.is_empty());
        assert!(!source.contains(&TimeToken::from("0.0")));
        assert!(matches!(
            source.read(&TimeToken::from("0.0")),
            Err(EnvError::UnknownToken(t)) if t == "0.0"
        ));
    }
}
