//! Storage entity traits

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

/// Key of a stored document
pub trait StorageKey: Clone + Debug + Send + Sync + Eq + std::hash::Hash {
    /// The key as stored by string-keyed backends
    fn as_str(&self) -> &str;
}

/// A document that can be persisted by a [`Storage`](super::Storage) backend
pub trait StorageEntity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned {
    type Key: StorageKey;

    fn key(&self) -> &Self::Key;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    struct NoteKey(String);

    impl StorageKey for NoteKey {
        fn as_str(&self) -> &str {
            &self.0
        }
    }

    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    struct Note {
        id: NoteKey,
        body: String,
    }

    impl StorageEntity for Note {
        type Key = NoteKey;

        fn key(&self) -> &Self::Key {
            &self.id
        }
    }

    #[test]
    fn test_entity_key() {
        let note = Note {
            id: NoteKey("note-1".to_string()),
            body: "hello".to_string(),
        };
        assert_eq!(note.key().as_str(), "note-1");
    }
}
