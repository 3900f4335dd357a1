use std::sync::RwLock;

use crate::auth::TokenPair;

/// Where tokens live between runs. The location is the embedder's concern;
/// the store only loads, saves and clears.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Option<TokenPair>;
    fn save(&self, tokens: &TokenPair);
    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    tokens: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Option<TokenPair> {
        self.tokens
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn save(&self, tokens: &TokenPair) {
        *self
            .tokens
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(tokens.clone());
    }

    fn clear(&self) {
        *self
            .tokens
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryTokenStorage::new();
        assert!(storage.load().is_none());

        let tokens = TokenPair::new("access", Some("refresh".to_string()));
        storage.save(&tokens);
        assert_eq!(storage.load(), Some(tokens));

        storage.clear();
        assert!(storage.load().is_none());
    }
}
