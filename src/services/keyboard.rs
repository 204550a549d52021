use std::collections::HashMap;
use std::sync::Arc;

use teloxide::types::UserId;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyboardError {
    #[error("no usable labels were given")]
    EmptyLabelSet,
    #[error("no keyboard is currently shown")]
    NoActiveKeyboard,
}

/// Tracks which custom reply keyboard each user currently has. At most one
/// keyboard per user; showing a new one replaces the old.
#[derive(Clone, Default)]
pub struct KeyboardRegistry {
    active: Arc<Mutex<HashMap<UserId, Vec<String>>>>,
}

impl KeyboardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated label list and records it as the user's
    /// active keyboard. Labels keep their input order; blank entries are
    /// dropped, and an input with nothing left is rejected.
    pub async fn show(&self, user: UserId, labels: &str) -> Result<Vec<String>, KeyboardError> {
        let labels: Vec<String> = labels
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if labels.is_empty() {
            return Err(KeyboardError::EmptyLabelSet);
        }
        self.active.lock().await.insert(user, labels.clone());
        tracing::debug!("User {} now has a keyboard with {} labels", user, labels.len());
        Ok(labels)
    }

    /// Forgets the user's keyboard.
    pub async fn hide(&self, user: UserId) -> Result<(), KeyboardError> {
        self.active
            .lock()
            .await
            .remove(&user)
            .map(|_| ())
            .ok_or(KeyboardError::NoActiveKeyboard)
    }

    pub async fn is_active(&self, user: UserId) -> bool {
        self.active.lock().await.contains_key(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);

    #[tokio::test]
    async fn test_show_splits_and_trims_labels() {
        let registry = KeyboardRegistry::new();
        let labels = registry.show(ALICE, " yes , no ,maybe").await.unwrap();
        assert_eq!(labels, vec!["yes", "no", "maybe"]);
    }

    #[tokio::test]
    async fn test_show_drops_interior_empty_labels() {
        let registry = KeyboardRegistry::new();
        let labels = registry.show(ALICE, "A, B ,, C").await.unwrap();
        assert_eq!(labels, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_show_keeps_order_and_duplicates() {
        let registry = KeyboardRegistry::new();
        let labels = registry.show(ALICE, "b,a,b").await.unwrap();
        assert_eq!(labels, vec!["b", "a", "b"]);
    }

    #[tokio::test]
    async fn test_show_rejects_empty_inputs() {
        let registry = KeyboardRegistry::new();
        for input in ["", "   ", ",", " , ,, "] {
            assert_eq!(
                registry.show(ALICE, input).await,
                Err(KeyboardError::EmptyLabelSet),
                "{input:?}"
            );
        }
        assert!(!registry.is_active(ALICE).await);
    }

    #[tokio::test]
    async fn test_show_replaces_previous_keyboard() {
        let registry = KeyboardRegistry::new();
        registry.show(ALICE, "one,two").await.unwrap();
        let labels = registry.show(ALICE, "three").await.unwrap();
        assert_eq!(labels, vec!["three"]);
        assert!(registry.is_active(ALICE).await);
    }

    #[tokio::test]
    async fn test_hide_without_active_keyboard() {
        let registry = KeyboardRegistry::new();
        assert_eq!(
            registry.hide(ALICE).await,
            Err(KeyboardError::NoActiveKeyboard)
        );
    }

    #[tokio::test]
    async fn test_hide_after_show() {
        let registry = KeyboardRegistry::new();
        registry.show(ALICE, "a,b").await.unwrap();
        assert!(registry.is_active(ALICE).await);
        assert!(registry.hide(ALICE).await.is_ok());
        assert!(!registry.is_active(ALICE).await);
        // The second hide finds nothing
        assert_eq!(
            registry.hide(ALICE).await,
            Err(KeyboardError::NoActiveKeyboard)
        );
    }

    #[tokio::test]
    async fn test_keyboards_are_per_user() {
        let registry = KeyboardRegistry::new();
        registry.show(ALICE, "a").await.unwrap();
        assert!(!registry.is_active(BOB).await);
        assert_eq!(registry.hide(BOB).await, Err(KeyboardError::NoActiveKeyboard));
        assert!(registry.is_active(ALICE).await);
    }
}
