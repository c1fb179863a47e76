//! Favorite products.

use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Set of favorited product ids. Serialized as a JSON array; duplicates in
/// stored data collapse on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ProductId>", into = "Vec<ProductId>")]
pub struct FavoriteSet {
    ids: Vec<ProductId>,
}

impl FavoriteSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Add `id` if absent, remove it if present. Returns whether `id` is now a favorite.
    pub fn toggle(&mut self, id: ProductId) -> bool {
        if let Some(pos) = self.ids.iter().position(|f| *f == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.ids.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.ids.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl From<Vec<ProductId>> for FavoriteSet {
    fn from(raw: Vec<ProductId>) -> Self {
        let mut ids = Vec::with_capacity(raw.len());
        for id in raw {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Self { ids }
    }
}

impl From<FavoriteSet> for Vec<ProductId> {
    fn from(set: FavoriteSet) -> Self {
        set.ids
    }
}

impl FromIterator<ProductId> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let mut set: FavoriteSet = [ProductId::new(1), ProductId::new(2)].into_iter().collect();
        let original = set.clone();
        for id in [1, 2, 3] {
            let id = ProductId::new(id);
            set.toggle(id);
            set.toggle(id);
            assert_eq!(set.contains(id), original.contains(id));
        }
    }

    #[test]
    fn test_toggle_reports_membership() {
        let mut set = FavoriteSet::new();
        assert!(set.toggle(ProductId::new(4)));
        assert!(set.contains(ProductId::new(4)));
        assert!(!set.toggle(ProductId::new(4)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_duplicates_collapse_on_load() {
        let set: FavoriteSet = serde_json::from_str("[5, 5, 6]").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(serde_json::to_string(&set).unwrap(), "[5,6]");
    }
}
