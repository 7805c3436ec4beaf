//! Journaled tables
//!
//! A [`JournaledMap`] is an ordered map that records the prior value of every
//! key it touches. `rollback` replays that record backwards, restoring the
//! map to its state at the last `commit`. Every table the engine owns is one
//! of these, which is what lets a failed write abort without leaving a
//! partially applied projection behind.

use std::collections::BTreeMap;
use std::ops::RangeBounds;

/// Commit/abort boundary shared by every table container
pub trait Transactional {
    /// Forget the undo record; current contents become the committed state
    fn commit(&mut self);

    /// Restore the committed state
    fn rollback(&mut self);
}

#[derive(Debug, Clone)]
pub struct JournaledMap<K: Ord + Clone, V: Clone> {
    entries: BTreeMap<K, V>,
    undo: Vec<(K, Option<V>)>,
}

impl<K: Ord + Clone, V: Clone> Default for JournaledMap<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            undo: Vec::new(),
        }
    }
}

impl<K: Ord + Clone, V: Clone> JournaledMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    pub fn range<R: RangeBounds<K>>(&self, range: R) -> impl DoubleEndedIterator<Item = (&K, &V)> {
        self.entries.range(range)
    }

    /// Insert or replace, journaling the previous value
    pub fn insert(&mut self, key: K, value: V) {
        let previous = self.entries.insert(key.clone(), value);
        self.undo.push((key, previous));
    }

    /// Remove, journaling the removed value; absent keys leave no record
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self.entries.remove(key)?;
        self.undo.push((key.clone(), Some(removed.clone())));
        Some(removed)
    }

    /// Number of changes since the last commit
    pub fn pending(&self) -> usize {
        self.undo.len()
    }

    /// Committed-or-not contents, for comparing two maps
    pub fn entries(&self) -> &BTreeMap<K, V> {
        &self.entries
    }
}

impl<K: Ord + Clone, V: Clone> Transactional for JournaledMap<K, V> {
    fn commit(&mut self) {
        self.undo.clear();
    }

    fn rollback(&mut self) {
        while let Some((key, previous)) = self.undo.pop() {
            match previous {
                Some(value) => {
                    self.entries.insert(key, value);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
    }
}

impl<K: Ord + Clone, V: Clone + PartialEq> PartialEq for JournaledMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Ord + Clone, V: Clone> FromIterator<(K, V)> for JournaledMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            undo: Vec::new(),
        }
    }
}
