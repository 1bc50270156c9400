//! 状態ストアの実装
//!
//! - OrderedStore: `BTreeMap` による順序付きストア（走査順が決定的）
//! - HashedStore: `HashMap` によるストア

use std::collections::{BTreeMap, HashMap, btree_map, hash_map};

use super::StateStore;
use crate::state::State;
use crate::types::Dist;

/// 既存エントリとの比較（両実装共通）
#[inline]
fn improve(recorded: &mut Dist, steps: Dist) -> bool {
    if *recorded > steps {
        *recorded = steps;
        true
    } else {
        false
    }
}

/// `State` の全順序をキーにした状態ストア
#[derive(Debug, Default, Clone)]
pub struct OrderedStore {
    entries: BTreeMap<State, Dist>,
}

impl OrderedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// キー順に走査する
    pub fn iter(&self) -> impl Iterator<Item = (&State, Dist)> {
        self.entries.iter().map(|(s, &d)| (s, d))
    }
}

impl StateStore for OrderedStore {
    fn check_and_update(&mut self, s: &State, steps: Dist) -> bool {
        match self.entries.entry(s.clone()) {
            btree_map::Entry::Vacant(e) => {
                e.insert(steps);
                true
            }
            btree_map::Entry::Occupied(mut e) => improve(e.get_mut(), steps),
        }
    }

    fn age_all(&mut self) {
        for d in self.entries.values_mut() {
            *d = d.saturating_add(1);
        }
    }

    #[inline]
    fn get(&self, s: &State) -> Option<Dist> {
        self.entries.get(s).copied()
    }

    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn for_each(&self, f: &mut dyn FnMut(&State, Dist)) {
        for (s, &d) in &self.entries {
            f(s, d);
        }
    }
}

/// ハッシュマップによる状態ストア
#[derive(Debug, Default, Clone)]
pub struct HashedStore {
    entries: HashMap<State, Dist>,
}

impl HashedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 予想される状態数で領域を確保する
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: HashMap::with_capacity(capacity) }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&State, Dist)> {
        self.entries.iter().map(|(s, &d)| (s, d))
    }
}

impl StateStore for HashedStore {
    fn check_and_update(&mut self, s: &State, steps: Dist) -> bool {
        // 既知の状態ではキーの clone を避ける
        if let Some(recorded) = self.entries.get_mut(s) {
            return improve(recorded, steps);
        }
        match self.entries.entry(s.clone()) {
            hash_map::Entry::Vacant(e) => {
                e.insert(steps);
                true
            }
            hash_map::Entry::Occupied(mut e) => improve(e.get_mut(), steps),
        }
    }

    fn age_all(&mut self) {
        for d in self.entries.values_mut() {
            *d = d.saturating_add(1);
        }
    }

    #[inline]
    fn get(&self, s: &State) -> Option<Dist> {
        self.entries.get(s).copied()
    }

    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn for_each(&self, f: &mut dyn FnMut(&State, Dist)) {
        for (s, &d) in &self.entries {
            f(s, d);
        }
    }
}
