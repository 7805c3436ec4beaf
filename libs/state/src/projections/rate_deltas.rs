//! Rate difference arrays
//!
//! A piecewise-constant rate over time stored as signed deltas at the
//! instants it changes. An interval `[start, end)` carrying `rate` adds
//! `+rate` at `start` and `-rate` at `end`; intervals sharing a boundary sum
//! into one row, and a row netting to zero is removed. The rate active at
//! `t` is the sum of all deltas at or before `t`.

use super::TokenAmounts;
use crate::journal::{JournaledMap, Transactional};
use std::ops::RangeInclusive;
use types::PoolKeyId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateDeltaTable {
    rows: JournaledMap<(PoolKeyId, u64), TokenAmounts>,
}

impl RateDeltaTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, pool: PoolKeyId, time: u64) -> Option<&TokenAmounts> {
        self.rows.get(&(pool, time))
    }

    fn add(&mut self, pool: PoolKeyId, time: u64, delta: &TokenAmounts) {
        let key = (pool, time);
        let mut row = self.rows.get(&key).cloned().unwrap_or_default();
        row += delta;
        if row.is_zero() {
            self.rows.remove(&key);
        } else {
            self.rows.insert(key, row);
        }
    }

    pub fn add_interval(&mut self, pool: PoolKeyId, start: u64, end: u64, rate: &TokenAmounts) {
        self.add(pool, start, rate);
        self.add(pool, end, &-rate);
    }

    pub fn remove_interval(&mut self, pool: PoolKeyId, start: u64, end: u64, rate: &TokenAmounts) {
        self.add(pool, start, &-rate);
        self.add(pool, end, rate);
    }

    /// Delta rows of a pool with `time` in the range, ascending
    pub fn range(&self, pool: PoolKeyId, times: RangeInclusive<u64>) -> Vec<(u64, TokenAmounts)> {
        let (from, to) = times.into_inner();
        if from > to {
            return Vec::new();
        }
        self.rows
            .range((pool, from)..=(pool, to))
            .map(|((_, time), delta)| (*time, delta.clone()))
            .collect()
    }

    /// Rate active at `time`
    pub fn rate_at(&self, pool: PoolKeyId, time: u64) -> TokenAmounts {
        let mut rate = TokenAmounts::default();
        for (_, delta) in self.rows.range((pool, 0)..=(pool, time)) {
            rate += delta;
        }
        rate
    }
}

impl Transactional for RateDeltaTable {
    fn commit(&mut self) {
        self.rows.commit();
    }

    fn rollback(&mut self) {
        self.rows.rollback();
    }
}
