//! Per-category aggregate mapping with implicit-zero lookups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping from category label to an aggregated amount.
///
/// Absent categories read as zero through [`CategoryTotals::get_or_zero`],
/// which keeps the lending and charity arithmetic total. Keys are kept in
/// lexicographic order so iteration and [`CategoryTotals::total`] are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTotals(BTreeMap<String, f64>);

impl CategoryTotals {
    /// Creates an empty mapping.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the amount for `category`, or zero when absent.
    #[inline]
    #[must_use]
    pub fn get_or_zero(&self, category: &str) -> f64 {
        self.0.get(category).copied().unwrap_or(0.0_f64)
    }

    /// Returns `true` if `category` has an entry.
    #[inline]
    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.0.contains_key(category)
    }

    /// Adds `amount` to the running total of `category`.
    #[inline]
    pub fn add(&mut self, category: &str, amount: f64) {
        match self.0.get_mut(category) {
            Some(total) => *total += amount,
            None => {
                let _previous = self.0.insert(category.to_owned(), amount);
            }
        }
    }

    /// Overwrites the entry for `category`.
    #[inline]
    pub fn set(&mut self, category: &str, amount: f64) {
        let _previous = self.0.insert(category.to_owned(), amount);
    }

    /// Removes `category`, returning its amount (zero when absent).
    #[inline]
    pub fn remove(&mut self, category: &str) -> f64 {
        self.0.remove(category).unwrap_or(0.0_f64)
    }

    /// Sum of all entries.
    #[inline]
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Number of categories.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no categories.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(category, amount)` pairs in label order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(category, amount)| (category.as_str(), *amount))
    }

    /// Returns all entries ordered by descending amount, ties broken by label.
    #[inline]
    #[must_use]
    pub fn sorted_desc(&self) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> = self
            .0
            .iter()
            .map(|(category, amount)| (category.clone(), *amount))
            .collect();
        entries.sort_by(|left, right| {
            right
                .1
                .total_cmp(&left.1)
                .then_with(|| left.0.cmp(&right.0))
        });
        entries
    }

    /// Returns a reference to the underlying map.
    #[inline]
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.0
    }
}

impl FromIterator<(String, f64)> for CategoryTotals {
    /// Collects pairs, summing amounts of repeated categories.
    #[inline]
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut totals = Self::new();
        for (category, amount) in iter {
            totals.add(&category, amount);
        }
        totals
    }
}
