//! Net balances per unordered participant pair.
//!
//! Pairs are canonicalized by byte-wise string order, so the same edge set
//! always yields the same keys. A positive balance means the first
//! participant of the pair is the creditor.

use std::collections::BTreeMap;

use crate::{Amount, EngineError, LedgerEdge, ResultEngine};

/// Canonical unordered pair (`first < second`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    /// Returns `None` when both ids are equal (a participant never owes
    /// themself).
    pub fn new(a: &str, b: &str) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Less => Some(Self {
                first: a.to_string(),
                second: b.to_string(),
            }),
            std::cmp::Ordering::Greater => Some(Self {
                first: b.to_string(),
                second: a.to_string(),
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetBalances {
    balances: BTreeMap<PairKey, Amount>,
}

impl NetBalances {
    pub fn from_edges(edges: &[LedgerEdge]) -> ResultEngine<Self> {
        let mut balances = Self::default();
        for edge in edges {
            balances.add_edge(edge)?;
        }
        Ok(balances)
    }

    /// Folds one edge into the running total of its pair.
    ///
    /// Self-loops are ignored. A balance must stay negatable, so `i64::MIN`
    /// is rejected like any other overflow.
    pub fn add_edge(&mut self, edge: &LedgerEdge) -> ResultEngine<()> {
        let overflow = || EngineError::Validation("net balance overflows".to_string());
        let Some(key) = PairKey::new(&edge.debtor, &edge.creditor) else {
            return Ok(());
        };
        let signed = if key.first == edge.creditor {
            edge.amount
        } else {
            edge.amount.checked_neg().ok_or_else(overflow)?
        };
        let current = self.get(&key);
        let next = current
            .checked_add(signed)
            .filter(|balance| balance.checked_neg().is_some())
            .ok_or_else(overflow)?;
        self.balances.insert(key, next);
        Ok(())
    }

    /// Balance of the canonical pair (zero when the pair never traded).
    pub fn get(&self, key: &PairKey) -> Amount {
        self.balances.get(key).copied().unwrap_or_default()
    }

    /// Balance seen from `a`: positive when `b` owes `a`.
    pub fn balance_between(&self, a: &str, b: &str) -> Amount {
        match PairKey::new(a, b) {
            Some(key) if key.first == a => self.get(&key),
            Some(key) => -self.get(&key),
            None => Amount::ZERO,
        }
    }

    /// Pairs in canonical order, including the ones that netted to zero.
    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, Amount)> {
        self.balances.iter().map(|(key, amount)| (key, *amount))
    }

    pub fn is_settled(&self) -> bool {
        self.balances.values().all(|amount| amount.is_zero())
    }

    /// Net position of each participant across all pairs.
    ///
    /// Positive: owed money overall. The totals always sum to zero.
    pub fn participant_totals(&self) -> ResultEngine<BTreeMap<String, Amount>> {
        let overflow = || EngineError::Validation("participant total overflows".to_string());
        let mut totals: BTreeMap<String, Amount> = BTreeMap::new();
        for (key, amount) in self.iter() {
            let first = totals.entry(key.first.clone()).or_default();
            *first = first.checked_add(amount).ok_or_else(overflow)?;
            let second = totals.entry(key.second.clone()).or_default();
            *second = second.checked_sub(amount).ok_or_else(overflow)?;
        }
        Ok(totals)
    }
}
