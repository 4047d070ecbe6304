//! Settlement reduction: from net balances to "who pays whom".

use std::{cmp::Reverse, collections::BinaryHeap};

use serde::{Deserialize, Serialize};

use crate::{Amount, Contract, EngineError, NetBalances, ResultEngine, ledger_edges};

/// How net balances are turned into relations.
///
/// - `Pairwise`: one relation per pair with a non-zero balance. Chains and
///   cycles across three or more participants are kept as they are.
/// - `Minimized`: graph-wide reduction. Each participant's net position is
///   settled by matching the largest creditor with the largest debtor until
///   everyone is even, which yields at most `n - 1` relations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStrategy {
    #[default]
    Pairwise,
    Minimized,
}

impl SettlementStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pairwise => "pairwise",
            Self::Minimized => "minimized",
        }
    }
}

impl TryFrom<&str> for SettlementStrategy {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pairwise" => Ok(Self::Pairwise),
            "minimized" => Ok(Self::Minimized),
            other => Err(EngineError::Validation(format!(
                "invalid settlement strategy: {other}"
            ))),
        }
    }
}

/// `debtor` owes `creditor` a strictly positive `amount`.
///
/// Ordering is creditor, then debtor, then amount.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub creditor: String,
    pub debtor: String,
    pub amount: Amount,
}

impl Relation {
    pub fn new(creditor: impl Into<String>, debtor: impl Into<String>, amount: Amount) -> Self {
        Self {
            creditor: creditor.into(),
            debtor: debtor.into(),
            amount,
        }
    }
}

/// Turns net balances into sorted relations. Zero balances are omitted.
pub fn reduce(balances: &NetBalances, strategy: SettlementStrategy) -> ResultEngine<Vec<Relation>> {
    let mut relations = match strategy {
        SettlementStrategy::Pairwise => pairwise(balances),
        SettlementStrategy::Minimized => minimized(balances)?,
    };
    relations.sort();
    Ok(relations)
}

/// Runs the whole pipeline: ledger edges, net balances, reduction.
pub fn settle(contracts: &[Contract], strategy: SettlementStrategy) -> ResultEngine<Vec<Relation>> {
    let edges = ledger_edges(contracts)?;
    let balances = NetBalances::from_edges(&edges)?;
    reduce(&balances, strategy)
}

fn pairwise(balances: &NetBalances) -> Vec<Relation> {
    balances
        .iter()
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(key, amount)| {
            if amount.is_positive() {
                Relation::new(key.first(), key.second(), amount)
            } else {
                Relation::new(key.second(), key.first(), amount.abs())
            }
        })
        .collect()
}

fn minimized(balances: &NetBalances) -> ResultEngine<Vec<Relation>> {
    // Max-heaps on (remaining amount, smallest id first).
    let mut creditors: BinaryHeap<(Amount, Reverse<String>)> = BinaryHeap::new();
    let mut debtors: BinaryHeap<(Amount, Reverse<String>)> = BinaryHeap::new();
    for (participant, total) in balances.participant_totals()? {
        if total.is_positive() {
            creditors.push((total, Reverse(participant)));
        } else if total.is_negative() {
            let debt = total.checked_abs().ok_or_else(|| {
                EngineError::Validation("participant total overflows".to_string())
            })?;
            debtors.push((debt, Reverse(participant)));
        }
    }

    let mut relations = Vec::new();
    while let (Some((mut credit, Reverse(creditor))), Some((mut debt, Reverse(debtor)))) =
        (creditors.pop(), debtors.pop())
    {
        let amount = credit.min(debt);
        relations.push(Relation::new(creditor.clone(), debtor.clone(), amount));
        credit -= amount;
        debt -= amount;
        if credit.is_positive() {
            creditors.push((credit, Reverse(creditor)));
        }
        if debt.is_positive() {
            debtors.push((debt, Reverse(debtor)));
        }
    }
    Ok(relations)
}
