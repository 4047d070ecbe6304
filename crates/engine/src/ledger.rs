//! Contracts and the ledger edges derived from them.
//!
//! A [`Contract`] is a single bill: one payer fronted the money and every
//! [`Splitter`] owes the sum of its itemized [`Item`] prices. Settlement never
//! looks at contracts directly; it works on [`LedgerEdge`]s, one per
//! (contract, splitter) pair, pointing from the splitter (debtor) to the payer
//! (creditor).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Amount, EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    #[default]
    Pending,
    Submitted,
}

impl ContractStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
        }
    }
}

impl TryFrom<&str> for ContractStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "submitted" => Ok(Self::Submitted),
            other => Err(EngineError::Validation(format!(
                "invalid contract status: {other}"
            ))),
        }
    }
}

/// A priced line of a splitter's share.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub price: Amount,
}

impl Item {
    pub fn new(name: impl Into<String>, price: Amount) -> ResultEngine<Self> {
        let name = name.into();
        if price.is_negative() {
            return Err(EngineError::Validation(format!(
                "item '{name}' has a negative price"
            )));
        }
        Ok(Self { name, price })
    }
}

/// A participant owing part of a contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Splitter {
    pub participant_id: String,
    pub items: Vec<Item>,
}

impl Splitter {
    pub fn new(participant_id: impl Into<String>, items: Vec<Item>) -> ResultEngine<Self> {
        let splitter = Self {
            participant_id: participant_id.into(),
            items,
        };
        splitter.total()?;
        Ok(splitter)
    }

    /// Sum of the item prices.
    ///
    /// Fails on a blank participant id, a negative price or overflow.
    pub fn total(&self) -> ResultEngine<Amount> {
        if self.participant_id.trim().is_empty() {
            return Err(EngineError::Validation(
                "splitter id must not be empty".to_string(),
            ));
        }
        self.items.iter().try_fold(Amount::ZERO, |acc, item| {
            if item.price.is_negative() {
                return Err(EngineError::Validation(format!(
                    "item '{}' has a negative price",
                    item.name
                )));
            }
            acc.checked_add(item.price)
                .ok_or_else(|| EngineError::Validation("splitter total overflows".to_string()))
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: Uuid,
    pub hangout_code: String,
    pub name: String,
    pub description: Option<String>,
    pub payer: String,
    pub splitters: Vec<Splitter>,
    pub total_cost: Amount,
    pub status: ContractStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub settlement_id: Option<Uuid>,
}

impl Contract {
    /// Builds a pending contract and validates it.
    ///
    /// `created_by` defaults to the payer and `created_at` to now.
    pub fn new(
        hangout_code: impl Into<String>,
        payer: impl Into<String>,
        splitters: Vec<Splitter>,
        total_cost: Amount,
    ) -> ResultEngine<Self> {
        let payer = payer.into();
        let contract = Self {
            id: Uuid::new_v4(),
            hangout_code: hangout_code.into(),
            name: String::new(),
            description: None,
            created_by: payer.clone(),
            payer,
            splitters,
            total_cost,
            status: ContractStatus::Pending,
            created_at: Utc::now(),
            settlement_id: None,
        };
        contract.validate()?;
        Ok(contract)
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn created_by(mut self, user_id: impl Into<String>) -> Self {
        self.created_by = user_id.into();
        self
    }

    #[must_use]
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn is_submitted(&self) -> bool {
        self.status == ContractStatus::Submitted
    }

    /// Checks the contract invariants and returns the itemized sum.
    ///
    /// - at least one splitter
    /// - non-blank payer and splitter ids
    /// - no negative item price
    /// - `total_cost` equals the sum of all item prices
    pub fn validate(&self) -> ResultEngine<Amount> {
        if self.payer.trim().is_empty() {
            return Err(EngineError::Validation(
                "contract payer must not be empty".to_string(),
            ));
        }
        if self.splitters.is_empty() {
            return Err(EngineError::Validation(format!(
                "contract {} has no splitters",
                self.id
            )));
        }
        let itemized = self
            .splitters
            .iter()
            .try_fold(Amount::ZERO, |acc, splitter| {
                acc.checked_add(splitter.total()?).ok_or_else(|| {
                    EngineError::Validation("contract total overflows".to_string())
                })
            })?;
        if itemized != self.total_cost {
            return Err(EngineError::Validation(format!(
                "contract {} declares total {} but items sum to {itemized}",
                self.id, self.total_cost
            )));
        }
        Ok(itemized)
    }
}

/// An elementary debt: `debtor` owes `creditor` `amount` because of
/// `contract_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEdge {
    pub contract_id: Uuid,
    pub debtor: String,
    pub creditor: String,
    pub amount: Amount,
}

/// Normalizes contracts into ledger edges, preserving input order.
///
/// Self-loops (the payer listed as a splitter) and zero amounts produce no
/// edge. Every contract is validated first, so a malformed contract fails the
/// whole batch.
pub fn ledger_edges(contracts: &[Contract]) -> ResultEngine<Vec<LedgerEdge>> {
    let mut edges = Vec::new();
    for contract in contracts {
        contract.validate()?;
        for splitter in &contract.splitters {
            if splitter.participant_id == contract.payer {
                continue;
            }
            let amount = splitter.total()?;
            if amount.is_zero() {
                continue;
            }
            edges.push(LedgerEdge {
                contract_id: contract.id,
                debtor: splitter.participant_id.clone(),
                creditor: contract.payer.clone(),
                amount,
            });
        }
    }
    Ok(edges)
}
