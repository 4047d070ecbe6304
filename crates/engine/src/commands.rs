//! Command structs for engine operations.
//!
//! These types group parameters for write operations (contract creation and
//! settlement submission), keeping call sites readable and avoiding long
//! argument lists.

use uuid::Uuid;

use crate::{Amount, Relation, Splitter};

/// Record a contract in a hangout.
#[derive(Clone, Debug)]
pub struct MakeContractCmd {
    pub hangout_code: String,
    pub name: String,
    pub description: Option<String>,
    pub payer: String,
    pub splitters: Vec<Splitter>,
    pub total_cost: Amount,
    pub user_id: String,
}

impl MakeContractCmd {
    #[must_use]
    pub fn new(
        hangout_code: impl Into<String>,
        user_id: impl Into<String>,
        payer: impl Into<String>,
        splitters: Vec<Splitter>,
        total_cost: Amount,
    ) -> Self {
        Self {
            hangout_code: hangout_code.into(),
            name: String::new(),
            description: None,
            payer: payer.into(),
            splitters,
            total_cost,
            user_id: user_id.into(),
        }
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
}

/// Confirm a calculated settlement for a set of pending contracts.
#[derive(Clone, Debug)]
pub struct SubmitSettlementCmd {
    pub hangout_code: String,
    pub contract_ids: Vec<Uuid>,
    pub relations: Vec<Relation>,
    pub user_id: String,
}

impl SubmitSettlementCmd {
    #[must_use]
    pub fn new(
        hangout_code: impl Into<String>,
        user_id: impl Into<String>,
        contract_ids: Vec<Uuid>,
        relations: Vec<Relation>,
    ) -> Self {
        Self {
            hangout_code: hangout_code.into(),
            contract_ids,
            relations,
            user_id: user_id.into(),
        }
    }
}
