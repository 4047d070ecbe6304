use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Success envelope for contract routes: `{"data": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Failure body returned by every route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

pub mod hangout {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HangoutNew {
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HangoutCreated {
        pub code: String,
    }

    /// Request body for routes addressing a single hangout.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HangoutCode {
        pub hangout_code: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantsResponse {
        pub participants: Vec<ParticipantView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ParticipantView {
        pub id: String,
        pub joined_at: DateTime<Utc>,
    }
}

pub mod contract {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ItemView {
        pub item_name: String,
        /// Minor units, never negative.
        pub item_price: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SplitterView {
        pub user_id: String,
        #[serde(default)]
        pub item_list: Vec<ItemView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ContractNew {
        pub hangout_code: String,
        pub contract_name: String,
        pub contract_description: Option<String>,
        pub contract_payer: String,
        pub contract_splitters: Vec<SplitterView>,
        /// Must equal the sum of every item price.
        pub contract_total_cost: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContractCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ContractView {
        pub id: Uuid,
        pub contract_name: String,
        pub contract_description: Option<String>,
        pub contract_payer: String,
        pub contract_splitters: Vec<SplitterView>,
        pub contract_total_cost: i64,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
        pub settlement_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ContractStatusView {
        pub contract: ContractView,
        pub is_submitted: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContractsResponse {
        pub contracts: Vec<ContractStatusView>,
    }
}

pub mod settlement {
    use super::*;

    /// `userId2` owes `userId1` a positive `amount`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RelationView {
        #[serde(rename = "userId1")]
        pub creditor: String,
        #[serde(rename = "userId2")]
        pub debtor: String,
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CalculateRequest {
        pub hangout_code: String,
        pub submit_contracts: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RelationsResponse {
        pub relations: Vec<RelationView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubmitRequest {
        pub hangout_code: String,
        pub submit_contracts: Vec<String>,
        pub submit_relations: Vec<RelationView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubmitResponse {
        pub settlement_id: Uuid,
        pub relations: Vec<RelationView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SettlementView {
        pub id: Uuid,
        pub submitted_by: String,
        pub submitted_at: DateTime<Utc>,
        /// `pairwise` or `minimized`.
        pub strategy: String,
        pub contracts: Vec<Uuid>,
        pub relations: Vec<RelationView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryResponse {
        pub settlements: Vec<SettlementView>,
    }
}
