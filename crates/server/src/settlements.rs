//! Settlement endpoints: calculate, submit and history.

use axum::{Extension, Json, extract::State};
use uuid::Uuid;

use api_types::{
    Data,
    hangout::HangoutCode,
    settlement::{
        CalculateRequest, HistoryResponse, RelationView, RelationsResponse, SettlementView,
        SubmitRequest, SubmitResponse,
    },
};
use engine::{Amount, EngineError, Relation, SubmitSettlementCmd};

use crate::{ServerError, server::ServerState, user};

fn parse_contract_ids(ids: &[String]) -> Result<Vec<Uuid>, ServerError> {
    ids.iter()
        .map(|id| {
            Uuid::parse_str(id).map_err(|_| {
                ServerError::from(EngineError::InvalidId(format!("invalid contract id: {id}")))
            })
        })
        .collect()
}

fn relation_view(relation: Relation) -> RelationView {
    RelationView {
        creditor: relation.creditor,
        debtor: relation.debtor,
        amount: relation.amount.minor(),
    }
}

fn relation_from_wire(view: RelationView) -> Relation {
    Relation::new(view.creditor, view.debtor, Amount::new(view.amount))
}

pub async fn calculate(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CalculateRequest>,
) -> Result<Json<Data<RelationsResponse>>, ServerError> {
    let contract_ids = parse_contract_ids(&payload.submit_contracts)?;
    let relations = state
        .engine
        .calculate_settlement(&payload.hangout_code, &contract_ids, &user.username)
        .await?
        .into_iter()
        .map(relation_view)
        .collect();

    Ok(Json(Data::new(RelationsResponse { relations })))
}

pub async fn submit(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<Data<SubmitResponse>>, ServerError> {
    let contract_ids = parse_contract_ids(&payload.submit_contracts)?;
    let relations = payload
        .submit_relations
        .into_iter()
        .map(relation_from_wire)
        .collect();
    let cmd = SubmitSettlementCmd::new(
        payload.hangout_code,
        user.username.as_str(),
        contract_ids,
        relations,
    );

    let record = state.engine.submit_settlement(cmd).await?;
    tracing::info!(
        settlement = %record.id,
        hangout = %record.hangout_code,
        contracts = record.contract_ids.len(),
        "settlement submitted"
    );
    Ok(Json(Data::new(SubmitResponse {
        settlement_id: record.id,
        relations: record.relations.into_iter().map(relation_view).collect(),
    })))
}

pub async fn history(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<HangoutCode>,
) -> Result<Json<Data<HistoryResponse>>, ServerError> {
    let settlements = state
        .engine
        .settlement_history(&payload.hangout_code, &user.username)
        .await?
        .into_iter()
        .map(|record| SettlementView {
            id: record.id,
            submitted_by: record.submitted_by,
            submitted_at: record.submitted_at,
            strategy: record.strategy.as_str().to_string(),
            contracts: record.contract_ids,
            relations: record.relations.into_iter().map(relation_view).collect(),
        })
        .collect();

    Ok(Json(Data::new(HistoryResponse { settlements })))
}
