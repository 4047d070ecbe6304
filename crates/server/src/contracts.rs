//! Contract endpoints: make and status.

use axum::{Extension, Json, extract::State, http::StatusCode};

use api_types::{
    Data,
    contract::{
        ContractCreated, ContractNew, ContractStatusView, ContractView, ContractsResponse,
        ItemView, SplitterView,
    },
    hangout::HangoutCode,
};
use engine::{Amount, Contract, Item, MakeContractCmd, Splitter};

use crate::{ServerError, server::ServerState, user};

fn splitters_from_wire(splitters: Vec<SplitterView>) -> Result<Vec<Splitter>, ServerError> {
    splitters
        .into_iter()
        .map(|splitter| -> Result<Splitter, ServerError> {
            let items = splitter
                .item_list
                .into_iter()
                .map(|item| Item::new(item.item_name, Amount::new(item.item_price)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Splitter::new(splitter.user_id, items)?)
        })
        .collect()
}

fn contract_view(contract: Contract) -> ContractView {
    ContractView {
        id: contract.id,
        contract_name: contract.name,
        contract_description: contract.description,
        contract_payer: contract.payer,
        contract_splitters: contract
            .splitters
            .into_iter()
            .map(|splitter| SplitterView {
                user_id: splitter.participant_id,
                item_list: splitter
                    .items
                    .into_iter()
                    .map(|item| ItemView {
                        item_name: item.name,
                        item_price: item.price.minor(),
                    })
                    .collect(),
            })
            .collect(),
        contract_total_cost: contract.total_cost.minor(),
        created_by: contract.created_by,
        created_at: contract.created_at,
        settlement_id: contract.settlement_id,
    }
}

pub async fn make(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ContractNew>,
) -> Result<(StatusCode, Json<Data<ContractCreated>>), ServerError> {
    let splitters = splitters_from_wire(payload.contract_splitters)?;
    let mut cmd = MakeContractCmd::new(
        payload.hangout_code,
        user.username.as_str(),
        payload.contract_payer,
        splitters,
        Amount::new(payload.contract_total_cost),
    )
    .name(payload.contract_name);
    if let Some(description) = payload.contract_description {
        cmd = cmd.description(description);
    }

    let id = state.engine.make_contract(cmd).await?;
    tracing::info!(contract = %id, user = %user.username, "contract recorded");
    Ok((StatusCode::CREATED, Json(Data::new(ContractCreated { id }))))
}

pub async fn status(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<HangoutCode>,
) -> Result<Json<Data<ContractsResponse>>, ServerError> {
    let contracts = state
        .engine
        .hangout_contracts(&payload.hangout_code, &user.username)
        .await?
        .into_iter()
        .map(|contract| {
            let is_submitted = contract.is_submitted();
            ContractStatusView {
                contract: contract_view(contract),
                is_submitted,
            }
        })
        .collect();

    Ok(Json(Data::new(ContractsResponse { contracts })))
}
