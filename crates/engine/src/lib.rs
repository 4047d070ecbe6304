//! Settlement engine for hangout contracts.
//!
//! The pure core turns contracts into "who owes whom":
//!
//! 1. [`ledger_edges`] normalizes each contract into debtor -> creditor edges;
//! 2. [`NetBalances`] nets the edges per participant pair;
//! 3. [`reduce`] emits the final [`Relation`]s for a [`SettlementStrategy`].
//!
//! [`Engine`] wraps the core with persistence: hangouts, contracts, dry-run
//! calculation and the all-or-nothing settlement submission.

pub use balances::{NetBalances, PairKey};
pub use commands::{MakeContractCmd, SubmitSettlementCmd};
pub use error::EngineError;
pub use hangout_participants::Participant;
pub use hangouts::Hangout;
pub use ledger::{Contract, ContractStatus, Item, LedgerEdge, Splitter, ledger_edges};
pub use money::Amount;
pub use ops::{Engine, EngineBuilder};
pub use settlement::{Relation, SettlementStrategy, reduce, settle};
pub use settlements::SettlementRecord;

mod balances;
mod commands;
mod contract_items;
mod contract_splitters;
mod contracts;
mod error;
mod hangout_participants;
mod hangouts;
mod ledger;
mod money;
mod ops;
mod settlement;
mod settlement_relations;
mod settlements;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
