use sea_orm::DatabaseConnection;

use crate::{ResultEngine, SettlementStrategy};

mod access;
mod contracts;
mod hangouts;
mod settlements;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    strategy: SettlementStrategy,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Strategy used by `calculate_settlement` and `submit_settlement`.
    pub fn strategy(&self) -> SettlementStrategy {
        self.strategy
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    strategy: SettlementStrategy,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pick the settlement strategy (defaults to pairwise netting).
    pub fn strategy(mut self, strategy: SettlementStrategy) -> EngineBuilder {
        self.strategy = strategy;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            strategy: self.strategy,
        })
    }
}
