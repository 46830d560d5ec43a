use sea_orm::DatabaseConnection;

mod alerts;
mod analytics;
mod budgets;
mod categories;
mod predictions;
mod query;
mod transactions;
mod users;

pub use analytics::{CategorySpend, Insights, MonthlyPoint};
pub use budgets::BudgetStatus;
pub use predictions::{CategoryPrediction, MonthlyPrediction, PredictionInsights};
pub use query::QueryAnswer;
pub use transactions::{NewTransaction, TransactionRecord};

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
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> crate::EngineResult<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
