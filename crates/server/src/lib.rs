use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod alerts;
mod analytics;
mod budgets;
mod categories;
mod currency;
mod imports;
mod predictions;
mod query;
mod server;
mod transactions;
mod user;

pub mod types {
    pub mod user {
        pub use api_types::user::{LoginUser, RegisterUser, UserView};
    }

    pub mod category {
        pub use api_types::category::{CategoryCreate, CategoryView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            ExportQuery, TransactionCreated, TransactionKind, TransactionListQuery,
            TransactionListResponse, TransactionNew, TransactionSource, TransactionView,
        };
    }

    pub mod imports {
        pub use api_types::imports::{
            ImportSummary, ParsedReceipt, ParsedSms, ReceiptImport, ReceiptImportResponse,
            ReceiptItem, SmsImport, SmsImportResponse, StatementImport,
        };
    }

    pub mod budget {
        pub use api_types::budget::{
            BudgetListQuery, BudgetPeriod, BudgetStatusView, BudgetUpsert, BudgetView,
        };
    }

    pub mod alert {
        pub use api_types::alert::{AlertListQuery, AlertView};
    }

    pub mod analytics {
        pub use api_types::analytics::{
            CategorySpend, Insights, MonthlyPoint, SpendingQuery, TrendQuery,
        };
    }

    pub mod prediction {
        pub use api_types::prediction::{
            CategoryPrediction, CategoryPredictionQuery, MonthlyPrediction, PredictionInsights,
        };
    }

    pub mod currency {
        pub use api_types::Currency;
        pub use api_types::currency::{
            ConvertRequest, ConvertResponse, RatesQuery, RatesResponse, SupportedCurrency,
        };
    }

    pub mod query {
        pub use api_types::query::{QueryAnswer, QueryRequest};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::UnknownCurrency(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
