//! Persistence and domain logic for the personal finance tracker.
//!
//! The [`Engine`] wraps a SeaORM connection and exposes every operation the
//! server needs: accounts, categories, transactions, budgets with alerting,
//! analytics, spending predictions and the natural-language query answers.
//! Amounts are stored in minor units of their currency together with an
//! INR-normalised copy so budgets and reports compare like with like.

pub mod alerts;
pub mod auth;
pub mod budgets;
pub mod categories;
pub mod currency;
pub mod error;
pub mod money;
pub mod ops;
pub mod rates;
pub mod transactions;
pub mod users;
pub mod util;

pub use currency::Currency;
pub use error::EngineError;
pub use ops::{Engine, EngineBuilder};

pub type EngineResult<T> = Result<T, EngineError>;
