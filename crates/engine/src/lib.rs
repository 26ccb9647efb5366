pub mod expr;
pub mod history;

pub use expr::{evaluate_expression, AngleUnit, EvalError};
pub use history::{History, HistoryItem};
