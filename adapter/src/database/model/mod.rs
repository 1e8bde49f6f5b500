pub mod catalog;
pub mod check_in_out;
pub mod contract;
pub mod payment;
pub mod reservation;

use std::str::FromStr;

use shared::error::{AppError, AppResult};

/// Parses a status or category column stored as text.
pub(crate) fn parse_column<T>(column: &str, value: &str) -> AppResult<T>
where
    T: FromStr,
{
    value.parse::<T>().map_err(|_| {
        AppError::ConversionEntityError(format!("unexpected {column} value: {value}"))
    })
}
