//! Conversion from engine errors to executor errors.

use sieve_engine::Error as EngineError;
use sieve_search::QueryError;

use crate::Error;

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        let reason = err.to_string();
        match err {
            EngineError::IndexNotFound(index) => Error::IndexNotFound { index },
            EngineError::IndexExists(index) => Error::IndexExists { index },
            EngineError::WrongType { key, actual } => Error::WrongType {
                key,
                actual: actual.to_string(),
            },
            EngineError::InvalidArgument(_) => Error::InvalidInput { reason },
            EngineError::Schema(_) => Error::Schema { reason },
            EngineError::Config(_) => Error::Config { reason },
            EngineError::Query(query) => match query {
                QueryError::Syntax { .. } => Error::Syntax { reason },
                QueryError::UndefinedOrdering { field } => Error::UndefinedOrdering { field, reason },
                QueryError::Timeout | QueryError::ExpansionLimit { .. } => Error::QueryLimit { reason },
                _ => Error::Query { reason },
            },
            EngineError::Background(_) => Error::Internal { reason },
        }
    }
}
