//! Error kinds surfaced by the scoring pipeline.

/// Message shown for any chain read failure.
pub const CHECK_ADDRESS_MESSAGE: &str = "Could not fetch data. Please check the address and try again.";

/// Error type.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Rejected input (empty, ineligible address, impossible block range).
    #[error("validation: {0}")]
    Validation(String),
    /// RPC node unreachable or timed out.
    #[error("network: {0}")]
    Network(String),
    /// Malformed address, reverted call or undecodable return data.
    #[error("contract call: {0}")]
    ContractCall(String),
    /// Leaderboard store connectivity or constraint failure.
    #[error("store: {0}")]
    Store(String),
    /// Invalid or missing configuration.
    #[error("config: {0}")]
    Config(String),
}

/// Discriminant of [`Error`], kept on the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Network,
    ContractCall,
    Store,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Network(_) => ErrorKind::Network,
            Self::ContractCall(_) => ErrorKind::ContractCall,
            Self::Store(_) => ErrorKind::Store,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Text a user sees for this error.
    ///
    /// Validation messages are shown verbatim, chain failures collapse to a
    /// generic retry hint.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Network(_) | Self::ContractCall(_) => CHECK_ADDRESS_MESSAGE.to_string(),
            Self::Store(_) | Self::Config(_) => "Something went wrong.".to_string(),
        }
    }

    pub(crate) fn store(msg: impl ToString) -> Self {
        Self::Store(msg.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::Store(value.to_string())
    }
}

impl From<tokio_postgres::Error> for Error {
    fn from(value: tokio_postgres::Error) -> Self {
        Self::Store(value.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for Error {
    fn from(value: deadpool_postgres::PoolError) -> Self {
        Self::Store(value.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_errors_use_generic_message() {
        let network = Error::Network("connection refused".into());
        let revert = Error::ContractCall("execution reverted".into());

        assert_eq!(network.user_message(), CHECK_ADDRESS_MESSAGE);
        assert_eq!(revert.user_message(), CHECK_ADDRESS_MESSAGE);
        assert_eq!(revert.kind(), ErrorKind::ContractCall);
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = Error::Validation("Please enter an address".into());
        assert_eq!(err.user_message(), "Please enter an address");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
