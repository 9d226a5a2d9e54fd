use thiserror::Error;

/// Errors raised while mapping routes into a route collection.
///
/// `InvalidArgument` signals a misconfigured caller and is never retried.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("invalid argument `{param}`: {reason}")]
    InvalidArgument {
        param: &'static str,
        reason: &'static str,
    },
    #[error("route `{0}` is already registered")]
    DuplicateRoute(String),
    #[error("route table serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RoutingError {
    pub fn invalid(param: &'static str, reason: &'static str) -> Self {
        RoutingError::InvalidArgument { param, reason }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, RoutingError::InvalidArgument { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse failed: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
