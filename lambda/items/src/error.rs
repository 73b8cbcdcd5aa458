use thiserror::Error;

/// Every way a request can fail before or during its store call.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Missing routeKey: {0}")]
    MalformedEvent(String),

    #[error("Unsupported route: {0}")]
    UnsupportedRoute(String),

    #[error("Missing path parameter: {0}")]
    MissingPathParameter(&'static str),

    #[error("Missing request body")]
    MissingBody,

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("Missing required fields: itemId, name, price")]
    MissingFields,

    #[error("Invalid field types: itemId and name must be strings, price must be a number")]
    InvalidFieldTypes,

    #[error("{0}")]
    Store(String),
}

impl RouterError {
    /// Client errors and store outages share one status code.
    pub fn status_code(&self) -> u16 {
        400
    }
}
