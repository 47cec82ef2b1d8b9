use thiserror::Error;

/// Transport-level failures from the messaging channel. Not retried by the
/// engine; the webhook boundary logs them and still acknowledges delivery.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel transport failure: {0}")]
    Transport(String),
    #[error("channel api rejected request with status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("channel i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(String),
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("render i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("lead persistence failure: {0}")]
    Persistence(String),
}

/// Registry lookup failures are recoverable: the engine logs them and
/// proceeds with the user-supplied legal name.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("registry lookup unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
