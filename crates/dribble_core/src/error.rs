use thiserror::Error;

/// Kind of record a `NotFound` error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Player,
    Puzzle,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Player => write!(f, "player"),
            RecordKind::Puzzle => write!(f, "puzzle"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Data access error: {0}")]
    DataAccess(String),

    #[error("Not found: {kind} {id}")]
    NotFound { kind: RecordKind, id: i64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    pub fn player_not_found(id: u32) -> Self {
        CoreError::NotFound { kind: RecordKind::Player, id: i64::from(id) }
    }

    pub fn puzzle_not_found(id: i64) -> Self {
        CoreError::NotFound { kind: RecordKind::Puzzle, id }
    }

    /// Only store failures are worth retrying; the rest need different input.
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::DataAccess(_) => true,
            CoreError::NotFound { .. } => false,
            CoreError::Validation(_) => false,
            CoreError::Config(_) => false,
        }
    }
}

impl From<ureq::Error> for CoreError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => {
                let url = response.get_url().to_string();
                let body = response.into_string().unwrap_or_default();
                CoreError::DataAccess(format!("HTTP {code} from {url}: {body}"))
            }
            ureq::Error::Transport(transport) => CoreError::DataAccess(transport.to_string()),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::DataAccess(format!("Malformed record: {err}"))
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::DataAccess(err.to_string())
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
