use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrioritizerError {
    #[error("{0}")]
    Validation(String),

    #[error("Completion service error{}: {body}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    RemoteService { status: Option<u16>, body: String },

    #[error("Access denied: the free trial has been used, a valid password is required")]
    AccessDenied,

    #[error("A prioritization request is already running")]
    Busy,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Project not initialized. Run 'prioritizer init' first.")]
    NotInitialized,

    #[error("Project already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PrioritizerError {
    pub fn remote(status: Option<u16>, body: impl Into<String>) -> Self {
        PrioritizerError::RemoteService {
            status,
            body: body.into(),
        }
    }

    /// Bad user input: reported as a warning rather than an error.
    pub fn is_validation(&self) -> bool {
        matches!(self, PrioritizerError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, PrioritizerError>;
