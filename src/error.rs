use thiserror::Error;

pub type Result<T> = std::result::Result<T, StarboardError>;

#[derive(Error, Debug)]
pub enum StarboardError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Statistics for {0} are still being computed")]
    StatsPending(String),
    #[error("Credentials error: {0}")]
    Credentials(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Git command failed: {0}")]
    GitCommand(String),
    #[error("Git discover error: {0}")]
    GitDiscover(#[from] Box<gix::discover::Error>),
    #[error("Other: {0}")]
    Other(String),
}

impl From<gix::discover::Error> for StarboardError {
    fn from(err: gix::discover::Error) -> Self {
        StarboardError::GitDiscover(Box::new(err))
    }
}
