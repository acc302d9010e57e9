use crate::error::{Result, StarboardError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Where the API token may come from, in lookup order.
#[derive(Debug, Clone)]
pub struct TokenSource {
    pub env_var: String,
    pub file: Option<PathBuf>,
}

impl TokenSource {
    pub fn new(env_var: impl Into<String>, file: Option<PathBuf>) -> Self {
        Self {
            env_var: env_var.into(),
            file,
        }
    }

    /// Environment variable first, then the token file.
    pub fn resolve(&self) -> Result<String> {
        self.resolve_with(std::env::var(&self.env_var).ok())
    }

    fn resolve_with(&self, env_value: Option<String>) -> Result<String> {
        if let Some(token) = env_value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            debug!(env = %self.env_var, "using token from environment");
            return Ok(token);
        }

        let Some(file) = &self.file else {
            return Err(StarboardError::Credentials(format!(
                "{} is not set and no token file was given",
                self.env_var
            )));
        };

        info!(
            env = %self.env_var,
            file = %file.display(),
            "token variable not set, reading token file"
        );
        read_token_file(file)
    }
}

fn read_token_file(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path).map_err(|e| {
        StarboardError::Credentials(format!("failed to read token file {}: {e}", path.display()))
    })?;
    let token = raw.trim();
    if token.is_empty() {
        return Err(StarboardError::Credentials(format!(
            "token file {} is empty",
            path.display()
        )));
    }
    Ok(token.to_string())
}
