// Secret-parameter store: a directory holding one value per file
// (`USERNAME`, `PASSWORD`), the layout used for mounted secrets.

use std::fmt;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::SecretError;

pub const USERNAME: &str = "USERNAME";
pub const PASSWORD: &str = "PASSWORD";

/// Database credentials. The password never appears in `Debug` output.
#[derive(Clone)]
pub struct DbCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub struct SecretStore {
    dir: PathBuf,
}

impl SecretStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn read(&self, name: &'static str) -> Result<String, SecretError> {
        let path = self.dir.join(name);
        let value = read_to_string(&path)
            .map(|s| s.trim().to_string())
            .map_err(|source| {
                warn!("Failed to read {name} from secret store: {source}");
                SecretError::Unreadable {
                    name,
                    path: path.display().to_string(),
                    source,
                }
            })?;
        if value.is_empty() {
            return Err(SecretError::Empty { name });
        }
        Ok(value)
    }

    /// Load the database username and password.
    pub fn db_credentials(&self) -> Result<DbCredentials, SecretError> {
        let credentials = DbCredentials {
            username: self.read(USERNAME)?,
            password: self.read(PASSWORD)?,
        };
        info!(username = %credentials.username, "database credentials loaded");
        Ok(credentials)
    }
}
