// Error taxonomy shared by every layer. Library functions return one of the
// typed errors below; the binary folds them into `AppError` and decides the
// exit code exactly once, in `main`.

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Rejected interactive input. Always recovered by re-prompting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputValidationError {
    #[error("Please put in the correct access token from your WSO2.")]
    TokenTooShort,
    #[error("Please type in your 9-digit BYU ID, numbers only.")]
    MalformedIdentifier,
}

/// Failures talking to the identity, dining or recipe APIs.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 401: the token is wrong or has expired.
    #[error("{api} rejected the access token")]
    Unauthenticated { api: &'static str },
    /// HTTP 403: the token is valid but lacks a subscription.
    #[error("{api} refused access for this token")]
    Forbidden { api: &'static str },
    #[error("{api} is unavailable: {reason}")]
    Unavailable { api: &'static str, reason: String },
}

impl ApiError {
    pub(crate) fn unavailable(api: &'static str, reason: impl ToString) -> Self {
        ApiError::Unavailable {
            api,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    /// The database could not be reached at all (missing file, bad path,
    /// permissions, or no credentials).
    #[error("database unreachable: {0}")]
    Unreachable(String),
    /// Connected, but the preferences table is not there.
    #[error("preferences table missing: {0}")]
    SchemaMissing(String),
    #[error("database query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("stored record is malformed: {0}")]
    CorruptRecord(String),
}

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret parameter {name} could not be read from {path}: {source}")]
    Unreadable {
        name: &'static str,
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("secret parameter {name} is empty")]
    Empty { name: &'static str },
}

#[derive(Debug, Error)]
#[error("no transition from {from} on {event}")]
pub struct NavError {
    pub from: String,
    pub event: String,
}

#[derive(Debug, Error)]
#[error("invalid value for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub reason: String,
}

/// Every fatal condition the program can end on.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Secret(#[from] SecretError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Nav(#[from] NavError),
    #[error("no person found for identifier {0}")]
    UnknownIdentity(String),
    #[error("terminal interaction failed: {0}")]
    Terminal(#[from] io::Error),
}

impl AppError {
    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Api(ApiError::Unauthenticated { .. } | ApiError::Forbidden { .. }) => 1,
            AppError::Storage(_) => 2,
            AppError::Api(ApiError::Unavailable { .. }) => 3,
            AppError::UnknownIdentity(_) => 4,
            AppError::Secret(_) | AppError::Config(_) => 5,
            AppError::Nav(_) | AppError::Terminal(_) => 6,
        }
    }

    /// Plain-language message shown to the user before the process exits.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api(ApiError::Unauthenticated { .. }) => {
                "There was an error connecting to WSO2. Please make sure you use the correct, \
                 valid token that hasn't expired."
                    .into()
            }
            AppError::Api(ApiError::Forbidden { api }) => format!(
                "There was an error connecting to WSO2. Please make sure you are subscribed to the {api}."
            ),
            AppError::Api(ApiError::Unavailable { api, .. }) if *api == crate::api::RECIPE_API => {
                "We can't come up with a recipe for you right now. Sorry.".into()
            }
            AppError::Api(ApiError::Unavailable { .. }) => {
                "Sorry, system is busy now. Maybe try again later?".into()
            }
            AppError::Storage(StorageError::Unreachable(_)) => {
                "It appears you are not connected to the database. Please check your credentials \
                 and make sure your VPN is turned on."
                    .into()
            }
            AppError::Storage(StorageError::SchemaMissing(_)) => {
                "There is an error retrieving the table. Seems like the table does not exist.".into()
            }
            AppError::Storage(_) => {
                "Sorry, the database is busy now. Maybe try again later?".into()
            }
            AppError::Secret(_) => "You are not connected to the secret parameter store.".into(),
            AppError::Config(err) => format!("Cougar Craves is misconfigured: {err}."),
            AppError::UnknownIdentity(_) => "There is no student associated with that ID.".into(),
            AppError::Nav(_) | AppError::Terminal(_) => {
                "Something went wrong with the terminal. Please try again.".into()
            }
        }
    }
}

/// Maps a top-level failure to the message and exit code it ends with.
/// Errors that never went through `AppError` count as internal failures.
pub fn report(err: &anyhow::Error) -> (String, ExitCode) {
    match err.chain().find_map(|cause| cause.downcast_ref::<AppError>()) {
        Some(app) => (app.user_message(), ExitCode::from(app.exit_code())),
        None => (format!("Unexpected failure: {err:#}"), ExitCode::from(6)),
    }
}
