// Plain data shared by the API clients, the preference store and the UI.

use chrono::{DateTime, Utc};
use strum::{AsRefStr, Display, EnumString};

/// Who is using the program. Built once after the identity lookup succeeds
/// and passed by reference through the dispatcher; never persisted. The
/// access token stays with the API client.
#[derive(Debug, Clone)]
pub struct Session {
    pub identifier: String,
    pub display_name: String,
}

/// Result of a successful identity lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub name: String,
    /// "{measure} {ingredient}" lines in the order the API numbers them.
    pub ingredients: Vec<String>,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A freshly fetched idea that has not been saved (and may never be).
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    Recipe(Recipe),
    Location(Location),
}

impl Suggestion {
    pub fn kind(&self) -> ChoiceKind {
        match self {
            Suggestion::Recipe(_) => ChoiceKind::EatIn,
            Suggestion::Location(_) => ChoiceKind::EatOut,
        }
    }
}

/// Stored in the `choice_kind` column as `eat_in` / `eat_out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum ChoiceKind {
    #[strum(serialize = "eat_in")]
    EatIn,
    #[strum(serialize = "eat_out")]
    EatOut,
}

/// One saved row of the preferences table. Recipe rows carry the dish
/// fields, location rows carry `location_name`; never both.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceRecord {
    pub choice_id: i64,
    pub identifier: String,
    pub display_name: String,
    pub choice_kind: ChoiceKind,
    pub timestamp: DateTime<Utc>,
    pub dish_name: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub location_name: Option<String>,
}
