// API client module: a small blocking HTTP client for the three upstream
// services (identity lookup, campus dining locations, random recipes).

use std::collections::HashMap;

use rand::Rng;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Endpoints;
use crate::error::ApiError;
use crate::model::{Identity, Location, Recipe};

pub const IDENTITY_API: &str = "Persons-v3 API";
pub const DINING_API: &str = "Mobile Dining Services API";
pub const RECIPE_API: &str = "TheMealDB API";

/// TheMealDB numbers ingredient/measure pairs 1 through 20.
pub const MAX_INGREDIENTS: usize = 20;

/// Holds the reqwest blocking client, the upstream base URLs and the bearer
/// token once the user has entered it.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoints: Endpoints,
    token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PersonEnvelope {
    basic: Option<PersonBasic>,
}

#[derive(Deserialize, Debug)]
struct PersonBasic {
    byu_id: Option<ValueField>,
    first_name: Option<ValueField>,
}

#[derive(Deserialize, Debug)]
struct ValueField {
    value: Option<String>,
}

/// One entry of the dining locations array. Only the fields we show are
/// kept; coordinates arrive either as numbers or numeric strings.
#[derive(Deserialize, Debug, Clone)]
pub struct DiningLocation {
    pub name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: f64,
}

#[derive(Deserialize, Debug)]
struct MealsEnvelope {
    meals: Option<Vec<HashMap<String, Value>>>,
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("coordinate out of range")),
        Value::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected a coordinate, found {other}"
        ))),
    }
}

impl ApiClient {
    pub fn new(endpoints: Endpoints) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(endpoints.timeout)
            .build()
            .map_err(|e| ApiError::unavailable("HTTP client", e))?;
        Ok(ApiClient {
            client,
            endpoints,
            token: None,
        })
    }

    /// Store the bearer token for the authenticated APIs.
    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    fn auth_headers(&self, api: &'static str) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        let token = self
            .token
            .as_deref()
            .ok_or(ApiError::Unauthenticated { api })?;
        // A token with characters that cannot go in a header can never be valid.
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::Unauthenticated { api })?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    fn get_authorized(&self, api: &'static str, url: &str) -> Result<Response, ApiError> {
        debug!(%url, api, "sending authorized request");
        let res = self
            .client
            .get(url)
            .headers(self.auth_headers(api)?)
            .send()
            .map_err(|e| ApiError::unavailable(api, e))?;
        match res.status() {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthenticated { api }),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden { api }),
            status => {
                debug!(%status, api, "response received");
                Ok(res)
            }
        }
    }

    /// Look up the person behind `identifier`.
    ///
    /// `Ok(None)` means the lookup went through but names nobody: a 4xx other
    /// than 401/403, or a body without the id/first-name fields. A 5xx is an
    /// outage, not an answer.
    pub fn resolve_identity(&self, identifier: &str) -> Result<Option<Identity>, ApiError> {
        let url = format!("{}/persons/v3/{}", self.endpoints.identity, identifier);
        let res = self.get_authorized(IDENTITY_API, &url)?;
        let status = res.status();
        if status.is_server_error() {
            return Err(ApiError::unavailable(IDENTITY_API, status));
        }
        if !status.is_success() {
            warn!(%status, "identity lookup did not resolve");
            return Ok(None);
        }
        let envelope: PersonEnvelope = match res.json() {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "identity response was not a person envelope");
                return Ok(None);
            }
        };
        let basic = match envelope.basic {
            Some(basic) => basic,
            None => return Ok(None),
        };
        let id = basic.byu_id.and_then(|f| f.value);
        let first_name = basic.first_name.and_then(|f| f.value);
        Ok(match (id, first_name) {
            (Some(id), Some(display_name)) => {
                info!(%id, "identity resolved");
                Some(Identity { id, display_name })
            }
            _ => None,
        })
    }

    /// Fetch every dining location.
    pub fn list_locations(&self) -> Result<Vec<DiningLocation>, ApiError> {
        let url = format!(
            "{}/domains/mobile/dining-services/v1/locations",
            self.endpoints.dining
        );
        let res = self.get_authorized(DINING_API, &url)?;
        if !res.status().is_success() {
            return Err(ApiError::unavailable(DINING_API, res.status()));
        }
        res.json().map_err(|e| ApiError::unavailable(DINING_API, e))
    }

    /// Fetch the dining locations and pick one uniformly at random.
    pub fn fetch_random_location<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Location, ApiError> {
        let locations = self.list_locations()?;
        info!(count = locations.len(), "dining locations fetched");
        pick_location(&locations, rng)
            .ok_or_else(|| ApiError::unavailable(DINING_API, "no dining locations listed"))
    }

    /// Fetch one random recipe. Any failure, including an empty `meals`
    /// list, means no recipe is available.
    pub fn fetch_random_recipe(&self) -> Result<Recipe, ApiError> {
        let url = format!("{}/random.php", self.endpoints.recipe);
        debug!(%url, "requesting random recipe");
        let res = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ApiError::unavailable(RECIPE_API, e))?;
        if !res.status().is_success() {
            return Err(ApiError::unavailable(RECIPE_API, res.status()));
        }
        let envelope: MealsEnvelope = res
            .json()
            .map_err(|e| ApiError::unavailable(RECIPE_API, e))?;
        let meal = envelope
            .meals
            .and_then(|meals| meals.into_iter().next())
            .ok_or_else(|| ApiError::unavailable(RECIPE_API, "no meals in response"))?;
        recipe_from_meal(&meal)
    }
}

/// Uniform pick over the whole list as returned, so the range always
/// matches what upstream actually serves.
pub fn pick_location<R: Rng + ?Sized>(locations: &[DiningLocation], rng: &mut R) -> Option<Location> {
    if locations.is_empty() {
        return None;
    }
    let chosen = &locations[rng.gen_range(0..locations.len())];
    Some(Location {
        name: chosen.name.clone(),
        latitude: chosen.latitude,
        longitude: chosen.longitude,
    })
}

fn text_field<'a>(meal: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    meal.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Collect "{measure} {ingredient}" lines from slots 1..=20, stopping at the
/// first empty ingredient slot. Slots after that gap are not looked at.
pub fn collect_ingredients(meal: &HashMap<String, Value>) -> Vec<String> {
    let mut ingredients = Vec::new();
    for i in 1..=MAX_INGREDIENTS {
        let Some(ingredient) = text_field(meal, &format!("strIngredient{i}")) else {
            break;
        };
        match text_field(meal, &format!("strMeasure{i}")) {
            Some(measure) => ingredients.push(format!("{measure} {ingredient}")),
            None => ingredients.push(ingredient.to_string()),
        }
    }
    ingredients
}

fn recipe_from_meal(meal: &HashMap<String, Value>) -> Result<Recipe, ApiError> {
    let name = text_field(meal, "strMeal")
        .ok_or_else(|| ApiError::unavailable(RECIPE_API, "meal has no name"))?;
    let instructions = meal
        .get("strInstructions")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Ok(Recipe {
        name: name.to_string(),
        ingredients: collect_ingredients(meal),
        instructions: instructions.to_string(),
    })
}
