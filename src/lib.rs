// Library root
// -----------
// Cougar Craves: sign in with a BYU identity, get a random recipe or campus
// dining location, and keep a history of the suggestions you liked.
//
// Module responsibilities:
// - `credentials`: token and identifier prompts with their validation rules.
// - `api`: blocking HTTP clients for the identity, dining and recipe APIs.
// - `secrets` / `store`: database credentials and the preferences table.
// - `nav`: the screen transition table, free of any I/O.
// - `render`: text for banners, suggestions and the history table.
// - `ui`: the terminal seam and the dispatcher that walks `nav`.
// - `config` / `error`: environment settings and the error taxonomy with
//   its exit codes.
pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod model;
pub mod nav;
pub mod render;
pub mod secrets;
pub mod store;
pub mod ui;
