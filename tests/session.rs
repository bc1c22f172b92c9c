mod common;

use common::{config, meal_body, person_body, Answer::*, ScriptedTerminal, BYU_ID, TOKEN};
use cougar_craves::error::{report, ApiError, AppError, StorageError};
use cougar_craves::model::ChoiceKind;
use cougar_craves::secrets::SecretStore;
use cougar_craves::store::PreferenceStore;
use cougar_craves::ui;
use mockito::{Mock, Server, ServerGuard};
use tempfile::tempdir;

const LOCATIONS_PATH: &str = "/domains/mobile/dining-services/v1/locations";

fn identity_mock(server: &mut ServerGuard, status: usize) -> Mock {
    server
        .mock("GET", format!("/persons/v3/{BYU_ID}").as_str())
        .match_header("authorization", format!("Bearer {TOKEN}").as_str())
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(person_body(BYU_ID, "Cosmo"))
        .create()
}

fn app_error(err: &anyhow::Error) -> &AppError {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<AppError>())
        .expect("failure should carry an AppError")
}

#[test]
fn save_location_then_browse_and_clear_history() {
    let mut server = Server::new();
    identity_mock(&mut server, 200);
    server
        .mock("GET", LOCATIONS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"name": "Cannon Commons", "latitude": 40.2518, "longitude": -111.6493}]"#)
        .create();
    let dir = tempdir().unwrap();
    let config = config(&server.url(), dir.path());

    let mut term = ScriptedTerminal::new(vec![
        Type("too-short"),
        Type(TOKEN),
        Type("12345"),
        Type("12345678x"),
        Type(BYU_ID),
        Pick("Get dining ideas"),
        Pick("Eating out"),
        Pick("Yes, please!"),
        Pick("Go back to main menu"),
        Pick("View my previous records"),
        Pick("View the details of a specific record"),
        Pick("1"),
        Pick("Go back to my records"),
        Pick("Delete all my records"),
        Pick("Yes"),
        Pick("Go back to my records"),
        Pick("Exit the program"),
    ]);

    ui::run(&mut term, &config).unwrap();
    assert!(term.finished());
    assert_eq!(term.rejected.len(), 3);

    let printed = term.printed();
    assert!(printed.contains("Hi, Cosmo! Welcome to Cougar Craves."));
    assert!(printed.contains("Location name: Cannon Commons"));
    assert!(printed.contains("We have recorded your preference."));
    assert!(printed.contains("Cosmo's Dining Preferences"));
    assert!(printed.contains("This location was suggested for you on"));
    assert!(printed.contains("You have successfully deleted all your records."));
    assert!(printed.contains("You have never logged a dining preference in Cougar Craves."));
}

#[test]
fn saved_recipe_keeps_displayed_ingredients() {
    let mut server = Server::new();
    identity_mock(&mut server, 200);
    let instructions = "Stir. ".repeat(1000);
    server
        .mock("GET", "/random.php")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(meal_body("Teriyaki Chicken Casserole", 3, &instructions))
        .create();
    let dir = tempdir().unwrap();
    let config = config(&server.url(), dir.path());

    let mut term = ScriptedTerminal::new(vec![
        Type(TOKEN),
        Type(BYU_ID),
        Pick("Get dining ideas"),
        Pick("Eating in"),
        Pick("Yes, please!"),
        Pick("Exit the program"),
    ]);
    ui::run(&mut term, &config).unwrap();

    let credentials = SecretStore::new(&config.secrets_dir).db_credentials().unwrap();
    let store = PreferenceStore::open(config.store.clone(), credentials).unwrap();
    let records = store.list_by_identifier(BYU_ID).unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.choice_kind, ChoiceKind::EatIn);
    assert_eq!(record.display_name, "Cosmo");
    assert_eq!(record.dish_name.as_deref(), Some("Teriyaki Chicken Casserole"));
    assert_eq!(
        record.ingredients.as_deref(),
        Some("1 cups Ingredient 1\n2 cups Ingredient 2\n3 cups Ingredient 3")
    );
    assert_eq!(record.instructions.as_ref().map(|i| i.chars().count()), Some(3999));
    assert!(record.location_name.is_none());
}

#[test]
fn declining_to_save_and_fasting_leave_no_history() {
    let mut server = Server::new();
    identity_mock(&mut server, 200);
    server
        .mock("GET", "/random.php")
        .with_status(200)
        .with_body(meal_body("Toast", 1, "Toast it."))
        .create();
    let dir = tempdir().unwrap();
    let config = config(&server.url(), dir.path());

    let mut term = ScriptedTerminal::new(vec![
        Type(TOKEN),
        Type(BYU_ID),
        Pick("Get dining ideas"),
        Pick("Eating in"),
        Pick("No, thank you."),
        Pick("Go back to main menu"),
        Pick("Get dining ideas"),
        Pick("Actually, never mind. I'm going to fast today. Bye!"),
    ]);
    ui::run(&mut term, &config).unwrap();
    assert!(term.finished());
    assert!(term.printed().contains("Well, see you next time then!"));

    let credentials = SecretStore::new(&config.secrets_dir).db_credentials().unwrap();
    let store = PreferenceStore::open(config.store.clone(), credentials).unwrap();
    assert!(store.list_by_identifier(BYU_ID).unwrap().is_empty());
}

#[test]
fn delete_one_and_decline_delete_all() {
    let mut server = Server::new();
    identity_mock(&mut server, 200);
    let dir = tempdir().unwrap();
    let config = config(&server.url(), dir.path());

    let credentials = SecretStore::new(&config.secrets_dir).db_credentials().unwrap();
    let store = PreferenceStore::open(config.store.clone(), credentials).unwrap();
    store.insert_location(BYU_ID, "Cosmo", "Cannon Commons").unwrap();
    store.insert_location(BYU_ID, "Cosmo", "Cougareat").unwrap();

    let mut term = ScriptedTerminal::new(vec![
        Type(TOKEN),
        Type(BYU_ID),
        Pick("View my previous records"),
        Pick("Delete a specific record"),
        Pick("1"),
        Pick("Go back to my records"),
        Pick("Delete all my records"),
        Pick("No"),
        Pick("Go back to my records"),
        Pick("Go back to main menu"),
        Pick("Exit this program"),
    ]);
    ui::run(&mut term, &config).unwrap();
    assert!(term.finished());

    let printed = term.printed();
    assert!(printed.contains("You have successfully deleted record with choice ID = 1."));
    assert!(printed.contains("We won't delete your records then."));
    assert!(printed.contains("Alright, see you next time!"));

    let left = store.list_by_identifier(BYU_ID).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].location_name.as_deref(), Some("Cougareat"));
}

#[test]
fn expired_token_ends_with_auth_error() {
    let mut server = Server::new();
    identity_mock(&mut server, 401);
    let dir = tempdir().unwrap();
    let config = config(&server.url(), dir.path());

    let mut term = ScriptedTerminal::new(vec![Type(TOKEN), Type(BYU_ID)]);
    let err = ui::run(&mut term, &config).unwrap_err();
    let app = app_error(&err);
    assert_eq!(app.exit_code(), 1);
    assert!(app.user_message().contains("hasn't expired"));
}

#[test]
fn unknown_identifier_ends_the_session() {
    let mut server = Server::new();
    server
        .mock("GET", format!("/persons/v3/{BYU_ID}").as_str())
        .with_status(404)
        .create();
    let dir = tempdir().unwrap();
    let config = config(&server.url(), dir.path());

    let mut term = ScriptedTerminal::new(vec![Type(TOKEN), Type(BYU_ID)]);
    let err = ui::run(&mut term, &config).unwrap_err();
    let app = app_error(&err);
    assert!(matches!(app, AppError::UnknownIdentity(id) if id == BYU_ID));
    assert_eq!(app.exit_code(), 4);
}

#[test]
fn missing_database_is_reported_before_menus() {
    let mut server = Server::new();
    let identity = server
        .mock("GET", format!("/persons/v3/{BYU_ID}").as_str())
        .expect(0)
        .create();
    let dir = tempdir().unwrap();
    let mut config = config(&server.url(), dir.path());
    config.store.bootstrap = false;

    let mut term = ScriptedTerminal::new(vec![Type(TOKEN), Type(BYU_ID)]);
    let err = ui::run(&mut term, &config).unwrap_err();
    assert!(matches!(
        app_error(&err),
        AppError::Storage(StorageError::Unreachable(_))
    ));
    assert_eq!(app_error(&err).exit_code(), 2);
    identity.assert();
}

#[test]
fn identity_outage_is_reported_as_busy() {
    let mut server = Server::new();
    identity_mock(&mut server, 503);
    let dir = tempdir().unwrap();
    let config = config(&server.url(), dir.path());

    let mut term = ScriptedTerminal::new(vec![Type(TOKEN), Type(BYU_ID)]);
    let err = ui::run(&mut term, &config).unwrap_err();
    let app = app_error(&err);
    assert!(matches!(app, AppError::Api(ApiError::Unavailable { .. })));
    assert_eq!(app.exit_code(), 3);
    let (message, _) = report(&err);
    assert!(!message.contains("no student"));
}

#[test]
fn recipe_outage_mid_session_ends_the_program() {
    let mut server = Server::new();
    identity_mock(&mut server, 200);
    server.mock("GET", "/random.php").with_status(500).create();
    let dir = tempdir().unwrap();
    let config = config(&server.url(), dir.path());

    let mut term = ScriptedTerminal::new(vec![
        Type(TOKEN),
        Type(BYU_ID),
        Pick("Get dining ideas"),
        Pick("Eating in"),
    ]);
    let err = ui::run(&mut term, &config).unwrap_err();
    assert!(term.finished());
    assert_eq!(app_error(&err).exit_code(), 3);
    let (message, _) = report(&err);
    assert_eq!(message, "We can't come up with a recipe for you right now. Sorry.");
}

#[test]
fn dining_subscription_missing_mid_session_ends_the_program() {
    let mut server = Server::new();
    identity_mock(&mut server, 200);
    server.mock("GET", LOCATIONS_PATH).with_status(403).create();
    let dir = tempdir().unwrap();
    let config = config(&server.url(), dir.path());

    let mut term = ScriptedTerminal::new(vec![
        Type(TOKEN),
        Type(BYU_ID),
        Pick("Get dining ideas"),
        Pick("Eating out"),
    ]);
    let err = ui::run(&mut term, &config).unwrap_err();
    assert!(term.finished());
    let app = app_error(&err);
    assert_eq!(app.exit_code(), 1);
    assert!(app.user_message().contains("Mobile Dining Services API"));

    let credentials = SecretStore::new(&config.secrets_dir).db_credentials().unwrap();
    let store = PreferenceStore::open(config.store.clone(), credentials).unwrap();
    assert!(store.list_by_identifier(BYU_ID).unwrap().is_empty());
}
