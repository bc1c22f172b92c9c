// UI layer: the interactive menus. Screens report what the user did as a
// `nav::Event`, and `nav::next` decides where to go from there.
//
// Prompts go through the `Terminal` trait so the whole flow can be driven by
// a script in tests; `ConsoleTerminal` is the real thing built on dialoguer,
// indicatif and crossterm.

use std::io::{self, stdout};
use std::time::Duration;

use anyhow::Context;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::config::Config;
use crate::credentials;
use crate::error::{AppError, InputValidationError, NavError};
use crate::model::{ChoiceKind, PreferenceRecord, Session, Suggestion};
use crate::nav::{self, Event, Screen};
use crate::render;
use crate::secrets::SecretStore;
use crate::store::PreferenceStore;

pub type Validator<'v> = &'v dyn Fn(&str) -> Result<(), InputValidationError>;

/// Everything the program needs from the terminal.
pub trait Terminal {
    /// Show a list and return the index of the chosen item.
    fn select(&mut self, prompt: &str, items: &[String]) -> io::Result<usize>;

    /// Ask for text, re-prompting until `validate` accepts it.
    fn input(&mut self, prompt: &str, validate: Validator<'_>) -> io::Result<String>;

    fn print(&mut self, text: &str);

    fn heading(&mut self, text: &str) {
        self.print(text);
    }

    fn clear(&mut self) -> io::Result<()>;

    /// Spinner shown while a slow call is in flight.
    fn busy(&mut self, _message: &str) -> ProgressBar {
        ProgressBar::hidden()
    }
}

#[derive(Debug, Default)]
pub struct ConsoleTerminal;

impl Terminal for ConsoleTerminal {
    fn select(&mut self, prompt: &str, items: &[String]) -> io::Result<usize> {
        // `Select` is keyboard driven: arrow keys and Enter.
        Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
    }

    fn input(&mut self, prompt: &str, validate: Validator<'_>) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .validate_with(|text: &String| validate(text.as_str()))
            .interact_text()
    }

    fn print(&mut self, text: &str) {
        println!("{text}");
    }

    fn heading(&mut self, text: &str) {
        println!("{}", text.bold().blue());
    }

    fn clear(&mut self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))
    }

    fn busy(&mut self, message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

/// Collect credentials, check the database, resolve the user and run the
/// menus until they exit.
pub fn run(term: &mut dyn Terminal, config: &Config) -> anyhow::Result<()> {
    start(term, config).context("interactive session ended")
}

fn start(term: &mut dyn Terminal, config: &Config) -> Result<(), AppError> {
    term.clear()?;
    let token = credentials::collect_token(term)?;
    let identifier = credentials::collect_identifier(term)?;

    let mut api = ApiClient::new(config.endpoints.clone())?;
    api.set_token(&token);

    let secrets = SecretStore::new(&config.secrets_dir);
    debug!(dir = %secrets.dir().display(), "reading database credentials");
    let store = PreferenceStore::open(config.store.clone(), secrets.db_credentials()?)?;
    with_spinner(term, "Testing connection to the preferences database...", || {
        store.ping()
    })?;

    let identity = with_spinner(term, "Looking you up...", || {
        api.resolve_identity(&identifier)
    })?
    .ok_or_else(|| AppError::UnknownIdentity(identifier.clone()))?;

    let session = Session {
        identifier,
        display_name: identity.display_name,
    };
    info!(identifier = %session.identifier, "session started");
    Dispatcher::new(term, &api, &store, &session).run()
}

fn with_spinner<T, E>(
    term: &mut dyn Terminal,
    message: &str,
    call: impl FnOnce() -> Result<T, E>,
) -> Result<T, AppError>
where
    AppError: From<E>,
{
    let spinner = term.busy(message);
    let result = call();
    spinner.finish_and_clear();
    Ok(result?)
}

/// Walks the screens of one session. Holds the suggestion waiting to be
/// saved and the records last listed, which is all the state the screens
/// share.
pub struct Dispatcher<'a> {
    term: &'a mut dyn Terminal,
    api: &'a ApiClient,
    store: &'a PreferenceStore,
    session: &'a Session,
    pending: Option<Suggestion>,
    records: Vec<PreferenceRecord>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        term: &'a mut dyn Terminal,
        api: &'a ApiClient,
        store: &'a PreferenceStore,
        session: &'a Session,
    ) -> Self {
        Self {
            term,
            api,
            store,
            session,
            pending: None,
            records: Vec::new(),
        }
    }

    pub fn run(mut self) -> Result<(), AppError> {
        let mut screen = Screen::Welcome;
        while screen != Screen::Exit {
            let event = self.enter(screen)?;
            let to = nav::next(screen, event)?;
            debug!(from = %screen, %event, %to, "navigate");
            screen = to;
        }
        Ok(())
    }

    fn enter(&mut self, screen: Screen) -> Result<Event, AppError> {
        match screen {
            Screen::Welcome => self.welcome(),
            Screen::SuggestionMenu => self.suggestion_menu(),
            Screen::Suggestion(kind) => self.suggest(kind),
            Screen::SavePrompt(_) => self.save_prompt(),
            Screen::Saving(kind) => self.save(kind),
            Screen::MenuOrExit => self.menu_or_exit(),
            Screen::HistoryList => self.history_list(),
            Screen::HistoryDetail => self.history_detail(),
            Screen::HistoryDeleteOne => self.history_delete_one(),
            Screen::HistoryDeleteAll => self.history_delete_all(),
            Screen::RecordsOrExit => self.records_or_exit(),
            Screen::Exit => Ok(Event::Quit),
        }
    }

    /// One list prompt whose options map straight to events.
    fn choose(&mut self, prompt: &str, options: &[(&str, Event)]) -> Result<Event, AppError> {
        let labels: Vec<String> = options.iter().map(|(label, _)| label.to_string()).collect();
        let index = self.term.select(prompt, &labels)?;
        options
            .get(index)
            .map(|(_, event)| *event)
            .ok_or_else(|| AppError::Terminal(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("selection {index} out of range"),
            )))
    }

    fn farewell(&mut self, message: &str) {
        self.term.print(message);
    }

    fn welcome(&mut self) -> Result<Event, AppError> {
        if self.session.display_name.is_empty() {
            return Err(AppError::UnknownIdentity(self.session.identifier.clone()));
        }
        self.term.clear()?;
        self.term.heading(render::banner());
        self.term.print(&render::welcome(&self.session.display_name));
        let event = self.choose(
            "First of all, what would you like to do?",
            &[
                ("Get dining ideas", Event::GetSuggestion),
                ("View my previous records", Event::ViewHistory),
                ("Exit this program", Event::Quit),
            ],
        )?;
        if event == Event::Quit {
            self.farewell("Alright, see you next time!");
        }
        Ok(event)
    }

    fn suggestion_menu(&mut self) -> Result<Event, AppError> {
        let event = self.choose(
            "Alright. Where do you feel like eating today?",
            &[
                ("Eating in", Event::EatIn),
                ("Eating out", Event::EatOut),
                ("Actually, never mind. I'm going to fast today. Bye!", Event::Fast),
            ],
        )?;
        if event == Event::Fast {
            self.farewell("Well, see you next time then!");
        }
        Ok(event)
    }

    fn suggest(&mut self, kind: ChoiceKind) -> Result<Event, AppError> {
        self.term.clear()?;
        let api = self.api;
        let suggestion = match kind {
            ChoiceKind::EatIn => Suggestion::Recipe(with_spinner(
                &mut *self.term,
                "Thinking of a recipe for you...",
                || api.fetch_random_recipe(),
            )?),
            ChoiceKind::EatOut => Suggestion::Location(with_spinner(
                &mut *self.term,
                "Finding a place for you...",
                || api.fetch_random_location(&mut rand::thread_rng()),
            )?),
        };
        let text = match &suggestion {
            Suggestion::Recipe(recipe) => render::recipe(recipe),
            Suggestion::Location(location) => render::location(location),
        };
        self.term.print(&text);
        self.pending = Some(suggestion);
        Ok(Event::Shown)
    }

    fn save_prompt(&mut self) -> Result<Event, AppError> {
        let event = self.choose(
            "Would you like to save your preference (along with our suggestion) to the database?",
            &[("Yes, please!", Event::Save), ("No, thank you.", Event::Skip)],
        )?;
        if event == Event::Skip {
            self.pending = None;
        }
        Ok(event)
    }

    fn save(&mut self, kind: ChoiceKind) -> Result<Event, AppError> {
        let suggestion = self
            .pending
            .take()
            .filter(|s| s.kind() == kind)
            .ok_or_else(|| NavError {
                from: Screen::Saving(kind).to_string(),
                event: "save without a matching suggestion".into(),
            })?;
        let (store, session) = (self.store, self.session);
        with_spinner(&mut *self.term, "Saving answer...", || match &suggestion {
            Suggestion::Recipe(recipe) => store.insert_recipe(
                &session.identifier,
                &session.display_name,
                &recipe.name,
                &recipe.ingredients.join("\n"),
                &recipe.instructions,
            ),
            Suggestion::Location(location) => store.insert_location(
                &session.identifier,
                &session.display_name,
                &location.name,
            ),
        })?;
        self.term
            .print("We have recorded your preference. Thank you for using Cougar Craves!");
        Ok(Event::Saved)
    }

    /// Shared "main menu or exit" step after a suggestion or an empty
    /// history.
    fn menu_or_exit(&mut self) -> Result<Event, AppError> {
        let event = self.choose(
            "Where would you like to go now?",
            &[
                ("Go back to main menu", Event::MainMenu),
                ("Exit the program", Event::Quit),
            ],
        )?;
        if event == Event::Quit {
            self.farewell("Alright, see you next time!");
        }
        Ok(event)
    }

    fn history_list(&mut self) -> Result<Event, AppError> {
        self.term.clear()?;
        let (store, identifier) = (self.store, self.session.identifier.as_str());
        self.records = with_spinner(&mut *self.term, "Please wait...", || {
            store.list_by_identifier(identifier)
        })?;
        let Some(first) = self.records.first() else {
            self.term
                .print("You have never logged a dining preference in Cougar Craves.");
            return Ok(Event::NoRecords);
        };
        let table = render::records_table(&first.display_name, &self.records);
        self.term.print(&table);
        self.choose(
            "Next, what would you like to do?",
            &[
                ("View the details of a specific record", Event::ViewDetail),
                ("Delete a specific record", Event::DeleteOne),
                ("Delete all my records", Event::DeleteAll),
                ("Go back to main menu", Event::Back),
            ],
        )
    }

    /// Let the user pick one of the listed records by its choice id.
    fn pick_record(&mut self, action: &str) -> Result<i64, AppError> {
        let ids: Vec<String> = self.records.iter().map(|r| r.choice_id.to_string()).collect();
        let index = self.term.select(
            &format!("Please choose the ID of the choice that you want to {action}: "),
            &ids,
        )?;
        self.records
            .get(index)
            .map(|r| r.choice_id)
            .ok_or_else(|| AppError::Terminal(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("record selection {index} out of range"),
            )))
    }

    fn history_detail(&mut self) -> Result<Event, AppError> {
        let choice_id = self.pick_record("view")?;
        let (store, identifier) = (self.store, self.session.identifier.as_str());
        let record = with_spinner(&mut *self.term, "Please wait...", || {
            store.get_one(identifier, choice_id)
        })?;
        match record {
            Some(record) => {
                let text = render::record_detail(&record);
                self.term.print(&text);
            }
            None => self
                .term
                .print("Sorry, there does not seem to be a record with that ID."),
        }
        Ok(Event::Finished)
    }

    fn history_delete_one(&mut self) -> Result<Event, AppError> {
        let choice_id = self.pick_record("delete")?;
        let (store, identifier) = (self.store, self.session.identifier.as_str());
        let removed = with_spinner(&mut *self.term, "Deleting...", || {
            store.delete_one(identifier, choice_id)
        })?;
        if removed == 0 {
            self.term
                .print("Sorry, there does not seem to be a record with that ID.");
        } else {
            self.term.print(&format!(
                "You have successfully deleted record with choice ID = {choice_id}."
            ));
        }
        Ok(Event::Finished)
    }

    fn history_delete_all(&mut self) -> Result<Event, AppError> {
        let confirmed = self.choose(
            "Are you sure you want to delete all records? This action can't be undone.",
            &[("Yes", Event::DeleteAll), ("No", Event::Back)],
        )? == Event::DeleteAll;
        if !confirmed {
            self.term.print("We won't delete your records then.");
            return Ok(Event::Finished);
        }
        let (store, identifier) = (self.store, self.session.identifier.as_str());
        with_spinner(&mut *self.term, "Deleting...", || store.delete_all(identifier))?;
        self.term.print("You have successfully deleted all your records.");
        Ok(Event::Finished)
    }

    fn records_or_exit(&mut self) -> Result<Event, AppError> {
        let event = self.choose(
            "Where would you like to go now?",
            &[
                ("Go back to my records", Event::BackToRecords),
                ("Exit the program", Event::Quit),
            ],
        )?;
        if event == Event::Quit {
            self.farewell("Alright, see you next time!");
        }
        Ok(event)
    }
}
