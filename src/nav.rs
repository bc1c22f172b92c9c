// Screen-to-screen navigation as a plain transition table.
// The UI reports what happened on the current screen as an `Event`; `next`
// says where to go. Nothing here touches the terminal, the network or the
// database.

use strum::Display;

use crate::error::NavError;
use crate::model::ChoiceKind;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Banner and main menu.
    Welcome,
    /// Eat in, eat out, or never mind.
    SuggestionMenu,
    /// Fetch and show a recipe or a location.
    Suggestion(ChoiceKind),
    /// "Save your preference?"
    SavePrompt(ChoiceKind),
    /// Write the pending suggestion to the store.
    Saving(ChoiceKind),
    /// "Go back to main menu / Exit", shared by every flow that ends on the
    /// main menu.
    MenuOrExit,
    /// Table of saved records plus the history actions.
    HistoryList,
    HistoryDetail,
    HistoryDeleteOne,
    HistoryDeleteAll,
    /// "Go back to my records / Exit", shown after each history action.
    RecordsOrExit,
    Exit,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    GetSuggestion,
    ViewHistory,
    Quit,
    EatIn,
    EatOut,
    /// "Never mind, I'm fasting today."
    Fast,
    Shown,
    Save,
    Skip,
    Saved,
    MainMenu,
    NoRecords,
    ViewDetail,
    DeleteOne,
    DeleteAll,
    Back,
    Finished,
    BackToRecords,
}

pub fn next(from: Screen, event: Event) -> Result<Screen, NavError> {
    use crate::nav::{Event as E, Screen as S};

    let to = match (from, event) {
        (S::Welcome, E::GetSuggestion) => S::SuggestionMenu,
        (S::Welcome, E::ViewHistory) => S::HistoryList,
        (S::Welcome, E::Quit) => S::Exit,

        (S::SuggestionMenu, E::EatIn) => S::Suggestion(ChoiceKind::EatIn),
        (S::SuggestionMenu, E::EatOut) => S::Suggestion(ChoiceKind::EatOut),
        (S::SuggestionMenu, E::Fast) => S::Exit,

        (S::Suggestion(kind), E::Shown) => S::SavePrompt(kind),
        (S::SavePrompt(kind), E::Save) => S::Saving(kind),
        (S::SavePrompt(_), E::Skip) => S::MenuOrExit,
        (S::Saving(_), E::Saved) => S::MenuOrExit,

        (S::MenuOrExit, E::MainMenu) => S::Welcome,
        (S::MenuOrExit, E::Quit) => S::Exit,

        (S::HistoryList, E::NoRecords) => S::MenuOrExit,
        (S::HistoryList, E::ViewDetail) => S::HistoryDetail,
        (S::HistoryList, E::DeleteOne) => S::HistoryDeleteOne,
        (S::HistoryList, E::DeleteAll) => S::HistoryDeleteAll,
        (S::HistoryList, E::Back) => S::Welcome,

        (S::HistoryDetail | S::HistoryDeleteOne | S::HistoryDeleteAll, E::Finished) => {
            S::RecordsOrExit
        }

        (S::RecordsOrExit, E::BackToRecords) => S::HistoryList,
        (S::RecordsOrExit, E::Quit) => S::Exit,

        (from, event) => {
            return Err(NavError {
                from: from.to_string(),
                event: event.to_string(),
            })
        }
    };
    Ok(to)
}
