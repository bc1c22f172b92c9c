// Text rendering for everything the program prints. Each function returns a
// String so the UI can print it and tests can inspect it.

use chrono::{DateTime, Local, Utc};

use crate::model::{ChoiceKind, Location, PreferenceRecord, Recipe};

const RECIPE_RULE: &str =
    "=========================================================================";
const LOCATION_RULE: &str = "=====================================================";

const BANNER: &str = r#"
   _____                                _____
  / ____|                              / ____|
 | |     ___  _   _  __ _  __ _ _ __  | |     _ __ __ ___   _____  ___
 | |    / _ \| | | |/ _` |/ _` | '__| | |    | '__/ _` \ \ / / _ \/ __|
 | |___| (_) | |_| | (_| | (_| | |    | |____| | | (_| |\ V /  __/\__ \
  \_____\___/ \__,_|\__, |\__,_|_|     \_____|_|  \__,_| \_/ \___||___/
                     __/ |
                    |___/
"#;

pub fn banner() -> &'static str {
    BANNER
}

pub fn welcome(display_name: &str) -> String {
    format!(
        "Hi, {display_name}! Welcome to Cougar Craves. Here, we will help you come up with an idea to satisfy your cravings."
    )
}

pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%a %b %d %Y %H:%M:%S %Z")
        .to_string()
}

fn recipe_block(name: &str, ingredients: &str, instructions: &str) -> String {
    format!(
        "The universe has spoken! Here is what you will be eating today.\n\
         {RECIPE_RULE}\n{name}\n{RECIPE_RULE}\n\n\
         INGREDIENTS: \n{ingredients}\n\n\
         INSTRUCTIONS: \n{instructions}\n{RECIPE_RULE}"
    )
}

fn location_block(name: &str, coordinates: Option<(f64, f64)>) -> String {
    let mut out = format!(
        "{LOCATION_RULE}\nGuess what? Today you will be eating at:\nLocation name: {name}\n"
    );
    if let Some((latitude, longitude)) = coordinates {
        out.push_str(&format!("Location coordinate: {latitude}, {longitude}\n"));
    }
    out.push_str(LOCATION_RULE);
    out
}

pub fn recipe(recipe: &Recipe) -> String {
    recipe_block(
        &recipe.name,
        &recipe.ingredients.join("\n"),
        &recipe.instructions,
    )
}

pub fn location(location: &Location) -> String {
    location_block(&location.name, Some((location.latitude, location.longitude)))
}

/// Full view of one saved record.
pub fn record_detail(record: &PreferenceRecord) -> String {
    let when = timestamp(&record.timestamp);
    match record.choice_kind {
        ChoiceKind::EatOut => format!(
            "{}\nThis location was suggested for you on {when}",
            location_block(record.location_name.as_deref().unwrap_or_default(), None)
        ),
        ChoiceKind::EatIn => format!(
            "{}\nThis recipe was suggested for you on {when}",
            recipe_block(
                record.dish_name.as_deref().unwrap_or_default(),
                record.ingredients.as_deref().unwrap_or_default(),
                record.instructions.as_deref().unwrap_or_default(),
            )
        ),
    }
}

const COLUMNS: [&str; 5] = ["choice_id", "choice", "time_stamp", "dish_name", "location_name"];

/// Titled table of saved records with centered cells; absent values are
/// blank.
pub fn records_table(display_name: &str, records: &[PreferenceRecord]) -> String {
    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|r| {
            [
                r.choice_id.to_string(),
                r.choice_kind.to_string(),
                timestamp(&r.timestamp),
                r.dish_name.clone().unwrap_or_default(),
                r.location_name.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let title = format!("{display_name}'s Dining Preferences");
    let span: usize = widths.iter().map(|w| w + 3).sum::<usize>() - 1;
    if let Some(last) = widths.last_mut() {
        *last += title.chars().count().saturating_sub(span);
    }

    let border = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}", segments.join(mid))
    };
    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, w)| format!(" {cell:^w$} ", w = *w))
            .collect();
        format!("│{}│", padded.join("│"))
    };

    let inner = border("┌", "┬", "┐").chars().count() - 2;

    let mut out = Vec::with_capacity(rows.len() + 6);
    out.push(border("┌", "─", "┐"));
    out.push(format!("│{title:^inner$}│"));
    out.push(border("├", "┬", "┤"));
    out.push(line(&COLUMNS.map(String::from)[..]));
    out.push(border("├", "┼", "┤"));
    for row in &rows {
        out.push(line(&row[..]));
    }
    out.push(border("└", "┴", "┘"));
    out.join("\n")
}
