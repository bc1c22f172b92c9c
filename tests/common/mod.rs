#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use cougar_craves::config::{Config, Endpoints, StoreConfig};
use cougar_craves::secrets::{PASSWORD, USERNAME};
use cougar_craves::ui::{Terminal, Validator};

pub const TOKEN: &str = "abcdefghijklmnopqrstuvwxyz0123";
pub const BYU_ID: &str = "123456789";

#[derive(Debug)]
pub enum Answer {
    /// Pick the list item with this exact label.
    Pick(&'static str),
    Type(&'static str),
}

/// Plays back a fixed list of answers and records everything printed.
#[derive(Default)]
pub struct ScriptedTerminal {
    answers: VecDeque<Answer>,
    pub output: Vec<String>,
    pub rejected: Vec<String>,
}

impl ScriptedTerminal {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: answers.into(),
            ..Default::default()
        }
    }

    pub fn printed(&self) -> String {
        self.output.join("\n")
    }

    pub fn finished(&self) -> bool {
        self.answers.is_empty()
    }

    fn next(&mut self, prompt: &str) -> io::Result<Answer> {
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, format!("script ran out at {prompt:?}"))
        })
    }
}

impl Terminal for ScriptedTerminal {
    fn select(&mut self, prompt: &str, items: &[String]) -> io::Result<usize> {
        match self.next(prompt)? {
            Answer::Pick(label) => items.iter().position(|i| i == label).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{label:?} not offered at {prompt:?}: {items:?}"),
                )
            }),
            other => panic!("expected a pick at {prompt:?}, script has {other:?}"),
        }
    }

    fn input(&mut self, prompt: &str, validate: Validator<'_>) -> io::Result<String> {
        loop {
            match self.next(prompt)? {
                Answer::Type(text) => match validate(text) {
                    Ok(()) => return Ok(text.to_string()),
                    Err(err) => self.rejected.push(format!("{text}: {err}")),
                },
                other => panic!("expected typing at {prompt:?}, script has {other:?}"),
            }
        }
    }

    fn print(&mut self, text: &str) {
        self.output.push(text.to_string());
    }

    fn clear(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Configuration pointing every API at `base_url` and the store at a fresh
/// database under `dir`, with secrets written alongside.
pub fn config(base_url: &str, dir: &Path) -> Config {
    let secrets_dir = dir.join("secrets");
    fs::create_dir_all(&secrets_dir).unwrap();
    fs::write(secrets_dir.join(USERNAME), "craves_app").unwrap();
    fs::write(secrets_dir.join(PASSWORD), "hunter2").unwrap();
    Config {
        endpoints: Endpoints {
            identity: base_url.to_string(),
            dining: base_url.to_string(),
            recipe: base_url.to_string(),
            timeout: Duration::from_secs(5),
        },
        store: StoreConfig {
            path: dir.join("db").join("preferences.db"),
            bootstrap: true,
        },
        secrets_dir,
    }
}

pub fn person_body(id: &str, first_name: &str) -> String {
    serde_json::json!({
        "basic": {
            "byu_id": { "value": id, "api_type": "read-only" },
            "first_name": { "value": first_name, "api_type": "modifiable" }
        }
    })
    .to_string()
}

/// A meal with `count` numbered ingredients followed by an empty slot.
pub fn meal_body(name: &str, count: usize, instructions: &str) -> String {
    let mut meal = serde_json::Map::new();
    meal.insert("idMeal".into(), "52772".into());
    meal.insert("strMeal".into(), name.into());
    meal.insert("strInstructions".into(), instructions.into());
    for i in 1..=20 {
        let (ingredient, measure) = if i <= count {
            (format!("Ingredient {i}"), format!("{i} cups"))
        } else {
            (String::new(), String::new())
        };
        meal.insert(format!("strIngredient{i}"), ingredient.into());
        meal.insert(format!("strMeasure{i}"), measure.into());
    }
    serde_json::json!({ "meals": [meal] }).to_string()
}
