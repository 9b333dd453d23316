//! Terminal selection prompt

use dialoguer::{theme::ColorfulTheme, Select};
use pimctl_resolver::{PromptSink, Selection};
use std::io;

/// Arrow-key selection list on stderr; Esc or `q` cancels
#[derive(Debug, Clone, Copy, Default)]
pub struct DialoguerPrompt;

impl PromptSink for DialoguerPrompt {
    fn select(&self, title: &str, options: &[String]) -> io::Result<Selection> {
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(title)
            .items(options)
            .default(0)
            .interact_opt();

        match choice {
            Ok(Some(index)) => Ok(Selection::Index(index)),
            Ok(None) => Ok(Selection::Cancelled),
            Err(dialoguer::Error::IO(err)) => Err(err),
        }
    }
}
