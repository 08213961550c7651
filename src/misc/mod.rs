use teloxide::{dispatching::dialogue::InMemStorage, prelude::*, utils::command::BotCommands};

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
pub type LinkDialogue = Dialogue<State, InMemStorage<State>>;

/// Per-user progress through `/link`. Only ever moves forward and is never removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum State {
    #[default]
    Start,
    AwaitingUsername,
    Completed {
        username: String,
    },
}

impl State {
    fn rank(&self) -> u8 {
        match self {
            State::Start => 0,
            State::AwaitingUsername => 1,
            State::Completed { .. } => 2,
        }
    }

    pub fn can_advance_to(&self, next: &State) -> bool {
        next.rank() > self.rank()
    }
}

/// Cleans up a `/link` reply. `None` means ask again: empty input, more than
/// one word, or anything that looks like a command.
pub fn normalize_username(text: &str) -> Option<&str> {
    let text = text.trim();
    if text.starts_with('/') {
        return None;
    }
    let username = text.trim_start_matches('@');
    if username.is_empty() || username.contains(char::is_whitespace) {
        return None;
    }
    Some(username)
}

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum UserCommands {
    #[command(description = "show how to use the bot")]
    Start,
    #[command(description = "list the commands")]
    Help,
    #[command(description = "link a username in this chat")]
    Link,
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Owner commands:")]
pub enum OwnerCommands {
    #[command(description = "show the active settings")]
    Settings,
}
