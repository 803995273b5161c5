//! # Reserved `walker` commands.
//!
//! Events whose entity is [`COMMAND_ENTITY`] reconfigure the bus instead of
//! being dispatched. The action selects the [`Command`]; the event data is its
//! payload.
//!
//! | Event                | Command                      | Payload                         |
//! |----------------------|------------------------------|---------------------------------|
//! | `walker destination` | [`Command::Destination`]     | `{ "name": ..., "config": {..} }` |
//! | `walker run`         | [`Command::Run`]             | none                            |
//! | `walker user`        | [`Command::User`]            | `{ "id", "device", "hash" }`    |
//! | anything else        | [`Command::Unknown`] (no-op) | ignored                         |

use serde_json::Value;

use crate::destinations::DestinationConfig;
use crate::events::{Data, User};

/// Entity reserved for bus commands.
pub const COMMAND_ENTITY: &str = "walker";

/// A bus command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Register the named destination from the walker's catalog.
    Destination {
        name: String,
        config: Option<DestinationConfig>,
    },
    /// Start (or restart) a run.
    Run,
    /// Merge user identifiers.
    User(User),
    /// Unrecognized action; ignored.
    Unknown(String),
}

impl Command {
    /// Interprets a command action and its payload.
    pub fn parse(action: &str, data: &Data) -> Self {
        match action {
            "destination" => {
                let name = match data.get("name") {
                    Some(Value::String(name)) => name.clone(),
                    _ => String::new(),
                };
                let config = data
                    .get("config")
                    .and_then(|c| serde_json::from_value(c.clone()).ok());
                Command::Destination { name, config }
            }
            "run" => Command::Run,
            "user" => Command::User(User::from_data(data)),
            other => Command::Unknown(other.to_string()),
        }
    }

    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Command::Destination { .. } => "destination",
            Command::Run => "run",
            Command::User(_) => "user",
            Command::Unknown(_) => "unknown",
        }
    }
}
