//! Operator commands for runtime control of the visualizer.
//!
//! Commands arrive as text lines (the binary reads them from stdin). Each
//! line is one command word followed by its arguments, separated by
//! whitespace:
//!
//! | Line | Command |
//! |---|---|
//! | `limit <n>` | [`OperatorCommand::SetLimit`] |
//! | `draw on` / `draw off` | [`OperatorCommand::SetLiveDraw`] |
//! | `replay` | [`OperatorCommand::Replay`] |
//! | `search <id>` | [`OperatorCommand::Search`] |
//! | `select <id>` | [`OperatorCommand::Select`] |
//! | `unselect [force]` | [`OperatorCommand::Unselect`] |
//! | `pause` | [`OperatorCommand::TogglePause`] |
//! | `center` | [`OperatorCommand::Center`] |
//! | `explorer <addr>` | [`OperatorCommand::SetExplorer`] |
//! | `clear` | [`OperatorCommand::ClearGraph`] |
//! | `stats` | [`OperatorCommand::Stats`] |
//! | `handler <type> on` / `handler <type> off` | [`OperatorCommand::SetHandler`] |

use std::num::NonZeroUsize;
use std::str::{FromStr, SplitWhitespace};

use dagviz_types::MsgType;

/// A parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Change the vertex limit for future evictions.
    SetLimit(NonZeroUsize),
    /// Turn live drawing on or off.
    SetLiveDraw(bool),
    /// Draw every stored vertex.
    Replay,
    /// Select a vertex by ID, or clear the selection on an empty term.
    Search(String),
    /// Select a vertex as if it had been clicked.
    Select(String),
    /// Clear the selection; `force` also clears a click selection.
    Unselect {
        /// Clear even a click selection.
        force: bool,
    },
    /// Pause or resume the layout simulation.
    TogglePause,
    /// Center the camera.
    Center,
    /// Change the explorer address used for vertex links.
    SetExplorer(String),
    /// Remove every node and link from the graph, keeping stored vertices.
    ClearGraph,
    /// Report current counters.
    Stats,
    /// Start or stop handling a wire message type.
    SetHandler {
        /// The message type, by wire tag.
        msg_type: MsgType,
        /// Whether frames of this type are applied.
        enabled: bool,
    },
}

/// An operator line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperatorParseError {
    /// The line is blank.
    #[error("empty command")]
    Empty,

    /// The command word is not known.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A required argument is missing.
    #[error("{command}: missing argument <{argument}>")]
    MissingArgument {
        /// Command word.
        command: &'static str,
        /// Name of the missing argument.
        argument: &'static str,
    },

    /// An argument is present but malformed.
    #[error("{command}: invalid argument {value:?}: {reason}")]
    InvalidArgument {
        /// Command word.
        command: &'static str,
        /// The offending value.
        value: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// More arguments than the command takes.
    #[error("{command}: unexpected argument {value:?}")]
    UnexpectedArgument {
        /// Command word.
        command: &'static str,
        /// The first extra value.
        value: String,
    },
}

impl FromStr for OperatorCommand {
    type Err = OperatorParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Err(OperatorParseError::Empty);
        };
        let mut args = Args {
            command: "",
            words,
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "limit" => {
                args.command = "limit";
                let raw = args.required("n")?;
                let n = raw
                    .parse::<NonZeroUsize>()
                    .map_err(|_parse| args.invalid(raw, "expected a positive integer"))?;
                Self::SetLimit(n)
            }
            "draw" => {
                args.command = "draw";
                Self::SetLiveDraw(args.switch()?)
            }
            "replay" => {
                args.command = "replay";
                Self::Replay
            }
            "search" => {
                args.command = "search";
                Self::Search(args.optional().unwrap_or_default().to_owned())
            }
            "select" => {
                args.command = "select";
                Self::Select(args.required("id")?.to_owned())
            }
            "unselect" => {
                args.command = "unselect";
                match args.optional() {
                    None => Self::Unselect { force: false },
                    Some("force") => Self::Unselect { force: true },
                    Some(other) => return Err(args.invalid(other, "expected force")),
                }
            }
            "pause" => {
                args.command = "pause";
                Self::TogglePause
            }
            "center" => {
                args.command = "center";
                Self::Center
            }
            "explorer" => {
                args.command = "explorer";
                Self::SetExplorer(args.required("addr")?.to_owned())
            }
            "clear" => {
                args.command = "clear";
                Self::ClearGraph
            }
            "stats" => {
                args.command = "stats";
                Self::Stats
            }
            "handler" => {
                args.command = "handler";
                let raw = args.required("type")?;
                let msg_type = raw
                    .parse::<u8>()
                    .ok()
                    .and_then(MsgType::from_tag)
                    .ok_or_else(|| args.invalid(raw, "expected a message type tag 0-3"))?;
                Self::SetHandler {
                    msg_type,
                    enabled: args.switch()?,
                }
            }
            _ => return Err(OperatorParseError::UnknownCommand(word.to_owned())),
        };

        args.finish()?;
        Ok(command)
    }
}

/// Remaining words of a command line.
struct Args<'a> {
    command: &'static str,
    words: SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn optional(&mut self) -> Option<&'a str> {
        self.words.next()
    }

    fn required(&mut self, argument: &'static str) -> Result<&'a str, OperatorParseError> {
        self.words.next().ok_or(OperatorParseError::MissingArgument {
            command: self.command,
            argument,
        })
    }

    fn switch(&mut self) -> Result<bool, OperatorParseError> {
        let raw = self.required("on|off")?;
        match raw.to_ascii_lowercase().as_str() {
            "on" | "true" => Ok(true),
            "off" | "false" => Ok(false),
            _ => Err(self.invalid(raw, "expected on or off")),
        }
    }

    fn invalid(&self, value: &str, reason: &'static str) -> OperatorParseError {
        OperatorParseError::InvalidArgument {
            command: self.command,
            value: value.to_owned(),
            reason,
        }
    }

    fn finish(mut self) -> Result<(), OperatorParseError> {
        match self.words.next() {
            None => Ok(()),
            Some(extra) => Err(OperatorParseError::UnexpectedArgument {
                command: self.command,
                value: extra.to_owned(),
            }),
        }
    }
}
