use std::path::PathBuf;
use std::str::FromStr;

use planview_core::{Msg, NodeId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{command}` needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
    #[error("`{0}` is not a number")]
    InvalidNumber(String),
    #[error("zoom direction must be `in` or `out`, got `{0}`")]
    InvalidDirection(String),
}

/// One line typed on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Paste the contents of a file.
    PasteFile(PathBuf),
    /// Paste the text that follows, with `\t` and `\n` escapes.
    PasteText(String),
    Click(NodeId),
    Copy,
    Clear,
    Resize { width: u32, height: u32 },
    Zoom { notches: i32, x: i32, y: i32 },
    Pan { dx: i32, dy: i32 },
    Quit,
}

impl Command {
    /// The message this command stands for. `None` when the command needs the
    /// host first (file reads, quitting).
    pub fn into_msg(self) -> Option<Msg> {
        match self {
            Command::PasteText(text) => Some(Msg::Pasted(text)),
            Command::Click(node) => Some(Msg::NodeClicked(node)),
            Command::Copy => Some(Msg::CopyClicked),
            Command::Clear => Some(Msg::ClearClicked),
            Command::Resize { width, height } => Some(Msg::ContainerResized { width, height }),
            Command::Zoom { notches, x, y } => Some(Msg::WheelScrolled { notches, x, y }),
            Command::Pan { dx, dy } => Some(Msg::Dragged { dx, dy }),
            Command::PasteFile(_) | Command::Quit => None,
        }
    }
}

pub const HELP: &str = "commands: paste <file> | paste-text <text> | click <node> | copy | clear \
| resize <w> <h> | zoom <in|out> [x y] | pan <dx> <dy> | quit";

/// Parses one input line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, InputError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let command = match word {
        "paste" => {
            if rest.is_empty() {
                return Err(missing("paste", "a file path"));
            }
            Command::PasteFile(PathBuf::from(rest))
        }
        "paste-text" => Command::PasteText(unescape(rest)),
        "click" => {
            let token = args.next().ok_or_else(|| missing("click", "a node id"))?;
            Command::Click(NodeId::new(token))
        }
        "copy" => Command::Copy,
        "clear" => Command::Clear,
        "resize" => {
            let width = number(args.next(), "resize", "a width")?;
            let height = number(args.next(), "resize", "a height")?;
            Command::Resize { width, height }
        }
        "zoom" => {
            let notches = match args.next() {
                Some("in") => 1,
                Some("out") => -1,
                Some(other) => return Err(InputError::InvalidDirection(other.to_string())),
                None => return Err(missing("zoom", "a direction")),
            };
            let (x, y) = match args.next() {
                Some(x) => (parse_number(x)?, number(args.next(), "zoom", "a y coordinate")?),
                None => (0, 0),
            };
            Command::Zoom { notches, x, y }
        }
        "pan" => {
            let dx = number(args.next(), "pan", "a dx")?;
            let dy = number(args.next(), "pan", "a dy")?;
            Command::Pan { dx, dy }
        }
        "quit" | "exit" => Command::Quit,
        other => return Err(InputError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn missing(command: &'static str, what: &'static str) -> InputError {
    InputError::MissingArgument { command, what }
}

fn number<T: FromStr>(
    arg: Option<&str>,
    command: &'static str,
    what: &'static str,
) -> Result<T, InputError> {
    parse_number(arg.ok_or_else(|| missing(command, what))?)
}

fn parse_number<T: FromStr>(arg: &str) -> Result<T, InputError> {
    arg.parse()
        .map_err(|_| InputError::InvalidNumber(arg.to_string()))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
