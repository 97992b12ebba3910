use crate::error::{IndexError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { word: String, frequency: u64 },
    Learn(String),
    Forget(String),
    Delete(String),
    Contains(String),
    Frequency(String),
    Weight(String),
    Complete { prefix: String, limit: Option<usize> },
    Stats,
    Help,
}

pub const HELP: &str = "\
add <word> [freq]         insert a word, adding freq (default 1)
learn <text>              insert every token of the text once
forget <text>             delete every token of the text
del <word>                delete a word and its whole frequency
has <word>                is the word stored
freq <word>               frequency of a word
weight [prefix]           total frequency of words under a prefix
complete [prefix] [limit] most frequent words under a prefix
stats                     words, nodes and total weight
help                      this text";

fn parse_frequency(raw: &str) -> Result<u64> {
    if raw.starts_with('-') {
        return Err(IndexError::InvalidArgument(format!(
            "frequency must be positive, got {}",
            raw
        )));
    }
    let frequency: u64 = raw.parse().map_err(|_| {
        IndexError::InvalidArgument(format!("frequency {:?} is not a number", raw))
    })?;
    if frequency == 0 {
        return Err(IndexError::InvalidArgument(
            "frequency must be positive, got 0".to_string(),
        ));
    }
    Ok(frequency)
}

fn parse_limit(raw: &str) -> Result<usize> {
    let limit: i64 = raw
        .parse()
        .map_err(|_| IndexError::InvalidArgument(format!("limit {:?} is not a number", raw)))?;
    if limit < 0 {
        return Err(IndexError::InvalidArgument(format!(
            "limit must not be negative, got {}",
            limit
        )));
    }
    usize::try_from(limit)
        .map_err(|_| IndexError::InvalidArgument(format!("limit {} is too large", limit)))
}

fn required(arg: Option<&str>, name: &str) -> Result<String> {
    match arg {
        Some(word) => Ok(word.to_string()),
        None => Err(IndexError::InvalidArgument(format!(
            "{} expects a word",
            name
        ))),
    }
}

fn no_more<'a>(mut args: impl Iterator<Item = &'a str>, name: &str) -> Result<()> {
    match args.next() {
        Some(extra) => Err(IndexError::InvalidArgument(format!(
            "unexpected argument {:?} for {}",
            extra, name
        ))),
        None => Ok(()),
    }
}

pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let command = match name {
        "add" => {
            let word = required(args.next(), name)?;
            let frequency = match args.next() {
                Some(raw) => parse_frequency(raw)?,
                None => 1,
            };
            Command::Add { word, frequency }
        }
        "learn" => return Ok(Command::Learn(rest.to_string())),
        "forget" => return Ok(Command::Forget(rest.to_string())),
        "del" | "delete" => Command::Delete(required(args.next(), name)?),
        "has" => Command::Contains(required(args.next(), name)?),
        "freq" => Command::Frequency(required(args.next(), name)?),
        "weight" => Command::Weight(args.next().unwrap_or_default().to_string()),
        "complete" => {
            let prefix = args.next().unwrap_or_default().to_string();
            let limit = args.next().map(parse_limit).transpose()?;
            Command::Complete { prefix, limit }
        }
        "stats" => Command::Stats,
        "help" => Command::Help,
        other => return Err(IndexError::UnknownCommand(other.to_string())),
    };
    no_more(args, name)?;
    Ok(command)
}
