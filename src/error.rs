use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("invalid argument: {}", .0)]
    InvalidArgument(String),

    #[error("invariant violated: {}", .0)]
    Invariant(String),

    #[error("unknown command: {}", .0)]
    UnknownCommand(String),

    #[error("line is not valid UTF-8: {}", .0)]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("{}", .0)]
    Io(#[from] std::io::Error),

    #[error("{}", .0)]
    Pattern(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, IndexError>;
