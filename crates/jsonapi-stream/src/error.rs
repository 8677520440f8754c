use core::fmt;
use std::io;

use thiserror::Error;

/// The kind of container a nesting or underflow error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Object,
    Array,
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::Object => f.write_str("object"),
            Container::Array => f.write_str("array"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serde_json error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error(
        "`{name}` is not allowed here (`{section}`). Allowed names at this level are: {}",
        allowed.join(", ")
    )]
    InvalidMemberName {
        name: String,
        section: &'static str,
        allowed: Vec<&'static str>,
    },

    #[error("`{name}` has already appeared at this level (`{section}`).{}", remaining_suffix(remaining))]
    DuplicateMember {
        name: String,
        section: &'static str,
        remaining: Option<Vec<&'static str>>,
    },

    #[error("the current section (`{section}`) cannot contain nested {container}s")]
    IllegalNesting {
        section: &'static str,
        container: Container,
    },

    #[error("end of {container} with nothing left to close (`{section}`)")]
    StackUnderflow {
        section: &'static str,
        container: Container,
    },

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    #[error("illegal writer state: {0}")]
    IllegalState(String),

    #[error("{count} buffered `{section}` entr{} never written before the enclosing object closed", if *count == 1 { "y was" } else { "ies were" })]
    UnflushedSection { section: &'static str, count: usize },

    #[error("{0}")]
    Message(String),
}

fn remaining_suffix(remaining: &Option<Vec<&'static str>>) -> String {
    match remaining {
        Some(names) => format!(
            " The only names not yet seen at this level are: {}",
            names.join(", ")
        ),
        None => String::new(),
    }
}

impl Error {
    pub(crate) fn illegal_state(msg: impl Into<String>) -> Self {
        Error::IllegalState(msg.into())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

pub type Result<T> = core::result::Result<T, Error>;
