use std::fmt::Display;
use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "Expression isn't expandable due to usage of evaluate or compile on expression `{expr}`, \
         that can't be obtained because it depends on outer lambda expression parameter."
    )]
    OpenParameter { expr: String },
    #[error("Usage of evaluate on null expression `{expr}` is invalid")]
    NullCallee { expr: String },
    #[error("Expected {expected} arguments but found {found} in `{expr}`")]
    ArgumentCount {
        expected: usize,
        found: usize,
        expr: String,
    },
    #[error("Can process {limit} parameters max, got {count}")]
    Capacity { count: usize, limit: usize },
    #[error("Parameter {name} not found")]
    MissingParameter { name: String },
    /// Failure raised by a host member, operator or conversion.
    #[error("{0}")]
    Target(String),
    #[error("Value of type {found} is not invocable")]
    NotInvocable { found: String },
    #[error("Expected an expression value but found {found}")]
    NotAnExpression { found: String },
    #[error("Lowering error: {0}")]
    Lowering(String),
    #[error("Cannot combine expressions: {0}")]
    Combination(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Generic error: {0}")]
    Generic(eyre::Report),
}

impl Error {
    pub fn target(message: impl Display) -> Self {
        Error::Target(message.to_string())
    }
}

pub type Result<T> = result::Result<T, Error>;

impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Generic(err)
    }
}
impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(eyre::Report::msg(s))
    }
}
