use thiserror::Error;

/// An error encountered while reading preset text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("line {line}: expected `Name = Value`")]
    MissingSeparator { line: usize },
    #[error("line {line}: empty property name")]
    EmptyName { line: usize },
    #[error("line {line}: indentation skips a level")]
    UnexpectedIndent { line: usize },
    #[error("line {line}: invalid value `{value}` for `{name}`")]
    InvalidValue {
        line: usize,
        name: String,
        value: String,
    },
    #[error("line {line}: unknown class `{class}` for `{name}`")]
    UnknownClass {
        line: usize,
        name: String,
        class: String,
    },
    #[error("no object found")]
    Empty,
}
