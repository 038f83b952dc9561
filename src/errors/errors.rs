use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
    related: Option<Position>,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
            related: None,
        }
    }

    /// Attaches a second location, used by mismatch errors to point at the
    /// expression that supplied the expected type.
    pub fn with_related(mut self, related: Position) -> Self {
        if !related.is_null() {
            self.related = Some(related);
        }
        self
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_related(&self) -> Option<&Position> {
        self.related.as_ref()
    }

    /// One-based (line, column) of the primary position within `source`.
    pub fn line_column(&self, source: &str) -> (usize, usize) {
        match crate::get_line_at_position(source, self.position.0) {
            Some((line, _, column)) => (line, column + 1),
            None => (0, 0),
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::ParameterCountMismatch { .. } => "ParameterCountMismatch",
            ErrorImpl::ReturnCountMismatch { .. } => "ReturnCountMismatch",
            ErrorImpl::ExpectedOneReturnType { .. } => "ExpectedOneReturnType",
            ErrorImpl::MissingReturnValue => "MissingReturnValue",
            ErrorImpl::MultipleReturnValues { .. } => "MultipleReturnValues",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::NumberTypesMismatch { .. } => "NumberTypesMismatch",
            ErrorImpl::NotAType { .. } => "NotAType",
            ErrorImpl::NotAConstant { .. } => "NotAConstant",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::NotAPointer { .. } => "NotAPointer",
            ErrorImpl::NotAStructOrEnum { .. } => "NotAStructOrEnum",
            ErrorImpl::NoSuchMember { .. } => "NoSuchMember",
            ErrorImpl::LvalueRequired => "LvalueRequired",
            ErrorImpl::AssignToConstant => "AssignToConstant",
            ErrorImpl::NotImplementedError { .. } => "NotImplementedError",
            ErrorImpl::NoProgress { .. } => "NoProgress",
            ErrorImpl::PendingJob { .. } => "PendingJob",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::VariableAlreadyDeclared { variable } => {
                ErrorTip::Suggestion(format!("`{}` is already declared in this scope", variable))
            }
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("Undeclared identifier `{}`", variable))
            }
            ErrorImpl::ReturnOutsideFunction => {
                ErrorTip::Suggestion(String::from("`return` can only appear inside a function body"))
            }
            ErrorImpl::UnexpectedArguments { expected, received }
            | ErrorImpl::MissingArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::ParameterCountMismatch { expected, received } => ErrorTip::Suggestion(
                format!("Function types take {} and {} parameters", expected, received),
            ),
            ErrorImpl::ReturnCountMismatch { expected, received } => ErrorTip::Suggestion(
                format!("Function types return {} and {} values", expected, received),
            ),
            ErrorImpl::ExpectedOneReturnType { found } => ErrorTip::Suggestion(format!(
                "Expected only one return type, the function declares {}",
                found
            )),
            ErrorImpl::MissingReturnValue => ErrorTip::Suggestion(String::from(
                "The function declares a return type but no value is returned",
            )),
            ErrorImpl::MultipleReturnValues { found } => ErrorTip::Suggestion(format!(
                "Calls to functions with {} return values are not supported",
                found
            )),
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::NumberTypesMismatch { left, right } => ErrorTip::Suggestion(format!(
                "Number types don't match: `{}` and `{}`",
                left, right
            )),
            ErrorImpl::NotAType { found } => {
                ErrorTip::Suggestion(format!("`{}` is used as a type but is not one", found))
            }
            ErrorImpl::NotAConstant { name } => ErrorTip::Suggestion(format!(
                "`{}` is a runtime value and cannot be used as a type",
                name
            )),
            ErrorImpl::NotCallable { received } => {
                ErrorTip::Suggestion(format!("Values of type `{}` cannot be called", received))
            }
            ErrorImpl::NotAPointer { received } => {
                ErrorTip::Suggestion(format!("Expected a pointer, received `{}`", received))
            }
            ErrorImpl::NotAStructOrEnum { received } => ErrorTip::Suggestion(format!(
                "Members can only be accessed on structs and enums, received `{}`",
                received
            )),
            ErrorImpl::NoSuchMember { member, container } => {
                ErrorTip::Suggestion(format!("`{}` has no member named `{}`", container, member))
            }
            ErrorImpl::LvalueRequired => ErrorTip::Suggestion(String::from(
                "Expression does not denote a storage location",
            )),
            ErrorImpl::AssignToConstant => {
                ErrorTip::Suggestion(String::from("Constants cannot be assigned to"))
            }
            ErrorImpl::NotImplementedError { feature } => ErrorTip::Suggestion(format!(
                "{} is expected to be handled, but has not yet been implemented",
                feature
            )),
            ErrorImpl::NoProgress { pending } => ErrorTip::Suggestion(format!(
                "{} jobs are waiting on each other, is there a cyclic definition?",
                pending
            )),
            ErrorImpl::PendingJob { kind, stage } => {
                ErrorTip::Suggestion(format!("{} still waiting at stage {}", kind, stage))
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("{variable:?} already declared in this scope")]
    VariableAlreadyDeclared { variable: String },
    #[error("undeclared identifier {variable:?}")]
    VariableNotDeclared { variable: String },
    #[error("return outside of a function")]
    ReturnOutsideFunction,
    #[error("too many arguments: expected {expected:?}, received {received:?}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("too few arguments: expected {expected:?}, received {received:?}")]
    MissingArguments { expected: usize, received: usize },
    #[error("function types differ in parameter count: {expected:?} and {received:?}")]
    ParameterCountMismatch { expected: usize, received: usize },
    #[error("function types differ in return count: {expected:?} and {received:?}")]
    ReturnCountMismatch { expected: usize, received: usize },
    #[error("expected only one return type, found {found:?}")]
    ExpectedOneReturnType { found: usize },
    #[error("missing return value")]
    MissingReturnValue,
    #[error("calls returning {found:?} values are not supported")]
    MultipleReturnValues { found: usize },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMatchError { expected: String, received: String },
    #[error("number types don't match: {left:?} and {right:?}")]
    NumberTypesMismatch { left: String, right: String },
    #[error("{found:?} is not a type")]
    NotAType { found: String },
    #[error("{name:?} is not a constant")]
    NotAConstant { name: String },
    #[error("{received:?} is not callable")]
    NotCallable { received: String },
    #[error("expected a pointer, received {received:?}")]
    NotAPointer { received: String },
    #[error("expected a struct or enum, received {received:?}")]
    NotAStructOrEnum { received: String },
    #[error("{container:?} has no member {member:?}")]
    NoSuchMember { member: String, container: String },
    #[error("lvalue required")]
    LvalueRequired,
    #[error("cannot assign to a constant")]
    AssignToConstant,
    #[error("not implemented: {feature}")]
    NotImplementedError { feature: String },
    #[error("type checking made no progress with {pending:?} jobs pending")]
    NoProgress { pending: usize },
    #[error("pending {kind} at stage {stage}")]
    PendingJob { kind: String, stage: u32 },
}
