use std::error::Error;
use std::fmt;

/// Expression calculation result: either value or error
pub type CalcResult = Result<f64, CalcError>;
pub(crate) type CalcErrorResult = Result<(), CalcError>;

/// Broad class of an evaluator failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// the expression contains a character outside the allow-list
    InvalidCharacter,
    /// an identifier is neither a known function nor a supplied variable
    UndefinedVariable,
    /// the expression is malformed
    Syntax,
}

#[derive(Clone, PartialEq)]
pub enum CalcError {
    InvalidCharacter(String),
    UndefinedVariable(String),

    EmptyExpression,
    ParseFailed(String),
    UnexpectedToken(String),
    MissingOperand(String),
    OpenBracketMismatch,
    ClosingBracketMismatch,
    FunctionWithoutCall(String),
    MisplacedSeparator,
    InsufficientOps,
}

impl CalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::InvalidCharacter(..) => ErrorKind::InvalidCharacter,
            CalcError::UndefinedVariable(..) => ErrorKind::UndefinedVariable,
            _ => ErrorKind::Syntax,
        }
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            CalcError::InvalidCharacter(s) => write!(f, "Expression '{}' contains characters that are not allowed", s),
            CalcError::UndefinedVariable(s) => write!(f, "Variable '{}' is not defined", s),

            CalcError::EmptyExpression => write!(f, "Nothing to calculate"),
            CalcError::ParseFailed(s) => write!(f, "Failed to parse expression: {}", s),
            CalcError::UnexpectedToken(s) => write!(f, "Unexpected '{}'", s),
            CalcError::MissingOperand(s) => write!(f, "Operator '{}' is missing an operand", s),
            CalcError::OpenBracketMismatch => write!(f, "Mismatched opening bracket"),
            CalcError::ClosingBracketMismatch => write!(f, "Mismatched closing bracket"),
            CalcError::FunctionWithoutCall(s) => write!(f, "Function '{}' must be called with brackets", s),
            CalcError::MisplacedSeparator => write!(f, "Argument separator outside of a function call"),
            CalcError::InsufficientOps => write!(f, "Too many numbers"),
        }
    }
}

impl fmt::Debug for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Error for CalcError {}

/// Failure of a single user action. Neither kind is fatal and neither
/// writes to the history
#[derive(Clone, Debug, PartialEq)]
pub enum WidgetError {
    /// missing or non-numeric input; the message is shown as is
    Validation(&'static str),
    /// the custom expression failed to evaluate
    Evaluator(CalcError),
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            WidgetError::Validation(msg) => write!(f, "{}", msg),
            WidgetError::Evaluator(e) => write!(f, "Error: {}", e),
        }
    }
}

impl Error for WidgetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WidgetError::Evaluator(e) => Some(e),
            WidgetError::Validation(..) => None,
        }
    }
}

impl From<CalcError> for WidgetError {
    fn from(e: CalcError) -> Self {
        WidgetError::Evaluator(e)
    }
}
