use pest::error::LineColLocation;
use pest::Parser;

use crate::errors::*;
use crate::stack::{Func, Stack, UNARY_MINUS};
use crate::vars::VarSet;

#[derive(Parser)]
#[grammar = "calc.pest"]
pub struct CalcParser;

/// Symbols allowed in an expression besides ASCII letters, digits, underscore
/// and whitespace
pub const ALLOWED_SYMBOLS: &str = "+-*/^%.(),";

/// Returns true if the character may appear in an expression
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() || ALLOWED_SYMBOLS.contains(c)
}

/// Checks the expression against the character allow-list. Nothing is
/// tokenized or evaluated if this check fails
pub fn validate(expr: &str) -> Result<(), CalcError> {
    if expr.chars().all(is_allowed_char) {
        Ok(())
    } else {
        Err(CalcError::InvalidCharacter(expr.to_string()))
    }
}

/// tracks what the previous token was, to reject sequences the grammar lets
/// through (e.g. two numbers in a row or an operator without operand)
#[derive(Default)]
struct ParseState {
    is_last_value: bool,
    is_last_open: bool,
    // function name waiting for its opening bracket
    pending_func: Option<String>,
    // one item per open bracket: true if it belongs to a function call
    brackets: Vec<bool>,
    last_token: String,
    has_tokens: bool,
}

impl ParseState {
    fn expect_operand(&self, token: &str) -> CalcErrorResult {
        if self.is_last_value {
            return Err(CalcError::UnexpectedToken(token.to_string()));
        }
        Ok(())
    }

    fn after_value(&mut self) {
        self.is_last_value = true;
        self.is_last_open = false;
    }

    fn after_operator(&mut self) {
        self.is_last_value = false;
        self.is_last_open = false;
    }
}

fn parse_failed(e: pest::error::Error<Rule>) -> CalcError {
    let col = match e.line_col {
        LineColLocation::Pos((_, col)) | LineColLocation::Span((_, col), _) => col,
    };
    CalcError::ParseFailed(format!("unexpected input at position {}", col))
}

/// evaluates a given expression and returns either result or error.
///
/// Identifiers resolve to whitelisted functions first, then to variables
/// from `vars`; anything else is an [`CalcError::UndefinedVariable`]
pub fn eval(expr: &str, vars: &VarSet) -> CalcResult {
    validate(expr)?;

    let pairs = CalcParser::parse(Rule::expr, expr).map_err(parse_failed)?;

    let mut state = ParseState::default();
    let mut stk = Stack::new();
    for pair in pairs {
        let rule = pair.as_rule();
        let val = pair.as_str();

        let is_call = match state.pending_func.take() {
            Some(fname) if rule != Rule::open_b => return Err(CalcError::FunctionWithoutCall(fname)),
            Some(..) => true,
            None => false,
        };

        match rule {
            Rule::number => {
                state.expect_operand(val)?;
                let v = val
                    .parse::<f64>()
                    .map_err(|_| CalcError::ParseFailed(format!("invalid number '{}'", val)))?;
                stk.push_value(v);
                state.after_value();
            }
            Rule::ident => {
                state.expect_operand(val)?;
                if let Some(f) = Func::from_name(val) {
                    stk.push_func(f);
                    state.pending_func = Some(val.to_string());
                    state.after_operator();
                } else if let Some(v) = vars.get(val) {
                    stk.push_value(v);
                    state.after_value();
                } else {
                    return Err(CalcError::UndefinedVariable(val.to_string()));
                }
            }
            Rule::operator => {
                if state.is_last_value {
                    stk.push(val)?;
                } else if val == "-" {
                    stk.push_prefix(UNARY_MINUS);
                } else if val != "+" {
                    // unary plus is a no-op, anything else needs a left operand
                    return Err(CalcError::MissingOperand(val.to_string()));
                }
                state.after_operator();
            }
            Rule::open_b => {
                state.expect_operand(val)?;
                stk.open_bracket();
                state.brackets.push(is_call);
                state.is_last_value = false;
                state.is_last_open = true;
            }
            Rule::close_b => {
                let is_call = match state.brackets.pop() {
                    Some(c) => c,
                    None => return Err(CalcError::ClosingBracketMismatch),
                };
                let empty = state.is_last_open;
                if !state.is_last_value && !(empty && is_call) {
                    return Err(CalcError::UnexpectedToken(val.to_string()));
                }
                stk.close_bracket(empty)?;
                state.after_value();
            }
            Rule::arg_sep => {
                if state.brackets.last() != Some(&true) {
                    return Err(CalcError::MisplacedSeparator);
                }
                if !state.is_last_value {
                    return Err(CalcError::UnexpectedToken(val.to_string()));
                }
                stk.separator()?;
                state.after_operator();
            }
            Rule::EOI => continue,
            _ => return Err(CalcError::ParseFailed(format!("unexpected '{}'", val))),
        }
        state.has_tokens = true;
        state.last_token = val.to_string();
    }

    if let Some(fname) = state.pending_func {
        return Err(CalcError::FunctionWithoutCall(fname));
    }
    if !state.has_tokens {
        return Err(CalcError::EmptyExpression);
    }
    if !state.brackets.is_empty() {
        return Err(CalcError::OpenBracketMismatch);
    }
    if !state.is_last_value {
        return Err(CalcError::MissingOperand(state.last_token));
    }

    let output = stk.calculate();
    match &output {
        Ok(v) => log::debug!("evaluated '{}' = {}", expr, v),
        Err(e) => log::debug!("failed to evaluate '{}': {}", expr, e),
    }
    output
}
