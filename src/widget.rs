use crate::config::WidgetConfig;
use crate::errors::WidgetError;
use crate::formulas::{FormInput, Formula};
use crate::history::History;
use crate::parse::eval;
use crate::value::format_number;
use crate::vars::VarSet;

pub const MSG_EMPTY_EXPRESSION: &str = "Enter a formula expression.";
pub const MSG_NO_CALCULATION: &str = "No calculation yet.";

/// One calculator session: runs formulas and custom expressions and keeps
/// the history of successful results. The caller decides where the
/// returned text goes; a failed action leaves the history untouched
#[derive(Clone, Debug, Default)]
pub struct Calculator {
    history: History,
}

impl Calculator {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(cfg: &WidgetConfig) -> Self {
        Calculator {
            history: History::with_config(&cfg.history),
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Runs a formula form and returns the text for the result area
    pub fn run_formula(&mut self, formula: Formula, input: &FormInput) -> Result<String, WidgetError> {
        let outcome = formula.compute(input).map_err(|e| {
            log::warn!("{} rejected: {}", formula.title(), e);
            e
        })?;
        if let Some((title, detail)) = &outcome.record {
            let _ = self.history.record(title, detail);
        }
        Ok(outcome.display)
    }

    /// Evaluates a custom expression with variables given as `name=value`
    /// lines and returns the text for the result area
    pub fn eval_custom(&mut self, expr: &str, vars: &str) -> Result<String, WidgetError> {
        let expr = expr.trim();
        let vars = VarSet::parse(vars);
        if expr.is_empty() {
            return Err(WidgetError::Validation(MSG_EMPTY_EXPRESSION));
        }

        let out = eval(expr, &vars).map_err(|e| {
            log::warn!("custom expression rejected: {}", e);
            WidgetError::Evaluator(e)
        })?;
        let out = format_number(out);
        let _ = self.history.record(
            &format!("Custom: {}", expr),
            &format!("vars={} → {}", vars.to_json(), out),
        );
        Ok(format!("Result = {}", out))
    }

    /// Text for the result area after the custom inputs are cleared
    pub fn clear_custom(&self) -> &'static str {
        MSG_NO_CALCULATION
    }
}
