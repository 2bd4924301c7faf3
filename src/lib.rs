//! # Calculator widget
//!
//! A small calculator meant to be embedded in a web page: a restricted
//! expression evaluator with user variables, a set of ready-made formula
//! forms, a session history, and a decorative animated background.
//!
//! Custom expressions are never executed as code. An expression is first
//! checked against a character allow-list (ASCII letters, digits, `_`,
//! whitespace and `+ - * / ^ % . ( ) ,`), then tokenized and evaluated by a
//! shunting-yard calculator over `f64` values. Any identifier must be either
//! a whitelisted function or a variable supplied by the caller:
//! `eval("sqrt(x^2 + y^2)", &parse_vars("x=3\ny=4"))` gives `5`.
//!
//! Arithmetic follows IEEE-754: `1/0` is `Infinity`, `0/0` and `5 % 0` are
//! `NaN`. These are results, not errors.
//!
//! The list of supported functions:
//! * trigonometric functions (including inverted ones): sin, cos, tan, asin, acos, atan
//! * exponent, natural logarithm, power: exp, log, pow
//! * square root: sqrt
//! * rounding: ceil, floor, round (halves go up: `round(-2.5)` is `-2`)
//! * absolute value: abs
//! * any number of arguments: max, min
//!
//! Operators (starting from highest priority):
//! * `^` - power, right-associative: `2^3^2` is `512`
//! * `-` - unary minus: `-2^2` is `-4`, `2^-1` is `0.5`
//! * `*`, `/`, `%` - multiplication, division, remainder
//! * `+`, `-` - addition, subtraction
//!
//! Variables are given as `name=value` lines. Malformed lines are skipped,
//! a repeated name keeps the last value. Names are case-sensitive and a
//! whitelisted function name always means the function.
//!
//! Pre-built formulas: rectangle area and perimeter, circle area, quadratic
//! roots (complex pairs for a negative discriminant), BMI, and Ohm's law.
//!
//! With the `web` feature the crate starts itself in the browser: it animates
//! the `#laser-bg` canvas and wires the calculator controls of the page.

#[macro_use]
extern crate pest_derive;

pub mod config;
pub mod errors;
pub mod formulas;
pub mod history;
pub mod parse;
pub mod particles;
pub mod stack;
pub mod value;
pub mod vars;
pub mod widget;

#[cfg(feature = "web")]
pub mod web;

pub use config::{HistoryConfig, ParticleConfig, WidgetConfig};
pub use errors::{CalcError, CalcResult, ErrorKind, WidgetError};
pub use formulas::{FormInput, Formula, Outcome};
pub use history::{History, HistoryEntry};
pub use parse::{eval, validate};
pub use particles::{Particle, ParticleField, Surface};
pub use vars::{parse_vars, VarSet};
pub use widget::Calculator;
