use std::collections::HashMap;

use crate::errors::*;

use lazy_static::lazy_static;

/// Whitelisted math function
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Func {
    Abs,
    Acos,
    Asin,
    Atan,
    Ceil,
    Floor,
    Round,
    Sqrt,
    Log,
    Max,
    Min,
    Sin,
    Cos,
    Tan,
    Pow,
    Exp,
}

lazy_static! {
    pub(crate) static ref STD_FUNCS: HashMap<&'static str, Func> = [
        ("abs", Func::Abs),
        ("acos", Func::Acos),
        ("asin", Func::Asin),
        ("atan", Func::Atan),
        ("ceil", Func::Ceil),
        ("floor", Func::Floor),
        ("round", Func::Round),
        ("sqrt", Func::Sqrt),
        ("log", Func::Log),
        ("max", Func::Max),
        ("min", Func::Min),
        ("sin", Func::Sin),
        ("cos", Func::Cos),
        ("tan", Func::Tan),
        ("pow", Func::Pow),
        ("exp", Func::Exp),
    ]
    .iter()
    .cloned()
    .collect();
}

impl Func {
    /// Looks up a function by its exact (case-sensitive) name
    pub fn from_name(name: &str) -> Option<Func> {
        STD_FUNCS.get(name).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Func::Abs => "abs",
            Func::Acos => "acos",
            Func::Asin => "asin",
            Func::Atan => "atan",
            Func::Ceil => "ceil",
            Func::Floor => "floor",
            Func::Round => "round",
            Func::Sqrt => "sqrt",
            Func::Log => "log",
            Func::Max => "max",
            Func::Min => "min",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Pow => "pow",
            Func::Exp => "exp",
        }
    }

    /// Missing arguments are NaN, extra arguments are ignored
    pub(crate) fn apply(self, args: &[f64]) -> f64 {
        let arg = |i: usize| args.get(i).copied().unwrap_or(f64::NAN);
        match self {
            Func::Abs => arg(0).abs(),
            Func::Acos => arg(0).acos(),
            Func::Asin => arg(0).asin(),
            Func::Atan => arg(0).atan(),
            Func::Ceil => arg(0).ceil(),
            Func::Floor => arg(0).floor(),
            Func::Round => round_half_up(arg(0)),
            Func::Sqrt => arg(0).sqrt(),
            Func::Log => arg(0).ln(),
            Func::Max => max_of(args),
            Func::Min => min_of(args),
            Func::Sin => arg(0).sin(),
            Func::Cos => arg(0).cos(),
            Func::Tan => arg(0).tan(),
            Func::Pow => power(arg(0), arg(1)),
            Func::Exp => arg(0).exp(),
        }
    }
}

// halves go towards +Infinity: round(2.5) = 3, round(-2.5) = -2
fn round_half_up(v: f64) -> f64 {
    let f = v.floor();
    if v - f >= 0.5 {
        f + 1.0
    } else {
        f
    }
}

fn max_of(args: &[f64]) -> f64 {
    let mut m = f64::NEG_INFINITY;
    for &v in args {
        if v.is_nan() {
            return f64::NAN;
        }
        if v > m {
            m = v;
        }
    }
    m
}

fn min_of(args: &[f64]) -> f64 {
    let mut m = f64::INFINITY;
    for &v in args {
        if v.is_nan() {
            return f64::NAN;
        }
        if v < m {
            m = v;
        }
    }
    m
}

// powf treats 1^NaN and 1^Infinity as 1, the result must be NaN instead
pub(crate) fn power(base: f64, exp: f64) -> f64 {
    if exp.is_nan() || (base.abs() == 1.0 && exp.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exp)
}

#[derive(Clone, Debug)]
pub(crate) enum Entry {
    Val(f64),
    Op(String, i32, bool),
    OpenB,
    Func(Func, usize),
}

pub(crate) struct Stack {
    pub(crate) queue: Vec<Entry>,
    pub(crate) output: Vec<Entry>,
    values: Vec<f64>,
}

const PRI_UNARY: i32 = 15;
pub(crate) const UNARY_MINUS: &str = "---";

impl Stack {
    fn priority(op: &str) -> (i32, bool) {
        match op {
            "^" => (17, true),                 // power
            UNARY_MINUS => (PRI_UNARY, true),  // negate
            "*" | "/" | "%" => (12, false),    // mult, div, remainder
            "+" | "-" => (8, false),           // add, sub
            _ => (0, false),                   // invalid op
        }
    }

    // move operators from the queue to output while the top operator in the
    // queue has greater priority, or equal priority and is left-associative
    fn pop_while_priority(&mut self, priority: i32) {
        while let Some(e) = self.queue.pop() {
            match &e {
                Entry::Op(_, p, right) if *p > priority || (*p == priority && !*right) => {
                    self.output.push(e);
                }
                _ => {
                    self.queue.push(e);
                    return;
                }
            }
        }
    }

    // move operators from the queue to output until the first bracket.
    // The bracket stays in the queue
    fn pop_until_bracket(&mut self) -> CalcErrorResult {
        loop {
            match self.queue.pop() {
                None => return Err(CalcError::ClosingBracketMismatch),
                Some(Entry::OpenB) => {
                    self.queue.push(Entry::OpenB);
                    return Ok(());
                }
                Some(e) => self.output.push(e),
            }
        }
    }

    // move all operators from queue to output.
    // Must be called only after the expression ends
    fn pop_all(&mut self) -> CalcErrorResult {
        while let Some(v) = self.queue.pop() {
            match &v {
                Entry::Op(..) => self.output.push(v),
                Entry::OpenB | Entry::Func(..) => return Err(CalcError::OpenBracketMismatch),
                Entry::Val(..) => self.output.push(v),
            }
        }
        Ok(())
    }

    // ------------ PUBLIC -----------------

    pub(crate) fn new() -> Self {
        Stack {
            queue: Vec::new(),
            output: Vec::new(),
            values: Vec::new(),
        }
    }

    pub(crate) fn push_value(&mut self, v: f64) {
        self.output.push(Entry::Val(v));
    }

    /// pushes a binary operator
    pub(crate) fn push(&mut self, op: &str) -> CalcErrorResult {
        let (pri, right_assoc) = Stack::priority(op);
        if pri == 0 {
            return Err(CalcError::UnexpectedToken(op.to_owned()));
        }

        self.pop_while_priority(pri);
        self.queue.push(Entry::Op(op.to_owned(), pri, right_assoc));
        Ok(())
    }

    /// pushes a prefix operator: nothing is popped because its operand
    /// has not been seen yet
    pub(crate) fn push_prefix(&mut self, op: &str) {
        self.queue.push(Entry::Op(op.to_owned(), PRI_UNARY, true));
    }

    pub(crate) fn push_func(&mut self, f: Func) {
        self.queue.push(Entry::Func(f, 0));
    }

    pub(crate) fn open_bracket(&mut self) {
        self.queue.push(Entry::OpenB);
    }

    /// closes an argument of the innermost function call
    pub(crate) fn separator(&mut self) -> CalcErrorResult {
        self.pop_until_bracket()?;
        match self.queue.iter_mut().rev().nth(1) {
            Some(Entry::Func(_, argc)) => {
                *argc += 1;
                Ok(())
            }
            _ => Err(CalcError::MisplacedSeparator),
        }
    }

    /// `empty` is true for `()`, which is valid only as a call without arguments
    pub(crate) fn close_bracket(&mut self, empty: bool) -> CalcErrorResult {
        self.pop_until_bracket()?;
        // the bracket itself
        let _ = self.queue.pop();

        match self.queue.pop() {
            Some(Entry::Func(f, argc)) => {
                let argc = if empty { argc } else { argc + 1 };
                self.output.push(Entry::Func(f, argc));
                Ok(())
            }
            Some(e) => {
                self.queue.push(e);
                if empty {
                    Err(CalcError::UnexpectedToken(")".to_string()))
                } else {
                    Ok(())
                }
            }
            None if empty => Err(CalcError::UnexpectedToken(")".to_string())),
            None => Ok(()),
        }
    }

    pub(crate) fn calculate(&mut self) -> CalcResult {
        self.pop_all()?;
        if self.output.is_empty() {
            return Err(CalcError::EmptyExpression);
        }

        self.values = Vec::new();
        let output = std::mem::take(&mut self.output);
        for o in output {
            match o {
                Entry::Val(v) => self.values.push(v),
                Entry::Op(op, ..) => self.process_operator(&op)?,
                Entry::Func(f, args) => self.process_function(f, args)?,
                Entry::OpenB => return Err(CalcError::OpenBracketMismatch),
            }
        }

        match (self.values.pop(), self.values.is_empty()) {
            (Some(v), true) => Ok(v),
            _ => Err(CalcError::InsufficientOps),
        }
    }

    fn process_operator(&mut self, op: &str) -> CalcErrorResult {
        if op == UNARY_MINUS {
            let v = self.values.pop().ok_or_else(|| CalcError::MissingOperand("-".to_string()))?;
            self.values.push(-v);
            return Ok(());
        }

        let (v2, v1) = match (self.values.pop(), self.values.pop()) {
            (Some(v2), Some(v1)) => (v2, v1),
            _ => return Err(CalcError::MissingOperand(op.to_string())),
        };
        let v = match op {
            "+" => v1 + v2,
            "-" => v1 - v2,
            "*" => v1 * v2,
            "/" => v1 / v2,
            "%" => v1 % v2,
            "^" => power(v1, v2),
            _ => return Err(CalcError::UnexpectedToken(op.to_string())),
        };
        self.values.push(v);
        Ok(())
    }

    fn process_function(&mut self, f: Func, args: usize) -> CalcErrorResult {
        if self.values.len() < args {
            return Err(CalcError::MissingOperand(f.name().to_string()));
        }
        let at = self.values.len() - args;
        let v = f.apply(&self.values[at..]);
        self.values.truncate(at);
        self.values.push(v);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::f64_equal;

    #[test]
    fn test_simple_order() {
        // 2 + 3 * 4
        let mut stk = Stack::new();
        stk.push_value(2.0);
        stk.push("+").unwrap();
        stk.push_value(3.0);
        stk.push("*").unwrap();
        stk.push_value(4.0);
        assert_eq!(stk.calculate(), Ok(14.0));

        // 10 - 4 - 3
        let mut stk = Stack::new();
        stk.push_value(10.0);
        stk.push("-").unwrap();
        stk.push_value(4.0);
        stk.push("-").unwrap();
        stk.push_value(3.0);
        assert_eq!(stk.calculate(), Ok(3.0));
    }

    #[test]
    fn test_braces() {
        // (2 + 3) * 4
        let mut stk = Stack::new();
        stk.open_bracket();
        stk.push_value(2.0);
        stk.push("+").unwrap();
        stk.push_value(3.0);
        stk.close_bracket(false).unwrap();
        stk.push("*").unwrap();
        stk.push_value(4.0);
        assert_eq!(stk.calculate(), Ok(20.0));

        let mut stk = Stack::new();
        stk.open_bracket();
        stk.push_value(2.0);
        assert_eq!(stk.calculate(), Err(CalcError::OpenBracketMismatch));

        let mut stk = Stack::new();
        stk.push_value(2.0);
        assert_eq!(stk.close_bracket(false), Err(CalcError::ClosingBracketMismatch));
    }

    #[test]
    fn test_power() {
        // 2 ^ 3 ^ 2 is right-associative
        let mut stk = Stack::new();
        stk.push_value(2.0);
        stk.push("^").unwrap();
        stk.push_value(3.0);
        stk.push("^").unwrap();
        stk.push_value(2.0);
        assert_eq!(stk.calculate(), Ok(512.0));

        // -2 ^ 2 negates the power
        let mut stk = Stack::new();
        stk.push_prefix(UNARY_MINUS);
        stk.push_value(2.0);
        stk.push("^").unwrap();
        stk.push_value(2.0);
        assert_eq!(stk.calculate(), Ok(-4.0));

        // 2 ^ -1
        let mut stk = Stack::new();
        stk.push_value(2.0);
        stk.push("^").unwrap();
        stk.push_prefix(UNARY_MINUS);
        stk.push_value(1.0);
        assert_eq!(stk.calculate(), Ok(0.5));

        assert!(power(1.0, f64::INFINITY).is_nan());
        assert!(power(2.0, f64::NAN).is_nan());
        assert_eq!(power(f64::NAN, 0.0), 1.0);
    }

    #[test]
    fn test_functions() {
        // max(1, 2 + 5, 3)
        let mut stk = Stack::new();
        stk.push_func(Func::Max);
        stk.open_bracket();
        stk.push_value(1.0);
        stk.separator().unwrap();
        stk.push_value(2.0);
        stk.push("+").unwrap();
        stk.push_value(5.0);
        stk.separator().unwrap();
        stk.push_value(3.0);
        stk.close_bracket(false).unwrap();
        assert_eq!(stk.calculate(), Ok(7.0));

        // min() without arguments
        let mut stk = Stack::new();
        stk.push_func(Func::Min);
        stk.open_bracket();
        stk.close_bracket(true).unwrap();
        assert_eq!(stk.calculate(), Ok(f64::INFINITY));

        let mut stk = Stack::new();
        stk.open_bracket();
        stk.push_value(1.0);
        assert_eq!(stk.separator(), Err(CalcError::MisplacedSeparator));
    }

    #[test]
    fn test_function_semantics() {
        assert_eq!(Func::Round.apply(&[2.5]), 3.0);
        assert_eq!(Func::Round.apply(&[-2.5]), -2.0);
        assert_eq!(Func::Round.apply(&[-2.6]), -3.0);
        assert_eq!(Func::Max.apply(&[]), f64::NEG_INFINITY);
        assert!(Func::Max.apply(&[1.0, f64::NAN]).is_nan());
        assert!(Func::Sqrt.apply(&[]).is_nan());
        assert!(Func::Pow.apply(&[2.0]).is_nan());
        assert_eq!(Func::Sqrt.apply(&[16.0, 99.0]), 4.0);
        assert!(f64_equal(Func::Log.apply(&[std::f64::consts::E]), 1.0));
        assert_eq!(Func::from_name("floor"), Some(Func::Floor));
        assert_eq!(Func::from_name("Floor"), None);
        assert_eq!(Func::from_name("floorx"), None);
    }

    #[test]
    fn test_ieee_division() {
        let mut stk = Stack::new();
        stk.push_value(1.0);
        stk.push("/").unwrap();
        stk.push_value(0.0);
        assert_eq!(stk.calculate(), Ok(f64::INFINITY));

        let mut stk = Stack::new();
        stk.push_value(5.0);
        stk.push("%").unwrap();
        stk.push_value(0.0);
        assert!(stk.calculate().unwrap().is_nan());

        let mut stk = Stack::new();
        stk.push_prefix(UNARY_MINUS);
        stk.push_value(7.0);
        stk.push("%").unwrap();
        stk.push_value(3.0);
        assert_eq!(stk.calculate(), Ok(-1.0));
    }
}
