use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::parse_number;

// integers up to 2^53 are exact in f64 and are written without a fraction
const MAX_SAFE_INT: f64 = 9_007_199_254_740_992.0;

/// holds a user-defined variable
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    name: String,
    value: f64,
}

impl Variable {
    pub fn new(name: &str, value: f64) -> Self {
        Variable {
            name: name.to_string(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Variables available to an expression. Names are case-sensitive and keep
/// the position of their first definition
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VarSet {
    variables: Vec<Variable>,
}

impl VarSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds a variable set from newline-separated `name=value` lines.
    /// Never fails: a line without `=`, with a name that is not an
    /// identifier (`my var`, `2x`), or with a value that is not a finite
    /// number is skipped. A repeated name overwrites
    /// the earlier value
    pub fn parse(text: &str) -> Self {
        let mut vars = VarSet::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((name, value)) = line.split_once('=') else {
                log::trace!("skipping variable line without '=': {}", line);
                continue;
            };
            let name = name.trim();
            match parse_number(value.trim()) {
                Some(v) if is_identifier(name) && v.is_finite() => vars.insert(name, v),
                _ => log::trace!("skipping malformed variable line: {}", line),
            }
        }
        vars
    }

    /// Returns a variable value by its name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.variables.iter().find(|v| v.name == name).map(|v| v.value)
    }

    /// Creates a new variable or replaces the value of an existing one
    pub fn insert(&mut self, name: &str, value: f64) {
        for v in &mut self.variables {
            if v.name == name {
                v.value = value;
                return;
            }
        }
        self.variables.push(Variable::new(name, value));
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    /// JSON object text, e.g. `{"a":9,"b":2.5}`
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Serialize for VarSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.variables.len()))?;
        for v in &self.variables {
            if v.value.fract() == 0.0 && v.value.abs() <= MAX_SAFE_INT {
                map.serialize_entry(&v.name, &(v.value as i64))?;
            } else {
                map.serialize_entry(&v.name, &v.value)?;
            }
        }
        map.end()
    }
}

/// Same identifier rule as the expression tokenizer: a letter or `_`
/// followed by letters, digits, and `_`
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Shortcut for [`VarSet::parse`]
pub fn parse_vars(text: &str) -> VarSet {
    VarSet::parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        let vars = parse_vars("a=1\nb = 2.5\nbad line\nc=notanumber\na=9");
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get("a"), Some(9.0));
        assert_eq!(vars.get("b"), Some(2.5));
        assert_eq!(vars.get("c"), None);
        let names: Vec<&str> = vars.iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_skipped_lines() {
        let vars = parse_vars("\n   \n=5\n x = \nInf=Infinity\ny=3=4\nz = -0.5 \r\n");
        assert_eq!(vars.len(), 2);
        // everything after the first '=' is the value, parsed up to the first non-number
        assert_eq!(vars.get("y"), Some(3.0));
        assert_eq!(vars.get("z"), Some(-0.5));
        assert_eq!(vars.get("Inf"), None);
        assert!(parse_vars("").is_empty());
    }

    #[test]
    fn test_non_identifier_names() {
        let vars = parse_vars("my var=3\n2x=1\nx-y=2\n_tmp=4\nrate2 = 5");
        let names: Vec<&str> = vars.iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["_tmp", "rate2"]);
        assert_eq!(vars.to_json(), r#"{"_tmp":4,"rate2":5}"#);
    }

    #[test]
    fn test_case_sensitive() {
        let vars = parse_vars("X=1\nx=2");
        assert_eq!(vars.get("X"), Some(1.0));
        assert_eq!(vars.get("x"), Some(2.0));
    }

    #[test]
    fn test_json() {
        let vars = parse_vars("a=1\nb = 2.5\na=9\nc=-3");
        assert_eq!(vars.to_json(), r#"{"a":9,"b":2.5,"c":-3}"#);
        assert_eq!(VarSet::new().to_json(), "{}");
    }
}
