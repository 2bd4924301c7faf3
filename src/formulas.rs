//! Pre-built formula forms.
//!
//! Each formula reads a few numeric fields, computes a result and describes
//! it twice: a display line for the result area and, on success, a history
//! record. Inputs are parsed leniently (`"70kg"` reads as 70).

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::errors::WidgetError;
use crate::value::{format_fixed, format_number, parse_number};

pub const MSG_INVALID_NUMBERS: &str = "Enter valid numbers.";
pub const MSG_INVALID_QUADRATIC: &str = "Enter valid numbers (a ≠ 0).";
pub const MSG_INVALID_BMI: &str = "Enter valid data.";
pub const MSG_OHM_TWO_VALUES: &str = "Fill in at least two values.";

const BMI_UNDERWEIGHT: f64 = 18.5;
const BMI_OVERWEIGHT: f64 = 25.0;

/// One input of a formula form
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub id: &'static str,
    pub placeholder: &'static str,
}

const fn field(id: &'static str, placeholder: &'static str) -> Field {
    Field { id, placeholder }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Formula {
    RectangleArea,
    CircleArea,
    RectanglePerimeter,
    Quadratic,
    Bmi,
    Ohm,
}

pub const ALL_FORMULAS: [Formula; 6] = [
    Formula::RectangleArea,
    Formula::CircleArea,
    Formula::RectanglePerimeter,
    Formula::Quadratic,
    Formula::Bmi,
    Formula::Ohm,
];

/// Raw text of the form fields, by field id
#[derive(Clone, Debug, Default)]
pub struct FormInput {
    values: Vec<(String, String)>,
}

impl FormInput {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with(mut self, id: &str, text: &str) -> Self {
        self.set(id, text);
        self
    }

    pub fn set(&mut self, id: &str, text: &str) {
        match self.values.iter_mut().find(|(k, _)| k == id) {
            Some((_, v)) => *v = text.to_string(),
            None => self.values.push((id.to_string(), text.to_string())),
        }
    }

    /// Numeric value of a field; `None` if it is absent or not a number
    pub fn number(&self, id: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(k, _)| k == id)
            .and_then(|(_, v)| parse_number(v))
    }
}

/// A successful computation
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    /// Text for the result area
    pub display: String,
    /// `(title, detail)` for the history, if the result is worth keeping
    pub record: Option<(String, String)>,
}

impl Outcome {
    fn recorded(display: String, title: &str, detail: String) -> Self {
        Outcome {
            display,
            record: Some((title.to_string(), detail)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QuadraticRoots {
    /// `x1` uses `+sqrt(D)`, `x2` uses `-sqrt(D)`
    Real { discriminant: f64, x1: f64, x2: f64 },
    /// negative discriminant: a conjugate pair
    Complex {
        discriminant: f64,
        x1: Complex64,
        x2: Complex64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
}

impl BmiCategory {
    pub fn name(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
        }
    }
}

/// Ohm's law with one unknown
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OhmSolution {
    Voltage(f64),
    Current(f64),
    Resistance(f64),
    /// all three values were given, nothing to compute
    Complete,
}

pub fn rectangle_area(length: f64, width: f64) -> f64 {
    length * width
}

pub fn rectangle_perimeter(length: f64, width: f64) -> f64 {
    2.0 * (length + width)
}

pub fn circle_area(radius: f64) -> f64 {
    PI * radius * radius
}

/// Roots of `ax² + bx + c = 0`. `a` must not be zero
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> QuadraticRoots {
    let d = b * b - 4.0 * a * c;
    if d < 0.0 {
        let sq = Complex64::new(d, 0.0).sqrt();
        let minus_b = Complex64::new(-b, 0.0);
        QuadraticRoots::Complex {
            discriminant: d,
            x1: (minus_b + sq) / (2.0 * a),
            x2: (minus_b - sq) / (2.0 * a),
        }
    } else {
        QuadraticRoots::Real {
            discriminant: d,
            x1: (-b + d.sqrt()) / (2.0 * a),
            x2: (-b - d.sqrt()) / (2.0 * a),
        }
    }
}

/// Body mass index from weight in kilograms and height in centimeters
pub fn bmi(weight_kg: f64, height_cm: f64) -> (f64, BmiCategory) {
    let height = height_cm / 100.0;
    let bmi = weight_kg / (height * height);
    let category = if bmi < BMI_UNDERWEIGHT {
        BmiCategory::Underweight
    } else if bmi >= BMI_OVERWEIGHT {
        BmiCategory::Overweight
    } else {
        BmiCategory::Normal
    };
    (bmi, category)
}

/// Solves `V = I·R` for the missing value. `None` if fewer than two
/// values are known
pub fn solve_ohm(v: Option<f64>, i: Option<f64>, r: Option<f64>) -> Option<OhmSolution> {
    match (v, i, r) {
        (None, Some(i), Some(r)) => Some(OhmSolution::Voltage(i * r)),
        (Some(v), None, Some(r)) => Some(OhmSolution::Current(v / r)),
        (Some(v), Some(i), None) => Some(OhmSolution::Resistance(v / i)),
        (Some(..), Some(..), Some(..)) => Some(OhmSolution::Complete),
        _ => None,
    }
}

fn format_complex(c: Complex64) -> String {
    if c.im >= 0.0 {
        format!("{}+{}i", format_number(c.re), format_number(c.im))
    } else {
        format!("{}{}i", format_number(c.re), format_number(c.im))
    }
}

impl Formula {
    /// Maps a trigger command such as `area_rect` to its formula
    pub fn from_command(cmd: &str) -> Option<Formula> {
        ALL_FORMULAS.iter().copied().find(|f| f.command() == cmd)
    }

    pub fn command(self) -> &'static str {
        match self {
            Formula::RectangleArea => "area_rect",
            Formula::CircleArea => "area_circle",
            Formula::RectanglePerimeter => "perim_rect",
            Formula::Quadratic => "quad",
            Formula::Bmi => "bmi",
            Formula::Ohm => "ohm",
        }
    }

    /// History title
    pub fn title(self) -> &'static str {
        match self {
            Formula::RectangleArea => "Rectangle Area",
            Formula::CircleArea => "Circle Area",
            Formula::RectanglePerimeter => "Rectangle Perimeter",
            Formula::Quadratic => "Quadratic Formula",
            Formula::Bmi => "BMI",
            Formula::Ohm => "Ohm",
        }
    }

    /// One-line description shown above the form
    pub fn hint(self) -> &'static str {
        match self {
            Formula::RectangleArea => "Rectangle area = p * l",
            Formula::CircleArea => "Circle area = π * r²",
            Formula::RectanglePerimeter => "Rectangle perimeter = 2*(p + l)",
            Formula::Quadratic => "Roots of ax² + bx + c = 0",
            Formula::Bmi => "BMI = weight(kg) / (height(m)^2)",
            Formula::Ohm => "V = I * R (Ohm's law). Fill in two values, leave the unknown empty.",
        }
    }

    pub fn fields(self) -> &'static [Field] {
        const RECT: [Field; 2] = [field("p", "length (p)"), field("l", "width (l)")];
        const CIRCLE: [Field; 1] = [field("r", "radius (r)")];
        const QUAD: [Field; 3] = [field("a", "a"), field("b", "b"), field("c", "c")];
        const BMI: [Field; 2] = [field("weight", "Weight (kg)"), field("height", "Height (cm)")];
        const OHM: [Field; 3] = [
            field("V", "Voltage V (volt). Leave empty to solve for it"),
            field("I", "Current I (ampere). Leave empty to solve for it"),
            field("R", "Resistance R (ohm). Leave empty to solve for it"),
        ];
        match self {
            Formula::RectangleArea | Formula::RectanglePerimeter => &RECT,
            Formula::CircleArea => &CIRCLE,
            Formula::Quadratic => &QUAD,
            Formula::Bmi => &BMI,
            Formula::Ohm => &OHM,
        }
    }

    /// Validates the form and computes the result
    pub fn compute(self, input: &FormInput) -> Result<Outcome, WidgetError> {
        let n = format_number;
        match self {
            Formula::RectangleArea | Formula::RectanglePerimeter => {
                let (p, l) = match (input.number("p"), input.number("l")) {
                    (Some(p), Some(l)) => (p, l),
                    _ => return Err(WidgetError::Validation(MSG_INVALID_NUMBERS)),
                };
                let (label, out) = if self == Formula::RectangleArea {
                    ("Area", rectangle_area(p, l))
                } else {
                    ("Perimeter", rectangle_perimeter(p, l))
                };
                Ok(Outcome::recorded(
                    format!("{} = {}", label, n(out)),
                    self.title(),
                    format!("p={}, l={} → {}", n(p), n(l), n(out)),
                ))
            }
            Formula::CircleArea => {
                let r = input.number("r").ok_or(WidgetError::Validation(MSG_INVALID_NUMBERS))?;
                let out = circle_area(r);
                Ok(Outcome::recorded(
                    format!("Area = {}", format_fixed(out, 6)),
                    self.title(),
                    format!("r={} → {}", n(r), n(out)),
                ))
            }
            Formula::Quadratic => {
                let (a, b, c) = match (input.number("a"), input.number("b"), input.number("c")) {
                    (Some(a), Some(b), Some(c)) if a != 0.0 => (a, b, c),
                    _ => return Err(WidgetError::Validation(MSG_INVALID_QUADRATIC)),
                };
                let coeffs = format!("a={}, b={}, c={}", n(a), n(b), n(c));
                match quadratic_roots(a, b, c) {
                    QuadraticRoots::Real { x1, x2, .. } => Ok(Outcome::recorded(
                        format!("x1 = {}\nx2 = {}", n(x1), n(x2)),
                        self.title(),
                        format!("{} → x1={}, x2={}", coeffs, n(x1), n(x2)),
                    )),
                    QuadraticRoots::Complex { discriminant, x1, x2 } => Ok(Outcome::recorded(
                        format!(
                            "Discriminant < 0 → complex roots. D={}\nx1 = {}\nx2 = {}",
                            n(discriminant),
                            format_complex(x1),
                            format_complex(x2)
                        ),
                        self.title(),
                        format!("{} → Discriminant={} (complex)", coeffs, n(discriminant)),
                    )),
                }
            }
            Formula::Bmi => {
                let (weight, height) = match (input.number("weight"), input.number("height")) {
                    (Some(w), Some(h)) => (w, h),
                    _ => return Err(WidgetError::Validation(MSG_INVALID_BMI)),
                };
                let (value, category) = bmi(weight, height);
                Ok(Outcome::recorded(
                    format!("BMI = {} ({})", format_fixed(value, 2), category.name()),
                    self.title(),
                    format!(
                        "weight={}, height={}cm → BMI={} ({})",
                        n(weight),
                        n(height),
                        format_fixed(value, 2),
                        category.name()
                    ),
                ))
            }
            Formula::Ohm => {
                let (v, i, r) = (input.number("V"), input.number("I"), input.number("R"));
                let solution = solve_ohm(v, i, r).ok_or(WidgetError::Validation(MSG_OHM_TWO_VALUES))?;
                let show = |x: Option<f64>| n(x.unwrap_or(f64::NAN));
                Ok(match solution {
                    OhmSolution::Voltage(out) => Outcome::recorded(
                        format!("V = {}", n(out)),
                        self.title(),
                        format!("I={}, R={} → V={}", show(i), show(r), n(out)),
                    ),
                    OhmSolution::Current(out) => Outcome::recorded(
                        format!("I = {}", n(out)),
                        self.title(),
                        format!("V={}, R={} → I={}", show(v), show(r), n(out)),
                    ),
                    OhmSolution::Resistance(out) => Outcome::recorded(
                        format!("R = {}", n(out)),
                        self.title(),
                        format!("V={}, I={} → R={}", show(v), show(i), n(out)),
                    ),
                    OhmSolution::Complete => Outcome {
                        display: format!("V={}, I={}, R={}", show(v), show(i), show(r)),
                        record: None,
                    },
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands() {
        for f in ALL_FORMULAS.iter() {
            assert_eq!(Formula::from_command(f.command()), Some(*f));
            assert!(!f.fields().is_empty());
        }
        assert_eq!(Formula::from_command("area_rect"), Some(Formula::RectangleArea));
        assert_eq!(Formula::from_command("volume"), None);
    }

    #[test]
    fn test_rectangle_and_circle() {
        let input = FormInput::new().with("p", "2").with("l", "3.5");
        let out = Formula::RectangleArea.compute(&input).unwrap();
        assert_eq!(out.display, "Area = 7");
        assert_eq!(
            out.record,
            Some(("Rectangle Area".to_string(), "p=2, l=3.5 → 7".to_string()))
        );
        let out = Formula::RectanglePerimeter.compute(&input).unwrap();
        assert_eq!(out.display, "Perimeter = 11");

        let out = Formula::CircleArea.compute(&FormInput::new().with("r", "1")).unwrap();
        assert_eq!(out.display, "Area = 3.141593");

        let big = Formula::CircleArea.compute(&FormInput::new().with("r", "1e12")).unwrap();
        assert_eq!(big.display, format!("Area = {}", format_number(circle_area(1e12))));
        assert!(big.display.starts_with("Area = 3.14159265358979"));
        assert!(big.display.ends_with("e+24"));
        let huge = Formula::CircleArea.compute(&FormInput::new().with("r", "1e200")).unwrap();
        assert_eq!(huge.display, "Area = Infinity");

        let bad = FormInput::new().with("p", "abc").with("l", "3");
        assert_eq!(
            Formula::RectangleArea.compute(&bad),
            Err(WidgetError::Validation(MSG_INVALID_NUMBERS))
        );
        assert!(Formula::CircleArea.compute(&FormInput::new()).is_err());
    }

    #[test]
    fn test_quadratic_real() {
        assert_eq!(
            quadratic_roots(1.0, -3.0, 2.0),
            QuadraticRoots::Real {
                discriminant: 1.0,
                x1: 2.0,
                x2: 1.0
            }
        );
        let input = FormInput::new().with("a", "1").with("b", "-3").with("c", "2");
        let out = Formula::Quadratic.compute(&input).unwrap();
        assert_eq!(out.display, "x1 = 2\nx2 = 1");
        assert_eq!(
            out.record.unwrap().1,
            "a=1, b=-3, c=2 → x1=2, x2=1".to_string()
        );
    }

    #[test]
    fn test_quadratic_complex() {
        match quadratic_roots(1.0, 0.0, 1.0) {
            QuadraticRoots::Complex { discriminant, x1, x2 } => {
                assert_eq!(discriminant, -4.0);
                assert_eq!(x1, Complex64::new(0.0, 1.0));
                assert_eq!(x2, Complex64::new(0.0, -1.0));
            }
            other => panic!("expected complex roots, got {:?}", other),
        }
        let input = FormInput::new().with("a", "1").with("b", "0").with("c", "1");
        let out = Formula::Quadratic.compute(&input).unwrap();
        assert!(out.display.starts_with("Discriminant < 0 → complex roots. D=-4"));
        assert!(out.display.ends_with("x1 = 0+1i\nx2 = 0-1i"));
        assert_eq!(
            out.record,
            Some((
                "Quadratic Formula".to_string(),
                "a=1, b=0, c=1 → Discriminant=-4 (complex)".to_string()
            ))
        );

        let zero_a = FormInput::new().with("a", "0").with("b", "1").with("c", "1");
        assert_eq!(
            Formula::Quadratic.compute(&zero_a),
            Err(WidgetError::Validation(MSG_INVALID_QUADRATIC))
        );
    }

    #[test]
    fn test_bmi() {
        assert_eq!(bmi(50.0, 180.0).1, BmiCategory::Underweight);
        assert_eq!(bmi(70.0, 175.0).1, BmiCategory::Normal);
        assert_eq!(bmi(90.0, 170.0).1, BmiCategory::Overweight);
        let input = FormInput::new().with("weight", "70kg").with("height", "175");
        let out = Formula::Bmi.compute(&input).unwrap();
        assert_eq!(out.display, "BMI = 22.86 (Normal)");
        assert_eq!(out.record.unwrap().1, "weight=70, height=175cm → BMI=22.86 (Normal)");

        let tie = FormInput::new().with("weight", "90.5").with("height", "200");
        let out = Formula::Bmi.compute(&tie).unwrap();
        assert_eq!(out.display, "BMI = 22.63 (Normal)");
        assert_eq!(out.record.unwrap().1, "weight=90.5, height=200cm → BMI=22.63 (Normal)");

        let no_height = FormInput::new().with("weight", "70").with("height", "0");
        let out = Formula::Bmi.compute(&no_height).unwrap();
        assert_eq!(out.display, "BMI = Infinity (Overweight)");

        assert_eq!(
            Formula::Bmi.compute(&FormInput::new().with("weight", "70")),
            Err(WidgetError::Validation(MSG_INVALID_BMI))
        );
    }

    #[test]
    fn test_ohm() {
        assert_eq!(solve_ohm(None, Some(2.0), Some(3.0)), Some(OhmSolution::Voltage(6.0)));
        assert_eq!(solve_ohm(Some(6.0), None, Some(3.0)), Some(OhmSolution::Current(2.0)));
        assert_eq!(solve_ohm(Some(6.0), Some(2.0), None), Some(OhmSolution::Resistance(3.0)));
        assert_eq!(solve_ohm(Some(6.0), Some(2.0), Some(3.0)), Some(OhmSolution::Complete));
        assert_eq!(solve_ohm(Some(6.0), None, None), None);
        assert_eq!(solve_ohm(None, None, None), None);

        let input = FormInput::new().with("V", "").with("I", "2").with("R", "3");
        let out = Formula::Ohm.compute(&input).unwrap();
        assert_eq!(out.display, "V = 6");
        assert_eq!(out.record, Some(("Ohm".to_string(), "I=2, R=3 → V=6".to_string())));

        let input = FormInput::new().with("V", "12").with("I", "x").with("R", "4");
        assert_eq!(Formula::Ohm.compute(&input).unwrap().display, "I = 3");

        let input = FormInput::new().with("V", "6").with("I", "2").with("R", "3");
        let out = Formula::Ohm.compute(&input).unwrap();
        assert_eq!(out.display, "V=6, I=2, R=3");
        assert_eq!(out.record, None);

        let input = FormInput::new().with("V", "6");
        assert_eq!(
            Formula::Ohm.compute(&input),
            Err(WidgetError::Validation(MSG_OHM_TWO_VALUES))
        );
    }
}
