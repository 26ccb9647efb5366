// Expression evaluator - reduces a parsed AST to an f64.
// Trig is angle-unit aware: Deg mode converts sin/cos/tan arguments from
// degrees and converts asin/acos/atan results back to degrees.

use serde::{Deserialize, Serialize};

use super::parser::{Constant, Expr, Op};

/// Angle unit for trigonometric functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Deg,
    Rad,
}

impl AngleUnit {
    pub fn toggled(self) -> Self {
        match self {
            AngleUnit::Deg => AngleUnit::Rad,
            AngleUnit::Rad => AngleUnit::Deg,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AngleUnit::Deg => "DEG",
            AngleUnit::Rad => "RAD",
        }
    }
}

impl std::str::FromStr for AngleUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deg" | "degrees" => Ok(AngleUnit::Deg),
            "rad" | "radians" => Ok(AngleUnit::Rad),
            other => Err(format!("Unknown angle unit: {}", other)),
        }
    }
}

pub fn evaluate(expr: &Expr, angle: AngleUnit) -> Result<f64, String> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Constant(Constant::Pi) => Ok(std::f64::consts::PI),
        Expr::Constant(Constant::E) => Ok(std::f64::consts::E),
        Expr::Function { name, args } => evaluate_function(name, args, angle),
        Expr::BinaryOp { op, left, right } => {
            let left = evaluate(left, angle)?;
            let right = evaluate(right, angle)?;
            // Division and remainder by zero are left to f64 semantics
            // (Infinity / NaN); NaN is rejected at the pipeline boundary.
            Ok(match op {
                Op::Add => left + right,
                Op::Sub => left - right,
                Op::Mul => left * right,
                Op::Div => left / right,
                Op::Mod => left % right,
                Op::Pow => left.powf(right),
            })
        }
    }
}

fn evaluate_function(name: &str, args: &[Expr], angle: AngleUnit) -> Result<f64, String> {
    if args.len() != 1 {
        return Err(format!("{} requires exactly one argument", name));
    }
    let arg = evaluate(&args[0], angle)?;

    let result = match name {
        "sin" => trig_arg(arg, angle).sin(),
        "cos" => trig_arg(arg, angle).cos(),
        "tan" => trig_arg(arg, angle).tan(),
        "asin" => trig_result(arg.asin(), angle),
        "acos" => trig_result(arg.acos(), angle),
        "atan" => trig_result(arg.atan(), angle),
        "sqrt" => arg.sqrt(),
        "ln" => arg.ln(),
        "log" => arg.log10(),
        _ => return Err(format!("Unknown function: {}", name)),
    };
    Ok(result)
}

fn trig_arg(n: f64, angle: AngleUnit) -> f64 {
    match angle {
        AngleUnit::Deg => n.to_radians(),
        AngleUnit::Rad => n,
    }
}

fn trig_result(n: f64, angle: AngleUnit) -> f64 {
    match angle {
        AngleUnit::Deg => n.to_degrees(),
        AngleUnit::Rad => n,
    }
}
