//! CPLEX-LP text export.

use super::model::LpModel;
use super::variables::VarDomain;
use std::fmt::Write;
use std::path::Path;

/// File name used when no export path is given.
pub const DEFAULT_LP_FILE: &str = "_lp.lp";

impl LpModel {
    /// Renders the model in CPLEX-LP format.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_colgen::lp::{LpModel, LpVariable, Sense};
    ///
    /// let mut model = LpModel::new("demo");
    /// model.add_variable(LpVariable::continuous("x", 0.0));
    /// model.set_objective(vec![("x".into(), 2.0)]);
    /// model.add_constraint("c1", vec![("x".into(), 1.0)], Sense::Ge, 1.0);
    ///
    /// let text = model.to_lp_string();
    /// assert!(text.contains("Minimize"));
    /// assert!(text.contains("c1: x >= 1"));
    /// ```
    pub fn to_lp_string(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_lp_text(&mut out);
        out
    }

    /// Writes the model in CPLEX-LP format to `path`, or [`DEFAULT_LP_FILE`].
    pub fn write_lp(&self, path: Option<&Path>) -> std::io::Result<()> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_LP_FILE));
        std::fs::write(path, self.to_lp_string())
    }

    fn write_lp_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "\\* {} *\\", self.name())?;
        writeln!(out, "Minimize")?;
        writeln!(out, "OBJ: {}", linear_expr(self.objective()))?;

        writeln!(out, "Subject To")?;
        for c in self.constraints() {
            writeln!(
                out,
                "{}: {} {} {}",
                c.name,
                linear_expr(&c.terms),
                c.sense.symbol(),
                c.rhs
            )?;
        }

        let bounded: Vec<_> = self
            .variables()
            .iter()
            .filter(|v| v.domain == VarDomain::Continuous)
            .filter(|v| v.lower != 0.0 || v.upper.is_some())
            .collect();
        if !bounded.is_empty() {
            writeln!(out, "Bounds")?;
            for v in bounded {
                match v.upper {
                    Some(upper) => writeln!(out, "{} <= {} <= {}", v.lower, v.name, upper)?,
                    None => writeln!(out, "{} >= {}", v.name, v.lower)?,
                }
            }
        }

        let binaries: Vec<_> = self
            .variables()
            .iter()
            .filter(|v| v.domain == VarDomain::Binary)
            .collect();
        if !binaries.is_empty() {
            writeln!(out, "Binaries")?;
            for v in binaries {
                writeln!(out, "{}", v.name)?;
            }
        }

        writeln!(out, "End")
    }
}

fn linear_expr(terms: &[(String, f64)]) -> String {
    if terms.is_empty() {
        return "0".into();
    }
    let mut expr = String::new();
    for (i, (name, coef)) in terms.iter().enumerate() {
        let magnitude = coef.abs();
        let sign = if *coef < 0.0 { "-" } else { "+" };
        if i == 0 {
            if *coef < 0.0 {
                expr.push_str("- ");
            }
        } else {
            expr.push(' ');
            expr.push_str(sign);
            expr.push(' ');
        }
        if magnitude == 1.0 {
            expr.push_str(name);
        } else {
            expr.push_str(&format!("{magnitude} {name}"));
        }
    }
    expr
}
