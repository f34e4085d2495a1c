//! Module providing representation of optimization problem variables
use std::fmt::{Display, Formatter};

use derive_builder::Builder;

/// A decision variable of an optimization problem
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Variable {
    /// Used to identify the variable (must be unique within a problem)
    pub id: String,
    /// Human-readable name of the variable
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Type of the variable, see [`VariableType`]
    #[builder(default = "VariableType::Continuous")]
    pub variable_type: VariableType,
    /// Lowest value the variable can take
    #[builder(default = "0.0")]
    pub lower_bound: f64,
    /// Highest value the variable can take
    #[builder(default = "f64::INFINITY")]
    pub upper_bound: f64,
    /// Position of the variable within the problem, set when it is added
    #[builder(default = "0")]
    pub(crate) index: usize,
}

impl Variable {
    /// Create a new binary variable with bounds [0, 1]
    pub fn new_binary(id: &str) -> Variable {
        Variable {
            id: id.to_string(),
            name: None,
            variable_type: VariableType::Binary,
            lower_bound: 0.0,
            upper_bound: 1.0,
            index: 0,
        }
    }

    /// Create a new continuous variable with the given bounds
    pub fn new_continuous(id: &str, lower_bound: f64, upper_bound: f64) -> Variable {
        Variable {
            id: id.to_string(),
            name: None,
            variable_type: VariableType::Continuous,
            lower_bound,
            upper_bound,
            index: 0,
        }
    }

    /// Position of the variable within its problem
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the variable can only take integral values
    pub fn is_integral(&self) -> bool {
        matches!(
            self.variable_type,
            VariableType::Integer | VariableType::Binary
        )
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:{}", name, self.variable_type),
            None => write!(f, "{}:{}", self.id, self.variable_type),
        }
    }
}

/// Represents the type of variable in an optimization problem
///
/// # Notes:
/// Not all variable types are supported for all solvers, see
/// [`crate::optimize::solvers::Solver::integer_variable_capable`]
#[derive(Debug, PartialEq, Clone, Copy, Hash, Eq)]
pub enum VariableType {
    /// Continuous variable
    Continuous,
    /// Integer variable
    Integer,
    /// Binary Variable
    Binary,
}

impl Display for VariableType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableType::Continuous => write!(f, "CONTINUOUS"),
            VariableType::Integer => write!(f, "INTEGER"),
            VariableType::Binary => write!(f, "BINARY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let x = VariableBuilder::default().id("x").build().unwrap();
        assert_eq!(x.variable_type, VariableType::Continuous);
        assert_eq!(x.lower_bound, 0.0);
        assert!(x.upper_bound.is_infinite());
        assert_eq!(format!("{}", x), "x:CONTINUOUS");
    }

    #[test]
    fn binary_variable() {
        let y = Variable::new_binary("y");
        assert!(y.is_integral());
        assert_eq!((y.lower_bound, y.upper_bound), (0.0, 1.0));
        assert_eq!(format!("{}", y), "y:BINARY");
    }
}
