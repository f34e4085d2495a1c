//! Provides struct for representing an optimization problem's objective

use indexmap::IndexMap;

/// Represents the Objective of an optimization problem
#[derive(Debug, Clone)]
pub struct Objective {
    /// Terms included in the objective (See [`ObjectiveTerm`])
    terms: Vec<ObjectiveTerm>,
    /// Sense of the objective (maximize, or minimize), see [`ObjectiveSense`]
    sense: ObjectiveSense,
}

impl Objective {
    /// Create a new empty objective, with a given sense
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            terms: Vec::new(),
            sense,
        }
    }

    /// Create a new empty maximization objective
    pub fn new_maximize() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new empty minimization objective
    pub fn new_minimize() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }

    /// Change the sense of the objective
    pub fn set_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
    }

    /// Sense of the objective
    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    /// Terms of the objective
    pub fn terms(&self) -> &[ObjectiveTerm] {
        &self.terms
    }

    /// Add a new term to the objective
    pub fn add_term(&mut self, term: ObjectiveTerm) {
        self.terms.push(term);
    }

    /// Remove all terms from the objective
    pub fn remove_all_terms(&mut self) {
        self.terms.clear();
    }

    /// Total objective coefficient of each variable, summing repeated terms
    pub fn coefficients(&self) -> IndexMap<String, f64> {
        let mut coefficients: IndexMap<String, f64> = IndexMap::new();
        for term in &self.terms {
            *coefficients.entry(term.variable.clone()).or_insert(0.0) += term.coefficient;
        }
        coefficients
    }

    /// Value of the objective for a set of variable values
    ///
    /// Variables missing from `values` are taken to be 0
    pub fn evaluate(&self, values: &IndexMap<String, f64>) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coefficient * values.get(&t.variable).copied().unwrap_or(0.0))
            .sum()
    }
}

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    /// The objective should be minimized
    Minimize,
    /// The objective should be maximized
    Maximize,
}

/// A linear term in the objective
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveTerm {
    /// Id of the variable in the objective term
    pub variable: String,
    /// Coefficient for the term
    pub coefficient: f64,
}

impl ObjectiveTerm {
    /// Create a new linear objective term
    pub fn new_linear(variable: &str, coefficient: f64) -> Self {
        ObjectiveTerm {
            variable: variable.to_string(),
            coefficient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coefficients_are_summed() {
        let mut objective = Objective::new_maximize();
        objective.add_term(ObjectiveTerm::new_linear("x", 1.0));
        objective.add_term(ObjectiveTerm::new_linear("y", -1.0));
        objective.add_term(ObjectiveTerm::new_linear("x", 0.5));
        let coefficients = objective.coefficients();
        assert_eq!(coefficients.len(), 2);
        assert!((coefficients["x"] - 1.5).abs() < 1e-12);

        let mut values = IndexMap::new();
        values.insert("x".to_string(), 2.0);
        values.insert("y".to_string(), 1.0);
        assert!((objective.evaluate(&values) - 2.0).abs() < 1e-12);

        objective.remove_all_terms();
        assert!(objective.terms().is_empty());
        assert_eq!(objective.sense(), ObjectiveSense::Maximize);
    }
}
