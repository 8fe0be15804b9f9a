use crate::{assignment::Assignment, error::CircuitError, scalar::FieldElement};

/// Handle to one slot of the assignment vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(pub(crate) usize);

impl Variable {
    pub fn index(self) -> usize {
        self.0
    }
}

/// `constant + Σ coeff_i * var_i`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearCombination<F> {
    terms: Vec<(Variable, F)>,
    constant: F,
}

impl<F: FieldElement> LinearCombination<F> {
    pub fn zero() -> Self {
        Self::constant(F::zero())
    }

    pub fn constant(value: F) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn term(mut self, var: Variable, coeff: F) -> Self {
        self.terms.push((var, coeff));
        self
    }

    pub fn plus(self, var: Variable) -> Self {
        self.term(var, F::one())
    }

    pub fn plus_constant(mut self, value: F) -> Self {
        self.constant = self.constant + value;
        self
    }

    pub fn terms(&self) -> &[(Variable, F)] {
        &self.terms
    }

    pub fn constant_term(&self) -> F {
        self.constant
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.terms.iter().map(|(var, _)| *var)
    }

    pub fn evaluate(&self, assignment: &Assignment<F>) -> Result<F, CircuitError> {
        self.terms
            .iter()
            .try_fold(self.constant, |acc, (var, coeff)| {
                Ok(acc + *coeff * assignment.get(*var)?)
            })
    }
}

impl<F: FieldElement> From<Variable> for LinearCombination<F> {
    fn from(var: Variable) -> Self {
        Self::zero().plus(var)
    }
}

/// `a * b = c`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint<F> {
    pub a: LinearCombination<F>,
    pub b: LinearCombination<F>,
    pub c: LinearCombination<F>,
    pub annotation: String,
}

impl<F: FieldElement> Constraint<F> {
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.a
            .variables()
            .chain(self.b.variables())
            .chain(self.c.variables())
    }

    pub fn is_satisfied(&self, assignment: &Assignment<F>) -> Result<bool, CircuitError> {
        let a = self.a.evaluate(assignment)?;
        let b = self.b.evaluate(assignment)?;
        let c = self.c.evaluate(assignment)?;
        Ok(a * b == c)
    }
}

/// Finalized R1CS. Variables `0..num_primary` are the primary input, the rest
/// are auxiliary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintSystem<F> {
    pub(crate) constraints: Vec<Constraint<F>>,
    pub(crate) labels: Vec<String>,
    pub(crate) num_primary: usize,
}

impl<F: FieldElement> ConstraintSystem<F> {
    pub fn constraints(&self) -> &[Constraint<F>] {
        &self.constraints
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn num_variables(&self) -> usize {
        self.labels.len()
    }

    pub fn num_primary(&self) -> usize {
        self.num_primary
    }

    pub fn num_auxiliary(&self) -> usize {
        self.num_variables() - self.num_primary
    }

    pub fn label(&self, var: Variable) -> Option<&str> {
        self.labels.get(var.index()).map(String::as_str)
    }

    /// Index of the first violated constraint, if any.
    pub fn first_unsatisfied(
        &self,
        assignment: &Assignment<F>,
    ) -> Result<Option<usize>, CircuitError> {
        for (i, constraint) in self.constraints.iter().enumerate() {
            if !constraint.is_satisfied(assignment)? {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    pub fn is_satisfied(&self, assignment: &Assignment<F>) -> Result<bool, CircuitError> {
        Ok(self.first_unsatisfied(assignment)?.is_none())
    }

    /// Rebuilds a full assignment from split primary/auxiliary vectors.
    pub fn assignment_from(&self, primary: &[F], auxiliary: &[F]) -> Option<Assignment<F>> {
        if primary.len() != self.num_primary || auxiliary.len() != self.num_auxiliary() {
            return None;
        }
        Some(Assignment::from_values(
            primary.iter().chain(auxiliary).copied().collect(),
            self.num_primary,
        ))
    }
}
