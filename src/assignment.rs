use crate::{circuit::Variable, error::CircuitError, scalar::FieldElement};

/// Values bound to allocated variables.
///
/// The first `num_primary` slots are the public primary input; the rest are
/// the private auxiliary input and never leave the prover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<F> {
    values: Vec<Option<F>>,
    num_primary: usize,
}

impl<F> Default for Assignment<F> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            num_primary: 0,
        }
    }
}

impl<F: FieldElement> Assignment<F> {
    pub(crate) fn from_values(values: Vec<F>, num_primary: usize) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
            num_primary,
        }
    }

    pub(crate) fn push_slot(&mut self) {
        self.values.push(None);
    }

    pub(crate) fn set_num_primary(&mut self, num_primary: usize) {
        self.num_primary = num_primary;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn num_primary(&self) -> usize {
        self.num_primary
    }

    pub fn set(&mut self, var: Variable, value: F) -> Result<(), CircuitError> {
        let slot = self
            .values
            .get_mut(var.index())
            .ok_or(CircuitError::UnknownVariable(var))?;
        *slot = Some(value);
        Ok(())
    }

    pub fn get(&self, var: Variable) -> Result<F, CircuitError> {
        match self.values.get(var.index()) {
            Some(Some(value)) => Ok(*value),
            Some(None) => Err(CircuitError::Unassigned(var)),
            None => Err(CircuitError::UnknownVariable(var)),
        }
    }

    pub fn is_assigned(&self, var: Variable) -> bool {
        matches!(self.values.get(var.index()), Some(Some(_)))
    }

    pub fn primary_input(&self) -> Result<Vec<F>, CircuitError> {
        self.collect(0..self.num_primary.min(self.values.len()))
    }

    pub fn auxiliary_input(&self) -> Result<Vec<F>, CircuitError> {
        self.collect(self.num_primary.min(self.values.len())..self.values.len())
    }

    fn collect(&self, range: core::ops::Range<usize>) -> Result<Vec<F>, CircuitError> {
        range.map(|i| self.get(Variable(i))).collect()
    }
}
