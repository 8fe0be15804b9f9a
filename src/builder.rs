use tracing::debug;

use crate::{
    assignment::Assignment,
    circuit::{Constraint, ConstraintSystem, LinearCombination, Variable},
    error::CircuitError,
    params::FieldContext,
    scalar::FieldElement,
};

/// Allocates variables and accumulates constraints; holds the witness values
/// gadgets write into.
pub struct ConstraintBuilder<'ctx, F: FieldElement> {
    ctx: &'ctx FieldContext<F>,
    labels: Vec<String>,
    constraints: Vec<Constraint<F>>,
    assignment: Assignment<F>,
    num_primary: Option<usize>,
    finalized: bool,
}

impl<'ctx, F: FieldElement> ConstraintBuilder<'ctx, F> {
    pub fn new(ctx: &'ctx FieldContext<F>) -> Self {
        Self {
            ctx,
            labels: Vec::new(),
            constraints: Vec::new(),
            assignment: Assignment::default(),
            num_primary: None,
            finalized: false,
        }
    }

    pub fn context(&self) -> &'ctx FieldContext<F> {
        self.ctx
    }

    pub fn allocate(&mut self, label: impl Into<String>) -> Result<Variable, CircuitError> {
        if self.finalized {
            return Err(CircuitError::Finalized);
        }
        let var = Variable(self.labels.len());
        self.labels.push(label.into());
        self.assignment.push_slot();
        Ok(var)
    }

    /// Marks the first `k` allocated variables as the primary input.
    pub fn declare_primary_input_count(&mut self, k: usize) -> Result<(), CircuitError> {
        if self.finalized {
            return Err(CircuitError::Finalized);
        }
        if let Some(declared) = self.num_primary {
            return Err(CircuitError::PrimaryInputsAlreadyDeclared(declared));
        }
        self.num_primary = Some(k);
        self.assignment.set_num_primary(k);
        Ok(())
    }

    pub fn add_constraint(
        &mut self,
        a: impl Into<LinearCombination<F>>,
        b: impl Into<LinearCombination<F>>,
        c: impl Into<LinearCombination<F>>,
        annotation: impl Into<String>,
    ) -> Result<(), CircuitError> {
        if self.finalized {
            return Err(CircuitError::Finalized);
        }
        let constraint = Constraint {
            a: a.into(),
            b: b.into(),
            c: c.into(),
            annotation: annotation.into(),
        };
        if let Some(var) = constraint
            .variables()
            .find(|var| var.index() >= self.labels.len())
        {
            return Err(CircuitError::UnknownVariable(var));
        }
        self.constraints.push(constraint);
        Ok(())
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn num_variables(&self) -> usize {
        self.labels.len()
    }

    /// Snapshot for key generation. Allocation and new constraints are
    /// rejected afterwards; values can still be assigned.
    pub fn finalize(&mut self) -> Result<ConstraintSystem<F>, CircuitError> {
        if self.finalized {
            return Err(CircuitError::Finalized);
        }
        let num_primary = self.num_primary.ok_or(CircuitError::PrimaryInputsUndeclared)?;
        if num_primary > self.labels.len() {
            return Err(CircuitError::TooManyPrimaryInputs {
                declared: num_primary,
                allocated: self.labels.len(),
            });
        }
        self.finalized = true;
        debug!(
            constraints = self.constraints.len(),
            variables = self.labels.len(),
            primary = num_primary,
            "constraint system finalized"
        );
        Ok(ConstraintSystem {
            constraints: self.constraints.clone(),
            labels: self.labels.clone(),
            num_primary,
        })
    }

    pub fn set_value(&mut self, var: Variable, value: F) -> Result<(), CircuitError> {
        self.assignment.set(var, value)
    }

    pub fn value(&self, var: Variable) -> Result<F, CircuitError> {
        self.assignment.get(var)
    }

    pub fn assignment(&self) -> &Assignment<F> {
        &self.assignment
    }

    pub fn primary_input(&self) -> Result<Vec<F>, CircuitError> {
        self.assignment.primary_input()
    }

    pub fn auxiliary_input(&self) -> Result<Vec<F>, CircuitError> {
        self.assignment.auxiliary_input()
    }
}
