use std::collections::BTreeMap;

use curve25519_dalek::Scalar;
use libspartan::Instance;
use serde_derive::{Deserialize, Serialize};

use crate::{
    circuit::{ConstraintSystem, LinearCombination},
    scalar::FieldElement,
};

/// `(row, column, value)` with the value as canonical little-endian bytes.
pub type Entry = (usize, usize, [u8; 32]);

/// Upper bound on constraints, variables and inputs accepted from outside.
pub const MAX_SIZE: usize = 1 << 24;

/// Sparse R1CS matrices in Spartan's column layout: auxiliary variables
/// first, then the constant one, then the primary inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseR1cs {
    pub num_cons: usize,
    pub num_vars: usize,
    pub num_inputs: usize,
    pub a: Vec<Entry>,
    pub b: Vec<Entry>,
    pub c: Vec<Entry>,
}

impl SparseR1cs {
    /// Sizes libspartan can build generators for without panicking.
    pub fn check_sizes(&self) -> Result<(), String> {
        if self.num_cons == 0 || self.num_vars == 0 {
            return Err(format!(
                "empty system ({} constraints, {} variables)",
                self.num_cons, self.num_vars
            ));
        }
        for (name, size) in [
            ("constraints", self.num_cons),
            ("variables", self.num_vars),
            ("inputs", self.num_inputs),
        ] {
            if size > MAX_SIZE {
                return Err(format!("{size} {name} exceeds {MAX_SIZE}"));
            }
        }
        Ok(())
    }

    pub fn num_non_zero_entries(&self) -> usize {
        self.a.len().max(self.b.len()).max(self.c.len()).max(1)
    }

    pub fn instance(&self) -> Result<Instance, String> {
        Instance::new(
            self.num_cons,
            self.num_vars,
            self.num_inputs,
            &self.a,
            &self.b,
            &self.c,
        )
        .map_err(|e| format!("{e:?}"))
    }
}

fn column(index: usize, num_primary: usize, num_vars: usize) -> usize {
    if index < num_primary {
        num_vars + 1 + index
    } else {
        index - num_primary
    }
}

fn push_row(
    matrix: &mut Vec<Entry>,
    row: usize,
    lc: &LinearCombination<Scalar>,
    num_primary: usize,
    num_vars: usize,
) {
    // duplicate columns within a row are merged
    let mut cells: BTreeMap<usize, Scalar> = BTreeMap::new();
    if lc.constant_term() != Scalar::ZERO {
        cells.insert(num_vars, lc.constant_term());
    }
    for (var, coeff) in lc.terms() {
        let cell = cells
            .entry(column(var.index(), num_primary, num_vars))
            .or_insert(Scalar::ZERO);
        *cell += coeff;
    }
    matrix.extend(
        cells
            .into_iter()
            .filter(|(_, value)| *value != Scalar::ZERO)
            .map(|(col, value)| (row, col, value.to_bytes_le())),
    );
}

pub fn into_r1cs(system: &ConstraintSystem<Scalar>) -> SparseR1cs {
    let num_primary = system.num_primary();
    let num_vars = system.num_auxiliary();

    let mut a: Vec<Entry> = Vec::new();
    let mut b: Vec<Entry> = Vec::new();
    let mut c: Vec<Entry> = Vec::new();

    for (i, constraint) in system.constraints().iter().enumerate() {
        push_row(&mut a, i, &constraint.a, num_primary, num_vars);
        push_row(&mut b, i, &constraint.b, num_primary, num_vars);
        push_row(&mut c, i, &constraint.c, num_primary, num_vars);
    }

    SparseR1cs {
        num_cons: system.num_constraints(),
        num_vars,
        num_inputs: num_primary,
        a,
        b,
        c,
    }
}
