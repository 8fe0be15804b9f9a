use crate::{
    builder::ConstraintBuilder,
    circuit::{LinearCombination, Variable},
    error::CircuitError,
    scalar::FieldElement,
};

/// A sub-computation encoded as constraints plus the routine that fills in
/// its internal variables.
///
/// The witness routine must compute the same intermediate values the
/// constraints relate, otherwise the resulting assignment fails verification.
pub trait Gadget<F: FieldElement> {
    /// Appends the gadget's constraints. Errors on a second call.
    fn generate_constraints(
        &mut self,
        builder: &mut ConstraintBuilder<'_, F>,
    ) -> Result<(), CircuitError>;

    /// Assigns internal variables from the already assigned inputs.
    fn generate_witness(&self, builder: &mut ConstraintBuilder<'_, F>) -> Result<(), CircuitError>;
}

/// `out = x^3 + x + 5`
#[derive(Debug, Clone)]
pub struct CubicGadget {
    out: Variable,
    x: Variable,
    x_squared: Variable,
    x_cubed: Variable,
    constrained: bool,
}

impl CubicGadget {
    const NAME: &'static str = "cubic";

    pub fn new<F: FieldElement>(
        builder: &mut ConstraintBuilder<'_, F>,
        out: Variable,
        x: Variable,
    ) -> Result<Self, CircuitError> {
        let x_squared = builder.allocate("x_squared")?;
        let x_cubed = builder.allocate("x_cubed")?;
        Ok(Self {
            out,
            x,
            x_squared,
            x_cubed,
            constrained: false,
        })
    }

    /// Honest output for `x`.
    pub fn evaluate<F: FieldElement>(x: F) -> F {
        x * x * x + x + F::from(5)
    }

    pub fn internal_variables(&self) -> [Variable; 2] {
        [self.x_squared, self.x_cubed]
    }
}

impl<F: FieldElement> Gadget<F> for CubicGadget {
    fn generate_constraints(
        &mut self,
        builder: &mut ConstraintBuilder<'_, F>,
    ) -> Result<(), CircuitError> {
        if self.constrained {
            return Err(CircuitError::ConstraintsAlreadyGenerated(Self::NAME));
        }
        let five = builder.context().element(5);
        builder.add_constraint(self.x, self.x, self.x_squared, "x * x = x_squared")?;
        builder.add_constraint(self.x_squared, self.x, self.x_cubed, "x_squared * x = x_cubed")?;
        builder.add_constraint(
            LinearCombination::constant(five)
                .plus(self.x_cubed)
                .plus(self.x),
            LinearCombination::constant(F::one()),
            self.out,
            "(x_cubed + x + 5) * 1 = out",
        )?;
        self.constrained = true;
        Ok(())
    }

    fn generate_witness(&self, builder: &mut ConstraintBuilder<'_, F>) -> Result<(), CircuitError> {
        if !self.constrained {
            return Err(CircuitError::ConstraintsNotGenerated(Self::NAME));
        }
        let x = builder.value(self.x)?;
        let x_squared = x * x;
        builder.set_value(self.x_squared, x_squared)?;
        builder.set_value(self.x_cubed, x_squared * x)?;
        Ok(())
    }
}

/// `out = Σ coefficients[i] * x^i`, one multiplication gate per power above
/// one and a final linear constraint.
#[derive(Debug, Clone)]
pub struct PolynomialGadget<F> {
    coefficients: Vec<F>,
    out: Variable,
    x: Variable,
    // x^2, x^3, ..
    powers: Vec<Variable>,
    constrained: bool,
}

impl<F: FieldElement> PolynomialGadget<F> {
    const NAME: &'static str = "polynomial";

    pub fn new(
        builder: &mut ConstraintBuilder<'_, F>,
        coefficients: Vec<F>,
        out: Variable,
        x: Variable,
    ) -> Result<Self, CircuitError> {
        if coefficients.is_empty() {
            return Err(CircuitError::EmptyPolynomial);
        }
        let degree = coefficients.len() - 1;
        let powers = (2..=degree)
            .map(|i| builder.allocate(format!("x^{i}")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            coefficients,
            out,
            x,
            powers,
            constrained: false,
        })
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Horner evaluation.
    pub fn evaluate(&self, x: F) -> F {
        self.coefficients
            .iter()
            .rev()
            .fold(F::zero(), |acc, c| acc * x + *c)
    }

    /// Variable holding `x^i`, `i >= 1`.
    fn power(&self, i: usize) -> Variable {
        if i == 1 {
            self.x
        } else {
            self.powers[i - 2]
        }
    }
}

impl<F: FieldElement> Gadget<F> for PolynomialGadget<F> {
    fn generate_constraints(
        &mut self,
        builder: &mut ConstraintBuilder<'_, F>,
    ) -> Result<(), CircuitError> {
        if self.constrained {
            return Err(CircuitError::ConstraintsAlreadyGenerated(Self::NAME));
        }
        for i in 2..=self.degree() {
            builder.add_constraint(
                self.power(i - 1),
                self.x,
                self.power(i),
                format!("x^{} * x = x^{i}", i - 1),
            )?;
        }
        let sum = self
            .coefficients
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, c)| **c != F::zero())
            .fold(
                LinearCombination::constant(self.coefficients[0]),
                |acc, (i, c)| acc.term(self.power(i), *c),
            );
        builder.add_constraint(
            sum,
            LinearCombination::constant(F::one()),
            self.out,
            "p(x) * 1 = out",
        )?;
        self.constrained = true;
        Ok(())
    }

    fn generate_witness(&self, builder: &mut ConstraintBuilder<'_, F>) -> Result<(), CircuitError> {
        if !self.constrained {
            return Err(CircuitError::ConstraintsNotGenerated(Self::NAME));
        }
        let x = builder.value(self.x)?;
        let mut power = x;
        for var in &self.powers {
            power = power * x;
            builder.set_value(*var, power)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FieldContext;
    use ark_bn254::Fr;
    use proptest::prelude::*;

    fn cubic_board(ctx: &FieldContext<Fr>) -> (ConstraintBuilder<'_, Fr>, CubicGadget, Variable, Variable) {
        let mut pb = ConstraintBuilder::new(ctx);
        let out = pb.allocate("out").unwrap();
        let x = pb.allocate("x").unwrap();
        pb.declare_primary_input_count(1).unwrap();
        let g = CubicGadget::new(&mut pb, out, x).unwrap();
        (pb, g, out, x)
    }

    #[test]
    fn test_cubic_constraints() {
        let ctx = FieldContext::init();
        let (mut pb, mut g, out, x) = cubic_board(&ctx);
        Gadget::<Fr>::generate_constraints(&mut g, &mut pb).unwrap();
        let system = pb.finalize().unwrap();
        assert_eq!(system.num_constraints(), 3);
        assert_eq!(system.num_primary(), 1);
        assert_eq!(system.num_auxiliary(), 3);
        let [x_squared, x_cubed] = g.internal_variables();
        assert_eq!(system.label(x_squared), Some("x_squared"));
        assert_eq!(system.label(x_cubed), Some("x_cubed"));

        pb.set_value(out, Fr::from(35u64)).unwrap();
        pb.set_value(x, Fr::from(3u64)).unwrap();
        g.generate_witness(&mut pb).unwrap();
        assert_eq!(
            pb.auxiliary_input(),
            Ok(vec![Fr::from(3u64), Fr::from(9u64), Fr::from(27u64)])
        );
        assert_eq!(system.is_satisfied(pb.assignment()), Ok(true));

        pb.set_value(out, Fr::from(36u64)).unwrap();
        assert_eq!(system.first_unsatisfied(pb.assignment()), Ok(Some(2)));
    }

    #[test]
    fn test_cubic_twice_rejected() {
        let ctx = FieldContext::init();
        let (mut pb, mut g, _, _) = cubic_board(&ctx);
        Gadget::<Fr>::generate_constraints(&mut g, &mut pb).unwrap();
        assert_eq!(
            Gadget::<Fr>::generate_constraints(&mut g, &mut pb),
            Err(CircuitError::ConstraintsAlreadyGenerated("cubic"))
        );
        assert_eq!(pb.num_constraints(), 3);
    }

    #[test]
    fn test_witness_needs_inputs_and_constraints() {
        let ctx = FieldContext::init();
        let (mut pb, mut g, _, x) = cubic_board(&ctx);
        assert_eq!(
            g.generate_witness(&mut pb),
            Err(CircuitError::ConstraintsNotGenerated("cubic"))
        );
        Gadget::<Fr>::generate_constraints(&mut g, &mut pb).unwrap();
        assert_eq!(
            g.generate_witness(&mut pb),
            Err(CircuitError::Unassigned(x))
        );
    }

    #[test]
    fn test_polynomial_matches_cubic_shape() {
        let ctx = FieldContext::<Fr>::init();
        let mut pb = ConstraintBuilder::new(&ctx);
        let out = pb.allocate("out").unwrap();
        let x = pb.allocate("x").unwrap();
        pb.declare_primary_input_count(1).unwrap();
        let coefficients = [5u64, 1, 0, 1].map(Fr::from).to_vec();
        let mut g = PolynomialGadget::new(&mut pb, coefficients, out, x).unwrap();
        g.generate_constraints(&mut pb).unwrap();
        let system = pb.finalize().unwrap();
        assert_eq!(system.num_constraints(), 3);
        assert_eq!(g.evaluate(Fr::from(3u64)), Fr::from(35u64));

        pb.set_value(x, Fr::from(3u64)).unwrap();
        pb.set_value(out, Fr::from(35u64)).unwrap();
        g.generate_witness(&mut pb).unwrap();
        assert_eq!(system.is_satisfied(pb.assignment()), Ok(true));
    }

    #[test]
    fn test_constant_polynomial() {
        let ctx = FieldContext::<Fr>::init();
        let mut pb = ConstraintBuilder::new(&ctx);
        let out = pb.allocate("out").unwrap();
        let x = pb.allocate("x").unwrap();
        pb.declare_primary_input_count(1).unwrap();
        let mut g = PolynomialGadget::new(&mut pb, vec![Fr::from(7u64)], out, x).unwrap();
        g.generate_constraints(&mut pb).unwrap();
        assert_eq!(pb.num_constraints(), 1);
        assert_eq!(
            PolynomialGadget::<Fr>::new(&mut pb, vec![], out, x).err(),
            Some(CircuitError::EmptyPolynomial)
        );
    }

    proptest! {
        #[test]
        fn witness_is_deterministic(x in any::<u64>()) {
            let ctx = FieldContext::init();
            let (mut pb, mut g, out, xv) = cubic_board(&ctx);
            Gadget::<Fr>::generate_constraints(&mut g, &mut pb).unwrap();
            let system = pb.finalize().unwrap();
            pb.set_value(xv, Fr::from(x)).unwrap();
            pb.set_value(out, CubicGadget::evaluate(Fr::from(x))).unwrap();

            g.generate_witness(&mut pb).unwrap();
            let first = pb.auxiliary_input().unwrap();
            g.generate_witness(&mut pb).unwrap();
            prop_assert_eq!(pb.auxiliary_input().unwrap(), first);
            prop_assert_eq!(system.is_satisfied(pb.assignment()), Ok(true));
        }

        #[test]
        fn polynomial_gadget_satisfies(coeffs in proptest::collection::vec(any::<u64>(), 1..6), x in any::<u64>()) {
            let ctx = FieldContext::<Fr>::init();
            let mut pb = ConstraintBuilder::new(&ctx);
            let out = pb.allocate("out").unwrap();
            let xv = pb.allocate("x").unwrap();
            pb.declare_primary_input_count(1).unwrap();
            let coefficients: Vec<Fr> = coeffs.into_iter().map(Fr::from).collect();
            let mut g = PolynomialGadget::new(&mut pb, coefficients, out, xv).unwrap();
            g.generate_constraints(&mut pb).unwrap();
            let system = pb.finalize().unwrap();
            prop_assert_eq!(system.num_constraints(), g.degree().max(1));

            pb.set_value(xv, Fr::from(x)).unwrap();
            pb.set_value(out, g.evaluate(Fr::from(x))).unwrap();
            g.generate_witness(&mut pb).unwrap();
            prop_assert_eq!(system.is_satisfied(pb.assignment()), Ok(true));
        }
    }
}
