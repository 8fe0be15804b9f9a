use core::marker::PhantomData;

use tracing::debug;

use crate::scalar::{from_i64, render, FieldElement};

/// Field parameters for one run.
///
/// Created once at startup and handed by reference to the constraint builder
/// and the orchestrator. The engines keep no process-wide state, so holding
/// this value is the only initialisation step.
#[derive(Debug)]
pub struct FieldContext<F: FieldElement> {
    _field: PhantomData<F>,
}

impl<F: FieldElement> FieldContext<F> {
    pub fn init() -> Self {
        debug!(field = F::NAME, "field parameters initialized");
        Self {
            _field: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        F::NAME
    }

    /// Embeds a signed integer constant into the field.
    pub fn element(&self, value: i64) -> F {
        from_i64(value)
    }

    pub fn render(&self, value: &F) -> String {
        render(value)
    }

    pub fn render_all(&self, values: &[F]) -> Vec<String> {
        values.iter().map(render).collect()
    }
}
