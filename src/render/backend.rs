use crate::{
    foundation::error::PrettifierResult,
    pipeline::{params::PassParams, passes::PassKind},
    raster::Image,
};

/// Read-only images bound to one pass invocation.
#[derive(Clone, Copy, Debug)]
pub struct PassInputs<'a> {
    /// Latest result of the pipeline (the `current` buffer).
    pub source: &'a Image,
    /// Auxiliary height data for passes that shade color from terrain shape.
    pub heightmap: Option<&'a Image>,
}

/// Executes the pixel transform of a pass.
///
/// Implementations write every sample of `target` from `inputs`; they never see the buffer pair
/// and cannot alias source and target.
pub trait PassBackend {
    fn execute(
        &mut self,
        kind: PassKind,
        params: &PassParams,
        inputs: PassInputs<'_>,
        target: &mut Image,
    ) -> PrettifierResult<()>;
}

impl<B: PassBackend + ?Sized> PassBackend for &mut B {
    fn execute(
        &mut self,
        kind: PassKind,
        params: &PassParams,
        inputs: PassInputs<'_>,
        target: &mut Image,
    ) -> PrettifierResult<()> {
        (**self).execute(kind, params, inputs, target)
    }
}

impl<B: PassBackend + ?Sized> PassBackend for Box<B> {
    fn execute(
        &mut self,
        kind: PassKind,
        params: &PassParams,
        inputs: PassInputs<'_>,
        target: &mut Image,
    ) -> PrettifierResult<()> {
        (**self).execute(kind, params, inputs, target)
    }
}
