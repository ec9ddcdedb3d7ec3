pub(crate) mod prettifier;

pub use prettifier::{Prettifier, PrettifierOpts, Retrigger};
