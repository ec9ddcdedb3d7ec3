pub(crate) mod backend;
pub(crate) mod buffer_pool;
pub(crate) mod cpu;
pub(crate) mod preview;

pub use backend::{PassBackend, PassInputs};
pub use buffer_pool::{BufferPair, BufferPool, BufferPoolOpts, BufferPoolStats};
pub use cpu::{CpuBackend, CpuBackendOpts};
pub use preview::render_preview;
