pub(crate) mod buffer;
pub(crate) mod io;

pub use buffer::{BufferId, Image, ImageDesc, MipLevel, PixelFormat};
