//! This module contains the graphics abstractions of the engine: the device
//! seam, combined shader source parsing, and shader program management.

pub mod device;
pub mod error;
pub mod shader;
pub mod source;

pub use device::*;
pub use error::*;
pub use shader::*;
pub use source::*;
