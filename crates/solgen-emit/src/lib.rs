//! C8: the direct sol2 binding emitter. Turns one module's validated
//! `ExportRecord`s into the text of a single generated `.cpp` file.

pub mod emitter;
pub mod sol2;

pub use emitter::{EmitError, Emitter, EmitterConfig};
