//! Shader Permutation Machinery
//!
//! The define set ([`ShaderDefines`]) is the permutation key; the
//! generator renders the embedded WGSL template against it and the
//! manager deduplicates compiled modules on the source hash.

mod defines;
mod generator;

pub use defines::ShaderDefines;
pub use generator::{OutputSlot, ShaderCompilationOptions, ShaderGenerator, ShaderManager};
