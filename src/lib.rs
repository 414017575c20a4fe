//! # cgbuffer
//!
//! A configurable multi-output G-buffer render stage for wgpu.
//!
//! The stage turns a declarative set of named output recipes — "write
//! `vec4f(world_pos, 1.0)` into an `Rgba16Float` image", "write the
//! normal-mapped shading normal", … — into one coherent render pass:
//! it derives the attachment layout, the fixed resource bindings, the
//! shader permutation (a WGSL template specialized by generated defines),
//! and the render pipeline, then replays the pass each frame and
//! publishes its outputs to a shared target-state map for downstream
//! stages.
//!
//! See [`GBufferStage`] for the entry point and [`OutputRecipe`] for the
//! channel description language.

pub mod attachments;
pub mod bindings;
pub mod context;
pub mod errors;
pub mod pipeline;
pub mod recipe;
pub mod registry;
pub mod shader;
pub mod stage;
pub mod target_states;
pub mod targets;

pub use attachments::{DEPTH_CLEAR, PassPlan};
pub use bindings::{CameraUniform, DrawImmediates, SceneBindings};
pub use context::GpuContext;
pub use errors::{GBufferError, Result};
pub use pipeline::PermutationKey;
pub use recipe::{BuiltInFeatures, FragmentInputs, OutputRecipe, OutputType};
pub use registry::{MAX_OUTPUT_COUNT, Output, OutputRegistry};
pub use shader::{ShaderCompilationOptions, ShaderDefines, ShaderGenerator, ShaderManager};
pub use stage::{FrameContext, GBufferStage};
pub use target_states::{TargetState, TargetStates};
pub use targets::{ColorTarget, DEPTH_FORMAT, DepthTarget, Tracked};
