//! Shader Permutation & Pipeline Assembly
//!
//! Derives the permutation key from the registered outputs plus the
//! stage-level overrides, emits the define set that drives the WGSL
//! template, and assembles the one render pipeline of the stage.
//!
//! Two configurations with identical aggregated flags and identical
//! per-location defines render identical WGSL and therefore share a
//! shader module (see [`ShaderManager`](crate::shader::ShaderManager)).

use crate::attachments::PassPlan;
use crate::bindings::DrawImmediates;
use crate::recipe::{BuiltInFeatures, FragmentInputs};
use crate::registry::OutputRegistry;
use crate::shader::{OutputSlot, ShaderCompilationOptions};

/// Name of the embedded WGSL template (vertex + fragment entry points).
pub const SHADER_TEMPLATE: &str = "gbuffer";

/// The aggregated flag sets that select the shader permutation.
///
/// Recomputed on every build from the registry and the stage overrides;
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PermutationKey {
    pub inputs: FragmentInputs,
    pub features: BuiltInFeatures,
}

impl PermutationKey {
    /// Unions the flags of every registered output with the stage-level
    /// override sets. Registration order cannot affect the result.
    #[must_use]
    pub fn aggregate(
        registry: &OutputRegistry,
        stage_inputs: FragmentInputs,
        stage_features: BuiltInFeatures,
    ) -> Self {
        let mut inputs = stage_inputs;
        let mut features = stage_features;

        for output in registry.iter() {
            inputs |= output.recipe().inputs;
            features |= output.recipe().features;
        }

        Self { inputs, features }
    }
}

/// Emits the full define set for a permutation: one define per set flag
/// (lowest bit first), then four per output in location order — presence,
/// type, result expression, and (only when non-empty) the intermediate
/// computation.
#[must_use]
pub fn permutation_options(
    registry: &OutputRegistry,
    key: PermutationKey,
) -> ShaderCompilationOptions {
    let mut options = ShaderCompilationOptions::new();

    for flag in key.inputs.iter() {
        options.add_define(flag.token(), "1");
    }
    for flag in key.features.iter() {
        options.add_define(flag.token(), "1");
    }

    for (location, output) in registry.iter().enumerate() {
        let recipe = output.recipe();
        options.add_define(&format!("OUT_{location}"), "1");
        options.add_define(&format!("OUT_{location}_TYPE"), recipe.ty.wgsl());
        options.add_define(&format!("OUT_{location}_RESULT"), &recipe.result);
        if !recipe.calculation.is_empty() {
            options.add_define(&format!("OUT_{location}_CALC"), &recipe.calculation);
        }

        options.outputs.push(OutputSlot {
            location: location as u32,
            ty: recipe.ty.wgsl().to_owned(),
            result: recipe.result.clone(),
            calculation: (!recipe.calculation.is_empty()).then(|| recipe.calculation.clone()),
        });
    }

    options
}

/// Vertex stride of the fixed interleaved layout:
/// position `vec3f` + normal `vec3f` + tangent `vec4f` + uv `vec2f`.
pub const VERTEX_STRIDE: wgpu::BufferAddress = 48;

/// The four fixed per-vertex attributes, declared regardless of which the
/// active permutation consumes — the generated shader ignores unused ones.
pub const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
    2 => Float32x4,
    3 => Float32x2,
];

/// The stage's fixed vertex buffer layout.
#[must_use]
pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// Creates the pipeline layout: the fixed bind group plus the per-draw
/// immediate range (visible to both stages).
#[must_use]
pub fn create_pipeline_layout(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("GBuffer Pipeline Layout"),
        bind_group_layouts: &[Some(bind_group_layout)],
        immediate_size: DrawImmediates::SIZE,
    })
}

/// Builds the stage's render pipeline against the pass plan.
///
/// A validation failure here is fatal for the build — the stage has no
/// degraded fallback pipeline.
#[must_use]
pub fn create_render_pipeline(
    device: &wgpu::Device,
    cache: Option<&wgpu::PipelineCache>,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    plan: &PassPlan,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("GBuffer Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[vertex_buffer_layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: plan.color_targets(),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            front_face: wgpu::FrontFace::Ccw,
            ..Default::default()
        },
        depth_stencil: Some(PassPlan::depth_stencil_state()),
        multisample: wgpu::MultisampleState {
            count: 1,
            ..Default::default()
        },
        multiview_mask: None,
        cache,
    })
}
