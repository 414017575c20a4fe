//! Resource-Binding Setup
//!
//! The stage uses one fixed bind group, independent of which outputs are
//! registered — the shader permutation changes what the pipeline *reads*,
//! never the binding layout:
//!
//! | Binding | Resource                          | Stage    |
//! |---------|-----------------------------------|----------|
//! | 0       | material data (storage, ro)       | fragment |
//! | 1       | bindless texture array            | fragment |
//! | 2       | camera uniform                    | vertex   |
//! | 3       | current-frame transforms (ro)     | vertex   |
//! | 4       | previous-frame transforms (ro)    | vertex   |
//! | 5       | shared sampler                    | fragment |
//!
//! Binding 5 exists because WGSL has no combined image-sampler: the
//! bindless array samples through one shared filtering sampler.
//!
//! Per-draw data travels as immediate data reserved on the pipeline layout
//! ([`DrawImmediates`]); the scene's draw dispatch writes it before each
//! draw. The stage itself never touches it.

use std::num::NonZeroU32;

use glam::Mat4;

/// Source of the scene-owned resources the fixed bind group reads, plus
/// the draw dispatch itself.
///
/// All resources are read-only from the stage's perspective; the stage
/// declares the read usage by binding them, and wgpu derives visibility.
pub trait SceneBindings {
    /// Material parameter buffer (binding 0).
    fn material_buffer(&self) -> wgpu::BindingResource<'_>;

    /// Bindless texture array (binding 1). Must yield exactly
    /// [`texture_count`](Self::texture_count) views.
    fn texture_array(&self) -> wgpu::BindingResource<'_>;

    /// Number of entries in the bindless texture array.
    fn texture_count(&self) -> NonZeroU32;

    /// Camera uniform buffer (binding 2); layout = [`CameraUniform`].
    fn camera_buffer(&self) -> wgpu::BindingResource<'_>;

    /// Current-frame object transforms (binding 3).
    fn current_transforms(&self) -> wgpu::BindingResource<'_>;

    /// Previous-frame object transforms (binding 4), for motion and
    /// reprojection outputs.
    fn previous_transforms(&self) -> wgpu::BindingResource<'_>;

    /// Shared filtering sampler for the texture array (binding 5).
    fn sampler(&self) -> wgpu::BindingResource<'_>;

    /// Issues the geometry draws for this pass. The pipeline and bind
    /// group are already set; the scene writes [`DrawImmediates`] through
    /// the reserved immediate range and submits its draw calls.
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, pipeline_layout: &wgpu::PipelineLayout);
}

/// Camera uniform layout expected at binding 2.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Current view-projection matrix.
    pub view_proj: Mat4,
    /// Previous frame's view-projection matrix, consumed by outputs that
    /// request previous device positions.
    pub view_proj_prev: Mat4,
}

impl CameraUniform {
    #[must_use]
    pub fn new(view_proj: Mat4, view_proj_prev: Mat4) -> Self {
        Self {
            view_proj,
            view_proj_prev,
        }
    }
}

/// Per-draw immediate data written by the scene's draw dispatch.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawImmediates {
    /// Base index into the transform buffers for this draw.
    pub transform_offset: u32,
    /// Index into the material buffer.
    pub material_index: u32,
    /// Mesh id, forwarded to outputs that request it.
    pub mesh_id: u32,
    pub _pad: u32,
}

impl DrawImmediates {
    /// Size of the reserved immediate range, in bytes.
    pub const SIZE: u32 = size_of::<Self>() as u32;
}

/// The fixed bind group layout entries. Pure data; independent of the
/// registered outputs except for the bindless array length.
#[must_use]
pub fn bind_group_layout_entries(texture_count: NonZeroU32) -> [wgpu::BindGroupLayoutEntry; 6] {
    let read_only_storage = wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Storage { read_only: true },
        has_dynamic_offset: false,
        min_binding_size: None,
    };

    [
        // Binding 0: material data
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: read_only_storage,
            count: None,
        },
        // Binding 1: bindless texture array
        wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: Some(texture_count),
        },
        // Binding 2: camera uniform
        wgpu::BindGroupLayoutEntry {
            binding: 2,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        },
        // Binding 3: current-frame transforms
        wgpu::BindGroupLayoutEntry {
            binding: 3,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: read_only_storage,
            count: None,
        },
        // Binding 4: previous-frame transforms
        wgpu::BindGroupLayoutEntry {
            binding: 4,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: read_only_storage,
            count: None,
        },
        // Binding 5: shared sampler
        wgpu::BindGroupLayoutEntry {
            binding: 5,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ]
}

/// Creates the fixed bind group layout.
#[must_use]
pub fn create_bind_group_layout(
    device: &wgpu::Device,
    texture_count: NonZeroU32,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("GBuffer Bind Group Layout"),
        entries: &bind_group_layout_entries(texture_count),
    })
}

/// Creates the fixed bind group from the scene's resources.
#[must_use]
pub fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    scene: &dyn SceneBindings,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("GBuffer Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: scene.material_buffer(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: scene.texture_array(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: scene.camera_buffer(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: scene.current_transforms(),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: scene.previous_transforms(),
            },
            wgpu::BindGroupEntry {
                binding: 5,
                resource: scene.sampler(),
            },
        ],
    })
}
