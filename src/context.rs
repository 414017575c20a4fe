//! Device Context
//!
//! The narrow contract the stage consumes from its host: a device, a
//! queue, the current target resolution, and an optional shared pipeline
//! cache. Adapter selection, surface management and feature negotiation
//! happen in the host application.

/// Device-side collaborators handed to the stage at build time.
pub struct GpuContext {
    /// The wgpu device for resource creation.
    pub device: wgpu::Device,
    /// The command queue for submitting work.
    pub queue: wgpu::Queue,
    /// Current target resolution in pixels.
    pub resolution: (u32, u32),
    /// Shared pipeline cache, if the host maintains one.
    pub pipeline_cache: Option<wgpu::PipelineCache>,
}

impl GpuContext {
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, resolution: (u32, u32)) -> Self {
        Self {
            device,
            queue,
            resolution,
            pipeline_cache: None,
        }
    }

    /// Device features the host must enable for the stage's bindless
    /// texture array.
    #[must_use]
    pub fn required_features() -> wgpu::Features {
        wgpu::Features::TEXTURE_BINDING_ARRAY
    }
}
