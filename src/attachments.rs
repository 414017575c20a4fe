//! Attachment / Pass Plan
//!
//! The resolution-independent description of the stage's single render
//! pass: one color target state per output at consecutive locations
//! `0..N-1`, the fixed depth-stencil state, and the per-location clear
//! values. Built once per configuration from the registry's stable order
//! and reused across resizes — only the backing images change with
//! resolution.
//!
//! Attachment load/store behavior is fixed: prior contents are discarded
//! and cleared at pass begin (`LoadOp::Clear`), results are kept at pass
//! end (`StoreOp::Store`). Execution/memory dependencies at the pass
//! boundaries are derived by wgpu from these usages.

use crate::registry::OutputRegistry;
use crate::targets::{DEPTH_FORMAT, DepthTarget};

/// Depth clear value used every frame.
pub const DEPTH_CLEAR: f32 = 1.0;

/// Resolution-independent render pass description.
#[derive(Debug, Clone)]
pub struct PassPlan {
    color_targets: Vec<Option<wgpu::ColorTargetState>>,
    clear_values: Vec<wgpu::Color>,
}

impl PassPlan {
    /// Derives the plan from the registry's attachment-location order.
    #[must_use]
    pub fn from_registry(registry: &OutputRegistry) -> Self {
        let mut color_targets = Vec::with_capacity(registry.len());
        let mut clear_values = Vec::with_capacity(registry.len());

        for output in registry.iter() {
            let recipe = output.recipe();
            color_targets.push(Some(wgpu::ColorTargetState {
                format: recipe.format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            }));
            clear_values.push(recipe.clear_value);
        }

        Self {
            color_targets,
            clear_values,
        }
    }

    /// Color target states at locations `0..N-1`, for pipeline creation.
    #[inline]
    #[must_use]
    pub fn color_targets(&self) -> &[Option<wgpu::ColorTargetState>] {
        &self.color_targets
    }

    /// Per-location clear values, same order as `color_targets`.
    #[inline]
    #[must_use]
    pub fn clear_values(&self) -> &[wgpu::Color] {
        &self.clear_values
    }

    #[inline]
    #[must_use]
    pub fn color_count(&self) -> usize {
        self.color_targets.len()
    }

    /// The fixed depth state: write-enabled, compare `Less` to match the
    /// 1.0 depth clear.
    #[must_use]
    pub fn depth_stencil_state() -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: Some(true),
            depth_compare: Some(wgpu::CompareFunction::Less),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    /// Pairs the plan's clear values with the built output images into the
    /// per-frame color attachment array.
    ///
    /// # Panics
    ///
    /// Panics when the registry's images have not been created; the stage
    /// only calls this after a successful `build`.
    #[must_use]
    pub fn color_attachments<'a>(
        &self,
        registry: &'a OutputRegistry,
    ) -> Vec<Option<wgpu::RenderPassColorAttachment<'a>>> {
        debug_assert_eq!(
            registry.len(),
            self.clear_values.len(),
            "registry changed since the plan was built"
        );
        registry
            .iter()
            .zip(self.clear_values.iter())
            .map(|(output, &clear)| {
                let target = output
                    .target()
                    .expect("output images are created before recording");
                Some(wgpu::RenderPassColorAttachment {
                    view: target.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })
            })
            .collect()
    }

    /// The per-frame depth attachment: clear to [`DEPTH_CLEAR`], keep the
    /// result for downstream consumers.
    #[must_use]
    pub fn depth_attachment(depth: &DepthTarget) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: depth.view(),
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(DEPTH_CLEAR),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }
    }
}
