//! The G-Buffer Stage
//!
//! Ties the pieces together: configuration (outputs + stage-level feature
//! overrides) accumulates on the stage, `build` derives every GPU-side
//! resource from it, `record_frame` replays the single pass each frame,
//! `resize` swaps the resolution-dependent images underneath the
//! unchanged pipeline, and `destroy` drops everything GPU-side while
//! keeping the configuration for a later rebuild.
//!
//! ```rust,ignore
//! use cgbuffer::{GBufferStage, OutputRecipe};
//!
//! let mut stage = GBufferStage::new();
//! stage
//!     .add_output("position", OutputRecipe::world_position())?
//!     .add_output("normal", OutputRecipe::normals())?
//!     .add_output("albedo", OutputRecipe::albedo())?;
//! stage.build(&ctx, &scene, &mut shaders)?;
//!
//! // per frame:
//! stage.record_frame(&mut encoder, &mut frame)?;
//! ```

use crate::attachments::PassPlan;
use crate::bindings::{self, SceneBindings};
use crate::context::GpuContext;
use crate::errors::{GBufferError, Result};
use crate::pipeline::{self, PermutationKey, SHADER_TEMPLATE};
use crate::recipe::{BuiltInFeatures, FragmentInputs, OutputRecipe};
use crate::registry::OutputRegistry;
use crate::shader::ShaderManager;
use crate::target_states::{TargetState, TargetStates};
use crate::targets::{ColorTarget, DepthTarget};

/// Per-frame collaborators handed to [`GBufferStage::record_frame`].
pub struct FrameContext<'a> {
    /// Scene draw dispatch and resource source.
    pub scene: &'a dyn SceneBindings,
    /// Shared per-frame target-state map; the stage publishes its outputs
    /// here after the pass.
    pub target_states: &'a mut TargetStates,
}

/// GPU-side state derived by `build`; dropped as one unit on `destroy`.
#[derive(Debug)]
struct GpuState {
    plan: PassPlan,
    bind_group: wgpu::BindGroup,
    pipeline_layout: wgpu::PipelineLayout,
    pipeline: wgpu::RenderPipeline,
    shader_key: u128,
}

/// Configurable multi-output G-buffer render stage.
#[derive(Default, Debug)]
pub struct GBufferStage {
    registry: OutputRegistry,
    stage_inputs: FragmentInputs,
    stage_features: BuiltInFeatures,
    extent: (u32, u32),
    depth: Option<DepthTarget>,
    gpu: Option<GpuState>,
}

impl GBufferStage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Configuration ────────────────────────────────────────────────────

    /// Registers a new output under a unique name, copying the recipe.
    /// Chainable. Fails without side effects at the output ceiling or on a
    /// duplicate name.
    pub fn add_output(&mut self, name: &str, recipe: OutputRecipe) -> Result<&mut Self> {
        self.registry.insert(name, recipe)?;
        Ok(self)
    }

    /// Enables a built-in feature for the whole stage, regardless of which
    /// outputs request it. The feature→input closure applies here exactly
    /// as it does on recipes, so the aggregated permutation always carries
    /// the inputs its features need. Chainable.
    pub fn enable_built_in_feature(&mut self, feature: BuiltInFeatures) -> &mut Self {
        self.stage_features |= feature;
        self.stage_inputs |= feature.required_inputs();
        self
    }

    /// The recipe a named output was registered with.
    pub fn output_recipe(&self, name: &str) -> Result<&OutputRecipe> {
        self.registry.recipe(name)
    }

    /// The backing image of a named output, for downstream present/copy
    /// stages. Available between `build` and `destroy`.
    pub fn output_image(&self, name: &str) -> Result<&ColorTarget> {
        self.registry
            .get(name)?
            .target()
            .ok_or(GBufferError::NotBuilt)
    }

    /// The stage's depth image, once built.
    #[must_use]
    pub fn depth_image(&self) -> Option<&DepthTarget> {
        self.depth.as_ref()
    }

    #[must_use]
    pub fn output_count(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn is_built(&self) -> bool {
        self.gpu.is_some()
    }

    /// The aggregated permutation key for the current configuration.
    #[must_use]
    pub fn permutation_key(&self) -> PermutationKey {
        PermutationKey::aggregate(&self.registry, self.stage_inputs, self.stage_features)
    }

    /// Cache key of the built shader permutation, once built.
    #[must_use]
    pub fn shader_key(&self) -> Option<u128> {
        self.gpu.as_ref().map(|gpu| gpu.shader_key)
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Derives all GPU-side resources from the current configuration:
    /// images, pass plan, bind group, and the specialized pipeline.
    ///
    /// Rebuilding is allowed; any previously built state is destroyed
    /// first. A device-side validation failure is fatal — the stage never
    /// holds a partially built pipeline.
    pub fn build(
        &mut self,
        ctx: &GpuContext,
        scene: &dyn SceneBindings,
        shaders: &mut ShaderManager,
    ) -> Result<()> {
        self.destroy();
        self.extent = ctx.resolution;

        if self.registry.is_empty() {
            log::warn!("no outputs registered; the stage will render depth only");
        }

        self.create_targets(&ctx.device);

        let plan = PassPlan::from_registry(&self.registry);
        let bind_group_layout =
            bindings::create_bind_group_layout(&ctx.device, scene.texture_count());
        let bind_group = bindings::create_bind_group(&ctx.device, &bind_group_layout, scene);
        let pipeline_layout = pipeline::create_pipeline_layout(&ctx.device, &bind_group_layout);

        let key = self.permutation_key();
        let options = pipeline::permutation_options(&self.registry, key);
        let (module, shader_key) = shaders.get_or_compile(&ctx.device, SHADER_TEMPLATE, &options);

        let render_pipeline = pipeline::create_render_pipeline(
            &ctx.device,
            ctx.pipeline_cache.as_ref(),
            &pipeline_layout,
            module,
            &plan,
        );

        log::info!(
            "built G-buffer stage: {} outputs at {}x{}, permutation {:?}",
            self.registry.len(),
            self.extent.0,
            self.extent.1,
            key
        );

        self.gpu = Some(GpuState {
            plan,
            bind_group,
            pipeline_layout,
            pipeline: render_pipeline,
            shader_key,
        });
        Ok(())
    }

    /// Recreates the resolution-dependent resources — output images and
    /// the depth image — at the new extent. The pass plan, bind group and
    /// pipeline are format-dependent only and survive untouched.
    pub fn resize(&mut self, ctx: &GpuContext, extent: (u32, u32)) -> Result<()> {
        if self.gpu.is_none() {
            return Err(GBufferError::NotBuilt);
        }
        if extent.0 == 0 || extent.1 == 0 {
            log::debug!("ignoring resize to zero extent");
            return Ok(());
        }
        if extent == self.extent {
            return Ok(());
        }

        self.extent = extent;
        self.create_targets(&ctx.device);
        log::debug!("resized G-buffer targets to {}x{}", extent.0, extent.1);
        Ok(())
    }

    /// Records the stage's single pass into the encoder.
    ///
    /// Clears every output to its recipe's clear value and depth to 1.0,
    /// sets the full-resolution viewport and scissor, binds the pipeline
    /// and the fixed bind group, delegates draws to the scene, and
    /// publishes the written targets to the shared state map.
    pub fn record_frame(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        frame: &mut FrameContext<'_>,
    ) -> Result<()> {
        let gpu = self.gpu.as_ref().ok_or(GBufferError::NotBuilt)?;
        let depth = self.depth.as_ref().ok_or(GBufferError::NotBuilt)?;

        let color_attachments = gpu.plan.color_attachments(&self.registry);

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("G-Buffer Pass"),
                color_attachments: &color_attachments,
                depth_stencil_attachment: Some(PassPlan::depth_attachment(depth)),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_viewport(
                0.0,
                0.0,
                self.extent.0 as f32,
                self.extent.1 as f32,
                0.0,
                1.0,
            );
            pass.set_scissor_rect(0, 0, self.extent.0, self.extent.1);

            pass.set_pipeline(&gpu.pipeline);
            pass.set_bind_group(0, &gpu.bind_group, &[]);

            frame.scene.draw(&mut pass, &gpu.pipeline_layout);
        }

        // The stage determines its outputs' states for the rest of the frame.
        for output in self.registry.iter() {
            if let Some(target) = output.target() {
                frame
                    .target_states
                    .set(target.id(), TargetState::ColorAttachment);
            }
        }
        frame
            .target_states
            .set(depth.id(), TargetState::DepthAttachment);

        Ok(())
    }

    /// Releases all GPU-side resources. Safe to call repeatedly and before
    /// anything was built; the configuration (outputs, overrides) is kept
    /// so the stage can be rebuilt.
    pub fn destroy(&mut self) {
        if self.gpu.is_none() && self.depth.is_none() {
            return;
        }

        self.gpu = None;
        self.depth = None;
        for output in self.registry.iter_mut() {
            output.set_target(None);
        }
        log::debug!("destroyed G-buffer stage resources");
    }

    fn create_targets(&mut self, device: &wgpu::Device) {
        for output in self.registry.iter_mut() {
            let format = output.recipe().format;
            let label = format!("GBuffer.{}", output.name());
            output.set_target(Some(ColorTarget::create(
                device,
                &label,
                format,
                self.extent,
            )));
        }
        self.depth = Some(DepthTarget::create(device, self.extent));
    }
}
