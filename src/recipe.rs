//! Output Recipe Model
//!
//! An [`OutputRecipe`] declares everything the stage needs to know about a
//! single G-buffer channel: which fragment-interface values its expression
//! reads, which built-in shader features it relies on, the WGSL type it
//! writes, the texture format backing it, its per-frame clear color, and
//! the WGSL text of the value itself.
//!
//! Recipes are plain values. They are copied into the stage at registration
//! time, so every `enable_built_in_feature` call that should affect an
//! output must happen before that output is registered.
//!
//! # Fragment interface names
//!
//! A recipe's `result` / `calculation` text is spliced into the generated
//! fragment shader, where each requested input is bound to a local of the
//! same spelling as its flag:
//!
//! | Flag               | WGSL local        | Type    |
//! |--------------------|-------------------|---------|
//! | `WORLD_POS`        | `world_pos`       | `vec3f` |
//! | `WORLD_POS_PREV`   | `world_pos_prev`  | `vec3f` |
//! | `DEVICE_POS`       | `device_pos`      | `vec4f` |
//! | `DEVICE_POS_PREV`  | `device_pos_prev` | `vec4f` |
//! | `NORMAL`           | `normal`          | `vec3f` |
//! | `TANGENT`          | `tangent`         | `vec4f` |
//! | `UV`               | `uv`              | `vec2f` |
//! | `MESH_ID`          | `mesh_id`         | `u32`   |
//!
//! Built-in features additionally provide `probe_color` (`vec4f`, material
//! probe) and `shading_normal` (`vec3f`, normal mapping).

use bitflags::bitflags;

bitflags! {
    /// Fragment-interface requirements of an output expression.
    ///
    /// Union-combinable; order-irrelevant. Each flag corresponds to one
    /// value the generated vertex stage must produce and the fragment
    /// stage must receive.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FragmentInputs: u32 {
        const WORLD_POS       = 0x01;
        const WORLD_POS_PREV  = 0x02;
        const DEVICE_POS      = 0x04;
        const DEVICE_POS_PREV = 0x08;
        const NORMAL          = 0x10;
        const TANGENT         = 0x20;
        const UV              = 0x40;
        const MESH_ID         = 0x80;
    }
}

bitflags! {
    /// Built-in fragment-shader computations an output can enable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BuiltInFeatures: u32 {
        /// Sample the material's base color into `probe_color`.
        const MATERIAL_PROBE       = 0x01;
        /// Like `MATERIAL_PROBE`, but keeps the sampled alpha channel.
        const MATERIAL_PROBE_ALPHA = 0x02;
        /// Discard fragments whose probed alpha is below the material cutoff.
        const ALPHA_TEST           = 0x04;
        /// Perturb the interpolated normal by the material's normal map
        /// into `shading_normal`.
        const NORMAL_MAPPING       = 0x08;
    }
}

impl FragmentInputs {
    /// Canonical token table: one define name per flag, in bit order.
    const TOKENS: [(FragmentInputs, &'static str); 8] = [
        (FragmentInputs::WORLD_POS, "INTERFACE_WORLDPOS"),
        (FragmentInputs::WORLD_POS_PREV, "INTERFACE_WORLDPOSOLD"),
        (FragmentInputs::DEVICE_POS, "INTERFACE_DEVICEPOS"),
        (FragmentInputs::DEVICE_POS_PREV, "INTERFACE_DEVICEPOSOLD"),
        (FragmentInputs::NORMAL, "INTERFACE_NORMAL"),
        (FragmentInputs::TANGENT, "INTERFACE_TANGENT"),
        (FragmentInputs::UV, "INTERFACE_UV"),
        (FragmentInputs::MESH_ID, "INTERFACE_MESHID"),
    ];

    /// The shader define name for a single flag.
    ///
    /// # Panics
    ///
    /// Panics when called on anything but exactly one defined flag — such a
    /// value is a programming error, not a recoverable condition.
    #[must_use]
    pub fn token(self) -> &'static str {
        Self::TOKENS
            .iter()
            .find(|(flag, _)| *flag == self)
            .map(|(_, token)| *token)
            .unwrap_or_else(|| panic!("no canonical token for fragment input {self:?}"))
    }
}

impl BuiltInFeatures {
    /// Canonical token table: one define name per flag, in bit order.
    const TOKENS: [(BuiltInFeatures, &'static str); 4] = [
        (BuiltInFeatures::MATERIAL_PROBE, "MATERIALPROBE"),
        (BuiltInFeatures::MATERIAL_PROBE_ALPHA, "MATERIALPROBEALPHA"),
        (BuiltInFeatures::ALPHA_TEST, "ALPHATEST"),
        (BuiltInFeatures::NORMAL_MAPPING, "NORMALMAPPING"),
    ];

    /// The shader define name for a single flag.
    ///
    /// # Panics
    ///
    /// Panics when called on anything but exactly one defined flag.
    #[must_use]
    pub fn token(self) -> &'static str {
        Self::TOKENS
            .iter()
            .find(|(flag, _)| *flag == self)
            .map(|(_, token)| *token)
            .unwrap_or_else(|| panic!("no canonical token for built-in feature {self:?}"))
    }

    /// Fragment inputs a feature set depends on.
    ///
    /// The closure is a fixed table: every material probe variant and the
    /// alpha test need `UV`; normal mapping needs `UV`, `NORMAL` and
    /// `TANGENT`. Composes over multi-flag sets by union.
    #[must_use]
    pub fn required_inputs(self) -> FragmentInputs {
        let mut required = FragmentInputs::empty();
        if self.intersects(
            Self::MATERIAL_PROBE | Self::MATERIAL_PROBE_ALPHA | Self::ALPHA_TEST,
        ) {
            required |= FragmentInputs::UV;
        }
        if self.contains(Self::NORMAL_MAPPING) {
            required |= FragmentInputs::UV | FragmentInputs::NORMAL | FragmentInputs::TANGENT;
        }
        required
    }
}

/// Scalar or vector type of the value a channel writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputType {
    #[default]
    Float,
    Int,
    Uint,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    IVec4,
    UVec2,
    UVec3,
    UVec4,
}

impl OutputType {
    /// The WGSL spelling of this type. Total over all variants.
    #[must_use]
    pub fn wgsl(self) -> &'static str {
        match self {
            OutputType::Float => "f32",
            OutputType::Int => "i32",
            OutputType::Uint => "u32",
            OutputType::Vec2 => "vec2f",
            OutputType::Vec3 => "vec3f",
            OutputType::Vec4 => "vec4f",
            OutputType::IVec2 => "vec2i",
            OutputType::IVec3 => "vec3i",
            OutputType::IVec4 => "vec4i",
            OutputType::UVec2 => "vec2u",
            OutputType::UVec3 => "vec3u",
            OutputType::UVec4 => "vec4u",
        }
    }
}

/// Declarative description of one G-buffer output channel.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecipe {
    /// Fragment-interface values the `result` / `calculation` text reads.
    pub inputs: FragmentInputs,
    /// Built-in shader computations this channel enables.
    pub features: BuiltInFeatures,
    /// WGSL type of the written value.
    pub ty: OutputType,
    /// Pixel storage format of the backing image.
    pub format: wgpu::TextureFormat,
    /// Color the channel is cleared to each frame.
    pub clear_value: wgpu::Color,
    /// WGSL expression producing the final written value.
    pub result: String,
    /// Optional WGSL statements computing intermediates available to
    /// `result`. Empty string = none.
    pub calculation: String,
}

impl Default for OutputRecipe {
    fn default() -> Self {
        Self {
            inputs: FragmentInputs::empty(),
            features: BuiltInFeatures::empty(),
            ty: OutputType::Float,
            format: wgpu::TextureFormat::R32Float,
            clear_value: wgpu::Color::TRANSPARENT,
            result: String::from("0"),
            calculation: String::new(),
        }
    }
}

impl OutputRecipe {
    /// A recipe of the given type and backing format, writing `0`.
    #[must_use]
    pub fn new(ty: OutputType, format: wgpu::TextureFormat) -> Self {
        Self {
            ty,
            format,
            ..Self::default()
        }
    }

    /// Unions one fragment input into the recipe. Chainable.
    #[must_use]
    pub fn add_fragment_input(mut self, input: FragmentInputs) -> Self {
        self.inputs |= input;
        self
    }

    /// Enables a built-in feature and the fragment inputs it depends on.
    ///
    /// The feature→input closure is applied on every call and is
    /// idempotent: enabling the same feature twice yields the same sets as
    /// enabling it once. Chainable.
    #[must_use]
    pub fn enable_built_in_feature(mut self, feature: BuiltInFeatures) -> Self {
        self.features |= feature;
        self.inputs |= feature.required_inputs();
        self
    }

    /// Sets the WGSL result expression. Chainable.
    #[must_use]
    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = result.into();
        self
    }

    /// Sets the WGSL intermediate computation. Chainable.
    #[must_use]
    pub fn with_calculation(mut self, calculation: impl Into<String>) -> Self {
        self.calculation = calculation.into();
        self
    }

    /// Sets the per-frame clear color. Chainable.
    #[must_use]
    pub fn with_clear_value(mut self, clear_value: wgpu::Color) -> Self {
        self.clear_value = clear_value;
        self
    }

    // ── Classic channel presets ──────────────────────────────────────────
    //
    // Ready-made recipes for the conventional deferred layout, so callers
    // can assemble a standard G-buffer without hand-writing WGSL.

    /// World-space position, `w = 1`.
    #[must_use]
    pub fn world_position() -> Self {
        Self::new(OutputType::Vec4, wgpu::TextureFormat::Rgba16Float)
            .add_fragment_input(FragmentInputs::WORLD_POS)
            .with_result("vec4f(world_pos, 1.0)")
    }

    /// Normal-mapped shading normal, `w = 1`.
    #[must_use]
    pub fn normals() -> Self {
        Self::new(OutputType::Vec4, wgpu::TextureFormat::Rgba16Float)
            .enable_built_in_feature(BuiltInFeatures::NORMAL_MAPPING)
            .with_result("vec4f(shading_normal, 1.0)")
    }

    /// Material base color with alpha test applied.
    #[must_use]
    pub fn albedo() -> Self {
        Self::new(OutputType::Vec4, wgpu::TextureFormat::Rgba8Unorm)
            .enable_built_in_feature(BuiltInFeatures::MATERIAL_PROBE)
            .enable_built_in_feature(BuiltInFeatures::ALPHA_TEST)
            .with_result("probe_color")
    }

    /// Screen-space motion vector (current NDC minus previous NDC).
    #[must_use]
    pub fn motion_vectors() -> Self {
        Self::new(OutputType::Vec2, wgpu::TextureFormat::Rg16Float)
            .add_fragment_input(FragmentInputs::DEVICE_POS)
            .add_fragment_input(FragmentInputs::DEVICE_POS_PREV)
            .with_calculation(
                "let ndc = device_pos.xy / device_pos.w;\n    \
                 let ndc_prev = device_pos_prev.xy / device_pos_prev.w;",
            )
            .with_result("ndc - ndc_prev")
    }

    /// Mesh id of the drawn geometry.
    #[must_use]
    pub fn mesh_id() -> Self {
        Self::new(OutputType::Uint, wgpu::TextureFormat::R32Uint)
            .add_fragment_input(FragmentInputs::MESH_ID)
            .with_result("mesh_id")
    }
}
