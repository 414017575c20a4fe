//! Stage Configuration Tests
//!
//! Covers the CPU-side contract of the G-buffer stage: registration
//! limits, recipe round-trips, permutation aggregation, and lifecycle
//! behavior that does not require a GPU device.

use cgbuffer::{
    BuiltInFeatures, FragmentInputs, GBufferError, GBufferStage, MAX_OUTPUT_COUNT, OutputRecipe,
    OutputRegistry, OutputType, PassPlan, PermutationKey,
};

fn vec4_recipe() -> OutputRecipe {
    OutputRecipe::new(OutputType::Vec4, wgpu::TextureFormat::Rgba16Float)
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn output_ceiling_is_enforced_without_mutation() {
    let mut stage = GBufferStage::new();
    for i in 0..MAX_OUTPUT_COUNT {
        stage.add_output(&format!("out{i}"), vec4_recipe()).unwrap();
    }

    let err = stage.add_output("overflow", vec4_recipe()).unwrap_err();
    assert!(matches!(err, GBufferError::TooManyOutputs { .. }));
    assert_eq!(stage.output_count(), MAX_OUTPUT_COUNT);
    assert!(matches!(
        stage.output_recipe("overflow"),
        Err(GBufferError::OutputNotFound(_))
    ));
}

#[test]
fn duplicate_names_are_rejected() {
    let mut stage = GBufferStage::new();
    stage.add_output("albedo", OutputRecipe::albedo()).unwrap();

    let err = stage
        .add_output("albedo", OutputRecipe::normals())
        .unwrap_err();
    assert!(matches!(err, GBufferError::DuplicateOutput(_)));

    // The original registration is untouched.
    let kept = stage.output_recipe("albedo").unwrap();
    assert_eq!(kept, &OutputRecipe::albedo());
}

#[test]
fn recipes_round_trip_field_by_field() {
    let mut stage = GBufferStage::new();
    let recipe = OutputRecipe::new(OutputType::UVec2, wgpu::TextureFormat::Rg32Uint)
        .add_fragment_input(FragmentInputs::MESH_ID)
        .with_calculation("let packed = vec2u(mesh_id, 0u);")
        .with_result("packed")
        .with_clear_value(wgpu::Color::BLACK);
    stage.add_output("ids", recipe.clone()).unwrap();

    assert_eq!(stage.output_recipe("ids").unwrap(), &recipe);
}

// ============================================================================
// Permutation aggregation
// ============================================================================

#[test]
fn two_output_aggregation() {
    // Outputs "A" (vec4, nothing) and "B" (vec4, normal mapping) must
    // aggregate to inputs {UV, NORMAL, TANGENT} and features
    // {NORMAL_MAPPING}, with a two-color-plus-depth pass.
    let mut stage = GBufferStage::new();
    stage.add_output("A", vec4_recipe()).unwrap();
    stage
        .add_output(
            "B",
            vec4_recipe().enable_built_in_feature(BuiltInFeatures::NORMAL_MAPPING),
        )
        .unwrap();

    let key = stage.permutation_key();
    assert_eq!(
        key.inputs,
        FragmentInputs::UV | FragmentInputs::NORMAL | FragmentInputs::TANGENT
    );
    assert_eq!(key.features, BuiltInFeatures::NORMAL_MAPPING);
}

#[test]
fn registration_order_does_not_change_the_key() {
    let recipes = [
        ("albedo", OutputRecipe::albedo()),
        ("normal", OutputRecipe::normals()),
        ("motion", OutputRecipe::motion_vectors()),
        ("id", OutputRecipe::mesh_id()),
    ];

    let mut forward = GBufferStage::new();
    for (name, recipe) in &recipes {
        forward.add_output(name, recipe.clone()).unwrap();
    }

    let mut reversed = GBufferStage::new();
    for (name, recipe) in recipes.iter().rev() {
        reversed.add_output(name, recipe.clone()).unwrap();
    }

    assert_eq!(forward.permutation_key(), reversed.permutation_key());
}

#[test]
fn stage_level_overrides_are_unioned_in() {
    let mut stage = GBufferStage::new();
    stage.add_output("plain", vec4_recipe()).unwrap();

    assert_eq!(stage.permutation_key(), PermutationKey::default());

    stage.enable_built_in_feature(BuiltInFeatures::ALPHA_TEST);
    let key = stage.permutation_key();
    assert!(key.features.contains(BuiltInFeatures::ALPHA_TEST));
    assert!(key.inputs.contains(FragmentInputs::UV));
}

#[test]
fn enabling_features_twice_is_idempotent() {
    let mut stage = GBufferStage::new();
    stage
        .enable_built_in_feature(BuiltInFeatures::NORMAL_MAPPING)
        .enable_built_in_feature(BuiltInFeatures::NORMAL_MAPPING);

    let mut once = GBufferStage::new();
    once.enable_built_in_feature(BuiltInFeatures::NORMAL_MAPPING);

    assert_eq!(stage.permutation_key(), once.permutation_key());
}

// ============================================================================
// Pass plan
// ============================================================================

#[test]
fn plan_has_one_target_per_output_in_order() {
    let mut registry = OutputRegistry::new();
    registry
        .insert("position", OutputRecipe::world_position())
        .unwrap();
    registry.insert("albedo", OutputRecipe::albedo()).unwrap();
    registry
        .insert("motion", OutputRecipe::motion_vectors())
        .unwrap();

    let plan = PassPlan::from_registry(&registry);
    assert_eq!(plan.color_count(), 3);

    let formats: Vec<_> = plan
        .color_targets()
        .iter()
        .map(|t| t.as_ref().unwrap().format)
        .collect();
    assert_eq!(
        formats,
        [
            wgpu::TextureFormat::Rgba16Float,
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureFormat::Rg16Float,
        ]
    );
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn destroy_twice_is_a_no_op() {
    let mut stage = GBufferStage::new();
    stage.add_output("a", vec4_recipe()).unwrap();

    stage.destroy();
    stage.destroy();

    assert!(!stage.is_built());
    assert!(stage.shader_key().is_none());
    // Configuration survives for a rebuild.
    assert_eq!(stage.output_count(), 1);
    assert_eq!(stage.permutation_key(), PermutationKey::default());
}

#[test]
fn frame_and_image_access_require_build() {
    let mut stage = GBufferStage::new();
    stage.add_output("a", vec4_recipe()).unwrap();

    assert!(matches!(
        stage.output_image("a"),
        Err(GBufferError::NotBuilt)
    ));
    assert!(stage.depth_image().is_none());
}
