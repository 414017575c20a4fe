//! Shader Permutation Tests
//!
//! Renders the embedded WGSL template against real configurations and
//! checks that the generated source contains exactly what the permutation
//! asks for — varyings, built-in computations, and per-location outputs —
//! and that identical configurations render byte-identical source (the
//! property the module cache keys on).

use cgbuffer::pipeline::{self, SHADER_TEMPLATE};
use cgbuffer::{
    BuiltInFeatures, FragmentInputs, OutputRecipe, OutputRegistry, OutputType, PermutationKey,
    ShaderGenerator,
};

fn render(registry: &OutputRegistry) -> String {
    let key = PermutationKey::aggregate(
        registry,
        FragmentInputs::empty(),
        BuiltInFeatures::empty(),
    );
    let options = pipeline::permutation_options(registry, key);
    ShaderGenerator::generate_shader(SHADER_TEMPLATE, &options)
}

#[test]
fn both_entry_points_are_generated() {
    let mut registry = OutputRegistry::new();
    registry
        .insert("position", OutputRecipe::world_position())
        .unwrap();

    let source = render(&registry);
    assert!(source.contains("fn vs_main"));
    assert!(source.contains("fn fs_main"));
}

#[test]
fn outputs_appear_at_their_locations_with_their_types() {
    let mut registry = OutputRegistry::new();
    registry
        .insert("position", OutputRecipe::world_position())
        .unwrap();
    registry
        .insert("motion", OutputRecipe::motion_vectors())
        .unwrap();
    registry.insert("id", OutputRecipe::mesh_id()).unwrap();

    let source = render(&registry);
    assert!(source.contains("@location(0) target0: vec4f"));
    assert!(source.contains("@location(1) target1: vec2f"));
    assert!(source.contains("@location(2) target2: u32"));

    assert!(source.contains("out.target0 = vec4f(world_pos, 1.0);"));
    assert!(source.contains("out.target2 = mesh_id;"));
}

#[test]
fn calculations_are_spliced_before_their_result() {
    let mut registry = OutputRegistry::new();
    registry
        .insert("motion", OutputRecipe::motion_vectors())
        .unwrap();

    let source = render(&registry);
    let calc = source
        .find("let ndc = device_pos.xy / device_pos.w;")
        .expect("calculation present");
    let result = source
        .find("out.target0 = ndc - ndc_prev;")
        .expect("result present");
    assert!(calc < result);
}

#[test]
fn unrequested_interface_values_are_absent() {
    let mut registry = OutputRegistry::new();
    registry
        .insert("position", OutputRecipe::world_position())
        .unwrap();

    let source = render(&registry);
    assert!(source.contains("out.world_pos = world.xyz;"));
    assert!(!source.contains("device_pos"));
    assert!(!source.contains("out.mesh_id"));
    assert!(!source.contains("shading_normal"));
}

#[test]
fn normal_mapping_brings_its_closure_varyings() {
    let mut registry = OutputRegistry::new();
    registry.insert("normal", OutputRecipe::normals()).unwrap();

    let source = render(&registry);
    // Closure: UV, NORMAL and TANGENT varyings all exist.
    assert!(source.contains("@location(4) normal: vec3f"));
    assert!(source.contains("@location(5) tangent: vec4f"));
    assert!(source.contains("@location(6) uv: vec2f"));
    assert!(source.contains("let shading_normal"));
}

#[test]
fn alpha_test_emits_a_discard() {
    let mut registry = OutputRegistry::new();
    registry.insert("albedo", OutputRecipe::albedo()).unwrap();

    let source = render(&registry);
    assert!(source.contains("discard;"));
    assert!(source.contains("alpha_cutoff"));
}

#[test]
fn empty_registry_renders_a_depth_only_fragment_stage() {
    let registry = OutputRegistry::new();

    let source = render(&registry);
    assert!(source.contains("fn fs_main(in: VertexOut) {"));
    assert!(!source.contains("FragmentOut"));
}

#[test]
fn identical_configurations_render_identical_source() {
    let build = || {
        let mut registry = OutputRegistry::new();
        registry.insert("albedo", OutputRecipe::albedo()).unwrap();
        registry.insert("normal", OutputRecipe::normals()).unwrap();
        registry
    };

    assert_eq!(render(&build()), render(&build()));
}

#[test]
fn different_permutations_render_different_source() {
    let mut plain = OutputRegistry::new();
    plain
        .insert(
            "a",
            OutputRecipe::new(OutputType::Vec4, wgpu::TextureFormat::Rgba16Float),
        )
        .unwrap();

    let mut mapped = OutputRegistry::new();
    mapped.insert("a", OutputRecipe::normals()).unwrap();

    assert_ne!(render(&plain), render(&mapped));
}

#[test]
fn stage_overrides_reach_the_generated_source() {
    let mut registry = OutputRegistry::new();
    registry
        .insert(
            "a",
            OutputRecipe::new(OutputType::Vec4, wgpu::TextureFormat::Rgba16Float),
        )
        .unwrap();

    // Stage-level override, closure applied, as the stage itself does it.
    let key = PermutationKey::aggregate(
        &registry,
        BuiltInFeatures::ALPHA_TEST.required_inputs(),
        BuiltInFeatures::ALPHA_TEST,
    );
    let options = pipeline::permutation_options(&registry, key);
    let source = ShaderGenerator::generate_shader(SHADER_TEMPLATE, &options);
    assert!(source.contains("discard;"));
    assert!(source.contains("@location(6) uv: vec2f"));
}
