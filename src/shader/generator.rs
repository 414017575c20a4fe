//! Shader Generation & Module Cache
//!
//! Renders the fixed WGSL template against a permutation's define set and
//! deduplicates the compiled `wgpu::ShaderModule`s by hashing the final
//! source with xxh3-128. Two configurations that emit the same defines
//! render byte-identical WGSL and therefore share one module and one
//! cache key.

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, Error, ErrorKind};
use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;
use xxhash_rust::xxh3::xxh3_128;

use super::defines::ShaderDefines;

static SHADER_ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(RustEmbed)]
#[folder = "src/shader/wgsl"]
struct ShaderAssets;

pub(crate) fn get_env() -> &'static Environment<'static> {
    SHADER_ENV.get_or_init(|| {
        let mut env = Environment::new();

        let syntax = SyntaxConfig::builder()
            .block_delimiters("{$", "$}")
            .variable_delimiters("{{", "}}")
            .line_statement_prefix("$$")
            .build()
            .expect("Failed to configure template syntax");

        env.set_syntax(syntax);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(minijinja::UndefinedBehavior::SemiStrict);
        env.set_loader(shader_loader);

        env
    })
}

fn shader_loader(name: &str) -> Result<Option<String>, Error> {
    let filename = if std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wgsl"))
    {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}.wgsl"))
    };

    match ShaderAssets::get(&filename) {
        Some(file) => match std::str::from_utf8(file.data.as_ref()) {
            Ok(source) => Ok(Some(source.to_string())),
            Err(e) => Err(Error::new(
                ErrorKind::TemplateNotFound,
                format!("Shader template is not valid UTF-8: {e}"),
            )),
        },
        None => Ok(None),
    }
}

/// One output channel as seen by the template: its location, WGSL type,
/// and the expressions spliced into the fragment shader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSlot {
    pub location: u32,
    pub ty: String,
    pub result: String,
    pub calculation: Option<String>,
}

/// Everything needed to render one shader permutation.
///
/// The define set is the permutation key: the per-slot data duplicates
/// information already present in the `OUT_<i>` defines, structured for
/// convenient template iteration, so hashing the defines covers the whole
/// configuration.
#[derive(Debug, Clone, Default)]
pub struct ShaderCompilationOptions {
    pub defines: ShaderDefines,
    pub outputs: Vec<OutputSlot>,
}

impl ShaderCompilationOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_define(&mut self, key: &str, value: &str) {
        self.defines.set(key, value);
    }

    /// Hash of the permutation key, for cache lookups.
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        self.defines.compute_hash()
    }

    fn to_template_map(&self) -> BTreeMap<String, String> {
        self.defines.to_map()
    }
}

impl Hash for ShaderCompilationOptions {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.defines.hash(state);
    }
}

impl PartialEq for ShaderCompilationOptions {
    fn eq(&self, other: &Self) -> bool {
        self.defines == other.defines
    }
}

impl Eq for ShaderCompilationOptions {}

#[derive(Serialize)]
struct ShaderContext<'a> {
    #[serde(flatten)]
    defines: BTreeMap<String, String>,
    outputs: &'a [OutputSlot],
}

pub struct ShaderGenerator;

impl ShaderGenerator {
    /// Renders a template against the permutation's defines.
    ///
    /// Rendering can only fail on a malformed template or an expression
    /// the template cannot splice — programming errors, so this panics.
    #[must_use]
    pub fn generate_shader(template_name: &str, options: &ShaderCompilationOptions) -> String {
        let env = get_env();

        let ctx = ShaderContext {
            defines: options.to_template_map(),
            outputs: &options.outputs,
        };

        let template = env
            .get_template(template_name)
            .expect("Shader template not found");

        let source = template.render(&ctx).expect("Shader render failed");

        format!("// === Generated G-Buffer Shader ===\n{source}")
    }
}

/// Centralized shader module cache.
///
/// Memoizes compiled modules on the xxh3-128 of the rendered WGSL, so
/// identical `(template, defines)` pairs compile exactly once.
pub struct ShaderManager {
    /// xxh3-128 of final WGSL → compiled module.
    module_cache: FxHashMap<u128, wgpu::ShaderModule>,
}

impl Default for ShaderManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            module_cache: FxHashMap::default(),
        }
    }

    /// Renders, hashes, and compiles a shader permutation (or returns the
    /// cached module).
    ///
    /// Returns `(module_ref, source_hash)`; the hash doubles as the
    /// permutation's cache key for callers that track shader identity.
    pub fn get_or_compile(
        &mut self,
        device: &wgpu::Device,
        template_name: &str,
        options: &ShaderCompilationOptions,
    ) -> (&wgpu::ShaderModule, u128) {
        let source = ShaderGenerator::generate_shader(template_name, options);
        let hash = xxh3_128(source.as_bytes());

        log::debug!(
            "shader permutation {template_name}: {} defines, key {hash:032x}",
            options.defines.len()
        );

        let module = self.module_cache.entry(hash).or_insert_with(|| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("Shader Module {template_name}")),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        });

        (module, hash)
    }

    /// Number of distinct compiled modules.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.module_cache.len()
    }
}
