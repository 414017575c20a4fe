//! Stage-Owned Render Targets
//!
//! One 2D color texture per registered output plus the single depth
//! texture. These are the resolution-dependent half of the stage: they are
//! (re)created on `build` and `resize` while the pass plan and pipeline
//! survive untouched.
//!
//! Every texture is wrapped in [`Tracked`] so downstream stages can key
//! per-frame state on image identity rather than on names or pointers.

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

/// Depth format used by the stage. Pure depth; the stencil clear mandated
/// by the pass contract is vacuous for this format.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A resource paired with a process-unique id.
///
/// The id is the key downstream consumers use in the shared
/// [`TargetStates`](crate::target_states::TargetStates) map. Recreating a
/// resource (resize) allocates a fresh id, so stale state entries never
/// alias a new image.
#[derive(Debug)]
pub struct Tracked<T> {
    inner: T,
    id: u64,
}

impl<T> Tracked<T> {
    /// Wraps a resource and assigns it a new id.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            id: next_id(),
        }
    }

    /// The unique id of this resource.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unwraps the inner resource.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Backing image of one color output: texture plus default view.
#[derive(Debug)]
pub struct ColorTarget {
    texture: Tracked<wgpu::Texture>,
    view: wgpu::TextureView,
}

impl ColorTarget {
    /// Creates the backing image for one output at the given resolution.
    ///
    /// Usage covers attachment writes, sampling by downstream passes, and
    /// copy-out for the present stage.
    #[must_use]
    pub fn create(
        device: &wgpu::Device,
        name: &str,
        format: wgpu::TextureFormat,
        size: (u32, u32),
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture: Tracked::new(texture),
            view,
        }
    }

    /// Image identity, as published to the shared target-state map.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.texture.id()
    }

    #[inline]
    #[must_use]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    #[inline]
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

/// The stage's single depth image.
#[derive(Debug)]
pub struct DepthTarget {
    texture: Tracked<wgpu::Texture>,
    view: wgpu::TextureView,
}

impl DepthTarget {
    /// Creates the depth image at the given resolution.
    #[must_use]
    pub fn create(device: &wgpu::Device, size: (u32, u32)) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("GBuffer Depth"),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture: Tracked::new(texture),
            view,
        }
    }

    /// Image identity, as published to the shared target-state map.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.texture.id()
    }

    #[inline]
    #[must_use]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    #[inline]
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_ids_are_unique() {
        let a = Tracked::new(0u8);
        let b = Tracked::new(0u8);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn tracked_derefs_to_inner() {
        let tracked = Tracked::new(String::from("depth"));
        assert_eq!(tracked.len(), 5);
        assert_eq!(tracked.into_inner(), "depth");
    }
}
