//! GPU texture ownership across frames and context rebuilds.
//!
//! The renderer owns one device texture per raster layer. When the host
//! reports a fresh context, every texture from the previous one is released
//! before new ones are created, so repeated rebuilds never accumulate
//! handles. Between rebuilds, [`TextureLifecycle::sync`] re-uploads only
//! layers whose packed texture changed.

use std::collections::HashMap;
use std::sync::Arc;

use crate::raster::PackedTexture;
use crate::{Error, Result};

/// Creates and destroys device textures.
pub trait TextureAllocator {
    type Handle;

    fn allocate(&mut self, layer_id: &str, texture: &PackedTexture) -> Result<Self::Handle>;

    fn release(&mut self, handle: Self::Handle);
}

struct Entry<H> {
    generation: u64,
    handle: H,
}

/// Outcome of a rebuild or sync.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub created: usize,
    pub released: usize,
    pub failures: Vec<Error>,
}

/// Texture handles keyed by layer id.
pub struct TextureLifecycle<H> {
    entries: HashMap<String, Entry<H>>,
    /// Generations that failed to allocate, so they are not retried every frame.
    failed: HashMap<String, u64>,
    rebuilds: u64,
}

impl<H> Default for TextureLifecycle<H> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            failed: HashMap::new(),
            rebuilds: 0,
        }
    }
}

impl<H> TextureLifecycle<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, layer_id: &str) -> Option<&H> {
        self.entries.get(layer_id).map(|e| &e.handle)
    }

    pub fn live_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of context rebuilds seen so far.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Release every texture, then create one per source.
    pub fn rebuild<A>(
        &mut self,
        allocator: &mut A,
        sources: &[(&str, &Arc<PackedTexture>)],
    ) -> SyncReport
    where
        A: TextureAllocator<Handle = H>,
    {
        let mut report = SyncReport {
            released: self.release_all(allocator),
            ..SyncReport::default()
        };
        self.failed.clear();
        self.rebuilds += 1;
        for (id, texture) in sources {
            self.create(allocator, id, texture, &mut report);
        }
        tracing::info!(
            "Rebuilt layer textures: {} released, {} created, {} failed",
            report.released,
            report.created,
            report.failures.len()
        );
        report
    }

    /// Bring the live set in line with `sources`.
    ///
    /// New or re-packed layers are uploaded, and textures of layers no
    /// longer present are released.
    pub fn sync<A>(
        &mut self,
        allocator: &mut A,
        sources: &[(&str, &Arc<PackedTexture>)],
    ) -> SyncReport
    where
        A: TextureAllocator<Handle = H>,
    {
        let mut report = SyncReport::default();

        let stale: Vec<String> = self
            .entries
            .keys()
            .filter(|id| !sources.iter().any(|(s, _)| *s == id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            if let Some(entry) = self.entries.remove(&id) {
                allocator.release(entry.handle);
                report.released += 1;
            }
        }
        self.failed.retain(|id, _| sources.iter().any(|(s, _)| *s == id.as_str()));

        for (id, texture) in sources {
            let current = self.entries.get(*id).map(|e| e.generation);
            if current == Some(texture.generation) {
                continue;
            }
            if self.failed.get(*id) == Some(&texture.generation) {
                continue;
            }
            if let Some(entry) = self.entries.remove(*id) {
                allocator.release(entry.handle);
                report.released += 1;
            }
            self.create(allocator, id, texture, &mut report);
        }

        if report.created + report.released > 0 {
            tracing::debug!(
                "Synced layer textures: {} created, {} released",
                report.created,
                report.released
            );
        }
        report
    }

    /// Release everything. Returns how many handles were freed.
    pub fn release_all<A>(&mut self, allocator: &mut A) -> usize
    where
        A: TextureAllocator<Handle = H>,
    {
        let count = self.entries.len();
        for (_, entry) in self.entries.drain() {
            allocator.release(entry.handle);
        }
        count
    }

    fn create<A>(
        &mut self,
        allocator: &mut A,
        id: &str,
        texture: &PackedTexture,
        report: &mut SyncReport,
    ) where
        A: TextureAllocator<Handle = H>,
    {
        match allocator.allocate(id, texture) {
            Ok(handle) => {
                tracing::debug!(
                    "Created texture for layer '{}' (generation {})",
                    id,
                    texture.generation
                );
                self.failed.remove(id);
                self.entries.insert(
                    id.to_string(),
                    Entry {
                        generation: texture.generation,
                        handle,
                    },
                );
                report.created += 1;
            }
            Err(e) => {
                tracing::warn!("Texture for layer '{}' not created: {}", id, e);
                self.failed.insert(id.to_string(), texture.generation);
                report.failures.push(e);
            }
        }
    }
}
