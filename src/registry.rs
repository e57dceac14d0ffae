//! Registry of chunk decoders with per-tag instance pooling.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::chunks::Chunk;
use crate::tag::Tag;

/// Factory for chunk decoder instances of a registered tag.
pub type Maker = Box<dyn Fn() -> Box<dyn Chunk>>;

/// Factory for chunk decoder instances keyed by tag, used for the raw
/// fallback whose decoded tag is only known at read time.
pub type RawMaker = Box<dyn Fn(Tag) -> Box<dyn Chunk>>;

/// The registry shared between a root container and its list chunks.
/// Sharing is single-threaded by design; each root container owns its
/// registry exclusively.
pub type SharedRegistry = Rc<RefCell<Registry>>;

/// Registry of chunk decoders.
///
/// Instances returned through [`Registry::put`] land on a per-tag free
/// list and are handed back out by [`Registry::get`] before the maker is
/// consulted, so repeated decodes reuse allocations. The pools grow
/// unboundedly over the registry lifetime; callers must reset a checked
/// out instance before reuse and must not keep references to an instance
/// after returning it.
pub struct Registry {
    // Chunk makers by tag.
    makers: HashMap<Tag, Maker>,

    // Pools of instantiated chunk decoders that can be reused.
    pool: HashMap<Tag, Vec<Box<dyn Chunk>>>,

    // Maker for the raw fallback decoder.
    raw: RawMaker,
}

impl Registry {
    pub fn new(raw: RawMaker) -> Registry {
        Registry {
            makers: HashMap::with_capacity(4),
            pool: HashMap::with_capacity(4),
            raw,
        }
    }

    pub fn shared(raw: RawMaker) -> SharedRegistry {
        Rc::new(RefCell::new(Registry::new(raw)))
    }

    /// True if a decoder for the tag is registered.
    pub fn has(&self, id: Tag) -> bool {
        self.makers.contains_key(&id)
    }

    /// Registers a chunk decoder maker for the tag.
    pub fn register(&mut self, id: Tag, maker: Maker) {
        self.makers.insert(id, maker);
    }

    /// Puts a finished chunk decoder back into the pool for reuse.
    pub fn put(&mut self, ch: Box<dyn Chunk>) {
        self.pool.entry(ch.id()).or_insert_with(|| Vec::with_capacity(4)).push(ch);
    }

    /// Returns a decoder for the tag, pooled or newly made. Unknown tags
    /// get the raw fallback decoder. The caller resets the instance
    /// before use.
    pub fn get(&mut self, id: Tag) -> Box<dyn Chunk> {
        self.get_no_raw(id).unwrap_or_else(|| (self.raw)(id))
    }

    /// Returns a decoder for the tag, pooled or newly made, or `None`
    /// when the tag has no registered decoder. Used by list dispatch to
    /// decide codec selection per child.
    pub fn get_no_raw(&mut self, id: Tag) -> Option<Box<dyn Chunk>> {
        if let Some(chs) = self.pool.get_mut(&id)
            && let Some(ch) = chs.pop()
        {
            return Some(ch);
        }
        self.makers.get(&id).map(|maker| maker())
    }
}
