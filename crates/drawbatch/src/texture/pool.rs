use std::fmt;

use crate::error::{RenderError, Result};

/// Number of texture slots a renderer owns unless configured otherwise.
pub const DEFAULT_TEXTURE_CAPACITY: usize = 2048;

/// Batch `texture_id` value meaning "draw without a texture".
///
/// Any negative id is treated the same way.
pub const NO_TEXTURE: i32 = -1;

/// Opaque handle to a pool-managed texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TextureHandle(u32);

impl TextureHandle {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Slot index of this handle.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Value to write into a batch descriptor's `texture_id` field.
    #[inline]
    pub const fn to_batch_id(self) -> i32 {
        self.0 as i32
    }
}

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
enum Slot<T> {
    Free,
    /// Handed out by `allocate`, waiting for `bind`.
    Reserved,
    Bound(T),
}

/// Fixed-capacity slot table mapping handles to native texture resources.
///
/// Storage is a dense slot array plus a stack of free indices. Free handles are
/// reused last-freed-first; a fresh pool hands out `capacity - 1` first.
///
/// Invariants:
/// - every handle is in `[0, capacity)`
/// - a handle is either on the free stack or live, never both
/// - `live() <= capacity()`
#[derive(Debug)]
pub struct TexturePool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Default for TexturePool<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TEXTURE_CAPACITY)
    }
}

impl<T> TexturePool<T> {
    /// Creates a pool with `capacity` free handles.
    ///
    /// # Panics
    /// Panics if `capacity` does not fit the `u32` handle space.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity <= u32::MAX as usize, "texture capacity {capacity} exceeds handle space");

        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot::Free);

        Self {
            slots,
            free: (0..capacity as u32).collect(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of handles currently allocated (reserved or bound).
    #[inline]
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Takes a free handle without attaching a resource yet.
    pub fn allocate(&mut self) -> Result<TextureHandle> {
        let Some(index) = self.free.pop() else {
            return Err(RenderError::ResourceExhausted {
                capacity: self.capacity(),
            });
        };

        self.slots[index as usize] = Slot::Reserved;
        Ok(TextureHandle(index))
    }

    /// Attaches `resource` to a handle previously returned by [`allocate`](Self::allocate).
    pub fn bind(&mut self, handle: TextureHandle, resource: T) -> Result<()> {
        let slot = self.slot_mut(handle)?;
        match slot {
            Slot::Reserved => {
                *slot = Slot::Bound(resource);
                Ok(())
            }
            Slot::Free | Slot::Bound(_) => Err(RenderError::InvalidHandle(handle)),
        }
    }

    /// Allocates a handle and binds `resource` to it.
    pub fn insert(&mut self, resource: T) -> Result<TextureHandle> {
        let handle = self.allocate()?;
        self.slots[handle.index()] = Slot::Bound(resource);
        Ok(handle)
    }

    /// Releases `handle` and returns its resource, if one was bound.
    ///
    /// The handle goes back on the free stack; callers must not use it afterward.
    pub fn dispose(&mut self, handle: TextureHandle) -> Result<Option<T>> {
        let slot = self.slot_mut(handle)?;
        let resource = match std::mem::replace(slot, Slot::Free) {
            Slot::Free => return Err(RenderError::InvalidHandle(handle)),
            Slot::Reserved => None,
            Slot::Bound(resource) => Some(resource),
        };

        self.free.push(handle.0);
        Ok(resource)
    }

    /// Returns the resource bound to `handle`.
    #[inline]
    pub fn get(&self, handle: TextureHandle) -> Option<&T> {
        match self.slots.get(handle.index()) {
            Some(Slot::Bound(resource)) => Some(resource),
            _ => None,
        }
    }

    #[inline]
    pub fn is_bound(&self, handle: TextureHandle) -> bool {
        self.get(handle).is_some()
    }

    fn slot_mut(&mut self, handle: TextureHandle) -> Result<&mut Slot<T>> {
        let capacity = self.slots.len() as i64;
        self.slots
            .get_mut(handle.index())
            .ok_or_else(|| RenderError::out_of_range("texture handle", handle.0 as i64, capacity))
    }
}
