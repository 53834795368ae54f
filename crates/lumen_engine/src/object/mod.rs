//! Reference-counted object ownership
//!
//! Every heap-allocated engine entity (materials, textures, buffers, render
//! targets) lives in an [`ObjectArena`] and is addressed through strong
//! [`ObjectPtr`] and weak [`ObjectWeakPtr`] handles. The arena keeps the
//! strong count next to the value, so there is no shared count to mutate from
//! multiple places: `retain` and `release` go through the arena, and the
//! object is destroyed exactly when its count reaches zero.
//!
//! [`ObjectPtr`] is deliberately neither `Copy` nor `Clone` and `release`
//! consumes it, which makes an unbalanced or double release a compile error
//! instead of a runtime assertion. [`ObjectWeakPtr`] is a plain generational
//! key: once the object is gone the key can never resolve again, even if the
//! slot is reused.

use std::marker::PhantomData;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    struct ObjectKey;
}

/// Owning strong handle to an object stored in an [`ObjectArena`].
///
/// Holding one keeps the object alive. Dropping the handle without passing it
/// back to [`ObjectArena::release`] leaks the object until the arena itself
/// is dropped.
#[must_use = "dropping an ObjectPtr without releasing it leaks the object"]
#[derive(Debug)]
pub struct ObjectPtr<T> {
    key: ObjectKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PartialEq for ObjectPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for ObjectPtr<T> {}

/// Non-owning weak handle to an object stored in an [`ObjectArena`].
///
/// Never extends the referent's lifetime. Resolve it with
/// [`ObjectArena::upgrade`], which yields a strong handle only while the
/// object is still alive.
#[derive(Debug)]
pub struct ObjectWeakPtr<T> {
    key: ObjectKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ObjectWeakPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ObjectWeakPtr<T> {}

impl<T> PartialEq for ObjectWeakPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for ObjectWeakPtr<T> {}

struct Slot<T> {
    strong: u32,
    value: T,
}

/// Arena owning every object of type `T` together with its strong count.
pub struct ObjectArena<T> {
    slots: SlotMap<ObjectKey, Slot<T>>,
}

impl<T> Default for ObjectArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ObjectArena<T> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    /// Store a new object and return the first strong handle to it.
    ///
    /// The returned handle already owns the object (count 1); no further
    /// increment happens on construction.
    pub fn insert(&mut self, value: T) -> ObjectPtr<T> {
        let key = self.slots.insert(Slot { strong: 1, value });

        ObjectPtr {
            key,
            _marker: PhantomData,
        }
    }

    /// Mint an additional strong handle to the same object.
    pub fn retain(&mut self, ptr: &ObjectPtr<T>) -> ObjectPtr<T> {
        let slot = self.slot_mut(ptr.key);
        slot.strong += 1;

        ObjectPtr {
            key: ptr.key,
            _marker: PhantomData,
        }
    }

    /// Give up a strong handle.
    ///
    /// Returns the value when this was the last strong handle, at which point
    /// the object is destroyed and every weak handle to it goes dead.
    pub fn release(&mut self, ptr: ObjectPtr<T>) -> Option<T> {
        let slot = self.slot_mut(ptr.key);
        slot.strong -= 1;

        if slot.strong == 0 {
            let slot = self
                .slots
                .remove(ptr.key)
                .expect("slot vanished while a strong handle existed");

            Some(slot.value)
        } else {
            None
        }
    }

    /// Borrow the object behind a strong handle.
    pub fn get(&self, ptr: &ObjectPtr<T>) -> &T {
        &self.slot(ptr.key).value
    }

    /// Mutably borrow the object behind a strong handle.
    pub fn get_mut(&mut self, ptr: &ObjectPtr<T>) -> &mut T {
        &mut self.slot_mut(ptr.key).value
    }

    /// Create a weak handle observing the same object.
    pub fn downgrade(&self, ptr: &ObjectPtr<T>) -> ObjectWeakPtr<T> {
        ObjectWeakPtr {
            key: ptr.key,
            _marker: PhantomData,
        }
    }

    /// Resolve a weak handle to a strong one.
    ///
    /// Returns `None` once the object has been destroyed; the key's
    /// generation makes resurrection through a reused slot impossible.
    pub fn upgrade(&mut self, weak: ObjectWeakPtr<T>) -> Option<ObjectPtr<T>> {
        let slot = self.slots.get_mut(weak.key)?;
        slot.strong += 1;

        Some(ObjectPtr {
            key: weak.key,
            _marker: PhantomData,
        })
    }

    /// Borrow the object behind a weak handle, if it is still alive.
    pub fn try_get(&self, weak: ObjectWeakPtr<T>) -> Option<&T> {
        self.slots.get(weak.key).map(|slot| &slot.value)
    }

    /// Current strong count of the object behind a handle.
    pub fn strong_count(&self, ptr: &ObjectPtr<T>) -> u32 {
        self.slot(ptr.key).strong
    }

    /// Number of live objects in the arena.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the arena holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[track_caller]
    fn slot(&self, key: ObjectKey) -> &Slot<T> {
        self.slots
            .get(key)
            .expect("object handle does not belong to this arena")
    }

    #[track_caller]
    fn slot_mut(&mut self, key: ObjectKey) -> &mut Slot<T> {
        self.slots
            .get_mut(key)
            .expect("object handle does not belong to this arena")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_starts_at_one() {
        let mut arena = ObjectArena::new();
        let ptr = arena.insert("texture");
        assert_eq!(arena.strong_count(&ptr), 1);
        assert_eq!(arena.len(), 1);
        arena.release(ptr);
    }

    #[test]
    fn test_destroyed_exactly_at_zero() {
        let mut arena = ObjectArena::new();
        let a = arena.insert(42);
        let b = arena.retain(&a);
        let c = arena.retain(&a);
        assert_eq!(arena.strong_count(&a), 3);

        assert!(arena.release(c).is_none());
        assert!(arena.release(b).is_none());
        assert_eq!(arena.release(a), Some(42));
        assert!(arena.is_empty());
    }

    #[test]
    fn test_weak_upgrade_while_alive() {
        let mut arena = ObjectArena::new();
        let strong = arena.insert("mesh");
        let weak = arena.downgrade(&strong);

        let resolved = arena.upgrade(weak).expect("object is alive");
        assert_eq!(arena.strong_count(&strong), 2);
        assert_eq!(arena.get(&resolved), &"mesh");

        arena.release(resolved);
        arena.release(strong);
    }

    #[test]
    fn test_weak_upgrade_after_destruction() {
        let mut arena = ObjectArena::new();
        let strong = arena.insert("buffer");
        let weak = arena.downgrade(&strong);

        arena.release(strong);

        assert!(arena.upgrade(weak).is_none());
        assert!(arena.try_get(weak).is_none());
    }

    #[test]
    fn test_weak_never_resurrects_reused_slot() {
        let mut arena = ObjectArena::new();
        let first = arena.insert(1);
        let weak = arena.downgrade(&first);
        arena.release(first);

        // New insert may reuse the slot, but the generation differs.
        let second = arena.insert(2);
        assert!(arena.upgrade(weak).is_none());
        arena.release(second);
    }

    #[test]
    fn test_weak_does_not_keep_alive() {
        let mut arena = ObjectArena::new();
        let strong = arena.insert(7);
        let _weak = arena.downgrade(&strong);
        assert_eq!(arena.release(strong), Some(7));
        assert!(arena.is_empty());
    }

    #[test]
    #[should_panic(expected = "does not belong to this arena")]
    fn test_foreign_handle_fails_fast() {
        let mut arena_a = ObjectArena::new();
        let arena_b: ObjectArena<i32> = ObjectArena::new();
        let ptr = arena_a.insert(1);
        let _ = arena_b.strong_count(&ptr);
    }
}
