//! # IDs
//! Texts, graphics and stored images are all addressed by an [`ObjectId`], which is unique
//! within this execution of the program and namespaced by a marker type `T`. A text ID can
//! therefore never be handed to the graphics collection by accident.
//!
//! IDs are handed out in increasing order per namespace, but nothing should rely on that.
//! They are not meant to be persisted: the interchange format drops them and fresh ones are
//! allocated on import.

use std::any::TypeId;
use std::collections::BTreeMap;
use std::num::NonZeroU64;

// Next free raw value, per namespace.
static NEXT_ID: parking_lot::Mutex<BTreeMap<TypeId, u64>> =
    parking_lot::const_mutex(BTreeMap::new());

/// Reserve `count` consecutive raw values from `T`'s namespace, returning the first.
fn reserve<T: 'static>(count: u64) -> u64 {
    let mut next = NEXT_ID.lock();
    let slot = next.entry(TypeId::of::<T>()).or_insert(1);
    let start = *slot;
    match start.checked_add(count) {
        Some(end) => {
            *slot = end;
            start
        }
        None => {
            // Handing out a duplicate would silently alias two objects, which is worse than dying.
            #[cfg(not(test))]
            {
                log::error!("{} ID overflow! Aborting!", std::any::type_name::<T>());
                log::logger().flush();
                std::process::abort();
            }
            #[cfg(test)]
            {
                panic!("{} ID overflow! Aborting!", std::any::type_name::<T>())
            }
        }
    }
}

/// ID that is guaranteed unique within this process and namespace.
pub struct ObjectId<T: 'static> {
    id: NonZeroU64,
    // `fn() -> T` keeps the ID Send + Sync regardless of T.
    _namespace: std::marker::PhantomData<fn() -> T>,
}

impl<T: 'static> ObjectId<T> {
    /// Allocate a single new ID.
    #[must_use]
    pub fn fresh() -> Self {
        Self::from_raw_unchecked(reserve::<T>(1))
    }
    /// Allocate many IDs at once, under a single lock.
    ///
    /// IDs are reserved eagerly: dropping the iterator early does not return the unused ones.
    pub fn many(count: usize) -> impl ExactSizeIterator<Item = Self> {
        let start = reserve::<T>(count as u64);
        (0..count).map(move |offset| Self::from_raw_unchecked(start + offset as u64))
    }
    // Raw values come from `reserve`, which never hands out zero.
    fn from_raw_unchecked(raw: u64) -> Self {
        Self {
            id: NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN),
            _namespace: std::marker::PhantomData,
        }
    }
    /// The raw numeric value. IDs from differing namespaces may share the same value!
    #[must_use]
    pub fn raw(&self) -> u64 {
        self.id.get()
    }
}

impl<T: 'static> Default for ObjectId<T> {
    fn default() -> Self {
        Self::fresh()
    }
}
impl<T: 'static> Clone for ObjectId<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: 'static> Copy for ObjectId<T> {}
impl<T: 'static> PartialEq for ObjectId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl<T: 'static> Eq for ObjectId<T> {}
impl<T: 'static> PartialOrd for ObjectId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: 'static> Ord for ObjectId<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}
impl<T: 'static> std::hash::Hash for ObjectId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl<T: 'static> std::fmt::Display for ObjectId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = std::any::type_name::<T>();
        let short = name.rsplit("::").next().unwrap_or(name);
        write!(f, "{short}#{}", self.id)
    }
}
impl<T: 'static> std::fmt::Debug for ObjectId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod test {
    use super::ObjectId;
    // Tests share the global allocator, so each one uses its own namespace.

    #[test]
    fn starts_at_one() {
        struct Namespace;
        let _ = ObjectId::<Namespace>::many(0);
        assert_eq!(ObjectId::<Namespace>::fresh().raw(), 1);
        assert_eq!(ObjectId::<Namespace>::fresh().raw(), 2);
    }
    #[test]
    fn many_unique() {
        struct Namespace;
        let mut ids: Vec<_> = ObjectId::<Namespace>::many(512)
            .chain(ObjectId::<Namespace>::many(512))
            .collect();
        assert_eq!(ids.len(), 1024);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 1024, "had duplicate ids");
    }
    #[test]
    fn namespaces_are_independent() {
        struct A;
        struct B;
        let a = ObjectId::<A>::fresh();
        let b = ObjectId::<B>::fresh();
        assert_eq!(a.raw(), b.raw());
        assert_eq!(a.to_string(), format!("A#{}", a.raw()));
    }
    #[test]
    #[should_panic(expected = "ID overflow")]
    fn overflow() {
        struct Namespace;
        let _ = super::reserve::<Namespace>(u64::MAX - 1);
        let _ = super::reserve::<Namespace>(1);
    }
}
