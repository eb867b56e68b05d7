//! Contract keys for the registration store.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Key for registration storage and lookup.
///
/// A key identifies a contract type, which may be a concrete type or a trait
/// object such as `dyn Logger`. The `TypeId` drives equality and hashing; the
/// type name is carried along for diagnostics and error messages only.
///
/// # Examples
///
/// ```rust
/// use scene_di::Key;
///
/// trait Logger: Send + Sync {}
///
/// let a = Key::of::<dyn Logger>();
/// let b = Key::of::<dyn Logger>();
/// assert_eq!(a, b);
/// assert_ne!(a, Key::of::<String>());
/// assert!(a.display_name().contains("Logger"));
/// ```
#[derive(Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Key for the contract type `T`.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Key {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `std::any::type_name` of the contract.
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

// Name is ignored: TypeId alone identifies the contract
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl Hash for Key {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Helper for creating contract keys.
#[inline(always)]
pub fn key_of<T: ?Sized + 'static>() -> Key {
    Key::of::<T>()
}
