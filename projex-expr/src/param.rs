//! Formal parameters and the arena that issues their identities.
//!
//! A lambda refers to its own parameters through [`Param`] placeholders.
//! Two placeholders are the same parameter only when they carry the same
//! [`ParamId`]; the display name plays no part in equality. This is what lets
//! the rebinder substitute an outer projection's `p` without touching an
//! unrelated nested lambda that also happens to call its parameter `p`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_ARENA: AtomicU64 = AtomicU64::new(0);

/// Static type attached to a formal parameter.
///
/// The expander only compares parameter counts; the type is carried for
/// display and for backends that want to validate the expanded tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Any,
    Boolean,
    Integer,
    Float,
    String,
    /// Record of the named entity type.
    Record(Arc<str>),
    List(Box<DataType>),
    Lambda,
}

impl DataType {
    pub fn record(name: &str) -> Self {
        DataType::Record(Arc::from(name))
    }

    pub fn list_of(element: DataType) -> Self {
        DataType::List(Box::new(element))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Any => f.write_str("any"),
            DataType::Boolean => f.write_str("bool"),
            DataType::Integer => f.write_str("int"),
            DataType::Float => f.write_str("float"),
            DataType::String => f.write_str("string"),
            DataType::Record(name) => f.write_str(name),
            DataType::List(element) => write!(f, "[{element}]"),
            DataType::Lambda => f.write_str("lambda"),
        }
    }
}

/// Identity of a parameter: the issuing arena plus the slot inside it.
///
/// Arena tokens are process-unique, so parameters declared through
/// different arenas never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId {
    arena: u64,
    slot: usize,
}

impl ParamId {
    /// Slot index inside the issuing arena.
    #[inline]
    pub fn index(self) -> usize {
        self.slot
    }

    #[inline]
    pub fn arena(self) -> u64 {
        self.arena
    }
}

/// Placeholder for a lambda's formal parameter.
///
/// Equality and hashing use only the identity.
#[derive(Debug, Clone)]
pub struct Param {
    id: ParamId,
    name: Arc<str>,
    data_type: DataType,
}

impl Param {
    #[inline]
    pub fn id(&self) -> ParamId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Param {}

impl Hash for Param {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone)]
struct ParamSlot {
    name: Arc<str>,
    data_type: DataType,
}

/// Issues parameter identities.
///
/// Projections declared through separate arenas compose freely: each arena
/// draws a fresh token, so identities never collide across arenas.
#[derive(Debug)]
pub struct ParamArena {
    token: u64,
    slots: Vec<ParamSlot>,
}

impl Default for ParamArena {
    fn default() -> Self {
        Self {
            token: NEXT_ARENA.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
        }
    }
}

impl ParamArena {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh parameter slot.
    pub fn declare(&mut self, name: impl Into<Arc<str>>, data_type: DataType) -> Param {
        let id = ParamId {
            arena: self.token,
            slot: self.slots.len(),
        };
        let name = name.into();
        self.slots.push(ParamSlot {
            name: Arc::clone(&name),
            data_type: data_type.clone(),
        });
        Param {
            id,
            name,
            data_type,
        }
    }

    /// Look up a previously declared parameter by identity. Identities
    /// issued by another arena are not found.
    pub fn get(&self, id: ParamId) -> Option<Param> {
        if id.arena != self.token {
            return None;
        }
        self.slots.get(id.slot).map(|slot| Param {
            id,
            name: Arc::clone(&slot.name),
            data_type: slot.data_type.clone(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
