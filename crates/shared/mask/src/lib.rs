//! # Masks
//!
//! Immutable, order-irrelevant sets of names used for selection and dependency
//! declaration. A mask is either the universal mask ([`Mask::all`]) or an explicit
//! set of names. The kind parameter keeps field-level masks ([`FieldMask`]) and
//! storage-level masks ([`PropertyMask`]) from being mixed up.
//!
//! ```rust
//! use keel_mask::FieldMask;
//!
//! let selected = FieldMask::from(["name", "email"]);
//! let visible = selected.intersect(&FieldMask::from(["email", "age"]));
//! assert!(visible.includes("email"));
//! assert!(!visible.includes("name"));
//!
//! let widened = visible.join(&FieldMask::from(["age"]));
//! assert_eq!(widened, FieldMask::from(["age", "email"]));
//! ```

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;

mod private {
    pub trait Sealed {}
}

/// Marks which namespace the names of a [`Mask`] live in.
pub trait MaskKind: private::Sealed + Copy + Send + Sync + 'static {
    const LABEL: &'static str;
}

/// Logical field (and dependent) names exposed by a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Field;

/// Physical property names of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Property;

impl private::Sealed for Field {}
impl private::Sealed for Property {}

impl MaskKind for Field {
    const LABEL: &'static str = "field";
}

impl MaskKind for Property {
    const LABEL: &'static str = "property";
}

pub type FieldMask = Mask<Field>;
pub type DependentMask = Mask<Field>;
pub type PropertyMask = Mask<Property>;

#[derive(Clone, PartialEq, Eq, Hash)]
enum Names {
    All,
    Only(BTreeSet<String>),
}

/// An immutable set of names of kind `K`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Mask<K: MaskKind = Field> {
    names: Names,
    kind: PhantomData<K>,
}

impl<K: MaskKind> Mask<K> {
    const fn with(names: Names) -> Self {
        Self { names, kind: PhantomData }
    }

    /// The universal mask: includes every name.
    #[must_use]
    pub const fn all() -> Self {
        Self::with(Names::All)
    }

    /// A mask that includes nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self::with(Names::Only(BTreeSet::new()))
    }

    #[must_use]
    pub fn includes(&self, name: &str) -> bool {
        match &self.names {
            Names::All => true,
            Names::Only(names) => names.contains(name),
        }
    }

    /// Set intersection. Narrowing a selection never widens it.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        match (&self.names, &other.names) {
            (Names::All, _) => other.clone(),
            (_, Names::All) => self.clone(),
            (Names::Only(a), Names::Only(b)) => {
                Self::with(Names::Only(a.intersection(b).cloned().collect()))
            },
        }
    }

    /// Set union, used to accumulate requirements across several names.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        match (&self.names, &other.names) {
            (Names::All, _) | (_, Names::All) => Self::all(),
            (Names::Only(a), Names::Only(b)) => Self::with(Names::Only(a.union(b).cloned().collect())),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(&self.names, Names::Only(names) if names.is_empty())
    }

    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self.names, Names::All)
    }

    /// Number of explicit names, `None` for the universal mask.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match &self.names {
            Names::All => None,
            Names::Only(names) => Some(names.len()),
        }
    }

    /// Explicit names in sorted order, `None` for the universal mask.
    pub fn names(&self) -> Option<impl Iterator<Item = &str>> {
        match &self.names {
            Names::All => None,
            Names::Only(names) => Some(names.iter().map(String::as_str)),
        }
    }

    /// Restricts a record to the keys this mask includes, keeping the record's order.
    #[must_use]
    pub fn project(&self, record: &Map<String, Value>) -> Map<String, Value> {
        record
            .iter()
            .filter(|(key, _)| self.includes(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// True when every explicit name is present as a key of `record`.
    /// The universal mask cannot be checked and is treated as satisfied.
    #[must_use]
    pub fn is_satisfied_by(&self, record: &Map<String, Value>) -> bool {
        match &self.names {
            Names::All => true,
            Names::Only(names) => names.iter().all(|name| record.contains_key(name)),
        }
    }
}

impl<K: MaskKind> Default for Mask<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: MaskKind, S: Into<String>> FromIterator<S> for Mask<K> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::with(Names::Only(iter.into_iter().map(Into::into).collect()))
    }
}

impl<K: MaskKind, const N: usize> From<[&str; N]> for Mask<K> {
    fn from(names: [&str; N]) -> Self {
        names.into_iter().collect()
    }
}

impl<K: MaskKind> From<&[&str]> for Mask<K> {
    fn from(names: &[&str]) -> Self {
        names.iter().copied().collect()
    }
}

impl<K: MaskKind> From<Vec<String>> for Mask<K> {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl<K: MaskKind> From<Vec<&str>> for Mask<K> {
    fn from(names: Vec<&str>) -> Self {
        names.into_iter().collect()
    }
}

impl<K: MaskKind> From<&str> for Mask<K> {
    fn from(name: &str) -> Self {
        std::iter::once(name).collect()
    }
}

impl<K: MaskKind> From<&Self> for Mask<K> {
    fn from(mask: &Self) -> Self {
        mask.clone()
    }
}

/// An omitted mask is the empty mask.
impl<K: MaskKind> From<Option<Self>> for Mask<K> {
    fn from(mask: Option<Self>) -> Self {
        mask.unwrap_or_default()
    }
}

impl<K: MaskKind> fmt::Debug for Mask<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Mask({self})", K::LABEL)
    }
}

impl<K: MaskKind> fmt::Display for Mask<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.names {
            Names::All => f.write_str("*"),
            Names::Only(names) => {
                f.write_str("[")?;
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(name)?;
                }
                f.write_str("]")
            },
        }
    }
}
