//! Field deltas.
//!
//! A delta is an encoded change to one value plus the rule that applies it.
//! The producer builds it from the new value and serializes it; the consumer
//! starts from `Default`, deserializes into it and folds it onto its current
//! value with [`Delta::combine`].
//!
//! `combine` must be pure: it returns the new value and has no other effect.
//! The deltas here all replace the current value outright; composites that
//! want an in-place merge implement [`Delta`] themselves.

use crate::enums::EnumRepr;
use crate::error::CodecResult;
use crate::field::Field;
use crate::serializer::{Serializable, Serializer};

/// A serializable change to a value of type `T`.
pub trait Delta<T>: Serializable {
    /// Returns the value obtained by applying this delta on top of `current`.
    fn combine(&self, current: T) -> T;
}

/// Replaces a scalar, string or fixed record.
#[derive(Debug, Clone, PartialEq)]
pub struct Replace<T> {
    value: T,
    packed: bool,
}

impl<T: Default> Default for Replace<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Replace<T> {
    /// Creates a delta that replaces the current value with `value`.
    ///
    /// The value is packed on the wire unless changed with
    /// [`with_packed`](Self::with_packed).
    pub const fn new(value: T) -> Self {
        Self {
            value,
            packed: true,
        }
    }

    /// Selects the packed or unpacked encoding. Both ends must agree.
    #[must_use]
    pub fn with_packed(mut self, packed: bool) -> Self {
        self.packed = packed;
        self
    }

    pub const fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub const fn is_packed(&self) -> bool {
        self.packed
    }
}

impl<T: Field> Serializable for Replace<T> {
    fn serialize(&mut self, serializer: &mut Serializer<'_>) -> CodecResult<()> {
        serializer.value(&mut self.value, self.packed)
    }
}

impl<T: Field + Clone> Delta<T> for Replace<T> {
    fn combine(&self, _current: T) -> T {
        self.value.clone()
    }
}

/// Replaces an enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceEnum<E> {
    value: E,
    packed: bool,
}

impl<E: Default> Default for ReplaceEnum<E> {
    fn default() -> Self {
        Self::new(E::default())
    }
}

impl<E> ReplaceEnum<E> {
    pub const fn new(value: E) -> Self {
        Self {
            value,
            packed: true,
        }
    }

    #[must_use]
    pub fn with_packed(mut self, packed: bool) -> Self {
        self.packed = packed;
        self
    }

    pub const fn value(&self) -> &E {
        &self.value
    }

    pub fn into_value(self) -> E {
        self.value
    }
}

impl<E: EnumRepr> Serializable for ReplaceEnum<E> {
    fn serialize(&mut self, serializer: &mut Serializer<'_>) -> CodecResult<()> {
        serializer.enumeration(&mut self.value, self.packed)
    }
}

impl<E: EnumRepr + Clone> Delta<E> for ReplaceEnum<E> {
    fn combine(&self, _current: E) -> E {
        self.value.clone()
    }
}

/// Replaces a nested [`Serializable`] object.
///
/// A consumer-side delta holds no value until it is read. Reading always
/// decodes into a fresh `T::default()`, so nested serialization has a valid
/// target and no state leaks from a previous read.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceObject<T> {
    value: Option<T>,
}

impl<T> Default for ReplaceObject<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> ReplaceObject<T> {
    pub const fn new(value: T) -> Self {
        Self { value: Some(value) }
    }

    pub const fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

impl<T: Serializable + Default> Serializable for ReplaceObject<T> {
    fn serialize(&mut self, serializer: &mut Serializer<'_>) -> CodecResult<()> {
        if serializer.is_reading() {
            self.value = None;
        }
        self.value
            .get_or_insert_with(T::default)
            .serialize(serializer)
    }
}

impl<T: Serializable + Default + Clone> Delta<T> for ReplaceObject<T> {
    fn combine(&self, current: T) -> T {
        self.value.clone().unwrap_or(current)
    }
}
