// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dimension descriptors and the key ordering shared by all tree operations.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::cmp::Ordering;
use core::fmt::Debug;

/// Named numeric fields of a point type.
///
/// Implement this to use [`Dimension::field`] with your own point type.
/// Return `None` for names the type does not have.
pub trait FieldAccess {
    /// Value of the field called `name`.
    fn field(&self, name: &str) -> Option<f64>;
}

enum Kind<T> {
    Field {
        name: Cow<'static, str>,
        resolve: fn(&T, &str) -> Option<f64>,
    },
    Derived(Box<dyn Fn(&T) -> f64>),
}

/// One coordinate axis of a point type.
///
/// A tree holds an ordered list of these. The order matters: round-robin
/// splitting cycles through them by position, and split indices in a
/// [`TreeShape`](crate::TreeShape) refer to it.
pub struct Dimension<T> {
    kind: Kind<T>,
}

impl<T: FieldAccess> Dimension<T> {
    /// A dimension read from the field `name` via [`FieldAccess`].
    ///
    /// Points that do not have the field read as `NaN`.
    pub fn field(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: Kind::Field {
                name: name.into(),
                resolve: <T as FieldAccess>::field,
            },
        }
    }
}

impl<T> Dimension<T> {
    /// A dimension computed by `f`.
    pub fn derived(f: impl Fn(&T) -> f64 + 'static) -> Self {
        Self {
            kind: Kind::Derived(Box::new(f)),
        }
    }

    /// The value of `point` along this dimension.
    #[inline]
    pub fn value(&self, point: &T) -> f64 {
        match &self.kind {
            Kind::Field { name, resolve } => resolve(point, &**name).unwrap_or(f64::NAN),
            Kind::Derived(f) => f(point),
        }
    }

    /// The field name, for field dimensions.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            Kind::Field { name, .. } => Some(&**name),
            Kind::Derived(_) => None,
        }
    }
}

impl<T> Debug for Dimension<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.kind {
            Kind::Field { name, .. } => f.debug_tuple("Field").field(name).finish(),
            Kind::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}

/// Total preorder over coordinate keys.
///
/// Numbers compare numerically (so `-0.0 == 0.0`); `NaN` sorts after every
/// number and all `NaN`s are equal.
pub(crate) fn key_cmp(a: f64, b: f64) -> Ordering {
    match a.partial_cmp(&b) {
        Some(ord) => ord,
        None => a.is_nan().cmp(&b.is_nan()),
    }
}

#[inline]
pub(crate) fn key_lt(a: f64, b: f64) -> bool {
    key_cmp(a, b) == Ordering::Less
}

#[inline]
pub(crate) fn key_eq(a: f64, b: f64) -> bool {
    key_cmp(a, b) == Ordering::Equal
}
