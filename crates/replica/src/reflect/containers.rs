// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Array, sequence and map kinds.

use super::{
    downcast_boxed, LeafKind, Reflect, ReflectList, ReflectMap, ShapeKind, TypeShape, Typed,
    ValueMut, ValueRef,
};
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

// ---------------------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------------------

impl<T: Typed> ReflectList for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn fixed_len(&self) -> Option<usize> {
        None
    }

    fn element_leaf(&self) -> Option<LeafKind> {
        T::LEAF
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice()
            .get_mut(index)
            .map(|v| v as &mut dyn Reflect)
    }

    fn reset(&mut self, len: usize) -> bool {
        self.clear();
        self.resize_with(len, T::zero);
        true
    }

    fn push_zero(&mut self) -> Option<&mut dyn Reflect> {
        self.push(T::zero());
        self.last_mut().map(|v| v as &mut dyn Reflect)
    }

    fn reserve(&mut self, additional: usize) {
        Vec::reserve(self, additional);
    }

    fn assign_from(&mut self, src: &dyn Reflect) -> bool {
        match src.downcast_ref::<Vec<T>>() {
            Some(other) => {
                self.clone_from(other);
                true
            }
            None => false,
        }
    }
}

impl<T: Typed> Reflect for Vec<T> {
    crate::__reflect_boilerplate!();

    fn reflect_ref(&self) -> ValueRef<'_> {
        ValueRef::Sequence(self)
    }

    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Sequence(self)
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn shape() -> TypeShape {
        TypeShape::of::<Self>(ShapeKind::Sequence { element: T::shape })
    }

    fn zero() -> Self {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// Fixed arrays
// ---------------------------------------------------------------------------

impl<T: Typed, const N: usize> ReflectList for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn fixed_len(&self) -> Option<usize> {
        Some(N)
    }

    fn element_leaf(&self) -> Option<LeafKind> {
        T::LEAF
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice()
            .get_mut(index)
            .map(|v| v as &mut dyn Reflect)
    }

    fn reset(&mut self, len: usize) -> bool {
        if len != N {
            return false;
        }
        for slot in self.iter_mut() {
            *slot = T::zero();
        }
        true
    }

    fn push_zero(&mut self) -> Option<&mut dyn Reflect> {
        None
    }

    fn assign_from(&mut self, src: &dyn Reflect) -> bool {
        match src.downcast_ref::<[T; N]>() {
            Some(other) => {
                self.clone_from(other);
                true
            }
            None => false,
        }
    }
}

impl<T: Typed, const N: usize> Reflect for [T; N] {
    crate::__reflect_boilerplate!();

    fn reflect_ref(&self) -> ValueRef<'_> {
        ValueRef::Array(self)
    }

    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Array(self)
    }
}

impl<T: Typed, const N: usize> Typed for [T; N] {
    fn shape() -> TypeShape {
        TypeShape::of::<Self>(ShapeKind::Array {
            element: T::shape,
            len: N,
        })
    }

    fn zero() -> Self {
        std::array::from_fn(|_| T::zero())
    }
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

fn insert_typed<K: Typed, V: Typed>(
    key: Box<dyn Reflect>,
    value: Box<dyn Reflect>,
) -> Option<(K, V)> {
    let key = downcast_boxed::<K>(key)?;
    let value = downcast_boxed::<V>(value)?;
    Some((*key, *value))
}

impl<K, V, S> ReflectMap for HashMap<K, V, S>
where
    K: Typed + Eq + Hash,
    V: Typed,
    S: BuildHasher + Default + Clone + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
        Box::new(
            self.iter()
                .map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect)),
        )
    }

    fn fresh_key(&self) -> Box<dyn Reflect> {
        Box::new(K::zero())
    }

    fn fresh_value(&self) -> Box<dyn Reflect> {
        Box::new(V::zero())
    }

    fn insert_boxed(&mut self, key: Box<dyn Reflect>, value: Box<dyn Reflect>) -> bool {
        match insert_typed::<K, V>(key, value) {
            Some((k, v)) => {
                self.insert(k, v);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }

    fn assign_from(&mut self, src: &dyn Reflect) -> bool {
        match src.downcast_ref::<HashMap<K, V, S>>() {
            Some(other) => {
                self.clone_from(other);
                true
            }
            None => false,
        }
    }
}

impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: Typed + Eq + Hash,
    V: Typed,
    S: BuildHasher + Default + Clone + Send + Sync + 'static,
{
    crate::__reflect_boilerplate!();

    fn reflect_ref(&self) -> ValueRef<'_> {
        ValueRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Map(self)
    }
}

impl<K, V, S> Typed for HashMap<K, V, S>
where
    K: Typed + Eq + Hash,
    V: Typed,
    S: BuildHasher + Default + Clone + Send + Sync + 'static,
{
    fn shape() -> TypeShape {
        TypeShape::of::<Self>(ShapeKind::Map {
            key: K::shape,
            value: V::shape,
        })
    }

    fn zero() -> Self {
        HashMap::default()
    }
}

impl<K: Typed + Ord, V: Typed> ReflectMap for BTreeMap<K, V> {
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
        Box::new(
            self.iter()
                .map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect)),
        )
    }

    fn fresh_key(&self) -> Box<dyn Reflect> {
        Box::new(K::zero())
    }

    fn fresh_value(&self) -> Box<dyn Reflect> {
        Box::new(V::zero())
    }

    fn insert_boxed(&mut self, key: Box<dyn Reflect>, value: Box<dyn Reflect>) -> bool {
        match insert_typed::<K, V>(key, value) {
            Some((k, v)) => {
                self.insert(k, v);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        BTreeMap::clear(self);
    }

    fn assign_from(&mut self, src: &dyn Reflect) -> bool {
        match src.downcast_ref::<BTreeMap<K, V>>() {
            Some(other) => {
                self.clone_from(other);
                true
            }
            None => false,
        }
    }
}

impl<K: Typed + Ord, V: Typed> Reflect for BTreeMap<K, V> {
    crate::__reflect_boilerplate!();

    fn reflect_ref(&self) -> ValueRef<'_> {
        ValueRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Map(self)
    }
}

impl<K: Typed + Ord, V: Typed> Typed for BTreeMap<K, V> {
    fn shape() -> TypeShape {
        TypeShape::of::<Self>(ShapeKind::Map {
            key: K::shape,
            value: V::shape,
        })
    }

    fn zero() -> Self {
        BTreeMap::new()
    }
}
