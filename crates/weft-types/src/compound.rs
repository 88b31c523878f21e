// src/compound.rs
//! Uniform navigation over structured values.
//!
//! Every structured type kind implements [`CompoundType`], so path
//! resolution can step into records, arrays, tuples, sums and generics one
//! level at a time without knowing which kind it is looking at.

use weft_identity::PathStep;

use crate::errors::PathError;
use crate::type_ref::TypeRef;
use crate::value::ValueHolder;

/// A child seen through a shared parent.
#[derive(Debug)]
pub struct ChildRef<'v> {
    pub value: &'v ValueHolder,
    pub step: PathStep,
    pub type_ref: TypeRef,
}

/// A writable child slot. The parent has already been made unique.
#[derive(Debug)]
pub struct ChildMut<'v> {
    pub value: &'v mut ValueHolder,
    pub step: PathStep,
    pub type_ref: TypeRef,
}

pub trait CompoundType {
    /// Number of active children of `value`.
    fn num_children(&self, value: &ValueHolder) -> usize;

    fn child<'v>(&self, value: &'v ValueHolder, index: usize) -> Result<ChildRef<'v>, PathError>;

    /// Copy `value` if it is shared, then hand out the child slot.
    fn child_mut<'v>(
        &self,
        value: &'v mut ValueHolder,
        index: usize,
    ) -> Result<ChildMut<'v>, PathError>;

    fn child_index_from_step(&self, value: &ValueHolder, step: &PathStep) -> Option<usize>;

    /// Steps of all active children, in child order.
    fn child_steps(&self, value: &ValueHolder) -> Vec<PathStep> {
        (0..self.num_children(value))
            .filter_map(|i| self.child(value, i).ok().map(|child| child.step))
            .collect()
    }
}

pub(crate) fn out_of_range(index: usize, count: usize) -> PathError {
    PathError::ChildIndexOutOfRange { index, count }
}
