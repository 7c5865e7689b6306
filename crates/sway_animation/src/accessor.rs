//! Target handles and the accessor registry
//!
//! Tweens never touch a target's fields directly. The host registers one
//! [`TweenAccessor`] per target type in an [`AccessorRegistry`]; a tween
//! resolves it when it is created and reads/writes numbered channels
//! through it afterwards.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::{BuildError, Result};

/// Shared handle to an animated object
pub type Target<T> = Rc<RefCell<T>>;

/// Identity of a target, used for cancellation lookups
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetId(usize);

impl TargetId {
    pub fn of<T>(target: &Target<T>) -> Self {
        TargetId(Rc::as_ptr(target) as *const () as usize)
    }
}

/// Reads and writes the numeric channels of a target type.
///
/// `tween_type` selects a property group (position, color, ...), each with a
/// fixed number of channels.
pub trait TweenAccessor<T>: 'static {
    /// Number of channels exposed for `tween_type`
    fn channels(&self, tween_type: u32) -> usize;

    fn get(&self, target: &T, tween_type: u32, channel: usize) -> f32;

    fn set(&self, target: &mut T, tween_type: u32, channel: usize, value: f32);

    fn get_values(&self, target: &T, tween_type: u32, out: &mut [f32]) {
        for (channel, slot) in out.iter_mut().enumerate() {
            *slot = self.get(target, tween_type, channel);
        }
    }

    fn set_values(&self, target: &mut T, tween_type: u32, values: &[f32]) {
        for (channel, value) in values.iter().enumerate() {
            self.set(target, tween_type, channel, *value);
        }
    }
}

/// Maps target types to their accessors.
///
/// Built once at setup and shared immutably afterwards.
#[derive(Default)]
pub struct AccessorRegistry {
    accessors: FxHashMap<TypeId, Box<dyn Any>>,
}

impl AccessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register the accessor for `T`
    pub fn with<T: 'static, A: TweenAccessor<T>>(mut self, accessor: A) -> Self {
        self.register(accessor);
        self
    }

    /// Register (or replace) the accessor for `T`
    pub fn register<T: 'static, A: TweenAccessor<T>>(&mut self, accessor: A) {
        let accessor: Rc<dyn TweenAccessor<T>> = Rc::new(accessor);
        self.accessors.insert(TypeId::of::<T>(), Box::new(accessor));
    }

    pub fn get<T: 'static>(&self) -> Option<Rc<dyn TweenAccessor<T>>> {
        self.accessors
            .get(&TypeId::of::<T>())?
            .downcast_ref::<Rc<dyn TweenAccessor<T>>>()
            .cloned()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.accessors.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    /// Pair a target with its registered accessor
    pub(crate) fn bind<T: 'static>(&self, target: &Target<T>) -> Result<Box<dyn Binding>> {
        let accessor = self
            .get::<T>()
            .ok_or_else(|| BuildError::MissingAccessor {
                type_name: type_name::<T>(),
            })?;
        Ok(Box::new(Bound {
            target: target.clone(),
            accessor,
        }))
    }
}

/// A target with its accessor, type-erased for storage in a tween
pub(crate) trait Binding {
    fn target_id(&self) -> TargetId;

    fn channels(&self, tween_type: u32) -> usize;

    fn read(&self, tween_type: u32, out: &mut [f32]);

    fn write(&self, tween_type: u32, values: &[f32]);
}

struct Bound<T> {
    target: Target<T>,
    accessor: Rc<dyn TweenAccessor<T>>,
}

impl<T: 'static> Binding for Bound<T> {
    fn target_id(&self) -> TargetId {
        TargetId::of(&self.target)
    }

    fn channels(&self, tween_type: u32) -> usize {
        self.accessor.channels(tween_type)
    }

    fn read(&self, tween_type: u32, out: &mut [f32]) {
        self.accessor
            .get_values(&self.target.borrow(), tween_type, out);
    }

    fn write(&self, tween_type: u32, values: &[f32]) {
        self.accessor
            .set_values(&mut self.target.borrow_mut(), tween_type, values);
    }
}
