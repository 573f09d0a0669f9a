//! Native class casters and calling conventions
//!
//! | Convention            | Native parameter | Crossing cost                |
//! |-----------------------|------------------|------------------------------|
//! | by value              | `T`              | one copy-construct           |
//! | by lvalue reference   | [`Ref<T>`]       | none (alias)                 |
//! | by pointer            | [`Ptr<T>`]       | none (alias, nullable)       |
//! | by rvalue reference   | [`RvRef<T>`]     | none until [`RvRef::take`]   |
//! | return by value       | `T`              | one move-construct           |
//! | return by pointer     | `Box<T>`         | none (adopted)               |
//!
//! By-value casters for a concrete class are generated with
//! [`impl_class!`](crate::impl_class).

use std::any::type_name;
use std::cell::{self, RefCell};
use std::rc::Rc;

use super::{CastError, Context, FromHost, HostType, IntoHost};
use crate::host::{Instance, Object};
use crate::signature::Descr;

/// A native value type whose lifecycle the casters drive.
pub trait Class: Sized + 'static {
    /// `false` for move-only types; passing those by value is rejected.
    const COPYABLE: bool = true;

    fn copy_construct(&self) -> Self;

    /// Construct a new value from `self`, leaving `self` moved-from. Types
    /// without a dedicated move fall back to copying.
    fn move_construct(&mut self) -> Self {
        self.copy_construct()
    }
}

/// Alias the native storage behind `src`, if it wraps a `T`.
fn alias<T: Class>(src: &Object, cx: &Context) -> Result<(Instance, Rc<RefCell<T>>), CastError> {
    src.as_instance()
        .and_then(|inst| inst.cell::<T>().map(|cell| (inst.clone(), cell)))
        .ok_or_else(|| cx.mismatch::<Ref<T>>(src))
}

/// Load step of a by-value class argument.
pub fn load_by_value<T: Class>(src: &Object, cx: &Context) -> Result<Ref<T>, CastError> {
    let slot = Ref::<T>::load(src, cx)?;
    if !T::COPYABLE {
        return Err(CastError::NotCopyable(type_name::<T>()));
    }
    // Nothing runs between load and take, so a copy that can borrow now
    // can borrow then.
    drop(slot.try_get()?);
    Ok(slot)
}

/// Move a native return value into a new host instance.
///
/// The value is move-constructed into host-owned storage and the native
/// temporary is destructed.
pub fn into_host_by_value<T: Class>(mut value: T, cx: &Context) -> Result<Object, CastError> {
    let name = cx
        .registry()
        .get::<T>()
        .map(|entry| Rc::clone(&entry.name))
        .ok_or(CastError::Unregistered(type_name::<T>()))?;
    let moved = value.move_construct();
    drop(value);
    tracing::trace!(class = %name, "moved return value into host");
    Ok(Object::Instance(Instance::new(name, moved)))
}

fn adopt<T: Class>(cell: Rc<RefCell<T>>, cx: &Context) -> Result<Object, CastError> {
    let name = cx
        .registry()
        .get::<T>()
        .map(|entry| Rc::clone(&entry.name))
        .ok_or(CastError::Unregistered(type_name::<T>()))?;
    Ok(Object::Instance(Instance::from_cell(name, cell)))
}

// ============================================================================
// Ref - lvalue reference
// ============================================================================

/// An alias of a native value owned by a host object.
pub struct Ref<T> {
    instance: Instance,
    cell: Rc<RefCell<T>>,
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            instance: self.instance.clone(),
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: 'static> Ref<T> {
    /// Panics if the value is mutably borrowed; see [`Ref::try_get`].
    pub fn get(&self) -> cell::Ref<'_, T> {
        self.cell.borrow()
    }

    /// Panics if the value is borrowed; see [`Ref::try_get_mut`].
    pub fn get_mut(&self) -> cell::RefMut<'_, T> {
        self.cell.borrow_mut()
    }

    /// Shared access that fails while another alias of the same host
    /// object holds mutable access.
    pub fn try_get(&self) -> Result<cell::Ref<'_, T>, CastError> {
        self.cell
            .try_borrow()
            .map_err(|_| CastError::Borrowed(type_name::<T>()))
    }

    pub fn try_get_mut(&self) -> Result<cell::RefMut<'_, T>, CastError> {
        self.cell
            .try_borrow_mut()
            .map_err(|_| CastError::Borrowed(type_name::<T>()))
    }

    /// The host object this alias refers to.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }
}

impl<T: Class> HostType for Ref<T> {
    fn descr() -> Descr {
        Descr::class::<T>()
    }
}

impl<T: Class> FromHost for Ref<T> {
    type Slot = Self;

    fn load(src: &Object, cx: &Context) -> Result<Self, CastError> {
        let (instance, cell) = alias::<T>(src, cx)?;
        Ok(Ref { instance, cell })
    }

    fn take(slot: Self) -> Self {
        slot
    }
}

impl<T: Class> IntoHost for Ref<T> {
    fn into_host(self, _cx: &Context) -> Result<Object, CastError> {
        Ok(Object::Instance(self.instance))
    }
}

// ============================================================================
// RvRef - rvalue reference
// ============================================================================

/// An alias that the callee may consume.
pub struct RvRef<T>(Ref<T>);

impl<T: Class> RvRef<T> {
    pub fn get(&self) -> cell::Ref<'_, T> {
        self.0.get()
    }

    pub fn get_mut(&self) -> cell::RefMut<'_, T> {
        self.0.get_mut()
    }

    pub fn try_get(&self) -> Result<cell::Ref<'_, T>, CastError> {
        self.0.try_get()
    }

    pub fn try_get_mut(&self) -> Result<cell::RefMut<'_, T>, CastError> {
        self.0.try_get_mut()
    }

    /// Move-construct a new value out of the referenced one, leaving the
    /// source moved-from. Fails while any other alias borrows it.
    pub fn take(&self) -> Result<T, CastError> {
        Ok(self.0.try_get_mut()?.move_construct())
    }
}

impl<T: Class> HostType for RvRef<T> {
    fn descr() -> Descr {
        Descr::class::<T>()
    }
}

impl<T: Class> FromHost for RvRef<T> {
    type Slot = Self;

    fn load(src: &Object, cx: &Context) -> Result<Self, CastError> {
        Ref::load(src, cx).map(RvRef)
    }

    fn take(slot: Self) -> Self {
        slot
    }
}

// ============================================================================
// Ptr - nullable pointer
// ============================================================================

/// A nullable alias; the host's None is the null pointer.
pub struct Ptr<T>(Option<Ref<T>>);

impl<T> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        Ptr(self.0.clone())
    }
}

impl<T: Class> Ptr<T> {
    pub fn null() -> Self {
        Ptr(None)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn get(&self) -> Option<cell::Ref<'_, T>> {
        self.0.as_ref().map(Ref::get)
    }

    pub fn as_alias(&self) -> Option<&Ref<T>> {
        self.0.as_ref()
    }
}

impl<T> From<Ref<T>> for Ptr<T> {
    fn from(r: Ref<T>) -> Self {
        Ptr(Some(r))
    }
}

impl<T: Class> HostType for Ptr<T> {
    fn descr() -> Descr {
        Descr::class::<T>()
    }
}

impl<T: Class> FromHost for Ptr<T> {
    type Slot = Self;

    fn load(src: &Object, cx: &Context) -> Result<Self, CastError> {
        if src.is_none() {
            return Ok(Ptr(None));
        }
        Ref::load(src, cx).map(|r| Ptr(Some(r)))
    }

    fn take(slot: Self) -> Self {
        slot
    }
}

impl<T: Class> IntoHost for Ptr<T> {
    fn into_host(self, cx: &Context) -> Result<Object, CastError> {
        match self.0 {
            Some(r) => r.into_host(cx),
            None => Ok(Object::None),
        }
    }
}

// ============================================================================
// Box - return by pointer
// ============================================================================

impl<T: Class> HostType for Box<T> {
    fn descr() -> Descr {
        Descr::class::<T>()
    }
}

impl<T: Class> IntoHost for Box<T> {
    fn into_host(self, cx: &Context) -> Result<Object, CastError> {
        adopt(Rc::new(RefCell::new(*self)), cx)
    }
}

/// Implement by-value casters for native classes.
///
/// The class must implement [`Class`](crate::cast::Class) and be registered
/// with the module before values of it can be returned.
#[macro_export]
macro_rules! impl_class {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::cast::HostType for $ty {
            fn descr() -> $crate::signature::Descr {
                $crate::signature::Descr::class::<$ty>()
            }
        }

        impl $crate::cast::FromHost for $ty {
            type Slot = $crate::cast::Ref<$ty>;

            fn load(
                src: &$crate::host::Object,
                cx: &$crate::cast::Context,
            ) -> ::core::result::Result<Self::Slot, $crate::cast::CastError> {
                $crate::cast::load_by_value::<$ty>(src, cx)
            }

            // `load_by_value` already checked that the source can be borrowed.
            fn take(slot: Self::Slot) -> Self {
                $crate::cast::Class::copy_construct(&*slot.get())
            }
        }

        impl $crate::cast::IntoHost for $ty {
            fn into_host(
                self,
                cx: &$crate::cast::Context,
            ) -> ::core::result::Result<$crate::host::Object, $crate::cast::CastError> {
                $crate::cast::into_host_by_value(self, cx)
            }
        }
    )+};
}
