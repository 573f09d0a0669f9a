//! Optional caster: host None is the disengaged state.

use super::{CastError, Context, FromHost, HostType, IntoHost};
use crate::host::Object;
use crate::signature::Descr;

impl<T: HostType> HostType for Option<T> {
    fn descr() -> Descr {
        Descr::optional(T::descr())
    }
}

impl<T: FromHost> FromHost for Option<T> {
    type Slot = Option<T::Slot>;

    fn load(src: &Object, cx: &Context) -> Result<Self::Slot, CastError> {
        if src.is_none() {
            return Ok(None);
        }
        T::load(src, cx).map(Some)
    }

    fn take(slot: Self::Slot) -> Self {
        slot.map(T::take)
    }
}

impl<T: IntoHost> IntoHost for Option<T> {
    fn into_host(self, cx: &Context) -> Result<Object, CastError> {
        match self {
            Some(value) => value.into_host(cx),
            None => Ok(Object::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Position;

    #[test]
    fn none_is_disengaged() {
        let cx = Context::default();
        assert_eq!(Option::<i64>::from_host(&Object::None, &cx), Ok(None));
        assert_eq!(Option::<i64>::from_host(&Object::Int(3), &cx), Ok(Some(3)));
        assert!(None::<i64>.into_host(&cx).unwrap().is_none());
        assert_eq!(Some(3i64).into_host(&cx), Ok(Object::Int(3)));
    }

    #[test]
    fn engaged_value_goes_through_inner_caster() {
        let cx = Context::default();
        let err = Option::<i64>::from_host(&Object::str("x"), &cx).unwrap_err();
        assert_eq!(err.to_string(), "expected int, got str");
        assert_eq!(
            Option::<Vec<String>>::descr().render(cx.registry(), Position::Argument),
            "Optional[list[str]]"
        );
    }
}
