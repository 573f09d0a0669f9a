//! Argument lists
//!
//! Native functions take their arguments as a tuple. These traits convert a
//! whole argument list at once, for arities 0 through 6.

use super::{CastError, Context, FromHost, HostType, IntoHost, IntoReturn};
use crate::host::Object;
use crate::signature::Descr;

/// A tuple of argument types.
pub trait ArgList {
    const ARITY: usize;

    fn descrs() -> Vec<Descr>;
}

/// Argument lists that can be decoded from host objects.
pub trait NativeArgs: ArgList + Sized {
    type Slots;

    /// Load every argument. Nothing is constructed unless all loads succeed.
    fn load(args: &[Object], cx: &Context) -> Result<Self::Slots, CastError>;

    fn take(slots: Self::Slots) -> Self;
}

/// Argument lists that can be encoded to host objects.
pub trait HostArgs: ArgList {
    fn into_objects(self, cx: &Context) -> Result<Vec<Object>, CastError>;
}

/// A native function callable with the argument tuple `Args`.
pub trait NativeFn<Args>: 'static {
    type Output: IntoReturn;

    fn call(&self, args: Args) -> Self::Output;
}

fn check_arity(expected: usize, args: &[Object]) -> Result<(), CastError> {
    if args.len() != expected {
        return Err(CastError::LengthMismatch {
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

macro_rules! arg_list {
    ($len:literal; $($A:ident $idx:tt),*) => {
        impl<$($A: HostType),*> ArgList for ($($A,)*) {
            const ARITY: usize = $len;

            fn descrs() -> Vec<Descr> {
                vec![$($A::descr()),*]
            }
        }

        impl<$($A: FromHost),*> NativeArgs for ($($A,)*) {
            type Slots = ($($A::Slot,)*);

            #[allow(unused_variables)]
            fn load(args: &[Object], cx: &Context) -> Result<Self::Slots, CastError> {
                check_arity($len, args)?;
                Ok(($($A::load(&args[$idx], cx).map_err(|e| e.at($idx))?,)*))
            }

            #[allow(unused_variables, clippy::unused_unit)]
            fn take(slots: Self::Slots) -> Self {
                ($($A::take(slots.$idx),)*)
            }
        }

        impl<$($A: IntoHost),*> HostArgs for ($($A,)*) {
            #[allow(unused_variables)]
            fn into_objects(self, cx: &Context) -> Result<Vec<Object>, CastError> {
                Ok(vec![$(self.$idx.into_host(cx)?),*])
            }
        }

        impl<Func, Out, $($A),*> NativeFn<($($A,)*)> for Func
        where
            Func: Fn($($A),*) -> Out + 'static,
            Out: IntoReturn,
        {
            type Output = Out;

            #[allow(unused_variables)]
            fn call(&self, args: ($($A,)*)) -> Out {
                (self)($(args.$idx),*)
            }
        }
    };
}

arg_list!(0;);
arg_list!(1; A0 0);
arg_list!(2; A0 0, A1 1);
arg_list!(3; A0 0, A1 1, A2 2);
arg_list!(4; A0 0, A1 1, A2 2, A3 3);
arg_list!(5; A0 0, A1 1, A2 2, A3 3, A4 4);
arg_list!(6; A0 0, A1 1, A2 2, A3 3, A4 4, A5 5);

#[cfg(test)]
mod tests {
    use super::*;

    fn invoke<Args: NativeArgs, F: NativeFn<Args>>(f: F, args: &[Object]) -> Result<F::Output, CastError> {
        let cx = Context::default();
        let slots = Args::load(args, &cx)?;
        Ok(f.call(Args::take(slots)))
    }

    #[test]
    fn calls_with_decoded_arguments() {
        let out = invoke(|a: i64, b: String| format!("{b}{a}"), &[Object::Int(1), Object::str("x")]);
        assert_eq!(out, Ok("x1".to_string()));
        let unit = invoke(|| 7i64, &[]);
        assert_eq!(unit, Ok(7));
    }

    #[test]
    fn any_bad_argument_fails_the_load() {
        let err = invoke(|a: i64, b: i64| a + b, &[Object::Int(1), Object::None]).unwrap_err();
        assert!(matches!(err, CastError::Index(1, _)));
        let err = invoke(|a: i64| a, &[]).unwrap_err();
        assert_eq!(err, CastError::LengthMismatch { expected: 1, got: 0 });
    }

    #[test]
    fn encodes_argument_tuples() {
        let cx = Context::default();
        let objects = (1i64, "two".to_string()).into_objects(&cx).unwrap();
        assert_eq!(objects, vec![Object::Int(1), Object::str("two")]);
        assert_eq!(<(i64, bool)>::ARITY, 2);
        assert_eq!(<()>::ARITY, 0);
    }
}
