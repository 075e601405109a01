/// Declares a provider struct.
///
/// Plain fields are leaf dependencies handed out by cloning. A `..base: Base {
/// ... }` block forwards the listed types to a nested provider.
#[macro_export]
macro_rules! provider {
    ($(#[doc=$doc:literal])* $vis:vis $ident:ident {
        $( $field:ident: $ty:ty, )*
        $( .. $bfield:ident: $base:ty { $($ity:ty,)* $(,)? } )*
    }) => {
        $(#[doc=$doc])*
        $vis struct $ident {
            _state: $crate::TypeMap,
            $( $field: $ty, )*
            $( $bfield: $base, )*
        }

        impl $crate::Provider for $ident {
            fn get<T: 'static + ::core::clone::Clone>(&self) -> ::core::option::Option<T> {
                self._state.get::<T>().cloned()
            }

            fn insert<T: 'static>(&mut self, value: T) {
                self._state.insert(value);
            }
        }

        $(
            impl $crate::Build<$ident> for $ty {
                fn build(provider: &mut $ident) -> Self {
                    ::core::clone::Clone::clone(&provider.$field)
                }
            }
        )*

        $($(
            impl $crate::Build<$ident> for $ity {
                fn build(provider: &mut $ident) -> Self {
                    $crate::Provide::provide(&mut provider.$bfield)
                }
            }
        )*)*
    };
}
