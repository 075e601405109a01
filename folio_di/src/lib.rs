//! Minimal compile time dependency injection.
//!
//! A provider owns the leaf dependencies (connections, configs) and a cache of
//! already built services. Every other service derives [`Build`] and is
//! assembled from its fields on first use, then served from the cache.

extern crate self as folio_di;

pub use folio_di_derive::Build;
pub use typemap::TypeMap;

mod macros;
mod typemap;

pub trait Provider: Sized {
    fn get<T: 'static + Clone>(&self) -> Option<T>;
    fn insert<T: 'static>(&mut self, value: T);
}

#[diagnostic::on_unimplemented(
    message = "The type `{Self}` cannot be built using the provider `{P}`",
    note = "Add `{Self}` to the provider `{P}` or implement `Build` for `{Self}` and make sure \
            all dependencies are satisfied"
)]
pub trait Build<P: Provider>: Clone + 'static {
    fn build(provider: &mut P) -> Self;
}

pub trait Provide: Provider {
    fn provide<T: Build<Self>>(&mut self) -> T {
        T::build(self)
    }
}

impl<P: Provider> Provide for P {}
