mod macros;

/// Returns the version of the folio workspace.
pub fn folio_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub trait Apply {
    /// Applies the function `f` with a mutable reference to `self`.
    fn with<X>(mut self, f: impl FnOnce(&mut Self) -> X) -> Self
    where
        Self: Sized,
    {
        f(&mut self);
        self
    }

    /// Applies the function `f` only if `value` is `Some(...)` and provides the
    /// contained value to `f`.
    ///
    /// #### Example
    /// ```rust
    /// # use folio_utils::Apply;
    /// fn reply_to(builder: Vec<&'static str>, address: Option<&'static str>) -> Vec<&'static str> {
    ///     builder.apply_map(address, |mut slf, address| {
    ///         slf.push(address);
    ///         slf
    ///     })
    /// }
    /// assert_eq!(reply_to(vec![], None), Vec::<&str>::new());
    /// assert_eq!(reply_to(vec![], Some("jane@example.com")), vec!["jane@example.com"]);
    /// ```
    fn apply_map<U>(self, value: Option<U>, f: impl FnOnce(Self, U) -> Self) -> Self
    where
        Self: Sized,
    {
        if let Some(value) = value {
            f(self, value)
        } else {
            self
        }
    }
}

impl<T> Apply for T {}
