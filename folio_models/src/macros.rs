macro_rules! nutype_string {
    ($(#[doc = $doc:literal])* $ident:ident($($args:tt)*)) => {
        $(#[doc = $doc])*
        #[::nutype::nutype(
            sanitize(trim),
            $($args)*,
            derive(
                Debug,
                Clone,
                PartialEq,
                Eq,
                Hash,
                Deref,
                AsRef,
                TryFrom,
                Serialize,
                Deserialize
            )
        )]
        pub struct $ident(String);
    };
}

pub(crate) use nutype_string;
