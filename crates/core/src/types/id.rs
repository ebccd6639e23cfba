//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`uuid::Uuid`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `new_random()`, `as_uuid()`
/// - `From<Uuid>` and `Into<Uuid>` implementations
/// - `FromStr` parsing from the canonical hyphenated form
///
/// # Example
///
/// ```rust
/// # use widgetvault_core::define_id;
/// define_id!(WidgetId);
/// define_id!(OwnerId);
///
/// let widget_id = WidgetId::new_random();
/// let owner_id = OwnerId::new_random();
///
/// // These are different types, so this won't compile:
/// // let _: WidgetId = owner_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Create a new ID from a `Uuid` value.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Create a new ID from a freshly generated random (v4) `Uuid`.
            #[must_use]
            pub fn new_random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Get the underlying `Uuid` value.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.parse::<::uuid::Uuid>().map(Self)
            }
        }
    };
}

// Define standard entity IDs
define_id!(WidgetId);
define_id!(CategoryId);
define_id!(TagId);
define_id!(UserId);
