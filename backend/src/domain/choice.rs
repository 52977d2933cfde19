//! Helper macro for closed sets of string literals accepted from forms.

/// Define a `snake_case` string enum with storage and parsing helpers.
///
/// Generated items: `ALL`, `as_str`, `parse` (returning a
/// [`FieldError`](crate::domain::FieldError) listing the accepted values),
/// `Display`, plus serde and utoipa derives.
macro_rules! choice_enum {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $literal:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::utoipa::ToSchema,
        )]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $literal)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Storage and wire representation.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $literal,)+
                }
            }

            /// Parse a wire value, listing the accepted literals on failure.
            pub fn parse(raw: impl AsRef<str>) -> Result<Self, $crate::domain::FieldError> {
                match raw.as_ref().trim() {
                    $($literal => Ok(Self::$variant),)+
                    _ => {
                        let accepted: Vec<&str> =
                            Self::ALL.iter().map(|value| value.as_str()).collect();
                        Err($crate::domain::FieldError::new(
                            $crate::domain::ViolationCode::InvalidChoice,
                            format!("must be one of: {}", accepted.join(", ")),
                        ))
                    }
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use choice_enum;
