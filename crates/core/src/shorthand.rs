//! Shorthand list fields
//!
//! Several manifest keys accept either a single value or a list of values:
//!
//! - lifecycle commands, `cacheFrom` and `dockerComposeFile` take a string or an
//!   array of strings ([`StringList`])
//! - `appPorts` additionally takes a bare integer ([`StringIntList`])
//! - each `forwardPorts` element is a number or a `"host:container"` string
//!   ([`PortSpecifier`])
//!
//! Both list shapes are normalized at decode time into an ordered `Vec<String>`
//! so downstream code only ever sees one representation. Values pass through
//! verbatim: no trimming, no deduplication, no case folding.

use crate::errors::UNSUPPORTED_TYPE;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::Value;
use std::fmt;
use std::ops::Deref;

/// A JSON value had a shape the shorthand decoders do not accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedType;

impl fmt::Display for UnsupportedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(UNSUPPORTED_TYPE)
    }
}

impl std::error::Error for UnsupportedType {}

/// Normalize a string-or-array-of-strings value.
///
/// A string becomes a one-element list. An array must hold only strings and
/// keeps its order and duplicates; an empty array yields an empty list. Every
/// other shape, `null` included, is rejected.
///
/// ```
/// use devmanifest_core::shorthand::decode_string_list;
/// use serde_json::json;
///
/// assert_eq!(decode_string_list(json!("echo hi")).unwrap(), vec!["echo hi"]);
/// assert_eq!(decode_string_list(json!(["echo", "hi"])).unwrap(), vec!["echo", "hi"]);
/// assert!(decode_string_list(json!({"bad": "shape"})).is_err());
/// ```
pub fn decode_string_list(value: Value) -> Result<Vec<String>, UnsupportedType> {
    match value {
        Value::String(s) => Ok(vec![s]),
        Value::Array(items) => collect_strings(items),
        _ => Err(UnsupportedType),
    }
}

/// Normalize a string-or-integer-or-array-of-strings value.
///
/// Identical to [`decode_string_list`] except that a bare JSON integer is
/// accepted and rendered in base 10. Integers inside an array are still
/// rejected, as are floats and exponent forms.
///
/// Integers of any width are accepted: `serde_json` is built with
/// `arbitrary_precision`, so the number's text is the source token.
pub fn decode_string_int_list(value: Value) -> Result<Vec<String>, UnsupportedType> {
    match value {
        Value::Number(n) => {
            let token = n.to_string();
            let digits = token.strip_prefix('-').unwrap_or(&token);
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                Ok(vec![token])
            } else {
                Err(UnsupportedType)
            }
        }
        other => decode_string_list(other),
    }
}

fn collect_strings(items: Vec<Value>) -> Result<Vec<String>, UnsupportedType> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => out.push(s),
            _ => return Err(UnsupportedType),
        }
    }
    Ok(out)
}

/// Decode a shorthand field. JSON `null` counts as absent and yields an empty
/// list, same as a missing key.
fn deserialize_shorthand<'de, D>(
    deserializer: D,
    decode: fn(Value) -> Result<Vec<String>, UnsupportedType>,
) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(value) => decode(value).map_err(D::Error::custom),
    }
}

macro_rules! shorthand_list {
    ($(#[$meta:meta])* $name:ident, $decode:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
        pub struct $name(Vec<String>);

        impl $name {
            /// Create from an already-normalized list.
            pub fn new(items: Vec<String>) -> Self {
                Self(items)
            }

            /// Whether no value was supplied (absent, `null` or `[]`).
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn as_slice(&self) -> &[String] {
                &self.0
            }

            pub fn into_inner(self) -> Vec<String> {
                self.0
            }
        }

        impl Deref for $name {
            type Target = [String];

            fn deref(&self) -> &[String] {
                &self.0
            }
        }

        impl From<Vec<String>> for $name {
            fn from(items: Vec<String>) -> Self {
                Self(items)
            }
        }

        impl<'a> From<&'a str> for $name {
            fn from(item: &'a str) -> Self {
                Self(vec![item.to_string()])
            }
        }

        impl IntoIterator for $name {
            type Item = String;
            type IntoIter = std::vec::IntoIter<String>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a String;
            type IntoIter = std::slice::Iter<'a, String>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }

        impl PartialEq<Vec<&str>> for $name {
            fn eq(&self, other: &Vec<&str>) -> bool {
                self.0.len() == other.len() && self.0.iter().zip(other).all(|(a, b)| a == b)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserialize_shorthand(deserializer, $decode).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                self.0.serialize(serializer)
            }
        }
    };
}

shorthand_list!(
    /// A string or array of strings, normalized to an ordered list.
    ///
    /// For lifecycle commands a one-element list came from the shell form
    /// (`"npm install"`) and a longer list from the exec form
    /// (`["npm", "install"]`). The wire shape is not retained beyond that.
    StringList,
    decode_string_list
);

shorthand_list!(
    /// Like [`StringList`] but a bare integer is also accepted and stored
    /// in its decimal text form.
    StringIntList,
    decode_string_int_list
);

/// One `forwardPorts` entry.
///
/// Numbers are kept as the exact JSON number token from the source document,
/// so no width limit or float rounding applies. Strings are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PortSpecifier {
    /// A JSON number, e.g. `3000`
    Number(String),
    /// A JSON string, usually `"host:container"` or `"service:port"`
    Mapping(String),
}

impl PortSpecifier {
    /// The normalized token for this entry.
    pub fn as_str(&self) -> &str {
        match self {
            PortSpecifier::Number(token) | PortSpecifier::Mapping(token) => token,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, PortSpecifier::Mapping(_))
    }

    /// First port number in the entry, if it fits a `u16`.
    ///
    /// `3000` and `"3000"` give 3000; `"3000:8080"` gives 3000.
    /// `"db:5432"` gives `None`.
    pub fn primary_port(&self) -> Option<u16> {
        self.as_str().split(':').next()?.parse().ok()
    }
}

impl fmt::Display for PortSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PortSpecifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let token = raw.get().trim();
        match token.as_bytes().first() {
            Some(b'"') => serde_json::from_str::<String>(token)
                .map(PortSpecifier::Mapping)
                .map_err(D::Error::custom),
            Some(b'-' | b'0'..=b'9') => Ok(PortSpecifier::Number(token.to_string())),
            _ => Err(D::Error::custom(UnsupportedType)),
        }
    }
}

impl Serialize for PortSpecifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::Error as _;

        match self {
            PortSpecifier::Number(token) => RawValue::from_string(token.clone())
                .map_err(S::Error::custom)?
                .serialize(serializer),
            PortSpecifier::Mapping(text) => serializer.serialize_str(text),
        }
    }
}
