//! Serde support for the tini configuration format.
//!
//! A document reads as one map: keys of the `default` section (the keys
//! before any `[header]`) and every section by name. Sections and dotted
//! keys bind to structs and maps; scalars are coerced into the field types.
//!
//! # Deserialization Example
//!
//! ```
//! use serde::Deserialize;
//! use serde_tini::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Database {
//!     host: String,
//!     port: u16,
//! }
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Config {
//!     name: String,
//!     database: Database,
//! }
//!
//! let ini = "name = myapp\n[database]\nhost = localhost\nport = 5432\n";
//! let config: Config = from_str(ini).unwrap();
//! assert_eq!(config.name, "myapp");
//! assert_eq!(config.database.port, 5432);
//! ```
//!
//! # Serialization Example
//!
//! ```
//! use serde::Serialize;
//! use serde_tini::to_string;
//!
//! #[derive(Serialize)]
//! struct Config {
//!     name: String,
//!     port: u16,
//! }
//!
//! let config = Config { name: "myapp".into(), port: 8080 };
//! let ini = to_string(&config).unwrap();
//! assert_eq!(ini, "name = myapp\nport = 8080\n");
//! ```
//!
//! # Type errors
//!
//! A scalar that does not fit its field does not stop binding. Every such
//! field is reported together in one [`TypeError`]:
//!
//! ```
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug)]
//! struct Limits {
//!     workers: u8,
//!     ratio: f32,
//! }
//!
//! let err = serde_tini::from_str::<Limits>("workers = 300\nratio = high\n").unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "ini: unmarshal errors:\n  line 1: cannot unmarshal !!int `300` into u8\n  line 2: cannot unmarshal !!str `high` into f32"
//! );
//! ```

use std::io::Read;

use serde::de::{Deserialize, DeserializeOwned};
use serde::ser::Serialize;
use tini_tree::Node;

mod de;
pub mod duration;
mod error;
mod ser;

pub use error::{Error, Result, TypeError};
pub use ser::Serializer;
pub use tini_format::{FormatOptions, QuoteStyle};

/// Deserialize a value from a tini string.
///
/// # Example
///
/// ```
/// use serde::Deserialize;
/// use serde_tini::from_str;
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let person: Person = from_str("name = Alice\nage = 30").unwrap();
/// assert_eq!(person.name, "Alice");
/// assert_eq!(person.age, 30);
/// ```
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let document = tini_tree::parse_str(s)?;
    from_node(&document)
}

/// Deserialize a value from raw bytes. The input must be UTF-8.
pub fn from_slice<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let document = tini_tree::parse(bytes)?;
    from_node(&document)
}

/// Read a stream to the end and deserialize a value from it.
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: Read,
    T: DeserializeOwned,
{
    let document = tini_tree::parse_reader(reader)?;
    from_node(&document)
}

/// Deserialize a value from an already parsed document, section or value.
///
/// Borrowed strings (`&str` fields) point into the tree.
pub fn from_node<'de, T>(node: &'de Node) -> Result<T>
where
    T: Deserialize<'de>,
{
    let mut errors = Vec::new();
    let result = T::deserialize(de::Deserializer::new(node, &mut errors));
    finish(result, errors)
}

/// Merge the collected type errors into the outcome of a bind.
fn finish<T>(result: Result<T>, mut errors: Vec<String>) -> Result<T> {
    match result {
        Ok(value) if errors.is_empty() => Ok(value),
        Ok(_) => Err(Error::Type(TypeError { errors })),
        Err(Error::Type(err)) => {
            errors.extend(err.errors);
            Err(Error::Type(TypeError { errors }))
        }
        Err(err) => Err(err),
    }
}

/// Serialize a value to a document tree.
///
/// The value must serialize as a struct or a map. Its scalar fields land in
/// the `default` section, its struct and map fields become sections.
pub fn to_node<T>(value: &T) -> Result<Node>
where
    T: Serialize + ?Sized,
{
    ser::to_document(value.serialize(Serializer)?)
}

/// Serialize a value to a tini string.
///
/// # Example
///
/// ```
/// use serde::Serialize;
/// use serde_tini::to_string;
///
/// #[derive(Serialize)]
/// struct Tls {
///     enabled: bool,
/// }
///
/// #[derive(Serialize)]
/// struct Server {
///     host: String,
///     tls: Tls,
/// }
///
/// #[derive(Serialize)]
/// struct Config {
///     server: Server,
/// }
///
/// let config = Config {
///     server: Server { host: "localhost".into(), tls: Tls { enabled: true } },
/// };
/// assert_eq!(
///     to_string(&config).unwrap(),
///     "[server]\nhost = localhost\ntls.enabled = true\n"
/// );
/// ```
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    to_string_with_options(value, &FormatOptions::default())
}

/// Serialize a value to a tini string with custom options.
pub fn to_string_with_options<T>(value: &T, options: &FormatOptions) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let document = to_node(value)?;
    Ok(tini_format::format_document(&document, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Simple {
        name: String,
        value: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Inner {
        x: i32,
        y: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Nested {
        name: String,
        point: Inner,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Level {
        Debug,
        Info,
        Warn,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct WithEnum {
        level: Level,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct WithOption {
        required: String,
        optional: Option<String>,
    }

    #[test]
    fn test_simple() {
        let value: Simple = from_str("name = hello\nvalue = 42").unwrap();
        assert_eq!(
            value,
            Simple {
                name: "hello".into(),
                value: 42
            }
        );
    }

    #[test]
    fn test_nested_from_section() {
        let value: Nested = from_str("name = test\n[point]\nx = 10\ny = 20\n").unwrap();
        assert_eq!(value.point, Inner { x: 10, y: 20 });
    }

    #[test]
    fn test_nested_from_dotted_keys() {
        let value: Nested = from_str("name = test\npoint.x = 1\npoint.y = -2\n").unwrap();
        assert_eq!(value.point, Inner { x: 1, y: -2 });
    }

    #[test]
    fn test_enum() {
        let value: WithEnum = from_str("level = warn").unwrap();
        assert_eq!(value.level, Level::Warn);
        assert_eq!(to_string(&WithEnum { level: Level::Info }).unwrap(), "level = info\n");
        assert!(from_str::<WithEnum>("level = trace").is_err());
    }

    #[test]
    fn test_option() {
        let some: WithOption = from_str("required = a\noptional = b").unwrap();
        assert_eq!(some.optional.as_deref(), Some("b"));

        let null: WithOption = from_str("required = a\noptional =").unwrap();
        assert_eq!(null.optional, None);

        let missing: WithOption = from_str("required = a").unwrap();
        assert_eq!(missing.optional, None);
    }

    #[test]
    fn test_option_serializes_as_empty_value() {
        let value = WithOption {
            required: "a".into(),
            optional: None,
        };
        let text = to_string(&value).unwrap();
        assert_eq!(text, "required = a\noptional =\n");
        assert_eq!(from_str::<WithOption>(&text).unwrap(), value);
    }

    #[test]
    fn test_quoted_string_stays_string() {
        let value: Simple = from_str("name = \"42\"\nvalue = 1").unwrap();
        assert_eq!(value.name, "42");
        let text = to_string(&value).unwrap();
        assert_eq!(text, "name = \"42\"\nvalue = 1\n");
    }

    #[test]
    fn test_plain_number_into_string() {
        let value: Simple = from_str("name = 42\nvalue = 1").unwrap();
        assert_eq!(value.name, "42");
    }

    #[test]
    fn test_map_of_sections() {
        let text = "[alpha]\nx = 1\ny = 2\n[beta]\nx = 3\ny = 4\n";
        let map: BTreeMap<String, Inner> = from_str(text).unwrap();
        assert_eq!(map["alpha"], Inner { x: 1, y: 2 });
        assert_eq!(map["beta"], Inner { x: 3, y: 4 });
    }

    #[test]
    fn test_from_slice_and_reader() {
        let bytes = b"name = bytes\nvalue = 7\n";
        let a: Simple = from_slice(bytes).unwrap();
        let b: Simple = from_reader(&bytes[..]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_node_section() {
        let document = tini_tree::parse_str("[point]\nx = 5\ny = 6\n").unwrap();
        let point: Inner = from_node(document.section("point").unwrap()).unwrap();
        assert_eq!(point, Inner { x: 5, y: 6 });
    }

    #[test]
    fn test_borrowed_str() {
        #[derive(Deserialize)]
        struct Borrowed<'a> {
            name: &'a str,
        }

        let document = tini_tree::parse_str("name = borrowed").unwrap();
        let value: Borrowed<'_> = from_node(&document).unwrap();
        assert_eq!(value.name, "borrowed");
    }

    #[test]
    fn test_parse_error_passes_through() {
        let err = from_str::<Simple>("[broken\n").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().starts_with("ini: line 1: "));
    }

    #[test]
    fn test_collects_every_type_error() {
        let err = from_str::<Simple>("name = x\nvalue = 2.5\n").unwrap_err();
        let Error::Type(type_error) = err else {
            panic!("expected a type error, got {err:?}");
        };
        assert_eq!(
            type_error.errors,
            ["line 2: cannot unmarshal !!float `2.5` into i32"]
        );
    }

    #[test]
    fn test_roundtrip_nested() {
        let value = Nested {
            name: "origin".into(),
            point: Inner { x: 0, y: 0 },
        };
        let text = to_string(&value).unwrap();
        assert_eq!(text, "name = origin\n\n[point]\nx = 0\ny = 0\n");
        assert_eq!(from_str::<Nested>(&text).unwrap(), value);
    }

    #[test]
    fn test_compact_options() {
        let value = Simple {
            name: "c".into(),
            value: 3,
        };
        let text = to_string_with_options(&value, &FormatOptions::default().compact()).unwrap();
        assert_eq!(text, "name=c\nvalue=3\n");
    }

    #[test]
    fn test_top_level_scalar_rejected() {
        assert!(to_string(&5).is_err());
    }
}
