//! Serde deserializer over a tini document tree.
//!
//! A document reads as one map: the keys of the `default` section first,
//! then every other section by name. Sections and dotted-key mappings read
//! as maps or structs; scalars are resolved and coerced into the requested
//! type.

use serde::de::{self, Visitor};
use tini_tree::{DEFAULT_SECTION, Node, NodeKind, Resolved};

use crate::duration;
use crate::error::{Error, Result, TypeError};

/// Deserializer over one node.
///
/// A scalar that does not fit the requested type is recorded in `errors`
/// and the visitor gets that type's zero value, so binding carries on.
pub(crate) struct Deserializer<'a, 'de> {
    node: &'de Node,
    errors: &'a mut Vec<String>,
}

impl<'a, 'de> Deserializer<'a, 'de> {
    pub(crate) fn new(node: &'de Node, errors: &'a mut Vec<String>) -> Self {
        Self { node, errors }
    }

    /// The resolved value, or `None` for composite nodes.
    fn scalar(&self) -> Result<Option<Resolved<'de>>> {
        if !self.node.is_scalar() {
            return Ok(None);
        }
        self.node.resolve().map(Some).map_err(Error::custom)
    }

    fn location(&self) -> String {
        match self.node.line() {
            Some(line) => format!("line {line}: "),
            None => String::new(),
        }
    }

    /// Record that this node cannot be stored in a `target`.
    fn mismatch(&mut self, target: &str) {
        let tag = if self.node.is_scalar() {
            self.node
                .tag
                .or_else(|| self.node.resolve().ok().map(|r| r.tag()))
                .map_or_else(|| "!!str".to_owned(), |tag| tag.to_string())
        } else {
            "!!map".to_owned()
        };
        let message = format!(
            "{}cannot unmarshal {tag} `{}` into {target}",
            self.location(),
            excerpt(&self.node.value)
        );
        self.errors.push(message);
    }

    fn unsupported(&self, what: &str) -> Error {
        Error::new(format!("{}{what} are not supported", self.location()))
    }

    fn signed<V: Visitor<'de>>(
        mut self,
        target: &str,
        min: i64,
        max: i64,
        visitor: V,
    ) -> Result<V::Value> {
        let value = match self.scalar()? {
            Some(Resolved::Null) => Some(0),
            Some(resolved) => to_i64(resolved).filter(|v| (min..=max).contains(v)),
            None => None,
        };
        match value {
            Some(v) => visitor.visit_i64(v),
            None => {
                self.mismatch(target);
                visitor.visit_i64(0)
            }
        }
    }

    fn unsigned<V: Visitor<'de>>(
        mut self,
        target: &str,
        max: u64,
        visitor: V,
    ) -> Result<V::Value> {
        let value = match self.scalar()? {
            Some(Resolved::Null) => Some(0),
            Some(resolved) => to_u64(resolved).filter(|v| *v <= max),
            None => None,
        };
        match value {
            Some(v) => visitor.visit_u64(v),
            None => {
                self.mismatch(target);
                visitor.visit_u64(0)
            }
        }
    }

    fn float<V: Visitor<'de>>(mut self, target: &str, visitor: V) -> Result<V::Value> {
        match self.scalar()? {
            Some(Resolved::Null) => visitor.visit_f64(0.0),
            Some(Resolved::Int(v)) => visitor.visit_f64(v as f64),
            Some(Resolved::Uint(v)) => visitor.visit_f64(v as f64),
            Some(Resolved::Float(v)) => visitor.visit_f64(v),
            _ => {
                self.mismatch(target);
                visitor.visit_f64(0.0)
            }
        }
    }

    fn composite<V: Visitor<'de>>(mut self, target: &str, visitor: V) -> Result<V::Value> {
        match self.scalar()? {
            None => visitor.visit_map(MapAccess::new(entries(self.node), self.errors)),
            Some(Resolved::Null) => visitor.visit_map(MapAccess::new(Vec::new(), self.errors)),
            Some(_) => {
                self.mismatch(target);
                visitor.visit_map(MapAccess::new(Vec::new(), self.errors))
            }
        }
    }

    fn duration<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value> {
        match self.scalar()? {
            Some(Resolved::Null) => visitor.visit_u64(0),
            Some(Resolved::Int(v)) if v >= 0 => visitor.visit_u64(v as u64),
            Some(Resolved::Uint(v)) => visitor.visit_u64(v),
            Some(Resolved::Str(text)) if duration::parse(text).is_ok() => {
                visitor.visit_borrowed_str(text)
            }
            _ => {
                self.mismatch("Duration");
                visitor.visit_u64(0)
            }
        }
    }
}

/// The key/value pairs a node reads as.
fn entries(node: &Node) -> Vec<(&Node, &Node)> {
    if node.kind != NodeKind::Document {
        return node.pairs().collect();
    }
    let mut entries = Vec::new();
    if let Some(default) = node.section(DEFAULT_SECTION) {
        entries.extend(default.pairs());
    }
    entries.extend(node.pairs().filter(|(name, _)| name.value != DEFAULT_SECTION));
    entries
}

/// Values longer than ten characters are cut to their first seven.
fn excerpt(value: &str) -> String {
    if value.chars().count() > 10 {
        let head: String = value.chars().take(7).collect();
        format!("{head}...")
    } else {
        value.to_owned()
    }
}

fn to_i64(resolved: Resolved<'_>) -> Option<i64> {
    match resolved {
        Resolved::Int(v) => Some(v),
        Resolved::Uint(v) => i64::try_from(v).ok(),
        Resolved::Float(v)
            if v.fract() == 0.0 && v >= i64::MIN as f64 && v < -(i64::MIN as f64) =>
        {
            Some(v as i64)
        }
        _ => None,
    }
}

fn to_u64(resolved: Resolved<'_>) -> Option<u64> {
    match resolved {
        Resolved::Int(v) => u64::try_from(v).ok(),
        Resolved::Uint(v) => Some(v),
        Resolved::Float(v) if v.fract() == 0.0 && v >= 0.0 && v < u64::MAX as f64 => Some(v as u64),
        _ => None,
    }
}

impl<'de> de::Deserializer<'de> for Deserializer<'_, 'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.scalar()? {
            None => visitor.visit_map(MapAccess::new(entries(self.node), self.errors)),
            Some(Resolved::Null) => visitor.visit_unit(),
            Some(Resolved::Bool(v)) => visitor.visit_bool(v),
            Some(Resolved::Int(v)) => visitor.visit_i64(v),
            Some(Resolved::Uint(v)) => visitor.visit_u64(v),
            Some(Resolved::Float(v)) => visitor.visit_f64(v),
            Some(Resolved::Str(s)) => visitor.visit_borrowed_str(s),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value> {
        match self.scalar()? {
            Some(Resolved::Null) => visitor.visit_bool(false),
            Some(Resolved::Bool(v)) => visitor.visit_bool(v),
            _ => {
                self.mismatch("bool");
                visitor.visit_bool(false)
            }
        }
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.signed("i8", i8::MIN.into(), i8::MAX.into(), visitor)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.signed("i16", i16::MIN.into(), i16::MAX.into(), visitor)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.signed("i32", i32::MIN.into(), i32::MAX.into(), visitor)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.signed("i64", i64::MIN, i64::MAX, visitor)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.unsigned("u8", u8::MAX.into(), visitor)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.unsigned("u16", u16::MAX.into(), visitor)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.unsigned("u32", u32::MAX.into(), visitor)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.unsigned("u64", u64::MAX, visitor)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.float("f32", visitor)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.float("f64", visitor)
    }

    fn deserialize_char<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value> {
        if self.node.is_scalar() {
            let mut chars = self.node.value.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return visitor.visit_char(c);
            }
        }
        self.mismatch("char");
        visitor.visit_char('\0')
    }

    /// Any scalar reads as its text.
    fn deserialize_str<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value> {
        if self.node.is_scalar() {
            return visitor.visit_borrowed_str(&self.node.value);
        }
        self.mismatch("String");
        visitor.visit_borrowed_str("")
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value> {
        if self.node.is_scalar() {
            return visitor.visit_borrowed_bytes(self.node.value.as_bytes());
        }
        self.mismatch("bytes");
        visitor.visit_borrowed_bytes(&[])
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.scalar()? {
            Some(Resolved::Null) => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value> {
        if !matches!(self.scalar()?, Some(Resolved::Null)) {
            self.mismatch("()");
        }
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        mut self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        if !matches!(self.scalar()?, Some(Resolved::Null)) {
            self.mismatch(name);
        }
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        if name == duration::NAME {
            return self.duration(visitor);
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("sequences"))
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value> {
        Err(self.unsupported("tuples"))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value> {
        Err(self.unsupported("tuple structs"))
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.composite("map", visitor)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.composite(name, visitor)
    }

    /// A scalar names a unit variant; a mapping with a single key holds a
    /// variant and its content.
    fn deserialize_enum<V: Visitor<'de>>(
        mut self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let node = self.node;
        if node.is_scalar() {
            return visitor.visit_enum(EnumAccess {
                variant: node,
                value: None,
                errors: self.errors,
            });
        }
        let mut pairs = entries(node).into_iter();
        if let (Some((variant, value)), None) = (pairs.next(), pairs.next()) {
            return visitor.visit_enum(EnumAccess {
                variant,
                value: Some(value),
                errors: self.errors,
            });
        }
        self.mismatch(name);
        Err(Error::Type(TypeError { errors: Vec::new() }))
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.node.is_scalar() {
            return visitor.visit_borrowed_str(&self.node.value);
        }
        Err(Error::new(format!("{}expected a key, found a mapping", self.location())))
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }
}

/// Map access over key/value node pairs.
struct MapAccess<'a, 'de> {
    entries: std::vec::IntoIter<(&'de Node, &'de Node)>,
    value: Option<&'de Node>,
    errors: &'a mut Vec<String>,
}

impl<'a, 'de> MapAccess<'a, 'de> {
    fn new(entries: Vec<(&'de Node, &'de Node)>, errors: &'a mut Vec<String>) -> Self {
        Self {
            entries: entries.into_iter(),
            value: None,
            errors,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapAccess<'_, 'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        let Some((key, value)) = self.entries.next() else {
            return Ok(None);
        };
        self.value = Some(value);
        seed.deserialize(Deserializer::new(key, &mut *self.errors)).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let value = self
            .value
            .take()
            .ok_or_else(|| Error::new("value requested before its key"))?;
        seed.deserialize(Deserializer::new(value, &mut *self.errors))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

/// Enum access for serde.
struct EnumAccess<'a, 'de> {
    variant: &'de Node,
    value: Option<&'de Node>,
    errors: &'a mut Vec<String>,
}

impl<'a, 'de> de::EnumAccess<'de> for EnumAccess<'a, 'de> {
    type Error = Error;
    type Variant = VariantAccess<'a, 'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let name = de::value::BorrowedStrDeserializer::<Error>::new(&self.variant.value);
        let variant = seed.deserialize(name)?;
        Ok((
            variant,
            VariantAccess {
                variant: self.variant,
                value: self.value,
                errors: self.errors,
            },
        ))
    }
}

/// Variant access for serde.
struct VariantAccess<'a, 'de> {
    variant: &'de Node,
    value: Option<&'de Node>,
    errors: &'a mut Vec<String>,
}

impl VariantAccess<'_, '_> {
    fn expects_value(&self) -> Error {
        Error::new(format!("variant `{}` needs a value", self.variant.value))
    }
}

impl<'de> de::VariantAccess<'de> for VariantAccess<'_, 'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None => Ok(()),
            Some(value) if value.is_scalar() && value.value.is_empty() => Ok(()),
            Some(_) => Err(Error::new(format!(
                "unit variant `{}` takes no value",
                self.variant.value
            ))),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(Deserializer::new(value, self.errors)),
            None => Err(self.expects_value()),
        }
    }

    fn tuple_variant<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::new(format!(
            "tuple variant `{}`: tuples are not supported",
            self.variant.value
        )))
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(value) => de::Deserializer::deserialize_map(
                Deserializer::new(value, self.errors),
                visitor,
            ),
            None => Err(self.expects_value()),
        }
    }
}
