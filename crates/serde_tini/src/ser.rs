//! Serde serializer for tini.
//!
//! Values serialize to a [`Node`]: primitives become scalars, structs and
//! maps become mappings. [`to_document`] then lays a top-level mapping out
//! as sections.

use serde::ser::{self, Impossible, Serialize};
use tini_tree::{DEFAULT_SECTION, Node, NodeKind, Tag};

use crate::error::{Error, Result};

/// Serializer producing a [`Node`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Serializer;

/// Spread a top-level mapping over a document: scalar fields go to the
/// `default` section, mapping fields become sections of their own.
pub(crate) fn to_document(root: Node) -> Result<Node> {
    if root.kind != NodeKind::Mapping {
        return Err(Error::new("the top-level value must be a struct or a map"));
    }

    let mut defaults = Node::section_body();
    let mut sections = Vec::new();
    let mut children = root.children.into_iter();
    while let (Some(key), Some(value)) = (children.next(), children.next()) {
        if !value.is_mapping() {
            defaults.insert(key, value);
            continue;
        }
        let mut body = Node::section_body();
        body.children = value.children;
        if key.value == DEFAULT_SECTION {
            let mut pairs = body.children.into_iter();
            while let (Some(key), Some(value)) = (pairs.next(), pairs.next()) {
                defaults.insert(key, value);
            }
        } else {
            sections.push((key, body));
        }
    }

    let mut document = Node::document();
    if !defaults.is_empty() {
        document.insert(Node::scalar(DEFAULT_SECTION), defaults);
    }
    for (name, body) in sections {
        document.insert(name, body);
    }
    Ok(document)
}

fn string(v: &str) -> Node {
    Node::scalar(v).with_tag(Tag::Str)
}

fn null() -> Node {
    Node::scalar("")
}

fn float_text(v: f64, text: String) -> String {
    if v.is_nan() {
        ".nan".to_owned()
    } else if v.is_infinite() {
        let text = if v > 0.0 { ".inf" } else { "-.inf" };
        text.to_owned()
    } else {
        text
    }
}

fn unsupported(what: &str) -> Error {
    Error::new(format!("{what} are not supported"))
}

impl ser::Serializer for Serializer {
    type Ok = Node;
    type Error = Error;

    type SerializeSeq = Impossible<Node, Error>;
    type SerializeTuple = Impossible<Node, Error>;
    type SerializeTupleStruct = Impossible<Node, Error>;
    type SerializeTupleVariant = Impossible<Node, Error>;
    type SerializeMap = MapSerializer;
    type SerializeStruct = MapSerializer;
    type SerializeStructVariant = VariantSerializer;

    fn serialize_bool(self, v: bool) -> Result<Node> {
        Ok(Node::scalar(if v { "true" } else { "false" }))
    }

    fn serialize_i8(self, v: i8) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<Node> {
        Ok(Node::scalar(v.to_string()))
    }

    fn serialize_i128(self, v: i128) -> Result<Node> {
        Ok(Node::scalar(v.to_string()))
    }

    fn serialize_u8(self, v: u8) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<Node> {
        Ok(Node::scalar(v.to_string()))
    }

    fn serialize_u128(self, v: u128) -> Result<Node> {
        Ok(Node::scalar(v.to_string()))
    }

    fn serialize_f32(self, v: f32) -> Result<Node> {
        Ok(Node::scalar(float_text(v as f64, v.to_string())))
    }

    fn serialize_f64(self, v: f64) -> Result<Node> {
        Ok(Node::scalar(float_text(v, v.to_string())))
    }

    fn serialize_char(self, v: char) -> Result<Node> {
        Ok(string(v.encode_utf8(&mut [0; 4])))
    }

    fn serialize_str(self, v: &str) -> Result<Node> {
        Ok(string(v))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Node> {
        Err(unsupported("byte strings"))
    }

    fn serialize_none(self) -> Result<Node> {
        Ok(null())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Node> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node> {
        Ok(null())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node> {
        Ok(null())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node> {
        Ok(string(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Node> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node> {
        let mut mapping = Node::mapping();
        mapping.insert(Node::scalar(variant), value.serialize(Serializer)?);
        Ok(mapping)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(unsupported("sequences"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(unsupported("tuples"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(unsupported("tuple structs"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(unsupported("tuple variants"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapSerializer::new())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(MapSerializer::new())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(VariantSerializer {
            variant,
            fields: MapSerializer::new(),
        })
    }
}

/// Map and struct serializer.
pub struct MapSerializer {
    mapping: Node,
    key: Option<String>,
}

impl MapSerializer {
    fn new() -> Self {
        Self {
            mapping: Node::mapping(),
            key: None,
        }
    }

    fn entry<T: ?Sized + Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = value.serialize(Serializer)?;
        self.mapping.insert(Node::scalar(key), value);
        Ok(())
    }
}

impl ser::SerializeMap for MapSerializer {
    type Ok = Node;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self
            .key
            .take()
            .ok_or_else(|| Error::new("value serialized before its key"))?;
        self.entry(&key, value)
    }

    fn end(self) -> Result<Node> {
        Ok(self.mapping)
    }
}

impl ser::SerializeStruct for MapSerializer {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.entry(key, value)
    }

    fn end(self) -> Result<Node> {
        Ok(self.mapping)
    }
}

/// Struct variant serializer: `{ variant: { fields } }`.
pub struct VariantSerializer {
    variant: &'static str,
    fields: MapSerializer,
}

impl ser::SerializeStructVariant for VariantSerializer {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.fields.entry(key, value)
    }

    fn end(self) -> Result<Node> {
        let mut mapping = Node::mapping();
        mapping.insert(Node::scalar(self.variant), self.fields.mapping);
        Ok(mapping)
    }
}

/// Map keys must be scalars; they serialize to their text.
struct KeySerializer;

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f64(self, v: f64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_owned())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(key_error())
    }

    fn serialize_none(self) -> Result<String> {
        Err(key_error())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<String> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String> {
        Err(key_error())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(key_error())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_owned())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String> {
        Err(key_error())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_error())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_error())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_error())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_error())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_error())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_error())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_error())
    }
}

fn key_error() -> Error {
    Error::new("map keys must be strings, numbers, booleans or unit variants")
}
