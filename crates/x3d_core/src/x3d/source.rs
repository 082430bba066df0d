//! Tokenized document input.
//!
//! The reader walks any tree implementing [`SourceNode`]. Attribute text is
//! expected to be tokenized already into [`AttrValue`]s. [`DocNode`] is a
//! plain in-memory tree that can also be deserialized with serde.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use x3d_math::{Vec2, Vec3, Vec4};

use crate::x3d::{ImportError, ImportResult};

/// A tokenized attribute value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Bool(bool),
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Color3(Vec3),
    Color4(Vec4),
    /// Axis-angle rotation `(x, y, z, radians)`
    Rotation(Vec4),
    Str(String),
    Bools(Vec<bool>),
    Floats(Vec<f32>),
    Doubles(Vec<f64>),
    Ints(Vec<i32>),
    Vec2s(Vec<Vec2>),
    Vec3s(Vec<Vec3>),
    Color3s(Vec<Vec3>),
    Color4s(Vec<Vec4>),
    Strs(Vec<String>),
}

impl AttrValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Bool(_) => "bool",
            AttrValue::Float(_) => "float",
            AttrValue::Int(_) => "int",
            AttrValue::Vec2(_) => "vec2",
            AttrValue::Vec3(_) => "vec3",
            AttrValue::Color3(_) => "color3",
            AttrValue::Color4(_) => "color4",
            AttrValue::Rotation(_) => "rotation",
            AttrValue::Str(_) => "string",
            AttrValue::Bools(_) => "bool list",
            AttrValue::Floats(_) => "float list",
            AttrValue::Doubles(_) => "double list",
            AttrValue::Ints(_) => "int list",
            AttrValue::Vec2s(_) => "vec2 list",
            AttrValue::Vec3s(_) => "vec3 list",
            AttrValue::Color3s(_) => "color3 list",
            AttrValue::Color4s(_) => "color4 list",
            AttrValue::Strs(_) => "string list",
        }
    }
}

/// One element of a tokenized document.
pub trait SourceNode: Sized {
    /// Element name, e.g. `"Transform"`.
    fn name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&AttrValue>;

    fn children(&self) -> &[Self];

    /// True when the element has no child elements.
    fn is_empty(&self) -> bool {
        self.children().is_empty()
    }
}

/// An in-memory document element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocNode {
    pub name: String,

    #[serde(default)]
    pub attributes: IndexMap<String, AttrValue>,

    #[serde(default)]
    pub children: Vec<DocNode>,
}

impl DocNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an attribute.
    pub fn with(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Append a child element.
    pub fn child(mut self, child: DocNode) -> Self {
        self.children.push(child);
        self
    }
}

impl SourceNode for DocNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

/// Typed attribute access with X3D defaults.
///
/// A missing attribute yields the default; an attribute of the wrong type
/// is an [`ImportError::InvalidAttribute`].
pub struct Attributes<'a, N> {
    node: &'a N,
}

impl<'a, N: SourceNode> Attributes<'a, N> {
    pub fn new(node: &'a N) -> Self {
        Self { node }
    }

    fn get<T>(
        &self,
        name: &str,
        expected: &'static str,
        extract: impl FnOnce(&AttrValue) -> Option<T>,
    ) -> ImportResult<Option<T>> {
        let Some(value) = self.node.attribute(name) else {
            return Ok(None);
        };
        extract(value)
            .map(Some)
            .ok_or_else(|| ImportError::InvalidAttribute {
                node: self.node.name().to_string(),
                attribute: name.to_string(),
                expected,
                found: value.type_name(),
            })
    }

    pub fn bool(&self, name: &str, default: bool) -> ImportResult<bool> {
        let value = self.get(name, "bool", |v| match v {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        })?;
        Ok(value.unwrap_or(default))
    }

    pub fn float(&self, name: &str, default: f32) -> ImportResult<f32> {
        let value = self.get(name, "float", |v| match v {
            AttrValue::Float(f) => Some(*f),
            AttrValue::Int(i) => Some(*i as f32),
            _ => None,
        })?;
        Ok(value.unwrap_or(default))
    }

    pub fn int(&self, name: &str, default: i32) -> ImportResult<i32> {
        let value = self.get(name, "int", |v| match v {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        })?;
        Ok(value.unwrap_or(default))
    }

    pub fn vec2(&self, name: &str, default: Vec2) -> ImportResult<Vec2> {
        let value = self.get(name, "vec2", |v| match v {
            AttrValue::Vec2(v) => Some(*v),
            _ => None,
        })?;
        Ok(value.unwrap_or(default))
    }

    pub fn vec3(&self, name: &str, default: Vec3) -> ImportResult<Vec3> {
        let value = self.get(name, "vec3", |v| match v {
            AttrValue::Vec3(v) | AttrValue::Color3(v) => Some(*v),
            _ => None,
        })?;
        Ok(value.unwrap_or(default))
    }

    pub fn color3(&self, name: &str, default: Vec3) -> ImportResult<Vec3> {
        self.vec3(name, default)
    }

    pub fn rotation(&self, name: &str, default: Vec4) -> ImportResult<Vec4> {
        let value = self.get(name, "rotation", |v| match v {
            AttrValue::Rotation(r) | AttrValue::Color4(r) => Some(*r),
            _ => None,
        })?;
        Ok(value.unwrap_or(default))
    }

    pub fn string(&self, name: &str) -> ImportResult<Option<String>> {
        self.get(name, "string", |v| match v {
            AttrValue::Str(s) => Some(s.clone()),
            _ => None,
        })
    }

    pub fn bools(&self, name: &str) -> ImportResult<Vec<bool>> {
        let value = self.get(name, "bool list", |v| match v {
            AttrValue::Bools(list) => Some(list.clone()),
            AttrValue::Bool(b) => Some(vec![*b]),
            _ => None,
        })?;
        Ok(value.unwrap_or_default())
    }

    pub fn floats(&self, name: &str) -> ImportResult<Vec<f32>> {
        let value = self.get(name, "float list", |v| match v {
            AttrValue::Floats(list) => Some(list.clone()),
            AttrValue::Float(f) => Some(vec![*f]),
            _ => None,
        })?;
        Ok(value.unwrap_or_default())
    }

    pub fn doubles(&self, name: &str) -> ImportResult<Vec<f64>> {
        let value = self.get(name, "double list", |v| match v {
            AttrValue::Doubles(list) => Some(list.clone()),
            AttrValue::Floats(list) => Some(list.iter().map(|&f| f64::from(f)).collect()),
            AttrValue::Float(f) => Some(vec![f64::from(*f)]),
            _ => None,
        })?;
        Ok(value.unwrap_or_default())
    }

    pub fn ints(&self, name: &str) -> ImportResult<Vec<i32>> {
        Ok(self.ints_opt(name)?.unwrap_or_default())
    }

    fn ints_opt(&self, name: &str) -> ImportResult<Option<Vec<i32>>> {
        self.get(name, "int list", |v| match v {
            AttrValue::Ints(list) => Some(list.clone()),
            AttrValue::Int(i) => Some(vec![*i]),
            _ => None,
        })
    }

    /// An int list that must be present and non-empty.
    pub fn required_ints(&self, name: &str) -> ImportResult<Vec<i32>> {
        match self.ints_opt(name)? {
            Some(list) if !list.is_empty() => Ok(list),
            _ => Err(ImportError::MissingAttribute {
                node: self.node.name().to_string(),
                attribute: name.to_string(),
            }),
        }
    }

    pub fn vec2s(&self, name: &str) -> ImportResult<Vec<Vec2>> {
        let value = self.get(name, "vec2 list", |v| match v {
            AttrValue::Vec2s(list) => Some(list.clone()),
            _ => None,
        })?;
        Ok(value.unwrap_or_default())
    }

    pub fn vec3s(&self, name: &str) -> ImportResult<Vec<Vec3>> {
        let value = self.get(name, "vec3 list", |v| match v {
            AttrValue::Vec3s(list) | AttrValue::Color3s(list) => Some(list.clone()),
            _ => None,
        })?;
        Ok(value.unwrap_or_default())
    }

    pub fn color3s(&self, name: &str) -> ImportResult<Vec<Vec3>> {
        self.vec3s(name)
    }

    pub fn color4s(&self, name: &str) -> ImportResult<Vec<Vec4>> {
        let value = self.get(name, "color4 list", |v| match v {
            AttrValue::Color4s(list) => Some(list.clone()),
            _ => None,
        })?;
        Ok(value.unwrap_or_default())
    }

    pub fn strings(&self, name: &str) -> ImportResult<Vec<String>> {
        let value = self.get(name, "string list", |v| match v {
            AttrValue::Strs(list) => Some(list.clone()),
            AttrValue::Str(s) => Some(vec![s.clone()]),
            _ => None,
        })?;
        Ok(value.unwrap_or_default())
    }
}
