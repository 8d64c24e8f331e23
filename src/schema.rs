//! Schema declarations and compiled field descriptors

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bound::{Bound, BoundSpec};
use crate::error::Result;
use crate::types::TypeDesc;

/// One field as declared by the embedding application
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Name of the field in the document
    pub name: String,
    /// Declared type
    pub ty: TypeDesc,
    /// Value used when the document omits the field
    pub default: Option<Value>,
}

impl FieldSpec {
    /// Create a field that must be present in every document
    pub fn required(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    /// Create a field that falls back to `default` when absent
    pub fn optional(name: impl Into<String>, ty: TypeDesc, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(default.into()),
        }
    }
}

/// Compiled schema knowledge about a single field.
///
/// Built once by [`SchemaRegistry`](crate::SchemaRegistry); the default has
/// already been checked against the type and bound.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    ty: TypeDesc,
    default: Option<Value>,
    bound: Option<Bound>,
}

impl FieldDescriptor {
    pub(crate) fn new(spec: FieldSpec, bound: Option<Bound>) -> Self {
        Self {
            name: spec.name,
            ty: spec.ty,
            default: spec.default,
            bound,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn bound(&self) -> Option<&Bound> {
        self.bound.as_ref()
    }
}

/// A field entry of a schema file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDeclaration {
    pub name: String,
    /// Type expression, e.g. `List[Dict[str, int]]`
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Schema file contents: the ordered field list plus bounds.
///
/// ```json
/// {
///   "fields": [
///     { "name": "words", "type": "List[str]" },
///     { "name": "max_size", "type": "int", "default": 2 }
///   ],
///   "bounds": [ { "field": "max_size", "lower": 1 } ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDeclaration {
    pub fields: Vec<FieldDeclaration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<BoundSpec>,
}

impl SchemaDeclaration {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Resolve type expressions and bound specs into their typed forms
    pub fn resolve(self) -> Result<(Vec<FieldSpec>, Vec<Bound>)> {
        let fields = self
            .fields
            .into_iter()
            .map(|decl| {
                let ty = TypeDesc::parse_for(&decl.name, &decl.ty)?;
                Ok(FieldSpec {
                    name: decl.name,
                    ty,
                    default: decl.default,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let bounds = self
            .bounds
            .into_iter()
            .map(Bound::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok((fields, bounds))
    }
}
