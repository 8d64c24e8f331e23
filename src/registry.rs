//! Schema Registry
//!
//! Compiles a schema (fields, bounds and an optional custom validation) into
//! field descriptors once, then parses any number of documents against it.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::bound::Bound;
use crate::config::{ParserConfig, UnknownFieldPolicy};
use crate::error::{ConfigError, Result};
use crate::schema::{FieldDescriptor, FieldSpec, SchemaDeclaration};
use crate::types::TypeDesc;
use crate::validation;

/// Gathered mapping from field name to validated value
pub type Args = Map<String, Value>;

/// Custom validation run on the gathered mapping after every field passed.
///
/// It receives its own copy of the mapping. Returning `Ok(Some(map))` with a
/// non-empty map replaces the result; `Ok(None)` keeps the gathered mapping.
pub type ExtraValidation = Box<dyn Fn(Args) -> anyhow::Result<Option<Args>> + Send + Sync>;

/// Box a closure as the custom validation of a registry
pub fn custom_validation<F>(f: F) -> Option<ExtraValidation>
where
    F: Fn(Args) -> anyhow::Result<Option<Args>> + Send + Sync + 'static,
{
    Some(Box::new(f))
}

/// The compiled schema
pub struct SchemaRegistry {
    /// Field names in declaration order
    field_names: Vec<String>,
    descriptors: HashMap<String, FieldDescriptor>,
    extra_validation: Option<ExtraValidation>,
    unknown_fields: UnknownFieldPolicy,
}

impl SchemaRegistry {
    /// Build a registry from field specs, bounds and an optional custom validation.
    ///
    /// Fails with `UnknownField` for a bound on an undeclared field,
    /// `UnsupportedType` for a bound on a non-numeric field, `InvalidDefault`
    /// for a default that does not validate, and `InvalidArgument` for an
    /// empty schema or duplicate names.
    pub fn new(
        fields: Vec<FieldSpec>,
        bounds: Vec<Bound>,
        extra_validation: Option<ExtraValidation>,
    ) -> Result<Self> {
        if fields.is_empty() {
            return Err(ConfigError::invalid_argument("the schema should declare at least one field"));
        }

        let mut field_names = Vec::with_capacity(fields.len());
        let mut types: HashMap<&str, &TypeDesc> = HashMap::with_capacity(fields.len());
        for field in &fields {
            if field.name.trim().is_empty() {
                return Err(ConfigError::invalid_argument(format!(
                    "field names should be non-empty strings (field: {:?})",
                    field.name
                )));
            }
            if types.insert(&field.name, &field.ty).is_some() {
                return Err(ConfigError::invalid_argument(format!(
                    "the {} field is declared more than once",
                    field.name
                )));
            }
            field_names.push(field.name.clone());
        }

        let mut bound_by_field: HashMap<String, Bound> = HashMap::new();
        for bound in bounds {
            let ty = types.get(bound.field()).ok_or_else(|| ConfigError::UnknownField {
                field: bound.field().to_string(),
                context: "bound specified for a field the schema does not declare".to_string(),
            })?;
            if !ty.is_numeric_leaf() {
                return Err(ConfigError::UnsupportedType {
                    field: bound.field().to_string(),
                    ty: format!("{} (bounds need int, float, or containers of those)", ty),
                });
            }
            if bound_by_field.contains_key(bound.field()) {
                return Err(ConfigError::invalid_argument(format!(
                    "more than one bound specified for the {} field",
                    bound.field()
                )));
            }
            bound_by_field.insert(bound.field().to_string(), bound);
        }

        let mut descriptors = HashMap::with_capacity(fields.len());
        for field in fields {
            let bound = bound_by_field.remove(&field.name);
            let descriptor = FieldDescriptor::new(field, bound);
            check_default(&descriptor)?;
            descriptors.insert(descriptor.name().to_string(), descriptor);
        }

        debug!(
            fields = field_names.len(),
            custom_validation = extra_validation.is_some(),
            "built schema registry"
        );

        Ok(Self {
            field_names,
            descriptors,
            extra_validation,
            unknown_fields: UnknownFieldPolicy::default(),
        })
    }

    /// Build a registry from a schema file declaration
    pub fn from_declaration(
        declaration: SchemaDeclaration,
        extra_validation: Option<ExtraValidation>,
    ) -> Result<Self> {
        let (fields, bounds) = declaration.resolve()?;
        Self::new(fields, bounds, extra_validation)
    }

    /// Set the policy for document keys the schema does not declare
    pub fn with_unknown_field_policy(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// Apply loader settings
    pub fn with_config(self, config: &ParserConfig) -> Self {
        self.with_unknown_field_policy(config.parsing.unknown_fields)
    }

    pub fn unknown_field_policy(&self) -> UnknownFieldPolicy {
        self.unknown_fields
    }

    /// Declared field names, in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.field_names.iter().map(String::as_str)
    }

    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.descriptors.get(name)
    }

    /// Parse a decoded document, which must be a JSON object
    pub fn parse(&self, document: &Value) -> Result<Args> {
        match document {
            Value::Object(map) => self.parse_map(map.clone()),
            other => Err(ConfigError::TypeMismatch {
                field: "document".to_string(),
                expected: "a JSON object".to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Parse JSON text
    pub fn parse_str(&self, content: &str) -> Result<Args> {
        let document: Value = serde_json::from_str(content)?;
        self.parse(&document)
    }

    /// Read and parse a JSON file
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Args> {
        let path = path.as_ref();
        debug!(path = %path.display(), "parsing configuration file");
        let content = fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    /// Validate every declared field of `document` and run the custom validation.
    pub fn parse_map(&self, mut document: Args) -> Result<Args> {
        let mut args = Args::new();

        for name in &self.field_names {
            let descriptor = &self.descriptors[name];
            match document.remove(name) {
                Some(value) => {
                    args.insert(name.clone(), validation::validate(&value, descriptor)?);
                }
                None => match descriptor.default_value() {
                    Some(default) => {
                        args.insert(name.clone(), default.clone());
                    }
                    None => return Err(ConfigError::MissingField { field: name.clone() }),
                },
            }
        }

        let mut unknown = document.keys();
        if let Some(first) = unknown.next() {
            match self.unknown_fields {
                UnknownFieldPolicy::Reject => {
                    let others = unknown.map(String::as_str).collect::<Vec<_>>();
                    let context = if others.is_empty() {
                        "not declared in the schema".to_string()
                    } else {
                        format!("not declared in the schema, nor are: {}", others.join(", "))
                    };
                    return Err(ConfigError::UnknownField {
                        field: first.clone(),
                        context,
                    });
                }
                UnknownFieldPolicy::Warn => {
                    let names = document.keys().map(String::as_str).collect::<Vec<_>>().join(", ");
                    warn!(fields = %names, "ignoring unknown arguments");
                }
            }
        }

        if let Some(extra_validation) = &self.extra_validation {
            match extra_validation(args.clone()).map_err(ConfigError::Rejected)? {
                Some(replacement) if !replacement.is_empty() => {
                    debug!("custom validation replaced the parsed arguments");
                    return Ok(replacement);
                }
                _ => {}
            }
        }

        Ok(args)
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("field_names", &self.field_names)
            .field("descriptors", &self.descriptors)
            .field("extra_validation", &self.extra_validation.is_some())
            .field("unknown_fields", &self.unknown_fields)
            .finish()
    }
}

/// Validate a declared default as though it were a parsed value.
///
/// An empty string, list or dict given as the whole default is accepted as a
/// "no value" marker; anything else that fails is an `InvalidDefault`.
fn check_default(descriptor: &FieldDescriptor) -> Result<()> {
    let Some(default) = descriptor.default_value() else {
        return Ok(());
    };

    match validation::validate(default, descriptor) {
        Ok(_) => Ok(()),
        Err(ConfigError::EmptyValue { field, .. }) if field == descriptor.name() => {
            warn!(field = %field, "accepting empty default");
            Ok(())
        }
        Err(err) => Err(ConfigError::InvalidDefault {
            field: descriptor.name().to_string(),
            default: default.to_string(),
            source: Box::new(err),
        }),
    }
}
