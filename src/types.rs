//! Type model for declared fields
//!
//! A declared type is a scalar or an arbitrarily deep nesting of
//! `List[..]` and `Dict[str, ..]` around one. Types are written in schema
//! files as expressions such as `List[Dict[str, int]]`.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, Result};

/// Leaf kinds a declared type may bottom out in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Str,
}

impl ScalarKind {
    /// Get the canonical name used in type expressions
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Str => "str",
        }
    }

    /// Whether a bound can be attached to this kind
    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::Float)
    }

    fn from_ident(ident: &str) -> Option<Self> {
        match ident.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Some(ScalarKind::Bool),
            "int" | "integer" => Some(ScalarKind::Int),
            "float" => Some(ScalarKind::Float),
            "str" | "string" => Some(ScalarKind::Str),
            _ => None,
        }
    }
}

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    Scalar(ScalarKind),
    SequenceOf(Box<TypeDesc>),
    /// Mapping from string keys to the inner type
    MappingOf(Box<TypeDesc>),
}

impl TypeDesc {
    pub fn bool() -> Self {
        TypeDesc::Scalar(ScalarKind::Bool)
    }

    pub fn int() -> Self {
        TypeDesc::Scalar(ScalarKind::Int)
    }

    pub fn float() -> Self {
        TypeDesc::Scalar(ScalarKind::Float)
    }

    pub fn str() -> Self {
        TypeDesc::Scalar(ScalarKind::Str)
    }

    pub fn list_of(inner: TypeDesc) -> Self {
        TypeDesc::SequenceOf(Box::new(inner))
    }

    pub fn dict_of(inner: TypeDesc) -> Self {
        TypeDesc::MappingOf(Box::new(inner))
    }

    /// The scalar reached by unwrapping every container layer
    pub fn innermost(&self) -> ScalarKind {
        let mut current = self;
        loop {
            match current {
                TypeDesc::Scalar(kind) => return *kind,
                TypeDesc::SequenceOf(inner) | TypeDesc::MappingOf(inner) => current = inner,
            }
        }
    }

    pub fn is_numeric_leaf(&self) -> bool {
        self.innermost().is_numeric()
    }

    /// Parse a type expression declared for `field`.
    ///
    /// Unknown type names and non-string mapping keys fail with
    /// `UnsupportedType`; malformed expressions fail with `InvalidArgument`.
    pub fn parse_for(field: &str, expr: &str) -> Result<Self> {
        let mut parser = TypeParser { field, expr, pos: 0 };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != expr.len() {
            return Err(parser.malformed("unexpected trailing input"));
        }
        Ok(ty)
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Scalar(kind) => f.write_str(kind.name()),
            TypeDesc::SequenceOf(inner) => write!(f, "List[{}]", inner),
            TypeDesc::MappingOf(inner) => write!(f, "Dict[str, {}]", inner),
        }
    }
}

impl FromStr for TypeDesc {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        TypeDesc::parse_for("<type expression>", s)
    }
}

impl From<ScalarKind> for TypeDesc {
    fn from(kind: ScalarKind) -> Self {
        TypeDesc::Scalar(kind)
    }
}

/// Recursive-descent parser over `ident ( '[' type (',' type)* ']' )?`
struct TypeParser<'a> {
    field: &'a str,
    expr: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn parse_type(&mut self) -> Result<TypeDesc> {
        let ident = self.ident()?;
        let args = if self.eat('[') {
            let mut args = vec![self.parse_type()?];
            while self.eat(',') {
                args.push(self.parse_type()?);
            }
            if !self.eat(']') {
                return Err(self.malformed("expected ']'"));
            }
            Some(args)
        } else {
            None
        };

        if let Some(kind) = ScalarKind::from_ident(ident) {
            return match args {
                None => Ok(TypeDesc::Scalar(kind)),
                Some(_) => Err(self.malformed(&format!("{} takes no type arguments", ident))),
            };
        }

        match (ident.to_ascii_lowercase().as_str(), args) {
            ("list" | "sequence", Some(mut args)) => {
                if args.len() != 1 {
                    return Err(self.malformed("List takes exactly one type argument"));
                }
                Ok(TypeDesc::list_of(args.remove(0)))
            }
            ("dict" | "mapping", Some(mut args)) => {
                if args.len() != 2 {
                    return Err(self.malformed("Dict takes a key type and a value type"));
                }
                let value = args.remove(1);
                if args[0] != TypeDesc::str() {
                    // Keys must always be strings
                    return Err(self.unsupported());
                }
                Ok(TypeDesc::dict_of(value))
            }
            ("list" | "sequence" | "dict" | "mapping", None) => {
                Err(self.malformed(&format!("{} requires type arguments", ident)))
            }
            _ => Err(self.unsupported()),
        }
    }

    fn ident(&mut self) -> Result<&'a str> {
        self.skip_ws();
        let start = self.pos;
        let rest = &self.expr[start..];
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.malformed("expected a type name"));
        }
        self.pos += len;
        Ok(&self.expr[start..self.pos])
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.expr[self.pos..].starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        let rest = &self.expr[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn malformed(&self, reason: &str) -> ConfigError {
        ConfigError::invalid_argument(format!(
            "malformed type expression for the {} argument at offset {}: {} ({})",
            self.field, self.pos, reason, self.expr
        ))
    }

    fn unsupported(&self) -> ConfigError {
        ConfigError::UnsupportedType {
            field: self.field.to_string(),
            ty: self.expr.trim().to_string(),
        }
    }
}
