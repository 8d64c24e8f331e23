//! JSON Config Parser
//!
//! Schema-driven loading of JSON configuration documents. An application
//! declares its options once (name, type, optional default), optionally adds
//! numeric bounds and a custom cross-field validation, and gets back a fully
//! validated mapping for every document it parses.
//!
//! ## Features
//!
//! - **Nested Types**: `bool`, `int`, `float`, `str`, and any nesting of
//!   `List[..]` / `Dict[str, ..]` around them
//! - **Numeric Leniency**: `10.0` is accepted for `int`, `3` for `float`
//! - **Bounds**: inclusive or exclusive ranges, applied to every numeric leaf
//! - **Strict Documents**: empty values, missing fields and unknown keys fail
//!
//! ## Example
//!
//! ```no_run
//! use json_configparser::{Bound, FieldSpec, SchemaRegistry, TypeDesc};
//!
//! let registry = SchemaRegistry::new(
//!     vec![
//!         FieldSpec::required("words", TypeDesc::list_of(TypeDesc::str())),
//!         FieldSpec::optional("max_size", TypeDesc::int(), 2),
//!     ],
//!     vec![Bound::at_least("max_size", 1)?],
//!     None,
//! )?;
//! let args = registry.parse_file("args.json")?;
//! # Ok::<(), json_configparser::ConfigError>(())
//! ```

pub mod bound;
pub mod config;
pub mod error;
pub mod registry;
pub mod schema;
pub mod types;
pub mod validation;

pub use bound::{Bound, BoundSpec};
pub use config::{ParserConfig, UnknownFieldPolicy};
pub use error::{ConfigError, ErrorKind, Result};
pub use registry::{custom_validation, Args, ExtraValidation, SchemaRegistry};
pub use schema::{FieldDeclaration, FieldDescriptor, FieldSpec, SchemaDeclaration};
pub use types::{ScalarKind, TypeDesc};
