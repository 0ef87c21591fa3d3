//! # dbusproxy Schema
//!
//! Interface description loading and type declarations.
//!
//! This crate provides:
//! - Introspection document loading (interface nodes and their members)
//! - Specification document loading (declared struct, mapping, enum, flags
//!   and external types, plus documentation and annotations)
//! - D-Bus type signature parsing
//! - Interface validation
//! - Intermediate representation for code generation

pub mod error;
pub mod interfaces;
pub mod ir;
pub mod parser;
pub mod signature;
pub mod types;
pub mod validation;

pub use error::{ParseError, SchemaError};
pub use interfaces::{
    AccessMode, Arg, Direction, Docstring, Documented, InterfaceNode, Member, Method, Property,
    Signal,
};
pub use ir::{ProxyIr, TypeContext};
pub use parser::{parse_introspection, parse_spec};
pub use signature::SignatureType;
pub use types::{
    CustomListDeclaration, DeclKind, ExternalDeclaration, SpecDocument, TypeDecl, generated_name,
};
pub use validation::validate_interfaces;
