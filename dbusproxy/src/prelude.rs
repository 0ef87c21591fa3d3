//! Prelude module for convenient imports.
//!
//! ```ignore
//! use dbusproxy::prelude::*;
//! ```

// Documents
pub use dbusproxy_schema::{
    InterfaceNode, ParseError, ProxyIr, SchemaError, SpecDocument, parse_introspection,
    parse_spec,
};

// Generation
pub use dbusproxy_codegen::qt::{ProxyEmitter, TypeBinding, TypeResolver};
pub use dbusproxy_codegen::{
    CodegenError, GeneratedOutput, Generator, GeneratorConfig, GeneratorConfigBuilder,
    generate_from_files, generate_from_xml,
};
