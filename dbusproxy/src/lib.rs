//! # dbusproxy
//!
//! Generates Qt client proxy classes for D-Bus interfaces.
//!
//! An introspection document lists the interface nodes to wrap; a
//! specification document declares the struct, mapping, enum, flags and
//! external types they use. Each interface node becomes one
//! `QDBusAbstractInterface` subclass, written into a declarations artifact
//! and a definitions artifact.
//!
//! ## Quick Start
//!
//! ```ignore
//! use dbusproxy::prelude::*;
//!
//! let config = GeneratorConfigBuilder::new()
//!     .header_file("cli-connection.h")
//!     .impl_file("cli-connection-body.hpp")
//!     .namespace("Tp::Client")
//!     .types_namespace("Tp")
//!     .real_include("TelepathyQt/_gen/cli-connection.h")
//!     .pretty_include("TelepathyQt/Connection")
//!     .types_include("TelepathyQt/types.h")
//!     .primary_interface("/Connection")
//!     .build()?;
//!
//! let output = generate_from_xml(&iface_xml, &spec_xml, &config)?;
//! output.write(header_path, impl_path)?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`schema`] - Document loading, signatures and validation
//! - [`codegen`] - Type resolution and proxy generation

pub mod cli;
pub mod prelude;

/// Document loading, signatures and validation.
pub mod schema {
    pub use dbusproxy_schema::*;
}

/// Type resolution and proxy generation.
pub mod codegen {
    pub use dbusproxy_codegen::*;
}

pub use dbusproxy_codegen::{
    CodegenError, GeneratedOutput, Generator, GeneratorConfig, GeneratorConfigBuilder,
    generate_from_files, generate_from_xml,
};
