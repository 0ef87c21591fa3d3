//! # dbusproxy Codegen
//!
//! Qt client proxy generation from D-Bus interface descriptions.
//!
//! This crate provides:
//! - Type binding resolution from wire signatures to Qt types
//! - Documentation comment reflow
//! - Per-interface proxy class generation
//! - Run orchestration and paired output artifacts

pub mod config;
pub mod error;
pub mod generator;
pub mod output;
pub mod qt;

pub use config::{GeneratorConfig, GeneratorConfigBuilder};
pub use error::CodegenError;
pub use generator::Generator;
pub use output::GeneratedOutput;

use dbusproxy_schema::ProxyIr;
use std::path::Path;

/// Generates the proxy artifacts from document contents.
///
/// # Arguments
/// * `iface_xml` - Introspection document content
/// * `spec_xml` - Specification document content
/// * `config` - Run configuration
///
/// # Errors
/// Returns `CodegenError` if parsing, validation or generation fails.
pub fn generate_from_xml(
    iface_xml: &str,
    spec_xml: &str,
    config: &GeneratorConfig,
) -> Result<GeneratedOutput, CodegenError> {
    let interfaces = dbusproxy_schema::parse_introspection(iface_xml)?;
    tracing::debug!("loaded {} interface nodes", interfaces.len());
    let spec = dbusproxy_schema::parse_spec(spec_xml)?;
    tracing::debug!("loaded {} type declarations", spec.types.len());

    let ir = ProxyIr::new(interfaces, &spec);
    Generator::new(config, &ir).generate()
}

/// Generates the proxy artifacts from document files.
///
/// # Errors
/// Returns `CodegenError` if reading, parsing, validation or generation fails.
pub fn generate_from_files(
    iface_path: &Path,
    spec_path: &Path,
    config: &GeneratorConfig,
) -> Result<GeneratedOutput, CodegenError> {
    let iface_xml = std::fs::read_to_string(iface_path)?;
    let spec_xml = std::fs::read_to_string(spec_path)?;
    generate_from_xml(&iface_xml, &spec_xml, config)
}
