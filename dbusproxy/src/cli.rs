//! Command-line interface of `dbusproxy-gen`.

use anyhow::{Context, Result};
use clap::Parser;
use dbusproxy_codegen::{CodegenError, GeneratorConfig, GeneratorConfigBuilder};
use std::path::{Path, PathBuf};

/// Generates Qt client proxy classes from D-Bus interface descriptions.
///
/// Every option except `--group` and `--mainiface` is required; a missing
/// one is reported before either document is read.
#[derive(Debug, Default, Parser)]
#[command(name = "dbusproxy-gen", version, about)]
pub struct Cli {
    /// Documentation group of the generated classes
    #[arg(long)]
    pub group: Option<String>,

    /// Output path of the declarations file
    #[arg(long = "headerfile", value_name = "PATH")]
    pub header_file: Option<String>,

    /// Output path of the definitions file
    #[arg(long = "implfile", value_name = "PATH")]
    pub impl_file: Option<String>,

    /// Namespace of the generated classes, `::`-separated
    #[arg(long)]
    pub namespace: Option<String>,

    /// Namespace of the declared types
    #[arg(long = "typesnamespace", value_name = "NAMESPACE")]
    pub types_namespace: Option<String>,

    /// Include path of the declarations file, as used by the definitions file
    #[arg(long = "realinclude", value_name = "PATH")]
    pub real_include: Option<String>,

    /// Public include path shown in class documentation
    #[arg(long = "prettyinclude", value_name = "PATH")]
    pub pretty_include: Option<String>,

    /// Include path of the declared types header
    #[arg(long = "typesinclude", value_name = "PATH")]
    pub types_include: Option<String>,

    /// Node name of the primary interface (e.g. `/Connection`)
    #[arg(long = "mainiface", value_name = "NODE")]
    pub main_iface: Option<String>,

    /// Introspection document listing the interfaces to wrap
    #[arg(long = "ifacexml", value_name = "PATH")]
    pub iface_xml: Option<PathBuf>,

    /// Specification document declaring the types in use
    #[arg(long = "specxml", value_name = "PATH")]
    pub spec_xml: Option<PathBuf>,
}

impl Cli {
    /// Builds the generator configuration from the options.
    ///
    /// # Errors
    /// Returns `CodegenError::MissingConfig` naming the first missing option.
    pub fn config(&self) -> Result<GeneratorConfig, CodegenError> {
        let mut builder = GeneratorConfigBuilder::new();
        if let Some(group) = &self.group {
            builder = builder.group(group);
        }
        if let Some(path) = &self.header_file {
            builder = builder.header_file(path);
        }
        if let Some(path) = &self.impl_file {
            builder = builder.impl_file(path);
        }
        if let Some(namespace) = &self.namespace {
            builder = builder.namespace(namespace);
        }
        if let Some(namespace) = &self.types_namespace {
            builder = builder.types_namespace(namespace);
        }
        if let Some(include) = &self.real_include {
            builder = builder.real_include(include);
        }
        if let Some(include) = &self.pretty_include {
            builder = builder.pretty_include(include);
        }
        if let Some(include) = &self.types_include {
            builder = builder.types_include(include);
        }
        if let Some(node) = &self.main_iface {
            builder = builder.primary_interface(node);
        }
        builder.build()
    }

    /// Returns the introspection and specification document paths.
    ///
    /// # Errors
    /// Returns `CodegenError::MissingConfig` if either path is missing.
    pub fn inputs(&self) -> Result<(&Path, &Path), CodegenError> {
        let iface = self
            .iface_xml
            .as_deref()
            .ok_or_else(|| CodegenError::missing_config("--ifacexml"))?;
        let spec = self
            .spec_xml
            .as_deref()
            .ok_or_else(|| CodegenError::missing_config("--specxml"))?;
        Ok((iface, spec))
    }

    /// Runs one generation.
    ///
    /// Nothing is written unless both documents load and every interface
    /// generates.
    ///
    /// # Errors
    /// Returns an error if an option is missing, a document cannot be read
    /// or parsed, generation fails, or an artifact cannot be written.
    pub fn run(&self) -> Result<()> {
        let config = self.config()?;
        let (iface_path, spec_path) = self.inputs()?;

        let output = dbusproxy_codegen::generate_from_files(iface_path, spec_path, &config)
            .with_context(|| {
                format!(
                    "failed to generate proxies from {} and {}",
                    iface_path.display(),
                    spec_path.display()
                )
            })?;

        output
            .write(Path::new(&config.header_file), Path::new(&config.impl_file))
            .with_context(|| {
                format!(
                    "failed to write {} and {}",
                    config.header_file, config.impl_file
                )
            })?;

        tracing::info!("wrote {} and {}", config.header_file, config.impl_file);
        Ok(())
    }
}
