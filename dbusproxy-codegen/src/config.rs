//! Generator run configuration.

use crate::error::CodegenError;

/// Documentation group used when none is configured.
pub const DEFAULT_GROUP: &str = "no-group-defined";

/// Settings for one generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Documentation group tag for every generated class.
    pub group: String,
    /// Path of the declarations artifact.
    pub header_file: String,
    /// Path of the definitions artifact.
    pub impl_file: String,
    /// `::`-separated namespace wrapping the generated classes.
    pub namespace: String,
    /// Namespace holding declared struct, mapping and list types.
    pub types_namespace: String,
    /// Include path of the declarations artifact, as included by the definitions.
    pub real_include: String,
    /// Public include path shown in class documentation.
    pub pretty_include: String,
    /// Include path of the declared types.
    pub types_include: String,
    /// Node name of the primary interface, if any.
    pub primary_interface: Option<String>,
}

/// Builder for [`GeneratorConfig`].
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfigBuilder {
    group: Option<String>,
    header_file: Option<String>,
    impl_file: Option<String>,
    namespace: Option<String>,
    types_namespace: Option<String>,
    real_include: Option<String>,
    pretty_include: Option<String>,
    types_include: Option<String>,
    primary_interface: Option<String>,
}

impl GeneratorConfigBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the documentation group.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the declarations artifact path.
    #[must_use]
    pub fn header_file(mut self, path: impl Into<String>) -> Self {
        self.header_file = Some(path.into());
        self
    }

    /// Sets the definitions artifact path.
    #[must_use]
    pub fn impl_file(mut self, path: impl Into<String>) -> Self {
        self.impl_file = Some(path.into());
        self
    }

    /// Sets the output namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the namespace of declared types.
    #[must_use]
    pub fn types_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.types_namespace = Some(namespace.into());
        self
    }

    /// Sets the include path of the declarations artifact.
    #[must_use]
    pub fn real_include(mut self, include: impl Into<String>) -> Self {
        self.real_include = Some(include.into());
        self
    }

    /// Sets the public include path.
    #[must_use]
    pub fn pretty_include(mut self, include: impl Into<String>) -> Self {
        self.pretty_include = Some(include.into());
        self
    }

    /// Sets the include path of the declared types.
    #[must_use]
    pub fn types_include(mut self, include: impl Into<String>) -> Self {
        self.types_include = Some(include.into());
        self
    }

    /// Sets the node name of the primary interface.
    #[must_use]
    pub fn primary_interface(mut self, node_name: impl Into<String>) -> Self {
        self.primary_interface = Some(node_name.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    /// Returns `CodegenError::MissingConfig` naming the first required
    /// option that was not set.
    pub fn build(self) -> Result<GeneratorConfig, CodegenError> {
        Ok(GeneratorConfig {
            group: self.group.unwrap_or_else(|| DEFAULT_GROUP.to_string()),
            header_file: required(self.header_file, "--headerfile")?,
            impl_file: required(self.impl_file, "--implfile")?,
            namespace: required(self.namespace, "--namespace")?,
            types_namespace: required(self.types_namespace, "--typesnamespace")?,
            real_include: required(self.real_include, "--realinclude")?,
            pretty_include: required(self.pretty_include, "--prettyinclude")?,
            types_include: required(self.types_include, "--typesinclude")?,
            primary_interface: self.primary_interface,
        })
    }
}

fn required(value: Option<String>, key: &str) -> Result<String, CodegenError> {
    value.ok_or_else(|| CodegenError::missing_config(key))
}
