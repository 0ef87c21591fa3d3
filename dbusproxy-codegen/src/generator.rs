//! Generation orchestration.

use crate::config::GeneratorConfig;
use crate::error::CodegenError;
use crate::output::{GeneratedOutput, OutputBuffers};
use crate::qt::naming::{class_name, namespace_segments};
use crate::qt::{ProxyEmitter, TypeResolver};
use dbusproxy_schema::{InterfaceNode, ProxyIr, validate_interfaces};
use std::collections::HashMap;

const GENERATED_NOTICE: &str = "\
/*
 * This file contains D-Bus client proxy classes generated by dbusproxy-gen.
 *
 * This file can be distributed under the same terms as the specification from
 * which it was generated.
 */

";

/// Drives proxy generation for a whole run.
pub struct Generator<'a> {
    config: &'a GeneratorConfig,
    ir: &'a ProxyIr,
}

impl<'a> Generator<'a> {
    /// Creates a new generator.
    #[must_use]
    pub fn new(config: &'a GeneratorConfig, ir: &'a ProxyIr) -> Self {
        Self { config, ir }
    }

    /// Generates both artifacts.
    ///
    /// # Errors
    /// Returns `CodegenError` if the interfaces fail validation, two nodes
    /// map to the same class, or a member cannot be emitted.
    pub fn generate(&self) -> Result<GeneratedOutput, CodegenError> {
        validate_interfaces(&self.ir.interfaces)?;
        check_class_names(&self.ir.interfaces)?;

        let primary = self.config.primary_interface.as_deref();
        if let Some(primary) = primary {
            if self.ir.get_interface(primary).is_none() {
                tracing::warn!("primary interface '{}' not found among interface nodes", primary);
            }
        }

        let resolver = TypeResolver::new(&self.ir.context, &self.config.types_namespace);
        let emitter = ProxyEmitter::new(self.config, resolver);
        let mut buffers = OutputBuffers::new();

        self.generate_preamble(&mut buffers);

        let segments = namespace_segments(&self.config.namespace);
        for segment in &segments {
            buffers.push_both(&format!("namespace {}\n{{\n", segment));
        }

        for node in sorted_interfaces(&self.ir.interfaces, primary) {
            tracing::debug!("emitting {} for {}", class_name(&node.name), node.interface_name);
            let text = emitter.emit(node)?;
            buffers.push_decl(text.declaration);
            buffers.push_def(text.definition);
        }

        buffers.push_both(&"}\n".repeat(segments.len()));

        tracing::info!(
            "generated {} proxy classes ({} custom lists, {} external types)",
            self.ir.interfaces.len(),
            self.ir.context.custom_list_count(),
            self.ir.context.external_count()
        );

        Ok(buffers.finish())
    }

    /// Generates the notice and includes of both artifacts.
    fn generate_preamble(&self, buffers: &mut OutputBuffers) {
        let mut header = String::from(GENERATED_NOTICE);
        header.push_str("#include <QString>\n");
        header.push_str("#include <QObject>\n");
        header.push_str("#include <QVariant>\n\n");
        header.push_str("#include <QtGlobal>\n");
        header.push_str("#include <QtDBus>\n\n");
        header.push_str(&format!("#include <{}>\n\n", self.config.types_include));
        buffers.push_decl(header);

        let mut implementation = String::from(GENERATED_NOTICE);
        implementation.push_str(&format!("#include <{}>\n\n", self.config.real_include));
        buffers.push_def(implementation);
    }
}

/// Orders nodes primary first, then by node name.
fn sorted_interfaces<'n>(
    interfaces: &'n [InterfaceNode],
    primary: Option<&str>,
) -> Vec<&'n InterfaceNode> {
    let mut sorted: Vec<&InterfaceNode> = interfaces.iter().collect();
    sorted.sort_by(|a, b| {
        let a_primary = Some(a.name.as_str()) == primary;
        let b_primary = Some(b.name.as_str()) == primary;
        b_primary.cmp(&a_primary).then_with(|| a.name.cmp(&b.name))
    });
    sorted
}

/// Rejects node names that derive the same class name.
fn check_class_names(interfaces: &[InterfaceNode]) -> Result<(), CodegenError> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for node in interfaces {
        let class = class_name(&node.name);
        if let Some(first) = seen.get(&class) {
            return Err(CodegenError::ClassNameCollision {
                class,
                first: (*first).to_string(),
                second: node.name.clone(),
            });
        }
        seen.insert(class, &node.name);
    }

    Ok(())
}
