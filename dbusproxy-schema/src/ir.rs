//! Intermediate representation for code generation.
//!
//! This module provides the declaration context consulted by the type
//! resolver and the interface list enriched with documentation and
//! annotations taken from the specification document.

use crate::interfaces::{Arg, InterfaceNode, Member};
use crate::types::{CustomListDeclaration, ExternalDeclaration, SpecDocument, TypeDecl};
use std::collections::{HashMap, HashSet};

/// Read-only declaration context built once per run from the specification.
#[derive(Debug, Clone, Default)]
pub struct TypeContext {
    /// List declarations keyed by generated element name.
    custom_lists: HashMap<String, CustomListDeclaration>,
    /// External `(signature, annotation)` pairs.
    externals: HashSet<ExternalDeclaration>,
    /// Named struct/mapping/external declarations keyed by generated name.
    named_types: HashMap<String, TypeDecl>,
}

impl TypeContext {
    /// Builds the context from a parsed specification.
    #[must_use]
    pub fn from_spec(spec: &SpecDocument) -> Self {
        let mut context = Self::default();

        for list in spec.custom_lists() {
            context.custom_lists.insert(list.element.clone(), list);
        }
        context.externals.extend(spec.externals());
        for decl in spec.types.iter().filter(|t| t.kind.is_named()) {
            context
                .named_types
                .insert(decl.generated_name(), decl.clone());
        }

        context
    }

    /// Adds a list declaration.
    pub fn add_custom_list(&mut self, list: CustomListDeclaration) {
        self.custom_lists.insert(list.element.clone(), list);
    }

    /// Adds an external declaration.
    pub fn add_external(&mut self, external: ExternalDeclaration) {
        self.externals.insert(external);
    }

    /// Adds a named declaration.
    pub fn add_named_type(&mut self, decl: TypeDecl) {
        self.named_types.insert(decl.generated_name(), decl);
    }

    /// Returns true if the `(signature, annotation)` pair is declared external.
    #[must_use]
    pub fn is_external(&self, signature: &str, annotation: Option<&str>) -> bool {
        annotation.is_some_and(|name| {
            self.externals
                .contains(&ExternalDeclaration::new(signature.to_string(), name.to_string()))
        })
    }

    /// Looks up the list declaration for a generated element name.
    #[must_use]
    pub fn custom_list(&self, element: &str) -> Option<&CustomListDeclaration> {
        self.custom_lists.get(element)
    }

    /// Looks up a named declaration by generated name.
    #[must_use]
    pub fn named_type(&self, generated: &str) -> Option<&TypeDecl> {
        self.named_types.get(generated)
    }

    /// Returns the number of list declarations.
    #[must_use]
    pub fn custom_list_count(&self) -> usize {
        self.custom_lists.len()
    }

    /// Returns the number of external declarations.
    #[must_use]
    pub fn external_count(&self) -> usize {
        self.externals.len()
    }
}

/// Intermediate representation of one generation run.
#[derive(Debug, Clone)]
pub struct ProxyIr {
    /// Interface nodes from the introspection document, enriched from the
    /// specification.
    pub interfaces: Vec<InterfaceNode>,
    /// Declaration context.
    pub context: TypeContext,
}

impl ProxyIr {
    /// Creates the representation from the two parsed documents.
    #[must_use]
    pub fn new(interfaces: Vec<InterfaceNode>, spec: &SpecDocument) -> Self {
        let interfaces = interfaces
            .into_iter()
            .map(|mut node| {
                if let Some(spec_node) = spec.get_interface(&node.interface_name) {
                    supplement_node(&mut node, spec_node);
                }
                node
            })
            .collect();

        Self {
            interfaces,
            context: TypeContext::from_spec(spec),
        }
    }

    /// Gets an interface node by name.
    #[must_use]
    pub fn get_interface(&self, name: &str) -> Option<&InterfaceNode> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

/// Fills in documentation and annotations the introspection node lacks.
fn supplement_node(node: &mut InterfaceNode, spec_node: &InterfaceNode) {
    if node.docstring.is_none() {
        node.docstring = spec_node.docstring.clone();
    }

    for member in &mut node.members {
        let Some(source) = spec_node
            .members
            .iter()
            .find(|m| m.kind() == member.kind() && m.name() == member.name())
        else {
            continue;
        };

        match (member, source) {
            (Member::Property(prop), Member::Property(src)) => {
                if prop.docstring.is_none() {
                    prop.docstring = src.docstring.clone();
                }
                if prop.annotation.is_none() && prop.signature == src.signature {
                    prop.annotation = src.annotation.clone();
                }
            }
            (Member::Method(method), Member::Method(src)) => {
                if method.docstring.is_none() {
                    method.docstring = src.docstring.clone();
                }
                supplement_args(&mut method.args, &src.args);
            }
            (Member::Signal(signal), Member::Signal(src)) => {
                if signal.docstring.is_none() {
                    signal.docstring = src.docstring.clone();
                }
                supplement_args(&mut signal.args, &src.args);
            }
            _ => {}
        }
    }
}

/// Fills in arg documentation and annotations by position, only where the
/// signatures agree.
fn supplement_args(args: &mut [Arg], source: &[Arg]) {
    for (arg, src) in args.iter_mut().zip(source) {
        if arg.signature != src.signature {
            continue;
        }
        if arg.docstring.is_none() {
            arg.docstring = src.docstring.clone();
        }
        if arg.annotation.is_none() {
            arg.annotation = src.annotation.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_introspection, parse_spec};

    const INTROSPECTION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<node name="/Channel">
  <interface name="org.example.Channel">
    <property name="Targets" type="a(os)" access="read"/>
    <method name="Close">
      <arg name="Reason" type="u" direction="in"/>
    </method>
  </interface>
</node>"#;

    const SPEC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tp:spec xmlns:tp="http://telepathy.freedesktop.org/wiki/DbusSpec#extensions-v0">
  <node name="/Channel">
    <interface name="org.example.Channel">
      <tp:docstring>A channel.</tp:docstring>
      <tp:struct name="Target_Info" array-name="Target_Info_List">
        <tp:member type="o" name="Path"/>
        <tp:member type="s" name="Kind"/>
      </tp:struct>
      <property name="Targets" type="a(os)" access="read" tp:type="Target_Info[]">
        <tp:docstring>The targets.</tp:docstring>
      </property>
      <method name="Close">
        <arg name="Reason" type="u" direction="in" tp:type="Close_Reason">
          <tp:docstring>Why.</tp:docstring>
        </arg>
      </method>
    </interface>
  </node>
  <tp:external-type name="Variant_Map" type="a{sv}"/>
</tp:spec>"#;

    fn build_ir() -> ProxyIr {
        let nodes = parse_introspection(INTROSPECTION).expect("Failed to parse");
        let spec = parse_spec(SPEC).expect("Failed to parse");
        ProxyIr::new(nodes, &spec)
    }

    #[test]
    fn test_ir_supplements_docs_and_annotations() {
        let ir = build_ir();
        let node = ir.get_interface("/Channel").expect("node expected");

        assert!(node.docstring.is_some());
        let prop = node.properties().next().expect("property expected");
        assert_eq!(prop.annotation.as_deref(), Some("Target_Info[]"));
        assert!(prop.docstring.is_some());

        let method = node.methods().next().expect("method expected");
        assert_eq!(method.args[0].annotation.as_deref(), Some("Close_Reason"));
        assert!(method.args[0].docstring.is_some());
    }

    #[test]
    fn test_type_context_lookups() {
        let ir = build_ir();

        assert_eq!(ir.context.custom_list_count(), 1);
        let list = ir.context.custom_list("TargetInfo").expect("list expected");
        assert_eq!(list.list_name, "TargetInfoList");
        assert_eq!(list.element_signature.as_deref(), Some("(os)"));

        assert!(ir.context.named_type("TargetInfo").is_some());
        assert!(ir.context.is_external("a{sv}", Some("Variant_Map")));
        assert!(!ir.context.is_external("a{sv}", None));
        assert!(!ir.context.is_external("a{ss}", Some("Variant_Map")));
        assert_eq!(ir.context.external_count(), 1);
    }

    #[test]
    fn test_ir_keeps_explicit_values() {
        let nodes = parse_introspection(
            r#"<node name="/Channel"><interface name="org.example.Channel">
                <property name="Targets" type="a(os)" access="read" tp:type="Other[]"/>
            </interface></node>"#,
        )
        .expect("Failed to parse");
        let spec = parse_spec(SPEC).expect("Failed to parse");
        let ir = ProxyIr::new(nodes, &spec);

        let prop = ir.interfaces[0].properties().next().expect("property expected");
        assert_eq!(prop.annotation.as_deref(), Some("Other[]"));
    }
}
