//! Interface validation utilities.
//!
//! This module checks the loaded interface nodes for the structural problems
//! that would otherwise surface as colliding symbols in generated code.

use crate::error::SchemaError;
use crate::interfaces::{Arg, InterfaceNode, Member};
use crate::signature::SignatureType;
use std::collections::HashSet;

/// Validates a set of interface nodes.
///
/// # Arguments
/// * `interfaces` - The nodes to validate
///
/// # Returns
/// Ok(()) if valid, or SchemaError describing the issue.
///
/// # Errors
/// Returns `SchemaError` if two nodes share a name, two members of one node
/// share a kind and name, or a signature is malformed.
pub fn validate_interfaces(interfaces: &[InterfaceNode]) -> Result<(), SchemaError> {
    let mut seen_nodes = HashSet::new();

    for node in interfaces {
        if !seen_nodes.insert(node.name.as_str()) {
            return Err(SchemaError::DuplicateNode {
                name: node.name.clone(),
            });
        }
        validate_node(node)?;
    }

    Ok(())
}

/// Validates the members of one node.
fn validate_node(node: &InterfaceNode) -> Result<(), SchemaError> {
    let mut seen_members = HashSet::new();

    for member in &node.members {
        if let Member::Property(prop) = member {
            if prop.annotation_only {
                continue;
            }
        }

        if !seen_members.insert((member.kind(), member.name())) {
            return Err(SchemaError::DuplicateMember {
                node: node.name.clone(),
                kind: member.kind().to_string(),
                member: member.name().to_string(),
            });
        }

        match member {
            Member::Property(prop) => validate_signature(node, &prop.name, &prop.signature)?,
            Member::Method(method) => validate_args(node, &method.name, &method.args)?,
            Member::Signal(signal) => validate_args(node, &signal.name, &signal.args)?,
        }
    }

    Ok(())
}

fn validate_args(node: &InterfaceNode, member: &str, args: &[Arg]) -> Result<(), SchemaError> {
    for arg in args {
        validate_signature(node, member, &arg.signature)?;
    }
    Ok(())
}

fn validate_signature(
    node: &InterfaceNode,
    member: &str,
    signature: &str,
) -> Result<(), SchemaError> {
    SignatureType::parse(signature).map_err(|e| SchemaError::Validation {
        message: format!("{} (in '{}' of node '{}')", e, member, node.name),
    })?;
    Ok(())
}
