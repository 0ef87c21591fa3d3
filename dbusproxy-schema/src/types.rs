//! Declared type definitions.
//!
//! This module contains the auxiliary type declarations gathered from the
//! specification document: structs, mappings, enums, flags, simple types
//! and external types, plus the list types derived from their `array-name`
//! attributes.

use crate::interfaces::InterfaceNode;

/// Removes underscores from a declared name to form the generated name.
#[must_use]
pub fn generated_name(name: &str) -> String {
    name.replace('_', "")
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// `tp:struct`.
    Struct,
    /// `tp:mapping`.
    Mapping,
    /// `tp:enum`.
    Enum,
    /// `tp:flags`.
    Flags,
    /// `tp:external-type`.
    External,
    /// `tp:simple-type`.
    SimpleType,
}

impl DeclKind {
    /// Parses a declaration kind from its element name.
    #[must_use]
    pub fn from_element(name: &str) -> Option<Self> {
        match name {
            "tp:struct" => Some(Self::Struct),
            "tp:mapping" => Some(Self::Mapping),
            "tp:enum" => Some(Self::Enum),
            "tp:flags" => Some(Self::Flags),
            "tp:external-type" => Some(Self::External),
            "tp:simple-type" => Some(Self::SimpleType),
            _ => None,
        }
    }

    /// Returns true if values of this kind get a named generated type.
    ///
    /// Enums, flags and simple types travel as their underlying type.
    #[must_use]
    pub const fn is_named(&self) -> bool {
        matches!(self, Self::Struct | Self::Mapping | Self::External)
    }

    /// Returns true if an `array-name` on this kind declares a list type.
    ///
    /// Lists of enums, flags and simple types are the native integer or
    /// string lists.
    #[must_use]
    pub const fn declares_list(&self) -> bool {
        self.is_named()
    }
}

/// Type declared in the specification document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Declared name, as written in the document.
    pub name: String,
    /// Declaration kind.
    pub kind: DeclKind,
    /// Signature of one value of the type, when the declaration states it.
    pub signature: Option<String>,
    /// Name of the list type holding values of this type.
    pub array_name: Option<String>,
}

impl TypeDecl {
    /// Creates a new declaration.
    #[must_use]
    pub fn new(name: String, kind: DeclKind) -> Self {
        Self {
            name,
            kind,
            signature: None,
            array_name: None,
        }
    }

    /// Returns the generated (underscore-free) name.
    #[must_use]
    pub fn generated_name(&self) -> String {
        generated_name(&self.name)
    }
}

/// Named list type declared through an `array-name` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomListDeclaration {
    /// Generated name of the element type.
    pub element: String,
    /// Generated name of the list type.
    pub list_name: String,
    /// Signature of one element, when known.
    pub element_signature: Option<String>,
    /// True if the element type is defined outside the generated types.
    pub external: bool,
}

impl CustomListDeclaration {
    /// Builds a list declaration from a declared type, if it names a list.
    #[must_use]
    pub fn from_decl(decl: &TypeDecl) -> Option<Self> {
        if !decl.kind.declares_list() {
            return None;
        }
        let array_name = decl.array_name.as_ref()?;
        Some(Self {
            element: decl.generated_name(),
            list_name: generated_name(array_name),
            element_signature: decl.signature.clone(),
            external: decl.kind == DeclKind::External,
        })
    }
}

/// `(signature, annotation)` pair defined outside the generated types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalDeclaration {
    /// Wire signature.
    pub signature: String,
    /// Declared name, as written in the document.
    pub name: String,
}

impl ExternalDeclaration {
    /// Creates a new external declaration.
    #[must_use]
    pub fn new(signature: String, name: String) -> Self {
        Self { signature, name }
    }
}

/// Contents of a parsed specification document.
#[derive(Debug, Clone, Default)]
pub struct SpecDocument {
    /// All declared types in document order.
    pub types: Vec<TypeDecl>,
    /// Interfaces described by the specification, used as a source of
    /// documentation and annotations.
    pub interfaces: Vec<InterfaceNode>,
}

impl SpecDocument {
    /// Creates an empty specification.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declared type.
    pub fn add_type(&mut self, decl: TypeDecl) {
        self.types.push(decl);
    }

    /// Returns the list declarations in document order.
    #[must_use]
    pub fn custom_lists(&self) -> Vec<CustomListDeclaration> {
        self.types
            .iter()
            .filter_map(CustomListDeclaration::from_decl)
            .collect()
    }

    /// Returns the external declarations in document order.
    #[must_use]
    pub fn externals(&self) -> Vec<ExternalDeclaration> {
        self.types
            .iter()
            .filter(|t| t.kind == DeclKind::External)
            .filter_map(|t| {
                t.signature
                    .as_ref()
                    .map(|sig| ExternalDeclaration::new(sig.clone(), t.name.clone()))
            })
            .collect()
    }

    /// Looks up a declared type by its generated name.
    #[must_use]
    pub fn get_type(&self, generated: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|t| t.generated_name() == generated)
    }

    /// Looks up a specification interface by its wire name.
    #[must_use]
    pub fn get_interface(&self, interface_name: &str) -> Option<&InterfaceNode> {
        self.interfaces
            .iter()
            .find(|i| i.interface_name == interface_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_name() {
        assert_eq!(generated_name("Channel_Details_List"), "ChannelDetailsList");
        assert_eq!(generated_name("Plain"), "Plain");
    }

    #[test]
    fn test_custom_list_from_decl() {
        let mut decl = TypeDecl::new("Channel_Details".to_string(), DeclKind::Struct);
        decl.signature = Some("(oa{sv})".to_string());
        assert!(CustomListDeclaration::from_decl(&decl).is_none());

        decl.array_name = Some("Channel_Details_List".to_string());
        let list = CustomListDeclaration::from_decl(&decl).expect("list expected");
        assert_eq!(list.element, "ChannelDetails");
        assert_eq!(list.list_name, "ChannelDetailsList");
        assert_eq!(list.element_signature.as_deref(), Some("(oa{sv})"));
        assert!(!list.external);
    }

    #[test]
    fn test_enum_array_name_declares_no_list() {
        let mut decl = TypeDecl::new("Handle_Type".to_string(), DeclKind::Enum);
        decl.signature = Some("u".to_string());
        decl.array_name = Some("Handle_Type_List".to_string());
        assert!(CustomListDeclaration::from_decl(&decl).is_none());

        decl.kind = DeclKind::SimpleType;
        assert!(CustomListDeclaration::from_decl(&decl).is_none());

        let mut spec = SpecDocument::new();
        spec.add_type(decl);
        assert!(spec.custom_lists().is_empty());
    }

    #[test]
    fn test_spec_document_externals() {
        let mut spec = SpecDocument::new();
        let mut ext = TypeDecl::new("Object_Path".to_string(), DeclKind::External);
        ext.signature = Some("o".to_string());
        spec.add_type(ext);
        spec.add_type(TypeDecl::new("Handle".to_string(), DeclKind::Enum));

        let externals = spec.externals();
        assert_eq!(externals.len(), 1);
        assert_eq!(externals[0].signature, "o");
        assert_eq!(externals[0].name, "Object_Path");
        assert!(spec.get_type("ObjectPath").is_some());
        assert!(spec.custom_lists().is_empty());
    }

    #[test]
    fn test_decl_kind_from_element() {
        assert_eq!(DeclKind::from_element("tp:struct"), Some(DeclKind::Struct));
        assert_eq!(DeclKind::from_element("tp:flags"), Some(DeclKind::Flags));
        assert_eq!(
            DeclKind::from_element("tp:simple-type"),
            Some(DeclKind::SimpleType)
        );
        assert!(!DeclKind::SimpleType.is_named());
        assert_eq!(DeclKind::from_element("struct"), None);
        assert!(DeclKind::Mapping.is_named());
        assert!(!DeclKind::Enum.is_named());
    }
}
