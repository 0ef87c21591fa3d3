//! Type binding resolution.
//!
//! Maps a wire signature plus an optional semantic annotation to the Qt
//! storage type and the type used for input parameters.

use crate::error::CodegenError;
use dbusproxy_schema::{SignatureType, TypeContext, generated_name};

/// Storage types passed by value; every other type is passed as `const T&`.
const VALUE_TYPES: &[&str] = &[
    "bool",
    "uchar",
    "short",
    "ushort",
    "int",
    "uint",
    "qlonglong",
    "qulonglong",
    "double",
];

/// Resolved pair of storage type and input-parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeBinding {
    /// Type used to hold a value (return types, property types).
    pub storage: String,
    /// Type used for input parameters.
    pub input: String,
}

impl TypeBinding {
    /// Creates a binding for a storage type, deriving the input type from
    /// the storage type's class.
    #[must_use]
    pub fn from_storage(storage: impl Into<String>) -> Self {
        let storage = storage.into();
        if is_value_type(&storage) {
            Self::by_value(storage)
        } else {
            Self::by_reference(storage)
        }
    }

    /// Creates a binding passed by value.
    #[must_use]
    pub fn by_value(storage: impl Into<String>) -> Self {
        let storage = storage.into();
        Self {
            input: storage.clone(),
            storage,
        }
    }

    /// Creates a binding passed by const reference.
    #[must_use]
    pub fn by_reference(storage: impl Into<String>) -> Self {
        let storage = storage.into();
        Self {
            input: format!("const {}&", storage),
            storage,
        }
    }
}

/// Returns true if the storage type belongs to the by-value class.
#[must_use]
pub fn is_value_type(storage: &str) -> bool {
    VALUE_TYPES.contains(&storage)
}

/// Qt type for signatures with a fixed mapping.
#[must_use]
pub fn native_type(signature: &str) -> Option<&'static str> {
    match signature {
        "y" => Some("uchar"),
        "b" => Some("bool"),
        "n" => Some("short"),
        "q" => Some("ushort"),
        "i" => Some("int"),
        "u" => Some("uint"),
        "x" => Some("qlonglong"),
        "t" => Some("qulonglong"),
        "d" => Some("double"),
        "s" => Some("QString"),
        "v" => Some("QDBusVariant"),
        "o" => Some("QDBusObjectPath"),
        "g" => Some("QDBusSignature"),
        "h" => Some("QDBusUnixFileDescriptor"),
        "as" => Some("QStringList"),
        "ay" => Some("QByteArray"),
        "av" => Some("QVariantList"),
        "a{sv}" => Some("QVariantMap"),
        _ => None,
    }
}

/// Name of the generated list type for arrays of a native type.
#[must_use]
pub fn native_array_name(element: &str) -> Option<&'static str> {
    match element {
        "b" => Some("BoolList"),
        "n" => Some("ShortList"),
        "q" => Some("UShortList"),
        "i" => Some("IntList"),
        "u" => Some("UIntList"),
        "x" => Some("LongLongList"),
        "t" => Some("ULongLongList"),
        "d" => Some("DoubleList"),
        "o" => Some("ObjectPathList"),
        "g" => Some("SignatureList"),
        "as" => Some("ListOfStringList"),
        "ay" => Some("ByteArrayList"),
        "av" => Some("ListOfVariantList"),
        "a{sv}" => Some("VariantMapList"),
        _ => None,
    }
}

/// Splits a list annotation into its generated element name and the number
/// of `[]` suffixes.
fn list_element(annotation: &str) -> (String, usize) {
    let mut element = generated_name(annotation);
    let mut depth = 0;
    while let Some(stripped) = element.strip_suffix("[]") {
        element = stripped.to_string();
        depth += 1;
    }
    (element, depth)
}

/// Resolves signatures against the run's declaration context.
///
/// Resolution is a pure function of the signature, the annotation, the
/// context and the types namespace.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    context: &'a TypeContext,
    types_namespace: &'a str,
}

impl<'a> TypeResolver<'a> {
    /// Creates a resolver.
    #[must_use]
    pub fn new(context: &'a TypeContext, types_namespace: &'a str) -> Self {
        Self {
            context,
            types_namespace,
        }
    }

    /// Resolves a signature and annotation to a type binding.
    ///
    /// # Arguments
    /// * `signature` - Wire type signature
    /// * `annotation` - Semantic type annotation (`tp:type`), if any
    /// * `location` - Interface and member using the type, for errors
    ///
    /// # Errors
    /// Returns `CodegenError` if the type cannot be mapped, a list annotation
    /// names a type without a declared list form, or a declaration's
    /// signature disagrees with the use site.
    pub fn resolve(
        &self,
        signature: &str,
        annotation: Option<&str>,
        location: &str,
    ) -> Result<TypeBinding, CodegenError> {
        if let Some(name) = annotation {
            if self.context.is_external(signature, Some(name)) {
                return Ok(TypeBinding::by_value(generated_name(name)));
            }
            if let Some(binding) = self.resolve_custom_list(signature, name, location)? {
                return Ok(binding);
            }
        }

        if let Some(native) = native_type(signature) {
            return Ok(TypeBinding::from_storage(native));
        }

        if let Some(array_name) = signature.strip_prefix('a').and_then(native_array_name) {
            return Ok(TypeBinding::by_reference(self.qualify(array_name)));
        }

        if let Some(name) = annotation {
            if name.ends_with("[]") {
                return Err(CodegenError::UnknownCustomList {
                    element: list_element(name).0,
                    annotation: name.to_string(),
                    location: location.to_string(),
                });
            }
            let generated = generated_name(name);
            if let Some(decl) = self.context.named_type(&generated) {
                if let Some(expected) = decl.signature.as_deref() {
                    if expected != signature {
                        return Err(CodegenError::SignatureMismatch {
                            signature: signature.to_string(),
                            annotation: name.to_string(),
                            expected: expected.to_string(),
                            location: location.to_string(),
                        });
                    }
                }
                return Ok(TypeBinding::by_reference(self.qualify(&generated)));
            }
        }

        self.synthesize(signature, annotation, location)
    }

    /// Resolves a `Name[]` (or deeper) annotation to its declared list type.
    ///
    /// Returns `None` when the annotation is not a list annotation or names
    /// no declared list.
    fn resolve_custom_list(
        &self,
        signature: &str,
        annotation: &str,
        location: &str,
    ) -> Result<Option<TypeBinding>, CodegenError> {
        let (element, depth) = list_element(annotation);
        if depth == 0 {
            return Ok(None);
        }
        let Some(list) = self.context.custom_list(&element) else {
            return Ok(None);
        };

        if let Some(element_signature) = list.element_signature.as_deref() {
            let expected = format!("{}{}", "a".repeat(depth), element_signature);
            if expected != signature {
                return Err(CodegenError::SignatureMismatch {
                    signature: signature.to_string(),
                    annotation: annotation.to_string(),
                    expected,
                    location: location.to_string(),
                });
            }
        }

        let name = format!("{}{}", list.list_name, "List".repeat(depth - 1));
        let storage = if list.external {
            name
        } else {
            self.qualify(&name)
        };
        Ok(Some(TypeBinding::by_reference(storage)))
    }

    /// Builds a container type from its resolved element types.
    fn synthesize(
        &self,
        signature: &str,
        annotation: Option<&str>,
        location: &str,
    ) -> Result<TypeBinding, CodegenError> {
        let parsed = SignatureType::parse(signature)
            .map_err(|_| CodegenError::unresolvable(signature, annotation, location))?;

        let storage = match parsed {
            SignatureType::Array(elem) => {
                let elem = self.resolve(&elem.to_signature(), None, location)?;
                format!("QList<{}>", elem.storage)
            }
            SignatureType::Dict(key, value) => {
                let key = self.resolve(&key.to_signature(), None, location)?;
                let value = self.resolve(&value.to_signature(), None, location)?;
                format!("QMap<{}, {}>", key.storage, value.storage)
            }
            SignatureType::Struct(fields) => {
                let members = fields
                    .iter()
                    .map(|f| {
                        self.resolve(&f.to_signature(), None, location)
                            .map(|b| b.storage)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                format!("std::tuple<{}>", members.join(", "))
            }
            SignatureType::Basic(_) | SignatureType::Variant => {
                return Err(CodegenError::unresolvable(signature, annotation, location));
            }
        };

        Ok(TypeBinding::by_reference(storage))
    }

    fn qualify(&self, name: &str) -> String {
        if self.types_namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", self.types_namespace, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbusproxy_schema::{
        CustomListDeclaration, DeclKind, ExternalDeclaration, TypeContext, TypeDecl,
    };

    fn test_context() -> TypeContext {
        let mut context = TypeContext::default();
        context.add_custom_list(CustomListDeclaration {
            element: "ChannelInfo".to_string(),
            list_name: "ChannelInfoList".to_string(),
            element_signature: Some("(os)".to_string()),
            external: false,
        });
        context.add_custom_list(CustomListDeclaration {
            element: "ContactHandle".to_string(),
            list_name: "ContactHandleList".to_string(),
            element_signature: None,
            external: false,
        });
        context.add_custom_list(CustomListDeclaration {
            element: "ObjectPath".to_string(),
            list_name: "ObjectPathList".to_string(),
            element_signature: Some("o".to_string()),
            external: true,
        });
        context.add_external(ExternalDeclaration::new(
            "o".to_string(),
            "Object_Path".to_string(),
        ));

        let mut info = TypeDecl::new("Channel_Info".to_string(), DeclKind::Struct);
        info.signature = Some("(os)".to_string());
        context.add_named_type(info);
        context
    }

    #[test]
    fn test_resolve_primitives() {
        let context = test_context();
        let resolver = TypeResolver::new(&context, "Tp");

        let uint = resolver.resolve("u", None, "test").expect("resolved");
        assert_eq!(uint.storage, "uint");
        assert_eq!(uint.input, "uint");

        let string = resolver.resolve("s", None, "test").expect("resolved");
        assert_eq!(string.storage, "QString");
        assert_eq!(string.input, "const QString&");

        let map = resolver.resolve("a{sv}", None, "test").expect("resolved");
        assert_eq!(map.storage, "QVariantMap");
        assert_eq!(map.input, "const QVariantMap&");
    }

    #[test]
    fn test_resolve_enum_annotation_uses_native() {
        let context = test_context();
        let resolver = TypeResolver::new(&context, "Tp");

        let status = resolver
            .resolve("u", Some("Connection_Status"), "test")
            .expect("resolved");
        assert_eq!(status.storage, "uint");
    }

    #[test]
    fn test_resolve_native_arrays() {
        let context = test_context();
        let resolver = TypeResolver::new(&context, "Tp");

        let list = resolver.resolve("au", None, "test").expect("resolved");
        assert_eq!(list.storage, "Tp::UIntList");
        assert_eq!(list.input, "const Tp::UIntList&");
    }

    #[test]
    fn test_resolve_custom_lists() {
        let context = test_context();
        let resolver = TypeResolver::new(&context, "Tp");

        let infos = resolver
            .resolve("a(os)", Some("Channel_Info[]"), "test")
            .expect("resolved");
        assert_eq!(infos.storage, "Tp::ChannelInfoList");
        assert_eq!(infos.input, "const Tp::ChannelInfoList&");

        let nested = resolver
            .resolve("aa(os)", Some("Channel_Info[][]"), "test")
            .expect("resolved");
        assert_eq!(nested.storage, "Tp::ChannelInfoListList");

        let handles = resolver
            .resolve("au", Some("Contact_Handle[]"), "test")
            .expect("resolved");
        assert_eq!(handles.storage, "Tp::ContactHandleList");
    }

    #[test]
    fn test_resolve_external_list_not_qualified() {
        let context = test_context();
        let resolver = TypeResolver::new(&context, "Tp");

        let paths = resolver
            .resolve("ao", Some("Object_Path[]"), "test")
            .expect("resolved");
        assert_eq!(paths.storage, "ObjectPathList");
    }

    #[test]
    fn test_resolve_external_declaration() {
        let context = test_context();
        let resolver = TypeResolver::new(&context, "Tp");

        let path = resolver
            .resolve("o", Some("Object_Path"), "test")
            .expect("resolved");
        assert_eq!(path.storage, "ObjectPath");
        assert_eq!(path.input, "ObjectPath");
    }

    #[test]
    fn test_resolve_declared_struct() {
        let context = test_context();
        let resolver = TypeResolver::new(&context, "Tp");

        let info = resolver
            .resolve("(os)", Some("Channel_Info"), "test")
            .expect("resolved");
        assert_eq!(info.storage, "Tp::ChannelInfo");
        assert_eq!(info.input, "const Tp::ChannelInfo&");

        let mismatch = resolver.resolve("(ou)", Some("Channel_Info"), "test");
        assert!(matches!(mismatch, Err(CodegenError::SignatureMismatch { .. })));
    }

    #[test]
    fn test_resolve_synthesized_containers() {
        let context = test_context();
        let resolver = TypeResolver::new(&context, "Tp");

        let map = resolver.resolve("a{uas}", None, "test").expect("resolved");
        assert_eq!(map.storage, "QMap<uint, QStringList>");
        assert_eq!(map.input, "const QMap<uint, QStringList>&");

        let nested = resolver.resolve("aau", None, "test").expect("resolved");
        assert_eq!(nested.storage, "QList<Tp::UIntList>");

        let tuple = resolver.resolve("(ubs)", None, "test").expect("resolved");
        assert_eq!(tuple.storage, "std::tuple<uint, bool, QString>");
    }

    #[test]
    fn test_resolve_undeclared_list_falls_back_to_native() {
        let context = test_context();
        let resolver = TypeResolver::new(&context, "Tp");

        let handles = resolver
            .resolve("au", Some("Handle[]"), "test")
            .expect("resolved");
        assert_eq!(handles.storage, "Tp::UIntList");
        assert_eq!(handles.input, "const Tp::UIntList&");

        let names = resolver
            .resolve("as", Some("Contact_Name[]"), "test")
            .expect("resolved");
        assert_eq!(names.storage, "QStringList");
    }

    #[test]
    fn test_resolve_unknown_custom_list_fails() {
        let context = test_context();
        let resolver = TypeResolver::new(&context, "Tp");

        let result = resolver.resolve("a(us)", Some("Mystery[]"), "Conn.Foo");
        assert!(matches!(result, Err(CodegenError::UnknownCustomList { .. })));
    }

    #[test]
    fn test_resolve_list_signature_mismatch_fails() {
        let context = test_context();
        let resolver = TypeResolver::new(&context, "Tp");

        let result = resolver.resolve("a(ou)", Some("Channel_Info[]"), "test");
        assert!(matches!(result, Err(CodegenError::SignatureMismatch { .. })));
    }

    #[test]
    fn test_resolve_malformed_signature_fails() {
        let context = test_context();
        let resolver = TypeResolver::new(&context, "Tp");

        let result = resolver.resolve("z", None, "Conn.Foo");
        match result {
            Err(CodegenError::UnresolvableType {
                signature,
                location,
                ..
            }) => {
                assert_eq!(signature, "z");
                assert_eq!(location, "Conn.Foo");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let context = test_context();
        let resolver = TypeResolver::new(&context, "Tp");

        let first = resolver.resolve("a{sa(os)}", None, "test").expect("resolved");
        let second = resolver.resolve("a{sa(os)}", None, "test").expect("resolved");
        assert_eq!(first, second);
    }
}
