//! Proxy class code generation.

use crate::config::GeneratorConfig;
use crate::error::CodegenError;
use crate::qt::binding::TypeResolver;
use crate::qt::docs::format_docstring;
use crate::qt::members::{ArgInfo, MemberInfo, describe_args};
use crate::qt::naming::{PROXY_BASE_CLASS, class_name};
use dbusproxy_schema::{InterfaceNode, Method, Property, Signal};

/// Prefix for documentation lines inside member comments.
const MEMBER_DOC_INDENT: &str = "     * ";

/// Prefix for argument documentation lines inside member comments.
const ARG_DOC_INDENT: &str = "     *     ";

/// Declaration and definition text of one proxy class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyText {
    /// Text for the declarations artifact.
    pub declaration: String,
    /// Text for the definitions artifact.
    pub definition: String,
}

/// Generator for proxy classes.
pub struct ProxyEmitter<'a> {
    config: &'a GeneratorConfig,
    resolver: TypeResolver<'a>,
    primary_class: String,
}

impl<'a> ProxyEmitter<'a> {
    /// Creates a new proxy emitter.
    #[must_use]
    pub fn new(config: &'a GeneratorConfig, resolver: TypeResolver<'a>) -> Self {
        let primary_class = config
            .primary_interface
            .as_deref()
            .map_or_else(|| PROXY_BASE_CLASS.to_string(), class_name);

        Self {
            config,
            resolver,
            primary_class,
        }
    }

    /// Generates the proxy class for one interface node.
    ///
    /// # Errors
    /// Returns `CodegenError` if a member type cannot be resolved or two
    /// arguments of one member collide.
    pub fn emit(&self, node: &InterfaceNode) -> Result<ProxyText, CodegenError> {
        let name = class_name(&node.name);
        let mut text = ProxyText::default();

        self.generate_prologue(node, &name, &mut text);

        if self.primary_class != name {
            self.generate_adoption_constructors(&name, &mut text);
        }

        for prop in node.properties().filter(|p| !p.annotation_only) {
            text.declaration.push_str(&self.generate_property(node, prop)?);
        }

        if node.has_methods() {
            text.declaration.push_str("\npublic Q_SLOTS:");
            for method in node.methods() {
                text.declaration.push_str(&self.generate_method(node, method)?);
            }
        }

        if node.has_signals() {
            text.declaration.push_str("\nQ_SIGNALS:");
            for signal in node.signals() {
                text.declaration.push_str(&self.generate_signal(node, signal)?);
            }
        }

        text.declaration.push_str("};\n");

        Ok(text)
    }

    /// Generates the class comment, interface name accessor and the two
    /// by-name-and-path constructors.
    fn generate_prologue(&self, node: &InterfaceNode, name: &str, text: &mut ProxyText) {
        let dbus_name = &node.interface_name;
        let output = &mut text.declaration;

        output.push_str("\n/**\n");
        output.push_str(&format!(" * \\class {}\n", name));
        output.push_str(&format!(
            " * \\headerfile {} <{}>\n",
            self.config.real_include, self.config.pretty_include
        ));
        output.push_str(&format!(" * \\ingroup {}\n", self.config.group));
        output.push_str(" *\n");
        output.push_str(&format!(
            " * Proxy class providing a 1:1 mapping of the D-Bus interface \"{}.\"\n",
            dbus_name
        ));
        let class_doc = format_docstring(node, " * ");
        if !class_doc.is_empty() {
            output.push_str(" *\n");
            output.push_str(&class_doc);
        }
        output.push_str(" */\n");
        output.push_str(&format!("class {} : public {}\n", name, PROXY_BASE_CLASS));
        output.push_str("{\n");
        output.push_str("    Q_OBJECT\n\n");
        output.push_str("public:\n");

        output.push_str("    /**\n");
        output.push_str(&format!(
            "     * Returns the name of the interface \"{}\", which this class\n",
            dbus_name
        ));
        output.push_str("     * represents.\n");
        output.push_str("     *\n");
        output.push_str("     * \\return The D-Bus interface name.\n");
        output.push_str("     */\n");
        output.push_str("    static inline const char *staticInterfaceName()\n");
        output.push_str("    {\n");
        output.push_str(&format!("        return \"{}\";\n", dbus_name));
        output.push_str("    }\n\n");

        output.push_str("    /**\n");
        output.push_str(&format!(
            "     * Creates a {} associated with the given object on the session bus.\n",
            name
        ));
        output.push_str("     *\n");
        output.push_str("     * \\param serviceName Name of the service the object is on.\n");
        output.push_str("     * \\param objectPath Path to the object on the service.\n");
        output.push_str("     * \\param parent Passed to the parent class constructor.\n");
        output.push_str("     */\n");
        output.push_str(&format!("    explicit {}(\n", name));
        output.push_str("        const QString& serviceName,\n");
        output.push_str("        const QString& objectPath,\n");
        output.push_str("        QObject* parent = 0\n");
        output.push_str("    );\n\n");

        output.push_str("    /**\n");
        output.push_str(&format!(
            "     * Creates a {} associated with the given object on the given bus.\n",
            name
        ));
        output.push_str("     *\n");
        output.push_str("     * \\param connection The bus via which the object can be reached.\n");
        output.push_str("     * \\param serviceName Name of the service the object is on.\n");
        output.push_str("     * \\param objectPath Path to the object on the service.\n");
        output.push_str("     * \\param parent Passed to the parent class constructor.\n");
        output.push_str("     */\n");
        output.push_str(&format!("    explicit {}(\n", name));
        output.push_str("        const QDBusConnection& connection,\n");
        output.push_str("        const QString& serviceName,\n");
        output.push_str("        const QString& objectPath,\n");
        output.push_str("        QObject* parent = 0\n");
        output.push_str("    );\n");

        let output = &mut text.definition;
        output.push_str(&format!(
            "\n{0}::{0}(const QString& serviceName, const QString& objectPath, QObject *parent)\n",
            name
        ));
        output.push_str(&format!(
            "    : {}(serviceName, objectPath, staticInterfaceName(), QDBusConnection::sessionBus(), parent)\n",
            PROXY_BASE_CLASS
        ));
        output.push_str("{\n}\n\n");
        output.push_str(&format!(
            "{0}::{0}(const QDBusConnection& connection, const QString& serviceName, const QString& objectPath, QObject *parent)\n",
            name
        ));
        output.push_str(&format!(
            "    : {}(serviceName, objectPath, staticInterfaceName(), connection, parent)\n",
            PROXY_BASE_CLASS
        ));
        output.push_str("{\n}\n");
    }

    /// Generates the two constructors adopting the service, path and bus of
    /// an existing primary-interface proxy.
    fn generate_adoption_constructors(&self, name: &str, text: &mut ProxyText) {
        let primary = &self.primary_class;
        let output = &mut text.declaration;

        output.push_str("\n    /**\n");
        output.push_str(&format!(
            "     * Creates a {} associated with the same object as the given proxy.\n",
            name
        ));
        output.push_str(
            "     * Additionally, the created proxy will have the same parent as the given\n",
        );
        output.push_str("     * proxy.\n");
        output.push_str("     *\n");
        output.push_str("     * \\param mainInterface The proxy to use.\n");
        output.push_str("     */\n");
        output.push_str(&format!(
            "    explicit {}(const {}& mainInterface);\n\n",
            name, primary
        ));

        output.push_str("    /**\n");
        output.push_str(&format!(
            "     * Creates a {} associated with the same object as the given proxy.\n",
            name
        ));
        output.push_str("     * However, a different parent object can be specified.\n");
        output.push_str("     *\n");
        output.push_str("     * \\param mainInterface The proxy to use.\n");
        output.push_str("     * \\param parent Passed to the parent class constructor.\n");
        output.push_str("     */\n");
        output.push_str(&format!(
            "    explicit {}(const {}& mainInterface, QObject* parent);\n",
            name, primary
        ));

        let output = &mut text.definition;
        output.push_str(&format!(
            "\n{0}::{0}(const {1}& mainInterface)\n",
            name, primary
        ));
        output.push_str(&format!(
            "    : {}(mainInterface.service(), mainInterface.path(), staticInterfaceName(), mainInterface.connection(), mainInterface.parent())\n",
            PROXY_BASE_CLASS
        ));
        output.push_str("{\n}\n\n");
        output.push_str(&format!(
            "{0}::{0}(const {1}& mainInterface, QObject *parent)\n",
            name, primary
        ));
        output.push_str(&format!(
            "    : {}(mainInterface.service(), mainInterface.path(), staticInterfaceName(), mainInterface.connection(), parent)\n",
            PROXY_BASE_CLASS
        ));
        output.push_str("{\n}\n");
    }

    /// Generates the property declaration, getter and (if writable) setter.
    fn generate_property(
        &self,
        node: &InterfaceNode,
        prop: &Property,
    ) -> Result<String, CodegenError> {
        let location = format!("{}.{}", node.interface_name, prop.name);
        let binding =
            self.resolver
                .resolve(&prop.signature, prop.annotation.as_deref(), &location)?;
        let name = &prop.name;
        let setter = prop.access.is_writable().then(|| format!("set{}", name));
        let mut output = String::new();

        output.push_str("\n    /**\n");
        output.push_str(&format!(
            "     * Represents property \"{}\" on the remote object.\n",
            name
        ));
        output.push_str(&format_docstring(prop, MEMBER_DOC_INDENT));
        output.push_str("     */\n");
        output.push_str(&format!(
            "    Q_PROPERTY({} {} READ {}{})\n\n",
            binding.storage,
            name,
            name,
            setter
                .as_ref()
                .map(|s| format!(" WRITE {}", s))
                .unwrap_or_default()
        ));

        output.push_str("    /**\n");
        output.push_str(&format!(
            "     * Getter for the remote object property \"{}\".\n",
            name
        ));
        output.push_str("     *\n");
        output.push_str(
            "     * \\return The value of the property, or a default-constructed value\n",
        );
        output.push_str("     *          if the property is not readable.\n");
        output.push_str("     */\n");
        output.push_str(&format!("    inline {} {}() const\n", binding.storage, name));
        output.push_str("    {\n");
        if prop.access.is_readable() {
            output.push_str(&format!(
                "        return qvariant_cast<{}>(internalPropGet(\"{}\"));\n",
                binding.storage, name
            ));
        } else {
            output.push_str(&format!("        return {}();\n", binding.storage));
        }
        output.push_str("    }\n");

        if let Some(setter) = setter {
            output.push_str("\n    /**\n");
            output.push_str(&format!(
                "     * Setter for the remote object property \"{}\".\n",
                name
            ));
            output.push_str("     *\n");
            output.push_str("     * \\param newValue The value to set the property to.\n");
            output.push_str("     */\n");
            output.push_str(&format!(
                "    inline void {}({} newValue)\n",
                setter, binding.input
            ));
            output.push_str("    {\n");
            output.push_str(&format!(
                "        internalPropSet(\"{}\", QVariant::fromValue(newValue));\n",
                name
            ));
            output.push_str("    }\n");
        }

        Ok(output)
    }

    /// Generates the asynchronous call wrapper for a method.
    fn generate_method(&self, node: &InterfaceNode, method: &Method) -> Result<String, CodegenError> {
        let location = format!("{}.{}", node.interface_name, method.name);
        let info = describe_args(&method.args, &self.resolver, ARG_DOC_INDENT, &location)?;
        let mut output = String::new();

        output.push_str("\n    /**\n");
        output.push_str(&format!(
            "     * Begins a call to the D-Bus method \"{}\" on the remote object.\n",
            method.name
        ));
        output.push_str(&format_docstring(method, MEMBER_DOC_INDENT));
        output.push_str(&param_docs(&info, true));
        for arg in info.outputs().filter(|a| !a.doc.is_empty()) {
            output.push_str("     *\n");
            output.push_str("     * \\return\n");
            output.push_str(&arg.doc);
        }
        output.push_str("     */\n");

        let return_types = info
            .outputs()
            .map(|a| a.binding.storage.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let params = info
            .inputs()
            .map(|a| format!("{} {}", a.binding.input, a.name))
            .collect::<Vec<_>>()
            .join(", ");

        output.push_str(&format!(
            "    inline QDBusPendingReply<{}> {}({})\n",
            return_types, method.name, params
        ));
        output.push_str("    {\n");

        let packaged: Vec<String> = info
            .inputs()
            .map(|a| format!("QVariant::fromValue({})", a.name))
            .collect();
        if packaged.is_empty() {
            output.push_str(&format!(
                "        return asyncCall(QLatin1String(\"{}\"));\n",
                method.name
            ));
        } else {
            output.push_str("        QList<QVariant> argumentList;\n");
            output.push_str(&format!(
                "        argumentList << {};\n",
                packaged.join(" << ")
            ));
            output.push_str(&format!(
                "        return asyncCallWithArgumentList(QLatin1String(\"{}\"), argumentList);\n",
                method.name
            ));
        }
        output.push_str("    }\n");

        Ok(output)
    }

    /// Generates the declaration of a signal.
    fn generate_signal(&self, node: &InterfaceNode, signal: &Signal) -> Result<String, CodegenError> {
        let location = format!("{}.{}", node.interface_name, signal.name);
        let info = describe_args(&signal.args, &self.resolver, ARG_DOC_INDENT, &location)?;
        let mut output = String::new();

        output.push_str("\n    /**\n");
        output.push_str(&format!(
            "     * Represents the signal \"{}\" on the remote object.\n",
            signal.name
        ));
        output.push_str(&format_docstring(signal, MEMBER_DOC_INDENT));
        output.push_str(&param_docs(&info, false));
        output.push_str("     */\n");

        let params = info
            .args
            .iter()
            .map(|a| format!("{} {}", a.binding.input, a.name))
            .collect::<Vec<_>>()
            .join(", ");
        output.push_str(&format!("    void {}({});\n", signal.name, params));

        Ok(output)
    }
}

/// `\param` blocks for documented arguments; only inputs when `inputs_only`.
fn param_docs(info: &MemberInfo, inputs_only: bool) -> String {
    let mut output = String::new();
    let args: Box<dyn Iterator<Item = &ArgInfo> + '_> = if inputs_only {
        Box::new(info.inputs())
    } else {
        Box::new(info.args.iter())
    };

    for arg in args.filter(|a| !a.doc.is_empty()) {
        output.push_str("     *\n");
        output.push_str(&format!("     * \\param {}\n", arg.name));
        output.push_str(&arg.doc);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfigBuilder;
    use dbusproxy_schema::{AccessMode, Arg, Direction, Docstring, Member, TypeContext};

    fn config(primary: Option<&str>) -> GeneratorConfig {
        let mut builder = GeneratorConfigBuilder::new()
            .header_file("out/cli.h")
            .impl_file("out/cli.cpp")
            .namespace("Tp::Client")
            .types_namespace("Tp")
            .real_include("TelepathyQt/_gen/cli.h")
            .pretty_include("TelepathyQt/Client")
            .types_include("TelepathyQt/types.h");
        if let Some(primary) = primary {
            builder = builder.primary_interface(primary);
        }
        builder.build().expect("valid config")
    }

    fn connection_node() -> InterfaceNode {
        let mut node = InterfaceNode::new(
            "/Connection".to_string(),
            "org.freedesktop.Telepathy.Connection".to_string(),
        );
        node.add_member(Member::Property(Property::new(
            "Status".to_string(),
            AccessMode::ReadWrite,
            "u".to_string(),
        )));
        let mut method = Method::new("Method".to_string());
        method.add_arg(Arg::new(Some("name".to_string()), "s".to_string(), Direction::In));
        method.add_arg(Arg::new(
            Some("result".to_string()),
            "u".to_string(),
            Direction::Out,
        ));
        node.add_member(Member::Method(method));
        let mut signal = Signal::new("Signal".to_string());
        signal.add_arg(Arg::new(Some("a".to_string()), "s".to_string(), Direction::Out));
        signal.add_arg(Arg::new(Some("b".to_string()), "u".to_string(), Direction::Out));
        node.add_member(Member::Signal(signal));
        node
    }

    fn emit(node: &InterfaceNode, primary: Option<&str>) -> ProxyText {
        let config = config(primary);
        let context = TypeContext::default();
        let resolver = TypeResolver::new(&context, &config.types_namespace);
        ProxyEmitter::new(&config, resolver)
            .emit(node)
            .expect("emitted")
    }

    #[test]
    fn test_emit_prologue() {
        let text = emit(&connection_node(), Some("/Connection"));

        assert!(text.declaration.contains(" * \\class ConnectionInterface\n"));
        assert!(text.declaration.contains(
            " * \\headerfile TelepathyQt/_gen/cli.h <TelepathyQt/Client>\n"
        ));
        assert!(text.declaration.contains(" * \\ingroup no-group-defined\n"));
        assert!(text
            .declaration
            .contains("class ConnectionInterface : public QDBusAbstractInterface\n"));
        assert!(text
            .declaration
            .contains("        return \"org.freedesktop.Telepathy.Connection\";\n"));
        assert!(text.definition.contains(
            "ConnectionInterface::ConnectionInterface(const QString& serviceName, const QString& objectPath, QObject *parent)\n"
        ));
        assert!(text.definition.contains("QDBusConnection::sessionBus()"));
        assert!(text.declaration.ends_with("};\n"));
    }

    #[test]
    fn test_emit_primary_has_no_adoption_constructors() {
        let text = emit(&connection_node(), Some("/Connection"));
        assert!(!text.declaration.contains("mainInterface"));
        assert!(!text.definition.contains("mainInterface"));
    }

    #[test]
    fn test_emit_secondary_adoption_constructors() {
        let node = InterfaceNode::new(
            "/Conn/Caps".to_string(),
            "org.example.Conn.Caps".to_string(),
        );
        let text = emit(&node, Some("/Conn"));

        assert!(text
            .declaration
            .contains("    explicit ConnCapsInterface(const ConnInterface& mainInterface);\n"));
        assert!(text.declaration.contains(
            "    explicit ConnCapsInterface(const ConnInterface& mainInterface, QObject* parent);\n"
        ));
        assert!(text.definition.contains("mainInterface.parent())\n"));
        assert!(text.definition.contains(
            "ConnCapsInterface::ConnCapsInterface(const ConnInterface& mainInterface, QObject *parent)\n"
        ));
    }

    #[test]
    fn test_emit_without_primary_adopts_from_base() {
        let text = emit(&connection_node(), None);
        assert!(text.declaration.contains(
            "    explicit ConnectionInterface(const QDBusAbstractInterface& mainInterface);\n"
        ));
    }

    #[test]
    fn test_emit_readwrite_property() {
        let text = emit(&connection_node(), Some("/Connection"));

        assert!(text
            .declaration
            .contains("    Q_PROPERTY(uint Status READ Status WRITE setStatus)\n"));
        assert!(text.declaration.contains("    inline uint Status() const\n"));
        assert!(text
            .declaration
            .contains("        return qvariant_cast<uint>(internalPropGet(\"Status\"));\n"));
        assert!(text.declaration.contains("    inline void setStatus(uint newValue)\n"));
        assert!(text
            .declaration
            .contains("        internalPropSet(\"Status\", QVariant::fromValue(newValue));\n"));
    }

    #[test]
    fn test_emit_property_access_gating() {
        let mut node = InterfaceNode::new("/Conn".to_string(), "org.example.Conn".to_string());
        node.add_member(Member::Property(Property::new(
            "Secret".to_string(),
            AccessMode::Write,
            "s".to_string(),
        )));
        node.add_member(Member::Property(Property::new(
            "Name".to_string(),
            AccessMode::Read,
            "s".to_string(),
        )));
        let mut hidden = Property::new("Hidden".to_string(), AccessMode::Read, "s".to_string());
        hidden.annotation_only = true;
        node.add_member(Member::Property(hidden));

        let text = emit(&node, Some("/Conn"));

        assert!(text.declaration.contains("        return QString();\n"));
        assert!(text
            .declaration
            .contains("    inline void setSecret(const QString& newValue)\n"));
        assert!(text
            .declaration
            .contains("    Q_PROPERTY(QString Name READ Name)\n"));
        assert!(!text.declaration.contains("setName"));
        assert!(!text.declaration.contains("Hidden"));
    }

    #[test]
    fn test_emit_method() {
        let text = emit(&connection_node(), Some("/Connection"));

        assert!(text.declaration.contains("\npublic Q_SLOTS:\n"));
        assert!(text.declaration.contains(
            "    inline QDBusPendingReply<uint> Method(const QString& name)\n"
        ));
        assert!(text
            .declaration
            .contains("        argumentList << QVariant::fromValue(name);\n"));
        assert!(text.declaration.contains(
            "        return asyncCallWithArgumentList(QLatin1String(\"Method\"), argumentList);\n"
        ));
    }

    #[test]
    fn test_emit_method_direction_order() {
        let mut node = InterfaceNode::new("/Conn".to_string(), "org.example.Conn".to_string());
        let mut method = Method::new("Mixed".to_string());
        method.add_arg(Arg::new(Some("a".to_string()), "u".to_string(), Direction::In));
        method.add_arg(Arg::new(Some("x".to_string()), "s".to_string(), Direction::Out));
        method.add_arg(Arg::new(Some("b".to_string()), "b".to_string(), Direction::In));
        method.add_arg(Arg::new(Some("y".to_string()), "ao".to_string(), Direction::Out));
        node.add_member(Member::Method(method));

        let text = emit(&node, Some("/Conn"));

        assert!(text.declaration.contains(
            "    inline QDBusPendingReply<QString, Tp::ObjectPathList> Mixed(uint a, bool b)\n"
        ));
        assert!(text.declaration.contains(
            "        argumentList << QVariant::fromValue(a) << QVariant::fromValue(b);\n"
        ));
    }

    #[test]
    fn test_emit_method_without_inputs() {
        let mut node = InterfaceNode::new("/Conn".to_string(), "org.example.Conn".to_string());
        node.add_member(Member::Method(Method::new("Disconnect".to_string())));

        let text = emit(&node, Some("/Conn"));

        assert!(text
            .declaration
            .contains("    inline QDBusPendingReply<> Disconnect()\n"));
        assert!(text
            .declaration
            .contains("        return asyncCall(QLatin1String(\"Disconnect\"));\n"));
        assert!(!text.declaration.contains("argumentList"));
    }

    #[test]
    fn test_emit_signal() {
        let text = emit(&connection_node(), Some("/Connection"));

        assert!(text.declaration.contains("\nQ_SIGNALS:\n"));
        assert!(text
            .declaration
            .contains("    void Signal(const QString& a, uint b);\n"));
        assert!(!text.definition.contains("Signal"));
    }

    #[test]
    fn test_emit_method_docs() {
        let mut node = InterfaceNode::new("/Conn".to_string(), "org.example.Conn".to_string());
        let mut method = Method::new("Request".to_string());
        method.docstring = Some(Docstring::new("Requests a thing."));
        let mut input = Arg::new(Some("Kind".to_string()), "s".to_string(), Direction::In);
        input.docstring = Some(Docstring::new("The kind."));
        method.add_arg(input);
        let mut output = Arg::new(None, "o".to_string(), Direction::Out);
        output.docstring = Some(Docstring::new("The path."));
        method.add_arg(output);
        node.add_member(Member::Method(method));

        let text = emit(&node, Some("/Conn"));

        assert!(text.declaration.contains("     * Requests a thing.\n"));
        assert!(text
            .declaration
            .contains("     *\n     * \\param kind\n     *     The kind.\n"));
        assert!(text
            .declaration
            .contains("     *\n     * \\return\n     *     The path.\n"));
    }

    #[test]
    fn test_emit_unresolvable_type_fails() {
        let mut node = InterfaceNode::new("/Conn".to_string(), "org.example.Conn".to_string());
        let mut prop = Property::new("Things".to_string(), AccessMode::Read, "a(us)".to_string());
        prop.annotation = Some("Thing[]".to_string());
        node.add_member(Member::Property(prop));

        let config = config(Some("/Conn"));
        let context = TypeContext::default();
        let resolver = TypeResolver::new(&context, &config.types_namespace);
        let result = ProxyEmitter::new(&config, resolver).emit(&node);

        assert!(matches!(result, Err(CodegenError::UnknownCustomList { .. })));
    }
}
