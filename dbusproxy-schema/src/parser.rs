//! Introspection and specification document loaders.
//!
//! Both documents share one element vocabulary (`node`, `interface`,
//! `property`, `method`, `signal`, `arg`, `tp:docstring`, ...), so a single
//! event-driven walker serves both. The introspection loader keeps the
//! interface nodes; the specification loader additionally keeps the declared
//! types and requires a `tp:spec` root element.
//!
//! Element and attribute names are matched after namespace resolution: any
//! prefix bound to the Telepathy extensions namespace reads as `tp:`, and an
//! undeclared `tp:` prefix is accepted as written.

use crate::error::ParseError;
use crate::interfaces::{
    AccessMode, Arg, Direction, Docstring, InterfaceNode, Member, Method, Property, Signal,
};
use crate::types::{DeclKind, SpecDocument, TypeDecl};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, QName, ResolveResult};

/// Namespace of the Telepathy extension elements and attributes.
const TP_NAMESPACE: &[u8] = b"http://telepathy.freedesktop.org/wiki/DbusSpec#extensions-v0";

/// Elements whose boundaries separate paragraphs inside a docstring.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "pre", "ul", "ol", "li", "dl", "dt", "dd", "blockquote", "table", "tr", "h1",
    "h2", "h3", "h4",
];

/// Everything gathered while walking a document.
#[derive(Debug, Default)]
struct Collector {
    nodes: Vec<InterfaceNode>,
    types: Vec<TypeDecl>,
}

/// Parses an introspection document into its interface nodes.
///
/// Interface nodes are collected wherever they appear in the document, in
/// document order.
///
/// # Arguments
/// * `xml` - Introspection document content
///
/// # Errors
/// Returns `ParseError` if the XML is malformed or an element is missing a
/// required attribute.
pub fn parse_introspection(xml: &str) -> Result<Vec<InterfaceNode>, ParseError> {
    let collector = parse_document(xml, None)?;
    tracing::debug!(
        "Parsed introspection document with {} interface nodes",
        collector.nodes.len()
    );
    Ok(collector.nodes)
}

/// Parses a specification document.
///
/// # Arguments
/// * `xml` - Specification document content
///
/// # Errors
/// Returns `ParseError` if the XML is malformed, the root element is not
/// `tp:spec`, or a declaration is missing a required attribute.
pub fn parse_spec(xml: &str) -> Result<SpecDocument, ParseError> {
    let collector = parse_document(xml, Some("tp:spec"))?;
    tracing::debug!(
        "Parsed specification document with {} declared types and {} interfaces",
        collector.types.len(),
        collector.nodes.len()
    );

    let mut spec = SpecDocument::new();
    spec.interfaces = collector.nodes;
    for decl in collector.types {
        spec.add_type(decl);
    }
    Ok(spec)
}

/// Walks a whole document, optionally requiring a given root element.
fn parse_document(xml: &str, required_root: Option<&str>) -> Result<Collector, ParseError> {
    let mut reader = NsReader::from_str(xml);
    let mut collector = Collector::default();
    let mut buf = Vec::new();
    let mut seen_root = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = tag_name(&reader, e)?;
                check_root(&name, required_root, &mut seen_root)?;
                if name == "node" {
                    parse_node(&mut reader, e, &mut collector)?;
                } else {
                    walk(&mut reader, &mut collector)?;
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = tag_name(&reader, e)?;
                check_root(&name, required_root, &mut seen_root)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(ParseError::structure(match required_root {
            Some(root) => format!("document has no '{}' root element", root),
            None => "document has no root element".to_string(),
        }));
    }

    Ok(collector)
}

/// Verifies the first element of a document against the required root.
fn check_root(
    name: &str,
    required_root: Option<&str>,
    seen_root: &mut bool,
) -> Result<(), ParseError> {
    if *seen_root {
        return Ok(());
    }
    *seen_root = true;
    match required_root {
        Some(root) if root != name => Err(ParseError::structure(format!(
            "expected '{}' root element, found '{}'",
            root, name
        ))),
        _ => Ok(()),
    }
}

/// Descends through an element of no particular meaning, collecting any
/// nodes and declarations found below it. Consumes the element's end tag.
fn walk(reader: &mut NsReader<&[u8]>, collector: &mut Collector) -> Result<(), ParseError> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = tag_name(reader, e)?;
                if name == "node" {
                    parse_node(reader, e, collector)?;
                } else if let Some(kind) = DeclKind::from_element(&name) {
                    let decl = parse_type_decl(reader, e, kind, true)?;
                    collector.types.push(decl);
                } else {
                    walk(reader, collector)?;
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = tag_name(reader, e)?;
                if let Some(kind) = DeclKind::from_element(&name) {
                    let decl = parse_type_decl(reader, e, kind, false)?;
                    collector.types.push(decl);
                }
            }
            Ok(Event::End(_)) | Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Parses a `node` element, which holds at most one interface and possibly
/// nested child nodes.
fn parse_node(
    reader: &mut NsReader<&[u8]>,
    e: &BytesStart<'_>,
    collector: &mut Collector,
) -> Result<(), ParseError> {
    let mut name = None;

    for attr in e.attributes().flatten() {
        let key = attr_name(reader, attr.key)?;
        let value = std::str::from_utf8(&attr.value)?;

        if key == "name" {
            name = Some(value.to_string());
        }
    }

    let mut interface: Option<InterfaceNode> = None;
    let mut has_child_nodes = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let tag = tag_name(reader, e)?;
                match tag.as_str() {
                    "interface" => {
                        let parsed = parse_interface(reader, e, true, collector)?;
                        set_interface(&mut interface, parsed, name.as_deref())?;
                    }
                    "node" => {
                        has_child_nodes = true;
                        parse_node(reader, e, collector)?;
                    }
                    _ => {
                        if let Some(kind) = DeclKind::from_element(&tag) {
                            let decl = parse_type_decl(reader, e, kind, true)?;
                            collector.types.push(decl);
                        } else {
                            skip_to_end(reader)?;
                        }
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                let tag = tag_name(reader, e)?;
                match tag.as_str() {
                    "interface" => {
                        let parsed = parse_interface(reader, e, false, collector)?;
                        set_interface(&mut interface, parsed, name.as_deref())?;
                    }
                    // Child reference, as in `<node name="Sub"/>`.
                    "node" => has_child_nodes = true,
                    _ => {
                        if let Some(kind) = DeclKind::from_element(&tag) {
                            let decl = parse_type_decl(reader, e, kind, false)?;
                            collector.types.push(decl);
                        }
                    }
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::structure("unterminated 'node' element"));
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    match (name, interface) {
        (Some(name), Some(mut iface)) => {
            iface.name = name;
            collector.nodes.push(iface);
        }
        (None, Some(iface)) => {
            return Err(ParseError::structure(format!(
                "node holding interface '{}' has no name",
                iface.interface_name
            )));
        }
        // Containers such as `<node name="/">` only group other nodes.
        (Some(name), None) if !has_child_nodes => {
            return Err(ParseError::structure(format!(
                "node '{}' has no interface element",
                name
            )));
        }
        (_, None) => {}
    }

    Ok(())
}

/// Stores the interface of a node, rejecting a second one.
fn set_interface(
    slot: &mut Option<InterfaceNode>,
    parsed: InterfaceNode,
    node_name: Option<&str>,
) -> Result<(), ParseError> {
    if slot.is_some() {
        return Err(ParseError::structure(format!(
            "node '{}' has more than one interface element",
            node_name.unwrap_or("<unnamed>")
        )));
    }
    *slot = Some(parsed);
    Ok(())
}

/// Parses an `interface` element. The returned node has an empty name; the
/// caller fills it in from the enclosing `node`.
fn parse_interface(
    reader: &mut NsReader<&[u8]>,
    e: &BytesStart<'_>,
    has_children: bool,
    collector: &mut Collector,
) -> Result<InterfaceNode, ParseError> {
    let mut interface_name = None;

    for attr in e.attributes().flatten() {
        let key = attr_name(reader, attr.key)?;
        let value = std::str::from_utf8(&attr.value)?;

        if key == "name" {
            interface_name = Some(value.to_string());
        }
    }

    let interface_name =
        interface_name.ok_or_else(|| ParseError::missing_attr("interface", "name"))?;
    let mut iface = InterfaceNode::new(String::new(), interface_name);

    if !has_children {
        return Ok(iface);
    }

    let mut buf = Vec::new();

    loop {
        let next = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => Some((e.into_owned(), true)),
            Ok(Event::Empty(e)) => Some((e.into_owned(), false)),
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::structure(format!(
                    "unterminated interface '{}'",
                    iface.interface_name
                )));
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => None,
        };
        buf.clear();
        let Some((e, children)) = next else {
            continue;
        };

        let tag = tag_name(reader, &e)?;
        match tag.as_str() {
            "property" | "tp:property" => {
                let prop = parse_property(reader, &e, children, tag == "tp:property")?;
                iface.add_member(Member::Property(prop));
            }
            "method" => {
                let method = parse_method(reader, &e, children)?;
                iface.add_member(Member::Method(method));
            }
            "signal" => {
                let signal = parse_signal(reader, &e, children)?;
                iface.add_member(Member::Signal(signal));
            }
            "tp:docstring" if children => {
                iface.docstring = non_blank(read_docstring(reader)?);
            }
            _ => {
                if let Some(kind) = DeclKind::from_element(&tag) {
                    let decl = parse_type_decl(reader, &e, kind, children)?;
                    collector.types.push(decl);
                } else if children {
                    skip_to_end(reader)?;
                }
            }
        }
    }

    Ok(iface)
}

/// Parses a `property` or `tp:property` element.
fn parse_property(
    reader: &mut NsReader<&[u8]>,
    e: &BytesStart<'_>,
    has_children: bool,
    annotation_only: bool,
) -> Result<Property, ParseError> {
    let element = if annotation_only {
        "tp:property"
    } else {
        "property"
    };
    let mut name = None;
    let mut signature = None;
    let mut access = None;
    let mut annotation = None;

    for attr in e.attributes().flatten() {
        let key = attr_name(reader, attr.key)?;
        let value = std::str::from_utf8(&attr.value)?;

        match key.as_str() {
            "name" => name = Some(value.to_string()),
            "type" => signature = Some(value.to_string()),
            "access" => {
                access = Some(
                    AccessMode::parse(value)
                        .ok_or_else(|| ParseError::invalid_attr(element, "access", value))?,
                )
            }
            "tp:type" => annotation = Some(value.to_string()),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr(element, "name"))?;
    let signature = signature.ok_or_else(|| ParseError::missing_attr(element, "type"))?;
    let access = match access {
        Some(access) => access,
        None if annotation_only => AccessMode::Read,
        None => return Err(ParseError::missing_attr(element, "access")),
    };

    let mut prop = Property::new(name, access, signature);
    prop.annotation = annotation;
    prop.annotation_only = annotation_only;

    if has_children {
        prop.docstring = read_member_docstring(reader)?;
    }

    Ok(prop)
}

/// Parses a `method` element.
fn parse_method(
    reader: &mut NsReader<&[u8]>,
    e: &BytesStart<'_>,
    has_children: bool,
) -> Result<Method, ParseError> {
    let name = required_name(reader, e, "method")?;
    let mut method = Method::new(name);

    if has_children {
        let (args, docstring) = parse_args(reader, "method")?;
        for arg in args {
            method.add_arg(arg);
        }
        method.docstring = docstring;
    }

    Ok(method)
}

/// Parses a `signal` element.
fn parse_signal(
    reader: &mut NsReader<&[u8]>,
    e: &BytesStart<'_>,
    has_children: bool,
) -> Result<Signal, ParseError> {
    let name = required_name(reader, e, "signal")?;
    let mut signal = Signal::new(name);

    if has_children {
        let (args, docstring) = parse_args(reader, "signal")?;
        for arg in args {
            signal.add_arg(arg);
        }
        signal.docstring = docstring;
    }

    Ok(signal)
}

/// Reads the children of a method or signal: its args and docstring.
fn parse_args(
    reader: &mut NsReader<&[u8]>,
    element: &str,
) -> Result<(Vec<Arg>, Option<Docstring>), ParseError> {
    let mut args = Vec::new();
    let mut docstring = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let tag = tag_name(reader, e)?;
                match tag.as_str() {
                    "arg" => args.push(parse_arg(reader, e, true)?),
                    "tp:docstring" => docstring = non_blank(read_docstring(reader)?),
                    _ => skip_to_end(reader)?,
                }
            }
            Ok(Event::Empty(ref e)) => {
                if tag_name(reader, e)? == "arg" {
                    args.push(parse_arg(reader, e, false)?);
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::structure(format!(
                    "unterminated '{}' element",
                    element
                )));
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok((args, docstring))
}

/// Parses an `arg` element.
fn parse_arg(
    reader: &mut NsReader<&[u8]>,
    e: &BytesStart<'_>,
    has_children: bool,
) -> Result<Arg, ParseError> {
    let mut name = None;
    let mut signature = None;
    let mut direction = Direction::In;
    let mut annotation = None;

    for attr in e.attributes().flatten() {
        let key = attr_name(reader, attr.key)?;
        let value = std::str::from_utf8(&attr.value)?;

        match key.as_str() {
            "name" if !value.is_empty() => name = Some(value.to_string()),
            "type" => signature = Some(value.to_string()),
            "direction" => {
                direction = Direction::parse(value)
                    .ok_or_else(|| ParseError::invalid_attr("arg", "direction", value))?
            }
            "tp:type" => annotation = Some(value.to_string()),
            _ => {}
        }
    }

    let signature = signature.ok_or_else(|| ParseError::missing_attr("arg", "type"))?;
    let mut arg = Arg::new(name, signature, direction);
    arg.annotation = annotation;

    if has_children {
        arg.docstring = read_member_docstring(reader)?;
    }

    Ok(arg)
}

/// Parses a declared type (`tp:struct`, `tp:mapping`, `tp:enum`, `tp:flags`,
/// `tp:simple-type`, `tp:external-type`).
fn parse_type_decl(
    reader: &mut NsReader<&[u8]>,
    e: &BytesStart<'_>,
    kind: DeclKind,
    has_children: bool,
) -> Result<TypeDecl, ParseError> {
    let element = tag_name(reader, e)?;
    let mut name = None;
    let mut signature = None;
    let mut array_name = None;

    for attr in e.attributes().flatten() {
        let key = attr_name(reader, attr.key)?;
        let value = std::str::from_utf8(&attr.value)?;

        match key.as_str() {
            "name" => name = Some(value.to_string()),
            "type" => signature = Some(value.to_string()),
            "array-name" if !value.is_empty() => array_name = Some(value.to_string()),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr(element.as_str(), "name"))?;
    if kind == DeclKind::External && signature.is_none() {
        return Err(ParseError::missing_attr(element.as_str(), "type"));
    }

    let mut decl = TypeDecl::new(name, kind);
    decl.array_name = array_name;

    let mut member_types = Vec::new();
    if has_children {
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let tag = tag_name(reader, e)?;
                    match tag.as_str() {
                        "tp:member" => {
                            member_types.push(member_type(reader, e)?);
                            skip_to_end(reader)?;
                        }
                        _ => skip_to_end(reader)?,
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if tag_name(reader, e)? == "tp:member" {
                        member_types.push(member_type(reader, e)?);
                    }
                }
                Ok(Event::End(_)) => break,
                Ok(Event::Eof) => {
                    return Err(ParseError::structure(format!(
                        "unterminated '{}' element",
                        element
                    )));
                }
                Err(e) => return Err(ParseError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }
    }

    decl.signature = match kind {
        DeclKind::Struct if !member_types.is_empty() => {
            Some(format!("({})", member_types.concat()))
        }
        DeclKind::Mapping if !member_types.is_empty() => {
            Some(format!("a{{{}}}", member_types.concat()))
        }
        DeclKind::Struct | DeclKind::Mapping => None,
        DeclKind::Enum | DeclKind::Flags | DeclKind::SimpleType | DeclKind::External => signature,
    };

    Ok(decl)
}

/// Reads the `type` attribute of a `tp:member`.
fn member_type(reader: &NsReader<&[u8]>, e: &BytesStart<'_>) -> Result<String, ParseError> {
    for attr in e.attributes().flatten() {
        let key = attr_name(reader, attr.key)?;
        if key == "type" {
            return Ok(std::str::from_utf8(&attr.value)?.to_string());
        }
    }
    Err(ParseError::missing_attr("tp:member", "type"))
}

/// Reads a required `name` attribute.
fn required_name(
    reader: &NsReader<&[u8]>,
    e: &BytesStart<'_>,
    element: &str,
) -> Result<String, ParseError> {
    for attr in e.attributes().flatten() {
        let key = attr_name(reader, attr.key)?;
        if key == "name" {
            return Ok(std::str::from_utf8(&attr.value)?.to_string());
        }
    }
    Err(ParseError::missing_attr(element, "name"))
}

/// Reads the children of a property or arg, keeping only its docstring.
fn read_member_docstring(reader: &mut NsReader<&[u8]>) -> Result<Option<Docstring>, ParseError> {
    let mut docstring = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if tag_name(reader, e)? == "tp:docstring" {
                    docstring = non_blank(read_docstring(reader)?);
                } else {
                    skip_to_end(reader)?;
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::structure("unterminated member element"));
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(docstring)
}

/// Collects the descendant text of a docstring element, marking block
/// element boundaries as paragraph breaks. Consumes the end tag.
fn read_docstring(reader: &mut NsReader<&[u8]>) -> Result<Docstring, ParseError> {
    let mut text = String::new();
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                if is_block(e.local_name().as_ref()) {
                    text.push_str("\n\n");
                }
            }
            Ok(Event::Empty(_)) => text.push(' '),
            Ok(Event::End(ref e)) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                if is_block(e.local_name().as_ref()) {
                    text.push_str("\n\n");
                }
            }
            Ok(Event::Text(ref t)) => text.push_str(std::str::from_utf8(t)?),
            Ok(Event::CData(ref t)) => text.push_str(std::str::from_utf8(t)?),
            Ok(Event::GeneralRef(ref r)) => {
                text.push_str(&resolve_entity(std::str::from_utf8(r)?));
            }
            Ok(Event::Eof) => {
                return Err(ParseError::structure("unterminated 'tp:docstring' element"));
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(Docstring::new(text))
}

/// Resolves a predefined or character entity reference by name.
fn resolve_entity(name: &str) -> String {
    let resolved = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => name
            .strip_prefix("#x")
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()))
            .and_then(char::from_u32),
    };
    resolved.map_or_else(|| format!("&{};", name), String::from)
}

fn is_block(local_name: &[u8]) -> bool {
    std::str::from_utf8(local_name).is_ok_and(|n| BLOCK_ELEMENTS.contains(&n))
}

fn non_blank(docstring: Docstring) -> Option<Docstring> {
    (!docstring.is_blank()).then_some(docstring)
}

/// Returns the element name, with the Telepathy namespace spelled `tp:`.
fn tag_name(reader: &NsReader<&[u8]>, e: &BytesStart<'_>) -> Result<String, ParseError> {
    let (resolved, local) = reader.resolve_element(e.name());
    qualified(resolved, local.as_ref(), e.name().as_ref())
}

/// Returns an attribute name, with the Telepathy namespace spelled `tp:`.
fn attr_name(reader: &NsReader<&[u8]>, key: QName<'_>) -> Result<String, ParseError> {
    let (resolved, local) = reader.resolve_attribute(key);
    qualified(resolved, local.as_ref(), key.as_ref())
}

fn qualified(resolved: ResolveResult<'_>, local: &[u8], raw: &[u8]) -> Result<String, ParseError> {
    let name = match resolved {
        ResolveResult::Bound(Namespace(ns)) if ns == TP_NAMESPACE => {
            format!("tp:{}", std::str::from_utf8(local)?)
        }
        ResolveResult::Unbound => std::str::from_utf8(local)?.to_string(),
        _ => std::str::from_utf8(raw)?.to_string(),
    };
    Ok(name)
}

/// Skips to the end of the current element.
fn skip_to_end(reader: &mut NsReader<&[u8]>) -> Result<(), ParseError> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}
