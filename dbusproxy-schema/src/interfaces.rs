//! Interface node definitions.
//!
//! This module contains the data structures representing the remote
//! interfaces listed in an introspection document: interface nodes and their
//! properties, methods, signals and arguments.

/// Free-text documentation captured from a `tp:docstring` element.
///
/// Markup is dropped at load time. Paragraph boundaries are kept as blank
/// lines (`"\n\n"`); all other whitespace is left as it appeared in the
/// source and collapsed by the formatter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Docstring {
    text: String,
}

impl Docstring {
    /// Creates a docstring from already extracted text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Splits the text into paragraphs with whitespace collapsed.
    ///
    /// Empty paragraphs are skipped.
    #[must_use]
    pub fn paragraphs(&self) -> Vec<String> {
        self.text
            .split("\n\n")
            .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Returns true if the docstring holds no visible text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Anything that may carry a docstring.
pub trait Documented {
    /// Returns the attached documentation, if any.
    fn docstring(&self) -> Option<&Docstring>;
}

/// Access mode of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Read-only property.
    Read,
    /// Write-only property.
    Write,
    /// Read-write property.
    ReadWrite,
}

impl AccessMode {
    /// Parses an access mode from its attribute value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            "readwrite" => Some(Self::ReadWrite),
            _ => None,
        }
    }

    /// Returns true if the property can be read.
    #[must_use]
    pub const fn is_readable(&self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    /// Returns true if the property can be written.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

/// Direction of a method or signal argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Passed from caller to the remote object.
    #[default]
    In,
    /// Returned from the remote object.
    Out,
}

impl Direction {
    /// Parses a direction from its attribute value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            _ => None,
        }
    }
}

/// Argument of a method or signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    /// Argument name, if the document gives one.
    pub name: Option<String>,
    /// Wire type signature.
    pub signature: String,
    /// Semantic type annotation (`tp:type`).
    pub annotation: Option<String>,
    /// Documentation.
    pub docstring: Option<Docstring>,
    /// Argument direction.
    pub direction: Direction,
}

impl Arg {
    /// Creates a new argument.
    #[must_use]
    pub fn new(name: Option<String>, signature: String, direction: Direction) -> Self {
        Self {
            name,
            signature,
            annotation: None,
            docstring: None,
            direction,
        }
    }
}

impl Documented for Arg {
    fn docstring(&self) -> Option<&Docstring> {
        self.docstring.as_ref()
    }
}

/// Property of a remote interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Access mode.
    pub access: AccessMode,
    /// Wire type signature.
    pub signature: String,
    /// Semantic type annotation (`tp:type`).
    pub annotation: Option<String>,
    /// Documentation.
    pub docstring: Option<Docstring>,
    /// True for namespaced `tp:property` elements, which only annotate the
    /// interface and never produce accessors.
    pub annotation_only: bool,
}

impl Property {
    /// Creates a new property.
    #[must_use]
    pub fn new(name: String, access: AccessMode, signature: String) -> Self {
        Self {
            name,
            access,
            signature,
            annotation: None,
            docstring: None,
            annotation_only: false,
        }
    }
}

impl Documented for Property {
    fn docstring(&self) -> Option<&Docstring> {
        self.docstring.as_ref()
    }
}

/// Method of a remote interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Method name on the wire.
    pub name: String,
    /// Arguments in declaration order.
    pub args: Vec<Arg>,
    /// Documentation.
    pub docstring: Option<Docstring>,
}

impl Method {
    /// Creates a new method with no arguments.
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            name,
            args: Vec::new(),
            docstring: None,
        }
    }

    /// Adds an argument.
    pub fn add_arg(&mut self, arg: Arg) {
        self.args.push(arg);
    }
}

impl Documented for Method {
    fn docstring(&self) -> Option<&Docstring> {
        self.docstring.as_ref()
    }
}

/// Signal of a remote interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    /// Signal name on the wire.
    pub name: String,
    /// Arguments in declaration order, all output-direction.
    pub args: Vec<Arg>,
    /// Documentation.
    pub docstring: Option<Docstring>,
}

impl Signal {
    /// Creates a new signal with no arguments.
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            name,
            args: Vec::new(),
            docstring: None,
        }
    }

    /// Adds an argument, forcing it to the output direction.
    pub fn add_arg(&mut self, mut arg: Arg) {
        arg.direction = Direction::Out;
        self.args.push(arg);
    }
}

impl Documented for Signal {
    fn docstring(&self) -> Option<&Docstring> {
        self.docstring.as_ref()
    }
}

/// Member of an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    /// Property member.
    Property(Property),
    /// Method member.
    Method(Method),
    /// Signal member.
    Signal(Signal),
}

impl Member {
    /// Returns the member name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Property(p) => &p.name,
            Self::Method(m) => &m.name,
            Self::Signal(s) => &s.name,
        }
    }

    /// Returns a short label for the member kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Property(_) => "property",
            Self::Method(_) => "method",
            Self::Signal(_) => "signal",
        }
    }
}

/// A named remote interface node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceNode {
    /// Node name (e.g. `/Connection`), used to derive the proxy class name.
    pub name: String,
    /// Wire-level interface identifier.
    pub interface_name: String,
    /// Documentation attached to the interface element.
    pub docstring: Option<Docstring>,
    /// Members in document order.
    pub members: Vec<Member>,
}

impl InterfaceNode {
    /// Creates a new interface node with no members.
    #[must_use]
    pub fn new(name: String, interface_name: String) -> Self {
        Self {
            name,
            interface_name,
            docstring: None,
            members: Vec::new(),
        }
    }

    /// Adds a member.
    pub fn add_member(&mut self, member: Member) {
        self.members.push(member);
    }

    /// Iterates over properties in document order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.members.iter().filter_map(|m| match m {
            Member::Property(p) => Some(p),
            _ => None,
        })
    }

    /// Iterates over methods in document order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(m) => Some(m),
            _ => None,
        })
    }

    /// Iterates over signals in document order.
    pub fn signals(&self) -> impl Iterator<Item = &Signal> {
        self.members.iter().filter_map(|m| match m {
            Member::Signal(s) => Some(s),
            _ => None,
        })
    }

    /// Returns true if the node has at least one method.
    #[must_use]
    pub fn has_methods(&self) -> bool {
        self.methods().next().is_some()
    }

    /// Returns true if the node has at least one signal.
    #[must_use]
    pub fn has_signals(&self) -> bool {
        self.signals().next().is_some()
    }
}

impl Documented for InterfaceNode {
    fn docstring(&self) -> Option<&Docstring> {
        self.docstring.as_ref()
    }
}
