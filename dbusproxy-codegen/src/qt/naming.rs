//! Naming rules for generated identifiers.

/// Suffix appended to every proxy class name.
pub const CLASS_SUFFIX: &str = "Interface";

/// Base class of every generated proxy.
pub const PROXY_BASE_CLASS: &str = "QDBusAbstractInterface";

/// Derives the proxy class name from an interface node name.
///
/// `/Connection/Interface_Aliasing` becomes
/// `ConnectionInterfaceAliasingInterface`.
#[must_use]
pub fn class_name(node_name: &str) -> String {
    let mut name: String = node_name.chars().filter(|c| *c != '/' && *c != '_').collect();
    name.push_str(CLASS_SUFFIX);
    name
}

/// Replaces every character that cannot appear in a C++ identifier.
#[must_use]
pub fn identifier_escape(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len() + 1);
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        escaped.push('_');
    }
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            escaped.push(c);
        } else {
            escaped.push('_');
        }
    }
    escaped
}

/// Converts a wire argument name to the emitted parameter name.
///
/// Names starting with an uppercase letter followed by a lowercase one get
/// their first letter lowered (`Handle_Type` becomes `handle_Type`).
#[must_use]
pub fn arg_name(name: &str) -> String {
    let mut chars = name.chars();
    let lowered = match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_lowercase() => {
            let mut lowered: String = first.to_lowercase().collect();
            lowered.push_str(&name[first.len_utf8()..]);
            lowered
        }
        _ => name.to_string(),
    };
    identifier_escape(&lowered)
}

/// Placeholder name for the nameless argument at `position`.
#[must_use]
pub fn placeholder_arg_name(position: usize) -> String {
    format!("arg{}", position)
}

/// Splits a `::`-separated namespace into its segments.
#[must_use]
pub fn namespace_segments(namespace: &str) -> Vec<&str> {
    namespace.split("::").filter(|s| !s.is_empty()).collect()
}
