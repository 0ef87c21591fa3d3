//! Argument description for methods and signals.

use crate::error::CodegenError;
use crate::qt::binding::{TypeBinding, TypeResolver};
use crate::qt::docs::format_docstring;
use crate::qt::naming::{arg_name, placeholder_arg_name};
use dbusproxy_schema::{Arg, Direction};
use std::collections::HashSet;

/// Emitted name, documentation and binding of one argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgInfo {
    /// Parameter name, explicit or positional placeholder.
    pub name: String,
    /// Formatted documentation lines, empty when undocumented.
    pub doc: String,
    /// Resolved type binding.
    pub binding: TypeBinding,
    /// Argument direction.
    pub direction: Direction,
}

/// Described arguments of one method or signal, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberInfo {
    /// Arguments in declaration order.
    pub args: Vec<ArgInfo>,
}

impl MemberInfo {
    /// Indices of input arguments, in declaration order.
    #[must_use]
    pub fn input_indices(&self) -> Vec<usize> {
        self.indices(Direction::In)
    }

    /// Indices of output arguments, in declaration order.
    #[must_use]
    pub fn output_indices(&self) -> Vec<usize> {
        self.indices(Direction::Out)
    }

    /// Input arguments, in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = &ArgInfo> {
        self.args.iter().filter(|a| a.direction == Direction::In)
    }

    /// Output arguments, in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = &ArgInfo> {
        self.args.iter().filter(|a| a.direction == Direction::Out)
    }

    fn indices(&self, direction: Direction) -> Vec<usize> {
        self.args
            .iter()
            .enumerate()
            .filter(|(_, a)| a.direction == direction)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Describes the arguments of a method or signal.
///
/// Arguments keep their declaration order; nameless ones are named after
/// their position.
///
/// # Arguments
/// * `args` - Arguments in declaration order
/// * `resolver` - Type resolver for the run
/// * `doc_indent` - Prefix for each documentation line
/// * `location` - Interface and member holding the arguments, for errors
///
/// # Errors
/// Returns `CodegenError` if an argument type cannot be resolved or two
/// arguments end up with the same name.
pub fn describe_args(
    args: &[Arg],
    resolver: &TypeResolver<'_>,
    doc_indent: &str,
    location: &str,
) -> Result<MemberInfo, CodegenError> {
    let mut seen = HashSet::new();
    let mut described = Vec::with_capacity(args.len());

    for (position, arg) in args.iter().enumerate() {
        let name = match arg.name.as_deref() {
            Some(explicit) => arg_name(explicit),
            None => placeholder_arg_name(position),
        };
        if !seen.insert(name.clone()) {
            return Err(CodegenError::DuplicateArgument {
                name,
                location: location.to_string(),
            });
        }

        let binding = resolver.resolve(
            &arg.signature,
            arg.annotation.as_deref(),
            &format!("{} (argument '{}')", location, name),
        )?;

        described.push(ArgInfo {
            name,
            doc: format_docstring(arg, doc_indent),
            binding,
            direction: arg.direction,
        });
    }

    Ok(MemberInfo { args: described })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbusproxy_schema::{Docstring, TypeContext};

    fn arg(name: Option<&str>, signature: &str, direction: Direction) -> Arg {
        Arg::new(name.map(str::to_string), signature.to_string(), direction)
    }

    #[test]
    fn test_describe_preserves_order_and_splits() {
        let context = TypeContext::default();
        let resolver = TypeResolver::new(&context, "Tp");
        let args = vec![
            arg(Some("First"), "s", Direction::In),
            arg(Some("Result"), "u", Direction::Out),
            arg(Some("second"), "b", Direction::In),
            arg(None, "as", Direction::Out),
        ];

        let info = describe_args(&args, &resolver, "     *     ", "Conn.Foo").expect("described");

        let names: Vec<_> = info.args.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["first", "result", "second", "arg3"]);
        assert_eq!(info.input_indices(), vec![0, 2]);
        assert_eq!(info.output_indices(), vec![1, 3]);
        assert_eq!(info.args[0].binding.input, "const QString&");
        assert_eq!(info.args[3].binding.storage, "QStringList");

        let inputs: Vec<_> = info.inputs().map(|a| a.name.as_str()).collect();
        assert_eq!(inputs, vec!["first", "second"]);
    }

    #[test]
    fn test_describe_formats_docs() {
        let context = TypeContext::default();
        let resolver = TypeResolver::new(&context, "Tp");
        let mut documented = arg(Some("Name"), "s", Direction::In);
        documented.docstring = Some(Docstring::new("The name."));

        let info = describe_args(&[documented], &resolver, "     *     ", "Conn.Foo")
            .expect("described");
        assert_eq!(info.args[0].doc, "     *     The name.\n");
    }

    #[test]
    fn test_describe_rejects_colliding_names() {
        let context = TypeContext::default();
        let resolver = TypeResolver::new(&context, "Tp");
        let args = vec![
            arg(Some("arg1"), "s", Direction::In),
            arg(None, "u", Direction::In),
        ];

        let result = describe_args(&args, &resolver, " * ", "Conn.Foo");
        assert!(matches!(result, Err(CodegenError::DuplicateArgument { .. })));
    }

    #[test]
    fn test_describe_propagates_resolution_errors() {
        let context = TypeContext::default();
        let resolver = TypeResolver::new(&context, "Tp");
        let mut bad = arg(Some("x"), "a(us)", Direction::In);
        bad.annotation = Some("Unknown[]".to_string());

        let result = describe_args(&[bad], &resolver, " * ", "Conn.Foo");
        assert!(matches!(result, Err(CodegenError::UnknownCustomList { .. })));
    }
}
