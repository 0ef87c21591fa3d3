//! Qt proxy code generation modules.

pub mod binding;
pub mod docs;
pub mod members;
pub mod naming;
pub mod proxy;

pub use binding::{TypeBinding, TypeResolver};
pub use docs::format_docstring;
pub use members::{ArgInfo, MemberInfo, describe_args};
pub use proxy::{ProxyEmitter, ProxyText};
