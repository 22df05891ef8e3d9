//! Template rendering of wrapper headers
//!
//! Templates are Jinja2-compatible and receive a [`RenderContext`] per
//! interface. Output is plain C++, so auto-escaping is disabled.

use fidl_parser::{Interface, TypeCollection, upper_case_first_letter};
use minijinja::{AutoEscape, Environment};
use serde::Serialize;

/// Embedded default client template
pub const DEFAULT_CLIENT_TEMPLATE: &str = include_str!("../templates/CommonAPIClient.hpp.jinja2");

/// Embedded default service template
pub const DEFAULT_SERVICE_TEMPLATE: &str =
    include_str!("../templates/CommonAPIService.hpp.jinja2");

/// Values visible to a wrapper template
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext<'a> {
    /// Interface being wrapped
    pub interface: &'a Interface,
    /// Package of the interface
    pub package: &'a str,
    /// Package components (`org.example` gives `["org", "example"]`)
    pub namespaces: Vec<&'a str>,
    /// C++ namespace of the generated CommonAPI code: `v<major>` followed
    /// by the package components
    pub cpp_namespaces: Vec<String>,
    /// Type collections visible from the interface
    pub type_collections: &'a [TypeCollection],
    /// Generation date
    pub date: &'a str,
    /// Wrapper class name
    pub class_name: &'a str,
}

impl<'a> RenderContext<'a> {
    /// Build the context for one interface
    #[must_use]
    pub fn new(interface: &'a Interface, class_name: &'a str, date: &'a str) -> Self {
        let package = interface.package_name();
        let namespaces: Vec<&str> = package.split('.').filter(|part| !part.is_empty()).collect();

        let mut cpp_namespaces = Vec::with_capacity(namespaces.len() + 1);
        if let Some(version) = interface.version() {
            cpp_namespaces.push(format!("v{}", version.major));
        }
        cpp_namespaces.extend(namespaces.iter().map(ToString::to_string));

        Self {
            interface,
            package,
            namespaces,
            cpp_namespaces,
            type_collections: interface.type_collections(),
            date,
            class_name,
        }
    }
}

/// Template environment for wrapper templates
///
/// Blocks are trimmed like in the usual Jinja2 code generation setups and the
/// `upper_first` filter upper-cases the first letter of a name.
#[must_use]
pub fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.add_filter("upper_first", upper_first);
    env
}

fn upper_first(value: &str) -> String {
    upper_case_first_letter(value)
}
