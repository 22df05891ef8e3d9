//! Mapping from Franca IDL types to CommonAPI C++ types

use crate::types::TypeRef;

/// Separator between C++ namespace components
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Franca primitive types and their C++ equivalents
pub const PRIMITIVE_TYPES: &[(&str, &str)] = &[
    ("Int8", "int8_t"),
    ("UInt8", "uint8_t"),
    ("Int16", "int16_t"),
    ("UInt16", "uint16_t"),
    ("Int32", "int32_t"),
    ("UInt32", "uint32_t"),
    ("Int64", "int64_t"),
    ("UInt64", "uint64_t"),
    ("Boolean", "bool"),
    ("Float", "float"),
    ("Double", "double"),
    ("String", "std::string"),
    ("ByteBuffer", "CommonAPI::ByteBuffer"),
];

/// C++ equivalent of a Franca primitive type name
#[must_use]
pub fn primitive_cpp_type(name: &str) -> Option<&'static str> {
    PRIMITIVE_TYPES
        .iter()
        .find(|(franca, _)| *franca == name)
        .map(|(_, cpp)| *cpp)
}

/// Whether a type name refers to a user-defined type
///
/// Franca sources conventionally prefix their own type names with a
/// lowercase `t` (`tMyEnum`, `tSettings`).
#[must_use]
pub fn is_user_defined(name: &str) -> bool {
    name.starts_with('t')
}

/// Wrap a C++ type into the CommonAPI sequence container
#[must_use]
pub fn sequence_of(inner: &str) -> String {
    format!("std::vector<{inner}>")
}

/// Resolve the C++ type of a declared Franca type
///
/// Dotted names become `::`-qualified names. Primitive names map to their
/// fixed C++ equivalents. An unqualified user-defined name is qualified
/// with `namespace` when one is known; without a namespace the bare name
/// is kept. Arrays are wrapped into a sequence.
///
/// # Example
///
/// ```
/// use fidl_parser::{TypeRef, resolve_cpp_type};
///
/// let declared = TypeRef::parse("tSettings []").unwrap();
/// assert_eq!(
///     resolve_cpp_type(Some("HelloWorld"), &declared),
///     "std::vector<HelloWorld::tSettings>"
/// );
/// ```
#[must_use]
pub fn resolve_cpp_type(namespace: Option<&str>, declared: &TypeRef) -> String {
    let base = if let Some(primitive) = primitive_cpp_type(&declared.name) {
        primitive.to_string()
    } else if declared.name.contains('.') {
        declared.name.replace('.', NAMESPACE_SEPARATOR)
    } else {
        match namespace {
            Some(ns) if !ns.is_empty() && is_user_defined(&declared.name) => {
                format!("{ns}{NAMESPACE_SEPARATOR}{}", declared.name)
            }
            _ => declared.name.clone(),
        }
    };

    if declared.is_array {
        sequence_of(&base)
    } else {
        base
    }
}

/// Upper-case the first character of a name, leaving the rest unchanged
///
/// # Example
///
/// ```
/// use fidl_parser::upper_case_first_letter;
///
/// assert_eq!(upper_case_first_letter("aa"), "Aa");
/// assert_eq!(upper_case_first_letter("Aa"), "Aa");
/// ```
#[must_use]
pub fn upper_case_first_letter(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
