//! Core data structures produced by the Franca IDL parser

use regex::Regex;
use std::sync::LazyLock;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::cpp_types::{resolve_cpp_type, upper_case_first_letter};

static TYPE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([\w.]+)\s*(\[\])?\s*$").unwrap());

/// A type as written in the IDL source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TypeRef {
    /// Raw type name, possibly dotted (`Int32`, `tSettings`, `Common.tId`)
    pub name: String,
    /// Whether the type was declared with a trailing `[]`
    pub is_array: bool,
}

impl TypeRef {
    /// Create a new type reference
    #[must_use]
    pub fn new(name: impl Into<String>, is_array: bool) -> Self {
        Self {
            name: name.into(),
            is_array,
        }
    }

    /// Parse a declared type of the form `<dotted-identifier>[ [] ]`
    ///
    /// Returns `None` when the text is not a type.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let caps = TYPE_PATTERN.captures(text)?;
        Some(Self::new(&caps[1], caps.get(2).is_some()))
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        if self.is_array {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// Interface or type collection version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Version {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// An import directive
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Import {
    /// Imported namespace (`org.example.*`), `None` for `import model`
    pub selector: Option<String>,
    /// File reference, relative to the importing file
    pub uri: String,
}

/// Kind of a named type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "snake_case"))]
#[allow(missing_docs)]
pub enum TypeKind {
    Array,
    Typedef,
    Struct,
    Enumeration,
    Union,
    Map,
}

impl TypeKind {
    /// Keyword introducing this kind of definition
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Typedef => "typedef",
            Self::Struct => "struct",
            Self::Enumeration => "enumeration",
            Self::Union => "union",
            Self::Map => "map",
        }
    }

    /// Kind introduced by a keyword
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "array" => Some(Self::Array),
            "typedef" => Some(Self::Typedef),
            "struct" => Some(Self::Struct),
            "enumeration" => Some(Self::Enumeration),
            "union" => Some(Self::Union),
            "map" => Some(Self::Map),
            _ => None,
        }
    }
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A named type declared in a type collection or an interface
///
/// Only the name is interpreted; bodies of structs, enumerations, unions and
/// maps are not.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TypeDefinition {
    /// Kind of definition
    pub kind: TypeKind,
    /// Type name
    pub name: String,
    /// Documentation comment
    pub description: Option<String>,
    /// Element type of an `array`, aliased type of a `typedef`
    pub element: Option<TypeRef>,
}

/// A `typeCollection` block
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TypeCollection {
    /// Collection name, empty for an anonymous collection
    pub name: String,
    /// Documentation comment
    pub description: Option<String>,
    /// Collection version
    pub version: Option<Version>,
    /// Package declaring the collection
    pub package_name: String,
    /// Types declared in the collection
    pub types: Vec<TypeDefinition>,
}

impl TypeCollection {
    /// Create an empty type collection
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        package_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            version: None,
            package_name: package_name.into(),
            types: Vec::new(),
        }
    }

    /// Whether the collection was declared without a name
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// Fully qualified name (`package.Name`)
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.is_anonymous() {
            self.package_name.clone()
        } else {
            format!("{}.{}", self.package_name, self.name)
        }
    }
}

/// A typed, named parameter of a method or broadcast
///
/// The C++ type is derived from the declared type and the type namespace,
/// and is recomputed whenever the namespace changes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Parameter {
    type_namespace: Option<String>,
    declared: TypeRef,
    cpp_type: String,
    name: String,
    description: Option<String>,
}

impl Parameter {
    /// Create a new parameter
    #[must_use]
    pub fn new(
        type_namespace: Option<String>,
        declared: TypeRef,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        let cpp_type = resolve_cpp_type(type_namespace.as_deref(), &declared);
        Self {
            type_namespace,
            declared,
            cpp_type,
            name: name.into(),
            description,
        }
    }

    /// Namespace used to qualify user-defined types
    #[must_use]
    pub fn type_namespace(&self) -> Option<&str> {
        self.type_namespace.as_deref()
    }

    /// Set the type namespace and re-resolve the C++ type
    pub fn set_type_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.cpp_type = resolve_cpp_type(Some(&namespace), &self.declared);
        self.type_namespace = Some(namespace);
    }

    /// Type as declared in the source
    #[must_use]
    pub fn declared_type(&self) -> &TypeRef {
        &self.declared
    }

    /// Resolved C++ type
    #[must_use]
    pub fn cpp_type(&self) -> &str {
        &self.cpp_type
    }

    /// Parameter name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Documentation comment
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.declared, self.name)
    }
}

/// An interface attribute
///
/// An attribute is a parameter whose name has its first letter upper-cased,
/// plus access flags.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Attribute {
    #[cfg_attr(feature = "serde", serde(flatten))]
    parameter: Parameter,
    /// Declared `readonly`
    pub readonly: bool,
    /// Declared `noSubscriptions`
    pub no_subscriptions: bool,
    /// Declared `noRead`
    pub no_read: bool,
}

impl Attribute {
    /// Create a new read-write attribute
    #[must_use]
    pub fn new(
        type_namespace: Option<String>,
        declared: TypeRef,
        name: &str,
        description: Option<String>,
    ) -> Self {
        Self {
            parameter: Parameter::new(
                type_namespace,
                declared,
                upper_case_first_letter(name),
                description,
            ),
            readonly: false,
            no_subscriptions: false,
            no_read: false,
        }
    }

    /// The underlying parameter
    #[must_use]
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// Set the type namespace and re-resolve the C++ type
    pub fn set_type_namespace(&mut self, namespace: impl Into<String>) {
        self.parameter.set_type_namespace(namespace);
    }

    /// Attribute name, first letter upper-cased
    #[must_use]
    pub fn name(&self) -> &str {
        self.parameter.name()
    }

    /// Resolved C++ type
    #[must_use]
    pub fn cpp_type(&self) -> &str {
        self.parameter.cpp_type()
    }

    /// Documentation comment
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.parameter.description()
    }
}

/// Error clause of a method
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum MethodError {
    /// `error SomeEnumeration`
    Reference {
        /// Referenced enumeration
        name: String,
    },
    /// `error { A B C }`
    Enumerators {
        /// Enumerator names in declaration order
        names: Vec<String>,
    },
}

/// An interface method
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Method {
    /// Method name
    pub name: String,
    /// Documentation comment
    pub description: Option<String>,
    /// Input parameters
    pub inputs: Vec<Parameter>,
    /// Output parameters, `None` for a fire-and-forget method
    pub outputs: Option<Vec<Parameter>>,
    /// Error clause
    pub error: Option<MethodError>,
}

impl Method {
    /// Create a method expecting a (so far empty) reply
    #[must_use]
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            inputs: Vec::new(),
            outputs: Some(Vec::new()),
            error: None,
        }
    }

    /// Create a fire-and-forget method, which has no outputs
    #[must_use]
    pub fn fire_and_forget(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            outputs: None,
            ..Self::new(name, description)
        }
    }

    /// Whether no reply is expected
    #[must_use]
    pub fn is_fire_and_forget(&self) -> bool {
        self.outputs.is_none()
    }

    /// All parameters, inputs first
    pub fn parameters_mut(&mut self) -> impl Iterator<Item = &mut Parameter> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut().flatten())
    }
}

/// An interface broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Broadcast {
    /// Broadcast name
    pub name: String,
    /// Documentation comment
    pub description: Option<String>,
    /// Output parameters
    pub parameters: Vec<Parameter>,
    /// Declared `selective`
    pub selective: bool,
}

impl Broadcast {
    /// Create a broadcast without parameters, first letter of the name upper-cased
    #[must_use]
    pub fn new(name: &str, description: Option<String>) -> Self {
        Self {
            name: upper_case_first_letter(name),
            description,
            parameters: Vec::new(),
            selective: false,
        }
    }
}

/// A Franca interface
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Interface {
    name: String,
    description: Option<String>,
    version: Option<Version>,
    package_name: String,
    extends: Option<String>,
    methods: Vec<Method>,
    broadcasts: Vec<Broadcast>,
    attributes: Vec<Attribute>,
    types: Vec<TypeDefinition>,
    type_collections: Vec<TypeCollection>,
    has_writable_attributes: bool,
}

impl Interface {
    /// Create an empty interface
    #[must_use]
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            version: None,
            package_name: String::new(),
            extends: None,
            methods: Vec::new(),
            broadcasts: Vec::new(),
            attributes: Vec::new(),
            types: Vec::new(),
            type_collections: Vec::new(),
            has_writable_attributes: false,
        }
    }

    /// Attach methods, broadcasts and attributes
    ///
    /// Every contained parameter and attribute receives the interface name
    /// as its type namespace, whatever namespace it was created with.
    pub fn set_members(
        &mut self,
        mut methods: Vec<Method>,
        mut broadcasts: Vec<Broadcast>,
        mut attributes: Vec<Attribute>,
    ) {
        for method in &mut methods {
            for parameter in method.parameters_mut() {
                parameter.set_type_namespace(&self.name);
            }
        }
        for broadcast in &mut broadcasts {
            for parameter in &mut broadcast.parameters {
                parameter.set_type_namespace(&self.name);
            }
        }
        for attribute in &mut attributes {
            attribute.set_type_namespace(&self.name);
        }

        self.has_writable_attributes = attributes.iter().any(|a| !a.readonly);
        self.methods = methods;
        self.broadcasts = broadcasts;
        self.attributes = attributes;
    }

    /// Set the interface version
    pub fn set_version(&mut self, version: Version) {
        self.version = Some(version);
    }

    /// Set the owning package
    pub fn set_package_name(&mut self, package_name: impl Into<String>) {
        self.package_name = package_name.into();
    }

    /// Set the base interface
    pub fn set_extends(&mut self, base: impl Into<String>) {
        self.extends = Some(base.into());
    }

    /// Set the types declared inside the interface
    pub fn set_types(&mut self, types: Vec<TypeDefinition>) {
        self.types = types;
    }

    /// Set the type collections visible from the interface
    pub fn set_type_collections(&mut self, type_collections: Vec<TypeCollection>) {
        self.type_collections = type_collections;
    }

    /// Interface name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Documentation comment
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Interface version
    #[must_use]
    pub fn version(&self) -> Option<Version> {
        self.version
    }

    /// Owning package
    #[must_use]
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Base interface
    #[must_use]
    pub fn extends(&self) -> Option<&str> {
        self.extends.as_deref()
    }

    /// Methods in declaration order
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Broadcasts in declaration order
    #[must_use]
    pub fn broadcasts(&self) -> &[Broadcast] {
        &self.broadcasts
    }

    /// Attributes in declaration order
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Types declared inside the interface
    #[must_use]
    pub fn types(&self) -> &[TypeDefinition] {
        &self.types
    }

    /// Type collections visible from the interface, imports included
    #[must_use]
    pub fn type_collections(&self) -> &[TypeCollection] {
        &self.type_collections
    }

    /// Whether at least one attribute is not `readonly`
    #[must_use]
    pub fn has_writable_attributes(&self) -> bool {
        self.has_writable_attributes
    }

    /// Get method by name
    #[must_use]
    pub fn get_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Get broadcast by name
    #[must_use]
    pub fn get_broadcast(&self, name: &str) -> Option<&Broadcast> {
        self.broadcasts.iter().find(|b| b.name == name)
    }

    /// Get attribute by (case-normalized) name
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }
}

impl std::fmt::Display for Interface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.package_name, self.name)?;
        if let Some(version) = self.version {
            write!(f, " v{version}")?;
        }
        Ok(())
    }
}

/// Everything parsed out of one `.fidl` file
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FidlDocument {
    /// Package declared by the file
    pub package: String,
    /// Import directives in declaration order
    pub imports: Vec<Import>,
    /// Imported type collections followed by the file's own
    pub type_collections: Vec<TypeCollection>,
    /// Interfaces in declaration order
    pub interfaces: Vec<Interface>,
}

impl FidlDocument {
    /// Get interface by name
    #[must_use]
    pub fn get_interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name() == name)
    }

    /// Total number of methods across all interfaces
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.interfaces.iter().map(|i| i.methods().len()).sum()
    }

    /// Total number of broadcasts across all interfaces
    #[must_use]
    pub fn broadcast_count(&self) -> usize {
        self.interfaces.iter().map(|i| i.broadcasts().len()).sum()
    }

    /// Total number of attributes across all interfaces
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.interfaces.iter().map(|i| i.attributes().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(namespace: Option<&str>, declared: &str, name: &str) -> Parameter {
        Parameter::new(
            namespace.map(str::to_string),
            TypeRef::parse(declared).unwrap(),
            name,
            None,
        )
    }

    #[test]
    fn test_type_ref_parse() {
        assert_eq!(TypeRef::parse("Int32"), Some(TypeRef::new("Int32", false)));
        assert_eq!(TypeRef::parse("Int32 []"), Some(TypeRef::new("Int32", true)));
        assert_eq!(
            TypeRef::parse("  Common.tId[] "),
            Some(TypeRef::new("Common.tId", true))
        );
        assert_eq!(TypeRef::parse("Int32 name"), None);
        assert_eq!(TypeRef::parse(""), None);
        assert_eq!(TypeRef::new("Int32", true).to_string(), "Int32[]");
    }

    #[test]
    fn test_parameter_namespace_resolution() {
        let mut p = param(None, "tFoo", "foo");
        assert_eq!(p.cpp_type(), "tFoo");
        assert_eq!(p.type_namespace(), None);

        p.set_type_namespace("HelloWorld");
        assert_eq!(p.cpp_type(), "HelloWorld::tFoo");
        assert_eq!(p.type_namespace(), Some("HelloWorld"));
        assert_eq!(p.to_string(), "tFoo foo");
    }

    #[test]
    fn test_attribute_name_casing() {
        let attribute = Attribute::new(None, TypeRef::new("Int32", false), "aa", None);
        assert_eq!(attribute.name(), "Aa");
        assert_eq!(attribute.cpp_type(), "int32_t");
        assert!(!attribute.readonly);
    }

    #[test]
    fn test_broadcast_name_casing() {
        let broadcast = Broadcast::new("valueChanged", None);
        assert_eq!(broadcast.name, "ValueChanged");
        assert!(!broadcast.selective);
        assert_eq!(Broadcast::new("Tick", None).name, "Tick");
    }

    #[test]
    fn test_method_fire_and_forget() {
        let method = Method::new("sayHello", None);
        assert!(!method.is_fire_and_forget());
        assert_eq!(method.outputs, Some(Vec::new()));

        let method = Method::fire_and_forget("sayHello2", None);
        assert!(method.is_fire_and_forget());
        assert_eq!(method.outputs, None);
    }

    #[test]
    fn test_set_members_propagates_namespace() {
        let mut method = Method::new("get", None);
        method.inputs.push(param(Some("Other"), "tKey", "key"));
        method
            .outputs
            .get_or_insert_with(Vec::new)
            .push(param(None, "tValue[]", "value"));

        let mut broadcast = Broadcast::new("changed", None);
        broadcast.parameters.push(param(None, "tValue", "value"));

        let mut readonly = Attribute::new(None, TypeRef::new("tMode", false), "mode", None);
        readonly.readonly = true;

        let mut interface = Interface::new("Store", None);
        interface.set_members(vec![method], vec![broadcast], vec![readonly]);

        let method = interface.get_method("get").unwrap();
        assert_eq!(method.inputs[0].cpp_type(), "Store::tKey");
        assert_eq!(method.inputs[0].type_namespace(), Some("Store"));
        assert_eq!(
            method.outputs.as_ref().unwrap()[0].cpp_type(),
            "std::vector<Store::tValue>"
        );
        assert_eq!(
            interface.broadcasts()[0].parameters[0].cpp_type(),
            "Store::tValue"
        );
        assert_eq!(interface.get_attribute("Mode").unwrap().cpp_type(), "Store::tMode");
        assert!(!interface.has_writable_attributes());
    }

    #[test]
    fn test_has_writable_attributes() {
        let mut interface = Interface::new("I", None);
        assert!(!interface.has_writable_attributes());
        let attribute = Attribute::new(None, TypeRef::new("Int32", false), "x", None);
        interface.set_members(Vec::new(), Vec::new(), vec![attribute]);
        assert!(interface.has_writable_attributes());
    }

    #[test]
    fn test_type_collection_names() {
        let named = TypeCollection::new("Common", None, "org.example");
        assert_eq!(named.full_name(), "org.example.Common");
        let anonymous = TypeCollection::new("", None, "org.example");
        assert!(anonymous.is_anonymous());
        assert_eq!(anonymous.full_name(), "org.example");
    }

    #[test]
    fn test_type_kind_keywords() {
        for kind in [
            TypeKind::Array,
            TypeKind::Typedef,
            TypeKind::Struct,
            TypeKind::Enumeration,
            TypeKind::Union,
            TypeKind::Map,
        ] {
            assert_eq!(TypeKind::from_keyword(kind.keyword()), Some(kind));
        }
        assert_eq!(TypeKind::from_keyword("method"), None);
    }

    #[test]
    fn test_interface_display() {
        let mut interface = Interface::new("HelloWorld", None);
        interface.set_package_name("commonapi");
        interface.set_version(Version { major: 1, minor: 0 });
        assert_eq!(interface.to_string(), "commonapi.HelloWorld v1.0");
    }
}
