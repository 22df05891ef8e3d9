//! Structural parser for Franca IDL files
//!
//! The preprocessed text is split into an item tree by the pest grammar in
//! [`grammar`](crate::grammar), and each item is dispatched on its keyword,
//! one level at a time: file → interface → method → parameter block.
//! Declaration headers are matched against precompiled rules.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::{debug, trace, warn};
use regex::Regex;

use crate::errors::{FidlError, FidlResult, import_error, invalid_declaration};
use crate::preprocess::preprocess;
use crate::grammar::{Block, Item, parse_items};
use crate::types::{
    Attribute, Broadcast, FidlDocument, Import, Interface, Method, MethodError, Parameter,
    TypeCollection, TypeDefinition, TypeKind, TypeRef, Version,
};

/// File name reported for sources parsed from memory
pub const STRING_SOURCE_NAME: &str = "<string>";

// Declaration rules, matched against trimmed item headers
static PACKAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^package\s+([\w.]+)$").unwrap());

static IMPORT_MODEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^import\s+model\s+"([^"]*)"$"#).unwrap());

static IMPORT_FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^import\s+([\w.*]+)\s+from\s+"([^"]*)"$"#).unwrap());

static INTERFACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^interface\s+(\w+)(?:\s+extends\s+([\w.]+))?(?:\s+manages\s+.+)?$").unwrap()
});

static TYPE_COLLECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^typeCollection(?:\s+(\w+))?$").unwrap());

static VERSION_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*major\s+(\d+)\s+minor\s+(\d+)\s*$").unwrap());

static METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^method\s+(\w+)(?::\w+)?(?:\s+(fireAndForget))?$").unwrap()
});

static BROADCAST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^broadcast\s+(\w+)(?::\w+)?(?:\s+(selective))?$").unwrap());

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^attribute\s+([\w.]+(?:\s*\[\])?)\s+(\w+)((?:\s+\w+)*)$").unwrap()
});

static PARAMETER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[\w.]+(?:\s*\[\])?\s+\w+\s*)+$").unwrap());

static PARAMETER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\w.]+(?:\s*\[\])?)\s+(\w+)").unwrap());

static ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^array\s+(\w+)\s+of\s+([\w.]+(?:\s*\[\])?)$").unwrap());

static TYPEDEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^typedef\s+(\w+)\s+is\s+([\w.]+(?:\s*\[\])?)$").unwrap());

static NAMED_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:struct|enumeration|union|map)\s+(\w+)(?:\s+extends\s+[\w.]+)?(?:\s+polymorphic)?$")
        .unwrap()
});

static ERROR_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^error\s+([\w.]+)$").unwrap());

static ENUMERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)(?:\s*=\s*[^,\s]+)?").unwrap());

/// How much of a file to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Everything; at least one interface is required
    Full,
    /// Type collections only, as for imported files
    TypeCollections,
}

/// Result of parsing one file, before imports are followed
#[derive(Debug)]
struct ParsedFile {
    package: String,
    imports: Vec<Import>,
    type_collections: Vec<TypeCollection>,
    interfaces: Vec<Interface>,
}

/// Parse a `.fidl` file, following its imports
///
/// Type collections of imported files (transitively) are flattened into
/// the result, ahead of the file's own collections, and every interface
/// sees the whole flattened list. A file whose name was already visited in
/// the import chain is skipped, so circular imports terminate.
///
/// # Errors
///
/// Returns [`FidlError::MissingPackage`] or [`FidlError::NoInterfaces`]
/// when the file lacks a package declaration or interfaces,
/// [`FidlError::Import`] when an imported file cannot be read, and the
/// structural errors of the grammar for malformed text.
pub fn parse_fidl_file<P: AsRef<Path>>(path: P) -> FidlResult<FidlDocument> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let parsed = parse_source(&content, path, Scope::Full)?;

    let mut visited = HashSet::new();
    visited.insert(file_key(path));
    let mut type_collections =
        collect_imported_collections(base_dir(path), &parsed.imports, &mut visited)?;
    type_collections.extend(parsed.type_collections);

    Ok(finish(
        parsed.package,
        parsed.imports,
        type_collections,
        parsed.interfaces,
    ))
}

/// Parse `.fidl` content from a string
///
/// Import directives are recorded but not followed, since there is no
/// file location to resolve them against.
///
/// # Errors
///
/// Same as [`parse_fidl_file`], except for import errors.
///
/// # Example
///
/// ```
/// use fidl_parser::parse_fidl_string;
///
/// let document = parse_fidl_string(
///     "package commonapi\ninterface HelloWorld { method sayHello { in { String name } } }",
/// )?;
/// assert_eq!(document.package, "commonapi");
/// assert_eq!(document.interfaces[0].methods()[0].name, "sayHello");
/// # Ok::<(), fidl_parser::FidlError>(())
/// ```
pub fn parse_fidl_string(content: &str) -> FidlResult<FidlDocument> {
    let parsed = parse_source(content, Path::new(STRING_SOURCE_NAME), Scope::Full)?;
    Ok(finish(
        parsed.package,
        parsed.imports,
        parsed.type_collections,
        parsed.interfaces,
    ))
}

/// Parse only the type collections of a `.fidl` file, following its imports
///
/// Interfaces in the file are not parsed and not required.
///
/// # Errors
///
/// Returns [`FidlError::MissingPackage`] when the file declares no package,
/// [`FidlError::Import`] when an imported file cannot be read, and the
/// structural errors of the grammar for malformed text.
pub fn parse_type_collections_file<P: AsRef<Path>>(path: P) -> FidlResult<Vec<TypeCollection>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let parsed = parse_source(&content, path, Scope::TypeCollections)?;

    let mut visited = HashSet::new();
    visited.insert(file_key(path));
    let mut type_collections =
        collect_imported_collections(base_dir(path), &parsed.imports, &mut visited)?;
    type_collections.extend(parsed.type_collections);
    Ok(type_collections)
}

fn finish(
    package: String,
    imports: Vec<Import>,
    type_collections: Vec<TypeCollection>,
    mut interfaces: Vec<Interface>,
) -> FidlDocument {
    for interface in &mut interfaces {
        interface.set_type_collections(type_collections.clone());
    }
    FidlDocument {
        package,
        imports,
        type_collections,
        interfaces,
    }
}

fn base_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

/// Imports are deduplicated by file name, not by full path
fn file_key(path: &Path) -> OsString {
    path.file_name()
        .map_or_else(|| path.as_os_str().to_os_string(), ToOwned::to_owned)
}

fn collect_imported_collections(
    base_dir: &Path,
    imports: &[Import],
    visited: &mut HashSet<OsString>,
) -> FidlResult<Vec<TypeCollection>> {
    let mut collections = Vec::new();

    for import in imports {
        let path: PathBuf = base_dir.join(&import.uri);
        if !visited.insert(file_key(&path)) {
            debug!("{}: already imported, skipping", path.display());
            continue;
        }

        trace!("importing type collections from {}", path.display());
        let content = fs::read_to_string(&path).map_err(|e| import_error(&path, e))?;
        let parsed = parse_source(&content, &path, Scope::TypeCollections)?;

        collections.extend(collect_imported_collections(
            self::base_dir(&path),
            &parsed.imports,
            visited,
        )?);
        collections.extend(parsed.type_collections);
    }

    Ok(collections)
}

fn parse_source(content: &str, file: &Path, scope: Scope) -> FidlResult<ParsedFile> {
    let text = preprocess(content)?;
    let items = parse_items(&text)?;

    let mut package: Option<String> = None;
    let mut imports = Vec::new();
    let mut type_collections = Vec::new();
    let mut interfaces = Vec::new();

    for item in &items {
        match item.keyword() {
            "package" => {
                let caps = PACKAGE
                    .captures(item.header)
                    .ok_or_else(|| invalid_declaration(item.line, "package", item.header))?;
                if let Some(first) = &package {
                    warn!(
                        "{}:{}: additional package '{}' ignored, using '{first}'",
                        file.display(),
                        item.line,
                        &caps[1]
                    );
                } else {
                    package = Some(caps[1].to_string());
                }
            }
            "import" => imports.push(parse_import(item)?),
            "typeCollection" => type_collections.push(parse_type_collection(item)?),
            "interface" if scope == Scope::Full => {
                interfaces.push(parse_interface(item)?);
            }
            "interface" => trace!("{}: interface skipped in import", file.display()),
            keyword => debug!(
                "{}:{}: unsupported construct '{keyword}' skipped",
                file.display(),
                item.line
            ),
        }
    }

    let package = package.ok_or_else(|| FidlError::MissingPackage {
        file: file.to_path_buf(),
    })?;

    if scope == Scope::Full && interfaces.is_empty() {
        return Err(FidlError::NoInterfaces {
            file: file.to_path_buf(),
        });
    }
    if type_collections.is_empty() {
        debug!("{}: no type collections", file.display());
    }

    for collection in &mut type_collections {
        collection.package_name.clone_from(&package);
    }
    for interface in &mut interfaces {
        interface.set_package_name(package.as_str());
    }

    Ok(ParsedFile {
        package,
        imports,
        type_collections,
        interfaces,
    })
}

fn parse_import(item: &Item<'_>) -> FidlResult<Import> {
    if let Some(caps) = IMPORT_MODEL.captures(item.header) {
        return Ok(Import {
            selector: None,
            uri: caps[1].to_string(),
        });
    }
    let caps = IMPORT_FROM
        .captures(item.header)
        .ok_or_else(|| invalid_declaration(item.line, "import", item.header))?;
    Ok(Import {
        selector: Some(caps[1].to_string()),
        uri: caps[2].to_string(),
    })
}

fn required_body<'i, 'a>(item: &'i Item<'a>, construct: &'static str) -> FidlResult<&'i Block<'a>> {
    item.body
        .as_ref()
        .ok_or_else(|| invalid_declaration(item.line, construct, item.header))
}

fn doc(item: &Item<'_>) -> Option<String> {
    item.doc.map(str::to_string)
}

fn parse_version(item: &Item<'_>) -> FidlResult<Version> {
    let body = required_body(item, "version")?.text;
    let invalid = || invalid_declaration(item.line, "version", body);
    let caps = VERSION_BODY.captures(body).ok_or_else(invalid)?;
    Ok(Version {
        major: caps[1].parse().map_err(|_| invalid())?,
        minor: caps[2].parse().map_err(|_| invalid())?,
    })
}

fn parse_type_collection(item: &Item<'_>) -> FidlResult<TypeCollection> {
    let caps = TYPE_COLLECTION
        .captures(item.header)
        .ok_or_else(|| invalid_declaration(item.line, "typeCollection", item.header))?;
    let name = caps.get(1).map_or("", |m| m.as_str());
    let mut collection = TypeCollection::new(name, doc(item), String::new());

    for member in &required_body(item, "typeCollection")?.items {
        match member.keyword() {
            "version" => {
                let version = parse_version(member)?;
                if collection.version.is_none() {
                    collection.version = Some(version);
                }
            }
            keyword => match TypeKind::from_keyword(keyword) {
                Some(kind) => collection.types.push(parse_type_definition(kind, member)?),
                None => debug!(
                    "line {}: unsupported construct '{keyword}' in type collection '{name}'",
                    member.line
                ),
            },
        }
    }

    Ok(collection)
}

fn parse_interface(item: &Item<'_>) -> FidlResult<Interface> {
    let caps = INTERFACE
        .captures(item.header)
        .ok_or_else(|| invalid_declaration(item.line, "interface", item.header))?;
    let name = &caps[1];
    let mut interface = Interface::new(name, doc(item));
    if let Some(base) = caps.get(2) {
        interface.set_extends(base.as_str());
    }

    let mut version = None;
    let mut methods = Vec::new();
    let mut broadcasts = Vec::new();
    let mut attributes = Vec::new();
    let mut types = Vec::new();

    for member in &required_body(item, "interface")?.items {
        match member.keyword() {
            "version" => {
                let parsed = parse_version(member)?;
                if version.is_none() {
                    version = Some(parsed);
                }
            }
            "method" => methods.push(parse_method(member)?),
            "broadcast" => broadcasts.push(parse_broadcast(member)?),
            "attribute" => attributes.push(parse_attribute(member)?),
            keyword => match TypeKind::from_keyword(keyword) {
                Some(kind) => types.push(parse_type_definition(kind, member)?),
                None => debug!(
                    "line {}: unsupported construct '{keyword}' in interface '{name}'",
                    member.line
                ),
            },
        }
    }

    if methods.is_empty() {
        debug!("interface '{name}': no methods found");
    }
    if broadcasts.is_empty() {
        debug!("interface '{name}': no broadcasts found");
    }
    if attributes.is_empty() {
        debug!("interface '{name}': no attributes found");
    }

    if let Some(version) = version {
        interface.set_version(version);
    }
    interface.set_types(types);
    interface.set_members(methods, broadcasts, attributes);
    Ok(interface)
}

fn parse_method(item: &Item<'_>) -> FidlResult<Method> {
    let caps = METHOD
        .captures(item.header)
        .ok_or_else(|| invalid_declaration(item.line, "method", item.header))?;
    let name = &caps[1];
    let mut method = if caps.get(2).is_some() {
        Method::fire_and_forget(name, doc(item))
    } else {
        Method::new(name, doc(item))
    };

    for block in &required_body(item, "method")?.items {
        match block.keyword() {
            "in" => method.inputs.extend(parse_parameter_block(block)?),
            "out" => {
                let parameters = parse_parameter_block(block)?;
                match method.outputs.as_mut() {
                    Some(outputs) => outputs.extend(parameters),
                    None => warn!(
                        "line {}: out block of fire-and-forget method '{name}' ignored",
                        block.line
                    ),
                }
            }
            "error" => method.error = Some(parse_error_clause(block)?),
            keyword => debug!(
                "line {}: unsupported block '{keyword}' in method '{name}'",
                block.line
            ),
        }
    }

    if method.inputs.is_empty() {
        trace!("method '{name}': no input parameters");
    }
    Ok(method)
}

fn parse_broadcast(item: &Item<'_>) -> FidlResult<Broadcast> {
    let caps = BROADCAST
        .captures(item.header)
        .ok_or_else(|| invalid_declaration(item.line, "broadcast", item.header))?;
    let name = &caps[1];
    let mut broadcast = Broadcast::new(name, doc(item));
    broadcast.selective = caps.get(2).is_some();

    for block in &required_body(item, "broadcast")?.items {
        match block.keyword() {
            "out" => broadcast
                .parameters
                .extend(parse_parameter_block(block)?),
            keyword => warn!(
                "line {}: '{keyword}' block in broadcast '{name}' ignored, broadcasts only have outputs",
                block.line
            ),
        }
    }

    Ok(broadcast)
}

fn parse_attribute(item: &Item<'_>) -> FidlResult<Attribute> {
    let invalid = || invalid_declaration(item.line, "attribute", item.header);
    if item.body.is_some() {
        return Err(invalid());
    }
    let caps = ATTRIBUTE.captures(item.header).ok_or_else(invalid)?;
    let declared = TypeRef::parse(&caps[1]).ok_or_else(invalid)?;
    let mut attribute = Attribute::new(None, declared, &caps[2], doc(item));

    for flag in caps[3].split_whitespace() {
        match flag {
            "readonly" => attribute.readonly = true,
            "noSubscriptions" => attribute.no_subscriptions = true,
            "noRead" => attribute.no_read = true,
            _ => return Err(invalid()),
        }
    }

    Ok(attribute)
}

/// Parameters of an `in` or `out` block
///
/// Several declarations may share a line; a documentation comment applies
/// to the first declaration following it.
fn parse_parameter_block(block: &Item<'_>) -> FidlResult<Vec<Parameter>> {
    let construct = if block.keyword() == "in" { "in" } else { "out" };
    if block.header != construct {
        return Err(invalid_declaration(block.line, construct, block.header));
    }

    let mut parameters = Vec::new();
    for declaration in &required_body(block, construct)?.items {
        if declaration.body.is_some() || !PARAMETER_LINE.is_match(declaration.header) {
            return Err(invalid_declaration(
                declaration.line,
                "parameter",
                declaration.header,
            ));
        }

        let mut description = doc(declaration);
        for caps in PARAMETER.captures_iter(declaration.header) {
            let declared = TypeRef::parse(&caps[1]).ok_or_else(|| {
                invalid_declaration(declaration.line, "parameter", declaration.header)
            })?;
            parameters.push(Parameter::new(None, declared, &caps[2], description.take()));
        }
    }

    Ok(parameters)
}

fn parse_error_clause(item: &Item<'_>) -> FidlResult<MethodError> {
    match &item.body {
        Some(body) => {
            let mut names = Vec::new();
            for enumerator in &body.items {
                names.extend(
                    ENUMERATOR
                        .captures_iter(enumerator.header)
                        .map(|caps| caps[1].to_string()),
                );
            }
            Ok(MethodError::Enumerators { names })
        }
        None => {
            let caps = ERROR_REFERENCE
                .captures(item.header)
                .ok_or_else(|| invalid_declaration(item.line, "error", item.header))?;
            Ok(MethodError::Reference {
                name: caps[1].to_string(),
            })
        }
    }
}

fn parse_type_definition(kind: TypeKind, item: &Item<'_>) -> FidlResult<TypeDefinition> {
    let invalid = || invalid_declaration(item.line, kind.keyword(), item.header);
    let (name, element) = match kind {
        TypeKind::Array | TypeKind::Typedef => {
            let rule = if kind == TypeKind::Array {
                &ARRAY
            } else {
                &TYPEDEF
            };
            if item.body.is_some() {
                return Err(invalid());
            }
            let caps = rule.captures(item.header).ok_or_else(invalid)?;
            let element = TypeRef::parse(&caps[2]).ok_or_else(invalid)?;
            (caps[1].to_string(), Some(element))
        }
        TypeKind::Struct | TypeKind::Enumeration | TypeKind::Union | TypeKind::Map => {
            let caps = NAMED_TYPE.captures(item.header).ok_or_else(invalid)?;
            (caps[1].to_string(), None)
        }
    };

    Ok(TypeDefinition {
        kind,
        name,
        description: doc(item),
        element,
    })
}
