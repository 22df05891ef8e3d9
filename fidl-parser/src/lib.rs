#![deny(
    unsafe_code,
    unused_must_use,
    unreachable_pub,
    rust_2018_idioms,
    missing_docs,
    clippy::pedantic
)]

//! # Franca IDL Parser
//!
//! A Rust library for parsing Franca IDL (`.fidl`) interface descriptions,
//! the input format of the CommonAPI C++ code generators.
//!
//! ## Features
//!
//! - **Interfaces**: versions, methods (with `fireAndForget`), broadcasts,
//!   attributes with access flags, error clauses
//! - **Type collections**: named and anonymous, flattened across `import`
//!   directives with cycle detection
//! - **Documentation comments**: `<** ... **>` comments attached to the
//!   construct that follows them
//! - **C++ type resolution**: every parameter carries its CommonAPI C++ type
//! - **Serde support**: optional serialization with the `serde` feature
//!
//! ## Quick Start
//!
//! ```rust
//! use fidl_parser::parse_fidl_string;
//!
//! let content = r#"
//! package commonapi
//!
//! interface HelloWorld {
//!     version { major 1 minor 0 }
//!
//!     <** Greets someone **>
//!     method sayHello {
//!         in { String name }
//!         out { String message }
//!     }
//!
//!     attribute Int32 counter readonly
//! }
//! "#;
//! let document = parse_fidl_string(content)?;
//! let interface = &document.interfaces[0];
//! println!("Parsed interface: {interface}");
//!
//! let method = interface.get_method("sayHello").unwrap();
//! assert_eq!(method.description.as_deref(), Some("Greets someone"));
//! assert_eq!(method.inputs[0].cpp_type(), "std::string");
//! assert_eq!(interface.attributes()[0].name(), "Counter");
//! # Ok::<(), fidl_parser::FidlError>(())
//! ```
//!
//! ## Modules
//!
//! - [`preprocess`]: comment stripping ahead of structural parsing
//! - `fidl.pest`: pest grammar splitting the text into nested items
//! - [`parser`]: structural parser and import flattening
//! - [`types`]: parsed data model
//! - [`cpp_types`]: Franca to C++ type mapping
//! - [`census`]: independent construct counting for regression checks

/// Error types
pub mod errors;

/// Lexical preprocessor
pub mod preprocess;

/// Franca to CommonAPI C++ type mapping
pub mod cpp_types;

/// Parsed data model
pub mod types;

/// Structural parser
pub mod parser;

/// Construct census
pub mod census;

mod grammar;

#[cfg(test)]
mod parser_tests;

pub use census::{CensusReport, ConstructCensus, check_file};
pub use cpp_types::{primitive_cpp_type, resolve_cpp_type, upper_case_first_letter};
pub use errors::{FidlError, FidlResult};
pub use parser::{parse_fidl_file, parse_fidl_string, parse_type_collections_file};
pub use preprocess::preprocess;
pub use types::{
    Attribute, Broadcast, FidlDocument, Import, Interface, Method, MethodError, Parameter,
    TypeCollection, TypeDefinition, TypeKind, TypeRef, Version,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
