use crate::errors::FidlError;
use crate::parser::parse_fidl_string;
use crate::types::{MethodError, TypeKind, TypeRef, Version};

const HELLO_WORLD: &str = r"
package commonapi

interface HelloWorld {
    version {major 1 minor 0}

    method sayHello {
        in {
            String name
        }
        out {
            String result
        }
    }

    method sayHello2 fireAndForget {
        in {
            String name
        }
    }

    broadcast NewName {
        out {
            String name
        }
    }

    attribute Int32 aa
}
";

const MULTI_INTERFACE: &str = r"
package commonapi

<** This is a test comment for HelloWorld interface **>
interface HelloWorld {
  version {major 1 minor 0}

    <** This is
      a multi-line comment **>

        <** This is
      a multi-line comment **>

  <** This is
      a multi-line * comment **>
  method sayHello {
    in {
      String name
    }
    out {
      String result
    }
  }
  method sayHello2 fireAndForget {
    in {
      String name
    }
  }
  method setSettings {
    in {
      Int32 [] setting
    }
    out {
      Int32 result
    }
  }
  broadcast NewName {
  out {
    String name
    }
  }
  broadcast NewName2 {
  out {
    String name
    }
  }
  attribute Int32 aa
}
interface HelloWorld2 {
  version {major 2 minor 3}
  method sayHello {
    in {
      String name
    }
    out {
      String result
    }
  }
  attribute Int32 bb readonly
}
";

#[test]
fn test_hello_world() {
    let document = parse_fidl_string(HELLO_WORLD).unwrap();
    assert_eq!(document.package, "commonapi");
    assert_eq!(document.interfaces.len(), 1);

    let interface = &document.interfaces[0];
    assert_eq!(interface.name(), "HelloWorld");
    assert_eq!(interface.package_name(), "commonapi");
    assert_eq!(interface.version(), Some(Version { major: 1, minor: 0 }));

    let methods = interface.methods();
    assert_eq!(methods.len(), 2);
    assert_eq!(methods[0].name, "sayHello");
    assert_eq!(methods[0].inputs.len(), 1);
    assert_eq!(methods[0].inputs[0].name(), "name");
    assert_eq!(methods[0].inputs[0].cpp_type(), "std::string");
    let outputs = methods[0].outputs.as_ref().unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].name(), "result");

    assert_eq!(methods[1].name, "sayHello2");
    assert!(methods[1].outputs.is_none());
    assert_eq!(methods[1].inputs.len(), 1);

    assert_eq!(interface.broadcasts().len(), 1);
    assert_eq!(interface.broadcasts()[0].name, "NewName");
    assert_eq!(interface.broadcasts()[0].parameters[0].name(), "name");

    assert_eq!(interface.attributes().len(), 1);
    let attribute = &interface.attributes()[0];
    assert_eq!(attribute.name(), "Aa");
    assert_eq!(attribute.cpp_type(), "int32_t");
    assert!(!attribute.readonly);
    assert!(interface.has_writable_attributes());
}

#[test]
fn test_multiple_interfaces_and_comments() {
    let document = parse_fidl_string(MULTI_INTERFACE).unwrap();
    assert_eq!(document.interfaces.len(), 2);
    assert_eq!(document.method_count(), 4);
    assert_eq!(document.broadcast_count(), 2);
    assert_eq!(document.attribute_count(), 2);

    let first = document.get_interface("HelloWorld").unwrap();
    assert_eq!(
        first.description(),
        Some("This is a test comment for HelloWorld interface")
    );
    // only the comment nearest to the method is kept
    assert_eq!(
        first.methods()[0].description.as_deref(),
        Some("This is\n      a multi-line * comment")
    );
    assert_eq!(first.methods()[1].description, None);

    let settings = first.get_method("setSettings").unwrap();
    assert_eq!(settings.inputs[0].declared_type(), &TypeRef::new("Int32", true));
    assert_eq!(settings.inputs[0].cpp_type(), "std::vector<int32_t>");

    let second = document.get_interface("HelloWorld2").unwrap();
    assert_eq!(second.description(), None);
    assert_eq!(second.version(), Some(Version { major: 2, minor: 3 }));
    assert!(second.attributes()[0].readonly);
    assert!(!second.has_writable_attributes());
}

#[test]
fn test_compact_layout() {
    let document = parse_fidl_string(
        "package p\ninterface I { version { major 3 minor 4 } method m { in { Int32 a } out { Int32 b } } attribute String s }",
    )
    .unwrap();
    let interface = &document.interfaces[0];
    assert_eq!(interface.version(), Some(Version { major: 3, minor: 4 }));
    assert_eq!(interface.methods()[0].inputs[0].name(), "a");
    assert_eq!(interface.methods()[0].outputs.as_ref().unwrap()[0].name(), "b");
    assert_eq!(interface.attributes()[0].name(), "S");
}

#[test]
fn test_fire_and_forget_outputs() {
    let document = parse_fidl_string(
        r"
package p
interface I {
    method withReply { }
    method withoutReply fireAndForget { in { Int32 x } }
    method ignoredOut fireAndForget {
        out { Int32 y }
    }
}
",
    )
    .unwrap();
    let interface = &document.interfaces[0];
    assert_eq!(interface.methods()[0].outputs, Some(Vec::new()));
    assert!(!interface.methods()[0].is_fire_and_forget());
    for method in &interface.methods()[1..] {
        assert!(method.is_fire_and_forget());
        assert!(method.outputs.is_none());
    }
}

#[test]
fn test_brace_on_next_line() {
    let document = parse_fidl_string(
        r"
package p
interface I
{
    method m
    {
        in
        {
            String s
        }
    }
}
",
    )
    .unwrap();
    let method = &document.interfaces[0].methods()[0];
    assert_eq!(method.name, "m");
    assert_eq!(method.inputs[0].name(), "s");
}

#[test]
fn test_parameter_documentation_and_shared_lines() {
    let document = parse_fidl_string(
        r"
package p
interface I {
    method m {
        in {
            <** the name **>
            String name // trailing
            Int32 a Int32 [] b
        }
    }
}
",
    )
    .unwrap();
    let inputs = &document.interfaces[0].methods()[0].inputs;
    assert_eq!(inputs.len(), 3);
    assert_eq!(inputs[0].description(), Some("the name"));
    assert_eq!(inputs[1].name(), "a");
    assert_eq!(inputs[1].description(), None);
    assert_eq!(inputs[2].name(), "b");
    assert_eq!(inputs[2].cpp_type(), "std::vector<int32_t>");
}

#[test]
fn test_attribute_flags() {
    let document = parse_fidl_string(
        r"
package p
interface I {
    attribute Int32 plain
    attribute Int32 [] values readonly
    attribute tMode mode noSubscriptions readonly
    attribute Boolean flag noRead
}
",
    )
    .unwrap();
    let interface = &document.interfaces[0];
    let names: Vec<_> = interface.attributes().iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["Plain", "Values", "Mode", "Flag"]);

    let values = interface.get_attribute("Values").unwrap();
    assert!(values.readonly);
    assert_eq!(values.cpp_type(), "std::vector<int32_t>");

    let mode = interface.get_attribute("Mode").unwrap();
    assert!(mode.readonly);
    assert!(mode.no_subscriptions);
    assert_eq!(mode.cpp_type(), "I::tMode");

    let flag = interface.get_attribute("Flag").unwrap();
    assert!(flag.no_read);
    assert!(!flag.readonly);
}

#[test]
fn test_invalid_attribute_flag() {
    let err = parse_fidl_string("package p\ninterface I {\n  attribute Int32 aa readonyl\n}\n")
        .unwrap_err();
    match err {
        FidlError::InvalidDeclaration {
            line,
            construct,
            text,
        } => {
            assert_eq!(line, 3);
            assert_eq!(construct, "attribute");
            assert_eq!(text, "attribute Int32 aa readonyl");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_parameter() {
    let err = parse_fidl_string("package p\ninterface I { method m { in { String } } }").unwrap_err();
    assert!(matches!(
        err,
        FidlError::InvalidDeclaration {
            construct: "parameter",
            ..
        }
    ));
}

#[test]
fn test_error_clauses() {
    let document = parse_fidl_string(
        r"
package p
interface I {
    method byReference {
        error tErrors
    }
    method inline {
        out { Int32 r }
        error {
            OK
            FAILED = 2
            BUSY, RETRY
        }
    }
    method none { }
}
",
    )
    .unwrap();
    let interface = &document.interfaces[0];
    assert_eq!(
        interface.methods()[0].error,
        Some(MethodError::Reference {
            name: "tErrors".to_string()
        })
    );
    assert_eq!(
        interface.methods()[1].error,
        Some(MethodError::Enumerators {
            names: vec![
                "OK".to_string(),
                "FAILED".to_string(),
                "BUSY".to_string(),
                "RETRY".to_string()
            ]
        })
    );
    assert_eq!(interface.methods()[1].outputs.as_ref().unwrap().len(), 1);
    assert_eq!(interface.methods()[2].error, None);
}

#[test]
fn test_broadcasts() {
    let document = parse_fidl_string(
        r"
package p
interface I {
    <** fired on change **>
    broadcast valueChanged selective {
        out { Int32 value tState state }
    }
    broadcast Tick { }
}
",
    )
    .unwrap();
    let broadcasts = document.interfaces[0].broadcasts();
    assert_eq!(broadcasts.len(), 2);
    assert_eq!(broadcasts[0].name, "ValueChanged");
    assert!(broadcasts[0].selective);
    assert_eq!(broadcasts[0].description.as_deref(), Some("fired on change"));
    assert_eq!(broadcasts[0].parameters[1].cpp_type(), "I::tState");
    assert!(!broadcasts[1].selective);
    assert!(broadcasts[1].parameters.is_empty());
}

#[test]
fn test_type_collections_and_definitions() {
    let document = parse_fidl_string(
        r"
package org.example

<** shared types **>
typeCollection Common {
    version { major 2 minor 1 }
    <** identifiers **>
    typedef tId is UInt32
    array tIds of tId
    enumeration tMode { OFF ON }
    struct tPoint { Int32 x Int32 y }
    union tValue { Int32 i String s }
    map tTable { tId to String }
}

typeCollection {
    enumeration tLevel { LOW HIGH }
}

interface Store {
    enumeration tState { IDLE BUSY }
    method get { in { Common.tId id } out { Common.tIds ids } }
}
",
    )
    .unwrap();
    assert_eq!(document.type_collections.len(), 2);

    let common = &document.type_collections[0];
    assert_eq!(common.name, "Common");
    assert_eq!(common.package_name, "org.example");
    assert_eq!(common.full_name(), "org.example.Common");
    assert_eq!(common.description.as_deref(), Some("shared types"));
    assert_eq!(common.version, Some(Version { major: 2, minor: 1 }));

    let kinds: Vec<_> = common.types.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TypeKind::Typedef,
            TypeKind::Array,
            TypeKind::Enumeration,
            TypeKind::Struct,
            TypeKind::Union,
            TypeKind::Map,
        ]
    );
    assert_eq!(common.types[0].name, "tId");
    assert_eq!(common.types[0].description.as_deref(), Some("identifiers"));
    assert_eq!(common.types[0].element, Some(TypeRef::new("UInt32", false)));
    assert_eq!(common.types[1].element, Some(TypeRef::new("tId", false)));
    assert_eq!(common.types[2].element, None);

    let anonymous = &document.type_collections[1];
    assert!(anonymous.is_anonymous());
    assert_eq!(anonymous.types[0].name, "tLevel");

    let store = &document.interfaces[0];
    assert_eq!(store.types()[0].name, "tState");
    assert_eq!(store.type_collections(), document.type_collections.as_slice());
    let get = store.get_method("get").unwrap();
    assert_eq!(get.inputs[0].cpp_type(), "Common::tId");
    assert_eq!(get.outputs.as_ref().unwrap()[0].cpp_type(), "Common::tIds");
}

#[test]
fn test_extends_and_manages() {
    let document = parse_fidl_string(
        "package p\ninterface Derived extends p.Base {}\ninterface Manager manages Derived {}\n",
    )
    .unwrap();
    assert_eq!(document.interfaces[0].extends(), Some("p.Base"));
    assert_eq!(document.interfaces[1].extends(), None);
    assert_eq!(document.interfaces[1].name(), "Manager");
}

#[test]
fn test_imports_are_recorded() {
    let document = parse_fidl_string(
        r#"
package p
import model "common.fidl"
import org.example.* from "types/other.fidl"
interface I {}
"#,
    )
    .unwrap();
    assert_eq!(document.imports.len(), 2);
    assert_eq!(document.imports[0].selector, None);
    assert_eq!(document.imports[0].uri, "common.fidl");
    assert_eq!(document.imports[1].selector.as_deref(), Some("org.example.*"));
    assert_eq!(document.imports[1].uri, "types/other.fidl");
    assert!(document.type_collections.is_empty());
}

#[test]
fn test_missing_package() {
    let err = parse_fidl_string("interface I { method m {} }").unwrap_err();
    assert!(matches!(err, FidlError::MissingPackage { .. }));
    assert!(err.is_malformed_source());
}

#[test]
fn test_no_interfaces() {
    let err = parse_fidl_string("package p\ntypeCollection T { typedef tId is UInt32 }\n")
        .unwrap_err();
    assert!(matches!(err, FidlError::NoInterfaces { .. }));
    assert!(err.to_string().contains("nothing to generate"));
}

#[test]
fn test_duplicate_package_first_wins() {
    let document = parse_fidl_string("package first\npackage second\ninterface I {}\n").unwrap();
    assert_eq!(document.package, "first");
    assert_eq!(document.interfaces[0].package_name(), "first");
}

#[test]
fn test_unbalanced_braces() {
    let err = parse_fidl_string("package p\ninterface I {\n  method m {\n    in { String s }\n")
        .unwrap_err();
    assert!(matches!(err, FidlError::UnbalancedBraces { line: 2 }));
}

#[test]
fn test_braces_in_comments() {
    let document = parse_fidl_string(
        r"
package p
interface I {
    <** returns { something } **>
    method m { } // closing } here is a comment
    /* and { here */
}
",
    )
    .unwrap();
    assert_eq!(document.method_count(), 1);
    assert_eq!(
        document.interfaces[0].methods()[0].description.as_deref(),
        Some("returns { something }")
    );
}

#[test]
fn test_parsing_is_idempotent() {
    let first = parse_fidl_string(MULTI_INTERFACE).unwrap();
    let second = parse_fidl_string(MULTI_INTERFACE).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_namespace_propagation() {
    let document = parse_fidl_string(
        r"
package p
interface Alpha {
    method m { in { tKey key } out { tValue value } }
    broadcast b { out { tValue value } }
    attribute tMode mode
}
interface Beta {
    method m { in { tKey key } }
}
",
    )
    .unwrap();
    for interface in &document.interfaces {
        let name = interface.name();
        for method in interface.methods() {
            for parameter in method.inputs.iter().chain(method.outputs.iter().flatten()) {
                assert_eq!(parameter.type_namespace(), Some(name));
                assert!(parameter.cpp_type().starts_with(&format!("{name}::")));
            }
        }
        for broadcast in interface.broadcasts() {
            for parameter in &broadcast.parameters {
                assert_eq!(parameter.type_namespace(), Some(name));
            }
        }
        for attribute in interface.attributes() {
            assert_eq!(attribute.parameter().type_namespace(), Some(name));
        }
    }
    assert_eq!(
        document.interfaces[1].methods()[0].inputs[0].cpp_type(),
        "Beta::tKey"
    );
}
