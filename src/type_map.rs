//! Maps source scalar type names to Protocol Buffer type strings.
//!
//! # Type Mapping Table
//!
//! | Source type | Proto type | Notes |
//! |-------------|-----------|-------|
//! | `int`, `Integer`, `short`, `byte` | `int32` | |
//! | `long` | `int64` | |
//! | `Date` | `int64` | Values must be converted to epoch integers by the caller |
//! | `float` | `float` | |
//! | `double` | `double` | |
//! | `boolean` | `bool` | |
//! | `String` | `string` | |
//! | Sibling classes | their own name | Registered per run by the resolver |
//!
//! Lookups are case-insensitive: `Integer`, `integer` and `INTEGER` all map to
//! `int32`.

use std::collections::BTreeMap;

/// Map a source scalar type name to a proto scalar type string.
///
/// `type_name` is expected to be a simple name (no package prefix). Returns
/// `None` for anything that is not a known primitive.
pub fn primitive_proto_type(type_name: &str) -> Option<&'static str> {
    let proto = match type_name.to_ascii_lowercase().as_str() {
        "int" | "integer" | "short" | "byte" => "int32",

        // Dates travel as epoch integers.
        "long" | "date" => "int64",

        "float" => "float",
        "double" => "double",
        "boolean" => "bool",
        "string" => "string",
        _ => return None,
    };
    Some(proto)
}

/// Primitive mappings plus the sibling classes registered during one run.
///
/// The primitive seed is immutable; registrations only ever add
/// self-mappings (`color` → `Color`) and never shadow a primitive. Each
/// generation run owns its own table, so registrations never leak between
/// runs.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveTypeTable {
    references: BTreeMap<String, String>,
}

impl PrimitiveTypeTable {
    /// A table holding only the primitive seed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the proto type for `type_name`, case-insensitively.
    pub fn lookup(&self, type_name: &str) -> Option<&str> {
        primitive_proto_type(type_name)
            .or_else(|| self.references.get(&fold(type_name)).map(String::as_str))
    }

    /// Register a sibling class so fields of its type resolve to its name.
    ///
    /// The first registration of a case-folded name wins. Returns `true` if
    /// the name was newly registered.
    pub fn register(&mut self, class_name: &str) -> bool {
        let key = fold(class_name);
        if primitive_proto_type(&key).is_some() || self.references.contains_key(&key) {
            return false;
        }
        self.references.insert(key, class_name.to_string());
        true
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, type_name: &str) -> bool {
        self.lookup(type_name).is_some()
    }

    #[cfg(test)]
    pub(crate) fn registered_len(&self) -> usize {
        self.references.len()
    }
}

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}
