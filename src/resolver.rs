//! Field type classification against the primitive table and the batch.
//!
//! A [`TypeResolver`] lives for exactly one generation run. It owns its
//! [`PrimitiveTypeTable`], so sibling classes registered while processing one
//! class are visible to the rest of the run and to nothing else.

use log::debug;

use crate::entity::SchemaEntity;
use crate::schema::TypeDescriptor;
use crate::type_map::{PrimitiveTypeTable, primitive_proto_type};

/// Outcome of resolving one declared field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A scalar or message/enum reference.
    Scalar(String),
    /// A single-level collection of the given scalar or reference.
    Repeated(String),
    /// No schema mapping exists.
    Unsupported,
}

#[derive(Debug, Clone)]
pub struct TypeResolver {
    table: PrimitiveTypeTable,
    siblings: Vec<String>,
}

impl TypeResolver {
    /// A resolver for a batch containing `siblings` (simple class names).
    pub fn new<I, S>(siblings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: PrimitiveTypeTable::new(),
            siblings: siblings.into_iter().map(Into::into).collect(),
        }
    }

    /// Classify `declared` for a field of `current_class` (package-qualified).
    ///
    /// References to sibling classes are registered in the table and add a
    /// `<Sibling>.proto` import to `entity`. A reference to `current_class`
    /// itself resolves to its own name without an import, unless the name is
    /// a primitive.
    pub fn resolve(
        &mut self,
        declared: &TypeDescriptor,
        current_class: &str,
        entity: &mut SchemaEntity,
    ) -> Resolution {
        if let Some(scalar) = self.resolve_scalar(declared, current_class, entity) {
            return Resolution::Scalar(scalar);
        }

        // Only one level of collection; a nested collection element has no
        // scalar mapping and falls through to Unsupported.
        if let Some(element) = declared.container_element()
            && let Some(scalar) = self.resolve_scalar(element, current_class, entity)
        {
            return Resolution::Repeated(scalar);
        }

        Resolution::Unsupported
    }

    #[cfg(test)]
    pub(crate) fn table(&self) -> &PrimitiveTypeTable {
        &self.table
    }

    fn resolve_scalar(
        &mut self,
        declared: &TypeDescriptor,
        current_class: &str,
        entity: &mut SchemaEntity,
    ) -> Option<String> {
        let simple = declared.simple_name();
        if let Some(proto) = primitive_proto_type(simple) {
            return Some(proto.to_string());
        }

        let current_simple = current_class
            .rsplit_once('.')
            .map_or(current_class, |(_, name)| name);
        let names_current = simple.eq_ignore_ascii_case(current_simple);
        if names_current && refers_to(declared, current_class) {
            return Some(current_simple.to_string());
        }

        if !names_current
            && let Some(sibling) = self
                .siblings
                .iter()
                .find(|s| s.eq_ignore_ascii_case(simple))
        {
            if self.table.register(sibling) {
                debug!("registered sibling type {sibling}");
            }
            entity.append_import(format!("{sibling}.proto"));
        }

        self.table.lookup(simple).map(str::to_string)
    }
}

/// Whether `declared` names `qualified_class`. Unqualified names match on
/// the simple name alone.
fn refers_to(declared: &TypeDescriptor, qualified_class: &str) -> bool {
    !declared.name.contains('.') || declared.name.eq_ignore_ascii_case(qualified_class)
}
