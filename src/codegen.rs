//! Protocol Buffer schema generation from class descriptions.
//!
//! [`generate`] turns a batch of classes into one [`SchemaEntity`] per class:
//! - Enums become proto `enum`s, everything else a `message`
//! - Scalar fields map through the primitive table
//! - References to other classes of the batch add an import
//! - Single-level collections become `repeated` fields
//! - A direct parent named `<Class>Key` is flattened into `<Class>`
//!
//! Failures are local: a class that cannot be loaded, or a field whose type
//! has no mapping, is logged and skipped without aborting the run.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::entity::{Cardinality, EntityKind, OptionStyle, Presence, SchemaEntity, Syntax};
use crate::error::{Error, Result};
use crate::resolver::{Resolution, TypeResolver};
use crate::schema::{ClassDescription, ClassLoader, IgnoreList, qualify};

/// Classes whose name ends with this suffix are samples, never generated.
pub const EXAMPLE_SUFFIX: &str = "Example";

/// Suffix of the key class a value class may extend.
pub const KEY_SUFFIX: &str = "Key";

/// Settings shared by every entity of a run.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Target proto package (required).
    pub proto_package: String,
    /// Overrides the host-language package emitted as a file option.
    pub host_package: Option<String>,
    pub syntax: Syntax,
    pub option_style: OptionStyle,
}

impl GenerateOptions {
    pub fn new(proto_package: impl Into<String>) -> Self {
        Self {
            proto_package: proto_package.into(),
            ..Self::default()
        }
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn with_host_package(mut self, host_package: impl Into<String>) -> Self {
        self.host_package = Some(host_package.into());
        self
    }

    pub fn with_option_style(mut self, option_style: OptionStyle) -> Self {
        self.option_style = option_style;
        self
    }
}

/// Statistics collected during generation for reporting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerationStats {
    pub messages_generated: usize,
    pub enums_generated: usize,
    pub fields_generated: usize,
    pub unsupported_fields_skipped: usize,
    pub synthetic_fields_skipped: usize,
    pub duplicate_fields_skipped: usize,
    pub classes_ignored: usize,
    pub classes_failed: usize,
    pub key_classes_flattened: usize,
}

impl GenerationStats {
    pub fn entities_generated(&self) -> usize {
        self.messages_generated + self.enums_generated
    }
}

/// Result of one generation run.
#[derive(Debug)]
pub struct Generation {
    /// Entities in input class order.
    pub entities: Vec<SchemaEntity>,
    pub stats: GenerationStats,
}

/// Generate schema entities for `class_names` (simple names in
/// `source_package`), in input order.
///
/// Every name in `class_names` counts as a sibling for cross-references,
/// including ignored and example classes.
pub fn generate(
    loader: &impl ClassLoader,
    class_names: &[String],
    source_package: &str,
    options: &GenerateOptions,
    ignores: &IgnoreList,
) -> Generation {
    let mut generator = SchemaGenerator {
        options,
        resolver: TypeResolver::new(class_names.iter().cloned()),
        stats: GenerationStats::default(),
    };
    let mut entities = Vec::new();

    for name in class_names {
        if name.ends_with(EXAMPLE_SUFFIX) {
            info!("skipped {name}: example class");
            generator.stats.classes_ignored += 1;
            continue;
        }
        if ignores.contains(name) {
            info!("skipped {name}: listed in ignore file");
            generator.stats.classes_ignored += 1;
            continue;
        }

        let qualified = qualify(source_package, name);
        let class = match loader.load(&qualified) {
            Ok(class) => class,
            Err(e) => {
                warn!("{e}; class skipped");
                generator.stats.classes_failed += 1;
                continue;
            }
        };

        info!("processing class {qualified}");
        entities.push(generator.build_entity(&class));
    }

    Generation {
        entities,
        stats: generator.stats,
    }
}

struct SchemaGenerator<'a> {
    options: &'a GenerateOptions,
    resolver: TypeResolver,
    stats: GenerationStats,
}

impl SchemaGenerator<'_> {
    fn build_entity(&mut self, class: &ClassDescription) -> SchemaEntity {
        let kind = if class.is_enum {
            self.stats.enums_generated += 1;
            EntityKind::Enum
        } else {
            self.stats.messages_generated += 1;
            EntityKind::Message
        };

        let mut entity = SchemaEntity::new(&class.name, kind);
        entity.syntax = Some(self.options.syntax);
        entity.package = self.options.proto_package.clone();
        entity.host_package = self
            .options
            .host_package
            .clone()
            .unwrap_or_else(|| class.package.clone());
        entity.host_container_name = format!("{}{}", class.name, kind.container_suffix());
        entity.option_style = self.options.option_style;

        let qualified = class.qualified_name();
        self.append_fields(class, &qualified, &mut entity);

        // Own fields first, then the key parent's.
        if let Some(parent) = class.parent.as_deref()
            && parent.qualified_name() == format!("{qualified}{KEY_SUFFIX}")
        {
            debug!("flattening {} into {}", parent.name, class.name);
            self.append_fields(parent, &qualified, &mut entity);
            self.stats.key_classes_flattened += 1;
        }

        entity
    }

    fn append_fields(
        &mut self,
        source: &ClassDescription,
        current_class: &str,
        entity: &mut SchemaEntity,
    ) {
        for field in &source.fields {
            if field.is_synthetic() {
                self.stats.synthetic_fields_skipped += 1;
                continue;
            }
            if entity.field(&field.name).is_some() {
                debug!(
                    "{}.{} shadows an earlier field; skipped",
                    source.name, field.name
                );
                self.stats.duplicate_fields_skipped += 1;
                continue;
            }

            let resolution = self
                .resolver
                .resolve(&field.type_descriptor, current_class, entity);
            let (cardinality, proto_type) = match resolution {
                Resolution::Scalar(proto_type) => (Cardinality::Singular, proto_type),
                Resolution::Repeated(proto_type) => (Cardinality::Repeated, proto_type),
                Resolution::Unsupported => {
                    let err = Error::UnsupportedFieldType {
                        field: format!("{}.{}", source.name, field.name),
                        type_name: field.type_descriptor.to_string(),
                    };
                    warn!("{err}; field skipped");
                    self.stats.unsupported_fields_skipped += 1;
                    continue;
                }
            };

            let index = entity.append_field(
                &field.name,
                proto_type,
                cardinality,
                Presence::Optional,
                None,
            );
            debug!("{}.{} -> field {index}", entity.name, field.name);
            self.stats.fields_generated += 1;
        }
    }
}

/// Write each entity to `<output_dir>/<name>.proto`, overwriting existing
/// files.
///
/// If `output_dir` is an existing regular file, output goes to
/// `<output_dir>.2` instead. Returns the written paths in entity order.
pub fn write_entities(entities: &[SchemaEntity], output_dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = if output_dir.is_file() {
        let mut fallback = OsString::from(output_dir.as_os_str());
        fallback.push(".2");
        let fallback = PathBuf::from(fallback);
        info!(
            "{} is a file, writing to {} instead",
            output_dir.display(),
            fallback.display()
        );
        fallback
    } else {
        output_dir.to_path_buf()
    };

    let mut written = Vec::with_capacity(entities.len());
    for entity in entities {
        let path = dir.join(entity.file_name());
        write_file(&path, &entity.render())?;
        info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Write content to a file, creating parent directories as needed.
fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
