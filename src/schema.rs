//! Class structural descriptions, loading, and discovery.
//!
//! The generator never inspects classes itself. It consumes a normalized
//! [`ClassDescription`] (name, package, enum flag, declared fields, direct
//! parent) from a [`ClassLoader`]. [`DescriptorLoader`] reads JSON
//! descriptors laid out like a source tree:
//!
//! ```text
//! <source_dir>/com/acme/model/Point.json
//! ```
//!
//! ```json
//! {
//!   "name": "Point",
//!   "package": "com.acme.model",
//!   "extends": "com.acme.model.PointKey",
//!   "fields": [
//!     { "name": "x", "type": "int" },
//!     { "name": "tags", "type": "java.util.List<String>" }
//!   ]
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Simple names of single-parameter collection types.
const COLLECTION_TYPES: &[&str] = &[
    "Collection",
    "List",
    "ArrayList",
    "LinkedList",
    "Set",
    "HashSet",
    "LinkedHashSet",
    "TreeSet",
    "SortedSet",
    "NavigableSet",
    "Queue",
    "Deque",
    "ArrayDeque",
];

/// Serialization marker that never becomes a schema field.
const SERIAL_VERSION_FIELD: &str = "serialVersionUID";

/// A declared type in generic notation, e.g. `java.util.List<Color>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct TypeDescriptor {
    /// Possibly package-qualified type name, including any `[]` suffix.
    pub name: String,
    /// Generic type arguments, in declaration order.
    pub args: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    /// A non-generic type.
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Name without its package prefix: `java.lang.String` → `String`.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// The element type if this is a single-parameter collection.
    ///
    /// Maps, arrays and raw collections are not containers.
    pub fn container_element(&self) -> Option<&TypeDescriptor> {
        match self.args.as_slice() {
            [element] if COLLECTION_TYPES.contains(&self.simple_name()) => Some(element),
            _ => None,
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = DescriptorParser { input: s, pos: 0 };
        let descriptor = parser.parse_type()?;
        parser.skip_whitespace();
        if parser.pos < s.len() {
            return Err(Error::Descriptor(format!(
                "unexpected '{}' in '{s}'",
                &s[parser.pos..]
            )));
        }
        Ok(descriptor)
    }
}

impl TryFrom<String> for TypeDescriptor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.args.is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(">")
    }
}

struct DescriptorParser<'a> {
    input: &'a str,
    pos: usize,
}

impl DescriptorParser<'_> {
    fn parse_type(&mut self) -> Result<TypeDescriptor> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '<' | '>' | ',') {
                break;
            }
            self.pos += c.len_utf8();
        }
        let mut name = self.input[start..self.pos].trim().to_string();
        if name.is_empty() {
            return Err(Error::Descriptor(format!(
                "missing type name in '{}'",
                self.input
            )));
        }

        let mut args = Vec::new();
        if self.peek() == Some('<') {
            self.pos += 1;
            loop {
                args.push(self.parse_type()?);
                self.skip_whitespace();
                match self.bump() {
                    Some(',') => {}
                    Some('>') => break,
                    _ => {
                        return Err(Error::Descriptor(format!(
                            "unbalanced '<' in '{}'",
                            self.input
                        )));
                    }
                }
            }
            // Array of a generic type, e.g. `List<String>[]`.
            self.skip_whitespace();
            while self.input[self.pos..].starts_with("[]") {
                name.push_str("[]");
                self.pos += 2;
                self.skip_whitespace();
            }
        }

        Ok(TypeDescriptor { name, args })
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }
}

/// A declared field of a class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldDescription {
    pub name: String,

    /// Declared type of the field.
    #[serde(rename = "type")]
    pub type_descriptor: TypeDescriptor,

    /// Compiler-generated field (e.g. an enum's `$VALUES`).
    #[serde(default)]
    pub synthetic: bool,
}

impl FieldDescription {
    pub fn new(name: impl Into<String>, type_descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            type_descriptor,
            synthetic: false,
        }
    }

    /// Synthetic and serialization-marker fields are never mapped.
    pub fn is_synthetic(&self) -> bool {
        self.synthetic || self.name == SERIAL_VERSION_FIELD || self.name.starts_with('$')
    }
}

/// Normalized structure of one class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassDescription {
    /// Simple class name (e.g., `"Point"`).
    pub name: String,

    /// Package the class lives in (e.g., `"com.acme.model"`).
    #[serde(default)]
    pub package: String,

    #[serde(rename = "enum", default)]
    pub is_enum: bool,

    /// Qualified name of the direct parent class, if any.
    #[serde(default)]
    pub extends: Option<String>,

    /// Declared fields in declaration order. Inherited fields are not listed.
    #[serde(default)]
    pub fields: Vec<FieldDescription>,

    /// Direct parent, filled in by the loader.
    #[serde(skip)]
    pub parent: Option<Box<ClassDescription>>,
}

impl ClassDescription {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            is_enum: false,
            extends: None,
            fields: Vec::new(),
            parent: None,
        }
    }

    /// A class outside the descriptor tree: known by name only, no fields.
    pub fn external(qualified_name: &str) -> Self {
        let (package, name) = split_qualified(qualified_name);
        Self::new(package, name)
    }

    /// Package-qualified name, e.g. `com.acme.model.Point`.
    pub fn qualified_name(&self) -> String {
        qualify(&self.package, &self.name)
    }
}

/// Source of class structural descriptions.
pub trait ClassLoader {
    /// Load the class with the given package-qualified name, including its
    /// direct parent when it has one.
    fn load(&self, qualified_name: &str) -> Result<ClassDescription>;
}

/// In-memory classes keyed by qualified name.
impl ClassLoader for BTreeMap<String, ClassDescription> {
    fn load(&self, qualified_name: &str) -> Result<ClassDescription> {
        let mut class = self
            .get(qualified_name)
            .cloned()
            .ok_or_else(|| Error::ClassLoad {
                name: qualified_name.to_string(),
                reason: "no such class".to_string(),
            })?;
        if class.parent.is_none()
            && let Some(parent_name) = &class.extends
        {
            let parent = self
                .get(parent_name)
                .cloned()
                .unwrap_or_else(|| ClassDescription::external(parent_name));
            class.parent = Some(Box::new(parent));
        }
        Ok(class)
    }
}

/// Loads JSON class descriptors from a source-tree-shaped directory.
#[derive(Debug, Clone)]
pub struct DescriptorLoader {
    root: PathBuf,
}

impl DescriptorLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where the descriptor for `qualified_name` is expected.
    pub fn descriptor_path(&self, qualified_name: &str) -> PathBuf {
        let (package, name) = split_qualified(qualified_name);
        package_dir(&self.root, package).join(format!("{name}.json"))
    }

    fn read(&self, qualified_name: &str) -> Result<ClassDescription> {
        let path = self.descriptor_path(qualified_name);
        let content = std::fs::read_to_string(&path).map_err(|e| Error::Read {
            path: path.clone(),
            source: e,
        })?;
        let mut class: ClassDescription = serde_json::from_str(&content)?;
        let (package, simple) = split_qualified(qualified_name);
        if class.name != simple {
            return Err(Error::Descriptor(format!(
                "{} declares class '{}', expected '{simple}'",
                path.display(),
                class.name
            )));
        }
        if class.package.is_empty() {
            class.package = package.to_string();
        }
        Ok(class)
    }
}

impl ClassLoader for DescriptorLoader {
    fn load(&self, qualified_name: &str) -> Result<ClassDescription> {
        let load_error = |e: Error| Error::ClassLoad {
            name: qualified_name.to_string(),
            reason: e.to_string(),
        };

        let mut class = self.read(qualified_name).map_err(load_error)?;

        if let Some(parent_name) = class.extends.clone() {
            let parent = if self.descriptor_path(&parent_name).is_file() {
                self.read(&parent_name).map_err(load_error)?
            } else {
                debug!("parent '{parent_name}' of '{qualified_name}' has no descriptor");
                ClassDescription::external(&parent_name)
            };
            class.parent = Some(Box::new(parent));
        }

        Ok(class)
    }
}

/// List the candidate class names in `package` under `source_dir`.
///
/// Returns the stems of all `*.json` descriptors in the package directory,
/// sorted. A missing package directory yields an empty list.
pub fn list_candidate_class_names(source_dir: &Path, package: &str) -> Result<Vec<String>> {
    let dir = package_dir(source_dir, package);
    if !dir.is_dir() {
        warn!("package directory {} not found", dir.display());
        return Ok(Vec::new());
    }

    let read_error = |e: std::io::Error| Error::Read {
        path: dir.clone(),
        source: e,
    };
    let mut names = Vec::new();
    for entry in std::fs::read_dir(&dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();

    info!("found {} classes in package {package}", names.len());
    Ok(names)
}

/// Class names excluded from generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    names: BTreeSet<String>,
}

impl IgnoreList {
    /// Parse one class name per line; blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect()
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.names.contains(class_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoreList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Load an ignore list from disk.
pub fn load_ignore_list(path: &Path) -> Result<IgnoreList> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let ignores = IgnoreList::parse(&content);
    info!("loaded {} ignored classes from {}", ignores.len(), path.display());
    Ok(ignores)
}

/// Join a package and a simple name: (`com.acme`, `Point`) → `com.acme.Point`.
pub fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

fn split_qualified(qualified_name: &str) -> (&str, &str) {
    qualified_name.rsplit_once('.').unwrap_or(("", qualified_name))
}

fn package_dir(root: &Path, package: &str) -> PathBuf {
    package
        .split('.')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |dir, segment| dir.join(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(s: &str) -> TypeDescriptor {
        s.parse().unwrap()
    }

    #[test]
    fn parse_simple_type() {
        let ty = descriptor("java.lang.String");
        assert_eq!(ty.name, "java.lang.String");
        assert_eq!(ty.simple_name(), "String");
        assert!(ty.args.is_empty());
    }

    #[test]
    fn parse_generic_type() {
        let ty = descriptor("java.util.List< com.acme.Color >");
        assert_eq!(ty.simple_name(), "List");
        assert_eq!(ty.args, vec![TypeDescriptor::simple("com.acme.Color")]);
        assert_eq!(ty.container_element().map(|e| e.simple_name()), Some("Color"));
    }

    #[test]
    fn parse_nested_generic_type() {
        let ty = descriptor("Map<String, List<Integer>>");
        assert_eq!(ty.args.len(), 2);
        assert_eq!(
            ty.args[1],
            TypeDescriptor {
                name: "List".into(),
                args: vec![TypeDescriptor::simple("Integer")],
            }
        );
        assert_eq!(ty.args[1].to_string(), "List<Integer>");
        assert_eq!(ty.to_string(), "Map<String, List<Integer>>");
    }

    #[test]
    fn parse_generic_array() {
        let ty = descriptor("List<String>[]");
        assert_eq!(ty.name, "List[]");
        assert!(ty.container_element().is_none());
    }

    #[test]
    fn malformed_descriptors_are_rejected() {
        assert!("".parse::<TypeDescriptor>().is_err());
        assert!("List<String".parse::<TypeDescriptor>().is_err());
        assert!("List<>".parse::<TypeDescriptor>().is_err());
        assert!("String>".parse::<TypeDescriptor>().is_err());
    }

    #[test]
    fn maps_and_raw_collections_are_not_containers() {
        assert!(descriptor("Map<String, Integer>").container_element().is_none());
        assert!(descriptor("List").container_element().is_none());
        assert!(descriptor("int[]").container_element().is_none());
        assert!(descriptor("Optional<String>").container_element().is_none());
    }

    #[test]
    fn synthetic_fields() {
        let long = TypeDescriptor::simple("long");
        assert!(FieldDescription::new("serialVersionUID", long.clone()).is_synthetic());
        assert!(FieldDescription::new("$VALUES", long.clone()).is_synthetic());
        assert!(!FieldDescription::new("id", long.clone()).is_synthetic());

        let mut flagged = FieldDescription::new("id", long);
        flagged.synthetic = true;
        assert!(flagged.is_synthetic());
    }

    #[test]
    fn parse_class_descriptor() {
        let json = r#"{
            "name": "Order",
            "package": "com.acme",
            "extends": "com.acme.OrderKey",
            "fields": [
                { "name": "amount", "type": "double" },
                { "name": "lines", "type": "java.util.List<com.acme.Line>" }
            ]
        }"#;
        let class: ClassDescription = serde_json::from_str(json).unwrap();
        assert_eq!(class.qualified_name(), "com.acme.Order");
        assert!(!class.is_enum);
        assert_eq!(class.extends.as_deref(), Some("com.acme.OrderKey"));
        assert_eq!(class.fields.len(), 2);
        assert_eq!(class.fields[1].type_descriptor.args.len(), 1);
        assert!(class.parent.is_none());
    }

    #[test]
    fn parse_enum_descriptor_with_defaults() {
        let json = r#"{ "name": "Color", "enum": true }"#;
        let class: ClassDescription = serde_json::from_str(json).unwrap();
        assert!(class.is_enum);
        assert!(class.package.is_empty());
        assert!(class.fields.is_empty());
    }

    #[test]
    fn invalid_type_in_descriptor_fails_to_parse() {
        let json = r#"{ "name": "Bad", "fields": [{ "name": "x", "type": "List<" }] }"#;
        assert!(serde_json::from_str::<ClassDescription>(json).is_err());
    }

    #[test]
    fn in_memory_loader_resolves_parent() {
        let mut key = ClassDescription::new("com.acme", "OrderKey");
        key.fields
            .push(FieldDescription::new("orderId", TypeDescriptor::simple("long")));
        let mut order = ClassDescription::new("com.acme", "Order");
        order.extends = Some("com.acme.OrderKey".to_string());

        let classes = BTreeMap::from([
            (key.qualified_name(), key),
            (order.qualified_name(), order),
        ]);

        let loaded = classes.load("com.acme.Order").unwrap();
        let parent = loaded.parent.unwrap();
        assert_eq!(parent.name, "OrderKey");
        assert_eq!(parent.fields.len(), 1);

        let err = classes.load("com.acme.Missing").unwrap_err();
        assert!(err.to_string().contains("com.acme.Missing"));
    }

    #[test]
    fn descriptor_loader_reads_tree() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("com/acme");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(
            pkg.join("Order.json"),
            r#"{ "name": "Order", "extends": "com.acme.OrderKey",
                 "fields": [{ "name": "amount", "type": "double" }] }"#,
        )
        .unwrap();
        std::fs::write(
            pkg.join("OrderKey.json"),
            r#"{ "name": "OrderKey", "extends": "java.lang.Object",
                 "fields": [{ "name": "orderId", "type": "long" }] }"#,
        )
        .unwrap();

        let loader = DescriptorLoader::new(dir.path());
        let order = loader.load("com.acme.Order").unwrap();
        assert_eq!(order.package, "com.acme");
        let parent = order.parent.as_deref().unwrap();
        assert_eq!(parent.qualified_name(), "com.acme.OrderKey");
        assert_eq!(parent.fields[0].name, "orderId");

        let key = loader.load("com.acme.OrderKey").unwrap();
        let external = key.parent.unwrap();
        assert_eq!(external.qualified_name(), "java.lang.Object");
        assert!(external.fields.is_empty());
    }

    #[test]
    fn descriptor_loader_reports_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Broken.json"), "{ not json").unwrap();
        let loader = DescriptorLoader::new(dir.path());

        let missing = loader.load("Missing").unwrap_err();
        assert!(matches!(missing, Error::ClassLoad { .. }));

        let broken = loader.load("Broken").unwrap_err();
        assert!(broken.to_string().contains("Broken"));
    }

    #[test]
    fn descriptor_loader_rejects_mismatched_class_name() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("com/acme");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(
            pkg.join("Point.json"),
            r#"{ "name": "Pointer", "fields": [{ "name": "x", "type": "int" }] }"#,
        )
        .unwrap();

        let err = DescriptorLoader::new(dir.path())
            .load("com.acme.Point")
            .unwrap_err();
        assert!(matches!(err, Error::ClassLoad { ref name, .. } if name == "com.acme.Point"));
        assert!(err.to_string().contains("Pointer"));
    }

    #[test]
    fn candidate_names_are_sorted_json_stems() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("com/acme");
        std::fs::create_dir_all(&pkg).unwrap();
        for file in ["Point.json", "Color.json", "README.md", "Order.json"] {
            std::fs::write(pkg.join(file), "{}").unwrap();
        }

        let names = list_candidate_class_names(dir.path(), "com.acme").unwrap();
        assert_eq!(names, vec!["Color", "Order", "Point"]);
    }

    #[test]
    fn missing_package_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let names = list_candidate_class_names(dir.path(), "no.such.pkg").unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn ignore_list_parsing() {
        let ignores = IgnoreList::parse("# generated\nLegacyThing\n\n  Scratch  \n");
        assert_eq!(ignores.len(), 2);
        assert!(ignores.contains("LegacyThing"));
        assert!(ignores.contains("Scratch"));
        assert!(!ignores.contains("# generated"));
    }

    #[test]
    fn load_ignore_list_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ignore.txt");
        std::fs::write(&path, "A\nB\n").unwrap();
        let ignores = load_ignore_list(&path).unwrap();
        assert!(ignores.contains("A") && ignores.contains("B"));

        assert!(load_ignore_list(&dir.path().join("absent.txt")).is_err());
    }
}
