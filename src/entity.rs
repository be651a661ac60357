//! In-memory schema entities and their `.proto` rendering.
//!
//! A [`SchemaEntity`] is one `.proto` file holding a single `message` or
//! `enum`. Fields are appended in declaration order and receive
//! monotonically increasing positional indices starting at 1; an index is
//! consumed at append time and never reused.
//!
//! Rendering is a pure function of the entity: [`SchemaEntity::render`]
//! always yields the same text for the same entity.

use std::fmt;
use std::str::FromStr;

/// Schema dialect of the rendered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    /// `proto2`: explicit `required`/`optional` labels and `[ default ]` values.
    #[default]
    Proto2,
    /// `proto3`: no presence labels and no bracketed defaults.
    Proto3,
}

impl Syntax {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Proto2 => "proto2",
            Self::Proto3 => "proto3",
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Syntax {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proto2" => Ok(Self::Proto2),
            "proto3" => Ok(Self::Proto3),
            other => Err(format!(
                "unknown syntax '{other}' (expected proto2 or proto3)"
            )),
        }
    }
}

/// Which option names carry the host-language metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionStyle {
    /// `host_language_package` / `host_language_container_name`.
    #[default]
    Generic,
    /// `java_package` / `java_outer_classname`.
    Java,
}

impl OptionStyle {
    fn package_option(self) -> &'static str {
        match self {
            Self::Generic => "host_language_package",
            Self::Java => "java_package",
        }
    }

    fn container_option(self) -> &'static str {
        match self {
            Self::Generic => "host_language_container_name",
            Self::Java => "java_outer_classname",
        }
    }
}

impl FromStr for OptionStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic" => Ok(Self::Generic),
            "java" => Ok(Self::Java),
            other => Err(format!(
                "unknown option style '{other}' (expected generic or java)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Message,
    Enum,
}

impl EntityKind {
    fn keyword(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Enum => "enum",
        }
    }

    /// Suffix appended to the class name to form the container option value.
    pub fn container_suffix(self) -> &'static str {
        match self {
            Self::Message => "Obj",
            Self::Enum => "Enum",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Singular,
    Repeated,
}

/// Presence label; only rendered under `proto2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// One field of a [`SchemaEntity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    /// Proto type name, already resolved.
    pub proto_type: String,
    pub cardinality: Cardinality,
    pub presence: Presence,
    /// 1-based positional index assigned at append time.
    pub index: u32,
    pub default_value: Option<String>,
}

impl Field {
    fn write_line(
        &self,
        f: &mut fmt::Formatter<'_>,
        kind: EntityKind,
        syntax: Syntax,
    ) -> fmt::Result {
        if kind == EntityKind::Enum {
            // Enum values are zero-based while indices start at 1.
            return writeln!(f, "\t{} = {};", self.name, self.index - 1);
        }

        let label = match (self.cardinality, syntax, self.presence) {
            (Cardinality::Repeated, _, _) => "repeated ",
            (Cardinality::Singular, Syntax::Proto3, _) => "",
            (Cardinality::Singular, Syntax::Proto2, Presence::Required) => "required ",
            (Cardinality::Singular, Syntax::Proto2, Presence::Optional) => "optional ",
        };
        write!(
            f,
            "\t{label}{} {} = {} ",
            self.proto_type, self.name, self.index
        )?;
        if let (Some(default), Syntax::Proto2) = (&self.default_value, syntax) {
            write!(f, "[ {default} ]")?;
        }
        writeln!(f, ";")
    }
}

/// One `.proto` unit: a single message or enum plus its file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntity {
    /// Entity name; also the output file stem.
    pub name: String,
    pub kind: EntityKind,
    /// Syntax declaration; `None` omits the `syntax` line and renders with
    /// `proto2` labelling.
    pub syntax: Option<Syntax>,
    /// Target proto package.
    pub package: String,
    /// Originating host-language package, emitted as a file option.
    pub host_package: String,
    /// Generated wrapper name, emitted as a file option.
    pub host_container_name: String,
    pub option_style: OptionStyle,
    imports: Vec<String>,
    fields: Vec<Field>,
    next_index: u32,
}

impl SchemaEntity {
    /// An empty entity with no syntax, package or options set.
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            syntax: None,
            package: String::new(),
            host_package: String::new(),
            host_container_name: String::new(),
            option_style: OptionStyle::default(),
            imports: Vec::new(),
            fields: Vec::new(),
            next_index: 1,
        }
    }

    /// Add an import unless it is already present. Returns `true` if added.
    pub fn append_import(&mut self, import: impl Into<String>) -> bool {
        let import = import.into();
        if self.imports.contains(&import) {
            return false;
        }
        self.imports.push(import);
        true
    }

    /// Append a field, assigning it the next positional index.
    ///
    /// Returns the index the field received.
    pub fn append_field(
        &mut self,
        name: impl Into<String>,
        proto_type: impl Into<String>,
        cardinality: Cardinality,
        presence: Presence,
        default_value: Option<String>,
    ) -> u32 {
        let index = self.next_index;
        self.next_index += 1;
        self.fields.push(Field {
            name: name.into(),
            proto_type: proto_type.into(),
            cardinality,
            presence,
            index,
            default_value,
        });
        index
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_enum(&self) -> bool {
        self.kind == EntityKind::Enum
    }

    /// Output file name, e.g. `Point.proto`.
    pub fn file_name(&self) -> String {
        format!("{}.proto", self.name)
    }

    /// Render the entity as `.proto` text.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SchemaEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(syntax) = self.syntax {
            writeln!(f, "syntax = \"{syntax}\";")?;
            writeln!(f)?;
        }
        writeln!(f, "package {};", self.package)?;

        if !self.is_enum() {
            writeln!(f)?;
            for import in &self.imports {
                writeln!(f, "import \"{import}\";")?;
            }
        }

        writeln!(f)?;
        if !self.host_package.is_empty() {
            writeln!(
                f,
                "option {} = \"{}\";",
                self.option_style.package_option(),
                self.host_package
            )?;
        }
        if !self.host_container_name.is_empty() {
            writeln!(
                f,
                "option {} = \"{}\";",
                self.option_style.container_option(),
                self.host_container_name
            )?;
        }

        writeln!(f)?;
        writeln!(f, "{} {} {{", self.kind.keyword(), self.name)?;
        writeln!(f)?;

        let syntax = self.syntax.unwrap_or_default();
        for field in &self.fields {
            // `value` carries an enum's numeric payload, not a constant.
            if self.is_enum() && field.name == "value" {
                continue;
            }
            field.write_line(f, self.kind, syntax)?;
            writeln!(f)?;
        }

        writeln!(f, "}}")
    }
}
