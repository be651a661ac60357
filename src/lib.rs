//! Generate Protocol Buffer definitions from plain data-object classes.
//!
//! `pojo-proto-gen` reads structural descriptions of data classes (name,
//! package, declared fields, direct parent) and produces one `.proto` file per
//! class, keeping an interchange schema in sync with the classes it mirrors.
//!
//! # Features
//!
//! - Generates `message` entities for classes and `enum` entities for enums
//! - Maps scalar field types through a fixed primitive table
//! - Resolves references between classes of the same batch and emits imports
//! - Maps single-level collections to `repeated` fields
//! - Flattens a `<Name>Key` parent class into its `<Name>` value class
//! - Renders both `proto2` (labels, defaults) and `proto3` syntax
//! - Deterministic output: byte-identical across runs
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//!
//! use pojo_proto_gen::codegen::{self, GenerateOptions};
//! use pojo_proto_gen::schema::{self, DescriptorLoader, IgnoreList};
//!
//! let source = Path::new("descriptors/");
//! let classes = schema::list_candidate_class_names(source, "com.acme.model")?;
//! let loader = DescriptorLoader::new(source);
//! let options = GenerateOptions::new("acme.model.v1");
//!
//! let generation = codegen::generate(
//!     &loader,
//!     &classes,
//!     "com.acme.model",
//!     &options,
//!     &IgnoreList::default(),
//! );
//! codegen::write_entities(&generation.entities, Path::new("proto/"))?;
//! # Ok::<(), pojo_proto_gen::error::Error>(())
//! ```

pub mod codegen;
pub mod entity;
pub mod error;
pub mod resolver;
pub mod schema;
pub mod type_map;
