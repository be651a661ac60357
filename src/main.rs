use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::info;

use pojo_proto_gen::codegen::{self, EXAMPLE_SUFFIX, GenerateOptions};
use pojo_proto_gen::entity::{OptionStyle, SchemaEntity, Syntax};
use pojo_proto_gen::error::Result;
use pojo_proto_gen::schema::{self, DescriptorLoader, IgnoreList};

/// Generate Protocol Buffer definitions from data-object class descriptions.
///
/// Scans a package of JSON class descriptors and generates one .proto file
/// per class, resolving references between classes of the package.
#[derive(Parser)]
#[command(name = "pojo-proto-gen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate .proto files for every class in a package.
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Package of the generated proto files.
        #[arg(short = 'o', long, env = "POJO_PROTO_GEN_PROTO_PACKAGE")]
        proto_package: String,

        /// Host-language package emitted as a file option.
        /// Defaults to each class's own package.
        #[arg(short = 'j', long, env = "POJO_PROTO_GEN_HOST_PACKAGE")]
        host_package: Option<String>,

        /// Protocol buffer syntax: proto2 or proto3.
        #[arg(short, long, default_value = "proto2", env = "POJO_PROTO_GEN_SYNTAX")]
        syntax: Syntax,

        /// File option names: generic or java.
        #[arg(long, default_value = "generic", env = "POJO_PROTO_GEN_OPTION_STYLE")]
        option_style: OptionStyle,

        /// Output directory for generated .proto files.
        /// Without it, schemas are printed to stdout.
        #[arg(short = 'g', long, env = "POJO_PROTO_GEN_OUTPUT")]
        output: Option<PathBuf>,

        /// Suppress non-error output.
        #[arg(long, short)]
        quiet: bool,
    },

    /// List candidate classes in a package.
    Classes {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Root directory of the class descriptors.
    #[arg(short, long, env = "POJO_PROTO_GEN_INPUT")]
    input: PathBuf,

    /// Package of the source classes, e.g. com.acme.model.
    #[arg(short, long, env = "POJO_PROTO_GEN_PACKAGE")]
    package: String,

    /// File naming classes to skip, one per line.
    /// Defaults to <input>/ignore.txt when present.
    #[arg(long, env = "POJO_PROTO_GEN_IGNORE_FILE")]
    ignore_file: Option<PathBuf>,
}

impl SourceArgs {
    fn ignores(&self) -> Result<IgnoreList> {
        if let Some(path) = &self.ignore_file {
            return schema::load_ignore_list(path);
        }
        let default = self.input.join("ignore.txt");
        if default.is_file() {
            schema::load_ignore_list(&default)
        } else {
            info!("ignore.txt not found");
            Ok(IgnoreList::default())
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let quiet = matches!(cli.command, Commands::Generate { quiet: true, .. });
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if quiet { "warn" } else { "info" }),
    )
    .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");

        // Print cause chain.
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = std::error::Error::source(cause);
        }

        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            source,
            proto_package,
            host_package,
            syntax,
            option_style,
            output,
            quiet: _,
        } => {
            let ignores = source.ignores()?;
            let class_names = schema::list_candidate_class_names(&source.input, &source.package)?;

            let mut options = GenerateOptions::new(proto_package)
                .with_syntax(syntax)
                .with_option_style(option_style);
            if let Some(host_package) = host_package {
                options = options.with_host_package(host_package);
            }

            let loader = DescriptorLoader::new(&source.input);
            let generation = codegen::generate(
                &loader,
                &class_names,
                &source.package,
                &options,
                &ignores,
            );

            match output {
                Some(dir) => {
                    codegen::write_entities(&generation.entities, &dir)?;
                }
                None => print_entities(&generation.entities),
            }

            let stats = &generation.stats;
            info!(
                "Generated {} messages, {} enums, {} fields",
                stats.messages_generated, stats.enums_generated, stats.fields_generated
            );
            if stats.unsupported_fields_skipped > 0 {
                info!(
                    "Skipped {} fields with unsupported types",
                    stats.unsupported_fields_skipped
                );
            }
            if stats.classes_ignored > 0 {
                info!("Skipped {} ignored classes", stats.classes_ignored);
            }
            if stats.classes_failed > 0 {
                info!("Failed to load {} classes", stats.classes_failed);
            }
        }

        Commands::Classes { source } => {
            let ignores = source.ignores()?;
            let class_names = schema::list_candidate_class_names(&source.input, &source.package)?;
            for name in &class_names {
                println!("{}", describe_candidate(name, &ignores));
            }
        }
    }

    Ok(())
}

fn print_entities(entities: &[SchemaEntity]) {
    for (i, entity) in entities.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("// {}", entity.file_name());
        print!("{}", entity.render());
    }
}

fn describe_candidate(name: &str, ignores: &IgnoreList) -> String {
    if name.ends_with(EXAMPLE_SUFFIX) {
        format!("{name} (example, skipped)")
    } else if ignores.contains(name) {
        format!("{name} (ignored)")
    } else {
        name.to_string()
    }
}
