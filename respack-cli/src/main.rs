use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use respack::{
    Event, ExportOptions, PackageFormat, ResourcePack, SaveOptions, TabularExportOptions,
    TabularImportOptions, TabularOptions,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Export resource bundles from one or more module trees into a
    /// translator package (one delimited file per module/bundle, one column
    /// per locale).
    Export {
        /// The target package format
        #[arg(long, default_value = "csv")]
        format: String,

        /// Base directories to search for module resource files
        #[arg(default_value = ".")]
        modules: Vec<String>,

        /// Name of the resulting package, without extension
        #[arg(short, long)]
        outfile: Option<String>,

        /// Separator character for the delimited fields
        #[arg(short, long, default_value_t = ';')]
        separator: char,

        /// Character used to enclose fields containing the separator, the
        /// quotation character, or a line break
        #[arg(short, long, default_value_t = '"')]
        quotation: char,

        /// Character used to escape the quotation character inside a field
        #[arg(short, long, default_value_t = '"')]
        escape: char,

        /// End-of-line sequence for the delimited files
        #[arg(short = 'l', long)]
        eol: Option<String>,

        /// Only export resource keys still missing a translation for at
        /// least one of the given locales
        #[arg(long = "if-not", num_args = 1..)]
        if_not: Vec<String>,
    },

    /// Merge translations from a previously exported package back into the
    /// corresponding `.properties` files.
    Import {
        /// The package file to import
        file: String,

        /// The root directory where the modules to update are located
        #[arg(short, long, default_value = ".")]
        base_dir: String,

        /// Separator character for the delimited fields
        #[arg(short, long, default_value_t = ';')]
        separator: char,

        /// Character used to enclose special fields
        #[arg(short, long, default_value_t = '"')]
        quotation: char,

        /// Character used to escape the quotation character inside a field
        #[arg(short, long, default_value_t = '"')]
        escape: char,

        /// Write empty translations instead of leaving the target keys
        /// untouched
        #[arg(long)]
        include_empty: bool,
    },
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), respack::Error> {
    match args.commands {
        Commands::Export {
            format,
            modules,
            outfile,
            separator,
            quotation,
            escape,
            eol,
            if_not,
        } => {
            let package_format: PackageFormat = format.parse()?;
            let out_name = outfile.unwrap_or_else(default_out_name);

            let pack = ResourcePack::from_module_dirs(&modules, &report)?;

            let export = ExportOptions {
                out_name: out_name.clone(),
                if_not_locales: if_not,
            };
            let out_path = format!("{}.{}", out_name, package_format.extension());
            match package_format {
                PackageFormat::Tabular => {
                    let options = TabularExportOptions {
                        export,
                        format: TabularOptions {
                            separator,
                            quote: quotation,
                            escape,
                            eol: eol.unwrap_or_else(|| TabularOptions::default().eol),
                        },
                    };
                    let bytes = pack.to_tabular_package(&options, &report)?;
                    std::fs::write(&out_path, bytes)?;
                }
                PackageFormat::Json => {
                    let document = pack.to_json(&export, &report);
                    std::fs::write(&out_path, format!("{:#}", document))?;
                }
            }

            println!("{:#}", serde_json::json!(pack.summary()));
            println!("wrote {}", out_path);
            Ok(())
        }

        Commands::Import {
            file,
            base_dir,
            separator,
            quotation,
            escape,
            include_empty,
        } => {
            let options = TabularImportOptions {
                format: TabularOptions {
                    separator,
                    quote: quotation,
                    escape,
                    ..TabularOptions::default()
                },
                base_dir: PathBuf::from(base_dir),
            };

            let pack =
                ResourcePack::from_tabular_package(file.as_ref(), &options, &report)?;
            println!("{:#}", serde_json::json!(pack.summary()));

            pack.save(
                &SaveOptions {
                    ignore_if_empty: !include_empty,
                },
                &report,
            )
        }
    }
}

fn default_out_name() -> String {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0);
    format!("resources_{}", seconds)
}

/// Printing event sink: progress to stdout, skipped units to stderr.
fn report(event: Event) {
    match event {
        Event::BuildStart { file_count } => {
            println!("extracting resources from {} file(s)...", file_count)
        }
        Event::BuildFile {
            module,
            bundle,
            locale,
            ..
        } => println!("  {} > {} [{}]", module, bundle, locale),
        Event::IngestStart => println!("reading package..."),
        Event::MemberDone {
            module,
            bundle,
            entry_count,
            ..
        } => println!("  {} > {}: {} resource(s)", module, bundle, entry_count),
        Event::InvalidMember { member } => {
            eprintln!("skipping unexpected package member: {}", member)
        }
        Event::UnknownModule { module, base_dir } => {
            eprintln!("skipping module `{}`: not found under {}", module, base_dir)
        }
        Event::AmbiguousModule {
            module, candidates, ..
        } => eprintln!(
            "skipping module `{}`: multiple candidates ({})",
            module,
            candidates.join(", ")
        ),
        Event::InvalidLocale { locale, member } => {
            eprintln!("dropping column `{}` in {}: not a locale", locale, member)
        }
        Event::MergeFileDone { path, upserts } => {
            println!("  updated {} ({} upsert(s))", path, upserts)
        }
        _ => {}
    }
}
