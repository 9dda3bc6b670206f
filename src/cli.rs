use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// Generate a Swagger document from annotated `/** ... */` comment blocks
#[derive(Parser, Debug)]
#[command(name = "openapi-from-comments")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Source files, glob patterns or directories, relative to the base directory
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<String>,

    /// Directory the file patterns are resolved against
    #[arg(short = 'b', long = "base-dir", value_name = "DIR", default_value = ".")]
    pub base_dir: PathBuf,

    /// Base Swagger definition (YAML or JSON) providing info, host, basePath, ...
    #[arg(short = 'd', long = "definition", value_name = "FILE")]
    pub definition: Option<PathBuf>,

    /// Overrides the API title
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Overrides the API version
    #[arg(long = "api-version")]
    pub api_version: Option<String>,

    /// File extensions collected when a pattern names a directory
    #[arg(
        short = 'e',
        long = "extension",
        value_delimiter = ',',
        default_value = "js,jsx,ts,tsx,mjs,cjs"
    )]
    pub extensions: Vec<String>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.base_dir.is_dir() {
        anyhow::bail!(
            "Base directory does not exist or is not a directory: {}",
            args.base_dir.display()
        );
    }

    if let Some(ref definition) = args.definition {
        if !definition.is_file() {
            anyhow::bail!("Definition file does not exist: {}", definition.display());
        }
        info!("Base definition: {}", definition.display());
    }

    info!("Base directory: {}", args.base_dir.display());
    info!("Patterns: {:?}", args.files);
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::assembler::assemble;
    use crate::definition::load_definition;
    use crate::openapi_builder::SwaggerBuilder;
    use crate::parser::{CommentParser, ParsedFile};
    use crate::scanner::FileScanner;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
    use crate::validator::DocumentValidator;

    info!("Starting Swagger document generation...");

    // Step 1: Resolve source patterns
    info!("Resolving source files...");
    let scanner = FileScanner::new(args.base_dir.clone(), args.files.clone())
        .with_extensions(args.extensions.clone());
    let scan_result = scanner.scan()?;

    info!(
        "Found {} source files ({} warnings)",
        scan_result.source_files.len(),
        scan_result.warnings.len()
    );

    if scan_result.source_files.is_empty() {
        anyhow::bail!("No source files matched the given patterns");
    }

    // Step 2: Extract annotated comments
    info!("Parsing annotated comments...");
    let parsed_files: Vec<ParsedFile> = CommentParser::parse_files(&scan_result.source_files)
        .into_iter()
        .filter_map(|r| match r {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping file: {}", e);
                None
            }
        })
        .collect();

    let comment_count: usize = parsed_files.iter().map(|f| f.comments.len()).sum();
    info!(
        "Found {} annotated comments in {} files",
        comment_count,
        parsed_files.len()
    );

    // Step 3: Start from the base definition
    let mut builder = match &args.definition {
        Some(path) => SwaggerBuilder::from_definition(load_definition(path)?),
        None => SwaggerBuilder::new(),
    };

    // Step 4: Assemble and merge one fragment per comment
    info!("Building Swagger document...");
    for parsed in &parsed_files {
        debug!("Merging comments from {}", parsed.path.display());
        builder.add_fragments(
            parsed
                .comments
                .iter()
                .map(assemble)
                .filter(|fragment| !fragment.is_empty()),
        );
    }

    let document = builder
        .with_info_overrides(args.title.clone(), args.api_version.clone())
        .build();

    // Step 5: Check references
    let document = DocumentValidator::validate_and_report(document);
    let operation_count: usize = document.paths.values().map(|p| p.len()).sum();
    if operation_count == 0 {
        log::warn!("No routes found in the annotated comments");
    }

    // Step 6: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    // Step 7: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", scan_result.source_files.len());
    info!("  - Annotated comments: {}", comment_count);
    info!("  - Operations: {}", operation_count);
    info!("  - Definitions: {}", document.definitions.len());

    Ok(())
}
