//! openapi-from-comments - Command-line tool generating a Swagger 2.0 document
//! from `@route`/`@param`/`@returns`/`@typedef` annotations in source comments.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-comments [OPTIONS] <FILES>...
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation from every route file:
//! ```bash
//! openapi-from-comments -b ./server 'routes/**/*.js' -o swagger.yaml
//! ```
//!
//! Merge into a base definition and emit JSON:
//! ```bash
//! openapi-from-comments -d base.yaml -f json src -o swagger.json
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-from-comments src -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_comments::cli;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists,
    // validation happens after logger init so it can log
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("openapi-from-comments starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Swagger document generation completed successfully");

    Ok(())
}
