//! Bulkmap CLI - Transform simple-mode campaign sheets to bulk-import CSV
//!
//! # Main Commands
//!
//! ```bash
//! bulkmap transform campaigns.csv -o bulk.csv   # Map a sheet
//! bulkmap check campaigns.csv                   # Validate only
//! bulkmap serve                                 # Start HTTP server (port 3000)
//! ```
//!
//! # Helper Commands
//!
//! ```bash
//! bulkmap template -o sheet.csv      # Blank simple-mode sheet
//! bulkmap columns                    # Bulk-import columns
//! bulkmap profile show legacy        # Print a built-in profile
//! bulkmap profile check my.json      # Validate a profile file
//! bulkmap parse campaigns.csv        # Debug: parsed rows as JSON
//! ```

use bulkmap::{
    error_table_to_csv, input_template_csv, mapped_table_to_csv, output_columns,
    parse_csv_file_auto, server, transform_csv, MappingProfile, PipelineResult,
    TransformOptions,
};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "bulkmap")]
#[command(about = "Transform simple-mode campaign sheets to bulk-import CSV", long_about = None)]
struct Cli {
    /// Silence progress logs on stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a simple-mode CSV to bulk-import CSV
    Transform {
        /// Input CSV file
        input: PathBuf,

        /// Output file for the mapped table (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for the error table
        #[arg(short, long)]
        errors: Option<PathBuf>,

        /// Built-in profile name or profile JSON file
        #[arg(short, long, env = "BULKMAP_PROFILE")]
        profile: Option<String>,

        /// Write the mapped table even when rows failed
        #[arg(long)]
        allow_errors: bool,
    },

    /// Validate a simple-mode CSV without writing output
    Check {
        /// Input CSV file
        input: PathBuf,

        /// Built-in profile name or profile JSON file
        #[arg(short, long, env = "BULKMAP_PROFILE")]
        profile: Option<String>,
    },

    /// Parse a CSV file and output rows as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a blank simple-mode sheet with example rows
    Template {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the bulk-import columns in output order
    Columns,

    /// Inspect mapping profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: BULKMAP_PORT or 3000)
        #[arg(long)]
        port: Option<u16>,

        /// Default profile for requests without one
        #[arg(short, long, env = "BULKMAP_PROFILE")]
        profile: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// List built-in profiles
    List,

    /// Print a built-in profile as JSON
    Show {
        /// Profile name (default: revised)
        name: Option<String>,
    },

    /// Validate a profile JSON file
    Check {
        /// Profile JSON file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    bulkmap::api::logs::set_quiet(cli.quiet);

    let result = match cli.command {
        Commands::Transform {
            input,
            output,
            errors,
            profile,
            allow_errors,
        } => cmd_transform(
            &input,
            output.as_deref(),
            errors.as_deref(),
            options(profile),
            allow_errors,
        ),

        Commands::Check { input, profile } => cmd_check(&input, options(profile)),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Template { output } => cmd_template(output.as_deref()),

        Commands::Columns => cmd_columns(),

        Commands::Profile { action } => cmd_profile(action),

        Commands::Serve { port, profile } => cmd_serve(port, options(profile)).await,
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Environment defaults with an optional profile override.
fn options(profile: Option<String>) -> TransformOptions {
    match profile {
        Some(profile) => TransformOptions::from_env().with_profile(profile),
        None => TransformOptions::from_env(),
    }
}

/// Returns `Ok(false)` when rows failed, so the process exits with 1 even
/// when `--allow-errors` wrote the table.
fn cmd_transform(
    input: &Path,
    output: Option<&Path>,
    errors_output: Option<&Path>,
    options: TransformOptions,
    allow_errors: bool,
) -> CliResult<bool> {
    eprintln!("📄 Processing: {}", input.display());

    let result = transform_csv(input, &options)?;
    print_summary(&result);

    let clean = result.output.is_clean();
    if let Some(path) = errors_output {
        write_output(&error_table_to_csv(&result.output.errors)?, Some(path))?;
    }

    if !clean && !allow_errors {
        eprintln!(
            "\n⚠️  {} row(s) failed; mapped table not written",
            result.output.errors.len()
        );
        eprintln!("   Use --allow-errors to write it anyway");
        return Ok(false);
    }

    write_output(&mapped_table_to_csv(&result.output.mapped)?, output)?;
    eprintln!("\n✨ Done!");
    Ok(clean)
}

fn cmd_check(input: &Path, options: TransformOptions) -> CliResult<bool> {
    eprintln!("📄 Checking: {}", input.display());

    let result = transform_csv(input, &options)?;
    print_summary(&result);

    for err in result.output.errors.iter() {
        println!("row {} [{}]: {}", err.row, err.field, err.error);
    }
    println!("{}", serde_json::to_string_pretty(&result.stats)?);

    Ok(result.output.is_clean())
}

fn print_summary(result: &PipelineResult) {
    let stats = &result.stats;
    eprintln!("\n📊 Summary ({} profile)", result.profile);
    eprintln!("   Encoding:   {}", result.csv_info.encoding);
    eprintln!("   Delimiter:  '{}'", format_delimiter(result.csv_info.delimiter));
    eprintln!("   Rows:       {}", result.csv_info.row_count);
    eprintln!("   Mapped:     {}", stats.mapped_rows);
    eprintln!("   Rejected:   {}", stats.error_rows);
    eprintln!("   Campaigns:  {}", stats.campaigns);
    eprintln!("   Ad sets:    {}", stats.ad_sets);
    eprintln!("   Ads:        {}", stats.ads);
    eprintln!(
        "   Budgets:    campaign {} / ad set {}",
        stats.campaign_budget_total, stats.ad_set_budget_total
    );
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> CliResult<bool> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = parse_csv_file_auto(input)?;
    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} rows", result.rows.len());

    let json = serde_json::to_string_pretty(&result.rows)?;
    write_output(json.as_bytes(), output)?;
    Ok(true)
}

fn cmd_template(output: Option<&Path>) -> CliResult<bool> {
    write_output(&input_template_csv()?, output)?;
    Ok(true)
}

fn cmd_columns() -> CliResult<bool> {
    for column in output_columns() {
        println!("{}", column);
    }
    Ok(true)
}

fn cmd_profile(action: ProfileAction) -> CliResult<bool> {
    match action {
        ProfileAction::List => {
            for name in MappingProfile::builtin_names() {
                let profile = MappingProfile::builtin(name)?;
                println!("{:<10} {}", name, profile.description);
            }
        }

        ProfileAction::Show { name } => {
            let profile = MappingProfile::builtin(name.as_deref().unwrap_or("revised"))?;
            println!("{}", profile.to_json()?);
        }

        ProfileAction::Check { file } => {
            let profile = MappingProfile::from_file(&file)?;
            eprintln!("✅ {} is a valid profile: {}", file.display(), profile.name);
            eprintln!("   Objectives: {}", profile.enums.objectives.len());
            eprintln!("   Age range:  {}-{}", profile.age.min, profile.age.max);
        }
    }
    Ok(true)
}

async fn cmd_serve(port: Option<u16>, options: TransformOptions) -> CliResult<bool> {
    // Fail fast on a bad default profile.
    MappingProfile::load(&options.profile)?;
    let port = port.unwrap_or_else(server::port_from_env);
    server::start_server(port, options).await?;
    Ok(true)
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &[u8], path: Option<&Path>) -> CliResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
