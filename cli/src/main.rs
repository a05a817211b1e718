//! docfill CLI - Word certificate template filling tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docfill::{
    detect_format_from_path, parse_file_with_options, scan_document, DocFill, JsonFormat,
    LayoutRules, ParseOptions, RenderOptions, VariableMap,
};

#[derive(Parser)]
#[command(name = "docfill")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Fill Word certificate templates with plain and rich-text variables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill a template with one set of variables
    Fill {
        /// Template .docx file
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        /// JSON object with the variables
        #[arg(long, value_name = "FILE")]
        vars: PathBuf,

        /// Output file (defaults to <template>_filled.docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Skip the certificate layout rules
        #[arg(long)]
        no_layout: bool,

        /// JSON file overriding the layout rules
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Uppercase person-name values
        #[arg(long)]
        uppercase_names: bool,

        /// Print the replacement report as JSON
        #[arg(long)]
        report: bool,
    },

    /// Fill a template once per record
    Batch {
        /// Template .docx file
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        /// JSON array of variable objects
        #[arg(long, value_name = "FILE")]
        records: PathBuf,

        /// Output directory (defaults to <template>_output)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Variable used to name each output file
        #[arg(long, value_name = "KEY", env = "DOCFILL_NAME_KEY")]
        name_key: Option<String>,

        /// Skip the certificate layout rules
        #[arg(long)]
        no_layout: bool,
    },

    /// List the placeholders of a template
    Inspect {
        /// Template .docx file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// JSON object with variables to check against
        #[arg(long, value_name = "FILE")]
        vars: Option<PathBuf>,
    },

    /// Dump the text of a document
    Text {
        /// Input .docx file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Leave out headers and footers
        #[arg(long)]
        body_only: bool,
    },

    /// Dump the document model as JSON
    Json {
        /// Input .docx file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fill {
            template,
            vars,
            output,
            no_layout,
            rules,
            uppercase_names,
            report,
        } => cmd_fill(
            &template,
            &vars,
            output.as_deref(),
            no_layout,
            rules.as_deref(),
            uppercase_names,
            report,
        ),
        Commands::Batch {
            template,
            records,
            output,
            name_key,
            no_layout,
        } => cmd_batch(
            &template,
            &records,
            output.as_deref(),
            name_key.as_deref(),
            no_layout,
        ),
        Commands::Inspect { input, vars } => cmd_inspect(&input, vars.as_deref()),
        Commands::Text {
            input,
            output,
            body_only,
        } => cmd_text(&input, output.as_deref(), body_only),
        Commands::Json {
            input,
            output,
            compact,
        } => cmd_json(&input, output.as_deref(), compact),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn read_vars(path: &Path) -> Result<VariableMap, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(path)?;
    Ok(VariableMap::from_json_str(&json)?)
}

fn builder(no_layout: bool, rules: Option<&Path>) -> Result<DocFill, Box<dyn std::error::Error>> {
    let mut builder = DocFill::new();
    if no_layout {
        builder = builder.without_layout();
    } else if let Some(path) = rules {
        let json = fs::read_to_string(path)?;
        builder = builder.with_layout_rules(LayoutRules::from_json_str(&json)?);
    }
    Ok(builder)
}

fn default_output(template: &Path, suffix: &str) -> PathBuf {
    let stem = template.file_stem().unwrap_or_default().to_string_lossy();
    template.with_file_name(format!("{}{}", stem, suffix))
}

fn cmd_fill(
    template: &Path,
    vars: &Path,
    output: Option<&Path>,
    no_layout: bool,
    rules: Option<&Path>,
    uppercase_names: bool,
    report: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let vars = read_vars(vars)?;
    let mut builder = builder(no_layout, rules)?;
    if uppercase_names {
        builder = builder.with_uppercase_names();
    }

    let filled = builder.fill(template, &vars)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(template, "_filled.docx"));
    filled.save_to(&output)?;

    if report {
        println!("{}", serde_json::to_string_pretty(&filled.report)?);
    } else {
        println!(
            "{} {} ({} replaced, {} rich, {} tables)",
            "Saved to".green(),
            output.display(),
            filled.report.replaced,
            filled.report.rich,
            filled.report.tables_inserted
        );
    }

    if filled.report.fallbacks > 0 {
        println!(
            "{} {} rich value(s) inserted as plain text",
            "Warning:".yellow().bold(),
            filled.report.fallbacks
        );
    }
    if !filled.report.is_complete() {
        println!(
            "{} {}",
            "Unresolved:".yellow().bold(),
            filled.report.unresolved.join(", ")
        );
    }

    Ok(())
}

/// File name for one batch record: the record's name value with unsafe
/// characters replaced, or its position.
fn record_file_name(vars: &VariableMap, name_key: Option<&str>, index: usize) -> String {
    let name = name_key
        .and_then(|key| vars.resolve(key))
        .map(|value| {
            value
                .trim()
                .chars()
                .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
                .collect::<String>()
        })
        .filter(|name| !name.is_empty());
    match name {
        Some(name) => format!("{:04}_{}.docx", index + 1, name),
        None => format!("{:04}.docx", index + 1),
    }
}

fn cmd_batch(
    template: &Path,
    records: &Path,
    output: Option<&Path>,
    name_key: Option<&str>,
    no_layout: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = fs::read_to_string(records)?;
    let records = VariableMap::records_from_json_str(&json)?;

    let output_dir = output.map(Path::to_path_buf).unwrap_or_else(|| {
        let stem = template.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_output", stem))
    });
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(records.len() as u64 + 1);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Filling documents...");
    let filled = builder(no_layout, None)?.fill_batch(template, &records)?;
    pb.inc(1);

    let mut incomplete = 0;
    for (index, (doc, vars)) in filled.iter().zip(&records).enumerate() {
        let name = record_file_name(vars, name_key, index);
        pb.set_message(name.clone());
        doc.save_to(output_dir.join(&name))?;
        if !doc.report.is_complete() {
            incomplete += 1;
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done!");

    println!(
        "\n{} {} documents written to {}",
        "Done!".green().bold(),
        filled.len(),
        output_dir.display()
    );
    if incomplete > 0 {
        println!(
            "{} {} documents have unresolved placeholders",
            "Warning:".yellow().bold(),
            incomplete
        );
    }

    Ok(())
}

fn cmd_inspect(input: &Path, vars: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let format = detect_format_from_path(input)?;
    let options = ParseOptions::new().lenient();
    let doc = parse_file_with_options(input, options)?;
    let vars = vars.map(read_vars).transpose()?;

    println!("{}", "Template Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!(
        "{}: {}",
        "Macros".bold(),
        if format.macro_enabled { "Yes" } else { "No" }
    );
    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref creator) = doc.metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref modified) = doc.metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!("{}: {}", "Paragraphs".bold(), doc.paragraphs().count());
    println!("{}: {}", "Tables".bold(), doc.tables().count());
    println!("{}: {}", "Headers".bold(), doc.headers.len());
    println!("{}: {}", "Footers".bold(), doc.footers.len());

    println!();
    println!("{}", "Placeholders".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let names = scan_document(&doc);
    if names.is_empty() {
        println!("{}", "(none)".dimmed());
    }
    for name in &names {
        let marker = if docfill::template::is_rich_variable(name) {
            " (rich)".dimmed().to_string()
        } else {
            String::new()
        };
        match &vars {
            Some(vars) if vars.contains(name) => println!("  {} {}{}", "✓".green(), name, marker),
            Some(_) => println!("  {} {}{}", "✗".red(), name, marker),
            None => println!("  {} {}{}", "•".dimmed(), name, marker),
        }
    }

    Ok(())
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    body_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = ParseOptions::new().lenient();
    let doc = parse_file_with_options(input, options)?;

    let render_options = RenderOptions::new().with_headers_footers(!body_only);
    let text = docfill::render::to_text(&doc, &render_options)?;

    if let Some(path) = output {
        fs::write(path, &text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = docfill::parse_file(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = docfill::render::to_json(&doc, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docfill".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Word certificate template filling tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/docfill".dimmed());
    println!("License: MIT");
}
