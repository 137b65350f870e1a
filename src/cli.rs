//! Command-line interface for structedit.

use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::conformance::{self, ScanOptions};
use crate::edit::{EditError, Editor, PathGuard, ReplaceRequest};
use crate::report::{self, Format};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Structural source editing for tool callers.
///
/// Structedit indexes the top-level declarations of Go source files, finds
/// one by kind and name, and replaces it in place only if the edited file
/// still parses. It also reports undocumented declarations across a tree,
/// paged to fit a response budget.
#[derive(Parser)]
#[command(name = "structedit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: String,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the top-level declarations of a file
    #[command(visible_alias = "ls")]
    List(ListArgs),
    /// Find one declaration and print its span and text
    Locate(LocateArgs),
    /// Replace one declaration, keeping the file only if it still parses
    Replace(ReplaceArgs),
    /// Report undocumented declarations and missing READMEs
    #[command(visible_alias = "check")]
    Scan(ScanArgs),
}

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Source file
    pub path: PathBuf,

    /// Grammar identifier (default: from the file extension)
    #[arg(short, long)]
    pub language: Option<String>,
}

/// Arguments for the locate command.
#[derive(Args)]
pub struct LocateArgs {
    /// Source file
    pub path: PathBuf,

    /// Construct kind: package, import, const, var, type, function, method
    pub part_type: String,

    /// Name, or Receiver.Name for methods
    pub part_name: String,

    /// Grammar identifier (default: from the file extension)
    #[arg(short, long)]
    pub language: Option<String>,
}

/// Arguments for the replace command.
#[derive(Args)]
#[command(group(
    clap::ArgGroup::new("source")
        .required(true)
        .args(["content", "content_file"])
))]
pub struct ReplaceArgs {
    /// Source file
    pub path: PathBuf,

    /// Construct kind: package, import, const, var, type, function, method
    pub part_type: String,

    /// Name, or Receiver.Name for methods
    pub part_name: String,

    /// Replacement text
    #[arg(long)]
    pub content: Option<String>,

    /// File holding the replacement text ("-" reads stdin)
    #[arg(long)]
    pub content_file: Option<PathBuf>,

    /// Grammar identifier (default: from the file extension)
    #[arg(short, long)]
    pub language: Option<String>,
}

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// File or directory to scan
    pub path: PathBuf,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Skip this many issues (after sorting)
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Response budget in characters (default: from config)
    #[arg(long)]
    pub budget: Option<usize>,

    /// Exit non-zero when any issue is found
    #[arg(long)]
    pub fail_on_issues: bool,
}

/// Shared state for one invocation.
struct Context {
    config: Config,
    format: Format,
}

/// Parse the format flag and load the configuration.
fn prepare(cli: &Cli) -> Result<Context, i32> {
    let format = match cli.format.parse::<Format>() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(EXIT_ERROR);
        }
    };

    let config = match Config::discover(cli.config.as_deref()) {
        Ok((config, _)) => config,
        Err(e) => {
            eprintln!("Error parsing config: {}", e);
            return Err(EXIT_ERROR);
        }
    };

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid config: {}", e);
        return Err(EXIT_ERROR);
    }

    Ok(Context { config, format })
}

/// Run the selected subcommand and return the exit code.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    let ctx = match prepare(cli) {
        Ok(ctx) => ctx,
        Err(code) => return Ok(code),
    };

    match &cli.command {
        Commands::List(args) => run_list(args, &ctx),
        Commands::Locate(args) => run_locate(args, &ctx),
        Commands::Replace(args) => run_replace(args, &ctx),
        Commands::Scan(args) => run_scan(args, &ctx),
    }
}

fn editor(ctx: &Context) -> Editor {
    Editor::new(PathGuard::new(&ctx.config.allowed_paths))
}

/// Exit code for a refused edit.
fn edit_exit_code(err: &EditError) -> i32 {
    match err.category() {
        "unsupported_capability" | "storage_failure" => EXIT_ERROR,
        _ => EXIT_FAILED,
    }
}

fn report_edit_error(err: &EditError, format: Format) -> anyhow::Result<i32> {
    match format {
        Format::Json => report::write_error_json(err)?,
        Format::Pretty => report::write_error_pretty(err),
    }
    Ok(edit_exit_code(err))
}

fn run_list(args: &ListArgs, ctx: &Context) -> anyhow::Result<i32> {
    match editor(ctx).list(&args.path, args.language.as_deref()) {
        Ok(resp) => {
            match ctx.format {
                Format::Json => report::write_json(&resp)?,
                Format::Pretty => report::write_list_pretty(&resp),
            }
            Ok(EXIT_SUCCESS)
        }
        Err(e) => report_edit_error(&e, ctx.format),
    }
}

fn run_locate(args: &LocateArgs, ctx: &Context) -> anyhow::Result<i32> {
    let result = editor(ctx).locate(
        &args.path,
        args.language.as_deref(),
        &args.part_type,
        &args.part_name,
    );
    match result {
        Ok(resp) => {
            match ctx.format {
                Format::Json => report::write_json(&resp)?,
                Format::Pretty => report::write_locate_pretty(&resp),
            }
            Ok(if resp.found { EXIT_SUCCESS } else { EXIT_FAILED })
        }
        Err(e) => report_edit_error(&e, ctx.format),
    }
}

/// Replacement text from `--content`, a file, or stdin.
fn read_content(args: &ReplaceArgs) -> anyhow::Result<String> {
    if let Some(content) = &args.content {
        return Ok(content.clone());
    }
    match args.content_file.as_deref() {
        Some(p) if p == Path::new("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(p) => std::fs::read_to_string(p)
            .map_err(|e| anyhow::anyhow!("reading {}: {}", p.display(), e)),
        None => anyhow::bail!("one of --content or --content-file is required"),
    }
}

fn run_replace(args: &ReplaceArgs, ctx: &Context) -> anyhow::Result<i32> {
    let new_content = match read_content(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let request = ReplaceRequest {
        path: args.path.clone(),
        language: args.language.clone(),
        part_type: args.part_type.clone(),
        part_name: args.part_name.clone(),
        new_content,
    };

    match editor(ctx).replace(&request) {
        Ok(resp) => {
            match ctx.format {
                Format::Json => report::write_json(&resp)?,
                Format::Pretty => report::write_replace_pretty(&resp),
            }
            Ok(EXIT_SUCCESS)
        }
        Err(e) => report_edit_error(&e, ctx.format),
    }
}

fn run_scan(args: &ScanArgs, ctx: &Context) -> anyhow::Result<i32> {
    let options = ScanOptions::from_config(&ctx.config, args.recursive)?;
    let budget = args.budget.unwrap_or(ctx.config.response_budget);
    if budget == 0 {
        eprintln!("Error: --budget must be greater than zero");
        return Ok(EXIT_ERROR);
    }

    let report = match conformance::check(&args.path, &options, args.offset, budget) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match ctx.format {
        Format::Json => report::write_scan_json(&report)?,
        Format::Pretty => report::write_scan_pretty(&report),
    }

    if args.fail_on_issues && !report.is_clean() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_replace_requires_content() {
        let parsed = Cli::try_parse_from(["structedit", "replace", "a.go", "function", "Run"]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from([
            "structedit",
            "replace",
            "a.go",
            "function",
            "Run",
            "--content",
            "func Run() {}",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, "json");
        match cli.command {
            Commands::Replace(args) => {
                assert_eq!(read_content(&args).unwrap(), "func Run() {}");
            }
            _ => panic!("expected replace"),
        }
    }

    #[test]
    fn test_edit_exit_codes() {
        let not_found = EditError::NotFound {
            kind: "function".to_string(),
            name: "x".to_string(),
        };
        assert_eq!(edit_exit_code(&not_found), EXIT_FAILED);
        assert_eq!(
            edit_exit_code(&EditError::AccessDenied(PathBuf::from("/etc/x.go"))),
            EXIT_ERROR
        );
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::try_parse_from(["structedit", "-vv", "scan", ".", "-r"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Scan(args) => assert!(args.recursive),
            _ => panic!("expected scan"),
        }
    }
}
