use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use redate_core::{
    app_paths, apply_pairs, compile, generate_plan, load_config, load_pattern_file, save_config,
    AppConfig, CenturyRule, PatternRule, RenamePlan, RenameRule,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "redate", version)]
#[command(about = "Batch-rename files with a regex or by rewriting embedded dates as yyyy-mm-dd")]
struct Cli {
    /// Log collision handling and skipped files.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rename files matching SEARCH by substituting REPLACE ($1, ${name} expand groups).
    Pattern(PatternArgs),
    /// Apply every rule of a JSON pattern file in order.
    Patterns(PatternsArgs),
    /// Rewrite the date found in each name as yyyy-mm-dd.
    ///
    /// FORMAT names the existing date layout using one field of each kind:
    /// y (2 or 4 digit year), yy, yyyy, m (month, padded or not), mm,
    /// mmm (month name), d (day, padded or not), dd. Examples: dmy, mmmdyy,
    /// mmddyyyy, dd-mm-yy.
    Date(DateArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    /// Write the default configuration if none exists yet.
    Init,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// Only print the planned renames.
    #[arg(short = 'n', long, default_value_t = false)]
    dry_run: bool,
    /// Rename without asking for confirmation.
    #[arg(short, long, default_value_t = false)]
    yes: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Args)]
struct PatternArgs {
    search: String,
    replace: String,
    #[arg(required = true)]
    files: Vec<String>,
    /// Replace every match instead of the first one.
    #[arg(short, long)]
    multiple: bool,
    #[command(flatten)]
    batch: BatchArgs,
}

#[derive(Debug, Args)]
struct PatternsArgs {
    pattern_file: PathBuf,
    #[arg(required = true)]
    files: Vec<String>,
    #[command(flatten)]
    batch: BatchArgs,
}

#[derive(Debug, Args)]
struct DateArgs {
    format: String,
    #[arg(required = true)]
    files: Vec<String>,
    /// Two digits prepended to two-digit years.
    #[arg(short, long, conflicts_with = "rollover")]
    century: Option<String>,
    /// Two-digit years below this value become 20xx, the rest 19xx.
    #[arg(long)]
    rollover: Option<u32>,
    /// Characters accepted between date fields.
    #[arg(long)]
    separators: Option<String>,
    /// Separator placed between the rewritten fields.
    #[arg(long)]
    output_separator: Option<String>,
    /// Do not tolerate commas between date fields.
    #[arg(long)]
    strict_commas: bool,
    #[command(flatten)]
    batch: BatchArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Pattern(args) => cmd_pattern(args),
        Commands::Patterns(args) => cmd_patterns(args),
        Commands::Date(args) => cmd_date(args),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
            ConfigAction::Init => cmd_config_init(),
        },
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "redate=debug,redate_core=debug"
    } else {
        "redate=info,redate_core=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn cmd_pattern(args: PatternArgs) -> Result<()> {
    let config = load_config()?;
    let rule = PatternRule::new(
        &args.search,
        &args.replace,
        args.multiple || config.allow_multiple,
    )?;
    run_batch(&args.files, &RenameRule::Pattern(rule), &args.batch)
}

fn cmd_patterns(args: PatternsArgs) -> Result<()> {
    let rules = load_pattern_file(&args.pattern_file)?;
    run_batch(&args.files, &RenameRule::Patterns(rules), &args.batch)
}

fn cmd_date(args: DateArgs) -> Result<()> {
    let mut config = load_config()?;
    if let Some(separators) = args.separators {
        config.input_separators = separators;
    }
    if let Some(separator) = args.output_separator {
        config.output_separator = separator;
    }
    config.strict_commas |= args.strict_commas;

    let mut options = config.normalize_options();
    if let Some(prefix) = args.century {
        options.century = CenturyRule::Prefix(prefix);
    } else if let Some(threshold) = args.rollover {
        options.century = CenturyRule::Rollover(threshold);
    }

    let pattern = compile(&args.format, &config.date_pattern_options())?;
    run_batch(&args.files, &RenameRule::Date { pattern, options }, &args.batch)
}

fn run_batch(files: &[String], rule: &RenameRule, batch: &BatchArgs) -> Result<()> {
    let plan = generate_plan(files, rule)?;

    match batch.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Table => print_table(&plan),
    }

    if plan.pairs.is_empty() {
        eprintln!("Nothing to rename.");
        return Ok(());
    }
    if batch.dry_run {
        eprintln!("Dry run: no files were renamed.");
        return Ok(());
    }
    if !batch.yes && !confirm("Continue with rename? [y/N] ")? {
        eprintln!("Aborted.");
        return Ok(());
    }

    let result = apply_pairs(&plan.pairs)?;
    eprintln!("Renamed {} file(s).", result.applied);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("could not read confirmation")?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("config file: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let paths = app_paths()?;
    if paths.config_path.exists() {
        println!("config already exists: {}", paths.config_path.display());
        return Ok(());
    }
    save_config(&AppConfig::default())?;
    println!("wrote {}", paths.config_path.display());
    Ok(())
}

fn print_table(plan: &RenamePlan) {
    for pair in &plan.pairs {
        println!("{} ==> {}", pair.source, pair.target);
    }

    eprintln!(
        "\nsummary: inputs={} unchanged={} no_date={} collisions={} planned={}",
        plan.stats.inputs,
        plan.stats.unchanged,
        plan.stats.no_date_match,
        plan.stats.collisions_resolved,
        plan.stats.planned
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_date_command() {
        let cli = Cli::try_parse_from([
            "redate", "date", "mmddyyyy", "a.txt", "b.txt", "--century", "19", "-n",
        ])
        .expect("must parse");
        let Commands::Date(args) = cli.command else {
            panic!("expected date command");
        };
        assert_eq!(args.format, "mmddyyyy");
        assert_eq!(args.files, ["a.txt", "b.txt"]);
        assert_eq!(args.century.as_deref(), Some("19"));
        assert!(args.batch.dry_run);
    }

    #[test]
    fn century_and_rollover_conflict() {
        let result = Cli::try_parse_from([
            "redate", "date", "dmy", "a.txt", "--century", "19", "--rollover", "50",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn confirmation_accepts_yes_variants() {
        for answer in ["y\n", "Y", "yes\r\n", " YES "] {
            assert!(is_affirmative(answer), "answer {answer:?}");
        }
        for answer in ["", "n", "no", "yep"] {
            assert!(!is_affirmative(answer), "answer {answer:?}");
        }
    }
}
