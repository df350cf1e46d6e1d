//! Conjoint command-line front end
//!
//! Subcommands:
//! - `generate`: print a batch of profiles
//! - `session`: load or create a respondent's stored profile set
//! - `render`: show a stored set as an HTML table or fill a page template

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use conjoint_core::{
    embed_labels, render_table, replace_targets, ConjointConfig, EmbeddedData, JsonFileStore,
    ProfileSet, Session, Uniqueness,
};
use std::io::Write;
use std::path::PathBuf;

/// Build the command-line definition
#[must_use]
pub fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Experiment configuration (.toml or .json)");
    let store_arg = Arg::new("store")
        .long("store")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("JSON file standing in for the embedded-data store");
    let key_arg = Arg::new("key")
        .long("key")
        .help("Embedded-data key (defaults to the configured storage key)");

    Command::new("conjoint")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Randomized conjoint profile generator")
        .subcommand_required(true)
        .subcommand(
            Command::new("generate")
                .about("Generate a batch of profiles")
                .arg(config_arg.clone())
                .arg(
                    Arg::new("count")
                        .long("count")
                        .value_parser(value_parser!(usize))
                        .help("Number of profiles (defaults to the configured set size)"),
                )
                .arg(
                    Arg::new("unique")
                        .long("unique")
                        .action(ArgAction::SetTrue)
                        .help("Reject duplicate profiles within the batch"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("session")
                .about("Load or create the stored profile set and embed its labels")
                .arg(config_arg.clone())
                .arg(store_arg.clone())
                .arg(key_arg.clone()),
        )
        .subcommand(
            Command::new("render")
                .about("Render a stored profile set")
                .arg(config_arg)
                .arg(store_arg)
                .arg(key_arg)
                .arg(
                    Arg::new("template")
                        .long("template")
                        .value_parser(value_parser!(PathBuf))
                        .help("Page text with {{profile.N.Factor}} targets"),
                ),
        )
}

/// Install the tracing subscriber, honouring `RUST_LOG`
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Run the parsed command, writing results to `out`
///
/// # Errors
/// Fails on unreadable configuration, store I/O errors, or a missing stored set.
pub fn run(matches: &ArgMatches, out: &mut impl Write) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("generate", args)) => generate(args, out),
        Some(("session", args)) => session(args, out),
        Some(("render", args)) => render(args, out),
        _ => bail!("no subcommand given"),
    }
}

fn load_config(args: &ArgMatches) -> anyhow::Result<ConjointConfig> {
    let path = args
        .get_one::<PathBuf>("config")
        .context("--config is required")?;
    ConjointConfig::from_path(path)
        .with_context(|| format!("loading configuration from {}", path.display()))
}

fn open_store(args: &ArgMatches) -> anyhow::Result<JsonFileStore> {
    let path = args
        .get_one::<PathBuf>("store")
        .context("--store is required")?;
    JsonFileStore::open(path).with_context(|| format!("opening store {}", path.display()))
}

fn storage_key(args: &ArgMatches, config: &ConjointConfig) -> String {
    args.get_one::<String>("key")
        .cloned()
        .unwrap_or_else(|| config.storage_key.clone())
}

fn generate(args: &ArgMatches, out: &mut impl Write) -> anyhow::Result<()> {
    let mut config = load_config(args)?;
    if let Some(seed) = args.get_one::<u64>("seed") {
        config.seed = Some(*seed);
    }
    let count = args
        .get_one::<usize>("count")
        .copied()
        .unwrap_or(config.set_size);
    let uniqueness = if args.get_flag("unique") {
        Uniqueness::Unique
    } else {
        Uniqueness::Any
    };

    let batch = config.generator()?.select(count, uniqueness);
    if batch.exhausted {
        tracing::warn!(
            produced = batch.profiles.len(),
            requested = batch.requested,
            "batch cut short"
        );
    }

    if args.get_flag("json") {
        writeln!(out, "{}", batch.profiles.to_json()?)?;
    } else {
        write_summary(out, &batch.profiles)?;
    }
    Ok(())
}

fn session(args: &ArgMatches, out: &mut impl Write) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let key = storage_key(args, &config);
    let mut store = open_store(args)?;
    let mut generator = config.generator()?;

    let session = Session::load_or_generate(&mut store, &key, &mut generator, config.set_size)?;
    let written = embed_labels(&mut store, &config.label_prefix, &session.profiles)?;
    tracing::info!(source = ?session.source, labels = written, "session ready");

    write_summary(out, &session.profiles)?;
    Ok(())
}

fn render(args: &ArgMatches, out: &mut impl Write) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let key = storage_key(args, &config);
    let store = open_store(args)?;

    let json = store
        .get(&key)
        .with_context(|| format!("no profile set stored under '{key}'"))?;
    let profiles = ProfileSet::from_json(&config.registry()?, &json)
        .with_context(|| format!("stored profile set '{key}' does not match the configuration"))?;

    match args.get_one::<PathBuf>("template") {
        Some(path) => {
            let template = std::fs::read_to_string(path)
                .with_context(|| format!("reading template {}", path.display()))?;
            let rendered = replace_targets(&template, &profiles);
            write!(out, "{}", rendered.text)?;
        }
        None => writeln!(out, "{}", render_table(&profiles))?,
    }
    Ok(())
}

fn write_summary(out: &mut impl Write, profiles: &ProfileSet) -> std::io::Result<()> {
    for (n, profile) in profiles.iter().enumerate() {
        let fields: Vec<String> = profile
            .labels()
            .into_iter()
            .map(|(factor, label)| format!("{factor}={label}"))
            .collect();
        writeln!(out, "{}: {}", n + 1, fields.join(", "))?;
    }
    Ok(())
}
