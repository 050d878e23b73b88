//! Command-line interface for headergen
//!
//! Usage:
//!   headergen parse [-c config.json] [-o output] [-d baseDir] [--] `<header>`...
//!   headergen transform [-s source.json] [-t transform.json] [-o output] [-d baseDir] [--] `<header>`...
//!   headergen generate [-a api.json] [-d baseDir] [--] `<target-file>`...
//!   headergen update [-a api.json] [-d baseDir] [--] `<target-file>`...
//!   headergen help [verb]
//!
//! Any `.json` argument before `--` is merged into the configuration, in order, after the
//! `-c` files. Logging goes to stderr and is controlled by `HEADERGEN_LOG`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use headergen::parser::ParserKind;
use headergen::processor::{self, Verb};
use headergen::Config;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let matches = match cli().try_get_matches() {
        Ok(matches) => matches,
        Err(err) => {
            let _ = err.print();
            std::process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };

    let Some((name, verb_matches)) = matches.subcommand() else {
        unreachable!("a subcommand is required");
    };
    let Some(verb) = Verb::from_name(name) else {
        unreachable!("clap only accepts known verbs");
    };

    if let Err(err) = handle_verb(verb, verb_matches) {
        eprintln!("Error: {err:#}");
        if matches!(err.downcast_ref::<headergen::Error>(), Some(headergen::Error::Usage(_))) {
            eprintln!("\n{}", cli().find_subcommand_mut(name).map(|cmd| cmd.render_usage()).unwrap_or_default());
        }
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("HEADERGEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cli() -> Command {
    Command::new("headergen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parses the SDL3 headers and generates the SDL3pp wrapper headers")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            verb(Command::new("parse").about("Parse headers into an API JSON"))
                .arg(output_arg())
                .arg(flag("store-line-numbers", "Record the line span of every entry"))
                .arg(flag("parse-docs", "Parse doc comments into structured blocks")),
        )
        .subcommand(
            verb(Command::new("transform").about("Map a source API onto the wrapper API"))
                .arg(output_arg())
                .arg(
                    Arg::new("source-api")
                        .long("source-api")
                        .short('s')
                        .value_name("FILE")
                        .help("Source API JSON; the input headers are parsed when missing"),
                )
                .arg(
                    Arg::new("transform")
                        .long("transform")
                        .short('t')
                        .value_name("FILE")
                        .help("Transform spec JSON"),
                ),
        )
        .subcommand(verb(Command::new("generate").about("Write one header per file of a target API")).arg(api_arg()))
        .subcommand(
            verb(Command::new("update").about("Update existing headers in place to match a target API")).arg(api_arg()),
        )
}

/// Arguments every verb takes.
fn verb(command: Command) -> Command {
    command
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .action(ArgAction::Append)
                .help("Configuration JSON, may be repeated"),
        )
        .arg(
            Arg::new("base-dir")
                .long("base-dir")
                .short('d')
                .value_name("DIR")
                .help("Directory relative files are resolved against"),
        )
        .arg(
            Arg::new("parser")
                .long("parser")
                .value_parser(["linebased", "grammar"])
                .help("Header parser strategy"),
        )
        .arg(flag("silent", "Do not log warnings"))
        .arg(flag("stop-on-warn", "Treat the first warning as an error"))
        .arg(
            Arg::new("inputs")
                .help("Input files; .json files are merged into the configuration")
                .num_args(0..),
        )
        .arg(
            Arg::new("files")
                .help("Input files, taken as given")
                .num_args(0..)
                .last(true),
        )
}

fn output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .value_name("FILE")
        .help("Output file, `-` for stdout")
}

fn api_arg() -> Arg {
    Arg::new("api")
        .long("api")
        .short('a')
        .value_name("FILE")
        .help("Target API JSON")
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help).action(ArgAction::SetTrue)
}

fn handle_verb(verb: Verb, matches: &ArgMatches) -> Result<()> {
    let config = configure(matches)?;
    processor::run(verb, &config).with_context(|| format!("{} failed", verb.name()))
}

/// The merged configuration files with the command line flags applied on top.
fn configure(matches: &ArgMatches) -> Result<Config> {
    let mut config_files: Vec<PathBuf> = strings(matches, "config").map(PathBuf::from).collect();
    let mut sources = Vec::new();
    for input in strings(matches, "inputs") {
        if input.ends_with(".json") {
            config_files.push(PathBuf::from(input));
        } else {
            sources.push(input.to_string());
        }
    }
    sources.extend(strings(matches, "files").map(str::to_string));

    let mut config = Config::load(&config_files).context("loading configuration")?;
    config.sources.extend(sources);

    if let Some(dir) = string(matches, "base-dir") {
        config.base_dir = Some(PathBuf::from(dir));
    }
    if let Some(parser) = string(matches, "parser").and_then(ParserKind::from_name) {
        config.parser = parser;
    }
    if let Some(output) = string(matches, "output") {
        config.output_file = Some(output.to_string());
    }
    if let Some(path) = string(matches, "source-api") {
        config.source_api = Some(PathBuf::from(path));
    }
    if let Some(path) = string(matches, "transform") {
        config.transform = Some(headergen::config::TransformSource::Path(PathBuf::from(path)));
    }
    if let Some(path) = string(matches, "api") {
        config.api = Some(PathBuf::from(path));
    }
    config.silent |= flag_set(matches, "silent");
    config.stop_on_warn |= flag_set(matches, "stop-on-warn");
    config.store_line_numbers |= flag_set(matches, "store-line-numbers");
    config.parse_docs |= flag_set(matches, "parse-docs");
    Ok(config)
}

fn strings<'a>(matches: &'a ArgMatches, id: &str) -> impl Iterator<Item = &'a str> {
    matches
        .try_get_many::<String>(id)
        .ok()
        .flatten()
        .into_iter()
        .flatten()
        .map(String::as_str)
}

fn string<'a>(matches: &'a ArgMatches, id: &str) -> Option<&'a str> {
    matches.try_get_one::<String>(id).ok().flatten().map(String::as_str)
}

fn flag_set(matches: &ArgMatches, id: &str) -> bool {
    matches.try_get_one::<bool>(id).ok().flatten().copied().unwrap_or(false)
}
