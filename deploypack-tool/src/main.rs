use clap::Parser;
use deploypack_lib::Config;
use std::{collections::HashMap, env, fs};
use tracing_subscriber::{EnvFilter, fmt};

mod fs_utils;
mod packaging;
mod process;

#[derive(Parser, Debug)]
#[command(author, version, about = "Package a deployment directory into a ZIP archive", long_about = None)]
pub struct Cli {
    /// Directory to package (default: deploy-v68)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Archive to write (default: deploy-v68.zip)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Dry run (list planned entries, write nothing)
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    pub dry: bool,

    /// Generate YAML config to stdout
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub generate_yaml_config: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    // env < file < CLI
    let env_config = read_env();
    let mut file_config = Config::default();
    if let Some(path) = cli.config.clone().or(env_config.config.clone()) {
        file_config = read_config_file(&path)?;
    }
    let merged = merge_configs(env_config, file_config, cli_to_config(&cli)).with_defaults();

    if cli.generate_yaml_config {
        let yaml = serde_yaml::to_string(&merged)?;
        println!("{yaml}");
        return Ok(());
    }

    process::run(&merged)
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Reads environment variables prefixed with DEPLOYPACK_
fn read_env() -> Config {
    let vars: HashMap<String, String> = env::vars().collect();
    config_from_vars(&vars)
}

fn config_from_vars(vars: &HashMap<String, String>) -> Config {
    macro_rules! get_env {
        ($key:expr) => {
            vars.get(&format!("DEPLOYPACK_{}", $key)).cloned()
        };
    }

    Config {
        source: get_env!("SOURCE"),
        output: get_env!("OUTPUT"),
        config: get_env!("CONFIG"),
        dry: get_env!("DRY").map(|v| v == "true" || v == "1" || v.eq_ignore_ascii_case("yes")),
    }
}

/// Reads YAML or JSON config from file
fn read_config_file(path: &str) -> anyhow::Result<Config> {
    use anyhow::Context;

    let content =
        fs::read_to_string(path).with_context(|| format!("reading config file {path}"))?;
    let lower = path.to_lowercase();
    let cfg = if lower.ends_with(".json") {
        serde_json::from_str(&content).with_context(|| format!("parsing JSON config {path}"))?
    } else {
        serde_yaml::from_str(&content).with_context(|| format!("parsing YAML config {path}"))?
    };
    Ok(cfg)
}

/// Converts CLI struct into Config
fn cli_to_config(cli: &Cli) -> Config {
    Config {
        source: cli.source.clone(),
        output: cli.output.clone(),
        config: cli.config.clone(),
        // an absent flag must not mask dry: true from file or env
        dry: cli.dry.then_some(true),
    }
}

/// Merge configs by priority: env < file < cli
fn merge_configs(env: Config, file: Config, cli: Config) -> Config {
    fn pick<T: Clone>(env: Option<T>, file: Option<T>, cli: Option<T>) -> Option<T> {
        cli.or(file).or(env)
    }

    Config {
        source: pick(env.source, file.source, cli.source),
        output: pick(env.output, file.output, cli.output),
        config: pick(env.config, file.config, cli.config),
        dry: pick(env.dry, file.dry, cli.dry),
    }
}
