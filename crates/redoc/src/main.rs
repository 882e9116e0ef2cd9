//! redoc - Generate module documentation from a ReFrame test
//!
//! Usage:
//!   redoc -m <MODULE> -o <OUTPUT_DIR> [-s <SRC_DIR>] [-l <LMODRC_LUA> -p <LMOD_SPIDER>]
//!
//! Writes docs/<MODULE>.md in the current directory.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use redoc::module_help::{LmodSpider, ModuleIndex};
use redoc::paths::normalize_dir;
use redoc::{generate, Config, Options, RedocError};

#[derive(Parser)]
#[command(name = "redoc")]
#[command(about = "Generates help documentation for a module from a ReFrame test")]
#[command(version)]
#[command(after_help = r#"FILES:
    <OUTPUT_DIR>/rfm_<NAME>_job.sh     Job script (required)
    <OUTPUT_DIR>/rfm_<NAME>_build.sh   Build script (optional)
    where <NAME> is the last component of OUTPUT_DIR

CONFIG:
    ~/.config/redoc/config.json supplies lmodrc_lua, lmod_spider,
    docs_dir and template when not given on the command line.

EXAMPLES:
    redoc -m gcc -o output/cluster/gnu/HelloTest -s src/hello
    redoc -m openmpi -o stage/MpiTest -l /etc/lmodrc.lua -p /opt/lmod/libexec/spider
"#)]
struct Cli {
    /// The module to generate documentation for
    #[arg(short, long)]
    module: String,

    /// The output directory of the ReFrame test
    #[arg(short, long, visible_alias = "output_dir")]
    output_dir: String,

    /// The source directory of the ReFrame test
    #[arg(short, long, visible_alias = "src_dir")]
    src_dir: Option<String>,

    /// Path to lmodrc.lua
    #[arg(short, long, visible_alias = "lmodrc_lua")]
    lmodrc_lua: Option<PathBuf>,

    /// Path to Lmod spider
    #[arg(short = 'p', long, visible_alias = "lmod_spider")]
    lmod_spider: Option<PathBuf>,

    /// Config file (default: ~/.config/redoc/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        // Bad path arguments are usage errors
        if matches!(e.downcast_ref::<RedocError>(), Some(RedocError::EmptyPath(_))) {
            eprintln!("Argument error: {}", e);
            std::process::exit(2);
        }
        return Err(e);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let src_dir = cli
        .src_dir
        .as_deref()
        .map(|dir| normalize_dir("src_dir", dir))
        .transpose()?;
    let output_dir = normalize_dir("output_dir", &cli.output_dir)?;

    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    let spider = match (
        cli.lmodrc_lua.or(config.lmodrc_lua),
        cli.lmod_spider.or(config.lmod_spider),
    ) {
        (Some(lmodrc), Some(spider)) => Some(LmodSpider::new(lmodrc, spider)),
        _ => None,
    };

    let opts = Options {
        module: cli.module,
        output_dir,
        src_dir,
        module_index: spider.as_ref().map(|s| s as &dyn ModuleIndex),
        docs_dir: config.docs_dir,
        template: config.template,
    };

    let path = generate(&opts)?;
    println!("success: Doc generated: {}", path.display());

    Ok(())
}
