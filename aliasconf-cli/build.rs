//! Build script for aliasconf-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// Keep this structure synchronized with src/cli.rs.
fn build_cli() -> Command {
    Command::new("aliasconf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Query configuration files through key aliases")
        .long_about(
            "Command-line tool for reading YAML and JSON configuration where any \
             map may declare aliases for its key",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Configuration file to load (repeatable; later files win)")
                .env("ALIASCONF_CONFIG")
                .global(true)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("env-prefix")
                .long("env-prefix")
                .value_name("PREFIX")
                .help("Merge environment variables starting with this prefix over the files")
                .global(true),
        )
        .arg(
            Arg::new("env-aliases")
                .long("env-aliases")
                .help("Rewrite environment paths that go through aliases onto their targets")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommands([
            Command::new("get")
                .about("Print the value at a path")
                .long_about("Resolve a dotted path through aliases and print its value"),
            Command::new("has")
                .about("Check whether a path resolves")
                .long_about("Exit with status 1 when the path does not resolve"),
            Command::new("all")
                .about("Print every value matching a path, best match first")
                .long_about("List all candidates for a path in priority order"),
            Command::new("dump")
                .about("Print the whole configuration")
                .long_about("Print the merged configuration as YAML or JSON"),
            Command::new("aliases")
                .about("List every node that declares aliases")
                .long_about("Print each aliased key path with its aliases"),
            Command::new("format")
                .about("Expand the template stored at a path")
                .long_about("Fill {placeholders} from --set values and the configuration"),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() -> std::io::Result<()> {
    let out_dir = PathBuf::from(
        std::env::var_os("OUT_DIR").ok_or_else(|| std::io::Error::other("OUT_DIR not set"))?,
    );
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    fs::write(man_dir.join("aliasconf.1"), buffer)?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
    Ok(())
}
