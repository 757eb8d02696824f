//! Shell configuration: settings file plus command-line overrides.
//!
//! Settings are stored as JSON under the user's config directory
//! (`<config_dir>/subcache/shell.json`). A missing or malformed file falls
//! back to defaults; command-line flags win over the file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "subcache";
const SETTINGS_FILE: &str = "shell.json";

/// Persistent shell preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    /// Seed for random trees; `None` seeds from the operating system.
    pub seed: Option<u64>,
    /// Node count of the tree generated at startup.
    pub initial_nodes: usize,
    /// Clear the terminal before printing the tree.
    pub clear_screen: bool,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            seed: None,
            initial_nodes: 10,
            clear_screen: true,
            log_filter: "subcache=warn".to_string(),
        }
    }
}

impl ShellSettings {
    /// Default location of the settings file, if the platform has a
    /// config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Loads settings from `path`, falling back to defaults when the file
    /// is absent or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Self {
        path.and_then(|path| fs::read_to_string(path).ok())
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    /// Applies command-line overrides.
    pub fn apply(&mut self, options: &CliOptions) {
        if let Some(seed) = options.seed {
            self.seed = Some(seed);
        }
        if let Some(nodes) = options.initial_nodes {
            self.initial_nodes = nodes;
        }
        if options.no_clear {
            self.clear_screen = false;
        }
        if let Some(filter) = &options.log_filter {
            self.log_filter = filter.clone();
        }
    }
}

/// Flags accepted by the shell binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub initial_nodes: Option<usize>,
    pub no_clear: bool,
    pub log_filter: Option<String>,
    pub show_help: bool,
}

/// Parses flags, skipping the program name in `args[0]`.
pub fn parse_args(args: &[String]) -> Result<CliOptions> {
    let mut options = CliOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-seed" => {
                options.seed = Some(flag_value(args, &mut i, "-seed")?.parse()?);
            }
            "-nodes" => {
                options.initial_nodes = Some(flag_value(args, &mut i, "-nodes")?.parse()?);
            }
            "-config" => {
                options.config_path = Some(PathBuf::from(flag_value(args, &mut i, "-config")?));
            }
            "-log" => {
                options.log_filter = Some(flag_value(args, &mut i, "-log")?.to_string());
            }
            "-no-clear" => {
                options.no_clear = true;
            }
            "-h" | "-help" | "--help" => {
                options.show_help = true;
            }
            other => {
                anyhow::bail!("unknown argument: {}", other);
            }
        }
        i += 1;
    }

    Ok(options)
}

fn flag_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    match args.get(*i) {
        Some(value) => Ok(value.as_str()),
        None => anyhow::bail!("{} requires an argument", flag),
    }
}

pub fn print_help() {
    println!("Subtree cache interactive shell");
    println!("Usage: subcache-shell [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -seed <N>        Seed for random trees (default: from OS entropy)");
    println!("  -nodes <N>       Nodes in the startup tree (default: 10)");
    println!("  -no-clear        Do not clear the terminal before printing");
    println!("  -config <FILE>   Settings file (default: <config_dir>/subcache/shell.json)");
    println!("  -log <FILTER>    Tracing filter when RUST_LOG is unset");
    println!("  -h, -help        Show this help message");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("subcache-shell")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn parse_args_reads_all_flags() {
        let options = parse_args(&args(&[
            "-seed", "9", "-nodes", "30", "-no-clear", "-log", "subcache=debug", "-config", "x.json",
        ]))
        .unwrap();

        assert_eq!(options.seed, Some(9));
        assert_eq!(options.initial_nodes, Some(30));
        assert!(options.no_clear);
        assert_eq!(options.log_filter.as_deref(), Some("subcache=debug"));
        assert_eq!(options.config_path, Some(PathBuf::from("x.json")));
        assert!(!options.show_help);
    }

    #[test]
    fn parse_args_rejects_missing_value() {
        assert!(parse_args(&args(&["-seed"])).is_err());
        assert!(parse_args(&args(&["-nodes", "many"])).is_err());
        assert!(parse_args(&args(&["-bogus"])).is_err());
    }

    #[test]
    fn apply_overrides_file_values() {
        let mut settings = ShellSettings::default();
        settings.apply(&CliOptions {
            seed: Some(5),
            initial_nodes: Some(3),
            no_clear: true,
            ..Default::default()
        });

        assert_eq!(settings.seed, Some(5));
        assert_eq!(settings.initial_nodes, 3);
        assert!(!settings.clear_screen);
        assert_eq!(settings.log_filter, "subcache=warn");
    }

    #[test]
    fn load_falls_back_to_defaults() {
        assert_eq!(ShellSettings::load(None), ShellSettings::default());

        let path = env::temp_dir().join("subcache_missing_settings.json");
        let _ = fs::remove_file(&path);
        assert_eq!(ShellSettings::load(Some(&path)), ShellSettings::default());
    }

    #[test]
    fn load_reads_partial_file() -> Result<()> {
        let path = env::temp_dir().join("subcache_partial_settings.json");
        fs::write(&path, r#"{ "seed": 11, "clear_screen": false }"#)?;

        let settings = ShellSettings::load(Some(&path));
        assert_eq!(settings.seed, Some(11));
        assert!(!settings.clear_screen);
        assert_eq!(settings.initial_nodes, 10);

        fs::remove_file(&path)?;
        Ok(())
    }
}
