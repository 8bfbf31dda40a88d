use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tagsmith_bbparser::Tree;
use tagsmith_render::TransformerConfig;

mod outline;

#[derive(Parser)]
#[command(name = "tagsmith", version, about = "Render BBCode-style markup through templates")]
struct Cli {
    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform markup and print the result
    Render {
        /// Input file (default: stdin)
        file: Option<PathBuf>,

        /// YAML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Replacement for newlines in text
        #[arg(long)]
        newline: Option<String>,

        /// Leave this tag untransformed (repeatable)
        #[arg(long = "skip", value_name = "TAG")]
        skip: Vec<String>,

        /// JSON value passed to every rule as `context`
        #[arg(long, value_name = "JSON")]
        context: Option<String>,

        /// Do not load the built-in HTML rules
        #[arg(long)]
        no_builtin: bool,
    },

    /// Print the parsed document tree
    Tree {
        /// Input file (default: stdin)
        file: Option<PathBuf>,

        /// YAML configuration file (parser options only)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            file,
            config,
            newline,
            skip,
            context,
            no_builtin,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(newline) = newline {
                config.newline = newline;
            }
            if no_builtin {
                config.builtin = false;
            }
            let context = context
                .map(|json| serde_json::from_str::<serde_json::Value>(&json))
                .transpose()
                .context("--context is not valid JSON")?;

            let input = read_input(file.as_deref())?;
            let output = handle_render(&input, &config, &skip, context.as_ref())?;
            println!("{output}");
        }
        Commands::Tree { file, config, json } => {
            let config = load_config(config.as_deref())?;
            let doc = config.build_parser().parse(&read_input(file.as_deref())?);
            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!("{}", outline::outline(&doc));
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<TransformerConfig> {
    match path {
        Some(path) => TransformerConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(TransformerConfig::default()),
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

fn handle_render(
    input: &str,
    config: &TransformerConfig,
    skip: &[String],
    context: Option<&serde_json::Value>,
) -> Result<String> {
    let transformer = config
        .build_transformer()
        .context("failed to build rules")?;
    log::debug!("loaded {} rules", transformer.rules().len());
    for name in skip {
        if !transformer.rules().contains(name) {
            log::warn!("no rule named `{name}` to skip");
        }
    }
    let doc = config.build_parser().parse(input);
    log::debug!("parsed {} top-level nodes", doc.children().len());

    let output = transformer.transform(
        &doc,
        |tag| !skip.iter().any(|name| name == tag.name()),
        context,
    )?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_skips_named_tags() {
        let config = TransformerConfig::default();
        let skip = vec!["quote".to_string()];
        let out = handle_render("[b]x[/b] [quote]y[/quote]", &config, &skip, None).unwrap();
        assert_eq!(out, "<strong>x</strong> [quote]y[/quote]");
    }

    #[test]
    fn test_render_uses_config_newline() {
        let config = TransformerConfig {
            newline: "<br />".to_string(),
            ..TransformerConfig::default()
        };
        assert_eq!(handle_render("a\nb", &config, &[], None).unwrap(), "a<br />b");
    }

    #[test]
    fn test_render_error_names_tag() {
        let yaml = "builtin: false\ntemplates:\n  x: \"{{ body | missing }}\"\n";
        let config = TransformerConfig::from_yaml(yaml).unwrap();
        let err = handle_render("[x]y[/x]", &config, &[], None).unwrap_err();
        assert!(format!("{err:#}").contains("[x]"));
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from([
            "tagsmith",
            "-vv",
            "render",
            "post.txt",
            "--skip",
            "b",
            "--skip",
            "i",
            "--no-builtin",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Render {
                file,
                skip,
                no_builtin,
                ..
            } => {
                assert_eq!(file, Some(PathBuf::from("post.txt")));
                assert_eq!(skip, ["b", "i"]);
                assert!(no_builtin);
            }
            Commands::Tree { .. } => panic!("expected render"),
        }
    }
}
