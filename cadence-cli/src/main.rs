//! Cadence CLI
//!
//! Parse and resolve CSS animation expressions from the terminal.
//!
//! - cadence eval 'calc(10vw + 2rem)'
//! - cadence eval --document page.json --target 0 'translateX(var(--x))'
//! - cadence check 'rotate(45deg)'

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use cadence_common::warning::clear_warnings;
use cadence_css::{DocumentModel, ScopedContext, Size, is_var_css, parse};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;

/// Cadence: evaluate CSS animation expressions against a document model
#[derive(Parser, Debug)]
#[command(name = "cadence")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Resolve an expression against the default 1280x720 viewport
    cadence eval 'calc(10vw + 2rem)'

    # Normalize units and print the parsed tree
    cadence eval --normalize --ast '1s'

    # Resolve for the second target of a document
    cadence eval --document page.json --target 1 'translateX(var(--offset))'

    # Override a variable
    cadence eval --var --offset=25% --target 0 --normalize 'translateX(var(--offset))'
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and resolve an expression
    Eval(EvalArgs),

    /// Report whether an expression needs resolution and whether it parses
    Check {
        /// The CSS value
        #[arg(value_name = "EXPR")]
        expr: String,
    },
}

#[derive(clap::Args, Debug)]
struct EvalArgs {
    /// The CSS value
    #[arg(value_name = "EXPR")]
    expr: String,

    /// JSON document model to resolve against
    #[arg(short, long, value_name = "FILE")]
    document: Option<PathBuf>,

    /// Index of the current target
    #[arg(short, long, value_name = "N")]
    target: Option<usize>,

    /// Scoped variable, shadowing target properties (repeatable)
    #[arg(
        long = "var",
        value_name = "NAME=VALUE",
        value_parser = parse_var,
        allow_hyphen_values = true
    )]
    vars: Vec<(String, String)>,

    /// Convert units to px, rad and ms
    #[arg(short, long)]
    normalize: bool,

    /// Viewport size, overriding the document's
    #[arg(long, value_name = "WxH", value_parser = parse_viewport)]
    viewport: Option<Size>,

    /// Root font size in px, overriding the document's
    #[arg(long, value_name = "PX")]
    font_size: Option<f64>,

    /// Print the parsed tree as JSON
    #[arg(long)]
    ast: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Eval(args) => eval(&args),
        Command::Check { expr } => {
            check(&expr);
            Ok(())
        }
    }
}

fn eval(args: &EvalArgs) -> anyhow::Result<()> {
    let mut document = match &args.document {
        Some(path) => load_document(path)?,
        None => DocumentModel::default(),
    };
    if let Some(viewport) = args.viewport {
        document.config.viewport = viewport;
    }
    if let Some(font_size) = args.font_size {
        document.config.root_font_size = font_size;
    }
    if let Some(index) = args.target {
        anyhow::ensure!(
            index < document.targets.len(),
            "target {index} out of range, the document has {} targets",
            document.targets.len()
        );
    }

    let Some(node) = parse(&args.expr)? else {
        println!("{}", "empty".dimmed());
        return Ok(());
    };
    if args.ast {
        println!("{}", serde_json::to_string_pretty(&node)?);
    }

    clear_warnings();
    let context = ScopedContext::new(document);
    let vars: HashMap<String, String> = args.vars.iter().cloned().collect();
    let resolved = context.with_target(args.target, || {
        context.with_vars(vars, || {
            node.resolve(&context, args.normalize)
                .map(|value| value.map(|value| value.css()))
        })
    })?;

    match resolved {
        Some(css) => println!("{}", css?.green()),
        None => println!("{}", "unavailable".dimmed()),
    }
    Ok(())
}

fn check(expr: &str) {
    let needs_resolution = is_var_css(expr, false);
    let needs_normalization = is_var_css(expr, true);
    println!("{:<14} {}", "variable:".bold(), yes_no(needs_resolution));
    println!("{:<14} {}", "normalizable:".bold(), yes_no(needs_normalization));
    match parse(expr) {
        Ok(Some(node)) => match node.css() {
            Ok(css) => println!("{:<14} {}", "parsed:".bold(), css.cyan()),
            Err(_) => println!("{:<14} {}", "parsed:".bold(), "context-only".cyan()),
        },
        Ok(None) => println!("{:<14} {}", "parsed:".bold(), "empty".dimmed()),
        Err(error) => println!("{:<14} {}", "parsed:".bold(), error.red()),
    }
}

fn yes_no(flag: bool) -> String {
    if flag {
        "yes".green().to_string()
    } else {
        "no".dimmed().to_string()
    }
}

/// Load document from a JSON file
fn load_document(path: &Path) -> anyhow::Result<DocumentModel> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_var(text: &str) -> Result<(String, String), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {text:?}"))?;
    if !name.starts_with("--") {
        return Err(format!("variable names start with --, got {name:?}"));
    }
    Ok((name.to_string(), value.to_string()))
}

fn parse_viewport(text: &str) -> Result<Size, String> {
    let (width, height) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {text:?}"))?;
    let parse_side = |side: &str| {
        side.trim()
            .parse::<f64>()
            .map_err(|error| format!("invalid viewport size {side:?}: {error}"))
    };
    Ok(Size::new(parse_side(width)?, parse_side(height)?))
}
