//! Bridgecast CLI - drive the demonstration module from the command line
//!
//! Commands:
//!   bridgecast signatures          - List every bound function's signature
//!   bridgecast call <name> [args]  - Call a bound function with JSON arguments

use anyhow::{anyhow, Context as _};
use bridgecast::demo;
use bridgecast::host::{Dict, Object};
use bridgecast::Module;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bridgecast")]
#[command(about = "Call native functions through the container casters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the signatures of the demonstration module
    Signatures {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Call a function of the demonstration module
    ///
    /// Arguments are JSON values. An object of the form
    /// {"new": "Movable", "value": 7} constructs a bound class instance.
    Call {
        /// Function name
        name: String,

        /// Positional arguments as JSON
        args: Vec<String>,

        /// Keyword argument as NAME=JSON (repeatable)
        #[arg(long = "kw", short = 'k')]
        kwargs: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Print lifecycle counters after the call
        #[arg(long)]
        stats: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let module = demo::module()?;

    match cli.command {
        Commands::Signatures { json } => signatures_command(&module, json),
        Commands::Call {
            name,
            args,
            kwargs,
            json,
            stats,
        } => call_command(&module, &name, &args, &kwargs, json, stats),
    }
}

fn signatures_command(module: &Module, json: bool) -> anyhow::Result<()> {
    if json {
        let docs: Vec<_> = module
            .functions()
            .map(|f| serde_json::json!({ "name": f.name(), "signature": f.doc() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&docs)?);
    } else {
        println!("module {}:", module.name());
        for function in module.functions() {
            println!("  {}", function.doc());
        }
    }
    Ok(())
}

fn call_command(
    module: &Module,
    name: &str,
    args: &[String],
    kwargs: &[String],
    json: bool,
    show_stats: bool,
) -> anyhow::Result<()> {
    demo::reset();

    let args = args
        .iter()
        .enumerate()
        .map(|(i, raw)| parse_argument(module, raw).with_context(|| format!("argument {i}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let kwargs = kwargs
        .iter()
        .map(|raw| -> anyhow::Result<(&str, Object)> {
            let (key, value) = raw
                .split_once('=')
                .ok_or_else(|| anyhow!("keyword argument must be NAME=JSON, got {raw:?}"))?;
            let value = parse_argument(module, value).with_context(|| format!("keyword {key}"))?;
            Ok((key, value))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let out = module.call_kw(name, &args, &kwargs)?;
    drop(args);
    drop(kwargs);

    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{out}");
    }
    if show_stats {
        drop(out);
        let stats = demo::stats();
        if json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("default_constructed: {}", stats.default_constructed);
            println!("value_constructed:   {}", stats.value_constructed);
            println!("copy_constructed:    {}", stats.copy_constructed);
            println!("move_constructed:    {}", stats.move_constructed);
            println!("destructed:          {}", stats.destructed);
        }
    }
    Ok(())
}

fn parse_argument(module: &Module, raw: &str) -> anyhow::Result<Object> {
    let value: serde_json::Value =
        serde_json::from_str(raw).with_context(|| format!("invalid JSON: {raw}"))?;
    to_object(module, &value)
}

/// Convert JSON to a host object. Arrays become lists.
fn to_object(module: &Module, value: &serde_json::Value) -> anyhow::Result<Object> {
    use serde_json::Value;

    Ok(match value {
        Value::Null => Object::None,
        Value::Bool(b) => Object::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Object::Int(i),
            None => Object::Float(n.as_f64().ok_or_else(|| anyhow!("unsupported number {n}"))?),
        },
        Value::String(s) => Object::str(s),
        Value::Array(items) => Object::list(
            items
                .iter()
                .map(|item| to_object(module, item))
                .collect::<anyhow::Result<_>>()?,
        ),
        Value::Object(fields) => match fields.get("new").and_then(Value::as_str) {
            Some(class) => {
                let ctor_args = match fields.get("value") {
                    Some(v) => vec![to_object(module, v)?],
                    None => Vec::new(),
                };
                module.call(class, &ctor_args)?
            }
            None => {
                let dict = Dict::new();
                for (key, item) in fields {
                    dict.set_item(Object::str(key), to_object(module, item)?)?;
                }
                Object::Dict(dict)
            }
        },
    })
}
