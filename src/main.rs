use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use serde_json::Value;

use jt::format::Format;
use jt::output;
use jt::parser;
use jt::Options;

#[derive(Parser)]
#[command(
    name = "jt",
    version,
    about = "Transform JSON using a template that is also JSON",
    after_help = "Template syntax:
  \"$\"                 the root of the input
  \"$.foo.bar\"         safe navigation, null if anything along the way is missing
  \".foo\"              shorthand for $.foo
  \"foo\"               the literal string foo
  \"$[].bar\"           applies .bar to each element of $
  \"$*.id\"             every value stored under an \"id\" key, at any depth
  \".foo | .bar\"       fallback: .foo if truthy, else .bar
  \".a & .b\"  \".a = .b\"  \".a + .b\"  \"!.a\"  \".a?\"
  \".tags #\"           removes duplicates
  \".xs !sort\"  \".xs !sortBy @.price\"  \".xs !filter @.ok\"  \".xs !map @.name\"
  \".payload !json\"    parses strings holding JSON, recursively
  {\".foo\": true}      keys starting with . $ or ( are templates too; \\\\ escapes
  [\"literal\", ...]    an array of templates
  [\"foreach\", \"<ARR>\", \"$var\", <TEMPLATE>]
                      maps each element of ARR to TEMPLATE with $var bound to it

When both -T and -t are given, the file template runs first and the inline
template reshapes its output."
)]
#[command(group(
    ArgGroup::new("templates")
        .args(["template", "template_file"])
        .required(true)
        .multiple(true)
))]
struct Cli {
    /// Inline template; text that is not valid JSON is used as a string template
    #[arg(short = 't', long)]
    template: Option<String>,

    /// Load a template from a JSON or YAML file; applied before -t
    #[arg(short = 'T', long = "template-file")]
    template_file: Option<PathBuf>,

    /// Input file (reads from stdin if omitted)
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Force input format [json, yaml]
    #[arg(short = 'p', long = "input-format")]
    input_format: Option<String>,

    /// Indent width for pretty printing (compact when omitted or 0)
    #[arg(short = 'w', long = "width")]
    width: Option<usize>,

    /// Log how the template compiled and where evaluation produced null
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let options = Options { debug: cli.debug };
    let mut stages = Vec::new();
    if let Some(path) = &cli.template_file {
        let template = parser::parse_file(path, None)
            .with_context(|| format!("reading template {}", path.display()))?;
        let transform = jt::compile_with(&template, options)
            .with_context(|| format!("compiling template {}", path.display()))?;
        stages.push(transform);
    }
    if let Some(text) = &cli.template {
        let transform = jt::compile_with(&inline_template(text), options)
            .context("compiling inline template")?;
        stages.push(transform);
    }

    let input = read_input(&cli)?;
    let result = stages
        .iter()
        .fold(input, |value, transform| transform.apply(&value));

    let formatted = output::pretty::format_value(&result, cli.width)?;
    println!("{formatted}");
    Ok(())
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn inline_template(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn read_input(cli: &Cli) -> Result<Value> {
    let forced = cli
        .input_format
        .as_deref()
        .map(Format::from_str_name)
        .transpose()?;

    if let Some(path) = &cli.file {
        return parser::parse_file(path, forced)
            .with_context(|| format!("reading {}", path.display()));
    }

    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading stdin")?;
    let format = forced.unwrap_or_else(|| Format::detect(&buf));
    parser::parse(&buf, format).context("parsing stdin")
}
