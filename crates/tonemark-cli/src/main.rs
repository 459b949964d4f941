use serde::Serialize;
use std::io::Read;
use std::str::FromStr;
use tonemark::fonts::{FontError, FontSource, HeadlessError, load_probe};
use tonemark::{
    Capabilities, LinkCategory, LinkMutation, RewriteOptions, TonemarkConfig, default_site_config,
    probe_capabilities, rewrite_document,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Tonemark(HeadlessError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Tonemark(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Tonemark(value)
    }
}

impl From<tonemark::Error> for CliError {
    fn from(value: tonemark::Error) -> Self {
        Self::Tonemark(value.into())
    }
}

impl From<FontError> for CliError {
    fn from(value: FontError) -> Self {
        Self::Tonemark(value.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Rewrite,
    Probe,
    Convert,
}

/// How a capability flag is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Toggle {
    #[default]
    Auto,
    On,
    Off,
}

impl Toggle {
    fn resolve(self, probed: bool) -> bool {
        match self {
            Toggle::Auto => probed,
            Toggle::On => true,
            Toggle::Off => false,
        }
    }
}

impl FromStr for Toggle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "on" | "yes" | "true" => Ok(Self::On),
            "off" | "no" | "false" => Ok(Self::Off),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    config: Option<String>,
    fonts: Vec<String>,
    font_family: Option<String>,
    font_size_px: Option<f64>,
    pinyin: Toggle,
    superscript: Toggle,
    report: bool,
    pretty: bool,
    category: Option<LinkCategory>,
    out: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportOut<'a> {
    capabilities: Capabilities,
    links: usize,
    mutations: &'a [LinkMutation],
}

fn usage() -> &'static str {
    "tonemark-cli\n\
\n\
USAGE:\n\
  tonemark-cli [rewrite] [--config <json>] [--font <family>=<path>]... [--font-family <stack>] [--font-size <px>] [--pinyin auto|on|off] [--superscript auto|on|off] [--report] [--pretty] [--out <path>] [<path>|-]\n\
  tonemark-cli probe [--config <json>] [--font <family>=<path>]... [--font-family <stack>] [--font-size <px>] [--pretty]\n\
  tonemark-cli convert --mandarin|--cantonese <text>\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - rewrite prints the rewritten HTML to stdout by default; use --out to write a file.\n\
  - --font may be repeated; a bare path registers the font under its file stem.\n\
  - --font-family and --font-size override `fontFamily` and `probe.fontSizePx` from the config.\n\
  - auto decides a capability by probing the configured font stack in the given fonts;\n\
    without any --font, auto means off.\n\
  - --report prints the capabilities and applied mutations as JSON to stderr.\n\
  - Set TONEMARK_LOG (e.g. TONEMARK_LOG=debug) to enable logging on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "rewrite" => args.command = Command::Rewrite,
            "probe" => args.command = Command::Probe,
            "convert" => args.command = Command::Convert,
            "--report" => args.report = true,
            "--pretty" => args.pretty = true,
            "--mandarin" => args.category = Some(LinkCategory::MandarinLookup),
            "--cantonese" => args.category = Some(LinkCategory::CantoneseLookup),
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--font" => {
                let Some(spec) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.fonts.push(spec.clone());
            }
            "--font-family" => {
                let Some(stack) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.font_family = Some(stack.clone());
            }
            "--font-size" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let px = v.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                args.font_size_px = Some(px);
            }
            "--pinyin" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.pinyin = v.parse::<Toggle>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--superscript" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.superscript = v.parse::<Toggle>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if matches!(args.command, Command::Convert) && (args.category.is_none() || args.input.is_none())
    {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TONEMARK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn load_config(args: &Args) -> Result<TonemarkConfig, CliError> {
    let mut config = match args.config.as_deref() {
        None => default_site_config(),
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            TonemarkConfig::from_json_str(&text)?
        }
    };
    if let Some(stack) = &args.font_family {
        config.set_value("fontFamily", serde_json::json!(stack));
    }
    if let Some(px) = args.font_size_px {
        config.set_value("probe.fontSizePx", serde_json::json!(px));
    }
    Ok(config)
}

fn font_sources(specs: &[String]) -> Result<Vec<FontSource>, CliError> {
    specs
        .iter()
        .map(|spec| FontSource::parse(spec).map_err(CliError::from))
        .collect()
}

fn probe_fonts(
    specs: &[String],
    config: &TonemarkConfig,
    options: &RewriteOptions,
) -> Result<Capabilities, CliError> {
    if specs.is_empty() {
        tracing::debug!("no fonts given; probed capabilities are off");
        return Ok(Capabilities::none());
    }
    let probe = load_probe(&font_sources(specs)?, config)?;
    Ok(probe_capabilities(&probe, &options.font_family))
}

fn resolve_capabilities(
    args: &Args,
    config: &TonemarkConfig,
    options: &RewriteOptions,
) -> Result<Capabilities, CliError> {
    let needs_probe = args.pinyin == Toggle::Auto || args.superscript == Toggle::Auto;
    let probed = if needs_probe {
        probe_fonts(&args.fonts, config, options)?
    } else {
        Capabilities::none()
    };
    Ok(Capabilities {
        pinyin_diacritics: args.pinyin.resolve(probed.pinyin_diacritics),
        superscript_digits: args.superscript.resolve(probed.superscript_digits),
    })
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(&args)?;
    let options = RewriteOptions::from_config(&config)?;

    match args.command {
        Command::Probe => {
            let caps = probe_fonts(&args.fonts, &config, &options)?;
            write_json(&caps, args.pretty)
        }
        Command::Convert => {
            let (Some(category), Some(text)) = (args.category, args.input.as_deref()) else {
                return Err(CliError::Usage(usage()));
            };
            println!("{}", tonemark::rewrite::convert_for_category(category, text));
            Ok(())
        }
        Command::Rewrite => {
            let html = read_input(args.input.as_deref())?;
            let caps = resolve_capabilities(&args, &config, &options)?;
            let result = rewrite_document(&html, caps, &options);
            tracing::info!(
                links = result.links,
                rewritten = result.mutations.len(),
                "rewrite finished"
            );

            if args.report {
                let report = ReportOut {
                    capabilities: caps,
                    links: result.links,
                    mutations: &result.mutations,
                };
                let json = if args.pretty {
                    serde_json::to_string_pretty(&report)?
                } else {
                    serde_json::to_string(&report)?
                };
                eprintln!("{json}");
            }

            write_text(&result.html, args.out.as_deref())
        }
    }
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
