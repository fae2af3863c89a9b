//! unfurl — oEmbed resolution CLI
//!
//! Inspection and debugging surface over the engine: fetch embeds,
//! match and list providers, list handlers, and query the response
//! cache. The cache is in-memory and lives for the process only.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use unfurl::handlers::expand_media_placeholder;
use unfurl::{
    EmbedGateway, FetchRequest, LinkType, ProviderMatchOptions, ProviderRegistry, RawFormat,
    Unfurl,
};

/// oEmbed resolution CLI
#[derive(Parser)]
#[command(name = "unfurl")]
#[command(version = unfurl::PKG_VERSION)]
#[command(about = "Resolve URLs to embed HTML via the oEmbed protocol")]
struct Args {
    /// TOML file with additional provider entries
    #[arg(long, global = true, env = "UNFURL_PROVIDERS_FILE")]
    providers_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a URL into embed HTML (or raw oEmbed data)
    Fetch {
        /// URL to retrieve oEmbed data for
        url: String,
        /// Maximum embed width in pixels
        #[arg(long)]
        width: Option<u32>,
        /// Maximum embed height in pixels
        #[arg(long)]
        height: Option<u32>,
        /// Cache the response under this post scope
        #[arg(long)]
        post_id: Option<u64>,
        /// Enable discovery explicitly (it is on by default)
        #[arg(long, conflicts_with = "no_discover")]
        discover: bool,
        /// Disable endpoint discovery
        #[arg(long)]
        no_discover: bool,
        /// Ignore already-cached responses
        #[arg(long)]
        skip_cache: bool,
        /// Bypass the built-in HTML scrubber
        #[arg(long)]
        skip_sanitization: bool,
        /// Expand placeholder output returned by an embed handler
        #[arg(long)]
        expand: bool,
        /// Bound discovery page reads, in bytes (default 150 KB)
        #[arg(long)]
        limit_response_size: Option<usize>,
        /// Print the raw oEmbed payload instead of rendered HTML
        #[arg(long)]
        raw: bool,
        /// Serialization for raw output
        #[arg(long, value_enum)]
        raw_format: Option<PayloadFormat>,
    },

    /// Inspect the provider table
    Provider {
        #[command(subcommand)]
        command: ProviderCommand,
    },

    /// Inspect registered embed handlers
    Handler {
        #[command(subcommand)]
        command: HandlerCommand,
    },

    /// Query or clear the response cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand)]
enum ProviderCommand {
    /// List all registered providers
    List {
        /// Display a single field, one value per line
        #[arg(long)]
        field: Option<String>,
        /// Limit output to specific fields (comma-separated)
        #[arg(long)]
        fields: Option<String>,
        /// Output rendering
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
        /// Render asterisk-wildcard patterns as regexes
        #[arg(long)]
        force_regex: bool,
    },

    /// Print the matching provider endpoint for a URL
    Match {
        /// URL to retrieve the provider for
        url: String,
        /// Enable discovery explicitly (it is on by default)
        #[arg(long, conflicts_with = "no_discover")]
        discover: bool,
        /// Disable endpoint discovery
        #[arg(long)]
        no_discover: bool,
        /// Bound discovery page reads, in bytes (default 150 KB)
        #[arg(long)]
        limit_response_size: Option<usize>,
        /// Accept only one discovery link type
        #[arg(long, value_enum)]
        link_type: Option<PayloadFormat>,
    },
}

#[derive(Subcommand)]
enum HandlerCommand {
    /// List all registered handlers, sorted by priority
    List {
        /// Display a single field, one value per line
        #[arg(long)]
        field: Option<String>,
        /// Limit output to specific fields (comma-separated)
        #[arg(long)]
        fields: Option<String>,
        /// Output rendering
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Print the scope owning a cached rendering for a URL
    Find {
        /// URL the rendering was cached for
        url: String,
        /// Width the rendering was requested with
        #[arg(long)]
        width: Option<u32>,
        /// Height the rendering was requested with
        #[arg(long)]
        height: Option<u32>,
        /// Discovery flag the rendering was requested with
        #[arg(long)]
        discover: Option<bool>,
    },

    /// Drop all cached renderings for a scope
    Clear {
        /// Post scope to clear; omit for the global scope
        #[arg(long)]
        post_id: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum PayloadFormat {
    Json,
    Xml,
}

impl From<PayloadFormat> for RawFormat {
    fn from(format: PayloadFormat) -> Self {
        match format {
            PayloadFormat::Json => RawFormat::Json,
            PayloadFormat::Xml => RawFormat::Xml,
        }
    }
}

impl From<PayloadFormat> for LinkType {
    fn from(format: PayloadFormat) -> Self {
        match format {
            PayloadFormat::Json => LinkType::Json,
            PayloadFormat::Xml => LinkType::Xml,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = build_gateway(args.providers_file.as_deref())?;

    match args.command {
        Command::Fetch {
            url,
            width,
            height,
            post_id,
            discover,
            no_discover,
            skip_cache,
            skip_sanitization,
            expand,
            limit_response_size,
            raw,
            raw_format,
        } => {
            let mut request = FetchRequest::new(url)
                .skip_cache(skip_cache)
                .skip_sanitization(skip_sanitization)
                .expand_placeholders(expand)
                .raw(raw);
            if discover || no_discover {
                request = request.discover(!no_discover);
            }
            if let Some(width) = width {
                request = request.width(width);
            }
            if let Some(height) = height {
                request = request.height(height);
            }
            if let Some(post_id) = post_id {
                request = request.post_id(post_id);
            }
            if let Some(limit) = limit_response_size {
                request = request.response_size_limit(limit);
            }
            if let Some(format) = raw_format {
                request = request.raw_format(format.into());
            }

            let output = gateway.fetch(&request).await?;
            println!("{output}");
        }

        Command::Provider { command } => match command {
            ProviderCommand::List {
                field,
                fields,
                format,
                force_regex,
            } => {
                let items: Vec<serde_json::Value> = gateway
                    .providers()
                    .list(force_regex)
                    .into_iter()
                    .map(|listing| {
                        serde_json::json!({
                            "format": listing.format,
                            "endpoint": listing.endpoint,
                            "regex": if listing.regex { "1" } else { "0" },
                        })
                    })
                    .collect();
                let columns = selected_columns(&["format", "endpoint"], field, fields)?;
                print_items(&items, &columns, format)?;
            }

            ProviderCommand::Match {
                url,
                discover: _,
                no_discover,
                limit_response_size,
                link_type,
            } => {
                let mut options = ProviderMatchOptions::new().discover(!no_discover);
                if let Some(limit) = limit_response_size {
                    options = options.response_size_limit(limit);
                }
                if let Some(link_type) = link_type {
                    options = options.link_type(link_type.into());
                }
                let endpoint = gateway.match_provider(&url, &options).await?;
                println!("{endpoint}");
            }
        },

        Command::Handler { command } => match command {
            HandlerCommand::List {
                field,
                fields,
                format,
            } => {
                let items: Vec<serde_json::Value> = gateway
                    .handlers()
                    .list()
                    .into_iter()
                    .map(|listing| {
                        serde_json::json!({
                            "id": listing.id,
                            "regex": listing.regex,
                            "priority": listing.priority.to_string(),
                            "callback": listing.callback,
                        })
                    })
                    .collect();
                let columns = selected_columns(&["id", "regex"], field, fields)?;
                print_items(&items, &columns, format)?;
            }
        },

        Command::Cache { command } => match command {
            CacheCommand::Find {
                url,
                width,
                height,
                discover,
            } => match gateway.cache_find(&url, width, height, discover) {
                Some(scope) => println!("{scope}"),
                None => return Err("no cache entry found for the given URL".into()),
            },

            CacheCommand::Clear { post_id } => {
                let removed = gateway.cache_clear(post_id.into());
                println!("cleared {removed} cache entries");
            }
        },
    }

    Ok(())
}

/// Build the gateway: builtin tables plus any providers-file entries,
/// with the media placeholder expander installed.
fn build_gateway(providers_file: Option<&std::path::Path>) -> Result<EmbedGateway, Box<dyn std::error::Error>> {
    let mut registry = ProviderRegistry::with_builtin_providers();
    if let Some(path) = providers_file {
        let document = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read providers file {}: {e}", path.display()))?;
        registry.extend_from_toml_str(&document)?;
    }
    Ok(Unfurl::builder()
        .providers(registry)
        .expander(Arc::new(|placeholder: &str| {
            expand_media_placeholder(placeholder)
        }))
        .build()?)
}

/// Resolve the column set from `--field` / `--fields`, validating names.
fn selected_columns(
    defaults: &[&str],
    field: Option<String>,
    fields: Option<String>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    if field.is_some() && fields.is_some() {
        return Err("the 'field' and 'fields' options cannot be combined".into());
    }
    let columns: Vec<String> = match (field, fields) {
        (Some(single), None) => vec![single],
        (None, Some(list)) => list
            .split(',')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect(),
        _ => defaults.iter().map(|name| name.to_string()).collect(),
    };
    if columns.is_empty() {
        return Err("no output fields selected".into());
    }
    Ok(columns)
}

/// Render items in the requested format.
fn print_items(
    items: &[serde_json::Value],
    columns: &[String],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    // Validate column names against the first item.
    if let Some(first) = items.first() {
        for column in columns {
            if first.get(column).is_none() {
                return Err(format!("unknown field '{column}'").into());
            }
        }
    }

    let cell = |item: &serde_json::Value, column: &str| -> String {
        match item.get(column) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    };

    match format {
        OutputFormat::Json => {
            let filtered: Vec<serde_json::Value> = items
                .iter()
                .map(|item| {
                    let map: serde_json::Map<String, serde_json::Value> = columns
                        .iter()
                        .map(|column| {
                            (column.clone(), item.get(column).cloned().unwrap_or_default())
                        })
                        .collect();
                    serde_json::Value::Object(map)
                })
                .collect();
            println!("{}", serde_json::to_string(&filtered)?);
        }

        OutputFormat::Csv => {
            println!("{}", columns.join(","));
            for item in items {
                let row: Vec<String> = columns
                    .iter()
                    .map(|column| csv_escape(&cell(item, column)))
                    .collect();
                println!("{}", row.join(","));
            }
        }

        OutputFormat::Table => {
            let widths: Vec<usize> = columns
                .iter()
                .map(|column| {
                    items
                        .iter()
                        .map(|item| cell(item, column).len())
                        .chain([column.len()])
                        .max()
                        .unwrap_or(0)
                })
                .collect();
            let border = {
                let segments: Vec<String> =
                    widths.iter().map(|w| "-".repeat(w + 2)).collect();
                format!("+{}+", segments.join("+"))
            };
            let row_line = |values: Vec<String>| {
                let cells: Vec<String> = values
                    .iter()
                    .zip(&widths)
                    .map(|(value, &width)| format!(" {value:<width$} "))
                    .collect();
                format!("|{}|", cells.join("|"))
            };

            println!("{border}");
            println!("{}", row_line(columns.iter().map(|c| c.to_string()).collect()));
            println!("{border}");
            for item in items {
                println!(
                    "{}",
                    row_line(columns.iter().map(|column| cell(item, column)).collect())
                );
            }
            println!("{border}");
        }
    }
    Ok(())
}

/// Quote a CSV cell when it contains a delimiter, quote, or newline.
fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
