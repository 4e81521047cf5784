use std::time::Duration;

use clap::Parser;
use comfy_table::{presets::ASCII_FULL, CellAlignment, ContentArrangement, Table};
use model_inspect::catalog::TensorCatalog;
use model_inspect::config::{DtypePolicy, FallbackPolicy, InspectConfig};
use model_inspect::repo::parse_repo_id;
use model_inspect::ModelInspector;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "model-inspect")]
#[command(about = "Show layer names, shapes, dtypes and sizes of a Hugging Face safetensors model", long_about = None)]
#[command(version)]
struct Cli {
    /// Hugging Face model (e.g. "username/model" or a huggingface.co URL)
    model: String,

    /// Model revision (branch, tag or commit)
    #[arg(long, default_value = "main")]
    revision: String,

    /// Number of shard headers to fetch in parallel
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Mirror endpoint: a base URL or a template with {repo}, {revision} and {filename}
    #[arg(long, env = "MODEL_INSPECT_MIRROR")]
    mirror: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Retries for failed requests
    #[arg(long)]
    retries: Option<u32>,

    /// Base backoff between retries, in seconds
    #[arg(long)]
    backoff: Option<f64>,

    /// Fail on unrecognized dtypes instead of counting them as 1 byte
    #[arg(long)]
    strict_dtype: bool,

    /// Only fall back to model.safetensors when the shard index is missing
    #[arg(long)]
    only_missing_index_fallback: bool,

    /// Print records as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(if cli.verbose { "debug" } else { "warn" });

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let repo = parse_repo_id(&cli.model)?;
    let config = build_config(&cli)?;
    let inspector = ModelInspector::new(config)?;
    let catalog = inspector.inspect(&repo)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
    } else {
        print_catalog(&catalog);
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<InspectConfig, Box<dyn std::error::Error>> {
    let mut config = InspectConfig::from_env()?.with_revision(cli.revision.clone());

    if let Some(concurrency) = cli.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(mirror) = &cli.mirror {
        config = config.with_mirror(mirror.clone());
    }
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(timeout));
    }
    if let Some(retries) = cli.retries {
        config = config.with_retries(retries);
    }
    if let Some(backoff) = cli.backoff {
        config = config.with_backoff(Duration::try_from_secs_f64(backoff)?);
    }
    if cli.strict_dtype {
        config = config.with_dtype_policy(DtypePolicy::Strict);
    }
    if cli.only_missing_index_fallback {
        config = config.with_fallback(FallbackPolicy::IndexNotFound);
    }
    Ok(config)
}

fn print_catalog(catalog: &TensorCatalog) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(vec!["Layer Name", "Shape", "Data Type", "Size (bytes)"]);

    for record in catalog {
        table.add_row(vec![
            record.name().to_string(),
            format_shape(record.shape()),
            record.dtype().to_string(),
            format_thousands(record.size_bytes()),
        ]);
    }
    if let Some(column) = table.column_mut(3) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    let total = catalog.total_bytes();
    println!("{table}");
    println!("\nTotal Layers: {}", catalog.len());
    println!(
        "\nTotal Parameters Size: {} bytes ({:.2} MB)",
        format_thousands(total),
        total as f64 / (1024.0 * 1024.0)
    );
}

fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

/// Tuple-style shape, e.g. `(4096, 4096)` or `(4096,)`
fn format_shape(shape: &[u64]) -> String {
    match shape {
        [] => "()".to_string(),
        [dim] => format!("({},)", dim),
        dims => {
            let dims: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
            format!("({})", dims.join(", "))
        }
    }
}

/// `1234567` -> `1,234,567`
fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
