use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use polypay::application::checkout::Checkout;
use polypay::domain::ports::EventSinkRef;
use polypay::infrastructure::sinks::TracingSink;
use polypay::interfaces::csv::order_reader::OrderReader;
use polypay::interfaces::csv::summary_writer::{SummaryWriter, write_json_lines};
use polypay::logging;
use polypay::policy::PaymentPolicy;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input payment orders CSV file
    input: PathBuf,

    /// JSON file overriding the default fee and limit policy
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Output format for payment summaries
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Log filter directives (defaults to RUST_LOG, then `info`)
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log.as_deref())?;

    let policy = match &cli.policy {
        Some(path) => PaymentPolicy::from_json_file(path).into_diagnostic()?,
        None => PaymentPolicy::default(),
    };
    let sink: EventSinkRef = Arc::new(TracingSink);
    let mut checkout = Checkout::new(policy, sink);

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = OrderReader::new(file);
    for order in reader.orders() {
        match order {
            Ok(order) => {
                if let Err(e) = checkout.submit(order) {
                    eprintln!("Error creating payment: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading order: {}", e);
            }
        }
    }

    let summaries = checkout.summaries();
    let stdout = io::stdout();
    match cli.format {
        OutputFormat::Csv => SummaryWriter::new(stdout.lock())
            .write_summaries(summaries)
            .into_diagnostic()?,
        OutputFormat::Json => write_json_lines(stdout.lock(), summaries).into_diagnostic()?,
    }

    Ok(())
}
