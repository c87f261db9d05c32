use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use rust_decimal::Decimal;
use xrates::cli::OutputFormat;
use xrates::core::log::init_logging;
use xrates::core::{Operation, RateRequest};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Common {
    /// Rate provider to query
    #[arg(short, long)]
    provider: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct Conversion {
    /// Base currency code
    #[arg(short, long, default_value = "EUR")]
    base: String,

    /// Amount of base currency to convert
    #[arg(short, long, default_value = "1")]
    amount: Decimal,
}

#[derive(Args)]
struct Paging {
    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = 20)]
    page_size: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show the latest rates
    Latest {
        #[command(flatten)]
        conversion: Conversion,
        #[command(flatten)]
        common: Common,
    },
    /// Show rates on a past date (yyyy-mm-dd)
    Historical {
        date: NaiveDate,
        #[command(flatten)]
        conversion: Conversion,
        #[command(flatten)]
        paging: Paging,
        #[command(flatten)]
        common: Common,
    },
    /// Show daily rates between two dates (yyyy-mm-dd)
    Timeseries {
        start: NaiveDate,
        end: NaiveDate,
        #[command(flatten)]
        conversion: Conversion,
        #[command(flatten)]
        paging: Paging,
        #[command(flatten)]
        common: Common,
    },
    /// List the currencies known to the provider
    Currencies {
        #[command(flatten)]
        common: Common,
    },
    /// Check whether a base currency is supported
    Supported {
        code: String,
        #[command(flatten)]
        common: Common,
    },
}

impl Commands {
    fn into_request(self) -> Option<(RateRequest, OutputFormat)> {
        let (request, common) = match self {
            Commands::Setup => return None,
            Commands::Latest { conversion, common } => {
                let mut request = RateRequest::new(Operation::Latest);
                conversion.apply(&mut request);
                (request, common)
            }
            Commands::Historical {
                date,
                conversion,
                paging,
                common,
            } => {
                let mut request = RateRequest::new(Operation::Historical);
                request.date = Some(date);
                conversion.apply(&mut request);
                paging.apply(&mut request);
                (request, common)
            }
            Commands::Timeseries {
                start,
                end,
                conversion,
                paging,
                common,
            } => {
                let mut request = RateRequest::new(Operation::TimeSeries);
                request.start_date = Some(start);
                request.end_date = Some(end);
                conversion.apply(&mut request);
                paging.apply(&mut request);
                (request, common)
            }
            Commands::Currencies { common } => (RateRequest::new(Operation::Currencies), common),
            Commands::Supported { code, common } => {
                let mut request = RateRequest::new(Operation::Supported);
                request.base_currency = Some(code);
                (request, common)
            }
        };
        common.apply(request)
    }
}

impl Conversion {
    fn apply(self, request: &mut RateRequest) {
        request.base_currency = Some(self.base);
        request.amount = Some(self.amount);
    }
}

impl Paging {
    fn apply(self, request: &mut RateRequest) {
        request.page = Some(self.page);
        request.page_size = Some(self.page_size);
    }
}

impl Common {
    fn apply(self, mut request: RateRequest) -> Option<(RateRequest, OutputFormat)> {
        request.provider_name = self.provider;
        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        };
        Some((request, format))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xrates::cli::setup::setup(),
        Some(cmd) => match cmd.into_request() {
            Some((request, format)) => {
                xrates::run_command(&request, format, cli.config_path.as_deref()).await
            }
            None => unreachable!("Setup command should be handled separately"),
        },
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
