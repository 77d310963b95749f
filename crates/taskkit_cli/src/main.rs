use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use taskkit_io_http::{PayeeRequestError, SpecPayeeRequestOptions, fetch_payee_details};
use taskkit_io_sql::{
    C_FILE_DB_DEFAULT, C_PRODUCT_DEFAULT, ShopDbError, create_schema, query_clients_who_bought,
    query_order_counts_by_product, query_purchase_sums, seed_demo, with_connection,
};
use taskkit_io_xlsx::{
    C_FIELD_HEADER_DEFAULT, C_FIELD_VALUE_DEFAULT, C_FILE_OUT_DEFAULT, C_PATTERN_INPUT_DEFAULT,
    ConvertError, SpecConvertOptions, SpecXlsxWriteOptions, convert_json_dir_to_xlsx,
};
use taskkit_log::{C_DIR_LOGS_DEFAULT, SpecLogOptions, init_logging};

#[derive(Parser)]
#[command(name = "taskkit")]
#[command(about = "Small data tasks: JSON to XLSX, payee lookup, demo shop store")]
struct Cli {
    /// Directory for per-day log files
    #[arg(long, global = true, default_value = C_DIR_LOGS_DEFAULT)]
    log_dir: PathBuf,

    /// Log to stdout only
    #[arg(long, global = true)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert every JSON document in a directory into one workbook sheet each
    Json2xlsx {
        /// Directory scanned for input documents
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Glob matched against file base names
        #[arg(long, default_value = C_PATTERN_INPUT_DEFAULT)]
        pattern: String,

        /// Output workbook path
        #[arg(long, default_value = C_FILE_OUT_DEFAULT)]
        output: PathBuf,

        /// Field displayed for header records
        #[arg(long, default_value = C_FIELD_HEADER_DEFAULT)]
        field_header: String,

        /// Field displayed for value records
        #[arg(long, default_value = C_FIELD_VALUE_DEFAULT)]
        field_value: String,

        /// Write header cells in the regular weight
        #[arg(long)]
        no_bold_header: bool,

        /// Skip thin borders around cells
        #[arg(long)]
        no_borders: bool,
    },

    /// Look up payment details by tax office and municipality code
    Payee {
        /// Tax office code (IFNS)
        ifns: u64,

        /// Municipality code (OKTMMF)
        oktmmf: u64,

        /// Request timeout in milliseconds
        #[arg(long, default_value_t = 100)]
        timeout_ms: u64,
    },

    /// Seed the demo shop database and print its reports
    Shop {
        /// SQLite database file
        #[arg(long, default_value = C_FILE_DB_DEFAULT)]
        db: PathBuf,

        /// Product name for the buyers report
        #[arg(long, default_value = C_PRODUCT_DEFAULT)]
        product: String,

        /// Query existing data without inserting the demo rows
        #[arg(long)]
        no_seed: bool,
    },
}

fn run_json2xlsx(options: &SpecConvertOptions) -> anyhow::Result<()> {
    let report = convert_json_dir_to_xlsx(options)?;
    for sheet in &report.sheets {
        tracing::info!(
            sheet = %sheet.sheet_name,
            n_headers = sheet.n_headers,
            n_values = sheet.n_values,
            "sheet summary"
        );
    }
    Ok(())
}

fn run_payee(ifns: u64, oktmmf: u64, options: &SpecPayeeRequestOptions) -> anyhow::Result<()> {
    let details = fetch_payee_details(ifns, oktmmf, options)?;
    tracing::info!(payee_details = %details, "payee details received");
    Ok(())
}

fn run_shop(path_db: &Path, product_name: &str, if_seed: bool) -> anyhow::Result<()> {
    with_connection(path_db, |conn| {
        if if_seed {
            seed_demo(conn)?;
        } else {
            create_schema(conn)?;
        }

        for row in query_purchase_sums(conn)? {
            tracing::info!(client = %row.client_name, sum = row.n_sum_price, "purchase total");
        }
        let l_buyers = query_clients_who_bought(conn, product_name)?;
        tracing::info!(product = %product_name, buyers = ?l_buyers, "product buyers");
        for row in query_order_counts_by_product(conn)? {
            tracing::info!(product = %row.product_name, n_orders = row.n_orders, "order count");
        }
        Ok(())
    })
    .with_context(|| format!("shop report on {}", path_db.display()))
}

/// Failure category of the innermost known error, for the final log line.
fn derive_error_category(err: &anyhow::Error) -> &'static str {
    if let Some(err) = err.downcast_ref::<ConvertError>() {
        err.category()
    } else if let Some(err) = err.downcast_ref::<PayeeRequestError>() {
        err.category()
    } else if let Some(err) = err.downcast_ref::<ShopDbError>() {
        err.category()
    } else {
        "other"
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Json2xlsx {
            dir,
            pattern,
            output,
            field_header,
            field_value,
            no_bold_header,
            no_borders,
        } => {
            let options = SpecConvertOptions {
                dir_input: dir,
                pattern_input: pattern,
                file_out: output,
                write_options: SpecXlsxWriteOptions {
                    field_header,
                    field_value,
                    if_bold_header: !no_bold_header,
                    if_border_cells: !no_borders,
                },
            };
            run_json2xlsx(&options)
        }
        Command::Payee {
            ifns,
            oktmmf,
            timeout_ms,
        } => {
            let options = SpecPayeeRequestOptions {
                timeout: Duration::from_millis(timeout_ms),
                ..SpecPayeeRequestOptions::default()
            };
            run_payee(ifns, oktmmf, &options)
        }
        Command::Shop {
            db,
            product,
            no_seed,
        } => run_shop(&db, &product, !no_seed),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_options = SpecLogOptions {
        dir_logs: (!cli.no_log_file).then(|| cli.log_dir.clone()),
        ..SpecLogOptions::default()
    };
    if let Err(err) = init_logging(&log_options) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(category = derive_error_category(&err), "{err:#}");
            ExitCode::FAILURE
        }
    }
}
