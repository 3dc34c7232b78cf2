mod table;

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum, error::ErrorKind};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use std::ffi::OsString;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{Config, MonthlyRecord, ScheduleResult, run_schedule};

pub use table::render_table;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "prepay",
    about = "Loan amortization with extra principal payments versus investing the surplus"
)]
struct Cli {
    #[arg(long, default_value_t = 322_830.96, help = "Loan principal")]
    loan_total: f64,
    #[arg(long, default_value_t = 284, help = "Loan duration in months")]
    loan_duration: u32,
    #[arg(long, default_value_t = 8.81, help = "Annual loan interest in percent")]
    loan_interest: f64,
    #[arg(
        long,
        default_value_t = 8.81,
        help = "Annual investment return in percent"
    )]
    invest_interest: f64,
    #[arg(
        long,
        default_value_t = 0,
        help = "Number of months during which surplus is used for extra principal"
    )]
    prefer_loan_duration: u32,
    #[arg(
        long,
        default_value_t = 0,
        help = "Months to simulate; raised to the loan duration when shorter"
    )]
    measure_duration: u32,
    #[arg(
        long,
        default_value_t = 10_000.0,
        help = "Monthly budget, including the regular installment"
    )]
    monthly_available: f64,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

/// Accepts a JSON number or a numeric string; an empty string counts as 0.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<LenientNumber>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match raw {
        LenientNumber::Number(v) => Ok(Some(v)),
        LenientNumber::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(Some(0.0));
            }
            text.parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid number: {text:?}")))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    #[serde(deserialize_with = "lenient_number")]
    loan_total: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    loan_duration: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    loan_interest: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    invest_interest: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    prefer_loan_duration: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    measure_duration: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    monthly_available: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    config: Config,
    loan_monthly: f64,
    total_loan_expected: f64,
    total_loan_paid: f64,
    loan_saved_percent: f64,
    invest_result: f64,
    invest_max: f64,
    invest_delta_percent: f64,
    payoff_month: Option<u32>,
    monthly_data: Vec<MonthlyRecord>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_config(cli: &Cli) -> Result<Config, String> {
    let config = Config {
        loan_total: cli.loan_total,
        loan_duration: cli.loan_duration,
        loan_interest: cli.loan_interest,
        invest_interest: cli.invest_interest,
        prefer_loan_duration: cli.prefer_loan_duration,
        measure_duration: cli.measure_duration,
        monthly_available: cli.monthly_available,
    };
    config.validate().map_err(|e| format!("--{e}"))?;

    Ok(Config {
        measure_duration: config.effective_measure_duration(),
        ..config
    })
}

/// Runs the one-shot command line report and returns what should be printed.
pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => return Ok(e.to_string()),
        Err(e) => return Err(e.to_string()),
    };
    let config = build_config(&cli)?;
    let result = run_schedule(&config);

    match cli.format {
        OutputFormat::Table => Ok(render_table(&result)),
        OutputFormat::Json => {
            let response = build_simulate_response(config, result);
            serde_json::to_string_pretty(&response)
                .map(|json| format!("{json}\n"))
                .map_err(|e| format!("Failed to serialize schedule: {e}"))
        }
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "prepay HTTP API listening");

    axum::serve(listener, app).await
}

fn router() -> Router {
    Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let config = match config_from_payload(payload) {
        Ok(config) => config,
        Err(msg) => {
            tracing::warn!(error = %msg, "rejected simulate request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let result = run_schedule(&config);
    json_response(StatusCode::OK, build_simulate_response(config, result))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn config_from_json(json: &str) -> Result<Config, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    config_from_payload(payload)
}

fn config_from_payload(payload: SimulatePayload) -> Result<Config, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.loan_total {
        cli.loan_total = v;
    }
    if let Some(v) = payload.loan_duration {
        cli.loan_duration = whole_months(v, "loanDuration")?;
    }
    if let Some(v) = payload.loan_interest {
        cli.loan_interest = v;
    }
    if let Some(v) = payload.invest_interest {
        cli.invest_interest = v;
    }
    if let Some(v) = payload.prefer_loan_duration {
        cli.prefer_loan_duration = whole_months(v, "preferLoanDuration")?;
    }
    if let Some(v) = payload.measure_duration {
        cli.measure_duration = whole_months(v, "measureDuration")?;
    }
    if let Some(v) = payload.monthly_available {
        cli.monthly_available = v;
    }

    build_config(&cli)
}

fn whole_months(value: f64, field: &str) -> Result<u32, String> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(format!("{field} must be a whole number of months >= 0"));
    }
    if value > f64::from(u32::MAX) {
        return Err(format!("{field} is too large"));
    }
    Ok(value as u32)
}

fn default_cli_for_api() -> Cli {
    Cli {
        loan_total: 322_830.96,
        loan_duration: 284,
        loan_interest: 8.81,
        invest_interest: 8.81,
        prefer_loan_duration: 0,
        measure_duration: 0,
        monthly_available: 10_000.0,
        format: OutputFormat::Json,
    }
}

fn build_simulate_response(config: Config, result: ScheduleResult) -> SimulateResponse {
    SimulateResponse {
        config,
        loan_monthly: result.loan_monthly,
        total_loan_expected: result.total_loan_expected,
        total_loan_paid: result.total_loan_paid,
        loan_saved_percent: result.loan_saved_percent(),
        invest_result: result.invest_result,
        invest_max: result.invest_max,
        invest_delta_percent: result.invest_delta_percent(),
        payoff_month: result.payoff_month(),
        monthly_data: result.monthly_data,
    }
}
