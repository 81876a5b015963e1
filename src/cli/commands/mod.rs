use crate::api::context::DeploymentMode;
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};
use url::Url;

pub mod logging;

pub const ARG_PORT: &str = "port";
pub const ARG_MODE: &str = "mode";
pub const ARG_LATENCY_MS: &str = "latency-ms";
pub const ARG_SERVER_URL: &str = "server-url";

#[must_use]
pub fn validator_mode() -> ValueParser {
    ValueParser::from(move |mode: &str| -> std::result::Result<DeploymentMode, String> {
        mode.parse::<DeploymentMode>()
    })
}

#[must_use]
pub fn validator_server_url() -> ValueParser {
    ValueParser::from(move |url: &str| -> std::result::Result<String, String> {
        let parsed = Url::parse(url).map_err(|e| format!("invalid server URL: {e}"))?;
        match parsed.scheme() {
            "http" | "https" => Ok(url.trim_end_matches('/').to_string()),
            scheme => Err(format!("unsupported server URL scheme: {scheme}")),
        }
    })
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("diary-auth")
        .about("Emotion Diary authentication API")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8099")
                .env("DIARY_AUTH_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_MODE)
                .long("mode")
                .help("Deployment mode: development exposes error details, production hides them")
                .default_value("production")
                .env("DIARY_AUTH_MODE")
                .value_parser(validator_mode()),
        )
        .arg(
            Arg::new(ARG_LATENCY_MS)
                .long("latency-ms")
                .help("Artificial delay in milliseconds applied before the auth routes (0 disables)")
                .default_value("300")
                .env("DIARY_AUTH_LATENCY_MS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_SERVER_URL)
                .long("server-url")
                .help("Public base URL listed in the OpenAPI document, example: http://localhost:8099")
                .env("DIARY_AUTH_SERVER_URL")
                .value_parser(validator_server_url()),
        );

    logging::with_args(command)
}
