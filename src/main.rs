use anyhow::Context;
use clap::Parser;
use log::info;
use netatmo_public::{default_config_path, AppConfig, Netatmo, NetatmoClient};
use std::path::PathBuf;
use std::process;

/// Download public Netatmo station readings for a region into a CSV file.
///
/// Credentials and the region come from the config file; `NETATMO_*`
/// environment variables (or a `.env` file) and the flags below override it.
#[derive(Debug, Parser)]
#[command(name = "netatmo-download", version)]
struct Args {
    /// Config file (defaults to ./netatmo.toml, then the user config directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory the CSV file is written to
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Write `*_timestamp` columns as UTC datetimes instead of epoch seconds
    #[arg(long)]
    convert_timestamps: bool,

    /// Include wind gauge readings
    #[arg(long)]
    wind: bool,

    #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
    lat_ne: Option<f64>,
    #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
    lat_sw: Option<f64>,
    #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
    lon_ne: Option<f64>,
    #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
    lon_sw: Option<f64>,
}

fn main() {
    dotenv::dotenv().ok();
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args = Args::parse();
    match run(args) {
        Ok(path) => println!("{}", path.display()),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

fn run(args: Args) -> anyhow::Result<PathBuf> {
    let mut config = load_config(args.config)?;
    config.apply_env()?;
    config.override_region(args.lat_ne, args.lat_sw, args.lon_ne, args.lon_sw);
    if let Some(dir) = args.output {
        config.output.dir = dir;
    }

    let credentials = config.credentials()?;
    let region = config.region()?;
    let client = NetatmoClient::builder()
        .maybe_token_url(config.endpoints.token_url.clone())
        .maybe_api_url(config.endpoints.api_url.clone())
        .build()?;

    let netatmo = Netatmo::new(client, credentials);
    let table = netatmo
        .public_data()
        .region(region)
        .convert_timestamps(args.convert_timestamps || config.output.convert_timestamps)
        .wind(args.wind || config.output.wind)
        .call()
        .context("Failed to download public station data")?;

    let path = Netatmo::save(&table, &config.output.dir)
        .with_context(|| format!("Failed to save table to {}", config.output.dir.display()))?;
    info!("Done: {} stations", table.height());
    Ok(path)
}

/// An explicit `--config` must exist; the default location is optional.
fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    match explicit {
        Some(path) => Ok(AppConfig::load(&path)?),
        None => {
            let path = default_config_path();
            if path.exists() {
                Ok(AppConfig::load(&path)?)
            } else {
                info!(
                    "No config file at {}, using environment only",
                    path.display()
                );
                Ok(AppConfig::default())
            }
        }
    }
}
