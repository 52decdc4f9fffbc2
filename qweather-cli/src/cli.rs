use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use qweather_core::{FetchConfig, Horizon, Location, Unit, WeatherRepo};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "qweather", version, about = "QWeather fetch CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Category {
    Now,
    GridNow,
    Hourly,
    GridHourly,
    Day,
    GridDay,
    Warning,
    Minutely,
    AirNow,
    Air5d,
    Indices,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively store API key, unit and language.
    Configure,

    /// Fetch one weather category and print it as JSON.
    Fetch {
        /// Which category to fetch.
        #[arg(value_enum)]
        category: Category,

        /// QWeather location id, e.g. "101010100".
        id: String,

        /// Latitude, needed for coordinate-keyed categories.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude, needed for coordinate-keyed categories.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        lon: f64,

        /// Forecast length in days for the multi-day categories: 3, 7 or 15.
        #[arg(long, default_value_t = 3)]
        days: u8,

        /// Indices type codes, comma-separated ("0" for all).
        #[arg(long, default_value = "0")]
        index_type: String,

        /// Bypass intermediary caches for this fetch.
        #[arg(long)]
        fresh: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Fetch {
                category,
                id,
                lat,
                lon,
                days,
                index_type,
                fresh,
            } => {
                let mut cfg = FetchConfig::load()?;
                cfg.no_cache = fresh;

                let repo = WeatherRepo::from_config(&cfg)?;
                let location = Location::new(id, lat, lon);

                let json = match category {
                    Category::Now => to_json(&repo.now(&location, &cfg).await)?,
                    Category::GridNow => to_json(&repo.grid_now(&location, &cfg).await)?,
                    Category::Hourly => to_json(&repo.hourly(&location, &cfg).await)?,
                    Category::GridHourly => to_json(&repo.grid_hourly(&location, &cfg).await)?,
                    Category::Day => {
                        let horizon = Horizon::try_from(days)?;
                        to_json(&repo.day_forecast(&location, horizon, &cfg).await)?
                    }
                    Category::GridDay => {
                        let horizon = Horizon::try_from(days)?;
                        to_json(&repo.grid_day_forecast(&location, horizon, &cfg).await)?
                    }
                    Category::Warning => to_json(&repo.warning_now(&location, &cfg).await)?,
                    Category::Minutely => {
                        to_json(&repo.minutely_precipitation(&location, &cfg).await)?
                    }
                    Category::AirNow => to_json(&repo.air_now(&location, &cfg).await)?,
                    Category::Air5d => to_json(&repo.air_5d(&location, &cfg).await)?,
                    Category::Indices => {
                        to_json(&repo.indices(&location, &index_type, &cfg).await)?
                    }
                };

                println!("{json}");
                Ok(())
            }
        }
    }
}

fn to_json<T: serde::Serialize>(report: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(report).context("Failed to render report as JSON")
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = FetchConfig::load()?;

    let key = inquire::Text::new("QWeather API key:")
        .with_initial_value(cfg.api_key.as_deref().unwrap_or(""))
        .prompt()
        .context("Failed to read API key")?;

    let unit = inquire::Select::new("Unit system:", vec!["metric", "imperial"])
        .prompt()
        .context("Failed to read unit system")?;

    let lang = inquire::Text::new("Language tag:")
        .with_initial_value(if cfg.lang.is_empty() {
            "en"
        } else {
            cfg.lang.as_str()
        })
        .prompt()
        .context("Failed to read language tag")?;

    cfg.api_key = Some(key);
    cfg.unit = if unit == "imperial" {
        Unit::Imperial
    } else {
        Unit::Metric
    };
    cfg.lang = lang;

    cfg.save()?;
    println!("Saved to {}", FetchConfig::config_file_path()?.display());
    Ok(())
}
