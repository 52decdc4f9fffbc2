use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::response::FetchError;

/// A place the caller wants weather for.
///
/// `id` is the opaque QWeather location id (e.g. `"101010100"`); `lat`/`lon`
/// are its coordinates. Which of the two reaches the wire depends on the
/// endpoint: grid endpoints always take coordinates, non-grid endpoints take
/// whichever form that particular category was designed around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
        }
    }

    /// Coordinate form expected by grid endpoints: `"<lat>,<lon>"`.
    pub fn to_lat_lon(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

/// Forecast length for the multi-day endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Horizon {
    ThreeDay,
    SevenDay,
    FifteenDay,
}

impl Horizon {
    pub const fn days(self) -> u8 {
        match self {
            Horizon::ThreeDay => 3,
            Horizon::SevenDay => 7,
            Horizon::FifteenDay => 15,
        }
    }

    pub const fn all() -> &'static [Horizon] {
        &[Horizon::ThreeDay, Horizon::SevenDay, Horizon::FifteenDay]
    }
}

impl TryFrom<u8> for Horizon {
    type Error = FetchError;

    fn try_from(days: u8) -> Result<Self, Self::Error> {
        match days {
            3 => Ok(Horizon::ThreeDay),
            7 => Ok(Horizon::SevenDay),
            15 => Ok(Horizon::FifteenDay),
            other => Err(FetchError::InvalidHorizon(other)),
        }
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d", self.days())
    }
}

fn parse_update_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    // QWeather stamps look like "2024-05-01T16:35+08:00" (no seconds).
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z"))
        .ok()
}

macro_rules! updated_at {
    ($($report:ty),+ $(,)?) => {
        $(impl $report {
            /// Upstream refresh stamp, if the report carries a parseable one.
            /// Empty defaults return `None`.
            pub fn updated_at(&self) -> Option<DateTime<FixedOffset>> {
                parse_update_time(&self.update_time)
            }
        })+
    };
}

/// Real-time conditions, grid or non-grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NowReport {
    pub code: String,
    pub update_time: String,
    pub fx_link: String,
    pub now: NowBody,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NowBody {
    pub obs_time: String,
    pub temp: String,
    pub feels_like: String,
    pub icon: String,
    pub text: String,
    pub wind360: String,
    pub wind_dir: String,
    pub wind_scale: String,
    pub wind_speed: String,
    pub humidity: String,
    pub precip: String,
    pub pressure: String,
    pub vis: String,
    pub cloud: String,
    pub dew: String,
}

/// Hour-by-hour forecast for the next 24 hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HourlyReport {
    pub code: String,
    pub update_time: String,
    pub fx_link: String,
    pub hourly: Vec<HourEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HourEntry {
    pub fx_time: String,
    pub temp: String,
    pub icon: String,
    pub text: String,
    pub wind360: String,
    pub wind_dir: String,
    pub wind_speed: String,
    pub humidity: String,
    pub pop: String,
    pub precip: String,
    pub pressure: String,
}

/// Multi-day forecast (3/7/15 days).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DayReport {
    pub code: String,
    pub update_time: String,
    pub fx_link: String,
    pub daily: Vec<DayEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DayEntry {
    pub fx_date: String,
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
    pub moon_phase: String,
    pub moon_phase_icon: String,
    pub temp_max: String,
    pub temp_min: String,
    pub icon_day: String,
    pub text_day: String,
    pub icon_night: String,
    pub text_night: String,
    pub wind_dir_day: String,
    pub wind_scale_day: String,
    pub humidity: String,
    pub precip: String,
    pub pressure: String,
    pub uv_index: String,
}

/// Active severe-weather warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WarningReport {
    pub code: String,
    pub update_time: String,
    pub fx_link: String,
    pub warning: Vec<WarningEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WarningEntry {
    pub id: String,
    pub sender: String,
    pub pub_time: String,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    pub severity: String,
    pub severity_color: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub type_name: String,
    pub text: String,
}

/// Minute-level precipitation for the next two hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MinutelyReport {
    pub code: String,
    pub update_time: String,
    pub fx_link: String,
    pub summary: String,
    pub minutely: Vec<MinuteEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MinuteEntry {
    pub fx_time: String,
    pub precip: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Real-time air quality.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AirNowReport {
    pub code: String,
    pub update_time: String,
    pub fx_link: String,
    pub now: AirBody,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AirBody {
    pub pub_time: String,
    pub aqi: String,
    pub level: String,
    pub category: String,
    pub primary: String,
    pub pm10: String,
    pub pm2p5: String,
    pub no2: String,
    pub so2: String,
    pub co: String,
    pub o3: String,
}

/// Five-day air quality forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AirDailyReport {
    pub code: String,
    pub update_time: String,
    pub fx_link: String,
    pub daily: Vec<AirDayEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AirDayEntry {
    pub fx_date: String,
    pub aqi: String,
    pub level: String,
    pub category: String,
    pub primary: String,
}

/// Daily lifestyle indices (sport, car wash, UV, ...), filtered by type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndicesReport {
    pub code: String,
    pub update_time: String,
    pub fx_link: String,
    pub daily: Vec<IndexEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexEntry {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub level: String,
    pub category: String,
    pub text: String,
}

updated_at!(
    NowReport,
    HourlyReport,
    DayReport,
    WarningReport,
    MinutelyReport,
    AirNowReport,
    AirDailyReport,
    IndicesReport,
);
