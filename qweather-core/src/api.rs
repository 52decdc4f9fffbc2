//! Upstream endpoint surface.
//!
//! [`WeatherApi`] mirrors the QWeather v7 endpoint set one method per
//! endpoint; [`QWeatherClient`] is the `reqwest`-backed implementation. The
//! repo layer owns variant selection and location encoding, so every method
//! here takes the already-encoded location string.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::{
    model::{
        AirDailyReport, AirNowReport, DayReport, HourlyReport, IndicesReport, MinutelyReport,
        NowReport, WarningReport,
    },
    response::{self, Outcome},
};

pub const DEFAULT_BASE_URL: &str = "https://devapi.qweather.com";

/// One method per upstream endpoint. `cache` is the cache-duration hint in
/// seconds; `None` asks intermediaries to bypass their caches entirely.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    async fn now(&self, location: &str, lang: &str, unit: &str, cache: Option<u64>)
    -> Outcome<NowReport>;

    async fn grid_now(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<NowReport>;

    async fn hourly(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<HourlyReport>;

    async fn grid_hourly(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<HourlyReport>;

    async fn day_3d(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<DayReport>;

    async fn day_7d(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<DayReport>;

    async fn day_15d(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<DayReport>;

    async fn grid_day_3d(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<DayReport>;

    async fn grid_day_7d(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<DayReport>;

    async fn warning_now(&self, coords: &str, lang: &str, cache: Option<u64>)
    -> Outcome<WarningReport>;

    async fn minutely(&self, coords: &str, lang: &str, cache: Option<u64>)
    -> Outcome<MinutelyReport>;

    async fn air_now(&self, location: &str, lang: &str, cache: Option<u64>)
    -> Outcome<AirNowReport>;

    async fn air_5d(&self, coords: &str, lang: &str, cache: Option<u64>)
    -> Outcome<AirDailyReport>;

    async fn indices_1d(
        &self,
        coords: &str,
        lang: &str,
        index_type: &str,
        cache: Option<u64>,
    ) -> Outcome<IndicesReport>;
}

/// QWeather v7 HTTP client. Holds no per-request state; safe to share and
/// call concurrently.
#[derive(Debug, Clone)]
pub struct QWeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl QWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a different host, e.g. the paid-tier API or a
    /// stub server.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key,
        }
    }

    fn get(&self, path: &str, query: &[(&str, &str)], cache: Option<u64>) -> RequestBuilder {
        let req = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .query(&[("key", self.api_key.as_str())]);

        match cache {
            Some(secs) => req.header("Cache-Control", format!("max-age={secs}")),
            None => req.header("Cache-Control", "no-cache"),
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        cache: Option<u64>,
    ) -> Outcome<T> {
        response::classify(self.get(path, query, cache)).await
    }
}

#[async_trait]
impl WeatherApi for QWeatherClient {
    async fn now(
        &self,
        location: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<NowReport> {
        let query = [("location", location), ("lang", lang), ("unit", unit)];
        self.fetch("/v7/weather/now", &query, cache).await
    }

    async fn grid_now(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<NowReport> {
        let query = [("location", coords), ("lang", lang), ("unit", unit)];
        self.fetch("/v7/grid-weather/now", &query, cache).await
    }

    async fn hourly(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<HourlyReport> {
        let query = [("location", coords), ("lang", lang), ("unit", unit)];
        self.fetch("/v7/weather/24h", &query, cache).await
    }

    async fn grid_hourly(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<HourlyReport> {
        let query = [("location", coords), ("lang", lang), ("unit", unit)];
        self.fetch("/v7/grid-weather/24h", &query, cache).await
    }

    async fn day_3d(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<DayReport> {
        let query = [("location", coords), ("lang", lang), ("unit", unit)];
        self.fetch("/v7/weather/3d", &query, cache).await
    }

    async fn day_7d(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<DayReport> {
        let query = [("location", coords), ("lang", lang), ("unit", unit)];
        self.fetch("/v7/weather/7d", &query, cache).await
    }

    async fn day_15d(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<DayReport> {
        let query = [("location", coords), ("lang", lang), ("unit", unit)];
        self.fetch("/v7/weather/15d", &query, cache).await
    }

    async fn grid_day_3d(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<DayReport> {
        let query = [("location", coords), ("lang", lang), ("unit", unit)];
        self.fetch("/v7/grid-weather/3d", &query, cache).await
    }

    async fn grid_day_7d(
        &self,
        coords: &str,
        lang: &str,
        unit: &str,
        cache: Option<u64>,
    ) -> Outcome<DayReport> {
        let query = [("location", coords), ("lang", lang), ("unit", unit)];
        self.fetch("/v7/grid-weather/7d", &query, cache).await
    }

    async fn warning_now(
        &self,
        coords: &str,
        lang: &str,
        cache: Option<u64>,
    ) -> Outcome<WarningReport> {
        let query = [("location", coords), ("lang", lang)];
        self.fetch("/v7/warning/now", &query, cache).await
    }

    async fn minutely(
        &self,
        coords: &str,
        lang: &str,
        cache: Option<u64>,
    ) -> Outcome<MinutelyReport> {
        let query = [("location", coords), ("lang", lang)];
        self.fetch("/v7/minutely/5m", &query, cache).await
    }

    async fn air_now(
        &self,
        location: &str,
        lang: &str,
        cache: Option<u64>,
    ) -> Outcome<AirNowReport> {
        let query = [("location", location), ("lang", lang)];
        self.fetch("/v7/air/now", &query, cache).await
    }

    async fn air_5d(
        &self,
        coords: &str,
        lang: &str,
        cache: Option<u64>,
    ) -> Outcome<AirDailyReport> {
        let query = [("location", coords), ("lang", lang)];
        self.fetch("/v7/air/5d", &query, cache).await
    }

    async fn indices_1d(
        &self,
        coords: &str,
        lang: &str,
        index_type: &str,
        cache: Option<u64>,
    ) -> Outcome<IndicesReport> {
        let query = [("location", coords), ("lang", lang), ("type", index_type)];
        self.fetch("/v7/indices/1d", &query, cache).await
    }
}
