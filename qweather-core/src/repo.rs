//! Category fetch facade.
//!
//! One operation per weather-data category. Each computes the cache-duration
//! hint from the caller's [`FetchConfig`], encodes the location the way its
//! endpoint expects, dispatches through a [`WeatherApi`], and substitutes the
//! category's empty default when no payload comes back. Callers never see an
//! absent value and never see a network error; "upstream said empty" and
//! "call failed" are deliberately indistinguishable at this boundary.

use std::sync::Arc;

use crate::{
    api::{QWeatherClient, WeatherApi},
    config::FetchConfig,
    model::{
        AirDailyReport, AirNowReport, DayReport, Horizon, HourlyReport, IndicesReport, Location,
        MinutelyReport, NowReport, WarningReport,
    },
};

/// Minutes-to-seconds cache hint, or `None` when the caller forced a live
/// fetch.
fn cache_window(cfg: &FetchConfig, interval_minutes: u64) -> Option<u64> {
    if cfg.no_cache {
        None
    } else {
        Some(interval_minutes * 60)
    }
}

/// Facade over the upstream API, one method per category.
///
/// Holds only the endpoint client; safe to clone and to call concurrently
/// for any mix of categories and locations. Configuration is read per call
/// and never mutated.
#[derive(Clone)]
pub struct WeatherRepo {
    api: Arc<dyn WeatherApi>,
}

impl WeatherRepo {
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self { api }
    }

    /// Build a repo backed by the live QWeather client, using the key from
    /// the given config.
    pub fn from_config(cfg: &FetchConfig) -> anyhow::Result<Self> {
        let key = cfg.api_key()?;
        Ok(Self::new(Arc::new(QWeatherClient::new(key.to_owned()))))
    }

    /// Real-time conditions by location id.
    pub async fn now(&self, location: &Location, cfg: &FetchConfig) -> NowReport {
        let cache = cache_window(cfg, cfg.intervals.now);
        self.api
            .now(&location.id, &cfg.lang, cfg.unit.code(), cache)
            .await
            .unwrap_or(NowReport::default())
    }

    /// Real-time conditions from the grid (coordinate-keyed) endpoint.
    pub async fn grid_now(&self, location: &Location, cfg: &FetchConfig) -> NowReport {
        let cache = cache_window(cfg, cfg.intervals.now);
        self.api
            .grid_now(&location.to_lat_lon(), &cfg.lang, cfg.unit.code(), cache)
            .await
            .unwrap_or(NowReport::default())
    }

    /// Next 24 hours, hour by hour.
    pub async fn hourly(&self, location: &Location, cfg: &FetchConfig) -> HourlyReport {
        let cache = cache_window(cfg, cfg.intervals.hourly);
        self.api
            .hourly(&location.to_lat_lon(), &cfg.lang, cfg.unit.code(), cache)
            .await
            .unwrap_or(HourlyReport::default())
    }

    /// Next 24 hours from the grid endpoint.
    pub async fn grid_hourly(&self, location: &Location, cfg: &FetchConfig) -> HourlyReport {
        let cache = cache_window(cfg, cfg.intervals.hourly);
        self.api
            .grid_hourly(&location.to_lat_lon(), &cfg.lang, cfg.unit.code(), cache)
            .await
            .unwrap_or(HourlyReport::default())
    }

    /// Multi-day forecast for the requested horizon.
    pub async fn day_forecast(
        &self,
        location: &Location,
        horizon: Horizon,
        cfg: &FetchConfig,
    ) -> DayReport {
        let cache = cache_window(cfg, cfg.intervals.day);
        let coords = location.to_lat_lon();
        let (lang, unit) = (cfg.lang.as_str(), cfg.unit.code());
        match horizon {
            Horizon::ThreeDay => self.api.day_3d(&coords, lang, unit, cache).await,
            Horizon::SevenDay => self.api.day_7d(&coords, lang, unit, cache).await,
            Horizon::FifteenDay => self.api.day_15d(&coords, lang, unit, cache).await,
        }
        .unwrap_or(DayReport::default())
    }

    /// Multi-day forecast from the grid endpoints. The grid family has no
    /// 15-day variant upstream, so that horizon routes to the non-grid
    /// endpoint.
    pub async fn grid_day_forecast(
        &self,
        location: &Location,
        horizon: Horizon,
        cfg: &FetchConfig,
    ) -> DayReport {
        let cache = cache_window(cfg, cfg.intervals.day);
        let coords = location.to_lat_lon();
        let (lang, unit) = (cfg.lang.as_str(), cfg.unit.code());
        match horizon {
            Horizon::ThreeDay => self.api.grid_day_3d(&coords, lang, unit, cache).await,
            Horizon::SevenDay => self.api.grid_day_7d(&coords, lang, unit, cache).await,
            Horizon::FifteenDay => self.api.day_15d(&coords, lang, unit, cache).await,
        }
        .unwrap_or(DayReport::default())
    }

    /// Active severe-weather warnings.
    pub async fn warning_now(&self, location: &Location, cfg: &FetchConfig) -> WarningReport {
        let cache = cache_window(cfg, cfg.intervals.warning);
        self.api
            .warning_now(&location.to_lat_lon(), &cfg.lang, cache)
            .await
            .unwrap_or(WarningReport::default())
    }

    /// Minute-level precipitation for the next two hours.
    pub async fn minutely_precipitation(
        &self,
        location: &Location,
        cfg: &FetchConfig,
    ) -> MinutelyReport {
        let cache = cache_window(cfg, cfg.intervals.minutely);
        self.api
            .minutely(&location.to_lat_lon(), &cfg.lang, cache)
            .await
            .unwrap_or(MinutelyReport::default())
    }

    /// Real-time air quality by location id.
    pub async fn air_now(&self, location: &Location, cfg: &FetchConfig) -> AirNowReport {
        let cache = cache_window(cfg, cfg.intervals.air_now);
        self.api
            .air_now(&location.id, &cfg.lang, cache)
            .await
            .unwrap_or(AirNowReport::default())
    }

    /// Five-day air quality forecast.
    pub async fn air_5d(&self, location: &Location, cfg: &FetchConfig) -> AirDailyReport {
        let cache = cache_window(cfg, cfg.intervals.air_daily);
        self.api
            .air_5d(&location.to_lat_lon(), &cfg.lang, cache)
            .await
            .unwrap_or(AirDailyReport::default())
    }

    /// Today's lifestyle indices, restricted to the given type codes
    /// (comma-separated, `"0"` for all).
    pub async fn indices(
        &self,
        location: &Location,
        index_type: &str,
        cfg: &FetchConfig,
    ) -> IndicesReport {
        let cache = cache_window(cfg, cfg.intervals.indices);
        self.api
            .indices_1d(&location.to_lat_lon(), &cfg.lang, index_type, cache)
            .await
            .unwrap_or(IndicesReport::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{FetchError, Outcome};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// What the stub returns for every endpoint.
    #[derive(Clone, Copy)]
    enum Mode {
        /// A present (zero-valued) payload.
        Echo,
        /// 2xx with no body.
        EmptySuccess,
        /// Upstream 502.
        Fail,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct RecordedCall {
        endpoint: &'static str,
        location: String,
        lang: String,
        unit: Option<String>,
        cache: Option<u64>,
    }

    struct StubApi {
        mode: Mode,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl StubApi {
        fn new(mode: Mode) -> Arc<Self> {
            Arc::new(Self {
                mode,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn record(
            &self,
            endpoint: &'static str,
            location: &str,
            lang: &str,
            unit: Option<&str>,
            cache: Option<u64>,
        ) {
            self.calls.lock().unwrap().push(RecordedCall {
                endpoint,
                location: location.to_string(),
                lang: lang.to_string(),
                unit: unit.map(str::to_string),
                cache,
            });
        }

        fn outcome<T: Default>(&self) -> Outcome<T> {
            match self.mode {
                Mode::Echo => Outcome::Success(Some(T::default())),
                Mode::EmptySuccess => Outcome::Success(None),
                Mode::Fail => Outcome::Error(FetchError::Status {
                    status: StatusCode::BAD_GATEWAY,
                    body: "upstream unavailable".to_string(),
                }),
            }
        }

        fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WeatherApi for StubApi {
        async fn now(
            &self,
            location: &str,
            lang: &str,
            unit: &str,
            cache: Option<u64>,
        ) -> Outcome<NowReport> {
            self.record("now", location, lang, Some(unit), cache);
            match self.mode {
                // Echo a recognizable report so passthrough is observable.
                Mode::Echo => {
                    let mut report = NowReport::default();
                    report.code = "200".into();
                    report.now.temp = "21".into();
                    Outcome::Success(Some(report))
                }
                _ => self.outcome(),
            }
        }

        async fn grid_now(
            &self,
            location: &str,
            lang: &str,
            unit: &str,
            cache: Option<u64>,
        ) -> Outcome<NowReport> {
            self.record("grid_now", location, lang, Some(unit), cache);
            self.outcome()
        }

        async fn hourly(
            &self,
            location: &str,
            lang: &str,
            unit: &str,
            cache: Option<u64>,
        ) -> Outcome<HourlyReport> {
            self.record("hourly", location, lang, Some(unit), cache);
            self.outcome()
        }

        async fn grid_hourly(
            &self,
            location: &str,
            lang: &str,
            unit: &str,
            cache: Option<u64>,
        ) -> Outcome<HourlyReport> {
            self.record("grid_hourly", location, lang, Some(unit), cache);
            self.outcome()
        }

        async fn day_3d(
            &self,
            location: &str,
            lang: &str,
            unit: &str,
            cache: Option<u64>,
        ) -> Outcome<DayReport> {
            self.record("day_3d", location, lang, Some(unit), cache);
            self.outcome()
        }

        async fn day_7d(
            &self,
            location: &str,
            lang: &str,
            unit: &str,
            cache: Option<u64>,
        ) -> Outcome<DayReport> {
            self.record("day_7d", location, lang, Some(unit), cache);
            self.outcome()
        }

        async fn day_15d(
            &self,
            location: &str,
            lang: &str,
            unit: &str,
            cache: Option<u64>,
        ) -> Outcome<DayReport> {
            self.record("day_15d", location, lang, Some(unit), cache);
            self.outcome()
        }

        async fn grid_day_3d(
            &self,
            location: &str,
            lang: &str,
            unit: &str,
            cache: Option<u64>,
        ) -> Outcome<DayReport> {
            self.record("grid_day_3d", location, lang, Some(unit), cache);
            self.outcome()
        }

        async fn grid_day_7d(
            &self,
            location: &str,
            lang: &str,
            unit: &str,
            cache: Option<u64>,
        ) -> Outcome<DayReport> {
            self.record("grid_day_7d", location, lang, Some(unit), cache);
            self.outcome()
        }

        async fn warning_now(
            &self,
            location: &str,
            lang: &str,
            cache: Option<u64>,
        ) -> Outcome<WarningReport> {
            self.record("warning_now", location, lang, None, cache);
            self.outcome()
        }

        async fn minutely(
            &self,
            location: &str,
            lang: &str,
            cache: Option<u64>,
        ) -> Outcome<MinutelyReport> {
            self.record("minutely", location, lang, None, cache);
            self.outcome()
        }

        async fn air_now(
            &self,
            location: &str,
            lang: &str,
            cache: Option<u64>,
        ) -> Outcome<AirNowReport> {
            self.record("air_now", location, lang, None, cache);
            self.outcome()
        }

        async fn air_5d(
            &self,
            location: &str,
            lang: &str,
            cache: Option<u64>,
        ) -> Outcome<AirDailyReport> {
            self.record("air_5d", location, lang, None, cache);
            self.outcome()
        }

        async fn indices_1d(
            &self,
            location: &str,
            lang: &str,
            index_type: &str,
            cache: Option<u64>,
        ) -> Outcome<IndicesReport> {
            self.record("indices_1d", location, lang, Some(index_type), cache);
            self.outcome()
        }
    }

    fn test_config() -> FetchConfig {
        FetchConfig {
            api_key: Some("KEY".into()),
            lang: "en".into(),
            ..FetchConfig::default()
        }
    }

    fn beijing() -> Location {
        Location::new("101010100", 39.92, 116.41)
    }

    /// Run every category operation once against the given repo.
    async fn fetch_all(repo: &WeatherRepo, loc: &Location, cfg: &FetchConfig) {
        repo.now(loc, cfg).await;
        repo.grid_now(loc, cfg).await;
        repo.hourly(loc, cfg).await;
        repo.grid_hourly(loc, cfg).await;
        repo.day_forecast(loc, Horizon::ThreeDay, cfg).await;
        repo.grid_day_forecast(loc, Horizon::ThreeDay, cfg).await;
        repo.warning_now(loc, cfg).await;
        repo.minutely_precipitation(loc, cfg).await;
        repo.air_now(loc, cfg).await;
        repo.air_5d(loc, cfg).await;
        repo.indices(loc, "0", cfg).await;
    }

    #[tokio::test]
    async fn force_fresh_strips_cache_hint_from_every_category() {
        let stub = StubApi::new(Mode::Echo);
        let repo = WeatherRepo::new(stub.clone());
        let cfg = test_config().fresh();

        fetch_all(&repo, &beijing(), &cfg).await;

        let calls = stub.calls();
        assert_eq!(calls.len(), 11);
        for call in calls {
            assert_eq!(call.cache, None, "{} carried a hint", call.endpoint);
        }
    }

    #[tokio::test]
    async fn cached_fetch_converts_interval_minutes_to_seconds() {
        let stub = StubApi::new(Mode::Echo);
        let repo = WeatherRepo::new(stub.clone());
        let mut cfg = test_config();
        cfg.intervals.hourly = 30;
        cfg.intervals.now = 10;

        repo.hourly(&beijing(), &cfg).await;
        repo.now(&beijing(), &cfg).await;

        let calls = stub.calls();
        assert_eq!(calls[0].cache, Some(1800));
        assert_eq!(calls[1].cache, Some(600));
    }

    #[tokio::test]
    async fn repeated_fetch_recomputes_the_same_hint() {
        let stub = StubApi::new(Mode::Echo);
        let repo = WeatherRepo::new(stub.clone());
        let cfg = test_config();

        repo.now(&beijing(), &cfg).await;
        repo.now(&beijing(), &cfg).await;

        let calls = stub.calls();
        assert_eq!(calls.len(), 2, "each invocation dispatches independently");
        assert_eq!(calls[0], calls[1]);
        assert_eq!(calls[0].cache, Some(cfg.intervals.now * 60));
    }

    #[tokio::test]
    async fn successful_payload_passes_through_unchanged() {
        let repo = WeatherRepo::new(StubApi::new(Mode::Echo));

        let report = repo.now(&beijing(), &test_config()).await;

        assert_eq!(report.code, "200");
        assert_eq!(report.now.temp, "21");
        assert_ne!(report, NowReport::default());
    }

    #[tokio::test]
    async fn horizons_route_to_distinct_endpoints() {
        let stub = StubApi::new(Mode::Echo);
        let repo = WeatherRepo::new(stub.clone());
        let cfg = test_config();
        let loc = beijing();

        for horizon in Horizon::all() {
            repo.day_forecast(&loc, *horizon, &cfg).await;
        }
        for horizon in Horizon::all() {
            repo.grid_day_forecast(&loc, *horizon, &cfg).await;
        }

        let endpoints: Vec<&str> = stub.calls().iter().map(|c| c.endpoint).collect();
        assert_eq!(
            endpoints,
            // Grid has no 15-day variant; it falls through to day_15d.
            ["day_3d", "day_7d", "day_15d", "grid_day_3d", "grid_day_7d", "day_15d"]
        );
    }

    #[tokio::test]
    async fn location_encoding_follows_each_category() {
        let stub = StubApi::new(Mode::Echo);
        let repo = WeatherRepo::new(stub.clone());
        let cfg = test_config();
        let loc = beijing();

        fetch_all(&repo, &loc, &cfg).await;

        for call in stub.calls() {
            match call.endpoint {
                // Id-keyed categories pass the id unchanged.
                "now" | "air_now" => assert_eq!(call.location, "101010100"),
                // Everything else takes the coordinate string.
                _ => assert_eq!(call.location, "39.92,116.41", "{}", call.endpoint),
            }
        }
    }

    #[tokio::test]
    async fn unit_and_lang_are_passed_through() {
        let stub = StubApi::new(Mode::Echo);
        let repo = WeatherRepo::new(stub.clone());
        let mut cfg = test_config();
        cfg.unit = crate::config::Unit::Imperial;

        repo.now(&beijing(), &cfg).await;

        let call = &stub.calls()[0];
        assert_eq!(call.lang, "en");
        assert_eq!(call.unit.as_deref(), Some("i"));
    }

    #[tokio::test]
    async fn upstream_error_becomes_empty_default() {
        let stub = StubApi::new(Mode::Fail);
        let repo = WeatherRepo::new(stub);
        let cfg = test_config();
        let loc = beijing();

        assert_eq!(repo.now(&loc, &cfg).await, NowReport::default());
        assert_eq!(repo.hourly(&loc, &cfg).await, HourlyReport::default());
        assert_eq!(
            repo.day_forecast(&loc, Horizon::SevenDay, &cfg).await,
            DayReport::default()
        );
        assert_eq!(repo.warning_now(&loc, &cfg).await, WarningReport::default());
        assert_eq!(
            repo.minutely_precipitation(&loc, &cfg).await,
            MinutelyReport::default()
        );
        assert_eq!(repo.air_now(&loc, &cfg).await, AirNowReport::default());
        assert_eq!(repo.air_5d(&loc, &cfg).await, AirDailyReport::default());
        assert_eq!(repo.indices(&loc, "0", &cfg).await, IndicesReport::default());
    }

    #[tokio::test]
    async fn empty_success_is_indistinguishable_from_error() {
        let cfg = test_config();
        let loc = beijing();

        let failed = WeatherRepo::new(StubApi::new(Mode::Fail));
        let empty = WeatherRepo::new(StubApi::new(Mode::EmptySuccess));

        assert_eq!(failed.now(&loc, &cfg).await, empty.now(&loc, &cfg).await);
        assert_eq!(
            failed.grid_day_forecast(&loc, Horizon::FifteenDay, &cfg).await,
            empty.grid_day_forecast(&loc, Horizon::FifteenDay, &cfg).await
        );
    }

    #[tokio::test]
    async fn indices_type_codes_reach_the_endpoint() {
        let stub = StubApi::new(Mode::Echo);
        let repo = WeatherRepo::new(stub.clone());

        repo.indices(&beijing(), "1,2", &test_config()).await;

        assert_eq!(stub.calls()[0].unit.as_deref(), Some("1,2"));
    }

    #[test]
    fn from_config_requires_an_api_key() {
        // `WeatherRepo` is not `Debug` (trait-object field), so take the
        // error out by hand.
        let err = match WeatherRepo::from_config(&FetchConfig::default()) {
            Ok(_) => panic!("expected construction to fail without an API key"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("No API key configured"));
    }
}
