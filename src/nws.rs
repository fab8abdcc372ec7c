use crate::error::{Error, Result};
use reqwest::blocking;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::fmt;
use std::rc::Rc;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

mod geojson;

pub const DEFAULT_API_BASE: &str = "https://api.weather.gov";

const GEO_JSON: &str = "application/geo+json";

static DECIMAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*$").unwrap()
});

static DMS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\d+)°(\d+)[′'](\d+)[″"]([NSns]) (\d+)°(\d+)[′'](\d+)[″"]([EWew])"#).unwrap()
});

// `None` disables the timeout; the blocking builder otherwise defaults to 30s.
pub(crate) fn http_client(timeout: Option<Duration>) -> Result<blocking::Client> {
    Ok(blocking::Client::builder().timeout(timeout).build()?)
}

#[derive(Debug)]
struct ClientState {
    ua: String,
    base: String,
    client: blocking::Client,
}

#[derive(Clone, Debug)]
pub struct Client {
    state: Rc<ClientState>,
}

/// A decoded response body and the status it arrived with. A status other
/// than 200 whose body still decoded is kept so the caller can warn and go on.
#[derive(Debug)]
pub struct Fetched<T> {
    url: String,
    status: StatusCode,
    value: T,
}

impl<T> Fetched<T> {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_degraded(&self) -> bool {
        self.status != StatusCode::OK
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl Client {
    pub fn new(ua: &str, base: &str, timeout: Option<Duration>) -> Result<Client> {
        Ok(Client {
            state: Rc::new(ClientState {
                ua: ua.to_string(),
                base: base.trim_end_matches('/').to_string(),
                client: http_client(timeout)?,
            }),
        })
    }

    pub fn get_point(&self, loc: &Location) -> Result<Fetched<Point>> {
        let url = format!("{}/points/{:.4},{:.4}", self.state.base, loc.lat(), loc.lng());
        let (status, body) = self.get_json::<geojson::point::Response>(&url)?;
        let point = body
            .map_err(|e| Error::malformed(&url, e))
            .and_then(|res| res.to_point(self).map_err(|reason| Error::malformed(&url, reason)));
        settle(&url, status, point)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<(StatusCode, serde_json::Result<T>)> {
        debug!(url, "GET");
        let res = self
            .state
            .client
            .get(url)
            .header(USER_AGENT, &self.state.ua)
            .header(ACCEPT, GEO_JSON)
            .send()
            .map_err(|e| Error::unavailable(url, e))?;
        let status = res.status();
        let text = res.text().map_err(|e| Error::unavailable(url, e))?;
        debug!(url, %status, bytes = text.len(), "response");
        Ok((status, serde_json::from_str(&text)))
    }
}

// Only a 200 counts as success. Anything else is reported as unavailable
// unless the body still carried what the caller needs.
fn settle<T>(url: &str, status: StatusCode, decoded: Result<T>) -> Result<Fetched<T>> {
    match decoded {
        Ok(value) => {
            if status != StatusCode::OK {
                warn!(url, %status, "non-200 response still carried a usable body");
            }
            Ok(Fetched {
                url: url.to_string(),
                status,
                value,
            })
        }
        Err(_) if status != StatusCode::OK => {
            Err(Error::unavailable(url, format!("HTTP {}", status)))
        }
        Err(e) => Err(e),
    }
}

/// Forecast point metadata returned by `/points/{lat},{lon}`.
#[derive(Debug)]
pub struct Point {
    client: Client,
    forecast_url: String,
    relative_location: RelativeLocation,
}

impl Point {
    pub fn relative_location(&self) -> &RelativeLocation {
        &self.relative_location
    }

    /// Fetches the multi-period forecast, sorted by period number.
    pub fn get_forecast(&self) -> Result<Fetched<Vec<Period>>> {
        let url = &self.forecast_url;
        let (status, body) = self.client.get_json::<geojson::forecast::Response>(url)?;
        let periods = body
            .map_err(|e| Error::malformed(url, e))
            .and_then(|res| res.to_periods().map_err(|reason| Error::malformed(url, reason)))
            .map(|mut periods| {
                periods.sort_by_key(|p| p.number);
                periods
            });
        settle(url, status, periods)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelativeLocation {
    city: String,
    state: String,
    distance: Option<Distance>,
    bearing: Option<Bearing>,
}

impl RelativeLocation {
    pub fn new(city: &str, state: &str) -> RelativeLocation {
        RelativeLocation {
            city: city.to_string(),
            state: state.to_string(),
            distance: None,
            bearing: None,
        }
    }

    pub fn with_offset(mut self, distance: Distance, bearing: Bearing) -> RelativeLocation {
        self.distance = Some(distance);
        self.bearing = Some(bearing);
        self
    }

    pub fn distance(&self) -> Option<Distance> {
        self.distance
    }

    pub fn bearing(&self) -> Option<Bearing> {
        self.bearing
    }

    pub fn label(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub number: u32,
    pub name: String,
    pub icon: String,
    pub short_forecast: String,
    pub detailed_forecast: String,
    pub temperature: f64,
    pub temperature_unit: String,
    pub is_daytime: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    lat: f64,
    lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Location {
        Location { lat, lng }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn to_dms(&self) -> String {
        let (lat_d, lat_m, lat_s) = to_dms(self.lat);
        let (lng_d, lng_m, lng_s) = to_dms(self.lng);
        format!(
            "{:02}°{:02}′{:02}″{} {:03}°{:02}′{:02}″{}",
            lat_d,
            lat_m,
            lat_s,
            if self.lat < 0.0 { 'S' } else { 'N' },
            lng_d,
            lng_m,
            lng_s,
            if self.lng < 0.0 { 'W' } else { 'E' }
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dms())
    }
}

/// Accepts either decimal degrees (`35.99, -78.89`) or the DMS form produced
/// by `Display` (`35°59′39″N 078°53′55″W`).
impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidLocation(s.to_string());

        let loc = if let Some(caps) = DECIMAL_PATTERN.captures(s) {
            let lat = caps[1].parse::<f64>().map_err(|_| invalid())?;
            let lng = caps[2].parse::<f64>().map_err(|_| invalid())?;
            Location { lat, lng }
        } else {
            let caps = DMS_PATTERN.captures(s).ok_or_else(invalid)?;
            let part = |i: usize| caps[i].parse::<i32>().map_err(|_| invalid());

            let lat_v = from_dms(part(1)?, part(2)?, part(3)?);
            let lat = match &caps[4] {
                "N" | "n" => lat_v,
                _ => -lat_v,
            };

            let lng_v = from_dms(part(5)?, part(6)?, part(7)?);
            let lng = match &caps[8] {
                "E" | "e" => lng_v,
                _ => -lng_v,
            };
            Location { lat, lng }
        };

        if loc.is_valid() {
            Ok(loc)
        } else {
            Err(invalid())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distance {
    m: f64,
}

impl Distance {
    pub fn from_meters(m: f64) -> Distance {
        Distance { m }
    }

    pub fn in_kilometers(&self) -> f64 {
        self.m / 1000.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.1} km", self.in_kilometers())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bearing {
    deg: f64,
}

impl Bearing {
    pub fn from_degrees(deg: f64) -> Bearing {
        Bearing {
            deg: deg.rem_euclid(360.0),
        }
    }

    /// Nearest of the sixteen compass points.
    pub fn compass_point(&self) -> &'static str {
        const POINTS: [&str; 16] = [
            "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
            "NW", "NNW",
        ];
        let i = (self.deg / 22.5).round() as usize % POINTS.len();
        POINTS[i]
    }
}

impl fmt::Display for Bearing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.compass_point())
    }
}

fn from_dms(d: i32, m: i32, s: i32) -> f64 {
    d as f64 + (m as f64) / 60.0 + (s as f64) / 3600.0
}

fn to_dms(v: f64) -> (i32, i32, i32) {
    let v = v.abs();

    let mut d = v as i32;

    let v = v - d as f64;

    let mut m = (v * 60.0) as i32;

    let v = v - m as f64 / 60.0;

    let mut s = (v * 3600.0).round() as i32;

    if s == 60 {
        s = 0;
        m += 1;
    }

    if m == 60 {
        m = 0;
        d += 1;
    }

    (d, m, s)
}
