use httpmock::prelude::*;
use nws_forecast::nws::{Client, Location};
use nws_forecast::Error;
use serde_json::json;
use std::time::Duration;

const UA: &str = "nws-forecast-tests";
const POINTS_PATH: &str = "/points/35.9940,-78.8986";
const FORECAST_PATH: &str = "/gridpoints/RAH/62,64/forecast";

fn durham() -> Location {
    Location::new(35.994, -78.8986)
}

fn mock_points(server: &MockServer, delay: Duration) {
    server.mock(|when, then| {
        when.method(GET).path(POINTS_PATH);
        then.status(200).delay(delay).json_body(json!({
            "properties": {
                "forecast": server.url(FORECAST_PATH),
                "relativeLocation": { "properties": { "city": "Durham", "state": "NC" } }
            }
        }));
    });
}

fn period(number: u32, name: &str) -> serde_json::Value {
    json!({
        "number": number,
        "name": name,
        "isDaytime": number % 2 == 1,
        "temperature": 70,
        "temperatureUnit": "F",
        "icon": "https://api.weather.gov/icons/land/day/few",
        "shortForecast": "Sunny",
        "detailedForecast": "Sunny."
    })
}

#[test]
fn get_forecast_sorts_periods_by_number() {
    let server = MockServer::start();
    mock_points(&server, Duration::ZERO);
    server.mock(|when, then| {
        when.method(GET).path(FORECAST_PATH);
        then.status(200).json_body(json!({
            "properties": {
                "periods": [period(3, "Saturday"), period(1, "Today"), period(2, "Tonight")]
            }
        }));
    });

    let client = Client::new(UA, &server.base_url(), None).unwrap();
    let point = client.get_point(&durham()).unwrap();
    assert!(!point.is_degraded());
    assert_eq!(point.value().relative_location().label(), "Durham, NC");

    let periods = point.value().get_forecast().unwrap();
    let numbers: Vec<u32> = periods.value().iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(periods.value()[0].name, "Today");
}

#[test]
fn short_timeout_cuts_off_slow_responses() {
    let server = MockServer::start();
    mock_points(&server, Duration::from_secs(2));

    let client = Client::new(UA, &server.base_url(), Some(Duration::from_millis(200))).unwrap();

    assert!(matches!(
        client.get_point(&durham()),
        Err(Error::UpstreamUnavailable { .. })
    ));
}

#[test]
fn no_timeout_waits_past_the_http_client_default() {
    let server = MockServer::start();
    // Longer than the 30s the blocking client applies when left unset.
    mock_points(&server, Duration::from_secs(32));

    let client = Client::new(UA, &server.base_url(), None).unwrap();
    let point = client.get_point(&durham()).unwrap();

    assert_eq!(point.value().relative_location().label(), "Durham, NC");
}
