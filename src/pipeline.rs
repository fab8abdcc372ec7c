use crate::error::Error;
use crate::geocode::{Geocoder, Resolver};
use crate::nws::{Client, Location};
use crate::present::{present, Page};
use tracing::{info, warn};

pub const BAD_ADDRESS: &str = "Bad address entered. Try a zipcode or a more specific address.";
pub const PICKING_RANDOM: &str = "...Picking random address...";
pub const UNAVAILABLE: &str =
    "Service is currently unavailable to try a different address or refresh the page";

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Warning(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Info(m) | Notice::Warning(m) => m,
        }
    }

    /// The user-facing notices for a pipeline condition.
    pub fn for_error(err: &Error) -> Vec<Notice> {
        match err {
            Error::AddressUnresolved { .. } => vec![
                Notice::Info(BAD_ADDRESS.to_string()),
                Notice::Warning(PICKING_RANDOM.to_string()),
            ],
            Error::UpstreamUnavailable { .. } => vec![Notice::Warning(UNAVAILABLE.to_string())],
            Error::MalformedResponse { reason, .. } => vec![Notice::Warning(format!(
                "Unexpected response from the forecast service: {}",
                reason
            ))],
            Error::InvalidLocation(_) => vec![Notice::Info(BAD_ADDRESS.to_string())],
            Error::Client(_) => vec![Notice::Warning(UNAVAILABLE.to_string())],
        }
    }
}

/// Everything one run produced. `page` is `None` when the run stopped early.
#[derive(Debug)]
pub struct Report {
    pub location: Location,
    pub fallback: bool,
    pub notices: Vec<Notice>,
    pub errors: Vec<Error>,
    pub page: Option<Page>,
}

impl Report {
    fn new(location: Location, fallback: bool) -> Report {
        Report {
            location,
            fallback,
            notices: Vec::new(),
            errors: Vec::new(),
            page: None,
        }
    }

    fn record(&mut self, err: Error) {
        warn!(error = %err, "forecast run condition");
        self.notices.extend(Notice::for_error(&err));
        self.errors.push(err);
    }

    pub fn rows(&self) -> usize {
        self.page.as_ref().map_or(0, |p| p.rows.len())
    }
}

/// Resolve `address`, fetch its forecast and present it. Never fails: every
/// condition ends up as a notice on the report.
pub fn run<G: Geocoder>(resolver: &Resolver<G>, client: &Client, address: &str) -> Report {
    let resolution = resolver.resolve(address);
    let mut report = Report::new(resolution.location(), resolution.is_fallback());
    if resolution.is_fallback() {
        report.record(Error::AddressUnresolved {
            address: address.to_string(),
        });
        report
            .notices
            .push(Notice::Info(format!("Using {}", report.location)));
    }

    let point = match client.get_point(&report.location) {
        Ok(point) => point,
        Err(e) => {
            report.record(e);
            return report;
        }
    };
    if point.is_degraded() {
        report.record(Error::unavailable(point.url(), format!("HTTP {}", point.status())));
    }

    let periods = match point.value().get_forecast() {
        Ok(periods) => periods,
        Err(e) => {
            report.record(e);
            return report;
        }
    };
    if periods.is_degraded() {
        report.record(Error::unavailable(
            periods.url(),
            format!("HTTP {}", periods.status()),
        ));
    }

    let page = present(point.value(), periods.value());
    info!(
        location = %page.title,
        periods = page.rows.len(),
        "forecast ready"
    );
    report.page = Some(page);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_address_yields_info_then_warning() {
        let notices = Notice::for_error(&Error::AddressUnresolved {
            address: "x".to_string(),
        });
        assert_eq!(
            notices,
            vec![
                Notice::Info(BAD_ADDRESS.to_string()),
                Notice::Warning(PICKING_RANDOM.to_string())
            ]
        );
    }

    #[test]
    fn malformed_response_names_the_missing_key() {
        let notices = Notice::for_error(&Error::malformed("u", "missing `properties.forecast`"));
        assert_eq!(notices.len(), 1);
        assert!(matches!(notices[0], Notice::Warning(_)));
        assert!(notices[0].message().contains("properties.forecast"));
    }

    #[test]
    fn setup_errors_map_to_notices() {
        let notices = Notice::for_error(&Error::InvalidLocation("91, 0".to_string()));
        assert_eq!(notices, vec![Notice::Info(BAD_ADDRESS.to_string())]);
    }

    #[test]
    fn fallback_run_announces_the_picked_location() {
        let resolver = Resolver::new(|_: &str| crate::geocode::Geocoded::Unresolved);
        // Nothing listens on port 1, so the run stops after the points call.
        let client = Client::new("nws-forecast-tests", "http://127.0.0.1:1", None).unwrap();

        let report = run(&resolver, &client, "nowhere");

        assert!(report.fallback);
        assert_eq!(
            report.notices[..3],
            [
                Notice::Info(BAD_ADDRESS.to_string()),
                Notice::Warning(PICKING_RANDOM.to_string()),
                Notice::Info(format!("Using {}", report.location)),
            ]
        );
        assert_eq!(report.notices[3], Notice::Warning(UNAVAILABLE.to_string()));
    }
}
