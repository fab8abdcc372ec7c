//! Turning free-text addresses into coordinates.
//!
//! The geocoding service is treated as unreliable: whatever it answers is
//! collapsed into [`Geocoded`] at the boundary, and the [`Resolver`] covers the
//! `Unresolved` case with a random coordinate inside the NWS service area.

use crate::error::{Error, Result};
use crate::nws::{http_client, Location};
use rand::Rng;
use reqwest::blocking;
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use serde_derive::Deserialize;
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

/// Latitude band of the fallback box, roughly the continental US.
pub const FALLBACK_LAT: RangeInclusive<f64> = 30.0..=55.0;
/// Longitude band of the fallback box.
pub const FALLBACK_LNG: RangeInclusive<f64> = -120.0..=-70.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geocoded {
    Resolved(Location),
    Unresolved,
}

pub trait Geocoder {
    fn geocode(&self, address: &str) -> Geocoded;
}

impl<F> Geocoder for F
where
    F: Fn(&str) -> Geocoded,
{
    fn geocode(&self, address: &str) -> Geocoded {
        self(address)
    }
}

/// OpenStreetMap Nominatim search.
#[derive(Debug)]
pub struct Nominatim {
    ua: String,
    base: String,
    client: blocking::Client,
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

impl Place {
    fn to_location(&self) -> Option<Location> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lng = self.lon.trim().parse::<f64>().ok()?;
        Some(Location::new(lat, lng)).filter(Location::is_valid)
    }
}

impl Nominatim {
    pub fn new(ua: &str, base: &str, timeout: Option<Duration>) -> Result<Nominatim> {
        Ok(Nominatim {
            ua: ua.to_string(),
            base: base.trim_end_matches('/').to_string(),
            client: http_client(timeout)?,
        })
    }

    fn search(&self, address: &str) -> Result<Vec<Place>> {
        let endpoint = format!("{}/search", self.base);
        let mut url = url::Url::parse(&endpoint).map_err(|e| Error::unavailable(&endpoint, e))?;
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("format", "json")
            .append_pair("limit", "1");

        let res = self
            .client
            .get(url)
            .header(USER_AGENT, &self.ua)
            .send()
            .map_err(|e| Error::unavailable(&endpoint, e))?;
        if res.status() != StatusCode::OK {
            return Err(Error::unavailable(&endpoint, format!("HTTP {}", res.status())));
        }
        res.json::<Vec<Place>>()
            .map_err(|e| Error::malformed(&endpoint, e))
    }
}

impl Geocoder for Nominatim {
    fn geocode(&self, address: &str) -> Geocoded {
        if address.trim().is_empty() {
            return Geocoded::Unresolved;
        }
        match self.search(address) {
            Ok(places) => match places.first().and_then(|p| p.to_location().map(|l| (p, l))) {
                Some((place, loc)) => {
                    debug!(
                        address,
                        place = place.display_name.as_deref().unwrap_or(""),
                        lat = loc.lat(),
                        lng = loc.lng(),
                        "geocoded"
                    );
                    Geocoded::Resolved(loc)
                }
                None => {
                    debug!(address, results = places.len(), "no usable geocoding result");
                    Geocoded::Unresolved
                }
            },
            Err(e) => {
                warn!(address, error = %e, "geocoding failed");
                Geocoded::Unresolved
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    location: Location,
    fallback: bool,
}

impl Resolution {
    pub fn location(&self) -> Location {
        self.location
    }

    /// True when the address could not be geocoded and a random location was
    /// picked instead.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

pub struct Resolver<G> {
    geocoder: G,
}

impl<G: Geocoder> Resolver<G> {
    pub fn new(geocoder: G) -> Resolver<G> {
        Resolver { geocoder }
    }

    pub fn resolve(&self, address: &str) -> Resolution {
        self.resolve_with(address, &mut rand::thread_rng())
    }

    pub fn resolve_with<R: Rng + ?Sized>(&self, address: &str, rng: &mut R) -> Resolution {
        // Coordinates typed straight into the address box skip the geocoder.
        if let Ok(location) = address.parse::<Location>() {
            debug!(address, "address is already a coordinate");
            return Resolution {
                location,
                fallback: false,
            };
        }

        match self.geocoder.geocode(address) {
            Geocoded::Resolved(location) if location.is_valid() => Resolution {
                location,
                fallback: false,
            },
            _ => {
                let location = random_location(rng);
                info!(address, %location, "address unresolved, picked a random location");
                Resolution {
                    location,
                    fallback: true,
                }
            }
        }
    }
}

pub fn random_location<R: Rng + ?Sized>(rng: &mut R) -> Location {
    Location::new(rng.gen_range(FALLBACK_LAT), rng.gen_range(FALLBACK_LNG))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;

    fn in_fallback_box(loc: Location) -> bool {
        FALLBACK_LAT.contains(&loc.lat()) && FALLBACK_LNG.contains(&loc.lng())
    }

    #[test]
    fn resolved_address_is_used_as_is() {
        let durham = Location::new(35.994, -78.8986);
        let resolver = Resolver::new(move |_: &str| Geocoded::Resolved(durham));
        let res = resolver.resolve("Durham, NC");
        assert_eq!(res.location(), durham);
        assert!(!res.is_fallback());
    }

    #[test]
    fn unresolved_address_falls_back_inside_the_box() {
        let resolver = Resolver::new(|_: &str| Geocoded::Unresolved);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let res = resolver.resolve_with("nowhere at all", &mut rng);
            assert!(res.is_fallback());
            assert!(in_fallback_box(res.location()), "{:?}", res.location());
        }
    }

    #[test]
    fn invalid_geocoder_result_is_treated_as_unresolved() {
        let resolver = Resolver::new(|_: &str| Geocoded::Resolved(Location::new(f64::NAN, 0.0)));
        let res = resolver.resolve("somewhere");
        assert!(res.is_fallback());
        assert!(in_fallback_box(res.location()));
    }

    #[test]
    fn coordinate_text_skips_the_geocoder() {
        let calls = Cell::new(0);
        let resolver = Resolver::new(|_: &str| {
            calls.set(calls.get() + 1);
            Geocoded::Unresolved
        });
        let res = resolver.resolve("35.99, -78.89");
        assert_eq!(res.location(), Location::new(35.99, -78.89));
        assert!(!res.is_fallback());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn place_with_bad_coordinates_has_no_location() {
        let place = Place {
            lat: "north".to_string(),
            lon: "-78.9".to_string(),
            display_name: None,
        };
        assert_eq!(place.to_location(), None);

        let place = Place {
            lat: " 35.99 ".to_string(),
            lon: "-78.9".to_string(),
            display_name: Some("Durham".to_string()),
        };
        assert_eq!(place.to_location(), Some(Location::new(35.99, -78.9)));
    }
}
