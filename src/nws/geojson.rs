use super::{Bearing, Client, Distance, Period, Point, RelativeLocation};

// Fields the forecast cannot do without are `Option` here so that a missing
// key is reported by name instead of as a generic decode failure.

pub mod point {
    use super::{Bearing, Client, Distance, Point, RelativeLocation};
    use serde_derive::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct Response {
        properties: Option<Properties>,
    }

    impl Response {
        pub fn to_point(self, client: &Client) -> Result<Point, &'static str> {
            let props = self.properties.ok_or("missing `properties`")?;
            let forecast_url = props
                .forecast
                .filter(|url| !url.is_empty())
                .ok_or("missing `properties.forecast`")?;
            let rel = props
                .relative_location
                .and_then(|r| r.properties)
                .ok_or("missing `properties.relativeLocation.properties`")?;
            let city = rel
                .city
                .ok_or("missing `properties.relativeLocation.properties.city`")?;
            let state = rel
                .state
                .ok_or("missing `properties.relativeLocation.properties.state`")?;

            let mut relative_location = RelativeLocation::new(&city, &state);
            let distance = rel.distance.and_then(|d| d.meters());
            let bearing = rel.bearing.and_then(|b| b.degrees());
            if let (Some(distance), Some(bearing)) = (distance, bearing) {
                relative_location = relative_location
                    .with_offset(Distance::from_meters(distance), Bearing::from_degrees(bearing));
            }

            Ok(Point {
                client: client.clone(),
                forecast_url,
                relative_location,
            })
        }
    }

    #[derive(Debug, Deserialize)]
    struct Properties {
        forecast: Option<String>,
        #[serde(rename = "relativeLocation")]
        relative_location: Option<Feature>,
    }

    #[derive(Debug, Deserialize)]
    struct Feature {
        properties: Option<RelativeProperties>,
    }

    #[derive(Debug, Deserialize)]
    struct RelativeProperties {
        city: Option<String>,
        state: Option<String>,
        distance: Option<Measure>,
        bearing: Option<Measure>,
    }

    #[derive(Debug, Deserialize)]
    struct Measure {
        value: Option<f64>,
        #[serde(rename = "unitCode")]
        unit: Option<String>,
    }

    impl Measure {
        fn unit_is(&self, suffix: &str) -> bool {
            self.unit.as_deref().is_some_and(|u| u.ends_with(suffix))
        }

        fn meters(&self) -> Option<f64> {
            if self.unit_is(":m") {
                self.value
            } else {
                None
            }
        }

        fn degrees(&self) -> Option<f64> {
            if self.unit_is(":degree_(angle)") {
                self.value
            } else {
                None
            }
        }
    }
}

pub mod forecast {
    use super::Period;
    use serde_derive::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct Response {
        properties: Option<Properties>,
    }

    impl Response {
        pub fn to_periods(self) -> Result<Vec<Period>, &'static str> {
            let periods = self
                .properties
                .ok_or("missing `properties`")?
                .periods
                .ok_or("missing `properties.periods`")?;
            Ok(periods.into_iter().map(Entry::into_period).collect())
        }
    }

    #[derive(Debug, Deserialize)]
    struct Properties {
        periods: Option<Vec<Entry>>,
    }

    #[derive(Debug, Deserialize)]
    struct Entry {
        number: u32,
        name: String,
        icon: String,
        #[serde(rename = "shortForecast")]
        short_forecast: String,
        #[serde(rename = "detailedForecast")]
        detailed_forecast: String,
        temperature: f64,
        #[serde(rename = "temperatureUnit")]
        temperature_unit: String,
        #[serde(rename = "isDaytime")]
        is_daytime: bool,
    }

    impl Entry {
        fn into_period(self) -> Period {
            Period {
                number: self.number,
                name: self.name,
                icon: self.icon,
                short_forecast: self.short_forecast,
                detailed_forecast: self.detailed_forecast,
                temperature: self.temperature,
                temperature_unit: self.temperature_unit,
                is_daytime: self.is_daytime,
            }
        }
    }
}
