use crate::nws::{Period, Point, RelativeLocation};

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub title: String,
    pub subtitle: Option<String>,
    pub rows: Vec<DisplayRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub number: u32,
    pub name: String,
    pub icon: String,
    pub short_forecast: String,
    pub detailed_forecast: String,
    pub high_low: &'static str,
    pub temperature: f64,
    pub temperature_unit: String,
}

impl DisplayRow {
    pub fn from_period(period: &Period) -> DisplayRow {
        DisplayRow {
            number: period.number,
            name: period.name.clone(),
            icon: period.icon.clone(),
            short_forecast: period.short_forecast.clone(),
            detailed_forecast: period.detailed_forecast.clone(),
            high_low: if period.is_daytime { "High: " } else { "Low: " },
            temperature: period.temperature,
            temperature_unit: period.temperature_unit.clone(),
        }
    }

    /// `75 F`
    pub fn temperature_text(&self) -> String {
        format!("{} {}", self.temperature, self.temperature_unit)
    }
}

pub fn present(point: &Point, periods: &[Period]) -> Page {
    present_location(point.relative_location(), periods)
}

pub fn present_location(rel: &RelativeLocation, periods: &[Period]) -> Page {
    let mut rows: Vec<DisplayRow> = periods.iter().map(DisplayRow::from_period).collect();
    rows.sort_by_key(|r| r.number);

    let subtitle = match (rel.distance(), rel.bearing()) {
        (Some(distance), Some(bearing)) => {
            Some(format!("{} {} of {}", distance, bearing, rel.label()))
        }
        _ => None,
    };

    Page {
        title: rel.label(),
        subtitle,
        rows,
    }
}
