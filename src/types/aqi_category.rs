//! Defines the `AqiCategory` enum, mapping OpenWeatherMap's Air Quality Index
//! codes to descriptive labels.

/// Label used for any AQI value outside the 1..=5 range, including the
/// fill sentinel written for missing readings.
pub const UNKNOWN_AQI_LABEL: &str = "Unknown";

/// Air Quality Index category reported by the air pollution endpoint.
///
/// See the [OpenWeatherMap documentation](https://openweathermap.org/api/air-pollution)
/// for the official index definitions.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AqiCategory {
    /// Index 1.
    Good = 1,
    /// Index 2.
    Fair = 2,
    /// Index 3.
    Moderate = 3,
    /// Index 4.
    Poor = 4,
    /// Index 5.
    VeryPoor = 5,
}

impl AqiCategory {
    /// Converts an integer index into an `AqiCategory`.
    ///
    /// Returns `None` for anything outside 1..=5.
    ///
    /// # Examples
    ///
    /// ```
    /// use weather_etl::AqiCategory;
    ///
    /// assert_eq!(AqiCategory::from_i64(3), Some(AqiCategory::Moderate));
    /// assert_eq!(AqiCategory::from_i64(0), None);
    /// assert_eq!(AqiCategory::from_i64(-1), None);
    /// ```
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(AqiCategory::Good),
            2 => Some(AqiCategory::Fair),
            3 => Some(AqiCategory::Moderate),
            4 => Some(AqiCategory::Poor),
            5 => Some(AqiCategory::VeryPoor),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Fair => "Fair",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
        }
    }

    /// Label for a raw (possibly missing) index; "Unknown" unless it is within 1..=5.
    pub fn describe(value: Option<i64>) -> &'static str {
        value
            .and_then(AqiCategory::from_i64)
            .map_or(UNKNOWN_AQI_LABEL, |category| category.label())
    }
}
