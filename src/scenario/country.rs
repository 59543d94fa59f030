//! Country reference records shared read-only by every model

use serde::{Deserialize, Serialize};

/// Country reference record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryRecord {
    code: String,
    name: String,
    region: String,
    population: u64,
    gdp_trillion_usd: f64,
    military_strength: f64,
    nuclear_capable: bool,
}

impl CountryRecord {
    /// Create a new country record.
    ///
    /// # Arguments
    ///
    /// * `code` - Short country code (e.g., "USA")
    /// * `name` - Full country name
    /// * `region` - Geographic region
    /// * `population` - Total population
    /// * `gdp_trillion_usd` - GDP in trillion USD
    /// * `military_strength` - Strength score on a 0-10 scale
    /// * `nuclear_capable` - Whether the country fields nuclear weapons
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        region: impl Into<String>,
        population: u64,
        gdp_trillion_usd: f64,
        military_strength: f64,
        nuclear_capable: bool,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            region: region.into(),
            population,
            gdp_trillion_usd,
            military_strength,
            nuclear_capable,
        }
    }

    /// Get the country code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Get the country name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the region.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Get the population.
    #[must_use]
    pub const fn population(&self) -> u64 {
        self.population
    }

    /// Get GDP in trillion USD.
    #[must_use]
    pub const fn gdp_trillion_usd(&self) -> f64 {
        self.gdp_trillion_usd
    }

    /// Get the military strength score (0-10).
    #[must_use]
    pub const fn military_strength(&self) -> f64 {
        self.military_strength
    }

    /// Whether the country is nuclear capable.
    #[must_use]
    pub const fn nuclear_capable(&self) -> bool {
        self.nuclear_capable
    }
}

/// Built-in reference set used when the persistence gateway has none.
#[must_use]
pub fn default_countries() -> Vec<CountryRecord> {
    vec![
        CountryRecord::new("USA", "United States of America", "North America", 331_900_000, 26.9, 10.0, true),
        CountryRecord::new("China", "People's Republic of China", "East Asia", 1_425_671_352, 17.9, 9.0, true),
        CountryRecord::new("India", "Republic of India", "South Asia", 1_428_627_663, 3.74, 7.0, true),
        CountryRecord::new("Pakistan", "Islamic Republic of Pakistan", "South Asia", 231_402_117, 0.35, 6.0, true),
        CountryRecord::new("Russia", "Russian Federation", "Eastern Europe", 144_444_359, 2.24, 9.0, true),
        CountryRecord::new("Taiwan", "Taiwan", "East Asia", 23_500_000, 0.79, 6.0, false),
        CountryRecord::new("Japan", "Japan", "East Asia", 123_294_513, 4.21, 7.0, false),
    ]
}
