//! Query models: filter criteria, facet histograms and paged results.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::vehicles_model::{parse_amount, Condition, VehicleRecord};
use crate::constants::DEFAULT_PAGE_LIMIT;
use crate::errors::{Error, ValidationError};
use crate::Result;

/// Recognized search criteria.
///
/// Set-valued criteria pass a record when its field is one of the given
/// values; an empty set places no constraint. Everything is ANDed together
/// except `conditions`, which is ORed internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    /// Case-insensitive exact match on `Make`
    pub make: Option<String>,
    pub years: Vec<String>,
    pub models: Vec<String>,
    pub body_styles: Vec<String>,
    pub fuel_types: Vec<String>,
    pub drivetrains: Vec<String>,
    pub transmissions: Vec<String>,
    pub engines: Vec<String>,
    pub exterior_colors: Vec<String>,
    pub interior_colors: Vec<String>,
    pub conditions: Vec<Condition>,
    /// When set, only vehicles tagged in transit pass
    pub show_in_transit: bool,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub mileage_min: Option<i64>,
    pub mileage_max: Option<i64>,
    /// 1-based page number
    pub page: usize,
    pub limit: usize,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            make: None,
            years: Vec::new(),
            models: Vec::new(),
            body_styles: Vec::new(),
            fuel_types: Vec::new(),
            drivetrains: Vec::new(),
            transmissions: Vec::new(),
            engines: Vec::new(),
            exterior_colors: Vec::new(),
            interior_colors: Vec::new(),
            conditions: Vec::new(),
            show_in_transit: false,
            price_min: None,
            price_max: None,
            mileage_min: None,
            mileage_max: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl FilterSpec {
    /// Builds criteria from decoded query-string pairs.
    ///
    /// Multi-valued criteria accept repeated keys, with or without a `[]`
    /// suffix. Empty values are ignored. Unknown keys are ignored so callers
    /// can pass presentation parameters through. Numeric bounds use the
    /// lenient parse of [`parse_amount`], so an unparsable bound compares
    /// as 0.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut spec = FilterSpec::default();

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            let key = key.strip_suffix("[]").unwrap_or(key);

            match key {
                "make" => spec.make = Some(value.to_string()),
                "year" | "years" => spec.years.push(value.to_string()),
                "model" | "models" => spec.models.push(value.to_string()),
                "bodyStyles" => spec.body_styles.push(value.to_string()),
                "fuelTypes" => spec.fuel_types.push(value.to_string()),
                "drivetrains" => spec.drivetrains.push(value.to_string()),
                "transmissions" => spec.transmissions.push(value.to_string()),
                "engines" => spec.engines.push(value.to_string()),
                "exteriorColors" => spec.exterior_colors.push(value.to_string()),
                "interiorColors" => spec.interior_colors.push(value.to_string()),
                "conditions" => spec.conditions.push(value.parse()?),
                "showInTransit" => spec.show_in_transit = parse_flag(key, value)?,
                "priceMin" => spec.price_min = Some(parse_amount(value)),
                "priceMax" => spec.price_max = Some(parse_amount(value)),
                "mileageMin" => spec.mileage_min = Some(parse_amount(value)),
                "mileageMax" => spec.mileage_max = Some(parse_amount(value)),
                "page" => spec.page = parse_positive(key, value)?,
                "limit" => spec.limit = parse_positive(key, value)?,
                _ => {}
            }
        }

        Ok(spec)
    }

    /// Rejects paging values the engine cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(ValidationError::invalid("page", "0").into());
        }
        if self.limit == 0 {
            return Err(ValidationError::invalid("limit", "0").into());
        }
        Ok(())
    }

    /// Offset of the first record on the requested page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

fn parse_positive(field: &str, value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(Error::Validation(ValidationError::invalid(field, value))),
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::Validation(ValidationError::invalid(field, value))),
    }
}

/// Occurrence counts per distinct value, ordered by descending count.
///
/// Serializes as a JSON object whose key order is the rank order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facet {
    entries: Vec<(String, usize)>,
}

impl Facet {
    /// Counts values and keeps the `top` most frequent ones. Ties keep the
    /// order in which values were first encountered.
    pub fn top<'a>(values: impl IntoIterator<Item = &'a str>, top: usize) -> Self {
        let mut positions: std::collections::HashMap<&'a str, usize> =
            std::collections::HashMap::new();
        let mut entries: Vec<(String, usize)> = Vec::new();

        for value in values {
            match positions.get(value) {
                Some(&idx) => entries[idx].1 += 1,
                None => {
                    positions.insert(value, entries.len());
                    entries.push((value.to_string(), 1));
                }
            }
        }

        // sort_by is stable, so equal counts stay in first-seen order
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(top);
        Self { entries }
    }

    pub fn get(&self, value: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(v, c)| (v.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the retained counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }
}

impl Serialize for Facet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (value, count) in &self.entries {
            map.serialize_entry(value, count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionCounts {
    pub new: usize,
    pub pre_owned: usize,
    pub certified: usize,
}

/// Facet histograms over the whole, unfiltered inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCounts {
    pub condition: ConditionCounts,
    pub year: Facet,
    pub make: Facet,
    pub model: Facet,
    pub body_style: Facet,
    pub fuel_type: Facet,
    pub drivetrain: Facet,
    pub transmission: Facet,
    pub engine: Facet,
}

/// One page of matching vehicles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub data: Vec<VehicleRecord>,
    /// Matches before pagination
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub filter_counts: FilterCounts,
}
