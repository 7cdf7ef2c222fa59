//! Vehicle domain models.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{CERTIFIED_MARKER, IN_TRANSIT_TAG, NEW_MARKER, USED_MARKER};
use crate::errors::{Error, ValidationError};
use crate::Result;

/// Column names of the backing dataset.
pub mod columns {
    pub const MAKE: &str = "Make";
    pub const MODEL: &str = "Model";
    pub const YEAR: &str = "Year";
    pub const SERIES: &str = "Series";
    pub const PRICE: &str = "Price";
    pub const OTHER_PRICE: &str = "Other Price";
    pub const PHOTO_URL_LIST: &str = "Photo Url List";
    pub const VIN: &str = "VIN";
    pub const DEALER_NAME: &str = "Dealer Name";
    pub const DEALER_CITY: &str = "Dealer City";
    pub const DEALER_ADDRESS: &str = "Dealer Address";
    pub const STATUS: &str = "Status";
    pub const BODY: &str = "Body";
    pub const DRIVETRAIN: &str = "Drivetrain Desc";
    pub const ODOMETER: &str = "Odometer";
    pub const NEW_USED: &str = "New/Used";
    pub const VEHICLE: &str = "Vehicle";
    pub const INTERIOR_COLOR: &str = "Interior Color";
    pub const COLOUR: &str = "Colour";
    pub const FUEL: &str = "Fuel";
    pub const TRANSMISSION: &str = "Transmission";
    pub const ENGINE: &str = "Engine";
    pub const CERTIFIED: &str = "Certified";
    pub const STOCK_NUMBER: &str = "Stock #";
    pub const CITY_MPG: &str = "City MPG";
    pub const HIGHWAY_MPG: &str = "Highway MPG";
    pub const COMMENTS: &str = "Comments";
    pub const TAGS: &str = "Tags";
}

/// One row of the inventory dataset.
///
/// Serialized under the dataset's own column names so the front end can keep
/// addressing fields like `"New/Used"` and `"Photo Url List"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(rename = "VIN")]
    pub vin: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Make")]
    pub make: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Series")]
    pub series: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "Drivetrain Desc")]
    pub drivetrain: String,
    #[serde(rename = "Fuel")]
    pub fuel: String,
    #[serde(rename = "Transmission")]
    pub transmission: String,
    #[serde(rename = "Engine")]
    pub engine: String,
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "Other Price")]
    pub other_price: String,
    #[serde(rename = "Odometer")]
    pub odometer: String,
    #[serde(rename = "New/Used")]
    pub new_used: String,
    #[serde(rename = "Certified")]
    pub certified: String,
    #[serde(rename = "Tags")]
    pub tags: String,
    #[serde(rename = "Photo Url List")]
    pub photo_url_list: String,
    #[serde(rename = "Vehicle")]
    pub vehicle: String,
    #[serde(rename = "Colour")]
    pub colour: String,
    #[serde(rename = "Interior Color")]
    pub interior_color: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Stock #")]
    pub stock_number: String,
    #[serde(rename = "City MPG")]
    pub city_mpg: String,
    #[serde(rename = "Highway MPG")]
    pub highway_mpg: String,
    #[serde(rename = "Dealer Name")]
    pub dealer_name: String,
    #[serde(rename = "Dealer City")]
    pub dealer_city: String,
    #[serde(rename = "Dealer Address")]
    pub dealer_address: String,
    #[serde(rename = "Comments")]
    pub comments: String,
}

impl VehicleRecord {
    /// Builds a record from a parsed row. Returns `None` for rows without a
    /// VIN since they cannot be addressed.
    pub fn from_row(index: &ColumnIndex, row: &[String]) -> Option<Self> {
        let vin = index.value(row, columns::VIN);
        if vin.is_empty() {
            return None;
        }

        Some(Self {
            vin,
            year: index.value(row, columns::YEAR),
            make: index.value(row, columns::MAKE),
            model: index.value(row, columns::MODEL),
            series: index.value(row, columns::SERIES),
            body: index.value(row, columns::BODY),
            drivetrain: index.value(row, columns::DRIVETRAIN),
            fuel: index.value(row, columns::FUEL),
            transmission: index.value(row, columns::TRANSMISSION),
            engine: index.value(row, columns::ENGINE),
            price: normalize_numeric(&index.value(row, columns::PRICE)),
            other_price: normalize_numeric(&index.value(row, columns::OTHER_PRICE)),
            odometer: normalize_numeric(&index.value(row, columns::ODOMETER)),
            new_used: index.value(row, columns::NEW_USED),
            certified: index.value(row, columns::CERTIFIED),
            tags: index.value(row, columns::TAGS),
            photo_url_list: index.value(row, columns::PHOTO_URL_LIST),
            vehicle: index.value(row, columns::VEHICLE),
            colour: index.value(row, columns::COLOUR),
            interior_color: index.value(row, columns::INTERIOR_COLOR),
            status: index.value(row, columns::STATUS),
            stock_number: index.value(row, columns::STOCK_NUMBER),
            city_mpg: index.value(row, columns::CITY_MPG),
            highway_mpg: index.value(row, columns::HIGHWAY_MPG),
            dealer_name: index.value(row, columns::DEALER_NAME),
            dealer_city: index.value(row, columns::DEALER_CITY),
            dealer_address: index.value(row, columns::DEALER_ADDRESS),
            comments: index.value(row, columns::COMMENTS),
        })
    }

    pub fn price_value(&self) -> i64 {
        parse_amount(&self.price)
    }

    pub fn mileage(&self) -> i64 {
        parse_amount(&self.odometer)
    }

    pub fn is_new(&self) -> bool {
        self.new_used == NEW_MARKER
    }

    pub fn is_pre_owned(&self) -> bool {
        self.new_used == USED_MARKER
    }

    pub fn is_certified(&self) -> bool {
        self.certified == CERTIFIED_MARKER
    }

    pub fn matches_condition(&self, condition: Condition) -> bool {
        match condition {
            Condition::New => self.is_new(),
            Condition::PreOwned => self.is_pre_owned(),
            Condition::Certified => self.is_certified(),
        }
    }

    /// `Tags` is delimited by `|` or `,`.
    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags
            .split(['|', ','])
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn is_in_transit(&self) -> bool {
        self.tag_list()
            .any(|t| t.eq_ignore_ascii_case(IN_TRANSIT_TAG))
    }

    /// Serializes the record keeping only the requested columns. Unknown
    /// column names are ignored.
    pub fn project(&self, fields: &[String]) -> Result<serde_json::Map<String, serde_json::Value>> {
        let value = serde_json::to_value(self).map_err(|e| Error::Unexpected(e.to_string()))?;
        let serde_json::Value::Object(mut full) = value else {
            return Err(Error::Unexpected(
                "vehicle record did not serialize to an object".to_string(),
            ));
        };

        let mut projected = serde_json::Map::new();
        for field in fields {
            if let Some(v) = full.remove(field.as_str()) {
                projected.insert(field.clone(), v);
            }
        }
        Ok(projected)
    }
}

/// Maps header names to column positions for a parsed dataset.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    /// Fails when a column required for lookups is absent from the header.
    pub fn new(headers: &[String]) -> Result<Self> {
        let mut positions = HashMap::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            // First occurrence wins on duplicate headers
            positions.entry(header.trim().to_string()).or_insert(idx);
        }

        for required in [columns::VIN, columns::YEAR] {
            if !positions.contains_key(required) {
                return Err(Error::Parse(format!(
                    "required column '{}' is missing from the header",
                    required
                )));
            }
        }

        Ok(Self { positions })
    }

    fn value(&self, row: &[String], column: &str) -> String {
        self.positions
            .get(column)
            .and_then(|&idx| row.get(idx))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }
}

/// Vehicle condition as offered by the search filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    New,
    PreOwned,
    Certified,
}

impl FromStr for Condition {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Condition::New),
            "pre-owned" | "preowned" | "used" => Ok(Condition::PreOwned),
            "certified" => Ok(Condition::Certified),
            _ => Err(ValidationError::invalid("conditions", s)),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Condition::New => "new",
            Condition::PreOwned => "pre-owned",
            Condition::Certified => "certified",
        };
        f.write_str(label)
    }
}

/// Lenient leading-integer parse used for prices, mileage and numeric bounds.
///
/// Leading whitespace, a `$` prefix and `,` group separators are ignored.
/// Parsing stops at the first non-digit. Input without leading digits yields 0.
pub fn parse_amount(raw: &str) -> i64 {
    let cleaned = raw.trim().trim_start_matches('$');
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => {
                seen_digit = true;
                value = value
                    .saturating_mul(10)
                    .saturating_add(i64::from(c as u8 - b'0'));
            }
            ',' if seen_digit => continue,
            _ => break,
        }
    }

    if negative {
        -value
    } else {
        value
    }
}

/// Keeps amounts [`parse_amount`] reads in full as-is; anything else becomes `"0"`.
///
/// Accepted: an optional `$`, digits with optional `,` separators, and an
/// optional `.` fraction, which compares as its integer part.
fn normalize_numeric(raw: &str) -> String {
    let trimmed = raw.trim();
    let amount = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (amount, None),
    };

    let whole_ok = whole.starts_with(|c: char| c.is_ascii_digit())
        && whole.chars().all(|c| c.is_ascii_digit() || c == ',');
    let fraction_ok = fraction.map_or(true, |f| {
        !f.is_empty() && f.chars().all(|c| c.is_ascii_digit())
    });

    if whole_ok && fraction_ok {
        trimmed.to_string()
    } else {
        "0".to_string()
    }
}
