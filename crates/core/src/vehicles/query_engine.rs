//! Filtering, facet counting and pagination over an inventory snapshot.

use super::query_model::{ConditionCounts, Facet, FilterCounts, FilterSpec, QueryResult};
use super::vehicles_model::VehicleRecord;
use crate::constants::{DEFAULT_FACET_SIZE, YEAR_FACET_SIZE};

/// Whether a record passes every criterion of `spec`.
pub fn matches(record: &VehicleRecord, spec: &FilterSpec) -> bool {
    if let Some(make) = &spec.make {
        if record.make.to_lowercase() != make.to_lowercase() {
            return false;
        }
    }

    let set_criteria: [(&[String], &str); 9] = [
        (spec.years.as_slice(), record.year.as_str()),
        (spec.models.as_slice(), record.model.as_str()),
        (spec.body_styles.as_slice(), record.body.as_str()),
        (spec.fuel_types.as_slice(), record.fuel.as_str()),
        (spec.drivetrains.as_slice(), record.drivetrain.as_str()),
        (spec.transmissions.as_slice(), record.transmission.as_str()),
        (spec.engines.as_slice(), record.engine.as_str()),
        (spec.exterior_colors.as_slice(), record.colour.as_str()),
        (spec.interior_colors.as_slice(), record.interior_color.as_str()),
    ];
    if !set_criteria
        .iter()
        .all(|(allowed, value)| in_set(allowed, value))
    {
        return false;
    }

    if !spec.conditions.is_empty()
        && !spec
            .conditions
            .iter()
            .any(|c| record.matches_condition(*c))
    {
        return false;
    }

    if spec.show_in_transit && !record.is_in_transit() {
        return false;
    }

    within(record.price_value(), spec.price_min, spec.price_max)
        && within(record.mileage(), spec.mileage_min, spec.mileage_max)
}

fn in_set(allowed: &[String], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|a| a == value)
}

fn within(value: i64, min: Option<i64>, max: Option<i64>) -> bool {
    min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
}

/// Runs a query: filters in snapshot order, then slices out the page.
///
/// A page past the last match yields an empty `data`, never an error.
/// `filter_counts` describe the unfiltered inventory and are passed in so
/// they can be computed once per snapshot.
pub fn run_query(
    records: &[VehicleRecord],
    filter_counts: &FilterCounts,
    spec: &FilterSpec,
) -> QueryResult {
    let matching: Vec<&VehicleRecord> = records.iter().filter(|r| matches(r, spec)).collect();
    let total = matching.len();

    let data = matching
        .into_iter()
        .skip(spec.offset())
        .take(spec.limit)
        .cloned()
        .collect();

    QueryResult {
        data,
        total,
        page: spec.page,
        limit: spec.limit,
        total_pages: total_pages(total, spec.limit),
        filter_counts: filter_counts.clone(),
    }
}

/// `ceil(total / limit)`; zero when `limit` is zero.
pub fn total_pages(total: usize, limit: usize) -> usize {
    if limit == 0 {
        0
    } else {
        total.div_ceil(limit)
    }
}

/// Builds facet histograms over `records`.
pub fn compute_filter_counts(records: &[VehicleRecord]) -> FilterCounts {
    let mut condition = ConditionCounts::default();
    for record in records {
        if record.is_new() {
            condition.new += 1;
        }
        if record.is_pre_owned() {
            condition.pre_owned += 1;
        }
        if record.is_certified() {
            condition.certified += 1;
        }
    }

    FilterCounts {
        condition,
        year: Facet::top(records.iter().map(|r| r.year.as_str()), YEAR_FACET_SIZE),
        make: Facet::top(records.iter().map(|r| r.make.as_str()), DEFAULT_FACET_SIZE),
        model: Facet::top(records.iter().map(|r| r.model.as_str()), DEFAULT_FACET_SIZE),
        body_style: Facet::top(records.iter().map(|r| r.body.as_str()), DEFAULT_FACET_SIZE),
        fuel_type: Facet::top(records.iter().map(|r| r.fuel.as_str()), DEFAULT_FACET_SIZE),
        drivetrain: Facet::top(
            records.iter().map(|r| r.drivetrain.as_str()),
            DEFAULT_FACET_SIZE,
        ),
        transmission: Facet::top(
            records.iter().map(|r| r.transmission.as_str()),
            DEFAULT_FACET_SIZE,
        ),
        engine: Facet::top(records.iter().map(|r| r.engine.as_str()), DEFAULT_FACET_SIZE),
    }
}
