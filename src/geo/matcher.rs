//! Geo Matcher Module
//! Joins each left record to its nearest right record within a distance limit.

use rayon::prelude::*;
use thiserror::Error;

use super::distance::GeoPoint;
use crate::config::{ParseErrorPolicy, TableSchema};
use crate::data::{Row, Table};
use crate::stats::numeric::{parse_cell, CellValue};

/// Records farther apart than this are never joined.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 3.0;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("{side} record {record}: column {col} is not a coordinate ({value:?})")]
    UnparseableCoordinate {
        side: &'static str,
        record: usize,
        col: usize,
        value: Option<String>,
    },
}

/// Latitude/longitude column positions of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoColumns {
    pub lat_col: usize,
    pub lon_col: usize,
}

impl From<&TableSchema> for GeoColumns {
    fn from(schema: &TableSchema) -> Self {
        Self {
            lat_col: schema.lat_col,
            lon_col: schema.lon_col,
        }
    }
}

/// Left records split by whether a right record lies within range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinResult {
    /// Left cells followed by the nearest right record's cells
    pub matched: Vec<Row>,
    /// Left records with nothing in range, unchanged
    pub dangling: Vec<Row>,
}

enum Placement {
    Matched(Row),
    Dangling(Row),
}

/// Brute-force nearest-neighbour matcher over great-circle distance.
#[derive(Debug, Clone, Copy)]
pub struct GeoMatcher {
    max_distance_km: f64,
    on_parse_error: ParseErrorPolicy,
}

impl Default for GeoMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE_KM)
    }
}

impl GeoMatcher {
    pub fn new(max_distance_km: f64) -> Self {
        Self {
            max_distance_km,
            on_parse_error: ParseErrorPolicy::Zero,
        }
    }

    pub fn with_parse_policy(mut self, policy: ParseErrorPolicy) -> Self {
        self.on_parse_error = policy;
        self
    }

    /// Join every left record to its nearest right record.
    ///
    /// A right record qualifies only when its distance is strictly below both
    /// the best distance so far and `max_distance_km`, so the earliest right
    /// record wins a tie. Coordinates are parsed sequentially, then left
    /// records are scanned in parallel; output keeps left-record order.
    pub fn join(
        &self,
        left: &Table,
        left_cols: GeoColumns,
        right: &Table,
        right_cols: GeoColumns,
    ) -> Result<JoinResult, MatchError> {
        let candidates = (0..right.len())
            .map(|i| self.point_of(right, "right", i, right_cols))
            .collect::<Result<Vec<_>, _>>()?;
        // Parsed up front so a failure always names the first bad left record
        let points = (0..left.len())
            .map(|i| self.point_of(left, "left", i, left_cols))
            .collect::<Result<Vec<_>, _>>()?;

        let placements: Vec<Placement> = points
            .par_iter()
            .enumerate()
            .map(|(i, point)| {
                let row = &left.records[i];
                let nearest = point.and_then(|point| self.nearest(point, &candidates));

                match nearest {
                    Some((j, distance)) => {
                        log::trace!("left {} -> right {} at {:.4} km", i, j, distance);
                        let mut joined = row.clone();
                        joined.extend(right.records[j].iter().cloned());
                        Placement::Matched(joined)
                    }
                    None => Placement::Dangling(row.clone()),
                }
            })
            .collect();

        let mut result = JoinResult::default();
        for placement in placements {
            match placement {
                Placement::Matched(row) => result.matched.push(row),
                Placement::Dangling(row) => result.dangling.push(row),
            }
        }

        log::debug!(
            "Geo join within {} km: {} matched, {} dangling",
            self.max_distance_km,
            result.matched.len(),
            result.dangling.len()
        );
        Ok(result)
    }

    /// Index and distance of the nearest candidate within range.
    fn nearest(&self, point: GeoPoint, candidates: &[Option<GeoPoint>]) -> Option<(usize, f64)> {
        let mut best = None;
        let mut best_distance = self.max_distance_km;

        for (j, candidate) in candidates.iter().enumerate() {
            let Some(candidate) = candidate else {
                continue;
            };
            let distance = point.distance_km(candidate);
            if distance < best_distance {
                best_distance = distance;
                best = Some((j, distance));
            }
        }
        best
    }

    /// Coordinates of a record; `None` when the record is to be skipped.
    fn point_of(
        &self,
        table: &Table,
        side: &'static str,
        record: usize,
        cols: GeoColumns,
    ) -> Result<Option<GeoPoint>, MatchError> {
        let lat = self.coordinate(table, side, record, cols.lat_col)?;
        let lon = self.coordinate(table, side, record, cols.lon_col)?;
        Ok(lat.zip(lon).map(|(lat, lon)| GeoPoint::new(lat, lon)))
    }

    fn coordinate(
        &self,
        table: &Table,
        side: &'static str,
        record: usize,
        col: usize,
    ) -> Result<Option<f64>, MatchError> {
        let cell = table.cell(record, col);
        match parse_cell(cell, self.on_parse_error) {
            CellValue::Value(v) => Ok(Some(v)),
            CellValue::Skip => Ok(None),
            CellValue::Invalid => Err(MatchError::UnparseableCoordinate {
                side,
                record,
                col,
                value: cell.map(str::to_string),
            }),
        }
    }
}
