//! NDVI sample models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single NDVI reading for a farm, immutable once recorded
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NdviSample {
    pub date: NaiveDate,
    /// Normalized Difference Vegetation Index in [-1, 1]
    pub ndvi: f64,
    /// Cloud cover over the scene, 0-100 percent
    pub cloud_cover: f64,
}

impl NdviSample {
    pub fn new(date: NaiveDate, ndvi: f64, cloud_cover: f64) -> Self {
        Self {
            date,
            ndvi,
            cloud_cover,
        }
    }
}

/// An observation delivered by an imagery provider, not yet persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NdviObservation {
    pub date: NaiveDate,
    pub ndvi: f64,
    pub cloud_cover: f64,
    /// Where the reading came from (e.g. "satellite", "synthetic")
    pub source: String,
}
