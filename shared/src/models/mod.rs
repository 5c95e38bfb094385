//! Domain models for the CropWatch monitoring platform

mod alert;
mod forecast;
mod ndvi;
mod stress;

pub use alert::*;
pub use forecast::*;
pub use ndvi::*;
pub use stress::*;
