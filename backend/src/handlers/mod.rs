//! HTTP request handlers

pub mod alert;
pub mod analysis;
pub mod auth;
pub mod farm;
pub mod health;
pub mod ndvi;
pub mod notification;
pub mod user;
pub mod video;

pub use alert::*;
pub use analysis::*;
pub use auth::*;
pub use farm::*;
pub use health::*;
pub use ndvi::*;
pub use notification::*;
pub use user::*;
pub use video::*;
