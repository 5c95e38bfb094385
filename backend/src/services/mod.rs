//! Business logic services for the CropWatch monitoring platform

pub mod alert;
pub mod analysis;
pub mod auth;
pub mod farm;
pub mod ndvi;
pub mod notification;
pub mod user;
pub mod video;

pub use alert::AlertService;
pub use analysis::AnalysisService;
pub use auth::AuthService;
pub use farm::FarmService;
pub use ndvi::NdviService;
pub use notification::NotificationService;
pub use user::UserService;
pub use video::VideoService;
