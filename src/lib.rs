pub mod linearization;
pub mod logger;
