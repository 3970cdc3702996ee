pub mod resume;
pub mod review;
pub mod user;
