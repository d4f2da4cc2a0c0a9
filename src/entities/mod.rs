pub mod address;
pub mod movie;
pub mod session;
pub mod theater;
