//! Bookings: one per user and service, listed from either side of the relation.

pub mod repository;
pub mod service;

pub use repository::BookingRepository;
pub use service::BookingService;
