use std::fmt;

pub const USER_EMAIL: &str = "userEmail";
pub const SERVICE_ID: &str = "serviceId";
pub const PROVIDER_EMAIL: &str = "providerEmail";
pub const SERVICES_STATUS: &str = "servicesStatus";

/// Fields that identify a booking: one per user and service.
pub const UNIQUE_KEY: [&str; 2] = [USER_EMAIL, SERVICE_ID];

/// Status values the front-end uses. Nothing enforces this set or the order
/// between them; a booking may carry any string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace([' ', '_'], "-").as_str() {
            "pending" => Some(Self::Pending),
            "in-progress" | "working" => Some(Self::InProgress),
            "completed" | "complete" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
