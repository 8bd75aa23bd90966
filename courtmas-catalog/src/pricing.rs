use crate::court::Court;
use serde::{Deserialize, Serialize};

/// Price breakdown for a contiguous block of hours on one court.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    pub court_id: u32,
    pub unit_price_cents: i64,
    pub duration_hours: u8,
    pub total_cents: i64,
}

/// Total is unit price times duration; no discounts or fees apply to
/// block bookings.
pub fn quote(court: &Court, duration_hours: u8) -> Quote {
    Quote {
        court_id: court.id,
        unit_price_cents: court.price_per_hour_cents,
        duration_hours,
        total_cents: court.price_per_hour_cents * duration_hours as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::court::Sport;

    #[test]
    fn total_scales_with_duration() {
        let court = Court {
            id: 1,
            name: "Court 1".to_string(),
            surface: "Rubber".to_string(),
            sport: Sport::Badminton,
            price_per_hour_cents: 2000,
            is_available: true,
        };

        let q = quote(&court, 2);
        assert_eq!(q.unit_price_cents, 2000);
        assert_eq!(q.total_cents, 4000);
    }
}
