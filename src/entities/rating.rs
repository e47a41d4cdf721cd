use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Party;

/// Every profile starts at, and falls back to, a clean 5.00.
pub fn default_rating() -> Decimal {
    Decimal::new(500, 2)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub order_id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    /// Role the recipient played on the rated ride.
    pub to_role: Party,
    pub score: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(
        order_id: Uuid,
        from_user_id: Uuid,
        to_user_id: Uuid,
        to_role: Party,
        score: i64,
        comment: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            from_user_id,
            to_user_id,
            to_role,
            score,
            comment,
            created_at: Utc::now(),
        }
    }
}

/// Arithmetic mean over the full score history, at two decimal places.
pub fn average_score(scores: &[i64]) -> Decimal {
    if scores.is_empty() {
        return default_rating();
    }

    let sum: i64 = scores.iter().sum();
    let mut average = Decimal::from(sum) / Decimal::from(scores.len() as i64);
    average = average.round_dp(2);
    average.rescale(2);

    average
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{average_score, default_rating};

    #[test]
    fn mean_is_rounded_to_two_decimals() {
        assert_eq!(average_score(&[5, 4, 3]), Decimal::new(400, 2));
        assert_eq!(average_score(&[5, 4]), Decimal::new(450, 2));
        assert_eq!(average_score(&[5, 4, 4]), Decimal::new(433, 2));
    }

    #[test]
    fn empty_history_falls_back_to_default() {
        assert_eq!(average_score(&[]), default_rating());
        assert_eq!(default_rating().to_string(), "5.00");
    }

    #[test]
    fn average_always_renders_two_decimals() {
        assert_eq!(average_score(&[5, 4, 3]).to_string(), "4.00");
        assert_eq!(average_score(&[5]).to_string(), "5.00");
    }
}
