//! Running-average agent rating

use serde::{Deserialize, Serialize};

use crate::{TypesError, TypesResult};

/// Lowest accepted vote
pub const MIN_RATING: f64 = 1.0;

/// Highest accepted vote
pub const MAX_RATING: f64 = 5.0;

/// Aggregate rating of an agent: the mean of all votes and how many there were
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAggregate {
    pub rating: f64,
    pub rating_count: i64,
}

impl RatingAggregate {
    pub fn new(rating: f64, rating_count: i64) -> Self {
        Self { rating, rating_count }
    }

    /// Check a single vote against the accepted range
    pub fn validate_vote(vote: f64) -> TypesResult<f64> {
        if vote.is_finite() && (MIN_RATING..=MAX_RATING).contains(&vote) {
            Ok(vote)
        } else {
            Err(TypesError::RatingOutOfRange {
                value: vote.to_string(),
                min: MIN_RATING,
                max: MAX_RATING,
            })
        }
    }

    /// Fold one vote into the aggregate.
    ///
    /// `(oldMean * oldCount + vote) / (oldCount + 1)`. The store applies the
    /// same formula in a single statement.
    pub fn record(&self, vote: f64) -> TypesResult<Self> {
        let vote = Self::validate_vote(vote)?;
        let count = self.rating_count + 1;
        let sum = self.rating * self.rating_count as f64 + vote;
        Ok(Self {
            rating: sum / count as f64,
            rating_count: count,
        })
    }
}
