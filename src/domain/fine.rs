use super::ids::{CaseId, DriverId, FineId, LawEnforcerId};
use crate::error::FineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Severity of a fine, counted in whole penalty points.
///
/// Sums saturate instead of wrapping so an absurd aggregate can never come
/// back around below the license limit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PenaltyPoints(u32);

impl PenaltyPoints {
    pub const ZERO: Self = Self(0);

    pub const fn new(points: u32) -> Self {
        Self(points)
    }
}

impl From<u32> for PenaltyPoints {
    fn from(points: u32) -> Self {
        Self(points)
    }
}

impl Add for PenaltyPoints {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for PenaltyPoints {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for PenaltyPoints {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |total, points| total + points)
    }
}

impl fmt::Display for PenaltyPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FineState {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl fmt::Display for FineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FineState::Pending => "PENDING",
            FineState::Accepted => "ACCEPTED",
            FineState::Rejected => "REJECTED",
        };
        f.write_str(name)
    }
}

/// A penalty-points charge issued against a driver.
///
/// The fine only references its driver and issuer; it never owns them.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Fine {
    pub id: FineId,
    pub penalty_points: PenaltyPoints,
    pub date: DateTime<Utc>,
    pub driver: DriverId,
    pub issuer: LawEnforcerId,
    pub state: FineState,
}

impl Fine {
    /// Creates a new fine in the `Pending` state.
    pub fn issue(
        id: FineId,
        penalty_points: PenaltyPoints,
        driver: DriverId,
        issuer: LawEnforcerId,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            penalty_points,
            date,
            driver,
            issuer,
            state: FineState::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == FineState::Pending
    }

    /// Marks the fine as accepted by the driver.
    pub fn accept(&mut self) -> Result<(), FineError> {
        self.transition(FineState::Accepted)
    }

    /// Marks the fine as rejected by the driver.
    pub fn reject(&mut self) -> Result<(), FineError> {
        self.transition(FineState::Rejected)
    }

    fn transition(&mut self, next: FineState) -> Result<(), FineError> {
        if !self.is_pending() {
            return Err(FineError::InvalidState {
                fine: self.id.clone(),
                state: self.state,
            });
        }
        self.state = next;
        Ok(())
    }
}

/// Dispute record opened when a driver rejects a fine.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CourtCase {
    pub id: CaseId,
    pub fine: FineId,
    pub opened_at: DateTime<Utc>,
}
