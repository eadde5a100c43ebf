// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::error::ErrorKind;

/// Closed interval of valid scores, ex. [1.0, 5.0]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    min: f64,
    max: f64,
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self { min: 1.0, max: 5.0 }
    }
}

impl ScoreRange {
    pub fn new(min: f64, max: f64) -> Result<Self, ErrorKind> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ErrorKind::InvalidScoreRange(min, max));
        }

        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.min && score <= self.max
    }

    /// Rejects anything outside the range, NaN included. Never clamps.
    pub fn validate(&self, score: f64) -> Result<f64, ErrorKind> {
        if self.contains(score) {
            Ok(score)
        } else {
            Err(ErrorKind::InvalidScore(format!(
                "{} is not in [{}, {}]",
                score, self.min, self.max
            )))
        }
    }

    /// Coerce a raw score, as typed by a user, into a valid one
    pub fn parse(&self, raw: &str) -> Result<f64, ErrorKind> {
        let score: f64 = raw
            .trim()
            .parse()
            .map_err(|_| ErrorKind::InvalidScore(format!("'{}' is not a number", raw)))?;

        self.validate(score)
    }

    pub fn clamp(&self, score: f64) -> f64 {
        score.max(self.min).min(self.max)
    }
}
