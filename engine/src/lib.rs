// Copyright (C) 2020 Kevin Del Castillo Ramírez
//
// This file is part of movie-ratings.
//
// movie-ratings is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// movie-ratings is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with movie-ratings.  If not, see <http://www.gnu.org/licenses/>.

pub mod error;
pub mod judgment;
pub mod similarity;

use anyhow::Error;
use controller::{Controller, MovieId, Ratings, UserId};

pub use judgment::{judge, Judge, Judgment, Verdict, MESSAGES};

/// Where an effective score comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectiveScore {
    Rated(f64),
    Predicted(f64),
}

impl EffectiveScore {
    pub fn value(&self) -> f64 {
        match *self {
            EffectiveScore::Rated(score) | EffectiveScore::Predicted(score) => score,
        }
    }

    pub fn is_predicted(&self) -> bool {
        matches!(self, EffectiveScore::Predicted(_))
    }
}

/// Σ(similarity × score) / Σ(similarity), `None` when there is nothing to weigh
pub fn weighted_average<I>(neighbors: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut numerator = 0.0;
    let mut denominator = None;

    for (similarity, score) in neighbors {
        numerator += similarity * score;
        *denominator.get_or_insert(0.0) += similarity;
    }

    let denominator = denominator?;
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

pub struct Engine<'a, C>
where
    C: Controller,
{
    controller: &'a C,
}

impl<'a, C> Engine<'a, C>
where
    C: Controller,
{
    pub fn with_controller(controller: &'a C) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &'a C {
        self.controller
    }

    fn similarity_of(ratings_a: &Ratings, ratings_b: &Ratings) -> Option<f64> {
        similarity::pearson_correlation(ratings_a, ratings_b).ok()
    }

    /// Pearson similarity between two users, `None` if it is undefined
    pub fn similarity(&self, user_a: UserId, user_b: UserId) -> Result<Option<f64>, Error> {
        self.controller.user_by_id(user_a)?;
        self.controller.user_by_id(user_b)?;

        let ratings_a = self.controller.user_ratings(user_a)?;
        let ratings_b = self.controller.user_ratings(user_b)?;

        Ok(Self::similarity_of(&ratings_a, &ratings_b))
    }

    /// Estimate the score `user_id` would give to `movie_id` from the users
    /// that rated it and have a positive similarity with them.
    ///
    /// The estimate is neither rounded nor clamped, `None` means that no
    /// other user gave any usable signal.
    pub fn predict(&self, user_id: UserId, movie_id: MovieId) -> Result<Option<f64>, Error> {
        self.controller.user_by_id(user_id)?;
        self.controller.movie_by_id(movie_id)?;

        let user_ratings = self.controller.user_ratings(user_id)?;
        let mut neighbors = Vec::new();

        for rating in self.controller.movie_ratings(movie_id)? {
            if rating.user_id == user_id {
                continue;
            }

            let other_ratings = self.controller.user_ratings(rating.user_id)?;
            match Self::similarity_of(&user_ratings, &other_ratings) {
                Some(similarity) if similarity > 0.0 => {
                    log::debug!(
                        "user({}) contributes {} with similarity {}",
                        rating.user_id,
                        rating.score,
                        similarity
                    );
                    neighbors.push((similarity, rating.score));
                }

                Some(similarity) => log::debug!(
                    "user({}) discarded, similarity {}",
                    rating.user_id,
                    similarity
                ),

                None => log::debug!("user({}) discarded, undefined similarity", rating.user_id),
            }
        }

        let prediction = weighted_average(neighbors);
        log::debug!(
            "Prediction for user({}) on movie({}): {:?}",
            user_id,
            movie_id,
            prediction
        );

        Ok(prediction)
    }

    /// The real rating if there is one, otherwise a prediction
    pub fn effective_score(
        &self,
        user_id: UserId,
        movie_id: MovieId,
    ) -> Result<Option<EffectiveScore>, Error> {
        if let Some(rating) = self.controller.rating(user_id, movie_id)? {
            return Ok(Some(EffectiveScore::Rated(rating.score)));
        }

        Ok(self
            .predict(user_id, movie_id)?
            .map(EffectiveScore::Predicted))
    }
}
