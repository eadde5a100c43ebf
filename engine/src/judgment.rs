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

use crate::{error::ErrorKind, EffectiveScore, Engine};
use anyhow::Error;
use controller::{Controller, MovieId, User, UserId};

/// Commentary of the reference rater, from least to most divergent
pub const MESSAGES: [&str; 5] = [
    "I suppose you don't have such bad taste after all.",
    "I regret every decision that I've ever made that has brought me to listen to your opinion.",
    "Words fail me, as your taste in movies has clearly failed you.",
    "That movie is great. For a clown to watch. Idiot.",
    "Words cannot express the awfulness of your taste.",
];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Judgment {
    pub difference: Option<f64>,
    pub message: Option<usize>,
}

impl Judgment {
    pub fn message_text(&self) -> Option<&'static str> {
        self.message.and_then(|index| MESSAGES.get(index).copied())
    }
}

fn message_index(difference: f64) -> usize {
    let last = MESSAGES.len() - 1;
    let index = difference.floor();

    // NaN falls here too
    if !(index <= last as f64) {
        log::warn!(
            "Difference {} is out of the message range, using message {}",
            difference,
            last
        );
        return last;
    }

    index as usize
}

/// Compare two effective scores, both have to be present to get a judgment
pub fn judge(user: Option<f64>, reference: Option<f64>) -> Judgment {
    match (user, reference) {
        (Some(user), Some(reference)) => {
            let difference = (user - reference).abs();

            Judgment {
                difference: Some(difference),
                message: Some(message_index(difference)),
            }
        }

        _ => Judgment::default(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub user: Option<EffectiveScore>,
    pub reference: Option<EffectiveScore>,
    pub judgment: Judgment,
}

/// Judges users against the reference rater ("the Eye").
///
/// The reference rater is resolved once, when the judge is built, a missing
/// one is a configuration error.
pub struct Judge<'a, C>
where
    C: Controller,
{
    engine: Engine<'a, C>,
    reference: User,
}

impl<'a, C> Judge<'a, C>
where
    C: Controller,
{
    pub fn new(controller: &'a C, reference_rater: &str) -> Result<Self, Error> {
        let reference = controller
            .user_by_email(reference_rater)?
            .ok_or_else(|| ErrorKind::ReferenceRaterMissing(reference_rater.into()))?;

        log::info!(
            "Using user({}) as reference rater ({})",
            reference.id,
            reference_rater
        );

        Ok(Self {
            engine: Engine::with_controller(controller),
            reference,
        })
    }

    pub fn reference(&self) -> &User {
        &self.reference
    }

    pub fn judge(&self, user_id: UserId, movie_id: MovieId) -> Result<Verdict, Error> {
        let range = self.engine.controller().score_range();

        let user = self.engine.effective_score(user_id, movie_id)?;
        let reference = self.engine.effective_score(self.reference.id, movie_id)?;

        let judgment = judge(
            user.map(|score| range.clamp(score.value())),
            reference.map(|score| range.clamp(score.value())),
        );

        Ok(Verdict {
            user,
            reference,
            judgment,
        })
    }
}
