// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod entity;
pub mod error;
pub mod models;
pub mod score;
pub mod seed;

use anyhow::Error;
use std::collections::HashMap;

pub use entity::{Entity, ToTable};
pub use models::{Movie, NewMovie, NewUser, Rating, User};
pub use score::ScoreRange;

pub type Result<T> = std::result::Result<T, Error>;
pub type UserId = i32;
pub type MovieId = i32;
pub type Ratings<I = MovieId, Value = f64> = HashMap<I, Value>;

/// Storage for users, movies and the ratings that link them.
///
/// Every backend keeps at most one rating per (user, movie) pair, the only
/// way to write a rating is `upsert_rating` (or `rate`, which coerces raw
/// text first).
pub trait Controller {
    /// Get all users
    fn users(&self) -> Result<Vec<User>>;

    /// Get a user by id, fails with `NotFoundById` if it doesn't exist
    fn user_by_id(&self, id: UserId) -> Result<User>;

    /// Get the user registered with this email, if any
    fn user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Insert a new user from a prototype
    fn insert_user(&self, proto: NewUser) -> Result<User>;

    /// Get all movies
    fn movies(&self) -> Result<Vec<Movie>>;

    /// Get a movie by id, fails with `NotFoundById` if it doesn't exist
    fn movie_by_id(&self, id: MovieId) -> Result<Movie>;

    /// Insert a new movie from a prototype
    fn insert_movie(&self, proto: NewMovie) -> Result<Movie>;

    /// Get the rating a user gave to a movie
    fn rating(&self, user_id: UserId, movie_id: MovieId) -> Result<Option<Rating>>;

    /// Create the rating for the pair, or overwrite its score if it already exists
    fn upsert_rating(&self, user_id: UserId, movie_id: MovieId, score: f64) -> Result<Rating>;

    /// Same as `upsert_rating`, but the score comes as unparsed text
    fn rate(&self, user_id: UserId, movie_id: MovieId, raw_score: &str) -> Result<Rating> {
        let score = self.score_range().parse(raw_score)?;
        self.upsert_rating(user_id, movie_id, score)
    }

    /// Get every rating for the specified movie, in no particular order
    fn movie_ratings(&self, movie_id: MovieId) -> Result<Vec<Rating>>;

    /// Get the ratings of the specified user, maps Movie::Id => score
    fn user_ratings(&self, user_id: UserId) -> Result<Ratings>;

    /// The valid score domain, ex. (1.0, 5.0)
    fn score_range(&self) -> ScoreRange;
}
