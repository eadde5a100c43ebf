// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

#[macro_use]
extern crate diesel;

pub mod models;
pub mod schema;
pub mod settings;

pub use settings::PgSettings;

use crate::models::{MovieRow, NewMovieRow, NewRatingRow, NewUserRow, RatingRow, UserRow};
use crate::schema::{movies, ratings, users};
use anyhow::Error;
use controller::{
    error::ErrorKind, Controller, Movie, MovieId, NewMovie, NewUser, Rating, Ratings, ScoreRange,
    User, UserId,
};
use diesel::connection::{SimpleConnection, TransactionManager};
use diesel::pg::PgConnection;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{insert_into, prelude::*};

/// Every statement is idempotent, safe to run on each connect
const SCHEMA: &str = include_str!("../sql/schema.sql");

/// Only a serialization failure outside of any transaction is worth a second
/// try, inside one postgres has already aborted everything.
fn should_retry(error: &DieselError, transaction_depth: u32) -> bool {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            transaction_depth == 0
        }
        _ => false,
    }
}

pub fn establish_connection(url: &str) -> Result<PgConnection, Error> {
    Ok(PgConnection::establish(url)?)
}

pub struct PgController {
    pg_conn: PgConnection,
    score_range: ScoreRange,
}

impl PgController {
    /// Connect and bring the schema up to date
    pub fn with_url(url: &str, score_range: ScoreRange) -> Result<Self, Error> {
        let pg_conn = establish_connection(url)?;
        pg_conn.batch_execute(SCHEMA)?;

        log::info!("Connected to postgres, schema is up to date");
        Ok(Self {
            pg_conn,
            score_range,
        })
    }

    pub fn connection(&self) -> &PgConnection {
        &self.pg_conn
    }

    /// Move the id sequences past the highest id, needed after loading rows
    /// with explicit ids.
    pub fn reset_sequences(&self) -> Result<(), Error> {
        for table in &["users", "movies", "ratings"] {
            diesel::sql_query(format!(
                "SELECT setval('{0}_id_seq', COALESCE((SELECT MAX(id) FROM {0}), 0) + 1, false)",
                table
            ))
            .execute(&self.pg_conn)?;
        }

        Ok(())
    }

    fn upsert_once(&self, row: &NewRatingRow) -> QueryResult<RatingRow> {
        insert_into(ratings::table)
            .values(row)
            .on_conflict((ratings::user_id, ratings::movie_id))
            .do_update()
            .set(ratings::score.eq(row.score))
            .get_result(&self.pg_conn)
    }
}

impl Controller for PgController {
    fn users(&self) -> Result<Vec<User>, Error> {
        let users = users::table
            .order(users::id)
            .load::<UserRow>(&self.pg_conn)?
            .into_iter()
            .map(User::from)
            .collect();

        Ok(users)
    }

    fn user_by_id(&self, id: UserId) -> Result<User, Error> {
        users::table
            .find(id)
            .first::<UserRow>(&self.pg_conn)
            .optional()?
            .map(User::from)
            .ok_or_else(|| ErrorKind::NotFoundById("user", id).into())
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let user = users::table
            .filter(users::email.eq(email))
            .first::<UserRow>(&self.pg_conn)
            .optional()?
            .map(User::from);

        Ok(user)
    }

    fn insert_user(&self, proto: NewUser) -> Result<User, Error> {
        if let Some(email) = &proto.email {
            if self.user_by_email(email)?.is_some() {
                return Err(ErrorKind::DuplicateEmail(email.clone()).into());
            }
        }

        if let Some(id) = proto.id {
            if self.user_by_id(id).is_ok() {
                return Err(ErrorKind::DuplicateId("user", id).into());
            }
        }

        let user = insert_into(users::table)
            .values(&NewUserRow::from(&proto))
            .get_result::<UserRow>(&self.pg_conn)?;

        log::debug!("Inserted user({})", user.id);
        Ok(user.into())
    }

    fn movies(&self) -> Result<Vec<Movie>, Error> {
        let movies = movies::table
            .order(movies::id)
            .load::<MovieRow>(&self.pg_conn)?
            .into_iter()
            .map(Movie::from)
            .collect();

        Ok(movies)
    }

    fn movie_by_id(&self, id: MovieId) -> Result<Movie, Error> {
        movies::table
            .find(id)
            .first::<MovieRow>(&self.pg_conn)
            .optional()?
            .map(Movie::from)
            .ok_or_else(|| ErrorKind::NotFoundById("movie", id).into())
    }

    fn insert_movie(&self, proto: NewMovie) -> Result<Movie, Error> {
        if let Some(id) = proto.id {
            if self.movie_by_id(id).is_ok() {
                return Err(ErrorKind::DuplicateId("movie", id).into());
            }
        }

        let movie = insert_into(movies::table)
            .values(&NewMovieRow::from(&proto))
            .get_result::<MovieRow>(&self.pg_conn)?;

        log::debug!("Inserted movie({})", movie.id);
        Ok(movie.into())
    }

    fn rating(&self, user_id: UserId, movie_id: MovieId) -> Result<Option<Rating>, Error> {
        let rating = ratings::table
            .filter(ratings::user_id.eq(user_id))
            .filter(ratings::movie_id.eq(movie_id))
            .first::<RatingRow>(&self.pg_conn)
            .optional()?
            .map(Rating::from);

        Ok(rating)
    }

    fn upsert_rating(&self, user_id: UserId, movie_id: MovieId, score: f64) -> Result<Rating, Error> {
        let score = self.score_range.validate(score)?;
        self.user_by_id(user_id)?;
        self.movie_by_id(movie_id)?;

        let row = NewRatingRow {
            user_id,
            movie_id,
            score,
        };

        // The unique (user_id, movie_id) constraint does the work
        let depth = TransactionManager::<PgConnection>::get_transaction_depth(self.pg_conn.transaction_manager());
        let rating = match self.upsert_once(&row) {
            Err(e) if should_retry(&e, depth) => {
                log::warn!(
                    "Retrying rating of user({}) on movie({}): {}",
                    user_id,
                    movie_id,
                    e
                );
                self.upsert_once(&row)?
            }
            result => result?,
        };

        log::debug!(
            "Stored rating of user({}) on movie({}): {}",
            user_id,
            movie_id,
            score
        );

        Ok(rating.into())
    }

    fn movie_ratings(&self, movie_id: MovieId) -> Result<Vec<Rating>, Error> {
        let ratings = ratings::table
            .filter(ratings::movie_id.eq(movie_id))
            .load::<RatingRow>(&self.pg_conn)?
            .into_iter()
            .map(Rating::from)
            .collect();

        Ok(ratings)
    }

    fn user_ratings(&self, user_id: UserId) -> Result<Ratings, Error> {
        let ratings = ratings::table
            .filter(ratings::user_id.eq(user_id))
            .load::<RatingRow>(&self.pg_conn)?
            .iter()
            .map(|rating| (rating.movie_id, rating.score))
            .collect();

        Ok(ratings)
    }

    fn score_range(&self) -> ScoreRange {
        self.score_range
    }
}
