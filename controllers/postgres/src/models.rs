// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::schema::*;
use controller::{Movie, NewMovie, NewUser, Rating, User};

// To query data from the database
#[derive(Debug, Clone, Queryable)]
pub struct UserRow {
    pub id: i32,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            age: row.age,
            zipcode: row.zipcode,
        }
    }
}

// To insert a new user into the database, a missing id uses the sequence
#[derive(Debug, Clone, Insertable)]
#[table_name = "users"]
pub struct NewUserRow<'a> {
    pub id: Option<i32>,
    pub email: Option<&'a str>,
    pub age: Option<i32>,
    pub zipcode: Option<&'a str>,
}

impl<'a> From<&'a NewUser> for NewUserRow<'a> {
    fn from(proto: &'a NewUser) -> Self {
        Self {
            id: proto.id,
            email: proto.email.as_deref(),
            age: proto.age,
            zipcode: proto.zipcode.as_deref(),
        }
    }
}

// To query data from the database
#[derive(Debug, Clone, Queryable)]
pub struct MovieRow {
    pub id: i32,
    pub title: String,
    pub released_at: Option<String>,
    pub imdb_url: Option<String>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            released_at: row.released_at,
            imdb_url: row.imdb_url,
        }
    }
}

// To insert a new movie into the database
#[derive(Debug, Clone, Insertable)]
#[table_name = "movies"]
pub struct NewMovieRow<'a> {
    pub id: Option<i32>,
    pub title: &'a str,
    pub released_at: Option<&'a str>,
    pub imdb_url: Option<&'a str>,
}

impl<'a> From<&'a NewMovie> for NewMovieRow<'a> {
    fn from(proto: &'a NewMovie) -> Self {
        Self {
            id: proto.id,
            title: &proto.title,
            released_at: proto.released_at.as_deref(),
            imdb_url: proto.imdb_url.as_deref(),
        }
    }
}

// To query data from the database
#[derive(Debug, Clone, Queryable)]
pub struct RatingRow {
    pub id: i32,
    pub user_id: i32,
    pub movie_id: i32,
    pub score: f64,
}

impl From<RatingRow> for Rating {
    fn from(row: RatingRow) -> Self {
        Self {
            user_id: row.user_id,
            movie_id: row.movie_id,
            score: row.score,
        }
    }
}

// To insert a new rating into the database
#[derive(Debug, Clone, Insertable)]
#[table_name = "ratings"]
pub struct NewRatingRow {
    pub user_id: i32,
    pub movie_id: i32,
    pub score: f64,
}
