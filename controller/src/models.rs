// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::{entity::Entity, MovieId, UserId};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct User {
    pub id: UserId,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

impl Entity for User {
    type Id = UserId;

    fn get_id(&self) -> Self::Id {
        self.id
    }

    fn get_data(&self) -> Vec<(&'static str, String)> {
        let mut data = Vec::new();

        if let Some(email) = &self.email {
            data.push(("email", email.clone()));
        }
        if let Some(age) = self.age {
            data.push(("age", age.to_string()));
        }
        if let Some(zipcode) = &self.zipcode {
            data.push(("zipcode", zipcode.clone()));
        }

        data
    }
}

// To insert a new user, `id` is only set when loading seed data
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewUser {
    pub id: Option<UserId>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

impl NewUser {
    pub fn with_email(email: &str) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub released_at: Option<String>,
    pub imdb_url: Option<String>,
}

impl Entity for Movie {
    type Id = MovieId;

    fn get_id(&self) -> Self::Id {
        self.id
    }

    fn get_data(&self) -> Vec<(&'static str, String)> {
        let mut data = vec![("title", self.title.clone())];

        if let Some(released_at) = &self.released_at {
            data.push(("released at", released_at.clone()));
        }
        if let Some(imdb_url) = &self.imdb_url {
            data.push(("imdb", imdb_url.clone()));
        }

        data
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewMovie {
    pub id: Option<MovieId>,
    pub title: String,
    pub released_at: Option<String>,
    pub imdb_url: Option<String>,
}

impl NewMovie {
    pub fn with_title(title: &str) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub score: f64,
}
