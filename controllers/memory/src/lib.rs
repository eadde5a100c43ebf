// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use anyhow::Error;
use controller::{
    error::ErrorKind, Controller, Movie, MovieId, NewMovie, NewUser, Rating, Ratings, ScoreRange,
    User, UserId,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Storage {
    users: BTreeMap<UserId, User>,
    movies: BTreeMap<MovieId, Movie>,
    ratings: HashMap<(UserId, MovieId), f64>,
}

impl Storage {
    fn next_user_id(&self) -> UserId {
        self.users.keys().next_back().map_or(1, |id| id + 1)
    }

    fn next_movie_id(&self) -> MovieId {
        self.movies.keys().next_back().map_or(1, |id| id + 1)
    }
}

/// A controller that keeps everything in memory, all access goes through a
/// single lock so an upsert is atomic with respect to any other operation.
#[derive(Debug, Default)]
pub struct MemoryController {
    storage: RwLock<Storage>,
    score_range: ScoreRange,
}

impl MemoryController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score_range(score_range: ScoreRange) -> Self {
        Self {
            storage: Default::default(),
            score_range,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Storage>, ErrorKind> {
        self.storage.read().map_err(|_| ErrorKind::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Storage>, ErrorKind> {
        self.storage.write().map_err(|_| ErrorKind::Poisoned)
    }
}

impl Controller for MemoryController {
    fn users(&self) -> Result<Vec<User>, Error> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    fn user_by_id(&self, id: UserId) -> Result<User, Error> {
        self.read()?
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| ErrorKind::NotFoundById("user", id).into())
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let user = self
            .read()?
            .users
            .values()
            .find(|user| user.email.as_deref() == Some(email))
            .cloned();

        Ok(user)
    }

    fn insert_user(&self, proto: NewUser) -> Result<User, Error> {
        let mut storage = self.write()?;

        if let Some(email) = &proto.email {
            if storage.users.values().any(|u| u.email.as_ref() == Some(email)) {
                return Err(ErrorKind::DuplicateEmail(email.clone()).into());
            }
        }

        let id = match proto.id {
            Some(id) if storage.users.contains_key(&id) => {
                return Err(ErrorKind::DuplicateId("user", id).into())
            }
            Some(id) => id,
            None => storage.next_user_id(),
        };

        let user = User {
            id,
            email: proto.email,
            age: proto.age,
            zipcode: proto.zipcode,
        };

        storage.users.insert(id, user.clone());
        log::debug!("Inserted user({})", id);

        Ok(user)
    }

    fn movies(&self) -> Result<Vec<Movie>, Error> {
        Ok(self.read()?.movies.values().cloned().collect())
    }

    fn movie_by_id(&self, id: MovieId) -> Result<Movie, Error> {
        self.read()?
            .movies
            .get(&id)
            .cloned()
            .ok_or_else(|| ErrorKind::NotFoundById("movie", id).into())
    }

    fn insert_movie(&self, proto: NewMovie) -> Result<Movie, Error> {
        let mut storage = self.write()?;

        let id = match proto.id {
            Some(id) if storage.movies.contains_key(&id) => {
                return Err(ErrorKind::DuplicateId("movie", id).into())
            }
            Some(id) => id,
            None => storage.next_movie_id(),
        };

        let movie = Movie {
            id,
            title: proto.title,
            released_at: proto.released_at,
            imdb_url: proto.imdb_url,
        };

        storage.movies.insert(id, movie.clone());
        log::debug!("Inserted movie({})", id);

        Ok(movie)
    }

    fn rating(&self, user_id: UserId, movie_id: MovieId) -> Result<Option<Rating>, Error> {
        let rating = self
            .read()?
            .ratings
            .get(&(user_id, movie_id))
            .map(|&score| Rating {
                user_id,
                movie_id,
                score,
            });

        Ok(rating)
    }

    fn upsert_rating(&self, user_id: UserId, movie_id: MovieId, score: f64) -> Result<Rating, Error> {
        let score = self.score_range.validate(score)?;
        let mut storage = self.write()?;

        if !storage.users.contains_key(&user_id) {
            return Err(ErrorKind::NotFoundById("user", user_id).into());
        }
        if !storage.movies.contains_key(&movie_id) {
            return Err(ErrorKind::NotFoundById("movie", movie_id).into());
        }

        let previous = storage.ratings.insert((user_id, movie_id), score);
        match previous {
            Some(old) => log::debug!(
                "Updated rating of user({}) on movie({}): {} -> {}",
                user_id,
                movie_id,
                old,
                score
            ),
            None => log::debug!(
                "Created rating of user({}) on movie({}): {}",
                user_id,
                movie_id,
                score
            ),
        }

        Ok(Rating {
            user_id,
            movie_id,
            score,
        })
    }

    fn movie_ratings(&self, movie_id: MovieId) -> Result<Vec<Rating>, Error> {
        let ratings = self
            .read()?
            .ratings
            .iter()
            .filter(|((_, movie), _)| *movie == movie_id)
            .map(|(&(user_id, movie_id), &score)| Rating {
                user_id,
                movie_id,
                score,
            })
            .collect();

        Ok(ratings)
    }

    fn user_ratings(&self, user_id: UserId) -> Result<Ratings, Error> {
        let ratings = self
            .read()?
            .ratings
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .map(|(&(_, movie_id), &score)| (movie_id, score))
            .collect();

        Ok(ratings)
    }

    fn score_range(&self) -> ScoreRange {
        self.score_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Error;
    use assert_approx_eq::*;
    use std::sync::Arc;
    use std::thread;

    fn controller_with(users: usize, movies: usize) -> Result<MemoryController, Error> {
        let controller = MemoryController::new();
        for _ in 0..users {
            controller.insert_user(NewUser::default())?;
        }
        for i in 0..movies {
            controller.insert_movie(NewMovie::with_title(&format!("Movie {}", i + 1)))?;
        }

        Ok(controller)
    }

    #[test]
    fn upsert_keeps_a_single_rating() -> Result<(), Error> {
        let controller = controller_with(1, 1)?;

        controller.upsert_rating(1, 1, 2.0)?;
        controller.upsert_rating(1, 1, 4.0)?;

        let ratings = controller.movie_ratings(1)?;
        assert_eq!(ratings.len(), 1);
        assert_approx_eq!(ratings[0].score, 4.0);

        let rating = controller.rating(1, 1)?.expect("rating should exist");
        assert_approx_eq!(rating.score, 4.0);

        Ok(())
    }

    #[test]
    fn rate_coerces_text() -> Result<(), Error> {
        let controller = controller_with(1, 1)?;

        let rating = controller.rate(1, 1, " 3 ")?;
        assert_approx_eq!(rating.score, 3.0);

        Ok(())
    }

    #[test]
    fn invalid_score_is_not_persisted() -> Result<(), Error> {
        let controller = controller_with(1, 1)?;
        controller.upsert_rating(1, 1, 2.0)?;

        for raw in &["0", "6", "great", ""] {
            let err = controller.rate(1, 1, raw).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ErrorKind>(),
                Some(ErrorKind::InvalidScore(_))
            ));
        }

        let err = controller.upsert_rating(1, 1, f64::NAN).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ErrorKind>(),
            Some(ErrorKind::InvalidScore(_))
        ));

        assert_approx_eq!(controller.rating(1, 1)?.unwrap().score, 2.0);
        Ok(())
    }

    #[test]
    fn rating_unknown_entities() -> Result<(), Error> {
        let controller = controller_with(1, 1)?;

        let err = controller.upsert_rating(2, 1, 3.0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ErrorKind>(),
            Some(&ErrorKind::NotFoundById("user", 2))
        );

        let err = controller.upsert_rating(1, 9, 3.0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ErrorKind>(),
            Some(&ErrorKind::NotFoundById("movie", 9))
        );

        assert!(controller.movie_ratings(1)?.is_empty());
        Ok(())
    }

    #[test]
    fn user_and_movie_ratings() -> Result<(), Error> {
        let controller = controller_with(2, 2)?;

        controller.upsert_rating(1, 1, 5.0)?;
        controller.upsert_rating(1, 2, 3.0)?;
        controller.upsert_rating(2, 1, 1.0)?;

        let ratings = controller.user_ratings(1)?;
        assert_eq!(ratings.len(), 2);
        assert_approx_eq!(ratings[&1], 5.0);
        assert_approx_eq!(ratings[&2], 3.0);

        let mut movie_ratings = controller.movie_ratings(1)?;
        movie_ratings.sort_by_key(|r| r.user_id);
        assert_eq!(movie_ratings.len(), 2);
        assert_eq!(movie_ratings[0].user_id, 1);
        assert_eq!(movie_ratings[1].user_id, 2);

        assert!(controller.rating(2, 2)?.is_none());
        Ok(())
    }

    #[test]
    fn users_by_email() -> Result<(), Error> {
        let controller = MemoryController::new();

        let eye = controller.insert_user(NewUser::with_email("the-eye@of-judgment.com"))?;
        controller.insert_user(NewUser::default())?;

        let found = controller.user_by_email("the-eye@of-judgment.com")?;
        assert_eq!(found, Some(eye));
        assert!(controller.user_by_email("nobody@example.com")?.is_none());

        let err = controller
            .insert_user(NewUser::with_email("the-eye@of-judgment.com"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ErrorKind>(),
            Some(ErrorKind::DuplicateEmail(_))
        ));

        Ok(())
    }

    #[test]
    fn explicit_ids() -> Result<(), Error> {
        let controller = MemoryController::new();

        controller.insert_user(NewUser {
            id: Some(10),
            ..Default::default()
        })?;

        let next = controller.insert_user(NewUser::default())?;
        assert_eq!(next.id, 11);

        let err = controller
            .insert_user(NewUser {
                id: Some(10),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ErrorKind>(),
            Some(&ErrorKind::DuplicateId("user", 10))
        );

        assert_eq!(
            controller
                .movie_by_id(1)
                .unwrap_err()
                .downcast_ref::<ErrorKind>(),
            Some(&ErrorKind::NotFoundById("movie", 1))
        );

        Ok(())
    }

    #[test]
    fn concurrent_upserts_on_the_same_pair() -> Result<(), Error> {
        let controller = Arc::new(controller_with(1, 1)?);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let controller = Arc::clone(&controller);
                thread::spawn(move || {
                    for _ in 0..50 {
                        controller
                            .upsert_rating(1, 1, 1.0 + (i % 5) as f64)
                            .expect("upsert should succeed");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread panicked");
        }

        assert_eq!(controller.movie_ratings(1)?.len(), 1);
        assert_eq!(controller.user_ratings(1)?.len(), 1);
        Ok(())
    }

    #[test]
    fn custom_score_range() -> Result<(), Error> {
        let controller = MemoryController::with_score_range(ScoreRange::new(0.5, 10.0)?);
        controller.insert_user(NewUser::default())?;
        controller.insert_movie(NewMovie::with_title("Heat"))?;

        assert_approx_eq!(controller.upsert_rating(1, 1, 9.5)?.score, 9.5);
        assert!(controller.upsert_rating(1, 1, 0.0).is_err());

        Ok(())
    }
}
