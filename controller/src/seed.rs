// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

//! Loaders for MovieLens-100k style files.
//!
//! * `u.user`: `id|age|gender|occupation|zipcode`
//! * `u.item`: `id|title|released_at|video_release|imdb_url|genres...`
//! * `u.data`: `user_id<TAB>movie_id<TAB>score<TAB>timestamp`
//! * `u.eye`: `movie_id<TAB>score`, ratings of the reference rater, whose id
//!   is only known once its account exists
//!
//! Everything goes through a `Controller`, so seeded ratings get the same
//! validation and upsert semantics as any other rating.

use crate::{error::ErrorKind, Controller, NewMovie, NewUser, Result, User};
use anyhow::Context;
use std::{fs::File, io::Read, path::Path};

pub const USERS_FILE: &str = "u.user";
pub const MOVIES_FILE: &str = "u.item";
pub const REFERENCE_FILE: &str = "u.eye";
pub const RATINGS_FILE: &str = "u.data";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub movies: usize,
    pub ratings: usize,
    pub skipped: usize,
}

fn reader<R: Read>(delimiter: u8, input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .quoting(false)
        .flexible(true)
        .from_reader(input)
}

fn optional(field: &str) -> Option<String> {
    let field = field.trim();
    if field.is_empty() {
        None
    } else {
        Some(field.to_owned())
    }
}

pub fn load_users<C: Controller, R: Read>(controller: &C, input: R) -> Result<usize> {
    let mut count = 0;

    for (line, record) in reader(b'|', input).records().enumerate() {
        let record = record?;
        let id: i32 = record
            .get(0)
            .unwrap_or_default()
            .trim()
            .parse()
            .with_context(|| format!("{}:{}: invalid user id", USERS_FILE, line + 1))?;

        let age = record.get(1).and_then(|age| age.trim().parse().ok());
        let zipcode = record.get(4).and_then(optional);

        controller.insert_user(NewUser {
            id: Some(id),
            email: None,
            age,
            zipcode,
        })?;
        count += 1;
    }

    Ok(count)
}

pub fn load_movies<C: Controller, R: Read>(controller: &C, input: R) -> Result<usize> {
    let mut count = 0;

    // Titles in the original dataset are latin-1, not utf-8
    for (line, record) in reader(b'|', input).byte_records().enumerate() {
        let record = record?;
        let field = |i: usize| {
            record
                .get(i)
                .map(|bytes| bytes.iter().map(|&b| b as char).collect::<String>())
                .unwrap_or_default()
        };

        let id: i32 = field(0)
            .trim()
            .parse()
            .with_context(|| format!("{}:{}: invalid movie id", MOVIES_FILE, line + 1))?;

        controller.insert_movie(NewMovie {
            id: Some(id),
            title: field(1).trim().to_owned(),
            released_at: optional(&field(2)),
            imdb_url: optional(&field(4)),
        })?;
        count += 1;
    }

    Ok(count)
}

/// Returns (loaded, skipped), ratings pointing to unknown users or movies are skipped
pub fn load_ratings<C: Controller, R: Read>(controller: &C, input: R) -> Result<(usize, usize)> {
    let mut loaded = 0;
    let mut skipped = 0;

    for (line, record) in reader(b'\t', input).records().enumerate() {
        let record = record?;
        let context = || format!("{}:{}: invalid rating", RATINGS_FILE, line + 1);

        let field = |i: usize| record.get(i).unwrap_or_default().trim();

        let user_id: i32 = field(0).parse().with_context(context)?;
        let movie_id: i32 = field(1).parse().with_context(context)?;

        if store_rating(controller, user_id, movie_id, field(2), &context())? {
            loaded += 1;
        } else {
            skipped += 1;
        }
    }

    Ok((loaded, skipped))
}

/// Returns (loaded, skipped) for the ratings of `reference`
pub fn load_reference_ratings<C: Controller, R: Read>(
    controller: &C,
    reference: &User,
    input: R,
) -> Result<(usize, usize)> {
    let mut loaded = 0;
    let mut skipped = 0;

    for (line, record) in reader(b'\t', input).records().enumerate() {
        let record = record?;
        let context = || format!("{}:{}: invalid rating", REFERENCE_FILE, line + 1);

        let field = |i: usize| record.get(i).unwrap_or_default().trim();
        let movie_id: i32 = field(0).parse().with_context(context)?;

        if store_rating(controller, reference.id, movie_id, field(1), &context())? {
            loaded += 1;
        } else {
            skipped += 1;
        }
    }

    Ok((loaded, skipped))
}

// false when the row was skipped
fn store_rating<C: Controller>(
    controller: &C,
    user_id: i32,
    movie_id: i32,
    raw: &str,
    context: &str,
) -> Result<bool> {
    match controller.rate(user_id, movie_id, raw) {
        Ok(_) => Ok(true),
        Err(e) => match e.downcast_ref::<ErrorKind>() {
            Some(ErrorKind::NotFoundById(..)) | Some(ErrorKind::InvalidScore(_)) => {
                log::warn!("Skipping {}: {}", context, e);
                Ok(false)
            }
            _ => Err(e),
        },
    }
}

fn open_seed_file(dir: &Path, name: &str) -> Result<Option<File>> {
    let path = dir.join(name);
    if path.exists() {
        let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        Ok(Some(file))
    } else {
        log::warn!("Seed file {} not found", path.display());
        Ok(None)
    }
}

/// Load every seed file found in `dir`, missing files are ignored
pub fn load_dir<C: Controller>(controller: &C, dir: impl AsRef<Path>) -> Result<SeedSummary> {
    let dir = dir.as_ref();
    let mut summary = SeedSummary::default();

    let open = |name: &str| open_seed_file(dir, name);

    if let Some(file) = open(USERS_FILE)? {
        summary.users = load_users(controller, file)?;
    }

    if let Some(file) = open(MOVIES_FILE)? {
        summary.movies = load_movies(controller, file)?;
    }

    if let Some(file) = open(RATINGS_FILE)? {
        let (loaded, skipped) = load_ratings(controller, file)?;
        summary.ratings = loaded;
        summary.skipped = skipped;
    }

    log::info!(
        "Seeded {} users, {} movies and {} ratings ({} skipped)",
        summary.users,
        summary.movies,
        summary.ratings,
        summary.skipped
    );

    Ok(summary)
}

/// Make sure the account of the reference rater exists, creating it if needed
pub fn create_reference_rater<C: Controller>(controller: &C, email: &str) -> Result<User> {
    if let Some(user) = controller.user_by_email(email)? {
        return Ok(user);
    }

    log::info!("Creating reference rater account {}", email);
    controller.insert_user(NewUser::with_email(email))
}

/// Create the reference rater and load its ratings from `dir`, if any
pub fn seed_reference_rater<C: Controller>(
    controller: &C,
    email: &str,
    dir: impl AsRef<Path>,
) -> Result<User> {
    let reference = create_reference_rater(controller, email)?;

    if let Some(file) = open_seed_file(dir.as_ref(), REFERENCE_FILE)? {
        let (loaded, skipped) = load_reference_ratings(controller, &reference, file)?;
        log::info!(
            "Seeded {} ratings of the reference rater ({} skipped)",
            loaded,
            skipped
        );
    }

    Ok(reference)
}
