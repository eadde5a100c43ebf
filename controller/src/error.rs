// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use thiserror::Error as DError;

#[derive(Debug, Clone, PartialEq, DError)]
pub enum ErrorKind {
    #[error("Couldn't found {0} with id({1})")]
    NotFoundById(&'static str, i32),

    #[error("Invalid score ({0})")]
    InvalidScore(String),

    #[error("Invalid score range [{0}, {1}]")]
    InvalidScoreRange(f64, f64),

    #[error("A user with email({0}) already exists")]
    DuplicateEmail(String),

    #[error("A {0} with id({1}) already exists")]
    DuplicateId(&'static str, i32),

    #[error("Storage lock was poisoned")]
    Poisoned,
}
