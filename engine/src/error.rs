use thiserror::Error as DError;

#[derive(Debug, Clone, PartialEq, DError)]
pub enum ErrorKind {
    #[error("Couldn't get similarity, no matching ratings")]
    NoMatchingRatings,

    #[error("Couldn't get similarity, ratings have no variance")]
    ZeroVariance,

    #[error("Couldn't convert types")]
    ConvertType,

    #[error("Reference rater with email({0}) doesn't exist")]
    ReferenceRaterMissing(String),
}
