#![allow(clippy::implicit_hasher)]

use crate::error::ErrorKind;
use controller::Ratings;
use num_traits::float::Float;
use std::{collections::HashSet, hash::Hash, ops::AddAssign};

/// Ids rated by both `a` and `b`
pub fn overlap<'a, ItemId, Value>(
    a: &'a Ratings<ItemId, Value>,
    b: &'a Ratings<ItemId, Value>,
) -> HashSet<&'a ItemId>
where
    ItemId: Hash + Eq,
{
    let a_keys: HashSet<_> = a.keys().collect();
    let b_keys: HashSet<_> = b.keys().collect();

    a_keys.intersection(&b_keys).copied().collect()
}

/// Pearson correlation restricted to the overlap of `a` and `b`.
///
/// Fails with `NoMatchingRatings` when there is no overlap and with
/// `ZeroVariance` when either side gave the same score to every movie in it,
/// neither case is a correlation of zero.
pub fn pearson_correlation<ItemId, Value>(
    a: &Ratings<ItemId, Value>,
    b: &Ratings<ItemId, Value>,
) -> Result<Value, ErrorKind>
where
    ItemId: Hash + Eq,
    Value: Float + AddAssign,
{
    let common = overlap(a, b);
    if common.is_empty() {
        return Err(ErrorKind::NoMatchingRatings);
    }

    let pairs: Vec<(Value, Value)> = common.iter().map(|&id| (a[id], b[id])).collect();

    let (first_x, first_y) = pairs[0];
    if pairs.iter().all(|&(x, _)| x == first_x) || pairs.iter().all(|&(_, y)| y == first_y) {
        return Err(ErrorKind::ZeroVariance);
    }

    let n = Value::from(pairs.len()).ok_or(ErrorKind::ConvertType)?;
    let mut mean_x = Value::zero();
    let mut mean_y = Value::zero();

    for &(x, y) in &pairs {
        mean_x += x;
        mean_y += y;
    }

    let mean_x = mean_x / n;
    let mean_y = mean_y / n;

    let mut cov = Value::zero();
    let mut var_x = Value::zero();
    let mut var_y = Value::zero();

    for &(x, y) in &pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }

    let pearson = cov / (var_x.sqrt() * var_y.sqrt());
    if pearson.is_finite() {
        Ok(pearson)
    } else {
        Err(ErrorKind::ZeroVariance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::*;
    use common_macros::hash_map;

    #[test]
    fn perfect_correlations() -> Result<(), ErrorKind> {
        let a = hash_map! { 1 => 1.0, 2 => 2.0, 3 => 3.0 };
        let b = hash_map! { 1 => 2.0, 2 => 4.0, 3 => 6.0, 4 => 1.0 };
        let c = hash_map! { 1 => 3.0, 2 => 2.0, 3 => 1.0 };

        assert_approx_eq!(pearson_correlation(&a, &b)?, 1.0);
        assert_approx_eq!(pearson_correlation(&a, &c)?, -1.0);

        Ok(())
    }

    #[test]
    fn known_correlation() -> Result<(), ErrorKind> {
        let a = hash_map! { 1 => 5.0, 2 => 3.0, 3 => 4.0, 4 => 4.0 };
        let b = hash_map! { 1 => 3.0, 2 => 1.0, 3 => 2.0, 4 => 3.0, 5 => 3.0 };

        assert_approx_eq!(pearson_correlation(&a, &b)?, 0.852_802_865_422_441_8);
        Ok(())
    }

    #[test]
    fn symmetric() -> Result<(), ErrorKind> {
        let a = hash_map! { 1 => 4.0, 2 => 1.0, 3 => 5.0, 7 => 2.0 };
        let b = hash_map! { 1 => 2.0, 2 => 2.0, 3 => 4.0, 8 => 5.0 };

        assert_approx_eq!(pearson_correlation(&a, &b)?, pearson_correlation(&b, &a)?);
        Ok(())
    }

    #[test]
    fn empty_overlap_is_undefined() {
        let a = hash_map! { 1 => 4.0, 2 => 1.0 };
        let b = hash_map! { 3 => 4.0, 4 => 1.0 };

        assert!(matches!(
            pearson_correlation(&a, &b),
            Err(ErrorKind::NoMatchingRatings)
        ));
        assert!(matches!(
            pearson_correlation(&a, &Ratings::<i32, f64>::new()),
            Err(ErrorKind::NoMatchingRatings)
        ));
    }

    #[test]
    fn zero_variance_is_undefined() {
        let flat = hash_map! { 1 => 3.0, 2 => 3.0, 3 => 3.0 };
        let varied = hash_map! { 1 => 1.0, 2 => 4.0, 3 => 5.0 };

        assert!(matches!(
            pearson_correlation(&flat, &varied),
            Err(ErrorKind::ZeroVariance)
        ));
        assert!(matches!(
            pearson_correlation(&varied, &flat),
            Err(ErrorKind::ZeroVariance)
        ));

        // A single shared movie never has any variance
        let a = hash_map! { 1 => 5.0, 2 => 1.0 };
        let b = hash_map! { 1 => 1.0, 3 => 3.0 };
        assert!(matches!(
            pearson_correlation(&a, &b),
            Err(ErrorKind::ZeroVariance)
        ));
    }

    #[test]
    fn overlap_is_an_intersection() {
        let a = hash_map! { 1 => 1.0, 2 => 2.0, 5 => 3.0 };
        let b = hash_map! { 2 => 1.0, 5 => 2.0, 9 => 3.0 };

        let common = overlap(&a, &b);
        assert_eq!(common.len(), 2);
        assert!(common.contains(&2));
        assert!(common.contains(&5));
    }
}
