//! Optional rayon fan-out for per-holding work.
//!
//! Every parallel path must give the same result as the sequential one, so
//! folds here only use associative, commutative reductions.

use crate::types::AnalyticsConfig;

/// Maps `f` over `items`, on rayon when the `parallel` feature is on and
/// [`AnalyticsConfig::should_parallelize`] agrees. Output order matches
/// input order.
#[allow(unused_variables)]
pub fn maybe_parallel_map<T, U, F>(items: &[T], config: &AnalyticsConfig, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if config.should_parallelize(items.len()) {
            return items.par_iter().map(f).collect();
        }
    }

    items.iter().map(f).collect()
}

/// Folds `items` into `identity` with `fold`, merging partial results
/// with `reduce` when the run goes parallel.
///
/// `identity` is cloned once per rayon split, so it should be cheap or a
/// pre-sized template such as a zero-filled calendar.
#[allow(unused_variables)]
pub fn maybe_parallel_fold<T, U, F, R>(
    items: &[T],
    config: &AnalyticsConfig,
    identity: U,
    fold: F,
    reduce: R,
) -> U
where
    T: Sync,
    U: Send + Sync + Clone,
    F: Fn(U, &T) -> U + Sync + Send,
    R: Fn(U, U) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if config.should_parallelize(items.len()) {
            return items
                .par_iter()
                .fold(|| identity.clone(), &fold)
                .reduce(|| identity.clone(), reduce);
        }
    }

    items.iter().fold(identity, fold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bondfolio_core::types::Date;

    fn config() -> AnalyticsConfig {
        AnalyticsConfig::sequential(Date::from_ymd(2025, 1, 15).unwrap())
    }

    #[test]
    fn test_maybe_parallel_map() {
        let items = vec![1, 2, 3, 4, 5];
        let results: Vec<i32> = maybe_parallel_map(&items, &config(), |x| x * 2);
        assert_eq!(results, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_maybe_parallel_fold() {
        let items: Vec<f64> = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let sum: f64 = maybe_parallel_fold(&items, &config(), 0.0, |acc, x| acc + x, |a, b| a + b);
        assert!((sum - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let parallel = config().with_parallel(true).with_threshold(1);
        let items: Vec<i64> = (1..=1_000).collect();

        let seq: i64 = maybe_parallel_fold(&items, &config(), 0, |acc, x| acc + x, |a, b| a + b);
        let par: i64 = maybe_parallel_fold(&items, &parallel, 0, |acc, x| acc + x, |a, b| a + b);
        assert_eq!(seq, par);

        let mapped = maybe_parallel_map(&items, &parallel, |x| x * 3);
        assert_eq!(mapped[0], 3);
        assert_eq!(mapped[999], 3_000);
    }
}
