//! Per-box dispatch with feature-gated implementations
//!
//! Boxes of one level are independent work items: a kernel call writes only
//! into the fab it owns. With the `rayon` feature each box runs on the
//! thread pool; without it the same closures run in order, giving identical
//! results.

/// Check if parallel processing is available
#[cfg(feature = "rayon")]
pub fn is_parallel_available() -> bool {
    true
}

/// Check if parallel processing is available
#[cfg(not(feature = "rayon"))]
pub fn is_parallel_available() -> bool {
    false
}

/// Run `f(index, item)` for every item, one box per task
#[cfg(feature = "rayon")]
pub fn for_each_box<T, F>(items: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    use rayon::prelude::*;
    items.par_iter_mut().enumerate().for_each(|(i, t)| f(i, t));
}

/// Sequential for_each (fallback)
#[cfg(not(feature = "rayon"))]
pub fn for_each_box<T, F>(items: &mut [T], f: F)
where
    F: Fn(usize, &mut T),
{
    items.iter_mut().enumerate().for_each(|(i, t)| f(i, t));
}

/// Fallible per-box dispatch; stops at the first error
#[cfg(feature = "rayon")]
pub fn try_for_each_box<T, E, F>(items: &mut [T], f: F) -> Result<(), E>
where
    T: Send,
    E: Send,
    F: Fn(usize, &mut T) -> Result<(), E> + Sync + Send,
{
    use rayon::prelude::*;
    items
        .par_iter_mut()
        .enumerate()
        .try_for_each(|(i, t)| f(i, t))
}

/// Sequential fallible dispatch (fallback)
#[cfg(not(feature = "rayon"))]
pub fn try_for_each_box<T, E, F>(items: &mut [T], f: F) -> Result<(), E>
where
    F: Fn(usize, &mut T) -> Result<(), E>,
{
    items.iter_mut().enumerate().try_for_each(|(i, t)| f(i, t))
}

/// Parallel map with index
#[cfg(feature = "rayon")]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    use rayon::prelude::*;
    (0..count).into_par_iter().map(f).collect()
}

/// Sequential map with index (fallback)
#[cfg(not(feature = "rayon"))]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    F: Fn(usize) -> U,
{
    (0..count).map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_each_box() {
        let mut data = vec![1, 2, 3, 4];
        for_each_box(&mut data, |i, x| *x += i * 10);
        assert_eq!(data, vec![1, 12, 23, 34]);
    }

    #[test]
    fn test_try_for_each_box_reports_error() {
        let mut data = vec![0usize; 5];
        let result = try_for_each_box(&mut data, |i, x| {
            *x = i;
            if i == 3 { Err(i) } else { Ok(()) }
        });
        assert_eq!(result, Err(3));
    }

    #[test]
    fn test_parallel_map_indexed() {
        let result = parallel_map_indexed(5, |i| i * 2);
        assert_eq!(result, vec![0, 2, 4, 6, 8]);
    }
}
