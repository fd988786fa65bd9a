#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that would sort an array.
pub fn argsort<T: std::cmp::PartialOrd>(x: &[T], order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..x.len()).collect();
    match order {
        SortOrder::Ascending => indices.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap()),
        SortOrder::Descending => indices.sort_by(|&a, &b| x[b].partial_cmp(&x[a]).unwrap()),
    }
    indices
}

/// clamp01 limits a value to the closed interval [0, 1].
pub fn clamp01(x: f64) -> f64 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argsort_ascending_returns_sorting_indices() {
        let x = vec![3.0, 1.0, 2.0];
        assert_eq!(argsort(&x, SortOrder::Ascending), vec![1, 2, 0]);
    }

    #[test]
    fn argsort_descending_reverses_order() {
        let x = vec![3.0, 1.0, 2.0];
        assert_eq!(argsort(&x, SortOrder::Descending), vec![0, 2, 1]);
    }

    #[test]
    fn argsort_is_stable_on_ties() {
        let x = vec![1.0, 1.0, 0.5];
        assert_eq!(argsort(&x, SortOrder::Ascending), vec![2, 0, 1]);
    }

    #[test]
    fn clamp01_limits_both_ends() {
        assert_eq!(clamp01(-0.2), 0.0);
        assert_eq!(clamp01(0.4), 0.4);
        assert_eq!(clamp01(1.7), 1.0);
    }
}
