//! # Ordering Graph
//!
//! Kahn's algorithm over dense node indices. Ready nodes are taken lowest
//! index first, so callers that number nodes in registration order get a
//! deterministic order with registration-order tie breaking.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Topologically sorts nodes `0..count` along `edges` (`from` runs before
/// `to`).
///
/// # Errors
///
/// Returns the nodes left unsorted, in ascending order, when the graph has a
/// cycle. The set contains every cycle and everything downstream of one.
pub(crate) fn topological_sort(
    count: usize,
    edges: &[(usize, usize)],
) -> Result<Vec<usize>, Vec<usize>> {
    let mut in_degree = vec![0usize; count];
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); count];

    for &(from, to) in edges {
        adjacency[from].push(to);
        in_degree[to] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &degree)| degree == 0)
        .map(|(node, _)| Reverse(node))
        .collect();

    let mut sorted = Vec::with_capacity(count);

    while let Some(Reverse(node)) = ready.pop() {
        sorted.push(node);
        for &next in &adjacency[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    if sorted.len() == count {
        Ok(sorted)
    } else {
        Err((0..count).filter(|&node| in_degree[node] > 0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties_follow_index() {
        assert_eq!(topological_sort(3, &[]), Ok(vec![0, 1, 2]));
    }

    #[test]
    fn test_edges_respected() {
        // 2 -> 0, 1 -> 2
        let order = topological_sort(3, &[(2, 0), (1, 2)]).unwrap();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_duplicate_edges() {
        let order = topological_sort(2, &[(1, 0), (1, 0)]).unwrap();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_cycle_reports_stuck_nodes() {
        // 0 is free, 1 <-> 2, 3 depends on the cycle
        let stuck = topological_sort(4, &[(1, 2), (2, 1), (2, 3)]).unwrap_err();
        assert_eq!(stuck, vec![1, 2, 3]);
    }
}
