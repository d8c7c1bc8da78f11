//! A bulk-built, immutable bounding-box R-tree.

use crate::geometry::{Intersects, Rect};

/// Nodes per branch.
const FANOUT: usize = 8;

/// An immutable R-tree over axis-aligned bounding boxes, bulk-built once
/// with a sort-tile-recursive pass and stored as flat per-level arrays. A
/// node's children are found arithmetically (child `i` of node `n` is node
/// `n * FANOUT + i` of the level below), so the tree holds no pointers;
/// leaves carry their bounds and a small element value, typically an index
/// into some owning container.
///
/// The tree is thread-compatible: once built it is never modified, so
/// shared references may be used freely across threads.
#[derive(Debug)]
pub struct StaticRTree<T> {
    leaves: Vec<(Rect, T)>,
    /// `branch_levels[0]` holds the bounds of groups of `FANOUT` leaves,
    /// `branch_levels[1]` groups of `branch_levels[0]`, and so on up to a
    /// single root.
    branch_levels: Vec<Vec<Rect>>,
}

impl<T> StaticRTree<T> {
    /// Bulk-builds a tree over `items`, computing each element's bounds once
    /// with `bounds`.
    pub fn new<I>(items: I, bounds: impl Fn(&T) -> Rect) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut leaves: Vec<(Rect, T)> =
            items.into_iter().map(|item| (bounds(&item), item)).collect();

        // Sort-tile-recursive packing: order by x-center, cut into vertical
        // slices, then order each slice by y-center, so that consecutive
        // leaves group into spatially compact nodes.
        if leaves.len() > FANOUT {
            let node_count = leaves.len().div_ceil(FANOUT);
            let slice_count = (node_count as f64).sqrt().ceil() as usize;
            let slice_size = leaves.len().div_ceil(slice_count);
            leaves.sort_by(|a, b| a.0.center().x.total_cmp(&b.0.center().x));
            for slice in leaves.chunks_mut(slice_size) {
                slice.sort_by(|a, b| a.0.center().y.total_cmp(&b.0.center().y));
            }
        }

        let mut branch_levels: Vec<Vec<Rect>> = Vec::new();
        let mut child_rects: Vec<Rect> = leaves.iter().map(|(rect, _)| *rect).collect();
        while child_rects.len() > 1 {
            let parents: Vec<Rect> = child_rects
                .chunks(FANOUT)
                .map(|chunk| {
                    let mut rect = chunk[0];
                    for child in &chunk[1..] {
                        rect.join_rect(child);
                    }
                    rect
                })
                .collect();
            child_rects = parents.clone();
            branch_levels.push(parents);
        }

        StaticRTree {
            leaves,
            branch_levels,
        }
    }

    /// The number of elements in the tree.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Calls `visitor` for every element whose bounds intersect `query`.
    /// Returning `false` from the visitor stops the traversal. The
    /// visitation order depends only on the tree's structure; treat it as
    /// arbitrary.
    pub fn visit_intersected_elements<V>(&self, query: &Rect, mut visitor: V)
    where
        V: FnMut(&T) -> bool,
    {
        if self.leaves.is_empty() {
            return;
        }
        let top = self.branch_levels.len();
        let top_count = match top {
            0 => self.leaves.len(),
            _ => self.branch_levels[top - 1].len(),
        };
        for index in 0..top_count {
            if !self.visit_node(top, index, query, &mut visitor) {
                return;
            }
        }
    }

    fn visit_node<V>(&self, level: usize, index: usize, query: &Rect, visitor: &mut V) -> bool
    where
        V: FnMut(&T) -> bool,
    {
        if level == 0 {
            let (bounds, item) = &self.leaves[index];
            if bounds.intersects(query) {
                return visitor(item);
            }
            return true;
        }
        if !self.branch_levels[level - 1][index].intersects(query) {
            return true;
        }
        let child_count = match level {
            1 => self.leaves.len(),
            _ => self.branch_levels[level - 2].len(),
        };
        let first = index * FANOUT;
        let end = (first + FANOUT).min(child_count);
        for child in first..end {
            if !self.visit_node(level - 1, child, query, visitor) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn grid_rects(side: i32) -> Vec<Rect> {
        let mut rects = Vec::new();
        for i in 0..side {
            for j in 0..side {
                rects.push(Rect::from_center_and_dimensions(
                    Point::new(i as f32 * 10.0, j as f32 * 10.0),
                    4.0,
                    4.0,
                ));
            }
        }
        rects
    }

    fn collect_hits(tree: &StaticRTree<usize>, query: &Rect) -> Vec<usize> {
        let mut hits = Vec::new();
        tree.visit_intersected_elements(query, |&i| {
            hits.push(i);
            true
        });
        hits.sort_unstable();
        hits
    }

    #[test]
    fn test_empty_tree_visits_nothing() {
        let tree: StaticRTree<usize> = StaticRTree::new([], |_| unreachable!());
        assert!(tree.is_empty());
        tree.visit_intersected_elements(
            &Rect::from_two_points(Point::new(-100.0, -100.0), Point::new(100.0, 100.0)),
            |_| panic!("no elements to visit"),
        );
    }

    #[test]
    fn test_single_element() {
        let rect = Rect::from_two_points(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        let tree = StaticRTree::new([7usize], |_| rect);
        assert_eq!(tree.len(), 1);
        assert_eq!(
            collect_hits(
                &tree,
                &Rect::from_two_points(Point::new(0.5, 0.5), Point::new(2.0, 2.0))
            ),
            vec![7]
        );
        assert!(collect_hits(
            &tree,
            &Rect::from_two_points(Point::new(5.0, 5.0), Point::new(6.0, 6.0))
        )
        .is_empty());
    }

    #[test]
    fn test_visits_match_brute_force() {
        let rects = grid_rects(13);
        let tree = StaticRTree::new(0..rects.len(), |&i| rects[i]);
        for query in [
            Rect::from_two_points(Point::new(-3.0, -3.0), Point::new(25.0, 42.0)),
            Rect::from_two_points(Point::new(50.0, 50.0), Point::new(51.0, 51.0)),
            Rect::from_two_points(Point::new(-500.0, -500.0), Point::new(500.0, 500.0)),
            Rect::from_two_points(Point::new(200.0, 200.0), Point::new(300.0, 300.0)),
            Rect::from_center_and_dimensions(Point::new(60.0, 60.0), 0.0, 0.0),
        ] {
            let expected: Vec<usize> = (0..rects.len())
                .filter(|&i| rects[i].intersects(&query))
                .collect();
            assert_eq!(collect_hits(&tree, &query), expected);
        }
    }

    #[test]
    fn test_touching_bounds_are_visited() {
        let rects = vec![Rect::from_two_points(Point::new(0.0, 0.0), Point::new(1.0, 1.0))];
        let tree = StaticRTree::new(0..1usize, |&i| rects[i]);
        // A query that merely touches a corner still hits.
        assert_eq!(
            collect_hits(
                &tree,
                &Rect::from_two_points(Point::new(1.0, 1.0), Point::new(2.0, 2.0))
            ),
            vec![0]
        );
    }

    #[test]
    fn test_early_exit_stops_traversal() {
        let rects = grid_rects(8);
        let tree = StaticRTree::new(0..rects.len(), |&i| rects[i]);
        let everything = Rect::from_two_points(Point::new(-100.0, -100.0), Point::new(200.0, 200.0));
        let mut visited = 0;
        tree.visit_intersected_elements(&everything, |_| {
            visited += 1;
            visited < 5
        });
        assert_eq!(visited, 5);
    }

    #[test]
    fn test_visitation_is_stable_for_a_fixed_tree() {
        let rects = grid_rects(6);
        let tree = StaticRTree::new(0..rects.len(), |&i| rects[i]);
        let query = Rect::from_two_points(Point::new(0.0, 0.0), Point::new(30.0, 30.0));
        let mut first = Vec::new();
        tree.visit_intersected_elements(&query, |&i| {
            first.push(i);
            true
        });
        let mut second = Vec::new();
        tree.visit_intersected_elements(&query, |&i| {
            second.push(i);
            true
        });
        assert_eq!(first, second);
    }
}
