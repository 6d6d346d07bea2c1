//! # Spatial Index Module
//!
//! ## Purpose
//! Broad-phase spatial lookup over one layer's geometries. Overlap and
//! proximity checks use it to obtain candidate record sets instead of
//! comparing all pairs, keeping worst-case cost near O(n log n).
//!
//! ## Input/Output Specification
//! - **Input**: A loaded [`Layer`](crate::workspace::Layer); query geometries
//!   with a predicate (`intersects`, `within-distance(d)`, `contains`)
//! - **Output**: Candidate record indices only; callers must re-verify with
//!   exact geometric predicates (narrow phase) before reporting an issue
//! - **Lifecycle**: rebuilt per validation run, never mutated after
//!   construction, never persisted
//!
//! ## Key Features
//! - Uniform bounding-box grid sized from the layer's extent and record count
//! - Candidate queries by rectangle, geometry, or expanded distance window
//! - Deterministic, duplicate-free candidate ordering

use crate::workspace::Layer;
use geo::{BoundingRect, Coord, Geometry, Rect};
use std::collections::{BTreeSet, HashMap};

/// Broad-phase predicates supported by [`GridIndex::query`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryPredicate {
    Intersects,
    WithinDistance(f64),
    Contains,
}

/// Bounding-box grid over one layer's geometries
#[derive(Debug)]
pub struct GridIndex {
    cell_size: f64,
    origin: Coord<f64>,
    bounds: Option<Rect<f64>>,
    cells: HashMap<(i64, i64), Vec<usize>>,
    boxes: Vec<Option<Rect<f64>>>,
}

impl GridIndex {
    /// Build the index over a layer. Records without geometry are skipped.
    pub fn build(layer: &Layer) -> Self {
        let boxes: Vec<Option<Rect<f64>>> = layer
            .records()
            .iter()
            .map(|r| r.geometry().and_then(bounding_rect))
            .collect();

        let mut bounds: Option<Rect<f64>> = None;
        let mut populated = 0usize;
        for rect in boxes.iter().flatten() {
            populated += 1;
            bounds = Some(match bounds {
                None => *rect,
                Some(b) => merge(b, *rect),
            });
        }

        let (origin, cell_size) = match bounds {
            None => (Coord { x: 0.0, y: 0.0 }, 1.0),
            Some(b) => {
                let extent = b.width().max(b.height());
                let divisions = (populated as f64).sqrt().ceil().max(1.0);
                let cell = extent / divisions;
                // degenerate extents (a single point, coincident records)
                // would otherwise produce a near-zero cell size
                let cell = if cell.is_finite() && cell > 0.0 { cell } else { 1.0 };
                (b.min(), cell)
            }
        };

        let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (index, rect) in boxes.iter().enumerate() {
            if let Some(rect) = rect {
                let (x_range, y_range) = cell_span(origin, cell_size, *rect);
                for cx in x_range {
                    for cy in y_range.clone() {
                        cells.entry((cx, cy)).or_default().push(index);
                    }
                }
            }
        }

        tracing::debug!(
            records = boxes.len(),
            indexed = populated,
            cells = cells.len(),
            cell_size,
            "spatial index built"
        );

        Self {
            cell_size,
            origin,
            bounds,
            cells,
            boxes,
        }
    }

    /// Number of records the index was built over
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Bounding box of one indexed record
    pub fn bounding_box(&self, index: usize) -> Option<Rect<f64>> {
        self.boxes.get(index).copied().flatten()
    }

    /// Candidate records whose bounding box may satisfy `predicate` against
    /// `geometry`. Broad phase only: a superset of the exact answer.
    pub fn query(&self, geometry: &Geometry<f64>, predicate: QueryPredicate) -> Vec<usize> {
        let rect = match bounding_rect(geometry) {
            Some(rect) => rect,
            None => return Vec::new(),
        };
        let window = match predicate {
            QueryPredicate::Intersects | QueryPredicate::Contains => rect,
            QueryPredicate::WithinDistance(d) => expand(rect, d.max(0.0)),
        };
        self.candidates_in_rect(window)
    }

    /// Candidate records whose bounding box intersects `window`
    pub fn candidates_in_rect(&self, window: Rect<f64>) -> Vec<usize> {
        // clamp to the indexed extent so an oversized query window cannot
        // walk an unbounded range of empty cells
        let bounds = match self.bounds {
            Some(bounds) => bounds,
            None => return Vec::new(),
        };
        if !rects_intersect(window, bounds) {
            return Vec::new();
        }
        let window = clamp(window, bounds);

        let mut found = BTreeSet::new();
        let (x_range, y_range) = cell_span(self.origin, self.cell_size, window);
        for cx in x_range {
            for cy in y_range.clone() {
                if let Some(indices) = self.cells.get(&(cx, cy)) {
                    for &index in indices {
                        if let Some(Some(rect)) = self.boxes.get(index) {
                            if rects_intersect(*rect, window) {
                                found.insert(index);
                            }
                        }
                    }
                }
            }
        }
        found.into_iter().collect()
    }
}

fn bounding_rect(geometry: &Geometry<f64>) -> Option<Rect<f64>> {
    geometry.bounding_rect()
}

fn merge(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

fn expand(rect: Rect<f64>, by: f64) -> Rect<f64> {
    Rect::new(
        Coord {
            x: rect.min().x - by,
            y: rect.min().y - by,
        },
        Coord {
            x: rect.max().x + by,
            y: rect.max().y + by,
        },
    )
}

fn clamp(window: Rect<f64>, bounds: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: window.min().x.max(bounds.min().x),
            y: window.min().y.max(bounds.min().y),
        },
        Coord {
            x: window.max().x.min(bounds.max().x),
            y: window.max().y.min(bounds.max().y),
        },
    )
}

fn rects_intersect(a: Rect<f64>, b: Rect<f64>) -> bool {
    a.min().x <= b.max().x && b.min().x <= a.max().x && a.min().y <= b.max().y && b.min().y <= a.max().y
}

type CellRange = std::ops::RangeInclusive<i64>;

fn cell_span(origin: Coord<f64>, cell_size: f64, rect: Rect<f64>) -> (CellRange, CellRange) {
    let to_cell = |v: f64, o: f64| ((v - o) / cell_size).floor() as i64;
    let x_range = to_cell(rect.min().x, origin.x)..=to_cell(rect.max().x, origin.x);
    let y_range = to_cell(rect.min().y, origin.y)..=to_cell(rect.max().y, origin.y);
    (x_range, y_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::fixtures::*;
    use crate::workspace::{LayerId, Workspace};
    use serde_json::json;

    fn cluster_layer(features: serde_json::Value) -> crate::workspace::Layer {
        let dir = tempfile::tempdir().unwrap();
        write_layer(dir.path(), "OUT_DropClusters.geojson", features);
        Workspace::open(dir.path())
            .unwrap()
            .load(LayerId::DropClusters)
            .unwrap()
    }

    #[test]
    fn candidates_are_a_superset_of_true_intersections() {
        let layer = cluster_layer(json!([
            square_feature(json!({"AGG_ID": 1}), 0.0, 0.0, 2.0),
            square_feature(json!({"AGG_ID": 2}), 1.0, 1.0, 2.0),
            square_feature(json!({"AGG_ID": 3}), 10.0, 10.0, 2.0),
        ]));
        let index = GridIndex::build(&layer);

        let query = layer.records()[0].geometry().unwrap();
        let candidates = index.query(query, QueryPredicate::Intersects);
        // the truly intersecting pair must be present; the far square not
        assert!(candidates.contains(&0));
        assert!(candidates.contains(&1));
        assert!(!candidates.contains(&2));
    }

    #[test]
    fn within_distance_expands_the_window() {
        let layer = cluster_layer(json!([
            square_feature(json!({"AGG_ID": 1}), 0.0, 0.0, 1.0),
            square_feature(json!({"AGG_ID": 2}), 5.0, 0.0, 1.0),
        ]));
        let index = GridIndex::build(&layer);
        let query = layer.records()[0].geometry().unwrap();

        let near = index.query(query, QueryPredicate::Intersects);
        assert!(!near.contains(&1));

        let wide = index.query(query, QueryPredicate::WithinDistance(10.0));
        assert!(wide.contains(&1));
    }

    #[test]
    fn degenerate_extent_with_an_oversized_window_stays_bounded() {
        let dir = tempfile::tempdir().unwrap();
        write_layer(
            dir.path(),
            "OUT_PrimDistributionPoints.geojson",
            json!([point_feature(json!({"ID": "P1"}), 3.0, 4.0)]),
        );
        let layer = Workspace::open(dir.path())
            .unwrap()
            .load(LayerId::PrimDistributionPoints)
            .unwrap();
        let index = GridIndex::build(&layer);

        let probe = geo::Geometry::Point(geo::Point::new(0.0, 0.0));
        // far-away probe with a tiny window: nothing, and quickly
        assert!(index
            .query(&probe, QueryPredicate::WithinDistance(0.01))
            .is_empty());
        // huge window still terminates and finds the single record
        assert_eq!(
            index.query(&probe, QueryPredicate::WithinDistance(1.0e9)),
            vec![0]
        );
    }

    #[test]
    fn empty_layer_builds_an_empty_index() {
        let layer = cluster_layer(json!([]));
        let index = GridIndex::build(&layer);
        assert!(index.is_empty());
        let probe = geo::Geometry::Point(geo::Point::new(0.0, 0.0));
        assert!(index.query(&probe, QueryPredicate::Intersects).is_empty());
    }
}
