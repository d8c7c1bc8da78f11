//! Planar subdivision and triangulation of a closed polyline.
//!
//! The polyline is treated as a closed loop of directed edges. Edges are
//! split at their pairwise intersections, the resulting planar graph is
//! walked into faces, and every bounded face whose sample point has a
//! non-zero winding number with respect to the original loop is
//! ear-clipped into triangles.

use log::debug;
use std::collections::{BTreeSet, HashMap};

use crate::geometry::Point;

/// The result of triangulating a closed polyline: the input vertices
/// verbatim, followed by any vertices created at edge crossings, plus
/// counter-clockwise triangles indexing into that list.
pub(crate) struct Triangulation {
    pub vertices: Vec<Point>,
    pub triangles: Vec<[u32; 3]>,
}

/// Nodes are positions deduplicated bit-exactly; each remembers the output
/// vertex it stands for (the first input vertex at that position, or a
/// created crossing vertex).
#[derive(Default)]
struct NodeSet {
    lookup: HashMap<(u32, u32), usize>,
    positions: Vec<Point>,
    output_indices: Vec<u32>,
}

impl NodeSet {
    /// Returns the node id for `position`, and whether it was newly
    /// created.
    fn find_or_insert(&mut self, position: Point) -> (usize, bool) {
        let key = (position.x.to_bits(), position.y.to_bits());
        if let Some(&id) = self.lookup.get(&key) {
            return (id, false);
        }
        let id = self.positions.len();
        self.lookup.insert(key, id);
        self.positions.push(position);
        self.output_indices.push(u32::MAX);
        (id, true)
    }
}

fn cross(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}

pub(crate) fn triangulate_closed_polyline(points: &[Point]) -> Triangulation {
    let mut nodes = NodeSet::default();
    let mut vertices: Vec<Point> = points.to_vec();

    let input_nodes: Vec<usize> = points
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let (id, created) = nodes.find_or_insert(p);
            if created {
                nodes.output_indices[id] = i as u32;
            }
            id
        })
        .collect();

    // Directed edges of the implicitly closed loop; zero-length edges
    // contribute nothing to the subdivision.
    let mut edges: Vec<(usize, usize)> = Vec::new();
    for i in 0..input_nodes.len() {
        let a = input_nodes[i];
        let b = input_nodes[(i + 1) % input_nodes.len()];
        if a != b {
            edges.push((a, b));
        }
    }

    let splits = split_edges_at_intersections(&edges, &mut nodes, &mut vertices);

    // Chop each edge at its sorted split points, and collect the unique
    // undirected edge set of the subdivision.
    let mut undirected: BTreeSet<(usize, usize)> = BTreeSet::new();
    for (e, &(a, b)) in edges.iter().enumerate() {
        let mut cuts = splits[e].clone();
        cuts.sort_by(|x, y| x.0.total_cmp(&y.0));
        let mut chain = Vec::with_capacity(cuts.len() + 2);
        chain.push(a);
        chain.extend(cuts.iter().map(|&(_, node)| node));
        chain.push(b);
        for window in chain.windows(2) {
            if window[0] != window[1] {
                let key = (window[0].min(window[1]), window[0].max(window[1]));
                undirected.insert(key);
            }
        }
    }

    let faces = extract_bounded_faces(&undirected, &nodes.positions);
    debug!(
        "subdivision: {} nodes, {} edges, {} bounded faces",
        nodes.positions.len(),
        undirected.len(),
        faces.len()
    );

    let mut triangles: Vec<[u32; 3]> = Vec::new();
    for face in &faces {
        let face_triangles = ear_clip(face, &nodes.positions);
        let Some(sample) = face_triangles.first().map(|t| {
            let (a, b, c) = (
                nodes.positions[t[0]],
                nodes.positions[t[1]],
                nodes.positions[t[2]],
            );
            Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
        }) else {
            continue;
        };
        if winding_number(points, sample) == 0 {
            continue;
        }
        triangles.extend(face_triangles.iter().map(|t| {
            [
                nodes.output_indices[t[0]],
                nodes.output_indices[t[1]],
                nodes.output_indices[t[2]],
            ]
        }));
    }

    Triangulation {
        vertices,
        triangles,
    }
}

/// Finds every pairwise intersection among `edges`; crossing points become
/// nodes (and output vertices, when not already present), and each edge
/// collects its interior split parameters.
fn split_edges_at_intersections(
    edges: &[(usize, usize)],
    nodes: &mut NodeSet,
    vertices: &mut Vec<Point>,
) -> Vec<Vec<(f64, usize)>> {
    let mut splits: Vec<Vec<(f64, usize)>> = vec![Vec::new(); edges.len()];

    for i in 0..edges.len() {
        for j in (i + 1)..edges.len() {
            let (a0, a1) = (nodes.positions[edges[i].0], nodes.positions[edges[i].1]);
            let (b0, b1) = (nodes.positions[edges[j].0], nodes.positions[edges[j].1]);
            let d1 = (a1.x as f64 - a0.x as f64, a1.y as f64 - a0.y as f64);
            let d2 = (b1.x as f64 - b0.x as f64, b1.y as f64 - b0.y as f64);
            let offset = (b0.x as f64 - a0.x as f64, b0.y as f64 - a0.y as f64);
            let denominator = cross(d1.0, d1.1, d2.0, d2.1);

            if denominator != 0.0 {
                let t = cross(offset.0, offset.1, d2.0, d2.1) / denominator;
                let u = cross(offset.0, offset.1, d1.0, d1.1) / denominator;
                if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
                    continue;
                }
                let crossing = Point::new(
                    (a0.x as f64 + t * d1.0) as f32,
                    (a0.y as f64 + t * d1.1) as f32,
                );
                let (node, created) = nodes.find_or_insert(crossing);
                if created {
                    nodes.output_indices[node] = vertices.len() as u32;
                    vertices.push(crossing);
                }
                if node != edges[i].0 && node != edges[i].1 {
                    splits[i].push((t, node));
                }
                if node != edges[j].0 && node != edges[j].1 {
                    splits[j].push((u, node));
                }
            } else if cross(offset.0, offset.1, d1.0, d1.1) == 0.0 {
                // Collinear overlap: split each edge at the other's interior
                // endpoints. No new positions arise, so no vertices are
                // created.
                let len_sq_1 = d1.0 * d1.0 + d1.1 * d1.1;
                let len_sq_2 = d2.0 * d2.0 + d2.1 * d2.1;
                for &endpoint in &[edges[j].0, edges[j].1] {
                    if endpoint == edges[i].0 || endpoint == edges[i].1 {
                        continue;
                    }
                    let p = nodes.positions[endpoint];
                    let t = ((p.x as f64 - a0.x as f64) * d1.0
                        + (p.y as f64 - a0.y as f64) * d1.1)
                        / len_sq_1;
                    if t > 0.0 && t < 1.0 {
                        splits[i].push((t, endpoint));
                    }
                }
                for &endpoint in &[edges[i].0, edges[i].1] {
                    if endpoint == edges[j].0 || endpoint == edges[j].1 {
                        continue;
                    }
                    let p = nodes.positions[endpoint];
                    let u = ((p.x as f64 - b0.x as f64) * d2.0
                        + (p.y as f64 - b0.y as f64) * d2.1)
                        / len_sq_2;
                    if u > 0.0 && u < 1.0 {
                        splits[j].push((u, endpoint));
                    }
                }
            }
        }
    }
    splits
}

/// Walks the half-edges of the subdivision into faces and returns the node
/// cycles of the bounded (positive-area) ones.
fn extract_bounded_faces(
    undirected: &BTreeSet<(usize, usize)>,
    positions: &[Point],
) -> Vec<Vec<usize>> {
    struct HalfEdge {
        from: usize,
        to: usize,
        twin: usize,
        next: usize,
    }

    let mut half_edges: Vec<HalfEdge> = Vec::with_capacity(undirected.len() * 2);
    for &(a, b) in undirected {
        let index = half_edges.len();
        half_edges.push(HalfEdge {
            from: a,
            to: b,
            twin: index + 1,
            next: usize::MAX,
        });
        half_edges.push(HalfEdge {
            from: b,
            to: a,
            twin: index,
            next: usize::MAX,
        });
    }

    let direction_angle = |h: &HalfEdge| -> f64 {
        let from = positions[h.from];
        let to = positions[h.to];
        (to.y as f64 - from.y as f64).atan2(to.x as f64 - from.x as f64)
    };

    let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
    for (index, half_edge) in half_edges.iter().enumerate() {
        outgoing.entry(half_edge.from).or_default().push(index);
    }
    for list in outgoing.values_mut() {
        list.sort_by(|&x, &y| {
            direction_angle(&half_edges[x]).total_cmp(&direction_angle(&half_edges[y]))
        });
    }

    // The successor of u→v in its face is the outgoing edge of v next
    // clockwise from v→u; with counter-clockwise-sorted lists that is the
    // previous list entry. This orients bounded faces counter-clockwise.
    for index in 0..half_edges.len() {
        let twin = half_edges[index].twin;
        let at = &outgoing[&half_edges[index].to];
        let position = at
            .iter()
            .position(|&e| e == twin)
            .expect("every half-edge is registered at its origin");
        half_edges[index].next = at[(position + at.len() - 1) % at.len()];
    }

    let mut visited = vec![false; half_edges.len()];
    let mut faces = Vec::new();
    for start in 0..half_edges.len() {
        if visited[start] {
            continue;
        }
        let mut walk = Vec::new();
        let mut current = start;
        loop {
            visited[current] = true;
            walk.push(half_edges[current].from);
            current = half_edges[current].next;
            if current == start || walk.len() > half_edges.len() {
                break;
            }
        }
        let mut doubled_area = 0.0f64;
        for i in 0..walk.len() {
            let p = positions[walk[i]];
            let q = positions[walk[(i + 1) % walk.len()]];
            doubled_area += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
        }
        if doubled_area > 0.0 {
            faces.push(walk);
        }
    }
    faces
}

/// Ear-clips a counter-clockwise (weakly simple) polygon of node ids into
/// triangles. Zero-area ears are dropped without emitting a triangle.
fn ear_clip(face: &[usize], positions: &[Point]) -> Vec<[usize; 3]> {
    let corner_cross = |prev: usize, cur: usize, next: usize| -> f64 {
        let a = positions[prev];
        let b = positions[cur];
        let c = positions[next];
        cross(
            b.x as f64 - a.x as f64,
            b.y as f64 - a.y as f64,
            c.x as f64 - a.x as f64,
            c.y as f64 - a.y as f64,
        )
    };
    let strictly_inside = |p0: usize, p1: usize, p2: usize, q: usize| -> bool {
        let (a, b, c, p) = (
            positions[p0],
            positions[p1],
            positions[p2],
            positions[q],
        );
        let d0 = cross(
            b.x as f64 - a.x as f64,
            b.y as f64 - a.y as f64,
            p.x as f64 - a.x as f64,
            p.y as f64 - a.y as f64,
        );
        let d1 = cross(
            c.x as f64 - b.x as f64,
            c.y as f64 - b.y as f64,
            p.x as f64 - b.x as f64,
            p.y as f64 - b.y as f64,
        );
        let d2 = cross(
            a.x as f64 - c.x as f64,
            a.y as f64 - c.y as f64,
            p.x as f64 - c.x as f64,
            p.y as f64 - c.y as f64,
        );
        d0 > 0.0 && d1 > 0.0 && d2 > 0.0
    };

    let mut ring: Vec<usize> = face.to_vec();
    let mut triangles = Vec::new();
    while ring.len() >= 3 {
        let n = ring.len();
        let mut clipped = false;
        for i in 0..n {
            let prev = ring[(i + n - 1) % n];
            let cur = ring[i];
            let next = ring[(i + 1) % n];
            let corner = corner_cross(prev, cur, next);
            if corner < 0.0 {
                continue;
            }
            if corner == 0.0 {
                // A flat or pinched corner; remove it without a triangle.
                ring.remove(i);
                clipped = true;
                break;
            }
            let blocked = ring.iter().any(|&other| {
                other != prev
                    && other != cur
                    && other != next
                    && strictly_inside(prev, cur, next, other)
            });
            if !blocked {
                triangles.push([prev, cur, next]);
                ring.remove(i);
                clipped = true;
                break;
            }
        }
        if !clipped {
            // No clean ear; clip the flattest corner so the loop always
            // terminates on imperfect input.
            let mut flattest = 0;
            let mut flattest_cross = f64::INFINITY;
            for i in 0..ring.len() {
                let c = corner_cross(
                    ring[(i + ring.len() - 1) % ring.len()],
                    ring[i],
                    ring[(i + 1) % ring.len()],
                )
                .abs();
                if c < flattest_cross {
                    flattest_cross = c;
                    flattest = i;
                }
            }
            let n = ring.len();
            let prev = ring[(flattest + n - 1) % n];
            let cur = ring[flattest];
            let next = ring[(flattest + 1) % n];
            if corner_cross(prev, cur, next) > 0.0 {
                triangles.push([prev, cur, next]);
            }
            ring.remove(flattest);
        }
        if ring.len() < 3 {
            break;
        }
    }
    triangles
}

/// The winding number of the closed polyline `points` around `p`, by
/// signed ray crossings.
fn winding_number(points: &[Point], p: Point) -> i32 {
    let is_left = |a: Point, b: Point| -> f64 {
        cross(
            b.x as f64 - a.x as f64,
            b.y as f64 - a.y as f64,
            p.x as f64 - a.x as f64,
            p.y as f64 - a.y as f64,
        )
    };
    let mut winding = 0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        if a.y <= p.y {
            if b.y > p.y && is_left(a, b) > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && is_left(a, b) < 0.0 {
            winding -= 1;
        }
    }
    winding
}
