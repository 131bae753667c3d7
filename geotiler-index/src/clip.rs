//! Clipping of tile-space geometries to the buffered tile rectangle.
//!
//! Lines are clipped segment by segment and may fall apart into several pieces. Polygon rings are clipped with
//! Sutherland-Hodgman, so a clipped polygon always stays a single polygon. Clipping can leave repeated consecutive
//! points in rings; they are kept here and removed later when the feature is written to the tile.

use geo::{BoundingRect, Coord, LineString, Polygon, Rect};

pub(crate) fn contains(bounds: &Rect<f64>, coord: &Coord<f64>) -> bool {
    coord.x >= bounds.min().x
        && coord.x <= bounds.max().x
        && coord.y >= bounds.min().y
        && coord.y <= bounds.max().y
}

pub(crate) fn intersects(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.max().x >= b.min().x && a.min().x <= b.max().x && a.max().y >= b.min().y && a.min().y <= b.max().y
}

fn is_inside(inner: &Rect<f64>, outer: &Rect<f64>) -> bool {
    contains(outer, &inner.min()) && contains(outer, &inner.max())
}

/// Clips a line string, returning the pieces that are inside the bounds.
pub(crate) fn clip_line(line: &LineString<f64>, bounds: &Rect<f64>) -> Vec<LineString<f64>> {
    match line.bounding_rect() {
        Some(rect) if is_inside(&rect, bounds) => return vec![line.clone()],
        Some(rect) if !intersects(&rect, bounds) => return vec![],
        None => return vec![],
        _ => {}
    }

    let mut pieces = vec![];
    let mut current: Vec<Coord<f64>> = vec![];

    for segment in line.lines() {
        match clip_segment(segment.start, segment.end, bounds) {
            Some((start, end)) => {
                if current.last() != Some(&start) {
                    flush_piece(&mut current, &mut pieces);
                    current.push(start);
                }
                current.push(end);

                if end != segment.end {
                    flush_piece(&mut current, &mut pieces);
                }
            }
            None => flush_piece(&mut current, &mut pieces),
        }
    }

    flush_piece(&mut current, &mut pieces);
    pieces
}

fn flush_piece(current: &mut Vec<Coord<f64>>, pieces: &mut Vec<LineString<f64>>) {
    let piece = std::mem::take(current);
    if piece.len() >= 2 {
        pieces.push(LineString::new(piece));
    }
}

/// Liang-Barsky clipping of a single segment.
fn clip_segment(
    start: Coord<f64>,
    end: Coord<f64>,
    bounds: &Rect<f64>,
) -> Option<(Coord<f64>, Coord<f64>)> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let (min, max) = (bounds.min(), bounds.max());

    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    for (p, q) in [
        (-dx, start.x - min.x),
        (dx, max.x - start.x),
        (-dy, start.y - min.y),
        (dy, max.y - start.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }

        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| {
        if t == 0.0 {
            start
        } else if t == 1.0 {
            end
        } else {
            Coord {
                x: start.x + t * dx,
                y: start.y + t * dy,
            }
        }
    };

    Some((at(t0), at(t1)))
}

/// Clips a polygon. Returns `None` if nothing of the exterior ring is left.
pub(crate) fn clip_polygon(polygon: &Polygon<f64>, bounds: &Rect<f64>) -> Option<Polygon<f64>> {
    let rect = polygon.bounding_rect()?;
    if !intersects(&rect, bounds) {
        return None;
    }

    if is_inside(&rect, bounds) {
        return Some(polygon.clone());
    }

    let exterior = clip_ring(polygon.exterior(), bounds);
    if exterior.0.len() < 4 {
        return None;
    }

    let interiors = polygon
        .interiors()
        .iter()
        .map(|ring| clip_ring(ring, bounds))
        .filter(|ring| ring.0.len() >= 4)
        .collect();

    Some(Polygon::new(exterior, interiors))
}

/// Sutherland-Hodgman clipping of a ring against an axis-aligned rectangle.
fn clip_ring(ring: &LineString<f64>, bounds: &Rect<f64>) -> LineString<f64> {
    let (min, max) = (bounds.min(), bounds.max());
    let mut output: Vec<Coord<f64>> = ring.0.clone();

    output = clip_against_edge(
        &output,
        |c| c.x >= min.x,
        |c1, c2| {
            let t = (min.x - c1.x) / (c2.x - c1.x);
            Coord {
                x: min.x,
                y: c1.y + t * (c2.y - c1.y),
            }
        },
    );

    output = clip_against_edge(
        &output,
        |c| c.x <= max.x,
        |c1, c2| {
            let t = (max.x - c1.x) / (c2.x - c1.x);
            Coord {
                x: max.x,
                y: c1.y + t * (c2.y - c1.y),
            }
        },
    );

    output = clip_against_edge(
        &output,
        |c| c.y >= min.y,
        |c1, c2| {
            let t = (min.y - c1.y) / (c2.y - c1.y);
            Coord {
                x: c1.x + t * (c2.x - c1.x),
                y: min.y,
            }
        },
    );

    output = clip_against_edge(
        &output,
        |c| c.y <= max.y,
        |c1, c2| {
            let t = (max.y - c1.y) / (c2.y - c1.y);
            Coord {
                x: c1.x + t * (c2.x - c1.x),
                y: max.y,
            }
        },
    );

    if !output.is_empty() && output.first() != output.last() {
        output.push(output[0]);
    }

    LineString::new(output)
}

fn clip_against_edge<F, I>(vertices: &[Coord<f64>], inside: F, intersect: I) -> Vec<Coord<f64>>
where
    F: Fn(&Coord<f64>) -> bool,
    I: Fn(&Coord<f64>, &Coord<f64>) -> Coord<f64>,
{
    let mut output = Vec::with_capacity(vertices.len());

    for (i, current) in vertices.iter().enumerate() {
        let next = &vertices[(i + 1) % vertices.len()];

        match (inside(current), inside(next)) {
            (true, true) => output.push(*current),
            (true, false) => {
                output.push(*current);
                output.push(intersect(current, next));
            }
            (false, true) => output.push(intersect(current, next)),
            (false, false) => {}
        }
    }

    output
}
