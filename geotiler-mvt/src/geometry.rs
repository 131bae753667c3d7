//! Geometry command encoding.
//!
//! MVT geometries are a flat list of `u32` values: command integers (`id | count << 3`) followed by `count` pairs of
//! zigzag-encoded coordinate deltas. The cursor is shared by all parts of one feature geometry.

use crate::Point;

pub(crate) const CMD_MOVE_TO: u32 = 1;
pub(crate) const CMD_LINE_TO: u32 = 2;
pub(crate) const CMD_CLOSE_PATH: u32 = 7;

#[inline]
pub fn zigzag_encode(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

#[inline]
pub fn command_encode(command_id: u32, count: u32) -> u32 {
    (command_id & 0x7) | (count << 3)
}

#[derive(Debug, Default)]
pub(crate) struct GeometryEncoder {
    commands: Vec<u32>,
    cursor: Point,
}

impl GeometryEncoder {
    /// Writes an open path: `MoveTo` for the first point and one `LineTo` for the rest.
    pub(crate) fn write_path(&mut self, points: &[Point]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };

        self.commands.push(command_encode(CMD_MOVE_TO, 1));
        self.write_point(*first);

        if !rest.is_empty() {
            self.commands
                .push(command_encode(CMD_LINE_TO, rest.len() as u32));
            for point in rest {
                self.write_point(*point);
            }
        }
    }

    /// Writes a closed ring. An explicit closing point equal to the first one is not written, `ClosePath` is used
    /// instead.
    pub(crate) fn write_ring(&mut self, points: &[Point]) {
        let points = match points {
            [first, .., last] if first == last => &points[..points.len() - 1],
            _ => points,
        };

        if points.is_empty() {
            return;
        }

        self.write_path(points);
        self.commands.push(command_encode(CMD_CLOSE_PATH, 1));
    }

    fn write_point(&mut self, point: Point) {
        self.commands
            .push(zigzag_encode(point.x.wrapping_sub(self.cursor.x)));
        self.commands
            .push(zigzag_encode(point.y.wrapping_sub(self.cursor.y)));
        self.cursor = point;
    }

    pub(crate) fn into_commands(self) -> Vec<u32> {
        self.commands
    }
}
