/** Diagonal steps on the 0x88 board, `(left, right)` for a row direction */
pub const fn diagonal_steps(direction: i8) -> (u8, u8) {
    if direction > 0 {
        (0x0f, 0x11)
    } else {
        (0xef, 0xf1)
    }
}

pub struct DirectionIterator {
    position: u8,
    direction: u8,
}

impl Iterator for DirectionIterator {
    type Item = u8;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.position = self.position.wrapping_add(self.direction);
        if is_valid_coord(self.position) {
            Some(self.position)
        } else {
            None
        }
    }
}

/** Cells from `position` (exclusive) towards the board edge */
pub fn in_direction(position: u8, direction: u8) -> DirectionIterator {
    DirectionIterator {
        position,
        direction,
    }
}

/** Cell right before `to` on the diagonal going from `from` */
pub fn skewed_midpoint(from: (u8, u8), to: (u8, u8)) -> (u8, u8) {
    let x_skew: i8 = if to.0 < from.0 { -1 } else { 1 };
    let y_skew: i8 = if to.1 < from.1 { -1 } else { 1 };
    (
        from.0.wrapping_add_signed(x_skew),
        from.1.wrapping_add_signed(y_skew),
    )
}

#[inline]
pub fn is_on_board(x: u8, y: u8) -> bool {
    x < 8 && y < 8
}

#[inline]
pub fn is_valid_coord(coord: u8) -> bool {
    coord & 0x88 == 0x00
}

#[inline]
pub fn compact_pos(x: u8, y: u8) -> u8 {
    y << 4 | x
}

#[inline]
pub fn unpack_pos(pos: u8) -> (u8, u8) {
    (pos & 0x0f, (pos & 0xf0) >> 4)
}
