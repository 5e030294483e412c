//! Module grid, function patterns and codeword placement.
//!
//! The grid and its reservation mask live in one structure. Every write goes through an
//! accessor that either reserves the cell (function patterns, format information) or refuses
//! to touch a reserved one (data bits, masking), so the two can never drift apart.

use crate::qrcode::Version;

/// A square grid of modules with a parallel reservation mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleGrid {
    size: usize,
    /// `true` is dark.
    modules: Vec<bool>,
    /// `true` for function pattern, separator, timing, dark module, alignment and format cells.
    reserved: Vec<bool>,
}

impl ModuleGrid {
    /// Creates an all-light grid with nothing reserved.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            modules: vec![false; size * size],
            reserved: vec![false; size * size],
        }
    }

    /// Creates the grid for `ver` with every function pattern stamped and the format
    /// areas reserved.
    pub fn with_function_patterns(ver: Version) -> Self {
        let mut grid = Self::new(ver.size());
        let size = grid.size as i32;
        grid.draw_locator(3, 3);
        grid.draw_locator(size - 4, 3);
        grid.draw_locator(3, size - 4);
        if ver.value() == 2 {
            let center = size - 7;
            grid.draw_alignment(center, center);
        }
        grid.draw_timing();
        grid.set_function(8, 4 * usize::from(ver.value()) + 9, true);
        grid.reserve_format_areas();
        grid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(x < self.size && y < self.size, "module ({}, {}) out of bounds", x, y);
        y * self.size + x
    }

    /// Returns whether the module at column `x`, row `y` is dark.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.modules[self.index(x, y)]
    }

    pub fn is_reserved(&self, x: usize, y: usize) -> bool {
        self.reserved[self.index(x, y)]
    }

    /// Writes a function module and reserves it.
    pub fn set_function(&mut self, x: usize, y: usize, isdark: bool) {
        let i = self.index(x, y);
        self.modules[i] = isdark;
        self.reserved[i] = true;
    }

    /// Reserves a module without changing its value.
    pub fn reserve(&mut self, x: usize, y: usize) {
        let i = self.index(x, y);
        self.reserved[i] = true;
    }

    /// Writes a data module. Returns `false` and leaves the grid untouched if the cell is reserved.
    pub fn set_if_unreserved(&mut self, x: usize, y: usize, isdark: bool) -> bool {
        let i = self.index(x, y);
        if self.reserved[i] {
            return false;
        }
        self.modules[i] = isdark;
        true
    }

    /// Inverts a data module. Returns `false` if the cell is reserved.
    pub fn toggle_if_unreserved(&mut self, x: usize, y: usize) -> bool {
        let i = self.index(x, y);
        if self.reserved[i] {
            return false;
        }
        self.modules[i] = !self.modules[i];
        true
    }

    /// Row-major module values.
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }

    /// Number of modules available for codeword bits.
    pub fn data_module_count(&self) -> usize {
        self.reserved.iter().filter(|&&r| !r).count()
    }

    // Stamps a 7x7 locator centred on (cx, cy) together with its light separator ring,
    // clipped to the grid
    fn draw_locator(&mut self, cx: i32, cy: i32) {
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let (x, y) = (cx + dx, cy + dy);
                if !self.in_bounds(x, y) {
                    continue;
                }
                let dist: i32 = dx.abs().max(dy.abs());
                self.set_function(x as usize, y as usize, dist != 2 && dist != 4);
            }
        }
    }

    // 5x5 ring-in-ring; cells that already belong to another pattern are left alone
    fn draw_alignment(&mut self, cx: i32, cy: i32) {
        for dy in -2i32..=2 {
            for dx in -2i32..=2 {
                let (x, y) = ((cx + dx) as usize, (cy + dy) as usize);
                if self.is_reserved(x, y) {
                    continue;
                }
                self.set_function(x, y, dx.abs().max(dy.abs()) != 1);
            }
        }
    }

    fn draw_timing(&mut self) {
        for i in 8..self.size - 8 {
            if !self.is_reserved(i, 6) {
                self.set_function(i, 6, i % 2 == 0);
            }
            if !self.is_reserved(6, i) {
                self.set_function(6, i, i % 2 == 0);
            }
        }
    }

    fn reserve_format_areas(&mut self) {
        let size = self.size;
        for i in 0..=8 {
            self.reserve(i, 8);
            if i != 6 {
                self.reserve(8, i);
            }
        }
        for i in 0..7 {
            self.reserve(8, size - 1 - i);
        }
        for i in 0..8 {
            self.reserve(size - 1 - i, 8);
        }
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size as i32;
        range.contains(&x) && range.contains(&y)
    }

    /// Returns the unreserved cells in codeword placement order.
    ///
    /// Column pairs are walked from the right edge leftwards, skipping the vertical timing
    /// column. The first pair runs bottom to top and the direction alternates per pair. Within
    /// a row the right column of the pair comes before the left.
    pub fn placement_order(&self) -> Vec<(usize, usize)> {
        let size = self.size as i32;
        let mut order = Vec::with_capacity(self.data_module_count());
        let mut right: i32 = size - 1;
        let mut upward = true;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            for vert in 0..size {
                let y = (if upward { size - 1 - vert } else { vert }) as usize;
                for j in 0..2 {
                    let x = (right - j) as usize;
                    if !self.is_reserved(x, y) {
                        order.push((x, y));
                    }
                }
            }
            upward = !upward;
            right -= 2;
        }
        order
    }

    /// Writes `bits` into the unreserved cells in placement order and returns how many were
    /// written. Cells past the end of `bits` keep their current value.
    pub fn place_bits<I>(&mut self, bits: I) -> usize
    where
        I: IntoIterator<Item = bool>,
    {
        let mut written = 0;
        for ((x, y), bit) in self.placement_order().into_iter().zip(bits) {
            self.set_if_unreserved(x, y, bit);
            written += 1;
        }
        written
    }
}

/// Expands codewords into bits, most significant bit of each byte first.
pub fn codeword_bits(codewords: &[u8]) -> impl Iterator<Item = bool> + '_ {
    codewords
        .iter()
        .flat_map(|&b| (0..8).rev().map(move |i| (b >> i) & 1 != 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v1() -> ModuleGrid {
        ModuleGrid::with_function_patterns(Version::new(1))
    }

    fn v2() -> ModuleGrid {
        ModuleGrid::with_function_patterns(Version::new(2))
    }

    #[test]
    fn test_data_module_counts() {
        assert_eq!(v1().data_module_count(), 208);
        assert_eq!(v2().data_module_count(), 359);
    }

    #[test]
    fn test_locator_rings() {
        let grid = v1();
        let size = grid.size();
        for (ox, oy) in [(0, 0), (size - 7, 0), (0, size - 7)] {
            // Outer border, light ring, solid core
            assert!(grid.get(ox, oy));
            assert!(grid.get(ox + 6, oy + 6));
            assert!(!grid.get(ox + 1, oy + 1));
            assert!(!grid.get(ox + 5, oy + 3));
            assert!(grid.get(ox + 2, oy + 2));
            assert!(grid.get(ox + 3, oy + 3));
            assert!(grid.get(ox + 4, oy + 4));
        }
        // Separators
        for i in 0..8 {
            assert!(!grid.get(i, 7) && grid.is_reserved(i, 7));
            assert!(!grid.get(7, i) && grid.is_reserved(7, i));
            assert!(!grid.get(size - 8, i) && grid.is_reserved(size - 8, i));
            assert!(!grid.get(i, size - 8) && grid.is_reserved(i, size - 8));
        }
    }

    #[test]
    fn test_timing_alternates() {
        let grid = v1();
        for i in 8..13 {
            assert_eq!(grid.get(i, 6), i % 2 == 0);
            assert_eq!(grid.get(6, i), i % 2 == 0);
            assert!(grid.is_reserved(i, 6));
        }
    }

    #[test]
    fn test_dark_module() {
        assert!(v1().get(8, 13) && v1().is_reserved(8, 13));
        assert!(v2().get(8, 17) && v2().is_reserved(8, 17));
    }

    #[test]
    fn test_alignment_block_v2() {
        let grid = v2();
        assert!(grid.get(18, 18));
        assert!(!grid.get(17, 18) && !grid.get(19, 19));
        assert!(grid.get(16, 16) && grid.get(20, 20) && grid.get(16, 20));
        for y in 16..=20 {
            for x in 16..=20 {
                assert!(grid.is_reserved(x, y));
            }
        }
        assert!(!v1().is_reserved(18, 18));
    }

    #[test]
    fn test_format_areas_reserved_but_light() {
        let grid = v1();
        for x in [0, 1, 2, 3, 4, 5, 7, 8, 13, 14, 20] {
            assert!(grid.is_reserved(x, 8));
        }
        for y in [0, 1, 5, 7, 8, 14, 20] {
            assert!(grid.is_reserved(8, y));
        }
        assert!(!grid.get(0, 8));
        assert!(!grid.get(20, 8));
        assert!(!grid.get(8, 20));
    }

    #[test]
    fn test_placement_order_starts_bottom_right_going_up() {
        let order = v1().placement_order();
        assert_eq!(order.len(), 208);
        assert_eq!(&order[..4], &[(20, 20), (19, 20), (20, 19), (19, 19)]);
        // Second pair runs downward from the top, below the top-right separator
        let second = order.iter().position(|&(x, _)| x == 18).unwrap();
        assert_eq!(order[second], (18, 9));
        // Column 6 never appears
        assert!(order.iter().all(|&(x, _)| x != 6));
    }

    #[test]
    fn test_place_bits_skips_reserved() {
        let before = v2();
        let mut grid = before.clone();
        let written = grid.place_bits(std::iter::repeat(true).take(1000));
        assert_eq!(written, 359);
        for y in 0..25 {
            for x in 0..25 {
                if before.is_reserved(x, y) {
                    assert_eq!(grid.get(x, y), before.get(x, y));
                } else {
                    assert!(grid.get(x, y));
                }
            }
        }
    }

    #[test]
    fn test_place_bits_leaves_remainder() {
        let mut grid = v2();
        let written = grid.place_bits(std::iter::repeat(true).take(352));
        assert_eq!(written, 352);
        let order = grid.placement_order();
        for &(x, y) in &order[352..] {
            assert!(!grid.get(x, y));
        }
    }

    #[test]
    fn test_set_if_unreserved_refuses_reserved() {
        let mut grid = v1();
        assert!(!grid.set_if_unreserved(0, 0, false));
        assert!(grid.get(0, 0));
        assert!(grid.set_if_unreserved(10, 10, true));
        assert!(grid.toggle_if_unreserved(10, 10));
        assert!(!grid.get(10, 10));
    }

    #[test]
    fn test_codeword_bits() {
        let bits: Vec<bool> = codeword_bits(&[0b1000_0001]).collect();
        assert_eq!(bits, vec![true, false, false, false, false, false, false, true]);
    }
}
