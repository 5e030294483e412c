//! Mask patterns, penalty scoring and mask selection.

use core::fmt;

use crate::matrix::ModuleGrid;
use crate::qrcode::Mask;

const PENALTY_N1: u32 = 3;
const PENALTY_N2: u32 = 3;
const PENALTY_N3: u32 = 40;
const PENALTY_N4: u32 = 10;

impl Mask {
    /// Returns whether this pattern inverts the module at column `x`, row `y`.
    pub fn inverts(self, x: usize, y: usize) -> bool {
        match self.value() {
            0 => (x + y) % 2 == 0,
            1 => y % 2 == 0,
            2 => x % 3 == 0,
            3 => (x + y) % 3 == 0,
            4 => (x / 3 + y / 2) % 2 == 0,
            5 => ((x * y) % 2) + ((x * y) % 3) == 0,
            6 => (((x * y) % 2) + ((x * y) % 3)) % 2 == 0,
            7 => (((x + y) % 2) + ((x * y) % 3)) % 2 == 0,
            _ => unreachable!(),
        }
    }

    /// The inversion condition in row/column notation.
    pub fn formula(self) -> &'static str {
        match self.value() {
            0 => "(row + col) mod 2 == 0",
            1 => "row mod 2 == 0",
            2 => "col mod 3 == 0",
            3 => "(row + col) mod 3 == 0",
            4 => "(row / 2 + col / 3) mod 2 == 0",
            5 => "(row * col) mod 2 + (row * col) mod 3 == 0",
            6 => "((row * col) mod 2 + (row * col) mod 3) mod 2 == 0",
            7 => "((row + col) mod 2 + (row * col) mod 3) mod 2 == 0",
            _ => unreachable!(),
        }
    }
}

/// XORs the pattern onto every unreserved module. Applying the same mask twice restores
/// the grid.
pub fn apply_mask(grid: &mut ModuleGrid, mask: Mask) {
    let size = grid.size();
    for y in 0..size {
        for x in 0..size {
            if mask.inverts(x, y) {
                grid.toggle_if_unreserved(x, y);
            }
        }
    }
}

/// Penalty score broken down by rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Penalty {
    /// Runs of five or more same-colored modules.
    pub runs: u32,
    /// Uniform 2x2 blocks.
    pub blocks: u32,
    /// 1:1:3:1:1 locator look-alikes.
    pub finder_like: u32,
    /// Dark/light imbalance.
    pub balance: u32,
}

impl Penalty {
    pub fn total(&self) -> u32 {
        self.runs + self.blocks + self.finder_like + self.balance
    }
}

/// Scores a grid. Every module counts, reserved or not.
pub fn penalty(grid: &ModuleGrid) -> Penalty {
    let size = grid.size();
    let mut result = Penalty::default();

    let mut line: Vec<bool> = Vec::with_capacity(size);
    for y in 0..size {
        line.clear();
        line.extend((0..size).map(|x| grid.get(x, y)));
        result.runs += run_penalty(&line);
        result.finder_like += finder_like_patterns(&line) * PENALTY_N3;
    }
    for x in 0..size {
        line.clear();
        line.extend((0..size).map(|y| grid.get(x, y)));
        result.runs += run_penalty(&line);
        result.finder_like += finder_like_patterns(&line) * PENALTY_N3;
    }

    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let color: bool = grid.get(x, y);
            if
                color == grid.get(x + 1, y) &&
                color == grid.get(x, y + 1) &&
                color == grid.get(x + 1, y + 1)
            {
                result.blocks += PENALTY_N2;
            }
        }
    }

    result.balance = balance_penalty(grid.dark_count(), size * size);
    result
}

// Each run of length n >= 5 adds 3 + (n - 5)
fn run_penalty(line: &[bool]) -> u32 {
    let mut result: u32 = 0;
    let mut runcolor: Option<bool> = None;
    let mut run: u32 = 0;
    for &module in line {
        if Some(module) == runcolor {
            run += 1;
            if run == 5 {
                result += PENALTY_N1;
            } else if run > 5 {
                result += 1;
            }
        } else {
            runcolor = Some(module);
            run = 1;
        }
    }
    result
}

// 10 points per full 5% step away from an even split
fn balance_penalty(dark: usize, total: usize) -> u32 {
    let deviation = (dark * 100).abs_diff(total * 50);
    (deviation / (total * 5)) as u32 * PENALTY_N4
}

/// Counts dark:light:dark:light:dark runs in 1:1:3:1:1 proportion with at least four light
/// modules of margin on one side or the other. Modules beyond either end of `line` count as
/// light, the way the quiet zone reads to a scanner.
pub fn finder_like_patterns(line: &[bool]) -> u32 {
    let mut runcolor = false;
    let mut run: i32 = 0;
    let mut history = FinderPenalty::new(line.len());
    let mut count: u32 = 0;
    for &module in line {
        if module == runcolor {
            run += 1;
        } else {
            history.add_history(run);
            if !runcolor {
                count += history.count_patterns();
            }
            runcolor = module;
            run = 1;
        }
    }
    count + history.terminate_and_count(runcolor, run)
}

struct FinderPenalty {
    line_len: i32,
    run_history: [i32; 7],
}

impl FinderPenalty {
    fn new(line_len: usize) -> Self {
        Self {
            line_len: line_len as i32,
            run_history: [0; 7],
        }
    }

    // The first light run is extended by the virtual margin before the line
    fn add_history(&mut self, mut currentrunlength: i32) {
        if self.run_history[0] == 0 {
            currentrunlength += self.line_len;
        }
        let len: usize = self.run_history.len();
        self.run_history.copy_within(0..len - 1, 1);
        self.run_history[0] = currentrunlength;
    }

    // Must be called right after a light run is pushed
    fn count_patterns(&self) -> u32 {
        let rh = &self.run_history;
        let n = rh[1];
        u32::from(
            n > 0 &&
                rh[2] == n &&
                rh[3] == n * 3 &&
                rh[4] == n &&
                rh[5] == n &&
                (rh[0] >= n * 4 || rh[6] >= n * 4)
        )
    }

    fn terminate_and_count(mut self, currentruncolor: bool, mut currentrunlength: i32) -> u32 {
        if currentruncolor {
            self.add_history(currentrunlength);
            currentrunlength = 0;
        }
        currentrunlength += self.line_len;
        self.add_history(currentrunlength);
        self.count_patterns()
    }
}

/// Scores of all eight masks from one automatic selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PenaltyTable {
    scores: [Penalty; 8],
    best: Mask,
}

impl PenaltyTable {
    pub fn get(&self, mask: Mask) -> Penalty {
        self.scores[usize::from(mask.value())]
    }

    /// The winning mask: lowest total, ties broken by lowest id.
    pub fn best(&self) -> Mask {
        self.best
    }

    pub fn iter(&self) -> impl Iterator<Item = (Mask, Penalty)> + '_ {
        Mask::all().zip(self.scores.iter().copied())
    }
}

impl fmt::Display for PenaltyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mask  runs  blocks  finder  balance  total  pattern")?;
        for (mask, p) in self.iter() {
            let marker = if mask == self.best { '*' } else { ' ' };
            writeln!(
                f,
                "{}{:>3}  {:>4}  {:>6}  {:>6}  {:>7}  {:>5}  {}",
                marker,
                mask.value(),
                p.runs,
                p.blocks,
                p.finder_like,
                p.balance,
                p.total(),
                mask.formula()
            )?;
        }
        write!(f, "selected mask {} (penalty {})", self.best, self.get(self.best).total())
    }
}

/// Result of the mask stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskSelection {
    pub mask: Mask,
    pub penalty: Penalty,
    /// Present only for automatic selection.
    pub table: Option<PenaltyTable>,
}

/// Applies `choice`, or the lowest-penalty pattern when `choice` is `None`, to `grid`.
pub fn select_mask(grid: &mut ModuleGrid, choice: Option<Mask>) -> MaskSelection {
    if let Some(mask) = choice {
        apply_mask(grid, mask);
        return MaskSelection {
            mask,
            penalty: penalty(grid),
            table: None,
        };
    }

    let mut scores = [Penalty::default(); 8];
    let mut best = Mask::new(0);
    let mut minpenalty = u32::MAX;
    for mask in Mask::all() {
        apply_mask(grid, mask);
        let score = penalty(grid);
        if score.total() < minpenalty {
            best = mask;
            minpenalty = score.total();
        }
        scores[usize::from(mask.value())] = score;
        apply_mask(grid, mask); // Undoes the mask due to XOR
    }
    apply_mask(grid, best);
    MaskSelection {
        mask: best,
        penalty: scores[usize::from(best.value())],
        table: Some(PenaltyTable { scores, best }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qrcode::Version;

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    fn data_grid() -> ModuleGrid {
        let mut grid = ModuleGrid::with_function_patterns(Version::new(1));
        let pattern = (0..208).map(|i| (i * 7) % 5 < 2);
        grid.place_bits(pattern);
        grid
    }

    #[test]
    fn test_finder_like_standard_vectors() {
        assert_eq!(finder_like_patterns(&bits("00001011101")), 1);
        assert_eq!(finder_like_patterns(&bits("10111010000")), 1);
        // The line edge counts as light margin
        assert_eq!(finder_like_patterns(&bits("1011101")), 1);
        assert_eq!(finder_like_patterns(&bits("110011111100110000")), 1);
    }

    #[test]
    fn test_finder_like_needs_margin_and_ratio() {
        assert_eq!(finder_like_patterns(&bits("11101110110111")), 0);
        assert_eq!(finder_like_patterns(&bits("1001011101001")), 0);
        assert_eq!(finder_like_patterns(&bits("00001011001")), 0);
        assert_eq!(finder_like_patterns(&bits("0000000000")), 0);
    }

    #[test]
    fn test_finder_like_counts_each_occurrence() {
        assert_eq!(finder_like_patterns(&bits("000010111010000101110100001")), 2);
    }

    #[test]
    fn test_run_penalty() {
        assert_eq!(run_penalty(&bits("1111")), 0);
        assert_eq!(run_penalty(&bits("11111")), 3);
        assert_eq!(run_penalty(&bits("0000000")), 5);
        assert_eq!(run_penalty(&bits("111110000010")), 6);
    }

    #[test]
    fn test_balance_penalty() {
        assert_eq!(balance_penalty(50, 100), 0);
        assert_eq!(balance_penalty(54, 100), 0);
        assert_eq!(balance_penalty(55, 100), 10);
        assert_eq!(balance_penalty(40, 100), 20);
        assert_eq!(balance_penalty(0, 441), 100);
    }

    #[test]
    fn test_blocks_counted_with_overlap() {
        let mut grid = ModuleGrid::new(3);
        for y in 0..3 {
            for x in 0..3 {
                grid.set_if_unreserved(x, y, true);
            }
        }
        assert_eq!(penalty(&grid).blocks, 4 * PENALTY_N2);
    }

    #[test]
    fn test_mask_is_involutive() {
        let original = data_grid();
        for mask in Mask::all() {
            let mut grid = original.clone();
            apply_mask(&mut grid, mask);
            assert_ne!(grid, original);
            apply_mask(&mut grid, mask);
            assert_eq!(grid, original);
        }
    }

    #[test]
    fn test_mask_leaves_reserved_cells() {
        let original = data_grid();
        let mut grid = original.clone();
        apply_mask(&mut grid, Mask::new(0));
        for y in 0..21 {
            for x in 0..21 {
                if original.is_reserved(x, y) {
                    assert_eq!(grid.get(x, y), original.get(x, y));
                } else {
                    assert_eq!(grid.get(x, y), original.get(x, y) ^ ((x + y) % 2 == 0));
                }
            }
        }
    }

    #[test]
    fn test_automatic_selection_picks_minimum() {
        let original = data_grid();
        let mut grid = original.clone();
        let selection = select_mask(&mut grid, None);
        let table = selection.table.clone().unwrap();

        let mut expected = original.clone();
        apply_mask(&mut expected, selection.mask);
        assert_eq!(grid, expected);

        for mask in Mask::all() {
            let mut candidate = original.clone();
            apply_mask(&mut candidate, mask);
            let score = penalty(&candidate);
            assert_eq!(table.get(mask), score);
            assert!(score.total() >= selection.penalty.total());
            if mask < selection.mask {
                assert!(score.total() > selection.penalty.total());
            }
        }
    }

    #[test]
    fn test_manual_selection_reports_penalty() {
        let mut grid = data_grid();
        let selection = select_mask(&mut grid, Some(Mask::new(3)));
        assert_eq!(selection.mask, Mask::new(3));
        assert!(selection.table.is_none());
        assert_eq!(selection.penalty, penalty(&grid));
    }

    #[test]
    fn test_report_marks_winner() {
        let mut grid = data_grid();
        let selection = select_mask(&mut grid, None);
        let report = selection.table.unwrap().to_string();
        assert_eq!(report.lines().count(), 10);
        assert!(report.contains(&format!("*{:>3}", selection.mask.value())));
    }
}
