//! Grid snapshots taken between construction stages.

use core::fmt;

use crate::matrix::ModuleGrid;

/// A point in the pipeline after which the grid can be observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Locators, separators, timing lines, alignment block and dark module drawn.
    FunctionPatterns,
    /// Codeword bits written into the data region.
    DataPlacement,
    /// Mask pattern applied to the data region.
    Masking,
    /// Format word written; the symbol is complete.
    FormatInformation,
}

impl Stage {
    pub fn title(self) -> &'static str {
        match self {
            Stage::FunctionPatterns => "Function patterns",
            Stage::DataPlacement => "Data placement",
            Stage::Masking => "Masking",
            Stage::FormatInformation => "Format information",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Stage::FunctionPatterns => {
                "Locator blocks mark three corners so a scanner can find the orientation; timing lines calibrate module spacing."
            }
            Stage::DataPlacement => {
                "Data and error correction codewords fill the free modules in two-column zig-zag order from the bottom right."
            }
            Stage::Masking => {
                "The mask with the lowest penalty inverts data modules to break up patterns that could confuse a scanner."
            }
            Stage::FormatInformation => {
                "The error correction level and mask id are written twice, protected by a BCH code."
            }
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// An immutable copy of the grid at one stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    stage: Stage,
    size: usize,
    modules: Vec<bool>,
}

impl Snapshot {
    pub fn new(stage: Stage, grid: &ModuleGrid) -> Self {
        Self {
            stage,
            size: grid.size(),
            modules: grid.modules().to_vec(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns whether the module at column `x`, row `y` was dark at this stage.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.size + x]
    }
}

/// Receives the grid after each construction stage.
pub trait StepRecorder {
    fn record(&mut self, stage: Stage, grid: &ModuleGrid);
}

/// Keeps a snapshot of every stage in order.
impl StepRecorder for Vec<Snapshot> {
    fn record(&mut self, stage: Stage, grid: &ModuleGrid) {
        self.push(Snapshot::new(stage, grid));
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRecorder;

impl StepRecorder for NoRecorder {
    fn record(&mut self, _stage: Stage, _grid: &ModuleGrid) {}
}
