//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Apply
//!
//! ```text
//! holiday.jpg (640x480)
//!     001 120x80+10+20: 12x8 blocks of 10px
//!     002 640x480+0+0 (whole image): 64x48 blocks of 10px
//! Wrote holiday_mosaicked.jpg (48213 bytes)
//! ```
//!
//! ## Info
//!
//! ```text
//! holiday.jpg
//!     Size: 643x480
//!     10px: 65x48 blocks, last column 3px
//!     5px (small): 129x96 blocks, last column 3px
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::mosaic::{MosaicPlan, Preset};
use crate::session::MosaicOutcome;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Describe the truncated edge blocks of a plan, if any.
///
/// ```text
/// last column 3px, last row 1px
/// ```
fn partial_blocks(plan: &MosaicPlan) -> Option<String> {
    let parts: Vec<String> = [
        plan.partial_width.map(|w| format!("last column {w}px")),
        plan.partial_height.map(|h| format!("last row {h}px")),
    ]
    .into_iter()
    .flatten()
    .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn grid_summary(plan: &MosaicPlan) -> String {
    let base = format!("{}x{} blocks", plan.grid.0, plan.grid.1);
    match partial_blocks(plan) {
        Some(partial) => format!("{base}, {partial}"),
        None => base,
    }
}

fn display_name(input: &Path) -> String {
    input
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}

// ============================================================================
// apply
// ============================================================================

/// Format the result of an `apply` run: one line per committed edit.
pub fn format_apply_output(
    input: &Path,
    dimensions: (u32, u32),
    outcomes: &[MosaicOutcome],
    written: &Path,
    byte_len: usize,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}x{})",
        display_name(input),
        dimensions.0,
        dimensions.1
    )];

    for (i, outcome) in outcomes.iter().enumerate() {
        let plan = &outcome.plan;
        let scope = if outcome.full_image {
            " (whole image)"
        } else {
            ""
        };
        lines.push(format!(
            "{}{} {}{}: {}x{} blocks of {}",
            indent(1),
            format_index(i + 1),
            plan.region,
            scope,
            plan.grid.0,
            plan.grid.1,
            plan.block
        ));
    }

    lines.push(format!(
        "Wrote {} ({} bytes)",
        written.display(),
        byte_len
    ));
    lines
}

/// Print apply output to stdout.
pub fn print_apply_output(
    input: &Path,
    dimensions: (u32, u32),
    outcomes: &[MosaicOutcome],
    written: &Path,
    byte_len: usize,
) {
    for line in format_apply_output(input, dimensions, outcomes, written, byte_len) {
        println!("{}", line);
    }
}

// ============================================================================
// info
// ============================================================================

/// Format image dimensions and the block grid for each plan.
///
/// Plans whose block size matches a preset are labelled with the preset.
pub fn format_info(input: &Path, dimensions: (u32, u32), plans: &[MosaicPlan]) -> Vec<String> {
    let mut lines = vec![
        display_name(input),
        format!("{}Size: {}x{}", indent(1), dimensions.0, dimensions.1),
    ];
    for plan in plans {
        let preset = Preset::ALL
            .into_iter()
            .find(|p| p.block_size() == plan.block);
        let label = match preset {
            Some(p) => format!("{} ({})", plan.block, p),
            None => plan.block.to_string(),
        };
        lines.push(format!("{}{}: {}", indent(1), label, grid_summary(plan)));
    }
    lines
}

/// Print info output to stdout.
pub fn print_info(input: &Path, dimensions: (u32, u32), plans: &[MosaicPlan]) {
    for line in format_info(input, dimensions, plans) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mosaic::{BlockSize, plan_mosaic};
    use crate::raster::Region;

    fn plan(dimensions: (u32, u32), region: Region, block: u32) -> MosaicPlan {
        plan_mosaic(dimensions, region, BlockSize::new(block))
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn grid_summary_exact_fit() {
        let p = plan((40, 20), Region::full(40, 20), 10);
        assert_eq!(grid_summary(&p), "4x2 blocks");
    }

    #[test]
    fn grid_summary_reports_partial_edges() {
        let p = plan((43, 21), Region::full(43, 21), 10);
        assert_eq!(grid_summary(&p), "5x3 blocks, last column 3px, last row 1px");
    }

    #[test]
    fn display_name_uses_file_name() {
        assert_eq!(display_name(Path::new("/a/b/cat.png")), "cat.png");
    }

    // =========================================================================
    // apply
    // =========================================================================

    #[test]
    fn apply_output_lists_each_edit() {
        let outcomes = [
            MosaicOutcome {
                plan: plan((640, 480), Region::new(10, 20, 120, 80), 10),
                full_image: false,
            },
            MosaicOutcome {
                plan: plan((640, 480), Region::full(640, 480), 10),
                full_image: true,
            },
        ];
        let lines = format_apply_output(
            Path::new("pics/holiday.jpg"),
            (640, 480),
            &outcomes,
            Path::new("holiday_mosaicked.jpg"),
            48213,
        );
        assert_eq!(
            lines,
            vec![
                "holiday.jpg (640x480)",
                "    001 120x80+10+20: 12x8 blocks of 10px",
                "    002 640x480+0+0 (whole image): 64x48 blocks of 10px",
                "Wrote holiday_mosaicked.jpg (48213 bytes)",
            ]
        );
    }

    #[test]
    fn apply_output_without_edits() {
        let lines = format_apply_output(Path::new("a.png"), (1, 1), &[], Path::new("b.png"), 70);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Wrote b.png (70 bytes)");
    }

    // =========================================================================
    // info
    // =========================================================================

    #[test]
    fn info_labels_presets() {
        let dims = (643, 480);
        let plans = [
            plan(dims, Region::full(643, 480), 12),
            plan(dims, Region::full(643, 480), 5),
        ];
        let lines = format_info(Path::new("holiday.jpg"), dims, &plans);
        assert_eq!(
            lines,
            vec![
                "holiday.jpg",
                "    Size: 643x480",
                "    12px: 54x40 blocks, last column 7px",
                "    5px (small): 129x96 blocks, last column 3px",
            ]
        );
    }
}
