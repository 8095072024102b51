//! Column width allocation.
//!
//! Two phases. Content measurement finds, per column, the width at which no
//! cell would need to wrap. Allocation then hands every column its working
//! minimum and shares what is left by weight, in one pass, in declaration
//! order.

use super::{body_font_size, header_font_size};
use crate::model::{Cell, ColumnSpec, ColumnWidth, TableOptions};
use crate::surface::Surface;
use crate::text::{single_line_width, TextMeasurer};

const EPSILON: f64 = 1e-9;

/// Resolved column widths.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnAllocation {
    pub widths: Vec<f64>,
    /// The minimums alone exceed the total width; `widths` sums to more than
    /// the total.
    pub overflow: bool,
}

/// Single-line width of each column's widest content (header included when
/// the header row is drawn), plus horizontal padding.
pub fn measure_content_widths(
    surface: &dyn Surface,
    columns: &[ColumnSpec],
    rows: &[Vec<Cell>],
    options: &TableOptions,
) -> Vec<f64> {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let mut widest: f64 = 0.0;
            if options.header {
                let measurer = TextMeasurer::new(
                    surface,
                    &options.header_font,
                    header_font_size(options, column),
                );
                widest = single_line_width(&measurer, &column.header, &options.placeholder);
            }
            for row in rows {
                let Some(cell) = row.get(i) else { continue };
                let measurer = TextMeasurer::new(
                    surface,
                    &options.font,
                    body_font_size(options, column, cell),
                );
                widest = widest.max(single_line_width(&measurer, &cell.text, &options.placeholder));
            }
            widest + 2.0 * options.padding
        })
        .collect()
}

/// Allocate `total_width` across `columns`.
///
/// Fixed columns take their width. A flexible column's working minimum is its
/// content width, raised to `min_width` and capped at `max_width`. When those
/// minimums do not fit, flexible columns fall back to their declared
/// `min_width` and will wrap instead; when even that does not fit, the
/// minimums are kept and the table overflows.
///
/// Leftover width is shared by weight among flexible columns still below
/// their cap, once. A column that hits its cap keeps only what fits; the
/// remainder of its share is not re-offered to the others. Whatever is left
/// after that, rounding error included, lands on a single column so the
/// widths sum to `total_width` exactly, past that column's cap if need be.
pub fn allocate_column_widths(
    columns: &[ColumnSpec],
    content_widths: &[f64],
    total_width: f64,
) -> ColumnAllocation {
    let content_minimums: Vec<f64> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| match column.width {
            ColumnWidth::Fixed(w) => w,
            ColumnWidth::Flex(flex) => {
                let content = content_widths.get(i).copied().unwrap_or(0.0);
                flex.min_width.max(content).min(flex.max_or_unbounded())
            }
        })
        .collect();

    let mut widths = if sum(&content_minimums) <= total_width + EPSILON {
        content_minimums
    } else {
        columns
            .iter()
            .map(|column| match column.width {
                ColumnWidth::Fixed(w) => w,
                ColumnWidth::Flex(flex) => flex.min_width,
            })
            .collect()
    };

    let assigned = sum(&widths);
    if assigned > total_width + EPSILON {
        log::warn!(
            "column minimums ({:.2}pt) exceed the table width ({:.2}pt); table will overflow",
            assigned,
            total_width
        );
        return ColumnAllocation {
            widths,
            overflow: true,
        };
    }

    distribute_by_weight(columns, &mut widths, total_width - assigned);
    absorb_residual(columns, &mut widths, total_width);

    ColumnAllocation {
        widths,
        overflow: false,
    }
}

fn sum(widths: &[f64]) -> f64 {
    widths.iter().sum()
}

fn below_cap(column: &ColumnSpec, width: f64) -> bool {
    match column.width {
        ColumnWidth::Fixed(_) => false,
        ColumnWidth::Flex(flex) => width < flex.max_or_unbounded(),
    }
}

/// One proportional pass; shares are clamped at each column's cap.
fn distribute_by_weight(columns: &[ColumnSpec], widths: &mut [f64], remaining: f64) {
    if remaining <= 0.0 {
        return;
    }
    let eligible: Vec<bool> = columns
        .iter()
        .zip(widths.iter())
        .map(|(column, &w)| below_cap(column, w))
        .collect();
    let total_weight: f64 = columns
        .iter()
        .zip(&eligible)
        .filter(|(_, &e)| e)
        .map(|(column, _)| match column.width {
            ColumnWidth::Flex(flex) => flex.weight,
            ColumnWidth::Fixed(_) => 0.0,
        })
        .sum();
    if total_weight <= 0.0 {
        return;
    }

    for ((column, width), &eligible) in columns.iter().zip(widths.iter_mut()).zip(&eligible) {
        let ColumnWidth::Flex(flex) = column.width else {
            continue;
        };
        if !eligible {
            continue;
        }
        let share = remaining * flex.weight / total_weight;
        *width = (*width + share).min(flex.max_or_unbounded());
    }
}

/// Put the gap between `total_width` and the allocated sum on one column:
/// the last flexible column below its cap, else the last flexible column,
/// else the last column.
///
/// This is the one place where share clamped off by a cap is handed out
/// again. When every flexible column is capped, the last one grows past its
/// `maxWidth` so the widths still sum to `total_width`. All-fixed tables
/// grow their last column.
fn absorb_residual(columns: &[ColumnSpec], widths: &mut [f64], total_width: f64) {
    let residual = total_width - sum(widths);
    if residual == 0.0 {
        return;
    }

    let is_flex = |c: &ColumnSpec| matches!(c.width, ColumnWidth::Flex(_));
    let target = (0..columns.len())
        .rev()
        .find(|&i| below_cap(&columns[i], widths[i]))
        .or_else(|| (0..columns.len()).rev().find(|&i| is_flex(&columns[i])))
        .or_else(|| columns.len().checked_sub(1));

    if let Some(i) = target {
        if residual.abs() > 1e-6 {
            log::debug!(
                "column {} ({:?}) absorbs {:.3}pt of unallocated width",
                i,
                columns[i].header,
                residual
            );
        }
        widths[i] += residual;
    }
}
