//! 矩阵与表格
//!
//! 列宽取该列最宽的单元格，行高取该行最大的上升与下降；表格线占用的宽度计入尺寸。
//! 整个矩阵以删除线为中心竖直居中。

use crate::ast::{HAlign, MatrixNode, TableLine};
use crate::environment::Environment;
use crate::metrics::BoxMetrics;
use crate::surface::{DrawingSurface, LineStyle, Pen};

use super::{box_from, LayoutContext};

struct MatrixLayout {
    metrics: BoxMetrics,
    cells: Vec<Vec<BoxMetrics>>,
    column_widths: Vec<f32>,
    /// 各列左边界，相对矩阵起点
    column_x: Vec<f32>,
    /// 各行基线，相对矩阵顶边
    row_baselines: Vec<f32>,
    /// 表格线所在位置：竖线的 x，横线的 y（相对顶边）
    column_rules: Vec<f32>,
    row_rules: Vec<f32>,
}

/// 表格线占用的厚度
fn rule_extent(line: TableLine, lw: f32) -> f32 {
    match line {
        TableLine::None => 0.0,
        TableLine::Single | TableLine::Dashed => lw,
        TableLine::Heavy => 2.0 * lw,
        TableLine::Double | TableLine::DoubleDashed => 3.0 * lw,
    }
}

fn line_at(lines: &[TableLine], index: usize) -> TableLine {
    lines.get(index).copied().unwrap_or(TableLine::None)
}

fn layout(ctx: &LayoutContext<'_>, matrix: &MatrixNode, env: &Environment) -> MatrixLayout {
    let lw = ctx.line_width(env);
    let cells: Vec<Vec<BoxMetrics>> = matrix
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| ctx.measure(cell, env)).collect())
        .collect();

    let mut column_widths = vec![0.0f32; matrix.columns];
    for row in &cells {
        for (column, size) in row.iter().enumerate().take(matrix.columns) {
            column_widths[column] = column_widths[column].max(size.width);
        }
    }

    let mut column_x = Vec::with_capacity(matrix.columns);
    let mut column_rules = Vec::with_capacity(matrix.columns + 1);
    let mut x = 0.0f32;
    for (column, width) in column_widths.iter().enumerate() {
        let extent = rule_extent(line_at(&matrix.column_lines, column), lw);
        column_rules.push(x + extent / 2.0);
        x += extent;
        column_x.push(x);
        x += width;
    }
    let last_extent = rule_extent(line_at(&matrix.column_lines, matrix.columns), lw);
    column_rules.push(x + last_extent / 2.0);
    x += last_extent;
    let width = x;

    let mut row_baselines = Vec::with_capacity(cells.len());
    let mut row_rules = Vec::with_capacity(cells.len() + 1);
    let mut y = 0.0f32;
    for (index, row) in cells.iter().enumerate() {
        let extent = rule_extent(line_at(&matrix.row_lines, index), lw);
        row_rules.push(y + extent / 2.0);
        y += extent;
        let ascent = row.iter().map(|s| s.baseline_height).fold(0.0f32, f32::max);
        let descent = row.iter().map(|s| s.descent()).fold(0.0f32, f32::max);
        row_baselines.push(y + ascent);
        y += ascent + descent;
    }
    let last_extent = rule_extent(line_at(&matrix.row_lines, cells.len()), lw);
    row_rules.push(y + last_extent / 2.0);
    y += last_extent;
    let height = y;

    let strikeout = ctx.strikeout(env);
    let ascent = (height / 2.0 + strikeout).min(height);
    MatrixLayout {
        metrics: box_from(width, ascent, height - ascent, strikeout),
        cells,
        column_widths,
        column_x,
        row_baselines,
        column_rules,
        row_rules,
    }
}

pub(super) fn measure_matrix(ctx: &LayoutContext<'_>, matrix: &MatrixNode, env: &Environment) -> BoxMetrics {
    layout(ctx, matrix, env).metrics
}

/// 画一条（可能是双线的）表格线，`offset` 为双线两条之间的法向偏移方向
fn draw_rule(
    surface: &mut dyn DrawingSurface,
    line: TableLine,
    from: (f32, f32),
    to: (f32, f32),
    vertical: bool,
    pen: &Pen,
) {
    let lw = pen.width;
    let shifted = |d: f32| {
        if vertical {
            ((from.0 + d, from.1), (to.0 + d, to.1))
        } else {
            ((from.0, from.1 + d), (to.0, to.1 + d))
        }
    };
    let mut stroke = |d: f32, pen: &Pen| {
        let (a, b) = shifted(d);
        surface.draw_line(a.0, a.1, b.0, b.1, pen);
    };
    match line {
        TableLine::None => {}
        TableLine::Single => stroke(0.0, pen),
        TableLine::Heavy => stroke(0.0, &Pen { width: 2.0 * lw, ..*pen }),
        TableLine::Dashed => stroke(0.0, &pen.with_style(LineStyle::Dashed)),
        TableLine::Double => {
            stroke(-lw, pen);
            stroke(lw, pen);
        }
        TableLine::DoubleDashed => {
            let dashed = pen.with_style(LineStyle::Dashed);
            stroke(-lw, &dashed);
            stroke(lw, &dashed);
        }
    }
}

pub(super) fn draw_matrix(
    ctx: &LayoutContext<'_>,
    matrix: &MatrixNode,
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
) -> f32 {
    let layout = layout(ctx, matrix, env);
    let top = y - layout.metrics.baseline_height;
    let bottom = top + layout.metrics.overall_height;
    let right = x + layout.metrics.width;

    for (r, row) in matrix.rows.iter().enumerate() {
        let baseline = top + layout.row_baselines[r];
        for (c, cell) in row.iter().enumerate().take(matrix.columns) {
            let size = layout.cells[r][c];
            let free = layout.column_widths[c] - size.width;
            let dx = match matrix.column_alignment.get(c).copied().unwrap_or(HAlign::Center) {
                HAlign::Left => 0.0,
                HAlign::Center => free / 2.0,
                HAlign::Right => free,
            };
            ctx.draw(cell, surface, x + layout.column_x[c] + dx, baseline, env);
        }
    }

    let pen = ctx.pen(env);
    for (index, rx) in layout.column_rules.iter().enumerate() {
        let line = line_at(&matrix.column_lines, index);
        draw_rule(surface, line, (x + rx, top), (x + rx, bottom), true, &pen);
    }
    for (index, ry) in layout.row_rules.iter().enumerate() {
        let line = line_at(&matrix.row_lines, index);
        draw_rule(surface, line, (x, top + ry), (right, top + ry), false, &pen);
    }
    right
}
