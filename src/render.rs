//! Chart rendering with scoped drawing contexts.
//!
//! A [`ChartSlot`] owns at most one live context. Every bind releases the old
//! context before creating the next one, and dropping the slot releases
//! whatever is still live.

use anyhow::{bail, Result};

use crate::curves::CurvePoint;
use crate::logging::{v_str, Domain, ProfileScope};
use crate::view::ChartSpec;

/// A stateful drawing surface.
pub trait DrawingContext {
    fn draw(&mut self, chart: &ChartSpec) -> Result<()>;
    fn release(&mut self);
}

/// Creates contexts for a named slot.
pub trait ContextFactory {
    type Context: DrawingContext;
    fn create(&mut self, slot: &str) -> Result<Self::Context>;
}

pub struct ChartSlot<F: ContextFactory> {
    name: &'static str,
    factory: F,
    active: Option<F::Context>,
}

impl<F: ContextFactory> ChartSlot<F> {
    pub fn new(name: &'static str, factory: F) -> Self {
        Self {
            name,
            factory,
            active: None,
        }
    }

    /// Release any live context, then draw `chart` on a fresh one.
    pub fn bind(&mut self, chart: &ChartSpec) -> Result<&F::Context> {
        let _scope = ProfileScope::with_context(
            Domain::Render,
            "chart_bind",
            &[("slot", v_str(self.name))],
        );
        self.dispose();
        let mut ctx = self.factory.create(self.name)?;
        if let Err(e) = ctx.draw(chart) {
            ctx.release();
            return Err(e);
        }
        Ok(self.active.insert(ctx))
    }

    pub fn dispose(&mut self) {
        if let Some(mut ctx) = self.active.take() {
            ctx.release();
        }
    }

    pub fn active(&self) -> Option<&F::Context> {
        self.active.as_ref()
    }
}

impl<F: ContextFactory> Drop for ChartSlot<F> {
    fn drop(&mut self) {
        self.dispose();
    }
}

// =============================================================================
// Text backend
// =============================================================================

/// Plots a chart as a character grid. Used by the CLI.
#[derive(Debug, Clone)]
pub struct TextCanvas {
    width: usize,
    height: usize,
    buf: Option<String>,
}

impl TextCanvas {
    pub fn output(&self) -> Option<&str> {
        self.buf.as_deref()
    }
}

impl DrawingContext for TextCanvas {
    fn draw(&mut self, chart: &ChartSpec) -> Result<()> {
        if self.width < 2 || self.height < 2 {
            bail!("canvas too small: {}x{}", self.width, self.height);
        }
        let mut grid = vec![vec![' '; self.width]; self.height];
        for pair in chart.points.windows(2) {
            plot_segment(&mut grid, pair[0], pair[1]);
        }
        for p in &chart.points {
            if let Some((col, row)) = cell(&grid, *p) {
                grid[row][col] = '*';
            }
        }
        let mut out = format!("{} [{} vs {}]\n", chart.title, chart.y_label, chart.x_label);
        for row in grid {
            out.push('|');
            out.extend(row);
            out.push('\n');
        }
        out.push('+');
        out.push_str(&"-".repeat(self.width));
        out.push('\n');
        out.push_str(&chart.footer);
        out.push('\n');
        self.buf = Some(out);
        Ok(())
    }

    fn release(&mut self) {
        self.buf = None;
    }
}

/// Map a unit-square point onto the grid; out-of-range points are clipped.
fn cell(grid: &[Vec<char>], p: CurvePoint) -> Option<(usize, usize)> {
    if !(0.0..=1.0).contains(&p.x) || !(0.0..=1.0).contains(&p.y) {
        return None;
    }
    let h = grid.len();
    let w = grid.first()?.len();
    let col = (p.x * (w - 1) as f64).round() as usize;
    let row = h - 1 - (p.y * (h - 1) as f64).round() as usize;
    Some((col, row))
}

fn plot_segment(grid: &mut [Vec<char>], a: CurvePoint, b: CurvePoint) {
    let steps = grid.first().map(|r| r.len()).unwrap_or(0).max(grid.len()) * 2;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let p = CurvePoint::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
        if let Some((col, row)) = cell(grid, p) {
            grid[row][col] = '.';
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextCanvasFactory {
    pub width: usize,
    pub height: usize,
}

impl Default for TextCanvasFactory {
    fn default() -> Self {
        Self {
            width: 40,
            height: 12,
        }
    }
}

impl ContextFactory for TextCanvasFactory {
    type Context = TextCanvas;

    fn create(&mut self, _slot: &str) -> Result<TextCanvas> {
        Ok(TextCanvas {
            width: self.width,
            height: self.height,
            buf: None,
        })
    }
}
