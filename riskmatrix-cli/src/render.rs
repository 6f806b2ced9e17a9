//! Plain-text rendering of the risk matrix.
//!
//! Impact runs down the rows (5 at the top), probability across the columns.
//! Tolerable cells carry a `*`; the tolerance boundary is drawn with `#`
//! between columns and `=` between rows.

use riskmatrix_core::{GRID_SIZE, GridCell, MatrixKind, Rating, RiskLevel, RiskScoringEngine};
use std::fmt::Write;

const CELL_WIDTH: usize = 11;

pub fn level_tag(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Unrated => "-",
        RiskLevel::Low => "BAJO",
        RiskLevel::Medium => "MEDIO",
        RiskLevel::High => "ALTO",
        RiskLevel::Critical => "CRIT",
    }
}

fn rule(edges: impl Iterator<Item = bool>) -> String {
    let mut line = String::from("      +");
    for boundary in edges {
        let fill = if boundary { '=' } else { '-' };
        line.extend(std::iter::repeat_n(fill, CELL_WIDTH));
        line.push('+');
    }
    line
}

pub fn render_matrix(engine: &RiskScoringEngine, kind: MatrixKind) -> String {
    let mut out = String::new();
    let label = match kind {
        MatrixKind::Inherente => "inherente",
        MatrixKind::Residual => "residual",
    };
    let _ = writeln!(out, "Mapa {label} (filas: impacto, columnas: probabilidad)");
    let _ = writeln!(out, "{}", rule((0..GRID_SIZE).map(|_| false)));

    for impact in Rating::all().collect::<Vec<_>>().into_iter().rev() {
        let views: Vec<_> = Rating::all()
            .map(|p| engine.cell_view(kind, GridCell::new(p, impact)))
            .collect();

        let _ = write!(out, "  I{impact}  |");
        for view in &views {
            let mark = if view.tolerable { "*" } else { " " };
            let text = format!("{:>5} {}{}", view.value, level_tag(view.level), mark);
            let sep = if view.edges.right { '#' } else { '|' };
            let _ = write!(out, "{text:<CELL_WIDTH$}{sep}");
        }
        out.push('\n');
        let _ = writeln!(out, "{}", rule(views.iter().map(|v| v.edges.bottom)));
    }

    let _ = write!(out, "      ");
    for p in Rating::all() {
        let _ = write!(out, " {:^width$}", format!("P{p}"), width = CELL_WIDTH);
    }
    out.push('\n');
    out
}
