//! Tab-separated dumps of every body in the world.
//!
//! One header row, then one row per mover (`m`) followed by one row per egg
//! (`e`). Each row lists the limb count and an `x, y, R` triple for the core
//! and then for each limb in construction order.

use crate::body::Body;
use crate::simulation::WorldView;
use hatchery_core::{Circle, Result};
use std::io::Write;

const CIRCLE_ATTRS: [&str; 3] = ["x", "y", "R"];

/// Column names for bodies carrying `limb_count` limbs.
pub fn header(limb_count: usize) -> Vec<String> {
    let mut cols = vec!["kind".to_string(), "nr_limbs".to_string()];
    cols.extend(CIRCLE_ATTRS.iter().map(|attr| format!("core_{attr}")));
    for limb in 0..limb_count {
        cols.extend(CIRCLE_ATTRS.iter().map(|attr| format!("limb_{limb}_{attr}")));
    }
    cols
}

/// Write the whole world as TSV. The header is sized from the first body
/// present; an empty world gets a core-only header and no rows.
pub fn write_snapshot<W: Write>(writer: &mut W, view: &WorldView<'_>) -> Result<()> {
    let limb_count = view
        .bodies()
        .next()
        .map(|(_, body)| body.limb_count())
        .unwrap_or(0);
    write_row(writer, &header(limb_count))?;

    for (kind, body) in view.bodies() {
        let mut cols = vec![kind.tag().to_string(), body.limb_count().to_string()];
        cols.extend(body_cols(body));
        write_row(writer, &cols)?;
    }
    writer.flush()?;
    Ok(())
}

fn body_cols(body: &Body) -> impl Iterator<Item = String> + '_ {
    body.circles().flat_map(circle_cols)
}

fn circle_cols(circle: &Circle) -> [String; 3] {
    [
        format_float(circle.centre.x),
        format_float(circle.centre.y),
        format_float(circle.radius),
    ]
}

/// Shortest decimal form that round-trips, never in exponent notation.
fn format_float(value: f64) -> String {
    format!("{value}")
}

fn write_row<W: Write>(writer: &mut W, cols: &[String]) -> Result<()> {
    writeln!(writer, "{}", cols.join("\t"))?;
    Ok(())
}
