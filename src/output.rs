//! Output formatting for query results and catalogs

use crate::catalog::TagCatalog;
use crate::engine::QueryOutcome;
use crate::set::{EntityId, Interval, RangeSet};
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Stdout stream honoring the `--color` choice
pub fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// One entity's timeline as `|##  #|`, sized from the universe
pub fn timeline(catalog: &TagCatalog, set: &RangeSet, entity: EntityId) -> String {
    let len = catalog.entity_length(entity).unwrap_or(0);
    let mut row = vec![' '; len];
    for range in set.get(entity).unwrap_or(&[]) {
        for frame in range.frames() {
            if let Some(cell) = row.get_mut(frame) {
                *cell = '#';
            }
        }
    }

    let mut s = String::with_capacity(len + 2);
    s.push('|');
    s.extend(row);
    s.push('|');
    s
}

/// Print a tag grid: one row per named set, one block per entity
pub fn print_grid<W: WriteColor>(
    out: &mut W,
    catalog: &TagCatalog,
    rows: &[(&str, &RangeSet)],
) -> io::Result<()> {
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    for (name, set) in rows {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        write!(out, "{:<width$}", name, width = width)?;
        out.reset()?;

        for &entity in catalog.universe().entities() {
            write!(out, " ")?;
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            write!(out, "{}", timeline(catalog, set, entity))?;
            out.reset()?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Print a query outcome: the error, or the grid row and interval lists
pub fn print_outcome<W: WriteColor>(
    out: &mut W,
    catalog: &TagCatalog,
    query: &str,
    outcome: &QueryOutcome,
) -> io::Result<()> {
    if let Some(err) = &outcome.error {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(out, "error")?;
        out.reset()?;
        writeln!(out, ": {}", err)?;
        return Ok(());
    }

    print_grid(out, catalog, &[("Result", &outcome.result)])?;

    for (entity, intervals) in outcome.result.iter() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(out, "{}", entity)?;
        out.reset()?;
        write!(out, ":")?;
        for range in intervals {
            write!(out, " {}", range)?;
        }
        writeln!(out)?;
    }

    if outcome.result.is_empty() && !query.trim().is_empty() {
        writeln!(out, "(no matching frames)")?;
    }

    Ok(())
}

/// Print tag names with entity and interval counts
pub fn print_tags<W: WriteColor>(out: &mut W, catalog: &TagCatalog) -> io::Result<()> {
    let width = catalog.names().iter().map(String::len).max().unwrap_or(0);

    for (name, set) in catalog.names().iter().zip(catalog.range_sets()) {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(out, "{:<width$}", name, width = width)?;
        out.reset()?;
        writeln!(
            out,
            "  entities={} intervals={} frames={}",
            set.len(),
            set.interval_count(),
            set.frame_count()
        )?;
    }

    Ok(())
}

#[derive(Debug, Serialize)]
pub struct EntityView<'a> {
    pub entity: EntityId,
    pub intervals: &'a [Interval],
}

/// JSON form of a query outcome
#[derive(Debug, Serialize)]
pub struct OutcomeView<'a> {
    pub query: &'a str,
    /// Postfix token codes of the parsed expression
    pub expression: Option<Vec<i32>>,
    pub error: Option<String>,
    pub cached: bool,
    pub frames: usize,
    pub entities: Vec<EntityView<'a>>,
}

impl<'a> OutcomeView<'a> {
    pub fn new(query: &'a str, outcome: &'a QueryOutcome) -> Self {
        Self {
            query,
            expression: outcome.expression.as_ref().map(|e| e.codes()),
            error: outcome.error.as_ref().map(|e| e.to_string()),
            cached: outcome.cached,
            frames: outcome.result.frame_count(),
            entities: outcome
                .result
                .iter()
                .map(|(entity, intervals)| EntityView { entity, intervals })
                .collect(),
        }
    }
}

/// Write a query outcome as one line of JSON
pub fn write_outcome_json<W: Write>(out: &mut W, query: &str, outcome: &QueryOutcome) -> io::Result<()> {
    serde_json::to_writer(&mut *out, &OutcomeView::new(query, outcome))?;
    writeln!(out)
}
