//! Text grid format for tag catalogs.
//!
//! One tag per line. The tag name comes first, followed by one `|...|`
//! block per entity; every character inside a block is one frame and `#`
//! marks the frames carrying the tag:
//!
//! ```text
//! All     |##########| |######|
//! None    |          | |      |
//! Running |####      | |  ####|
//! ```

use super::CatalogError;
use crate::set::{EntityId, Interval, RangeSet};

/// Built-in catalogs: (name, grid text)
pub const BUILTIN_GRIDS: &[(&str, &str)] = &[
    ("locomotion", include_str!("../../data/locomotion.tags")),
    ("gait", include_str!("../../data/gait.tags")),
    ("simple", include_str!("../../data/simple.tags")),
];

/// Grid text of a built-in catalog
pub fn builtin_grid(name: &str) -> Option<&'static str> {
    BUILTIN_GRIDS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, text)| *text)
}

/// Parse grid text into `(tag name, range set)` rows, in file order
pub fn parse_grid(text: &str) -> Result<Vec<(String, RangeSet)>, CatalogError> {
    let mut rows = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        rows.push(parse_row(line, line_no + 1)?);
    }

    Ok(rows)
}

fn parse_row(line: &str, line_no: usize) -> Result<(String, RangeSet), CatalogError> {
    let malformed = |message: &str| CatalogError::Malformed {
        line: line_no,
        message: message.to_string(),
    };

    let Some(name_end) = line.find('|') else {
        return Err(malformed("missing '|' after tag name"));
    };
    let name: String = line[..name_end].chars().filter(|c| !c.is_whitespace()).collect();
    if name.is_empty() {
        return Err(malformed("empty tag name"));
    }

    let mut set = RangeSet::new();
    let mut rest = &line[name_end..];
    let mut entity: EntityId = 0;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let Some(body) = rest.strip_prefix('|') else {
            return Err(malformed("expected '|' to open an entity block"));
        };
        let Some(close) = body.find('|') else {
            return Err(malformed("unterminated entity block"));
        };

        let intervals = block_intervals(&body[..close]);
        if !intervals.is_empty() {
            set.push(entity, &intervals);
        }

        entity += 1;
        rest = &body[close + 1..];
    }

    if entity == 0 {
        return Err(malformed("no entity blocks"));
    }

    Ok((name, set))
}

/// Maximal runs of `#` in one block, as frame intervals
fn block_intervals(block: &str) -> Vec<Interval> {
    let mut intervals = Vec::new();
    let mut start: Option<i32> = None;
    let mut frame = 0i32;

    for ch in block.chars() {
        match (start, ch == '#') {
            (None, true) => start = Some(frame),
            (Some(s), false) => {
                intervals.push(Interval::new(s, frame));
                start = None;
            }
            _ => {}
        }
        frame += 1;
    }

    if let Some(s) = start {
        intervals.push(Interval::new(s, frame));
    }

    intervals
}
