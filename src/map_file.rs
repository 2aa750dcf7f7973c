#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::{cell_id, Grid, GridGraph, NO_CELL};
use bevy_math::{ivec2, IVec2};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Failure to load a benchmark map file.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("could not read map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed map header")]
    Header,
    #[error("truncated map grid")]
    Truncated,
}

/// Load a grid map in the benchmark `.map` format:
///
/// ```text
/// type octile
/// height <H>
/// width <W>
/// map
/// <H rows of W characters>
/// ```
///
/// `.` and `G` are passable; any other character is impassable. The
/// resulting graph owns the grid and a freshly built adjacency mapping.
pub fn load_map(path: impl AsRef<Path>) -> Result<GridGraph, MapError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut lines = BufReader::new(file).lines();

    let mut next_line = || -> Result<String, MapError> {
        match lines.next() {
            Some(line) => Ok(line?),
            None => Err(MapError::Header),
        }
    };

    // "type octile"
    next_line()?;
    let height = header_value(&next_line()?).ok_or(MapError::Header)?;
    let width = header_value(&next_line()?).ok_or(MapError::Header)?;
    if next_line()?.trim_end() != "map" {
        return Err(MapError::Header);
    }
    if height <= 0 || width <= 0 {
        return Err(MapError::Header);
    }

    let mut rows: Vec<Vec<i32>> = Vec::with_capacity(height as usize);
    for y in 0..height {
        let line = match lines.next() {
            Some(line) => line?,
            None => return Err(MapError::Truncated),
        };
        let mut row = Vec::with_capacity(width as usize);
        let mut chars = line.chars();
        for x in 0..width {
            let cell = match chars.next() {
                Some('.') | Some('G') => cell_id(ivec2(x, y), width),
                Some(_) => NO_CELL,
                None => return Err(MapError::Truncated),
            };
            row.push(cell);
        }
        rows.push(row);
    }

    let graph = GridGraph::from_grid(Grid::from_rows(&rows));
    debug!(
        path = %path.display(),
        width,
        height,
        cells = graph.node_count(),
        "loaded map"
    );
    Ok(graph)
}

fn header_value(line: &str) -> Option<i32> {
    let mut fields = line.split_whitespace();
    fields.next()?;
    fields.next()?.parse().ok()
}

/// One record of a benchmark `.scen` file.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scenario {
    pub bucket: i32,
    pub map_width: i32,
    pub start: IVec2,
    pub goal: IVec2,
}

impl Scenario {
    /// Cell id of the start position.
    #[inline]
    #[must_use]
    pub fn start_id(&self) -> i32 {
        cell_id(self.start, self.map_width)
    }

    /// Cell id of the goal position.
    #[inline]
    #[must_use]
    pub fn goal_id(&self) -> i32 {
        cell_id(self.goal, self.map_width)
    }
}

/// Load a benchmark `.scen` file. The version header line is skipped, and
/// so is every line that does not parse as a scenario record.
pub fn load_scenarios(path: impl AsRef<Path>) -> Result<Vec<Scenario>, MapError> {
    let file = File::open(path.as_ref())?;
    let mut scenarios = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if index == 0 {
            continue;
        }
        if let Some(scenario) = parse_scenario_line(&line) {
            scenarios.push(scenario);
        } else if !line.trim().is_empty() {
            debug!(line = index + 1, "skipping malformed scenario line");
        }
    }
    Ok(scenarios)
}

// Fields: bucket, map name, map width, map height, sx, sy, gx, gy, optimal.
fn parse_scenario_line(line: &str) -> Option<Scenario> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 8 {
        return None;
    }
    let bucket = fields[0].parse().ok()?;
    let map_width = fields[2].parse().ok()?;
    let sx = fields[4].parse().ok()?;
    let sy = fields[5].parse().ok()?;
    let gx = fields[6].parse().ok()?;
    let gy = fields[7].parse().ok()?;
    Some(Scenario {
        bucket,
        map_width,
        start: ivec2(sx, sy),
        goal: ivec2(gx, gy),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    #[test]
    fn test_load_map() {
        let file = write_temp(
            "type octile\nheight 3\nwidth 4\nmap\n.G..\n.@@.\n....\n",
        );
        let g = load_map(file.path()).expect("valid map");
        assert_eq!(g.width(), 4);
        assert_eq!(g.height(), 3);
        assert_eq!(g.node_count(), 10);
        // 'G' is passable, '@' is not.
        assert!(g.adjacency().contains_key(&1));
        assert!(!g.adjacency().contains_key(&5));
        assert!(!g.adjacency().contains_key(&6));
        assert_eq!(g.adjacency()[&0], vec![4, 1]);
    }

    #[test]
    fn test_load_map_rejects_bad_header() {
        for content in [
            "",
            "type octile\n",
            "type octile\nheight x\nwidth 4\nmap\n....\n",
            "type octile\nheight 1\nwidth 4\nnot-map\n....\n",
            "type octile\nheight 0\nwidth 4\nmap\n",
        ] {
            let file = write_temp(content);
            assert!(load_map(file.path()).is_err(), "accepted: {content:?}");
        }
    }

    #[test]
    fn test_load_map_rejects_truncated_grid() {
        let missing_row = write_temp("type octile\nheight 3\nwidth 4\nmap\n....\n....\n");
        assert!(matches!(
            load_map(missing_row.path()),
            Err(MapError::Truncated)
        ));

        let short_row = write_temp("type octile\nheight 2\nwidth 4\nmap\n....\n..\n");
        assert!(matches!(
            load_map(short_row.path()),
            Err(MapError::Truncated)
        ));
    }

    #[test]
    fn test_load_scenarios() {
        let file = write_temp(
            "version 1\n\
             0\tmaze.map\t512\t512\t1\t2\t3\t4\t6.0\n\
             this line is noise\n\
             2\tmaze.map\t512\t512\t10\t20\t30\t40\t60.0\n",
        );
        let scenarios = load_scenarios(file.path()).expect("readable");
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].bucket, 0);
        assert_eq!(scenarios[0].map_width, 512);
        assert_eq!(scenarios[0].start, ivec2(1, 2));
        assert_eq!(scenarios[0].goal, ivec2(3, 4));
        assert_eq!(scenarios[0].start_id(), 2 * 512 + 1);
        assert_eq!(scenarios[1].bucket, 2);
    }
}
