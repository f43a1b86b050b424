//! Network node loaders.
//!
//! Two layouts are understood:
//!
//! - a delimited table with a header naming the id column (`node_id`, `id`
//!   or `i`), `x`, `y` and optionally `is_centroid`
//! - the node section of a network batch file, where `a` adds a regular node,
//!   `a*` adds a centroid and `c` starts a comment:
//!
//! ```text
//! c  Downtown
//! t nodes init
//! a*     1  630100.0  4834500.0
//! a   1001  630378.9  4834625.7  0  0  0
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::info;

use crate::identifiers::NodeId;
use crate::models::types::*;
use crate::network::NodeTable;
use crate::sources::has_extension;

const ID_COLUMNS: [&str; 3] = ["node_id", "id", "i"];
const BATCH_EXTENSIONS: [&str; 3] = ["211", "d211", "in"];

/// Load a node file, reading `.211`/`.d211`/`.in` as batch files and anything
/// else as a delimited table
pub fn load_nodes(path: &Path) -> Result<NodeTable> {
    let origin = path.display().to_string();
    let file = File::open(path)?;
    let table = if has_extension(path, &BATCH_EXTENSIONS) {
        read_batch_nodes(BufReader::new(file), &origin)?
    } else {
        read_node_csv(file, &origin)?
    };

    info!(
        "Loaded {} nodes ({} centroids) from {}",
        table.len(),
        table.centroid_count(),
        origin
    );
    Ok(table)
}

/// Parse a delimited node table; `origin` names the source in error messages
pub fn read_node_csv<R: Read>(reader: R, origin: &str) -> Result<NodeTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    let column = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
    };
    let missing = |name: &str| {
        MatchError::malformed(format!("{} header", origin), format!("missing column {}", name))
    };

    let id_col = column(&ID_COLUMNS).ok_or_else(|| missing("node_id"))?;
    let x_col = column(&["x"]).ok_or_else(|| missing("x"))?;
    let y_col = column(&["y"]).ok_or_else(|| missing("y"))?;
    let centroid_col = column(&["is_centroid"]);

    let mut table = NodeTable::new();
    let mut raw = csv::StringRecord::new();
    while reader.read_record(&mut raw)? {
        let line = raw.position().map(|p| p.line()).unwrap_or_default();
        let at = || format!("{} line {}", origin, line);
        let field = |col: usize| raw.get(col).unwrap_or("");

        let id = parse_id(field(id_col)).map_err(|reason| MatchError::malformed(at(), reason))?;
        let x = parse_coordinate(field(x_col), "x").map_err(|reason| MatchError::malformed(at(), reason))?;
        let y = parse_coordinate(field(y_col), "y").map_err(|reason| MatchError::malformed(at(), reason))?;
        let is_centroid = match centroid_col {
            Some(col) => parse_flag(field(col)).map_err(|reason| MatchError::malformed(at(), reason))?,
            None => false,
        };

        table
            .insert(NetworkNode {
                id,
                planar: PlanarPoint::new(x, y),
                is_centroid,
            })
            .map_err(|_| MatchError::malformed(at(), format!("duplicate node id {}", id)))?;
    }
    Ok(table)
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Nodes,
    Other,
}

/// Parse the node records of a network batch file
///
/// Records before any `t` line are taken as nodes; a `t` line naming another
/// section switches node parsing off until the next `t nodes`.
pub fn read_batch_nodes<R: BufRead>(reader: R, origin: &str) -> Result<NodeTable> {
    let mut table = NodeTable::new();
    let mut section = Section::Nodes;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let at = || format!("{} line {}", origin, index + 1);
        let mut tokens = line.split_whitespace();
        let Some(tag) = tokens.next() else {
            continue;
        };

        match tag {
            "c" => {}
            "t" => {
                section = match tokens.next() {
                    Some(name) if name.eq_ignore_ascii_case("nodes") => Section::Nodes,
                    _ => Section::Other,
                };
            }
            _ if section == Section::Other => {}
            "a" | "a*" => {
                let mut next = |name: &str| {
                    tokens
                        .next()
                        .ok_or_else(|| MatchError::malformed(at(), format!("missing {}", name)))
                };
                let id = next("node id")?;
                let x = next("x")?;
                let y = next("y")?;

                let id = parse_id(id).map_err(|reason| MatchError::malformed(at(), reason))?;
                let x = parse_coordinate(x, "x").map_err(|reason| MatchError::malformed(at(), reason))?;
                let y = parse_coordinate(y, "y").map_err(|reason| MatchError::malformed(at(), reason))?;

                table
                    .insert(NetworkNode {
                        id,
                        planar: PlanarPoint::new(x, y),
                        is_centroid: tag == "a*",
                    })
                    .map_err(|_| MatchError::malformed(at(), format!("duplicate node id {}", id)))?;
            }
            other => {
                return Err(MatchError::malformed(
                    at(),
                    format!("unsupported node record {:?}", other),
                ))
            }
        }
    }
    Ok(table)
}

fn parse_id(s: &str) -> std::result::Result<NodeId, String> {
    s.parse()
        .map_err(|_| format!("node id {:?} is not a non-negative integer", s))
}

fn parse_coordinate(s: &str, name: &str) -> std::result::Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("{} {:?} is not a finite number", name, s)),
    }
}

fn parse_flag(s: &str) -> std::result::Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        _ => Err(format!("is_centroid {:?} is not a boolean", s)),
    }
}
