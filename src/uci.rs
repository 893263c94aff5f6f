use log::{debug, warn};
use serde::Serialize;

/// One principal variation reported at a given search depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variation {
    /// Move tokens in long algebraic notation, best line first.
    pub moves: Vec<String>,
    /// Centipawn score, signed by side to move.
    pub score_cp: i32,
    /// Depth at which the engine produced this line.
    pub depth: u32,
}

/// Ranked result set: outer index is the variation rank (0-indexed; the wire
/// `multipv` field is 1-indexed), inner records in increasing-depth order.
pub type RankedVariations = Vec<Vec<Variation>>;

/// Extract the move from a terminal `bestmove` line. Any other line,
/// including a truncated `bestmove` with no move token, yields `None`.
pub fn parse_bestmove(line: &str) -> Option<String> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "bestmove" {
        return None;
    }
    tokens.next().map(str::to_string)
}

/// Incremental parser for multipv `info` output.
///
/// Feeds on raw engine lines, accumulating one record per depth increment
/// and rank until the terminal `bestmove` arrives. Malformed lines are
/// dropped locally and never surface to the caller.
pub struct MultiPvCollector {
    pvs: usize,
    ranks: RankedVariations,
}

impl MultiPvCollector {
    pub fn new(pvs: u32) -> Self {
        let pvs = pvs.max(1) as usize;
        Self { pvs, ranks: vec![Vec::new(); pvs] }
    }

    /// Consume one engine line. Returns the accumulated snapshot when the
    /// line is the terminal `bestmove`, leaving the collector empty.
    pub fn feed(&mut self, line: &str) -> Option<RankedVariations> {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("bestmove") => {
                Some(std::mem::replace(&mut self.ranks, vec![Vec::new(); self.pvs]))
            }
            Some("info") => {
                let fields: Vec<&str> = tokens.collect();
                self.collect_info(&fields);
                None
            }
            Some(_) => {
                warn!("unrecognized engine line: {line}");
                None
            }
            None => None,
        }
    }

    /// Accumulated state so far.
    pub fn ranks(&self) -> &RankedVariations {
        &self.ranks
    }

    fn collect_info(&mut self, fields: &[&str]) {
        // An info line carrying a scored pv has at least the depth/multipv/cp
        // label-value pairs plus `pv`; anything shorter is a fragment.
        if fields.len() < 7 {
            return;
        }

        // Single pass over the token stream: labeled integers, then the move
        // list trailing the `pv` marker.
        let mut depth: Option<u32> = None;
        let mut multipv: Option<u32> = None;
        let mut cp: Option<i32> = None;
        let mut pv_at: Option<usize> = None;
        let mut i = 0;
        while i < fields.len() {
            match fields[i] {
                "depth" => {
                    depth = parse_value(fields, i);
                    i += 2;
                }
                "multipv" => {
                    multipv = parse_value(fields, i);
                    i += 2;
                }
                "cp" => {
                    cp = parse_value(fields, i);
                    i += 2;
                }
                "pv" => {
                    pv_at = Some(i + 1);
                    break;
                }
                _ => i += 1,
            }
        }

        let (Some(depth), Some(multipv), Some(cp), Some(pv_at)) = (depth, multipv, cp, pv_at)
        else {
            debug!("info line missing a required field, dropped");
            return;
        };

        if multipv == 0 || multipv as usize > self.ranks.len() {
            warn!("multipv {multipv} outside the configured range, line dropped");
            return;
        }
        let by_depth = &mut self.ranks[multipv as usize - 1];

        // Monotonic-depth admission: duplicate or shallower reports for a
        // rank are dropped.
        if by_depth.last().map_or(true, |prev| depth > prev.depth) {
            by_depth.push(Variation {
                moves: fields[pv_at..].iter().map(|s| s.to_string()).collect(),
                score_cp: cp,
                depth,
            });
        }
    }
}

fn parse_value<T: std::str::FromStr>(fields: &[&str], label_at: usize) -> Option<T> {
    fields.get(label_at + 1).and_then(|tok| tok.parse().ok())
}
