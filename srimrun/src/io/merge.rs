//! Merging per-fragment collision logs into one file per ion.
//!
//! Fragments number their ions locally (1..=N), so concatenating their
//! `COLLISON.txt` files would repeat ion numbers. The merger rewrites
//! the `For Ion NNNNNNN` markers of every fragment after the first so
//! numbering continues monotonically across the whole batch.
//!
//! Collision logs are written by TRIM in a legacy 8-bit encoding with
//! box-drawing characters, so everything here works on raw bytes.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use regex::bytes::Regex;
use tracing::{debug, info};

use crate::core::element::Element;
use crate::io::input_files::TRIM_INPUT_FILE;

pub const COLLISION_FILE: &str = "COLLISON.txt";
const HISTORY_MARKER: &[u8] = b"==========================  COLLISION HISTORY";
/// Header lines between the banner and the first event record.
const BANNER_HEADER_LINES: usize = 9;

/// Merge summary for one ion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedIon {
    pub symbol: String,
    pub fragments: usize,
    pub total_ions: u32,
    pub output: PathBuf,
}

/// Merge every ion's fragment collision logs inside a results arena.
///
/// Expects the layout the harness produces: `<arena>/<symbol>/<index>/`
/// with integer-named fragment slots. Ion directories without collision
/// logs are skipped. Returns one summary per merged ion, ordered by
/// atomic number.
pub fn merge_arena(arena: &Path) -> Result<Vec<MergedIon>> {
    let mut merged = Vec::new();
    let entries =
        fs::read_dir(arena).with_context(|| format!("read arena {}", arena.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("list {}", arena.display()))?;
        let ion_dir = entry.path();
        if !ion_dir.is_dir() {
            continue;
        }
        let symbol = entry.file_name().to_string_lossy().into_owned();
        if let Some(report) = merge_ion(&ion_dir, &symbol)? {
            merged.push(report);
        }
    }

    merged.sort_by_key(|report| {
        Element::from_symbol(&report.symbol).map_or(u32::MAX, |element| element.z)
    });
    Ok(merged)
}

fn merge_ion(ion_dir: &Path, symbol: &str) -> Result<Option<MergedIon>> {
    let mut fragments = fragment_slots(ion_dir)?;
    fragments.sort_by_key(|(index, _)| *index);

    let mut files = Vec::new();
    let mut total_ions = 0u32;
    for (_, slot) in &fragments {
        let collision = slot.join(COLLISION_FILE);
        if !collision.is_file() {
            continue;
        }
        let count = read_total_ions(&slot.join(TRIM_INPUT_FILE))
            .with_context(|| format!("fragment {}", slot.display()))?;
        files.push((collision, count));
        total_ions += count;
    }

    if files.is_empty() {
        return Ok(None);
    }

    let output = ion_dir.join(COLLISION_FILE);
    if files.len() == 1 {
        fs::copy(&files[0].0, &output)
            .with_context(|| format!("copy {} to {}", files[0].0.display(), output.display()))?;
    } else {
        merge_collision_files(&output, &files)?;
    }

    info!(ion = symbol, fragments = files.len(), total_ions, "merged collision logs");
    Ok(Some(MergedIon {
        symbol: symbol.to_string(),
        fragments: files.len(),
        total_ions,
        output,
    }))
}

/// Integer-named save slots under an ion directory.
fn fragment_slots(ion_dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let mut slots = Vec::new();
    let entries =
        fs::read_dir(ion_dir).with_context(|| format!("read {}", ion_dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("list {}", ion_dir.display()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if let Ok(index) = entry.file_name().to_string_lossy().parse::<u32>() {
            slots.push((index, path));
        }
    }
    Ok(slots)
}

/// Read the fragment's ion count back out of its `TRIM.IN` (third line,
/// third-from-last token).
pub fn read_total_ions(trim_in: &Path) -> Result<u32> {
    let contents =
        fs::read_to_string(trim_in).with_context(|| format!("read {}", trim_in.display()))?;
    let line = contents
        .lines()
        .nth(2)
        .ok_or_else(|| anyhow!("{} has no ion line", trim_in.display()))?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(anyhow!("malformed ion line in {}", trim_in.display()));
    }
    tokens[tokens.len() - 3]
        .parse()
        .with_context(|| format!("parse ion count in {}", trim_in.display()))
}

fn merge_collision_files(output: &Path, files: &[(PathBuf, u32)]) -> Result<()> {
    let (first, first_count) = &files[0];
    fs::copy(first, output)
        .with_context(|| format!("copy {} to {}", first.display(), output.display()))?;

    let marker = Regex::new(r"For Ion\s+(\d+)").expect("valid regex");
    let mut current_ion = *first_count;

    let mut out = OpenOptions::new()
        .append(true)
        .open(output)
        .with_context(|| format!("open {} for append", output.display()))?;

    for (path, _) in &files[1..] {
        debug!(file = %path.display(), "appending fragment");
        let file =
            fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
        let mut reader = BufReader::new(file);
        let mut in_header = true;
        let mut header_lines_left = BANNER_HEADER_LINES;

        let mut line = Vec::new();
        loop {
            line.clear();
            let n = reader
                .read_until(b'\n', &mut line)
                .with_context(|| format!("read {}", path.display()))?;
            if n == 0 {
                break;
            }

            if in_header {
                if find_subslice(&line, HISTORY_MARKER).is_some() {
                    in_header = false;
                }
                continue;
            }
            if header_lines_left > 0 {
                header_lines_left -= 1;
                continue;
            }

            if marker.is_match(&line) {
                current_ion += 1;
                let renumbered =
                    marker.replace(&line, format!("For Ion {current_ion:07}").into_bytes());
                out.write_all(&renumbered)
                    .with_context(|| format!("append to {}", output.display()))?;
            } else {
                out.write_all(&line)
                    .with_context(|| format!("append to {}", output.display()))?;
            }
        }
    }

    Ok(())
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
