use crate::core::io::script::ScriptError;
use crate::core::models::ids::{ChemicalSystemMap, block_id};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const SOLUTION_RAW: &str = "SOLUTION_RAW";

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("Could not open dump file '{path}': {source}", path = path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Error when reading dump file: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed SOLUTION_RAW header on line {line}: '{content}'")]
    MalformedHeader { line: usize, content: String },

    #[error("Dump file holds solution {solution_id}, which belongs to no chemical system")]
    UnknownSolution { solution_id: usize },
}

/// Raw solution state the engine dumps at the end of a run and gets back on the next one.
///
/// Each dumped `SOLUTION_RAW <id>` block is renumbered to `N + id` so it can sit in the same
/// script as the freshly written `SOLUTION <id>` without colliding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dump {
    dump_file: PathBuf,
    aqueous_solutions_prev: Vec<Option<String>>, // Indexed by local system position
}

impl Dump {
    pub fn new(dump_file: impl Into<PathBuf>) -> Self {
        Self {
            dump_file: dump_file.into(),
            aqueous_solutions_prev: Vec::new(),
        }
    }

    pub fn dump_file(&self) -> &Path {
        &self.dump_file
    }

    pub fn previous_solution(&self, local_id: usize) -> Option<&str> {
        self.aqueous_solutions_prev
            .get(local_id)
            .and_then(|block| block.as_deref())
    }

    pub fn has_previous_solution(&self, local_id: usize) -> bool {
        self.previous_solution(local_id).is_some()
    }

    pub fn num_previous_solutions(&self) -> usize {
        self.aqueous_solutions_prev
            .iter()
            .filter(|block| block.is_some())
            .count()
    }

    pub fn read_from_path(&mut self, system_map: &ChemicalSystemMap) -> Result<(), DumpError> {
        let file = File::open(&self.dump_file).map_err(|source| DumpError::Open {
            path: self.dump_file.clone(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        self.read_from(&mut reader, system_map)
    }

    /// Replaces the stored previous state with the blocks found in `reader`.
    pub fn read_from(
        &mut self,
        reader: &mut impl BufRead,
        system_map: &ChemicalSystemMap,
    ) -> Result<(), DumpError> {
        let num_systems = system_map.len();
        let mut blocks: Vec<Option<String>> = vec![None; num_systems];
        let mut current: Option<(usize, String)> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let trimmed = line.trim();

            if trimmed.starts_with(SOLUTION_RAW) {
                if let Some((local_id, block)) = current.take() {
                    blocks[local_id] = Some(block);
                }
                let solution_id = trimmed
                    .split_whitespace()
                    .nth(1)
                    .and_then(|token| token.parse::<usize>().ok())
                    .ok_or_else(|| DumpError::MalformedHeader {
                        line: line_num + 1,
                        content: line.clone(),
                    })?;
                let local_id = solution_id
                    .checked_sub(1)
                    .and_then(|global_id| system_map.local_id(global_id))
                    .ok_or(DumpError::UnknownSolution { solution_id })?;
                current = Some((
                    local_id,
                    format!("{} {}\n", SOLUTION_RAW, num_systems + solution_id),
                ));
                continue;
            }

            if trimmed == "END" {
                continue;
            }

            if let Some((_, block)) = current.as_mut() {
                block.push_str(&line);
                block.push('\n');
            }
        }
        if let Some((local_id, block)) = current.take() {
            blocks[local_id] = Some(block);
        }

        self.aqueous_solutions_prev = blocks;
        debug!(
            "Read {} previous solution(s) from dump file.",
            self.num_previous_solutions()
        );
        Ok(())
    }

    /// Writes the DUMP block asking the engine to save every system's solution.
    pub fn write_block(
        &self,
        writer: &mut impl Write,
        system_map: &ChemicalSystemMap,
    ) -> Result<(), ScriptError> {
        writeln!(writer, "DUMP")?;
        writeln!(writer, "-file {}", self.dump_file.display())?;
        writeln!(writer, "-append false")?;
        writeln!(
            writer,
            "-solution {}",
            compress_ranges(system_map.global_ids().iter().map(|&g| block_id(g)))
        )?;
        writeln!(writer, "END")?;
        Ok(())
    }
}

/// Formats ids as the engine's range list, e.g. `1-3 5 7-8`.
fn compress_ranges(ids: impl IntoIterator<Item = usize>) -> String {
    let mut ids: Vec<usize> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let mut ranges: Vec<String> = Vec::new();
    let mut iter = ids.into_iter();
    let Some(first) = iter.next() else {
        return String::new();
    };
    let (mut start, mut end) = (first, first);
    let mut push = |start: usize, end: usize| {
        ranges.push(if start == end {
            start.to_string()
        } else {
            format!("{}-{}", start, end)
        })
    };
    for id in iter {
        if id == end + 1 {
            end = id;
        } else {
            push(start, end);
            start = id;
            end = id;
        }
    }
    push(start, end);
    ranges.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DUMP: &str = "\
SOLUTION_RAW                 1 Solution after simulation 1.
  -temp                     25
  -total_h                  111.0124
END
SOLUTION_RAW                 3 Solution after simulation 1.
  -temp                     25
  -total_h                  111.0130
END
";

    #[test]
    fn read_renumbers_blocks_and_routes_them_by_global_id() {
        let map = ChemicalSystemMap::new(vec![2, 0, 1]).unwrap();
        let mut dump = Dump::new("run.dmp");
        dump.read_from(&mut Cursor::new(DUMP), &map).unwrap();

        assert_eq!(dump.num_previous_solutions(), 2);
        // Solution 1 lives on global id 0, i.e. local position 1.
        assert_eq!(
            dump.previous_solution(1),
            Some("SOLUTION_RAW 4\n  -temp                     25\n  -total_h                  111.0124\n")
        );
        // Solution 3 lives on global id 2, i.e. local position 0.
        assert!(dump.previous_solution(0).unwrap().starts_with("SOLUTION_RAW 6\n"));
        assert!(!dump.has_previous_solution(2));
    }

    #[test]
    fn solution_without_system_is_rejected() {
        let map = ChemicalSystemMap::identity(2);
        let mut dump = Dump::new("run.dmp");
        let err = dump.read_from(&mut Cursor::new(DUMP), &map).unwrap_err();
        assert!(matches!(err, DumpError::UnknownSolution { solution_id: 3 }));
    }

    #[test]
    fn header_without_id_is_malformed() {
        let map = ChemicalSystemMap::identity(1);
        let mut dump = Dump::new("run.dmp");
        let err = dump
            .read_from(&mut Cursor::new("SOLUTION_RAW\n  -temp 25\n"), &map)
            .unwrap_err();
        assert!(matches!(err, DumpError::MalformedHeader { line: 1, .. }));
    }

    #[test]
    fn rereading_replaces_previous_state() {
        let map = ChemicalSystemMap::identity(3);
        let mut dump = Dump::new("run.dmp");
        dump.read_from(&mut Cursor::new(DUMP), &map).unwrap();
        dump.read_from(&mut Cursor::new(""), &map).unwrap();
        assert_eq!(dump.num_previous_solutions(), 0);
    }

    #[test]
    fn missing_dump_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut dump = Dump::new(dir.path().join("absent.dmp"));
        let err = dump
            .read_from_path(&ChemicalSystemMap::identity(1))
            .unwrap_err();
        assert!(err.to_string().contains("absent.dmp"));
    }

    #[test]
    fn dump_block_lists_compressed_solution_ranges() {
        let map = ChemicalSystemMap::new(vec![0, 1, 2, 4, 6, 7]).unwrap();
        let dump = Dump::new("run.dmp");
        let mut buffer = Vec::new();
        dump.write_block(&mut buffer, &map).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "DUMP\n-file run.dmp\n-append false\n-solution 1-3 5 7-8\nEND\n"
        );
    }

    #[test]
    fn compress_ranges_handles_single_and_unsorted_ids() {
        assert_eq!(compress_ranges([4]), "4");
        assert_eq!(compress_ranges([3, 1, 2, 9]), "1-3 9");
        assert_eq!(compress_ranges(Vec::new()), "");
    }
}
