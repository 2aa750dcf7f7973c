use crate::cancel::CancelToken;
use crate::decompose::convex_decomposition;
use crate::{CellId, Config, GridGraph};
use fxhash::FxHashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::warn;

/// Split the graph with a separator derived from an external two-way
/// balanced partitioner (KaHIP's `kaffpa` interface).
///
/// Cell ids are re-labeled to a dense 1-based range and written as a
/// METIS-format graph to a temp file; the partitioner's output assigns each
/// cell a partition, and every cell of degree ≥ 2 whose first neighbor's
/// partition differs from any other neighbor's partition joins the
/// separator. Invocation and parse failures retry until the token fires; a
/// missing binary aborts outright. Temp files are unlinked on every exit
/// path.
pub(crate) fn partitioner_separator(
    g: &GridGraph,
    config: &Config,
    cancel: &CancelToken,
) -> Option<Vec<GridGraph>> {
    let binary = config.partitioner.as_ref()?;

    let input = match NamedTempFile::with_suffix(".graph") {
        Ok(file) => file,
        Err(error) => {
            warn!(%error, "could not create partitioner input file");
            return None;
        }
    };
    let output = match NamedTempFile::with_suffix(".out") {
        Ok(file) => file,
        Err(error) => {
            warn!(%error, "could not create partitioner output file");
            return None;
        }
    };

    // Dense 1-based relabeling in ascending id order, so runs are stable.
    let mut old_ids: Vec<CellId> = g.adjacency.keys().copied().collect();
    old_ids.sort_unstable();
    let id_map: FxHashMap<CellId, usize> = old_ids
        .iter()
        .enumerate()
        .map(|(index, &id)| (id, index + 1))
        .collect();

    if let Err(error) = write_metis_graph(g, input.path(), &old_ids, &id_map) {
        warn!(%error, "could not write partitioner input");
        return None;
    }

    loop {
        if cancel.is_cancelled() {
            return None;
        }

        let status = Command::new(binary)
            .arg(input.path())
            .arg("--k=2")
            .arg("--imbalance=0")
            .arg("--preconfiguration=strong")
            .arg(format!("--output_filename={}", output.path().display()))
            .status();
        match status {
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                warn!(binary = %binary.display(), "partitioner binary not found");
                return None;
            }
            Err(error) => {
                warn!(%error, "partitioner invocation failed");
                continue;
            }
            Ok(status) if !status.success() => {
                warn!(%status, "partitioner exited abnormally");
                continue;
            }
            Ok(_) => {}
        }

        let partitions = match read_partition_file(output.path()) {
            Ok(partitions) => partitions,
            Err(error) => {
                warn!(%error, "could not read partition output");
                continue;
            }
        };
        if partitions.len() < old_ids.len() {
            warn!(
                expected = old_ids.len(),
                read = partitions.len(),
                "partition output is incomplete"
            );
            continue;
        }

        if cancel.is_cancelled() {
            return None;
        }
        let separator = find_separator(g, &partitions, &id_map);
        if let Some(children) = convex_decomposition(g, &separator, cancel) {
            return Some(children);
        }
    }
}

/// Write the graph in METIS format: a `n m` header line, then one line per
/// node (1-based, ascending) listing its neighbors' dense ids.
pub(super) fn write_metis_graph(
    g: &GridGraph,
    path: &Path,
    old_ids: &[CellId],
    id_map: &FxHashMap<CellId, usize>,
) -> std::io::Result<()> {
    let edges: usize = g.adjacency.values().map(Vec::len).sum::<usize>() / 2;

    let mut writer = BufWriter::new(fs::File::create(path)?);
    writeln!(writer, "{} {}", old_ids.len(), edges)?;
    for &old_id in old_ids {
        let neighbors = g.adjacency.get(&old_id).map_or(&[][..], Vec::as_slice);
        let line: Vec<String> = neighbors
            .iter()
            .map(|neighbor| id_map[neighbor].to_string())
            .collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    writer.flush()
}

/// Read the partition assignment: one integer per line, in dense-id order.
pub(super) fn read_partition_file(path: &Path) -> std::io::Result<Vec<i32>> {
    let content = fs::read_to_string(path)?;
    content
        .split_whitespace()
        .map(|line| {
            line.parse().map_err(|_| {
                std::io::Error::new(std::io::ErrorKind::InvalidData, "bad partition id")
            })
        })
        .collect()
}

/// Cells with at least two neighbors whose first neighbor's partition
/// disagrees with any other neighbor's partition. Deliberately compares
/// against the first neighbor only.
pub(super) fn find_separator(
    g: &GridGraph,
    partitions: &[i32],
    id_map: &FxHashMap<CellId, usize>,
) -> Vec<CellId> {
    let mut separator = Vec::new();
    for (&node, neighbors) in &g.adjacency {
        if neighbors.len() < 2 {
            continue;
        }
        let first = partitions[id_map[&neighbors[0]] - 1];
        if neighbors
            .iter()
            .any(|neighbor| partitions[id_map[neighbor] - 1] != first)
        {
            separator.push(node);
        }
    }
    separator
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::graph_of;
    use std::time::Duration;

    // 3×3, ids offset as if carved from a larger map.
    fn offset_graph() -> GridGraph {
        graph_of(&[vec![3, 4, 5], vec![6, 7, 8], vec![9, 10, 11]])
    }

    fn dense_ids(g: &GridGraph) -> (Vec<CellId>, FxHashMap<CellId, usize>) {
        let mut old_ids: Vec<CellId> = g.adjacency().keys().copied().collect();
        old_ids.sort_unstable();
        let id_map = old_ids
            .iter()
            .enumerate()
            .map(|(index, &id)| (id, index + 1))
            .collect();
        (old_ids, id_map)
    }

    #[test]
    fn test_write_metis_graph() {
        let g = offset_graph();
        let (old_ids, id_map) = dense_ids(&g);
        let file = NamedTempFile::new().expect("temp file");
        write_metis_graph(&g, file.path(), &old_ids, &id_map).expect("write");

        let content = fs::read_to_string(file.path()).expect("read back");
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("9 12"));
        // Node 1 (= cell 3) neighbors: south 6 → 4, east 4 → 2.
        assert_eq!(lines.next(), Some("4 2"));
        assert_eq!(content.lines().count(), 10);
    }

    #[test]
    fn test_read_partition_file() {
        let file = NamedTempFile::new().expect("temp file");
        fs::write(file.path(), "0\n0\n0\n0\n0\n0\n1\n1\n1\n").expect("write");
        let partitions = read_partition_file(file.path()).expect("parse");
        assert_eq!(partitions, vec![0, 0, 0, 0, 0, 0, 1, 1, 1]);

        fs::write(file.path(), "0\nnope\n1\n").expect("write");
        assert!(read_partition_file(file.path()).is_err());
    }

    #[test]
    fn test_find_separator() {
        let g = offset_graph();
        let (_, id_map) = dense_ids(&g);
        // Top two rows in partition 0, bottom row in partition 1.
        let partitions = vec![0, 0, 0, 0, 0, 0, 1, 1, 1];

        let mut separator = find_separator(&g, &partitions, &id_map);
        separator.sort_unstable();
        assert_eq!(separator, vec![6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_disabled_without_binary() {
        let g = offset_graph();
        let cancel = CancelToken::with_deadline(Duration::from_secs(60));
        assert!(partitioner_separator(&g, &Config::default(), &cancel).is_none());
    }

    #[test]
    fn test_missing_binary_fails_fast() {
        let g = offset_graph();
        let config = Config {
            partitioner: Some("/nonexistent/kaffpa".into()),
            ..Config::default()
        };
        let cancel = CancelToken::with_deadline(Duration::from_secs(60));
        assert!(partitioner_separator(&g, &config, &cancel).is_none());
    }
}
