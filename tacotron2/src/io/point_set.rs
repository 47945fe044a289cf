use anyhow::{Context, Result, bail};
use candle_core::{Device, Tensor};
use serde::Deserialize;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A dense set of points, one row per point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    data: Vec<f32>,
    n_points: usize,
    dim: usize,
}

impl PointSet {
    /// Build from rows, rejecting empty and ragged input.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let Some(first) = rows.first() else {
            bail!("point set contains no points");
        };
        let dim = first.len();
        if dim == 0 {
            bail!("points must have at least one coordinate");
        }

        let n_points = rows.len();
        let mut data = Vec::with_capacity(n_points * dim);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                bail!("point {i} has {} coordinates, expected {dim}", row.len());
            }
            data.extend(row);
        }

        Ok(Self { data, n_points, dim })
    }

    pub fn n_points(&self) -> usize {
        self.n_points
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// (N, D) F32 tensor on `device`.
    pub fn to_tensor(&self, device: &Device) -> Result<Tensor> {
        Ok(Tensor::from_slice(&self.data, (self.n_points, self.dim), device)?)
    }
}

/// JSON input: a bare list of points or several named sets
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PointSetFile {
    Single(Vec<Vec<f32>>),
    Sets { sets: Vec<Vec<Vec<f32>>> },
}

/// Load point sets from a file (format detected from extension).
///
/// `.json` files hold either `[[x, y, ...], ...]` or `{"sets": [...]}`.
/// Anything else is read as text with one point per line, coordinates
/// separated by whitespace or commas; blank lines and `#` comments are skipped.
pub fn load_point_sets(path: impl AsRef<Path>) -> Result<Vec<PointSet>> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let sets = if is_json {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {:?}", path))?;
        let parsed: PointSetFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON file: {:?}", path))?;
        match parsed {
            PointSetFile::Single(rows) => vec![rows],
            PointSetFile::Sets { sets } => sets,
        }
    } else {
        let file = fs::File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
        vec![parse_text_points(BufReader::new(file))?]
    };

    if sets.is_empty() {
        bail!("{:?} contains no point sets", path);
    }

    let sets = sets
        .into_iter()
        .enumerate()
        .map(|(i, rows)| {
            PointSet::from_rows(rows).with_context(|| format!("Invalid point set {i} in {:?}", path))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        path = ?path,
        sets = sets.len(),
        "loaded point sets"
    );
    Ok(sets)
}

fn parse_text_points(reader: impl BufRead) -> Result<Vec<Vec<f32>>> {
    let mut rows = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .map(|field| {
                field
                    .parse::<f32>()
                    .with_context(|| format!("line {}: invalid number {field:?}", line_no + 1))
            })
            .collect::<Result<Vec<f32>>>()?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_text_points() {
        let file = write_file(".txt", "# x y\n0 0\n0, 1\n\n10\t0\n10,1\n");
        let sets = load_point_sets(file.path()).unwrap();

        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].n_points(), 4);
        assert_eq!(sets[0].dim(), 2);

        let t = sets[0].to_tensor(&Device::Cpu).unwrap();
        assert_eq!(t.to_vec2::<f32>().unwrap()[3], vec![10.0, 1.0]);
    }

    #[test]
    fn test_load_json_single_set() {
        let file = write_file(".json", "[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]");
        let sets = load_point_sets(file.path()).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].dim(), 3);
    }

    #[test]
    fn test_load_json_multiple_sets() {
        let file = write_file(".json", r#"{"sets": [[[0.0], [1.0]], [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]]}"#);
        let sets = load_point_sets(file.path()).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].n_points(), 2);
        assert_eq!(sets[1].n_points(), 3);
        assert_eq!(sets[1].dim(), 2);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let file = write_file(".txt", "1 2\n3\n");
        let err = load_point_sets(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("coordinates"));
    }

    #[test]
    fn test_empty_file_rejected() {
        let file = write_file(".txt", "# nothing here\n\n");
        assert!(load_point_sets(file.path()).is_err());
    }

    #[test]
    fn test_bad_number_reports_line() {
        let file = write_file(".txt", "1 2\n3 abc\n");
        let err = load_point_sets(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn test_missing_file() {
        assert!(load_point_sets("/nonexistent/points.txt").is_err());
    }
}
