// Primitives for reading the voter lists and the thara list, as exported by spreadsheets.

use std::collections::BTreeMap;

use crate::track::*;

/// One line of a CSV file, by header name. Headers and values are trimmed.
pub type CsvRow = BTreeMap<String, String>;

pub const SERIAL_COLUMN: &str = "Serial No.";
pub const VL_NO_COLUMN: &str = "VL No";
pub const THARA_COLUMN: &str = "Thara";

/// A whole number written with digits only, possibly quoted.
pub fn parse_number(s: &str) -> Option<u32> {
    let s = s.trim().trim_matches('"');
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>().ok()
}

fn read_rows(path: &str) -> TrackResult<Vec<(usize, CsvRow)>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(OpeningCsvSnafu {
            path: path.to_string(),
        })?;
    let headers: Vec<String> = rdr
        .headers()
        .context(ReadingCsvSnafu {
            path: path.to_string(),
            lineno: 1usize,
        })?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    debug!("read_rows: {:?}: columns: {:?}", path, headers);

    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let record = record.context(ReadingCsvSnafu {
            path: path.to_string(),
            lineno,
        })?;
        let row: CsvRow = headers
            .iter()
            .zip(record.iter())
            .filter(|(k, _)| !k.is_empty())
            .map(|(k, v)| (k.clone(), v.trim().to_string()))
            .collect();
        rows.push((lineno, row));
    }
    Ok(rows)
}

/// Reads a voter list, keyed by serial number.
///
/// Lines without a positive serial number are skipped. A later line replaces an earlier
/// one with the same serial number.
pub fn read_voter_rows(path: &str) -> TrackResult<BTreeMap<u32, CsvRow>> {
    let rows = read_rows(path)?;
    let total = rows.len();
    let mut voters = BTreeMap::new();
    for (lineno, row) in rows.into_iter() {
        match row
            .get(SERIAL_COLUMN)
            .and_then(|s| parse_number(s))
            .filter(|x| *x > 0)
        {
            Some(serial) => {
                voters.insert(serial, row);
            }
            None => debug!("read_voter_rows: line {} has no serial number", lineno),
        }
    }
    info!(
        "read_voter_rows: {} voters from {} ({} lines)",
        voters.len(),
        simplify_file_name(path),
        total
    );
    Ok(voters)
}

/// Reads the thara list: serial number of the voter to thara number.
pub fn read_thara_list(path: &str) -> TrackResult<BTreeMap<u32, u32>> {
    let rows = read_rows(path)?;
    let total = rows.len();
    let mapping: BTreeMap<u32, u32> = rows
        .iter()
        .filter_map(|(_, row)| {
            let serial = row.get(VL_NO_COLUMN).and_then(|s| parse_number(s))?;
            let thara = row.get(THARA_COLUMN).and_then(|s| parse_number(s))?;
            Some((serial, thara))
        })
        .collect();
    info!(
        "read_thara_list: {} mappings from {} lines of {}",
        mapping.len(),
        total,
        simplify_file_name(path)
    );
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_csv(name: &str, contents: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("wardtrack_{}_{}.csv", name, std::process::id()));
        fs::write(&p, contents).unwrap();
        p
    }

    #[test]
    fn numbers_are_digits_only() {
        assert_eq!(parse_number(" 12 "), Some(12));
        assert_eq!(parse_number("\"7\""), Some(7));
        assert_eq!(parse_number("0"), Some(0));
        assert_eq!(parse_number("12a"), None);
        assert_eq!(parse_number("-3"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn voter_rows_by_serial() {
        let p = temp_csv(
            "voter_rows",
            "\u{feff}Serial No. , Name ,House Name\n1,Anitha K, Puthenveedu \nx,Header again,\n0,Zero,\n12,Rajan P,Kizhakkethil\n",
        );
        let rows = read_voter_rows(&p.display().to_string()).unwrap();
        assert_eq!(rows.keys().copied().collect::<Vec<u32>>(), vec![1, 12]);
        assert_eq!(rows[&1].get("Name").map(|s| s.as_str()), Some("Anitha K"));
        assert_eq!(
            rows[&1].get("House Name").map(|s| s.as_str()),
            Some("Puthenveedu")
        );
        fs::remove_file(&p).unwrap();
    }

    #[test]
    fn thara_list_skips_incomplete_lines() {
        let p = temp_csv(
            "thara_list",
            "VL No,Name,Thara\n\"1\",Anitha K,\"2\"\n2,Rajan P,\n3,Kesavan Nair,4\n,Blank,1\n",
        );
        let mapping = read_thara_list(&p.display().to_string()).unwrap();
        assert_eq!(mapping.into_iter().collect::<Vec<_>>(), vec![(1, 2), (3, 4)]);
        fs::remove_file(&p).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        let res = read_voter_rows("/nonexistent/voters.csv");
        assert!(matches!(res, Err(TrackError::OpeningCsv { .. })));
    }
}
