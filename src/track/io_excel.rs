use std::collections::BTreeSet;

use calamine::DataType;

use crate::track::*;

/// A cell position (row, column), both starting at 0.
type Cell = (u32, u32);

/// Reads "C12" into (11, 2).
pub fn parse_cell(s: &str) -> Option<Cell> {
    let s = s.trim();
    let split = s.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = s.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let col = letters
        .to_ascii_uppercase()
        .bytes()
        .try_fold(0u32, |acc, b| {
            acc.checked_mul(26)?.checked_add((b - b'A' + 1) as u32)
        })?;
    let row = digits.parse::<u32>().ok().filter(|r| *r > 0)?;
    Some((row - 1, col - 1))
}

/// Reads "A1:R26" into its two corners.
pub fn parse_range(s: &str) -> Option<(Cell, Cell)> {
    let (a, b) = s.split_once(':')?;
    let (start, end) = (parse_cell(a)?, parse_cell(b)?);
    Some((
        (start.0.min(end.0), start.1.min(end.1)),
        (start.0.max(end.0), start.1.max(end.1)),
    ))
}

/// A serial number in a cell: a positive integer, as a number or as digits.
pub fn cell_serial(cell: &DataType) -> Option<u32> {
    match cell {
        DataType::Int(i) if *i > 0 => u32::try_from(*i).ok(),
        DataType::Float(f) if *f >= 1.0 && f.fract() == 0.0 && *f <= u32::MAX as f64 => {
            Some(*f as u32)
        }
        DataType::String(s) => {
            let s = s.trim();
            if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
                s.parse::<u32>().ok().filter(|x| *x > 0)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn get_range(path: &str, sheet: Option<&str>) -> TrackResult<calamine::Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu {
        path: path.to_string(),
    })?;
    debug!(
        "get_range: path: {:?} worksheets: {:?} selected: {:?}",
        path,
        workbook.sheet_names(),
        sheet
    );
    let wrange = match sheet {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    };
    let wrange = wrange
        .context(EmptyExcelSnafu {
            path: path.to_string(),
        })?
        .context(OpeningExcelSnafu {
            path: path.to_string(),
        })?;
    Ok(wrange)
}

/// Collects every serial number found in a worksheet, optionally within a cell range.
///
/// Cells that do not hold a serial number (headers, names, blanks) are skipped.
pub fn read_serials(
    path: &str,
    sheet: Option<&str>,
    range: Option<&str>,
) -> TrackResult<BTreeSet<u32>> {
    let bounds = match range {
        None => None,
        Some(r) => Some(parse_range(r).context(InvalidRangeSnafu {
            range: r.to_string(),
        })?),
    };
    let wrange = get_range(path, sheet)?;
    let (row0, col0) = wrange.start().unwrap_or((0, 0));
    let mut serials = BTreeSet::new();
    for (r, c, cell) in wrange.cells() {
        let pos = (row0 + r as u32, col0 + c as u32);
        let inside = bounds.map_or(true, |(lo, hi)| {
            pos.0 >= lo.0 && pos.0 <= hi.0 && pos.1 >= lo.1 && pos.1 <= hi.1
        });
        if !inside {
            continue;
        }
        if let Some(serial) = cell_serial(cell) {
            serials.insert(serial);
        }
    }
    info!(
        "read_serials: {} serial numbers in {}",
        serials.len(),
        simplify_file_name(path)
    );
    Ok(serials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cells_and_ranges() {
        assert_eq!(parse_cell("A1"), Some((0, 0)));
        assert_eq!(parse_cell("c12"), Some((11, 2)));
        assert_eq!(parse_cell("AA3"), Some((2, 26)));
        assert_eq!(parse_cell("A0"), None);
        assert_eq!(parse_cell("12"), None);
        assert_eq!(parse_cell("A1B"), None);
        assert_eq!(parse_range("R26:A1"), Some(((0, 0), (25, 17))));
        assert_eq!(parse_range("A1"), None);
    }

    #[test]
    fn oversized_columns_are_rejected() {
        assert_eq!(parse_cell("XFD1"), Some((0, 16383)));
        assert_eq!(parse_cell("AAAAAAAA1"), None);
        assert_eq!(parse_range("AAAAAAAA1:B2"), None);
        let res = read_serials("/nonexistent/serials.xlsx", None, Some("ZZZZZZZZZZ1:B2"));
        assert!(matches!(res, Err(TrackError::InvalidRange { .. })));
    }

    #[test]
    fn recognizes_serial_cells() {
        assert_eq!(cell_serial(&DataType::Int(12)), Some(12));
        assert_eq!(cell_serial(&DataType::Float(7.0)), Some(7));
        assert_eq!(cell_serial(&DataType::Float(7.5)), None);
        assert_eq!(cell_serial(&DataType::String(" 305 ".to_string())), Some(305));
        assert_eq!(cell_serial(&DataType::String("S.No".to_string())), None);
        assert_eq!(cell_serial(&DataType::Int(0)), None);
        assert_eq!(cell_serial(&DataType::Int(-4)), None);
        assert_eq!(cell_serial(&DataType::Empty), None);
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let res = read_serials("/nonexistent/serials.xlsx", None, None);
        assert!(matches!(res, Err(TrackError::OpeningExcel { .. })));
        let res = read_serials("/nonexistent/serials.xlsx", None, Some("nope"));
        assert!(matches!(res, Err(TrackError::InvalidRange { .. })));
    }
}
