//! Two-dimensional cell arrays
//!
//! A [`CellArray`] is the worksheet-native shape of a range: a dense grid of
//! [`CellValue`]s. Shimmed functions treat row 0 as the header row.

use crate::cell::CellValue;
use crate::error::{Error, Result};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A dense, row-major grid of cell values
///
/// With the `serde` feature the array is written as a list of rows and
/// rebuilt through [`CellArray::from_rows`], so ragged input is rejected.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<Vec<CellValue>>", into = "Vec<Vec<CellValue>>")
)]
#[derive(Clone, PartialEq, Default)]
pub struct CellArray {
    rows: usize,
    cols: usize,
    cells: Vec<CellValue>,
}

impl CellArray {
    /// Create an array of `rows` x `cols` empty cells
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![CellValue::Empty; rows * cols],
        }
    }

    /// Build an array from a list of rows
    ///
    /// Every row must have the same length.
    pub fn from_rows<R, C>(rows: R) -> Result<Self>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<CellValue>,
    {
        let mut cells = Vec::new();
        let mut row_count = 0;
        let mut cols = None;

        for row in rows {
            let before = cells.len();
            cells.extend(row.into_iter().map(Into::into));
            let width = cells.len() - before;
            match cols {
                None => cols = Some(width),
                Some(expected) if expected != width => {
                    return Err(Error::RaggedArray {
                        row: row_count,
                        expected,
                        actual: width,
                    });
                }
                Some(_) => {}
            }
            row_count += 1;
        }

        Ok(Self {
            rows: row_count,
            cols: cols.unwrap_or(0),
            cells,
        })
    }

    /// Number of rows, including the header row
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// Check if the array has no rows at all
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Get a cell by position
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Set a cell by position
    ///
    /// Returns an error if the position is outside the array.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<CellValue>) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        self.cells[row * self.cols + col] = value.into();
        Ok(())
    }

    /// Get one row as a slice
    pub fn row(&self, row: usize) -> Option<&[CellValue]> {
        if row < self.rows {
            let start = row * self.cols;
            Some(&self.cells[start..start + self.cols])
        } else {
            None
        }
    }

    /// Iterate over the rows
    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> + '_ {
        (0..self.rows).map(move |r| {
            let start = r * self.cols;
            &self.cells[start..start + self.cols]
        })
    }

    /// Header row (row 0), if present
    pub fn header(&self) -> Option<&[CellValue]> {
        self.row(0)
    }

    /// Find the first header column whose text equals `name`, ignoring case
    ///
    /// Non-text header cells never match.
    pub fn find_header(&self, name: &str) -> Option<usize> {
        let header = self.header()?;
        header.iter().position(|cell| {
            cell.as_string()
                .map(|text| eq_ignore_case(text, name))
                .unwrap_or(false)
        })
    }

    /// Convert into a list of rows
    pub fn into_rows(self) -> Vec<Vec<CellValue>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        let cols = self.cols;
        let mut iter = self.cells.into_iter();
        (0..self.rows)
            .map(|_| iter.by_ref().take(cols).collect())
            .collect()
    }
}

impl TryFrom<Vec<Vec<CellValue>>> for CellArray {
    type Error = Error;

    fn try_from(rows: Vec<Vec<CellValue>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<CellArray> for Vec<Vec<CellValue>> {
    fn from(array: CellArray) -> Self {
        array.into_rows()
    }
}

/// Case-insensitive comparison used for header matching
fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

impl fmt::Debug for CellArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellArray")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("cells", &self.rows().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_rows() {
        let array = CellArray::from_rows(vec![
            vec![CellValue::from("A"), CellValue::from("B")],
            vec![CellValue::from(1.0), CellValue::from(2.0)],
        ])
        .unwrap();

        assert_eq!(array.row_count(), 2);
        assert_eq!(array.col_count(), 2);
        assert_eq!(array.get(1, 1), Some(&CellValue::Number(2.0)));
        assert_eq!(array.get(2, 0), None);
        assert_eq!(array.get(0, 2), None);
    }

    #[test]
    fn test_from_rows_ragged() {
        let err = CellArray::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(
            err,
            Error::RaggedArray {
                row: 1,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_empty_array() {
        let array = CellArray::from_rows(Vec::<Vec<CellValue>>::new()).unwrap();
        assert!(array.is_empty());
        assert_eq!(array.col_count(), 0);
        assert!(array.header().is_none());
    }

    #[test]
    fn test_set_and_into_rows() {
        let mut array = CellArray::new(2, 2);
        array.set(0, 0, "x").unwrap();
        array.set(1, 1, true).unwrap();
        assert!(array.set(2, 0, 1.0).is_err());

        assert_eq!(
            array.into_rows(),
            vec![
                vec![CellValue::from("x"), CellValue::Empty],
                vec![CellValue::Empty, CellValue::Boolean(true)],
            ]
        );
    }

    #[test]
    fn test_find_header() {
        let array = CellArray::from_rows(vec![vec![
            CellValue::Number(1.0),
            CellValue::from("Name"),
            CellValue::from("NAME"),
            CellValue::from("Straße"),
        ]])
        .unwrap();

        assert_eq!(array.find_header("name"), Some(1));
        assert_eq!(array.find_header("STRASSE"), None);
        assert_eq!(array.find_header("straße"), Some(3));
        assert_eq!(array.find_header("1"), None);
    }

    #[test]
    fn test_try_from_rows() {
        let rows = vec![vec![CellValue::from("A")], vec![CellValue::from(1.0)]];
        let array = CellArray::try_from(rows.clone()).unwrap();
        assert_eq!(Vec::<Vec<CellValue>>::from(array), rows);

        let ragged = vec![vec![CellValue::from("A")], Vec::new()];
        assert!(matches!(
            CellArray::try_from(ragged),
            Err(Error::RaggedArray { row: 1, .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_rejects_inconsistent_shape() {
        let array: CellArray =
            serde_json::from_str(r#"[[{"String":"x"},"Empty"],[{"Number":1.0},{"Boolean":true}]]"#)
                .unwrap();
        assert_eq!(array.row_count(), 2);
        assert_eq!(array.find_header("X"), Some(0));

        let json = serde_json::to_string(&array).unwrap();
        assert_eq!(serde_json::from_str::<CellArray>(&json).unwrap(), array);

        assert!(serde_json::from_str::<CellArray>(r#"[[{"Number":1.0}],[]]"#).is_err());
        assert!(serde_json::from_str::<CellArray>(r#"{"rows":2,"cols":2,"cells":[]}"#).is_err());
    }
}
