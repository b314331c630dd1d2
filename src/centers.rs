//! Labelled reference points, read from and written to CSV.
//!
//! Rows are `label,x,y[,z]`. Header rows (anything mentioning "label"), blank lines, and rows
//! whose x or y doesn't start with a number are skipped. Trailing text after a number, like a
//! unit, is ignored.
//!
//! ```
//! use lasband::centers;
//! let text = "label,x,y,z\nP1,10.5,20,3\nP2,11,21,\n";
//! let centers = centers::read(text.as_bytes()).unwrap();
//! assert_eq!(2, centers.len());
//! assert_eq!(Some(3.), centers[0].z);
//! assert_eq!(None, centers[1].z);
//! ```

use crate::{Error, Result, Vector};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

/// A labelled reference point.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Center {
    /// The label, which may be empty.
    pub label: String,
    #[allow(missing_docs)]
    pub x: f64,
    #[allow(missing_docs)]
    pub y: f64,
    /// The elevation, if known.
    pub z: Option<f64>,
}

impl Center {
    /// Creates a new center.
    pub fn new(label: impl Into<String>, x: f64, y: f64, z: Option<f64>) -> Center {
        Center {
            label: label.into(),
            x,
            y,
            z,
        }
    }

    /// Returns the position, at zero elevation when the elevation is unknown.
    pub fn position(&self) -> Vector<f64> {
        Vector::new(self.x, self.y, self.z.unwrap_or(0.))
    }
}

/// Reads centers from CSV.
///
/// Returns [Error::NoCenters] if there are no usable rows.
pub fn read<R: Read>(read: R) -> Result<Vec<Center>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(read);
    let mut centers = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() < 3
            || record
                .iter()
                .any(|field| field.to_lowercase().contains("label"))
        {
            continue;
        }
        let (Some(x), Some(y)) = (number(&record[1]), number(&record[2])) else {
            continue;
        };
        let z = record.get(3).and_then(number);
        centers.push(Center::new(&record[0], x, y, z));
    }
    if centers.is_empty() {
        Err(Error::NoCenters)
    } else {
        Ok(centers)
    }
}

/// Reads centers from a CSV file.
pub fn read_path<P: AsRef<Path>>(path: P) -> Result<Vec<Center>> {
    File::open(path).map_err(Error::from).and_then(read)
}

/// Writes centers as CSV with a `label,x,y,z` header row.
///
/// Unknown elevations are written as empty fields.
///
/// # Examples
///
/// ```
/// use lasband::centers::{self, Center};
/// let mut bytes = Vec::new();
/// centers::write(&mut bytes, &[Center::new("P1", 1., 2.5, None)]).unwrap();
/// assert_eq!("label,x,y,z\nP1,1,2.5,\n", String::from_utf8(bytes).unwrap());
/// ```
pub fn write<W: Write>(write: W, centers: &[Center]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(write);
    writer.write_record(["label", "x", "y", "z"])?;
    for center in centers {
        writer.write_record([
            center.label.clone(),
            center.x.to_string(),
            center.y.to_string(),
            center.z.map(|z| z.to_string()).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads the number at the start of a field and ignores whatever follows, so "12.5m" is 12.5.
fn number(field: &str) -> Option<f64> {
    let bytes = field.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let whole = digits(end);
    end += whole;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits(end + 1);
        if whole + fraction > 0 {
            end += 1 + fraction;
        }
    }
    if whole + fraction == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent = digits(end + 1 + sign);
        if exponent > 0 {
            end += 1 + sign + exponent;
        }
    }
    field[..end].parse().ok()
}
