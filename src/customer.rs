use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinate;

#[derive(Clone, Debug, PartialEq)]
pub struct Customer {
    pub user_id: i64,
    pub name: String,
    pub coordinate: Coordinate,
}

/// The part of a customer that gets invited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Invitee {
    pub user_id: i64,
    pub name: String,
}

impl From<&Customer> for Invitee {
    fn from(customer: &Customer) -> Self {
        Invitee {
            user_id: customer.user_id,
            name: customer.name.clone(),
        }
    }
}

impl std::fmt::Display for Invitee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "name: {}, user_id: {}", self.name, self.user_id)
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed customer json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} is not a number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{0} are invalid coordinates")]
    InvalidCoordinate(Coordinate),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
#[error("line {line}: {source}")]
pub struct RecordError {
    pub line: usize,
    #[source]
    pub source: ParseError,
}

// Coordinates show up both as strings and as bare numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Degrees {
    Number(f64),
    Text(String),
}

impl Degrees {
    fn to_f64(&self, field: &'static str) -> Result<f64, ParseError> {
        match self {
            Degrees::Number(n) => Ok(*n),
            Degrees::Text(s) => s.trim().parse().map_err(|_| ParseError::InvalidNumber {
                field,
                value: s.clone(),
            }),
        }
    }
}

#[derive(Deserialize)]
struct RawCustomer {
    user_id: i64,
    name: String,
    latitude: Degrees,
    longitude: Degrees,
}

/// Parse one line of input into a validated customer.
pub fn parse_customer(line: &[u8]) -> Result<Customer, ParseError> {
    let raw: RawCustomer = serde_json::from_slice(line)?;
    let coordinate = Coordinate::new(
        raw.latitude.to_f64("latitude")?,
        raw.longitude.to_f64("longitude")?,
    );
    if !coordinate.is_valid() {
        return Err(ParseError::InvalidCoordinate(coordinate));
    }
    Ok(Customer {
        user_id: raw.user_id,
        name: raw.name,
        coordinate,
    })
}

/// Iterator over the customers in a line-delimited JSON reader.
///
/// Yields one result per non-blank line. A bad line does not stop the
/// iteration; the next call moves on to the following line.
pub struct CustomerRecords<R> {
    lines: io::Split<R>,
    line: usize,
}

impl<R: BufRead> CustomerRecords<R> {
    pub fn new(reader: R) -> Self {
        CustomerRecords {
            lines: reader.split(b'\n'),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for CustomerRecords<R> {
    type Item = Result<Customer, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let bytes = self.lines.next()?;
            self.line += 1;
            let line = self.line;
            let parsed = match bytes {
                Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => {
                    debug!("Skipping blank line {}", line);
                    continue;
                }
                Ok(bytes) => parse_customer(&bytes),
                Err(e) => Err(ParseError::Io(e)),
            };
            break Some(parsed.map_err(|source| RecordError { line, source }));
        }
    }
}

/// Read every valid customer from `reader`, logging and dropping bad lines.
/// Only a failing reader is an error.
pub fn collect_customers<R: BufRead>(reader: R) -> Result<Vec<Customer>, io::Error> {
    let mut customers = Vec::new();
    for record in CustomerRecords::new(reader) {
        match record {
            Ok(customer) => customers.push(customer),
            Err(RecordError {
                source: ParseError::Io(e),
                ..
            }) => return Err(e),
            Err(e) => error!("Unable to parse customer: {}", e),
        }
    }
    Ok(customers)
}

pub fn read_customers<P: AsRef<Path>>(path: P) -> Result<Vec<Customer>> {
    let path = path.as_ref();
    let file = File::open(path)
        .inspect_err(|_| error!("Unable to open file: {}", path.display()))
        .with_context(|| format!("opening {}", path.display()))?;
    let customers = collect_customers(BufReader::new(file))
        .with_context(|| format!("reading {}", path.display()))?;
    debug!("Loaded {} customers from {}", customers.len(), path.display());
    Ok(customers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn parses_string_coordinates() {
        let line = br#"{"latitude": "51.92893", "user_id": 1, "name": "Alice Cahill", "longitude": "-10.27699"}"#;
        let customer = parse_customer(line).unwrap();
        assert_eq!(
            customer,
            Customer {
                user_id: 1,
                name: String::from("Alice Cahill"),
                coordinate: Coordinate::new(51.92893, -10.27699),
            }
        );
    }

    #[test]
    fn parses_numeric_coordinates() {
        let line = br#"{"latitude": 52.986375, "user_id": 12, "name": "Christina McArdle", "longitude": -6.043701}"#;
        let customer = parse_customer(line).unwrap();
        assert_eq!(customer.coordinate, Coordinate::new(52.986375, -6.043701));
    }

    #[test]
    fn rejects_bad_json() {
        let line = br#"{zzzzz"latitude": "0", "user_id": 1, "name": "Alice Cahill", "longitude": "0"}"#;
        assert!(matches!(parse_customer(line), Err(ParseError::Json(_))));
    }

    #[test]
    fn rejects_missing_field() {
        let line = br#"{"latitude": "0", "name": "Alice Cahill", "longitude": "0"}"#;
        assert!(matches!(parse_customer(line), Err(ParseError::Json(_))));
    }

    #[test]
    fn rejects_non_numeric_coordinate() {
        let line = br#"{"latitude": "0", "user_id": 1, "name": "a", "longitude": ""}"#;
        match parse_customer(line) {
            Err(ParseError::InvalidNumber { field, value }) => {
                assert_eq!(field, "longitude");
                assert_eq!(value, "");
            }
            other => panic!("expected InvalidNumber, got {:?}", other),
        }
    }

    #[test]
    fn rejects_out_of_range_coordinate() {
        let line = br#"{"latitude": "-91", "user_id": 1, "name": "Alice Cahill", "longitude": "0"}"#;
        assert!(matches!(
            parse_customer(line),
            Err(ParseError::InvalidCoordinate(_))
        ));
    }

    // An out-of-range record drops only itself; later lines are still parsed.
    #[test]
    fn keeps_going_after_invalid_coordinate() {
        let input = concat!(
            r#"{"latitude": "-91", "user_id": 1, "name": "a", "longitude": "0"}"#,
            "\n",
            r#"{"latitude": "10", "user_id": 2, "name": "b", "longitude": "20"}"#,
            "\n",
        );
        let records: Vec<_> = CustomerRecords::new(Cursor::new(input)).collect();
        assert_eq!(records.len(), 2);
        match &records[0] {
            Err(RecordError {
                line: 1,
                source: ParseError::InvalidCoordinate(_),
            }) => {}
            other => panic!("expected invalid coordinate on line 1, got {:?}", other),
        }
        assert_eq!(records[1].as_ref().unwrap().user_id, 2);
    }

    #[test]
    fn collect_drops_bad_lines_and_blank_lines() {
        let input = concat!(
            r#"{"latitude": "0", "user_id": 2, "name": "b", "longitude": "0"}"#,
            "\n\n",
            r#"zzz{"latitude": "0", "user_id": 3, "name": "c", "longitude": "0"}"#,
            "\n",
            r#"{"latitude": "-900", "user_id": 4, "name": "d", "longitude": ""}"#,
            "\n",
            r#"{"latitude": "0", "user_id": 1, "name": "a", "longitude": "0"}"#,
        );
        let customers = collect_customers(Cursor::new(input)).unwrap();
        let ids: Vec<i64> = customers.iter().map(|c| c.user_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn read_customers_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customers.txt");
        let mut f = File::create(&path).unwrap();
        writeln!(
            f,
            r#"{{"latitude": "51.92893", "user_id": 1, "name": "Alice Cahill", "longitude": "-10.27699"}}"#
        )
        .unwrap();
        drop(f);

        let customers = read_customers(&path).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name, "Alice Cahill");
    }

    #[test]
    fn read_customers_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customers.txt");
        let err = read_customers(&path).unwrap_err();
        assert!(err.downcast_ref::<io::Error>().is_some());
    }

    #[test]
    fn invitee_display() {
        let invitee = Invitee {
            user_id: 4,
            name: String::from("Ian Kehoe"),
        };
        assert_eq!(invitee.to_string(), "name: Ian Kehoe, user_id: 4");
        assert_eq!(
            serde_json::to_string(&invitee).unwrap(),
            r#"{"user_id":4,"name":"Ian Kehoe"}"#
        );
    }
}
