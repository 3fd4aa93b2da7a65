use crate::core::{Direction, VesselEvent, VesselType};
use crate::input::LoadError;
use chrono::NaiveDate;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Load vessel events from a CSV file.
///
/// Required columns (case-insensitive, a few aliases accepted):
/// - Name, Type, Direction, Date (year-month-day), Tonnage
///
/// A row with an unparseable date, a non-numeric or negative tonnage, or
/// an unknown direction is rejected with `LoadError::MalformedRecord`
/// rather than silently corrupting the plot's scale domain.
pub fn load_csv(path: &Path) -> Result<Vec<VesselEvent>, LoadError> {
    let mut rdr = csv::Reader::from_path(path)?;

    let headers = rdr.headers()?;
    let columns = Columns::detect(headers)?;

    let mut events = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        events.push(parse_record(&record, &columns, line)?);
    }

    Ok(events)
}

/// Resolved indices of the required columns
struct Columns {
    name: usize,
    kind: usize,
    direction: usize,
    date: usize,
    tonnage: usize,
}

impl Columns {
    fn detect(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        Ok(Self {
            name: find_column(headers, &["name", "vessel", "vessel_name"])?,
            kind: find_column(headers, &["type", "kind", "rig"])?,
            direction: find_column(headers, &["direction", "bound"])?,
            date: find_column(headers, &["date", "day"])?,
            tonnage: find_column(headers, &["tonnage", "tons"])?,
        })
    }
}

/// Find a column by checking possible names
fn find_column(
    headers: &csv::StringRecord,
    names: &'static [&'static str],
) -> Result<usize, LoadError> {
    for (idx, header) in headers.iter().enumerate() {
        let header_lower = header.trim().to_lowercase();
        if names.iter().any(|&name| header_lower == name) {
            return Ok(idx);
        }
    }

    Err(LoadError::MissingColumn { expected: names })
}

fn parse_record(
    record: &csv::StringRecord,
    columns: &Columns,
    line: u64,
) -> Result<VesselEvent, LoadError> {
    let field = |idx: usize| -> Result<&str, LoadError> {
        record.get(idx).ok_or_else(|| LoadError::MalformedRecord {
            line,
            reason: "short row".to_string(),
        })
    };

    let malformed = |reason: String| LoadError::MalformedRecord { line, reason };

    let name = field(columns.name)?.trim().to_string();

    let kind = VesselType::parse(field(columns.kind)?);

    let direction_raw = field(columns.direction)?;
    let direction = Direction::parse(direction_raw)
        .ok_or_else(|| malformed(format!("unknown direction {:?}", direction_raw)))?;

    let date_raw = field(columns.date)?.trim();
    let date = NaiveDate::parse_from_str(date_raw, DATE_FORMAT)
        .map_err(|_| malformed(format!("unparseable date {:?}", date_raw)))?;

    let tonnage_raw = field(columns.tonnage)?.trim();
    let tonnage: f64 = tonnage_raw
        .parse()
        .map_err(|_| malformed(format!("non-numeric tonnage {:?}", tonnage_raw)))?;
    if !tonnage.is_finite() || tonnage < 0.0 {
        return Err(malformed(format!("negative tonnage {}", tonnage_raw)));
    }

    Ok(VesselEvent {
        name,
        kind,
        direction,
        date,
        tonnage,
    })
}
