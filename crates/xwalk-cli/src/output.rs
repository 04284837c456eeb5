use std::io::{self, Write};
use xwalk::core::models::collection::AtomList;
use xwalk::workflows::distance::DistanceRecord;

/// Formats a distance to one decimal place; absent values print as `-`.
fn format_distance(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "-".to_string(),
    }
}

/// Writes the tab-separated distance table:
/// index, input file, source site, target site, Euclidean distance, SASD.
pub fn write_records(
    writer: &mut impl Write,
    filename: &str,
    atoms: &AtomList,
    records: &[DistanceRecord],
) -> io::Result<()> {
    for record in records {
        let source = atoms.get(record.source).expect("record atom in range");
        let target = atoms.get(record.target).expect("record atom in range");
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            record.index,
            filename,
            source.descriptor(),
            target.descriptor(),
            format_distance(Some(record.euclidean)),
            format_distance(record.sasd),
        )?;
    }
    writer.flush()
}
