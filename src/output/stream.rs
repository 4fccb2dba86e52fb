use crate::crawler::FetchRecord;
use crate::output::summary::CrawlOutput;
use crate::Result;
use std::io::Write;

/// Writes one record as a compact JSON object followed by a newline
pub fn write_record<W: Write>(writer: &mut W, record: &FetchRecord) -> Result<()> {
    serde_json::to_writer(&mut *writer, record)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Writes the batch envelope as a single compact JSON object
pub fn write_output<W: Write>(writer: &mut W, output: &CrawlOutput) -> Result<()> {
    serde_json::to_writer(&mut *writer, output)?;
    writer.write_all(b"\n")?;
    Ok(())
}
