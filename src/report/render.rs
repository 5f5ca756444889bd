//! Report sinks
//!
//! A sink takes a finished `Report` and writes it somewhere. The table sink
//! produces the bordered console layout; the JSON sink emits one array of row
//! objects for scripting.

use crate::error::ReportResult;
use crate::report::{Report, REPORT_FIELDS};
use console::{measure_text_width, pad_str, Alignment};
use humansize::{format_size, FormatSizeOptions, BINARY};
use std::io::Write;

/// Destination for a rendered report
pub trait ReportSink {
    /// Render the whole report
    fn render(&mut self, report: &Report) -> ReportResult<()>;
}

/// Human-readable byte count with binary prefixes and one decimal place
///
/// Zero is rendered as `0 B` without going through the formatter.
pub fn readable_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let options = FormatSizeOptions::from(BINARY)
        .decimal_places(1)
        .decimal_zeroes(1);
    format_size(bytes, options)
}

/// Left-aligned columns; everything else is right-aligned
fn column_alignment(field: &str) -> Alignment {
    match field {
        "pattern" | "type" | "ttl" | "key(max_ttl)" => Alignment::Left,
        _ => Alignment::Right,
    }
}

/// Bordered text table
pub struct TableSink<W: Write> {
    out: W,
}

impl<W: Write> TableSink<W> {
    /// Render into `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn border(&mut self, widths: &[usize]) -> std::io::Result<()> {
        let mut line = String::from("+");
        for width in widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        writeln!(self.out, "{}", line)
    }

    fn line(&mut self, cells: &[String], widths: &[usize], header: bool) -> std::io::Result<()> {
        let mut line = String::from("|");
        for ((cell, width), field) in cells.iter().zip(widths).zip(REPORT_FIELDS) {
            let align = if header {
                Alignment::Center
            } else {
                column_alignment(field)
            };
            line.push(' ');
            line.push_str(&pad_str(cell, *width, align, None));
            line.push_str(" |");
        }
        writeln!(self.out, "{}", line)
    }
}

impl<W: Write> ReportSink for TableSink<W> {
    fn render(&mut self, report: &Report) -> ReportResult<()> {
        let header: Vec<String> = REPORT_FIELDS.iter().map(|f| f.to_string()).collect();
        let rows: Vec<[String; 13]> = report.rows.iter().map(|r| r.cells()).collect();

        let mut widths: Vec<usize> = header.iter().map(|h| measure_text_width(h)).collect();
        for cells in &rows {
            for (width, cell) in widths.iter_mut().zip(cells.iter()) {
                *width = (*width).max(measure_text_width(cell));
            }
        }

        self.border(&widths)?;
        self.line(&header, &widths, true)?;
        self.border(&widths)?;
        for cells in &rows {
            self.line(cells, &widths, false)?;
        }
        self.border(&widths)?;
        self.out.flush()?;
        Ok(())
    }
}

/// JSON array of row objects
pub struct JsonSink<W: Write> {
    out: W,
    pretty: bool,
}

impl<W: Write> JsonSink<W> {
    /// Render into `out`
    pub fn new(out: W, pretty: bool) -> Self {
        Self { out, pretty }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn render(&mut self, report: &Report) -> ReportResult<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, report)?;
        } else {
            serde_json::to_writer(&mut self.out, report)?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
