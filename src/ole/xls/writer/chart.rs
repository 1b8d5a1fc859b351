//! Chart type records
//!
//! A chart group in the chart substream is wrapped as
//! `CHARTFORMAT, BEGIN, <type record>, END`. The type record fixes the
//! chart kind and its stacking flags.

use super::super::{XlsError, XlsResult};
use super::biff::{Record, emit, write_begin, write_chartformat, write_end};
use std::fmt;

/// Chart kinds with a BIFF8 type record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Column,
    Bar,
    Line,
    Area,
    Pie,
    Scatter,
    /// Rendered with a line-type record
    Stock,
}

/// Stacking variant of a chart kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartSubtype {
    #[default]
    Default,
    Stacked,
    PercentStacked,
}

impl ChartKind {
    /// Parse a chart kind name, ignoring case.
    pub fn from_name(name: &str) -> XlsResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "column" => Ok(ChartKind::Column),
            "bar" => Ok(ChartKind::Bar),
            "line" => Ok(ChartKind::Line),
            "area" => Ok(ChartKind::Area),
            "pie" => Ok(ChartKind::Pie),
            "scatter" => Ok(ChartKind::Scatter),
            "stock" => Ok(ChartKind::Stock),
            _ => Err(XlsError::UnsupportedChartType(name.to_string())),
        }
    }

    /// Build the type record for this kind.
    pub fn type_record(self, subtype: ChartSubtype) -> XlsResult<Record> {
        use ChartSubtype::*;

        match (self, subtype) {
            (ChartKind::Column | ChartKind::Bar, _) => {
                // BAR (0x1017): pcOverlap, pcGap, grbit
                let mut grbit: u16 = if self == ChartKind::Bar { 0x0001 } else { 0 };
                match subtype {
                    Default => {},
                    Stacked => grbit |= 0x0002,
                    PercentStacked => grbit |= 0x0002 | 0x0004,
                }
                let mut data = Vec::with_capacity(6);
                data.extend_from_slice(&0i16.to_le_bytes());
                data.extend_from_slice(&0x0096u16.to_le_bytes());
                data.extend_from_slice(&grbit.to_le_bytes());
                emit(0x1017, &data)
            },
            (ChartKind::Line, _) | (ChartKind::Stock, Default) => {
                let grbit: u16 = match subtype {
                    Default => 0,
                    Stacked => 0x0001,
                    PercentStacked => 0x0001 | 0x0002,
                };
                emit(0x1018, &grbit.to_le_bytes())
            },
            (ChartKind::Area, _) => {
                let grbit: u16 = match subtype {
                    Default | Stacked => 0x0001,
                    PercentStacked => 0x0001 | 0x0002,
                };
                emit(0x101A, &grbit.to_le_bytes())
            },
            (ChartKind::Pie, Default) => {
                // anStart, pcDonut, grbit (fShowLdrLines)
                emit(0x1019, &[0x00, 0x00, 0x00, 0x00, 0x02, 0x00])
            },
            (ChartKind::Scatter, Default) => {
                // pcBubbleSizeRatio 100, wBubbleSize 1 (area), grbit
                emit(0x101B, &[0x64, 0x00, 0x01, 0x00, 0x00, 0x00])
            },
            (kind, subtype) => Err(XlsError::UnsupportedChartType(format!(
                "{kind} does not support {subtype:?}"
            ))),
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Column => "column",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Area => "area",
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
            ChartKind::Stock => "stock",
        };
        f.write_str(name)
    }
}

/// A chart description: kind plus stacking variant.
///
/// # Examples
///
/// ```rust
/// use longan::ole::xls::{Chart, ChartKind};
///
/// let record = Chart::new(ChartKind::Bar).type_record()?;
/// assert_eq!(record.to_bytes(), [0x17, 0x10, 0x06, 0x00, 0x00, 0x00, 0x96, 0x00, 0x01, 0x00]);
/// # Ok::<(), longan::ole::xls::XlsError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chart {
    pub kind: ChartKind,
    pub subtype: ChartSubtype,
}

impl Chart {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            subtype: ChartSubtype::Default,
        }
    }

    /// Combine a kind with a stacking variant, rejecting unsupported pairs.
    pub fn with_subtype(kind: ChartKind, subtype: ChartSubtype) -> XlsResult<Self> {
        let chart = Self { kind, subtype };
        chart.type_record()?;
        Ok(chart)
    }

    /// Build a chart from a kind name such as `"column"` or `"pie"`.
    pub fn make(name: &str, subtype: ChartSubtype) -> XlsResult<Self> {
        Self::with_subtype(ChartKind::from_name(name)?, subtype)
    }

    pub fn type_record(&self) -> XlsResult<Record> {
        self.kind.type_record(self.subtype)
    }

    /// Encode the chart group wrapper: CHARTFORMAT, BEGIN, type record, END.
    pub fn group_records(&self, order: u16) -> XlsResult<Vec<u8>> {
        let type_record = self.type_record()?;
        let mut buf = Vec::with_capacity(24 + 4 + type_record.encoded_len() + 4);
        write_chartformat(&mut buf, order)?;
        write_begin(&mut buf)?;
        type_record.write_to(&mut buf)?;
        write_end(&mut buf)?;
        Ok(buf)
    }
}

/// Chart group records for `chart` at drawing position `order`.
pub fn chart_group_records(chart: &Chart, order: u16) -> XlsResult<Vec<u8>> {
    chart.group_records(order)
}
