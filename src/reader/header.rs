//! Header of a parallel fiber estimation output file.
//!
//! Layout (little-endian):
//! - Bytes 0-31: tag, an opaque printable identifier
//! - Bytes 32-35: `header_length` (i32), byte length of the block starting at
//!   this field, i.e. the field itself plus the parameters that follow
//! - `header_length / 4 - 1` i32 parameters, see [`HeaderParameter`]
//!
//! The fiber data starts at byte `32 + header_length`.

use std::io::Read;

use chrono::{DateTime, Local, Utc};
use log::info;

use crate::reader::read_fully;
use crate::utils::error::{Error, Result};

pub const TAG_LENGTH: usize = 32;

/// Named positions in the parameter block. Only the first two are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderParameter {
    NFibersTotal = 0,
    NPointsWholeFiber = 1,
    NBorderPointsX = 2,
    NBorderPointsZ = 3,
    NFineGridFibers = 4,
    NRanks = 5,
    NRanksZ = 6,
    NFibersPerRank = 7,
    CreationTimestamp = 8,
}

impl HeaderParameter {
    pub const ALL: [HeaderParameter; 9] = [
        HeaderParameter::NFibersTotal,
        HeaderParameter::NPointsWholeFiber,
        HeaderParameter::NBorderPointsX,
        HeaderParameter::NBorderPointsZ,
        HeaderParameter::NFineGridFibers,
        HeaderParameter::NRanks,
        HeaderParameter::NRanksZ,
        HeaderParameter::NFibersPerRank,
        HeaderParameter::CreationTimestamp,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HeaderParameter::NFibersTotal => "nFibersTotal",
            HeaderParameter::NPointsWholeFiber => "nPointsWholeFiber",
            HeaderParameter::NBorderPointsX => "nBorderPointsXNew",
            HeaderParameter::NBorderPointsZ => "nBorderPointsZNew",
            HeaderParameter::NFineGridFibers => "nFineGridFibers",
            HeaderParameter::NRanks => "nRanks",
            HeaderParameter::NRanksZ => "nRanksZ",
            HeaderParameter::NFibersPerRank => "nFibersPerRank",
            HeaderParameter::CreationTimestamp => "date",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub tag: [u8; TAG_LENGTH],
    pub header_length: i32,
    pub parameters: Vec<i32>,
}

impl Header {
    /// Builds a header whose `header_length` matches the given parameter list.
    pub fn new(tag: &str, parameters: Vec<i32>) -> Self {
        let mut tag_bytes = [0u8; TAG_LENGTH];
        let len = tag.len().min(TAG_LENGTH);
        tag_bytes[..len].copy_from_slice(&tag.as_bytes()[..len]);
        let header_length = 4 * (parameters.len() as i32 + 1);
        Self {
            tag: tag_bytes,
            header_length,
            parameters,
        }
    }

    /// Reads the header from a stream positioned at offset 0 and leaves the
    /// stream at offset `32 + header_length`.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut tag = [0u8; TAG_LENGTH];
        let n = read_fully(reader, &mut tag)?;
        if n < TAG_LENGTH {
            return Err(Error::TruncatedHeader {
                expected: TAG_LENGTH + 4,
                available: n,
            });
        }

        let mut word = [0u8; 4];
        let n = read_fully(reader, &mut word)?;
        if n < 4 {
            return Err(Error::TruncatedHeader {
                expected: TAG_LENGTH + 4,
                available: TAG_LENGTH + n,
            });
        }
        let header_length = i32::from_le_bytes(word);
        if header_length < 12 {
            return Err(Error::InvalidHeader(format!(
                "header length {} leaves no room for the fiber count and point count",
                header_length
            )));
        }

        let expected = TAG_LENGTH + header_length as usize;
        let n_parameters = header_length as usize / 4 - 1;
        // header_length may be anything up to i32::MAX before the stream proves it
        let mut parameters = Vec::with_capacity(n_parameters.min(64));
        let mut consumed = TAG_LENGTH + 4;
        for _ in 0..n_parameters {
            let n = read_fully(reader, &mut word)?;
            consumed += n;
            if n < 4 {
                return Err(Error::TruncatedHeader {
                    expected,
                    available: consumed,
                });
            }
            parameters.push(i32::from_le_bytes(word));
        }

        // a length that is not a multiple of 4 still ends the header at 32 + header_length
        let mut padding = vec![0u8; expected - consumed];
        let n = read_fully(reader, &mut padding)?;
        if n < padding.len() {
            return Err(Error::TruncatedHeader {
                expected,
                available: consumed + n,
            });
        }

        let header = Self {
            tag,
            header_length,
            parameters,
        };
        for parameter in [HeaderParameter::NFibersTotal, HeaderParameter::NPointsWholeFiber] {
            if header.parameter(parameter).is_some_and(|v| v < 0) {
                return Err(Error::InvalidHeader(format!(
                    "{} is negative",
                    parameter.label()
                )));
            }
        }
        if header.n_points_whole_fiber() == 0 {
            return Err(Error::InvalidHeader(format!(
                "{} is zero, fibers would carry no points",
                HeaderParameter::NPointsWholeFiber.label()
            )));
        }
        Ok(header)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(TAG_LENGTH + 4 + 4 * self.parameters.len());
        bytes.extend_from_slice(&self.tag);
        bytes.extend_from_slice(&self.header_length.to_le_bytes());
        for value in &self.parameters {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Tag as text, with trailing NUL padding removed.
    pub fn tag_str(&self) -> String {
        String::from_utf8_lossy(&self.tag)
            .trim_end_matches('\0')
            .to_string()
    }

    pub fn parameter(&self, parameter: HeaderParameter) -> Option<i32> {
        self.parameters.get(parameter as usize).copied()
    }

    pub fn n_fibers_total(&self) -> usize {
        self.parameter(HeaderParameter::NFibersTotal)
            .map_or(0, |v| v.max(0) as usize)
    }

    pub fn n_points_whole_fiber(&self) -> usize {
        self.parameter(HeaderParameter::NPointsWholeFiber)
            .map_or(0, |v| v.max(0) as usize)
    }

    pub fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.parameter(HeaderParameter::CreationTimestamp)
            .and_then(|ts| DateTime::from_timestamp(ts as i64, 0))
    }

    /// Creation time in the local time zone, formatted `dd.mm.YYYY HH:MM:SS`.
    pub fn creation_time_local(&self) -> Option<String> {
        self.creation_time().map(|date| {
            date.with_timezone(&Local)
                .format("%d.%m.%Y %H:%M:%S")
                .to_string()
        })
    }

    /// Logs every known parameter the header carries.
    pub fn log_summary(&self, grid_side: usize) {
        info!("header: {:?}", self.tag_str());
        info!(
            "{:<19}{} = {} x {}",
            "nFibersTotal:",
            self.n_fibers_total(),
            grid_side,
            grid_side
        );
        for parameter in &HeaderParameter::ALL[1..8] {
            match self.parameter(*parameter) {
                Some(value) => info!("{:<19}{}", format!("{}:", parameter.label()), value),
                None => info!("{:<19}absent", format!("{}:", parameter.label())),
            }
        }
        match self.creation_time_local() {
            Some(date) => info!("{:<19}{}", "date:", date),
            None => info!("{:<19}absent", "date:"),
        }
    }
}
