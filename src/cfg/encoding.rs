use crate::prelude::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Windows-1252 code points for the 0x80..=0x9F range.
/// `None` marks the five undefined positions.
const CP1252_HIGH_CONTROL: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Character encodings a RINEX file may be decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Encoding {
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of same value
    Latin1,
    /// 7 bit ASCII
    Ascii,
    /// Windows-1252
    Cp1252,
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Utf8 => write!(f, "utf-8"),
            Self::Latin1 => write!(f, "latin-1"),
            Self::Ascii => write!(f, "ascii"),
            Self::Cp1252 => write!(f, "cp1252"),
        }
    }
}

impl std::str::FromStr for Encoding {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            "cp1252" | "windows-1252" => Ok(Self::Cp1252),
            other => Err(Error::UnknownEncoding(other.to_string())),
        }
    }
}

impl Encoding {
    /// Decodes the whole content, returns `None` on the first
    /// byte sequence this [Encoding] cannot represent.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => {
                let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(str::to_string)
            },
            Self::Latin1 => Some(bytes.iter().map(|b| char::from(*b)).collect()),
            Self::Ascii => {
                if bytes.is_ascii() {
                    Some(bytes.iter().map(|b| char::from(*b)).collect())
                } else {
                    None
                }
            },
            Self::Cp1252 => bytes
                .iter()
                .map(|b| match *b {
                    0x80..=0x9F => CP1252_HIGH_CONTROL[(*b - 0x80) as usize],
                    other => Some(char::from(other)),
                })
                .collect(),
        }
    }
}
