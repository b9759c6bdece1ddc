//! Native field kinds and their canonical wire text.
//!
//! The wire carries no width information: `"300"` is a valid number until it
//! is decoded into a `u8`. Every kind therefore parses through the widest
//! type of its family and narrows with an explicit overflow check.

use std::fmt;
use std::num::{IntErrorKind, ParseIntError};

/// In-memory category of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeKind {
    Signed { bits: u32 },
    Unsigned { bits: u32 },
    Float { bits: u32 },
    /// Rendered `1`/`0`, decoded as an unsigned integer of width 1.
    Bool,
    Text,
}

impl fmt::Display for NativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeKind::Signed { bits } => write!(f, "i{bits}"),
            NativeKind::Unsigned { bits } => write!(f, "u{bits}"),
            NativeKind::Float { bits } => write!(f, "f{bits}"),
            NativeKind::Bool => f.write_str("bool"),
            NativeKind::Text => f.write_str("string"),
        }
    }
}

/// Reason a wire text could not become a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFailure {
    /// Not a valid decimal representation.
    Parse,
    /// Valid number that does not fit the field's width.
    Overflow,
    /// NaN or infinity bound for an `N` column.
    NotFinite,
}

impl fmt::Display for DataFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataFailure::Parse => f.write_str("not a valid number"),
            DataFailure::Overflow => f.write_str("out of range"),
            DataFailure::NotFinite => f.write_str("not a finite number"),
        }
    }
}

/// A field type the codec can carry.
///
/// Implemented for every primitive integer, `f32`, `f64`, `bool` and
/// `String`. The `Record` derive only accepts fields of these types.
pub trait NativeField: Sized {
    const KIND: NativeKind;

    /// Canonical wire text for this value.
    fn render(&self) -> String;

    /// Parse wire text into this kind, checking width.
    fn parse_wire(text: &str) -> Result<Self, DataFailure>;
}

fn int_failure(err: ParseIntError) -> DataFailure {
    match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => DataFailure::Overflow,
        _ => DataFailure::Parse,
    }
}

macro_rules! signed_field {
    ($($t:ty),*) => {$(
        impl NativeField for $t {
            const KIND: NativeKind = NativeKind::Signed { bits: <$t>::BITS };

            fn render(&self) -> String {
                self.to_string()
            }

            fn parse_wire(text: &str) -> Result<Self, DataFailure> {
                let wide: i128 = text.parse().map_err(int_failure)?;
                <$t>::try_from(wide).map_err(|_| DataFailure::Overflow)
            }
        }
    )*};
}

macro_rules! unsigned_field {
    ($($t:ty),*) => {$(
        impl NativeField for $t {
            const KIND: NativeKind = NativeKind::Unsigned { bits: <$t>::BITS };

            fn render(&self) -> String {
                self.to_string()
            }

            fn parse_wire(text: &str) -> Result<Self, DataFailure> {
                let wide: u128 = text.parse().map_err(int_failure)?;
                <$t>::try_from(wide).map_err(|_| DataFailure::Overflow)
            }
        }
    )*};
}

macro_rules! float_field {
    ($($t:ty),*) => {$(
        impl NativeField for $t {
            const KIND: NativeKind = NativeKind::Float {
                bits: (std::mem::size_of::<$t>() * 8) as u32,
            };

            fn render(&self) -> String {
                scientific(format!("{:E}", self))
            }

            fn parse_wire(text: &str) -> Result<Self, DataFailure> {
                let value: $t = text.parse().map_err(|_| DataFailure::Parse)?;
                // Out-of-range literals saturate to infinity instead of failing.
                if value.is_infinite() && !spells_infinity(text) {
                    return Err(DataFailure::Overflow);
                }
                Ok(value)
            }
        }
    )*};
}

signed_field!(i8, i16, i32, i64, i128, isize);
unsigned_field!(u8, u16, u32, u64, u128, usize);
float_field!(f32, f64);

impl NativeField for bool {
    const KIND: NativeKind = NativeKind::Bool;

    fn render(&self) -> String {
        let digit = if *self { "1" } else { "0" };
        digit.to_string()
    }

    fn parse_wire(text: &str) -> Result<Self, DataFailure> {
        match text.parse::<u128>().map_err(int_failure)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(DataFailure::Overflow),
        }
    }
}

impl NativeField for String {
    const KIND: NativeKind = NativeKind::Text;

    fn render(&self) -> String {
        self.clone()
    }

    fn parse_wire(text: &str) -> Result<Self, DataFailure> {
        Ok(text.to_string())
    }
}

/// Pin the float format to `d[.ddd]E±XX`.
///
/// `{:E}` already yields the shortest digits that round-trip at the value's
/// own width; only the exponent needs a sign and two-digit padding.
/// Non-finite values become `NaN`, `+Inf` and `-Inf`.
fn scientific(formatted: String) -> String {
    match formatted.as_str() {
        "NaN" => return "NaN".to_string(),
        "inf" => return "+Inf".to_string(),
        "-inf" => return "-Inf".to_string(),
        _ => {}
    }
    let Some((mantissa, exponent)) = formatted.split_once('E') else {
        return formatted;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return formatted;
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}E{sign}{:02}", exponent.unsigned_abs())
}

fn spells_infinity(text: &str) -> bool {
    text.trim_start_matches(['+', '-'])
        .get(..3)
        .is_some_and(|head| head.eq_ignore_ascii_case("inf"))
}
