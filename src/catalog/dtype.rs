//! Safetensors element types

use std::fmt;

/// Width assumed for dtype tags that are not recognized
pub const UNKNOWN_DTYPE_WIDTH: u64 = 1;

/// Data type of tensor elements as tagged in safetensors headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DType {
    // Floating point types
    F64,
    F32,
    F16,
    BF16,
    F8E4M3,
    F8E5M2,
    // Integer types
    I64,
    I32,
    I16,
    I8,
    U64,
    U32,
    U16,
    U8,
    Bool,
}

impl DType {
    /// Parse a canonical tag (`F32`, `BF16`, ...) or a lowercase alias
    /// (`float32`, `bfloat16`, ...). Matching ignores ASCII case.
    pub fn parse(tag: &str) -> Option<Self> {
        let dtype = match tag.to_ascii_lowercase().as_str() {
            "f64" | "float64" | "double" => Self::F64,
            "f32" | "float32" | "float" => Self::F32,
            "f16" | "float16" | "half" => Self::F16,
            "bf16" | "bfloat16" => Self::BF16,
            "f8_e4m3" | "f8_e4m3fn" | "float8_e4m3fn" => Self::F8E4M3,
            "f8_e5m2" | "float8_e5m2" => Self::F8E5M2,
            "i64" | "int64" | "long" => Self::I64,
            "i32" | "int32" | "int" => Self::I32,
            "i16" | "int16" | "short" => Self::I16,
            "i8" | "int8" => Self::I8,
            "u64" | "uint64" => Self::U64,
            "u32" | "uint32" => Self::U32,
            "u16" | "uint16" => Self::U16,
            "u8" | "uint8" => Self::U8,
            "bool" => Self::Bool,
            _ => return None,
        };
        Some(dtype)
    }

    /// Bytes per element
    pub const fn byte_width(&self) -> u64 {
        match self {
            Self::F64 | Self::I64 | Self::U64 => 8,
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::F16 | Self::BF16 | Self::I16 | Self::U16 => 2,
            Self::F8E4M3 | Self::F8E5M2 | Self::I8 | Self::U8 | Self::Bool => 1,
        }
    }

    /// Canonical safetensors tag
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::F64 => "F64",
            Self::F32 => "F32",
            Self::F16 => "F16",
            Self::BF16 => "BF16",
            Self::F8E4M3 => "F8_E4M3",
            Self::F8E5M2 => "F8_E5M2",
            Self::I64 => "I64",
            Self::I32 => "I32",
            Self::I16 => "I16",
            Self::I8 => "I8",
            Self::U64 => "U64",
            Self::U32 => "U32",
            Self::U16 => "U16",
            Self::U8 => "U8",
            Self::Bool => "BOOL",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element width for a dtype tag, or `None` if the tag is not recognized
pub fn byte_width(tag: &str) -> Option<u64> {
    DType::parse(tag).map(|dtype| dtype.byte_width())
}
