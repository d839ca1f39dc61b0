//! Slice-based reader collecting the messages of a FIT document.
//!
//! A document is a file header, a sequence of records and a trailing cyclic
//! redundancy check. Definition records describe the layout of a local
//! message type (0-15); data records then refer to that local type and are
//! decoded into a [`Message`] of the definition's global message number.

use either::Either::{self, Left, Right};
use tartan_bitfield::bitfield;
use thiserror::Error;
use zerocopy::FromBytes;

use super::{check::compute_crc, profile};

/// Errors occurring while reading a document.
#[derive(Debug, Error)]
pub enum Error {
    /// Unexpectedly reached the end of the slice.
    #[error("Unexpectedly reached the end of the slice.")]
    EndOfSlice,
    /// Calculated and found CRC values do not match.
    #[error("Calculated ({calculated}) and found ({found}) CRC values do not match.")]
    CyclicRedundancyCheck { found: u16, calculated: u16 },
    /// Incorrect filetype marker.
    #[error("Incorrect file type marker.")]
    NotFitData,
    /// Unknown header length.
    #[error("Unknown header length ({0}).")]
    UnknownHeaderLength(u8),
    /// A data record used a local message with no preceding definition.
    #[error("Found data for undefined local message {0}.")]
    UndefinedLocalMessage(u8),
    /// A field definition used a base type outside the protocol.
    #[error("Unknown base type ({base_type:#04x}) for field {field}.")]
    UnknownBaseType { field: u8, base_type: u8 },
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    /// The valid elements of a multi-element field.
    Array(Vec<Value>),
}

impl Value {
    /// The value as a number; the first element for arrays.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Unsigned(x) => Some(*x as f64),
            Self::Signed(x) => Some(*x as f64),
            Self::Float(x) => Some(*x),
            Self::Text(_) => None,
            Self::Array(values) => values.first().and_then(Value::as_f64),
        }
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Unsigned(x) => Some(*x),
            Self::Signed(x) => u64::try_from(*x).ok(),
            Self::Array(values) => values.first().and_then(Value::as_u64),
            Self::Float(_) | Self::Text(_) => None,
        }
    }
}

/// A field value interpreted through the profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Number(f64),
    /// The profile name of an enumerated value.
    Name(&'static str),
    Text(&'a str),
}

impl FieldValue<'_> {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(x) => Some(*x),
            Self::Name(_) | Self::Text(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(*name),
            Self::Text(text) => Some(*text),
            Self::Number(_) => None,
        }
    }
}

/// A data message from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    kind: u16,
    time_offset: Option<u8>,
    fields: Vec<(u8, Value)>,
}

impl Message {
    /// The global message number.
    pub fn kind(&self) -> u16 {
        self.kind
    }

    /// The time offset stored in a compressed timestamp header, if any.
    pub fn time_offset(&self) -> Option<u8> {
        self.time_offset
    }

    /// The raw value of a field by number. Fields holding their base type's
    /// 'invalid' marker are absent.
    pub fn raw(&self, number: u8) -> Option<&Value> {
        self.fields
            .iter()
            .find_map(|(n, value)| (*n == number).then_some(value))
    }

    /// The value of a field by profile name.
    ///
    /// Enumerated values known to the profile are returned by name.
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let profile = profile::lookup(self.kind, name)?;
        let value = self.raw(profile.number)?;

        if let Value::Text(text) = value {
            return Some(FieldValue::Text(text));
        }

        let named = value.as_u64().and_then(|v| profile.value_name(v));
        match named {
            Some(name) => Some(FieldValue::Name(name)),
            None => value.as_f64().map(FieldValue::Number),
        }
    }
}

/// The messages of a decoded document, in document order.
#[derive(Debug, Clone, Default)]
pub struct FitFile {
    messages: Vec<Message>,
}

impl FitFile {
    /// Decode all data messages from a document.
    pub fn parse(r: &[u8]) -> Result<Self, Error> {
        let i = &mut 0; // Counter of bytes read, used to read bytes from the tip.

        let size = decode_file_header(r, i)?;
        let end = *i + size as usize; // Offset to the end of the record section.

        // Apply the cyclic redundancy check before continuing.
        let found = u16::from_le_bytes(take(r, &mut { end })?);
        let calculated = compute_crc(0, r.get(..end).ok_or(Error::EndOfSlice)?);

        if found != calculated {
            Err(Error::CyclicRedundancyCheck { found, calculated })?;
        }

        let mut definitions: [Option<Definition>; 16] = Default::default();
        let mut messages = Vec::new();

        while *i < end {
            let [header] = take(r, i)?;

            match decode_record_header(header) {
                (local, Left(header)) => {
                    definitions[local as usize] = Some(decode_definition(header, r, i)?);
                }
                (local, Right(header)) => {
                    let definition = definitions[local as usize]
                        .as_ref()
                        .ok_or(Error::UndefinedLocalMessage(local))?;
                    messages.push(decode_data(header, definition, r, i)?);
                }
            }
        }

        Ok(Self { messages })
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// All messages with the given global message number, in document order.
    pub fn messages_of_kind(&self, kind: u16) -> Vec<&Message> {
        self.messages.iter().filter(|m| m.kind == kind).collect()
    }
}

/// Decode the file header, returning the number of record bytes.
fn decode_file_header(r: &[u8], i: &mut usize) -> Result<u32, Error> {
    #[repr(C)]
    #[derive(FromBytes)]
    struct FileHeader {
        header_size: u8,
        protocol_version: u8,
        profile_version: [u8; 2],
        data_size: [u8; 4],
        data_type: [u8; 4],
    }

    let FileHeader {
        header_size,
        data_size,
        data_type,
        ..
    } = zerocopy::transmute!(take::<12>(r, i)?);

    if &data_type != b".FIT" {
        Err(Error::NotFitData)?;
    }

    match header_size {
        14 => {
            take::<2>(r, i)?; // Header CRC, covered by the document CRC.
        }
        12 => {}
        _ => Err(Error::UnknownHeaderLength(header_size))?,
    }

    Ok(u32::from_le_bytes(data_size))
}

struct DefinitionHeader {
    has_developer_fields: bool,
}

struct DataHeader {
    time_offset: Option<u8>,
}

/// Decode a record header into its local message number and record kind.
fn decode_record_header(r: u8) -> (u8, Either<DefinitionHeader, DataHeader>) {
    bitfield! {
        struct RecordHeader(u8) {
            [7] is_compressed,
        }
    }

    if RecordHeader(r).is_compressed() {
        bitfield! {
            struct CompressedHeader(u8) {
                [0..5] time_offset: u8,
                [5..7] local_message: u8,
            }
        }

        let header = CompressedHeader(r);
        let time_offset = Some(header.time_offset());

        (header.local_message(), Right(DataHeader { time_offset }))
    } else {
        bitfield! {
            struct NormalHeader(u8) {
                [0..4] local_message: u8,
                [5] is_developer,
                [6] is_definition,
            }
        }

        let header = NormalHeader(r);

        let successor = if header.is_definition() {
            Left(DefinitionHeader {
                has_developer_fields: header.is_developer(),
            })
        } else {
            Right(DataHeader { time_offset: None })
        };

        (header.local_message(), successor)
    }
}

/// The layout of a local message type.
struct Definition {
    global: u16,
    is_little_endian: bool,
    fields: Vec<FieldDefinition>,
    /// Bytes of developer fields trailing each data record.
    developer_size: usize,
}

struct FieldDefinition {
    number: u8,
    size: u8,
    base_type: u8,
}

fn decode_definition(
    header: DefinitionHeader,
    r: &[u8],
    i: &mut usize,
) -> Result<Definition, Error> {
    #[repr(C)]
    #[derive(FromBytes)]
    struct DefinitionMessage {
        _reserved: u8,
        architecture: u8,
        global_message: [u8; 2],
        field_count: u8,
    }

    #[repr(C)]
    #[derive(FromBytes)]
    struct FieldHeader {
        field: u8,
        size: u8,
        base_type: u8,
    }

    let DefinitionMessage {
        architecture,
        global_message,
        field_count,
        ..
    } = zerocopy::transmute!(take::<5>(r, i)?);

    let is_little_endian = architecture == 0;
    let global = if is_little_endian {
        u16::from_le_bytes(global_message)
    } else {
        u16::from_be_bytes(global_message)
    };

    let fields = (0..field_count)
        .map(|_| {
            let FieldHeader {
                field,
                size,
                base_type,
            } = zerocopy::transmute!(take::<3>(r, i)?);

            Ok(FieldDefinition {
                number: field,
                size,
                base_type,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let mut developer_size = 0;
    if header.has_developer_fields {
        let [count] = take(r, i)?;
        for _ in 0..count {
            let [_field, size, _developer_index] = take(r, i)?;
            developer_size += size as usize;
        }
    }

    Ok(Definition {
        global,
        is_little_endian,
        fields,
        developer_size,
    })
}

fn decode_data(
    header: DataHeader,
    definition: &Definition,
    r: &[u8],
    i: &mut usize,
) -> Result<Message, Error> {
    let mut fields = Vec::with_capacity(definition.fields.len());

    for field in &definition.fields {
        let bytes = take_slice(r, i, field.size as usize)?;
        let value = decode_value(field.base_type, bytes, definition.is_little_endian).ok_or(
            Error::UnknownBaseType {
                field: field.number,
                base_type: field.base_type,
            },
        )?;

        if let Some(value) = value {
            fields.push((field.number, value));
        }
    }

    take_slice(r, i, definition.developer_size)?;

    Ok(Message {
        kind: definition.global,
        time_offset: header.time_offset,
        fields,
    })
}

/// Decode the valid elements of a field with size-prefixed base type `T`.
macro_rules! elements {
    ($r:expr, $is_le:expr, $t:ty, $variant:ident, $is_valid:expr) => {
        $r.chunks_exact(size_of::<$t>())
            .filter_map(|chunk| {
                let bytes = <[u8; size_of::<$t>()]>::try_from(chunk).ok()?;
                let x = if $is_le {
                    <$t>::from_le_bytes(bytes)
                } else {
                    <$t>::from_be_bytes(bytes)
                };

                let is_valid: fn($t) -> bool = $is_valid;
                is_valid(x).then(|| Value::$variant(x.into()))
            })
            .collect::<Vec<_>>()
    };
}

/// Convert the bytes of a field to a value.
///
/// Returns `None` for an unknown base type, and `Some(None)` for a field
/// holding only its 'invalid' marker.
fn decode_value(base_type: u8, r: &[u8], is_le: bool) -> Option<Option<Value>> {
    let mut values = match base_type & 0x1F {
        0x00 | 0x02 | 0x0D => elements!(r, is_le, u8, Unsigned, |x| x != u8::MAX),
        0x01 => elements!(r, is_le, i8, Signed, |x| x != i8::MAX),
        0x03 => elements!(r, is_le, i16, Signed, |x| x != i16::MAX),
        0x04 => elements!(r, is_le, u16, Unsigned, |x| x != u16::MAX),
        0x05 => elements!(r, is_le, i32, Signed, |x| x != i32::MAX),
        0x06 => elements!(r, is_le, u32, Unsigned, |x| x != u32::MAX),
        0x07 => {
            let text = r.split(|b| *b == 0).next().unwrap_or_default();
            if text.is_empty() {
                return Some(None);
            }
            return Some(Some(Value::Text(
                String::from_utf8_lossy(text).into_owned(),
            )));
        }
        0x08 => elements!(r, is_le, f32, Float, |x| x.to_bits() != u32::MAX),
        0x09 => elements!(r, is_le, f64, Float, |x| x.to_bits() != u64::MAX),
        0x0A => elements!(r, is_le, u8, Unsigned, |x| x != 0),
        0x0B => elements!(r, is_le, u16, Unsigned, |x| x != 0),
        0x0C => elements!(r, is_le, u32, Unsigned, |x| x != 0),
        0x0E => elements!(r, is_le, i64, Signed, |x| x != i64::MAX),
        0x0F => elements!(r, is_le, u64, Unsigned, |x| x != u64::MAX),
        0x10 => elements!(r, is_le, u64, Unsigned, |x| x != 0),
        _ => return None,
    };

    Some(match values.len() {
        0 => None,
        1 => values.pop(),
        _ => Some(Value::Array(values)),
    })
}

/// Take an exact number of bytes from an offset in a slice, advancing the offset.
fn take<const N: usize>(r: &[u8], i: &mut usize) -> Result<[u8; N], Error> {
    take_slice(r, i, N)?
        .try_into()
        .map_err(|_| Error::EndOfSlice)
}

fn take_slice<'a>(r: &'a [u8], i: &mut usize, n: usize) -> Result<&'a [u8], Error> {
    let s = *i;
    let bytes = r.get(s..s + n).ok_or(Error::EndOfSlice)?;
    *i += n;

    Ok(bytes)
}
