//! Batched variable-width integer streams.
//!
//! ## Stream layout
//! `[selector][header][items...][header][items...]...`
//!
//! The selector byte picks the encoding. Each header byte describes the width
//! of the items in the batch that follows it, most significant bits first:
//!
//! | Encoding         | Batch | Bits per item | Widths (bytes)  |
//! |------------------|-------|---------------|-----------------|
//! | `Binary` (0)     | 8     | 1             | 1, 2            |
//! | `Quaternary` (1) | 4     | 2             | 1, 2, 3, 4      |
//!
//! Items are signed big-endian. The 3-byte width is a sign-extended high byte
//! shifted left by 16, OR an unsigned 16-bit low word. The last batch may be
//! partial; its unused header bits are zero.

use base64::Engine as _;

use crate::error::DatasetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintEncoding {
    /// One width bit per item, batches of 8.
    Binary,
    /// Two width bits per item, batches of 4.
    Quaternary,
}

impl VarintEncoding {
    pub fn from_selector(selector: u8) -> Result<Self, DatasetError> {
        match selector {
            0 => Ok(VarintEncoding::Binary),
            1 => Ok(VarintEncoding::Quaternary),
            other => Err(DatasetError::UnknownEncoding(other)),
        }
    }

    pub fn selector(self) -> u8 {
        match self {
            VarintEncoding::Binary => 0,
            VarintEncoding::Quaternary => 1,
        }
    }

    fn batch_size(self) -> u8 {
        match self {
            VarintEncoding::Binary => 8,
            VarintEncoding::Quaternary => 4,
        }
    }

    fn header_bits(self) -> u8 {
        match self {
            VarintEncoding::Binary => 1,
            VarintEncoding::Quaternary => 2,
        }
    }
}

// ── Reader ────────────────────────────────────────────────────────────

/// Pull-based decoder over a borrowed byte buffer.
///
/// Values are produced strictly in order and only once. After an error the
/// reader reports no further values.
#[derive(Debug)]
pub struct VarintReader<'a> {
    data: &'a [u8],
    encoding: VarintEncoding,
    cursor: usize,
    batch_head: u8,
    batch_remaining: u8,
    failed: bool,
}

impl<'a> VarintReader<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, DatasetError> {
        let (&selector, _) = data.split_first().ok_or(DatasetError::EmptyStream)?;
        let encoding = VarintEncoding::from_selector(selector)?;
        Ok(Self {
            data,
            encoding,
            cursor: 1,
            batch_head: 0,
            batch_remaining: 0,
            failed: false,
        })
    }

    pub fn encoding(&self) -> VarintEncoding {
        self.encoding
    }

    /// Upper bound on the values left in the stream. Every value takes at
    /// least one byte after the selector.
    pub fn max_values(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Whether unread bytes remain. A trailing header byte with no items
    /// still counts, so `next_value` may return `None` after this is true.
    pub fn has_more(&self) -> bool {
        !self.failed && self.cursor < self.data.len()
    }

    pub fn next_value(&mut self) -> Result<Option<i32>, DatasetError> {
        while self.has_more() {
            if self.batch_remaining == 0 {
                self.batch_head = self.data[self.cursor];
                self.batch_remaining = self.encoding.batch_size();
                self.cursor += 1;
                continue;
            }

            let value = match self.encoding {
                VarintEncoding::Binary => {
                    let wide = self.batch_head & 0x80 != 0;
                    self.batch_head <<= 1;
                    if wide {
                        i32::from(i16::from_be_bytes(self.take::<2>()?))
                    } else {
                        i32::from(self.take::<1>()?[0] as i8)
                    }
                }
                VarintEncoding::Quaternary => {
                    let code = (self.batch_head & 0xC0) >> 6;
                    self.batch_head <<= 2;
                    match code {
                        0 => i32::from(self.take::<1>()?[0] as i8),
                        1 => i32::from(i16::from_be_bytes(self.take::<2>()?)),
                        2 => {
                            let [hi, mid, lo] = self.take::<3>()?;
                            (i32::from(hi as i8) << 16) | i32::from(u16::from_be_bytes([mid, lo]))
                        }
                        _ => i32::from_be_bytes(self.take::<4>()?),
                    }
                }
            };
            self.batch_remaining -= 1;
            return Ok(Some(value));
        }
        Ok(None)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DatasetError> {
        let available = self.data.len() - self.cursor;
        if available < N {
            self.failed = true;
            return Err(DatasetError::Truncated {
                offset: self.cursor,
                width: N,
                available,
            });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.cursor..self.cursor + N]);
        self.cursor += N;
        Ok(out)
    }
}

impl Iterator for VarintReader<'_> {
    type Item = Result<i32, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_value().transpose()
    }
}

// ── Writer ────────────────────────────────────────────────────────────

/// Encoder producing streams readable by [`VarintReader`]. Each value gets
/// the narrowest width its encoding allows.
#[derive(Debug)]
pub struct VarintWriter {
    encoding: VarintEncoding,
    out: Vec<u8>,
    batch_head: u8,
    batch_len: u8,
    batch_tail: Vec<u8>,
}

impl VarintWriter {
    pub fn new(encoding: VarintEncoding) -> Self {
        Self {
            encoding,
            out: vec![encoding.selector()],
            batch_head: 0,
            batch_len: 0,
            batch_tail: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, value: i64) -> Result<(), DatasetError> {
        let (code, width) = self.width_of(value)?;
        self.batch_head = (self.batch_head << self.encoding.header_bits()) | code;
        self.batch_tail.extend_from_slice(&value.to_be_bytes()[8 - width..]);
        self.batch_len += 1;
        if self.batch_len == self.encoding.batch_size() {
            self.flush_batch();
        }
        Ok(())
    }

    pub fn finish(mut self) -> Vec<u8> {
        if self.batch_len > 0 {
            let unused = self.encoding.batch_size() - self.batch_len;
            self.batch_head <<= self.encoding.header_bits() * unused;
            self.flush_batch();
        }
        self.out
    }

    fn width_of(&self, value: i64) -> Result<(u8, usize), DatasetError> {
        const I24: std::ops::RangeInclusive<i64> = -(1 << 23)..=(1 << 23) - 1;
        let fits_i8 = i8::try_from(value).is_ok();
        let fits_i16 = i16::try_from(value).is_ok();
        match self.encoding {
            VarintEncoding::Binary if fits_i8 => Ok((0, 1)),
            VarintEncoding::Binary if fits_i16 => Ok((1, 2)),
            VarintEncoding::Quaternary if fits_i8 => Ok((0, 1)),
            VarintEncoding::Quaternary if fits_i16 => Ok((1, 2)),
            VarintEncoding::Quaternary if I24.contains(&value) => Ok((2, 3)),
            VarintEncoding::Quaternary if i32::try_from(value).is_ok() => Ok((3, 4)),
            encoding => Err(DatasetError::ValueOutOfRange { value, encoding }),
        }
    }

    fn flush_batch(&mut self) {
        self.out.push(self.batch_head);
        self.out.append(&mut self.batch_tail);
        self.batch_head = 0;
        self.batch_len = 0;
    }
}

/// Encode a full sequence of values.
pub fn encode_varints<I>(encoding: VarintEncoding, values: I) -> Result<Vec<u8>, DatasetError>
where
    I: IntoIterator<Item = i64>,
{
    let mut writer = VarintWriter::new(encoding);
    for v in values {
        writer.push(v)?;
    }
    Ok(writer.finish())
}

/// Decode a full stream eagerly.
pub fn decode_varints(data: &[u8]) -> Result<Vec<i32>, DatasetError> {
    VarintReader::new(data)?.collect()
}

pub fn decode_base64(text: &str) -> Result<Vec<u8>, DatasetError> {
    Ok(base64::engine::general_purpose::STANDARD.decode(text)?)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BINARY_VALUES: [i64; 9] = [5, -2, 300, -300, 127, -128, 32767, -32768, 1];
    const QUATERNARY_VALUES: [i64; 5] = [-1000, 70_000, -8_388_608, 2_147_483_647, 3];

    #[test]
    fn test_binary_batch_boundaries() {
        for n in [7, 8, 9] {
            let values = &BINARY_VALUES[..n];
            let bytes = encode_varints(VarintEncoding::Binary, values.iter().copied()).unwrap();
            let decoded = decode_varints(&bytes).unwrap();
            let expected: Vec<i32> = values.iter().map(|&v| v as i32).collect();
            assert_eq!(decoded, expected, "batch of {}", n);
        }
    }

    #[test]
    fn test_quaternary_batch_boundaries() {
        for n in [3, 4, 5] {
            let values = &QUATERNARY_VALUES[..n];
            let bytes = encode_varints(VarintEncoding::Quaternary, values.iter().copied()).unwrap();
            let decoded = decode_varints(&bytes).unwrap();
            let expected: Vec<i32> = values.iter().map(|&v| v as i32).collect();
            assert_eq!(decoded, expected, "batch of {}", n);
        }
    }

    #[test]
    fn test_binary_wire_layout() {
        let bytes = encode_varints(VarintEncoding::Binary, [5, 300]).unwrap();
        assert_eq!(bytes, vec![0x00, 0x40, 0x05, 0x01, 0x2C]);
        assert_eq!(decode_varints(&bytes).unwrap(), vec![5, 300]);
    }

    #[test]
    fn test_quaternary_three_byte_width() {
        // Sign-extended high byte combined with an unsigned low word.
        assert_eq!(decode_varints(&[0x01, 0x80, 0xFF, 0xFF, 0xFE]).unwrap(), vec![-2]);
        assert_eq!(decode_varints(&[0x01, 0x80, 0x01, 0x00, 0x00]).unwrap(), vec![65536]);
        assert_eq!(decode_varints(&[0x01, 0x80, 0x80, 0x00, 0x00]).unwrap(), vec![-8_388_608]);

        let bytes = encode_varints(VarintEncoding::Quaternary, [70_000]).unwrap();
        assert_eq!(bytes, vec![0x01, 0x80, 0x01, 0x11, 0x70]);
    }

    #[test]
    fn test_quaternary_header_order() {
        // Codes 3, 0, 1, 2 read from the most significant bits first.
        let bytes = [
            0x01, 0b11_00_01_10, 0x00, 0x01, 0x00, 0x00, 0x7F, 0xFF, 0x80, 0x80, 0x00, 0x00,
        ];
        assert_eq!(decode_varints(&bytes).unwrap(), vec![65536, 127, -128, -8_388_608]);
    }

    #[test]
    fn test_trailing_header_without_items() {
        let mut reader = VarintReader::new(&[0x00, 0x00]).unwrap();
        assert!(reader.has_more());
        assert_eq!(reader.next_value().unwrap(), None);
        assert!(!reader.has_more());
        assert!(decode_varints(&[0x01]).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_integer() {
        let mut reader = VarintReader::new(&[0x00, 0x80, 0x01]).unwrap();
        match reader.next() {
            Some(Err(DatasetError::Truncated {
                offset,
                width,
                available,
            })) => {
                assert_eq!(offset, 2);
                assert_eq!(width, 2);
                assert_eq!(available, 1);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
        assert!(reader.next().is_none());

        let err = decode_varints(&[0x01, 0xC0, 0x00, 0x00, 0x01]).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_rejects_unknown_selector() {
        assert!(matches!(
            VarintReader::new(&[0x02, 0x00]),
            Err(DatasetError::UnknownEncoding(2))
        ));
        assert!(matches!(VarintReader::new(&[]), Err(DatasetError::EmptyStream)));
    }

    #[test]
    fn test_binary_rejects_wide_values() {
        let err = encode_varints(VarintEncoding::Binary, [40_000]).unwrap_err();
        assert!(matches!(err, DatasetError::ValueOutOfRange { value: 40_000, .. }));
        let err = encode_varints(VarintEncoding::Quaternary, [1i64 << 40]).unwrap_err();
        assert!(matches!(err, DatasetError::ValueOutOfRange { .. }));
    }

    #[test]
    fn test_base64_wrapping() {
        let bytes = encode_varints(VarintEncoding::Binary, [1, 2, 3]).unwrap();
        let text = encode_base64(&bytes);
        assert_eq!(decode_base64(&text).unwrap(), bytes);
        assert!(matches!(decode_base64("not base64!"), Err(DatasetError::Base64(_))));
    }

    proptest! {
        #[test]
        fn prop_binary_roundtrip(values in proptest::collection::vec(any::<i16>(), 0..40)) {
            let bytes = encode_varints(VarintEncoding::Binary, values.iter().map(|&v| i64::from(v))).unwrap();
            let decoded = decode_varints(&bytes).unwrap();
            let expected: Vec<i32> = values.iter().map(|&v| i32::from(v)).collect();
            prop_assert_eq!(decoded, expected);
        }

        #[test]
        fn prop_quaternary_roundtrip(values in proptest::collection::vec(any::<i32>(), 0..40)) {
            let bytes = encode_varints(VarintEncoding::Quaternary, values.iter().map(|&v| i64::from(v))).unwrap();
            prop_assert_eq!(decode_varints(&bytes).unwrap(), values);
        }
    }
}
