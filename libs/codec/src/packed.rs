//! # Packed Field Reader
//!
//! Event payloads are fixed-width big-endian records with fields packed
//! most-significant-first and no padding between them. The reader treats the
//! whole record as one unsigned integer and peels fields off the low end, so
//! fields come out in reverse wire order: the last field is read first.
//!
//! Signed fields are two's complement over their declared width. Fields wider
//! than 64 bits are returned as `BigInt`; narrower ones as machine integers.

use crate::error::{CodecError, CodecResult};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};
use types::{Address, Hash32};

/// Reverse-order reader over one packed record
#[derive(Debug)]
pub struct PackedReader {
    kind: &'static str,
    value: BigUint,
    remaining_bits: usize,
}

impl PackedReader {
    /// Parse `input` (with or without `0x`) and check its byte width
    pub fn from_hex(kind: &'static str, input: &str, expected_bytes: usize) -> CodecResult<Self> {
        let digits = input.strip_prefix("0x").unwrap_or(input);
        if digits.len() % 2 != 0 {
            return Err(CodecError::malformed(kind, "odd number of hex digits"));
        }
        let got = digits.len() / 2;
        if got != expected_bytes {
            return Err(CodecError::wrong_length(kind, expected_bytes, got));
        }
        let bytes = hex::decode(digits).map_err(|e| CodecError::malformed(kind, e.to_string()))?;
        Ok(Self::from_bytes(kind, &bytes))
    }

    /// Reader over raw bytes; the width is the slice length
    pub fn from_bytes(kind: &'static str, bytes: &[u8]) -> Self {
        Self {
            kind,
            value: BigUint::from_bytes_be(bytes),
            remaining_bits: bytes.len() * 8,
        }
    }

    pub fn remaining_bits(&self) -> usize {
        self.remaining_bits
    }

    fn take(&mut self, bits: usize) -> CodecResult<BigUint> {
        if bits > self.remaining_bits {
            return Err(CodecError::malformed(
                self.kind,
                format!(
                    "field of {bits} bits read past end of record ({} bits left)",
                    self.remaining_bits
                ),
            ));
        }
        let mask = (BigUint::one() << bits) - BigUint::one();
        let field = &self.value & &mask;
        self.value >>= bits;
        self.remaining_bits -= bits;
        Ok(field)
    }

    fn take_small(&mut self, bits: usize) -> CodecResult<u64> {
        debug_assert!(bits <= 64);
        let field = self.take(bits)?;
        Ok(field.iter_u64_digits().next().unwrap_or(0))
    }

    /// Unsigned field of any width
    pub fn unsigned(&mut self, bits: usize) -> CodecResult<BigInt> {
        let field = self.take(bits)?;
        Ok(BigInt::from_biguint(Sign::Plus, field))
    }

    /// Two's complement signed field of any width
    pub fn signed(&mut self, bits: usize) -> CodecResult<BigInt> {
        let field = BigInt::from_biguint(Sign::Plus, self.take(bits)?);
        if bits == 0 {
            return Ok(field);
        }
        let half = BigInt::one() << (bits - 1);
        if field >= half {
            Ok(field - (BigInt::one() << bits))
        } else {
            Ok(field)
        }
    }

    pub fn u64(&mut self) -> CodecResult<u64> {
        self.take_small(64)
    }

    pub fn u32(&mut self) -> CodecResult<u32> {
        Ok(self.take_small(32)? as u32)
    }

    pub fn i64(&mut self) -> CodecResult<i64> {
        Ok(self.take_small(64)? as i64)
    }

    pub fn i32(&mut self) -> CodecResult<i32> {
        Ok(self.take_small(32)? as u32 as i32)
    }

    /// 160-bit address field
    pub fn address(&mut self) -> CodecResult<Address> {
        let field = self.take(160)?;
        Address::from_be_slice(&field.to_bytes_be())
            .ok_or_else(|| CodecError::malformed(self.kind, "address wider than 20 bytes"))
    }

    /// 256-bit identifier field
    pub fn hash(&mut self) -> CodecResult<Hash32> {
        let field = self.take(256)?;
        Hash32::from_be_slice(&field.to_bytes_be())
            .ok_or_else(|| CodecError::malformed(self.kind, "identifier wider than 32 bytes"))
    }

    /// Every bit of the record must have been consumed
    pub fn finish(self) -> CodecResult<()> {
        if self.remaining_bits != 0 || !self.value.is_zero() {
            return Err(CodecError::malformed(
                self.kind,
                format!("{} bits left unread", self.remaining_bits),
            ));
        }
        Ok(())
    }
}
