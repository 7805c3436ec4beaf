//! Packed payload fixtures
//!
//! Encodes typed facts into the fixed-width wire layouts so scenarios can
//! drive the engine through the same hex path ingestion uses.

use num_bigint::{BigInt, Sign};
use types::{Address, Hash32};

pub const CORE: Address = Address::new([0xc0; 20]);
pub const ORACLE: Address = Address::new([0x0e; 20]);
pub const POSITIONS_NFT: Address = Address::new([0xee; 20]);
pub const TOKEN0: Address = Address::new([0x11; 20]);
pub const TOKEN1: Address = Address::new([0x22; 20]);

/// Big-endian writer, fields appended in wire order
#[derive(Debug, Default)]
pub struct PackedWriter {
    bytes: Vec<u8>,
}

impl PackedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: Address) -> Self {
        self.bytes.extend_from_slice(address.as_bytes());
        self
    }

    pub fn hash(mut self, hash: Hash32) -> Self {
        self.bytes.extend_from_slice(hash.as_bytes());
        self
    }

    /// Two's complement, sign-extended to `bits`
    pub fn int(mut self, value: impl Into<BigInt>, bits: usize) -> Self {
        let value = value.into();
        let width = bits / 8;
        let raw = value.to_signed_bytes_be();
        let fill = if value.sign() == Sign::Minus { 0xff } else { 0x00 };
        assert!(raw.len() <= width, "{value} does not fit in {bits} bits");

        self.bytes.extend(std::iter::repeat(fill).take(width - raw.len()));
        self.bytes.extend_from_slice(&raw);
        self
    }

    pub fn into_hex(self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }
}

pub fn pool_id(byte: u8) -> Hash32 {
    Hash32::new([byte; 32])
}

pub fn init_hex(pool: Hash32, tick: i32, sqrt_ratio: u128) -> String {
    PackedWriter::new()
        .hash(pool)
        .address(TOKEN0)
        .address(TOKEN1)
        .address(Address::ZERO)
        .int(3000u64, 64)
        .int(100u32, 32)
        .int(tick, 32)
        .int(sqrt_ratio, 192)
        .into_hex()
}

pub fn swap_hex(pool: Hash32, delta0: i128, delta1: i128, liquidity_after: u128, tick_after: i32) -> String {
    PackedWriter::new()
        .address(Address::ZERO)
        .hash(pool)
        .int(delta0, 128)
        .int(delta1, 128)
        .int(liquidity_after, 128)
        .int(BigInt::from(1u8) << 128usize, 192)
        .int(tick_after, 32)
        .into_hex()
}

pub fn position_hex(pool: Hash32, lower: i32, upper: i32, liquidity_delta: i128) -> String {
    PackedWriter::new()
        .address(Address::ZERO)
        .hash(pool)
        .hash(Hash32::ZERO)
        .int(lower, 32)
        .int(upper, 32)
        .int(liquidity_delta, 128)
        .int(liquidity_delta, 128)
        .int(liquidity_delta, 128)
        .into_hex()
}

pub fn order_update_hex(start_time: u64, end_time: u64, sale_rate_delta: i128) -> String {
    PackedWriter::new()
        .address(Address::ZERO)
        .hash(Hash32::ZERO)
        .address(TOKEN0)
        .address(TOKEN1)
        .int(3000u64, 64)
        .int(start_time, 64)
        .int(end_time, 64)
        .int(sale_rate_delta, 112)
        .into_hex()
}

pub fn snapshot_hex(token: Address, timestamp: u64, tick_cumulative: i64) -> String {
    PackedWriter::new()
        .address(token)
        .int(timestamp, 64)
        .int(BigInt::from(timestamp) << 64usize, 160)
        .int(tick_cumulative, 64)
        .into_hex()
}

pub fn transfer_hex(from: Address, to: Address, token_id: u64) -> String {
    PackedWriter::new()
        .address(from)
        .address(to)
        .int(token_id, 256)
        .into_hex()
}
