//! Legacy (EIP-155) value-transfer construction.
//!
//! The faucet only ever sends plain value transfers, so the encoder covers
//! exactly that: a 9-item legacy transaction with the chain-id trailer in
//! the signing payload and minimal big-endian quantity encoding.

use drip_common::Address;
use rlp::RlpStream;

/// An unsigned value transfer.
#[derive(Debug, Clone)]
pub struct TransferTx {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Address,
    pub value: u128,
    pub chain_id: u64,
}

impl TransferTx {
    /// RLP of the signing payload per EIP-155:
    /// `(nonce, gasprice, gaslimit, to, value, data, chain_id, 0, 0)`.
    pub fn rlp_unsigned(&self) -> Vec<u8> {
        let mut stream = RlpStream::new();
        stream.begin_list(9);
        self.append_body(&mut stream);
        stream.append(&self.chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        stream.out().to_vec()
    }

    /// Keccak-256 of the signing payload.
    pub fn signing_hash(&self) -> [u8; 32] {
        keccak_hash::keccak(self.rlp_unsigned()).0
    }

    /// RLP of the signed transaction:
    /// `(nonce, gasprice, gaslimit, to, value, data, v, r, s)`.
    pub fn rlp_signed(&self, v: u64, r: &[u8; 32], s: &[u8; 32]) -> Vec<u8> {
        let mut stream = RlpStream::new();
        stream.begin_list(9);
        self.append_body(&mut stream);
        stream.append(&v);
        stream.append(&trim_leading_zeros(r));
        stream.append(&trim_leading_zeros(s));
        stream.out().to_vec()
    }

    /// The recovery `v` for this chain: `chain_id * 2 + 35 + recovery_id`.
    pub fn signature_v(&self, recovery_id: u8) -> u64 {
        self.chain_id * 2 + 35 + recovery_id as u64
    }

    fn append_body(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&be_bytes_trimmed(self.gas_price));
        stream.append(&self.gas_limit);
        stream.append(&self.to.0.to_vec());
        stream.append(&be_bytes_trimmed(self.value));
        stream.append_empty_data(); // data
    }
}

/// Minimal big-endian byte string for an RLP quantity (empty for zero).
fn be_bytes_trimmed(value: u128) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

fn trim_leading_zeros(bytes: &[u8; 32]) -> Vec<u8> {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    // The worked example from EIP-155.
    fn example_tx() -> TransferTx {
        TransferTx {
            nonce: 9,
            gas_price: 20_000_000_000,
            gas_limit: 21000,
            to: Address::from_str("0x3535353535353535353535353535353535353535").unwrap(),
            value: 1_000_000_000_000_000_000,
            chain_id: 1,
        }
    }

    #[test]
    fn test_eip155_signing_payload() {
        let expected = "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080";
        assert_eq!(hex::encode(example_tx().rlp_unsigned()), expected);
    }

    #[test]
    fn test_eip155_signing_hash() {
        let expected = "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53";
        assert_eq!(hex::encode(example_tx().signing_hash()), expected);
    }

    #[test]
    fn test_signature_v() {
        let tx = example_tx();
        assert_eq!(tx.signature_v(0), 37);
        assert_eq!(tx.signature_v(1), 38);
    }

    #[test]
    fn test_quantity_trimming() {
        assert_eq!(be_bytes_trimmed(0), Vec::<u8>::new());
        assert_eq!(be_bytes_trimmed(1), vec![1]);
        assert_eq!(be_bytes_trimmed(0x5208), vec![0x52, 0x08]);
    }
}
