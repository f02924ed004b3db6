//! Local signing wallet for the faucet account.

use crate::tx::TransferTx;
use drip_common::Address;
use k256::ecdsa::SigningKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// Holds the faucet's secp256k1 key and signs outgoing transfers.
pub struct Wallet {
    signing_key: SigningKey,
    address: Address,
}

impl Wallet {
    /// Build a wallet from a `0x`-prefixed (or bare) hex private key.
    pub fn from_hex(private_key: &str) -> Result<Self, WalletError> {
        let key_hex = private_key.strip_prefix("0x").unwrap_or(private_key);
        let key_bytes = hex::decode(key_hex).map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        if key_bytes.len() != 32 {
            return Err(WalletError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                key_bytes.len()
            )));
        }

        let mut key_array = [0u8; 32];
        key_array.copy_from_slice(&key_bytes);
        let signing_key = SigningKey::from_bytes(&key_array.into())
            .map_err(|e| WalletError::InvalidKey(e.to_string()))?;

        let address = derive_address(&signing_key);
        Ok(Self {
            signing_key,
            address,
        })
    }

    /// The sending account's address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a transfer, returning the raw RLP ready for broadcast.
    pub fn sign_transfer(&self, tx: &TransferTx) -> Result<Vec<u8>, WalletError> {
        let hash = tx.signing_hash();
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&hash)
            .map_err(|e| WalletError::Signing(e.to_string()))?;

        let r: [u8; 32] = signature.r().to_bytes().into();
        let s: [u8; 32] = signature.s().to_bytes().into();
        let v = tx.signature_v(recovery_id.to_byte());

        Ok(tx.rlp_signed(v, &r, &s))
    }
}

/// Address = last 20 bytes of keccak(uncompressed public key without the
/// 0x04 tag byte).
fn derive_address(signing_key: &SigningKey) -> Address {
    let public_key = signing_key.verifying_key();
    let point = public_key.to_encoded_point(false);
    let hash = keccak_hash::keccak(&point.as_bytes()[1..]);
    let mut addr_bytes = [0u8; 20];
    addr_bytes.copy_from_slice(&hash.0[12..]);
    Address(addr_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    // Key and expected output from the EIP-155 worked example.
    const EXAMPLE_KEY: &str = "0x4646464646464646464646464646464646464646464646464646464646464646";

    #[test]
    fn test_address_derivation() {
        let wallet = Wallet::from_hex(EXAMPLE_KEY).unwrap();
        assert_eq!(
            wallet.address(),
            Address::from_str("0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f").unwrap()
        );
    }

    #[test]
    fn test_eip155_signed_transfer() {
        let wallet = Wallet::from_hex(EXAMPLE_KEY).unwrap();
        let tx = TransferTx {
            nonce: 9,
            gas_price: 20_000_000_000,
            gas_limit: 21000,
            to: Address::from_str("0x3535353535353535353535353535353535353535").unwrap(),
            value: 1_000_000_000_000_000_000,
            chain_id: 1,
        };

        let raw = wallet.sign_transfer(&tx).unwrap();
        let expected = "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83";
        assert_eq!(hex::encode(raw), expected);
    }

    #[test]
    fn test_rejects_bad_keys() {
        assert!(Wallet::from_hex("0x1234").is_err());
        assert!(Wallet::from_hex("not-hex").is_err());
        // the curve order is not a valid scalar
        assert!(Wallet::from_hex(
            "0xfffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        )
        .is_err());
    }

    #[test]
    fn test_accepts_unprefixed_key() {
        let wallet = Wallet::from_hex(EXAMPLE_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(
            wallet.address(),
            Address::from_str("0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f").unwrap()
        );
    }
}
