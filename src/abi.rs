//! Contract Call Codec
//! Minimal ABI encoding/decoding for the fixed marketplace + token method
//! set: keccak-256 selectors, 32-byte words, and dynamic strings/arrays.

use primitive_types::U256;
use sha3::{Digest, Keccak256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AbiError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("return data too short")]
    ShortData,
    #[error("invalid utf-8 in string return")]
    InvalidUtf8,
}

/// Call argument. Only the types the two contracts actually take.
#[derive(Debug, Clone)]
pub enum Token {
    Address(String),
    Uint(U256),
    Str(String),
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// First four bytes of the keccak of the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// topic0 of the ERC-721/ERC-20 Transfer event, "0x"-prefixed.
pub fn transfer_event_topic() -> String {
    format!("0x{}", hex::encode(keccak256(b"Transfer(address,address,uint256)")))
}

fn uint_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

fn address_word(addr: &str) -> Result<[u8; 32], AbiError> {
    let stripped = addr.trim().trim_start_matches("0x");
    let bytes = hex::decode(stripped).map_err(|_| AbiError::InvalidAddress(addr.to_string()))?;
    if bytes.len() != 20 {
        return Err(AbiError::InvalidAddress(addr.to_string()));
    }
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&bytes);
    Ok(word)
}

/// Encode `selector ++ head ++ tail` for a call with static and dynamic args.
pub fn encode_call(signature: &str, args: &[Token]) -> Result<Vec<u8>, AbiError> {
    let mut head: Vec<[u8; 32]> = Vec::with_capacity(args.len());
    let mut tail: Vec<u8> = Vec::new();
    let head_size = 32 * args.len();

    for arg in args {
        match arg {
            Token::Address(addr) => head.push(address_word(addr)?),
            Token::Uint(value) => head.push(uint_word(*value)),
            Token::Str(s) => {
                head.push(uint_word(U256::from(head_size + tail.len())));
                let bytes = s.as_bytes();
                tail.extend_from_slice(&uint_word(U256::from(bytes.len())));
                tail.extend_from_slice(bytes);
                // pad the payload to a word boundary
                let rem = bytes.len() % 32;
                if rem != 0 {
                    tail.extend(std::iter::repeat(0u8).take(32 - rem));
                }
            }
        }
    }

    let mut out = Vec::with_capacity(4 + head_size + tail.len());
    out.extend_from_slice(&selector(signature));
    for word in head {
        out.extend_from_slice(&word);
    }
    out.extend_from_slice(&tail);
    Ok(out)
}

fn read_word(data: &[u8], offset: usize) -> Result<U256, AbiError> {
    let end = offset.checked_add(32).ok_or(AbiError::ShortData)?;
    if end > data.len() {
        return Err(AbiError::ShortData);
    }
    Ok(U256::from_big_endian(&data[offset..end]))
}

fn word_as_usize(word: U256) -> Result<usize, AbiError> {
    if word > U256::from(u64::MAX) {
        return Err(AbiError::ShortData);
    }
    Ok(word.low_u64() as usize)
}

pub fn decode_uint(data: &[u8]) -> Result<U256, AbiError> {
    read_word(data, 0)
}

pub fn decode_bool(data: &[u8]) -> Result<bool, AbiError> {
    Ok(!read_word(data, 0)?.is_zero())
}

pub fn decode_string(data: &[u8]) -> Result<String, AbiError> {
    let offset = word_as_usize(read_word(data, 0)?)?;
    let len = word_as_usize(read_word(data, offset)?)?;
    let start = offset + 32;
    let end = start.checked_add(len).ok_or(AbiError::ShortData)?;
    if end > data.len() {
        return Err(AbiError::ShortData);
    }
    String::from_utf8(data[start..end].to_vec()).map_err(|_| AbiError::InvalidUtf8)
}

pub fn decode_uint_array(data: &[u8]) -> Result<Vec<U256>, AbiError> {
    let offset = word_as_usize(read_word(data, 0)?)?;
    let len = word_as_usize(read_word(data, offset)?)?;
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        out.push(read_word(data, offset + 32 + 32 * i)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_match_known_values() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn transfer_topic_matches_known_value() {
        assert_eq!(
            transfer_event_topic(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn encode_static_args() {
        let data = encode_call(
            "transfer(address,uint256)",
            &[
                Token::Address("0x00000000000000000000000000000000000000ff".to_string()),
                Token::Uint(U256::from(7u64)),
            ],
        )
        .unwrap();
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(data[35], 0xff);
        assert_eq!(data[67], 0x07);
    }

    #[test]
    fn encode_dynamic_string_places_offset_and_length() {
        let data = encode_call(
            "purchase(address,string)",
            &[
                Token::Address("0x0000000000000000000000000000000000000001".to_string()),
                Token::Str("ipfs://cid".to_string()),
            ],
        )
        .unwrap();
        let body = &data[4..];
        // offset word points past the two head words
        assert_eq!(U256::from_big_endian(&body[32..64]), U256::from(64u64));
        assert_eq!(U256::from_big_endian(&body[64..96]), U256::from(10u64));
        assert_eq!(&body[96..106], b"ipfs://cid");
        // padded to a full word
        assert_eq!(body.len(), 128);
    }

    #[test]
    fn string_roundtrip() {
        // return payload shape: offset, length, bytes
        let mut data = Vec::new();
        let mut word = [0u8; 32];
        U256::from(32u64).to_big_endian(&mut word);
        data.extend_from_slice(&word);
        U256::from(5u64).to_big_endian(&mut word);
        data.extend_from_slice(&word);
        data.extend_from_slice(b"hello");
        data.extend(std::iter::repeat(0u8).take(27));
        assert_eq!(decode_string(&data).unwrap(), "hello");
    }

    #[test]
    fn uint_array_roundtrip() {
        let mut data = Vec::new();
        let mut word = [0u8; 32];
        for value in [32u64, 2, 11, 22] {
            U256::from(value).to_big_endian(&mut word);
            data.extend_from_slice(&word);
        }
        let decoded = decode_uint_array(&data).unwrap();
        assert_eq!(decoded, vec![U256::from(11u64), U256::from(22u64)]);
    }

    #[test]
    fn short_data_is_an_error_not_a_panic() {
        assert!(decode_uint(&[0u8; 4]).is_err());
        assert!(decode_string(&[0u8; 16]).is_err());
    }
}
