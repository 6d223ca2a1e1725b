//! Packing of code bits into bytes.
//!
//! The packed stream begins with an 8 bit field giving the number of zero bits
//! appended at the end to reach a byte boundary.  The field and the code bits are
//! one bit stream, most significant bit first in each byte.

use bit_vec::BitVec;
use crate::Error;

/// number of zero bits needed to bring `bit_len` to a multiple of 8
pub fn pad_count(bit_len: usize) -> u8 {
    ((8 - bit_len % 8) % 8) as u8
}

/// Prepend the padding header, append the padding, and emit bytes.
pub fn pack(payload: &BitVec) -> Vec<u8> {
    let pad = pad_count(payload.len());
    let mut bits = BitVec::from_bytes(&[pad]);
    bits.extend(payload.iter());
    bits.grow(pad as usize,false);
    log::trace!("packed {} code bits with {} bits of padding",payload.len(),pad);
    bits.to_bytes()
}

/// Recover the code bits, stripping exactly as many trailing bits as the header says.
pub fn unpack(dat: &[u8]) -> Result<BitVec,Error> {
    let (pad,payload) = match dat.split_first() {
        Some((pad,payload)) => (*pad,payload),
        None => return Err(Error::TruncatedStream)
    };
    let mut bits = BitVec::from_bytes(payload);
    if pad > 7 || pad as usize > bits.len() {
        return Err(Error::BadPadding(pad));
    }
    bits.truncate(bits.len() - pad as usize);
    Ok(bits)
}

#[cfg(test)]
fn bits(s: &str) -> BitVec {
    s.chars().map(|c| c=='1').collect()
}

#[test]
fn padding_law() {
    for len in 0..40 {
        let pad = pad_count(len) as usize;
        assert!(pad < 8);
        assert_eq!((len + pad) % 8,0);
        assert_eq!(pad,(8 - len % 8) % 8);
    }
}

#[test]
fn packing_works() {
    let packed = pack(&bits("01101110100010101101110"));
    assert_eq!(packed,hex::decode("016E8ADC").unwrap());
    let packed = pack(&bits("0000"));
    assert_eq!(packed,hex::decode("0400").unwrap());
    // already aligned, no padding at all
    let packed = pack(&bits("11110000"));
    assert_eq!(packed,hex::decode("00F0").unwrap());
}

#[test]
fn unpacking_works() {
    let unpacked = unpack(&hex::decode("016E8ADC").unwrap()).expect("unpack failed");
    assert_eq!(unpacked,bits("01101110100010101101110"));
    // zero padding must keep the whole last byte
    let unpacked = unpack(&hex::decode("00F0").unwrap()).expect("unpack failed");
    assert_eq!(unpacked,bits("11110000"));
    let unpacked = unpack(&hex::decode("0400").unwrap()).expect("unpack failed");
    assert_eq!(unpacked,bits("0000"));
}

#[test]
fn bad_streams() {
    assert!(matches!(unpack(&[]),Err(Error::TruncatedStream)));
    assert!(matches!(unpack(&[9,0]),Err(Error::BadPadding(9))));
    assert!(matches!(unpack(&[3]),Err(Error::BadPadding(3))));
    assert_eq!(unpack(&[0]).expect("unpack failed").len(),0);
}
