//! Building blocks of the static Huffman codec.
//! These are used by the `huffman` module.

pub mod frequency;
pub mod tree;
pub mod codebook;
pub mod bit_packer;
