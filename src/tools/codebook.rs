//! Code tables derived from the Huffman tree.
//!
//! The forward table maps each symbol to its bit string, the reverse table maps
//! bit strings back to symbols.  Both are filled in the same walk of the tree.

use std::collections::{BTreeMap,HashMap};
use bit_vec::BitVec;
use crate::tools::frequency::FrequencyTable;
use crate::tools::tree::{self,Node};
use crate::Error;

/// Forward and reverse code tables for one frequency table
#[derive(Clone,Debug)]
pub struct Codebook {
    codes: BTreeMap<char,BitVec>,
    reverse: HashMap<BitVec,char>,
    /// length of the longest code, no match is possible beyond this
    max_len: usize
}

impl Codebook {
    /// Walk the tree with an explicit stack, 0 means left and 1 means right.
    /// When the root itself is a leaf the lone symbol is given the code `0`.
    pub fn generate(root: &Node) -> Self {
        let mut codes = BTreeMap::new();
        let mut reverse = HashMap::new();
        let mut max_len: usize = 0;
        let mut stack: Vec<(&Node,BitVec)> = vec![(root,BitVec::new())];
        while let Some((node,path)) = stack.pop() {
            match node {
                Node::Leaf { symbol, .. } => {
                    let code = match path.is_empty() {
                        true => BitVec::from_elem(1,false),
                        false => path
                    };
                    max_len = max_len.max(code.len());
                    reverse.insert(code.clone(),*symbol);
                    codes.insert(*symbol,code);
                },
                Node::Branch { left, right, .. } => {
                    let mut right_path = path.clone();
                    right_path.push(true);
                    let mut left_path = path;
                    left_path.push(false);
                    // left goes on top so the walk is pre-order
                    stack.push((&**right,right_path));
                    stack.push((&**left,left_path));
                }
            }
        }
        Self {
            codes,
            reverse,
            max_len
        }
    }
    /// Build the tree and derive the codes in one step
    pub fn from_frequencies(freq: &FrequencyTable) -> Result<Self,Error> {
        let root = tree::build(freq)?;
        Ok(Self::generate(&root))
    }
    pub fn len(&self) -> usize {
        self.codes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
    pub fn code(&self,symbol: char) -> Option<&BitVec> {
        self.codes.get(&symbol)
    }
    pub fn symbol(&self,code: &BitVec) -> Option<char> {
        self.reverse.get(code).copied()
    }
    /// length in bits of the longest code
    pub fn max_len(&self) -> usize {
        self.max_len
    }
    /// Codes for display, ordered by symbol, bits written as `0` and `1`
    pub fn list_codes(&self) -> Vec<(char,String)> {
        self.codes.iter().map(|(c,code)| {
            (*c,code.iter().map(|b| if b { '1' } else { '0' }).collect())
        }).collect()
    }
    /// Concatenate the codes of each symbol in document order
    pub fn encode(&self,text: &str) -> Result<BitVec,Error> {
        let mut ans = BitVec::new();
        for c in text.chars() {
            let code = self.codes.get(&c).ok_or(Error::UnknownSymbol(c))?;
            ans.extend(code.iter());
        }
        Ok(ans)
    }
    /// Accumulate bits until they match a code, emit the symbol, start over.
    /// Bits left over at the end mean the stream was cut in the middle of a code,
    /// a buffer longer than every code means the stream is not from this table.
    pub fn decode<I>(&self,bits: I) -> Result<String,Error>
    where I: IntoIterator<Item=bool> {
        let mut ans = String::new();
        let mut curr = BitVec::new();
        for bit in bits {
            curr.push(bit);
            if let Some(c) = self.reverse.get(&curr) {
                ans.push(*c);
                curr.truncate(0);
            } else if curr.len() >= self.max_len {
                log::debug!("no code matches {} bits after {} symbols",curr.len(),ans.chars().count());
                return Err(Error::UndecodableStream);
            }
        }
        if !curr.is_empty() {
            log::debug!("{} bits left over after decoding",curr.len());
            return Err(Error::UndecodableStream);
        }
        Ok(ans)
    }
}

#[cfg(test)]
fn bits(s: &str) -> BitVec {
    s.chars().map(|c| c=='1').collect()
}

#[test]
fn abracadabra_codes() {
    let freq = FrequencyTable::compute("abracadabra").expect("empty");
    let book = Codebook::from_frequencies(&freq).expect("build failed");
    let expected: Vec<(char,String)> = [('a',"0"),('b',"110"),('c',"100"),('d',"101"),('r',"111")]
        .iter().map(|(c,s)| (*c,s.to_string())).collect();
    assert_eq!(book.list_codes(),expected);
    assert_eq!(book.symbol(&bits("101")),Some('d'));
    assert_eq!(book.symbol(&bits("10")),None);
    let encoded = book.encode("abracadabra").expect("encode failed");
    assert_eq!(encoded,bits("01101110100010101101110"));
    assert_eq!(book.decode(encoded.iter()).expect("decode failed"),"abracadabra");
}

#[test]
fn prefix_free() {
    let text = "I am Sam. Sam I am. I do not like this Sam I am.\nI do not like green eggs and ham!";
    let freq = FrequencyTable::compute(text).expect("empty");
    let book = Codebook::from_frequencies(&freq).expect("build failed");
    let list = book.list_codes();
    assert_eq!(list.len(),freq.len());
    assert_eq!(book.reverse.len(),book.len());
    for (c1,s1) in &list {
        assert!(!s1.is_empty());
        for (c2,s2) in &list {
            if c1 != c2 {
                assert!(!s2.starts_with(s1.as_str()),"{:?} is a prefix of {:?}",c1,c2);
            }
        }
    }
}

#[test]
fn single_symbol_gets_zero() {
    let freq = FrequencyTable::compute("aaaa").expect("empty");
    let book = Codebook::from_frequencies(&freq).expect("build failed");
    assert_eq!(book.list_codes(),vec![('a',"0".to_string())]);
    let encoded = book.encode("aaaa").expect("encode failed");
    assert_eq!(encoded,bits("0000"));
    assert_eq!(book.decode(encoded.iter()).expect("decode failed"),"aaaa");
}

#[test]
fn falsy_looking_symbols() {
    // symbols such as NUL or `0` are leaves like any other
    let text = "\u{0}0\u{0} 00";
    let freq = FrequencyTable::compute(text).expect("empty");
    let book = Codebook::from_frequencies(&freq).expect("build failed");
    assert_eq!(book.len(),3);
    let encoded = book.encode(text).expect("encode failed");
    assert_eq!(book.decode(encoded.iter()).expect("decode failed"),text);
}

#[test]
fn longest_code() {
    let freq = FrequencyTable::compute("abracadabra").expect("empty");
    assert_eq!(Codebook::from_frequencies(&freq).expect("build failed").max_len(),3);
    let freq = FrequencyTable::compute("aaaa").expect("empty");
    assert_eq!(Codebook::from_frequencies(&freq).expect("build failed").max_len(),1);
}

#[test]
fn foreign_bits_fail_fast() {
    // the lone code is `0`, a run of ones can never match and is rejected at the first bit
    let freq = FrequencyTable::compute("a").expect("empty");
    let book = Codebook::from_frequencies(&freq).expect("build failed");
    let mut count = 0;
    let ones = std::iter::repeat(true).take(1 << 24).inspect(|_| count += 1);
    assert!(matches!(book.decode(ones),Err(Error::UndecodableStream)));
    assert_eq!(count,1);
}

#[test]
fn partial_code_rejected() {
    let freq = FrequencyTable::compute("abracadabra").expect("empty");
    let book = Codebook::from_frequencies(&freq).expect("build failed");
    assert!(matches!(book.decode(bits("011011").iter()),Err(Error::UndecodableStream)));
    assert!(matches!(book.encode("abz"),Err(Error::UnknownSymbol('z'))));
}
