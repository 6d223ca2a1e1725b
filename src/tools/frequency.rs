//! Symbol frequency analysis
//!
//! The frequency table is the only reconstruction data stored in a compressed file.
//! It is written as a JSON object mapping each symbol to its count.

use std::collections::BTreeMap;
use serde::{Serialize,Deserialize};
use crate::Error;

/// Count of each distinct symbol in a document.
/// Ordered by symbol value so that serialization and tree building are reproducible.
#[derive(Clone,Debug,PartialEq,Eq,Serialize,Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable(BTreeMap<char,u64>);

impl FrequencyTable {
    /// Count the symbols of `text`, which must not be empty.
    pub fn compute(text: &str) -> Result<Self,Error> {
        if text.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut counts = BTreeMap::new();
        for c in text.chars() {
            *counts.entry(c).or_insert(0) += 1;
        }
        Ok(Self(counts))
    }
    /// Sum of all counts, this is the symbol count of the document.
    pub fn total(&self) -> u64 {
        self.0.values().fold(0,|acc: u64,n| acc.saturating_add(*n))
    }
    /// number of distinct symbols
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn get(&self,symbol: char) -> Option<u64> {
        self.0.get(&symbol).copied()
    }
    /// iterate over (symbol,count) in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item=(char,u64)> + '_ {
        self.0.iter().map(|(c,n)| (*c,*n))
    }
    /// Compact JSON, escaping guarantees there is no raw newline in the result.
    pub fn to_json(&self) -> Result<String,Error> {
        Ok(serde_json::to_string(self)?)
    }
    /// Parse and validate the JSON metadata of a compressed file.
    pub fn from_json(dat: &[u8]) -> Result<Self,Error> {
        let ans: Self = serde_json::from_slice(dat)?;
        if ans.is_empty() {
            return Err(Error::EmptyAlphabet);
        }
        if let Some((c,_)) = ans.iter().find(|(_,n)| *n==0) {
            let e: serde_json::Error = serde::de::Error::custom(format!("symbol {:?} has a zero count",c));
            return Err(Error::MetadataParse(e));
        }
        Ok(ans)
    }
}

#[test]
fn counts_sum_to_length() {
    let text = "I am Sam. Sam I am. I do not like this Sam I am.\n";
    let freq = FrequencyTable::compute(text).expect("empty");
    assert_eq!(freq.total(),text.chars().count() as u64);
    assert_eq!(freq.get(' '),Some(13));
    assert_eq!(freq.get('S'),Some(3));
    assert_eq!(freq.get('z'),None);
}

#[test]
fn multibyte_symbols() {
    let freq = FrequencyTable::compute("héé→").expect("empty");
    assert_eq!(freq.len(),3);
    assert_eq!(freq.total(),4);
    assert_eq!(freq.get('é'),Some(2));
}

#[test]
fn empty_text_rejected() {
    assert!(matches!(FrequencyTable::compute(""),Err(Error::EmptyInput)));
}

#[test]
fn json_format() {
    let freq = FrequencyTable::compute("abracadabra").expect("empty");
    assert_eq!(freq.to_json().unwrap(),r#"{"a":5,"b":2,"c":1,"d":1,"r":2}"#);
    let freq = FrequencyTable::compute("a\nb\"").expect("empty");
    let json = freq.to_json().unwrap();
    assert!(!json.contains('\n'));
    assert_eq!(FrequencyTable::from_json(json.as_bytes()).unwrap(),freq);
}

#[test]
fn json_with_whitespace_accepted() {
    let freq = FrequencyTable::from_json(br#"{"a": 4, " ": 1}"#).expect("parse failed");
    assert_eq!(freq.get('a'),Some(4));
    assert_eq!(freq.get(' '),Some(1));
}

#[test]
fn bad_json_rejected() {
    assert!(matches!(FrequencyTable::from_json(b"not json"),Err(Error::MetadataParse(_))));
    assert!(matches!(FrequencyTable::from_json(br#"{"ab":1}"#),Err(Error::MetadataParse(_))));
    assert!(matches!(FrequencyTable::from_json(br#"{"a":-1}"#),Err(Error::MetadataParse(_))));
    assert!(matches!(FrequencyTable::from_json(br#"{"a":0,"b":2}"#),Err(Error::MetadataParse(_))));
    assert!(matches!(FrequencyTable::from_json(br#"["a",1]"#),Err(Error::MetadataParse(_))));
    assert!(matches!(FrequencyTable::from_json(b"{}"),Err(Error::EmptyAlphabet)));
}
