//! Static Huffman tree
//!
//! The tree is built once from a complete frequency table and never changes.
//! Ties between equal weights are broken by creation order: leaves are created
//! in ascending symbol order, then each branch is numbered as it is made.
//! Building twice from the same table therefore always gives the same tree.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use crate::tools::frequency::FrequencyTable;
use crate::Error;

/// Node of the Huffman tree, a branch owns both of its sons.
#[derive(Clone,Debug,PartialEq,Eq)]
pub enum Node {
    Leaf { symbol: char, weight: u64 },
    Branch { weight: u64, left: Box<Node>, right: Box<Node> }
}

impl Node {
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } => *weight,
            Node::Branch { weight, .. } => *weight
        }
    }
}

/// Node waiting in the priority queue, `seq` is the creation order
struct Pending {
    weight: u64,
    seq: usize,
    node: Node
}

impl PartialEq for Pending {
    fn eq(&self,other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl Ord for Pending {
    // reversed so that `BinaryHeap` pops the lightest, oldest node first
    fn cmp(&self,other: &Self) -> Ordering {
        other.weight.cmp(&self.weight).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self,other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Build the tree by repeatedly merging the two lightest nodes.
/// The first node popped becomes the left son.  A single symbol gives a tree
/// that is just one leaf.
pub fn build(freq: &FrequencyTable) -> Result<Node,Error> {
    let mut queue = BinaryHeap::with_capacity(freq.len());
    let mut seq: usize = 0;
    for (symbol,weight) in freq.iter() {
        queue.push(Pending { weight, seq, node: Node::Leaf { symbol, weight } });
        seq += 1;
    }
    loop {
        let left = queue.pop().ok_or(Error::EmptyAlphabet)?;
        let right = match queue.pop() {
            Some(right) => right,
            None => {
                log::trace!("tree complete with root weight {}",left.weight);
                return Ok(left.node);
            }
        };
        let weight = left.weight.saturating_add(right.weight);
        queue.push(Pending {
            weight,
            seq,
            node: Node::Branch { weight, left: Box::new(left.node), right: Box::new(right.node) }
        });
        seq += 1;
    }
}

#[test]
fn merge_order() {
    let freq = FrequencyTable::compute("abracadabra").expect("empty");
    let root = build(&freq).expect("build failed");
    assert_eq!(root.weight(),11);
    let leaf = |symbol,weight| Box::new(Node::Leaf { symbol, weight });
    let expected = Node::Branch {
        weight: 11,
        left: leaf('a',5),
        right: Box::new(Node::Branch {
            weight: 6,
            left: Box::new(Node::Branch { weight: 2, left: leaf('c',1), right: leaf('d',1) }),
            right: Box::new(Node::Branch { weight: 4, left: leaf('b',2), right: leaf('r',2) })
        })
    };
    assert_eq!(root,expected);
}

#[test]
fn single_symbol_is_leaf() {
    let freq = FrequencyTable::compute("aaaa").expect("empty");
    let root = build(&freq).expect("build failed");
    assert_eq!(root,Node::Leaf { symbol: 'a', weight: 4 });
}

#[test]
fn empty_table_rejected() {
    let freq = FrequencyTable::from_json(b"{}");
    assert!(matches!(freq,Err(Error::EmptyAlphabet)));
    let freq: FrequencyTable = serde_json::from_str("{}").unwrap();
    assert!(matches!(build(&freq),Err(Error::EmptyAlphabet)));
}

#[test]
fn deterministic() {
    let freq = FrequencyTable::compute("the quick brown fox jumps over the lazy dog").expect("empty");
    assert_eq!(build(&freq).unwrap(),build(&freq).unwrap());
}
