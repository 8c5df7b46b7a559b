//! Code tables: the symbol to bit string mapping used by the encoder, and the bit string to
//! symbol mapping used by the decoder.
//!
//! Codes are read off the tree by walking it depth first, adding a 0 for each step to a left
//! child and a 1 for each step to a right child. A tree with a single leaf gives that symbol the
//! empty code.
//!
use log::trace;
use rustc_hash::FxHashMap;

use std::fmt::{Display, Formatter};
use std::io;
use std::str::FromStr;

use super::huffman::{build_tree, HuffmanTree, NodeData};
use crate::tools::freq_count::FreqTable;

/// A Huffman code: a sequence of bits, each 0 or 1, first bit first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code {
    bits: Vec<u8>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bit. Panics on anything but 0 or 1.
    pub fn push(&mut self, bit: u8) {
        assert!(bit <= 1, "hzip: invalid bit {}", bit);
        self.bits.push(bit);
    }

    pub fn pop(&mut self) -> Option<u8> {
        self.bits.pop()
    }

    pub fn clear(&mut self) {
        self.bits.clear()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    /// True if self is a (not necessarily proper) prefix of other.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.bits
            .iter()
            .try_for_each(|&b| write!(f, "{}", b))
    }
}

impl FromStr for Code {
    type Err = io::Error;

    /// Parse a string of '0' and '1' characters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .bytes()
            .map(|b| match b {
                b'0' => Ok(0),
                b'1' => Ok(1),
                other => Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("invalid bit {:?}", other as char),
                )),
            })
            .collect::<Result<Vec<u8>, io::Error>>()?;
        Ok(Self { bits })
    }
}

/// Both directions of a symbol <-> code bijection.
#[derive(Clone, Debug)]
pub struct CodeTable {
    /// Indexed by symbol.
    codes: Vec<Option<Code>>,
    /// Keyed by the exact bit string.
    symbols: FxHashMap<Code, u8>,
}

impl CodeTable {
    /// An empty table. Use insert() to fill it from a header.
    pub fn new() -> Self {
        Self {
            codes: vec![None; 256],
            symbols: FxHashMap::default(),
        }
    }

    /// Derive the codes for every leaf of the tree. No tree gives an empty table.
    pub fn from_tree(tree: Option<&HuffmanTree>) -> Self {
        let mut table = Self::new();
        if let Some(tree) = tree {
            let mut code = Code::new();
            table.walk(tree, tree.root(), &mut code);
        }
        table
    }

    /// Build the tree for the frequencies and derive its codes.
    pub fn from_freqs(freqs: &FreqTable) -> Self {
        Self::from_tree(build_tree(freqs).as_ref())
    }

    /// Recursively walk the tree, recording the path to each leaf as its code.
    fn walk(&mut self, tree: &HuffmanTree, idx: usize, code: &mut Code) {
        match tree.node(idx).node_data {
            NodeData::Kids(left, right) => {
                code.push(0);
                self.walk(tree, left, code);
                code.pop();
                code.push(1);
                self.walk(tree, right, code);
                code.pop();
            }
            NodeData::Leaf(sym) => {
                trace!("symbol {:#04x} gets code '{}'", sym, code);
                self.insert(sym, code.clone());
            }
        }
    }

    /// Record a symbol and its code in both directions.
    pub fn insert(&mut self, symbol: u8, code: Code) {
        if let Some(old) = self.codes[symbol as usize].take() {
            self.symbols.remove(&old);
        }
        self.symbols.insert(code.clone(), symbol);
        self.codes[symbol as usize] = Some(code);
    }

    /// The code for a symbol, if the symbol is in the alphabet.
    pub fn code(&self, symbol: u8) -> Option<&Code> {
        self.codes[symbol as usize].as_ref()
    }

    /// The symbol for an exact bit string, if there is one.
    pub fn lookup(&self, code: &Code) -> Option<u8> {
        self.symbols.get(code).copied()
    }

    /// Alphabet size.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate (symbol, code) in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(sym, code)| code.as_ref().map(|c| (sym as u8, c)))
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::new()
    }
}
