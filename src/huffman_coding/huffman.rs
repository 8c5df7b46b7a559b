use log::trace;

use crate::tools::freq_count::FreqTable;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// What a node holds: either two children (arena indices) or a symbol.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum NodeData {
    Kids(usize, usize),
    Leaf(u8),
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Node {
    pub weight: u64,
    pub node_data: NodeData,
}

impl Node {
    /// Create a new node
    pub fn new(weight: u64, node_data: NodeData) -> Node {
        Node { weight, node_data }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.node_data, NodeData::Leaf(_))
    }
}

/// A Huffman tree stored as an arena. Leaves come first, in ascending symbol order, followed by
/// the internal nodes in the order they were merged. The root is always the last node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
}

impl HuffmanTree {
    /// Index of the root node.
    pub fn root(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of leaves, which is the alphabet size.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }
}

/// Build a Huffman tree from the symbol frequencies. Returns None when the table is empty.
///
/// The two lightest nodes are merged until one remains. Equal weights are resolved by arena
/// index, lowest first: leaves by ascending symbol, then merged nodes oldest first. The first
/// node taken off the heap becomes the left (0) child.
pub fn build_tree(freqs: &FreqTable) -> Option<HuffmanTree> {
    let mut nodes: Vec<Node> = freqs
        .symbols()
        .map(|(sym, weight)| Node::new(weight, NodeData::Leaf(sym)))
        .collect();
    if nodes.is_empty() {
        return None;
    }

    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| Reverse((node.weight, idx)))
        .collect();

    while heap.len() > 1 {
        // The loop condition guarantees both pops succeed
        let (Some(Reverse((left_weight, left))), Some(Reverse((right_weight, right)))) =
            (heap.pop(), heap.pop())
        else {
            break;
        };
        let weight = left_weight + right_weight;
        nodes.push(Node::new(weight, NodeData::Kids(left, right)));
        trace!("merged nodes {} and {} into {} (weight {})", left, right, nodes.len() - 1, weight);
        heap.push(Reverse((weight, nodes.len() - 1)));
    }

    Some(HuffmanTree { nodes })
}
