//! Binary space partition of a rectangle.
//!
//! Nodes live in an arena and refer to their children by index. The tree is
//! built depth-first (first child's subtree before the second's), so for a
//! fixed seed the random draws, and therefore the tree, are reproducible.

use crate::core::types::IVec2;
use crate::math::Rect;
use crate::random::RandomSource;

/// Index of a node inside a [`PartitionTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Axis a node was split along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitAxis {
    /// Split by height: first child is the lower band of rows
    Horizontal,
    /// Split by width: first child is the left band of columns
    Vertical,
}

/// A node of the partition tree. A node without children is a leaf.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionNode {
    pub rect: Rect,
    pub depth: u32,
    pub children: Option<[NodeId; 2]>,
    pub split: Option<SplitAxis>,
}

impl PartitionNode {
    fn leaf(rect: Rect, depth: u32) -> Self {
        Self { rect, depth, children: None, split: None }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Arena-backed binary partition tree.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionTree {
    nodes: Vec<PartitionNode>,
}

impl PartitionTree {
    /// Recursively split `root` until `max_depth` is reached or no axis is
    /// large enough to hold two `min_size` halves.
    ///
    /// At each node a coin flip picks the preferred axis (heads splits by
    /// height). If the preferred axis is too small the other one is tried;
    /// if neither fits the node stays a leaf. `min_size` is raised to at
    /// least one cell per axis, so no node is ever empty.
    pub fn build(
        root: Rect,
        max_depth: u32,
        min_size: IVec2,
        rng: &mut impl RandomSource,
    ) -> Self {
        let min_size = min_size.max(IVec2::ONE);
        let mut tree = Self { nodes: vec![PartitionNode::leaf(root, 0)] };

        // Explicit stack instead of recursion; pushing the second child first
        // keeps the draw order identical to a recursive depth-first build.
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let (rect, depth) = {
                let node = &tree.nodes[id.index()];
                (node.rect, node.depth)
            };

            let Some((axis, first, second)) = split_rect(rect, depth, max_depth, min_size, rng) else {
                continue;
            };

            let a = tree.push(PartitionNode::leaf(first, depth + 1));
            let b = tree.push(PartitionNode::leaf(second, depth + 1));
            let node = &mut tree.nodes[id.index()];
            node.children = Some([a, b]);
            node.split = Some(axis);

            stack.push(b);
            stack.push(a);
        }

        tree
    }

    fn push(&mut self, node: PartitionNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn root(&self) -> &PartitionNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &PartitionNode {
        &self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Leaves in pre-order (first child before second child).
    pub fn collect_leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            match self.node(id).children {
                None => leaves.push(id),
                Some([a, b]) => {
                    stack.push(b);
                    stack.push(a);
                }
            }
        }
        leaves
    }

    /// Leaf rectangles in pre-order.
    pub fn leaf_rects(&self) -> Vec<Rect> {
        self.collect_leaves().into_iter().map(|id| self.node(id).rect).collect()
    }

    /// Deepest node depth in the tree
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }
}

/// Decide whether and where to split a single rect.
fn split_rect(
    rect: Rect,
    depth: u32,
    max_depth: u32,
    min_size: IVec2,
    rng: &mut impl RandomSource,
) -> Option<(SplitAxis, Rect, Rect)> {
    if depth >= max_depth {
        return None;
    }
    // extent >= 2 * min, without the multiplication
    let can_split_height = rect.height / 2 >= min_size.y;
    let can_split_width = rect.width / 2 >= min_size.x;
    if !can_split_height && !can_split_width {
        return None;
    }

    let preferred = if rng.coin_flip() { SplitAxis::Horizontal } else { SplitAxis::Vertical };
    let axis = match preferred {
        SplitAxis::Horizontal if can_split_height => SplitAxis::Horizontal,
        SplitAxis::Horizontal => SplitAxis::Vertical,
        SplitAxis::Vertical if can_split_width => SplitAxis::Vertical,
        SplitAxis::Vertical => SplitAxis::Horizontal,
    };

    let (first, second) = match axis {
        SplitAxis::Horizontal => {
            let at = rng.range(min_size.y, rect.height - min_size.y);
            rect.split_horizontal(at)
        }
        SplitAxis::Vertical => {
            let at = rng.range(min_size.x, rect.width - min_size.x);
            rect.split_vertical(at)
        }
    };
    Some((axis, first, second))
}
