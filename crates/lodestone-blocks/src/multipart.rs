//! Multi-part rule trees: which geometry fragments apply given world context.

use crate::types::{Block, Direction};

/// Index of a geometry fragment inside the model provider's fragment table.
pub type ModelFragmentId = u16;

/// Predicate evaluated against the block adjacent in one direction.
#[derive(Clone, Debug, PartialEq)]
pub enum NeighborTest {
    Solid,
    Transparent,
    /// Exact state equality, id and property bits.
    Matches(Block),
    /// Same block id, any property bits.
    SameBlock,
}

/// One rule node; `All`/`Any` combine children, leaves test one neighbor.
#[derive(Clone, Debug, PartialEq)]
pub enum MultiPartRule {
    All(Vec<MultiPartRule>),
    Any(Vec<MultiPartRule>),
    Neighbor {
        dir: Direction,
        test: NeighborTest,
    },
}

/// One `when`/`apply` case of a multi-part definition.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiPartCase {
    /// `None` means the case always applies.
    pub when: Option<MultiPartRule>,
    pub apply: Vec<ModelFragmentId>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiPartDef {
    pub cases: Vec<MultiPartCase>,
}

/// World context the evaluator queries, one call per neighbor predicate.
/// Implemented over the world accessor by the mesh builder.
pub trait NeighborQuery {
    fn neighbor_block(&self, dir: Direction) -> Block;
    fn neighbor_solid(&self, dir: Direction) -> bool;
    fn neighbor_transparent(&self, dir: Direction) -> bool;
}

impl MultiPartRule {
    pub fn passes<Q: NeighborQuery + ?Sized>(&self, this: Block, q: &Q) -> bool {
        match self {
            MultiPartRule::All(rules) => rules.iter().all(|r| r.passes(this, q)),
            MultiPartRule::Any(rules) => rules.iter().any(|r| r.passes(this, q)),
            MultiPartRule::Neighbor { dir, test } => match test {
                NeighborTest::Solid => q.neighbor_solid(*dir),
                NeighborTest::Transparent => q.neighbor_transparent(*dir),
                NeighborTest::Matches(b) => q.neighbor_block(*dir) == *b,
                NeighborTest::SameBlock => q.neighbor_block(*dir).id == this.id,
            },
        }
    }
}

impl MultiPartDef {
    /// Collect the fragments of every case whose `when` clause passes.
    /// Cases without a `when` clause always contribute.
    pub fn applicable_fragments<Q: NeighborQuery + ?Sized>(
        &self,
        this: Block,
        q: &Q,
    ) -> Vec<ModelFragmentId> {
        let mut out = Vec::new();
        for case in &self.cases {
            let passes = match &case.when {
                None => true,
                Some(rule) => rule.passes(this, q),
            };
            if passes {
                out.extend_from_slice(&case.apply);
            }
        }
        out
    }
}
