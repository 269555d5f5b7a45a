//! The static weight-type taxonomy (spec §3, §4.1) and ticker classification.
//!
//! Modeled as a flat arena indexed by [`CategoryId`] rather than a boxed
//! recursive enum — `finplan_core::model::ids` prefers index newtypes over
//! object graphs throughout, and a flat `Vec` keeps the (small, fixed) tree
//! cache-friendly and trivially `Clone`.

use rustc_hash::FxHashSet;

use crate::error::ClassificationError;
use crate::model::ids::CategoryId;
use crate::model::subcode::{Subcode, Subcodes};

/// One node of the category tree: a name for diagnostics, the default
/// (pre-overlay) weight from spec §4.2's table, the subcode that attests
/// this node as a child of its parent (`None` for the root and for
/// pass-through grouping nodes such as "Not-Large"), and child indices.
#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub name: &'static str,
    pub default_weight: f64,
    code: Option<Subcode>,
    pub parent: Option<CategoryId>,
    pub children: Vec<CategoryId>,
}

impl CategoryNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The four level-1 category ids, resolved once per [`CategoryTree`].
#[derive(Debug, Clone, Copy)]
pub struct Level1Ids {
    pub stock: CategoryId,
    pub bond: CategoryId,
    pub cash: CategoryId,
    pub real_estate: CategoryId,
}

/// The full, immutable taxonomy. Built once via [`CategoryTree::standard`]
/// and shared by reference across every account of every portfolio in one
/// engine run.
#[derive(Debug, Clone)]
pub struct CategoryTree {
    nodes: Vec<CategoryNode>,
    root: CategoryId,
}

struct Builder {
    nodes: Vec<CategoryNode>,
}

impl Builder {
    fn push(
        &mut self,
        name: &'static str,
        default_weight: f64,
        code: Option<Subcode>,
        parent: Option<CategoryId>,
    ) -> CategoryId {
        let id = CategoryId(self.nodes.len() as u16);
        self.nodes.push(CategoryNode {
            name,
            default_weight,
            code,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0 as usize].children.push(id);
        }
        id
    }
}

impl CategoryTree {
    /// Builds the fixed taxonomy from spec §3/§4.2: root All Investments,
    /// four level-1 categories, and the Stock/Bond/Cash subtrees with the
    /// built-in default weights.
    #[must_use]
    pub fn standard() -> Self {
        use Subcode::*;

        let mut b = Builder { nodes: Vec::new() };
        let root = b.push("All Investments", 100.0, None, None);

        let stock = b.push("Stock", 50.0, Some(S), Some(root));
        let bond = b.push("Bond", 36.0, Some(B), Some(root));
        let cash = b.push("Cash", 10.0, Some(C), Some(root));
        b.push("Real Estate", 4.0, Some(R), Some(root));

        Self::build_stock_subtree(&mut b, stock);
        Self::build_bond_subtree(&mut b, bond);
        Self::build_cash_subtree(&mut b, cash);

        CategoryTree { nodes: b.nodes, root }
    }

    fn build_stock_subtree(b: &mut Builder, stock: CategoryId) {
        use Subcode::*;

        let domestic = b.push("Stock Domestic", 60.0, Some(D), Some(stock));
        let foreign = b.push("Stock Foreign", 40.0, Some(O), Some(stock));

        for region in [domestic, foreign] {
            let large = b.push("Large", 60.0, Some(L), Some(region));
            let not_large = b.push("Not-Large", 40.0, None, Some(region));

            let medium = b.push("Medium", 50.0, Some(M), Some(not_large));
            let small = b.push("Small", 50.0, Some(Z), Some(not_large));

            for size in [large, medium, small] {
                b.push("Growth and Value", 50.0, Some(G), Some(size));
                let go = b.push("Growth or Value", 50.0, Some(Y), Some(size));
                b.push("Growth", 40.0, Some(W), Some(go));
                b.push("Value", 60.0, Some(V), Some(go));
            }
        }
    }

    fn build_bond_subtree(b: &mut Builder, bond: CategoryId) {
        use Subcode::*;

        b.push("Bond Corporate", 12.5, Some(P), Some(bond));
        b.push("Bond Foreign", 7.0, Some(O), Some(bond));
        b.push("Bond Government", 0.0, Some(G), Some(bond));
        b.push("Bond High Yield", 5.0, Some(H), Some(bond));
        b.push("Bond Inflation Protected", 5.0, Some(N), Some(bond));
        b.push("Bond Mortgage", 8.0, Some(M), Some(bond));
        b.push("Bond Short", 50.0, Some(T), Some(bond));
        b.push("Bond Uncategorized", 12.5, Some(U), Some(bond));
    }

    fn build_cash_subtree(b: &mut Builder, cash: CategoryId) {
        use Subcode::*;

        b.push("Cash Government", 50.0, Some(G), Some(cash));
        b.push("Cash Uncategorized", 50.0, Some(U), Some(cash));
    }

    pub fn root(&self) -> CategoryId {
        self.root
    }

    /// The four level-1 node ids, in spec §3 declaration order.
    #[must_use]
    pub fn level1(&self) -> Level1Ids {
        let find = |name: &str| {
            self.node(self.root)
                .children
                .iter()
                .copied()
                .find(|&id| self.node(id).name == name)
                .unwrap_or_else(|| panic!("category tree missing level-1 node {name}"))
        };
        Level1Ids {
            stock: find("Stock"),
            bond: find("Bond"),
            cash: find("Cash"),
            real_estate: find("Real Estate"),
        }
    }

    /// Finds a node by its display name, for resolving a [`crate::model::DetailOverride`]'s
    /// textual category names. Linear scan: the tree has on the order of
    /// sixty nodes, and this only runs once per account during weight
    /// resolution, not in the allocator's hot path.
    pub fn find_by_name(&self, name: &str) -> Option<CategoryId> {
        self.nodes.iter().position(|n| n.name == name).map(|i| CategoryId(i as u16))
    }

    pub fn node(&self, id: CategoryId) -> &CategoryNode {
        &self.nodes[id.0 as usize]
    }

    /// Walks `id` up to whichever of the four level-1 nodes is its
    /// ancestor (or itself), for rolling per-ticker values up into
    /// per-category totals (closure pass, spec §4.6). Returns `None` only
    /// for the root itself, which sits above all four.
    pub fn level1_ancestor(&self, id: CategoryId, level1: Level1Ids) -> Option<CategoryId> {
        let targets = [level1.stock, level1.bond, level1.cash, level1.real_estate];
        let mut current = Some(id);
        while let Some(at) = current {
            if targets.contains(&at) {
                return Some(at);
            }
            current = self.node(at).parent;
        }
        None
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Classifies a ticker into the leaf (or, failing that, the deepest
    /// interior node) its subcodes attest, per spec §4.1: at each node,
    /// exactly one directly-coded child may match the ticker's subcode
    /// set; more than one match is a [`ClassificationError::ConflictingSubcodes`].
    /// Zero matches among coded children falls through into the single
    /// uncoded pass-through child if one exists (e.g. "Not-Large"),
    /// otherwise the ticker binds at the current node.
    ///
    /// The walk itself only ever looks at one node's direct children, so it
    /// can land on a leaf while leaving some of the ticker's other subcodes
    /// unconsumed. A leftover code that names a real node, but only ever
    /// under a *different* level-1 branch than the one just walked, still
    /// attests an incompatible combination (e.g. "S" and "T" together, per
    /// spec §4.1's example): a ticker cannot be both Stock and Bond Short.
    /// Such a code is reported the same as a same-node conflict.
    pub fn classify(&self, subcodes: &Subcodes) -> Result<CategoryId, ClassificationError> {
        if subcodes.is_empty() {
            return Ok(self.root);
        }
        let set: FxHashSet<Subcode> = subcodes.0.iter().filter_map(|c| *c).collect();
        let mut consumed = FxHashSet::default();
        let leaf = self.classify_from(self.root, &set, &mut consumed)?;

        let level1 = self.level1();
        let own_branch = self.level1_ancestor(leaf, level1);
        for code in set.difference(&consumed) {
            let mut occurrences = self
                .nodes
                .iter()
                .enumerate()
                .filter(|(_, n)| n.code == Some(*code))
                .map(|(i, _)| self.level1_ancestor(CategoryId(i as u16), level1))
                .peekable();
            let names_elsewhere = occurrences.peek().is_some() && occurrences.all(|branch| branch != own_branch);
            if names_elsewhere {
                return Err(ClassificationError::ConflictingSubcodes { at: self.root });
            }
        }

        Ok(leaf)
    }

    fn classify_from(
        &self,
        at: CategoryId,
        codes: &FxHashSet<Subcode>,
        consumed: &mut FxHashSet<Subcode>,
    ) -> Result<CategoryId, ClassificationError> {
        let node = self.node(at);

        let mut matched: Vec<CategoryId> = Vec::new();
        let mut pass_through: Option<CategoryId> = None;
        for &child in &node.children {
            match self.node(child).code {
                Some(code) if codes.contains(&code) => matched.push(child),
                Some(_) => {}
                None => pass_through = Some(child),
            }
        }

        match matched.len() {
            0 => match pass_through {
                Some(child) => self.classify_from(child, codes, consumed),
                None => Ok(at),
            },
            1 => {
                if let Some(code) = self.node(matched[0]).code {
                    consumed.insert(code);
                }
                self.classify_from(matched[0], codes, consumed)
            }
            _ => Err(ClassificationError::ConflictingSubcodes { at }),
        }
    }
}
