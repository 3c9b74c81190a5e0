//! A 2-3 search tree over a dynamic ordering.
//!
//! Payloads live only in the leaves, all of which sit at the same depth.
//! Internal nodes carry two or three children plus cached references to
//! the maximum leaf of their left and middle subtrees; routing descends
//! on those cached leaves instead of duplicated keys. The ordering is
//! supplied by a per-tree comparator object which may consult external
//! state (the sweep-line status tree orders segments by their height at
//! a moving x-coordinate) and may refuse to order a pair, so every
//! comparing operation is fallible.
//!
//! Nodes are stored in an arena `Vec` and refer to each other by index,
//! which keeps the parent/child cycle out of the ownership graph. Freed
//! slots are recycled through a free list.

use std::cmp::Ordering;

use crate::Error;

/// Tree ordering relation. `Err` means the pair cannot be ordered in the
/// comparator's current state; tree operations propagate it to the
/// caller, which may adjust that state and retry.
pub trait TreeOrd<T> {
  fn try_cmp(&self, a: &T, b: &T) -> Result<Ordering, Error>;
}

/// Index of a node in the tree arena.
///
/// Ids are stable across lookups but are invalidated by any mutating
/// operation on the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Default, Clone, Copy)]
struct Internal {
  left: Option<NodeId>,
  mid: Option<NodeId>,
  right: Option<NodeId>,
  /// Maximum leaf of the left subtree.
  left_max: Option<NodeId>,
  /// Maximum leaf of the middle subtree.
  mid_max: Option<NodeId>,
}

#[derive(Debug)]
enum NodeKind<T> {
  Internal(Internal),
  Leaf(T),
}

#[derive(Debug)]
struct Node<T> {
  parent: Option<NodeId>,
  kind: NodeKind<T>,
}

enum Search {
  Found(NodeId),
  /// The internal node under which the payload would live.
  NotFound(NodeId),
}

pub struct TwoThreeTree<T, C> {
  arena: Vec<Option<Node<T>>>,
  free: Vec<usize>,
  root: NodeId,
  cmp: C,
}

impl<T, C: TreeOrd<T>> TwoThreeTree<T, C> {
  /// An empty tree: a childless root of height 1.
  pub fn new(cmp: C) -> TwoThreeTree<T, C> {
    let mut tree = TwoThreeTree {
      arena: Vec::new(),
      free: Vec::new(),
      root: NodeId(0),
      cmp,
    };
    tree.root = tree.alloc(Node {
      parent: None,
      kind: NodeKind::Internal(Internal::default()),
    });
    tree
  }

  pub fn comparator(&self) -> &C {
    &self.cmp
  }

  /// Order two payloads under the tree's comparator.
  pub fn try_cmp(&self, a: &T, b: &T) -> Result<Ordering, Error> {
    self.cmp.try_cmp(a, b)
  }

  /// Payload of a leaf.
  pub fn payload(&self, id: NodeId) -> &T {
    match &self.node(id).kind {
      NodeKind::Leaf(payload) => payload,
      NodeKind::Internal(_) => panic!("payload of internal node"),
    }
  }

  /// Number of leaves.
  pub fn len(&self) -> usize {
    self.count_leaves(Some(self.root))
  }

  pub fn is_empty(&self) -> bool {
    self.internal(self.root).left.is_none()
  }

  /// Number of nodes, internal ones included.
  pub fn node_count(&self) -> usize {
    self.count_nodes(Some(self.root))
  }

  /// Number of levels, counting the root and the leaf level. An empty
  /// tree has height 1.
  pub fn height(&self) -> usize {
    let mut count = 0;
    let mut nd = Some(self.root);
    while let Some(id) = nd {
      count += 1;
      nd = match &self.node(id).kind {
        NodeKind::Leaf(_) => None,
        NodeKind::Internal(int) => int.left,
      };
    }
    count
  }

  /// The leaf holding a payload equal to `target`, if any.
  pub fn search(&self, target: &T) -> Result<Option<NodeId>, Error> {
    Ok(match self.locate(target)? {
      Search::Found(leaf) => Some(leaf),
      Search::NotFound(_) => None,
    })
  }

  pub fn minimum(&self) -> Option<NodeId> {
    self.min_leaf_in(Some(self.root))
  }

  pub fn maximum(&self) -> Option<NodeId> {
    self.max_leaf_in(Some(self.root))
  }

  /// The next leaf in tree order. Purely structural: no comparisons.
  pub fn successor(&self, id: NodeId) -> Option<NodeId> {
    let mut nd = id;
    loop {
      let parent = self.node(nd).parent?;
      let int = self.internal(parent);
      let next = if int.left == Some(nd) {
        int.mid
      } else if int.mid == Some(nd) {
        int.right
      } else {
        None
      };
      match next {
        Some(subtree) => return self.min_leaf_in(Some(subtree)),
        None => nd = parent,
      }
    }
  }

  /// The previous leaf in tree order. Purely structural: no comparisons.
  pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
    let mut nd = id;
    loop {
      let parent = self.node(nd).parent?;
      let int = self.internal(parent);
      let prev = if int.right == Some(nd) {
        int.mid
      } else if int.mid == Some(nd) {
        int.left
      } else {
        None
      };
      match prev {
        Some(subtree) => return self.max_leaf_in(Some(subtree)),
        None => nd = parent,
      }
    }
  }

  /// All leaves `l` with `lo ≤ l ≤ hi`, in tree order.
  pub fn range(&self, lo: &T, hi: &T) -> Result<Vec<NodeId>, Error> {
    let mut out = Vec::new();
    for leaf in self.in_order() {
      let payload = self.payload(leaf);
      if self.cmp.try_cmp(payload, lo)? == Ordering::Less {
        continue;
      }
      if self.cmp.try_cmp(payload, hi)? == Ordering::Greater {
        break;
      }
      out.push(leaf);
    }
    Ok(out)
  }

  /// All leaves in tree order.
  pub fn in_order(&self) -> Vec<NodeId> {
    let mut out = Vec::new();
    self.collect_in_order(Some(self.root), &mut out);
    out
  }

  /// Insert a payload, returning its leaf. If an equal payload is
  /// already present its leaf is returned and the tree is unchanged.
  pub fn insert(&mut self, obj: T) -> Result<NodeId, Error> {
    let parent = match self.locate(&obj)? {
      Search::Found(leaf) => return Ok(leaf),
      Search::NotFound(parent) => parent,
    };
    let leaf = self.alloc(Node {
      parent: Some(parent),
      kind: NodeKind::Leaf(obj),
    });

    let mut split = match self.attach_leaf(parent, leaf) {
      Ok(split) => split,
      Err(err) => {
        // Comparisons in attach_leaf run before any relinking, so the
        // tree is untouched; only the fresh leaf needs reclaiming.
        self.release(leaf);
        return Err(err);
      }
    };
    if split.is_none() {
      self.refresh_max_to_root(parent);
      return Ok(leaf);
    }

    // An internal node was added next to `base`; push the split upward.
    let mut base = parent;
    while let Some(extra) = split {
      match self.node(base).parent {
        None => {
          // The root split: grow the tree by one level.
          let new_root = self.alloc(Node {
            parent: None,
            kind: NodeKind::Internal(Internal::default()),
          });
          self.node_mut(base).parent = Some(new_root);
          self.node_mut(extra).parent = Some(new_root);
          let int = self.internal_mut(new_root);
          int.left = Some(base);
          int.mid = Some(extra);
          self.root = new_root;
          self.refresh_max(new_root);
          split = None;
        }
        Some(target) => {
          let int = *self.internal(target);
          if int.right.is_none() {
            // Two children: adopt the new sibling next to `base`.
            self.node_mut(extra).parent = Some(target);
            let slot = self.internal_mut(target);
            if slot.left == Some(base) {
              slot.right = slot.mid;
              slot.mid = Some(extra);
            } else {
              slot.right = Some(extra);
            }
            self.refresh_max_to_root(target);
            split = None;
          } else {
            // Three children: split `target` as well.
            let left = int.left.ok_or(Error::BrokenTree)?;
            let mid = int.mid.ok_or(Error::BrokenTree)?;
            let right = int.right.ok_or(Error::BrokenTree)?;
            let next = if base == left {
              self.split_internal(target, left, extra, mid, right)
            } else if base == mid {
              self.split_internal(target, left, mid, extra, right)
            } else {
              self.split_internal(target, left, mid, right, extra)
            };
            base = target;
            split = Some(next);
          }
        }
      }
    }
    Ok(leaf)
  }

  /// Delete the leaf holding a payload equal to `obj`. Deleting an
  /// absent payload is a no-op.
  pub fn delete(&mut self, obj: &T) -> Result<(), Error> {
    let leaf = match self.locate(obj)? {
      Search::Found(leaf) => leaf,
      Search::NotFound(_) => return Ok(()),
    };
    let parent = self.node(leaf).parent.ok_or(Error::BrokenTree)?;
    self.detach_child(parent, leaf)?;
    self.release(leaf);

    let mut base = parent;
    loop {
      if self.child_count(base) >= 2 {
        self.refresh_max_to_root(base);
        return Ok(());
      }

      let Some(above) = self.node(base).parent else {
        // The root is down to at most one child.
        if let Some(child) = self.internal(base).left {
          if matches!(self.node(child).kind, NodeKind::Internal(_)) {
            // Collapse one level.
            self.node_mut(child).parent = None;
            self.release(base);
            self.root = child;
          }
        }
        self.refresh_max(self.root);
        return Ok(());
      };

      // `base` has a single child left: borrow from or merge into a
      // sibling, depending on the sibling's arity.
      let int = *self.internal(above);
      if int.left == Some(base) {
        let sibling = int.mid.ok_or(Error::BrokenTree)?;
        self.concat_left_to_right(base, sibling)?;
      } else if int.mid == Some(base) {
        let sibling = int.left.ok_or(Error::BrokenTree)?;
        self.concat_right_to_left(base, sibling)?;
      } else if int.right == Some(base) {
        let sibling = int.mid.ok_or(Error::BrokenTree)?;
        self.concat_right_to_left(base, sibling)?;
      } else {
        return Err(Error::BrokenTree);
      }
      base = above;
    }
  }

  /// Exchange the payloads of two leaves without rebalancing. The caller
  /// guarantees that tree order still holds under the comparator's
  /// current state afterwards.
  pub fn swap(&mut self, a: NodeId, b: NodeId) {
    if a == b {
      return;
    }
    let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
    let (head, tail) = self.arena.split_at_mut(hi);
    if let (Some(na), Some(nb)) = (head[lo].as_mut(), tail[0].as_mut()) {
      if let (NodeKind::Leaf(pa), NodeKind::Leaf(pb)) = (&mut na.kind, &mut nb.kind) {
        std::mem::swap(pa, pb);
      }
    }
  }

  /// Drop every leaf; the tree is a childless root again.
  pub fn remove_all(&mut self) {
    self.arena.clear();
    self.free.clear();
    self.root = self.alloc(Node {
      parent: None,
      kind: NodeKind::Internal(Internal::default()),
    });
  }

  /// Check the structural invariants: equal leaf depth, 2–3 children
  /// per internal node (root excepted), left-packed children, parent
  /// links consistent with child links, and accurate cached maxima.
  pub fn validate(&self) -> Result<(), Error> {
    let leaf_depth = self.height();
    self.validate_node(self.root, None, 1, leaf_depth)
  }

  // -- internals ---------------------------------------------------------

  fn alloc(&mut self, node: Node<T>) -> NodeId {
    match self.free.pop() {
      Some(idx) => {
        self.arena[idx] = Some(node);
        NodeId(idx)
      }
      None => {
        self.arena.push(Some(node));
        NodeId(self.arena.len() - 1)
      }
    }
  }

  fn release(&mut self, id: NodeId) {
    self.arena[id.0] = None;
    self.free.push(id.0);
  }

  fn node(&self, id: NodeId) -> &Node<T> {
    self.arena[id.0].as_ref().expect("dangling node id")
  }

  fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
    self.arena[id.0].as_mut().expect("dangling node id")
  }

  fn internal(&self, id: NodeId) -> &Internal {
    match &self.node(id).kind {
      NodeKind::Internal(int) => int,
      NodeKind::Leaf(_) => panic!("leaf where internal node expected"),
    }
  }

  fn internal_mut(&mut self, id: NodeId) -> &mut Internal {
    match &mut self.node_mut(id).kind {
      NodeKind::Internal(int) => int,
      NodeKind::Leaf(_) => panic!("leaf where internal node expected"),
    }
  }

  fn leaf_payload(&self, id: NodeId) -> Result<&T, Error> {
    match &self.node(id).kind {
      NodeKind::Leaf(payload) => Ok(payload),
      NodeKind::Internal(_) => Err(Error::BrokenTree),
    }
  }

  fn child_count(&self, id: NodeId) -> usize {
    let int = self.internal(id);
    [int.left, int.mid, int.right]
      .iter()
      .filter(|child| child.is_some())
      .count()
  }

  fn count_leaves(&self, nd: Option<NodeId>) -> usize {
    let Some(id) = nd else { return 0 };
    match &self.node(id).kind {
      NodeKind::Leaf(_) => 1,
      NodeKind::Internal(int) => {
        self.count_leaves(int.left) + self.count_leaves(int.mid) + self.count_leaves(int.right)
      }
    }
  }

  fn count_nodes(&self, nd: Option<NodeId>) -> usize {
    let Some(id) = nd else { return 0 };
    match &self.node(id).kind {
      NodeKind::Leaf(_) => 1,
      NodeKind::Internal(int) => {
        1 + self.count_nodes(int.left) + self.count_nodes(int.mid) + self.count_nodes(int.right)
      }
    }
  }

  fn min_leaf_in(&self, mut nd: Option<NodeId>) -> Option<NodeId> {
    loop {
      let id = nd?;
      match &self.node(id).kind {
        NodeKind::Leaf(_) => return Some(id),
        NodeKind::Internal(int) => nd = int.left,
      }
    }
  }

  fn max_leaf_in(&self, mut nd: Option<NodeId>) -> Option<NodeId> {
    loop {
      let id = nd?;
      match &self.node(id).kind {
        NodeKind::Leaf(_) => return Some(id),
        NodeKind::Internal(int) => nd = int.right.or(int.mid).or(int.left),
      }
    }
  }

  fn collect_in_order(&self, nd: Option<NodeId>, out: &mut Vec<NodeId>) {
    let Some(id) = nd else { return };
    match &self.node(id).kind {
      NodeKind::Leaf(_) => out.push(id),
      NodeKind::Internal(int) => {
        self.collect_in_order(int.left, out);
        self.collect_in_order(int.mid, out);
        self.collect_in_order(int.right, out);
      }
    }
  }

  /// Descend to the leaf equal to `target`, or to the internal node that
  /// would hold it.
  fn locate(&self, target: &T) -> Result<Search, Error> {
    if self.internal(self.root).left_max.is_none() {
      return Ok(Search::NotFound(self.root));
    }
    let mut parent = self.root;
    let mut nd = self.root;
    loop {
      match &self.node(nd).kind {
        NodeKind::Leaf(payload) => {
          return Ok(if self.cmp.try_cmp(payload, target)? == Ordering::Equal {
            Search::Found(nd)
          } else {
            Search::NotFound(parent)
          });
        }
        NodeKind::Internal(int) => {
          let left_max = int.left_max.ok_or(Error::BrokenTree)?;
          parent = nd;
          if self.cmp.try_cmp(self.leaf_payload(left_max)?, target)? != Ordering::Less {
            nd = int.left.ok_or(Error::BrokenTree)?;
          } else {
            match int.mid_max {
              None => return Ok(Search::NotFound(nd)),
              Some(mid_max) => {
                if self.cmp.try_cmp(self.leaf_payload(mid_max)?, target)? != Ordering::Less {
                  nd = int.mid.ok_or(Error::BrokenTree)?;
                } else {
                  nd = int.right.or(int.mid).ok_or(Error::BrokenTree)?;
                }
              }
            }
          }
        }
      }
    }
  }

  /// Hang a fresh leaf under `target`, splitting `target` when it would
  /// get a fourth child. Returns the new sibling internal node if a
  /// split happened. Cached maxima are refreshed locally only; the
  /// caller refreshes the path to the root.
  fn attach_leaf(&mut self, target: NodeId, leaf: NodeId) -> Result<Option<NodeId>, Error> {
    if self.node(target).parent.is_none() {
      let int = *self.internal(target);
      // First leaf overall.
      if int.left.is_none() {
        self.internal_mut(target).left = Some(leaf);
        return Ok(None);
      }
      // Second leaf overall.
      if int.mid.is_none() {
        let only = int.left.ok_or(Error::BrokenTree)?;
        let ord = self
          .cmp
          .try_cmp(self.payload(leaf), self.leaf_payload(only)?)?;
        let slot = self.internal_mut(target);
        if ord != Ordering::Greater {
          slot.mid = slot.left;
          slot.left = Some(leaf);
        } else {
          slot.mid = Some(leaf);
        }
        return Ok(None);
      }
    }

    let int = *self.internal(target);
    let left = int.left.ok_or(Error::BrokenTree)?;
    let mid = int.mid.ok_or(Error::BrokenTree)?;
    let left_max = int.left_max.ok_or(Error::BrokenTree)?;
    let mid_max = int.mid_max.ok_or(Error::BrokenTree)?;

    let vs_left = self
      .cmp
      .try_cmp(self.payload(leaf), self.leaf_payload(left_max)?)?;
    if vs_left != Ordering::Greater {
      return Ok(match int.right {
        None => {
          self.set_children(target, leaf, left, mid);
          None
        }
        Some(right) => Some(self.split_internal(target, leaf, left, mid, right)),
      });
    }

    let vs_mid = self
      .cmp
      .try_cmp(self.payload(leaf), self.leaf_payload(mid_max)?)?;
    if vs_mid != Ordering::Greater {
      return Ok(match int.right {
        None => {
          self.set_children(target, left, leaf, mid);
          None
        }
        Some(right) => Some(self.split_internal(target, left, leaf, mid, right)),
      });
    }

    match int.right {
      None => {
        self.set_children(target, left, mid, leaf);
        Ok(None)
      }
      Some(right) => {
        let vs_right = self
          .cmp
          .try_cmp(self.payload(leaf), self.leaf_payload(right)?)?;
        if vs_right != Ordering::Greater {
          Ok(Some(self.split_internal(target, left, mid, leaf, right)))
        } else {
          Ok(Some(self.split_internal(target, left, mid, right, leaf)))
        }
      }
    }
  }

  fn set_children(&mut self, target: NodeId, left: NodeId, mid: NodeId, right: NodeId) {
    for child in [left, mid, right] {
      self.node_mut(child).parent = Some(target);
    }
    let int = self.internal_mut(target);
    int.left = Some(left);
    int.mid = Some(mid);
    int.right = Some(right);
    self.refresh_max(target);
  }

  /// Split a node with four would-be children `a ≤ b ≤ c ≤ d`: `target`
  /// keeps `(a, b)`, a fresh right sibling takes `(c, d)`.
  fn split_internal(
    &mut self,
    target: NodeId,
    a: NodeId,
    b: NodeId,
    c: NodeId,
    d: NodeId,
  ) -> NodeId {
    let sibling = self.alloc(Node {
      parent: self.node(target).parent,
      kind: NodeKind::Internal(Internal::default()),
    });
    for child in [c, d] {
      self.node_mut(child).parent = Some(sibling);
    }
    {
      let int = self.internal_mut(sibling);
      int.left = Some(c);
      int.mid = Some(d);
      int.right = None;
    }
    self.refresh_max(sibling);

    for child in [a, b] {
      self.node_mut(child).parent = Some(target);
    }
    {
      let int = self.internal_mut(target);
      int.left = Some(a);
      int.mid = Some(b);
      int.right = None;
    }
    self.refresh_max(target);
    sibling
  }

  /// Remove `child` from `parent`, packing the remaining children left.
  fn detach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
    let int = self.internal_mut(parent);
    if int.left == Some(child) {
      int.left = int.mid;
      int.mid = int.right;
      int.right = None;
    } else if int.mid == Some(child) {
      int.mid = int.right;
      int.right = None;
    } else if int.right == Some(child) {
      int.right = None;
    } else {
      return Err(Error::BrokenTree);
    }
    Ok(())
  }

  /// Repair a left child `base` holding a single child against its mid
  /// sibling: borrow the sibling's leftmost child if it has three, merge
  /// into it otherwise.
  fn concat_left_to_right(&mut self, base: NodeId, sibling: NodeId) -> Result<(), Error> {
    let only = self.internal(base).left.ok_or(Error::BrokenTree)?;
    match self.child_count(sibling) {
      2 => {
        self.node_mut(only).parent = Some(sibling);
        {
          let int = self.internal_mut(sibling);
          int.right = int.mid;
          int.mid = int.left;
          int.left = Some(only);
        }
        let parent = self.node(base).parent.ok_or(Error::BrokenTree)?;
        {
          let int = self.internal_mut(parent);
          int.left = Some(sibling);
          int.mid = int.right;
          int.right = None;
        }
        self.release(base);
        self.refresh_max(sibling);
        self.refresh_max(parent);
      }
      3 => {
        let borrowed = self.internal(sibling).left.ok_or(Error::BrokenTree)?;
        self.node_mut(borrowed).parent = Some(base);
        self.internal_mut(base).mid = Some(borrowed);
        {
          let int = self.internal_mut(sibling);
          int.left = int.mid;
          int.mid = int.right;
          int.right = None;
        }
        self.refresh_max(base);
        self.refresh_max(sibling);
      }
      _ => return Err(Error::BrokenTree),
    }
    Ok(())
  }

  /// Repair a mid or right child `base` holding a single child against
  /// the sibling on its left: borrow the sibling's rightmost child if it
  /// has three, merge into it otherwise.
  fn concat_right_to_left(&mut self, base: NodeId, sibling: NodeId) -> Result<(), Error> {
    let only = self.internal(base).left.ok_or(Error::BrokenTree)?;
    match self.child_count(sibling) {
      2 => {
        self.node_mut(only).parent = Some(sibling);
        self.internal_mut(sibling).right = Some(only);
        let parent = self.node(base).parent.ok_or(Error::BrokenTree)?;
        {
          let int = self.internal_mut(parent);
          if int.mid == Some(base) {
            int.mid = int.right;
          }
          int.right = None;
        }
        self.release(base);
        self.refresh_max(sibling);
        self.refresh_max(parent);
      }
      3 => {
        let borrowed = self.internal(sibling).right.ok_or(Error::BrokenTree)?;
        {
          let int = self.internal_mut(base);
          int.mid = int.left;
          int.left = Some(borrowed);
        }
        self.node_mut(borrowed).parent = Some(base);
        self.internal_mut(sibling).right = None;
        self.refresh_max(base);
        self.refresh_max(sibling);
      }
      _ => return Err(Error::BrokenTree),
    }
    Ok(())
  }

  fn refresh_max(&mut self, id: NodeId) {
    let (left, mid) = {
      let int = self.internal(id);
      (int.left, int.mid)
    };
    let left_max = self.max_leaf_in(left);
    let mid_max = self.max_leaf_in(mid);
    let int = self.internal_mut(id);
    int.left_max = left_max;
    int.mid_max = mid_max;
  }

  fn refresh_max_to_root(&mut self, start: NodeId) {
    let mut cur = Some(start);
    while let Some(id) = cur {
      self.refresh_max(id);
      cur = self.node(id).parent;
    }
  }

  fn validate_node(
    &self,
    id: NodeId,
    parent: Option<NodeId>,
    depth: usize,
    leaf_depth: usize,
  ) -> Result<(), Error> {
    if self.node(id).parent != parent {
      return Err(Error::BrokenTree);
    }
    match &self.node(id).kind {
      NodeKind::Leaf(_) => {
        if depth != leaf_depth {
          return Err(Error::BrokenTree);
        }
      }
      NodeKind::Internal(int) => {
        // Children pack leftward.
        if (int.mid.is_some() && int.left.is_none())
          || (int.right.is_some() && int.mid.is_none())
        {
          return Err(Error::BrokenTree);
        }
        if parent.is_some() && self.child_count(id) < 2 {
          return Err(Error::BrokenTree);
        }
        if int.left_max != self.max_leaf_in(int.left) || int.mid_max != self.max_leaf_in(int.mid)
        {
          return Err(Error::BrokenTree);
        }
        for child in [int.left, int.mid, int.right].into_iter().flatten() {
          self.validate_node(child, Some(id), depth + 1, leaf_depth)?;
        }
      }
    }
    Ok(())
  }
}
