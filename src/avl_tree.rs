use std::cmp::{max, Ordering};
use std::fmt;
use std::mem;

use slab::Slab;

/// Three-way ordering that decides where an item lives in an [`AvlTree`].
///
/// The tree never looks at its items directly, so the same implementation backs
/// every index in the crate: each one only swaps the comparator. Any
/// `Fn(&T, &T) -> Ordering` closure is a comparator as well.
pub trait Comparator<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Orders items by their own `Ord` implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<T: Ord> Comparator<T> for NaturalOrder {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

type Link = Option<usize>;

#[derive(Debug)]
struct Node<T> {
    item: T,
    height: i32,
    left: Link,
    right: Link,
}

impl<T> Node<T> {
    fn new(item: T) -> Self {
        Node {
            item,
            height: 1,
            left: None,
            right: None,
        }
    }
}

/// Node storage. Nodes refer to each other by slab index, so there are no
/// parent pointers and no ownership cycles; a walk back up the tree is the
/// recursion unwinding.
#[derive(Debug)]
struct Arena<T>(Slab<Node<T>>);

impl<T> Arena<T> {
    fn height(&self, link: Link) -> i32 {
        link.map_or(0, |idx| self.0[idx].height)
    }

    fn update_height(&mut self, idx: usize) {
        let node = &self.0[idx];
        let height = max(self.height(node.left), self.height(node.right)) + 1;
        self.0[idx].height = height;
    }

    fn balance_factor(&self, idx: usize) -> i32 {
        let node = &self.0[idx];
        self.height(node.left) - self.height(node.right)
    }

    fn rotate_right(&mut self, idx: usize) -> usize {
        let Some(left) = self.0[idx].left else {
            return idx;
        };
        self.0[idx].left = self.0[left].right;
        self.update_height(idx);

        self.0[left].right = Some(idx);
        self.update_height(left);

        left
    }

    fn rotate_left(&mut self, idx: usize) -> usize {
        let Some(right) = self.0[idx].right else {
            return idx;
        };
        self.0[idx].right = self.0[right].left;
        self.update_height(idx);

        self.0[right].left = Some(idx);
        self.update_height(right);

        right
    }

    /// Restores the height invariant at `idx` and returns the new subtree root.
    fn rebalance(&mut self, idx: usize) -> usize {
        self.update_height(idx);
        let balance = self.balance_factor(idx);

        if balance > 1 {
            if let Some(left) = self.0[idx].left {
                if self.balance_factor(left) < 0 {
                    self.0[idx].left = Some(self.rotate_left(left));
                }
            }
            self.rotate_right(idx)
        } else if balance < -1 {
            if let Some(right) = self.0[idx].right {
                if self.balance_factor(right) > 0 {
                    self.0[idx].right = Some(self.rotate_right(right));
                }
            }
            self.rotate_left(idx)
        } else {
            idx
        }
    }

    fn insert<C: Comparator<T>>(&mut self, link: Link, item: T, comparator: &C) -> (usize, bool) {
        let Some(idx) = link else {
            return (self.0.insert(Node::new(item)), true);
        };

        let inserted = match comparator.compare(&item, &self.0[idx].item) {
            Ordering::Less => {
                let (child, inserted) = self.insert(self.0[idx].left, item, comparator);
                self.0[idx].left = Some(child);
                inserted
            }
            Ordering::Greater => {
                let (child, inserted) = self.insert(self.0[idx].right, item, comparator);
                self.0[idx].right = Some(child);
                inserted
            }
            // already present, the incoming item is dropped
            Ordering::Equal => false,
        };

        if inserted {
            (self.rebalance(idx), true)
        } else {
            (idx, false)
        }
    }

    fn remove<F>(&mut self, link: Link, seek: &mut F) -> (Link, Option<T>)
    where
        F: FnMut(&T) -> Ordering,
    {
        let Some(idx) = link else {
            return (None, None);
        };

        let removed = match seek(&self.0[idx].item) {
            Ordering::Less => {
                let (child, removed) = self.remove(self.0[idx].left, seek);
                self.0[idx].left = child;
                removed
            }
            Ordering::Greater => {
                let (child, removed) = self.remove(self.0[idx].right, seek);
                self.0[idx].right = child;
                removed
            }
            Ordering::Equal => return self.unlink(idx),
        };

        match removed {
            Some(item) => (Some(self.rebalance(idx)), Some(item)),
            None => (Some(idx), None),
        }
    }

    /// Takes the node at `idx` out of its subtree, returning whatever replaces it
    /// and the removed payload.
    fn unlink(&mut self, idx: usize) -> (Link, Option<T>) {
        match (self.0[idx].left, self.0[idx].right) {
            (Some(_), Some(right)) => {
                let (right, successor) = self.detach_min(right);
                self.0[idx].right = right;
                let item = self.transplant(idx, successor);
                (Some(self.rebalance(idx)), Some(item))
            }
            (child, None) | (None, child) => (child, Some(self.0.remove(idx).item)),
        }
    }

    /// Moves a whole payload into the node at `idx`, handing back the old one.
    /// Every two-child removal goes through here, whatever `T` is.
    fn transplant(&mut self, idx: usize, item: T) -> T {
        mem::replace(&mut self.0[idx].item, item)
    }

    fn detach_min(&mut self, idx: usize) -> (Link, T) {
        match self.0[idx].left {
            None => {
                let node = self.0.remove(idx);
                (node.right, node.item)
            }
            Some(left) => {
                let (left, item) = self.detach_min(left);
                self.0[idx].left = left;
                (Some(self.rebalance(idx)), item)
            }
        }
    }

    fn find<F>(&self, mut link: Link, mut seek: F) -> Option<usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        while let Some(idx) = link {
            link = match seek(&self.0[idx].item) {
                Ordering::Less => self.0[idx].left,
                Ordering::Greater => self.0[idx].right,
                Ordering::Equal => return Some(idx),
            };
        }
        None
    }

    /// Height of the subtree if every node satisfies the AVL invariant and has
    /// an accurate cached height.
    fn checked_height(&self, link: Link) -> Option<i32> {
        let Some(idx) = link else {
            return Some(0);
        };
        let node = &self.0[idx];
        let left = self.checked_height(node.left)?;
        let right = self.checked_height(node.right)?;
        let height = max(left, right) + 1;

        ((left - right).abs() <= 1 && node.height == height).then_some(height)
    }
}

/// Height-balanced binary search tree ordered by an injected [`Comparator`].
///
/// Items that compare equal are the same key: inserting a second one leaves the
/// tree untouched. Lookups take a closure returning how the wanted
/// key compares against the item it is shown, which lets callers search by key
/// without building a whole item.
pub struct AvlTree<T, C> {
    root: Link,
    nodes: Arena<T>,
    comparator: C,
}

impl<T, C> AvlTree<T, C> {
    pub fn new(comparator: C) -> Self {
        AvlTree {
            root: None,
            nodes: Arena(Slab::new()),
            comparator,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree, zero when empty.
    pub fn height(&self) -> usize {
        self.nodes.height(self.root) as usize
    }

    /// Whether every node's balance factor is within `-1..=1` and its cached
    /// height is correct.
    pub fn is_balanced(&self) -> bool {
        self.nodes.checked_height(self.root).is_some()
    }

    pub fn clear(&mut self) {
        self.nodes.0.clear();
        self.root = None;
    }

    pub fn get_by<F>(&self, seek: F) -> Option<&T>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.nodes
            .find(self.root, seek)
            .map(|idx| &self.nodes.0[idx].item)
    }

    /// Mutable access to a stored item.
    ///
    /// The caller must not change anything the comparator looks at, otherwise
    /// the item ends up in the wrong place and later lookups miss it.
    pub fn get_mut_by<F>(&mut self, seek: F) -> Option<&mut T>
    where
        F: FnMut(&T) -> Ordering,
    {
        let idx = self.nodes.find(self.root, seek)?;
        Some(&mut self.nodes.0[idx].item)
    }

    pub fn remove_by<F>(&mut self, mut seek: F) -> Option<T>
    where
        F: FnMut(&T) -> Ordering,
    {
        let (root, removed) = self.nodes.remove(self.root, &mut seek);
        self.root = root;
        removed
    }

    pub fn min(&self) -> Option<&T> {
        let mut idx = self.root?;
        while let Some(left) = self.nodes.0[idx].left {
            idx = left;
        }
        Some(&self.nodes.0[idx].item)
    }

    pub fn max(&self) -> Option<&T> {
        let mut idx = self.root?;
        while let Some(right) = self.nodes.0[idx].right {
            idx = right;
        }
        Some(&self.nodes.0[idx].item)
    }

    /// Leftmost item for which `pred` holds.
    ///
    /// `pred` must be monotone over the tree order: false for some prefix of
    /// the items and true for the rest. The walk follows a single root-to-leaf
    /// path, remembering the best candidate seen on the way down.
    pub fn first_where<P>(&self, mut pred: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        let mut link = self.root;
        let mut found = None;
        while let Some(idx) = link {
            let node = &self.nodes.0[idx];
            if pred(&node.item) {
                found = Some(&node.item);
                link = node.left;
            } else {
                link = node.right;
            }
        }
        found
    }

    /// Rightmost item for which `pred` holds; `pred` must be true for some
    /// prefix of the items and false for the rest.
    pub fn last_where<P>(&self, mut pred: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        let mut link = self.root;
        let mut found = None;
        while let Some(idx) = link {
            let node = &self.nodes.0[idx];
            if pred(&node.item) {
                found = Some(&node.item);
                link = node.right;
            } else {
                link = node.left;
            }
        }
        found
    }

    /// In-order iterator.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.nodes.0, self.root)
    }
}

impl<T, C: Comparator<T>> AvlTree<T, C> {
    /// Inserts `item`, returning false (and dropping it) if an equal item is
    /// already stored.
    pub fn insert(&mut self, item: T) -> bool {
        let (root, inserted) = self.nodes.insert(self.root, item, &self.comparator);
        self.root = Some(root);
        inserted
    }

    /// Removes and returns the stored item equal to `key`.
    pub fn remove(&mut self, key: &T) -> Option<T> {
        let comparator = &self.comparator;
        let (root, removed) = self
            .nodes
            .remove(self.root, &mut |item: &T| comparator.compare(key, item));
        self.root = root;
        removed
    }

    pub fn get(&self, key: &T) -> Option<&T> {
        self.get_by(|item| self.comparator.compare(key, item))
    }

    pub fn contains(&self, key: &T) -> bool {
        self.get(key).is_some()
    }
}

impl<T, C: Default> Default for AvlTree<T, C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<T: fmt::Debug, C> fmt::Debug for AvlTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T, C> IntoIterator for &'a AvlTree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over an [`AvlTree`].
pub struct Iter<'a, T> {
    nodes: &'a Slab<Node<T>>,
    stack: Vec<usize>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn new(nodes: &'a Slab<Node<T>>, root: Link) -> Self {
        let mut iter = Iter {
            nodes,
            stack: Vec::new(),
            remaining: nodes.len(),
        };
        iter.push_left(root);
        iter
    }

    fn push_left(&mut self, mut link: Link) {
        while let Some(idx) = link {
            self.stack.push(idx);
            link = self.nodes[idx].left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let nodes = self.nodes;
        let node = &nodes[idx];
        self.push_left(node.right);
        self.remaining -= 1;
        Some(&node.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
