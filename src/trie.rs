//! The algorithms shared by sets, maps and their builders.
//!
//! Every function takes the depth of the node it is handed, since a node does not record
//! its own level. Functions that change a trie take `&mut Arc<Node<_>>` and go through
//! `Arc::make_mut`: nodes held only by the caller are edited in place, anything shared is
//! copied on the way down and the copy is edited instead.

use std::fmt;
use std::sync::Arc;

use crate::entry::Entry;
use crate::node::{clear_bit, popcount, set_bit, slot, test_bit, Branch, Bucket, Node, MAX_DEPTH};
use crate::trie_key::TrieKey;

/// Follows `hash` down from `node` to the bucket or mask-leaf it ends at.
fn descend<E>(mut node: &Node<E>, hash: u64, mut depth: u32) -> Option<&Node<E>> {
    loop {
        match node {
            Node::Branch(branch) => {
                let bit = slot(hash, depth);
                if !test_bit(branch.occ, bit) {
                    return None;
                }
                node = &branch.children[popcount(branch.occ, bit)];
                depth += 1;
            }
            terminal => return Some(terminal),
        }
    }
}

/// Returns the stored entry for `key`. Mask-leaves store no entries; query them with
/// [`contains`].
pub(crate) fn lookup<'a, E: Entry>(
    node: &'a Node<E>,
    key: &E::Key,
    hash: u64,
    depth: u32,
) -> Option<&'a E> {
    match descend(node, hash, depth)? {
        Node::Bucket(bucket) if bucket.hash == hash => {
            bucket.entries.iter().find(|entry| entry.key() == key)
        }
        _ => None,
    }
}

pub(crate) fn contains<E: Entry>(node: &Node<E>, key: &E::Key, hash: u64, depth: u32) -> bool {
    match descend(node, hash, depth) {
        Some(Node::Bucket(bucket)) => {
            bucket.hash == hash && bucket.entries.iter().any(|entry| entry.key() == key)
        }
        Some(Node::Mask(bits)) => hash < 64 && test_bit(*bits, hash as u32),
        _ => false,
    }
}

/// Inserts `entry` below `node`, replacing an entry with an equal key.
///
/// Returns `None` if the trie was left untouched (a set key that was already present),
/// otherwise whether the key is new. Shared nodes are copied only once the insert is known
/// to change something below them, so an untouched trie keeps its identity.
pub(crate) fn insert<E: Entry>(
    node: &mut Arc<Node<E>>,
    entry: E,
    hash: u64,
    depth: u32,
) -> Option<bool> {
    let shared = Arc::get_mut(node).is_none();
    match node.as_ref() {
        Node::Bucket(bucket) if bucket.hash != hash => {
            let existing_hash = bucket.hash;
            let fresh = Arc::new(Node::bucket(hash, entry));
            *node = Arc::new(Node::pair(node.clone(), existing_hash, fresh, hash, depth));
            return Some(true);
        }
        Node::Bucket(bucket) => {
            if !E::HAS_PAYLOAD && bucket.entries.iter().any(|e| e.key() == entry.key()) {
                return None;
            }
        }
        Node::Mask(bits) if hash >= 64 => {
            let bits = *bits;
            *node = Node::from_mask(bits);
            return insert(node, entry, hash, depth);
        }
        Node::Mask(bits) => {
            if test_bit(*bits, hash as u32) {
                return None;
            }
        }
        Node::Branch(branch) if shared && test_bit(branch.occ, slot(hash, depth)) => {
            // Work on the child first; this node is copied only if the child changed.
            let idx = popcount(branch.occ, slot(hash, depth));
            let mut child = branch.children[idx].clone();
            let added = insert(&mut child, entry, hash, depth + 1)?;
            let Node::Branch(branch) = Arc::make_mut(node) else {
                unreachable!("branch changed kind while copying");
            };
            branch.children[idx] = child;
            if added {
                branch.count += 1;
            }
            return Some(added);
        }
        Node::Branch(_) => {}
    }

    match Arc::make_mut(node) {
        Node::Branch(branch) => {
            let bit = slot(hash, depth);
            let idx = popcount(branch.occ, bit);
            let added = if test_bit(branch.occ, bit) {
                insert(&mut branch.children[idx], entry, hash, depth + 1)?
            } else {
                branch.children.insert(idx, Arc::new(Node::bucket(hash, entry)));
                set_bit(&mut branch.occ, bit);
                true
            };
            if added {
                branch.count += 1;
            }
            Some(added)
        }
        Node::Bucket(bucket) => {
            match bucket.entries.iter_mut().find(|e| e.key() == entry.key()) {
                Some(existing) => {
                    *existing = entry;
                    Some(false)
                }
                None => {
                    // Equal hashes never split, however deep the bucket sits.
                    bucket.entries.push(entry);
                    Some(true)
                }
            }
        }
        Node::Mask(bits) => {
            set_bit(bits, hash as u32);
            Some(true)
        }
    }
}

/// Inserts at the root of a container or builder, returning whether the key is new.
///
/// For entries without a payload an existing key is left alone, so the trie is not
/// touched at all and keeps its identity.
pub(crate) fn insert_root<E: Entry>(root: &mut Option<Arc<Node<E>>>, entry: E) -> bool {
    let hash = entry.key().trie_hash();
    match root {
        None => {
            *root = Some(Arc::new(Node::bucket(hash, entry)));
            true
        }
        Some(node) => insert(node, entry, hash, 0).unwrap_or(false),
    }
}

enum Removed<E> {
    Kept(E),
    /// The node lost its last entry; the parent must drop it.
    Emptied(E),
}

/// Removes `key` from the root, returning its entry.
///
/// A branch left with nothing but a bucket under it is replaced by that bucket, so the
/// trie keeps the shape repeated insertion of the remaining entries would give it.
pub(crate) fn remove_root<E: Entry>(root: &mut Option<Arc<Node<E>>>, key: &E::Key) -> Option<E> {
    let hash = key.trie_hash();
    let node = root.as_mut()?;
    if !contains(node, key, hash, 0) {
        return None;
    }
    match remove(node, key, hash, 0) {
        Removed::Kept(entry) => Some(entry),
        Removed::Emptied(entry) => {
            *root = None;
            Some(entry)
        }
    }
}

// The key must be present.
fn remove<E: Entry>(node: &mut Arc<Node<E>>, key: &E::Key, hash: u64, depth: u32) -> Removed<E> {
    let mut collapse = None;
    let removed = match Arc::make_mut(node) {
        Node::Branch(branch) => {
            let bit = slot(hash, depth);
            let idx = popcount(branch.occ, bit);
            let entry = match remove(&mut branch.children[idx], key, hash, depth + 1) {
                Removed::Kept(entry) => entry,
                Removed::Emptied(entry) => {
                    branch.children.remove(idx);
                    clear_bit(&mut branch.occ, bit);
                    entry
                }
            };
            branch.count -= 1;
            match branch.children.as_slice() {
                [] => return Removed::Emptied(entry),
                [only] if matches!(only.as_ref(), Node::Bucket(_)) => collapse = Some(only.clone()),
                _ => {}
            }
            Removed::Kept(entry)
        }
        Node::Bucket(bucket) => {
            let Some(idx) = bucket.entries.iter().position(|e| e.key() == key) else {
                unreachable!("removing an absent key");
            };
            let entry = bucket.entries.swap_remove(idx);
            if bucket.entries.is_empty() {
                return Removed::Emptied(entry);
            }
            Removed::Kept(entry)
        }
        Node::Mask(bits) => {
            clear_bit(bits, hash as u32);
            let Some(entry) = E::from_mask_index(hash as u32) else {
                unreachable!("mask-leaf bit {hash} has no key");
            };
            if *bits == 0 {
                return Removed::Emptied(entry);
            }
            Removed::Kept(entry)
        }
    };
    if let Some(only) = collapse {
        *node = only;
    }
    removed
}

/// Merges two tries rooted at the same depth.
///
/// Children present on one side only are adopted as they are and children shared by
/// pointer are not visited, so the work done tracks how much the tries differ rather than
/// how big they are. When both sides hold the same key, `a`'s entry is kept.
pub(crate) fn union<E: Entry>(a: &Arc<Node<E>>, b: &Arc<Node<E>>, depth: u32) -> Arc<Node<E>> {
    if Arc::ptr_eq(a, b) {
        return a.clone();
    }
    match (a.as_ref(), b.as_ref()) {
        (Node::Mask(x), Node::Mask(y)) => {
            let bits = x | y;
            if bits == *x {
                a.clone()
            } else if bits == *y {
                b.clone()
            } else {
                Arc::new(Node::Mask(bits))
            }
        }
        (Node::Mask(bits), _) => union(&Node::from_mask(*bits), b, depth),
        (_, Node::Mask(bits)) => union(a, &Node::from_mask(*bits), depth),
        (Node::Branch(x), Node::Branch(y)) => merge_branches(a, x, b, y, depth),
        (Node::Bucket(bucket), _) => {
            let mut merged = b.clone();
            for entry in &bucket.entries {
                insert(&mut merged, entry.clone(), bucket.hash, depth);
            }
            merged
        }
        (_, Node::Bucket(bucket)) => {
            let mut merged = a.clone();
            for entry in &bucket.entries {
                if contains(&merged, entry.key(), bucket.hash, depth) {
                    continue;
                }
                insert(&mut merged, entry.clone(), bucket.hash, depth);
            }
            merged
        }
    }
}

fn merge_branches<E: Entry>(
    a: &Arc<Node<E>>,
    x: &Branch<E>,
    b: &Arc<Node<E>>,
    y: &Branch<E>,
    depth: u32,
) -> Arc<Node<E>> {
    let occ = x.occ | y.occ;
    let mut same_as_a = occ == x.occ;
    let mut same_as_b = occ == y.occ;
    let mut children = Vec::with_capacity(occ.count_ones() as usize);

    let mut rest = occ;
    while rest != 0 {
        let bit = rest.trailing_zeros();
        rest &= rest - 1;
        let child = match (x.child(bit), y.child(bit)) {
            (Some(left), Some(right)) => {
                let merged = union(left, right, depth + 1);
                same_as_a &= Arc::ptr_eq(&merged, left);
                same_as_b &= Arc::ptr_eq(&merged, right);
                merged
            }
            (Some(left), None) => left.clone(),
            (None, Some(right)) => right.clone(),
            (None, None) => unreachable!("bit {bit} set in neither branch"),
        };
        children.push(child);
    }

    if same_as_a {
        return a.clone();
    }
    if same_as_b {
        return b.clone();
    }
    Arc::new(Node::Branch(Branch::new(occ, children)))
}

/// Compares two tries by content.
///
/// Equal contents give equal shapes, so this walks both tries in lockstep, skipping
/// subtrees shared by pointer. Buckets compare as unordered collections; `same` decides
/// whether two entries with equal keys match.
pub(crate) fn equal<E, F>(a: &Arc<Node<E>>, b: &Arc<Node<E>>, same: &F) -> bool
where
    E: Entry,
    F: Fn(&E, &E) -> bool,
{
    if Arc::ptr_eq(a, b) {
        return true;
    }
    if a.count() != b.count() {
        return false;
    }
    match (a.as_ref(), b.as_ref()) {
        (Node::Mask(x), Node::Mask(y)) => x == y,
        (Node::Mask(bits), _) => equal(&Node::from_mask(*bits), b, same),
        (_, Node::Mask(bits)) => equal(a, &Node::from_mask(*bits), same),
        (Node::Branch(x), Node::Branch(y)) => {
            x.occ == y.occ
                && x
                    .children
                    .iter()
                    .zip(&y.children)
                    .all(|(left, right)| equal(left, right, same))
        }
        (Node::Bucket(x), Node::Bucket(y)) => {
            x.hash == y.hash
                && x.entries.iter().all(|left| {
                    y.entries
                        .iter()
                        .any(|right| left.key() == right.key() && same(left, right))
                })
        }
        _ => false,
    }
}

/// Builds a trie in one pass from hashed entries, partitioning on each level's hash slice
/// instead of inserting one entry at a time. Later duplicates replace earlier ones.
pub(crate) fn build<E: Entry>(entries: Vec<(u64, E)>, depth: u32) -> Option<Arc<Node<E>>> {
    let (first_hash, _) = entries.first()?;
    let first_hash = *first_hash;

    if entries.iter().all(|(hash, _)| *hash == first_hash) {
        let mut bucket: Vec<E> = Vec::with_capacity(entries.len());
        for (_, entry) in entries {
            match bucket.iter_mut().find(|e| e.key() == entry.key()) {
                Some(existing) => *existing = entry,
                None => bucket.push(entry),
            }
        }
        return Some(Arc::new(Node::Bucket(Bucket {
            hash: first_hash,
            entries: bucket,
        })));
    }

    debug_assert!(depth <= MAX_DEPTH);
    let mut groups: Vec<Vec<(u64, E)>> = (0..64).map(|_| Vec::new()).collect();
    for (hash, entry) in entries {
        groups[slot(hash, depth) as usize].push((hash, entry));
    }

    let mut occ = 0u64;
    let mut children = Vec::new();
    for (bit, group) in groups.into_iter().enumerate() {
        if let Some(child) = build(group, depth + 1) {
            set_bit(&mut occ, bit as u32);
            children.push(child);
        }
    }
    Some(Arc::new(Node::Branch(Branch::new(occ, children))))
}

/// Multi-line dump of a trie for diffing snapshots in test failures.
pub(crate) struct Rendered<'a, E>(pub(crate) &'a Node<E>);

impl<E: fmt::Debug> fmt::Display for Rendered<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self.0, None, 0, f)
    }
}

fn render<E: fmt::Debug>(
    node: &Node<E>,
    bit: Option<u32>,
    depth: usize,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    write!(f, "{:indent$}", "", indent = depth * 2)?;
    if let Some(bit) = bit {
        write!(f, "[{bit:2}] ")?;
    }
    match node {
        Node::Branch(branch) => {
            writeln!(f, "branch occ={:#018x} count={}", branch.occ, branch.count)?;
            let mut rest = branch.occ;
            for child in &branch.children {
                let bit = rest.trailing_zeros();
                rest &= rest - 1;
                render(child, Some(bit), depth + 1, f)?;
            }
            Ok(())
        }
        Node::Bucket(bucket) => {
            writeln!(f, "bucket hash={:#018x} {:?}", bucket.hash, bucket.entries)
        }
        Node::Mask(bits) => writeln!(f, "mask {bits:#066b}"),
    }
}
