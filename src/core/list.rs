use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Handle to a live node inside a [`DepList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly linked list backed by an arena of slots.
///
/// `head` and `tail` are tracked explicitly; freed slots are recycled through
/// `free`. Used for dependency sets, where `insert_unique` keeps every element
/// distinct.
#[derive(Clone)]
pub struct DepList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> DepList<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head.map(NodeId)
    }

    pub fn tail(&self) -> Option<NodeId> {
        self.tail.map(NodeId)
    }

    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|idx| self.node(idx)).map(|n| &n.value)
    }

    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|idx| self.node(idx)).map(|n| &n.value)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.node(id.0).map(|n| &n.value)
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.node(id.0).and_then(|n| n.next).map(NodeId)
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.node(id.0).and_then(|n| n.prev).map(NodeId)
    }

    fn node(&self, idx: usize) -> Option<&Node<T>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<T>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn alloc(&mut self, node: Node<T>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    /// O(1) insert at the head.
    pub fn push_front(&mut self, value: T) -> NodeId {
        let old_head = self.head;
        let idx = self.alloc(Node {
            value,
            prev: None,
            next: old_head,
        });

        match old_head.and_then(|h| self.node_mut(h)) {
            Some(head) => head.prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        self.len += 1;
        NodeId(idx)
    }

    pub fn push_back(&mut self, value: T) -> NodeId {
        let old_tail = self.tail;
        let idx = self.alloc(Node {
            value,
            prev: old_tail,
            next: None,
        });

        match old_tail.and_then(|t| self.node_mut(t)) {
            Some(tail) => tail.next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
        NodeId(idx)
    }

    /// Unlinks `id` and returns its value together with the node that
    /// followed it.
    fn unlink(&mut self, id: NodeId) -> Option<(T, Option<NodeId>)> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);

        match node.prev {
            Some(p) => {
                if let Some(prev) = self.node_mut(p) {
                    prev.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => {
                if let Some(next) = self.node_mut(n) {
                    next.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }

        self.len -= 1;
        if self.len == 0 {
            self.slots.clear();
            self.free.clear();
        }
        Some((node.value, node.next.map(NodeId)))
    }

    /// Detaches `id`, hands its element to `dispose` and returns the node that
    /// logically followed it. A stale id is a no-op returning `None`.
    pub fn remove_node<F>(&mut self, id: NodeId, dispose: F) -> Option<NodeId>
    where
        F: FnOnce(T),
    {
        let (value, next) = self.unlink(id)?;
        dispose(value);
        next
    }

    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.head()?;
        self.unlink(head).map(|(value, _)| value)
    }

    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail()?;
        self.unlink(tail).map(|(value, _)| value)
    }

    /// Moves every element of `other` onto the end of `self`.
    pub fn append(&mut self, mut other: DepList<T>) {
        while let Some(value) = other.pop_front() {
            self.push_back(value);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }
}

impl<T: PartialEq> DepList<T> {
    pub fn contains(&self, value: &T) -> bool {
        self.iter().any(|v| v == value)
    }

    /// Appends `value` unless an equal element is already present. The
    /// candidate is consumed either way; a rejected duplicate is dropped here.
    pub fn insert_unique(&mut self, value: T) -> bool {
        if self.contains(&value) {
            return false;
        }
        self.push_back(value);
        true
    }
}

impl<T> Default for DepList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for DepList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for DepList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for DepList<T> {}

impl<T> From<Vec<T>> for DepList<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T> From<DepList<T>> for Vec<T> {
    fn from(list: DepList<T>) -> Self {
        list.into_iter().collect()
    }
}

impl<T> FromIterator<T> for DepList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut list = Self::with_capacity(iter.size_hint().0);
        for value in iter {
            list.push_back(value);
        }
        list
    }
}

pub struct Iter<'a, T> {
    list: &'a DepList<T>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor?)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> IntoIterator for &'a DepList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct IntoIter<T>(DepList<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len, Some(self.0.len))
    }
}

impl<T> IntoIterator for DepList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl<T: Serialize> Serialize for DepList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DepList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(DepList::from)
    }
}
