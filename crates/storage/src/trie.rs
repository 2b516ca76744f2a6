//! Radix (compressed-edge) trie keyed by UTF-8 strings
//!
//! Children are kept sorted by their first character, so a depth-first walk
//! yields keys in lexicographic order. Walks can be pruned by a guide
//! function that inspects the key accumulated so far.

/// Whether a walk should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep walking
    Continue,
    /// Stop the whole walk
    Stop,
}

/// Verdict of a walk guide on a partial key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guide {
    /// The key itself matches; descendants may also match
    Match,
    /// The key does not match, but a descendant might
    Descend,
    /// Neither the key nor any descendant can match
    Prune,
}

#[derive(Debug, Clone)]
struct Node<V> {
    label: String,
    value: Option<V>,
    children: Vec<Node<V>>,
}

impl<V> Node<V> {
    fn root() -> Self {
        Node {
            label: String::new(),
            value: None,
            children: Vec::new(),
        }
    }

    fn leaf(label: &str, value: V) -> Self {
        Node {
            label: label.to_string(),
            value: Some(value),
            children: Vec::new(),
        }
    }

    fn first_char(&self) -> char {
        self.label.chars().next().unwrap_or('\0')
    }

    fn child_index(&self, c: char) -> Result<usize, usize> {
        self.children.binary_search_by(|n| n.first_char().cmp(&c))
    }
}

/// Length in bytes of the longest common prefix, on a char boundary
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}

/// A radix trie mapping strings to values
#[derive(Debug, Clone)]
pub struct RadixTrie<V> {
    root: Node<V>,
    len: usize,
}

impl<V> Default for RadixTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RadixTrie<V> {
    /// Create an empty trie
    pub fn new() -> Self {
        RadixTrie {
            root: Node::root(),
            len: 0,
        }
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if there are no keys
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a key, returning the previous value
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let old = Self::insert_at(&mut self.root, key, value);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    fn insert_at(node: &mut Node<V>, key: &str, value: V) -> Option<V> {
        let first = match key.chars().next() {
            Some(c) => c,
            None => return node.value.replace(value),
        };
        match node.child_index(first) {
            Ok(i) => {
                let child = &mut node.children[i];
                let common = common_prefix_len(&child.label, key);
                if common == child.label.len() {
                    return Self::insert_at(child, &key[common..], value);
                }

                // Split the edge at the divergence point
                let tail = Node {
                    label: child.label[common..].to_string(),
                    value: child.value.take(),
                    children: std::mem::take(&mut child.children),
                };
                child.label.truncate(common);
                child.children.push(tail);
                if common == key.len() {
                    child.value = Some(value);
                } else {
                    child.children.push(Node::leaf(&key[common..], value));
                    child.children.sort_by_key(Node::first_char);
                }
                None
            }
            Err(i) => {
                node.children.insert(i, Node::leaf(key, value));
                None
            }
        }
    }

    /// Get a value by exact key
    pub fn get(&self, key: &str) -> Option<&V> {
        let mut node = &self.root;
        let mut rest = key;
        loop {
            let first = match rest.chars().next() {
                Some(c) => c,
                None => return node.value.as_ref(),
            };
            let i = node.child_index(first).ok()?;
            let child = &node.children[i];
            rest = rest.strip_prefix(child.label.as_str())?;
            node = child;
        }
    }

    /// Get a mutable value by exact key
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let mut node = &mut self.root;
        let mut rest = key;
        loop {
            let first = match rest.chars().next() {
                Some(c) => c,
                None => return node.value.as_mut(),
            };
            let i = node.child_index(first).ok()?;
            let child = &mut node.children[i];
            rest = rest.strip_prefix(child.label.as_str())?;
            node = child;
        }
    }

    /// True if the key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove a key, merging edges left with a single child
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let removed = Self::remove_at(&mut self.root, key);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    fn remove_at(node: &mut Node<V>, key: &str) -> Option<V> {
        let first = match key.chars().next() {
            Some(c) => c,
            None => return node.value.take(),
        };
        let i = node.child_index(first).ok()?;
        let child = &mut node.children[i];
        let rest = key.strip_prefix(child.label.as_str())?;
        let removed = Self::remove_at(child, rest)?;

        if child.value.is_none() {
            match child.children.len() {
                0 => {
                    node.children.remove(i);
                }
                1 => {
                    if let Some(grandchild) = child.children.pop() {
                        child.label.push_str(&grandchild.label);
                        child.value = grandchild.value;
                        child.children = grandchild.children;
                    }
                }
                _ => {}
            }
        }
        Some(removed)
    }

    /// Visit every key starting with `prefix`, in lexicographic order
    pub fn for_each_prefixed<F>(&self, prefix: &str, mut f: F)
    where
        F: FnMut(&str, &V) -> Visit,
    {
        let mut node = &self.root;
        let mut rest = prefix;
        let mut key = String::new();
        while let Some(first) = rest.chars().next() {
            let Ok(i) = node.child_index(first) else {
                return;
            };
            let child = &node.children[i];
            if let Some(r) = rest.strip_prefix(child.label.as_str()) {
                key.push_str(&child.label);
                rest = r;
                node = child;
            } else if child.label.starts_with(rest) {
                // The prefix ends inside this edge
                key.push_str(&child.label);
                node = child;
                rest = "";
            } else {
                return;
            }
        }
        Self::walk_all(node, &mut key, &mut f);
    }

    fn walk_all<F>(node: &Node<V>, key: &mut String, f: &mut F) -> Visit
    where
        F: FnMut(&str, &V) -> Visit,
    {
        if let Some(v) = &node.value {
            if f(key, v) == Visit::Stop {
                return Visit::Stop;
            }
        }
        for child in &node.children {
            let mark = key.len();
            key.push_str(&child.label);
            let visit = Self::walk_all(child, key, f);
            key.truncate(mark);
            if visit == Visit::Stop {
                return Visit::Stop;
            }
        }
        Visit::Continue
    }

    /// Visit every key in lexicographic order
    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&str, &V) -> Visit,
    {
        self.for_each_prefixed("", f)
    }

    /// Visit keys accepted by `guide`, pruning subtrees it rejects
    ///
    /// The guide sees the full key accumulated at each node. A subtree is
    /// skipped as soon as the guide returns [`Guide::Prune`].
    pub fn for_each_guided<G, F>(&self, mut guide: G, mut f: F)
    where
        G: FnMut(&str) -> Guide,
        F: FnMut(&str, &V) -> Visit,
    {
        let mut key = String::new();
        Self::walk_guided(&self.root, &mut key, &mut guide, &mut f);
    }

    fn walk_guided<G, F>(node: &Node<V>, key: &mut String, guide: &mut G, f: &mut F) -> Visit
    where
        G: FnMut(&str) -> Guide,
        F: FnMut(&str, &V) -> Visit,
    {
        match guide(key) {
            Guide::Prune => return Visit::Continue,
            Guide::Match => {
                if let Some(v) = &node.value {
                    if f(key, v) == Visit::Stop {
                        return Visit::Stop;
                    }
                }
            }
            Guide::Descend => {}
        }
        for child in &node.children {
            let mark = key.len();
            key.push_str(&child.label);
            let visit = Self::walk_guided(child, key, guide, f);
            key.truncate(mark);
            if visit == Visit::Stop {
                return Visit::Stop;
            }
        }
        Visit::Continue
    }

    /// Collect every key in order
    pub fn keys(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.len);
        self.for_each(|k, _| {
            out.push(k.to_string());
            Visit::Continue
        });
        out
    }
}
