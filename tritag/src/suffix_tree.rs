use std::collections::HashMap as StdHashMap;

use hashbrown::HashMap;

use crate::emission::TagProbs;
use crate::ngram::Tag;

/// Returns the reversed characters of `word`, truncated to `max_len`.
pub(crate) fn reversed_suffix(word: &str, max_len: usize) -> Vec<char> {
    word.chars().rev().take(max_len).collect()
}

#[derive(Debug, Default, Clone)]
struct TreeNode {
    children: HashMap<char, TreeNode>,
    tag_freqs: HashMap<Tag, usize>,
    tag_freq: usize,
}

impl TreeNode {
    fn add_suffix(&mut self, rev_suffix: &[char], tag_freqs: &StdHashMap<Tag, usize>) {
        let mut node = self;
        let mut rest = rev_suffix;
        loop {
            for (&tag, &freq) in tag_freqs {
                *node.tag_freqs.entry(tag).or_insert(0) += freq;
                node.tag_freq += freq;
            }
            let Some((&c, tail)) = rest.split_first() else {
                return;
            };
            node = node.children.entry(c).or_default();
            rest = tail;
        }
    }

    /// Interpolates the relative frequencies of this node with the probabilities carried in
    /// from the one-shorter suffix.
    fn back_off(&self, theta: f64, probs: &mut TagProbs) {
        for (tag, prob) in probs.iter_mut() {
            let node_prob = self
                .tag_freqs
                .get(tag)
                .map_or(0., |&f| f as f64 / self.tag_freq as f64);
            *prob = (node_prob + theta * *prob) / (theta + 1.);
        }
    }
}

/// Trie of reversed word suffixes holding tag frequencies.
#[derive(Debug, Clone)]
pub(crate) struct SuffixTree {
    root: TreeNode,
    max_len: usize,
}

impl SuffixTree {
    /// Creates a tree whose root holds `root_freqs`.
    pub(crate) fn new(root_freqs: &HashMap<Tag, usize>, max_len: usize) -> Self {
        let root = TreeNode {
            children: HashMap::new(),
            tag_freqs: root_freqs.clone(),
            tag_freq: root_freqs.values().sum(),
        };
        Self { root, max_len }
    }

    pub(crate) fn max_len(&self) -> usize {
        self.max_len
    }

    /// Adds the tag frequencies of `word` to every node on the path of its suffix.
    pub(crate) fn add_word(&mut self, word: &str, tag_freqs: &StdHashMap<Tag, usize>) {
        let rev = reversed_suffix(word, self.max_len);
        self.root.add_suffix(&rev, tag_freqs);
    }

    fn initial_probs(&self) -> TagProbs {
        self.root.tag_freqs.keys().map(|&tag| (tag, 0.)).collect()
    }

    /// Returns the interpolated suffix probabilities of `word`, before Bayesian inversion.
    ///
    /// The walk stops at the end of the truncated suffix or at the first missing child.
    pub(crate) fn suffix_tag_probs(&self, word: &str, theta: f64) -> TagProbs {
        let rev = reversed_suffix(word, self.max_len);
        let mut probs = self.initial_probs();
        let mut node = &self.root;
        node.back_off(theta, &mut probs);
        for c in rev {
            match node.children.get(&c) {
                Some(child) => {
                    node = child;
                    node.back_off(theta, &mut probs);
                }
                None => break,
            }
        }
        probs
    }

    /// Visits every node with its reversed suffix and its interpolated probabilities, before
    /// Bayesian inversion.
    pub(crate) fn for_each_suffix<F>(&self, theta: f64, mut f: F)
    where
        F: FnMut(&str, &TagProbs),
    {
        let mut probs = self.initial_probs();
        self.root.back_off(theta, &mut probs);
        let mut stack = vec![(&self.root, String::new(), probs)];
        while let Some((node, suffix, probs)) = stack.pop() {
            for (&c, child) in &node.children {
                let mut child_probs = probs.clone();
                child.back_off(theta, &mut child_probs);
                let mut child_suffix = suffix.clone();
                child_suffix.push(c);
                stack.push((child, child_suffix, child_probs));
            }
            f(&suffix, &probs);
        }
    }
}
