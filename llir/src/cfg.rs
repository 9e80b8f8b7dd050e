use crate::module::Function;
use crate::value::BlockId;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use ahash::HashSetExt;
use itertools::Itertools;
use std::collections::VecDeque;

pub fn successors(func: &Function, block: BlockId) -> Vec<BlockId> {
  func
    .terminator(block)
    .map(|term| term.successors())
    .unwrap_or_default()
}

pub fn reachable(func: &Function, entry: BlockId) -> HashSet<BlockId> {
  let mut seen = HashSet::new();
  let mut queue = VecDeque::from([entry]);
  while let Some(block) = queue.pop_front() {
    if !seen.insert(block) {
      continue;
    }
    queue.extend(successors(func, block));
  }
  seen
}

/// Dominator sets of the blocks reachable from the entry block.
pub struct Dominators(HashMap<BlockId, HashSet<BlockId>>);

impl Dominators {
  /// Iterative dataflow: dom(entry) = {entry}, dom(b) = {b} ∪ ⋂ dom(preds(b)).
  pub fn compute(func: &Function) -> Dominators {
    let mut dom = HashMap::<BlockId, HashSet<BlockId>>::new();
    let Some(entry) = func.entry() else {
      return Dominators(dom);
    };
    let reachable = reachable(func, entry);
    let blocks = func
      .layout()
      .iter()
      .copied()
      .filter(|b| reachable.contains(b))
      .collect_vec();
    let mut preds = HashMap::<BlockId, Vec<BlockId>>::new();
    for &b in blocks.iter() {
      for s in successors(func, b) {
        preds.entry(s).or_default().push(b);
      }
    }

    let all: HashSet<BlockId> = blocks.iter().copied().collect();
    for &b in blocks.iter() {
      if b == entry {
        dom.insert(b, HashSet::from_iter([b]));
      } else {
        dom.insert(b, all.clone());
      }
    }

    let mut changed = true;
    while changed {
      changed = false;
      for &b in blocks.iter().filter(|&&b| b != entry) {
        let mut new = preds
          .get(&b)
          .into_iter()
          .flatten()
          .map(|p| dom[p].clone())
          .reduce(|a, b| a.intersection(&b).copied().collect())
          .unwrap_or_default();
        new.insert(b);
        if new != dom[&b] {
          dom.insert(b, new);
          changed = true;
        }
      }
    }
    Dominators(dom)
  }

  pub fn is_reachable(&self, block: BlockId) -> bool {
    self.0.contains_key(&block)
  }

  /// Whether `a` dominates `b`. Every block dominates itself.
  pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
    self.0.get(&b).is_some_and(|d| d.contains(&a))
  }
}
