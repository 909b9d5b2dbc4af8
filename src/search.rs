use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::hash::Hash;

use fnv::FnvHashSet;
use log::debug;

/// Frontier ordering of the best-first search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Breadth,
    Uniform,
    Greedy,
    AStar,
}

/// What a domain offers for a state: successor actions, or a signal that
/// the state is subsumed by one already expanded and not worth expanding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actions<A> {
    Expand(Vec<A>),
    SkipDominated,
}

/// The capability set the tree search needs from a problem domain.
///
/// `actions` takes `&mut self` because domains may keep per-search tables
/// (the Sokoban domain records visited keepers while enumerating).
pub trait SearchDomain {
    type State;
    type Action;
    type Goal;
    type Key: Hash + Eq;

    fn actions(&mut self, state: &Self::State) -> Actions<Self::Action>;
    fn result(&self, state: &Self::State, action: &Self::Action) -> Self::State;
    fn cost(&self, state: &Self::State, action: &Self::Action) -> u32;
    fn heuristic(&self, state: &Self::State, goal: &Self::Goal) -> u32;
    fn equivalent(&self, a: &Self::State, b: &Self::State) -> bool;
    fn satisfies(&self, state: &Self::State, goal: &Self::Goal) -> bool;
    fn key(&self, state: &Self::State) -> Self::Key;
}

struct Node<S, A> {
    state: S,
    parent: Option<usize>,
    depth: u32,
    cost: u32,
    heuristic: u32,
    action: Option<A>,
}

/// Best-first search over a [`SearchDomain`]. Nodes live in a single arena
/// and refer to their parents by index; the whole tree is dropped at once
/// when the search ends.
pub struct SearchTree<'d, D: SearchDomain> {
    domain: &'d mut D,
    goal: D::Goal,
    strategy: Strategy,
    nodes: Vec<Node<D::State, D::Action>>,
    open: BinaryHeap<Reverse<(u64, u64, usize)>>,
    visited: FnvHashSet<D::Key>,
    counter: u64,
}

impl<'d, D: SearchDomain> SearchTree<'d, D> {
    pub fn new(domain: &'d mut D, initial: D::State, goal: D::Goal, strategy: Strategy) -> Self {
        let heuristic = domain.heuristic(&initial, &goal);
        let root = Node {
            state: initial,
            parent: None,
            depth: 0,
            cost: 0,
            heuristic,
            action: None,
        };
        let mut open = BinaryHeap::new();
        open.push(Reverse((0, 0, 0)));

        SearchTree {
            domain,
            goal,
            strategy,
            nodes: vec![root],
            open,
            visited: FnvHashSet::default(),
            counter: 1,
        }
    }

    /// Run the search to completion. Returns the index of a goal node, or
    /// `None` once the frontier empties.
    pub fn search(&mut self) -> Option<usize> {
        while let Some(Reverse((_, _, idx))) = self.open.pop() {
            let key = self.domain.key(&self.nodes[idx].state);
            if self.visited.contains(&key) {
                continue;
            }
            self.visited.insert(key);

            if self.domain.satisfies(&self.nodes[idx].state, &self.goal) {
                debug!(
                    "goal reached: depth {}, cost {}, {} states visited",
                    self.nodes[idx].depth,
                    self.nodes[idx].cost,
                    self.visited.len()
                );
                return Some(idx);
            }

            let actions = match self.domain.actions(&self.nodes[idx].state) {
                Actions::Expand(actions) => actions,
                // Equivalent work was already done from a sibling state.
                Actions::SkipDominated => continue,
            };

            for action in actions {
                let state = self.domain.result(&self.nodes[idx].state, &action);
                if self.in_ancestors(idx, &state) || self.visited.contains(&self.domain.key(&state))
                {
                    continue;
                }

                let cost = self.nodes[idx].cost + self.domain.cost(&self.nodes[idx].state, &action);
                let heuristic = self.domain.heuristic(&state, &self.goal);
                let priority = match self.strategy {
                    Strategy::Breadth => self.counter,
                    Strategy::Uniform => u64::from(cost),
                    Strategy::Greedy => u64::from(heuristic),
                    Strategy::AStar => u64::from(cost) + u64::from(heuristic),
                };

                let child = self.nodes.len();
                self.nodes.push(Node {
                    state,
                    parent: Some(idx),
                    depth: self.nodes[idx].depth + 1,
                    cost,
                    heuristic,
                    action: Some(action),
                });
                self.open.push(Reverse((priority, self.counter, child)));
                self.counter += 1;
            }
        }

        None
    }

    fn in_ancestors(&self, from: usize, state: &D::State) -> bool {
        let mut idx = from;
        loop {
            if self.domain.equivalent(state, &self.nodes[idx].state) {
                return true;
            }
            match self.nodes[idx].parent {
                Some(parent) => idx = parent,
                None => return false,
            }
        }
    }

    /// The actions leading from the root to `node`, root excluded.
    pub fn plan(&self, node: usize) -> Vec<D::Action>
    where
        D::Action: Clone,
    {
        let mut actions = Vec::new();
        let mut idx = node;
        while let Some(parent) = self.nodes[idx].parent {
            let action = self.nodes[idx]
                .action
                .clone()
                .expect("non-root node without an action");
            actions.push(action);
            idx = parent;
        }
        actions.reverse();
        actions
    }

    /// The states from the root to `node`, both included.
    pub fn path(&self, node: usize) -> Vec<&D::State> {
        let mut states = Vec::new();
        let mut idx = node;
        loop {
            states.push(&self.nodes[idx].state);
            match self.nodes[idx].parent {
                Some(parent) => idx = parent,
                None => break,
            }
        }
        states.reverse();
        states
    }

    pub fn cost(&self, node: usize) -> u32 {
        self.nodes[node].cost
    }

    pub fn depth(&self, node: usize) -> u32 {
        self.nodes[node].depth
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
