//! Dependency cycle detection.
//!
//! A package "contains a cycle" when some path of efferent edges starting at
//! it reaches a package already on that path. The trace written by
//! [`PackageGraph::collect_cycle`] is the path from the start package down to
//! the first repeat, with the repeated package appended. Children are visited
//! in efferent registration order, so traces are deterministic.

use std::collections::HashSet;

use crate::graph::PackageGraph;
use crate::package::PackageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    FirstOnly,
    All,
}

struct Tracer<'g> {
    graph: &'g PackageGraph,
    mode: Mode,
    on_path: HashSet<PackageId>,
    log: Vec<PackageId>,
    // Packages whose subtree is known to close no cycle.
    dead: HashSet<PackageId>,
}

/// One package on the active path.
struct Frame {
    id: PackageId,
    mark: usize,
    next_child: usize,
    found: bool,
}

impl<'g> Tracer<'g> {
    fn new(graph: &'g PackageGraph, mode: Mode) -> Self {
        Self {
            graph,
            mode,
            on_path: HashSet::new(),
            log: Vec::new(),
            dead: HashSet::new(),
        }
    }

    /// Depth-first walk from `start`. The path lives on an explicit stack,
    /// so chains as long as the package count do not grow the thread stack.
    fn visit(&mut self, start: PackageId) -> bool {
        let graph = self.graph;
        let mut stack = vec![self.enter(start)];

        loop {
            let Some(frame) = stack.last_mut() else {
                return false;
            };
            let exhausted = frame.found && self.mode == Mode::FirstOnly;
            let child = if exhausted {
                None
            } else {
                graph.efferent_at(frame.id, frame.next_child)
            };

            match child {
                Some(child) => {
                    frame.next_child += 1;
                    if self.on_path.contains(&child) {
                        self.log.push(child);
                        frame.found = true;
                    } else if !self.dead.contains(&child) {
                        stack.push(self.enter(child));
                    }
                }
                None => {
                    let (id, mark, found) = (frame.id, frame.mark, frame.found);
                    stack.pop();
                    self.leave(id, mark, found);
                    match stack.last_mut() {
                        Some(parent) => parent.found |= found,
                        None => return found,
                    }
                }
            }
        }
    }

    fn enter(&mut self, id: PackageId) -> Frame {
        let mark = self.log.len();
        self.on_path.insert(id);
        self.log.push(id);
        Frame {
            id,
            mark,
            next_child: 0,
            found: false,
        }
    }

    fn leave(&mut self, id: PackageId, mark: usize, found: bool) {
        self.on_path.remove(&id);
        if !found {
            self.log.truncate(mark);
            self.dead.insert(id);
        }
    }

    fn names(&self) -> impl Iterator<Item = String> + '_ {
        self.log
            .iter()
            .map(|id| self.graph.package(*id).name().to_string())
    }
}

impl PackageGraph {
    pub fn contains_cycle(&self, id: PackageId) -> bool {
        Tracer::new(self, Mode::FirstOnly).visit(id)
    }

    /// Appends the first cycle reachable from `id` to `out`.
    ///
    /// Leaves `out` untouched and returns false when there is none.
    pub fn collect_cycle(&self, id: PackageId, out: &mut Vec<String>) -> bool {
        self.trace(id, Mode::FirstOnly, out)
    }

    /// Like [`collect_cycle`](Self::collect_cycle) but keeps exploring after
    /// the first closure, so every cycle reachable from `id` is traced.
    pub fn collect_all_cycles(&self, id: PackageId, out: &mut Vec<String>) -> bool {
        self.trace(id, Mode::All, out)
    }

    /// True when any package of the graph takes part in or reaches a cycle.
    pub fn contains_cycles(&self) -> bool {
        self.packages().any(|p| self.contains_cycle(p.id()))
    }

    fn trace(&self, id: PackageId, mode: Mode, out: &mut Vec<String>) -> bool {
        let mut tracer = Tracer::new(self, mode);
        let found = tracer.visit(id);
        out.extend(tracer.names());
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str)]) -> PackageGraph {
        let mut graph = PackageGraph::new();
        for (from, to) in edges {
            let from = graph.add_package(from);
            let to = graph.add_package(to);
            graph.depends_upon(from, to);
        }
        graph
    }

    fn first(graph: &PackageGraph, name: &str) -> (bool, Vec<String>) {
        let mut out = Vec::new();
        let found = graph.collect_cycle(graph.id(name).unwrap(), &mut out);
        (found, out)
    }

    fn all(graph: &PackageGraph, name: &str) -> (bool, Vec<String>) {
        let mut out = Vec::new();
        let found = graph.collect_all_cycles(graph.id(name).unwrap(), &mut out);
        (found, out)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn acyclic_graph_reports_nothing() {
        let g = graph(&[("a", "b"), ("b", "c"), ("a", "c")]);
        for name in ["a", "b", "c"] {
            assert!(!g.contains_cycle(g.id(name).unwrap()));
            assert_eq!(first(&g, name), (false, Vec::new()));
            assert_eq!(all(&g, name), (false, Vec::new()));
        }
        assert!(!g.contains_cycles());
    }

    #[test]
    fn two_package_cycle() {
        let g = graph(&[("A", "B"), ("B", "A")]);
        assert_eq!(first(&g, "A"), (true, names(&["A", "B", "A"])));
        assert_eq!(first(&g, "B"), (true, names(&["B", "A", "B"])));
        assert!(g.contains_cycles());
    }

    #[test]
    fn cycle_reached_from_outside_is_traced_to_its_closure() {
        let g = graph(&[("A", "B"), ("B", "C"), ("C", "B")]);
        assert!(g.contains_cycle(g.id("A").unwrap()));
        assert_eq!(first(&g, "A"), (true, names(&["A", "B", "C", "B"])));
        assert_eq!(first(&g, "B"), (true, names(&["B", "C", "B"])));
        assert_eq!(all(&g, "A"), (true, names(&["A", "B", "C", "B"])));
    }

    #[test]
    fn two_branches_through_one_package() {
        let g = graph(&[("A", "B"), ("B", "A"), ("A", "C"), ("C", "A")]);

        assert_eq!(first(&g, "A"), (true, names(&["A", "B", "A"])));
        assert_eq!(first(&g, "C"), (true, names(&["C", "A", "B", "A"])));

        assert_eq!(all(&g, "A"), (true, names(&["A", "B", "A", "C", "A"])));
        assert_eq!(all(&g, "B"), (true, names(&["B", "A", "B", "C", "A"])));
        assert_eq!(all(&g, "C"), (true, names(&["C", "A", "B", "A", "C"])));
    }

    #[test]
    fn two_cycles_of_three_sharing_one_package() {
        let g = graph(&[
            ("A", "B"),
            ("B", "C"),
            ("C", "A"),
            ("A", "D"),
            ("D", "E"),
            ("E", "A"),
        ]);

        assert_eq!(first(&g, "D"), (true, names(&["D", "E", "A", "B", "C", "A"])));
        assert_eq!(first(&g, "E"), (true, names(&["E", "A", "B", "C", "A"])));

        assert_eq!(
            all(&g, "A"),
            (true, names(&["A", "B", "C", "A", "D", "E", "A"]))
        );
        assert_eq!(
            all(&g, "B"),
            (true, names(&["B", "C", "A", "B", "D", "E", "A"]))
        );
        assert_eq!(
            all(&g, "C"),
            (true, names(&["C", "A", "B", "C", "D", "E", "A"]))
        );
        assert_eq!(
            all(&g, "D"),
            (true, names(&["D", "E", "A", "B", "C", "A", "D"]))
        );
        assert_eq!(
            all(&g, "E"),
            (true, names(&["E", "A", "B", "C", "A", "D", "E"]))
        );
    }

    #[test]
    fn dead_ends_are_pruned_from_the_trace() {
        let g = graph(&[("A", "X"), ("X", "Y"), ("A", "B"), ("B", "A")]);
        assert_eq!(first(&g, "A"), (true, names(&["A", "B", "A"])));
        assert_eq!(all(&g, "A"), (true, names(&["A", "B", "A"])));
    }

    #[test]
    fn output_is_appended_not_replaced() {
        let g = graph(&[("A", "B"), ("B", "A")]);
        let mut out = vec!["seed".to_string()];
        assert!(g.collect_cycle(g.id("A").unwrap(), &mut out));
        assert_eq!(out, names(&["seed", "A", "B", "A"]));
    }

    #[test]
    fn wide_diamond_chain_finishes() {
        let mut g = PackageGraph::new();
        let layers: Vec<Vec<PackageId>> = (0..30)
            .map(|l| (0..2).map(|i| g.add_package(&format!("p{l}.{i}"))).collect())
            .collect();
        for pair in layers.windows(2) {
            for from in &pair[0] {
                for to in &pair[1] {
                    g.depends_upon(*from, *to);
                }
            }
        }
        assert!(!g.contains_cycles());
    }

    #[test]
    fn very_long_chain_is_traced_without_recursion() {
        let mut g = PackageGraph::new();
        let ids: Vec<PackageId> = (0..50_000).map(|i| g.add_package(&format!("p{i}"))).collect();
        for pair in ids.windows(2) {
            g.depends_upon(pair[0], pair[1]);
        }
        assert!(!g.contains_cycle(ids[0]));

        g.depends_upon(ids[ids.len() - 1], ids[0]);
        let mut out = Vec::new();
        assert!(g.collect_cycle(ids[0], &mut out));
        assert_eq!(out.len(), ids.len() + 1);
        assert_eq!(out.first(), out.last());
        assert_eq!(out[1], "p1");
    }
}
