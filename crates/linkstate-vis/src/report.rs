//! Plain-text step logs for each phase and for path results.

use std::fmt::{self, Display, Formatter};

use linkstate_topology::RouterId;

use crate::wire::{
    CalculateResponse, DiscoveryStep, FloodingStep, HistoryStep, Ordered, RouteEntry,
};

/// Shortest paths from the source, one block per reachable destination.
pub fn path_results(response: &CalculateResponse) -> String {
    PathResults(response).to_string()
}

/// Per-iteration history of the path search.
pub fn path_history(history: &[HistoryStep]) -> String {
    PathHistory(history).to_string()
}

/// Neighbor discovery steps.
pub fn discovery_steps(steps: &[DiscoveryStep]) -> String {
    DiscoverySteps(steps).to_string()
}

/// LSP flooding steps.
pub fn flooding_steps(steps: &[FloodingStep]) -> String {
    FloodingSteps(steps).to_string()
}

/// One routing table per router.
pub fn routing_tables(tables: &Ordered<Ordered<RouteEntry>>) -> String {
    RoutingTables(tables).to_string()
}

struct Joined<'a, T>(&'a [T], &'a str);

impl<T: Display> Display for Joined<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(self.1)?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

fn write_pairs<V: Display>(f: &mut Formatter<'_>, map: &Ordered<V>) -> fmt::Result {
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key}: {value}")?;
    }
    Ok(())
}

struct PathResults<'a>(&'a CalculateResponse);

impl Display for PathResults<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shortest Paths from Source:")?;
        for (target, info) in self.0.paths.iter() {
            if info.path.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "Path to {target}")?;
            writeln!(f, "  Route: {}", Joined(&info.path, " → "))?;
            writeln!(f, "  Total Cost: {}", info.cost)?;
            writeln!(f, "  Number of Hops: {}", info.hops)?;
        }
        Ok(())
    }
}

struct PathHistory<'a>(&'a [HistoryStep]);

impl Display for PathHistory<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, step) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "Step {}: Processing Router {}", index + 1, step.current)?;
            write!(f, "  Current Distances: ")?;
            write_pairs(f, &step.distances)?;
            writeln!(f)?;
            writeln!(f, "  Visited Nodes: {}", Joined(&step.visited, ", "))?;
            if !step.neighbors.is_empty() {
                writeln!(f, "  Evaluating Neighbors:")?;
                for (neighbor, eval) in step.neighbors.iter() {
                    writeln!(
                        f,
                        "    → {neighbor}: Cost={}, New Distance={}, Current Best={}",
                        eval.cost, eval.total_distance, eval.current_best
                    )?;
                }
            }
        }
        Ok(())
    }
}

struct DiscoverySteps<'a>(&'a [DiscoveryStep]);

impl Display for DiscoverySteps<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Neighbor Discovery Steps:")?;
        for (index, step) in self.0.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "Step {}: Router {}", index + 1, step.router)?;
            writeln!(
                f,
                "  Discovered Neighbors: {}",
                Joined(&step.discovered_neighbors, ", ")
            )?;
            write!(f, "  Link Costs: ")?;
            write_pairs(f, &step.costs)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

struct FloodingSteps<'a>(&'a [FloodingStep]);

impl Display for FloodingSteps<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "LSP Flooding Steps:")?;
        for (index, step) in self.0.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "Step {}: LSP from Router {}", index + 1, step.source_router)?;
            writeln!(f, "  LSP Content: {}", step.lsp)?;
            writeln!(f, "  Reached Routers: {}", Joined(&step.reached_routers, ", "))?;
        }
        Ok(())
    }
}

struct RoutingTables<'a>(&'a Ordered<Ordered<RouteEntry>>);

impl Display for RoutingTables<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Routing Tables:")?;
        for (router, table) in self.0.iter() {
            writeln!(f)?;
            writeln!(f, "Routing Table for {router}")?;
            writeln!(f, "  {:<12} {:<12} {}", "Destination", "Next Hop", "Cost")?;
            for (destination, entry) in table.iter() {
                let next_hop = entry.next_hop.as_ref().map_or("-", RouterId::as_str);
                writeln!(f, "  {destination:<12} {next_hop:<12} {}", entry.cost)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_results_skip_empty_paths() {
        let response: CalculateResponse = serde_json::from_value(json!({
            "paths": {
                "C": {"path": ["A", "B", "C"], "cost": 2, "hops": 2},
                "D": {"path": [], "cost": 0, "hops": 0}
            },
            "history": []
        }))
        .unwrap();
        let text = path_results(&response);

        assert!(text.contains("Path to C\n  Route: A → B → C\n  Total Cost: 2\n  Number of Hops: 2"));
        assert!(!text.contains("Path to D"));
    }

    #[test]
    fn history_lists_distances_and_neighbors() {
        let history: Vec<HistoryStep> = serde_json::from_value(json!([
            {
                "current": "A",
                "distances": {"A": 0, "B": "Infinity"},
                "visited": ["A"],
                "neighbors": {"B": {"cost": 1, "total_distance": 1, "current_best": "Infinity"}}
            },
            {"current": "B", "distances": {"A": 0, "B": 1}, "visited": ["A", "B"], "neighbors": {}}
        ]))
        .unwrap();
        let text = path_history(&history);

        assert!(text.starts_with("Step 1: Processing Router A\n  Current Distances: A: 0, B: Infinity\n"));
        assert!(text.contains("    → B: Cost=1, New Distance=1, Current Best=Infinity"));
        assert!(text.contains("Step 2: Processing Router B"));
        assert_eq!(text.matches("Evaluating Neighbors").count(), 1);
    }

    #[test]
    fn discovery_and_flooding_steps() {
        let discovery: Vec<DiscoveryStep> = serde_json::from_value(json!([
            {"router": "A", "discovered_neighbors": ["B", "C"], "costs": {"B": 1, "C": 4}}
        ]))
        .unwrap();
        let text = discovery_steps(&discovery);
        assert!(text.contains("Step 1: Router A\n  Discovered Neighbors: B, C\n  Link Costs: B: 1, C: 4"));

        let flooding: Vec<FloodingStep> = serde_json::from_value(json!([
            {"source_router": "B", "lsp": {"A": 1}, "reached_routers": ["A", "C"]}
        ]))
        .unwrap();
        let text = flooding_steps(&flooding);
        assert!(text.contains("Step 1: LSP from Router B\n  LSP Content: {\"A\":1}\n  Reached Routers: A, C"));
    }

    #[test]
    fn routing_table_rows() {
        let tables: Ordered<Ordered<RouteEntry>> = serde_json::from_value(json!({
            "A": {"B": {"next_hop": "B", "cost": 1}, "C": {"next_hop": null, "cost": "Infinity"}}
        }))
        .unwrap();
        let text = routing_tables(&tables);

        assert!(text.contains("Routing Table for A"));
        assert!(text.contains("  B            B            1"));
        assert!(text.contains("  C            -            Infinity"));
    }
}
