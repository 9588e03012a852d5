//! Dependency ordering.
//!
//! Depth-first over the tool list in declaration order, appending each tool
//! after its dependencies. Nodes carry a three-state mark so that reaching a
//! node that is still in progress is reported as a cycle instead of recursing
//! forever.

use std::collections::HashMap;

use crate::config::Tool;
use crate::error::{Result, StackupError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

struct Resolver<'a> {
    tools: &'a [Tool],
    index: HashMap<&'a str, usize>,
    marks: Vec<Mark>,
    order: Vec<usize>,
}

impl<'a> Resolver<'a> {
    fn new(tools: &'a [Tool]) -> Self {
        let mut index = HashMap::with_capacity(tools.len());
        for (i, tool) in tools.iter().enumerate() {
            index.entry(tool.name.as_str()).or_insert(i);
        }

        Self {
            tools,
            index,
            marks: vec![Mark::Unvisited; tools.len()],
            order: Vec::with_capacity(tools.len()),
        }
    }

    fn visit(&mut self, idx: usize) -> Result<()> {
        let tools = self.tools;
        let tool = &tools[idx];

        match self.marks[idx] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                return Err(StackupError::CycleDetected {
                    tool: tool.name.clone(),
                })
            }
            Mark::Unvisited => {}
        }

        self.marks[idx] = Mark::InProgress;

        for dep in &tool.dependencies {
            let dep_idx = self
                .index
                .get(dep.as_str())
                .copied()
                .ok_or_else(|| StackupError::dependency_not_found(&tool.name, dep))?;
            self.visit(dep_idx)?;
        }

        self.marks[idx] = Mark::Done;
        self.order.push(idx);
        Ok(())
    }

    fn finish(self) -> Vec<&'a Tool> {
        let tools = self.tools;
        self.order.into_iter().map(|i| &tools[i]).collect()
    }
}

/// Install order for every tool.
///
/// Every dependency precedes its dependents, and independent tools keep
/// their declared relative order.
pub fn resolve_order(tools: &[Tool]) -> Result<Vec<&Tool>> {
    let mut resolver = Resolver::new(tools);
    for idx in 0..tools.len() {
        resolver.visit(idx)?;
    }
    Ok(resolver.finish())
}

/// Install order for `roots` and everything they transitively depend on.
pub fn resolve_selected<'a>(tools: &'a [Tool], roots: &[String]) -> Result<Vec<&'a Tool>> {
    let mut resolver = Resolver::new(tools);
    for root in roots {
        let idx = resolver
            .index
            .get(root.as_str())
            .copied()
            .ok_or_else(|| StackupError::Config(format!("Unknown tool '{}'", root)))?;
        resolver.visit(idx)?;
    }
    Ok(resolver.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn tool(name: &str, deps: &[&str]) -> Tool {
        Tool {
            name: name.to_string(),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            ..Default::default()
        }
    }

    fn names(order: &[&Tool]) -> Vec<String> {
        order.iter().map(|t| t.name.clone()).collect()
    }

    fn assert_topological(tools: &[Tool], order: &[&Tool]) {
        assert_eq!(order.len(), tools.len(), "not a permutation");
        let position: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.as_str(), i))
            .collect();
        assert_eq!(position.len(), tools.len(), "duplicate entries");

        for tool in tools {
            for dep in &tool.dependencies {
                assert!(
                    position[dep.as_str()] < position[tool.name.as_str()],
                    "{} must come before {}",
                    dep,
                    tool.name
                );
            }
        }
    }

    #[test]
    fn test_dependency_comes_first() {
        let tools = vec![tool("a", &[]), tool("b", &["a"])];
        assert_eq!(names(&resolve_order(&tools).unwrap()), vec!["a", "b"]);

        let tools = vec![tool("b", &["a"]), tool("a", &[])];
        assert_eq!(names(&resolve_order(&tools).unwrap()), vec!["a", "b"]);
    }

    #[test]
    fn test_independent_tools_keep_declared_order() {
        let tools = vec![tool("zsh", &[]), tool("git", &[]), tool("curl", &[])];
        assert_eq!(
            names(&resolve_order(&tools).unwrap()),
            vec!["zsh", "git", "curl"]
        );
    }

    #[test]
    fn test_shared_dependency_installed_once() {
        let tools = vec![
            tool("tool-c", &["tool-a"]),
            tool("tool-a", &[]),
            tool("tool-b", &["tool-a"]),
        ];
        let order = resolve_order(&tools).unwrap();
        assert_eq!(names(&order), vec!["tool-a", "tool-c", "tool-b"]);
    }

    #[test]
    fn test_multiple_and_deep_dependencies() {
        let tools = vec![
            tool("tool-a", &[]),
            tool("tool-b", &[]),
            tool("tool-c", &["tool-a", "tool-b"]),
        ];
        assert_eq!(names(&resolve_order(&tools).unwrap()).last().unwrap(), "tool-c");

        let tools = vec![
            tool("tool-d", &["tool-c"]),
            tool("tool-c", &["tool-b"]),
            tool("tool-b", &["tool-a"]),
            tool("tool-a", &[]),
        ];
        assert_eq!(
            names(&resolve_order(&tools).unwrap()),
            vec!["tool-a", "tool-b", "tool-c", "tool-d"]
        );
    }

    #[test]
    fn test_missing_dependency_names_both() {
        let tools = vec![tool("tool-a", &["nonexistent"])];
        match resolve_order(&tools).unwrap_err() {
            StackupError::DependencyNotFound { tool, dependency } => {
                assert_eq!(tool, "tool-a");
                assert_eq!(dependency, "nonexistent");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_dependency_is_cycle() {
        let tools = vec![tool("a", &["a"])];
        assert!(matches!(
            resolve_order(&tools),
            Err(StackupError::CycleDetected { tool }) if tool == "a"
        ));
    }

    #[test]
    fn test_three_cycle_names_closing_tool() {
        let tools = vec![tool("a", &["b"]), tool("b", &["c"]), tool("c", &["a"])];
        // a -> b -> c -> a: a is reached again while still in progress
        assert!(matches!(
            resolve_order(&tools),
            Err(StackupError::CycleDetected { tool }) if tool == "a"
        ));
    }

    #[test]
    fn test_selected_roots_pull_dependencies() {
        let tools = vec![
            tool("wsl", &[]),
            tool("git", &[]),
            tool("docker", &["wsl"]),
            tool("rustup", &[]),
        ];
        let order = resolve_selected(&tools, &["docker".into(), "git".into()]).unwrap();
        assert_eq!(names(&order), vec!["wsl", "docker", "git"]);

        let err = resolve_selected(&tools, &["nope".into()]).unwrap_err();
        assert!(matches!(err, StackupError::Config(_)));
    }

    /// Random DAG over `n` tools, declared in shuffled order.
    fn random_dag(rng: &mut StdRng, n: usize) -> Vec<Tool> {
        let mut tools: Vec<Tool> = (0..n)
            .map(|i| {
                let deps: Vec<String> = (0..i)
                    .filter(|_| rng.gen_bool(0.3))
                    .map(|j| format!("t{}", j))
                    .collect();
                Tool {
                    name: format!("t{}", i),
                    dependencies: deps,
                    ..Default::default()
                }
            })
            .collect();
        tools.shuffle(rng);
        tools
    }

    #[test]
    fn test_random_dags_resolve_topologically() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let n = rng.gen_range(1..25);
            let tools = random_dag(&mut rng, n);
            let order = resolve_order(&tools).unwrap();
            assert_topological(&tools, &order);
        }
    }

    #[test]
    fn test_random_cycles_are_rejected() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let n = rng.gen_range(1..25);
            let mut tools = random_dag(&mut rng, n);

            // chain every tool to its predecessor, then close the loop
            for t in tools.iter_mut() {
                let i: usize = t.name[1..].parse().unwrap();
                let prev = if i == 0 { n - 1 } else { i - 1 };
                t.dependencies.push(format!("t{}", prev));
            }

            assert!(matches!(
                resolve_order(&tools),
                Err(StackupError::CycleDetected { .. })
            ));
        }
    }
}
