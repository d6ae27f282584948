// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use crate::error::{CompileError, Result};
use std::collections::{HashMap, HashSet};

/// A computed property: a name and the state keys its function reads,
/// taken from the function's parameter names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedDeclaration {
    /// The state key the result is stored under.
    pub name: String,
    /// Parameter names, in order. Each is a state key.
    pub dependencies: Vec<String>,
    /// Offset of the declaration's key in the component source.
    pub offset: usize,
}

/// Orders computed declarations so every declaration comes after the
/// computed declarations it depends on.
///
/// Dependencies that are not themselves computed are plain state and are
/// ignored. Declarations that do not depend on each other keep their
/// source order. A loop between declarations is an error naming the loop.
pub fn order_computed(declarations: &[ComputedDeclaration]) -> Result<Vec<&ComputedDeclaration>> {
    let by_name: HashMap<&str, &ComputedDeclaration> =
        declarations.iter().map(|d| (d.name.as_str(), d)).collect();

    let mut visited = HashSet::new();
    let mut path = Vec::new();
    let mut ordered = Vec::with_capacity(declarations.len());

    for declaration in declarations {
        visit(declaration.name.as_str(), &by_name, &mut visited, &mut path, &mut ordered)?;
    }

    Ok(ordered)
}

fn visit<'a>(
    name: &str,
    by_name: &HashMap<&'a str, &'a ComputedDeclaration>,
    visited: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
    ordered: &mut Vec<&'a ComputedDeclaration>,
) -> Result<()> {
    let Some(&declaration) = by_name.get(name) else {
        return Ok(());
    };
    if visited.contains(name) {
        return Ok(());
    }

    if let Some(position) = path.iter().position(|entry| *entry == name) {
        let mut cycle: Vec<String> = path[position..].iter().map(|s| s.to_string()).collect();
        cycle.push(name.to_string());
        return Err(CompileError::CircularComputed { cycle });
    }

    path.push(declaration.name.as_str());
    for dependency in &declaration.dependencies {
        visit(dependency, by_name, visited, path, ordered)?;
    }
    path.pop();

    visited.insert(declaration.name.as_str());
    ordered.push(declaration);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn computed(name: &str, dependencies: &[&str]) -> ComputedDeclaration {
        ComputedDeclaration {
            name: name.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            offset: 0,
        }
    }

    fn names(ordered: Vec<&ComputedDeclaration>) -> Vec<&str> {
        ordered.into_iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_dependency_comes_first() {
        let declarations = vec![computed("cSquared", &["c"]), computed("c", &["a", "b"])];
        let ordered = order_computed(&declarations).unwrap();
        assert_eq!(names(ordered), vec!["c", "cSquared"]);
    }

    #[test]
    fn test_independent_keep_source_order() {
        let declarations = vec![computed("x", &["a"]), computed("y", &["b"]), computed("z", &[])];
        let ordered = order_computed(&declarations).unwrap();
        assert_eq!(names(ordered), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_shared_dependency_emitted_once() {
        let declarations = vec![
            computed("d", &["b", "c"]),
            computed("b", &["a"]),
            computed("c", &["a"]),
            computed("a", &["input"]),
        ];
        let ordered = order_computed(&declarations).unwrap();
        assert_eq!(names(ordered), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let declarations = vec![computed("a", &["b"]), computed("b", &["c"]), computed("c", &["a"])];
        let error = order_computed(&declarations).unwrap_err();
        match error {
            CompileError::CircularComputed { cycle } => assert_eq!(cycle, vec!["a", "b", "c", "a"]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_self_dependency_is_cycle() {
        let declarations = vec![computed("a", &["a"])];
        assert!(order_computed(&declarations).is_err());
    }
}
