//! Children-first emission of registered nodes

use crate::registry::Registry;

/// Emit the blocks reachable from `roots`, children before parents
///
/// Each node is marked written before its children are visited, so shared
/// children and cycles are emitted once. Roots and children that are not
/// registered are skipped.
pub fn render<S: AsRef<str>>(registry: &mut Registry, roots: &[S]) -> String {
    let mut output = String::new();

    for root in roots {
        let root = root.as_ref();
        if !registry.mark_written(root) {
            continue;
        }

        // (identifier, index of the next child to visit)
        let mut stack: Vec<(String, usize)> = vec![(root.to_string(), 0)];
        while let Some((identifier, next)) = stack.last_mut() {
            let node = registry.get(identifier.as_str());
            if *next == 0 {
                if let Some(node) = node.filter(|n| !n.children.is_empty()) {
                    tracing::debug!(
                        "NB of children for {} is {}",
                        node.identifier,
                        node.children.len()
                    );
                }
            }

            match node.and_then(|n| n.children.get(*next)).cloned() {
                Some(child) => {
                    *next += 1;
                    if registry.mark_written(&child) {
                        stack.push((child, 0));
                    }
                }
                None => {
                    if let Some(node) = registry.get(identifier.as_str()) {
                        output.push_str(&node.fragment);
                    }
                    stack.pop();
                }
            }
        }
    }

    output
}

/// Emit every registered node, starting from each in insertion order
pub fn render_all(registry: &mut Registry) -> String {
    let roots = registry.identifiers();
    render(registry, roots.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::EntityNode;

    fn node(id: &str, children: &[&str]) -> EntityNode {
        EntityNode::new(id, format!("[{}]", id))
            .with_children(children.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_children_before_parent() {
        let mut registry = Registry::new();
        registry.insert(node("Author_1", &["Book_10", "Book_11"]));
        registry.insert(node("Book_10", &[]));
        registry.insert(node("Book_11", &[]));

        let out = render(&mut registry, &["Author_1"]);
        assert_eq!(out, "[Book_10][Book_11][Author_1]");
    }

    #[test]
    fn test_cycle_emits_each_once() {
        let mut registry = Registry::new();
        registry.insert(node("A_1", &["B_2"]));
        registry.insert(node("B_2", &["A_1"]));

        let out = render(&mut registry, &["A_1", "B_2"]);
        assert_eq!(out, "[B_2][A_1]");
    }

    #[test]
    fn test_self_reference() {
        let mut registry = Registry::new();
        registry.insert(node("Employee_1", &["Employee_1"]));

        assert_eq!(render(&mut registry, &["Employee_1"]), "[Employee_1]");
    }

    #[test]
    fn test_shared_child_and_duplicates() {
        let mut registry = Registry::new();
        registry.insert(node("Shelf_1", &["Book_1", "Book_1"]));
        registry.insert(node("Shelf_2", &["Book_1"]));
        registry.insert(node("Book_1", &[]));

        let out = render(&mut registry, &["Shelf_1", "Shelf_2"]);
        assert_eq!(out, "[Book_1][Shelf_1][Shelf_2]");
    }

    #[test]
    fn test_dangling_child_is_skipped() {
        let mut registry = Registry::new();
        registry.insert(node("Author_1", &["Book_99"]));

        assert_eq!(render(&mut registry, &["Author_1", "Ghost_1"]), "[Author_1]");
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let mut registry = Registry::new();
        let depth = 50_000;
        for i in 0..depth {
            let child = format!("N_{}", i + 1);
            let children: Vec<&str> = if i + 1 < depth { vec![child.as_str()] } else { vec![] };
            registry.insert(node(&format!("N_{}", i), &children));
        }

        let out = render(&mut registry, &["N_0"]);
        assert!(out.starts_with(&format!("[N_{}]", depth - 1)));
        assert!(out.ends_with("[N_0]"));
    }

    #[test]
    fn test_render_all_in_insertion_order() {
        let mut registry = Registry::new();
        registry.insert(node("Author_1", &["Book_10"]));
        registry.insert(node("Tag_1", &[]));
        registry.insert(node("Book_10", &[]));

        assert_eq!(render_all(&mut registry), "[Book_10][Author_1][Tag_1]");
    }
}
