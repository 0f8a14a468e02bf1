use super::*;

fn p(name: &str) -> PathBuf {
    PathBuf::from(format!("/app/{name}"))
}

#[test]
fn affected_files_follow_dependents_transitively() {
    let mut graph = DependencyGraph::new();
    graph.update_file(&p("stories.ts"), &[p("Button.tsx")]);
    graph.update_file(&p("Button.tsx"), &[p("theme.ts")]);
    graph.update_file(&p("unrelated.ts"), &[p("other.ts")]);

    assert_eq!(
        graph.affected_files(&p("theme.ts")),
        vec![p("Button.tsx"), p("stories.ts")]
    );
    assert_eq!(graph.affected_files(&p("Button.tsx")), vec![p("stories.ts")]);
    assert!(graph.affected_files(&p("stories.ts")).is_empty());
}

#[test]
fn cycles_terminate() {
    let mut graph = DependencyGraph::new();
    graph.update_file(&p("a.ts"), &[p("b.ts")]);
    graph.update_file(&p("b.ts"), &[p("a.ts")]);
    assert_eq!(graph.affected_files(&p("a.ts")), vec![p("a.ts"), p("b.ts")]);
}

#[test]
fn update_replaces_old_edges() {
    let mut graph = DependencyGraph::new();
    graph.update_file(&p("a.ts"), &[p("b.ts"), p("c.ts")]);
    graph.update_file(&p("a.ts"), &[p("c.ts")]);
    assert!(graph.dependents(&p("b.ts")).is_none());
    assert!(graph.dependents(&p("c.ts")).unwrap().contains(&p("a.ts")));

    graph.update_file(&p("a.ts"), &[]);
    assert!(!graph.contains_file(&p("a.ts")));
    assert!(!graph.contains_file(&p("c.ts")));
}

#[test]
fn removing_a_file_keeps_its_dependents() {
    let mut graph = DependencyGraph::new();
    graph.update_file(&p("a.ts"), &[p("b.ts")]);
    graph.update_file(&p("b.ts"), &[p("c.ts")]);
    graph.remove_file(&p("b.ts"));

    assert!(graph.dependencies(&p("b.ts")).is_none());
    assert!(graph.dependents(&p("c.ts")).is_none());
    assert_eq!(graph.affected_files(&p("b.ts")), vec![p("a.ts")]);

    graph.clear();
    assert!(!graph.contains_file(&p("a.ts")));
}
