/*!

The contact network. Nodes are people identified by opaque string labels; edges are undirected
interactions. The graph is immutable once loaded into a [`Context`], and each node's index is
the [`PersonId`] of the person created for it.

*/

use crate::{
    HashMap, HashSet, PersonId,
    context::Context,
    error::ContagionError,
    immunization::Immune,
    people::ContextPeopleExt,
    status::InfectionStatus,
};
use log::{debug, info};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    rc::Rc,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactGraph {
    labels: Vec<String>,
    index: HashMap<String, PersonId>,
    adjacency: Vec<Vec<PersonId>>,
    edge_count: usize,
}

impl ContactGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from labelled edges. Nodes are numbered in order of first appearance.
    pub fn from_edges<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut graph = Self::new();
        for (a, b) in edges {
            graph.add_edge(a.as_ref(), b.as_ref());
        }
        graph
    }

    /// Reads an edge list: one edge per line as two whitespace-separated identifiers. Blank
    /// lines and `#` comments are skipped; any other line shape is an error.
    pub fn from_edge_list(file_path: &Path) -> Result<Self, ContagionError> {
        let reader = BufReader::new(File::open(file_path)?);
        let mut graph = Self::new();

        for (line_idx, line) in reader.lines().enumerate() {
            let line = line?;
            let content = line.split('#').next().unwrap_or_default();
            let mut fields = content.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (None, _, _) => {}
                (Some(a), Some(b), None) => graph.add_edge(a, b),
                _ => {
                    return Err(ContagionError::GraphFormat {
                        line: line_idx + 1,
                        content: line.clone(),
                    });
                }
            }
        }

        debug!(
            "read {} people and {} contacts from {}",
            graph.len(),
            graph.edge_count(),
            file_path.display()
        );
        Ok(graph)
    }

    /// Adds a node if it is not already present and returns its id.
    pub fn add_node(&mut self, label: &str) -> PersonId {
        if let Some(person_id) = self.index.get(label) {
            return *person_id;
        }
        let person_id = PersonId(self.labels.len());
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), person_id);
        self.adjacency.push(Vec::new());
        person_id
    }

    /// Adds an undirected edge, creating either endpoint as needed. Self-loops are ignored and
    /// repeated edges collapse into one.
    pub fn add_edge(&mut self, a: &str, b: &str) {
        let a = self.add_node(a);
        let b = self.add_node(b);
        self.connect(a, b);
    }

    pub(crate) fn connect(&mut self, a: PersonId, b: PersonId) {
        if a == b {
            return;
        }
        if let Err(pos) = self.adjacency[a.0].binary_search(&b) {
            self.adjacency[a.0].insert(pos, b);
            if let Err(back) = self.adjacency[b.0].binary_search(&a) {
                self.adjacency[b.0].insert(back, a);
            }
            self.edge_count += 1;
        }
    }

    pub(crate) fn disconnect(&mut self, a: PersonId, b: PersonId) {
        if let Ok(pos) = self.adjacency[a.0].binary_search(&b) {
            self.adjacency[a.0].remove(pos);
            if let Ok(back) = self.adjacency[b.0].binary_search(&a) {
                self.adjacency[b.0].remove(back);
            }
            self.edge_count -= 1;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Neighbours of `person_id`, sorted by id.
    #[must_use]
    pub fn neighbors(&self, person_id: PersonId) -> &[PersonId] {
        &self.adjacency[person_id.0]
    }

    #[must_use]
    pub fn has_edge(&self, a: PersonId, b: PersonId) -> bool {
        self.adjacency[a.0].binary_search(&b).is_ok()
    }

    #[must_use]
    pub fn degree(&self, person_id: PersonId) -> usize {
        self.adjacency[person_id.0].len()
    }

    /// Average number of contacts per person; 0 for the empty graph.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_degree(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (2 * self.edge_count) as f64 / self.len() as f64
    }

    #[must_use]
    pub fn label(&self, person_id: PersonId) -> &str {
        &self.labels[person_id.0]
    }

    #[must_use]
    pub fn person(&self, label: &str) -> Option<PersonId> {
        self.index.get(label).copied()
    }

    pub fn people(&self) -> impl Iterator<Item = PersonId> + use<> {
        (0..self.labels.len()).map(PersonId)
    }

    /// Looks up every label, failing on the first one that is not a node of this graph. The
    /// result is de-duplicated and keeps first-seen order.
    pub fn resolve<'a>(
        &self,
        labels: impl IntoIterator<Item = &'a str>,
        source: &str,
    ) -> Result<Vec<PersonId>, ContagionError> {
        let mut seen = HashSet::default();
        let mut resolved = Vec::new();
        for label in labels {
            let person_id = self.person(label).ok_or_else(|| {
                ContagionError::DataAlignment(format!(
                    "{source} references {label:?}, which is not in the contact graph"
                ))
            })?;
            if seen.insert(person_id) {
                resolved.push(person_id);
            }
        }
        Ok(resolved)
    }
}

#[derive(Default)]
struct GraphPlugin {
    graph: Option<Rc<ContactGraph>>,
}

crate::define_data_plugin!(GraphPlugin, GraphPlugin::default());

pub trait ContextGraphExt {
    /// Installs the contact graph and creates one susceptible, non-immune person per node.
    /// A context holds a single graph for its whole life.
    fn load_contact_graph(&mut self, graph: ContactGraph) -> Result<(), ContagionError>;

    /// A shared handle to the loaded graph.
    fn contact_graph(&self) -> Result<Rc<ContactGraph>, ContagionError>;
}

impl ContextGraphExt for Context {
    fn load_contact_graph(&mut self, graph: ContactGraph) -> Result<(), ContagionError> {
        if self.get_data_container::<GraphPlugin>().is_some_and(|p| p.graph.is_some())
            || self.get_current_population() > 0
        {
            return Err(ContagionError::Configuration(
                "a contact graph is already loaded in this context".to_string(),
            ));
        }

        for _ in graph.people() {
            let person = self.add_person();
            self.set_person_property(person, InfectionStatus::Susceptible);
            self.set_person_property(person, Immune(false));
        }
        info!(
            "loaded contact graph with {} people, {} contacts, mean degree {:.2}",
            graph.len(),
            graph.edge_count(),
            graph.mean_degree()
        );
        self.get_data_container_mut::<GraphPlugin>().graph = Some(Rc::new(graph));
        Ok(())
    }

    fn contact_graph(&self) -> Result<Rc<ContactGraph>, ContagionError> {
        self.get_data_container::<GraphPlugin>()
            .and_then(|plugin| plugin.graph.clone())
            .ok_or_else(|| {
                ContagionError::Configuration("no contact graph has been loaded".to_string())
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn persist_tmp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn edges_are_undirected_and_collapsed() {
        let graph = ContactGraph::from_edges([
            ("1098", "1193"),
            ("1193", "1098"),
            ("1098", "1164"),
            ("1164", "1164"),
        ]);
        let a = graph.person("1098").unwrap();
        let b = graph.person("1193").unwrap();
        let c = graph.person("1164").unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.neighbors(a), &[b, c]);
        assert_eq!(graph.neighbors(b), &[a]);
        assert_eq!(graph.degree(c), 1);
        assert!(graph.has_edge(c, a));
        assert!(!graph.has_edge(b, c));
        assert_eq!(graph.label(b), "1193");
    }

    #[test]
    fn mean_degree() {
        assert!(ContactGraph::new().mean_degree().abs() < f64::EPSILON);

        // A 4-cycle: every node has degree 2.
        let graph = ContactGraph::from_edges([("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")]);
        assert!((graph.mean_degree() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn disconnect_removes_both_directions() {
        let mut graph = ContactGraph::from_edges([("a", "b"), ("b", "c")]);
        let a = graph.person("a").unwrap();
        let b = graph.person("b").unwrap();
        graph.disconnect(a, b);
        assert!(!graph.has_edge(a, b));
        assert!(!graph.has_edge(b, a));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn read_edge_list() {
        let file = persist_tmp("# ward contacts\n1157 1232\n\n1157 1191  # morning round\n");
        let graph = ContactGraph::from_edge_list(file.path()).unwrap();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.label(PersonId(0)), "1157");
    }

    #[test]
    fn malformed_line_is_fatal() {
        let file = persist_tmp("1157 1232\n1157\n");
        let err = ContactGraph::from_edge_list(file.path()).unwrap_err();
        assert!(matches!(err, ContagionError::GraphFormat { line: 2, .. }));

        let file = persist_tmp("1157 1232 {'weight': 3}\n");
        assert!(matches!(
            ContactGraph::from_edge_list(file.path()),
            Err(ContagionError::GraphFormat { line: 1, .. })
        ));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = ContactGraph::from_edge_list(Path::new("/nonexistent/ward.edges")).unwrap_err();
        assert!(matches!(err, ContagionError::Io(_)));
    }

    #[test]
    fn resolve_rejects_unknown_labels() {
        let graph = ContactGraph::from_edges([("a", "b")]);
        assert_eq!(
            graph.resolve(["b", "a", "b"], "immune list").unwrap(),
            vec![PersonId(1), PersonId(0)]
        );
        let err = graph.resolve(["a", "z"], "immune list").unwrap_err();
        assert!(matches!(err, ContagionError::DataAlignment(msg) if msg.contains("\"z\"")));
    }

    #[test]
    fn loading_creates_people() {
        let mut context = Context::new();
        assert!(context.contact_graph().is_err());

        let graph = ContactGraph::from_edges([("a", "b"), ("b", "c")]);
        context.load_contact_graph(graph).unwrap();
        assert_eq!(context.get_current_population(), 3);
        assert_eq!(context.contact_graph().unwrap().edge_count(), 2);
        assert_eq!(
            context.query_people_count((InfectionStatus::Susceptible, Immune(false))),
            3
        );

        assert!(context.load_contact_graph(ContactGraph::new()).is_err());
    }
}
