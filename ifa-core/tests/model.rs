//! Model-based property tests: random operation sequences are applied to
//! the store and to a plain reference model, and the two must agree after
//! every step.

use std::collections::BTreeMap;

use ifa_core::{Graph, GraphError, NodeId, PropertyValue, RelationId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Operation {
    AddNode { label: String },
    DeleteNode { pick: usize },
    AddRelation { from: usize, to: usize },
    DeleteRelation { pick: usize },
    SetNodeProperty { pick: usize, key: String, value: PropertyValue },
    DelNodeProperty { pick: usize, key: String },
    SetRelationProperty { pick: usize, key: String, value: PropertyValue },
}

type Props = BTreeMap<String, PropertyValue>;

/// Reference model: live entities keyed by slot index, plus the LIFO free
/// stacks the store is expected to reuse slots from.
#[derive(Debug, Default)]
struct Model {
    nodes: BTreeMap<usize, (String, Props)>,
    relations: BTreeMap<usize, (usize, usize, Props)>,
    free_nodes: Vec<usize>,
    free_relations: Vec<usize>,
    node_slots: usize,
    relation_slots: usize,
}

impl Model {
    fn next_node_slot(&mut self) -> usize {
        self.free_nodes.pop().unwrap_or_else(|| {
            self.node_slots += 1;
            self.node_slots - 1
        })
    }

    fn next_relation_slot(&mut self) -> usize {
        self.free_relations.pop().unwrap_or_else(|| {
            self.relation_slots += 1;
            self.relation_slots - 1
        })
    }

    fn nth_node(&self, pick: usize) -> Option<usize> {
        if self.nodes.is_empty() {
            return None;
        }
        self.nodes.keys().nth(pick % self.nodes.len()).copied()
    }

    fn nth_relation(&self, pick: usize) -> Option<usize> {
        if self.relations.is_empty() {
            return None;
        }
        self.relations.keys().nth(pick % self.relations.len()).copied()
    }

    fn degree(&self, node: usize) -> usize {
        self.relations
            .values()
            .map(|(from, to, _)| usize::from(*from == node) + usize::from(*to == node))
            .sum()
    }
}

fn arb_value() -> impl Strategy<Value = PropertyValue> {
    prop_oneof![
        any::<i64>().prop_map(PropertyValue::Int),
        any::<bool>().prop_map(PropertyValue::Bool),
        "[a-z]{0,6}".prop_map(PropertyValue::Text),
    ]
}

fn arb_key() -> impl Strategy<Value = String> {
    "[a-d]".prop_map(String::from)
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => "[A-Z][a-z]{0,4}".prop_map(|label| Operation::AddNode { label }),
        1 => any::<usize>().prop_map(|pick| Operation::DeleteNode { pick }),
        4 => (any::<usize>(), any::<usize>())
            .prop_map(|(from, to)| Operation::AddRelation { from, to }),
        2 => any::<usize>().prop_map(|pick| Operation::DeleteRelation { pick }),
        2 => (any::<usize>(), arb_key(), arb_value())
            .prop_map(|(pick, key, value)| Operation::SetNodeProperty { pick, key, value }),
        1 => (any::<usize>(), arb_key())
            .prop_map(|(pick, key)| Operation::DelNodeProperty { pick, key }),
        2 => (any::<usize>(), arb_key(), arb_value())
            .prop_map(|(pick, key, value)| Operation::SetRelationProperty { pick, key, value }),
    ]
}

fn apply(graph: &mut Graph, model: &mut Model, op: Operation) -> Result<(), TestCaseError> {
    match op {
        Operation::AddNode { label } => {
            let expected = model.next_node_slot();
            let id = graph.add_node(label.clone());
            prop_assert_eq!(id.index(), expected);
            model.nodes.insert(expected, (label, Props::new()));
        }
        Operation::DeleteNode { pick } => {
            let Some(index) = model.nth_node(pick) else {
                return Ok(());
            };
            let id = NodeId::from(index);
            if model.degree(index) > 0 {
                prop_assert_eq!(graph.delete_node(id), Err(GraphError::HasRelations(id)));
            } else {
                prop_assert_eq!(graph.delete_node(id), Ok(()));
                model.nodes.remove(&index);
                model.free_nodes.push(index);
                prop_assert!(graph.delete_node(id).is_err());
            }
        }
        Operation::AddRelation { from, to } => {
            let (Some(from), Some(to)) = (model.nth_node(from), model.nth_node(to)) else {
                return Ok(());
            };
            let expected = model.next_relation_slot();
            let id = graph
                .add_relation(NodeId::from(from), NodeId::from(to))
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            prop_assert_eq!(id.index(), expected);
            prop_assert!(graph.relation(id).unwrap().properties().is_empty());
            model.relations.insert(expected, (from, to, Props::new()));
        }
        Operation::DeleteRelation { pick } => {
            let Some(index) = model.nth_relation(pick) else {
                return Ok(());
            };
            prop_assert_eq!(graph.delete_relation(RelationId::from(index)), Ok(()));
            model.relations.remove(&index);
            model.free_relations.push(index);
        }
        Operation::SetNodeProperty { pick, key, value } => {
            let Some(index) = model.nth_node(pick) else {
                return Ok(());
            };
            prop_assert_eq!(
                graph.set_node_property(NodeId::from(index), key.clone(), value.clone()),
                Ok(())
            );
            if let Some((_, props)) = model.nodes.get_mut(&index) {
                props.insert(key, value);
            }
        }
        Operation::DelNodeProperty { pick, key } => {
            let Some(index) = model.nth_node(pick) else {
                return Ok(());
            };
            let removed = graph
                .del_node_property(NodeId::from(index), &key)
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            let expected = model
                .nodes
                .get_mut(&index)
                .map_or(false, |(_, props)| props.remove(&key).is_some());
            prop_assert_eq!(removed, expected);
        }
        Operation::SetRelationProperty { pick, key, value } => {
            let Some(index) = model.nth_relation(pick) else {
                return Ok(());
            };
            prop_assert_eq!(
                graph.set_relation_property(RelationId::from(index), key.clone(), value.clone()),
                Ok(())
            );
            if let Some((_, _, props)) = model.relations.get_mut(&index) {
                props.insert(key, value);
            }
        }
    }
    Ok(())
}

fn assert_agrees(graph: &Graph, model: &Model) -> Result<(), TestCaseError> {
    prop_assert_eq!(graph.check_nodes(), None);
    prop_assert_eq!(graph.check_relations(), None);
    prop_assert_eq!(graph.check_adjacency(), None);

    prop_assert_eq!(graph.node_count(), model.nodes.len());
    prop_assert_eq!(graph.relation_count(), model.relations.len());

    let live_nodes: Vec<_> = graph.nodes().map(|n| n.id().index()).collect();
    prop_assert_eq!(live_nodes, model.nodes.keys().copied().collect::<Vec<_>>());
    let live_relations: Vec<_> = graph.relations().map(|r| r.id().index()).collect();
    prop_assert_eq!(
        live_relations,
        model.relations.keys().copied().collect::<Vec<_>>()
    );

    for (&index, (label, props)) in &model.nodes {
        let node = graph.node(NodeId::from(index)).unwrap();
        prop_assert_eq!(node.label(), label.as_str());
        let actual: Props = node.properties().into_iter().collect();
        prop_assert_eq!(&actual, props);
        prop_assert_eq!(node.relations().count(), model.degree(index));
    }
    for (&index, (from, to, props)) in &model.relations {
        let relation = graph.relation(RelationId::from(index)).unwrap();
        prop_assert_eq!(relation.source().id().index(), *from);
        prop_assert_eq!(relation.target().id().index(), *to);
        let actual: Props = relation.properties().into_iter().collect();
        prop_assert_eq!(&actual, props);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_store_matches_model(ops in prop::collection::vec(arb_operation(), 1..120)) {
        let mut graph = Graph::new();
        let mut model = Model::default();
        for op in ops {
            apply(&mut graph, &mut model, op)?;
            assert_agrees(&graph, &model)?;
        }
    }

    #[test]
    fn prop_delete_everything_leaves_empty_store(
        edges in prop::collection::vec((0usize..12, 0usize..12), 0..60)
    ) {
        let mut graph = Graph::new();
        let nodes: Vec<_> = (0..12).map(|i| graph.add_node(format!("n{i}"))).collect();
        let relations: Vec<_> = edges
            .iter()
            .map(|&(from, to)| graph.add_relation(nodes[from], nodes[to]).unwrap())
            .collect();

        for id in relations.into_iter().rev() {
            prop_assert_eq!(graph.delete_relation(id), Ok(()));
        }
        for id in nodes {
            prop_assert_eq!(graph.delete_node(id), Ok(()));
        }
        prop_assert!(graph.is_empty());
        prop_assert_eq!(graph.check_nodes(), None);
        prop_assert_eq!(graph.check_relations(), None);
        prop_assert_eq!(graph.check_adjacency(), None);
    }
}
