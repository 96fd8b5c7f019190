//! 深さ優先の遷移システム。
//!
//! [`Dfs`]は主要バリアントで、子エッジを作るたびに直ちにその部分木へ
//! 降下します。[`DfsChildrenFirst`]は、あるノードのすべての子エッジを
//! 作ってから最初の子の部分木へ降下する代替の走査順序で、同じ
//! [`ParserState`]と[`Action`]型を共有します。

use std::sync::Arc;

use crate::config::ChildrenOrder;
use crate::errors::OracleError;
use crate::graph::{Edge, Graph, IGNORE_EDGE_LABEL};
use crate::lexicon::AdditionalLexicon;
use crate::transition::{Action, ParserState, TransitionSystem};

/// オラクル抽出中のノードの訪問状態。
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unseen,
    Visited,
    Ignored,
}

/// 子ノードを構成された順序ポリシーで返します。
///
/// 入力の子リストは位置の昇順であり、順序はエッジの挿入順序に依存
/// しません。
fn ordered_children<'a>(graph: &'a Graph, parent: u32, order: ChildrenOrder) -> Vec<&'a Edge> {
    let children = graph.children_of(parent);
    match order {
        ChildrenOrder::LR => children,
        ChildrenOrder::RL => children.into_iter().rev().collect(),
        ChildrenOrder::IO => {
            // Children left of the parent nearest-first, then children
            // right of the parent nearest-first.
            let mut left: Vec<&Edge> = children
                .iter()
                .copied()
                .filter(|e| e.target() < parent)
                .collect();
            left.reverse();
            let right = children.iter().copied().filter(|e| e.target() > parent);
            left.into_iter().chain(right).collect()
        }
    }
}

/// ノードの語彙タイプを検証し、訪問済みとして記録します。
fn visit_node(
    graph: &Graph,
    lexicon: &AdditionalLexicon,
    position: u32,
    marks: &mut [Mark],
) -> Result<(), OracleError> {
    let Some(node) = graph.node(position) else {
        return Err(OracleError::Disconnected { position });
    };
    if marks[position as usize] != Mark::Unseen {
        return Err(OracleError::Cyclic { position });
    }
    marks[position as usize] = Mark::Visited;
    if let Some(lex_type) = node.lex_type() {
        lexicon.term_types().id_of(lex_type)?;
    }
    Ok(())
}

/// `IGNORE`エッジの部分木全体を無視対象として記録します。
///
/// 閉路があっても停止するように、記録済みのノードでは打ち切ります。
fn mark_ignored(graph: &Graph, position: u32, marks: &mut [Mark]) {
    let Some(slot) = marks.get(position as usize) else {
        return;
    };
    if *slot != Mark::Unseen {
        return;
    }
    marks[position as usize] = Mark::Ignored;
    for edge in graph.children_of(position) {
        mark_ignored(graph, edge.target(), marks);
    }
}

/// 走査後に未到達のノードが残っていないかを検査します。
fn check_coverage(marks: &[Mark]) -> Result<(), OracleError> {
    for (i, mark) in marks.iter().enumerate().skip(1) {
        if *mark == Mark::Unseen {
            return Err(OracleError::Disconnected { position: i as u32 });
        }
    }
    Ok(())
}

/// 深さ優先の遷移システム（`dfs`バリアント）
///
/// オラクル抽出は、ノードの初回訪問で`SelectNode`を発行し、構成された
/// 子順序の各エッジについて`MakeEdge`の直後にその子の部分列を再帰的に
/// 発行し、すべての子の処理後に`Pop`を発行します。全体は`Stop`で
/// 終端されます。
pub struct Dfs {
    children_order: ChildrenOrder,
    lexicon: Arc<AdditionalLexicon>,
}

impl Dfs {
    /// 新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `children_order` - 子ノードの訪問順序ポリシー
    /// * `lexicon` - 共有語彙
    pub fn new(children_order: ChildrenOrder, lexicon: Arc<AdditionalLexicon>) -> Self {
        Self {
            children_order,
            lexicon,
        }
    }

    fn construct_seq(
        &self,
        graph: &Graph,
        position: u32,
        marks: &mut [Mark],
        actions: &mut Vec<Action>,
    ) -> Result<(), OracleError> {
        visit_node(graph, &self.lexicon, position, marks)?;
        actions.push(Action::SelectNode(position));
        for edge in ordered_children(graph, position, self.children_order) {
            if edge.label() == IGNORE_EDGE_LABEL {
                mark_ignored(graph, edge.target(), marks);
                continue;
            }
            let label = self.lexicon.edge_labels().id_of(edge.label())?;
            actions.push(Action::MakeEdge(label));
            self.construct_seq(graph, edge.target(), marks, actions)?;
        }
        actions.push(Action::Pop);
        Ok(())
    }
}

impl TransitionSystem for Dfs {
    fn name(&self) -> &'static str {
        "dfs"
    }

    fn oracle(&self, graph: &Graph) -> Result<Vec<Action>, OracleError> {
        let root = graph.root().ok_or(OracleError::MissingRoot)?;
        let mut marks = vec![Mark::Unseen; graph.len() + 1];
        let mut actions = Vec::with_capacity(2 * graph.len() + 1);
        self.construct_seq(graph, root, &mut marks, &mut actions)?;
        check_coverage(&marks)?;
        actions.push(Action::Stop);
        Ok(actions)
    }

    fn apply(&self, state: &mut ParserState, action: Action) {
        match action {
            Action::SelectNode(position) => {
                state.note_step();
                if let Some(label) = state.pending_label.take() {
                    if let Some(&top) = state.stack.last() {
                        state.heads[position as usize] = top;
                        state.labels[position as usize] = label;
                        state.children[top as usize].push(position);
                    }
                } else if state.root.is_none() {
                    state.root = Some(position);
                }
                state.mark_visited(position);
                state.stack.push(position);
            }
            Action::MakeEdge(label) => {
                state.pending_label = Some(label);
            }
            Action::Pop => {
                state.note_step();
                state.stack.pop();
            }
            Action::Stop => {
                state.note_step();
                state.done = true;
            }
        }
    }
}

/// 子優先の深さ優先バリアント（`dfs-children-first`）
///
/// ノードが閉じられる前にすべての子エッジが作られます。`Pop`は
/// フロンティア先頭を閉じると同時に、遅延していた子のプッシュを
/// スタックへ転送し、最初の子が次の訪問対象になります。
pub struct DfsChildrenFirst {
    children_order: ChildrenOrder,
    lexicon: Arc<AdditionalLexicon>,
}

impl DfsChildrenFirst {
    /// 新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `children_order` - 子ノードの訪問順序ポリシー
    /// * `lexicon` - 共有語彙
    pub fn new(children_order: ChildrenOrder, lexicon: Arc<AdditionalLexicon>) -> Self {
        Self {
            children_order,
            lexicon,
        }
    }

    fn construct_seq(
        &self,
        graph: &Graph,
        position: u32,
        marks: &mut [Mark],
        actions: &mut Vec<Action>,
    ) -> Result<(), OracleError> {
        let mut recursive = vec![];
        for edge in ordered_children(graph, position, self.children_order) {
            if edge.label() == IGNORE_EDGE_LABEL {
                mark_ignored(graph, edge.target(), marks);
                continue;
            }
            let label = self.lexicon.edge_labels().id_of(edge.label())?;
            visit_node(graph, &self.lexicon, edge.target(), marks)?;
            actions.push(Action::MakeEdge(label));
            actions.push(Action::SelectNode(edge.target()));
            recursive.push(edge.target());
        }
        actions.push(Action::Pop);
        for child in recursive {
            self.construct_seq(graph, child, marks, actions)?;
        }
        Ok(())
    }
}

impl TransitionSystem for DfsChildrenFirst {
    fn name(&self) -> &'static str {
        "dfs-children-first"
    }

    fn oracle(&self, graph: &Graph) -> Result<Vec<Action>, OracleError> {
        let root = graph.root().ok_or(OracleError::MissingRoot)?;
        let mut marks = vec![Mark::Unseen; graph.len() + 1];
        let mut actions = Vec::with_capacity(2 * graph.len() + 1);
        visit_node(graph, &self.lexicon, root, &mut marks)?;
        actions.push(Action::SelectNode(root));
        self.construct_seq(graph, root, &mut marks, &mut actions)?;
        check_coverage(&marks)?;
        actions.push(Action::Stop);
        Ok(actions)
    }

    fn apply(&self, state: &mut ParserState, action: Action) {
        match action {
            Action::SelectNode(position) => {
                state.note_step();
                if let Some(label) = state.pending_label.take() {
                    if let Some(&top) = state.stack.last() {
                        state.heads[position as usize] = top;
                        state.labels[position as usize] = label;
                        state.children[top as usize].push(position);
                    }
                    // The attachment is deferred: the child is visited next
                    // only after the current node is closed.
                    state.mark_visited(position);
                    state.sub_stack.push(position);
                } else {
                    if state.root.is_none() {
                        state.root = Some(position);
                    }
                    state.mark_visited(position);
                    state.stack.push(position);
                }
            }
            Action::MakeEdge(label) => {
                state.pending_label = Some(label);
            }
            Action::Pop => {
                state.note_step();
                state.stack.pop();
                // Transfer deferred pushes so that the first child ends up
                // on top of the stack.
                while let Some(child) = state.sub_stack.pop() {
                    state.stack.push(child);
                }
            }
            Action::Stop => {
                state.note_step();
                state.done = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::lexicon::AdditionalLexicon;

    fn test_lexicon() -> Arc<AdditionalLexicon> {
        Arc::new(
            AdditionalLexicon::from_readers(
                "L1\nL2\nL3\n".as_bytes(),
                "(s)\n()\n".as_bytes(),
            )
            .unwrap(),
        )
    }

    fn chain_graph() -> Graph {
        // root -> A -> B with labels L1, L2.
        let mut g = Graph::new();
        let root = g.add_node("root", None);
        let a = g.add_node("a", None);
        let b = g.add_node("b", None);
        g.set_root(root);
        g.add_edge(root, a, "L1");
        g.add_edge(a, b, "L2");
        g
    }

    #[test]
    fn test_dfs_oracle_chain() {
        let dfs = Dfs::new(ChildrenOrder::IO, test_lexicon());
        let actions = dfs.oracle(&chain_graph()).unwrap();
        assert_eq!(
            actions,
            vec![
                Action::SelectNode(1),
                Action::MakeEdge(0),
                Action::SelectNode(2),
                Action::MakeEdge(1),
                Action::SelectNode(3),
                Action::Pop,
                Action::Pop,
                Action::Pop,
                Action::Stop,
            ]
        );
    }

    #[test]
    fn test_dfs_oracle_single_node() {
        let mut g = Graph::new();
        let root = g.add_node("root", None);
        g.set_root(root);

        let dfs = Dfs::new(ChildrenOrder::IO, test_lexicon());
        let actions = dfs.oracle(&g).unwrap();
        assert_eq!(
            actions,
            vec![Action::SelectNode(1), Action::Pop, Action::Stop]
        );
    }

    #[test]
    fn test_dfs_oracle_is_deterministic() {
        let dfs = Dfs::new(ChildrenOrder::IO, test_lexicon());
        let g = chain_graph();
        assert_eq!(dfs.oracle(&g).unwrap(), dfs.oracle(&g).unwrap());
    }

    #[test]
    fn test_children_order_io() {
        // Parent at position 3 with children 1, 2, 4, 5: the inside-out
        // order is 2, 1, 4, 5.
        let mut g = Graph::new();
        for form in ["a", "b", "p", "c", "d"] {
            g.add_node(form, None);
        }
        g.set_root(3);
        g.add_edge(3, 5, "L1");
        g.add_edge(3, 1, "L1");
        g.add_edge(3, 4, "L1");
        g.add_edge(3, 2, "L1");

        let io: Vec<u32> = ordered_children(&g, 3, ChildrenOrder::IO)
            .iter()
            .map(|e| e.target())
            .collect();
        assert_eq!(io, vec![2, 1, 4, 5]);

        let lr: Vec<u32> = ordered_children(&g, 3, ChildrenOrder::LR)
            .iter()
            .map(|e| e.target())
            .collect();
        assert_eq!(lr, vec![1, 2, 4, 5]);

        let rl: Vec<u32> = ordered_children(&g, 3, ChildrenOrder::RL)
            .iter()
            .map(|e| e.target())
            .collect();
        assert_eq!(rl, vec![5, 4, 2, 1]);
    }

    #[test]
    fn test_oracle_missing_root() {
        let mut g = Graph::new();
        g.add_node("a", None);
        let dfs = Dfs::new(ChildrenOrder::IO, test_lexicon());
        assert!(matches!(dfs.oracle(&g), Err(OracleError::MissingRoot)));
    }

    #[test]
    fn test_oracle_disconnected() {
        let mut g = Graph::new();
        let root = g.add_node("root", None);
        g.add_node("stray", None);
        g.set_root(root);

        let dfs = Dfs::new(ChildrenOrder::IO, test_lexicon());
        assert!(matches!(
            dfs.oracle(&g),
            Err(OracleError::Disconnected { position: 2 })
        ));
    }

    #[test]
    fn test_oracle_cyclic() {
        let mut g = Graph::new();
        let root = g.add_node("root", None);
        let a = g.add_node("a", None);
        g.set_root(root);
        g.add_edge(root, a, "L1");
        // A second incoming edge makes node 2 reachable twice.
        g.add_edge(a, root, "L2");

        let dfs = Dfs::new(ChildrenOrder::IO, test_lexicon());
        assert!(matches!(
            dfs.oracle(&g),
            Err(OracleError::Cyclic { position: 1 })
        ));
    }

    #[test]
    fn test_oracle_unknown_edge_label() {
        let mut g = Graph::new();
        let root = g.add_node("root", None);
        let a = g.add_node("a", None);
        g.set_root(root);
        g.add_edge(root, a, "X-NOT-IN-LEXICON");

        let dfs = Dfs::new(ChildrenOrder::IO, test_lexicon());
        assert!(matches!(
            dfs.oracle(&g),
            Err(OracleError::UnknownLabel(_))
        ));
    }

    #[test]
    fn test_oracle_unknown_term_type() {
        let mut g = Graph::new();
        let root = g.add_node("root", Some("(unknown)"));
        g.set_root(root);

        let dfs = Dfs::new(ChildrenOrder::IO, test_lexicon());
        assert!(matches!(
            dfs.oracle(&g),
            Err(OracleError::UnknownLabel(_))
        ));
    }

    #[test]
    fn test_oracle_skips_ignored_subtree() {
        let mut g = Graph::new();
        let root = g.add_node("root", None);
        let a = g.add_node("a", None);
        let b = g.add_node("b", None);
        g.set_root(root);
        g.add_edge(root, a, IGNORE_EDGE_LABEL);
        g.add_edge(a, b, "L1");

        let dfs = Dfs::new(ChildrenOrder::IO, test_lexicon());
        let actions = dfs.oracle(&g).unwrap();
        assert_eq!(
            actions,
            vec![Action::SelectNode(1), Action::Pop, Action::Stop]
        );
    }

    #[test]
    fn test_children_first_oracle_chain() {
        let system = DfsChildrenFirst::new(ChildrenOrder::IO, test_lexicon());
        let actions = system.oracle(&chain_graph()).unwrap();
        assert_eq!(
            actions,
            vec![
                Action::SelectNode(1),
                Action::MakeEdge(0),
                Action::SelectNode(2),
                Action::Pop,
                Action::MakeEdge(1),
                Action::SelectNode(3),
                Action::Pop,
                Action::Pop,
                Action::Stop,
            ]
        );
    }

    #[test]
    fn test_replay_reconstructs_state() {
        let lexicon = test_lexicon();
        let g = chain_graph();
        for system in [
            Box::new(Dfs::new(ChildrenOrder::IO, lexicon.clone()))
                as Box<dyn TransitionSystem>,
            Box::new(DfsChildrenFirst::new(ChildrenOrder::IO, lexicon.clone())),
        ] {
            let actions = system.oracle(&g).unwrap();
            let mut state = ParserState::new(lexicon.clone());
            state.reset_nodes(g.nodes());
            for action in actions {
                assert!(system.is_legal(&state, action), "{action:?} must be legal");
                system.apply(&mut state, action);
            }
            assert!(state.is_done());
            assert_eq!(state.root(), Some(1));
            assert_eq!(state.head_of(2), Some(1));
            assert_eq!(state.head_of(3), Some(2));
            assert_eq!(state.incoming_label_of(2), Some(0));
            assert_eq!(state.incoming_label_of(3), Some(1));
            assert_eq!(state.steps(), 7);
        }
    }
}
