//! デコード処理のためのルーチンを提供するモジュール。
//!
//! このモジュールは、グラフデコードのための主要なワーカー構造体を
//! 提供します。ワーカーは内部データ構造を保持し、再利用することで
//! 不要なメモリアロケーションを避けます。

use crate::graph::{Graph, Node};
use crate::parser::{ActionScorer, Parser};
use crate::transition::{Action, ActionCodec, ParserState};

/// デコード処理のためのルーチンを提供する構造体。
///
/// デコードに使用される内部データ構造を保持し、それらを再利用することで
/// 不要なメモリ再割り当てを回避します。1つのワーカーは同時に1つの
/// デコードセッションのみを所有します。
///
/// # 例
///
/// ```ignore
/// let mut worker = parser.new_worker();
/// worker.reset_nodes(graph.nodes());
/// worker.decode(&mut scorer);
/// let parsed = worker.retrieve_parse();
/// ```
pub struct Worker {
    pub(crate) parser: Parser,
    pub(crate) state: ParserState,
    pub(crate) codec: ActionCodec,
    pub(crate) actions: Vec<Action>,
    scores: Vec<f32>,
}

impl Worker {
    /// 新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `parser` - 使用するパーサー
    pub(crate) fn new(parser: Parser) -> Self {
        let state = ParserState::new(parser.lexicon().clone());
        let codec = parser.codec_for(0);
        Self {
            parser,
            state,
            codec,
            actions: vec![],
            scores: vec![],
        }
    }

    /// デコードする入力ノード列をリセットします。
    ///
    /// 新しい入力を設定し、以前のセッションの状態をクリアします。
    ///
    /// # 引数
    ///
    /// * `nodes` - デコードする入力ノード列
    pub fn reset_nodes(&mut self, nodes: &[Node]) {
        self.state.reset_nodes(nodes);
        self.codec = self.parser.codec_for(nodes.len());
        self.actions.clear();
    }

    /// 設定された入力をデコードします。
    ///
    /// 各ステップでスコアラーが行動空間上の分布を返し、正当な行動の
    /// うち最高スコアのものが適用されます。同点の場合は最小のワイヤID
    /// が選ばれるため、同一のスコア列に対する結果は常に決定的です。
    ///
    /// デコードは`Stop`に到達するか、ステップ上限（既定では
    /// `2 * ノード数 + 1`回の選択・`Pop`・`Stop`の決定）を使い切ると
    /// 終了します。エラーで失敗することはなく、上限に達した場合は
    /// 部分的なグラフが結果になります。
    ///
    /// # 引数
    ///
    /// * `scorer` - 行動スコアの供給者
    pub fn decode<S>(&mut self, scorer: &mut S)
    where
        S: ActionScorer,
    {
        let num_nodes = self.state.num_nodes();
        let step_bound = self
            .parser
            .config()
            .max_steps
            .unwrap_or(2 * num_nodes + 1);
        let system = self.parser.system();

        loop {
            if system.is_complete(&self.state) {
                break;
            }
            if self.state.steps() >= step_bound {
                log::warn!(
                    "decoding hit the step bound ({step_bound}) before Stop; the parse is partial"
                );
                break;
            }

            let context = match self.parser.context_provider() {
                Some(provider) => provider.observe(&self.state),
                None => vec![],
            };

            self.scores.clear();
            self.scores.resize(self.codec.size(), 0.0);
            scorer.score(&self.state, &context, &mut self.scores);

            // Scan in wire id order so that ties resolve to the lowest id.
            let mut best: Option<(f32, Action)> = None;
            for id in 0..self.codec.size() as u32 {
                let Some(action) = self.codec.decode(id) else {
                    break;
                };
                if !system.is_legal(&self.state, action) {
                    continue;
                }
                let score = self
                    .scores
                    .get(id as usize)
                    .copied()
                    .unwrap_or(f32::NEG_INFINITY);
                if best.map_or(true, |(best_score, _)| score > best_score) {
                    best = Some((score, action));
                }
            }

            let Some((_, action)) = best else {
                // No legal action can only happen for empty inputs.
                break;
            };

            system.apply(&mut self.state, action);
            self.actions.push(action);
        }
    }

    /// 解析状態への参照を取得します。
    #[inline]
    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// 現在の入力の行動コーデックを取得します。
    #[inline]
    pub fn codec(&self) -> &ActionCodec {
        &self.codec
    }

    /// 適用された行動の数を取得します。
    #[inline]
    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// 適用された行動のスライスを取得します。
    #[inline]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// デコード結果からグラフを再構築します。
    ///
    /// デコードが途中で打ち切られた場合、未付属のノードはエッジを
    /// 持たないまま含まれます。
    ///
    /// # 戻り値
    ///
    /// 再構築されたグラフ
    pub fn retrieve_parse(&self) -> Graph {
        let mut graph = Graph::new();
        for node in self.state.nodes() {
            graph.add_node(node.form(), node.lex_type());
        }
        if let Some(root) = self.state.root() {
            graph.set_root(root);
        }
        for position in 1..=self.state.num_nodes() as u32 {
            let Some(head) = self.state.head_of(position) else {
                continue;
            };
            let Some(label_id) = self.state.incoming_label_of(position) else {
                continue;
            };
            if let Some(label) = self.state.lexicon().edge_labels().label_of(label_id) {
                graph.add_edge(head, position, label);
            }
        }
        graph
    }
}
