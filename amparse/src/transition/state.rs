//! デコードセッションの可変状態。

use std::sync::Arc;

use crate::graph::Node;
use crate::lexicon::AdditionalLexicon;

/// 1つのデコードセッションが所有する可変状態
///
/// 「開いている」ノードのスタック（フロンティア）、部分エッジ集合、
/// 未訪問の入力ノードの集合、および不変の語彙への参照を保持します。
/// セッション間で共有されることはなく、デコードの終了とともに
/// リセットまたは破棄されます。
///
/// ヘッドとラベルの配列は位置で添字付けされます（添字0は未使用）。
/// ヘッド0は「未付属」を意味します。位置0はどのノードでもないため、
/// この符号化に曖昧さはありません。
pub struct ParserState {
    pub(crate) lexicon: Arc<AdditionalLexicon>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) stack: Vec<u32>,
    // Deferred pushes used by the children-first variant; always empty
    // whenever the stack is empty.
    pub(crate) sub_stack: Vec<u32>,
    pub(crate) visited: Vec<bool>,
    pub(crate) visited_count: usize,
    pub(crate) pending_label: Option<u32>,
    pub(crate) heads: Vec<u32>,
    pub(crate) labels: Vec<u32>,
    pub(crate) children: Vec<Vec<u32>>,
    pub(crate) root: Option<u32>,
    pub(crate) steps: usize,
    pub(crate) done: bool,
}

impl ParserState {
    /// 新しい空の状態を作成します。
    ///
    /// # 引数
    ///
    /// * `lexicon` - 共有語彙
    pub fn new(lexicon: Arc<AdditionalLexicon>) -> Self {
        Self {
            lexicon,
            nodes: vec![],
            stack: vec![],
            sub_stack: vec![],
            visited: vec![],
            visited_count: 0,
            pending_label: None,
            heads: vec![],
            labels: vec![],
            children: vec![],
            root: None,
            steps: 0,
            done: false,
        }
    }

    /// 新しい入力ノード列で状態をリセットします。
    ///
    /// 以前のセッションの内部バッファは再利用されます。
    pub fn reset_nodes(&mut self, nodes: &[Node]) {
        let n = nodes.len() + 1;
        self.nodes.clear();
        self.nodes.extend_from_slice(nodes);
        self.stack.clear();
        self.sub_stack.clear();
        self.visited.clear();
        self.visited.resize(n, false);
        self.visited_count = 0;
        self.pending_label = None;
        self.heads.clear();
        self.heads.resize(n, 0);
        self.labels.clear();
        self.labels.resize(n, 0);
        self.children.clear();
        self.children.resize_with(n, Vec::new);
        self.root = None;
        self.steps = 0;
        self.done = false;
    }

    /// 入力ノード数を返します。
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// 入力ノードのスライスを返します。
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// フロンティアのスタックを返します。底から先頭の順です。
    #[inline]
    pub fn stack(&self) -> &[u32] {
        &self.stack
    }

    /// フロンティア先頭のノードの位置を返します。
    #[inline]
    pub fn top(&self) -> Option<u32> {
        self.stack.last().copied()
    }

    /// 保留中のエッジラベルIDを返します。
    #[inline]
    pub fn pending_label(&self) -> Option<u32> {
        self.pending_label
    }

    /// ノードが訪問済みかどうかを判定します。
    #[inline]
    pub fn is_visited(&self, position: u32) -> bool {
        self.visited.get(position as usize).copied().unwrap_or(false)
    }

    /// 未訪問の入力ノードが残っているかどうかを判定します。
    #[inline]
    pub fn has_unvisited(&self) -> bool {
        self.visited_count < self.num_nodes()
    }

    /// 根として選択されたノードの位置を返します。
    #[inline]
    pub fn root(&self) -> Option<u32> {
        self.root
    }

    /// ノードのヘッドの位置を返します。未付属の場合は`None`を返します。
    #[inline]
    pub fn head_of(&self, position: u32) -> Option<u32> {
        match self.heads.get(position as usize).copied() {
            Some(0) | None => None,
            Some(head) => Some(head),
        }
    }

    /// ノードへの入力エッジのラベルIDを返します。
    ///
    /// 未付属の場合は`None`を返します。
    #[inline]
    pub fn incoming_label_of(&self, position: u32) -> Option<u32> {
        self.head_of(position)
            .map(|_| self.labels[position as usize])
    }

    /// ノードの子を付属順で返します。
    #[inline]
    pub fn children_of(&self, position: u32) -> &[u32] {
        self.children
            .get(position as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// ノードに最後に付属した子の位置を返します。
    ///
    /// 子がまだない場合は`None`を返します。
    #[inline]
    pub fn most_recent_child_of(&self, position: u32) -> Option<u32> {
        self.children_of(position).last().copied()
    }

    /// セッションが`Stop`で終了したかどうかを判定します。
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// これまでに消費されたステップ数を返します。
    ///
    /// ステップとして数えられるのは選択・`Pop`・`Stop`の決定のみです。
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// 語彙への参照を返します。
    #[inline]
    pub fn lexicon(&self) -> &AdditionalLexicon {
        &self.lexicon
    }

    /// ノードを訪問済みとして記録します。
    #[inline]
    pub(crate) fn mark_visited(&mut self, position: u32) {
        let slot = &mut self.visited[position as usize];
        if !*slot {
            *slot = true;
            self.visited_count += 1;
        }
    }

    /// 選択・`Pop`・`Stop`の決定を1ステップとして数えます。
    #[inline]
    pub(crate) fn note_step(&mut self) {
        self.steps += 1;
    }
}
