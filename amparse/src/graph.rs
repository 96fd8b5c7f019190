//! ラベル付きグラフの内部表現を提供するモジュール
//!
//! このモジュールは、文の上に張られた根付きラベル付きグラフの表現を
//! 提供します。ノードは1始まりの位置で識別され、位置0はどのノードでも
//! ない人工的な番兵として予約されています。
//!
//! 正解コーパス由来のグラフは根から非連結であったり閉路を含むことが
//! あります。その検出は読み込み時ではなくオラクル抽出時に行われます。

/// 付属していない子を示す予約済みエッジラベル。
///
/// このラベルを持つエッジの部分木はオラクル抽出でスキップされます。
pub const IGNORE_EDGE_LABEL: &str = "IGNORE";

/// 語彙タイプが存在しないことを示すコーパス上の表記。
pub const NO_TYPE: &str = "_";

/// グラフのノード
///
/// 1始まりの位置、表層形、および任意の語彙タイプを保持します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    position: u32,
    form: String,
    lex_type: Option<String>,
}

impl Node {
    /// ノードの位置（1始まり）を返します。
    #[inline]
    pub fn position(&self) -> u32 {
        self.position
    }

    /// ノードの表層形を返します。
    #[inline]
    pub fn form(&self) -> &str {
        &self.form
    }

    /// ノードの語彙タイプを返します。
    #[inline]
    pub fn lex_type(&self) -> Option<&str> {
        self.lex_type.as_deref()
    }
}

/// 有向ラベル付きエッジ
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge {
    source: u32,
    target: u32,
    label: String,
}

impl Edge {
    /// エッジの始点の位置を返します。
    #[inline]
    pub fn source(&self) -> u32 {
        self.source
    }

    /// エッジの終点の位置を返します。
    #[inline]
    pub fn target(&self) -> u32 {
        self.target
    }

    /// エッジのラベルを返します。
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// 根付きラベル付きグラフ
///
/// ノードの集合と有向ラベル付きエッジの集合、および高々一つの根の指定から
/// なります。等価性はエッジの挿入順序に依存しません。
///
/// # 例
///
/// ```
/// use amparse::graph::Graph;
///
/// let mut g = Graph::new();
/// let root = g.add_node("likes", None);
/// let a = g.add_node("cat", Some("(s)"));
/// g.set_root(root);
/// g.add_edge(root, a, "APP_s");
/// assert_eq!(g.len(), 2);
/// assert_eq!(g.head_of(a), Some((root, "APP_s")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    root: Option<u32>,
}

impl Graph {
    /// 新しい空のグラフを生成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// ノードを追加し、その位置を返します。
    ///
    /// 位置は追加順に1から割り当てられます。
    ///
    /// # 引数
    ///
    /// * `form` - 表層形
    /// * `lex_type` - 語彙タイプ。持たない場合は`None`
    pub fn add_node<S>(&mut self, form: S, lex_type: Option<&str>) -> u32
    where
        S: Into<String>,
    {
        let position = self.nodes.len() as u32 + 1;
        self.nodes.push(Node {
            position,
            form: form.into(),
            lex_type: lex_type.map(str::to_string),
        });
        position
    }

    /// 有向ラベル付きエッジを追加します。
    ///
    /// # 引数
    ///
    /// * `source` - 始点の位置
    /// * `target` - 終点の位置
    /// * `label` - エッジラベル
    pub fn add_edge<S>(&mut self, source: u32, target: u32, label: S)
    where
        S: Into<String>,
    {
        debug_assert!(source >= 1 && source as usize <= self.nodes.len());
        debug_assert!(target >= 1 && target as usize <= self.nodes.len());
        self.edges.push(Edge {
            source,
            target,
            label: label.into(),
        });
    }

    /// 根を指定します。
    pub fn set_root(&mut self, position: u32) {
        self.root = Some(position);
    }

    /// 根の位置を返します。指定されていない場合は`None`を返します。
    #[inline]
    pub fn root(&self) -> Option<u32> {
        self.root
    }

    /// 位置に対応するノードを取得します。
    #[inline]
    pub fn node(&self, position: u32) -> Option<&Node> {
        if position == 0 {
            return None;
        }
        self.nodes.get(position as usize - 1)
    }

    /// すべてのノードのスライスを返します。
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// すべてのエッジのスライスを返します。
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// ノード数を返します。
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// グラフが空かどうかを判定します。
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 指定されたノードから出るエッジを終点の位置の昇順で返します。
    ///
    /// 順序はエッジの挿入順序に依存しません。
    pub fn children_of(&self, position: u32) -> Vec<&Edge> {
        let mut children: Vec<&Edge> =
            self.edges.iter().filter(|e| e.source == position).collect();
        children.sort_by_key(|e| e.target);
        children
    }

    /// 指定されたノードに入るエッジの始点とラベルを返します。
    ///
    /// 入るエッジが複数ある場合は最初に挿入されたものを返します。
    pub fn head_of(&self, position: u32) -> Option<(u32, &str)> {
        self.edges
            .iter()
            .find(|e| e.target == position)
            .map(|e| (e.source, e.label.as_str()))
    }
}

/// 予測グラフが正解グラフと完全に一致するかを判定します。
///
/// 位置を揃えたノードごとにヘッド、入力エッジのラベル、および語彙タイプを
/// 比較します。ノード数が異なる場合は`false`を返します。
///
/// # 引数
///
/// * `gold` - 正解グラフ
/// * `predicted` - 予測グラフ
pub fn check_correct(gold: &Graph, predicted: &Graph) -> bool {
    if gold.len() != predicted.len() || gold.root() != predicted.root() {
        return false;
    }
    for position in 1..=gold.len() as u32 {
        if gold.head_of(position) != predicted.head_of(position) {
            return false;
        }
        let gold_type = gold.node(position).and_then(Node::lex_type);
        let predicted_type = predicted.node(position).and_then(Node::lex_type);
        if gold_type != predicted_type {
            return false;
        }
    }
    true
}

impl PartialEq for Graph {
    /// ノード集合、根、およびエッジ集合が一致するかを判定します。
    ///
    /// エッジはソートして比較するため、挿入順序は等価性に影響しません。
    fn eq(&self, other: &Self) -> bool {
        if self.nodes != other.nodes || self.root != other.root {
            return false;
        }
        let mut a: Vec<&Edge> = self.edges.iter().collect();
        let mut b: Vec<&Edge> = other.edges.iter().collect();
        a.sort();
        b.sort();
        a == b
    }
}

impl Eq for Graph {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_are_one_based() {
        let mut g = Graph::new();
        let a = g.add_node("a", None);
        let b = g.add_node("b", Some("(s)"));
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert!(g.node(0).is_none());
        assert_eq!(g.node(2).unwrap().lex_type(), Some("(s)"));
    }

    #[test]
    fn test_children_sorted_by_position() {
        let mut g = Graph::new();
        let p1 = g.add_node("a", None);
        let p2 = g.add_node("b", None);
        let p3 = g.add_node("c", None);
        let p4 = g.add_node("d", None);
        g.set_root(p3);
        // Inserted out of position order on purpose.
        g.add_edge(p3, p4, "L3");
        g.add_edge(p3, p1, "L1");
        g.add_edge(p3, p2, "L2");
        let children: Vec<u32> = g.children_of(p3).iter().map(|e| e.target()).collect();
        assert_eq!(children, vec![p1, p2, p4]);
    }

    #[test]
    fn test_check_correct() {
        let mut gold = Graph::new();
        let r = gold.add_node("r", None);
        let a = gold.add_node("a", Some("(s)"));
        gold.set_root(r);
        gold.add_edge(r, a, "L1");

        let mut same = gold.clone();
        assert!(check_correct(&gold, &same));

        // A differing edge label breaks the match.
        same = Graph::new();
        let r = same.add_node("r", None);
        let a = same.add_node("a", Some("(s)"));
        same.set_root(r);
        same.add_edge(r, a, "L2");
        assert!(!check_correct(&gold, &same));
    }

    #[test]
    fn test_equality_ignores_edge_order() {
        let mut g1 = Graph::new();
        let r = g1.add_node("r", None);
        let a = g1.add_node("a", None);
        let b = g1.add_node("b", None);
        g1.set_root(r);
        g1.add_edge(r, a, "L1");
        g1.add_edge(r, b, "L2");

        let mut g2 = Graph::new();
        let r = g2.add_node("r", None);
        let a = g2.add_node("a", None);
        let b = g2.add_node("b", None);
        g2.set_root(r);
        g2.add_edge(r, b, "L2");
        g2.add_edge(r, a, "L1");

        assert_eq!(g1, g2);
    }
}
