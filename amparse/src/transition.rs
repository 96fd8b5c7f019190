//! 遷移システムの実装モジュール。
//!
//! このモジュールは、ラベル付きグラフと線形の行動列との間の双方向の
//! 対応付けを提供します。
//!
//! - **オラクル抽出** (グラフ → 行動列): 正解グラフを決定的な行動列に
//!   線形化し、学習時の教師信号を生成します。
//! - **適用** (行動 → 状態遷移): デコード中に行動を[`ParserState`]へ
//!   適用し、部分グラフを成長させます。
//!
//! # 主要な型
//!
//! - [`Action`]: パーサーの行動を表すタグ付きバリアント
//! - [`ActionCodec`]: 行動とワイヤ形式の整数IDの相互変換
//! - [`Dfs`]: 深さ優先の遷移システム（主要バリアント）
//! - [`DfsChildrenFirst`]: 子優先の深さ優先バリアント
//! - [`ParserState`]: 1つのデコードセッションが所有する可変状態

pub mod actions;
mod dfs;
mod state;

use std::sync::Arc;

pub use actions::{Action, ActionCodec};
pub use dfs::{Dfs, DfsChildrenFirst};
pub use state::ParserState;

use crate::config::{ParserConfig, TransitionVariant};
use crate::errors::OracleError;
use crate::graph::Graph;
use crate::lexicon::AdditionalLexicon;

/// グラフと行動列の双方向の対応付けを提供するトレイト。
///
/// 実装は子ノード順序ポリシーと共有の[`AdditionalLexicon`]を保持します。
/// `apply`と`is_legal`は正当性が保証された行動のみを前提とし、デコーダは
/// 常に`is_legal`でマスクしてから`apply`を呼び出します。
pub trait TransitionSystem: Send + Sync {
    /// バリアントの名前を返します。
    fn name(&self) -> &'static str;

    /// 正解グラフから行動列を抽出します。
    ///
    /// # エラー
    ///
    /// グラフが根から非連結、深さ優先探索中に閉路に到達、または語彙に
    /// 存在しないラベルを参照している場合、[`OracleError`]を返します。
    fn oracle(&self, graph: &Graph) -> Result<Vec<Action>, OracleError>;

    /// 行動を状態に適用します。
    ///
    /// 行動は[`TransitionSystem::is_legal`]を満たしている必要があります。
    fn apply(&self, state: &mut ParserState, action: Action);

    /// 行動が現在の状態で正当かどうかを判定します。
    ///
    /// 正当性の制約:
    ///
    /// - `Pop`は空のフロンティアまたはエッジ保留中には不可
    /// - `MakeEdge`はフロンティアが空、エッジ保留中、または未訪問ノードが
    ///   残っていない場合は不可
    /// - `SelectNode`は訪問済みノードには不可。解析の途中ではエッジ保留中
    ///   にのみ可
    /// - `Stop`はフロンティアが空の場合にのみ可
    fn is_legal(&self, state: &ParserState, action: Action) -> bool {
        if state.is_done() {
            return false;
        }
        match action {
            Action::Stop => state.stack().is_empty(),
            Action::Pop => !state.stack().is_empty() && state.pending_label().is_none(),
            Action::MakeEdge(label) => {
                !state.stack().is_empty()
                    && state.pending_label().is_none()
                    && state.has_unvisited()
                    && (label as usize) < state.lexicon().edge_labels().len()
            }
            Action::SelectNode(position) => {
                if position == 0
                    || position as usize > state.num_nodes()
                    || state.is_visited(position)
                {
                    return false;
                }
                if state.stack().is_empty() {
                    // The first selection designates the root.
                    state.root().is_none()
                } else {
                    state.pending_label().is_some()
                }
            }
        }
    }

    /// デコードセッションが終了したかどうかを判定します。
    fn is_complete(&self, state: &ParserState) -> bool {
        state.is_done()
    }
}

/// 構成に対応する遷移システムを構築します。
///
/// # 引数
///
/// * `config` - パーサー構成
/// * `lexicon` - 共有語彙
pub fn build_system(
    config: &ParserConfig,
    lexicon: Arc<AdditionalLexicon>,
) -> Arc<dyn TransitionSystem> {
    match config.variant {
        TransitionVariant::Dfs => Arc::new(Dfs::new(config.children_order, lexicon)),
        TransitionVariant::DfsChildrenFirst => {
            Arc::new(DfsChildrenFirst::new(config.children_order, lexicon))
        }
    }
}
