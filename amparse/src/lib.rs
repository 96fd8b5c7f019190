//! # amparse
//!
//! amparseは、遷移ベースのAMR依存構造解析のためのデコーダコアの実装です。
//!
//! ## 概要
//!
//! このライブラリは、ラベル付きグラフと線形のパーサー行動列との間の
//! 双方向の対応付けを提供します。正解グラフから決定的な行動列を抽出して
//! 学習の教師信号とし（オラクル抽出）、推論時には外部のスコアラーが
//! 供給する分布から貪欲に行動を選択してグラフを再構築します（デコード）。
//!
//! ## 主な機能
//!
//! - **オラクル抽出**: 深さ優先（`dfs`）および子優先
//!   （`dfs-children-first`）の走査による決定的な線形化
//! - **貪欲デコード**: 正当性マスクと最小ID優先の同点解消による
//!   再現可能なグラフ再構築。ステップ上限により常に停止します
//! - **閉じた語彙**: エッジラベルと語彙タイプの不変な語彙。rkyvによる
//!   コンパイル済みアーカイブの読み書きに対応
//! - **コンテキストプロバイダ**: 部分解析状態から導出される補助特徴。
//!   加算によって合成できます
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use amparse::config::{ParserConfig, TransitionVariant};
//! use amparse::graph::Graph;
//! use amparse::lexicon::AdditionalLexicon;
//! use amparse::parser::{OneHotReplay, Parser};
//!
//! let lexicon = Arc::new(AdditionalLexicon::from_readers(
//!     "APP_s\nMOD_m\n".as_bytes(),
//!     "(s)\n()\n".as_bytes(),
//! )?);
//!
//! let mut gold = Graph::new();
//! let root = gold.add_node("likes", Some("()"));
//! let arg = gold.add_node("cat", Some("(s)"));
//! gold.set_root(root);
//! gold.add_edge(root, arg, "APP_s");
//!
//! let parser = Parser::new(lexicon, ParserConfig::new(TransitionVariant::Dfs));
//!
//! // 正解グラフを行動列に線形化します。
//! let oracle = parser.system().oracle(&gold)?;
//! let ids = parser.codec_for(gold.len()).encode_actions(&oracle)?;
//!
//! // 行動列を1-hotスコアとして再生すると、元のグラフが再構築されます。
//! let mut worker = parser.new_worker();
//! worker.reset_nodes(gold.nodes());
//! worker.decode(&mut OneHotReplay::new(ids));
//! assert_eq!(worker.retrieve_parse(), gold);
//! # Ok(())
//! # }
//! ```

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

/// パーサー構成の定義
pub mod config;

/// コンテキストプロバイダの実装
pub mod context;

/// コーパスの読み書き
pub mod corpus;

/// エラー型の定義
pub mod errors;

/// グラフの内部表現
pub mod graph;

/// ラベル語彙の管理
pub mod lexicon;

/// 貪欲デコーダの実装
pub mod parser;

/// 遷移システムの実装
pub mod transition;

#[cfg(test)]
mod tests;

// Re-exports
pub use config::{ChildrenOrder, ParserConfig, TransitionVariant};
pub use lexicon::{AdditionalLexicon, LoadMode};
pub use parser::Parser;

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
