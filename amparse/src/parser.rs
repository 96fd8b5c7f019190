//! 貪欲法に基づくグラフデコーダ。
//!
//! このモジュールは、スコア列からグラフを再構築するメインパーサーを
//! 提供します。各ステップで外部のスコアラーが行動空間上の分布を返し、
//! パーサーは正当な行動のうち最高スコアのものを決定的に選択します。
//!
//! # 主要な構造体
//!
//! - [`Parser`]: 語彙と構成を保持するメインパーサー構造体
//! - [`Worker`]: パーサーのワーカー。実際のデコード処理を行う
//!
//! # 例
//!
//! ```
//! use std::sync::Arc;
//! use amparse::config::{ParserConfig, TransitionVariant};
//! use amparse::graph::Graph;
//! use amparse::lexicon::AdditionalLexicon;
//! use amparse::parser::{OneHotReplay, Parser};
//!
//! let lexicon = Arc::new(AdditionalLexicon::from_readers(
//!     "L1\nL2\n".as_bytes(),
//!     "(s)\n".as_bytes(),
//! )?);
//!
//! let mut gold = Graph::new();
//! let root = gold.add_node("likes", None);
//! let a = gold.add_node("cat", None);
//! gold.set_root(root);
//! gold.add_edge(root, a, "L1");
//!
//! let parser = Parser::new(lexicon, ParserConfig::new(TransitionVariant::Dfs));
//! let mut worker = parser.new_worker();
//!
//! let oracle = parser.system().oracle(&gold)?;
//! let codec = parser.codec_for(gold.len());
//! let ids = codec.encode_actions(&oracle)?;
//!
//! worker.reset_nodes(gold.nodes());
//! let mut scorer = OneHotReplay::new(ids);
//! worker.decode(&mut scorer);
//!
//! assert_eq!(worker.retrieve_parse(), gold);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod worker;

use std::sync::Arc;

use crate::config::ParserConfig;
use crate::context::{ContextProvider, FeatureVector};
use crate::lexicon::AdditionalLexicon;
use crate::transition::{build_system, ActionCodec, ParserState, TransitionSystem};

pub use crate::parser::worker::Worker;

/// 行動空間上のスコア分布を供給するトレイト。
///
/// 学習済みの系列モデルがこの境界の外側の協力者として実装します。
/// このクレート自体は決定的な再生のための[`OneHotReplay`]を提供します。
pub trait ActionScorer {
    /// 現在の状態とコンテキスト特徴からスコア分布を計算します。
    ///
    /// # 引数
    ///
    /// * `state` - 現在の解析状態
    /// * `context` - コンテキストプロバイダが計算した特徴ベクトル。
    ///   プロバイダが構成されていない場合は空
    /// * `scores` - 出力先。コーデックのID空間のサイズに合わせて
    ///   埋め直されます
    fn score(&mut self, state: &ParserState, context: &FeatureVector, scores: &mut Vec<f32>);
}

/// ワイヤID列を1-hotスコアとして再生するスコアラー
///
/// オラクル抽出された行動列を決定的にグラフへ復号するために使用します。
/// ID列を使い切った後はすべてのスコアが0になり、デコーダは最小IDの
/// 正当な行動を選び続けて停止します。
pub struct OneHotReplay {
    ids: Vec<u32>,
    cursor: usize,
}

impl OneHotReplay {
    /// 新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `ids` - 再生するワイヤID列
    pub fn new(ids: Vec<u32>) -> Self {
        Self { ids, cursor: 0 }
    }
}

impl ActionScorer for OneHotReplay {
    fn score(&mut self, _state: &ParserState, _context: &FeatureVector, scores: &mut Vec<f32>) {
        if let Some(&id) = self.ids.get(self.cursor) {
            if let Some(slot) = scores.get_mut(id as usize) {
                *slot = 1.0;
            }
        }
        self.cursor += 1;
    }
}

/// グラフのデコードを行うパーサー。
///
/// `Parser`は語彙データと構成を保持し、複数の[`Worker`]インスタンスを
/// 生成して並列処理を行うことができます。デコードセッションは互いに
/// 可変状態を共有せず、共有されるのは読み込み後に不変の語彙だけです。
#[derive(Clone)]
pub struct Parser {
    lexicon: Arc<AdditionalLexicon>,
    config: ParserConfig,
    system: Arc<dyn TransitionSystem>,
    context_provider: Option<Arc<dyn ContextProvider>>,
}

impl Parser {
    /// 新しいパーサーを作成します。
    ///
    /// # 引数
    ///
    /// * `lexicon` - 共有語彙
    /// * `config` - パーサー構成
    pub fn new(lexicon: Arc<AdditionalLexicon>, config: ParserConfig) -> Self {
        let system = build_system(&config, lexicon.clone());
        Self {
            lexicon,
            config,
            system,
            context_provider: None,
        }
    }

    /// コンテキストプロバイダを設定します。
    ///
    /// 設定されたプロバイダは各ステップの前に状態を観測し、その特徴
    /// ベクトルがスコアラーに渡されます。
    ///
    /// # 引数
    ///
    /// * `provider` - 設定するプロバイダ
    ///
    /// # 戻り値
    ///
    /// 設定が適用された`Parser`インスタンス
    pub fn with_context_provider(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        self.context_provider = Some(provider);
        self
    }

    /// 語彙への参照を取得します。
    #[inline]
    pub fn lexicon(&self) -> &Arc<AdditionalLexicon> {
        &self.lexicon
    }

    /// 構成への参照を取得します。
    #[inline]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// 遷移システムへの参照を取得します。
    #[inline]
    pub fn system(&self) -> &dyn TransitionSystem {
        &*self.system
    }

    /// コンテキストプロバイダへの参照を取得します。
    #[inline]
    pub fn context_provider(&self) -> Option<&Arc<dyn ContextProvider>> {
        self.context_provider.as_ref()
    }

    /// 指定された入力長の行動コーデックを作成します。
    ///
    /// # 引数
    ///
    /// * `num_positions` - 入力ノード数
    pub fn codec_for(&self, num_positions: usize) -> ActionCodec {
        ActionCodec::new(
            num_positions as u32,
            self.lexicon.edge_labels().len() as u32,
            self.config.pop_with_0,
        )
    }

    /// 新しいワーカーを作成します。
    ///
    /// ワーカーは実際のデコード処理を実行するために使用されます。
    /// 各ワーカーは独立した解析状態を保持するため、複数のワーカーを
    /// 並列に使用して同時に複数の文をデコードできます。
    pub fn new_worker(&self) -> Worker {
        Worker::new(self.clone())
    }
}
