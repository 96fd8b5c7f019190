//! コンテキストプロバイダのモジュール。
//!
//! このモジュールは、行動の適用後の部分解析状態から補助的な特徴
//! ベクトルを導出する能力インターフェースを提供します。複数の
//! プロバイダが構成されている場合、それらの出力は要素ごとの加算で
//! 結合されます。すべてのプロバイダの出力次元は一致している必要が
//! あり、不一致は構築時に検出されます。

use std::sync::Arc;

use crate::errors::ConfigurationError;
use crate::transition::ParserState;

/// 固定幅の数値特徴ベクトル。
pub type FeatureVector = Vec<f32>;

/// 「該当なし」を表す埋め込みテーブルの行番号。
pub const NONE_INDEX: usize = 0;

/// 単純なf32の埋め込みテーブル
///
/// 行0は「該当なし」のために予約されています。範囲外の行番号の検索は
/// 「該当なし」の行にフォールバックします。デコードは決して失敗しない
/// ためです。
pub struct EmbeddingTable {
    dim: usize,
    weights: Vec<f32>,
}

impl EmbeddingTable {
    /// すべての重みが0の新しいテーブルを作成します。
    ///
    /// # 引数
    ///
    /// * `rows` - 行数（行0の「該当なし」を含む）
    /// * `dim` - 特徴ベクトルの次元
    pub fn zeros(rows: usize, dim: usize) -> Self {
        Self {
            dim,
            weights: vec![0.0; rows * dim],
        }
    }

    /// 行のリストから新しいテーブルを作成します。
    ///
    /// # エラー
    ///
    /// 行の次元が一致しない場合、[`ConfigurationError::DimensionMismatch`]
    /// を返します。
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, ConfigurationError> {
        let dim = rows.first().map_or(0, Vec::len);
        let mut weights = Vec::with_capacity(rows.len() * dim);
        for row in &rows {
            if row.len() != dim {
                return Err(ConfigurationError::DimensionMismatch {
                    expected: dim,
                    found: row.len(),
                });
            }
            weights.extend_from_slice(row);
        }
        Ok(Self { dim, weights })
    }

    /// 特徴ベクトルの次元を返します。
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// 行数を返します。
    #[inline]
    pub fn rows(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.weights.len() / self.dim
        }
    }

    /// 行を検索します。
    ///
    /// 範囲外の行番号は「該当なし」の行にフォールバックします。
    #[inline]
    pub fn row(&self, index: usize) -> &[f32] {
        let index = if index < self.rows() { index } else { NONE_INDEX };
        &self.weights[index * self.dim..(index + 1) * self.dim]
    }
}

/// 部分解析状態から特徴ベクトルを導出する能力インターフェース
///
/// プロバイダは状態を観測するだけで、変更しません。
pub trait ContextProvider: Send + Sync {
    /// 出力する特徴ベクトルの次元を返します。
    fn dim(&self) -> usize;

    /// 現在の状態から特徴ベクトルを計算します。
    fn observe(&self, state: &ParserState) -> FeatureVector;
}

/// フロンティア先頭に最後に付属した子を埋め込むプロバイダ
///
/// テーブルの行はノード位置で添字付けされます。フロンティアが空の場合、
/// または先頭のノードにまだ子がない場合は「該当なし」の行を返します。
pub struct MostRecentChild {
    table: EmbeddingTable,
}

impl MostRecentChild {
    /// 新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `table` - ノード位置で添字付けされた埋め込みテーブル
    pub fn new(table: EmbeddingTable) -> Self {
        Self { table }
    }
}

impl ContextProvider for MostRecentChild {
    fn dim(&self) -> usize {
        self.table.dim()
    }

    fn observe(&self, state: &ParserState) -> FeatureVector {
        let index = state
            .top()
            .and_then(|top| state.most_recent_child_of(top))
            .map_or(NONE_INDEX, |child| child as usize);
        self.table.row(index).to_vec()
    }
}

/// フロンティア先頭のノードの語彙タイプを埋め込むプロバイダ
///
/// テーブルの行は`term_types`サブ語彙のID + 1で添字付けされます。
/// フロンティアが空の場合、またはノードが語彙タイプを持たない場合は
/// 「該当なし」の行を返します。
pub struct TypeEmbedder {
    table: EmbeddingTable,
}

impl TypeEmbedder {
    /// 新しいインスタンスを作成します。
    pub fn new(table: EmbeddingTable) -> Self {
        Self { table }
    }
}

impl ContextProvider for TypeEmbedder {
    fn dim(&self) -> usize {
        self.table.dim()
    }

    fn observe(&self, state: &ParserState) -> FeatureVector {
        let index = state
            .top()
            .and_then(|top| state.nodes().get(top as usize - 1))
            .and_then(|node| node.lex_type())
            .and_then(|lex_type| state.lexicon().term_types().get_id(lex_type))
            .map_or(NONE_INDEX, |id| id as usize + 1);
        self.table.row(index).to_vec()
    }
}

/// フロンティア先頭に最後に付属した子のエッジラベルを埋め込むプロバイダ
///
/// テーブルの行は`edge_labels`サブ語彙のID + 1で添字付けされます。
pub struct LabelEmbedder {
    table: EmbeddingTable,
}

impl LabelEmbedder {
    /// 新しいインスタンスを作成します。
    pub fn new(table: EmbeddingTable) -> Self {
        Self { table }
    }
}

impl ContextProvider for LabelEmbedder {
    fn dim(&self) -> usize {
        self.table.dim()
    }

    fn observe(&self, state: &ParserState) -> FeatureVector {
        let index = state
            .top()
            .and_then(|top| state.most_recent_child_of(top))
            .and_then(|child| state.incoming_label_of(child))
            .map_or(NONE_INDEX, |id| id as usize + 1);
        self.table.row(index).to_vec()
    }
}

/// 複数のプロバイダの出力を加算で結合する複合プロバイダ
///
/// # 例
///
/// ```
/// use std::sync::Arc;
/// use amparse::context::{
///     ContextProvider, EmbeddingTable, MostRecentChild, SumContextProvider, TypeEmbedder,
/// };
///
/// let providers: Vec<Arc<dyn ContextProvider>> = vec![
///     Arc::new(MostRecentChild::new(EmbeddingTable::zeros(8, 4))),
///     Arc::new(TypeEmbedder::new(EmbeddingTable::zeros(3, 4))),
/// ];
/// let combined = SumContextProvider::new(providers)?;
/// assert_eq!(combined.dim(), 4);
/// # Ok::<(), amparse::errors::ConfigurationError>(())
/// ```
pub struct SumContextProvider {
    providers: Vec<Arc<dyn ContextProvider>>,
    dim: usize,
}

impl std::fmt::Debug for SumContextProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SumContextProvider")
            .field("providers", &self.providers.len())
            .field("dim", &self.dim)
            .finish()
    }
}

impl SumContextProvider {
    /// 新しい複合プロバイダを作成します。
    ///
    /// # エラー
    ///
    /// プロバイダが空の場合は[`ConfigurationError::EmptyProviderSet`]、
    /// 次元が一致しない場合は[`ConfigurationError::DimensionMismatch`]を
    /// 返します。起動時に致命的として扱ってください。
    pub fn new(providers: Vec<Arc<dyn ContextProvider>>) -> Result<Self, ConfigurationError> {
        let Some(first) = providers.first() else {
            return Err(ConfigurationError::EmptyProviderSet);
        };
        let dim = first.dim();
        for provider in &providers[1..] {
            if provider.dim() != dim {
                return Err(ConfigurationError::DimensionMismatch {
                    expected: dim,
                    found: provider.dim(),
                });
            }
        }
        Ok(Self { providers, dim })
    }
}

impl ContextProvider for SumContextProvider {
    fn dim(&self) -> usize {
        self.dim
    }

    fn observe(&self, state: &ParserState) -> FeatureVector {
        let mut sum = vec![0.0; self.dim];
        for provider in &self.providers {
            let features = provider.observe(state);
            for (acc, value) in sum.iter_mut().zip(features.iter()) {
                *acc += value;
            }
        }
        sum
    }
}
