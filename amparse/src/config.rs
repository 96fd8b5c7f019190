//! パーサー構成のモジュール
//!
//! このモジュールは、遷移システムのバリアントと子ノード順序ポリシーの
//! 選択を含む、不変のパーサー構成レコードを提供します。構成はプロセス
//! 全体の可変状態ではなく、常に明示的な値として構築関数に渡されます。

use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigurationError;

/// 遷移システムのバリアント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionVariant {
    /// 深さ優先。子エッジを作るたびに直ちにその部分木へ降下します。
    Dfs,
    /// 子優先の深さ優先。あるノードのすべての子エッジを作ってから
    /// 最初の子の部分木へ降下します。
    DfsChildrenFirst,
}

impl TransitionVariant {
    /// バリアントの名前を返します。
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dfs => "dfs",
            Self::DfsChildrenFirst => "dfs-children-first",
        }
    }
}

impl FromStr for TransitionVariant {
    type Err = ConfigurationError;

    /// 文字列からバリアントをパースします。
    ///
    /// # エラー
    ///
    /// 認識できない名前の場合、[`ConfigurationError::UnknownVariant`]を
    /// 返します。起動時に致命的として扱ってください。
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "dfs" => Ok(Self::Dfs),
            "dfs-children-first" => Ok(Self::DfsChildrenFirst),
            _ => Err(ConfigurationError::UnknownVariant(name.to_string())),
        }
    }
}

impl fmt::Display for TransitionVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 子ノードの訪問順序ポリシー
///
/// いずれのポリシーもノードの位置による全順序に基づいており、エッジの
/// 挿入順序には依存しません。これにより、同じグラフからのオラクル抽出は
/// 常に同一の行動列を生成します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildrenOrder {
    /// 左から右（位置の昇順）。
    LR,
    /// 右から左（位置の降順）。
    RL,
    /// 内から外。親より左の子を近い順に、次に親より右の子を近い順に
    /// 訪問します。
    IO,
}

impl FromStr for ChildrenOrder {
    type Err = ConfigurationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "LR" => Ok(Self::LR),
            "RL" => Ok(Self::RL),
            "IO" => Ok(Self::IO),
            _ => Err(ConfigurationError::UnknownChildrenOrder(name.to_string())),
        }
    }
}

impl fmt::Display for ChildrenOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::LR => "LR",
            Self::RL => "RL",
            Self::IO => "IO",
        };
        f.write_str(name)
    }
}

/// パーサーの不変の構成レコード
///
/// # 例
///
/// ```
/// use amparse::config::{ChildrenOrder, ParserConfig, TransitionVariant};
///
/// let config = ParserConfig::new(TransitionVariant::Dfs)
///     .children_order(ChildrenOrder::IO)
///     .pop_with_0(true);
/// assert!(config.pop_with_0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// 遷移システムのバリアント。
    pub variant: TransitionVariant,

    /// 子ノードの訪問順序ポリシー。
    pub children_order: ChildrenOrder,

    /// `Pop`を明示的な行動ではなくエッジラベル0の番兵として
    /// ワイヤ形式に符号化するかどうか。意味には影響しません。
    pub pop_with_0: bool,

    /// デコードのステップ上限。`None`の場合は`2 * ノード数 + 1`が
    /// 使用されます。
    pub max_steps: Option<usize>,
}

impl ParserConfig {
    /// 新しい構成を作成します。
    ///
    /// 子ノード順序は`IO`、`pop_with_0`は無効がデフォルトです。
    pub const fn new(variant: TransitionVariant) -> Self {
        Self {
            variant,
            children_order: ChildrenOrder::IO,
            pop_with_0: false,
            max_steps: None,
        }
    }

    /// 子ノードの訪問順序を設定します。
    pub const fn children_order(mut self, order: ChildrenOrder) -> Self {
        self.children_order = order;
        self
    }

    /// `Pop`の符号化方式を設定します。
    pub const fn pop_with_0(mut self, yes: bool) -> Self {
        self.pop_with_0 = yes;
        self
    }

    /// デコードのステップ上限を指定します。
    ///
    /// デフォルトでは、上限は`2 * ノード数 + 1`です。
    pub const fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new(TransitionVariant::Dfs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_from_str() {
        assert_eq!(
            TransitionVariant::from_str("dfs").unwrap(),
            TransitionVariant::Dfs
        );
        assert_eq!(
            TransitionVariant::from_str("dfs-children-first").unwrap(),
            TransitionVariant::DfsChildrenFirst
        );
    }

    #[test]
    fn test_unknown_variant_is_configuration_error() {
        let e = TransitionVariant::from_str("bfs").unwrap_err();
        assert!(matches!(e, ConfigurationError::UnknownVariant(_)));
    }

    #[test]
    fn test_unknown_children_order() {
        let e = ChildrenOrder::from_str("OI").unwrap_err();
        assert!(matches!(e, ConfigurationError::UnknownChildrenOrder(_)));
    }
}
