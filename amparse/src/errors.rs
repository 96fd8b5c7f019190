//! エラー型の定義
//!
//! このモジュールは、amparseライブラリで使用されるすべてのエラー型を定義します。

use std::error::Error;
use std::fmt::{self, Debug};

/// amparse専用のResult型
///
/// エラー型としてデフォルトで[`AmparseError`]を使用します。
pub type Result<T, E = AmparseError> = std::result::Result<T, E>;

/// amparseのエラー型
///
/// このライブラリで発生する可能性のあるすべてのエラーを表現します。
/// 各バリアントは特定のエラー条件に対応しています。
#[derive(Debug, thiserror::Error)]
pub enum AmparseError {
    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    ///
    /// [`InvalidFormatError`]のエラーバリアント。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 無効な状態エラー
    ///
    /// [`InvalidStateError`]のエラーバリアント。
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// オラクル抽出エラー
    ///
    /// [`OracleError`]のエラーバリアント。正解グラフを行動列に
    /// 線形化できない場合に発生します。
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// 未知ラベルエラー
    ///
    /// [`UnknownLabelError`]のエラーバリアント。
    #[error(transparent)]
    UnknownLabel(#[from] UnknownLabelError),

    /// 設定エラー
    ///
    /// [`ConfigurationError`]のエラーバリアント。起動時に致命的です。
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// 整数変換エラー
    ///
    /// [`TryFromIntError`](std::num::TryFromIntError)のエラーバリアント。
    #[error(transparent)]
    TryFromInt(std::num::TryFromIntError),

    /// 整数パースエラー
    ///
    /// [`ParseIntError`](std::num::ParseIntError)のエラーバリアント。
    #[error(transparent)]
    ParseInt(std::num::ParseIntError),

    /// UTF-8エンコーディングエラー
    ///
    /// [`std::str::Utf8Error`]のエラーバリアント。
    #[error(transparent)]
    Utf8(std::str::Utf8Error),

    /// I/Oエラー
    ///
    /// [`std::io::Error`](std::io::Error)のエラーバリアント。
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl AmparseError {
    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - フォーマット名
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効な状態エラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    /// * `cause` - エラーの原因
    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// 状態が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidStateError {
    /// エラーメッセージ
    pub(crate) msg: String,

    /// エラーの根本原因
    pub(crate) cause: String,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidStateError: {}: {}", self.msg, self.cause)
    }
}

impl Error for InvalidStateError {}

/// 正解グラフを行動列に線形化できない場合のエラー
///
/// オラクル抽出は、根から到達できないノード、深さ優先探索中に二度
/// 到達されるノード、語彙に存在しないラベルのいずれかに遭遇すると
/// 失敗します。呼び出し側は該当する文をスキップして処理を継続します。
#[derive(Debug, Clone, thiserror::Error)]
pub enum OracleError {
    /// 根が指定されていない
    #[error("no root node is designated in the gold graph")]
    MissingRoot,

    /// 根から到達できないノードが存在する
    #[error("node {position} is unreachable from the root")]
    Disconnected {
        /// 到達できないノードの位置（1始まり）
        position: u32,
    },

    /// 深さ優先探索中に同じノードに二度到達した
    ///
    /// 閉路または再入可能性（複数の親）を示します。
    #[error("node {position} is reached twice during depth-first traversal")]
    Cyclic {
        /// 二度到達されたノードの位置（1始まり）
        position: u32,
    },

    /// 語彙に存在しないラベルが参照された
    #[error(transparent)]
    UnknownLabel(#[from] UnknownLabelError),
}

/// ラベルやタイプのID検索が失敗した場合のエラー
///
/// 設定時の語彙不一致では致命的、コーパス処理中の単一の不正な文に
/// 起因する場合は該当文のスキップで回復可能です。
#[derive(Debug, Clone, thiserror::Error)]
#[error("label '{label}' is not present in sublexicon '{sublexicon}'")]
pub struct UnknownLabelError {
    /// 検索対象のサブ語彙の名前
    pub sublexicon: &'static str,

    /// 見つからなかったラベル
    pub label: String,
}

/// 構成が無効な場合のエラー
///
/// 起動時に致命的です。
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigurationError {
    /// 認識できない遷移システムのバリアント名
    #[error("unrecognized transition system variant: '{0}'")]
    UnknownVariant(String),

    /// 認識できない子ノード順序ポリシー名
    #[error("unrecognized children order: '{0}'")]
    UnknownChildrenOrder(String),

    /// コンテキストプロバイダの特徴次元の不一致
    #[error("context provider dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// 先頭のプロバイダが宣言した次元
        expected: usize,
        /// 一致しなかったプロバイダの次元
        found: usize,
    },

    /// コンテキストプロバイダが一つも設定されていない
    #[error("a composite context provider requires at least one member")]
    EmptyProviderSet,
}

impl From<std::num::TryFromIntError> for AmparseError {
    fn from(error: std::num::TryFromIntError) -> Self {
        Self::TryFromInt(error)
    }
}

impl From<std::num::ParseIntError> for AmparseError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::ParseInt(error)
    }
}

impl From<std::str::Utf8Error> for AmparseError {
    fn from(error: std::str::Utf8Error) -> Self {
        Self::Utf8(error)
    }
}
