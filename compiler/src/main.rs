//! amparse 語彙コンパイラのメインエントリーポイント
//!
//! このモジュールは、デコードに必要なデータを準備するための
//! サブコマンドを提供します。ラベルファイルからのコンパイル済み語彙の
//! 構築と、コーパスからのオラクル行動列の抽出を統合したCLIツールです。

mod build;
mod oracle;

use clap::Parser;
use thiserror::Error;

use crate::{build::BuildError, oracle::OracleCommandError};

/// コマンドライン引数の構造体
///
/// `clap`を使用してコマンドライン引数をパースします。
#[derive(Parser, Debug)]
#[clap(name = "compile", version)]
struct Cli {
    /// 実行するサブコマンド
    #[clap(subcommand)]
    command: Command,
}

/// 利用可能なサブコマンド
#[derive(Parser, Debug)]
enum Command {
    /// ラベルファイルからコンパイル済み語彙を構築します
    ///
    /// エッジラベルと語彙タイプの2つのテキストファイルから、
    /// rkyv形式の語彙アーカイブを生成します。
    Build(build::Args),

    /// コーパスからオラクル行動列を抽出します
    ///
    /// 正解グラフを決定的な行動列に線形化し、行動IDを付与した
    /// コーパスを出力します。線形化できない例文はスキップされます。
    Oracle(oracle::Args),
}

/// コンパイラの実行中に発生する可能性のあるエラー
///
/// 各サブコマンドで発生したエラーをラップします。
#[derive(Debug, Error)]
pub enum CompileError {
    /// 語彙構築中のエラー
    #[error(transparent)]
    BuildError(#[from] BuildError),
    /// オラクル抽出中のエラー
    #[error(transparent)]
    OracleError(#[from] OracleCommandError),
}

/// メイン関数
///
/// コマンドライン引数をパースし、指定されたサブコマンドを実行します。
///
/// # 戻り値
///
/// 実行が成功した場合は`Ok(())`、失敗した場合は対応する`CompileError`を返します。
fn main() -> Result<(), CompileError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => Ok(build::run(args)?),
        Command::Oracle(args) => Ok(oracle::run(args)?),
    }
}
