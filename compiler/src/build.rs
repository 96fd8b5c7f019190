//! 語彙アーカイブのビルドモジュール
//!
//! このモジュールは、ラベルファイルからコンパイル済みの語彙アーカイブを
//! 構築する機能を提供します。入力は1行につき1ラベルのテキストファイルで、
//! 行の順序がIDを定義します。

use std::fs::File;
use std::io;
use std::path::PathBuf;

use clap::Parser;

use amparse::errors::AmparseError;
use amparse::lexicon::AdditionalLexicon;

/// ビルドコマンドの引数
///
/// 語彙アーカイブをビルドするために必要な入力ファイルと出力先を指定します。
#[derive(Parser, Debug)]
#[clap(name = "build", about = "A program to build the compiled lexicon.")]
pub struct Args {
    /// Edge label file. One label per line; line order defines the id.
    #[clap(short = 'e', long)]
    edge_labels_in: PathBuf,

    /// Lexical type file. One type per line; line order defines the id.
    #[clap(short = 't', long)]
    term_types_in: PathBuf,

    /// File to which the compiled lexicon is output.
    #[clap(short = 'o', long)]
    lexicon_out: PathBuf,
}

/// ビルド処理中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 語彙構築エラー
    #[error("Lexicon building failed: {0}")]
    Amparse(#[from] AmparseError),
}

/// ビルドコマンドを実行する
///
/// 2つのラベルファイルから語彙を構築し、rkyv形式で保存します。
///
/// # 引数
///
/// * `args` - ビルドコマンドの引数
///
/// # エラー
///
/// ファイルの読み書きや語彙の構築に失敗した場合、`BuildError`を返します。
pub fn run(args: Args) -> Result<(), BuildError> {
    eprintln!("Building the lexicon...");
    let edge_label_rdr = File::open(&args.edge_labels_in)?;
    let term_type_rdr = File::open(&args.term_types_in)?;
    let lexicon = AdditionalLexicon::from_readers(edge_label_rdr, term_type_rdr)?;

    eprintln!(
        "Writing the compiled lexicon to {}...",
        args.lexicon_out.display()
    );
    let mut file = File::create(&args.lexicon_out)?;
    lexicon.write(&mut file)?;

    eprintln!(
        "Compiled {} edge labels and {} lexical types.",
        lexicon.edge_labels().len(),
        lexicon.term_types().len()
    );
    Ok(())
}
