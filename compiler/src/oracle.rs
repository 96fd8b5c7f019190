//! オラクル抽出モジュール
//!
//! このモジュールは、注釈付きコーパスの各例文を決定的な行動列に
//! 線形化し、ワイヤ形式の行動IDを付与したコーパスを出力する機能を
//! 提供します。例文ごとの抽出は互いに独立であるため、ワーカー
//! スレッドに分散して並列に実行されます。
//!
//! 線形化できない例文（根から非連結、閉路、語彙に存在しないラベル）は
//! 報告のうえスキップされ、バッチ全体は失敗しません。

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;
use rayon::prelude::*;

use amparse::config::{ChildrenOrder, ParserConfig, TransitionVariant};
use amparse::corpus::Corpus;
use amparse::errors::AmparseError;
use amparse::lexicon::{AdditionalLexicon, LoadMode};
use amparse::transition::{build_system, ActionCodec};

/// オラクル抽出コマンドの引数
#[derive(Parser, Debug)]
#[clap(name = "oracle", about = "Extracts oracle action sequences from a corpus.")]
pub struct Args {
    /// Annotated corpus to be linearized.
    #[clap(short = 'c', long)]
    corpus_in: PathBuf,

    /// Compiled lexicon.
    #[clap(short = 'l', long)]
    lexicon_in: PathBuf,

    /// File to which the action-annotated corpus is output.
    #[clap(short = 'o', long)]
    corpus_out: PathBuf,

    /// Transition system variant. Choices are dfs and dfs-children-first.
    #[clap(short = 's', long, default_value = "dfs")]
    system: String,

    /// Children order policy. Choices are LR, RL, and IO.
    #[clap(long, default_value = "IO")]
    children_order: String,

    /// Encodes Pop as the sentinel at the head of the edge label block.
    #[clap(long)]
    pop_with_0: bool,

    /// Skips the lexicon archive validation.
    #[clap(long)]
    trusted: bool,

    /// Number of worker threads.
    #[clap(long, default_value = "4")]
    num_threads: usize,
}

/// オラクル抽出中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum OracleCommandError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 語彙の読み込みまたはコーパスの解析のエラー
    #[error("Oracle extraction failed: {0}")]
    Amparse(#[from] AmparseError),

    /// スレッドプールの構築エラー
    #[error("Thread pool building failed: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// オラクル抽出コマンドを実行する
///
/// コーパスの各例文を行動列に線形化し、行動IDを付与したコーパスを
/// 出力します。線形化できない例文は報告のうえスキップされます。
///
/// # 引数
///
/// * `args` - オラクル抽出コマンドの引数
///
/// # エラー
///
/// 語彙またはコーパスが読み込めない場合、構成が不正な場合、
/// および出力の書き込みに失敗した場合、`OracleCommandError`を返します。
pub fn run(args: Args) -> Result<(), OracleCommandError> {
    // Configuration errors are fatal before any corpus work starts.
    let variant = TransitionVariant::from_str(&args.system).map_err(AmparseError::from)?;
    let children_order =
        ChildrenOrder::from_str(&args.children_order).map_err(AmparseError::from)?;
    let config = ParserConfig::new(variant)
        .children_order(children_order)
        .pop_with_0(args.pop_with_0);

    let load_mode = if args.trusted {
        LoadMode::Trusted
    } else {
        LoadMode::Validate
    };

    eprintln!("Loading the lexicon...");
    let lexicon = Arc::new(AdditionalLexicon::from_path(&args.lexicon_in, load_mode)?);

    eprintln!("Loading the corpus...");
    let rdr = File::open(&args.corpus_in)?;
    let mut corpus = Corpus::from_reader(rdr)?;

    let system = build_system(&config, lexicon.clone());
    let num_edge_labels = lexicon.edge_labels().len() as u32;

    eprintln!("Extracting oracle sequences with {} threads...", args.num_threads);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.num_threads)
        .build()?;
    let results: Vec<Result<Vec<u32>, AmparseError>> = pool.install(|| {
        corpus
            .par_iter()
            .map(|example| {
                let graph = example.graph();
                let actions = system.oracle(graph)?;
                let codec =
                    ActionCodec::new(graph.len() as u32, num_edge_labels, config.pop_with_0);
                Ok(codec.encode_actions(&actions)?)
            })
            .collect()
    });

    let mut num_skipped = 0;
    for (i, (example, result)) in corpus.iter_mut().zip(results).enumerate() {
        match result {
            Ok(ids) => example.set_actions(ids),
            Err(e) => {
                num_skipped += 1;
                eprintln!("Skipped example {}: {}", i + 1, e);
            }
        }
    }

    let file = File::create(&args.corpus_out)?;
    let mut wtr = BufWriter::new(file);
    let mut num_written = 0;
    for example in corpus.iter() {
        if example.actions().is_some() {
            example.write(&mut wtr)?;
            num_written += 1;
        }
    }

    eprintln!("Wrote {num_written} examples (skipped {num_skipped}).");
    Ok(())
}
