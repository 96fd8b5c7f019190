//! グラフのデコードを実行するユーティリティ
//!
//! このバイナリは、行動IDが付与されたコーパスを読み込み、行動列を
//! 1-hotスコアとして貪欲デコーダで再生してグラフを再構築し、指定された
//! 出力形式（conll、check）で結果を出力します。

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use amparse::config::{ChildrenOrder, ParserConfig, TransitionVariant};
use amparse::corpus::{Corpus, Example};
use amparse::graph::check_correct;
use amparse::lexicon::{AdditionalLexicon, LoadMode};
use amparse::parser::{OneHotReplay, Parser as GraphParser};

use clap::Parser;

/// 出力モード
#[derive(Clone, Debug)]
enum OutputMode {
    Conll,
    Check,
}

/// `OutputMode` の `FromStr` 実装
impl FromStr for OutputMode {
    type Err = &'static str;

    /// 文字列から出力モードをパースする
    ///
    /// # 引数
    ///
    /// * `mode` - パース対象の文字列（"conll"、"check"のいずれか）
    ///
    /// # 戻り値
    ///
    /// パースに成功した場合は対応する `OutputMode`、失敗した場合はエラーメッセージ
    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "conll" => Ok(Self::Conll),
            "check" => Ok(Self::Check),
            _ => Err("Could not parse a mode"),
        }
    }
}

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "parse", about = "Decodes graphs from action sequences")]
struct Args {
    /// Action-annotated corpus.
    #[clap(short = 'i', long)]
    corpus_in: PathBuf,

    /// Compiled lexicon.
    #[clap(short = 'l', long)]
    lexicon_in: PathBuf,

    /// Transition system variant. Choices are dfs and dfs-children-first.
    #[clap(short = 's', long, default_value = "dfs")]
    system: String,

    /// Children order policy. Choices are LR, RL, and IO.
    #[clap(long, default_value = "IO")]
    children_order: String,

    /// Decodes Pop from the sentinel at the head of the edge label block.
    #[clap(long)]
    pop_with_0: bool,

    /// Skips the lexicon archive validation.
    #[clap(long)]
    trusted: bool,

    /// Output mode. Choices are conll and check.
    #[clap(short = 'O', long, default_value = "conll")]
    output_mode: OutputMode,
}

/// メイン関数
///
/// 語彙をロードし、コーパスの各例文の行動列をデコーダで再生して、
/// 再構築されたグラフを標準出力に出力します。checkモードでは再構築
/// 結果を元の注釈と比較し、一致数を報告します。
///
/// # 戻り値
///
/// 実行が成功した場合は `Ok(())`、エラーが発生した場合はエラー情報
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let variant = TransitionVariant::from_str(&args.system)?;
    let children_order = ChildrenOrder::from_str(&args.children_order)?;
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

    let parser = GraphParser::new(lexicon, config);
    let mut worker = parser.new_worker();

    eprintln!("Decoding...");

    let rdr = File::open(&args.corpus_in)?;
    let corpus = Corpus::from_reader(rdr)?;

    let out = std::io::stdout();
    let mut out = BufWriter::new(out.lock());

    let mut num_decoded = 0;
    let mut num_correct = 0;
    for (i, example) in corpus.iter().enumerate() {
        let Some(ids) = example.actions() else {
            eprintln!("Skipped example {}: no action sequence", i + 1);
            continue;
        };
        worker.reset_nodes(example.graph().nodes());
        let mut scorer = OneHotReplay::new(ids.to_vec());
        worker.decode(&mut scorer);
        let decoded = worker.retrieve_parse();
        num_decoded += 1;

        match args.output_mode {
            OutputMode::Conll => {
                Example::new(decoded).write(&mut out)?;
            }
            OutputMode::Check => {
                if check_correct(example.graph(), &decoded) {
                    num_correct += 1;
                }
            }
        }
    }

    match args.output_mode {
        OutputMode::Conll => out.flush()?,
        OutputMode::Check => {
            writeln!(&mut out, "Correct = {num_correct} / {num_decoded}")?;
            out.flush()?;
        }
    }

    Ok(())
}
