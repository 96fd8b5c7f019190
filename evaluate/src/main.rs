//! デコード結果の精度を評価するユーティリティ
//!
//! このバイナリは、正解コーパスとシステム出力コーパスを比較して、
//! 係り受け精度（UAS、LAS）、ラベル精度、および完全一致率を計算します。

use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use amparse::corpus::Corpus;
use amparse::graph::Graph;

use clap::Parser;

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "evaluate", about = "Evaluate the decoding accuracy")]
struct Args {
    /// Gold corpus.
    #[clap(short = 'g', long)]
    gold_in: PathBuf,

    /// System output corpus.
    #[clap(short = 's', long)]
    system_in: PathBuf,
}

/// ノードの入力エッジを`(ヘッド, ラベル)`の組として返します。
///
/// 根および未付属のノードはヘッド0として扱います。
fn incoming(graph: &Graph, position: u32) -> (u32, &str) {
    graph.head_of(position).unwrap_or((0, ""))
}

/// メイン関数
///
/// 2つのコーパスを例文ごとに比較し、UAS、LAS、ラベル精度、完全一致率を
/// 標準出力に出力します。
///
/// # 戻り値
///
/// 実行が成功した場合は `Ok(())`、エラーが発生した場合はエラー情報
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let gold = Corpus::from_reader(File::open(args.gold_in)?)?;
    let system = Corpus::from_reader(File::open(args.system_in)?)?;

    if gold.len() != system.len() {
        return Err(format!(
            "The corpora have different numbers of examples: {} vs {}",
            gold.len(),
            system.len()
        )
        .into());
    }

    let mut num_tokens = 0;
    let mut num_head_correct = 0;
    let mut num_label_correct = 0;
    let mut num_both_correct = 0;
    let mut num_exact = 0;
    for (gold_example, system_example) in gold.iter().zip(system.iter()) {
        let gold_graph = gold_example.graph();
        let system_graph = system_example.graph();
        if gold_graph.len() != system_graph.len() {
            return Err(format!(
                "Example node counts differ: {} vs {}",
                gold_graph.len(),
                system_graph.len()
            )
            .into());
        }

        for position in 1..=gold_graph.len() as u32 {
            let (gold_head, gold_label) = incoming(gold_graph, position);
            let (system_head, system_label) = incoming(system_graph, position);
            num_tokens += 1;
            if gold_head == system_head {
                num_head_correct += 1;
            }
            if gold_label == system_label {
                num_label_correct += 1;
            }
            if gold_head == system_head && gold_label == system_label {
                num_both_correct += 1;
            }
        }
        if gold_graph == system_graph {
            num_exact += 1;
        }
    }

    let uas = num_head_correct as f64 / num_tokens as f64;
    let las = num_both_correct as f64 / num_tokens as f64;
    let label_accuracy = num_label_correct as f64 / num_tokens as f64;
    let exact_match = num_exact as f64 / gold.len() as f64;
    println!("UAS = {uas}");
    println!("LAS = {las}");
    println!("Label accuracy = {label_accuracy}");
    println!("Exact match = {exact_match}");

    Ok(())
}
