//! コーパスデータ構造のモジュール。
//!
//! このモジュールは、注釈付きコーパスの読み込みと管理に必要なデータ構造を
//! 提供します。コーパスは行ベースのタブ区切り形式で、各行が1ノードを表し、
//! `EOS`行が1つの例文を終端します。

use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::ops::{Deref, DerefMut};

use crate::errors::{AmparseError, Result};
use crate::graph::{Graph, NO_TYPE};

/// 根ノードの入力エッジ列に書かれる慣用的なラベル。
///
/// ヘッドが0の行のラベル列は読み込み時に無視されます。
pub const ROOT_LABEL: &str = "ROOT";

const ACTIONS_MARKER: &str = "ACTIONS";
const EOS_MARKER: &str = "EOS";

/// コーパスの1つの例文。
///
/// 正解グラフと、オラクル抽出コマンドが付与する任意の行動ID列を保持します。
pub struct Example {
    /// 例文のグラフ。
    pub(crate) graph: Graph,

    /// ワイヤ形式の行動ID列。オラクル抽出後にのみ存在します。
    pub(crate) actions: Option<Vec<u32>>,
}

impl Example {
    /// グラフから新しい例文を作成します。
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            actions: None,
        }
    }

    /// グラフへの参照を返します。
    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// 行動ID列を返します。付与されていない場合は`None`を返します。
    #[inline]
    pub fn actions(&self) -> Option<&[u32]> {
        self.actions.as_deref()
    }

    /// 行動ID列を付与します。
    pub fn set_actions(&mut self, actions: Vec<u32>) {
        self.actions = Some(actions);
    }

    /// 例文を指定されたシンクに書き込みます。
    ///
    /// # 引数
    ///
    /// * `wtr` - 書き込み先
    ///
    /// # エラー
    ///
    /// 書き込みに失敗した場合、I/Oエラーが返されます。
    pub fn write<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        let mut wtr = BufWriter::new(wtr);
        for node in self.graph.nodes().iter() {
            let position = node.position();
            let (head, label) = match self.graph.head_of(position) {
                Some((head, label)) => (head, label),
                None => (0, ROOT_LABEL),
            };
            writeln!(
                &mut wtr,
                "{}\t{}\t{}\t{}\t{}",
                position,
                node.form(),
                node.lex_type().unwrap_or(NO_TYPE),
                head,
                label,
            )?;
        }
        if let Some(actions) = &self.actions {
            let ids: Vec<String> = actions.iter().map(u32::to_string).collect();
            writeln!(&mut wtr, "{}\t{}", ACTIONS_MARKER, ids.join(" "))?;
        }
        writeln!(&mut wtr, "{EOS_MARKER}")?;
        Ok(())
    }
}

/// コーパスの表現。
///
/// 例文の集合を表します。
pub struct Corpus {
    /// 例文のリスト。
    pub(crate) examples: Vec<Example>,
}

impl Corpus {
    /// 指定されたシンクからコーパスを読み込みます。
    ///
    /// コーパスファイルは、各行が
    /// `位置\t表層形\t語彙タイプ\tヘッド\tラベル` の形式で、例文の終わりに
    /// `EOS` が含まれる形式を想定しています。語彙タイプが存在しない場合は
    /// `_` と書きます。ヘッド0は根の指定を意味し、そのラベル列は無視され
    /// ます。`ACTIONS\t<ID列>` の行は例文に行動ID列を付与します。
    ///
    /// # 引数
    ///
    /// * `rdr` - コーパスのリーダー
    ///
    /// # エラー
    ///
    /// 入力形式が不正な場合、[`AmparseError`] が返されます。
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let buf = BufReader::new(rdr);

        let mut examples = vec![];
        let mut graph = Graph::new();
        // (head, label) per node, resolved into edges at EOS because a head
        // may point forward to a node that has not been read yet.
        let mut heads: Vec<(u32, String)> = vec![];
        let mut actions: Option<Vec<u32>> = None;

        for line in buf.lines() {
            let line = line?;
            if line == EOS_MARKER {
                for (i, (head, label)) in heads.iter().enumerate() {
                    let target = i as u32 + 1;
                    if *head == 0 {
                        if graph.root().is_none() {
                            graph.set_root(target);
                        }
                    } else if *head as usize > graph.len() {
                        return Err(AmparseError::invalid_format(
                            "rdr",
                            format!("head {head} of node {target} is out of range"),
                        ));
                    } else {
                        graph.add_edge(*head, target, label.as_str());
                    }
                }
                if !graph.is_empty() {
                    let mut example = Example::new(graph);
                    example.actions = actions;
                    examples.push(example);
                }
                graph = Graph::new();
                heads = vec![];
                actions = None;
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() == 2 && fields[0] == ACTIONS_MARKER {
                let mut ids = vec![];
                for id in fields[1].split_whitespace() {
                    ids.push(id.parse::<u32>()?);
                }
                actions = Some(ids);
                continue;
            }
            if fields.len() != 5 {
                return Err(AmparseError::invalid_format(
                    "rdr",
                    "Each line must have five tab-separated fields, an ACTIONS line, or `EOS`",
                ));
            }

            let position: u32 = fields[0].parse()?;
            if position as usize != graph.len() + 1 {
                return Err(AmparseError::invalid_format(
                    "rdr",
                    format!("node positions must be consecutive from 1, found {position}"),
                ));
            }
            let lex_type = if fields[2] == NO_TYPE {
                None
            } else {
                Some(fields[2])
            };
            graph.add_node(fields[1], lex_type);

            let head: u32 = fields[3].parse()?;
            heads.push((head, fields[4].to_string()));
        }

        Ok(Self { examples })
    }

    /// コーパス全体を指定されたシンクに書き込みます。
    ///
    /// # エラー
    ///
    /// 書き込みに失敗した場合、I/Oエラーが返されます。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        for example in &self.examples {
            example.write(&mut wtr)?;
        }
        Ok(())
    }
}

impl Deref for Corpus {
    type Target = [Example];

    fn deref(&self) -> &Self::Target {
        &self.examples
    }
}

impl DerefMut for Corpus {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.examples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_corpus() {
        let corpus_data = "\
1\tthe\t_\t2\tMOD_m
2\tcat\t(s)\t3\tAPP_s
3\tsleeps\t()\t0\tROOT
EOS
1\train\t()\t0\tROOT
2\tfalls\t_\t1\tAPP_o
EOS
";

        let corpus = Corpus::from_reader(corpus_data.as_bytes()).unwrap();

        assert_eq!(2, corpus.examples.len());

        let g1 = corpus.examples[0].graph();
        assert_eq!(3, g1.len());
        assert_eq!(Some(3), g1.root());
        assert_eq!("the", g1.node(1).unwrap().form());
        assert_eq!(Some("(s)"), g1.node(2).unwrap().lex_type());
        assert_eq!(None, g1.node(1).unwrap().lex_type());
        assert_eq!(Some((2, "MOD_m")), g1.head_of(1));
        assert_eq!(Some((3, "APP_s")), g1.head_of(2));
        assert_eq!(None, g1.head_of(3));

        let g2 = corpus.examples[1].graph();
        assert_eq!(2, g2.len());
        assert_eq!(Some(1), g2.root());
        assert_eq!(Some((1, "APP_o")), g2.head_of(2));
    }

    #[test]
    fn test_forward_heads() {
        // A head may refer to a node that appears later in the file.
        let corpus_data = "1\ta\t_\t2\tAPP_s\n2\tb\t_\t0\tROOT\nEOS\n";
        let corpus = Corpus::from_reader(corpus_data.as_bytes()).unwrap();
        let g = corpus.examples[0].graph();
        assert_eq!(Some(2), g.root());
        assert_eq!(Some((2, "APP_s")), g.head_of(1));
    }

    #[test]
    fn test_actions_line() {
        let corpus_data = "1\ta\t_\t0\tROOT\nACTIONS\t1 4 2 3 0\nEOS\n";
        let corpus = Corpus::from_reader(corpus_data.as_bytes()).unwrap();
        assert_eq!(
            Some(&[1u32, 4, 2, 3, 0][..]),
            corpus.examples[0].actions()
        );
    }

    #[test]
    fn test_roundtrip() {
        let corpus_data = "\
1\tthe\t_\t2\tMOD_m
2\tcat\t(s)\t3\tAPP_s
3\tsleeps\t()\t0\tROOT
ACTIONS\t3 5 1 6 2
EOS
";
        let corpus = Corpus::from_reader(corpus_data.as_bytes()).unwrap();
        let mut out = vec![];
        corpus.write(&mut out).unwrap();
        assert_eq!(corpus_data, std::str::from_utf8(&out).unwrap());
    }

    #[test]
    fn test_malformed_line() {
        let corpus_data = "1\ta\t_\t0\nEOS\n";
        assert!(Corpus::from_reader(corpus_data.as_bytes()).is_err());
    }

    #[test]
    fn test_non_consecutive_positions() {
        let corpus_data = "2\ta\t_\t0\tROOT\nEOS\n";
        assert!(Corpus::from_reader(corpus_data.as_bytes()).is_err());
    }

    #[test]
    fn test_head_out_of_range() {
        let corpus_data = "1\ta\t_\t9\tAPP_s\nEOS\n";
        assert!(Corpus::from_reader(corpus_data.as_bytes()).is_err());
    }
}
