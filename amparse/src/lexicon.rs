//! 閉じたラベル語彙を管理するモジュール
//!
//! このモジュールは、遷移システムが参照するエッジラベルと語彙タイプの
//! 閉じた語彙を提供します。語彙は読み込み順に安定した整数IDを割り当て、
//! 読み込み後は不変です。そのため、複数のデコードセッションから同期なしで
//! 並行に参照できます。
//!
//! # 語彙の読み込み方法
//!
//! - [`AdditionalLexicon::from_readers`]: テキスト形式のラベルファイルから読み込む
//! - [`AdditionalLexicon::from_path`]: コンパイル済みのアーカイブから読み込む（推奨）
//!
//! コンパイル済みアーカイブは[`AdditionalLexicon::write`]で生成できます。

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use hashbrown::HashMap;
use rkyv::util::AlignedVec;
use rkyv::{
    access, access_unchecked, api::serialize_using, rancor, ser::allocator::Arena,
    ser::sharing::Share, ser::writer::IoWriter, ser::Serializer, util::with_arena, Archive,
    Deserialize, Serialize,
};

use crate::errors::{AmparseError, Result, UnknownLabelError};

/// コンパイル済み語彙を識別するマジックバイト。
///
/// この定数の"0.1"はアーカイブフォーマットのバージョンを示しており、
/// クレートのセマンティックバージョンからは切り離されています。
pub const LEXICON_MAGIC: &[u8] = b"AmparseLexicon 0.1\n";

const LEXICON_MAGIC_LEN: usize = LEXICON_MAGIC.len();
const RKYV_ALIGNMENT: usize = 16;
const PADDING_LEN: usize = (RKYV_ALIGNMENT - (LEXICON_MAGIC_LEN % RKYV_ALIGNMENT)) % RKYV_ALIGNMENT;
const DATA_START: usize = LEXICON_MAGIC_LEN + PADDING_LEN;

/// エッジラベルのサブ語彙の名前。
pub const EDGE_LABELS: &str = "edge_labels";

/// 語彙タイプのサブ語彙の名前。
pub const TERM_TYPES: &str = "term_types";

/// 語彙アーカイブの読み込みモード。
///
/// アーカイブを読み込む際の検証戦略を指定します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// 読み込むたびに完全なrkyv検証を実行します（最も安全）。
    Validate,
    /// 検証をスキップします。信頼できるソースから取得した
    /// アーカイブにのみ使用してください。
    Trusted,
}

/// 一つの閉じた語彙
///
/// ラベルを読み込み順の安定した整数IDに対応付けます。読み込み後は不変です。
pub struct Lexicon {
    name: &'static str,
    labels: Vec<String>,
    index: HashMap<String, u32>,
}

impl Lexicon {
    /// ラベルのリストから新しいインスタンスを構築します。
    ///
    /// IDはリスト内の位置で決まります。
    ///
    /// # 引数
    ///
    /// * `labels` - ラベルのリスト
    /// * `name` - サブ語彙の名前（エラーメッセージに使用）
    ///
    /// # エラー
    ///
    /// 同じラベルが二度現れた場合にエラーを返します。
    pub fn from_labels<I, S>(labels: I, name: &'static str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            let id = u32::try_from(i)?;
            if index.insert(label.clone(), id).is_some() {
                return Err(AmparseError::invalid_format(
                    name,
                    format!("duplicate label: {label}"),
                ));
            }
        }
        Ok(Self {
            name,
            labels,
            index,
        })
    }

    /// テキスト形式のラベルファイルから新しいインスタンスを構築します。
    ///
    /// 1行につき1ラベルで、行の順序がIDを定義します。タブ以降の列は
    /// 無視されます。空行はスキップされます。
    ///
    /// # 引数
    ///
    /// * `rdr` - ラベルファイルのリーダー
    /// * `name` - サブ語彙の名前
    ///
    /// # エラー
    ///
    /// 読み込みに失敗した場合、または同じラベルが二度現れた場合に
    /// エラーを返します。
    pub fn from_reader<R>(rdr: R, name: &'static str) -> Result<Self>
    where
        R: Read,
    {
        let buf = BufReader::new(rdr);
        let mut labels = vec![];
        for line in buf.lines() {
            let line = line?;
            let label = line.split('\t').next().unwrap_or("");
            if label.is_empty() {
                continue;
            }
            labels.push(label.to_string());
        }
        Self::from_labels(labels, name)
    }

    /// ラベルのIDを取得します。
    ///
    /// # 引数
    ///
    /// * `label` - 検索するラベル
    ///
    /// # エラー
    ///
    /// ラベルが語彙に存在しない場合、[`UnknownLabelError`]を返します。
    #[inline]
    pub fn id_of(&self, label: &str) -> Result<u32, UnknownLabelError> {
        self.get_id(label).ok_or_else(|| UnknownLabelError {
            sublexicon: self.name,
            label: label.to_string(),
        })
    }

    /// ラベルのIDを取得します。存在しない場合は`None`を返します。
    #[inline]
    pub fn get_id(&self, label: &str) -> Option<u32> {
        self.index.get(label).copied()
    }

    /// IDに対応するラベルを取得します。存在しない場合は`None`を返します。
    #[inline]
    pub fn label_of(&self, id: u32) -> Option<&str> {
        self.labels.get(id as usize).map(String::as_str)
    }

    /// ラベルが語彙に含まれるかどうかを判定します。
    #[inline]
    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// 語彙のサイズを返します。
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// 語彙が空かどうかを判定します。
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// サブ語彙の名前を返します。
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// 語彙アーカイブのシリアライズ表現。
///
/// `hashbrown`のインデックスはアーカイブに含めず、読み込み時に再構築します。
#[derive(Archive, Serialize, Deserialize)]
struct CompiledLexicon {
    edge_labels: Vec<String>,
    term_types: Vec<String>,
}

/// 遷移システムが参照する追加語彙
///
/// エッジラベルと語彙タイプの二つのサブ語彙を保持します。一度読み込まれた
/// 後は不変であり、すべてのデコードセッションから読み取り専用で共有されます。
///
/// # 例
///
/// ```
/// use amparse::lexicon::AdditionalLexicon;
///
/// let lexicon = AdditionalLexicon::from_readers(
///     "L1\nL2\n".as_bytes(),
///     "(s)\n()\n".as_bytes(),
/// )?;
/// assert_eq!(lexicon.edge_labels().id_of("L2")?, 1);
/// assert_eq!(lexicon.term_types().label_of(0), Some("(s)"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct AdditionalLexicon {
    edge_labels: Lexicon,
    term_types: Lexicon,
}

impl AdditionalLexicon {
    /// 二つのテキスト形式のラベルファイルから新しいインスタンスを構築します。
    ///
    /// # 引数
    ///
    /// * `edge_label_rdr` - エッジラベルファイルのリーダー
    /// * `term_type_rdr` - 語彙タイプファイルのリーダー
    ///
    /// # エラー
    ///
    /// いずれかのファイルの読み込みまたは解析に失敗した場合にエラーを返します。
    pub fn from_readers<R, S>(edge_label_rdr: R, term_type_rdr: S) -> Result<Self>
    where
        R: Read,
        S: Read,
    {
        Ok(Self {
            edge_labels: Lexicon::from_reader(edge_label_rdr, EDGE_LABELS)?,
            term_types: Lexicon::from_reader(term_type_rdr, TERM_TYPES)?,
        })
    }

    /// エッジラベルのサブ語彙への参照を取得します。
    #[inline]
    pub fn edge_labels(&self) -> &Lexicon {
        &self.edge_labels
    }

    /// 語彙タイプのサブ語彙への参照を取得します。
    #[inline]
    pub fn term_types(&self) -> &Lexicon {
        &self.term_types
    }

    /// 名前でサブ語彙を取得します。
    ///
    /// # 引数
    ///
    /// * `name` - [`EDGE_LABELS`]または[`TERM_TYPES`]
    ///
    /// # 戻り値
    ///
    /// 名前が一致した場合は`Some(&Lexicon)`、それ以外は`None`
    pub fn sublexicon(&self, name: &str) -> Option<&Lexicon> {
        match name {
            EDGE_LABELS => Some(&self.edge_labels),
            TERM_TYPES => Some(&self.term_types),
            _ => None,
        }
    }

    /// 語彙を`rkyv`フォーマットを使用してライターにシリアライズします。
    ///
    /// この関数の出力バイナリは、[`AdditionalLexicon::from_path`]などの
    /// 読み込みメソッドが期待する形式です。
    ///
    /// # エラー
    ///
    /// この関数は以下の場合にエラーを返します:
    /// - 基礎となる`writer`への書き込みに失敗した場合（例: I/Oエラー）。
    /// - `rkyv`シリアライゼーションプロセスでエラーが発生した場合。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        wtr.write_all(LEXICON_MAGIC)?;

        let padding_bytes = vec![0xFF; PADDING_LEN];
        wtr.write_all(&padding_bytes)?;

        let compiled = CompiledLexicon {
            edge_labels: self.edge_labels.labels.clone(),
            term_types: self.term_types.labels.clone(),
        };

        with_arena(|arena: &mut Arena| {
            let writer = IoWriter::new(&mut wtr);
            let mut serializer = Serializer::new(writer, arena.acquire(), Share::new());
            serialize_using::<_, rancor::Error>(&compiled, &mut serializer)
        })
        .map_err(|e| {
            AmparseError::invalid_state("rkyv serialization failed".to_string(), e.to_string())
        })?;

        Ok(())
    }

    /// リーダーからコンパイル済み語彙を読み込みます。
    ///
    /// # 引数
    ///
    /// * `rdr` - アーカイブのリーダー
    /// * `mode` - 検証戦略
    ///
    /// # エラー
    ///
    /// マジックバイトが一致しない場合、またはrkyv検証に失敗した場合に
    /// エラーを返します。
    pub fn read<R>(mut rdr: R, mode: LoadMode) -> Result<Self>
    where
        R: Read,
    {
        let mut buf = vec![];
        rdr.read_to_end(&mut buf)?;

        if buf.len() < DATA_START || &buf[..LEXICON_MAGIC_LEN] != LEXICON_MAGIC {
            return Err(AmparseError::invalid_format(
                "rdr",
                "The magic number of the compiled lexicon is invalid.",
            ));
        }

        // rkyv requires the archive bytes to be aligned.
        let mut aligned = AlignedVec::<RKYV_ALIGNMENT>::new();
        aligned.extend_from_slice(&buf[DATA_START..]);

        let archived = match mode {
            LoadMode::Validate => access::<ArchivedCompiledLexicon, rancor::Error>(&aligned)
                .map_err(|e| {
                    AmparseError::invalid_state(
                        "rkyv validation failed. The lexicon file may be corrupted or incompatible."
                            .to_string(),
                        e.to_string(),
                    )
                })?,
            LoadMode::Trusted => unsafe { access_unchecked::<ArchivedCompiledLexicon>(&aligned) },
        };

        let compiled: CompiledLexicon = rkyv::deserialize::<_, rancor::Error>(archived)
            .map_err(|e| {
                AmparseError::invalid_state("rkyv deserialization failed".to_string(), e.to_string())
            })?;

        Ok(Self {
            edge_labels: Lexicon::from_labels(compiled.edge_labels, EDGE_LABELS)?,
            term_types: Lexicon::from_labels(compiled.term_types, TERM_TYPES)?,
        })
    }

    /// ファイルパスからコンパイル済み語彙を読み込みます。
    ///
    /// # 引数
    ///
    /// * `path` - アーカイブのパス
    /// * `mode` - 検証戦略
    ///
    /// # エラー
    ///
    /// ファイルが開けない場合、または[`AdditionalLexicon::read`]が失敗した
    /// 場合にエラーを返します。
    pub fn from_path<P>(path: P, mode: LoadMode) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(AmparseError::invalid_argument(
                "path",
                format!("The path '{}' is a directory, but a file was expected.", path.display()),
            ));
        }
        let file = File::open(path)?;
        Self::read(file, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_assignment_follows_load_order() {
        let lexicon = Lexicon::from_reader("APP_s\nAPP_o\nMOD_m\n".as_bytes(), EDGE_LABELS).unwrap();
        assert_eq!(lexicon.len(), 3);
        assert_eq!(lexicon.id_of("APP_s").unwrap(), 0);
        assert_eq!(lexicon.id_of("APP_o").unwrap(), 1);
        assert_eq!(lexicon.id_of("MOD_m").unwrap(), 2);
        assert_eq!(lexicon.label_of(2), Some("MOD_m"));
        assert_eq!(lexicon.label_of(3), None);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let lexicon = Lexicon::from_reader("APP_s\t120\nMOD_m\t4\n".as_bytes(), EDGE_LABELS).unwrap();
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.id_of("MOD_m").unwrap(), 1);
    }

    #[test]
    fn test_unknown_label() {
        let lexicon = Lexicon::from_reader("APP_s\n".as_bytes(), EDGE_LABELS).unwrap();
        let e = lexicon.id_of("X-NOT-IN-LEXICON").unwrap_err();
        assert_eq!(e.sublexicon, EDGE_LABELS);
        assert_eq!(e.label, "X-NOT-IN-LEXICON");
    }

    #[test]
    fn test_duplicate_label() {
        let result = Lexicon::from_reader("APP_s\nAPP_s\n".as_bytes(), EDGE_LABELS);
        assert!(result.is_err());
    }

    #[test]
    fn test_sublexicon_by_name() {
        let lexicon =
            AdditionalLexicon::from_readers("APP_s\n".as_bytes(), "(s)\n".as_bytes()).unwrap();
        assert!(lexicon.sublexicon(EDGE_LABELS).is_some());
        assert!(lexicon.sublexicon(TERM_TYPES).is_some());
        assert!(lexicon.sublexicon("constants").is_none());
    }

    #[test]
    fn test_archive_roundtrip() {
        let lexicon = AdditionalLexicon::from_readers(
            "APP_s\nAPP_o\nMOD_m\n".as_bytes(),
            "(s)\n()\n(o(s))\n".as_bytes(),
        )
        .unwrap();

        let mut archive = vec![];
        lexicon.write(&mut archive).unwrap();

        for mode in [LoadMode::Validate, LoadMode::Trusted] {
            let loaded = AdditionalLexicon::read(archive.as_slice(), mode).unwrap();
            assert_eq!(loaded.edge_labels().len(), 3);
            assert_eq!(loaded.term_types().len(), 3);
            assert_eq!(loaded.edge_labels().id_of("MOD_m").unwrap(), 2);
            assert_eq!(loaded.term_types().label_of(2), Some("(o(s))"));
        }
    }

    #[test]
    fn test_archive_from_path() {
        let lexicon =
            AdditionalLexicon::from_readers("APP_s\n".as_bytes(), "(s)\n".as_bytes()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.bin");
        let mut file = File::create(&path).unwrap();
        lexicon.write(&mut file).unwrap();

        let loaded = AdditionalLexicon::from_path(&path, LoadMode::Validate).unwrap();
        assert_eq!(loaded.edge_labels().id_of("APP_s").unwrap(), 0);
    }

    #[test]
    fn test_invalid_magic() {
        let result = AdditionalLexicon::read("not a lexicon".as_bytes(), LoadMode::Validate);
        assert!(result.is_err());
    }
}
