//! パーサーの行動とワイヤ形式の定義。
//!
//! 行動は内部では常にタグ付きバリアント[`Action`]として表現されます。
//! `Pop`を明示的なIDとして持つか、エッジラベルブロックの先頭の番兵
//! （いわゆる「エッジラベル0」符号化）として畳み込むかは、
//! [`ActionCodec`]が担う純粋なシリアライズ上の選択であり、意味には
//! 影響しません。どちらの符号化も同一のグラフへ復号されます。

use crate::errors::{AmparseError, Result};

/// パーサーの1つの行動
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// 未訪問のノードを選択し、フロンティアに載せます。
    ///
    /// 最初の選択は根の指定を意味します。それ以降の選択は、保留中の
    /// エッジラベルで現在のフロンティア先頭への付属を意味します。
    SelectNode(u32),

    /// 次に選択されるノードへのエッジのラベルを確定します。
    MakeEdge(u32),

    /// フロンティア先頭のノードを閉じます。
    Pop,

    /// デコードセッションを終了します。
    Stop,
}

/// 行動と密なワイヤIDの相互変換
///
/// IDのレイアウトは次のとおりです。`P`は入力ノード数、`L`はエッジ
/// ラベル語彙のサイズです。
///
/// - `0`: `Stop`
/// - `1..=P`: `SelectNode(位置)`
/// - `pop_with_0`が有効な場合: `P+1`が`Pop`（ラベルブロック先頭の番兵）、
///   `P+2..P+1+L`が`MakeEdge`
/// - 無効な場合: `P+1..P+L`が`MakeEdge`、最後尾の`P+L+1`が明示的な`Pop`
///
/// いずれの場合もID空間のサイズは`P + L + 2`です。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionCodec {
    num_positions: u32,
    num_edge_labels: u32,
    pop_with_0: bool,
}

impl ActionCodec {
    /// 新しいコーデックを作成します。
    ///
    /// # 引数
    ///
    /// * `num_positions` - 入力ノード数
    /// * `num_edge_labels` - エッジラベル語彙のサイズ
    /// * `pop_with_0` - `Pop`を番兵として符号化するかどうか
    pub const fn new(num_positions: u32, num_edge_labels: u32, pop_with_0: bool) -> Self {
        Self {
            num_positions,
            num_edge_labels,
            pop_with_0,
        }
    }

    /// ID空間のサイズを返します。
    #[inline]
    pub const fn size(&self) -> usize {
        self.num_positions as usize + self.num_edge_labels as usize + 2
    }

    /// 行動をワイヤIDに符号化します。
    ///
    /// # エラー
    ///
    /// ノード位置またはラベルIDがコーデックの範囲外の場合にエラーを
    /// 返します。
    pub fn encode(&self, action: Action) -> Result<u32> {
        let edge_base = self.num_positions + 1;
        match action {
            Action::Stop => Ok(0),
            Action::SelectNode(position) => {
                if position == 0 || position > self.num_positions {
                    return Err(AmparseError::invalid_argument(
                        "action",
                        format!("node position out of range: {position}"),
                    ));
                }
                Ok(position)
            }
            Action::MakeEdge(label) => {
                if label >= self.num_edge_labels {
                    return Err(AmparseError::invalid_argument(
                        "action",
                        format!("edge label id out of range: {label}"),
                    ));
                }
                if self.pop_with_0 {
                    Ok(edge_base + 1 + label)
                } else {
                    Ok(edge_base + label)
                }
            }
            Action::Pop => {
                if self.pop_with_0 {
                    Ok(edge_base)
                } else {
                    Ok(edge_base + self.num_edge_labels)
                }
            }
        }
    }

    /// ワイヤIDを行動に復号します。
    ///
    /// # 戻り値
    ///
    /// IDが範囲内の場合は`Some(行動)`、範囲外の場合は`None`
    pub fn decode(&self, id: u32) -> Option<Action> {
        let edge_base = self.num_positions + 1;
        if id == 0 {
            return Some(Action::Stop);
        }
        if id < edge_base {
            return Some(Action::SelectNode(id));
        }
        let offset = id - edge_base;
        if self.pop_with_0 {
            if offset == 0 {
                Some(Action::Pop)
            } else if offset <= self.num_edge_labels {
                Some(Action::MakeEdge(offset - 1))
            } else {
                None
            }
        } else if offset < self.num_edge_labels {
            Some(Action::MakeEdge(offset))
        } else if offset == self.num_edge_labels {
            Some(Action::Pop)
        } else {
            None
        }
    }

    /// 行動列をワイヤID列に符号化します。
    pub fn encode_actions(&self, actions: &[Action]) -> Result<Vec<u32>> {
        actions.iter().map(|&a| self.encode(a)).collect()
    }

    /// ワイヤID列を行動列に復号します。
    ///
    /// # エラー
    ///
    /// いずれかのIDが範囲外の場合にエラーを返します。
    pub fn decode_actions(&self, ids: &[u32]) -> Result<Vec<Action>> {
        ids.iter()
            .map(|&id| {
                self.decode(id).ok_or_else(|| {
                    AmparseError::invalid_argument(
                        "ids",
                        format!("wire action id out of range: {id}"),
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_explicit_pop() {
        let codec = ActionCodec::new(3, 2, false);
        assert_eq!(codec.size(), 7);
        let actions = [
            Action::SelectNode(1),
            Action::MakeEdge(0),
            Action::SelectNode(2),
            Action::MakeEdge(1),
            Action::SelectNode(3),
            Action::Pop,
            Action::Pop,
            Action::Pop,
            Action::Stop,
        ];
        let ids = codec.encode_actions(&actions).unwrap();
        assert_eq!(ids, vec![1, 4, 2, 5, 3, 6, 6, 6, 0]);
        assert_eq!(codec.decode_actions(&ids).unwrap(), actions);
    }

    #[test]
    fn test_roundtrip_pop_with_0() {
        let codec = ActionCodec::new(3, 2, true);
        assert_eq!(codec.size(), 7);
        let actions = [
            Action::SelectNode(1),
            Action::MakeEdge(0),
            Action::Pop,
            Action::MakeEdge(1),
            Action::Stop,
        ];
        let ids = codec.encode_actions(&actions).unwrap();
        // Pop is the sentinel at the head of the edge label block.
        assert_eq!(ids, vec![1, 5, 4, 6, 0]);
        assert_eq!(codec.decode_actions(&ids).unwrap(), actions);
    }

    #[test]
    fn test_both_encodings_cover_the_same_space() {
        for pop_with_0 in [false, true] {
            let codec = ActionCodec::new(4, 3, pop_with_0);
            for id in 0..codec.size() as u32 {
                let action = codec.decode(id).unwrap();
                assert_eq!(codec.encode(action).unwrap(), id);
            }
            assert_eq!(codec.decode(codec.size() as u32), None);
        }
    }

    #[test]
    fn test_encode_out_of_range() {
        let codec = ActionCodec::new(2, 2, false);
        assert!(codec.encode(Action::SelectNode(0)).is_err());
        assert!(codec.encode(Action::SelectNode(3)).is_err());
        assert!(codec.encode(Action::MakeEdge(2)).is_err());
    }
}
