//! Conversion Session Module
//!
//! 1つの対話セッションに紐づく状態を保持するモジュール。
//! 最新の変換結果（高々1つ）と、チャットの発言ログを管理する。
//! グローバル状態は持たず、セッションオブジェクトを参照で受け渡すことで
//! 同一プロセス内で複数の独立したセッションを運用できる。

use serde::{Deserialize, Serialize};

use crate::types::ConversionOutcome;

/// チャット発言の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// ユーザーの入力
    User,

    /// アシスタントの応答
    Assistant,
}

/// チャットログの1発言
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// 発言者の役割
    pub role: ChatRole,

    /// 発言テキスト
    pub text: String,
}

/// 1対話セッション分の状態
///
/// # 状態機械
///
/// - `Empty`（変換結果なし）→ `Ready`（変換結果あり）: 最初の変換成功時
/// - `Ready` → `Ready`: 以降の変換成功ごと（結果は丸ごと置換、マージなし）
///
/// 終端状態はありません。セッションは外部から破棄されるまで生存します。
/// 部分的なロールバックは存在しません。変換は結果を丸ごと置き換えるか、
/// 失敗時に以前の結果をそのまま残すかのどちらかです（`store_outcome`を
/// 呼ばなければ状態は一切変化しません）。
///
/// # チャットログ
///
/// ユーザー入力と生成された応答は到着順に追記されます。ログは表示専用で
/// あり、変換ロジックから参照されることはありません。
#[derive(Debug, Default, Serialize)]
pub struct ConversionSession {
    /// 最新の変換結果（最初の変換成功までは`None`）
    outcome: Option<ConversionOutcome>,

    /// チャットの発言ログ（追記のみ）
    log: Vec<ChatTurn>,
}

impl ConversionSession {
    /// 新しい空のセッションを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// 変換結果が存在するかどうか（`Ready`状態かどうか）
    pub fn is_ready(&self) -> bool {
        self.outcome.is_some()
    }

    /// 現在の変換結果を取得
    pub fn outcome(&self) -> Option<&ConversionOutcome> {
        self.outcome.as_ref()
    }

    /// 変換結果を保存する（既存の結果は丸ごと置き換えられる）
    pub fn store_outcome(&mut self, outcome: ConversionOutcome) {
        self.outcome = Some(outcome);
    }

    /// ユーザー発言をログに追記
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.log.push(ChatTurn {
            role: ChatRole::User,
            text: text.into(),
        });
    }

    /// アシスタント応答をログに追記
    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.log.push(ChatTurn {
            role: ChatRole::Assistant,
            text: text.into(),
        });
    }

    /// チャットログを取得（到着順）
    pub fn log(&self) -> &[ChatTurn] {
        &self.log
    }
}
