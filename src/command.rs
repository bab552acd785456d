//! Command Router Module
//!
//! チャット入力をセッション状態に照らして解釈し、応答テキストと
//! UI副作用を生成するモジュール。キーワードの部分一致（大文字・小文字を
//! 区別しない）で4つのインテントに分類し、最初に一致したものを採用する。

use crate::session::ConversionSession;

/// 変換前の固定応答
const NOT_CONVERTED_MESSAGE: &str =
    "No Excel file has been converted yet. Upload a file and run a conversion first.";

/// コマンド一覧を示すヘルプテキスト
const HELP_MESSAGE: &str = "Available commands:\n\
    - `/download` or 'download' (ダウンロード) - download the converted Markdown file\n\
    - `/preview` or 'preview' (プレビュー) - show the Markdown content\n\
    - `/error` or 'error' (エラー) - show conversion warnings and errors";

/// プレビューに含める最大文字数
const PREVIEW_CHAR_LIMIT: usize = 1000;

/// コマンド処理が要求するUI側の副作用
///
/// WebUIフレームワークは純粋なI/O境界として扱われるため、ルーターは
/// 描画そのものは行わず、UI側が解釈すべきアクションを返します。
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// 副作用なし（応答テキストの表示のみ）
    None,

    /// ダウンロードコントロールの表示
    OfferDownload {
        /// 提案するファイル名（MIMEタイプは`MARKDOWN_MIME`）
        filename: String,

        /// ダウンロードさせるMarkdownドキュメント全体
        content: String,
    },

    /// Markdownプレビューの表示（先頭1000文字に切り詰め済み）
    ShowPreview(String),

    /// 変換時のエラー・警告リストの表示
    ShowErrors(Vec<String>),
}

/// チャットコマンドのルーター
///
/// # インテント分類
///
/// 入力テキストに対する部分一致（大文字・小文字を区別しない）で分類し、
/// 以下の優先順で最初に一致したものを採用します。
///
/// 1. ダウンロード（`/download` / `download` / `ダウンロード`）- 変換結果が必要
/// 2. プレビュー（`/preview` / `preview` / `プレビュー`）- 変換結果が必要
/// 3. エラー表示（`/error` / `error` / `エラー`）- 直近の変換に
///    エラーが記録されていることが必要
/// 4. どれにも一致しない → ヘルプテキスト
///
/// 変換結果が存在せず上記の前提条件がどれも成立しない場合、キーワードの
/// 一致に関わらず常に固定の「未変換」メッセージを返します。
///
/// キーワードの一致は意図的に寛容な部分文字列包含です。例えば「エラー」が
/// 長い文の中に現れても一致します。この挙動は観測可能であり、意図的に
/// 維持されています。
pub struct CommandRouter;

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRouter {
    /// 新しいルーターを生成
    pub fn new() -> Self {
        Self
    }

    /// 入力を解釈し、応答テキストとUIアクションを返す
    ///
    /// ユーザー入力と生成された応答は、到着順にセッションのチャットログへ
    /// 追記されます。
    ///
    /// # 引数
    ///
    /// * `session` - 対象のセッション（状態の読み取りとログ追記に使用）
    /// * `input` - ユーザーの自由入力テキスト
    ///
    /// # 戻り値
    ///
    /// 応答テキストと、UI側が実行すべき副作用のペア
    pub fn handle(&self, session: &mut ConversionSession, input: &str) -> (String, UiAction) {
        session.push_user(input);

        let lower = input.to_lowercase();
        let wants_download = lower.contains("download") || input.contains("ダウンロード");
        let wants_preview = lower.contains("preview") || input.contains("プレビュー");
        let wants_error = lower.contains("error") || input.contains("エラー");

        let (response, action) = match session.outcome() {
            Some(outcome) if wants_download => (
                "The download control is ready. Click it to save the Markdown file.".to_string(),
                UiAction::OfferDownload {
                    filename: outcome.suggested_filename.clone(),
                    content: outcome.document.clone(),
                },
            ),
            Some(outcome) if wants_preview => (
                "Showing a preview of the converted Markdown.".to_string(),
                UiAction::ShowPreview(preview_text(&outcome.document)),
            ),
            Some(outcome) if wants_error && outcome.has_errors() => (
                "Showing the warnings and errors from the last conversion.".to_string(),
                UiAction::ShowErrors(outcome.errors.clone()),
            ),
            None => (NOT_CONVERTED_MESSAGE.to_string(), UiAction::None),
            Some(_) => (HELP_MESSAGE.to_string(), UiAction::None),
        };

        session.push_assistant(response.clone());
        (response, action)
    }
}

/// プレビュー用にドキュメントの先頭部分を切り出す（内部ヘルパー）
///
/// 文字単位（バイト単位ではない）で切り詰め、省略が発生した場合は
/// 末尾にマーカーを付けます。
fn preview_text(document: &str) -> String {
    let mut preview: String = document.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if document.chars().count() > PREVIEW_CHAR_LIMIT {
        preview.push_str("\n\n... (truncated)");
    }
    preview
}
