//! Sheet Converter Module
//!
//! 選択されたシートを1枚ずつ順番に処理し、ConversionOutcomeを生成する
//! モジュール。シート単位の失敗は記録してスキップし、残りのシートの
//! 処理を継続する（部分的な成功は正常な結果として扱う）。

use crate::error::XlsxChatError;
use crate::normalize::normalize;
use crate::render::{render_table, render_table_fallback};
use crate::types::{ConversionOutcome, SheetConversionResult};
use crate::workbook::Workbook;

/// 最大列幅のデフォルト値
pub const DEFAULT_MAX_COLUMN_WIDTH: usize = 30;

/// 最大列幅の下限
pub const MIN_MAX_COLUMN_WIDTH: usize = 10;

/// 最大列幅の上限
pub const MAX_MAX_COLUMN_WIDTH: usize = 100;

/// 変換処理のオプション
///
/// `ConversionOptions::default()`でデフォルト値が得られます。
/// 値を変更する場合は`builder()`を使用してください。ビルダーは
/// `build()`時に設定を検証します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// 行番号列（0始まり）を出力に含めるか
    pub include_row_index: bool,

    /// セルの最大表示幅。超過分は折り返される（切り捨てではない）
    pub max_column_width: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            include_row_index: false,
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
        }
    }
}

impl ConversionOptions {
    /// 設定用のビルダーを生成
    pub fn builder() -> ConversionOptionsBuilder {
        ConversionOptionsBuilder::new()
    }
}

/// ConversionOptionsのFluent Builder
///
/// # 使用例
///
/// ```rust
/// use xlsxchat::ConversionOptions;
///
/// # fn main() -> Result<(), xlsxchat::XlsxChatError> {
/// let options = ConversionOptions::builder()
///     .include_row_index(true)
///     .max_column_width(50)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConversionOptionsBuilder {
    options: ConversionOptions,
}

impl ConversionOptionsBuilder {
    /// デフォルト設定を持つビルダーを生成
    pub fn new() -> Self {
        Self {
            options: ConversionOptions::default(),
        }
    }

    /// 行番号列を出力に含めるかを指定する
    pub fn include_row_index(mut self, include: bool) -> Self {
        self.options.include_row_index = include;
        self
    }

    /// セルの最大表示幅を指定する
    ///
    /// # 制約
    ///
    /// 有効範囲は10〜100です。範囲外の値は`build()`時に
    /// `XlsxChatError::Config`を返します。
    pub fn max_column_width(mut self, width: usize) -> Self {
        self.options.max_column_width = width;
        self
    }

    /// 設定を検証し、ConversionOptionsを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConversionOptions)` - 設定が有効な場合
    /// * `Err(XlsxChatError::Config)` - 最大列幅が範囲外の場合
    pub fn build(self) -> Result<ConversionOptions, XlsxChatError> {
        let width = self.options.max_column_width;
        if !(MIN_MAX_COLUMN_WIDTH..=MAX_MAX_COLUMN_WIDTH).contains(&width) {
            return Err(XlsxChatError::Config(format!(
                "max_column_width {} is out of range ({}..={})",
                width, MIN_MAX_COLUMN_WIDTH, MAX_MAX_COLUMN_WIDTH
            )));
        }
        Ok(self.options)
    }
}

/// 変換の進捗を受け取るシンク
///
/// UIフィードバック（プログレスバーなど）のための助言的な通知であり、
/// データ契約の一部ではありません。コアロジックは特定の描画機構に
/// 依存しません。
pub trait ProgressSink {
    /// シートの処理開始時に呼ばれる
    ///
    /// # 引数
    ///
    /// * `index` - 現在のシートのインデックス（0始まり）
    /// * `total` - 選択されたシートの総数
    /// * `sheet_name` - 処理中のシート名
    fn on_sheet(&mut self, index: usize, total: usize, sheet_name: &str);
}

/// 進捗通知を無視するProgressSink実装
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_sheet(&mut self, _index: usize, _total: usize, _sheet_name: &str) {}
}

/// シート変換のドライバー
///
/// Normalizer・MarkdownRendererをシートごとに駆動し、シート単位の結果と
/// 集約結果、構造化されたエラーメッセージを蓄積します。
///
/// # 処理の性質
///
/// - シートは選択順に1枚ずつ逐次処理されます（並列化しません）。
///   進捗報告とエラーリストの順序が決定的であることを保証するためです。
/// - 途中キャンセルはありません。開始された変換は選択されたすべての
///   シートを処理し終えるまで実行されます。
/// - 個々のシートの失敗は捕捉・記録され、中断シグナルにはなりません。
pub struct SheetConverter {
    options: ConversionOptions,
}

impl SheetConverter {
    /// 指定されたオプションでコンバーターを生成
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    /// 選択されたシートを変換し、ConversionOutcomeを生成する
    ///
    /// # シートごとの手順
    ///
    /// 1. シートをTabularDataとして読み込む。失敗した場合は
    ///    `"<シート名>: <理由>"`をエラーとして記録し、スキップする。
    /// 2. データ行がゼロの場合は`"Sheet '<シート名>' is empty"`を記録し、
    ///    スキップする（空シートは出力に含めない）。
    /// 3. セル値を正規化する。
    /// 4. シートヘッダーブロック（`## <シート名>`、行数・列数、空行）を構築する。
    /// 5. テーブルをレンダリングする。プライマリが失敗した場合は
    ///    フォールバックを使用し、警告として記録する（致命エラーではない）。
    /// 6. 結果を成功リストに追加し、シートブロックを集約ドキュメントに
    ///    連結する。
    ///
    /// # 引数
    ///
    /// * `workbook` - 開かれたワークブックハンドル
    /// * `selected` - 変換対象のシート名（選択順）
    /// * `progress` - 進捗通知シンク（不要な場合は`NoProgress`）
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConversionOutcome)` - 1枚以上のシートが成功した場合。
    ///   部分的な成功も正常な結果として返されます。
    /// * `Err(XlsxChatError::AllSheetsFailed)` - 1枚も成功しなかった場合。
    ///   記録されたすべてのエラーメッセージを保持します。
    pub fn convert<P: ProgressSink>(
        &self,
        workbook: &mut Workbook,
        selected: &[String],
        progress: &mut P,
    ) -> Result<ConversionOutcome, XlsxChatError> {
        let total = selected.len();
        let mut results: Vec<SheetConversionResult> = Vec::new();
        let mut errors: Vec<String> = Vec::new();
        let mut document = String::new();

        for (index, sheet_name) in selected.iter().enumerate() {
            progress.on_sheet(index, total, sheet_name);
            log::debug!("converting sheet '{}' ({}/{})", sheet_name, index + 1, total);

            // 1. シートの読み込み（失敗は記録してスキップ）
            let mut data = match workbook.read_sheet(sheet_name) {
                Ok(data) => data,
                Err(e) => {
                    log::warn!("failed to read sheet '{}': {}", sheet_name, e);
                    errors.push(format!("{}: {}", sheet_name, e));
                    continue;
                }
            };

            // 2. 空シートのチェック
            if data.row_count() == 0 {
                errors.push(format!("Sheet '{}' is empty", sheet_name));
                continue;
            }

            // 3. 正規化
            normalize(&mut data);

            // 4. シートヘッダーブロック
            let mut sheet_block = format!("## {}\n\n", sheet_name);
            sheet_block.push_str(&format!(
                "*Rows: {}, Columns: {}*\n\n",
                data.row_count(),
                data.column_count()
            ));

            // 5. テーブルのレンダリング（プライマリ失敗時はフォールバック）
            let mut used_fallback = false;
            let table = match render_table(&data, &self.options) {
                Ok(table) => table,
                Err(e) => {
                    log::warn!(
                        "primary renderer failed for sheet '{}', using fallback: {}",
                        sheet_name,
                        e
                    );
                    errors.push(format!(
                        "Sheet '{}': Markdown rendering warning - fallback format used",
                        sheet_name
                    ));
                    used_fallback = true;
                    render_table_fallback(&data, &self.options)
                }
            };
            sheet_block.push_str(&table);

            // 6. 結果の蓄積
            results.push(SheetConversionResult {
                sheet_name: sheet_name.clone(),
                markdown_text: sheet_block.clone(),
                row_count: data.row_count(),
                column_count: data.column_count(),
                used_fallback,
            });
            document.push_str(&sheet_block);
            document.push_str("\n\n");
        }

        if results.is_empty() {
            return Err(XlsxChatError::AllSheetsFailed { errors });
        }

        Ok(ConversionOutcome {
            results,
            errors,
            document,
            suggested_filename: workbook.suggested_filename(),
        })
    }
}
