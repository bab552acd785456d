//! Workbook Module
//!
//! calamineを使用したアップロード済みExcelファイルの解析境界。
//! 拡張子・MIMEタイプの検証、シート名の列挙、シート単位の
//! TabularDataへの読み込みを提供する。

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets, Xlsx};
use chrono::{Duration, NaiveDate};
use std::io::Cursor;

use crate::error::XlsxChatError;
use crate::types::{CellValue, TabularData};

/// 変換成果物のMIMEタイプ
pub const MARKDOWN_MIME: &str = "text/markdown";

/// XLSXの正式なMIMEタイプ
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// マクロ有効ワークブックのMIMEタイプ
const XLSX_MACRO_MIME: &str = "application/vnd.ms-excel.sheet.macroEnabled.12";

/// 一部のブラウザはアップロード時にこのMIMEタイプを報告する
const OCTET_STREAM_MIME: &str = "application/octet-stream";

/// アップロードされた1ファイル
///
/// WebUI側のファイルアップロードウィジェットから受け取る生データの
/// 表現です。ファイル名・MIMEタイプ・バイト列のみを保持します。
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// 元のファイル名（拡張子の検証に使用）
    pub name: String,

    /// ブラウザが報告したMIMEタイプ（助言的な検証にのみ使用）
    pub mime: Option<String>,

    /// ファイルのバイト列（全体をメモリに保持）
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// 新しいUploadedFileを生成
    pub fn new(name: impl Into<String>, mime: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }
}

/// 開かれたワークブックへのハンドル
///
/// アップロードされたバイト列から構築され、宣言順のシート名列挙と
/// シート単位の読み込みを提供します。ワークブック全体はメモリ上に
/// 保持されます（ストリーミングは行いません）。
pub struct Workbook {
    /// calamineのワークブック（XLSX形式のみサポート）
    workbook: Xlsx<Cursor<Vec<u8>>>,

    /// 元のファイル名
    filename: String,

    /// シート名のリスト（ファイル内の宣言順）
    sheet_names: Vec<String>,
}

impl Workbook {
    /// アップロードされたファイルからワークブックを開く
    ///
    /// # 検証
    ///
    /// 1. 拡張子が`.xlsx`であること（大文字・小文字を区別しない）。
    ///    不一致は`InvalidExtension`エラーで即座に拒否されます。
    /// 2. MIMEタイプが既知の値であること。不一致は警告文字列として
    ///    返されるのみで、処理は継続されます（拡張子が権威的、MIMEは助言的）。
    /// 3. ワークブックにシートが1枚以上含まれていること。
    ///
    /// # 引数
    ///
    /// * `file` - アップロードされたファイル
    ///
    /// # 戻り値
    ///
    /// * `Ok((Workbook, Vec<String>))` - ワークブックハンドルとMIME警告のリスト
    /// * `Err(XlsxChatError::InvalidExtension)` - 拡張子が`.xlsx`ではない場合
    /// * `Err(XlsxChatError::Parse)` - ファイルの解析に失敗した場合
    /// * `Err(XlsxChatError::EmptyWorkbook)` - シートが1枚も含まれていない場合
    pub fn open(file: UploadedFile) -> Result<(Self, Vec<String>), XlsxChatError> {
        if !file.name.to_lowercase().ends_with(".xlsx") {
            return Err(XlsxChatError::InvalidExtension {
                filename: file.name,
            });
        }

        let mut warnings = Vec::new();
        if let Some(mime) = &file.mime {
            if mime != XLSX_MIME && mime != XLSX_MACRO_MIME && mime != OCTET_STREAM_MIME {
                log::warn!("unexpected MIME type for '{}': {}", file.name, mime);
                warnings.push(format!(
                    "File MIME type ({}) differs from the expected XLSX type. Proceeding anyway.",
                    mime
                ));
            }
        }

        let sheets =
            open_workbook_auto_from_rs(Cursor::new(file.bytes)).map_err(XlsxChatError::Parse)?;
        let workbook = match sheets {
            Sheets::Xlsx(workbook) => workbook,
            _ => {
                return Err(XlsxChatError::Config(
                    "Only XLSX format is supported".to_string(),
                ))
            }
        };

        let sheet_names = workbook.sheet_names().to_vec();
        if sheet_names.is_empty() {
            return Err(XlsxChatError::EmptyWorkbook);
        }

        Ok((
            Self {
                workbook,
                filename: file.name,
                sheet_names,
            },
            warnings,
        ))
    }

    /// すべてのシート名を取得（ファイル内の宣言順）
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// 元のファイル名を取得
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// 推奨出力ファイル名を取得
    ///
    /// 元のファイル名の`.xlsx`サフィックス（大文字・小文字を区別しない）を
    /// `.md`に置き換えた名前を返します。
    pub fn suggested_filename(&self) -> String {
        let len = self.filename.len() - ".xlsx".len();
        format!("{}.md", &self.filename[..len])
    }

    /// シートをTabularDataとして読み込む
    ///
    /// 使用範囲の先頭行を列ヘッダーとして扱います。空のヘッダーセルには
    /// 位置ベースの名前（`Column1`, `Column2`, ...）が割り当てられます。
    /// 残りの行がデータ行になります。
    ///
    /// # セル値の変換
    ///
    /// - 整数・浮動小数点数 → `Number`
    /// - 文字列 → `Text`
    /// - 論理値 → `Text`（"true" / "false"）
    /// - 日付・時刻 → `Text`（ISO 8601形式）
    /// - エラー値 → `Text`（例: "#DIV/0!"）
    /// - 空セル → `Empty`
    ///
    /// # 引数
    ///
    /// * `name` - 読み込むシート名
    ///
    /// # 戻り値
    ///
    /// * `Ok(TabularData)` - 読み込みに成功した場合（データ行ゼロもあり得る）
    /// * `Err(XlsxChatError::SheetNotFound)` - シートが存在しない場合
    /// * `Err(XlsxChatError::Parse)` - シートの読み込みに失敗した場合
    pub fn read_sheet(&mut self, name: &str) -> Result<TabularData, XlsxChatError> {
        if !self.sheet_names.iter().any(|n| n == name) {
            return Err(XlsxChatError::SheetNotFound {
                sheet: name.to_string(),
            });
        }

        let range = self
            .workbook
            .worksheet_range(name)
            .map_err(|e| XlsxChatError::Parse(e.into()))?;

        let mut rows_iter = range.rows();

        let columns: Vec<String> = match rows_iter.next() {
            Some(header_row) => header_row
                .iter()
                .enumerate()
                .map(|(idx, cell)| {
                    let label = cell_to_value(cell).to_display_string();
                    if label.is_empty() {
                        format!("Column{}", idx + 1)
                    } else {
                        label
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        let rows: Vec<Vec<CellValue>> = rows_iter
            .map(|row| row.iter().map(cell_to_value).collect())
            .collect();

        TabularData::new(columns, rows)
    }
}

/// calamineのセルデータをCellValueに変換する（内部ヘルパー）
fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Text(format_serial_datetime(dt.as_f64())),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::Empty => CellValue::Empty,
        #[allow(unreachable_patterns)]
        _ => CellValue::Empty,
    }
}

/// Excelのシリアル日付値をISO 8601文字列に変換する（内部ヘルパー）
///
/// 1900年エポックシステム（1899年12月30日起算）として処理します。
/// 時刻成分がゼロの場合は日付のみ、それ以外は日時を出力します。
/// 変換できないシリアル値は数値文字列のまま返します。
fn format_serial_datetime(serial: f64) -> String {
    let epoch = match NaiveDate::from_ymd_opt(1899, 12, 30) {
        Some(d) => d,
        None => return serial.to_string(),
    };

    let days = serial.floor() as i64;
    let date = match epoch.checked_add_signed(Duration::days(days)) {
        Some(d) => d,
        None => return serial.to_string(),
    };

    let seconds = ((serial - serial.floor()) * 86_400.0).round() as u32;
    if seconds == 0 {
        date.format("%Y-%m-%d").to_string()
    } else {
        match date.and_hms_opt(seconds / 3600, (seconds % 3600) / 60, seconds % 60) {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => date.format("%Y-%m-%d").to_string(),
        }
    }
}
