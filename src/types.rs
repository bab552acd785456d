//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//! 1シート分の正規化済み表データと、変換結果（シート単位・集約）を表す型を提供する。

use serde::{Deserialize, Serialize};

use crate::error::XlsxChatError;

/// セルの値を表す列挙型
///
/// ワークブックから読み込まれた時点で、数値以外の値（論理値、日付、
/// エラー値など）はすべて`Text`に変換されます。正規化（`normalize`）後は
/// `Empty`も空文字列の`Text`になります。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    Text(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 表示用の文字列を取得
    ///
    /// 空セルは空文字列になります。"null"や"NaN"のような
    /// プレースホルダ文字列は決して生成されません。
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

/// 1シート分の表データ
///
/// 列名の順序付きリストと、行の順序付きリストを保持します。
///
/// # 不変条件
///
/// すべての行は宣言された列数とまったく同じ数のセルを持ちます。
/// この不変条件は`new()`で構築時に検証されます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularData {
    /// 列名（ソース順を保持）
    columns: Vec<String>,

    /// 行データ（各行は列順に並んだセル値）
    rows: Vec<Vec<CellValue>>,
}

impl TabularData {
    /// 列名と行データからTabularDataを構築する
    ///
    /// # 引数
    ///
    /// * `columns` - 列名のリスト（ソース順）
    /// * `rows` - 行データ。各行のセル数は`columns.len()`と一致すること
    ///
    /// # 戻り値
    ///
    /// * `Ok(TabularData)` - 構築に成功した場合
    /// * `Err(XlsxChatError::Config)` - 列数と一致しない行が存在する場合
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, XlsxChatError> {
        let expected = columns.len();
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(XlsxChatError::Config(format!(
                    "Row {} has {} cells, expected {}",
                    idx,
                    row.len(),
                    expected
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    /// 列名のリストを取得
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 行データを取得
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// 行数を取得
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 列数を取得
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// 行データへの可変アクセス（正規化処理用）
    ///
    /// 行の長さを変更してはならない。セル値の置き換えのみに使用する。
    pub(crate) fn rows_mut(&mut self) -> &mut [Vec<CellValue>] {
        &mut self.rows
    }
}

/// 1シート分の変換結果
///
/// 変換が試行されたシートごとに1回生成され、生成後は変更されません。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetConversionResult {
    /// シート名
    pub sheet_name: String,

    /// 生成されたMarkdownテキスト（シートヘッダーブロックを含む）
    pub markdown_text: String,

    /// データ行数
    pub row_count: usize,

    /// 列数
    pub column_count: usize,

    /// フォールバックアルゴリズムが使用されたかどうか
    pub used_fallback: bool,
}

/// 選択されたシート全体に対する変換結果の集約
///
/// すべてのシートの処理が完了した後にアトミックに生成されます。
/// セッションに保存される際は、以前の結果を丸ごと置き換えます
/// （マージは行われません）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    /// 成功したシートの変換結果（選択順）
    pub results: Vec<SheetConversionResult>,

    /// 失敗・スキップされたシートのエラーメッセージ（発生順）
    pub errors: Vec<String>,

    /// すべてのシートブロックを連結したMarkdownドキュメント
    pub document: String,

    /// 推奨出力ファイル名（元のファイル名の`.xlsx`を`.md`に置換）
    pub suggested_filename: String,
}

impl ConversionOutcome {
    /// 成功したシート名のリストを取得（選択順）
    pub fn sheet_names(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.sheet_name.as_str()).collect()
    }

    /// エラー・警告が記録されているかどうか
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_is_empty() {
        assert!(CellValue::Empty.is_empty());
        assert!(!CellValue::Number(42.0).is_empty());
        assert!(!CellValue::Text("test".to_string()).is_empty());
    }

    #[test]
    fn test_cell_value_to_display_string() {
        assert_eq!(CellValue::Empty.to_display_string(), "");
        assert_eq!(CellValue::Number(42.5).to_display_string(), "42.5");
        assert_eq!(
            CellValue::Text("hello".to_string()).to_display_string(),
            "hello"
        );
    }

    #[test]
    fn test_tabular_data_new() {
        let data = TabularData::new(
            vec!["A".to_string(), "B".to_string()],
            vec![
                vec![CellValue::Number(1.0), CellValue::Text("x".to_string())],
                vec![CellValue::Empty, CellValue::Number(2.0)],
            ],
        )
        .unwrap();

        assert_eq!(data.row_count(), 2);
        assert_eq!(data.column_count(), 2);
        assert_eq!(data.columns(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_tabular_data_rejects_ragged_rows() {
        let result = TabularData::new(
            vec!["A".to_string(), "B".to_string()],
            vec![vec![CellValue::Number(1.0)]],
        );

        match result {
            Err(XlsxChatError::Config(msg)) => {
                assert!(msg.contains("Row 0"));
                assert!(msg.contains("expected 2"));
            }
            _ => panic!("Expected Config error for ragged rows"),
        }
    }

    #[test]
    fn test_tabular_data_zero_rows() {
        // 行ゼロ・列ありのテーブルは型としては有効
        let data = TabularData::new(vec!["A".to_string()], vec![]).unwrap();
        assert_eq!(data.row_count(), 0);
        assert_eq!(data.column_count(), 1);
    }

    #[test]
    fn test_conversion_outcome_helpers() {
        let outcome = ConversionOutcome {
            results: vec![SheetConversionResult {
                sheet_name: "Sales".to_string(),
                markdown_text: "## Sales\n".to_string(),
                row_count: 3,
                column_count: 2,
                used_fallback: false,
            }],
            errors: vec!["Sheet 'Empty' is empty".to_string()],
            document: "## Sales\n".to_string(),
            suggested_filename: "report.md".to_string(),
        };

        assert_eq!(outcome.sheet_names(), vec!["Sales"]);
        assert!(outcome.has_errors());
    }

    #[test]
    fn test_sheet_conversion_result_serde_round_trip() {
        let result = SheetConversionResult {
            sheet_name: "データ".to_string(),
            markdown_text: "| a |\n".to_string(),
            row_count: 1,
            column_count: 1,
            used_fallback: true,
        };

        let json = serde_json::to_string(&result).unwrap();
        let restored: SheetConversionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, restored);
    }
}
