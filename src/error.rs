//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// xlsxchatクレート全体で使用するエラー型
///
/// このエラー型は、アップロード検証、Excelファイルの解析、変換処理中に
/// 発生するすべてのエラーを統一的に扱うために使用されます。
///
/// # エラーの分類
///
/// - 入力検証エラー（`InvalidExtension`, `EmptyWorkbook`）: 即座に報告され、
///   以降の処理をブロックします。セッション状態は変更されません。
/// - ファイルレベル致命エラー（`Io`, `Parse`）: アップロード段階で報告され、
///   そのアップロードのワークフロー全体を中断します。
/// - 変換全体の失敗（`AllSheetsFailed`）: 選択されたすべてのシートが失敗した
///   場合に発生します。シートごとのエラーメッセージをすべて保持します。
///
/// シート単位の回復可能なエラー（読み込み失敗、空シートなど）はこの型では
/// 表現されません。それらは`ConversionOutcome`のエラーリストに文字列として
/// 記録され、変換は残りのシートで継続します。
#[derive(Error, Debug)]
pub enum XlsxChatError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー
    ///
    /// calamineクレートがExcelファイルを解析する際に発生したエラーです。
    /// ファイル形式が不正、破損したファイルなどが原因となります。
    ///
    /// `#[from]`属性により、`calamine::Error`から自動的に変換されます。
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// アップロードされたファイルの拡張子が`.xlsx`ではないエラー
    ///
    /// 拡張子チェックは大文字・小文字を区別しません。MIMEタイプとは異なり、
    /// 拡張子は権威的な判定基準であり、不一致は即座に拒否されます。
    #[error("File '{filename}' is not an XLSX file (.xlsx extension required)")]
    InvalidExtension {
        /// アップロードされたファイル名
        filename: String,
    },

    /// ワークブックにシートが1枚も含まれていないエラー
    #[error("Workbook contains no sheets")]
    EmptyWorkbook,

    /// 指定されたシートが見つからないエラー
    #[error("Sheet '{sheet}' not found")]
    SheetNotFound {
        /// 見つからなかったシート名
        sheet: String,
    },

    /// 設定の検証に失敗したエラー
    ///
    /// `ConversionOptionsBuilder::build()`時に設定を検証し、無効な設定が
    /// 検出された場合に発生します。例えば、最大列幅が許容範囲（10〜100）を
    /// 外れている場合などです。
    #[error("Configuration error: {0}")]
    Config(String),

    /// Markdownテーブルの生成に失敗したエラー
    ///
    /// プライマリレンダラーが失敗した場合に発生します。`SheetConverter`は
    /// このエラーを捕捉してフォールバックアルゴリズムに切り替えるため、
    /// 変換全体が中断されることはありません。
    #[error("Markdown rendering failed: {0}")]
    Render(String),

    /// 選択されたすべてのシートの変換に失敗したエラー
    ///
    /// 1枚も変換に成功しなかった場合、シートごとのエラーメッセージを
    /// すべてまとめて報告します。既存の変換結果がセッションに存在する
    /// 場合、それは置き換えられずそのまま残ります。
    #[error("All sheets failed to convert: {}", errors.join("; "))]
    AllSheetsFailed {
        /// シートごとのエラーメッセージ（選択順）
        errors: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: XlsxChatError = io_err.into();

        match error {
            XlsxChatError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_parse_error_display() {
        let parse_err = calamine::Error::Msg("Corrupted file");
        let error: XlsxChatError = parse_err.into();

        let error_msg = error.to_string();
        assert!(error_msg.contains("Failed to parse Excel file"));
        assert!(error_msg.contains("Corrupted file"));
    }

    #[test]
    fn test_invalid_extension_display() {
        let error = XlsxChatError::InvalidExtension {
            filename: "data.csv".to_string(),
        };
        let error_msg = error.to_string();
        assert!(error_msg.contains("data.csv"));
        assert!(error_msg.contains(".xlsx"));
    }

    #[test]
    fn test_empty_workbook_display() {
        let error = XlsxChatError::EmptyWorkbook;
        assert_eq!(error.to_string(), "Workbook contains no sheets");
    }

    #[test]
    fn test_sheet_not_found_display() {
        let error = XlsxChatError::SheetNotFound {
            sheet: "Summary".to_string(),
        };
        assert!(error.to_string().contains("'Summary'"));
    }

    #[test]
    fn test_config_error_display() {
        let error = XlsxChatError::Config("max_column_width out of range".to_string());
        let error_msg = error.to_string();
        assert!(error_msg.contains("Configuration error"));
        assert!(error_msg.contains("max_column_width out of range"));
    }

    #[test]
    fn test_all_sheets_failed_display() {
        let error = XlsxChatError::AllSheetsFailed {
            errors: vec![
                "Sheet 'A' is empty".to_string(),
                "B: read error".to_string(),
            ],
        };
        let error_msg = error.to_string();
        assert!(error_msg.starts_with("All sheets failed to convert"));
        assert!(error_msg.contains("Sheet 'A' is empty"));
        assert!(error_msg.contains("B: read error"));
        assert!(error_msg.contains("; "));
    }

    // ?演算子による自動変換の動作確認
    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), XlsxChatError> {
            let _file = std::fs::File::open("nonexistent_file.xlsx")?;
            Ok(())
        }

        match io_operation() {
            Err(XlsxChatError::Io(_)) => {}
            _ => panic!("Expected Io error from ? operator"),
        }
    }
}
