//! Command Router Integration Tests
//!
//! Tests the chat command surface against real converted workbooks:
//! intent matching, state preconditions, and the chat log contract.

use rust_xlsxwriter::{Workbook as XlsxWorkbook, XlsxError};
use xlsxchat::{
    ChatRole, CommandRouter, ConversionOptions, ConversionSession, NoProgress, SheetConverter,
    UiAction, UploadedFile, Workbook,
};

/// Build a session holding the outcome of a real conversion.
/// The workbook contains one data sheet and one empty sheet, so the
/// outcome carries both results and a non-empty error list.
fn converted_session() -> ConversionSession {
    fn build() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = XlsxWorkbook::new();

        let data = workbook.add_worksheet();
        data.set_name("Data")?;
        data.write_string(0, 0, "Item")?;
        for row in 1..=60 {
            data.write_string(row, 0, &format!("item number {}", row))?;
        }

        let empty = workbook.add_worksheet();
        empty.set_name("Empty")?;

        Ok(workbook.save_to_buffer()?)
    }

    let bytes = build().unwrap();
    let (mut workbook, _) = Workbook::open(UploadedFile::new("data.xlsx", None, bytes)).unwrap();
    let converter = SheetConverter::new(ConversionOptions::default());
    let selected = workbook.sheet_names().to_vec();
    let outcome = converter
        .convert(&mut workbook, &selected, &mut NoProgress)
        .unwrap();

    let mut session = ConversionSession::new();
    session.store_outcome(outcome);
    session
}

#[test]
fn test_download_on_empty_session() {
    let mut session = ConversionSession::new();
    let router = CommandRouter::new();

    let (response, action) = router.handle(&mut session, "/download");
    assert!(response.contains("No Excel file has been converted yet"));
    assert_eq!(action, UiAction::None);
}

#[test]
fn test_download_on_ready_session() {
    let mut session = converted_session();
    let router = CommandRouter::new();

    let (_, action) = router.handle(&mut session, "download");
    match action {
        UiAction::OfferDownload { filename, content } => {
            assert_eq!(filename, "data.md");
            assert!(content.contains("## Data"));
        }
        _ => panic!("Expected OfferDownload"),
    }
}

#[test]
fn test_slash_and_plain_and_japanese_keywords_are_equivalent() {
    let router = CommandRouter::new();

    for input in ["/preview", "preview", "プレビューを見せて", "PREVIEW"] {
        let mut session = converted_session();
        let (_, action) = router.handle(&mut session, input);
        assert!(
            matches!(action, UiAction::ShowPreview(_)),
            "input {:?} did not trigger preview",
            input
        );
    }
}

#[test]
fn test_preview_is_truncated_to_first_1000_chars() {
    let mut session = converted_session();
    let full_len = session.outcome().unwrap().document.chars().count();
    assert!(full_len > 1000, "fixture document should exceed the limit");

    let router = CommandRouter::new();
    let (_, action) = router.handle(&mut session, "preview");

    match action {
        UiAction::ShowPreview(text) => {
            assert!(text.ends_with("... (truncated)"));
            let body: String = text.chars().take(1000).collect();
            assert!(session.outcome().unwrap().document.starts_with(&body));
        }
        _ => panic!("Expected ShowPreview"),
    }
}

#[test]
fn test_error_listing_from_last_outcome() {
    let mut session = converted_session();
    let router = CommandRouter::new();

    let (_, action) = router.handle(&mut session, "エラーを表示");
    match action {
        UiAction::ShowErrors(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("Empty"));
        }
        _ => panic!("Expected ShowErrors"),
    }
}

#[test]
fn test_help_lists_all_three_commands() {
    let mut session = converted_session();
    let router = CommandRouter::new();

    let (response, action) = router.handle(&mut session, "what can you do?");
    assert_eq!(action, UiAction::None);
    assert!(response.contains("/download"));
    assert!(response.contains("/preview"));
    assert!(response.contains("/error"));
}

#[test]
fn test_chat_log_records_both_sides_in_order() {
    let mut session = converted_session();
    let router = CommandRouter::new();

    router.handle(&mut session, "download");
    router.handle(&mut session, "unrelated chatter");

    let log = session.log();
    assert_eq!(log.len(), 4);
    assert_eq!(log[0].role, ChatRole::User);
    assert_eq!(log[0].text, "download");
    assert_eq!(log[1].role, ChatRole::Assistant);
    assert_eq!(log[2].text, "unrelated chatter");
    assert_eq!(log[3].role, ChatRole::Assistant);
}

#[test]
fn test_chat_log_is_serializable_for_host_ui() {
    let mut session = converted_session();
    let router = CommandRouter::new();
    router.handle(&mut session, "/preview");

    let json = serde_json::to_string(session.log()).unwrap();
    assert!(json.contains("\"user\""));
    assert!(json.contains("\"assistant\""));
}
