//! Markdown Renderer Module
//!
//! TabularDataからMarkdownテーブルブロックを生成するモジュール。
//! 表示幅を考慮した整形済みテーブルを生成するプライマリアルゴリズムと、
//! 1列以上のあらゆる入力に対して成功が保証されるフォールバックアルゴリズムを
//! 提供する。プライマリは信頼できない処理として扱われ、失敗した場合は
//! 呼び出し側（`SheetConverter`）がフォールバックに切り替える。

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::convert::ConversionOptions;
use crate::error::XlsxChatError;
use crate::types::TabularData;

/// 区切り行の最小幅に合わせた列の最小表示幅
const MIN_COLUMN_WIDTH: usize = 3;

/// TabularDataをMarkdownテーブルに変換する（プライマリアルゴリズム）
///
/// ヘッダー行、区切り行、データ行からなるMarkdownテーブルブロックを
/// 生成します。セルは表示幅（全角文字は2、半角文字は1）に基づいて
/// 左揃えでパディングされます。
///
/// # セルの整形規則
///
/// - `max_column_width`を超えるセルは語境界で折り返され、`<br>`で連結
///   されます（切り捨ては行われません）。上限より長い単語は文字単位で
///   分割されます。
/// - セル内の`|`は`\|`にエスケープされ、列数が崩れることはありません。
/// - セル内の改行は折り返しと同様に`<br>`になります。
/// - `include_row_index`が有効な場合、先頭に0始まりの行番号列が付きます。
///
/// # 引数
///
/// * `data` - 変換対象の表データ（正規化済みであること）
/// * `options` - 変換オプション
///
/// # 戻り値
///
/// * `Ok(String)` - 生成されたMarkdownテーブル
/// * `Err(XlsxChatError::Render)` - 列数ゼロの入力、または生成結果の
///   整合性検査に失敗した場合
pub fn render_table(
    data: &TabularData,
    options: &ConversionOptions,
) -> Result<String, XlsxChatError> {
    if data.column_count() == 0 {
        return Err(XlsxChatError::Render(
            "table has no columns".to_string(),
        ));
    }

    // 1. セル内容の準備（折り返し・エスケープ）
    let mut header: Vec<String> = Vec::new();
    if options.include_row_index {
        header.push(String::new());
    }
    for name in data.columns() {
        header.push(prepare_cell(name, options.max_column_width));
    }

    let mut body: Vec<Vec<String>> = Vec::new();
    for (row_idx, row) in data.rows().iter().enumerate() {
        let mut cells = Vec::new();
        if options.include_row_index {
            cells.push(row_idx.to_string());
        }
        for value in row {
            cells.push(prepare_cell(
                &value.to_display_string(),
                options.max_column_width,
            ));
        }
        body.push(cells);
    }

    // 2. 列幅の計算（表示幅ベース、最小3文字）
    let total_cols = header.len();
    let mut widths = vec![MIN_COLUMN_WIDTH; total_cols];
    for (idx, cell) in header.iter().enumerate() {
        widths[idx] = widths[idx].max(cell.width());
    }
    for row in &body {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.width());
        }
    }

    // 3. 行の組み立て
    let mut output = String::new();
    push_row(&mut output, &header, &widths);
    push_separator(&mut output, &widths);
    for row in &body {
        push_row(&mut output, row, &widths);
    }

    // 4. 整合性検査: すべての行が同じ列数のテーブルとしてパースできること
    verify_table_shape(&output, total_cols)?;

    Ok(output)
}

/// TabularDataをMarkdownテーブルに変換する（フォールバックアルゴリズム）
///
/// パディングを行わない最小限のテーブルを生成します。1列以上の
/// あらゆるTabularDataに対して必ず成功します（行ゼロのテーブルでも
/// ヘッダー行と区切り行は生成されます）。
///
/// # 生成規則
///
/// 1. ヘッダー行: 列名を`" | "`で連結し、先頭・末尾を`"| ... |"`で囲む
/// 2. 区切り行: 列ごとに`---`セルを1つ
/// 3. データ行: 各セルの文字列値を`" | "`で連結
///
/// セル内の`|`エスケープと改行の`<br>`化はプライマリと同様に適用されます。
pub fn render_table_fallback(data: &TabularData, options: &ConversionOptions) -> String {
    let mut header: Vec<String> = Vec::new();
    if options.include_row_index {
        header.push(String::new());
    }
    header.extend(data.columns().iter().map(|name| escape_cell(name)));

    let mut output = String::new();
    output.push_str("| ");
    output.push_str(&header.join(" | "));
    output.push_str(" |\n");

    output.push('|');
    for _ in 0..header.len() {
        output.push_str("---|");
    }
    output.push('\n');

    for (row_idx, row) in data.rows().iter().enumerate() {
        let mut cells = Vec::new();
        if options.include_row_index {
            cells.push(row_idx.to_string());
        }
        cells.extend(row.iter().map(|v| escape_cell(&v.to_display_string())));
        output.push_str("| ");
        output.push_str(&cells.join(" | "));
        output.push_str(" |\n");
    }

    output
}

/// 1行分のセルをパディング付きで出力バッファに追記する（内部ヘルパー）
fn push_row(output: &mut String, cells: &[String], widths: &[usize]) {
    output.push('|');
    for (idx, cell) in cells.iter().enumerate() {
        let width = widths[idx];
        let content_width = cell.width();

        output.push(' ');
        output.push_str(cell);
        for _ in content_width..width {
            output.push(' ');
        }
        output.push_str(" |");
    }
    output.push('\n');
}

/// 区切り行を出力バッファに追記する（内部ヘルパー）
///
/// 各列幅に応じたハイフン列を`|`で連結します。セルの前後のスペース
/// （各1文字）を幅に含めます。
fn push_separator(output: &mut String, widths: &[usize]) {
    output.push('|');
    for &width in widths {
        for _ in 0..width + 2 {
            output.push('-');
        }
        output.push('|');
    }
    output.push('\n');
}

/// セル文字列を折り返し・エスケープして1セル分の表現にする（内部ヘルパー）
///
/// 改行で分割した各行を語境界で折り返し、パイプをエスケープした上で
/// `<br>`で連結します。エスケープは折り返しの後に行うため、`\|`の
/// ペアが分割されることはありません。
fn prepare_cell(text: &str, max_width: usize) -> String {
    let mut segments: Vec<String> = Vec::new();
    for line in text.split('\n') {
        segments.extend(wrap_line(line.trim(), max_width));
    }

    let escaped: Vec<String> = segments
        .iter()
        .map(|segment| segment.replace('|', "\\|"))
        .collect();
    escaped.join("<br>")
}

/// 1行のテキストを語境界で折り返す（内部ヘルパー）
///
/// 表示幅が`max_width`を超えないように単語を詰めていきます。
/// 単語単体で上限を超える場合は文字単位で分割します。
fn wrap_line(line: &str, max_width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;

    for word in line.split_whitespace() {
        let word_width = word.width();

        if word_width > max_width {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_width = 0;
            }
            let (pieces, leftover, leftover_width) = split_long_word(word, max_width);
            out.extend(pieces);
            current = leftover;
            current_width = leftover_width;
            continue;
        }

        if current.is_empty() {
            current = word.to_string();
            current_width = word_width;
        } else if current_width + 1 + word_width <= max_width {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
        } else {
            out.push(std::mem::take(&mut current));
            current = word.to_string();
            current_width = word_width;
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

/// 上限より長い単語を文字単位で分割する（内部ヘルパー）
///
/// 完成した断片のリストと、未満了の末尾断片（後続の単語と連結可能）を返します。
fn split_long_word(word: &str, max_width: usize) -> (Vec<String>, String, usize) {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_width = 0usize;

    for ch in word.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if piece_width + ch_width > max_width && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            piece_width = 0;
        }
        piece.push(ch);
        piece_width += ch_width;
    }

    (pieces, piece, piece_width)
}

/// フォールバック用のセルエスケープ（内部ヘルパー）
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}

/// 生成済みテーブルの整合性を検査する（内部ヘルパー）
///
/// すべての行がエスケープされていない`|`をちょうど`columns + 1`個持つことを
/// 確認します。不一致が検出された場合、このテーブルはMarkdownとして
/// 正しくパースされないため、レンダリング失敗として扱います。
fn verify_table_shape(output: &str, total_cols: usize) -> Result<(), XlsxChatError> {
    for (line_idx, line) in output.lines().enumerate() {
        let pipes = count_unescaped_pipes(line);
        if pipes != total_cols + 1 {
            return Err(XlsxChatError::Render(format!(
                "line {} has {} column delimiters, expected {}",
                line_idx,
                pipes,
                total_cols + 1
            )));
        }
    }
    Ok(())
}

/// エスケープされていないパイプ文字の数を数える（内部ヘルパー）
fn count_unescaped_pipes(line: &str) -> usize {
    let mut count = 0;
    let mut prev = '\0';
    for ch in line.chars() {
        if ch == '|' && prev != '\\' {
            count += 1;
        }
        prev = ch;
    }
    count
}
