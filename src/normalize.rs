//! Normalizer Module
//!
//! セル値を表示用文字列表現へ正規化するモジュール。
//! pandasの`astype(str).replace('nan', '')`に相当する処理を、
//! プレースホルダ文字列を一切生成しない形で実装する。

use crate::types::{CellValue, TabularData};

/// TabularDataを列ごとにインプレースで正規化する
///
/// # 変換規則
///
/// - `Number`: そのまま通過（数値は自身の文字列化を後段のレンダラーに委ねる）
/// - `Text`: そのまま通過
/// - `Empty`: 空文字列の`Text`に変換（"null"や"NaN"といったリテラルには決してならない）
///
/// 論理値・日付・エラー値はワークブック読み込み時点で既に`Text`へ変換されて
/// いるため、この関数が受け取る値の定義域は上記3種のみです。任意の値に対して
/// 全域的であり、エラー条件はありません。
///
/// # 冪等性
///
/// 正規化済みのデータを再度正規化しても、結果は変化しません。
pub fn normalize(data: &mut TabularData) {
    let column_count = data.column_count();
    for col in 0..column_count {
        for row in data.rows_mut().iter_mut() {
            let cell = &mut row[col];
            if cell.is_empty() {
                *cell = CellValue::Text(String::new());
            }
        }
    }
}
