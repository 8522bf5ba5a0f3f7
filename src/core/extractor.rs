//! 從任意文字（例如 RSC/HTML 頁面）中取出某個 key 後面的第一個 `{...}` 物件。
//!
//! 掃描時會略過字串常值（含跳脫字元）內的大括號，所以 `"a":"{"` 之類的值
//! 不會讓深度計數失準。回傳的片段保證大括號平衡，但不保證是合法 JSON，
//! 由呼叫端再做 decode。

use crate::utils::error::ExtractError;

pub fn extract<'a>(text: &'a str, key: &str) -> Result<&'a str, ExtractError> {
    let needle = format!("\"{}\"", key);
    let key_pos = text.find(&needle).ok_or(ExtractError::NotFound)?;

    let colon_pos = text[key_pos..]
        .find(':')
        .map(|offset| key_pos + offset)
        .ok_or(ExtractError::NotFound)?;

    let start = text[colon_pos..]
        .find('{')
        .map(|offset| colon_pos + offset)
        .ok_or(ExtractError::NotFound)?;

    // 只比對 ASCII 位元組，切片位置一定落在 UTF-8 字元邊界上
    let bytes = text.as_bytes();
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    Err(ExtractError::Unbalanced)
}
