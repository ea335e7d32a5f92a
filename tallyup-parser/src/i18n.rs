use nom::error::Error;

const SNIPPET_CHARS: usize = 24;

fn snippet(input: &str) -> String {
    let trimmed = input.trim();
    let mut out: String = trimmed.chars().take(SNIPPET_CHARS).collect();
    if trimmed.chars().count() > SNIPPET_CHARS {
        out.push('…');
    }
    out
}

#[cfg(feature = "ja")]
pub fn syntax_error_detail(err: nom::Err<Error<&str>>) -> String {
    match err {
        nom::Err::Incomplete(_) => "入力が途中で終わっています".to_string(),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            format!("'{}' の付近を解釈できません", snippet(e.input))
        }
    }
}

#[cfg(feature = "ja")]
pub fn syntax_error_unparsed_detail(input: &str) -> String {
    format!("解析されていない入力: {}", snippet(input))
}

#[cfg(not(feature = "ja"))]
pub fn syntax_error_detail(err: nom::Err<Error<&str>>) -> String {
    match err {
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            format!("unexpected input near '{}'", snippet(e.input))
        }
    }
}

#[cfg(not(feature = "ja"))]
pub fn syntax_error_unparsed_detail(input: &str) -> String {
    format!("unparsed input: {}", snippet(input))
}
