#[cfg(all(feature = "ko", feature = "en"))]
compile_error!("Cannot enable both 'ko' and 'en' features at the same time");

fn snippet(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    trimmed.chars().take(24).collect()
}

#[cfg(feature = "ko")]
pub fn syntax_error_detail(err: nom::Err<nom::error::Error<&str>>) -> String {
    match err {
        nom::Err::Incomplete(_) => "입력이 끝나지 않았습니다".to_string(),
        nom::Err::Error(e) | nom::Err::Failure(e) => match snippet(e.input) {
            near if near.is_empty() => "문장이 예상보다 일찍 끝났습니다".to_string(),
            near => format!("'{near}' 부분을 해석할 수 없습니다"),
        },
    }
}

#[cfg(feature = "ko")]
pub fn syntax_error_unparsed_detail(rest: &str) -> String {
    format!("해석되지 않은 입력: {rest}")
}

#[cfg(not(feature = "ko"))]
pub fn syntax_error_detail(err: nom::Err<nom::error::Error<&str>>) -> String {
    match err {
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
        nom::Err::Error(e) | nom::Err::Failure(e) => match snippet(e.input) {
            near if near.is_empty() => "statement ended unexpectedly".to_string(),
            near => format!("could not understand '{near}'"),
        },
    }
}

#[cfg(not(feature = "ko"))]
pub fn syntax_error_unparsed_detail(rest: &str) -> String {
    format!("unparsed input: {rest}")
}
