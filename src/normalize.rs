use once_cell::sync::Lazy;
use regex::Regex;

/// 电子表格时间格式残留，例如 "3:16:00" 或 "3:16:00.000000" 末尾的 ":00"
static TIME_ARTIFACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":00(\.0+)?$").expect("time artifact pattern is valid"));

/// 规范化单个字段值
///
/// - 空值（`None`）→ 空字符串
/// - 去掉首尾空白
/// - 去掉末尾的时间残留（":00" 或 ":00.000…"），直到不再匹配
/// - 不区分大小写的 "nan" → 空字符串
///
/// 对任意输入都是幂等的：`normalize_field(Some(&normalize_field(x))) == normalize_field(x)`。
pub fn normalize_field(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    let mut value = raw.trim();
    while let Some(found) = TIME_ARTIFACT.find(value) {
        value = value[..found.start()].trim_end();
    }

    if value.eq_ignore_ascii_case("nan") {
        return String::new();
    }

    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(value: &str) -> String {
        normalize_field(Some(value))
    }

    #[test]
    fn test_null_and_nan_become_empty() {
        assert_eq!(normalize_field(None), "");
        assert_eq!(norm(""), "");
        assert_eq!(norm("nan"), "");
        assert_eq!(norm("NaN"), "");
        assert_eq!(norm("  NAN  "), "");
    }

    #[test]
    fn test_strips_time_artifacts() {
        assert_eq!(norm("3:16:00"), "3:16");
        assert_eq!(norm("3:16:00.000"), "3:16");
        assert_eq!(norm("3:16:00.000000"), "3:16");
        assert_eq!(norm("  3:16:00  "), "3:16");
    }

    #[test]
    fn test_leaves_references_untouched() {
        assert_eq!(norm("3:16"), "3:16");
        assert_eq!(norm("Genesis 1:1"), "Genesis 1:1");
        assert_eq!(norm("John 3:16"), "John 3:16");
        // 只匹配冒号后的两个零
        assert_eq!(norm("3:16:001"), "3:16:001");
        assert_eq!(norm("3:16:00.5"), "3:16:00.5");
    }

    #[test]
    fn test_whole_hour_strips_to_hour() {
        // 反复截断直到不再以 ":00" 结尾
        assert_eq!(norm("3:00:00"), "3");
        assert_eq!(norm("10:00"), "10");
        assert_eq!(norm("3:00:00.000"), "3");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(norm("  In the beginning \t"), "In the beginning");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "nan",
            "3:16:00",
            "3:00:00",
            "3:16:00.000000",
            "nan:00",
            "Genesis 1:1",
            " :00 ",
            "abc :00",
            "  Who built the ark?  ",
        ];

        for sample in samples {
            let once = norm(sample);
            let twice = norm(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
        }
    }
}
