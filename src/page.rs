use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::models::QuestionRecord;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Bible Quiz Search</title>
    <style>
        body { font-family: Arial; margin: 40px; background-color: #f9f9f9; }
        h1 { color: #333; }
        form { margin-bottom: 20px; }
        input[type="text"], select { padding: 8px; font-size: 14px; }
        input[type="submit"] { padding: 8px 16px; }
        .result { margin-bottom: 20px; padding: 10px; background: #fff; border: 1px solid #ccc; }
        .question { font-weight: bold; }
        .answer { color: green; }
    </style>
</head>
<body>
    <h1>🔍 Bible Quiz Search</h1>
"#;

const SELECT_ALL_SCRIPT: &str = r#"<script>
document.getElementById("select-all").addEventListener("change", function(e) {
    const checked = e.target.checked;
    document.querySelectorAll('input[name="selected_ids"]').forEach(cb => {
        cb.checked = checked;
    });
});
</script>
"#;

/// 搜索页数据
pub struct SearchPage<'a> {
    pub query: &'a str,
    pub chapters: &'a [String],
    pub selected_chapter: &'a str,
    pub results: &'a [QuestionRecord],
}

/// 渲染搜索页
///
/// 所有插入的文本都经过 HTML 转义。结果为空时不输出导出表单。
pub fn render_search_page(page: &SearchPage<'_>) -> String {
    let mut html = String::with_capacity(4096 + page.results.len() * 512);
    html.push_str(PAGE_HEAD);

    html.push_str("    <form method=\"get\">\n");
    html.push_str(&format!(
        "        <input type=\"text\" name=\"q\" placeholder=\"Enter keyword...\" value=\"{}\">\n",
        encode_double_quoted_attribute(page.query)
    ));
    html.push_str("        <select name=\"chapter\">\n");
    html.push_str("            <option value=\"\">-- All Chapters --</option>\n");
    for chapter in page.chapters {
        let selected = if chapter == page.selected_chapter {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            "            <option value=\"{}\"{}>{}</option>\n",
            encode_double_quoted_attribute(chapter),
            selected,
            encode_text(chapter)
        ));
    }
    html.push_str("        </select>\n");
    html.push_str("        <input type=\"submit\" value=\"Search\">\n");
    html.push_str("    </form>\n");

    if !page.results.is_empty() {
        render_results(&mut html, page.results);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_results(html: &mut String, results: &[QuestionRecord]) {
    html.push_str("<form method=\"post\" action=\"/export\">\n");
    html.push_str(&format!(
        "    <p><strong>{} result(s) found:</strong></p>\n",
        results.len()
    ));
    html.push_str("    <label>\n        <input type=\"checkbox\" id=\"select-all\"> Select All\n    </label>\n    <br><br>\n");

    for record in results {
        html.push_str("    <div class=\"result\">\n");
        html.push_str(&format!(
            "        <input type=\"checkbox\" name=\"selected_ids\" value=\"{}\">\n",
            record.id
        ));
        html.push_str(&format!(
            "        <div class=\"question\">Q: {}</div>\n",
            encode_text(&record.question_text)
        ));
        html.push_str(&format!(
            "        <div class=\"answer\">✅ A: {}</div>\n",
            encode_text(&record.correct_answer)
        ));
        html.push_str(&format!(
            "        <ul>\n            <li>B: {}</li>\n            <li>C: {}</li>\n            <li>D: {}</li>\n        </ul>\n",
            encode_text(&record.answer_b),
            encode_text(&record.answer_c),
            encode_text(&record.answer_d)
        ));
        html.push_str(&format!(
            "        <div><em>Chapter: {}</em></div>\n",
            encode_text(&record.chapter)
        ));
        html.push_str("    </div>\n");
    }

    html.push_str("    <label>\n        <input type=\"checkbox\" name=\"remove_duplicates\">\n        Remove duplicates (based on Question text)\n    </label><br><br>\n");
    html.push_str("    <input type=\"submit\" value=\"Export Selected\">\n");
    html.push_str("</form>\n");
    html.push_str(SELECT_ALL_SCRIPT);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, question: &str) -> QuestionRecord {
        QuestionRecord {
            id,
            chapter: "Genesis 1".to_string(),
            question_text: question.to_string(),
            correct_answer: "God".to_string(),
            answer_b: "Adam".to_string(),
            answer_c: "Eve".to_string(),
            answer_d: "Noah".to_string(),
        }
    }

    #[test]
    fn test_empty_results_has_no_export_form() {
        let chapters = vec!["Genesis 1".to_string()];
        let html = render_search_page(&SearchPage {
            query: "",
            chapters: &chapters,
            selected_chapter: "",
            results: &[],
        });
        assert!(html.contains("-- All Chapters --"));
        assert!(html.contains("<option value=\"Genesis 1\">Genesis 1</option>"));
        assert!(!html.contains("action=\"/export\""));
    }

    #[test]
    fn test_results_rendered_with_checkboxes() {
        let chapters = vec!["Exodus 3".to_string(), "Genesis 1".to_string()];
        let results = vec![record(7, "Who made light?"), record(9, "What day?")];
        let html = render_search_page(&SearchPage {
            query: "light",
            chapters: &chapters,
            selected_chapter: "Genesis 1",
            results: &results,
        });

        assert!(html.contains("2 result(s) found"));
        assert!(html.contains("name=\"selected_ids\" value=\"7\""));
        assert!(html.contains("name=\"selected_ids\" value=\"9\""));
        assert!(html.contains("Q: Who made light?"));
        assert!(html.contains("✅ A: God"));
        assert!(html.contains("<option value=\"Genesis 1\" selected>"));
        assert!(html.contains("name=\"remove_duplicates\""));
        assert!(html.contains("value=\"light\""));
    }

    #[test]
    fn test_escapes_user_text() {
        let results = vec![record(1, "<script>alert(1)</script>")];
        let html = render_search_page(&SearchPage {
            query: "\"><b>",
            chapters: &[],
            selected_chapter: "",
            results: &results,
        });
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("value=\"\"><b>\""));
    }
}
