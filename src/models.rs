use serde::{Deserialize, Serialize};

/// 题目记录
///
/// 从存储层读取的一道选择题，字段均已经过规范化（见 `normalize`）。
/// 在导出流程中只读。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// 存储层分配的唯一 ID
    pub id: i64,
    /// 章节标签（来源工作表名）
    pub chapter: String,
    /// 题干文本，重复检测以它为键
    pub question_text: String,
    /// 正确答案
    pub correct_answer: String,
    pub answer_b: String,
    pub answer_c: String,
    pub answer_d: String,
}

/// 待写入的题目（尚未分配 ID）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub chapter: String,
    pub question_text: String,
    pub correct_answer: String,
    pub answer_b: String,
    pub answer_c: String,
    pub answer_d: String,
}

impl NewQuestion {
    /// 五个文本字段是否全部为空（章节不计）
    pub fn is_blank(&self) -> bool {
        [
            &self.question_text,
            &self.correct_answer,
            &self.answer_b,
            &self.answer_c,
            &self.answer_d,
        ]
        .iter()
        .all(|field| field.is_empty())
    }
}

/// 搜索条件
///
/// 对应搜索页的 `q` 与 `chapter` 查询参数。空白值视为未设置。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFilter {
    #[serde(rename = "q", default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub chapter: Option<String>,
}

impl SearchFilter {
    pub fn keyword(&self) -> Option<&str> {
        non_blank(self.keyword.as_deref())
    }

    pub fn chapter(&self) -> Option<&str> {
        non_blank(self.chapter.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
