use chrono::NaiveDateTime;

use crate::models::QuestionRecord;

/// 导出汇总时间戳格式：2024-05-01 13:45:09
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 带重复标记的题目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRecord {
    pub record: QuestionRecord,
    /// 是否至少还有一条记录与它题干完全相同
    pub is_duplicate: bool,
}

/// 重复审阅行：一个出现多次的题干
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub question_text: String,
    pub count: usize,
    /// 去重后按字典序排列的章节
    pub chapters: Vec<String>,
}

impl ReviewRow {
    /// "1, 2" 形式的章节列表
    pub fn chapters_label(&self) -> String {
        self.chapters.join(", ")
    }
}

/// 导出汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub timestamp: NaiveDateTime,
    /// 读取到的记录数（去重前）
    pub total_selected: usize,
    /// 最终 "Selected Questions" 表中不同题干的数量
    pub unique_question_count: usize,
    /// 属于任一重复组的记录数（按记录计，去重前）
    pub duplicate_record_count: usize,
    pub duplicates_removed: bool,
}

impl ExportSummary {
    pub fn timestamp_label(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn removed_label(&self) -> &'static str {
        if self.duplicates_removed {
            "Yes"
        } else {
            "No"
        }
    }
}

/// 一次导出需要渲染的全部数据
#[derive(Debug, Clone)]
pub struct ExportPlan {
    /// 可能已去重的全部题目，重复分组在后
    pub selected: Vec<ClassifiedRecord>,
    /// 仅重复题目（去重前计算）
    pub duplicates: Vec<ClassifiedRecord>,
    pub summary: ExportSummary,
    /// 去重前计算的审阅汇总
    pub review: Vec<ReviewRow>,
}
