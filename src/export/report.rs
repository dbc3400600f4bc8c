use rust_xlsxwriter::{Color, Format, Workbook, XlsxError};

use super::sheet_builder::{CellValue, Highlight, SheetBuilder};
use super::types::{ClassifiedRecord, ExportPlan, ExportSummary, ReviewRow};

pub const SHEET_SELECTED: &str = "Selected Questions";
pub const SHEET_DUPLICATES: &str = "Duplicates Only";
pub const SHEET_SUMMARY: &str = "Export Summary";
pub const SHEET_REVIEW: &str = "Duplicate Review";

/// 题目列。"Question" 列放题干、"Correct Answer" 列放答案，
/// 与来源表的列标题一致（数据库里两列名字是交叉的，见 `db` 模块）。
pub const RECORD_HEADERS: [&str; 6] = [
    "Chapter",
    "Question",
    "Correct Answer",
    "Answer B",
    "Answer C",
    "Answer D",
];

pub const SUMMARY_HEADERS: [&str; 5] = [
    "Export Timestamp",
    "Total Selected",
    "Unique Questions",
    "Duplicate Count",
    "Duplicates Removed",
];

pub const REVIEW_HEADERS: [&str; 3] = ["Question", "Count", "Chapters"];

/// Excel 的浅红填充
const HIGHLIGHT_FILL: u32 = 0xFFC7CE;

/// "Question" 列的下标
const QUESTION_COLUMN: u16 = 1;
/// "Count" 列的下标
const COUNT_COLUMN: u16 = 1;

/// 按固定顺序列出要输出的工作表
///
/// 仅重复表和审阅表在没有数据时省略。
pub fn plan_sheets(plan: &ExportPlan) -> Vec<SheetBuilder> {
    let mut sheets = Vec::with_capacity(4);

    sheets.push(
        SheetBuilder::new(SHEET_SELECTED, &RECORD_HEADERS)
            .rows(plan.selected.iter().map(record_row))
            .highlight(Highlight::DuplicateValues {
                column: QUESTION_COLUMN,
            }),
    );

    if !plan.duplicates.is_empty() {
        sheets.push(
            SheetBuilder::new(SHEET_DUPLICATES, &RECORD_HEADERS)
                .rows(plan.duplicates.iter().map(record_row))
                .highlight(Highlight::NonBlank),
        );
    }

    sheets.push(
        SheetBuilder::new(SHEET_SUMMARY, &SUMMARY_HEADERS).rows([summary_row(&plan.summary)]),
    );

    if !plan.review.is_empty() {
        sheets.push(
            SheetBuilder::new(SHEET_REVIEW, &REVIEW_HEADERS)
                .rows(plan.review.iter().map(review_row))
                .highlight(Highlight::GreaterThan {
                    column: COUNT_COLUMN,
                    value: 1,
                }),
        );
    }

    sheets
}

/// 将导出计划渲染为 xlsx 字节
pub fn render_workbook(plan: &ExportPlan) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let fill = Format::new().set_background_color(Color::RGB(HIGHLIGHT_FILL));

    for sheet in plan_sheets(plan) {
        sheet.write_to(&mut workbook, &header_format, &fill)?;
    }

    workbook.save_to_buffer()
}

fn record_row(classified: &ClassifiedRecord) -> Vec<CellValue> {
    let r = &classified.record;
    vec![
        r.chapter.as_str().into(),
        r.question_text.as_str().into(),
        r.correct_answer.as_str().into(),
        r.answer_b.as_str().into(),
        r.answer_c.as_str().into(),
        r.answer_d.as_str().into(),
    ]
}

fn summary_row(summary: &ExportSummary) -> Vec<CellValue> {
    vec![
        summary.timestamp_label().into(),
        summary.total_selected.into(),
        summary.unique_question_count.into(),
        summary.duplicate_record_count.into(),
        summary.removed_label().into(),
    ]
}

fn review_row(row: &ReviewRow) -> Vec<CellValue> {
    vec![
        row.question_text.as_str().into(),
        row.count.into(),
        row.chapters_label().into(),
    ]
}
