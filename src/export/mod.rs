// Duplicate Review 导出流程
// 选中题目 → 重复分类 → 可选去重 → 汇总 / 审阅 → 多工作表 xlsx

pub mod types;
pub mod classifier;
pub mod review;
pub mod sheet_builder;
pub mod report;

pub use types::*;
pub use classifier::{classify, Classification};
pub use review::aggregate_review;
pub use sheet_builder::{CellValue, Highlight, SheetBuilder};
pub use report::render_workbook;

use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use rust_xlsxwriter::XlsxError;
use thiserror::Error;
use tracing::{debug, info};

use crate::db::{self, StorageError};
use crate::models::QuestionRecord;

/// 下载文件名
pub const EXPORT_FILENAME: &str = "selected_questions.xlsx";
/// xlsx 的 MIME 类型
pub const EXPORT_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Error, Debug)]
pub enum ExportError {
    /// 用户没有勾选任何题目，不生成文件
    #[error("no selection")]
    NoSelection,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("生成 xlsx 失败: {0}")]
    Xlsx(#[from] XlsxError),
}

/// 导出选中的题目
///
/// # 参数
/// - `conn`: 数据库连接
/// - `selected_ids`: 用户勾选的题目 ID
/// - `remove_duplicates`: 是否在主表中每个题干只保留一条
///
/// # 返回
/// xlsx 文件字节；没有勾选时返回 `ExportError::NoSelection`
pub fn compose_export(
    conn: &Connection,
    selected_ids: &[i64],
    remove_duplicates: bool,
) -> Result<Vec<u8>, ExportError> {
    compose_export_at(conn, selected_ids, remove_duplicates, Local::now().naive_local())
}

/// 与 `compose_export` 相同，但使用给定的导出时间
pub fn compose_export_at(
    conn: &Connection,
    selected_ids: &[i64],
    remove_duplicates: bool,
    timestamp: NaiveDateTime,
) -> Result<Vec<u8>, ExportError> {
    let records = load_selection(conn, selected_ids)?;
    render_export(records, remove_duplicates, timestamp)
}

/// 读取选中的题目，这是导出流程中唯一访问数据库的一步
///
/// 没有勾选时返回 `ExportError::NoSelection`，不访问数据库。
pub fn load_selection(
    conn: &Connection,
    selected_ids: &[i64],
) -> Result<Vec<QuestionRecord>, ExportError> {
    if selected_ids.is_empty() {
        return Err(ExportError::NoSelection);
    }

    let records = db::load_records_by_ids(conn, selected_ids)?;
    debug!(requested = selected_ids.len(), loaded = records.len(), "loaded selection");
    Ok(records)
}

/// 由已读取的题目生成 xlsx，不需要数据库连接
pub fn render_export(
    records: Vec<QuestionRecord>,
    remove_duplicates: bool,
    timestamp: NaiveDateTime,
) -> Result<Vec<u8>, ExportError> {
    let plan = build_export(records, remove_duplicates, timestamp);
    info!(
        total = plan.summary.total_selected,
        unique = plan.summary.unique_question_count,
        duplicates = plan.summary.duplicate_record_count,
        review_groups = plan.review.len(),
        removed = plan.summary.duplicates_removed,
        "composing export"
    );

    Ok(render_workbook(&plan)?)
}

/// 纯计算部分：分类、去重、汇总与审阅
///
/// 仅重复表、重复计数和审阅表都基于去重前的数据。
pub fn build_export(
    records: Vec<QuestionRecord>,
    remove_duplicates: bool,
    timestamp: NaiveDateTime,
) -> ExportPlan {
    let total_selected = records.len();
    let Classification { all, duplicates } = classify(records);

    let review = aggregate_review(all.iter().map(|r| &r.record));
    let duplicate_record_count = duplicates.len();

    let selected = if remove_duplicates {
        classifier::remove_duplicates(all)
    } else {
        all
    };

    let summary = ExportSummary {
        timestamp,
        total_selected,
        unique_question_count: classifier::distinct_question_count(&selected),
        duplicate_record_count,
        duplicates_removed: remove_duplicates,
    };

    ExportPlan {
        selected,
        duplicates,
        summary,
        review,
    }
}
