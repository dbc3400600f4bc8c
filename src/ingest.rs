//! 题库导入模块
//!
//! 读取来源工作簿的每一张工作表（表名即章节），规范化后重建 SQLite 题库。

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{Duration, NaiveDate};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::{self, StorageError};
use crate::models::NewQuestion;
use crate::normalize::normalize_field;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("无法打开工作簿: {0}")]
    Workbook(#[from] calamine::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("工作簿中没有工作表")]
    EmptyWorkbook,
}

/// 来源表的列标题
const COL_QUESTION: &str = "Question";
const COL_CORRECT_ANSWER: &str = "Correct Answer";
const COL_ANSWER_B: &str = "Answer B";
const COL_ANSWER_C: &str = "Answer C";
const COL_ANSWER_D: &str = "Answer D";

const SECONDS_PER_DAY: f64 = 86_400.0;

/// 导入结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub sheets: usize,
    pub rows: usize,
}

/// 表头中各列的位置，缺失的列为 None
#[derive(Debug, Default)]
struct ColumnMap {
    question: Option<usize>,
    correct_answer: Option<usize>,
    answer_b: Option<usize>,
    answer_c: Option<usize>,
    answer_d: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[Data]) -> Self {
        let find = |name: &str| {
            header
                .iter()
                .position(|cell| normalize_field(Some(&render_cell(cell))) == name)
        };
        Self {
            question: find(COL_QUESTION),
            correct_answer: find(COL_CORRECT_ANSWER),
            answer_b: find(COL_ANSWER_B),
            answer_c: find(COL_ANSWER_C),
            answer_d: find(COL_ANSWER_D),
        }
    }
}

/// 从工作簿重建题库
///
/// 已有的数据库文件会被删除后重新创建。
///
/// # 参数
/// - `excel_path`: 来源工作簿
/// - `db_path`: 目标数据库文件
///
/// # 返回
/// 读取的工作表数与写入的题目数
pub fn build_database<P: AsRef<Path>, Q: AsRef<Path>>(
    excel_path: P,
    db_path: Q,
) -> Result<IngestReport, IngestError> {
    let (sheets, questions) = read_source_workbook(excel_path)?;

    let db_path = db_path.as_ref();
    if db_path.exists() {
        info!(path = %db_path.display(), "removing existing database");
        std::fs::remove_file(db_path)?;
    }

    let mut conn = db::init_db(db_path)?;
    let rows = db::insert_questions(&mut conn, &questions)?;

    Ok(IngestReport { sheets, rows })
}

/// 读取工作簿中所有题目
///
/// # 返回
/// (工作表数, 题目列表)，题目按工作表顺序、行顺序排列
pub fn read_source_workbook<P: AsRef<Path>>(
    path: P,
) -> Result<(usize, Vec<NewQuestion>), IngestError> {
    let mut workbook = open_workbook_auto(path.as_ref())?;
    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(IngestError::EmptyWorkbook);
    }

    let mut questions = Vec::new();
    for sheet_name in &sheet_names {
        let range = workbook.worksheet_range(sheet_name)?;
        let before = questions.len();
        questions.extend(read_sheet(sheet_name, &range));
        debug!(sheet = %sheet_name, rows = questions.len() - before, "sheet parsed");
    }

    Ok((sheet_names.len(), questions))
}

fn read_sheet(chapter: &str, range: &Range<Data>) -> Vec<NewQuestion> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        warn!(sheet = %chapter, "empty sheet skipped");
        return Vec::new();
    };

    let columns = ColumnMap::from_header(header);
    if columns.question.is_none() {
        warn!(sheet = %chapter, "no \"{}\" column, values left empty", COL_QUESTION);
    }

    let chapter = normalize_field(Some(chapter));
    rows.map(|row| {
        let cell = |idx: Option<usize>| {
            let raw = idx.and_then(|i| row.get(i)).map(render_cell);
            normalize_field(raw.as_deref())
        };
        NewQuestion {
            chapter: chapter.clone(),
            question_text: cell(columns.question),
            correct_answer: cell(columns.correct_answer),
            answer_b: cell(columns.answer_b),
            answer_c: cell(columns.answer_c),
            answer_d: cell(columns.answer_d),
        }
    })
    .filter(|q| !q.is_blank())
    .collect()
}

/// 单元格转文本
///
/// 时间单元格输出 "H:MM:SS"，这样被误识别为时间的经文引用（如 3:16）
/// 经规范化后能还原。
fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => render_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => render_serial_datetime(dt.as_f64()),
    }
}

fn render_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Excel 序列日期：整数部分为天数（1899-12-30 起），小数部分为当天时间
///
/// 纯时间输出 "H:MM:SS"。带日期时时间为零只输出日期，否则用 12 小时制，
/// 结果不以 ":00" 结尾，规范化不会截断它。
fn render_serial_datetime(serial: f64) -> String {
    let total_seconds = (serial * SECONDS_PER_DAY).round() as i64;
    let days = total_seconds.div_euclid(86_400);
    let seconds = total_seconds.rem_euclid(86_400);

    if days == 0 {
        return format!(
            "{}:{:02}:{:02}",
            seconds / 3600,
            (seconds % 3600) / 60,
            seconds % 60
        );
    }

    let Some(datetime) = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.and_hms_opt(0, 0, 0))
        .and_then(|epoch| epoch.checked_add_signed(Duration::seconds(total_seconds)))
    else {
        return render_float(serial);
    };

    let format = if seconds == 0 {
        "%Y-%m-%d"
    } else if seconds % 60 == 0 {
        "%Y-%m-%d %-I:%M %p"
    } else {
        "%Y-%m-%d %-I:%M:%S %p"
    };
    datetime.format(format).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn test_render_float() {
        assert_eq!(render_float(12.0), "12");
        assert_eq!(render_float(-3.0), "-3");
        assert_eq!(render_float(2.5), "2.5");
    }

    #[test]
    fn test_render_time_of_day() {
        // 3:16 AM
        let serial = (3.0 * 60.0 + 16.0) / 1440.0;
        assert_eq!(render_serial_datetime(serial), "3:16:00");
        assert_eq!(normalize_field(Some(&render_serial_datetime(serial))), "3:16");
    }

    #[test]
    fn test_render_date_time() {
        assert_eq!(render_serial_datetime(45292.0), "2024-01-01");
        assert_eq!(render_serial_datetime(45292.5), "2024-01-01 12:00 PM");
        assert_eq!(render_serial_datetime(45292.520833333336), "2024-01-01 12:30 PM");
        // 09:05:30
        let serial = 45292.0 + (9.0 * 3600.0 + 5.0 * 60.0 + 30.0) / 86_400.0;
        assert_eq!(render_serial_datetime(serial), "2024-01-01 9:05:30 AM");
    }

    #[test]
    fn test_date_cells_survive_normalization() {
        for serial in [45292.0, 45292.5, 45292.520833333336, 45292.25] {
            let rendered = render_serial_datetime(serial);
            assert_eq!(normalize_field(Some(&rendered)), rendered);
        }
    }

    #[test]
    fn test_render_cell_variants() {
        assert_eq!(render_cell(&Data::Empty), "");
        assert_eq!(render_cell(&Data::Int(7)), "7");
        assert_eq!(render_cell(&Data::Bool(true)), "true");
        assert_eq!(render_cell(&text("Moses")), "Moses");
    }

    #[test]
    fn test_column_map_by_header_name() {
        let header = vec![
            text("Answer D"),
            text(" Question "),
            text("Correct Answer"),
            text("Notes"),
        ];
        let map = ColumnMap::from_header(&header);
        assert_eq!(map.question, Some(1));
        assert_eq!(map.correct_answer, Some(2));
        assert_eq!(map.answer_d, Some(0));
        assert_eq!(map.answer_b, None);
    }

    #[test]
    fn test_read_sheet_maps_and_skips_blank_rows() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 2));
        range.set_value((0, 0), text("Question"));
        range.set_value((0, 1), text("Correct Answer"));
        range.set_value((0, 2), text("Answer B"));
        range.set_value((1, 0), text("  Who led Israel out of Egypt? "));
        range.set_value((1, 1), text("Moses"));
        range.set_value((1, 2), text("nan"));
        // 第 2 行全空
        range.set_value((3, 0), text("Where?"));
        range.set_value((3, 1), text("Exodus 3:1:00"));

        let questions = read_sheet("Exodus 3", &range);
        assert_eq!(questions.len(), 2);

        assert_eq!(questions[0].chapter, "Exodus 3");
        assert_eq!(questions[0].question_text, "Who led Israel out of Egypt?");
        assert_eq!(questions[0].correct_answer, "Moses");
        assert_eq!(questions[0].answer_b, "");
        assert_eq!(questions[0].answer_d, "");

        assert_eq!(questions[1].correct_answer, "Exodus 3:1");
    }
}
