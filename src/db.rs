//! 题库存储层
//!
//! 注意列名交叉：`questions.correct_answer` 存的是题干（来源表 "Question" 列），
//! `questions.question` 存的是正确答案（来源表 "Correct Answer" 列）。
//! 这是导入脚本沿用下来的映射，导出端依赖它还原列标题，不要单独修改任何一侧。

use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params, params_from_iter, Connection, Row};
use thiserror::Error;

use crate::models::{NewQuestion, QuestionRecord, SearchFilter};
use crate::normalize::normalize_field;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("数据库错误: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 单条 `IN (...)` 查询最多绑定的 ID 数，低于 SQLite 的变量上限
const ID_CHUNK_SIZE: usize = 500;

const RECORD_COLUMNS: &str =
    "id, chapter, correct_answer, question, answer_b, answer_c, answer_d";

pub fn init_db<P: AsRef<Path>>(path: P) -> Result<Connection, StorageError> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    Ok(conn)
}

pub fn create_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute("PRAGMA encoding = 'UTF-8'", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chapter TEXT,
            correct_answer TEXT,
            question TEXT,
            answer_b TEXT,
            answer_c TEXT,
            answer_d TEXT
        )",
        [],
    )?;

    Ok(())
}

/// 按 ID 读取题目
///
/// 重复的 ID 只读一次；不存在的 ID 直接忽略，全部不匹配时返回空列表。
///
/// # 参数
/// - `conn`: 数据库连接
/// - `ids`: 用户勾选的题目 ID
///
/// # 返回
/// 按 ID 升序排列的题目记录
pub fn load_records_by_ids(
    conn: &Connection,
    ids: &[i64],
) -> Result<Vec<QuestionRecord>, StorageError> {
    let unique_ids: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    let mut records = Vec::with_capacity(unique_ids.len());

    for chunk in unique_ids.chunks(ID_CHUNK_SIZE) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM questions WHERE id IN ({placeholders}) ORDER BY id"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk.iter()), map_record)?;
        for row in rows {
            records.push(row?);
        }
    }

    Ok(records)
}

/// 搜索题目
///
/// 只有固定的两个可选条件：关键字（匹配题干或答案）与章节（精确匹配）。
/// 用户输入一律作为绑定参数传入。
pub fn search_questions(
    conn: &Connection,
    filter: &SearchFilter,
) -> Result<Vec<QuestionRecord>, StorageError> {
    let mut sql = format!("SELECT {RECORD_COLUMNS} FROM questions WHERE 1=1");
    let mut values: Vec<String> = Vec::new();

    if let Some(keyword) = filter.keyword() {
        values.push(format!("%{}%", escape_like(keyword)));
        let n = values.len();
        sql.push_str(&format!(
            " AND (correct_answer LIKE ?{n} ESCAPE '\\' OR question LIKE ?{n} ESCAPE '\\')"
        ));
    }

    if let Some(chapter) = filter.chapter() {
        values.push(chapter.to_string());
        sql.push_str(&format!(" AND chapter = ?{}", values.len()));
    }

    sql.push_str(" ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), map_record)?;
    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

/// 章节下拉列表，按字典序
pub fn list_chapters(conn: &Connection) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT chapter FROM questions WHERE chapter IS NOT NULL ORDER BY chapter",
    )?;
    let chapters = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(chapters)
}

/// 在一个事务内批量写入题目，返回写入条数
pub fn insert_questions(
    conn: &mut Connection,
    questions: &[NewQuestion],
) -> Result<usize, StorageError> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO questions (chapter, correct_answer, question, answer_b, answer_c, answer_d)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for q in questions {
            // 题干写入 correct_answer 列，正确答案写入 question 列
            stmt.execute(params![
                q.chapter,
                q.question_text,
                q.correct_answer,
                q.answer_b,
                q.answer_c,
                q.answer_d
            ])?;
        }
    }
    tx.commit()?;
    Ok(questions.len())
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<QuestionRecord> {
    Ok(QuestionRecord {
        id: row.get(0)?,
        chapter: text_column(row, 1)?,
        question_text: text_column(row, 2)?,
        correct_answer: text_column(row, 3)?,
        answer_b: text_column(row, 4)?,
        answer_c: text_column(row, 5)?,
        answer_d: text_column(row, 6)?,
    })
}

/// 任何存储类型都按文本读出后再规范化
fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    let raw = match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    };
    Ok(normalize_field(raw.as_deref()))
}

fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for ch in keyword.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
