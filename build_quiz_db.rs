//! 从来源工作簿重建题库
//!
//! 用法: build_quiz_db --excel "2024 NBBC Spreadsheet.xlsx" [--db bible_quiz.db] [--preview 5]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use bible_quiz_lib::config::{DEFAULT_DB_PATH, ENV_DB_PATH};
use bible_quiz_lib::models::SearchFilter;
use bible_quiz_lib::{db, ingest, init_logging};

#[derive(Parser, Debug)]
#[command(about = "Build the Bible quiz SQLite database from a spreadsheet")]
struct Args {
    /// 来源工作簿（每张工作表一个章节）
    #[arg(long)]
    excel: PathBuf,

    /// 目标数据库文件，已存在时会被替换
    #[arg(long, env = ENV_DB_PATH, default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// 完成后在日志中预览的行数
    #[arg(long, default_value_t = 5)]
    preview: usize,
}

fn main() -> anyhow::Result<()> {
    init_logging("info");
    let args = Args::parse();

    let report = ingest::build_database(&args.excel, &args.db)
        .with_context(|| format!("failed to build database from {}", args.excel.display()))?;

    info!(
        "✅ Bible quiz database created at {} with {} rows from {} sheets (cleaned references).",
        args.db.display(),
        report.rows,
        report.sheets
    );

    let conn = db::init_db(&args.db).context("failed to reopen database")?;
    let preview = db::search_questions(&conn, &SearchFilter::default())?;
    for record in preview.iter().take(args.preview) {
        info!(
            id = record.id,
            chapter = %record.chapter,
            question = %record.question_text,
            answer = %record.correct_answer,
            "preview"
        );
    }

    Ok(())
}
