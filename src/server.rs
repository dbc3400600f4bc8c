use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use rusqlite::Connection;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::db::{self, StorageError};
use crate::export::{self, ExportError, EXPORT_FILENAME, EXPORT_MIME};
use crate::models::{QuestionRecord, SearchFilter};
use crate::page::{render_search_page, SearchPage};

/// 未勾选任何题目时返回给用户的提示
pub const NO_SELECTION_MESSAGE: &str = "⚠️ No questions selected.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("导出任务异常: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("数据库锁已失效")]
    LockPoisoned,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Export(ExportError::NoSelection) => {
                (StatusCode::OK, NO_SELECTION_MESSAGE).into_response()
            }
            AppError::Export(err) => {
                error!("export failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Export failed.").into_response()
            }
            other => {
                error!("request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error.").into_response()
            }
        }
    }
}

/// 共享的数据库连接
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    pub fn open(config: &AppConfig) -> Result<Self, StorageError> {
        let conn = db::init_db(&config.db_path)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.conn.lock().map_err(|_| AppError::LockPoisoned)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
}

/// 导出表单：可重复的 `selected_ids` 与复选框 `remove_duplicates`
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportForm {
    pub selected_ids: Vec<i64>,
    pub remove_duplicates: bool,
}

impl ExportForm {
    /// 解析 urlencoded 表单，无法解析为整数的 ID 被忽略
    pub fn parse(body: &[u8]) -> Self {
        let mut form = ExportForm::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "selected_ids" => match value.trim().parse::<i64>() {
                    Ok(id) => form.selected_ids.push(id),
                    Err(_) => warn!(value = %value, "ignoring malformed selected id"),
                },
                "remove_duplicates" => form.remove_duplicates = value == "on",
                _ => {}
            }
        }
        form
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/export", post(export_selected))
        .route("/api/search", get(api_search))
        .route("/health", get(health))
        .with_state(state)
}

/// 启动 HTTP 服务，直到进程退出
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let db = Db::open(&config)?;
    let addr = config.bind_addr;
    let state = AppState { db };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("bible quiz search listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index(
    State(state): State<AppState>,
    Query(filter): Query<SearchFilter>,
) -> Result<Html<String>, AppError> {
    let (chapters, results) = {
        let conn = state.db.lock()?;
        let chapters = db::list_chapters(&conn)?;
        let results = db::search_questions(&conn, &filter)?;
        (chapters, results)
    };

    Ok(Html(render_search_page(&SearchPage {
        query: filter.keyword().unwrap_or(""),
        chapters: &chapters,
        selected_chapter: filter.chapter().unwrap_or(""),
        results: &results,
    })))
}

async fn export_selected(
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> Result<Response, AppError> {
    let form = ExportForm::parse(&body);
    info!(
        selected = form.selected_ids.len(),
        remove_duplicates = form.remove_duplicates,
        "export requested"
    );

    // 只在读取题目时持有连接锁
    let records = {
        let conn = state.db.lock()?;
        export::load_selection(&conn, &form.selected_ids)?
    };

    let timestamp = Local::now().naive_local();
    let remove_duplicates = form.remove_duplicates;
    let bytes = tokio::task::spawn_blocking(move || {
        export::render_export(records, remove_duplicates, timestamp)
    })
    .await??;

    Ok((
        [
            (header::CONTENT_TYPE, EXPORT_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        bytes,
    )
        .into_response())
}

async fn api_search(
    State(state): State<AppState>,
    Query(filter): Query<SearchFilter>,
) -> Result<Json<Vec<QuestionRecord>>, AppError> {
    let conn = state.db.lock()?;
    Ok(Json(db::search_questions(&conn, &filter)?))
}

async fn health() -> &'static str {
    "ok"
}
