use std::collections::{HashMap, HashSet};

use super::types::ClassifiedRecord;
use crate::models::QuestionRecord;

/// 分类结果
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// 全部记录：非重复在前、重复在后，其次按题干升序，再按输入顺序
    pub all: Vec<ClassifiedRecord>,
    /// `all` 中的重复记录，保持相同的相对顺序
    pub duplicates: Vec<ClassifiedRecord>,
}

/// 按题干（区分大小写的完全相等）标记重复并排序
///
/// # 参数
/// - `records`: 用户选中的记录，顺序无意义
///
/// # 返回
/// 与输入同一组记录的重排结果，以及其中的重复子序列
pub fn classify(records: Vec<QuestionRecord>) -> Classification {
    let flags: Vec<bool> = {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &records {
            *counts.entry(record.question_text.as_str()).or_insert(0) += 1;
        }
        records
            .iter()
            .map(|record| counts[record.question_text.as_str()] > 1)
            .collect()
    };

    let mut all: Vec<ClassifiedRecord> = records
        .into_iter()
        .zip(flags)
        .map(|(record, is_duplicate)| ClassifiedRecord {
            record,
            is_duplicate,
        })
        .collect();

    // sort_by 是稳定排序，同题干保持输入顺序
    all.sort_by(|a, b| {
        a.is_duplicate
            .cmp(&b.is_duplicate)
            .then_with(|| a.record.question_text.cmp(&b.record.question_text))
    });

    let duplicates = all.iter().filter(|r| r.is_duplicate).cloned().collect();

    Classification { all, duplicates }
}

/// 每个题干只保留排序后的第一条
pub fn remove_duplicates(records: Vec<ClassifiedRecord>) -> Vec<ClassifiedRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.record.question_text.clone()))
        .collect()
}

/// 不同题干的数量
pub fn distinct_question_count(records: &[ClassifiedRecord]) -> usize {
    records
        .iter()
        .map(|r| r.record.question_text.as_str())
        .collect::<HashSet<_>>()
        .len()
}
