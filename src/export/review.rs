use std::collections::{BTreeMap, BTreeSet};

use super::types::ReviewRow;
use crate::models::QuestionRecord;

/// 构建重复审阅汇总
///
/// 按题干分组，统计出现次数和去重排序后的章节，只保留出现多次的题干，
/// 结果按题干升序。调用方应传入去重之前的完整记录。
pub fn aggregate_review<'a, I>(records: I) -> Vec<ReviewRow>
where
    I: IntoIterator<Item = &'a QuestionRecord>,
{
    let mut groups: BTreeMap<&'a str, (usize, BTreeSet<&'a str>)> = BTreeMap::new();

    for record in records {
        let entry = groups
            .entry(record.question_text.as_str())
            .or_insert_with(|| (0, BTreeSet::new()));
        entry.0 += 1;
        entry.1.insert(record.chapter.as_str());
    }

    groups
        .into_iter()
        .filter(|(_, (count, _))| *count > 1)
        .map(|(question, (count, chapters))| ReviewRow {
            question_text: question.to_string(),
            count,
            chapters: chapters.into_iter().map(str::to_string).collect(),
        })
        .collect()
}
