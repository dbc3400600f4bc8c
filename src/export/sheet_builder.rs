use rust_xlsxwriter::{
    ConditionalFormatBlank, ConditionalFormatCell, ConditionalFormatCellRule,
    ConditionalFormatDuplicate, Format, Workbook, XlsxError,
};

/// 自动列宽在最长内容之外额外留出的字符数
pub const COLUMN_PADDING: usize = 2;

/// 单元格值
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
}

impl CellValue {
    /// 渲染后的字符数，用于计算列宽
    fn rendered_len(&self) -> usize {
        match self {
            CellValue::Text(s) => s.chars().count(),
            CellValue::Integer(n) => n.to_string().len(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Integer(value as i64)
    }
}

/// 条件高亮规则，作用于数据区（不含表头）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    None,
    /// 指定列中重复出现的值
    DuplicateValues { column: u16 },
    /// 所有非空数据单元格
    NonBlank,
    /// 指定列中大于阈值的数值
    GreaterThan { column: u16, value: i32 },
}

/// 工作表构建器
///
/// 接收表头、数据行和高亮规则，统一输出冻结表头、自动筛选、自动列宽的工作表。
pub struct SheetBuilder {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    highlight: Highlight,
}

impl SheetBuilder {
    pub fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            highlight: Highlight::None,
        }
    }

    pub fn rows<I>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<CellValue>>,
    {
        self.rows.extend(rows);
        self
    }

    pub fn highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 每列宽度：max(表头长度, 最长值长度) + 2
    pub fn column_widths(&self) -> Vec<f64> {
        self.headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let longest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(CellValue::rendered_len)
                    .max()
                    .unwrap_or(0);
                (longest.max(header.chars().count()) + COLUMN_PADDING) as f64
            })
            .collect()
    }

    /// 在工作簿末尾追加这张工作表
    ///
    /// # 参数
    /// - `workbook`: 目标工作簿
    /// - `header_format`: 表头格式
    /// - `fill`: 高亮格式
    pub fn write_to(
        &self,
        workbook: &mut Workbook,
        header_format: &Format,
        fill: &Format,
    ) -> Result<(), XlsxError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.name)?;

        for (col, header) in self.headers.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, header, header_format)?;
        }

        for (idx, row) in self.rows.iter().enumerate() {
            let row_num = idx as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    CellValue::Text(text) => {
                        sheet.write_string(row_num, col as u16, text)?;
                    }
                    CellValue::Integer(n) => {
                        sheet.write_number(row_num, col as u16, *n as f64)?;
                    }
                }
            }
        }

        let last_col = self.headers.len().saturating_sub(1) as u16;
        let last_row = self.rows.len() as u32;

        sheet.set_freeze_panes(1, 0)?;
        sheet.autofilter(0, 0, last_row, last_col)?;

        if last_row > 0 {
            match self.highlight {
                Highlight::None => {}
                Highlight::DuplicateValues { column } => {
                    let rule = ConditionalFormatDuplicate::new().set_format(fill);
                    sheet.add_conditional_format(1, column, last_row, column, &rule)?;
                }
                Highlight::NonBlank => {
                    let rule = ConditionalFormatBlank::new().invert().set_format(fill);
                    sheet.add_conditional_format(1, 0, last_row, last_col, &rule)?;
                }
                Highlight::GreaterThan { column, value } => {
                    let rule = ConditionalFormatCell::new()
                        .set_rule(ConditionalFormatCellRule::GreaterThan(value))
                        .set_format(fill);
                    sheet.add_conditional_format(1, column, last_row, column, &rule)?;
                }
            }
        }

        for (col, width) in self.column_widths().into_iter().enumerate() {
            sheet.set_column_width(col as u16, width)?;
        }

        Ok(())
    }
}
