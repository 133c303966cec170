// ==========================================
// PF 缴存记录系统 - Excel 数据源解析器
// ==========================================
// 输入: 含三个命名工作表的表格文件
//   "Company Data"  : Registration Number, Company Name, Address[, PF Account Number]
//   "Employee Data" : Company Registration Number, PF Number, Employee Name, Date of Joining
//   "Payment Data"  : PF Number, Month, Employee Contribution, Employer Contribution
// 输出: SourceBatch（保持源行顺序）
// ==========================================

use crate::domain::record::{fields, RawRecord, RecordKind, SourceBatch, SourceKind};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::source_parser::SourceParser;
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

pub const COMPANY_SHEET: &str = "Company Data";
pub const EMPLOYEE_SHEET: &str = "Employee Data";
pub const PAYMENT_SHEET: &str = "Payment Data";

/// 列名 → 规范字段名
const COMPANY_COLUMNS: &[(&str, &str)] = &[
    ("Registration Number", fields::REGISTRATION_NUMBER),
    ("Company Name", fields::COMPANY_NAME),
    ("Address", fields::ADDRESS),
    ("PF Account Number", fields::PF_ACCOUNT_NUMBER),
];

const EMPLOYEE_COLUMNS: &[(&str, &str)] = &[
    ("Company Registration Number", fields::COMPANY_REGISTRATION_NUMBER),
    ("PF Number", fields::PF_NUMBER),
    ("Employee Name", fields::EMPLOYEE_NAME),
    ("Date of Joining", fields::DATE_OF_JOINING),
];

const PAYMENT_COLUMNS: &[(&str, &str)] = &[
    ("PF Number", fields::PF_NUMBER),
    ("Month", fields::MONTH),
    ("Employee Contribution", fields::EMPLOYEE_CONTRIBUTION),
    ("Employer Contribution", fields::EMPLOYER_CONTRIBUTION),
];

const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

// ==========================================
// ExcelSourceParser
// ==========================================
pub struct ExcelSourceParser;

impl SourceParser for ExcelSourceParser {
    fn source_kind(&self) -> SourceKind {
        SourceKind::Excel
    }

    fn parse(&self, path: &Path) -> ImportResult<SourceBatch> {
        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::SourceNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(path)?;

        let mut batch = SourceBatch::new(SourceKind::Excel);
        batch.companies = read_sheet(&mut workbook, COMPANY_SHEET, COMPANY_COLUMNS, RecordKind::Company)?;
        batch.employees =
            read_sheet(&mut workbook, EMPLOYEE_SHEET, EMPLOYEE_COLUMNS, RecordKind::Employee)?;
        batch.payments = read_sheet(&mut workbook, PAYMENT_SHEET, PAYMENT_COLUMNS, RecordKind::Payment)?;

        info!(
            file = %path.display(),
            companies = batch.companies.len(),
            employees = batch.employees.len(),
            payments = batch.payments.len(),
            "Excel 解析完成"
        );

        Ok(batch)
    }
}

/// 读取一个命名工作表（首行为表头），未知列忽略，空白行跳过
fn read_sheet(
    workbook: &mut Sheets<BufReader<File>>,
    sheet_name: &str,
    columns: &[(&str, &str)],
    kind: RecordKind,
) -> ImportResult<Vec<RawRecord>> {
    if !workbook.sheet_names().iter().any(|s| s == sheet_name) {
        return Err(ImportError::SheetNotFound(sheet_name.to_string()));
    }

    let range = workbook.worksheet_range(sheet_name)?;
    let mut rows = range.rows();

    // 空工作表：没有表头也没有数据
    let header_row = match rows.next() {
        Some(row) => row,
        None => return Ok(Vec::new()),
    };

    // 表头列序号 → 规范字段名
    let header_fields: Vec<Option<&str>> = header_row
        .iter()
        .map(|cell| {
            let header = cell_to_string(cell);
            columns
                .iter()
                .find(|(column, _)| column.eq_ignore_ascii_case(&header))
                .map(|(_, field)| *field)
        })
        .collect();

    let mut records = Vec::new();
    for (idx, data_row) in rows.enumerate() {
        // 表头为第 1 行，数据从第 2 行开始
        let mut record = RawRecord::new(SourceKind::Excel, kind, idx + 2);

        for (col_idx, cell) in data_row.iter().enumerate() {
            if let Some(Some(field)) = header_fields.get(col_idx) {
                record.fields.insert(field.to_string(), cell_to_string(cell));
            }
        }

        // 跳过完全空白的行
        if record.fields.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(record);
    }

    debug!(sheet = sheet_name, rows = records.len(), "工作表读取完成");
    Ok(records)
}

/// 单元格 → 文本；日期单元格输出序列号，由字段映射统一解析
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) => dt.as_f64().to_string(),
        other => other.to_string().trim().to_string(),
    }
}
