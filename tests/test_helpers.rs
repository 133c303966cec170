// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、Excel/XML 测试文件生成、行数统计
// ==========================================

#![allow(dead_code)]

use pf_tracker::app::AppState;
use pf_tracker::config::AppConfig;
use rusqlite::Connection;
use rust_xlsxwriter::Workbook;
use std::error::Error;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 测试工作目录：数据库与数据源文件都放在同一临时目录下
pub struct TestEnv {
    pub dir: TempDir,
    pub db_path: String,
}

impl TestEnv {
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// 基于本目录的配置（数据源默认指向不存在的文件）
    pub fn config(&self) -> AppConfig {
        AppConfig::default()
            .with_db_path(self.db_path.clone())
            .with_excel_path(self.path("pf_sample.xlsx"))
            .with_xml_path(self.path("pf_details.xml"))
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(self.config()).expect("Failed to create AppState")
    }

    pub fn count_rows(&self, table: &str) -> i64 {
        count_rows(&self.db_path, table)
    }
}

/// 创建临时测试目录与数据库路径（数据库由 AppState / 仓储首次打开时建表）
pub fn create_test_env() -> Result<TestEnv, Box<dyn Error>> {
    let dir = TempDir::new()?;
    let db_path = dir
        .path()
        .join("pf_test.db")
        .to_str()
        .ok_or("临时路径不是合法 UTF-8")?
        .to_string();
    Ok(TestEnv { dir, db_path })
}

pub fn count_rows(db_path: &str, table: &str) -> i64 {
    let conn = Connection::open(db_path).expect("Failed to open db");
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .expect("Failed to count rows")
}

// ==========================================
// Excel 测试文件
// ==========================================

#[derive(Debug, Clone)]
pub enum Cell {
    Text(&'static str),
    Number(f64),
    Empty,
}

pub const COMPANY_HEADERS: &[&str] = &["Registration Number", "Company Name", "Address"];
pub const EMPLOYEE_HEADERS: &[&str] = &[
    "Company Registration Number",
    "PF Number",
    "Employee Name",
    "Date of Joining",
];
pub const PAYMENT_HEADERS: &[&str] = &[
    "PF Number",
    "Month",
    "Employee Contribution",
    "Employer Contribution",
];

/// PF 工作簿的三张工作表内容（不含表头）
#[derive(Debug, Clone, Default)]
pub struct PfWorkbook {
    pub companies: Vec<Vec<Cell>>,
    pub employees: Vec<Vec<Cell>>,
    pub payments: Vec<Vec<Cell>>,
}

impl PfWorkbook {
    pub fn company(mut self, reg: &'static str, name: &'static str, address: &'static str) -> Self {
        self.companies
            .push(vec![Cell::Text(reg), Cell::Text(name), Cell::Text(address)]);
        self
    }

    pub fn employee(
        mut self,
        company_reg: &'static str,
        pf: &'static str,
        name: &'static str,
        date_of_joining: Cell,
    ) -> Self {
        self.employees.push(vec![
            Cell::Text(company_reg),
            Cell::Text(pf),
            Cell::Text(name),
            date_of_joining,
        ]);
        self
    }

    pub fn payment(mut self, pf: &'static str, month: Cell, employee: f64, employer: f64) -> Self {
        self.payments.push(vec![
            Cell::Text(pf),
            month,
            Cell::Number(employee),
            Cell::Number(employer),
        ]);
        self
    }

    pub fn raw_payment(mut self, row: Vec<Cell>) -> Self {
        self.payments.push(row);
        self
    }

    pub fn write(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let mut workbook = Workbook::new();
        write_sheet(&mut workbook, "Company Data", COMPANY_HEADERS, &self.companies)?;
        write_sheet(&mut workbook, "Employee Data", EMPLOYEE_HEADERS, &self.employees)?;
        write_sheet(&mut workbook, "Payment Data", PAYMENT_HEADERS, &self.payments)?;
        workbook.save(path)?;
        Ok(())
    }
}

fn write_sheet(
    workbook: &mut Workbook,
    name: &str,
    headers: &[&str],
    rows: &[Vec<Cell>],
) -> Result<(), Box<dyn Error>> {
    let worksheet = workbook.add_worksheet().set_name(name)?;

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }
    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string(row_num, col as u16, *text)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row_num, col as u16, *value)?;
                }
                Cell::Empty => {}
            }
        }
    }
    Ok(())
}

/// 单条记录场景：C1 / Acme / P1 / 2020-01-15 / 2024-01 1500 + 1500
pub fn scenario_one_workbook() -> PfWorkbook {
    PfWorkbook::default()
        .company("C1", "Acme", "1 Industrial Estate")
        .employee("C1", "P1", "Priya", Cell::Text("2020-01-15"))
        .payment("P1", Cell::Text("2024-01-01"), 1500.0, 1500.0)
}

// ==========================================
// XML 测试文件
// ==========================================

pub fn write_xml(path: &Path, content: &str) -> Result<(), Box<dyn Error>> {
    std::fs::write(path, content)?;
    Ok(())
}
