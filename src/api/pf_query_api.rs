// ==========================================
// PF 缴存记录系统 - 查询 API
// ==========================================
// 职责: 单位列表 / 单位详情（含职工）/ 职工详情（含缴存）
// 说明: 只读直通，无分页与筛选
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{Company, Employee, PfPayment};
use crate::repository::{CompanyRepository, EmployeeRepository, PfPaymentRepository};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    pub company: Company,
    pub employees: Vec<Employee>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeDetail {
    pub employee: Employee,
    pub payments: Vec<PfPayment>,
}

pub struct PfQueryApi {
    company_repo: CompanyRepository,
    employee_repo: EmployeeRepository,
    payment_repo: PfPaymentRepository,
}

impl PfQueryApi {
    pub fn new(
        company_repo: CompanyRepository,
        employee_repo: EmployeeRepository,
        payment_repo: PfPaymentRepository,
    ) -> Self {
        Self {
            company_repo,
            employee_repo,
            payment_repo,
        }
    }

    pub fn list_companies(&self) -> ApiResult<Vec<Company>> {
        Ok(self.company_repo.list_all()?)
    }

    pub fn company_detail(&self, company_id: i64) -> ApiResult<CompanyDetail> {
        let company = self
            .company_repo
            .find_by_id(company_id)?
            .ok_or_else(|| ApiError::NotFound(format!("单位(id={})不存在", company_id)))?;
        self.with_employees(company)
    }

    pub fn company_detail_by_registration_number(
        &self,
        registration_number: &str,
    ) -> ApiResult<CompanyDetail> {
        let company = self
            .company_repo
            .find_by_registration_number(registration_number)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("单位(注册号={})不存在", registration_number))
            })?;
        self.with_employees(company)
    }

    pub fn employee_detail(&self, employee_id: i64) -> ApiResult<EmployeeDetail> {
        let employee = self
            .employee_repo
            .find_by_id(employee_id)?
            .ok_or_else(|| ApiError::NotFound(format!("职工(id={})不存在", employee_id)))?;
        self.with_payments(employee)
    }

    pub fn employee_detail_by_pf_number(&self, pf_number: &str) -> ApiResult<EmployeeDetail> {
        let employee = self
            .employee_repo
            .find_by_pf_number(pf_number)?
            .ok_or_else(|| ApiError::NotFound(format!("职工(PF 号={})不存在", pf_number)))?;
        self.with_payments(employee)
    }

    fn with_employees(&self, company: Company) -> ApiResult<CompanyDetail> {
        let employees = self.employee_repo.list_by_company(company.id)?;
        Ok(CompanyDetail { company, employees })
    }

    fn with_payments(&self, employee: Employee) -> ApiResult<EmployeeDetail> {
        let payments = self.payment_repo.list_by_employee(employee.id)?;
        Ok(EmployeeDetail { employee, payments })
    }
}
