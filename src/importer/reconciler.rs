// ==========================================
// PF 缴存记录系统 - 对账入库
// ==========================================
// 流程: 单位 → 职工 → 缴存，三趟严格有序（后者按自然键引用前者）
// 策略: Resilient 收集记录级失败并继续；FailFast 遇首个失败即中止
// 红线: 已存在的行只跳过，不做任何字段更新
// ==========================================

use crate::domain::company::NewCompany;
use crate::domain::employee::NewEmployee;
use crate::domain::payment::NewPfPayment;
use crate::domain::record::{RawRecord, SourceBatch};
use crate::domain::report::{ErrorPolicy, ImportStats};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::repository::PfImportRepository;
use tracing::{debug, info, instrument, warn};

/// 单个数据源的对账结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub stats: ImportStats,
    pub messages: Vec<String>,
}

pub struct Reconciler<'a, R: PfImportRepository> {
    repo: &'a R,
    policy: ErrorPolicy,
    mapper: FieldMapper,
}

impl<'a, R: PfImportRepository> Reconciler<'a, R> {
    pub fn new(repo: &'a R, policy: ErrorPolicy) -> Self {
        Self {
            repo,
            policy,
            mapper: FieldMapper,
        }
    }

    /// 对一个数据源执行三趟对账
    #[instrument(skip(self, batch), fields(source = %batch.source, policy = %self.policy))]
    pub fn reconcile(&self, batch: &SourceBatch) -> ImportResult<ReconcileOutcome> {
        let mut outcome = ReconcileOutcome::default();

        for record in &batch.companies {
            let result = self.apply_company(record, &mut outcome.stats);
            self.settle(record, result, &mut outcome)?;
        }
        debug!(
            created = outcome.stats.companies_created,
            existing = outcome.stats.companies_existing,
            "单位处理完成"
        );

        for record in &batch.employees {
            let result = self.apply_employee(record, &mut outcome.stats);
            self.settle(record, result, &mut outcome)?;
        }
        debug!(
            created = outcome.stats.employees_created,
            existing = outcome.stats.employees_existing,
            "职工处理完成"
        );

        for record in &batch.payments {
            let result = self.apply_payment(record, &mut outcome.stats);
            self.settle(record, result, &mut outcome)?;
        }
        debug!(
            created = outcome.stats.payments_created,
            existing = outcome.stats.payments_existing,
            "缴存处理完成"
        );

        info!(
            created = outcome.stats.created_total(),
            failed = outcome.stats.failed_records,
            "数据源对账完成"
        );
        Ok(outcome)
    }

    /// 记录级失败按策略收集或中止；运行级错误直接上抛
    fn settle(
        &self,
        record: &RawRecord,
        result: ImportResult<()>,
        outcome: &mut ReconcileOutcome,
    ) -> ImportResult<()> {
        let err = match result {
            Ok(()) => return Ok(()),
            Err(err) if err.is_record_level() => err,
            Err(err) => return Err(err),
        };

        match self.policy {
            ErrorPolicy::Resilient => {
                let message = format!("{}: {}", record.locator(), err);
                warn!(record = %record.locator(), error = %err, "记录导入失败，已跳过");
                outcome.messages.push(message);
                outcome.stats.failed_records += 1;
                Ok(())
            }
            ErrorPolicy::FailFast => Err(ImportError::RecordFailed {
                record: record.locator(),
                source: Box::new(err),
            }),
        }
    }

    fn apply_company(&self, record: &RawRecord, stats: &mut ImportStats) -> ImportResult<()> {
        let company = self.mapper.map_company(record)?;

        let upserted = self.repo.create_company_if_absent(&NewCompany {
            registration_number: company.registration_number,
            name: company.name,
            address: company.address,
            pf_account_number: company.pf_account_number,
        })?;

        if upserted.was_created() {
            stats.companies_created += 1;
        } else {
            stats.companies_existing += 1;
        }
        Ok(())
    }

    fn apply_employee(&self, record: &RawRecord, stats: &mut ImportStats) -> ImportResult<()> {
        let employee = self.mapper.map_employee(record)?;

        // 单位必须已存在，不做级联创建
        let company = self
            .repo
            .find_company_by_registration_number(&employee.company_registration_number)?
            .ok_or_else(|| ImportError::ReferenceNotFound {
                entity: "单位".to_string(),
                key: employee.company_registration_number.clone(),
                referenced_by: format!("PF 号 {}", employee.pf_number),
            })?;

        let upserted = self.repo.create_employee_if_absent(&NewEmployee {
            company_id: company.id,
            pf_number: employee.pf_number,
            name: employee.name,
            date_of_joining: employee.date_of_joining,
        })?;

        if upserted.was_created() {
            stats.employees_created += 1;
        } else {
            stats.employees_existing += 1;
        }
        Ok(())
    }

    fn apply_payment(&self, record: &RawRecord, stats: &mut ImportStats) -> ImportResult<()> {
        let payment = self.mapper.map_payment(record)?;

        let employee = self
            .repo
            .find_employee_by_pf_number(&payment.pf_number)?
            .ok_or_else(|| ImportError::ReferenceNotFound {
                entity: "职工".to_string(),
                key: payment.pf_number.clone(),
                referenced_by: format!("缴存月份 {}", payment.month.format("%Y-%m")),
            })?;

        let upserted = self.repo.create_payment_if_absent(&NewPfPayment::new(
            employee.id,
            payment.month,
            payment.employee_contribution,
            payment.employer_contribution,
        ))?;

        if upserted.was_created() {
            stats.payments_created += 1;
        } else {
            stats.payments_existing += 1;
        }
        Ok(())
    }
}
