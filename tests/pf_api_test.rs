// ==========================================
// ImportApi / PfQueryApi 集成测试
// ==========================================
// 测试目标: AppState 装配、演示数据、JSON 载荷、查询视图、级联删除
// ==========================================

mod test_helpers;

use pf_tracker::api::ApiError;
use pf_tracker::domain::ErrorPolicy;
use pf_tracker::importer::ImportError;
use pf_tracker::logging;
use pf_tracker::repository::CompanyRepository;
use rust_decimal::Decimal;
use test_helpers::{create_test_env, scenario_one_workbook, write_xml};

const PAYLOAD: &str = r#"[
  {
    "registration_number": "J1",
    "name": "Json Traders",
    "address": "4 Market St",
    "pf_account_number": "PFACC-J1",
    "employees": [
      {
        "pf_number": "JP1",
        "name": "Meera",
        "date_of_joining": "2023-04-01",
        "payments": [
          {"month": "2024-03-01", "employee_contribution": "1200.40", "employer_contribution": "1200.35"},
          {"month": "2024-04-01", "employee_contribution": "1200.40", "employer_contribution": "1200.35"}
        ]
      },
      {
        "pf_number": "JP2",
        "name": "Arjun",
        "date_of_joining": "2023-05-15"
      }
    ]
  }
]"#;

#[test]
fn test_run_import_with_configured_sources() {
    logging::init_test();
    let env = create_test_env().unwrap();
    scenario_one_workbook()
        .write(&env.path("pf_sample.xlsx"))
        .unwrap();
    let state = env.app_state();

    let report = state.import_api.run_import().unwrap();

    assert!(report.overall_success);
    assert_eq!(report.sources_skipped.len(), 1, "XML 文件不存在，应跳过");
    assert_eq!(report.summary_line(), "已成功从 Excel 获取并保存 PF 数据");
    assert_eq!(state.query_api.list_companies().unwrap().len(), 1);
}

#[test]
fn test_seed_sample_is_idempotent() {
    logging::init_test();
    let env = create_test_env().unwrap();
    let state = env.app_state();

    let first = state.import_api.seed_sample().unwrap();
    assert_eq!(first.stats.created_total(), 3);

    let second = state.import_api.seed_sample().unwrap();
    assert_eq!(second.stats.created_total(), 0);

    let companies = state.query_api.list_companies().unwrap();
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].name, "Tech Innovations Pvt Ltd");
    assert_eq!(companies[0].address.as_deref(), Some("123 Tech Park, Bangalore"));

    let detail = state.query_api.employee_detail_by_pf_number("PF98765").unwrap();
    assert_eq!(detail.employee.name, "John Doe");
    assert_eq!(detail.payments.len(), 1);
    assert_eq!(detail.payments[0].total_contribution, Decimal::from(3000));
}

#[test]
fn test_import_json_payload() {
    logging::init_test();
    let env = create_test_env().unwrap();
    let state = env.app_state();

    let report = state.import_api.import_json_payload(PAYLOAD).unwrap();
    assert!(report.overall_success);
    assert_eq!(report.stats.companies_created, 1);
    assert_eq!(report.stats.employees_created, 2);
    assert_eq!(report.stats.payments_created, 2);

    let company = state
        .query_api
        .company_detail_by_registration_number("J1")
        .unwrap();
    assert_eq!(company.company.pf_account_number.as_deref(), Some("PFACC-J1"));
    // 按姓名排序
    let names: Vec<&str> = company.employees.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Arjun", "Meera"]);

    let meera = state.query_api.employee_detail_by_pf_number("JP1").unwrap();
    for payment in &meera.payments {
        assert_eq!(payment.total_contribution, Decimal::new(240075, 2));
        assert!(payment.is_consistent());
    }
}

#[test]
fn test_import_json_file_and_bad_payload() {
    logging::init_test();
    let env = create_test_env().unwrap();
    let state = env.app_state();

    let payload_path = env.path("payload.json");
    std::fs::write(&payload_path, PAYLOAD).unwrap();
    let report = state.import_api.import_json_file(&payload_path).unwrap();
    assert_eq!(report.stats.created_total(), 5);

    let err = state.import_api.import_json_payload("[{\"name\": 1}]").unwrap_err();
    assert!(matches!(
        err,
        ApiError::ImportError(ImportError::PayloadParseError(_))
    ));

    let err = state
        .import_api
        .import_json_file(&env.path("missing.json"))
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::ImportError(ImportError::SourceNotFound(_))
    ));
}

#[test]
fn test_query_by_id_and_not_found() {
    logging::init_test();
    let env = create_test_env().unwrap();
    let state = env.app_state();
    state.import_api.seed_sample().unwrap();

    let company = state.query_api.list_companies().unwrap().remove(0);
    let detail = state.query_api.company_detail(company.id).unwrap();
    assert_eq!(detail.employees.len(), 1);

    let employee_id = detail.employees[0].id;
    let employee = state.query_api.employee_detail(employee_id).unwrap();
    assert_eq!(employee.employee.company_id, company.id);
    assert_eq!(employee.payments[0].employee_id, employee_id);

    assert!(matches!(
        state.query_api.company_detail(9999),
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        state.query_api.employee_detail(9999),
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        state.query_api.employee_detail_by_pf_number("NOPE"),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_company_delete_cascades() {
    logging::init_test();
    let env = create_test_env().unwrap();
    let state = env.app_state();
    state.import_api.seed_sample().unwrap();
    state.import_api.import_json_payload(PAYLOAD).unwrap();
    assert_eq!(env.count_rows("employee"), 3);
    assert_eq!(env.count_rows("pf_payment"), 3);

    let company_repo = CompanyRepository::new(&env.db_path).unwrap();
    assert!(company_repo.delete_by_registration_number("J1").unwrap());
    assert!(!company_repo.delete_by_registration_number("J1").unwrap());

    assert_eq!(env.count_rows("company"), 1);
    assert_eq!(env.count_rows("employee"), 1);
    assert_eq!(env.count_rows("pf_payment"), 1);
}

#[test]
fn test_fail_fast_policy_from_config() {
    logging::init_test();
    let env = create_test_env().unwrap();
    write_xml(
        &env.path("pf_details.xml"),
        r#"<PFDetails>
             <Company>
               <RegistrationNumber>C1</RegistrationNumber>
               <Name>Acme</Name>
               <Employee>
                 <PFNumber>P1</PFNumber>
                 <Name>Priya</Name>
                 <DateOfJoining>15th Jan</DateOfJoining>
               </Employee>
             </Company>
           </PFDetails>"#,
    )
    .unwrap();

    let state = pf_tracker::app::AppState::new(env.config().with_policy(ErrorPolicy::FailFast))
        .unwrap();
    let err = state.import_api.run_import().unwrap_err();
    assert!(matches!(
        err,
        ApiError::ImportError(ImportError::RecordFailed { .. })
    ));

    // 同一数据弹性模式下收集失败
    let state = env.app_state();
    let report = state.import_api.run_import().unwrap();
    assert!(!report.overall_success);
    assert_eq!(report.messages.len(), 1);
    assert!(report.messages[0].contains("date_of_joining"));
}

#[test]
fn test_recent_runs() {
    logging::init_test();
    let env = create_test_env().unwrap();
    let state = env.app_state();

    state.import_api.seed_sample().unwrap();
    let last = state.import_api.import_json_payload(PAYLOAD).unwrap();

    let runs = state.import_api.recent_runs(10).unwrap();
    assert_eq!(runs.len(), 2);
    assert!(runs.iter().all(|r| r.sources_processed == vec!["Literal".to_string()]));

    let found = state.import_api.find_run(&last.run_id).unwrap();
    assert_eq!(found.stats.created_total(), 5);
    assert_eq!(found.elapsed_ms, last.elapsed_ms);

    assert_eq!(state.import_api.recent_runs(1).unwrap().len(), 1);
    assert!(matches!(
        state.import_api.recent_runs(0),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        state.import_api.find_run("missing"),
        Err(ApiError::NotFound(_))
    ));
}
