// ==========================================
// PF 缴存记录系统 - 命令行入口
// ==========================================
// 子命令: import / seed-sample / import-json / companies / employees / payments / runs
// 退出码: 0 成功；1 致命错误；2 导入完成但存在失败记录
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pf_tracker::app::AppState;
use pf_tracker::config::{env_keys, AppConfig};
use pf_tracker::domain::{ErrorPolicy, ImportReport};
use pf_tracker::importer::ImportSources;
use pf_tracker::logging;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pf-tracker")]
#[command(about = "PF 缴存记录系统：Excel/XML 导入与查询")]
#[command(version)]
struct Cli {
    /// 数据库文件路径
    #[arg(long, global = true, env = env_keys::DB_PATH)]
    db_path: Option<String>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 从 Excel 与 XML 导入 PF 数据（不存在的数据源跳过）
    Import {
        /// Excel 文件路径
        #[arg(long, env = env_keys::EXCEL_PATH)]
        excel_path: Option<PathBuf>,

        /// XML 文件路径
        #[arg(long, env = env_keys::XML_PATH)]
        xml_path: Option<PathBuf>,

        /// 首个失败记录即中止
        #[arg(long)]
        fail_fast: bool,

        /// 以 JSON 输出导入报告
        #[arg(long)]
        json: bool,
    },

    /// 写入演示数据（模拟 API 数据）
    SeedSample {
        #[arg(long)]
        json: bool,
    },

    /// 从 JSON 载荷文件导入
    ImportJson {
        file: PathBuf,

        #[arg(long)]
        fail_fast: bool,

        #[arg(long)]
        json: bool,
    },

    /// 列出全部单位
    Companies {
        #[arg(long)]
        json: bool,
    },

    /// 列出单位下的职工
    Employees {
        registration_number: String,

        #[arg(long)]
        json: bool,
    },

    /// 列出职工的月度缴存
    Payments {
        pf_number: String,

        #[arg(long)]
        json: bool,
    },

    /// 最近的导入运行
    Runs {
        #[arg(long, default_value_t = 10)]
        limit: u32,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "命令执行失败");
            eprintln!("错误: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = AppConfig::from_env();
    if let Some(db_path) = cli.db_path {
        config = config.with_db_path(db_path);
    }

    match cli.command {
        Commands::Import {
            excel_path,
            xml_path,
            fail_fast,
            json,
        } => {
            if let Some(path) = excel_path {
                config = config.with_excel_path(path);
            }
            if let Some(path) = xml_path {
                config = config.with_xml_path(path);
            }
            let policy = policy_for(fail_fast);
            let state = AppState::new(config.with_policy(policy))?;
            let sources: ImportSources = state.config.sources();
            let report = state
                .import_api
                .run_import_with(&sources, policy)
                .context("导入中止")?;
            print_report(&report, json)
        }

        Commands::SeedSample { json } => {
            let state = AppState::new(config)?;
            let report = state.import_api.seed_sample().context("写入演示数据失败")?;
            print_report(&report, json)
        }

        Commands::ImportJson {
            file,
            fail_fast,
            json,
        } => {
            let state = AppState::new(config.with_policy(policy_for(fail_fast)))?;
            let report = state
                .import_api
                .import_json_file(&file)
                .with_context(|| format!("导入 {} 失败", file.display()))?;
            print_report(&report, json)
        }

        Commands::Companies { json } => {
            let state = AppState::new(config)?;
            let companies = state.query_api.list_companies()?;
            if json {
                print_json(&companies)?;
            } else {
                for company in &companies {
                    println!(
                        "{}\t{}\t{}",
                        company.registration_number,
                        company.name,
                        company.address.as_deref().unwrap_or("-")
                    );
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Employees {
            registration_number,
            json,
        } => {
            let state = AppState::new(config)?;
            let detail = state
                .query_api
                .company_detail_by_registration_number(&registration_number)?;
            if json {
                print_json(&detail)?;
            } else {
                println!("{}", detail.company);
                for employee in &detail.employees {
                    println!(
                        "{}\t{}\t{}",
                        employee.pf_number, employee.name, employee.date_of_joining
                    );
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Payments { pf_number, json } => {
            let state = AppState::new(config)?;
            let detail = state.query_api.employee_detail_by_pf_number(&pf_number)?;
            if json {
                print_json(&detail)?;
            } else {
                println!("{}", detail.employee);
                for payment in &detail.payments {
                    println!(
                        "{}\t{}\t{}\t{}",
                        payment.month.format("%Y-%m"),
                        payment.employee_contribution,
                        payment.employer_contribution,
                        payment.total_contribution
                    );
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Runs { limit, json } => {
            let state = AppState::new(config)?;
            let runs = state.import_api.recent_runs(limit)?;
            if json {
                print_json(&runs)?;
            } else {
                for run in &runs {
                    println!(
                        "{}\t{}\t{}\t{}\t新增 {}\t失败 {}",
                        run.finished_at.format("%Y-%m-%d %H:%M:%S"),
                        run.run_id,
                        run.policy,
                        run.sources_processed.join("+"),
                        run.stats.created_total(),
                        run.stats.failed_records
                    );
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn policy_for(fail_fast: bool) -> ErrorPolicy {
    if fail_fast {
        ErrorPolicy::FailFast
    } else {
        ErrorPolicy::Resilient
    }
}

fn print_report(report: &ImportReport, json: bool) -> Result<ExitCode> {
    if json {
        print_json(report)?;
    } else {
        println!("{}", report.summary_line());
        for skipped in &report.sources_skipped {
            println!("  跳过（不存在）: {}", skipped);
        }
        for message in &report.messages {
            println!("  - {}", message);
        }
    }

    Ok(if report.overall_success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
