// ==========================================
// PF 缴存记录系统 - 导入层
// ==========================================
// 职责: 外部数据导入，按自然键对账入库
// 支持: Excel, XML, 字面量 / JSON 载荷
// ==========================================

pub mod error;
pub mod excel_parser;
pub mod field_mapper;
pub mod literal_source;
pub mod pf_importer;
pub mod reconciler;
pub mod source_parser;
pub mod xml_parser;

pub use error::{ImportError, ImportResult};
pub use excel_parser::ExcelSourceParser;
pub use field_mapper::FieldMapper;
pub use literal_source::{LiteralCompany, LiteralEmployee, LiteralPayment, LiteralSource};
pub use pf_importer::{ImportSources, PfImporter};
pub use reconciler::{ReconcileOutcome, Reconciler};
pub use source_parser::SourceParser;
pub use xml_parser::XmlSourceParser;
