// ==========================================
// PF 缴存记录系统 - 数据源解析 Trait
// ==========================================
// 用途: 文件型数据源 → SourceBatch（规范记录形态）
// 实现者: ExcelSourceParser, XmlSourceParser
// 约定: 一次性读取，解析完成即关闭文件，不跨调用保留状态
// ==========================================

use crate::domain::record::{SourceBatch, SourceKind};
use crate::importer::error::ImportResult;
use std::path::Path;

pub trait SourceParser {
    /// 数据源类型
    fn source_kind(&self) -> SourceKind;

    /// 解析文件为规范记录
    ///
    /// # 返回
    /// - Ok(SourceBatch): 按源顺序排列的单位/职工/缴存记录
    /// - Err: 文件不存在、格式错误等（运行级致命错误）
    fn parse(&self, path: &Path) -> ImportResult<SourceBatch>;
}
