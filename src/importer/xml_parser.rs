// ==========================================
// PF 缴存记录系统 - XML 数据源解析器
// ==========================================
// 输入结构:
//   <根>
//     <Company>
//       <RegistrationNumber/> <Name/> <Address/> [<PFAccountNumber/>]
//       <Employee>
//         <PFNumber/> <Name/> <DateOfJoining/>
//         <Payment> <Month/> <EmployeeContribution/> <EmployerContribution/> </Payment>
//       </Employee>
//     </Company>
//   </根>
// 红线: 必需子节点缺失 → MissingXmlNode，整个文档不可恢复
// ==========================================

use crate::domain::record::{fields, RawRecord, RecordKind, SourceBatch, SourceKind};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::source_parser::SourceParser;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;
use tracing::info;

// ==========================================
// XmlElement - 最小元素树
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// 第一个同名直接子节点
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// 全部同名直接子节点（文档顺序）
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn text(&self) -> &str {
        self.text.trim()
    }
}

/// 解析 XML 文本为元素树，返回根元素
pub fn parse_document(xml: &str) -> ImportResult<XmlElement> {
    let mut reader = Reader::from_str(xml);
    // 保留空白：实体引用两侧的空格属于文本内容
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                stack.push(XmlElement::new(name));
            }
            Ok(Event::Empty(ref e)) => {
                let element = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()).to_string());
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| {
                    ImportError::XmlParseError(format!(
                        "多余的结束标签 (位置 {})",
                        reader.buffer_position()
                    ))
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(ref e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&**e));
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&**e));
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                let entity = String::from_utf8_lossy(&**e).to_string();
                let resolved = resolve_entity(&entity).ok_or_else(|| {
                    ImportError::XmlParseError(format!("无法识别的实体引用: &{};", entity))
                })?;
                if let Some(current) = stack.last_mut() {
                    current.text.push(resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ImportError::XmlParseError(format!(
                    "位置 {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ImportError::XmlParseError("文档未正确闭合".to_string()));
    }
    root.ok_or_else(|| ImportError::XmlParseError("文档没有根元素".to_string()))
}

/// 将已闭合元素挂到父节点；无父节点时作为根
fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> ImportResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_some() {
                return Err(ImportError::XmlParseError("文档存在多个根元素".to_string()));
            }
            *root = Some(element);
        }
    }
    Ok(())
}

/// 预定义实体与数字字符引用
fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)
        }
    }
}

// ==========================================
// XmlSourceParser
// ==========================================
pub struct XmlSourceParser;

impl SourceParser for XmlSourceParser {
    fn source_kind(&self) -> SourceKind {
        SourceKind::Xml
    }

    fn parse(&self, path: &Path) -> ImportResult<SourceBatch> {
        if !path.exists() {
            return Err(ImportError::SourceNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let batch = parse_xml_str(&content)?;

        info!(
            file = %path.display(),
            companies = batch.companies.len(),
            employees = batch.employees.len(),
            payments = batch.payments.len(),
            "XML 解析完成"
        );

        Ok(batch)
    }
}

/// 解析 XML 文本为规范记录
///
/// 职工记录继承父 `<Company>` 的注册号，缴存记录继承父 `<Employee>` 的 PF 号。
pub fn parse_xml_str(xml: &str) -> ImportResult<SourceBatch> {
    let root = parse_document(xml)?;
    let mut batch = SourceBatch::new(SourceKind::Xml);

    for (company_idx, company) in root.find_all("Company").enumerate() {
        let company_pos = company_idx + 1;
        let registration_number = required_text(company, "Company", company_pos, "RegistrationNumber")?;

        let mut record = RawRecord::new(SourceKind::Xml, RecordKind::Company, company_pos)
            .with_field(fields::REGISTRATION_NUMBER, registration_number)
            .with_field(
                fields::COMPANY_NAME,
                required_text(company, "Company", company_pos, "Name")?,
            );
        if let Some(address) = company.find("Address") {
            record = record.with_field(fields::ADDRESS, address.text());
        }
        if let Some(account) = company.find("PFAccountNumber") {
            record = record.with_field(fields::PF_ACCOUNT_NUMBER, account.text());
        }
        batch.companies.push(record);

        for employee in company.find_all("Employee") {
            let employee_pos = batch.employees.len() + 1;
            let pf_number = required_text(employee, "Employee", employee_pos, "PFNumber")?;

            batch.employees.push(
                RawRecord::new(SourceKind::Xml, RecordKind::Employee, employee_pos)
                    .with_field(fields::COMPANY_REGISTRATION_NUMBER, registration_number)
                    .with_field(fields::PF_NUMBER, pf_number)
                    .with_field(
                        fields::EMPLOYEE_NAME,
                        required_text(employee, "Employee", employee_pos, "Name")?,
                    )
                    .with_field(
                        fields::DATE_OF_JOINING,
                        required_text(employee, "Employee", employee_pos, "DateOfJoining")?,
                    ),
            );

            for payment in employee.find_all("Payment") {
                let payment_pos = batch.payments.len() + 1;
                batch.payments.push(
                    RawRecord::new(SourceKind::Xml, RecordKind::Payment, payment_pos)
                        .with_field(fields::PF_NUMBER, pf_number)
                        .with_field(
                            fields::MONTH,
                            required_text(payment, "Payment", payment_pos, "Month")?,
                        )
                        .with_field(
                            fields::EMPLOYEE_CONTRIBUTION,
                            required_text(payment, "Payment", payment_pos, "EmployeeContribution")?,
                        )
                        .with_field(
                            fields::EMPLOYER_CONTRIBUTION,
                            required_text(payment, "Payment", payment_pos, "EmployerContribution")?,
                        ),
                );
            }
        }
    }

    Ok(batch)
}

/// 必需子节点的文本；节点缺失为致命错误，节点存在但为空交由字段映射处理
fn required_text<'a>(
    parent: &'a XmlElement,
    parent_name: &str,
    position: usize,
    node: &str,
) -> ImportResult<&'a str> {
    parent
        .find(node)
        .map(XmlElement::text)
        .ok_or_else(|| ImportError::MissingXmlNode {
            parent: parent_name.to_string(),
            position,
            node: node.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<PFDetails>
  <Company>
    <RegistrationNumber>X1</RegistrationNumber>
    <Name>Smith &amp; Sons</Name>
    <Address><![CDATA[12 Main Rd, Pune]]></Address>
    <Employee>
      <PFNumber>XP1</PFNumber>
      <Name>Asha</Name>
      <DateOfJoining>2021-06-01</DateOfJoining>
      <Payment>
        <Month>2024-01-01</Month>
        <EmployeeContribution>1200.50</EmployeeContribution>
        <EmployerContribution>1200.50</EmployerContribution>
      </Payment>
      <Payment>
        <Month>2024-02-01</Month>
        <EmployeeContribution>1200</EmployeeContribution>
        <EmployerContribution>1200</EmployerContribution>
      </Payment>
    </Employee>
  </Company>
  <Company>
    <RegistrationNumber>X2</RegistrationNumber>
    <Name>Beta</Name>
    <Address/>
  </Company>
</PFDetails>"#;

    #[test]
    fn test_parse_hierarchy_into_canonical_records() {
        let batch = parse_xml_str(SAMPLE).unwrap();

        assert_eq!(batch.companies.len(), 2);
        assert_eq!(batch.employees.len(), 1);
        assert_eq!(batch.payments.len(), 2);

        assert_eq!(batch.companies[0].get(fields::COMPANY_NAME), Some("Smith & Sons"));
        assert_eq!(batch.companies[0].get(fields::ADDRESS), Some("12 Main Rd, Pune"));
        assert_eq!(batch.companies[1].get(fields::ADDRESS), None);

        // 继承父节点的自然键
        assert_eq!(
            batch.employees[0].get(fields::COMPANY_REGISTRATION_NUMBER),
            Some("X1")
        );
        assert_eq!(batch.payments[1].get(fields::PF_NUMBER), Some("XP1"));
        assert_eq!(batch.payments[1].position, 2);
    }

    #[test]
    fn test_missing_child_node_is_fatal() {
        let xml = r#"<Root><Company><RegistrationNumber>X1</RegistrationNumber></Company></Root>"#;
        let err = parse_xml_str(xml).unwrap_err();
        assert!(matches!(
            err,
            ImportError::MissingXmlNode { ref node, position: 1, .. } if node == "Name"
        ));
        assert!(!err.is_record_level());
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            parse_xml_str("<Root><Company></Root>"),
            Err(ImportError::XmlParseError(_))
        ));
    }

    #[test]
    fn test_escaped_entity_text_is_unescaped_once() {
        let root = parse_document("<A>Tom &amp; Co &amp;lt;x&amp;gt;</A>").unwrap();
        assert_eq!(root.text(), "Tom & Co &lt;x&gt;");
    }

    #[test]
    fn test_numeric_character_reference() {
        let root = parse_document("<A>caf&#233; &#x41;</A>").unwrap();
        assert_eq!(root.text(), "café A");
    }
}
