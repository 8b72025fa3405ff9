//! Minimal BPMN 2.0 reader: pulls the `<process>` declarations out of a
//! model so the repository can register definitions for them.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BpmnProcess {
    pub id: String,
    pub name: Option<String>,
    pub executable: bool,
    pub documentation: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BpmnParseError {
    #[error("model is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("document has no <definitions> root element")]
    MissingDefinitions,
    #[error("<process> element #{0} has no id attribute")]
    MissingProcessId(usize),
    #[error("<process> element '{0}' is never closed")]
    Unclosed(String),
}

/// Processes in document order. Namespace prefixes are ignored.
pub fn parse_processes(bytes: &[u8]) -> Result<Vec<BpmnProcess>, BpmnParseError> {
    let text = std::str::from_utf8(bytes)?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut processes = Vec::new();
    let mut seen_root = false;
    let mut current: Option<BpmnProcess> = None;
    // depth below the open <process>, 0 meaning the process element itself
    let mut depth = 0usize;
    let mut documentation: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                check_root(&mut seen_root, &element)?;
                let local = element.local_name();
                if let Some(process) = current.as_ref() {
                    depth += 1;
                    if depth == 1
                        && local.as_ref() == b"documentation"
                        && process.documentation.is_none()
                    {
                        documentation = Some(String::new());
                    }
                } else if local.as_ref() == b"process" {
                    current = Some(process_from(&element, processes.len())?);
                    depth = 0;
                }
            }
            Event::Empty(element) => {
                check_root(&mut seen_root, &element)?;
                if current.is_none() && element.local_name().as_ref() == b"process" {
                    processes.push(process_from(&element, processes.len())?);
                }
            }
            Event::Text(text) => {
                if let Some(buffer) = documentation.as_mut() {
                    buffer.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(buffer) = documentation.as_mut() {
                    buffer.push_str(std::str::from_utf8(&data)?);
                }
            }
            Event::End(element) => {
                if current.is_none() {
                    continue;
                }
                if depth == 0 {
                    if let Some(process) = current.take() {
                        processes.push(process);
                    }
                    continue;
                }
                if depth == 1 && element.local_name().as_ref() == b"documentation" {
                    if let (Some(process), Some(text)) = (current.as_mut(), documentation.take()) {
                        let text = text.trim();
                        if !text.is_empty() {
                            process.documentation = Some(text.to_string());
                        }
                    }
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(process) = current {
        return Err(BpmnParseError::Unclosed(process.id));
    }
    if !seen_root {
        return Err(BpmnParseError::MissingDefinitions);
    }

    Ok(processes)
}

fn check_root(seen_root: &mut bool, element: &BytesStart<'_>) -> Result<(), BpmnParseError> {
    if *seen_root {
        return Ok(());
    }
    if element.local_name().as_ref() != b"definitions" {
        return Err(BpmnParseError::MissingDefinitions);
    }
    *seen_root = true;
    Ok(())
}

fn process_from(element: &BytesStart<'_>, index: usize) -> Result<BpmnProcess, BpmnParseError> {
    let mut id = None;
    let mut name = None;
    let mut executable = true;

    for attribute in element.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let value = attribute.unescape_value()?.trim().to_string();
        match attribute.key.local_name().as_ref() {
            b"id" => id = Some(value),
            b"name" => name = Some(value).filter(|value| !value.is_empty()),
            b"isExecutable" => executable = !value.eq_ignore_ascii_case("false"),
            _ => {}
        }
    }

    let id = id
        .filter(|value| !value.is_empty())
        .ok_or(BpmnParseError::MissingProcessId(index + 1))?;

    Ok(BpmnProcess {
        id,
        name,
        executable,
        documentation: None,
    })
}
