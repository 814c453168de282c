//! Parameter-file parsing (spec §6.6). Sections are grouped under a
//! `[NAME]` header; a `CLASS = ...` key names the scoring term or transform
//! class the section configures, everything else is a numeric parameter.
//! A `PARAM@TERM` key targets a parameter on a specifically named object
//! rather than the section's own class.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::request::Request;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ParamSection {
    pub name: String,
    pub class: Option<String>,
    /// `(key, value)`, in file order; `key` may be a plain parameter name
    /// or a `PARAM@TERM` pair.
    pub params: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct ParamFile {
    pub sections: Vec<ParamSection>,
}

impl ParamFile {
    /// Hand-rolled line scanner over the rDock-style section format
    /// (teacher idiom: `parse_input_coordinates` in the driver hand-parses
    /// whitespace-separated lines rather than pulling in a config crate).
    pub fn parse(text: &str) -> CoreResult<ParamFile> {
        let mut sections = Vec::new();
        let mut current: Option<ParamSection> = None;

        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                if let Some(section) = current.take() {
                    sections.push(section);
                }
                current = Some(ParamSection { name: name.trim().to_string(), class: None, params: Vec::new() });
                continue;
            }
            let Some(section) = current.as_mut() else {
                return Err(CoreError::FileParseError {
                    file: "<param>".to_string(),
                    line: Some(lineno + 1),
                    message: "parameter line outside any [SECTION]".to_string(),
                });
            };
            let Some((key, value)) = line.split_once('=') else {
                return Err(CoreError::FileParseError {
                    file: "<param>".to_string(),
                    line: Some(lineno + 1),
                    message: format!("expected 'KEY = VALUE', got '{line}'"),
                });
            };
            let key = key.trim();
            let value = value.trim();
            if key.eq_ignore_ascii_case("class") {
                section.class = Some(value.to_string());
                continue;
            }
            let parsed: f64 = value.parse().map_err(|_| CoreError::FileParseError {
                file: "<param>".to_string(),
                line: Some(lineno + 1),
                message: format!("'{value}' is not a number"),
            })?;
            section.params.push((key.to_string(), parsed));
        }
        if let Some(section) = current.take() {
            sections.push(section);
        }
        Ok(ParamFile { sections })
    }

    /// Emits `SetParamTerm(term, param, value)` for every `PARAM@TERM` key
    /// found in any section (spec §6.6).
    pub fn requests(&self) -> Vec<Request> {
        let mut out = Vec::new();
        for section in self.sections.iter() {
            for (key, value) in section.params.iter() {
                if let Some((param, term)) = key.split_once('@') {
                    out.push(Request::SetParamTerm(term.to_string(), param.to_string(), *value));
                } else {
                    out.push(Request::SetParam(key.clone(), *value));
                }
            }
        }
        out
    }
}
