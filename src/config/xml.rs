//! Event-driven parser for list-view config documents.
//!
//! Recognized elements: `<query-select>` (with optional `<collated>` and
//! `<critical-data-required>` sub-elements), `<query-construct>`,
//! `<template>`, and `<postprocessor>`. Anything else is ignored. This parser
//! only extracts structure; validation policy lives in the resolver.

use std::collections::BTreeSet;

use quick_xml::Reader;
use quick_xml::events::Event;

use super::select::{Segment, SelectQuery};
use crate::errors::ConfigDefect;

/// The structural content of one config document, pre-validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListViewConfig {
    /// `None` when no `<query-select>` element was present at all.
    pub select: Option<SelectQuery>,
    /// Trimmed `<query-construct>` texts, duplicates collapsed.
    pub construct_queries: BTreeSet<String>,
    /// `None` when absent; `Some("")` when present but empty.
    pub template: Option<String>,
    pub postprocessor: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leaf {
    Construct,
    Template,
    PostProcessor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sub {
    Collated,
    Critical,
}

/// Parse a config document. Malformed XML becomes an `InvalidXml` defect
/// carrying the underlying parser diagnostic.
pub fn parse(text: &str) -> Result<RawListViewConfig, ConfigDefect> {
    let mut reader = Reader::from_str(text);
    let mut raw = RawListViewConfig::default();

    let mut in_select = false;
    let mut current_sub: Option<Sub> = None;
    let mut current_leaf: Option<Leaf> = None;
    let mut segments: Vec<Segment> = Vec::new();
    let mut plain_buf = String::new();
    let mut sub_buf = String::new();
    let mut leaf_buf = String::new();

    loop {
        match reader.read_event().map_err(invalid_xml)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"query-select" if !in_select => {
                    in_select = true;
                    current_sub = None;
                    segments.clear();
                    plain_buf.clear();
                }
                b"collated" if in_select && current_sub.is_none() => {
                    flush_plain(&mut plain_buf, &mut segments);
                    sub_buf.clear();
                    current_sub = Some(Sub::Collated);
                }
                b"critical-data-required" if in_select && current_sub.is_none() => {
                    flush_plain(&mut plain_buf, &mut segments);
                    sub_buf.clear();
                    current_sub = Some(Sub::Critical);
                }
                b"query-construct" if !in_select && current_leaf.is_none() => {
                    leaf_buf.clear();
                    current_leaf = Some(Leaf::Construct);
                }
                b"template" if !in_select && current_leaf.is_none() => {
                    leaf_buf.clear();
                    current_leaf = Some(Leaf::Template);
                }
                b"postprocessor" if !in_select && current_leaf.is_none() => {
                    leaf_buf.clear();
                    current_leaf = Some(Leaf::PostProcessor);
                }
                // Unrecognized elements are transparent: their text still
                // belongs to whatever recognized element surrounds them.
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"query-select" if !in_select && raw.select.is_none() => {
                    raw.select = Some(SelectQuery::default());
                }
                b"collated" if in_select && current_sub.is_none() => {
                    flush_plain(&mut plain_buf, &mut segments);
                }
                b"critical-data-required" if in_select && current_sub.is_none() => {
                    flush_plain(&mut plain_buf, &mut segments);
                }
                b"template" if !in_select && raw.template.is_none() => {
                    raw.template = Some(String::new());
                }
                b"postprocessor" if !in_select && raw.postprocessor.is_none() => {
                    raw.postprocessor = Some(String::new());
                }
                _ => {}
            },
            Event::Text(e) => {
                let text = e.unescape().map_err(invalid_xml)?;
                append_text(
                    &text,
                    in_select,
                    current_sub,
                    current_leaf,
                    &mut plain_buf,
                    &mut sub_buf,
                    &mut leaf_buf,
                );
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(&e)
                    .map_err(|err| ConfigDefect::InvalidXml(err.to_string()))?;
                append_text(
                    text,
                    in_select,
                    current_sub,
                    current_leaf,
                    &mut plain_buf,
                    &mut sub_buf,
                    &mut leaf_buf,
                );
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"collated" if current_sub == Some(Sub::Collated) => {
                    segments.push(Segment::Collated(std::mem::take(&mut sub_buf)));
                    current_sub = None;
                }
                b"critical-data-required" if current_sub == Some(Sub::Critical) => {
                    segments.push(Segment::Critical(std::mem::take(&mut sub_buf)));
                    current_sub = None;
                }
                b"query-select" if in_select => {
                    flush_plain(&mut plain_buf, &mut segments);
                    // First element wins if the file repeats it.
                    if raw.select.is_none() {
                        raw.select = Some(SelectQuery::new(std::mem::take(&mut segments)));
                    }
                    segments.clear();
                    in_select = false;
                    current_sub = None;
                }
                b"query-construct" if current_leaf == Some(Leaf::Construct) => {
                    let trimmed = leaf_buf.trim();
                    if !trimmed.is_empty() {
                        raw.construct_queries.insert(trimmed.to_string());
                    }
                    current_leaf = None;
                }
                b"template" if current_leaf == Some(Leaf::Template) => {
                    if raw.template.is_none() {
                        raw.template = Some(leaf_buf.trim().to_string());
                    }
                    current_leaf = None;
                }
                b"postprocessor" if current_leaf == Some(Leaf::PostProcessor) => {
                    if raw.postprocessor.is_none() {
                        raw.postprocessor = Some(leaf_buf.trim().to_string());
                    }
                    current_leaf = None;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(raw)
}

fn invalid_xml(err: quick_xml::Error) -> ConfigDefect {
    ConfigDefect::InvalidXml(err.to_string())
}

fn flush_plain(buf: &mut String, segments: &mut Vec<Segment>) {
    if !buf.is_empty() {
        segments.push(Segment::Plain(std::mem::take(buf)));
    }
}

#[allow(clippy::too_many_arguments)]
fn append_text(
    text: &str,
    in_select: bool,
    current_sub: Option<Sub>,
    current_leaf: Option<Leaf>,
    plain_buf: &mut String,
    sub_buf: &mut String,
    leaf_buf: &mut String,
) {
    if in_select {
        if current_sub.is_some() {
            sub_buf.push_str(text);
        } else {
            plain_buf.push_str(text);
        }
    } else if current_leaf.is_some() {
        leaf_buf.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_complete_config() {
        let raw = parse(
            r#"<list-view-config>
                <query-select>SELECT ?object WHERE { ?s ?p ?object }</query-select>
                <query-construct>CONSTRUCT A</query-construct>
                <template>propStatement-custom.ftl</template>
                <postprocessor>linking</postprocessor>
            </list-view-config>"#,
        )
        .unwrap();

        let select = raw.select.unwrap();
        assert!(!select.is_blank());
        assert_eq!(
            select.assemble(false, true),
            "SELECT ?object WHERE { ?s ?p ?object }"
        );
        assert_eq!(
            raw.construct_queries,
            BTreeSet::from(["CONSTRUCT A".to_string()])
        );
        assert_eq!(raw.template.as_deref(), Some("propStatement-custom.ftl"));
        assert_eq!(raw.postprocessor.as_deref(), Some("linking"));
    }

    #[test]
    fn construct_queries_collapse_duplicates_in_any_order() {
        let raw = parse(
            r#"<list-view-config>
                <query-select>q</query-select>
                <query-construct>TWO</query-construct>
                <query-construct>ONE</query-construct>
                <query-construct>THREE</query-construct>
                <query-construct>ONE</query-construct>
                <template>t.ftl</template>
            </list-view-config>"#,
        )
        .unwrap();

        assert_eq!(
            raw.construct_queries,
            BTreeSet::from(["ONE".to_string(), "TWO".to_string(), "THREE".to_string()])
        );
    }

    #[test]
    fn construct_query_text_is_trimmed() {
        let raw = parse(
            r#"<list-view-config>
                <query-construct>
                    CONSTRUCT { ?s ?p ?o }
                </query-construct>
            </list-view-config>"#,
        )
        .unwrap();

        assert_eq!(
            raw.construct_queries,
            BTreeSet::from(["CONSTRUCT { ?s ?p ?o }".to_string()])
        );
    }

    #[test]
    fn select_sub_nodes_become_segments() {
        let raw = parse(
            "<list-view-config><query-select>Plain <collated>collated</collated> plain \
             <critical-data-required>critical</critical-data-required> plain \
             <collated>collated</collated> plain.</query-select></list-view-config>",
        )
        .unwrap();

        let select = raw.select.unwrap();
        assert_eq!(
            select.assemble(true, true),
            "Plain collated plain critical plain collated plain."
        );
        assert_eq!(select.assemble(false, false), "Plain plain plain plain.");
    }

    #[test]
    fn missing_elements_parse_as_none() {
        let raw = parse("<list-view-config></list-view-config>").unwrap();
        assert_eq!(raw.select, None);
        assert_eq!(raw.template, None);
        assert_eq!(raw.postprocessor, None);
        assert!(raw.construct_queries.is_empty());
    }

    #[test]
    fn present_but_empty_elements_parse_as_some_empty() {
        let raw = parse(
            "<list-view-config><query-select></query-select><template></template></list-view-config>",
        )
        .unwrap();
        assert!(raw.select.unwrap().is_blank());
        assert_eq!(raw.template.as_deref(), Some(""));

        let raw = parse("<list-view-config><query-select/><template/></list-view-config>").unwrap();
        assert!(raw.select.unwrap().is_blank());
        assert_eq!(raw.template.as_deref(), Some(""));
    }

    #[test]
    fn unrecognized_elements_are_ignored() {
        let raw = parse(
            r#"<list-view-config>
                <query-select>q</query-select>
                <experimental>whatever</experimental>
                <template>t.ftl</template>
            </list-view-config>"#,
        )
        .unwrap();
        assert_eq!(raw.template.as_deref(), Some("t.ftl"));
    }

    #[test]
    fn cdata_select_query_is_preserved() {
        let raw = parse(
            "<list-view-config><query-select><![CDATA[SELECT ?x WHERE { ?x a <http://c> }]]></query-select></list-view-config>",
        )
        .unwrap();
        assert_eq!(
            raw.select.unwrap().assemble(false, true),
            "SELECT ?x WHERE { ?x a <http://c> }"
        );
    }

    #[test]
    fn escaped_entities_are_unescaped() {
        let raw = parse(
            "<list-view-config><query-select>SELECT ?x WHERE { FILTER(?n &lt; 3) }</query-select></list-view-config>",
        )
        .unwrap();
        assert_eq!(
            raw.select.unwrap().assemble(false, true),
            "SELECT ?x WHERE { FILTER(?n < 3) }"
        );
    }

    #[test]
    fn malformed_xml_is_an_invalid_xml_defect() {
        let err = parse("<list-view-config><query-select>q</template></list-view-config>")
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_xml");
        assert!(err.to_string().contains("not valid XML"));
    }

    #[test]
    fn first_select_element_wins() {
        let raw = parse(
            "<list-view-config><query-select>first</query-select><query-select>second</query-select></list-view-config>",
        )
        .unwrap();
        assert_eq!(raw.select.unwrap().assemble(false, true), "first");
    }
}
