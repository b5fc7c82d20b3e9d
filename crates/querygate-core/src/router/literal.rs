//! Query forms that resolve without retrieval
//!
//! ```text
//! weather              -> usage hint
//! weather:Paris        -> invoke with city=Paris
//! weather：Paris，3     -> full-width separators work too
//! tools / 工具          -> catalogue
//! tool weather         -> detail
//! ```

use crate::config::CatalogueSettings;
use crate::tools::ToolDefinition;

const NAME_SEPARATORS: [char; 2] = [':', '：'];
const ARG_SEPARATORS: [char; 2] = [',', '，'];

/// `name[:args]` split of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralQuery<'a> {
    pub name: &'a str,
    /// `None` when the query has no separator at all
    pub args: Option<&'a str>,
}

/// Split on the first half- or full-width colon
pub fn split_literal(query: &str) -> LiteralQuery<'_> {
    let query = query.trim();
    match query.find(NAME_SEPARATORS) {
        Some(idx) => {
            let sep_len = query[idx..].chars().next().map_or(1, char::len_utf8);
            LiteralQuery {
                name: query[..idx].trim(),
                args: Some(&query[idx + sep_len..]),
            }
        }
        None => LiteralQuery {
            name: query,
            args: None,
        },
    }
}

/// Raw positional arguments
pub fn split_arguments(raw: &str) -> Vec<&str> {
    raw.split(ARG_SEPARATORS).collect()
}

/// Whether the query asks for the tool list
pub fn is_catalogue_query(query: &str, settings: &CatalogueSettings) -> bool {
    let query = query.trim();
    settings
        .list_phrases
        .iter()
        .any(|phrase| phrase.trim().eq_ignore_ascii_case(query))
}

/// Tool name from a `<prefix><name>` detail query; the first matching prefix wins
pub fn detail_target<'a>(query: &'a str, settings: &CatalogueSettings) -> Option<&'a str> {
    let query = query.trim_start();
    settings
        .detail_prefixes
        .iter()
        .filter(|prefix| !prefix.is_empty())
        .find_map(|prefix| {
            let head = query.get(..prefix.len())?;
            if !head.eq_ignore_ascii_case(prefix) {
                return None;
            }
            let name = query[prefix.len()..].trim();
            (!name.is_empty()).then_some(name)
        })
}

pub fn catalogue_text(tools: &[ToolDefinition]) -> String {
    if tools.is_empty() {
        return "No tools are registered.".to_string();
    }
    let mut lines = vec![format!("Registered tools ({}):", tools.len())];
    for tool in tools {
        if tool.description.is_empty() {
            lines.push(format!("- {}", tool.name));
        } else {
            lines.push(format!("- {}: {}", tool.name, tool.description));
        }
    }
    lines.push(String::new());
    lines.push(
        "Tip: send a tool name alone for its parameters, or <name>:<arg1>,<arg2> to call it."
            .to_string(),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_literal() {
        assert_eq!(
            split_literal("weather:Paris"),
            LiteralQuery { name: "weather", args: Some("Paris") }
        );
        assert_eq!(
            split_literal(" weather "),
            LiteralQuery { name: "weather", args: None }
        );
        assert_eq!(
            split_literal("weather：巴黎"),
            LiteralQuery { name: "weather", args: Some("巴黎") }
        );
        // Only the first separator splits
        assert_eq!(split_literal("clock:12:30").args, Some("12:30"));
    }

    #[test]
    fn test_split_arguments() {
        assert_eq!(split_arguments("Paris,3"), vec!["Paris", "3"]);
        assert_eq!(split_arguments("巴黎，3"), vec!["巴黎", "3"]);
        assert_eq!(split_arguments("Paris"), vec!["Paris"]);
        assert_eq!(split_arguments("a,b,c").len(), 3);
    }

    #[test]
    fn test_catalogue_and_detail() {
        let settings = CatalogueSettings::default();
        assert!(is_catalogue_query("tools", &settings));
        assert!(is_catalogue_query(" List Tools ", &settings));
        assert!(is_catalogue_query("工具列表", &settings));
        assert!(!is_catalogue_query("tools please", &settings));

        assert_eq!(detail_target("tool weather", &settings), Some("weather"));
        assert_eq!(detail_target("Tool  weather ", &settings), Some("weather"));
        assert_eq!(detail_target("tool ", &settings), None);
        assert_eq!(detail_target("tools", &settings), None);
        assert_eq!(detail_target("工具weather", &settings), Some("weather"));
        assert_eq!(detail_target("工具", &settings), None);

        assert!(is_catalogue_query("查询工具列表", &settings));
        assert!(is_catalogue_query("工具列表查询", &settings));
    }

    #[test]
    fn test_catalogue_text() {
        use crate::tools::{HttpMethod, ToolKind};

        assert_eq!(catalogue_text(&[]), "No tools are registered.");
        let tools = vec![
            ToolDefinition::new("weather", ToolKind::Api, HttpMethod::Get, "http://h/w")
                .with_description("Current weather")
                .with_param("city", "string", true),
        ];
        let text = catalogue_text(&tools);
        assert!(text.contains("- weather: Current weather"));
        assert!(text.contains("<name>:<arg1>,<arg2>"));
    }
}
