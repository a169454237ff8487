//! Response post-processing and markdown-to-ANSI rendering for the
//! chat path. File-creation output never passes through here.

use crossterm::style::Stylize;
use crossterm::terminal;
use markdown::{mdast, to_mdast, ParseOptions};
use unicode_width::UnicodeWidthStr;

/// Rewrite raw model text so the renderer sees clean markdown:
/// blank-line boundaries around code fences, then `**` → `__` before
/// `*` → `_` so the bold marker is never half-substituted.
pub fn prepare_markdown(raw: &str) -> String {
    let spaced = space_out_fences(raw);
    let bolded = spaced.replace("**", "__");
    bolded.replace('*', "_")
}

fn space_out_fences(raw: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_fence = false;

    for line in raw.lines() {
        let is_fence = line.trim_start().starts_with("```");
        if is_fence && !in_fence {
            out.push(String::new());
            out.push(line.to_string());
            in_fence = true;
        } else if is_fence && in_fence {
            out.push(line.to_string());
            out.push(String::new());
            in_fence = false;
        } else {
            out.push(line.to_string());
        }
    }

    let mut joined = out.join("\n");
    if raw.ends_with('\n') {
        joined.push('\n');
    }
    joined
}

/// Walks the mdast tree of a reply and emits ANSI-styled lines.
pub struct MarkdownRenderer {
    width: usize,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let width = terminal::size().map(|(w, _)| w as usize).unwrap_or(80);
        Self { width }
    }

    pub fn with_width(width: usize) -> Self {
        Self { width }
    }

    pub fn render(&self, text: &str) -> String {
        let root = match to_mdast(text, &ParseOptions::gfm()) {
            Ok(root) => root,
            Err(_) => return text.to_string(),
        };

        let children = match root {
            mdast::Node::Root(root) => root.children,
            other => vec![other],
        };

        let blocks: Vec<String> = children
            .iter()
            .map(|node| self.render_block(node))
            .filter(|block| !block.is_empty())
            .collect();

        blocks.join("\n\n")
    }

    fn render_block(&self, node: &mdast::Node) -> String {
        match node {
            mdast::Node::Heading(heading) => {
                let text = plain_text(&heading.children);
                let depth = heading.depth.min(6) as usize;
                format!("{}", format!("{} {}", "#".repeat(depth), text).cyan().bold())
            }
            mdast::Node::Paragraph(paragraph) => self.render_inline_nodes(&paragraph.children),
            mdast::Node::Code(code) => self.render_code_block(code),
            mdast::Node::List(list) => self.render_list(list, 0),
            mdast::Node::Blockquote(quote) => {
                let inner: Vec<String> =
                    quote.children.iter().map(|child| self.render_block(child)).collect();
                inner
                    .join("\n\n")
                    .lines()
                    .map(|line| format!("{} {}", "│".dark_grey(), line))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            mdast::Node::ThematicBreak(_) => {
                format!("{}", "─".repeat(self.width.min(80)).dark_grey())
            }
            mdast::Node::Table(table) => self.render_table(table),
            mdast::Node::Html(html) => html.value.clone(),
            other => self.render_inline(other),
        }
    }

    fn render_code_block(&self, code: &mdast::Code) -> String {
        let lines: Vec<&str> = code.value.lines().collect();
        let body_width = lines.iter().map(|line| line.width()).max().unwrap_or(0);
        let mut out = Vec::new();

        if let Some(lang) = &code.lang {
            out.push(format!("  {}", lang.clone().dark_grey().italic()));
        }

        for line in lines {
            let padding = " ".repeat(body_width - line.width());
            let padded = format!(" {}{} ", line, padding);
            out.push(format!("  {}", padded.white().on_dark_grey()));
        }

        out.join("\n")
    }

    fn render_list(&self, list: &mdast::List, depth: usize) -> String {
        let indent = "  ".repeat(depth);
        let mut number = list.start.unwrap_or(1);
        let mut lines = Vec::new();

        for node in &list.children {
            let mdast::Node::ListItem(item) = node else {
                continue;
            };

            let marker = if list.ordered {
                format!("{}.", number)
            } else {
                "•".to_string()
            };
            number += 1;

            let mut first = true;
            for child in &item.children {
                match child {
                    mdast::Node::List(nested) => {
                        lines.push(self.render_list(nested, depth + 1));
                    }
                    other => {
                        let text = self.render_block(other);
                        if first {
                            lines.push(format!("{}{} {}", indent, marker.clone().cyan(), text));
                            first = false;
                        } else {
                            lines.push(format!("{}  {}", indent, text));
                        }
                    }
                }
            }
            if first {
                lines.push(format!("{}{}", indent, marker.cyan()));
            }
        }

        lines.join("\n")
    }

    fn render_table(&self, table: &mdast::Table) -> String {
        let rows: Vec<Vec<String>> = table
            .children
            .iter()
            .filter_map(|node| match node {
                mdast::Node::TableRow(row) => Some(
                    row.children
                        .iter()
                        .map(|cell| match cell {
                            mdast::Node::TableCell(cell) => plain_text(&cell.children),
                            other => plain_text(std::slice::from_ref(other)),
                        })
                        .collect(),
                ),
                _ => None,
            })
            .collect();

        if rows.is_empty() {
            return String::new();
        }

        let columns = rows.iter().map(|row| row.len()).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        let mut out = Vec::new();
        out.push(table_border('┌', '┬', '┐', &widths));
        for (index, row) in rows.iter().enumerate() {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, col_width)| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    let padding = " ".repeat(col_width - cell.width());
                    if index == 0 {
                        format!(" {}{} ", cell.bold(), padding)
                    } else {
                        format!(" {}{} ", cell, padding)
                    }
                })
                .collect();
            out.push(format!("│{}│", cells.join("│")));

            if index == 0 {
                out.push(table_border('├', '┼', '┤', &widths));
            }
        }
        out.push(table_border('└', '┴', '┘', &widths));

        out.join("\n")
    }

    fn render_inline_nodes(&self, nodes: &[mdast::Node]) -> String {
        nodes.iter().map(|node| self.render_inline(node)).collect()
    }

    fn render_inline(&self, node: &mdast::Node) -> String {
        match node {
            mdast::Node::Text(text) => text.value.clone(),
            mdast::Node::Strong(strong) => {
                format!("{}", plain_text(&strong.children).bold())
            }
            mdast::Node::Emphasis(emphasis) => {
                format!("{}", plain_text(&emphasis.children).italic())
            }
            mdast::Node::Delete(delete) => {
                format!("{}", plain_text(&delete.children).crossed_out())
            }
            mdast::Node::InlineCode(code) => format!("{}", code.value.clone().yellow()),
            mdast::Node::Link(link) => {
                let label = plain_text(&link.children);
                if label == link.url {
                    format!("{}", link.url.clone().blue().underlined())
                } else {
                    format!(
                        "{} {}",
                        label.blue().underlined(),
                        format!("({})", link.url).dark_grey()
                    )
                }
            }
            mdast::Node::Image(image) => {
                format!("{} {}", image.alt.clone().italic(), format!("({})", image.url).dark_grey())
            }
            mdast::Node::Break(_) => "\n".to_string(),
            mdast::Node::Html(html) => html.value.clone(),
            mdast::Node::Paragraph(paragraph) => self.render_inline_nodes(&paragraph.children),
            other => other
                .children()
                .map(|children| self.render_inline_nodes(children))
                .unwrap_or_default(),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn table_border(left: char, mid: char, right: char, widths: &[usize]) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{}{}{}", left, segments.join(&mid.to_string()), right)
}

fn plain_text(nodes: &[mdast::Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            mdast::Node::Text(text) => out.push_str(&text.value),
            mdast::Node::InlineCode(code) => out.push_str(&code.value),
            other => {
                if let Some(children) = other.children() {
                    out.push_str(&plain_text(children));
                }
            }
        }
    }
    out
}
