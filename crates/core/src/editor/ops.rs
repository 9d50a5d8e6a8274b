//! Structural text operations for the content editor.
//!
//! Every operation is a pure function from `(content, selection)` to an
//! [`EditOutcome`]; nothing here touches a live text surface. Offsets are
//! byte offsets into the UTF-8 buffer. Out-of-range, inverted, or
//! mid-character selections are clamped rather than rejected, so a stale
//! selection coming from the surface can never panic the engine.

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Placeholder inserted when a bullet list is requested with nothing
/// selected.
pub const BULLET_LIST_TEMPLATE: &str = "- Item 1\n- Item 2\n- Item 3";

/// Placeholder inserted when an ordered list is requested with nothing
/// selected.
pub const ORDERED_LIST_TEMPLATE: &str = "1. Item 1\n2. Item 2\n3. Item 3";

/// Empty 3x3 table skeleton, framed by newlines so the renderer treats it
/// as its own block.
pub const TABLE_TEMPLATE: &str = "
<table>
  <tr>
    <th>Header 1</th>
    <th>Header 2</th>
    <th>Header 3</th>
  </tr>
  <tr>
    <td>Cell 1</td>
    <td>Cell 2</td>
    <td>Cell 3</td>
  </tr>
  <tr>
    <td>Cell 4</td>
    <td>Cell 5</td>
    <td>Cell 6</td>
  </tr>
</table>
";

/// Line pattern for bullet list items: indent, a bullet marker, at least
/// one space, then the item text.
static BULLET_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)[-*•]\s+(.*)$").expect("valid regex"));

/// Line pattern for numbered list items.
static NUMBER_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)([0-9]+)\.\s+(.*)$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Operation types
// ---------------------------------------------------------------------------

/// Result of a structural operation: the new buffer content and the byte
/// position the caller should place the caret at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub content: String,
    pub cursor: usize,
}

/// Inline style applied by the bold/italic toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineStyle {
    Bold,
    Italic,
}

/// Structural block inserted by a toolbar action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    Quote,
    Code,
    Link,
    Image,
    BulletList,
    OrderedList,
    Table,
}

/// Whether a color span sets the text color or the background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Text,
    Background,
}

/// A toolbar or keyboard operation over the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Wrap the selection in an inline style tag pair.
    Inline(InlineStyle),
    /// Insert the template for a structural block.
    Block(BlockKind),
    /// Wrap the selection in a colored `<span>`.
    ColorSpan { color: String, target: ColorTarget },
    /// An Enter keypress; list-aware unless `shift_held`.
    Newline { shift_held: bool },
}

/// Apply `op` to `content` over the `[sel_start, sel_end)` selection.
pub fn apply_op(content: &str, sel_start: usize, sel_end: usize, op: &EditOp) -> EditOutcome {
    match op {
        EditOp::Inline(style) => apply_inline_style(content, sel_start, sel_end, *style),
        EditOp::Block(kind) => insert_block(content, sel_start, sel_end, *kind),
        EditOp::ColorSpan { color, target } => {
            insert_color_span(content, sel_start, sel_end, color, *target)
        }
        EditOp::Newline { shift_held } => handle_newline(content, sel_start, sel_end, *shift_held),
    }
}

// ---------------------------------------------------------------------------
// Inline styles
// ---------------------------------------------------------------------------

/// Wrap the selection in an open/close tag pair.
///
/// An empty selection produces an empty pair the caller can type into; the
/// caret lands just past the close tag either way.
pub fn wrap_inline(
    content: &str,
    sel_start: usize,
    sel_end: usize,
    open_tag: &str,
    close_tag: &str,
) -> EditOutcome {
    let (start, end) = clamp_selection(content, sel_start, sel_end);
    let replacement = format!("{open_tag}{}{close_tag}", &content[start..end]);
    splice(content, start, end, &replacement)
}

/// Apply the bold or italic toolbar action.
pub fn apply_inline_style(
    content: &str,
    sel_start: usize,
    sel_end: usize,
    style: InlineStyle,
) -> EditOutcome {
    match style {
        InlineStyle::Bold => wrap_inline(content, sel_start, sel_end, "<b>", "</b>"),
        InlineStyle::Italic => wrap_inline(content, sel_start, sel_end, "<i>", "</i>"),
    }
}

// ---------------------------------------------------------------------------
// Block templates
// ---------------------------------------------------------------------------

/// Replace the selection with the template for `kind`.
///
/// Heading, quote, code, link and image templates embed the selected text.
/// List kinds convert a non-empty selection line by line and fall back to a
/// three-item placeholder otherwise. The table template ignores the
/// selected text entirely.
pub fn insert_block(content: &str, sel_start: usize, sel_end: usize, kind: BlockKind) -> EditOutcome {
    let (start, end) = clamp_selection(content, sel_start, sel_end);
    let selected = &content[start..end];
    let replacement = match kind {
        BlockKind::Heading1 => format!("<h1 class=\"text-2xl font-bold\">{selected}</h1><br>"),
        BlockKind::Heading2 => format!("<h2 class=\"text-xl font-semibold\">{selected}</h2><br>"),
        BlockKind::Heading3 => format!("<h3 class=\"text-lg font-medium\">{selected}</h3><br>"),
        BlockKind::Quote => format!("<blockquote>{selected}</blockquote>"),
        BlockKind::Code => format!("<code>{selected}</code>"),
        BlockKind::Link => format!("<a href=\"url\">{selected}</a>"),
        BlockKind::Image => format!("<img src=\"url\" alt=\"{selected}\">"),
        BlockKind::BulletList => bullet_list_replacement(selected),
        BlockKind::OrderedList => ordered_list_replacement(selected),
        BlockKind::Table => TABLE_TEMPLATE.to_string(),
    };
    splice(content, start, end, &replacement)
}

/// Prefix every non-blank line of the selection with `- `, or produce the
/// placeholder list for an empty selection.
fn bullet_list_replacement(selected: &str) -> String {
    if selected.trim().is_empty() {
        return BULLET_LIST_TEMPLATE.to_string();
    }
    selected
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("- {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number every non-blank line of the selection by its position. Blank
/// lines keep their slot in the numbering.
fn ordered_list_replacement(selected: &str) -> String {
    if selected.trim().is_empty() {
        return ORDERED_LIST_TEMPLATE.to_string();
    }
    selected
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{}. {line}", i + 1)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Color spans
// ---------------------------------------------------------------------------

/// Wrap the selection in a `<span>` carrying an inline color style.
///
/// `color` is inserted verbatim; the palette supplies `#rrggbb` values.
pub fn insert_color_span(
    content: &str,
    sel_start: usize,
    sel_end: usize,
    color: &str,
    target: ColorTarget,
) -> EditOutcome {
    let (start, end) = clamp_selection(content, sel_start, sel_end);
    let selected = &content[start..end];
    let replacement = match target {
        ColorTarget::Text => format!("<span style=\"color: {color}\">{selected}</span>"),
        ColorTarget::Background => {
            format!("<span style=\"background-color: {color}\">{selected}</span>")
        }
    };
    splice(content, start, end, &replacement)
}

// ---------------------------------------------------------------------------
// Newline handling
// ---------------------------------------------------------------------------

/// Handle an Enter keypress.
///
/// Shift+Enter replaces the selection with a `<br>`. A plain Enter inspects
/// the line the selection starts on: inside a bullet or numbered list item
/// it either continues the list (non-empty item) or terminates it (empty
/// item, marker removed and a single newline left behind); anywhere else it
/// inserts a plain newline.
pub fn handle_newline(
    content: &str,
    sel_start: usize,
    sel_end: usize,
    shift_held: bool,
) -> EditOutcome {
    let (start, end) = clamp_selection(content, sel_start, sel_end);

    if shift_held {
        return splice(content, start, end, "<br>");
    }

    let line = current_line(content, start);
    if let Some(caps) = BULLET_LINE_RE.captures(line) {
        return if caps[2].trim().is_empty() {
            terminate_list(content, start)
        } else {
            continue_list(content, end, &format!("\n{}- ", &caps[1]))
        };
    }
    if let Some(caps) = NUMBER_LINE_RE.captures(line) {
        if let Ok(number) = caps[2].parse::<u64>() {
            let next = number.saturating_add(1);
            return if caps[3].trim().is_empty() {
                terminate_list(content, start)
            } else {
                continue_list(content, end, &format!("\n{}{next}. ", &caps[1]))
            };
        }
    }

    splice(content, start, end, "\n")
}

/// The line containing byte position `cursor`: from just after the previous
/// newline to the next newline (exclusive) or the end of content.
pub fn current_line(content: &str, cursor: usize) -> &str {
    let cursor = clamp_position(content, cursor);
    let line_start = content[..cursor].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = content[cursor..]
        .find('\n')
        .map(|i| cursor + i)
        .unwrap_or(content.len());
    &content[line_start..line_end]
}

/// Remove the list marker line up to the caret and leave a single newline.
fn terminate_list(content: &str, sel_start: usize) -> EditOutcome {
    let line_start = content[..sel_start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let mut next = String::with_capacity(content.len());
    next.push_str(&content[..line_start]);
    next.push('\n');
    next.push_str(&content[sel_start..]);
    EditOutcome {
        content: next,
        cursor: line_start + 1,
    }
}

/// Insert the next list marker after the selection end, keeping the rest of
/// the document in place.
fn continue_list(content: &str, sel_end: usize, marker: &str) -> EditOutcome {
    let mut next = String::with_capacity(content.len() + marker.len());
    next.push_str(&content[..sel_end]);
    next.push_str(marker);
    next.push_str(&content[sel_end..]);
    EditOutcome {
        content: next,
        cursor: sel_end + marker.len(),
    }
}

// ---------------------------------------------------------------------------
// Selection clamping
// ---------------------------------------------------------------------------

/// Replace `[start, end)` with `replacement`; the caret lands after it.
fn splice(content: &str, start: usize, end: usize, replacement: &str) -> EditOutcome {
    let mut next = String::with_capacity(content.len() - (end - start) + replacement.len());
    next.push_str(&content[..start]);
    next.push_str(replacement);
    next.push_str(&content[end..]);
    EditOutcome {
        content: next,
        cursor: start + replacement.len(),
    }
}

/// Clamp a byte position into `content`, snapping left to a char boundary.
pub(crate) fn clamp_position(content: &str, pos: usize) -> usize {
    let mut pos = pos.min(content.len());
    while !content.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Clamp a selection into `content`, swapping inverted bounds.
fn clamp_selection(content: &str, sel_start: usize, sel_end: usize) -> (usize, usize) {
    let a = clamp_position(content, sel_start);
    let b = clamp_position(content, sel_end);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
