//! Doc comment rendering
//!
//! Short single-line docs become `/// text`; everything else is reflowed into a `/** */`
//! block. Reflowing joins the lines of a paragraph and wraps them greedily. Blank lines,
//! tags (`@param`, `\returns`), list items, headings and table rows start a new paragraph, and
//! fenced code blocks pass through untouched.

/// Render `text` as a doc comment at `prefix`. Empty text renders nothing.
pub fn render_doc(text: &str, prefix: &str, width: usize) -> String {
    let text = text.trim_end();
    if text.trim().is_empty() {
        return String::new();
    }
    if !text.contains('\n') && prefix.len() + 4 + text.len() <= width {
        return format!("{prefix}/// {}\n", text.trim());
    }
    block(&reflow(text, block_width(prefix, width)), prefix)
}

/// The file doc, closed by the `@{` group opener.
pub fn render_file_doc(text: &str, prefix: &str, width: usize) -> String {
    let mut lines = reflow(text.trim_end(), block_width(prefix, width));
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push("@{".to_string());
    block(&lines, prefix)
}

/// A same-line `///<` doc when `text` fits after a declaration of `line_len` columns.
pub fn inline_doc(text: &str, line_len: usize, width: usize) -> Option<String> {
    let text = text.trim();
    (!text.is_empty() && !text.contains('\n') && line_len + 5 + text.len() <= width).then(|| format!(" ///< {text}"))
}

fn block_width(prefix: &str, width: usize) -> usize {
    width.saturating_sub(prefix.len() + 3).max(20)
}

fn block(lines: &[String], prefix: &str) -> String {
    let mut out = format!("{prefix}/**\n");
    for line in lines {
        if line.is_empty() {
            out.push_str(&format!("{prefix} *\n"));
        } else {
            out.push_str(&format!("{prefix} * {line}\n"));
        }
    }
    out.push_str(&format!("{prefix} */\n"));
    out
}

/// Wrap `text` to `width` columns, suspending reflow inside code fences.
pub fn reflow(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut words: Vec<&str> = Vec::new();
    let mut in_fence = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            flush(&mut words, &mut out, width);
            out.push(line.trim_end().to_string());
            in_fence = !in_fence;
        } else if in_fence {
            out.push(line.trim_end().to_string());
        } else if trimmed.is_empty() {
            flush(&mut words, &mut out, width);
            out.push(String::new());
        } else if trimmed.starts_with('|') {
            flush(&mut words, &mut out, width);
            out.push(trimmed.to_string());
        } else {
            if starts_paragraph(trimmed) {
                flush(&mut words, &mut out, width);
            }
            words.extend(trimmed.split_whitespace());
        }
    }
    flush(&mut words, &mut out, width);
    out
}

fn starts_paragraph(line: &str) -> bool {
    if line.starts_with(['@', '\\', '#']) || line.starts_with("- ") || line.starts_with("* ") {
        return true;
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && line[digits..].starts_with(". ")
}

fn flush(words: &mut Vec<&str>, out: &mut Vec<String>, width: usize) {
    let mut line = String::new();
    for word in words.drain(..) {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            out.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        out.push(line);
    }
}
