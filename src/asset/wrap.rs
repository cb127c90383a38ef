//! Line-length limiting for minified output.
//!
//! - [`wrap_script`] breaks JavaScript at statement ends found by re-parsing
//! - [`wrap_lines`] breaks CSS after a terminator character outside strings

use oxc::allocator::Allocator;
use oxc::ast::ast::Statement;
use oxc::ast_visit::{Visit, walk};
use oxc::parser::Parser;
use oxc::span::{GetSpan, SourceType};

/// Insert a line break after a statement once a line reaches `max_len` columns.
///
/// Break points are the statement ends of the re-parsed output, at any nesting
/// depth, so a break never lands inside a string, template or regex literal.
/// Output that does not re-parse is returned unchanged.
pub fn wrap_script(code: &str, max_len: Option<usize>) -> String {
    let Some(max_len) = max_len else {
        return code.to_string();
    };

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, SourceType::script()).parse();
    if ret.panicked || !ret.errors.is_empty() {
        return code.to_string();
    }

    let mut ends = StatementEnds::default();
    ends.visit_program(&ret.program);
    let mut offsets = ends.0;
    offsets.sort_unstable();
    offsets.dedup();

    break_at(code, &offsets, max_len)
}

#[derive(Default)]
struct StatementEnds(Vec<usize>);

impl<'a> Visit<'a> for StatementEnds {
    fn visit_statement(&mut self, it: &Statement<'a>) {
        self.0.push(it.span().end as usize);
        walk::walk_statement(self, it);
    }
}

/// Break after each sorted byte offset whose line has reached `max_len`.
fn break_at(code: &str, offsets: &[usize], max_len: usize) -> String {
    let mut out = String::with_capacity(code.len() + offsets.len());
    let mut last = 0;
    let mut column = 0;

    for &offset in offsets {
        let Some(chunk) = code.get(last..offset) else {
            continue;
        };
        column = match chunk.rfind('\n') {
            Some(i) => chunk[i + 1..].chars().count(),
            None => column + chunk.chars().count(),
        };
        out.push_str(chunk);
        last = offset;

        if column >= max_len && !code[offset..].starts_with('\n') {
            out.push('\n');
            column = 0;
        }
    }

    out.push_str(&code[last..]);
    out
}

/// Insert a line break after `terminator` once a line reaches `max_len` columns.
///
/// Terminators inside string literals (`"`, `'`) are skipped, so a break
/// never lands inside a string. `None` disables wrapping; `Some(0)` breaks
/// after every terminator.
pub fn wrap_lines(code: &str, terminator: char, max_len: Option<usize>) -> String {
    let Some(max_len) = max_len else {
        return code.to_string();
    };

    let mut out = String::with_capacity(code.len() + code.len() / max_len.max(1));
    let mut column = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in code.chars() {
        out.push(ch);
        if ch == '\n' {
            column = 0;
            continue;
        }
        column += 1;

        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == open {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => quote = Some(ch),
            c if c == terminator && column >= max_len => {
                out.push('\n');
                column = 0;
            }
            _ => {}
        }
    }

    out
}
