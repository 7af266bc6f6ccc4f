use std::collections::HashMap;

use crate::kernel::HostKernelFn;

/// Build options are whitespace separated flags. `-D` and `-I` take the
/// next token as their value.
pub(crate) fn valid_options(options: &str) -> bool {
    let mut tokens = options.split_whitespace();
    while let Some(token) = tokens.next() {
        if !token.starts_with('-') || token == "-" {
            return false;
        }
        if (token == "-D" || token == "-I") && tokens.next().is_none() {
            return false;
        }
    }
    true
}

/// Checks `source` and resolves each kernel entry point it declares against
/// the registered host implementations. On failure returns the build log.
pub(crate) fn compile(
    source: &str,
    implementations: &HashMap<String, HostKernelFn>,
) -> Result<HashMap<String, HostKernelFn>, String> {
    if source.trim().is_empty() {
        return Err("error: program source is empty".to_string());
    }

    let stripped = strip_comments(source);
    let tokens = tokenize(&stripped);
    let mut log = Vec::new();

    check_directives(&stripped, &mut log);
    check_balance(&tokens, &mut log);

    let mut kernels = HashMap::new();
    for (line, name) in entry_points(&tokens) {
        match implementations.get(name) {
            Some(entry) => {
                if kernels.insert(name.to_string(), entry.clone()).is_some() {
                    log.push(format!("line {}: error: redefinition of kernel '{}'", line, name));
                }
            }
            None => log.push(format!(
                "line {}: error: kernel '{}' has no host implementation",
                line, name
            )),
        }
    }

    if log.is_empty() {
        Ok(kernels)
    } else {
        Err(log.join("\n"))
    }
}

/// Replaces comments with spaces, keeping newlines so line numbers hold.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        match (c, next) {
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = ' ';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Identifiers and single ASCII punctuation characters, with line numbers.
fn tokenize(source: &str) -> Vec<(usize, &str)> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c == b'\n' {
            line += 1;
            i += 1;
        } else if c.is_ascii_alphabetic() || c == b'_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push((line, &source[start..i]));
        } else if c.is_ascii_punctuation() {
            tokens.push((line, &source[i..i + 1]));
            i += 1;
        } else {
            i += 1;
        }
    }
    tokens
}

fn is_identifier(token: &str) -> bool {
    token
        .bytes()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == b'_')
}

/// `__kernel void name(` and `kernel void name(`, optionally with
/// `__attribute__((...))` between the qualifier and the return type.
fn entry_points<'a>(tokens: &[(usize, &'a str)]) -> Vec<(usize, &'a str)> {
    let mut found = Vec::new();
    for (start, &(line, token)) in tokens.iter().enumerate() {
        if token != "__kernel" && token != "kernel" {
            continue;
        }

        let mut i = start + 1;
        while tokens.get(i).is_some_and(|t| t.1 == "__attribute__") {
            i += 1;
            let mut depth = 0usize;
            while let Some(&(_, t)) = tokens.get(i) {
                i += 1;
                match t {
                    "(" => depth += 1,
                    ")" => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }

        if let (Some((_, "void")), Some(&(_, name)), Some((_, "("))) =
            (tokens.get(i), tokens.get(i + 1), tokens.get(i + 2))
        {
            if is_identifier(name) {
                found.push((line, name));
            }
        }
    }
    found
}

fn check_directives(source: &str, log: &mut Vec<String>) {
    for (number, line) in source.lines().enumerate() {
        let directive = line.trim_start();
        if let Some(message) = directive.strip_prefix("#error") {
            log.push(format!("line {}: error: {}", number + 1, message.trim()));
        }
    }
}

fn check_balance(tokens: &[(usize, &str)], log: &mut Vec<String>) {
    let mut open: Vec<(usize, &str)> = Vec::new();
    for &(line, token) in tokens {
        let expected = match token {
            "(" | "{" | "[" => {
                open.push((line, token));
                continue;
            }
            ")" => "(",
            "}" => "{",
            "]" => "[",
            _ => continue,
        };
        match open.last() {
            Some(&(_, top)) if top == expected => {
                open.pop();
            }
            _ => log.push(format!("line {}: error: unexpected '{}'", line, token)),
        }
    }
    for (line, token) in open {
        log.push(format!("line {}: error: unclosed '{}'", line, token));
    }
}
