//! Byte-level tokenizer for robots.txt documents.
//!
//! The document is split into physical lines; every line yields its words
//! followed by an end-of-line marker. Nothing here can fail: bytes that are
//! not valid UTF-8 are carried through untouched.

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// One token of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A directive name or value word.
    Word(&'a [u8]),
    /// End of a physical line.
    Eol,
}

/// Tokenize a whole document.
///
/// Within a line the first word ends at whitespace or `:`. Whitespace and a
/// single `:` after it are skipped, and the rest of the line is split on
/// whitespace, so `Crawl-delay : 60` and `Sitemap: http://x/y` both come out
/// as two words. `#` starts a comment that runs to the end of the line.
pub fn tokenize(input: &[u8]) -> Vec<Token<'_>> {
    let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);
    let mut tokens = Vec::with_capacity(input.len() / 6 + 1);

    let mut rest = input;
    loop {
        let (line, next) = split_line(rest);
        tokenize_line(line, &mut tokens);
        tokens.push(Token::Eol);
        match next {
            Some(next) => rest = next,
            None => break,
        }
    }

    tokens
}

/// Number of physical lines in `input`, counted the way `tokenize` splits
/// them. An empty document is one (empty) line.
pub fn line_count(input: &[u8]) -> usize {
    let mut count = 1;
    let mut rest = input;
    while let (_, Some(next)) = split_line(rest) {
        count += 1;
        rest = next;
    }
    count
}

/// Split off the first line. CR, LF and CRLF all end a line.
fn split_line(input: &[u8]) -> (&[u8], Option<&[u8]>) {
    match input.iter().position(|&b| b == b'\n' || b == b'\r') {
        Some(pos) => {
            let skip = if input[pos] == b'\r' && input.get(pos + 1) == Some(&b'\n') {
                2
            } else {
                1
            };
            (&input[..pos], Some(&input[pos + skip..]))
        }
        None => (input, None),
    }
}

fn tokenize_line<'a>(line: &'a [u8], tokens: &mut Vec<Token<'a>>) {
    let line = match line.iter().position(|&b| b == b'#') {
        Some(pos) => &line[..pos],
        None => line,
    };

    let mut pos = skip_whitespace(line, 0);
    let start = pos;
    while pos < line.len() && !is_space(line[pos]) && line[pos] != b':' {
        pos += 1;
    }
    if pos > start {
        tokens.push(Token::Word(&line[start..pos]));
    }

    pos = skip_whitespace(line, pos);
    if line.get(pos) == Some(&b':') {
        pos += 1;
    }

    tokens.extend(
        line[pos..]
            .split(|&b| is_space(b))
            .filter(|word| !word.is_empty())
            .map(Token::Word),
    );
}

fn skip_whitespace(line: &[u8], mut pos: usize) -> usize {
    while pos < line.len() && is_space(line[pos]) {
        pos += 1;
    }
    pos
}

#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\x0b' | b'\x0c')
}
